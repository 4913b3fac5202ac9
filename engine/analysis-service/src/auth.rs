//! Shared-secret API key check for mutating and debug routes

use crate::error::ApiError;
use std::collections::HashMap;
use warp::{Filter, Rejection};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Compare a caller's key with the server key
pub fn authorize(server_key: Option<&str>, provided: Option<&str>) -> Result<(), ApiError> {
    let Some(expected) = server_key.filter(|k| !k.is_empty()) else {
        return Err(ApiError::unauthorized("Server API_KEY is not set"));
    };

    match provided {
        Some(sent) if sent == expected => Ok(()),
        _ => Err(ApiError::unauthorized("Unauthorized")),
    }
}

/// Require the key in the `X-API-Key` header or the `key` query parameter
pub fn with_api_key(server_key: Option<String>) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>(API_KEY_HEADER)
        .and(warp::query::<HashMap<String, String>>())
        .and_then(move |header: Option<String>, query: HashMap<String, String>| {
            let server_key = server_key.clone();
            async move {
                let provided = header.filter(|h| !h.is_empty()).or_else(|| query.get("key").cloned());
                authorize(server_key.as_deref(), provided.as_deref()).map_err(warp::reject::custom)
            }
        })
        .untuple_one()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize() {
        let unset = authorize(None, Some("secret")).unwrap_err();
        assert_eq!(unset.message, "Server API_KEY is not set");
        assert_eq!(authorize(Some(""), Some("")).unwrap_err().message, "Server API_KEY is not set");

        assert_eq!(authorize(Some("secret"), None).unwrap_err().message, "Unauthorized");
        assert_eq!(authorize(Some("secret"), Some("guess")).unwrap_err().message, "Unauthorized");
        assert!(authorize(Some("secret"), Some("secret")).is_ok());
    }

    #[tokio::test]
    async fn test_filter_reads_header_or_query() {
        let filter = with_api_key(Some("secret".to_string())).map(|| "ok");

        let by_header = warp::test::request().path("/").header("X-API-Key", "secret").filter(&filter).await;
        assert!(by_header.is_ok());

        let by_query = warp::test::request().path("/?key=secret").filter(&filter).await;
        assert!(by_query.is_ok());

        let missing = warp::test::request().path("/").filter(&filter).await;
        assert!(missing.is_err());
    }
}
