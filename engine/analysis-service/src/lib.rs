//! Cheeky FC analysis service
//!
//! HTTP surface over the weekly roster/stats pipeline and the public stats
//! cache, plus configuration loading, logging setup and signal handling for
//! the `cheeky-fc` binary.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod rest_api;
pub mod service;
pub mod signals;

pub use config::{load_configuration, ServiceConfig};
pub use error::{handle_rejection, ApiError};
pub use logging::initialize_logging;
pub use rest_api::{api, create_routes};
pub use service::ServiceState;
pub use signals::setup_signal_handlers;
