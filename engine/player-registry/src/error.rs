use thiserror::Error;

/// Identity map errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Identity map I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Identity map CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid identity map entry for {player_id}: {message}")]
    InvalidEntry { player_id: String, message: String },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
