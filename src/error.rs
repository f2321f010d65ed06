use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} fields.id not specified")]
    MissingIdField(&'static str),

    #[error("Exactly one of fixedCurrency or fields.currency must be specified")]
    AmbiguousCurrency,

    #[error("An API key is required unless running with --dry-run")]
    MissingApiKey,

    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    #[error("Unknown already-exists policy: {0}")]
    UnknownPolicy(String),
}

/// A fault reported by the remote account service.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct ServiceError {
    pub status: u16,
    pub message: String,
    pub message_code: Option<String>,
}

impl ServiceError {
    pub fn new(status: u16, message: impl Into<String>, message_code: Option<&str>) -> Self {
        Self {
            status,
            message: message.into(),
            message_code: message_code.map(str::to_string),
        }
    }

    pub fn is_code(&self, code: &str) -> bool {
        self.message_code.as_deref() == Some(code)
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(
        "Value with ID {value_id} can not be updated to match the csv because the csv has \
         currency {desired} and the Value has currency {remote} and the Value's currency can \
         never be changed"
    )]
    CurrencyMismatch {
        value_id: String,
        desired: String,
        remote: String,
    },

    #[error("Value with ID {value_id} has an invalid balance: {raw}")]
    InvalidBalance { value_id: String, raw: String },

    #[error(
        "Value with ID {value_id} can not move from balance {current} to {target}: the \
         adjustment is out of range"
    )]
    BalanceOutOfRange {
        value_id: String,
        current: i64,
        target: i64,
    },

    #[error("Line {line}: {message}")]
    ExistsExit { line: u64, message: String },
}
