use thiserror::Error;

/// WeChat SDK error types
#[derive(Debug, Error)]
pub enum WechatError {
    #[error("Unsupported message type: {0}")]
    UnsupportedMessageType(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for field {field}: {value:?}")]
    Format { field: String, value: String },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("News message allows at most {max} articles, got {count}")]
    TooManyArticles { count: usize, max: usize },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Signature verification failed: {0}")]
    Signature(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}
