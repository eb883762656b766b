use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Invalid product code: code must not be empty")]
    InvalidCode,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Catalog returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to parse catalog response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures inside the analysis pipeline. These never reach the caller of
/// `AnalysisRequester`; they are logged and replaced by fallback content.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No API key configured for the text generation service")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Text generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode completion response: {0}")]
    Decode(String),

    #[error("Text generation service returned an empty completion")]
    EmptyCompletion,
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Camera permission denied. Grant access to the scanner input and try again")]
    PermissionDenied,

    #[error("Scanner device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
