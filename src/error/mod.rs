use thiserror::Error;

/// Everything that can abort a crawl. None of these are retried.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// An expected element is missing from the page (layout drift or a non-listing page).
    #[error("page structure: {0}")]
    Structure(String),

    /// Text that should carry a number does not.
    #[error("bad {field} text {text:?}")]
    Format { field: &'static str, text: String },

    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    pub fn structure(what: impl Into<String>) -> Self {
        Self::Structure(what.into())
    }

    pub fn format(field: &'static str, text: impl Into<String>) -> Self {
        Self::Format {
            field,
            text: text.into(),
        }
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
