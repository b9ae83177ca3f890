use std::path::PathBuf;
use thiserror::Error;

/// Failure to derive a field from a single product card
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// A field that every record must carry was not found in the card
    #[error("missing required field `{field}`")]
    MissingRequiredField { field: &'static str },

    /// A field was found but its content could not be turned into a value
    #[error("cannot parse `{field}` from {value:?}: {reason}")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ExtractError {
    pub(crate) fn parse(
        field: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::Parse {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Malformed pagination block on the first listing page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("pagination block has {found} item(s), expected at least 2")]
    TooFewItems { found: usize },

    #[error("pagination item {text:?} is not a page count")]
    NotAPageCount { text: String },
}

/// Transport failure reported by a page fetcher
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("GET {url} failed: {reason}")]
pub struct FetchError {
    pub url: String,
    /// HTTP status, when the server answered at all
    pub status: Option<u16>,
    pub reason: String,
    /// Whether retrying the same request may succeed
    pub transient: bool,
}

impl FetchError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: None,
            reason: reason.into(),
            transient: false,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }
}

/// Errors surfaced by a catalog run
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("page {page}, product #{index}: {source}")]
    Node {
        page: u32,
        index: usize,
        #[source]
        source: ExtractError,
    },

    #[error("pagination: {0}")]
    Pagination(#[from] PaginationError),

    #[error("page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: FetchError,
    },

    #[error("existing dataset {} is unreadable: {reason}", path.display())]
    SinkRead { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid selector for {role} ({selector:?}): {reason}")]
    InvalidSelector {
        role: &'static str,
        selector: String,
        reason: String,
    },

    #[error("invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("fetch task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl CatalogError {
    /// Short name of the error kind, as reported to the user
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Node { source, .. } => match source {
                ExtractError::MissingRequiredField { .. } => "MissingRequiredFieldError",
                ExtractError::Parse { .. } => "ParseError",
            },
            CatalogError::Pagination(_) => "PaginationParseError",
            CatalogError::Fetch { .. } => "FetchError",
            CatalogError::SinkRead { .. } => "SinkReadError",
            CatalogError::Config(_)
            | CatalogError::InvalidSelector { .. }
            | CatalogError::InvalidUrl(_) => "ConfigError",
            CatalogError::Io(_) | CatalogError::Csv(_) => "SinkWriteError",
            CatalogError::Worker(_) => "WorkerError",
        }
    }

    /// Page the error is tied to, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            CatalogError::Node { page, .. } | CatalogError::Fetch { page, .. } => Some(*page),
            CatalogError::Pagination(_) => Some(1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let missing = CatalogError::Node {
            page: 2,
            index: 5,
            source: ExtractError::MissingRequiredField { field: "title" },
        };
        assert_eq!(missing.kind(), "MissingRequiredFieldError");
        assert_eq!(missing.page(), Some(2));
        assert_eq!(
            missing.to_string(),
            "page 2, product #5: missing required field `title`"
        );

        let parse = CatalogError::Node {
            page: 1,
            index: 0,
            source: ExtractError::parse("price", "abc", "invalid float literal"),
        };
        assert_eq!(parse.kind(), "ParseError");

        let pagination = CatalogError::from(PaginationError::TooFewItems { found: 1 });
        assert_eq!(pagination.kind(), "PaginationParseError");
        assert_eq!(pagination.page(), Some(1));

        let fetch = CatalogError::Fetch {
            page: 3,
            source: FetchError::new("https://jam.ua/ua/effect_pedals?list=3", "connection refused"),
        };
        assert_eq!(fetch.kind(), "FetchError");
        assert!(fetch.to_string().contains("list=3"));

        let sink = CatalogError::SinkRead {
            path: PathBuf::from("pedals.csv"),
            reason: "header mismatch".to_string(),
        };
        assert_eq!(sink.kind(), "SinkReadError");
        assert_eq!(sink.page(), None);
    }
}
