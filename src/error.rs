use thiserror::Error;

/// Failures talking to (or refusing to talk to) the upstream statistics API.
///
/// `UnknownSeries` is raised before any network call; individual bad samples
/// in an otherwise valid response are filtered, never surfaced here.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("unknown series '{slug}': not in the catalog")]
    UnknownSeries { slug: String },

    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed upstream response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("FRED_API_KEY is not set")]
    MissingApiKey,
}

impl UpstreamError {
    /// Transport failures and 5xx responses are worth retrying; everything
    /// else is deterministic.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            UpstreamError::Transport(_) | UpstreamError::Status { status: 500..=599, .. }
        )
    }
}

/// Panel configuration mistakes, caught by `PanelSpec::validate` before any
/// fetch or record processing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("panel has no role named '{0}' to use as base")]
    MissingBaseRole(String),

    #[error("duplicate role name '{0}'")]
    DuplicateRole(String),

    #[error("role '{role}' references unknown series '{slug}'")]
    UnknownSeries { role: String, slug: String },

    #[error("derived field '{field}' references unknown role '{role}'")]
    UnknownRole { field: String, role: String },

    #[error("derived field '{field}' has a zero window")]
    ZeroWindow { field: String },

    #[error("join tolerance must be non-negative, got {0} days")]
    NegativeTolerance(i64),

    #[error("decimation factor must be at least 1")]
    BadDecimation,
}

/// Top-level failure of one pipeline run. Any single fetch failure aborts
/// the whole multi-series request; no partial results escape.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("fetch failed for role '{role}': {source}")]
    Fetch {
        role: String,
        #[source]
        source: UpstreamError,
    },
}
