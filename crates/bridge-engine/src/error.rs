use thiserror::Error;

/// Why a discovery call ended without a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoConnectionReason {
    /// The depth budget was zero.
    NoBudget,
    /// The topic could not be resolved to an indexed article.
    EndpointNotFound(String),
    /// Every branch ran out of budget or candidates.
    Exhausted,
}

impl std::fmt::Display for NoConnectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoConnectionReason::NoBudget => f.write_str("depth budget is zero"),
            NoConnectionReason::EndpointNotFound(topic) => write!(f, "no article found for '{topic}'"),
            NoConnectionReason::Exhausted => f.write_str("search exhausted without a connecting article"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    InvalidInput(#[from] bridge_core::Error),

    #[error("no bridge found between '{from}' and '{to}': {reason}")]
    NoConnectionFound { from: String, to: String, reason: NoConnectionReason },

    #[error("discovery cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
