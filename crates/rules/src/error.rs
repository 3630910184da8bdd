//! Error type for rule-file parsing, lookup and editing.

/// Errors raised while operating on a loot filter document.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The requested tag pair does not address any rule. Usually means the
    /// base filter is incompatible or was edited by hand.
    #[error("rule not found: type_tag={type_tag}, tier_tag={tier_tag}")]
    RuleNotFound { type_tag: String, tier_tag: String },

    /// Caller supplied a malformed or out-of-range value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] dlf_core::CoreError),
}

impl FilterError {
    pub(crate) fn rule_not_found(type_tag: &str, tier_tag: &str) -> Self {
        FilterError::RuleNotFound {
            type_tag: type_tag.to_string(),
            tier_tag: tier_tag.to_string(),
        }
    }

    /// True for errors caused by bad caller input rather than bad data.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, FilterError::InvalidParameter(_))
    }
}

/// Result alias for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
