//! Rule errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid replica query rule \"{rule}\": {reason}")]
    InvalidRuleConfiguration { rule: String, reason: String },

    #[error("{0}")]
    Balancer(#[from] crate::balancer::Error),

    #[error("{0}")]
    Config(#[from] crate::config::Error),
}

impl Error {
    pub(crate) fn invalid(rule: &str, reason: impl ToString) -> Self {
        Self::InvalidRuleConfiguration {
            rule: rule.into(),
            reason: reason.to_string(),
        }
    }

    /// Rule configuration was rejected.
    pub fn is_invalid_rule(&self) -> bool {
        matches!(self, Self::InvalidRuleConfiguration { .. })
    }

    /// Rule configuration names a load balancer type nobody registered.
    pub fn is_unknown_algorithm(&self) -> bool {
        matches!(
            self,
            Self::Balancer(crate::balancer::Error::UnknownAlgorithmType(..))
        )
    }
}
