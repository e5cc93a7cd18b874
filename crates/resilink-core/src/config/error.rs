/// A configuration value that violates a resilience invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be {requirement} (got {value})")]
    Invalid {
        field: String,
        requirement: &'static str,
        value: String,
    },
    #[error("integration name must not be empty")]
    EmptyIntegrationName,
}

impl ConfigError {
    pub(crate) fn invalid(
        field: impl Into<String>,
        requirement: &'static str,
        value: impl ToString,
    ) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            requirement,
            value: value.to_string(),
        }
    }
}
