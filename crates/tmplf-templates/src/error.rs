use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid external variable pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
