use thiserror::Error;

#[derive(Debug, Error)]
pub enum VariablesError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
