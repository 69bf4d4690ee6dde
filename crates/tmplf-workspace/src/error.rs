use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("invalid variable file glob `{glob}`")]
    Glob {
        glob: String,
        #[source]
        source: globset::Error,
    },
    #[error("failed to read {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
