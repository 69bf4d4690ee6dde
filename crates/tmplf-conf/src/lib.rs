use camino::Utf8Path;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Invalid external variable pattern `{pattern}`")]
    InvalidExternalPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Where variable files are looked for.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct VariablesSettings {
    /// Folders (relative to the project root) that hold variable files.
    /// Empty means the whole project.
    pub source_folders: Vec<String>,
    /// Folders whose files are never loaded.
    pub ignored_folders: Vec<String>,
    /// File extensions treated as variable files.
    pub extensions: Vec<String>,
}

impl Default for VariablesSettings {
    fn default() -> Self {
        Self {
            source_folders: Vec::new(),
            ignored_folders: Vec::new(),
            extensions: vec!["yml".to_string(), "yaml".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    pub variables: VariablesSettings,
    /// Regular expressions for variable names supplied from outside the
    /// variable files.
    pub external_variables: Vec<String>,
}

impl Settings {
    pub fn new(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "tmplf", "tmplf")
            .and_then(|proj_dirs| {
                Utf8Path::from_path(proj_dirs.config_dir()).map(|dir| dir.join("tmplf.toml"))
            });

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&Utf8Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(
                File::with_name(path.as_str())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            File::with_name(project_root.join(".tmplf.toml").as_str())
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::with_name(project_root.join("tmplf.toml").as_str())
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        tracing::debug!(
            source_folders = ?settings.variables.source_folders,
            ignored_folders = ?settings.variables.ignored_folders,
            external_variables = settings.external_variables.len(),
            "loaded settings"
        );

        Ok(settings)
    }

    /// Every external variable pattern must compile; a bad one is reported
    /// now rather than when scanning.
    fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.external_variables {
            regex::Regex::new(pattern).map_err(|source| ConfigError::InvalidExternalPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
