use camino::Utf8Path;
use camino::Utf8PathBuf;
use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::WalkBuilder;
use tmplf_conf::VariablesSettings;
use tmplf_vars::SourceId;

use crate::WorkspaceError;

/// Decides which files under a project root are variable files.
///
/// Globs are matched against root-relative, `/`-separated paths.
#[derive(Clone, Debug)]
pub struct VariableFileMatcher {
    include: GlobSet,
    ignore: GlobSet,
}

impl VariableFileMatcher {
    pub fn new(settings: &VariablesSettings) -> Result<Self, WorkspaceError> {
        let Some(file_glob) = extension_glob(&settings.extensions) else {
            return Ok(Self {
                include: GlobSet::empty(),
                ignore: GlobSet::empty(),
            });
        };

        let folders = normalized_folders(&settings.source_folders);
        let include = if folders.is_empty() {
            build_set([format!("**/{file_glob}")])?
        } else {
            build_set(
                folders
                    .iter()
                    .map(|folder| format!("{folder}/**/{file_glob}")),
            )?
        };

        let ignore = build_set(
            normalized_folders(&settings.ignored_folders)
                .iter()
                .flat_map(|folder| [folder.clone(), format!("{folder}/**")]),
        )?;

        Ok(Self { include, ignore })
    }

    #[must_use]
    pub fn is_variable_file(&self, relative: &str) -> bool {
        self.include.is_match(relative) && !self.ignore.is_match(relative)
    }

    #[must_use]
    pub fn is_ignored(&self, relative: &str) -> bool {
        self.ignore.is_match(relative)
    }

    /// Whether discovery under `root` yields `path`: it must lie under
    /// `root`, have no hidden component, match the folder globs, and not be
    /// excluded by a `.gitignore` or `.ignore` file between `root` and it.
    ///
    /// The file itself does not have to exist.
    #[must_use]
    pub fn accepts(&self, root: &Utf8Path, path: &Utf8Path) -> bool {
        let Some(relative) = relative_slash_path(root, path) else {
            return false;
        };
        if relative.is_empty() || relative.split('/').any(|part| part.starts_with('.')) {
            return false;
        }
        self.is_variable_file(&relative) && !ignored_by_files(root, path)
    }
}

/// Walk `root` and collect every variable file, honoring `.gitignore` and
/// skipping hidden directories.
///
/// Returns a sorted, deduplicated list of paths under `root`.
pub fn discover_variable_files(
    root: &Utf8Path,
    settings: &VariablesSettings,
) -> Result<Vec<Utf8PathBuf>, WorkspaceError> {
    let matcher = VariableFileMatcher::new(settings)?;

    let prune = matcher.clone();
    let walk_root = root.to_owned();
    let mut builder = WalkBuilder::new(root.as_std_path());
    builder
        .standard_filters(true)
        .hidden(true)
        .parents(false)
        .require_git(false)
        .git_global(false)
        .git_exclude(false)
        .filter_entry(move |entry| {
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                return false;
            };
            match relative_slash_path(&walk_root, path) {
                Some(relative) if !relative.is_empty() => !prune.is_ignored(&relative),
                _ => true,
            }
        });

    let mut files = Vec::new();
    for entry in builder.build().filter_map(Result::ok) {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if matcher.accepts(root, path) {
            files.push(path.to_owned());
        }
    }

    files.sort();
    files.dedup();

    tracing::debug!(root = %root, files = files.len(), "discovered variable files");
    Ok(files)
}

/// Identifier for a variable file: its path relative to `root` with `/`
/// separators, or the full path when it lies outside `root`.
#[must_use]
pub fn source_id_for(root: &Utf8Path, path: &Utf8Path) -> SourceId {
    match relative_slash_path(root, path) {
        Some(relative) => SourceId::from(relative),
        None => SourceId::from(path.as_str()),
    }
}

fn relative_slash_path(root: &Utf8Path, path: &Utf8Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(
        relative
            .components()
            .map(|component| component.as_str())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// Ignore files are consulted from the file's directory up to `root`; the
/// deepest decisive match wins and `.ignore` outranks `.gitignore`.
fn ignored_by_files(root: &Utf8Path, path: &Utf8Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };

    for dir in parent.ancestors() {
        if !dir.starts_with(root) {
            break;
        }
        for name in [".ignore", ".gitignore"] {
            let file = dir.join(name);
            if !file.is_file() {
                continue;
            }
            let (matcher, err) = Gitignore::new(&file);
            if let Some(err) = err {
                tracing::debug!(file = %file, error = %err, "skipping invalid ignore patterns");
            }
            let matched = matcher.matched_path_or_any_parents(path, false);
            if matched.is_ignore() {
                return true;
            }
            if matched.is_whitelist() {
                return false;
            }
        }
    }

    false
}

fn extension_glob(extensions: &[String]) -> Option<String> {
    let extensions: Vec<&str> = extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .collect();

    match extensions.as_slice() {
        [] => None,
        [single] => Some(format!("*.{single}")),
        many => Some(format!("*.{{{}}}", many.join(","))),
    }
}

fn normalized_folders(folders: &[String]) -> Vec<String> {
    folders
        .iter()
        .map(|folder| {
            folder
                .trim()
                .replace('\\', "/")
                .trim_start_matches("./")
                .trim_matches('/')
                .to_string()
        })
        .filter(|folder| !folder.is_empty())
        .collect()
}

fn build_set(globs: impl IntoIterator<Item = String>) -> Result<GlobSet, WorkspaceError> {
    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        let compiled = Glob::new(&glob).map_err(|source| WorkspaceError::Glob {
            glob: glob.clone(),
            source,
        })?;
        builder.add(compiled);
    }
    builder.build().map_err(|source| WorkspaceError::Glob {
        glob: String::new(),
        source,
    })
}
