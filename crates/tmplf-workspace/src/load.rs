use camino::Utf8Path;
use camino::Utf8PathBuf;
use tmplf_conf::VariablesSettings;
use tmplf_vars::load_document;
use tmplf_vars::SourceId;
use tmplf_vars::Value;
use tmplf_vars::VariableStore;

use crate::discover::source_id_for;
use crate::discover::VariableFileMatcher;
use crate::discover_variable_files;
use crate::WorkspaceError;

/// Read and parse one variable file.
///
/// Unreadable files are errors; unparsable ones load as [`Value::Null`].
pub fn read_variable_file(
    root: &Utf8Path,
    path: &Utf8Path,
) -> Result<(SourceId, Value), WorkspaceError> {
    let source = std::fs::read_to_string(path).map_err(|source| WorkspaceError::Io {
        path: path.to_owned(),
        source,
    })?;
    let id = source_id_for(root, path);
    let document = load_document(&source, id.as_str());
    Ok((id, document))
}

/// Load `files` in parallel into a store keyed by root-relative source ids.
///
/// The store keeps the order of `files`. A file that cannot be read is
/// logged and stored as [`Value::Null`] so it still shows up as a source.
#[must_use]
pub fn load_variables(root: &Utf8Path, files: &[Utf8PathBuf]) -> VariableStore {
    let (tx, rx) = std::sync::mpsc::channel();

    rayon::scope(|scope| {
        for (index, path) in files.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let entry = read_variable_file(root, path).unwrap_or_else(|err| {
                    tracing::warn!(error = %err, "failed to load variable file");
                    (source_id_for(root, path), Value::Null)
                });
                let _ = tx.send((index, entry));
            });
        }
    });
    drop(tx);

    let mut loaded: Vec<(usize, (SourceId, Value))> = rx.into_iter().collect();
    loaded.sort_by_key(|(index, _)| *index);

    let store: VariableStore = loaded.into_iter().map(|(_, entry)| entry).collect();
    tracing::debug!(root = %root, sources = store.len(), "loaded variable files");
    store
}

/// A project root together with its discovered and loaded variable files.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: Utf8PathBuf,
    matcher: VariableFileMatcher,
    files: Vec<Utf8PathBuf>,
    store: VariableStore,
}

impl Workspace {
    pub fn load(root: &Utf8Path, settings: &VariablesSettings) -> Result<Self, WorkspaceError> {
        let matcher = VariableFileMatcher::new(settings)?;
        let files = discover_variable_files(root, settings)?;
        let store = load_variables(root, &files);

        Ok(Self {
            root: root.to_owned(),
            matcher,
            files,
            store,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub fn files(&self) -> &[Utf8PathBuf] {
        &self.files
    }

    #[must_use]
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Absolute path of a loaded source.
    #[must_use]
    pub fn path_of(&self, source: &SourceId) -> Option<&Utf8Path> {
        self.files
            .iter()
            .find(|path| source_id_for(&self.root, path) == *source)
            .map(Utf8PathBuf::as_path)
    }

    /// Bring one file's entry up to date after it was created, changed or
    /// deleted. Paths that discovery would skip are ignored, so the store
    /// stays what a fresh [`Workspace::load`] would build.
    ///
    /// Returns whether the store changed.
    pub fn refresh(&mut self, path: &Utf8Path) -> bool {
        if !self.matcher.accepts(&self.root, path) {
            return false;
        }
        let id = source_id_for(&self.root, path);

        if path.is_file() {
            let document = match read_variable_file(&self.root, path) {
                Ok((_, document)) => document,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to reload variable file");
                    Value::Null
                }
            };
            if !self.files.iter().any(|file| file == path) {
                self.files.push(path.to_owned());
                self.files.sort();
            }
            self.store.insert(id, document);
            true
        } else {
            self.files.retain(|file| file != path);
            self.store.remove(id.as_str()).is_some()
        }
    }
}
