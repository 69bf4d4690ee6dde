//! Project-side plumbing: finding variable files under a root, loading them
//! into a [`VariableStore`](tmplf_vars::VariableStore) and locating where a
//! variable is defined.

mod definition;
mod discover;
mod error;
mod load;

pub use definition::find_definition;
pub use discover::discover_variable_files;
pub use discover::source_id_for;
pub use discover::VariableFileMatcher;
pub use error::WorkspaceError;
pub use load::load_variables;
pub use load::read_variable_file;
pub use load::Workspace;
