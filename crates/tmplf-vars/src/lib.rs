//! Variable corpus model and path resolution.
//!
//! Variable files are parsed into [`Value`] trees and kept in a
//! [`VariableStore`] keyed by [`SourceId`]. Scans never see the store
//! itself: they work on a [`Corpus`] snapshot so that loop aliasing can
//! write into it freely.
//!
//! Lookups go through [`resolve`], which walks a dotted path and fans out
//! over sequences, and the two search helpers built on top of it:
//! [`find_in_corpus`] for the variable sources and [`find_in_document`]
//! for the document being scanned.

mod document;
mod error;
mod resolve;
mod store;
mod value;

pub use document::load_document;
pub use document::parse_document;
pub use error::VariablesError;
pub use resolve::find_in_corpus;
pub use resolve::find_in_document;
pub use resolve::resolve;
pub use store::Corpus;
pub use store::SourceId;
pub use store::VariableStore;
pub use value::Value;
