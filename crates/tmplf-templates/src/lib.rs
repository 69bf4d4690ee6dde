//! Template placeholder scanning.
//!
//! The scanner finds `{{ path | filters }}` expressions and
//! `{% for x in path %}` tags in arbitrary text and resolves each path
//! against a [`VariableStore`](tmplf_vars::VariableStore):
//!
//! 1. **Tokenizing**: [`next_loop`] and [`next_variable`] are stateless; they
//!    take a text and an offset and return the next token plus the offset
//!    to resume from.
//! 2. **Resolving**: [`parse_text_for_templates`] resolves loop iterables
//!    first, binding each loop variable in a private corpus copy, then
//!    resolves every variable expression and splits its filters into a
//!    `default(...)` value and unhandled expressions.
//! 3. **Classifying**: [`classify`] ranks placeholders by how many sources
//!    define them and flags names listed as [`ExternalVariables`].
//!
//! Malformed tokens are skipped and unresolved paths simply have no
//! matches; scanning never fails.

mod classify;
mod error;
mod filters;
mod placeholder;
mod scanner;
mod tokens;

pub use classify::classify;
pub use classify::Annotation;
pub use classify::ExternalVariables;
pub use classify::MatchStatus;
pub use error::TemplateError;
pub use filters::Filters;
pub use placeholder::Placeholder;
pub use placeholder::PlaceholderKind;
pub use scanner::parse_text_for_templates;
pub use tokens::loop_tokens;
pub use tokens::next_loop;
pub use tokens::next_variable;
pub use tokens::variable_tokens;
pub use tokens::LoopToken;
pub use tokens::LoopTokens;
pub use tokens::VariableToken;
pub use tokens::VariableTokens;
