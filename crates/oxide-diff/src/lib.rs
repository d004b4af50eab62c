//! Schema extraction and output for the `oxide-diff` command.
//!
//! Turns a [`Source`](source::Source) (a live MySQL database or a JSON
//! snapshot) into an [`oxide_diff_core::schema::Schema`] and writes the
//! comparison results produced by `oxide-diff-core`.

pub mod error;
pub mod extract;
pub mod output;
pub mod source;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ExtractError, Result};
    pub use crate::extract::{extract, load_schema, MySqlExtractor};
    pub use crate::output::Format;
    pub use crate::source::Source;
}
