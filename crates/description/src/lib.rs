//! # Vocab Description
//!
//! Builds the per-language view of a resource description.
//!
//! ```text
//! ResourceDescription
//!     │
//!     ├──> LanguageAssembler
//!     │      ├─ lexicalizations: merge objects per language, rank predicates
//!     │      └─ notes: skos:definition only
//!     │
//!     ├──> has_no_content (every partition empty?)
//!     │
//!     └──> language_flags (data languages + disabled placeholders)
//! ```

mod assembler;
mod content;
mod error;
mod flags;
mod rank;

pub use assembler::{assemble, LanguageAssembler, LanguageEntry, LanguageView};
pub use content::has_no_content;
pub use error::{DescriptionError, Result};
pub use flags::{language_flags, LanguageFlag};
pub use rank::{predicate_rank, LexicalizationModel};
