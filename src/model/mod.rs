//! Data model for a parsed MusicXML score.
//!
//! Parts own measures, measures own notes and share their resolved
//! attribute state with the following measure until it changes.

mod attributes;
mod measure;
mod note;
mod part;
mod score;

pub use attributes::*;
pub use measure::*;
pub use note::*;
pub use part::*;
pub use score::*;
