//! Error and diagnostic types.
//!
//! Structural problems abort the whole load with a [`ScoreError`]. Known
//! MusicXML ambiguities are resolved with a fallback and reported as a
//! [`Warning`] in the score's diagnostics instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoreError>;

/// Fatal errors while building the score model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// The input is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// The input bytes are not UTF-8.
    #[error("Invalid UTF-8 in MusicXML input: {0}")]
    InvalidUtf8(String),

    /// The document root is not `<score-partwise>`.
    #[error("Unsupported root element: '{0}'. Only 'score-partwise' is supported.")]
    UnsupportedRoot(String),

    /// A constructor received a node that is not the element it expects.
    #[error("Invalid node: expected <{expected}>, found {found}")]
    InvalidNode { expected: String, found: String },

    /// A measure has no time signature, even after inheritance.
    #[error("Measure {measure} of part '{part}' has no time signature")]
    MissingTimeSignature { part: String, measure: u32 },

    /// A layout configuration could not be read.
    #[error("Invalid layout config: {0}")]
    Config(String),
}

/// Recoverable problems, resolved by a documented fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Warning {
    /// A measure declared clefs for only some of its staves while every
    /// staff already had one. The inherited clefs are used as the
    /// start-of-measure state and the declared clefs replace only their own
    /// staves for the notes after them.
    #[error(
        "Measure {measure} of part '{part}' declares {declared} clef(s) for {staves} staves; \
         using inherited clefs at measure start"
    )]
    AmbiguousAttributes {
        part: String,
        measure: u32,
        declared: usize,
        staves: u32,
    },

    /// After resolution some staves still have no clef to inherit.
    #[error("Measure {measure} of part '{part}' has no clef for staves {missing:?}")]
    UnresolvedClefs {
        part: String,
        measure: u32,
        missing: Vec<u32>,
    },
}
