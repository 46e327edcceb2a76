//! The whole score: parts plus score-wide staff queries.

use serde::{Deserialize, Serialize};

use super::part::Part;
use crate::error::Warning;

/// A complete score parsed from a partwise MusicXML document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicXml {
    /// MusicXML version (e.g., "3.1", "4.0")
    pub version: Option<String>,
    /// Title of the piece
    pub title: Option<String>,
    /// Composer name
    pub composer: Option<String>,
    /// Musical parts (instruments)
    pub parts: Vec<Part>,
    /// Ambiguities resolved while parsing
    pub diagnostics: Vec<Warning>,
}

/// One row of a system: a staff of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaveSlot {
    pub part_index: usize,
    /// 1-based staff number within the part
    pub staff: u32,
}

impl MusicXml {
    /// Create a new empty score.
    pub fn new() -> Self {
        Self {
            version: None,
            title: None,
            composer: None,
            parts: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Number of measures, taken from the first part.
    pub fn measure_count(&self) -> usize {
        self.parts.first().map_or(0, |p| p.measures.len())
    }

    /// Staves in one system: the sum of every part's staff count.
    pub fn stave_count(&self) -> usize {
        self.parts.iter().map(|p| p.staff_count() as usize).sum()
    }

    /// Every (part, staff) row of a system, top to bottom.
    pub fn stave_slots(&self) -> Vec<StaveSlot> {
        self.parts
            .iter()
            .enumerate()
            .flat_map(|(part_index, part)| {
                part.all_staves().map(move |staff| StaveSlot { part_index, staff })
            })
            .collect()
    }
}

impl Default for MusicXml {
    fn default() -> Self {
        Self::new()
    }
}
