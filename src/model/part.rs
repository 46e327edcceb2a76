//! A musical part (one instrument) and its staff queries.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::measure::Measure;

/// A musical part (one instrument or voice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name (e.g., "Piano")
    pub name: String,
    /// Abbreviated name (e.g., "Pno.")
    pub abbreviation: Option<String>,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
}

impl Part {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            abbreviation: None,
            measures: Vec::new(),
        }
    }

    /// Largest staff count declared in any measure.
    pub fn staff_count(&self) -> u32 {
        self.measures
            .iter()
            .map(Measure::staves)
            .max()
            .unwrap_or(1)
    }

    /// Staff numbers of this part, `1..=staff_count`.
    pub fn all_staves(&self) -> RangeInclusive<u32> {
        1..=self.staff_count()
    }

    /// Measures that declare a key signature themselves.
    pub fn measures_with_keys(&self) -> impl Iterator<Item = &Measure> + '_ {
        self.measures.iter().filter(|m| m.changes.key)
    }

    /// Measures whose only declared change is a clef.
    pub fn measures_with_clef_changes(&self) -> impl Iterator<Item = &Measure> + '_ {
        self.measures.iter().filter(|m| m.changes.is_clef_only())
    }
}
