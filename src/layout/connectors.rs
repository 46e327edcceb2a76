//! Stave connectors and end barlines for one line of a page.

use serde::{Deserialize, Serialize};

use super::Layout;
use crate::model::StaveSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    SingleLeft,
    SingleRight,
    Brace,
    BoldDoubleRight,
}

/// A connector between two vertically adjacent staves of one measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub kind: ConnectorType,
    pub measure_index: usize,
    pub top_stave: usize,
    pub bottom_stave: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoration {
    Connector(Connector),
    /// A final barline on a stave no bold connector reaches
    EndBarline { measure_index: usize, stave_index: usize },
}

/// Decorations for `line` of `layout`, given the system's stave slots
/// (one per layout stave, top to bottom).
pub fn place_connectors(layout: &Layout, slots: &[StaveSlot], line: usize) -> Vec<Decoration> {
    let mut out = Vec::new();

    for measure_index in layout.measures_in_line(line) {
        let first = layout.is_first_in_line(measure_index);
        let last = layout.is_last_measure(measure_index);
        let mut bold = vec![false; slots.len()];

        for (top, pair) in slots.windows(2).enumerate() {
            let bottom = top + 1;
            let same_part = pair[0].part_index == pair[1].part_index;
            let mut connect = |kind| {
                out.push(Decoration::Connector(Connector {
                    kind,
                    measure_index,
                    top_stave: top,
                    bottom_stave: bottom,
                }))
            };

            if same_part {
                connect(ConnectorType::SingleRight);
            }
            if first {
                connect(ConnectorType::SingleLeft);
                if same_part {
                    connect(ConnectorType::Brace);
                }
            }
            if last && same_part {
                connect(ConnectorType::BoldDoubleRight);
                bold[top] = true;
                bold[bottom] = true;
            }
        }

        if last {
            out.extend(
                bold.iter()
                    .enumerate()
                    .filter(|&(_, &covered)| !covered)
                    .map(|(stave_index, _)| Decoration::EndBarline {
                        measure_index,
                        stave_index,
                    }),
            );
        }
    }

    out
}
