//! Pagination — places a range of measures on fixed-width lines.
//!
//! Every measure gets the same stave width. Lines are stacked as systems,
//! one stave per (part, staff) slot, with a fixed gap between systems.

mod config;
mod connectors;

pub use config::*;
pub use connectors::*;

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::MusicXml;

// ═══════════════════════════════════════════════════════════════════════
// Layout structures
// ═══════════════════════════════════════════════════════════════════════

/// Top-left corner of one stave instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
    /// Index of the measure within its part
    pub measure_index: usize,
    /// Row within the system, top to bottom
    pub stave_index: usize,
    /// Line (system) on the page
    pub system_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub config: LayoutConfig,
    /// Displayed measures, `start..stop`
    pub range: Range<usize>,
    pub total_staves: usize,
    pub measures_per_line: usize,
    pub lines_per_page: usize,
    pub stave_width: f64,
    pub system_space: f64,
    /// `points[stave][i]` for the i-th displayed measure
    points: Vec<Vec<LayoutPoint>>,
}

// ═══════════════════════════════════════════════════════════════════════
// Computation
// ═══════════════════════════════════════════════════════════════════════

impl Layout {
    /// Lay out measures `range` for a system of `total_staves` staves.
    pub fn compute(config: &LayoutConfig, total_staves: usize, range: Range<usize>) -> Layout {
        let count = range.len();
        let per_line = (config.page_width / config.min_stave_width).floor();
        // NaN and negative widths saturate to 0
        let measures_per_line = (per_line as usize).max(1);
        let stave_width = (config.page_width / measures_per_line as f64).round() - config.x_offset;
        let lines_per_page = count.div_ceil(measures_per_line);
        let system_space = config.system_space(total_staves);

        let points = (0..total_staves)
            .map(|stave| {
                (0..count)
                    .map(|i| {
                        let line = i / measures_per_line;
                        let column = i % measures_per_line;
                        LayoutPoint {
                            x: stave_width * column as f64 + config.x_offset,
                            y: line as f64 * system_space
                                + stave as f64 * config.stave_space
                                + config.y_offset,
                            measure_index: range.start + i,
                            stave_index: stave,
                            system_index: line,
                        }
                    })
                    .collect()
            })
            .collect();

        log::debug!(
            "layout: {} measure(s) x {} stave(s), {} per line, {} line(s), stave width {}",
            count,
            total_staves,
            measures_per_line,
            lines_per_page,
            stave_width
        );

        Layout {
            config: config.clone(),
            range,
            total_staves,
            measures_per_line,
            lines_per_page,
            stave_width,
            system_space,
            points,
        }
    }

    /// Lay out a parsed score. `range` defaults to every measure.
    pub fn for_score(config: &LayoutConfig, score: &MusicXml, range: Option<Range<usize>>) -> Layout {
        let range = range.unwrap_or(0..score.measure_count());
        Layout::compute(config, score.stave_count(), range)
    }

    // ─── Queries ────────────────────────────────────────────────────────

    /// Position of `stave` for the measure at `measure_index` (a part index,
    /// not an offset into the range).
    pub fn point(&self, stave: usize, measure_index: usize) -> Option<&LayoutPoint> {
        let offset = measure_index.checked_sub(self.range.start)?;
        self.points.get(stave)?.get(offset)
    }

    pub fn points(&self, stave: usize) -> &[LayoutPoint] {
        self.points.get(stave).map_or(&[], Vec::as_slice)
    }

    pub fn is_first_in_line(&self, measure_index: usize) -> bool {
        match measure_index.checked_sub(self.range.start) {
            Some(offset) => offset % self.measures_per_line == 0,
            None => false,
        }
    }

    pub fn is_last_measure(&self, measure_index: usize) -> bool {
        self.range.end > self.range.start && measure_index + 1 == self.range.end
    }

    pub fn line_of(&self, measure_index: usize) -> Option<usize> {
        if !self.range.contains(&measure_index) {
            return None;
        }
        Some((measure_index - self.range.start) / self.measures_per_line)
    }

    /// Measure indices shown on `line`.
    pub fn measures_in_line(&self, line: usize) -> Range<usize> {
        let start = self
            .range
            .start
            .saturating_add(line.saturating_mul(self.measures_per_line))
            .min(self.range.end);
        let end = start.saturating_add(self.measures_per_line).min(self.range.end);
        start..end
    }

    pub fn height(&self) -> f64 {
        self.system_space * self.lines_per_page as f64
    }

    /// `(x, y, width, height)` of the drawing surface.
    pub fn view_box(&self) -> (f64, f64, f64, f64) {
        (0.0, 0.0, self.config.page_width, self.height())
    }
}
