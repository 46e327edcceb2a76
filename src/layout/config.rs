//! Layout configuration (all in drawing-surface user units).

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};

// ── Page ────────────────────────────────────────────────────────────
pub const DEFAULT_PAGE_WIDTH: f64 = 1000.0;
pub const MIN_STAVE_WIDTH: f64 = 250.0;

// ── Stave placement ─────────────────────────────────────────────────
pub const STAVE_SPACE: f64 = 100.0; // vertical distance between staves of a system
pub const STAVE_X_OFFSET: f64 = 20.0;
pub const STAVE_Y_OFFSET: f64 = 20.0;
pub const SYSTEM_MARGIN: f64 = 50.0; // extra space below each system

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of the drawing surface
    pub page_width: f64,
    /// Narrowest stave that still fits a measure
    pub min_stave_width: f64,
    pub stave_space: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    /// Gap between the last stave of a system and the next system
    pub system_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH,
            min_stave_width: MIN_STAVE_WIDTH,
            stave_space: STAVE_SPACE,
            x_offset: STAVE_X_OFFSET,
            y_offset: STAVE_Y_OFFSET,
            system_margin: SYSTEM_MARGIN,
        }
    }
}

impl LayoutConfig {
    pub fn with_page_width(page_width: f64) -> Self {
        Self {
            page_width,
            ..Self::default()
        }
    }

    /// Read a config from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ScoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Systems must not overlap: spacing has to be positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.system_margin > 0.0) {
            return Err(ScoreError::Config(format!(
                "system_margin must be positive, got {}",
                self.system_margin
            )));
        }
        if !(self.stave_space > 0.0) {
            return Err(ScoreError::Config(format!(
                "stave_space must be positive, got {}",
                self.stave_space
            )));
        }
        Ok(())
    }

    /// Vertical distance between two systems holding `total_staves` staves.
    pub fn system_space(&self, total_staves: usize) -> f64 {
        self.stave_space * total_staves as f64 + self.system_margin
    }
}
