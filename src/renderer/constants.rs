//! Engraving constants for the SVG backend (all in SVG user units).

// ── Staff dimensions ────────────────────────────────────────────────
pub(super) const STAFF_LINE_SPACING: f64 = 10.0; // distance between staff lines
pub(super) const STAFF_HEIGHT: f64 = 40.0; // 5 lines, 4 spaces
pub(super) const STAFF_TOP_PADDING: f64 = 40.0; // stave y to top line

// ── Prefix widths ───────────────────────────────────────────────────
pub(super) const CLEF_SPACE: f64 = 32.0;
pub(super) const KEY_SIG_SPACE: f64 = 30.0;
pub(super) const TIME_SIG_SPACE: f64 = 24.0;
pub(super) const NOTE_PADDING: f64 = 12.0; // before the first and after the last note

// ── Note dimensions ─────────────────────────────────────────────────
pub(super) const NOTEHEAD_RX: f64 = 5.5;
pub(super) const NOTEHEAD_RY: f64 = 4.0;
pub(super) const STEM_LENGTH: f64 = 30.0;
pub(super) const STEM_WIDTH: f64 = 1.2;
pub(super) const BEAM_THICKNESS: f64 = 4.0;
pub(super) const DOT_RADIUS: f64 = 1.6;
pub(super) const INLINE_CLEF_OFFSET: f64 = 14.0;

// ── Lines ───────────────────────────────────────────────────────────
pub(super) const STAFF_LINE_WIDTH: f64 = 0.8;
pub(super) const BARLINE_WIDTH: f64 = 1.0;
pub(super) const THICK_BARLINE_WIDTH: f64 = 4.0;
pub(super) const DOUBLE_BARLINE_GAP: f64 = 4.0;
pub(super) const BRACE_OFFSET: f64 = 12.0;

// ── Colors ──────────────────────────────────────────────────────────
pub(super) const NOTE_COLOR: &str = "#1a1a1a";
pub(super) const STAFF_COLOR: &str = "#555555";
pub(super) const BARLINE_COLOR: &str = "#333333";
