//! The drawing interface a notation backend implements.
//!
//! The render pass only creates objects and wires them together through
//! this trait; engraving (glyph metrics, note spacing) belongs to the
//! backend.

use serde::{Deserialize, Serialize};

use crate::layout::ConnectorType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaveId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarlineType {
    /// Thin-thick final barline
    End,
}

/// Beats of a voice, as given by the measure's time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpec {
    pub num_beats: u32,
    pub beat_value: u32,
}

/// One stave note: a single pitch, a chord or a rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSpec {
    pub stave: StaveId,
    /// Pitch keys bottom-up as written, e.g. `["c/4", "e/4"]`
    pub keys: Vec<String>,
    /// Duration code, `r`-suffixed for rests
    pub duration: String,
    /// Clef the keys are read in
    pub clef: String,
    pub dots: u8,
    /// (key index, accidental code)
    pub accidentals: Vec<(usize, String)>,
    /// Small clef glyph drawn before the note on a mid-measure clef change
    pub inline_clef: Option<String>,
}

/// Notation drawing library.
pub trait Notation {
    fn set_view_box(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn stave(&mut self, x: f64, y: f64, width: f64) -> StaveId;
    fn add_clef(&mut self, stave: StaveId, clef: &str);
    fn add_key_signature(&mut self, stave: StaveId, key: &str);
    fn add_time_signature(&mut self, stave: StaveId, time: &str);
    fn set_end_bar_type(&mut self, stave: StaveId, barline: BarlineType);

    fn note(&mut self, spec: NoteSpec) -> NoteId;
    fn beam(&mut self, notes: &[NoteId]);
    fn connector(&mut self, top: StaveId, bottom: StaveId, kind: ConnectorType);

    fn voice(&mut self, time: TimeSpec, notes: &[NoteId]) -> VoiceId;
    /// Justify `voices` against the width of `stave`.
    fn format(&mut self, voices: &[VoiceId], stave: StaveId);

    fn draw(&mut self);
}
