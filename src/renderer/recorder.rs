//! A [`Notation`] backend that records every call.

use serde::{Deserialize, Serialize};

use super::ndl::*;
use crate::layout::ConnectorType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum NdlCall {
    SetViewBox { x: f64, y: f64, width: f64, height: f64 },
    Stave { id: StaveId, x: f64, y: f64, width: f64 },
    AddClef { stave: StaveId, clef: String },
    AddKeySignature { stave: StaveId, key: String },
    AddTimeSignature { stave: StaveId, time: String },
    SetEndBarType { stave: StaveId, barline: BarlineType },
    Note { id: NoteId, spec: NoteSpec },
    Beam { notes: Vec<NoteId> },
    Connector { top: StaveId, bottom: StaveId, kind: ConnectorType },
    Voice { id: VoiceId, time: TimeSpec, notes: Vec<NoteId> },
    Format { voices: Vec<VoiceId>, stave: StaveId },
    Draw,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recorder {
    calls: Vec<NdlCall>,
    staves: usize,
    notes: usize,
    voices: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[NdlCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<NdlCall> {
        self.calls
    }

    pub fn stave_count(&self) -> usize {
        self.staves
    }

    /// The recorded spec of note `id`.
    pub fn note_spec(&self, id: NoteId) -> Option<&NoteSpec> {
        self.calls.iter().find_map(|call| match call {
            NdlCall::Note { id: note, spec } if *note == id => Some(spec),
            _ => None,
        })
    }

    /// Calls that touch `stave` directly.
    pub fn stave_calls(&self, stave: StaveId) -> impl Iterator<Item = &NdlCall> + '_ {
        self.calls.iter().filter(move |call| match call {
            NdlCall::Stave { id, .. } => *id == stave,
            NdlCall::AddClef { stave: s, .. }
            | NdlCall::AddKeySignature { stave: s, .. }
            | NdlCall::AddTimeSignature { stave: s, .. }
            | NdlCall::SetEndBarType { stave: s, .. }
            | NdlCall::Format { stave: s, .. } => *s == stave,
            NdlCall::Note { spec, .. } => spec.stave == stave,
            _ => false,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.calls)
    }
}

impl Notation for Recorder {
    fn set_view_box(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.calls.push(NdlCall::SetViewBox { x, y, width, height });
    }

    fn stave(&mut self, x: f64, y: f64, width: f64) -> StaveId {
        let id = StaveId(self.staves);
        self.staves += 1;
        self.calls.push(NdlCall::Stave { id, x, y, width });
        id
    }

    fn add_clef(&mut self, stave: StaveId, clef: &str) {
        self.calls.push(NdlCall::AddClef {
            stave,
            clef: clef.to_string(),
        });
    }

    fn add_key_signature(&mut self, stave: StaveId, key: &str) {
        self.calls.push(NdlCall::AddKeySignature {
            stave,
            key: key.to_string(),
        });
    }

    fn add_time_signature(&mut self, stave: StaveId, time: &str) {
        self.calls.push(NdlCall::AddTimeSignature {
            stave,
            time: time.to_string(),
        });
    }

    fn set_end_bar_type(&mut self, stave: StaveId, barline: BarlineType) {
        self.calls.push(NdlCall::SetEndBarType { stave, barline });
    }

    fn note(&mut self, spec: NoteSpec) -> NoteId {
        let id = NoteId(self.notes);
        self.notes += 1;
        self.calls.push(NdlCall::Note { id, spec });
        id
    }

    fn beam(&mut self, notes: &[NoteId]) {
        self.calls.push(NdlCall::Beam {
            notes: notes.to_vec(),
        });
    }

    fn connector(&mut self, top: StaveId, bottom: StaveId, kind: ConnectorType) {
        self.calls.push(NdlCall::Connector { top, bottom, kind });
    }

    fn voice(&mut self, time: TimeSpec, notes: &[NoteId]) -> VoiceId {
        let id = VoiceId(self.voices);
        self.voices += 1;
        self.calls.push(NdlCall::Voice {
            id,
            time,
            notes: notes.to_vec(),
        });
        id
    }

    fn format(&mut self, voices: &[VoiceId], stave: StaveId) {
        self.calls.push(NdlCall::Format {
            voices: voices.to_vec(),
            stave,
        });
    }

    fn draw(&mut self) {
        self.calls.push(NdlCall::Draw);
    }
}
