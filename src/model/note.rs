//! A single note, rest or chord member.

use serde::{Deserialize, Serialize};

use super::attributes::Clef;

/// Pitch of a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    /// Note name: A, B, C, D, E, F, G
    pub step: String,
    /// Octave number (middle C = C4)
    pub octave: i32,
    /// Chromatic alteration: -1.0 = flat, 1.0 = sharp, 0.0 = natural
    pub alter: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteContent {
    Pitched(Pitch),
    /// `whole_measure` is set for `<rest measure="yes"/>`.
    Rest { whole_measure: bool },
}

/// Graphic note type from `<type>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Breve,
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

impl NoteType {
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text.trim() {
            "breve" => NoteType::Breve,
            "whole" => NoteType::Whole,
            "half" => NoteType::Half,
            "quarter" => NoteType::Quarter,
            "eighth" => NoteType::Eighth,
            "16th" => NoteType::Sixteenth,
            "32nd" => NoteType::ThirtySecond,
            "64th" => NoteType::SixtyFourth,
            _ => return None,
        })
    }
}

/// Primary-level beam marker. Hooks and missing markers are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamState {
    #[default]
    None,
    Begin,
    Continue,
    End,
}

impl BeamState {
    pub fn from_text(text: &str) -> Self {
        match text.trim() {
            "begin" => BeamState::Begin,
            "continue" => BeamState::Continue,
            "end" => BeamState::End,
            _ => BeamState::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accidental {
    Sharp,
    Flat,
    Natural,
    DoubleSharp,
    DoubleFlat,
}

impl Accidental {
    pub fn from_text(text: &str) -> Option<Self> {
        Some(match text.trim() {
            "sharp" => Accidental::Sharp,
            "flat" => Accidental::Flat,
            "natural" => Accidental::Natural,
            "double-sharp" | "sharp-sharp" => Accidental::DoubleSharp,
            "flat-flat" | "double-flat" => Accidental::DoubleFlat,
            _ => return None,
        })
    }
}

/// A single note or rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub content: NoteContent,
    /// Duration in divisions
    pub duration: u32,
    pub note_type: Option<NoteType>,
    pub dots: u8,
    /// Voice number (for multi-voice writing)
    pub voice: u32,
    /// Staff number (1-based; for multi-staff parts like piano)
    pub staff: u32,
    /// Sounds together with the previous non-chord note of the same voice
    pub chord: bool,
    pub grace: bool,
    pub beam: BeamState,
    pub accidental: Option<Accidental>,
    /// Clef in effect for this note's staff at its position in the measure
    pub clef: Option<Clef>,
    /// Set when `clef` differs from the measure's start clef for the staff
    pub clef_override: Option<Clef>,
}

impl Note {
    pub fn is_rest(&self) -> bool {
        matches!(self.content, NoteContent::Rest { .. })
    }

    pub fn pitch(&self) -> Option<&Pitch> {
        match &self.content {
            NoteContent::Pitched(pitch) => Some(pitch),
            NoteContent::Rest { .. } => None,
        }
    }

    pub fn is_beamed(&self) -> bool {
        self.beam != BeamState::None
    }

    pub fn is_last_beam_note(&self) -> bool {
        self.beam == BeamState::End
    }

    /// Record the active clef and whether it departs from `start_clef`.
    pub fn attach_clef(&mut self, active: Option<Clef>, start_clef: Option<&Clef>) {
        self.clef_override = match (&active, start_clef) {
            (Some(a), Some(s)) if a != s => Some(a.clone()),
            (Some(a), None) => Some(a.clone()),
            _ => None,
        };
        self.clef = active;
    }
}
