//! Model → drawing-library vocabulary: clef, key, time, duration and
//! pitch names as the notation backend spells them.

use crate::model::*;

pub const DEFAULT_CLEF: &str = "treble";

/// Key used to place rests vertically.
pub const REST_KEY: &str = "b/4";

// ─── Clefs ───────────────────────────────────────────────────────────

/// Backend clef name for a `<clef>`; unknown sign/line pairs fall back
/// to treble.
pub fn clef_name(clef: &Clef) -> &'static str {
    match (clef.sign.as_str(), clef.line) {
        ("G", Some(2) | None) => "treble",
        ("G", Some(1)) => "french",
        ("F", Some(4) | None) => "bass",
        ("F", Some(3)) => "baritone-f",
        ("F", Some(5)) => "subbass",
        ("C", Some(1)) => "soprano",
        ("C", Some(2)) => "mezzo-soprano",
        ("C", Some(3) | None) => "alto",
        ("C", Some(4)) => "tenor",
        ("C", Some(5)) => "baritone-c",
        ("percussion", _) => "percussion",
        ("TAB", _) => "tab",
        _ => DEFAULT_CLEF,
    }
}

pub fn clef_name_or_default(clef: Option<&Clef>) -> &'static str {
    clef.map_or(DEFAULT_CLEF, clef_name)
}

// ─── Keys ────────────────────────────────────────────────────────────

// Indexed by fifths + 7
const MAJOR_KEYS: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_KEYS: [&str; 15] = [
    "Abm", "Ebm", "Bbm", "Fm", "Cm", "Gm", "Dm", "Am", "Em", "Bm", "F#m", "C#m", "G#m", "D#m", "A#m",
];

/// Key signature name, e.g. `"Eb"` or `"F#m"`. Fifths beyond ±7 are clamped.
pub fn key_name(key: &Key) -> &'static str {
    let index = (key.fifths.clamp(-7, 7) + 7) as usize;
    match key.mode {
        KeyMode::Major => MAJOR_KEYS[index],
        KeyMode::Minor => MINOR_KEYS[index],
    }
}

// ─── Time ────────────────────────────────────────────────────────────

pub fn time_name(time: &TimeSignature) -> String {
    match time.symbol.as_deref() {
        Some("common") if (time.beats, time.beat_type) == (4, 4) => "C".to_string(),
        Some("cut") if (time.beats, time.beat_type) == (2, 2) => "C|".to_string(),
        _ => format!("{}/{}", time.beats, time.beat_type),
    }
}

// ─── Durations ───────────────────────────────────────────────────────

pub fn note_type_code(note_type: NoteType) -> &'static str {
    match note_type {
        NoteType::Breve => "1/2",
        NoteType::Whole => "w",
        NoteType::Half => "h",
        NoteType::Quarter => "q",
        NoteType::Eighth => "8",
        NoteType::Sixteenth => "16",
        NoteType::ThirtySecond => "32",
        NoteType::SixtyFourth => "64",
    }
}

/// Duration code for a note without a `<type>`: the longest value that
/// fits in `duration` divisions, where a quarter is `divisions`.
fn code_from_duration(duration: u32, divisions: u32) -> &'static str {
    // (code, length in 64ths)
    const CODES: [(&str, u32); 7] = [
        ("w", 64),
        ("h", 32),
        ("q", 16),
        ("8", 8),
        ("16", 4),
        ("32", 2),
        ("64", 1),
    ];
    let sixty_fourths = duration.saturating_mul(16) / divisions.max(1);
    CODES
        .iter()
        .find(|&&(_, len)| len <= sixty_fourths)
        .map_or("64", |&(code, _)| code)
}

/// Duration code of a note, with an `r` suffix for rests.
pub fn duration_code(note: &Note, divisions: u32) -> String {
    let base = match (&note.content, note.note_type) {
        (NoteContent::Rest { whole_measure: true }, _) => "w",
        (_, Some(note_type)) => note_type_code(note_type),
        (_, None) => code_from_duration(note.duration, divisions),
    };
    if note.is_rest() {
        format!("{base}r")
    } else {
        base.to_string()
    }
}

// ─── Pitch ───────────────────────────────────────────────────────────

fn alter_suffix(alter: Option<f64>) -> &'static str {
    match alter.map(|a| a.round() as i32) {
        Some(2) => "##",
        Some(1) => "#",
        Some(-1) => "b",
        Some(-2) => "bb",
        _ => "",
    }
}

/// Key of a pitch, e.g. `"c#/4"`.
pub fn pitch_key(pitch: &Pitch) -> String {
    format!(
        "{}{}/{}",
        pitch.step.to_lowercase(),
        alter_suffix(pitch.alter),
        pitch.octave
    )
}

pub fn note_key(note: &Note) -> String {
    note.pitch().map_or_else(|| REST_KEY.to_string(), pitch_key)
}

pub fn accidental_code(accidental: Accidental) -> &'static str {
    match accidental {
        Accidental::Sharp => "#",
        Accidental::Flat => "b",
        Accidental::Natural => "n",
        Accidental::DoubleSharp => "##",
        Accidental::DoubleFlat => "bb",
    }
}
