//! A [`Notation`] backend that engraves into a standalone SVG document.
//!
//! Engraving is deliberately plain: notes of a voice are spread evenly
//! across the stave, clefs and accidentals use Unicode music glyphs.

use super::constants::*;
use super::ndl::*;
use super::svg_builder::SvgBuilder;
use crate::layout::ConnectorType;

#[derive(Debug, Clone)]
struct StaveState {
    x: f64,
    y: f64,
    width: f64,
    clef: Option<String>,
    key: Option<String>,
    time: Option<String>,
    end_bar: Option<BarlineType>,
}

impl StaveState {
    fn top(&self) -> f64 {
        self.y + STAFF_TOP_PADDING
    }

    fn bottom(&self) -> f64 {
        self.top() + STAFF_HEIGHT
    }

    /// Width taken by clef, key and time before the first note.
    fn prefix_width(&self) -> f64 {
        let mut width = 0.0;
        if self.clef.is_some() {
            width += CLEF_SPACE;
        }
        if self.key.is_some() {
            width += KEY_SIG_SPACE;
        }
        if self.time.is_some() {
            width += TIME_SIG_SPACE;
        }
        width
    }
}

#[derive(Debug, Clone)]
struct PlacedNote {
    spec: NoteSpec,
    /// Set by `format`
    x: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SvgNotation {
    view_box: (f64, f64, f64, f64),
    staves: Vec<StaveState>,
    notes: Vec<PlacedNote>,
    beams: Vec<Vec<NoteId>>,
    connectors: Vec<(StaveId, StaveId, ConnectorType)>,
    voices: Vec<Vec<NoteId>>,
    svg: Option<String>,
}

impl SvgNotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document produced by the last `draw()`.
    pub fn svg(&self) -> Option<&str> {
        self.svg.as_deref()
    }

    pub fn into_svg(self) -> Option<String> {
        self.svg
    }

    fn stave_state(&self, id: StaveId) -> Option<&StaveState> {
        self.staves.get(id.0)
    }

    fn stave_mut(&mut self, id: StaveId) -> Option<&mut StaveState> {
        self.staves.get_mut(id.0)
    }

    // ─── Engraving ──────────────────────────────────────────────────────

    fn draw_stave(svg: &mut SvgBuilder, stave: &StaveState) {
        let right = stave.x + stave.width;
        for i in 0..5 {
            let y = stave.top() + i as f64 * STAFF_LINE_SPACING;
            svg.line(stave.x, y, right, y, STAFF_COLOR, STAFF_LINE_WIDTH);
        }

        let (top, bottom) = (stave.top(), stave.bottom());
        match stave.end_bar {
            Some(BarlineType::End) => {
                let thin = right - DOUBLE_BARLINE_GAP - THICK_BARLINE_WIDTH;
                let thick = right - THICK_BARLINE_WIDTH / 2.0;
                svg.line(thin, top, thin, bottom, BARLINE_COLOR, BARLINE_WIDTH);
                svg.line(thick, top, thick, bottom, BARLINE_COLOR, THICK_BARLINE_WIDTH);
            }
            None => svg.line(right, top, right, bottom, BARLINE_COLOR, BARLINE_WIDTH),
        }

        let mut x = stave.x + 4.0;
        if let Some(clef) = &stave.clef {
            svg.text(x, stave.bottom() - 2.0, clef_glyph(clef), 40.0, "start");
            x += CLEF_SPACE;
        }
        if let Some(key) = &stave.key {
            svg.text(x, stave.top() - 4.0, key, 11.0, "start");
            x += KEY_SIG_SPACE;
        }
        if let Some(time) = &stave.time {
            match time.split_once('/') {
                Some((beats, beat_type)) => {
                    svg.text(x + 8.0, stave.top() + 18.0, beats, 20.0, "middle");
                    svg.text(x + 8.0, stave.top() + 38.0, beat_type, 20.0, "middle");
                }
                None => svg.text(x + 8.0, stave.top() + 28.0, time, 24.0, "middle"),
            }
        }
    }

    fn draw_note(svg: &mut SvgBuilder, stave: &StaveState, note: &PlacedNote) {
        let Some(x) = note.x else {
            return;
        };
        let spec = &note.spec;

        if let Some(clef) = &spec.inline_clef {
            svg.text(x - INLINE_CLEF_OFFSET, stave.bottom() - 6.0, clef_glyph(clef), 26.0, "end");
        }

        if spec.duration.ends_with('r') {
            let y = stave.top() + STAFF_HEIGHT / 2.0;
            svg.text(x, y + 8.0, rest_glyph(&spec.duration), 28.0, "middle");
            return;
        }

        let filled = !matches!(spec.duration.as_str(), "w" | "h" | "1/2");
        let ys: Vec<f64> = spec.keys.iter().map(|k| key_y(k, &spec.clef, stave.top())).collect();
        for (i, &y) in ys.iter().enumerate() {
            svg.notehead(x, y, filled);
            if let Some((_, acc)) = spec.accidentals.iter().find(|(k, _)| *k == i) {
                svg.text(x - NOTEHEAD_RX - 3.0, y + 5.0, accidental_glyph(acc), 16.0, "end");
            }
            for d in 0..spec.dots {
                svg.circle(x + NOTEHEAD_RX + 4.0 + d as f64 * 5.0, y, DOT_RADIUS);
            }
        }

        if !matches!(spec.duration.as_str(), "w" | "1/2") {
            let top = ys.iter().copied().fold(f64::INFINITY, f64::min);
            let bottom = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let stem_x = x + NOTEHEAD_RX - STEM_WIDTH / 2.0;
            svg.line(stem_x, bottom, stem_x, top - STEM_LENGTH, NOTE_COLOR, STEM_WIDTH);
        }
    }

    /// Top of the stem of a drawn note.
    fn stem_top(&self, id: NoteId) -> Option<(f64, f64)> {
        let note = self.notes.get(id.0)?;
        let stave = self.stave_state(note.spec.stave)?;
        let x = note.x?;
        let top = note
            .spec
            .keys
            .iter()
            .map(|k| key_y(k, &note.spec.clef, stave.top()))
            .fold(f64::INFINITY, f64::min);
        Some((x + NOTEHEAD_RX - STEM_WIDTH / 2.0, top - STEM_LENGTH))
    }

    fn draw_connector(svg: &mut SvgBuilder, top: &StaveState, bottom: &StaveState, kind: ConnectorType) {
        let (y1, y2) = (top.top(), bottom.bottom());
        match kind {
            ConnectorType::SingleLeft => svg.line(top.x, y1, top.x, y2, BARLINE_COLOR, BARLINE_WIDTH),
            ConnectorType::SingleRight => {
                let x = top.x + top.width;
                svg.line(x, y1, x, y2, BARLINE_COLOR, BARLINE_WIDTH);
            }
            ConnectorType::BoldDoubleRight => {
                let right = top.x + top.width;
                let thin = right - DOUBLE_BARLINE_GAP - THICK_BARLINE_WIDTH;
                let thick = right - THICK_BARLINE_WIDTH / 2.0;
                svg.line(thin, y1, thin, y2, BARLINE_COLOR, BARLINE_WIDTH);
                svg.line(thick, y1, thick, y2, BARLINE_COLOR, THICK_BARLINE_WIDTH);
            }
            ConnectorType::Brace => {
                let x = top.x - BRACE_OFFSET;
                let mid = (y1 + y2) / 2.0;
                let d = format!(
                    "M{:.1},{:.1} Q{:.1},{:.1} {:.1},{:.1} Q{:.1},{:.1} {:.1},{:.1}",
                    x + 6.0, y1, x - 4.0, (y1 + mid) / 2.0, x - 6.0, mid,
                    x - 4.0, (mid + y2) / 2.0, x + 6.0, y2
                );
                svg.path(&d, 2.0);
            }
        }
    }
}

impl Notation for SvgNotation {
    fn set_view_box(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.view_box = (x, y, width, height);
    }

    fn stave(&mut self, x: f64, y: f64, width: f64) -> StaveId {
        self.staves.push(StaveState {
            x,
            y,
            width,
            clef: None,
            key: None,
            time: None,
            end_bar: None,
        });
        StaveId(self.staves.len() - 1)
    }

    fn add_clef(&mut self, stave: StaveId, clef: &str) {
        if let Some(s) = self.stave_mut(stave) {
            s.clef = Some(clef.to_string());
        }
    }

    fn add_key_signature(&mut self, stave: StaveId, key: &str) {
        if let Some(s) = self.stave_mut(stave) {
            s.key = Some(key.to_string());
        }
    }

    fn add_time_signature(&mut self, stave: StaveId, time: &str) {
        if let Some(s) = self.stave_mut(stave) {
            s.time = Some(time.to_string());
        }
    }

    fn set_end_bar_type(&mut self, stave: StaveId, barline: BarlineType) {
        if let Some(s) = self.stave_mut(stave) {
            s.end_bar = Some(barline);
        }
    }

    fn note(&mut self, spec: NoteSpec) -> NoteId {
        self.notes.push(PlacedNote { spec, x: None });
        NoteId(self.notes.len() - 1)
    }

    fn beam(&mut self, notes: &[NoteId]) {
        self.beams.push(notes.to_vec());
    }

    fn connector(&mut self, top: StaveId, bottom: StaveId, kind: ConnectorType) {
        self.connectors.push((top, bottom, kind));
    }

    fn voice(&mut self, _time: TimeSpec, notes: &[NoteId]) -> VoiceId {
        self.voices.push(notes.to_vec());
        VoiceId(self.voices.len() - 1)
    }

    fn format(&mut self, voices: &[VoiceId], stave: StaveId) {
        let Some(state) = self.stave_state(stave) else {
            return;
        };
        let start = state.x + state.prefix_width() + NOTE_PADDING;
        let end = state.x + state.width - NOTE_PADDING;

        for voice in voices {
            let Some(ids) = self.voices.get(voice.0) else {
                continue;
            };
            let step = (end - start) / ids.len().max(1) as f64;
            for (i, id) in ids.iter().enumerate() {
                if let Some(note) = self.notes.get_mut(id.0) {
                    note.x = Some(start + step * i as f64 + NOTEHEAD_RX);
                }
            }
        }
    }

    fn draw(&mut self) {
        let mut svg = SvgBuilder::new(self.view_box);

        for stave in &self.staves {
            Self::draw_stave(&mut svg, stave);
        }
        for &(top, bottom, kind) in &self.connectors {
            if let (Some(t), Some(b)) = (self.stave_state(top), self.stave_state(bottom)) {
                Self::draw_connector(&mut svg, t, b, kind);
            }
        }
        for note in &self.notes {
            if let Some(stave) = self.stave_state(note.spec.stave) {
                Self::draw_note(&mut svg, stave, note);
            }
        }
        for beam in &self.beams {
            let ends = beam.first().zip(beam.last());
            if let Some(((x1, y1), (x2, y2))) =
                ends.and_then(|(first, last)| self.stem_top(*first).zip(self.stem_top(*last)))
            {
                svg.beam_line(x1, y1, x2, y2);
            }
        }

        self.svg = Some(svg.build());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Glyphs and pitch placement
// ═══════════════════════════════════════════════════════════════════════

fn clef_glyph(clef: &str) -> &'static str {
    match clef {
        "bass" | "baritone-f" | "subbass" => "\u{1D122}",
        "alto" | "tenor" | "soprano" | "mezzo-soprano" | "baritone-c" => "\u{1D121}",
        "percussion" => "\u{1D125}",
        _ => "\u{1D11E}",
    }
}

fn rest_glyph(duration: &str) -> &'static str {
    match duration.trim_end_matches('r') {
        "w" | "1/2" => "\u{1D13B}",
        "h" => "\u{1D13C}",
        "q" => "\u{1D13D}",
        "8" => "\u{1D13E}",
        _ => "\u{1D13F}",
    }
}

fn accidental_glyph(code: &str) -> &'static str {
    match code {
        "#" => "\u{266F}",
        "b" => "\u{266D}",
        "##" => "\u{1D12A}",
        "bb" => "\u{1D12B}",
        _ => "\u{266E}",
    }
}

/// Diatonic step number of the bottom staff line for a clef.
fn bottom_line_step(clef: &str) -> i32 {
    match clef {
        "bass" => 2 * 7 + 4,  // G2
        "alto" => 3 * 7 + 3,  // F3
        "tenor" => 3 * 7 + 1, // D3
        _ => 4 * 7 + 2,       // E4
    }
}

/// Vertical position of a key like `"f#/5"` on a stave whose top line is
/// at `top`.
fn key_y(key: &str, clef: &str, top: f64) -> f64 {
    let (name, octave) = key.split_once('/').unwrap_or((key, "4"));
    let step = match name.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('c') => 0,
        Some('d') => 1,
        Some('e') => 2,
        Some('f') => 3,
        Some('g') => 4,
        Some('a') => 5,
        Some('b') => 6,
        _ => 6,
    };
    let octave: i32 = octave.trim().parse().unwrap_or(4);
    let offset = octave * 7 + step - bottom_line_step(clef);
    top + STAFF_HEIGHT - offset as f64 * STAFF_LINE_SPACING / 2.0
}
