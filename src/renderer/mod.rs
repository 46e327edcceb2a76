//! Score renderer — drives a notation backend from a parsed score and a
//! page layout.
//!
//! One stave is created per (part, staff) slot and displayed measure. Clef,
//! key and time signatures are added where the layout and the attribute
//! changes call for them, notes are grouped into voices and beams, and the
//! connectors of each line are placed last.

mod constants;
pub mod names;
mod ndl;
mod recorder;
mod svg;
mod svg_builder;

pub use ndl::*;
pub use recorder::*;
pub use svg::SvgNotation;

use std::collections::HashMap;

use crate::layout::{place_connectors, Decoration, Layout, LayoutConfig};
use crate::model::*;
use names::*;

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Render the measures of `layout` into `ndl`, ending with `draw()`.
///
/// Returns the created staves as `staves[slot][i]` for the i-th displayed
/// measure.
pub fn render<N: Notation>(score: &MusicXml, layout: &Layout, ndl: &mut N) -> Vec<Vec<StaveId>> {
    let (x, y, width, height) = layout.view_box();
    ndl.set_view_box(x, y, width, height);

    let slots = score.stave_slots();
    let staves: Vec<Vec<StaveId>> = slots
        .iter()
        .enumerate()
        .map(|(row, slot)| render_slot(ndl, score, layout, row, *slot))
        .collect();

    // ── Connectors ──
    // A layout built for a different stave count leaves rows without
    // staves; their decorations are skipped
    let stave_at = |row: usize, measure_index: usize| -> Option<StaveId> {
        let offset = measure_index.checked_sub(layout.range.start)?;
        staves.get(row)?.get(offset).copied()
    };
    for line in 0..layout.lines_per_page {
        for decoration in place_connectors(layout, &slots, line) {
            match decoration {
                Decoration::Connector(c) => {
                    if let (Some(top), Some(bottom)) =
                        (stave_at(c.top_stave, c.measure_index), stave_at(c.bottom_stave, c.measure_index))
                    {
                        ndl.connector(top, bottom, c.kind);
                    }
                }
                Decoration::EndBarline {
                    measure_index,
                    stave_index,
                } => {
                    if let Some(stave) = stave_at(stave_index, measure_index) {
                        ndl.set_end_bar_type(stave, BarlineType::End);
                    }
                }
            }
        }
    }

    ndl.draw();

    log::debug!(
        "rendered {} stave row(s) x {} measure(s) on {} line(s)",
        staves.len(),
        layout.range.len(),
        layout.lines_per_page
    );

    staves
}

/// Lay out every measure of `score` and render it.
pub fn render_score<N: Notation>(score: &MusicXml, config: &LayoutConfig, ndl: &mut N) -> Layout {
    let layout = Layout::for_score(config, score, None);
    render(score, &layout, ndl);
    layout
}

// ═══════════════════════════════════════════════════════════════════════
// Staves
// ═══════════════════════════════════════════════════════════════════════

fn render_slot<N: Notation>(
    ndl: &mut N,
    score: &MusicXml,
    layout: &Layout,
    row: usize,
    slot: StaveSlot,
) -> Vec<StaveId> {
    let part = &score.parts[slot.part_index];

    layout
        .points(row)
        .iter()
        .map(|point| {
            let stave = ndl.stave(point.x, point.y, layout.stave_width);
            // Parts shorter than the range get empty staves
            if let Some(measure) = part.measures.get(point.measure_index) {
                let previous = point
                    .measure_index
                    .checked_sub(1)
                    .and_then(|i| part.measures.get(i));
                render_measure(ndl, layout, measure, previous, point.measure_index, slot.staff, stave);
            }
            stave
        })
        .collect()
}

fn render_measure<N: Notation>(
    ndl: &mut N,
    layout: &Layout,
    measure: &Measure,
    previous: Option<&Measure>,
    measure_index: usize,
    staff: u32,
    stave: StaveId,
) {
    let first_in_line = layout.is_first_in_line(measure_index);
    let stave_clef = clef_name_or_default(measure.clef_for_staff(staff));

    // Clef: at each line start, and where the start clef departs from the
    // clef the previous measure ended with
    let clef_changed = previous.is_some_and(|prev| {
        clef_name_or_default(prev.attributes.clef_for_staff(staff)) != stave_clef
    });
    if first_in_line || clef_changed {
        ndl.add_clef(stave, stave_clef);
    }

    if first_in_line {
        if let Some(key) = measure.key() {
            ndl.add_key_signature(stave, key_name(key));
        }
    }

    if measure_index == layout.range.start || measure.changes.time {
        if let Some(time) = measure.time() {
            ndl.add_time_signature(stave, &time_name(time));
        }
    }

    let time = measure.time().map_or(
        TimeSpec {
            num_beats: 4,
            beat_value: 4,
        },
        |t| TimeSpec {
            num_beats: t.beats,
            beat_value: t.beat_type,
        },
    );

    let voices: Vec<VoiceId> = measure
        .voices_on_staff(staff)
        .into_iter()
        .filter_map(|voice| render_voice(ndl, measure, voice, staff, stave, stave_clef, time))
        .collect();

    if !voices.is_empty() {
        ndl.format(&voices, stave);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Notes
// ═══════════════════════════════════════════════════════════════════════

/// Emit the notes and beams of one (voice, staff) stream. Returns `None`
/// when the stream only holds grace notes.
fn render_voice<N: Notation>(
    ndl: &mut N,
    measure: &Measure,
    voice: u32,
    staff: u32,
    stave: StaveId,
    stave_clef: &str,
    time: TimeSpec,
) -> Option<VoiceId> {
    let divisions = measure.attributes.divisions;
    let mut specs: Vec<NoteSpec> = Vec::new();
    // Measure note index → position in `specs`
    let mut positions: HashMap<usize, usize> = HashMap::new();
    let mut shown_clef = stave_clef;

    for (index, note) in measure.notes_in(voice, staff) {
        if note.grace {
            continue;
        }

        // Chord members add a key to the note they sound with
        if note.chord {
            if let Some(head) = specs.last_mut() {
                if let Some(acc) = note.accidental {
                    head.accidentals.push((head.keys.len(), accidental_code(acc).to_string()));
                }
                head.keys.push(note_key(note));
                continue;
            }
        }

        let active = note
            .clef_override
            .as_ref()
            .map_or(stave_clef, |clef| clef_name(clef));
        let inline_clef = (active != shown_clef).then(|| active.to_string());
        shown_clef = active;

        let accidentals = note
            .accidental
            .map(|acc| vec![(0, accidental_code(acc).to_string())])
            .unwrap_or_default();

        positions.insert(index, specs.len());
        specs.push(NoteSpec {
            stave,
            keys: vec![note_key(note)],
            duration: duration_code(note, divisions),
            clef: (if note.is_rest() { DEFAULT_CLEF } else { active }).to_string(),
            dots: note.dots,
            accidentals,
            inline_clef,
        });
    }

    if specs.is_empty() {
        return None;
    }

    let ids: Vec<NoteId> = specs.into_iter().map(|spec| ndl.note(spec)).collect();

    for group in measure.beam_groups_in(voice, staff) {
        let beamed: Vec<NoteId> = group
            .indices()
            .filter_map(|i| positions.get(&i).map(|&p| ids[p]))
            .collect();
        if beamed.len() > 1 {
            ndl.beam(&beamed);
        }
    }

    Some(ndl.voice(time, &ids))
}
