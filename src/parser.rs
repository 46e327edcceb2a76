//! MusicXML parser — converts MusicXML XML into the score model.
//!
//! The `parse_*` functions below read raw declarations out of single
//! elements. Carrying state from one measure to the next happens in
//! [`Measure::parse`], which this module drives part by part.

use std::rc::Rc;

use roxmltree::Document;

use crate::error::{Result, ScoreError, Warning};
use crate::model::*;
use crate::xml::XmlElement;

/// Parse a MusicXML XML string into a score.
pub fn parse_musicxml(xml: &str) -> Result<MusicXml> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| ScoreError::Xml(e.to_string()))?;
    let root = XmlElement::new(doc.root_element())?;

    // Verify this is a score-partwise document
    if root.name() != "score-partwise" {
        return Err(ScoreError::UnsupportedRoot(root.name().to_string()));
    }

    let mut score = MusicXml::new();
    score.version = root.attribute("version").map(String::from);

    let mut declared: Vec<Part> = Vec::new();

    for child in root.elements() {
        match child.name() {
            "work" => parse_work(&child, &mut score),
            "movement-title" => {
                if score.title.is_none() {
                    score.title = child.text().map(String::from);
                }
            }
            "identification" => parse_identification(&child, &mut score),
            "part-list" => declared = parse_part_list(&child),
            "part" => {
                let id = child.attribute("id").unwrap_or("");
                let part = match declared.iter().position(|p| p.id == id) {
                    Some(pos) => declared.remove(pos),
                    None => Part::new(id),
                };
                let part = parse_part(&child, part, &mut score.diagnostics)?;
                score.parts.push(part);
            }
            _ => {}
        }
    }

    log::debug!(
        "parsed score with {} part(s), {} measure(s), {} warning(s)",
        score.parts.len(),
        score.measure_count(),
        score.diagnostics.len()
    );

    Ok(score)
}

/// Parse MusicXML from raw UTF-8 bytes.
pub fn parse_bytes(data: &[u8]) -> Result<MusicXml> {
    let xml = std::str::from_utf8(data).map_err(|e| ScoreError::InvalidUtf8(e.to_string()))?;
    parse_musicxml(xml)
}

// ─── Work ────────────────────────────────────────────────────────────

fn parse_work(node: &XmlElement, score: &mut MusicXml) {
    // <work-title> wins over <movement-title>
    if let Some(title) = node.child_text("work-title") {
        score.title = Some(title.to_string());
    }
}

// ─── Identification ──────────────────────────────────────────────────

fn parse_identification(node: &XmlElement, score: &mut MusicXml) {
    for creator in node.children_named("creator") {
        if creator.attribute("type") == Some("composer") {
            score.composer = creator.text().map(String::from);
        }
    }
}

// ─── Part List ───────────────────────────────────────────────────────

fn parse_part_list(node: &XmlElement) -> Vec<Part> {
    node.children_named("score-part")
        .map(|sp| {
            let mut part = Part::new(sp.attribute("id").unwrap_or(""));
            part.name = sp.child_text("part-name").unwrap_or("").to_string();
            part.abbreviation = sp.child_text("part-abbreviation").map(String::from);
            part
        })
        .collect()
}

// ─── Part (measures) ─────────────────────────────────────────────────

/// Fill `part` with the measures of a `<part>` element, carrying the
/// resolved attributes of each measure into the next one.
pub fn parse_part(node: &XmlElement, mut part: Part, diagnostics: &mut Vec<Warning>) -> Result<Part> {
    let mut inherited = Rc::new(AttributeSet::initial());

    for (i, child) in node.children_named("measure").enumerate() {
        let ctx = MeasureContext {
            part_id: &part.id,
            number: i as u32 + 1,
            inherited: Rc::clone(&inherited),
        };
        let measure = Measure::parse(child.node(), &ctx, diagnostics)?;

        if measure.attributes.time.is_none() {
            return Err(ScoreError::MissingTimeSignature {
                part: part.id.clone(),
                measure: measure.number,
            });
        }

        inherited = Rc::clone(&measure.attributes);
        part.measures.push(measure);
    }

    log::debug!("part '{}': {} measure(s)", part.id, part.measures.len());
    Ok(part)
}

// ─── Attributes ──────────────────────────────────────────────────────

pub fn parse_attributes(node: &XmlElement) -> AttributeDeclaration {
    let mut decl = AttributeDeclaration::default();

    for child in node.elements() {
        match child.name() {
            "divisions" => decl.divisions = child.num(),
            "key" => decl.key = parse_key(&child),
            "time" => decl.time = parse_time(&child),
            "staves" => decl.staves = child.num(),
            "clef" => decl.clefs.push(parse_clef(&child)),
            _ => {}
        }
    }

    decl
}

/// Traditional keys only; keys without `<fifths>` are ignored.
pub fn parse_key(node: &XmlElement) -> Option<Key> {
    let fifths = node.child_num::<i32>("fifths")?;
    let mode = node
        .child_text("mode")
        .map(KeyMode::from_text)
        .unwrap_or_default();
    Some(Key { fifths, mode })
}

/// Returns `None` for `<senza-misura>` and other beat-less times.
pub fn parse_time(node: &XmlElement) -> Option<TimeSignature> {
    let beats_text = node.child_text("beats")?;
    // Composite numerators ("3+2") add up
    let beats = beats_text
        .split('+')
        .map(|b| b.trim().parse::<u32>().ok())
        .sum::<Option<u32>>()
        .unwrap_or(4);
    let beat_type = node.child_num("beat-type").unwrap_or(4);
    Some(TimeSignature {
        beats,
        beat_type,
        symbol: node.attribute("symbol").map(String::from),
    })
}

pub fn parse_clef(node: &XmlElement) -> Clef {
    Clef {
        number: node.attribute_num("number").unwrap_or(1),
        sign: node.child_text("sign").unwrap_or("G").to_string(),
        line: node.child_num("line"),
        octave_change: node.child_num("clef-octave-change"),
    }
}

// ─── Note ────────────────────────────────────────────────────────────

pub fn parse_note(node: &XmlElement) -> Note {
    let mut note = Note {
        content: NoteContent::Rest {
            whole_measure: false,
        },
        duration: 0,
        note_type: None,
        dots: 0,
        voice: 1,
        staff: 1,
        chord: false,
        grace: false,
        beam: BeamState::None,
        accidental: None,
        clef: None,
        clef_override: None,
    };
    let mut beam_seen = false;

    for child in node.elements() {
        match child.name() {
            "pitch" => note.content = NoteContent::Pitched(parse_pitch(&child)),
            "unpitched" => {
                note.content = NoteContent::Pitched(Pitch {
                    step: child.child_text("display-step").unwrap_or("B").to_string(),
                    octave: child.child_num("display-octave").unwrap_or(4),
                    alter: None,
                });
            }
            "rest" => {
                note.content = NoteContent::Rest {
                    whole_measure: child.attribute("measure") == Some("yes"),
                };
            }
            "duration" => note.duration = child.num().unwrap_or(0),
            "voice" => note.voice = child.num().unwrap_or(1),
            "staff" => note.staff = child.num().unwrap_or(1),
            "type" => note.note_type = child.text().and_then(NoteType::from_text),
            "dot" => note.dots = note.dots.saturating_add(1),
            "chord" => note.chord = true,
            "grace" => note.grace = true,
            "accidental" => note.accidental = child.text().and_then(Accidental::from_text),
            "beam" => {
                // Only the primary beam level groups notes
                let number = child.attribute_num::<u32>("number").unwrap_or(1);
                if number == 1 && !beam_seen {
                    note.beam = child.text().map(BeamState::from_text).unwrap_or_default();
                    beam_seen = true;
                }
            }
            _ => {}
        }
    }

    note
}

pub fn parse_pitch(node: &XmlElement) -> Pitch {
    Pitch {
        step: node.child_text("step").unwrap_or("C").to_string(),
        octave: node.child_num("octave").unwrap_or(4),
        alter: node.child_num("alter"),
    }
}
