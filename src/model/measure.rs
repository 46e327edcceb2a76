//! A single measure: attribute changes and notes reduced in document order.

use std::collections::BTreeSet;
use std::rc::Rc;

use roxmltree::Node;
use serde::{Deserialize, Serialize};

use super::attributes::*;
use super::note::Note;
use crate::beams::{BeamGroup, BeamGroups};
use crate::error::{Result, Warning};
use crate::parser::{parse_attributes, parse_note};
use crate::xml::XmlElement;

/// What a measure needs from its surroundings to be built.
#[derive(Debug, Clone)]
pub struct MeasureContext<'p> {
    /// Part id, for diagnostics
    pub part_id: &'p str,
    /// Global 1-based position of the measure within its part
    pub number: u32,
    /// Resolved attributes of the previous measure
    pub inherited: Rc<AttributeSet>,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// 1-based position within the part
    pub number: u32,
    /// The `number` attribute as written (may be "0" for a pickup, "X1", ...)
    pub label: Option<String>,
    /// Width in tenths, when the encoder provided one
    pub width: Option<f64>,
    /// Attribute state at the end of the measure. The same `Rc` as the
    /// previous measure's when nothing was declared.
    pub attributes: Rc<AttributeSet>,
    /// Clefs in effect at the start of the measure
    pub start_clefs: Rc<Vec<Clef>>,
    pub changes: AttributeChanges,
    pub notes: Vec<Note>,
    /// Distinct voice numbers, ascending
    pub voices: Vec<u32>,
}

impl Measure {
    /// Build a measure from a `<measure>` node.
    ///
    /// `<attributes>` children are merged over a running cursor that starts
    /// at `ctx.inherited`. Each `<note>` records the clef the cursor holds
    /// for its staff. Attributes that arrive before the first note define
    /// the start-of-measure state.
    pub fn parse(node: Node, ctx: &MeasureContext, diagnostics: &mut Vec<Warning>) -> Result<Measure> {
        let element = XmlElement::expect(node, "measure")?;

        let inherited = &ctx.inherited;
        let mut cursor = Rc::clone(inherited);
        let mut start = Rc::clone(inherited);
        // Clef in effect for each staff at the current position
        let mut active: Vec<Clef> = inherited.clefs.to_vec();
        let mut changes = AttributeChanges::default();
        let mut seen_note = false;
        let mut partial: Option<(usize, u32)> = None;

        let mut notes = Vec::new();
        // Clef in effect for each note, before start-state fallback
        let mut note_clefs: Vec<Option<Clef>> = Vec::new();

        for child in element.elements() {
            match child.name() {
                "attributes" => {
                    let decl = parse_attributes(&child);
                    if decl.is_empty() {
                        continue;
                    }
                    changes.absorb(&decl);
                    let declared = decl.clefs.clone();
                    let merged = Rc::new(decl.merge(&cursor));
                    if !declared.is_empty() {
                        // Only a fallback when every staff already had a clef
                        if declared.len() != merged.staves as usize && covers_staves(&active, merged.staves) {
                            partial = Some((declared.len(), merged.staves));
                        }
                        active = overlay_clefs(&active, &declared);
                    }
                    cursor = merged;
                    if !seen_note {
                        start = Rc::clone(&cursor);
                    }
                }
                "note" => {
                    let note = parse_note(&child);
                    note_clefs.push(find_clef(&active, note.staff).cloned());
                    notes.push(note);
                    seen_note = true;
                }
                _ => {}
            }
        }

        // MusicXML 2.0 encoders may declare only the clefs that change, and
        // anywhere in the stream.
        let start_clefs = if start.has_all_clefs() {
            Rc::clone(&start.clefs)
        } else if covers_staves(&inherited.clefs, start.staves) {
            Rc::clone(&inherited.clefs)
        } else if cursor.has_all_clefs() {
            Rc::clone(&cursor.clefs)
        } else {
            Rc::clone(&start.clefs)
        };

        if let Some((declared, staves)) = partial {
            report(
                Warning::AmbiguousAttributes {
                    part: ctx.part_id.to_string(),
                    measure: ctx.number,
                    declared,
                    staves,
                },
                diagnostics,
            );
        }

        let attributes = if Rc::ptr_eq(&cursor, inherited) || cursor.has_all_clefs() {
            cursor
        } else {
            let resolved = AttributeSet {
                clefs: Rc::new(active),
                ..(*cursor).clone()
            };
            Rc::new(resolved.with_missing_clefs_from(&start_clefs))
        };

        if !Rc::ptr_eq(&attributes, inherited) && !attributes.has_all_clefs() {
            let missing = (1..=attributes.staves)
                .filter(|&staff| attributes.clef_for_staff(staff).is_none())
                .collect();
            report(
                Warning::UnresolvedClefs {
                    part: ctx.part_id.to_string(),
                    measure: ctx.number,
                    missing,
                },
                diagnostics,
            );
        }

        for (note, note_clef) in notes.iter_mut().zip(note_clefs) {
            let start_clef = find_clef(&start_clefs, note.staff);
            let active = note_clef.or_else(|| start_clef.cloned());
            note.attach_clef(active, start_clef);
        }

        let voices = notes
            .iter()
            .map(|n| n.voice)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(Measure {
            number: ctx.number,
            label: element.attribute("number").map(String::from),
            width: element.attribute_num("width"),
            attributes,
            start_clefs,
            changes,
            notes,
            voices,
        })
    }

    pub fn staves(&self) -> u32 {
        self.attributes.staves
    }

    pub fn key(&self) -> Option<&Key> {
        self.attributes.key.as_deref()
    }

    pub fn time(&self) -> Option<&TimeSignature> {
        self.attributes.time.as_deref()
    }

    /// The time signature once per staff.
    pub fn all_times(&self) -> Vec<&TimeSignature> {
        match self.time() {
            Some(time) => vec![time; self.staves() as usize],
            None => Vec::new(),
        }
    }

    /// Clefs in effect at the end of the measure.
    pub fn clefs(&self) -> &[Clef] {
        &self.attributes.clefs
    }

    /// Clef in effect for `staff` at the start of the measure.
    pub fn clef_for_staff(&self, staff: u32) -> Option<&Clef> {
        find_clef(&self.start_clefs, staff)
    }

    pub fn notes_by_staff(&self, staff: u32) -> impl Iterator<Item = &Note> + '_ {
        self.notes.iter().filter(move |n| n.staff == staff)
    }

    pub fn notes_by_voice(&self, voice: u32) -> impl Iterator<Item = &Note> + '_ {
        self.notes.iter().filter(move |n| n.voice == voice)
    }

    /// Notes of one (voice, staff) stream with their index in `notes`.
    pub fn notes_in(&self, voice: u32, staff: u32) -> impl Iterator<Item = (usize, &Note)> + '_ {
        self.notes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.voice == voice && n.staff == staff)
    }

    /// Voices that have at least one note on `staff`, ascending.
    pub fn voices_on_staff(&self, staff: u32) -> Vec<u32> {
        self.voices
            .iter()
            .copied()
            .filter(|&v| self.notes_by_staff(staff).any(|n| n.voice == v))
            .collect()
    }

    /// Beam groups of one (voice, staff) stream.
    pub fn beam_groups_in(&self, voice: u32, staff: u32) -> BeamGroups<'_, impl Iterator<Item = (usize, &Note)> + '_> {
        BeamGroups::new(self.notes_in(voice, staff))
    }

    /// Beam groups of every voice on `staff`, voice by voice.
    pub fn beam_groups(&self, staff: u32) -> impl Iterator<Item = BeamGroup<'_>> + '_ {
        self.voices_on_staff(staff)
            .into_iter()
            .flat_map(move |voice| self.beam_groups_in(voice, staff))
    }
}

fn report(warning: Warning, diagnostics: &mut Vec<Warning>) {
    log::warn!("{warning}");
    diagnostics.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn parse_with(xml: &str, inherited: &Rc<AttributeSet>) -> (Measure, Vec<Warning>) {
        let doc = Document::parse(xml).unwrap();
        let ctx = MeasureContext {
            part_id: "P1",
            number: 2,
            inherited: Rc::clone(inherited),
        };
        let mut diagnostics = Vec::new();
        let measure = Measure::parse(doc.root_element(), &ctx, &mut diagnostics).unwrap();
        (measure, diagnostics)
    }

    fn grand_staff() -> Rc<AttributeSet> {
        let doc = Document::parse(
            r#"<attributes>
                <divisions>2</divisions>
                <time><beats>4</beats><beat-type>4</beat-type></time>
                <staves>2</staves>
                <clef number="1"><sign>G</sign><line>2</line></clef>
                <clef number="2"><sign>F</sign><line>4</line></clef>
            </attributes>"#,
        )
        .unwrap();
        let decl = parse_attributes(&XmlElement::new(doc.root_element()).unwrap());
        Rc::new(decl.merge(&AttributeSet::initial()))
    }

    const NOTE_S1: &str = "<note><pitch><step>C</step><octave>5</octave></pitch><duration>2</duration><voice>1</voice><staff>1</staff></note>";
    const NOTE_S2: &str = "<note><pitch><step>C</step><octave>3</octave></pitch><duration>2</duration><voice>5</voice><staff>2</staff></note>";

    #[test]
    fn measure_without_attributes_shares_inherited_set() {
        let inherited = grand_staff();
        let xml = format!("<measure number=\"2\">{NOTE_S1}{NOTE_S2}</measure>");
        let (measure, warnings) = parse_with(&xml, &inherited);

        assert!(Rc::ptr_eq(&measure.attributes, &inherited));
        assert!(Rc::ptr_eq(&measure.start_clefs, &inherited.clefs));
        assert!(!measure.changes.any());
        assert!(warnings.is_empty());
        assert_eq!(measure.voices, vec![1, 5]);
        assert_eq!(measure.voices_on_staff(2), vec![5]);
        assert_eq!(measure.label.as_deref(), Some("2"));
        assert!(measure.notes.iter().all(|n| n.clef_override.is_none()));
        assert_eq!(measure.notes[1].clef.as_ref().unwrap().sign, "F");
    }

    #[test]
    fn inline_clef_change_marks_following_notes() {
        let inherited = grand_staff();
        let xml = format!(
            "<measure number=\"2\">{NOTE_S2}<attributes><clef number=\"2\"><sign>G</sign><line>2</line></clef></attributes>{NOTE_S2}{NOTE_S1}</measure>"
        );
        let (measure, warnings) = parse_with(&xml, &inherited);

        // Partial declaration after the first note: start state is inherited
        assert!(Rc::ptr_eq(&measure.start_clefs, &inherited.clefs));
        assert_eq!(warnings.len(), 1);
        assert!(measure.notes[0].clef_override.is_none());
        let changed = measure.notes[1].clef_override.as_ref().unwrap();
        assert_eq!((changed.number, changed.sign.as_str()), (2, "G"));
        // Staff 1 falls back to the start clef
        assert!(measure.notes[2].clef_override.is_none());
        assert_eq!(measure.notes[2].clef.as_ref().unwrap().sign, "G");

        // Resolved set is complete again, with the new staff 2 clef
        assert!(measure.attributes.has_all_clefs());
        assert_eq!(measure.clefs()[1].sign, "G");
        assert!(measure.changes.is_clef_only());
    }

    #[test]
    fn partial_clefs_at_measure_start_fall_back_to_inherited() {
        let inherited = grand_staff();
        let xml = format!(
            "<measure number=\"2\"><attributes><clef number=\"2\"><sign>C</sign><line>3</line></clef></attributes>{NOTE_S2}{NOTE_S1}</measure>"
        );
        let (measure, warnings) = parse_with(&xml, &inherited);

        assert_eq!(
            warnings,
            vec![Warning::AmbiguousAttributes {
                part: "P1".to_string(),
                measure: 2,
                declared: 1,
                staves: 2,
            }]
        );
        assert_eq!(measure.clef_for_staff(2).unwrap().sign, "F");
        assert_eq!(measure.notes[0].clef_override.as_ref().unwrap().sign, "C");
        assert!(measure.notes[1].clef_override.is_none());
    }

    #[test]
    fn second_partial_change_keeps_the_first() {
        let inherited = grand_staff();
        let xml = format!(
            "<measure number=\"2\">{NOTE_S2}\
                <attributes><clef number=\"2\"><sign>G</sign><line>2</line></clef></attributes>{NOTE_S2}\
                <attributes><clef number=\"1\"><sign>F</sign><line>4</line></clef></attributes>{NOTE_S2}{NOTE_S1}\
            </measure>"
        );
        let (measure, warnings) = parse_with(&xml, &inherited);
        assert_eq!(warnings.len(), 1);

        let clefs: Vec<(u32, &str)> = measure
            .notes
            .iter()
            .map(|n| {
                let clef = n.clef.as_ref().unwrap();
                (n.staff, clef.sign.as_str())
            })
            .collect();
        assert_eq!(clefs, vec![(2, "F"), (2, "G"), (2, "G"), (1, "F")]);
        assert!(measure.notes[2].clef_override.is_some());

        let end: Vec<&str> = measure.clefs().iter().map(|c| c.sign.as_str()).collect();
        assert_eq!(end, vec!["F", "G"]);

        // The next measure starts from both changes
        let (next, _) = parse_with(&format!("<measure number=\"3\">{NOTE_S2}</measure>"), &measure.attributes);
        assert_eq!(next.clef_for_staff(2).unwrap().sign, "G");
        assert_eq!(next.clef_for_staff(1).unwrap().sign, "F");
    }

    #[test]
    fn missing_clefs_without_inheritance_are_unresolved() {
        let first = format!(
            "<measure number=\"1\"><attributes>\
                <staves>2</staves>\
                <clef number=\"1\"><sign>G</sign><line>2</line></clef>\
            </attributes>{NOTE_S1}</measure>"
        );
        let (measure, warnings) = parse_with(&first, &Rc::new(AttributeSet::initial()));

        assert_eq!(
            warnings,
            vec![Warning::UnresolvedClefs {
                part: "P1".to_string(),
                measure: 2,
                missing: vec![2],
            }]
        );
        assert_eq!(measure.clef_for_staff(1).unwrap().sign, "G");
        assert!(measure.clef_for_staff(2).is_none());
    }

    #[test]
    fn full_redeclaration_before_notes_sets_start_state() {
        let inherited = grand_staff();
        let xml = format!(
            "<measure number=\"2\"><attributes>\
                <clef number=\"1\"><sign>G</sign><line>2</line></clef>\
                <clef number=\"2\"><sign>G</sign><line>2</line></clef>\
            </attributes>{NOTE_S2}</measure>"
        );
        let (measure, warnings) = parse_with(&xml, &inherited);

        assert!(warnings.is_empty());
        assert!(!Rc::ptr_eq(&measure.attributes, &inherited));
        assert!(Rc::ptr_eq(&measure.start_clefs, &measure.attributes.clefs));
        assert_eq!(measure.clef_for_staff(2).unwrap().sign, "G");
        assert!(measure.notes[0].clef_override.is_none());
        // Time is still the inherited allocation
        assert!(Rc::ptr_eq(
            measure.attributes.time.as_ref().unwrap(),
            inherited.time.as_ref().unwrap()
        ));
        assert_eq!(measure.all_times().len(), 2);
    }

    #[test]
    fn rejects_other_elements() {
        let doc = Document::parse("<note/>").unwrap();
        let ctx = MeasureContext {
            part_id: "P1",
            number: 1,
            inherited: Rc::new(AttributeSet::initial()),
        };
        let result = Measure::parse(doc.root_element(), &ctx, &mut Vec::new());
        assert!(matches!(result, Err(crate::ScoreError::InvalidNode { .. })));
    }
}
