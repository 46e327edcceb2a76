//! Integration tests — parse the sample files in tests/fixtures/.

use std::path::PathBuf;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use scoregrid::{
    parse_bytes, parse_musicxml, score_to_json, Accidental, BeamState, KeyMode, MusicXml, NoteContent,
    ScoreError, StaveSlot, Warning,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(name: &str) -> MusicXml {
    let path = fixtures_dir().join(name);
    let xml = std::fs::read_to_string(&path).expect("fixture should be readable");
    parse_musicxml(&xml).unwrap_or_else(|e| panic!("Failed to parse {name}: {e}"))
}

// ─── Single staff ───────────────────────────────────────────────────

#[test]
fn parse_simple_score() {
    let score = load("simple.musicxml");

    // Metadata
    assert_eq!(score.title.as_deref(), Some("Three Bars"));
    assert_eq!(score.composer.as_deref(), Some("Anon."));
    assert_eq!(score.version.as_deref(), Some("3.1"));
    assert!(score.diagnostics.is_empty());

    let part = &score.parts[0];
    assert_eq!(part.id, "P1");
    assert_eq!(part.name, "Violin");
    assert_eq!(part.abbreviation.as_deref(), Some("Vln."));
    assert_eq!(part.staff_count(), 1);
    assert_eq!(part.measures.len(), 3);

    // Every measure resolves to treble 4/4
    for measure in &part.measures {
        let clef = measure.clef_for_staff(1).expect("staff 1 should have a clef");
        assert_eq!((clef.sign.as_str(), clef.line), ("G", Some(2)));
        let time = measure.time().expect("time should be inherited");
        assert_eq!((time.beats, time.beat_type), (4, 4));
    }

    // Measures 2 and 3 share measure 1's attribute set
    let m1 = &part.measures[0];
    assert!(Rc::ptr_eq(&part.measures[1].attributes, &m1.attributes));
    assert!(Rc::ptr_eq(&part.measures[2].attributes, &m1.attributes));
    assert!(m1.changes.key && m1.changes.time && m1.changes.clefs);
    assert!(!part.measures[1].changes.any());

    // Only measure 1 declares a key
    let with_keys: Vec<u32> = part.measures_with_keys().map(|m| m.number).collect();
    assert_eq!(with_keys, vec![1]);
    assert_eq!(part.measures_with_clef_changes().count(), 0);

    println!("✓ simple: {} measures, title {:?}", part.measures.len(), score.title);
}

#[test]
fn simple_score_notes_and_beams() {
    let score = load("simple.musicxml");
    let m1 = &score.parts[0].measures[0];

    assert_eq!(m1.label.as_deref(), Some("1"));
    assert_eq!(m1.width, Some(240.0));
    assert_eq!(m1.notes.len(), 4);
    assert_eq!(m1.voices, vec![1]);
    assert_eq!(m1.attributes.divisions, 2);

    let beams: Vec<Vec<usize>> = m1.beam_groups(1).map(|g| g.indices().collect()).collect();
    assert_eq!(beams, vec![vec![1, 2]]);
    assert_eq!(m1.notes[1].beam, BeamState::Begin);
    assert!(m1.notes[2].is_last_beam_note());
    assert!(!m1.notes[0].is_beamed());

    let sharp = &m1.notes[3];
    assert_eq!(sharp.accidental, Some(Accidental::Sharp));
    assert_eq!(sharp.pitch().unwrap().alter, Some(1.0));

    let rest = &score.parts[0].measures[2].notes[0];
    assert_eq!(rest.content, NoteContent::Rest { whole_measure: true });
}

// ─── Grand staff ────────────────────────────────────────────────────

#[test]
fn parse_piano_grand_staff() {
    let score = load("piano.musicxml");

    assert_eq!(score.title.as_deref(), Some("Grand Staff Study"));
    assert_eq!(score.composer, None);
    assert_eq!(score.version.as_deref(), Some("4.0"));

    let part = &score.parts[0];
    assert_eq!(part.staff_count(), 2);
    assert_eq!(part.all_staves().collect::<Vec<_>>(), vec![1, 2]);

    let m1 = &part.measures[0];
    assert_eq!(m1.voices, vec![1, 5]);
    assert_eq!(m1.voices_on_staff(1), vec![1]);
    assert_eq!(m1.voices_on_staff(2), vec![5]);
    assert_eq!(m1.notes_by_staff(2).count(), 1);
    assert_eq!(m1.notes_by_voice(1).count(), 4);
    assert_eq!(m1.all_times().len(), 2);

    let key = m1.key().unwrap();
    assert_eq!((key.fifths, key.mode), (2, KeyMode::Major));

    let clefs: Vec<&str> = m1.clefs().iter().map(|c| c.sign.as_str()).collect();
    assert_eq!(clefs, vec!["G", "F"]);

    // Chord member and dotted bass note
    assert!(m1.notes[3].chord);
    assert_eq!(m1.notes[3].accidental, Some(Accidental::Flat));
    assert_eq!(m1.notes[4].dots, 1);
    assert_eq!(m1.notes[4].staff, 2);

    let beams: Vec<Vec<usize>> = m1.beam_groups(1).map(|g| g.indices().collect()).collect();
    assert_eq!(beams, vec![vec![0, 1]]);
    assert_eq!(m1.beam_groups(2).count(), 0);

    println!("✓ piano: {} staves", part.staff_count());
}

#[test]
fn piano_inline_clef_change() {
    let score = load("piano.musicxml");
    let part = &score.parts[0];
    let m2 = &part.measures[1];

    // Only staff 2 was redeclared, after a note: reported, then resolved
    assert_eq!(
        score.diagnostics,
        vec![Warning::AmbiguousAttributes {
            part: "P1".to_string(),
            measure: 2,
            declared: 1,
            staves: 2,
        }]
    );

    // Start state keeps the bass clef, end state has the treble clef
    assert_eq!(m2.clef_for_staff(2).unwrap().sign, "F");
    assert_eq!(m2.attributes.clef_for_staff(2).unwrap().sign, "G");
    assert_eq!(m2.clef_for_staff(1).unwrap().sign, "G");
    assert!(m2.attributes.has_all_clefs());

    let staff2: Vec<_> = m2.notes_by_staff(2).collect();
    assert!(staff2[0].clef_override.is_none());
    assert_eq!(staff2[1].clef_override.as_ref().unwrap().sign, "G");
    assert_eq!(staff2[2].clef_override.as_ref().unwrap().sign, "G");

    let clef_only: Vec<u32> = part.measures_with_clef_changes().map(|m| m.number).collect();
    assert_eq!(clef_only, vec![2]);

    // The next measure inherits the resolved end state
    let m3 = &part.measures[2];
    assert!(Rc::ptr_eq(&m3.attributes, &m2.attributes));
    assert_eq!(m3.clef_for_staff(2).unwrap().sign, "G");
    assert!(m3.notes.iter().all(|n| n.clef_override.is_none()));
}

// ─── Multiple parts ─────────────────────────────────────────────────

#[test]
fn parse_duet() {
    let score = load("duet.musicxml");

    assert_eq!(score.title.as_deref(), Some("Duet"));
    assert_eq!(score.parts.len(), 2);
    assert_eq!(score.measure_count(), 5);
    assert_eq!(score.stave_count(), 3);
    assert_eq!(
        score.stave_slots(),
        vec![
            StaveSlot { part_index: 0, staff: 1 },
            StaveSlot { part_index: 1, staff: 1 },
            StaveSlot { part_index: 1, staff: 2 },
        ]
    );

    let flute = &score.parts[0];
    assert_eq!(flute.name, "Flute");
    let with_keys: Vec<u32> = flute.measures_with_keys().map(|m| m.number).collect();
    assert_eq!(with_keys, vec![1, 3]);

    // Key change keeps the inherited time allocation
    let (m1, m3) = (&flute.measures[0], &flute.measures[2]);
    assert_eq!(m3.key().unwrap().fifths, 1);
    assert!(Rc::ptr_eq(m3.attributes.time.as_ref().unwrap(), m1.attributes.time.as_ref().unwrap()));
    assert!(Rc::ptr_eq(&m3.attributes.clefs, &m1.attributes.clefs));

    // Time change in measure 4 carries into measure 5
    let (m4, m5) = (&flute.measures[3], &flute.measures[4]);
    assert_eq!(m4.time().map(|t| (t.beats, t.beat_type)), Some((3, 4)));
    assert!(m4.changes.time);
    assert!(!m5.changes.time);
    assert!(Rc::ptr_eq(&m5.attributes, &m4.attributes));

    let piano = &score.parts[1];
    assert_eq!(piano.abbreviation.as_deref(), Some("Pno."));
    assert_eq!(piano.measures[4].key().unwrap().fifths, 1);
}

// ─── Entry points and errors ────────────────────────────────────────

#[test]
fn parse_from_bytes_and_json() {
    let data = std::fs::read(fixtures_dir().join("simple.musicxml")).unwrap();
    let score = parse_bytes(&data).unwrap();
    assert_eq!(score.measure_count(), 3);

    let json = score_to_json(&score).unwrap();
    assert!(json.contains("\"title\": \"Three Bars\""));
    let back: MusicXml = serde_json::from_str(&json).unwrap();
    assert_eq!(back, score);

    assert!(matches!(parse_bytes(&[0x3c, 0xff, 0xfe]), Err(ScoreError::InvalidUtf8(_))));
}

#[test]
fn missing_time_signature_aborts_the_load() {
    let xml = r#"<score-partwise>
        <part-list><score-part id="P1"><part-name>X</part-name></score-part></part-list>
        <part id="P1">
            <measure number="1">
                <attributes><divisions>1</divisions><clef><sign>G</sign><line>2</line></clef></attributes>
                <note><rest/><duration>4</duration></note>
            </measure>
        </part>
    </score-partwise>"#;

    assert_eq!(
        parse_musicxml(xml).unwrap_err(),
        ScoreError::MissingTimeSignature {
            part: "P1".to_string(),
            measure: 1
        }
    );
}
