//! Clef, key, time and staff-count state that persists across measures.
//!
//! An [`AttributeSet`] holds every field behind an `Rc`. Merging a
//! declaration over a previous set reuses the previous allocation for each
//! field the declaration leaves out, so "inherited" and "redeclared with the
//! same value" stay distinguishable with `Rc::ptr_eq`.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Clef definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clef {
    /// Staff number this clef belongs to (1-based; defaults to 1)
    pub number: u32,
    /// Clef sign: "G" (treble), "F" (bass), "C" (alto/tenor), "percussion"
    pub sign: String,
    /// Staff line the clef sits on
    pub line: Option<i32>,
    /// Octave transposition (e.g., -1 for guitar's octave-lower treble clef)
    pub octave_change: Option<i32>,
}

/// Key mode. Modes other than minor are drawn with the major key name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    #[default]
    Major,
    Minor,
}

impl KeyMode {
    pub fn from_text(text: &str) -> Self {
        match text.trim() {
            "minor" | "aeolian" => KeyMode::Minor,
            _ => KeyMode::Major,
        }
    }
}

/// Key signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Number of sharps (positive) or flats (negative)
    pub fifths: i32,
    pub mode: KeyMode,
}

/// Time signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: u32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: u32,
    /// Display symbol: "common" or "cut"
    pub symbol: Option<String>,
}

/// Fully resolved measure state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    /// One clef per staff once resolved, ordered by staff number.
    pub clefs: Rc<Vec<Clef>>,
    pub key: Option<Rc<Key>>,
    /// Required by the time a measure is validated.
    pub time: Option<Rc<TimeSignature>>,
    /// Number of staves in the part (2 for a piano grand staff)
    pub staves: u32,
    /// Divisions per quarter note
    pub divisions: u32,
}

impl AttributeSet {
    /// State before the first measure: nothing declared, one staff.
    pub fn initial() -> Self {
        Self {
            clefs: Rc::new(Vec::new()),
            key: None,
            time: None,
            staves: 1,
            divisions: 1,
        }
    }

    pub fn clef_for_staff(&self, staff: u32) -> Option<&Clef> {
        find_clef(&self.clefs, staff)
    }

    /// True when every staff in `1..=staves` has a clef.
    pub fn has_all_clefs(&self) -> bool {
        covers_staves(&self.clefs, self.staves)
    }

    /// Copy of this set whose missing staff clefs are taken from `fallback`.
    pub fn with_missing_clefs_from(&self, fallback: &[Clef]) -> Self {
        let clefs = (1..=self.staves)
            .filter_map(|staff| {
                self.clef_for_staff(staff)
                    .or_else(|| find_clef(fallback, staff))
                    .cloned()
            })
            .collect();
        Self {
            clefs: Rc::new(clefs),
            ..self.clone()
        }
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::initial()
    }
}

pub(crate) fn find_clef(clefs: &[Clef], staff: u32) -> Option<&Clef> {
    clefs.iter().find(|c| c.number == staff)
}

pub(crate) fn covers_staves(clefs: &[Clef], staves: u32) -> bool {
    (1..=staves).all(|staff| find_clef(clefs, staff).is_some())
}

/// `base` with each clef of `declared` replacing the one for its staff.
pub(crate) fn overlay_clefs(base: &[Clef], declared: &[Clef]) -> Vec<Clef> {
    let mut clefs: Vec<Clef> = base
        .iter()
        .filter(|c| find_clef(declared, c.number).is_none())
        .chain(declared)
        .cloned()
        .collect();
    clefs.sort_by_key(|c| c.number);
    clefs
}

/// The raw content of one `<attributes>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeDeclaration {
    pub divisions: Option<u32>,
    pub clefs: Vec<Clef>,
    pub key: Option<Key>,
    pub time: Option<TimeSignature>,
    pub staves: Option<u32>,
}

impl AttributeDeclaration {
    pub fn is_empty(&self) -> bool {
        self.divisions.is_none()
            && self.clefs.is_empty()
            && self.key.is_none()
            && self.time.is_none()
            && self.staves.is_none()
    }

    /// Merge this declaration over `previous`. Undeclared fields share the
    /// previous allocation; declared fields replace it completely.
    pub fn merge(self, previous: &AttributeSet) -> AttributeSet {
        let mut clefs = self.clefs;
        clefs.sort_by_key(|c| c.number);
        AttributeSet {
            clefs: if clefs.is_empty() {
                Rc::clone(&previous.clefs)
            } else {
                Rc::new(clefs)
            },
            key: self.key.map(Rc::new).or_else(|| previous.key.clone()),
            time: self.time.map(Rc::new).or_else(|| previous.time.clone()),
            staves: self.staves.unwrap_or(previous.staves).max(1),
            divisions: self.divisions.unwrap_or(previous.divisions).max(1),
        }
    }
}

/// Which fields a measure declared itself, as opposed to inheriting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChanges {
    pub clefs: bool,
    pub key: bool,
    pub time: bool,
    pub staves: bool,
}

impl AttributeChanges {
    pub fn absorb(&mut self, decl: &AttributeDeclaration) {
        self.clefs |= !decl.clefs.is_empty();
        self.key |= decl.key.is_some();
        self.time |= decl.time.is_some();
        self.staves |= decl.staves.is_some();
    }

    pub fn any(&self) -> bool {
        self.clefs || self.key || self.time || self.staves
    }

    /// A clef change with no key, time or staff-count change.
    pub fn is_clef_only(&self) -> bool {
        self.clefs && !self.key && !self.time && !self.staves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clef(number: u32, sign: &str, line: i32) -> Clef {
        Clef {
            number,
            sign: sign.to_string(),
            line: Some(line),
            octave_change: None,
        }
    }

    fn four_four() -> TimeSignature {
        TimeSignature {
            beats: 4,
            beat_type: 4,
            symbol: None,
        }
    }

    fn first_measure() -> AttributeSet {
        AttributeDeclaration {
            divisions: Some(4),
            clefs: vec![clef(1, "G", 2)],
            key: Some(Key {
                fifths: 2,
                mode: KeyMode::Major,
            }),
            time: Some(four_four()),
            staves: None,
        }
        .merge(&AttributeSet::initial())
    }

    #[test]
    fn undeclared_fields_share_the_previous_allocation() {
        let previous = first_measure();
        let next = AttributeDeclaration {
            key: Some(Key {
                fifths: -1,
                mode: KeyMode::Minor,
            }),
            ..Default::default()
        }
        .merge(&previous);

        assert!(Rc::ptr_eq(&next.clefs, &previous.clefs));
        assert!(Rc::ptr_eq(
            next.time.as_ref().unwrap(),
            previous.time.as_ref().unwrap()
        ));
        assert_eq!(next.key.as_deref().map(|k| k.fifths), Some(-1));
        assert_eq!(next.divisions, 4);
    }

    #[test]
    fn empty_declaration_is_identity() {
        let previous = first_measure();
        let next = AttributeDeclaration::default().merge(&previous);
        assert_eq!(next, previous);
        assert!(Rc::ptr_eq(&next.clefs, &previous.clefs));
        assert!(Rc::ptr_eq(next.key.as_ref().unwrap(), previous.key.as_ref().unwrap()));
    }

    #[test]
    fn identical_redeclaration_is_a_new_allocation() {
        let previous = first_measure();
        let next = AttributeDeclaration {
            time: Some(four_four()),
            ..Default::default()
        }
        .merge(&previous);

        assert_eq!(next.time, previous.time);
        assert!(!Rc::ptr_eq(
            next.time.as_ref().unwrap(),
            previous.time.as_ref().unwrap()
        ));
    }

    #[test]
    fn declared_clefs_replace_the_whole_field() {
        let grand = AttributeDeclaration {
            clefs: vec![clef(2, "F", 4), clef(1, "G", 2)],
            staves: Some(2),
            ..Default::default()
        }
        .merge(&first_measure());
        assert!(grand.has_all_clefs());
        assert_eq!(grand.clefs[0].number, 1);

        let partial = AttributeDeclaration {
            clefs: vec![clef(2, "G", 2)],
            ..Default::default()
        }
        .merge(&grand);
        assert_eq!(partial.clefs.len(), 1);
        assert!(!partial.has_all_clefs());

        let filled = partial.with_missing_clefs_from(&grand.clefs);
        assert_eq!(filled.clefs.as_slice(), &[clef(1, "G", 2), clef(2, "G", 2)]);
    }

    #[test]
    fn overlay_replaces_per_staff() {
        let grand = [clef(1, "G", 2), clef(2, "F", 4)];
        assert_eq!(
            overlay_clefs(&grand, &[clef(2, "G", 2)]),
            vec![clef(1, "G", 2), clef(2, "G", 2)]
        );
        assert_eq!(overlay_clefs(&[], &[clef(1, "C", 3)]), vec![clef(1, "C", 3)]);
    }

    #[test]
    fn changes_track_declared_fields() {
        let mut changes = AttributeChanges::default();
        assert!(!changes.any());
        changes.absorb(&AttributeDeclaration {
            clefs: vec![clef(1, "F", 4)],
            ..Default::default()
        });
        assert!(changes.is_clef_only());
        changes.absorb(&AttributeDeclaration {
            staves: Some(2),
            ..Default::default()
        });
        assert!(changes.any());
        assert!(!changes.is_clef_only());
    }

    #[test]
    fn mode_text() {
        assert_eq!(KeyMode::from_text("minor"), KeyMode::Minor);
        assert_eq!(KeyMode::from_text(" major "), KeyMode::Major);
        assert_eq!(KeyMode::from_text("dorian"), KeyMode::Major);
    }
}
