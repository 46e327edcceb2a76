//! Beam grouping over one (voice, staff) note stream.
//!
//! MusicXML marks each note with begin/continue/end. Notes are collected
//! while the stream is inside a beam, and a group is yielded when `end`
//! closes it, but only if it holds more than one note. Chord members share
//! the stem of the note before them and grace notes are beamed separately,
//! so neither takes part.

use crate::model::{BeamState, Note};

/// Notes joined by one beam, with their index in the measure.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamGroup<'a> {
    notes: Vec<(usize, &'a Note)>,
}

impl<'a> BeamGroup<'a> {
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Indices into the measure's note list, in order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.notes.iter().map(|&(i, _)| i)
    }

    pub fn notes(&self) -> impl Iterator<Item = &'a Note> + '_ {
        self.notes.iter().map(|&(_, n)| n)
    }

    /// The note whose `end` marker closed the group.
    pub fn last(&self) -> Option<&'a Note> {
        self.notes.last().map(|&(_, n)| n)
    }
}

/// Lazy iterator of beam groups.
#[derive(Debug, Clone)]
pub struct BeamGroups<'a, I> {
    notes: I,
    open: Vec<(usize, &'a Note)>,
}

impl<'a, I> BeamGroups<'a, I>
where
    I: Iterator<Item = (usize, &'a Note)>,
{
    pub fn new(notes: I) -> Self {
        Self {
            notes,
            open: Vec::new(),
        }
    }
}

impl<'a, I> Iterator for BeamGroups<'a, I>
where
    I: Iterator<Item = (usize, &'a Note)>,
{
    type Item = BeamGroup<'a>;

    fn next(&mut self) -> Option<BeamGroup<'a>> {
        for (index, note) in self.notes.by_ref() {
            if note.chord || note.grace {
                continue;
            }
            match note.beam {
                // An unbeamed note or a fresh begin drops any unterminated group
                BeamState::None => self.open.clear(),
                BeamState::Begin => {
                    self.open.clear();
                    self.open.push((index, note));
                }
                BeamState::Continue => self.open.push((index, note)),
                BeamState::End => {
                    self.open.push((index, note));
                    let notes = std::mem::take(&mut self.open);
                    if notes.len() > 1 {
                        return Some(BeamGroup { notes });
                    }
                }
            }
        }
        None
    }
}

/// Group an indexed note stream into beams.
pub fn beam_groups<'a, I>(notes: I) -> BeamGroups<'a, I::IntoIter>
where
    I: IntoIterator<Item = (usize, &'a Note)>,
{
    BeamGroups::new(notes.into_iter())
}
