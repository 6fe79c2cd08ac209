use crate::model::{
    AddressBook, InternalId, Meeting, MeetingList, Model, ModelError, Person, PersonDetails, Tag,
};

pub const DEFAULT_UNDO_LIMIT: usize = 500;

/// A committed mutation with enough state to reverse and re-apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    PersonAdd {
        person: Person,
        position: usize,
    },
    PersonDelete {
        person: Person,
        position: usize,
    },
    PersonEdit {
        id: InternalId,
        before: PersonDetails,
        after: PersonDetails,
    },
    TagsDelete {
        tags: Vec<Tag>,
        previous: Vec<(InternalId, PersonDetails)>,
    },
    MeetingAdd {
        meeting: Meeting,
    },
    Clear {
        book: AddressBook,
        meetings: MeetingList,
    },
}

impl Operation {
    fn apply_inverse(&self, model: &mut dyn Model) -> Result<(), ModelError> {
        match self {
            Operation::PersonAdd { person, .. } => model.delete_person(person.id()).map(|_| ()),
            Operation::PersonDelete { person, position } => {
                model.restore_person(person.clone(), *position)
            }
            Operation::PersonEdit { id, before, .. } => {
                model.update_person(*id, before.clone()).map(|_| ())
            }
            Operation::TagsDelete { previous, .. } => {
                for (id, details) in previous {
                    model.update_person(*id, details.clone())?;
                }
                Ok(())
            }
            Operation::MeetingAdd { meeting } => model.remove_meeting(meeting),
            Operation::Clear { book, meetings } => {
                model.reset_data(book.clone(), meetings.clone());
                Ok(())
            }
        }
    }

    fn apply_forward(&self, model: &mut dyn Model) -> Result<(), ModelError> {
        match self {
            Operation::PersonAdd { person, position } => {
                model.restore_person(person.clone(), *position)
            }
            Operation::PersonDelete { person, .. } => model.delete_person(person.id()).map(|_| ()),
            Operation::PersonEdit { id, after, .. } => {
                model.update_person(*id, after.clone()).map(|_| ())
            }
            Operation::TagsDelete { tags, .. } => model.delete_tags(tags).map(|_| ()),
            Operation::MeetingAdd { meeting } => model.add_meeting(meeting.clone()),
            Operation::Clear { .. } => {
                model.reset_data(AddressBook::new(), MeetingList::new());
                Ok(())
            }
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UndoError {
    #[error("nothing to undo")]
    EmptyUndo,
    #[error("nothing to redo")]
    EmptyRedo,
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone)]
pub struct UndoRedoStack {
    undo: Vec<Operation>,
    redo: Vec<Operation>,
    limit: usize,
}

impl Default for UndoRedoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoRedoStack {
    pub fn new(limit: usize) -> Self {
        UndoRedoStack {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Push a new operation. Clears the redo stack.
    pub fn push(&mut self, op: Operation) {
        self.undo.push(op);
        if self.undo.len() > self.limit {
            self.undo.drain(..self.undo.len() - self.limit);
        }
        self.redo.clear();
    }

    /// Any other command invalidates what could be redone.
    pub fn clear_redo(&mut self) {
        self.redo.clear();
    }

    /// Reverses the most recent operation. On failure the operation stays
    /// where it was.
    pub fn undo(&mut self, model: &mut dyn Model) -> Result<(), UndoError> {
        let op = self.undo.pop().ok_or(UndoError::EmptyUndo)?;
        if let Err(err) = op.apply_inverse(model) {
            self.undo.push(op);
            return Err(err.into());
        }
        tracing::debug!(?op, "undid operation");
        self.redo.push(op);
        Ok(())
    }

    pub fn redo(&mut self, model: &mut dyn Model) -> Result<(), UndoError> {
        let op = self.redo.pop().ok_or(UndoError::EmptyRedo)?;
        if let Err(err) = op.apply_forward(model) {
            self.redo.push(op);
            return Err(err.into());
        }
        tracing::debug!(?op, "redid operation");
        self.undo.push(op);
        Ok(())
    }

    #[cfg(test)]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[cfg(test)]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[cfg(test)]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }
}
