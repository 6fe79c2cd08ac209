use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::person::{InternalId, Person, PersonDetails};
use super::tag::Tag;

/// People in insertion order, keyed by internal id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    persons: IndexMap<InternalId, Person>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_persons(persons: impl IntoIterator<Item = Person>) -> Self {
        Self {
            persons: persons.into_iter().map(|p| (p.id(), p)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    pub fn get(&self, id: InternalId) -> Option<&Person> {
        self.persons.get(&id)
    }

    pub fn contains_id(&self, id: InternalId) -> bool {
        self.persons.contains_key(&id)
    }

    /// Whether someone other than `except` has the same contact details.
    pub fn has_same_person(&self, details: &PersonDetails, except: Option<InternalId>) -> bool {
        self.persons
            .values()
            .any(|p| Some(p.id()) != except && p.details().is_same_person(details))
    }

    pub fn max_id(&self) -> Option<InternalId> {
        self.persons.keys().copied().max()
    }

    /// All tags currently carried by at least one person.
    pub fn tags(&self) -> BTreeSet<Tag> {
        self.persons
            .values()
            .flat_map(|p| p.tags().iter().cloned())
            .collect()
    }

    pub(crate) fn insert_at(&mut self, position: usize, person: Person) {
        let position = position.min(self.persons.len());
        self.persons.shift_insert(position, person.id(), person);
    }

    pub(crate) fn remove(&mut self, id: InternalId) -> Option<(usize, Person)> {
        self.persons
            .shift_remove_full(&id)
            .map(|(position, _, person)| (position, person))
    }

    pub(crate) fn get_mut(&mut self, id: InternalId) -> Option<&mut Person> {
        self.persons.get_mut(&id)
    }
}
