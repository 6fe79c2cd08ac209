use thiserror::Error;

use crate::search::PersonPredicate;

mod address_book;
mod index;
mod meeting;
pub(crate) mod person;
pub mod sample;
mod tag;

pub use address_book::AddressBook;
pub use index::Index;
pub use meeting::{format_date_time, parse_date_time, Location, Meeting, MeetingList};
pub use person::{Address, Email, InternalId, Name, Person, PersonDetails, Phone, SearchData};
pub use tag::Tag;

/// A user-supplied value that breaks a field constraint. Carries the
/// constraint message shown back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FieldError(pub &'static str);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("person already exists in the address book")]
    DuplicatePerson,
    #[error("meeting already exists in the meeting list")]
    DuplicateMeeting,
    #[error("no person with internal id {0}")]
    PersonNotFound(InternalId),
    #[error("meeting not found in the meeting list")]
    MeetingNotFound,
    #[error("index is outside the displayed person list")]
    InvalidIndex,
}

/// Order of the person view. Sorting is stable, so ties keep insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Insertion,
    Name,
    SearchCountDescending,
}

/// Contract between commands and the store.
///
/// Every failing mutation leaves the store untouched.
pub trait Model {
    /// Allocates a fresh id and appends the person.
    fn add_person(&mut self, details: PersonDetails) -> Result<Person, ModelError>;

    /// Puts back a person removed earlier, under its original id and position.
    fn restore_person(&mut self, person: Person, position: usize) -> Result<(), ModelError>;

    /// Returns the removed person and the position it held.
    fn delete_person(&mut self, target: InternalId) -> Result<(Person, usize), ModelError>;

    /// Replaces the details of `target`, keeping its id and search history.
    /// Returns the previous version.
    fn update_person(
        &mut self,
        target: InternalId,
        edited: PersonDetails,
    ) -> Result<Person, ModelError>;

    fn add_meeting(&mut self, meeting: Meeting) -> Result<(), ModelError>;

    fn remove_meeting(&mut self, meeting: &Meeting) -> Result<(), ModelError>;

    /// Strips the tags from everyone. Returns the id and previous details of
    /// each person changed; empty when nobody carried any of the tags.
    fn delete_tags(
        &mut self,
        tags: &[Tag],
    ) -> Result<Vec<(InternalId, PersonDetails)>, ModelError>;

    /// Atomically replaces both collections and shows every person again.
    fn reset_data(&mut self, book: AddressBook, meetings: MeetingList);

    fn address_book(&self) -> &AddressBook;

    fn meeting_list(&self) -> &MeetingList;

    fn filtered_person_list(&self) -> Vec<&Person>;

    fn update_filtered_person_list(&mut self, predicate: PersonPredicate);

    fn sort_person_list(&mut self, order: SortOrder);

    /// Bumps the search count of everyone in the current view.
    fn record_search_history(&mut self);

    fn visible_to_internal_id(&self, index: Index) -> Result<InternalId, ModelError>;
}

/// People and meetings plus the filtered, sorted view the user addresses by
/// index.
#[derive(Debug, Clone, Default)]
pub struct ModelManager {
    book: AddressBook,
    meetings: MeetingList,
    predicate: PersonPredicate,
    order: SortOrder,
    next_id: u64,
}

impl ModelManager {
    pub fn new(book: AddressBook, meetings: MeetingList) -> Self {
        let mut manager = Self::default();
        manager.reset_data(book, meetings);
        manager
    }

    /// Builds a store whose people get fresh ids in the given order.
    pub fn from_details(
        people: impl IntoIterator<Item = PersonDetails>,
    ) -> Result<Self, ModelError> {
        let mut manager = Self::default();
        for details in people {
            manager.add_person(details)?;
        }
        Ok(manager)
    }

    pub fn predicate(&self) -> &PersonPredicate {
        &self.predicate
    }

    pub fn sort_order(&self) -> SortOrder {
        self.order
    }

    fn allocate_id(&mut self) -> InternalId {
        self.next_id += 1;
        InternalId::new(self.next_id)
    }

    fn advance_id_counter(&mut self, seen: Option<InternalId>) {
        if let Some(id) = seen {
            self.next_id = self.next_id.max(id.value());
        }
    }
}

impl Model for ModelManager {
    fn add_person(&mut self, details: PersonDetails) -> Result<Person, ModelError> {
        if self.book.has_same_person(&details, None) {
            return Err(ModelError::DuplicatePerson);
        }
        let person = Person::new(self.allocate_id(), details);
        self.book.insert_at(self.book.len(), person.clone());
        Ok(person)
    }

    fn restore_person(&mut self, person: Person, position: usize) -> Result<(), ModelError> {
        if self.book.contains_id(person.id()) || self.book.has_same_person(person.details(), None) {
            return Err(ModelError::DuplicatePerson);
        }
        self.advance_id_counter(Some(person.id()));
        self.book.insert_at(position, person);
        Ok(())
    }

    fn delete_person(&mut self, target: InternalId) -> Result<(Person, usize), ModelError> {
        let (position, person) = self
            .book
            .remove(target)
            .ok_or(ModelError::PersonNotFound(target))?;
        Ok((person, position))
    }

    fn update_person(
        &mut self,
        target: InternalId,
        edited: PersonDetails,
    ) -> Result<Person, ModelError> {
        if !self.book.contains_id(target) {
            return Err(ModelError::PersonNotFound(target));
        }
        if self.book.has_same_person(&edited, Some(target)) {
            return Err(ModelError::DuplicatePerson);
        }
        let slot = self
            .book
            .get_mut(target)
            .ok_or(ModelError::PersonNotFound(target))?;
        let previous = slot.clone();
        *slot = previous.with_details(edited);
        Ok(previous)
    }

    fn add_meeting(&mut self, meeting: Meeting) -> Result<(), ModelError> {
        if let Some(missing) = meeting
            .participants()
            .iter()
            .find(|id| !self.book.contains_id(**id))
        {
            return Err(ModelError::PersonNotFound(*missing));
        }
        if !self.meetings.add(meeting) {
            return Err(ModelError::DuplicateMeeting);
        }
        Ok(())
    }

    fn remove_meeting(&mut self, meeting: &Meeting) -> Result<(), ModelError> {
        self.meetings
            .remove(meeting)
            .map(|_| ())
            .ok_or(ModelError::MeetingNotFound)
    }

    fn delete_tags(
        &mut self,
        tags: &[Tag],
    ) -> Result<Vec<(InternalId, PersonDetails)>, ModelError> {
        let affected: Vec<InternalId> = self
            .book
            .persons()
            .filter(|p| tags.iter().any(|tag| p.tags().contains(tag)))
            .map(Person::id)
            .collect();
        let mut previous = Vec::with_capacity(affected.len());
        for id in affected {
            let person = self
                .book
                .get_mut(id)
                .ok_or(ModelError::PersonNotFound(id))?;
            let mut details = person.details().clone();
            previous.push((id, details.clone()));
            details.tags.retain(|tag| !tags.contains(tag));
            *person = person.with_details(details);
        }
        Ok(previous)
    }

    fn reset_data(&mut self, book: AddressBook, meetings: MeetingList) {
        tracing::info!(
            persons = book.len(),
            meetings = meetings.len(),
            "resetting model data"
        );
        self.advance_id_counter(book.max_id());
        self.book = book;
        self.meetings = meetings;
        self.predicate = PersonPredicate::ShowAll;
    }

    fn address_book(&self) -> &AddressBook {
        &self.book
    }

    fn meeting_list(&self) -> &MeetingList {
        &self.meetings
    }

    fn filtered_person_list(&self) -> Vec<&Person> {
        let mut view: Vec<&Person> = self
            .book
            .persons()
            .filter(|p| self.predicate.matches(p))
            .collect();
        match self.order {
            SortOrder::Insertion => {}
            SortOrder::Name => view.sort_by_cached_key(|p| p.name().as_str().to_lowercase()),
            SortOrder::SearchCountDescending => {
                view.sort_by(|a, b| b.search_count().cmp(&a.search_count()))
            }
        }
        view
    }

    fn update_filtered_person_list(&mut self, predicate: PersonPredicate) {
        self.predicate = predicate;
    }

    fn sort_person_list(&mut self, order: SortOrder) {
        self.order = order;
    }

    fn record_search_history(&mut self) {
        let visible: Vec<InternalId> = self.filtered_person_list().iter().map(|p| p.id()).collect();
        for id in visible {
            if let Some(person) = self.book.get_mut(id) {
                person.record_search();
            }
        }
    }

    fn visible_to_internal_id(&self, index: Index) -> Result<InternalId, ModelError> {
        self.filtered_person_list()
            .get(index.zero_based())
            .map(|p| p.id())
            .ok_or(ModelError::InvalidIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::person::tests::details;
    use crate::search::parse_query;
    use assert_matches::assert_matches;
    use time::macros::datetime;

    fn manager() -> ModelManager {
        ModelManager::from_details([
            details("Alice Pauline", "94351253", &["friends"]),
            details("Benson Meier", "98765432", &["owesMoney", "friends"]),
            details("Carl Kurz", "95352563", &[]),
        ])
        .unwrap()
    }

    fn one(value: usize) -> Index {
        Index::from_one_based(value).unwrap()
    }

    fn names(model: &ModelManager) -> Vec<String> {
        model
            .filtered_person_list()
            .iter()
            .map(|p| p.name().as_str().to_owned())
            .collect()
    }

    #[test]
    fn add_person_rejects_duplicates_without_mutation() {
        let mut model = manager();
        let before = model.address_book().clone();
        let err = model
            .add_person(details("Alice Pauline", "94351253", &["colleagues"]))
            .unwrap_err();
        assert_eq!(err, ModelError::DuplicatePerson);
        assert_eq!(model.address_book(), &before);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut model = manager();
        let (removed, _) = model.delete_person(InternalId::new(3)).unwrap();
        let added = model.add_person(details("Daniel", "87652533", &[])).unwrap();
        assert_ne!(added.id(), removed.id());
        assert_eq!(added.id(), InternalId::new(4));
    }

    #[test]
    fn reset_data_keeps_id_counter_moving_forward() {
        let mut model = manager();
        model.reset_data(AddressBook::new(), MeetingList::new());
        let added = model.add_person(details("Elle", "9482224", &[])).unwrap();
        assert_eq!(added.id(), InternalId::new(4));
    }

    #[test]
    fn visible_index_follows_filter_and_sort() {
        let mut model = manager();
        model.update_filtered_person_list(PersonPredicate::Query(parse_query("carl").unwrap()));
        assert_eq!(model.visible_to_internal_id(one(1)).unwrap(), InternalId::new(3));
        assert_matches!(model.visible_to_internal_id(one(2)), Err(ModelError::InvalidIndex));

        model.update_filtered_person_list(PersonPredicate::ShowAll);
        model.sort_person_list(SortOrder::Name);
        model.update_person(InternalId::new(1), details("Zed", "94351253", &[])).unwrap();
        assert_eq!(names(&model), ["Benson Meier", "Carl Kurz", "Zed"]);
        assert_eq!(model.visible_to_internal_id(one(3)).unwrap(), InternalId::new(1));
    }

    #[test]
    fn search_count_order_is_descending_and_stable() {
        let mut model = manager();
        model.update_filtered_person_list(PersonPredicate::Query(parse_query("carl").unwrap()));
        model.record_search_history();
        model.record_search_history();
        model.update_filtered_person_list(PersonPredicate::Query(parse_query("benson").unwrap()));
        model.record_search_history();
        model.update_filtered_person_list(PersonPredicate::ShowAll);
        model.sort_person_list(SortOrder::SearchCountDescending);

        let counts: Vec<u32> = model
            .filtered_person_list()
            .iter()
            .map(|p| p.search_count())
            .collect();
        assert_eq!(counts, [2, 1, 0]);
        assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(names(&model), ["Carl Kurz", "Benson Meier", "Alice Pauline"]);
    }

    #[test]
    fn update_person_rejects_collision_with_someone_else() {
        let mut model = manager();
        let err = model
            .update_person(InternalId::new(2), details("Alice Pauline", "94351253", &[]))
            .unwrap_err();
        assert_eq!(err, ModelError::DuplicatePerson);
        assert_matches!(
            model.update_person(InternalId::new(9), details("Nobody", "123", &[])),
            Err(ModelError::PersonNotFound(_))
        );
    }

    #[test]
    fn delete_tags_reports_previous_details() {
        let mut model = manager();
        let previous = model.delete_tags(&[Tag::parse("friends").unwrap()]).unwrap();
        assert_eq!(previous.len(), 2);
        assert!(model.address_book().tags().iter().all(|t| t.as_str() != "friends"));
        assert!(model.delete_tags(&[Tag::parse("friends").unwrap()]).unwrap().is_empty());
    }

    #[test]
    fn add_meeting_checks_participants_and_duplicates() {
        let mut model = manager();
        let meeting = |ids: &[u64]| {
            Meeting::new(
                datetime!(2020-10-31 18:00),
                Location::parse("Computing").unwrap(),
                "Project meeting",
                ids.iter().copied().map(InternalId::new).collect(),
            )
            .unwrap()
        };
        model.add_meeting(meeting(&[1, 2])).unwrap();
        assert_eq!(model.add_meeting(meeting(&[2, 1])), Err(ModelError::DuplicateMeeting));
        assert_eq!(
            model.add_meeting(meeting(&[42])),
            Err(ModelError::PersonNotFound(InternalId::new(42)))
        );
        assert_eq!(model.meeting_list().len(), 1);
    }

    #[test]
    fn remove_meeting_round_trip() {
        let mut model = manager();
        let meeting = Meeting::new(
            datetime!(2020-10-31 18:00),
            Location::parse("Computing").unwrap(),
            "",
            [InternalId::new(1)].into(),
        )
        .unwrap();
        assert_eq!(model.remove_meeting(&meeting), Err(ModelError::MeetingNotFound));

        model.add_meeting(meeting.clone()).unwrap();
        model.remove_meeting(&meeting).unwrap();
        assert!(model.meeting_list().is_empty());
        assert_eq!(model.remove_meeting(&meeting), Err(ModelError::MeetingNotFound));

        model.add_meeting(meeting).unwrap();
        assert_eq!(model.meeting_list().len(), 1);
    }
}
