use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::logic::events::{DisplayType, UiEvent};
use crate::logic::history::CommandHistory;
use crate::logic::undo::{Operation, UndoError, UndoRedoStack};
use crate::model::{
    Address, AddressBook, Email, FieldError, Index, InternalId, Location, Meeting, MeetingList,
    Model, ModelError, Name, PersonDetails, Phone, SortOrder, Tag,
};
use crate::search::{PersonPredicate, SearchQuery};

pub const MESSAGE_ADD_SUCCESS: &str = "New person added: ";
pub const MESSAGE_DELETE_SUCCESS: &str = "Deleted Person: ";
pub const MESSAGE_EDIT_SUCCESS: &str = "Edited Person: ";
pub const MESSAGE_DELETE_TAG_SUCCESS: &str = "Deleted tags: ";
pub const MESSAGE_ADD_MEETING_SUCCESS: &str =
    "New meeting added. No external task tracker is configured, so it is kept locally only.";
pub const MESSAGE_CLEAR_SUCCESS: &str = "Address book has been cleared!";
pub const MESSAGE_LIST_SUCCESS: &str = "Listed all persons";
pub const MESSAGE_SORT_SUCCESS: &str = "Sorted all persons by name";
pub const MESSAGE_MOST_SEARCHED_SUCCESS: &str = "Listed all persons by most searched";
pub const MESSAGE_CHOOSE_SUCCESS: &str = "Selected type ";
pub const MESSAGE_SELECT_SUCCESS: &str = "Selected Person: ";
pub const MESSAGE_NO_MEETINGS: &str = "No meetings scheduled.";
pub const MESSAGE_NO_HISTORY: &str = "You have not yet entered any commands.";
pub const MESSAGE_HISTORY_HEADER: &str = "Entered commands (from most recent to earliest):";
pub const MESSAGE_UNDO_SUCCESS: &str = "Undo success!";
pub const MESSAGE_REDO_SUCCESS: &str = "Redo success!";
pub const MESSAGE_EXIT: &str = "Exiting Address Book as requested ...";

/// Words accepted as the first token of a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CommandWord {
    Add,
    Edit,
    Delete,
    DeleteTag,
    AddMeeting,
    Clear,
    Find,
    List,
    Sort,
    #[strum(to_string = "listmostsearched", serialize = "lms")]
    ListMostSearched,
    Choose,
    Select,
    Meetings,
    History,
    Undo,
    Redo,
    Help,
    Exit,
}

impl CommandWord {
    pub fn usage(self) -> &'static str {
        match self {
            CommandWord::Add => {
                "add: Adds a person to the address book.\n\
                 Parameters: n/NAME p/PHONE e/EMAIL a/ADDRESS [t/TAG]...\n\
                 Example: add n/John Doe p/98765432 e/johnd@example.com a/311, Clementi Ave 2, #02-25 t/friends"
            }
            CommandWord::Edit => {
                "edit: Edits the person identified by the index number used in the last person listing. \
                 Existing values will be overwritten by the input values.\n\
                 Parameters: INDEX (must be a positive integer) [n/NAME] [p/PHONE] [e/EMAIL] [a/ADDRESS] [t/TAG]...\n\
                 Example: edit 1 p/91234567 e/johndoe@example.com"
            }
            CommandWord::Delete => {
                "delete: Deletes the person identified by the index number used in the last person listing.\n\
                 Parameters: INDEX (must be a positive integer)\n\
                 Example: delete 1"
            }
            CommandWord::DeleteTag => {
                "deletetag: Removes the given tags from every person.\n\
                 Parameters: TAG [MORE_TAGS]...\n\
                 Example: deletetag friends colleagues"
            }
            CommandWord::AddMeeting => {
                "addmeeting: Adds a meeting with the people identified by their index numbers.\n\
                 Parameters: d/YYYY-MM-DD HH:MM l/LOCATION [n/NOTES] p/INDEX [p/INDEX]...\n\
                 Example: addmeeting d/2020-10-31 18:00 l/Computing n/Project meeting p/1 p/2"
            }
            CommandWord::Clear => "clear: Clears all people and meetings.\nExample: clear",
            CommandWord::Find => {
                "find: Finds all persons whose names contain any of the specified keywords \
                 (case-insensitive), optionally restricted to tags, and displays them as a list with index numbers.\n\
                 Parameters: KEYWORD [MORE_KEYWORDS]... [tag:TAG]...\n\
                 Example: find alice bob tag:friends"
            }
            CommandWord::List => "list: Lists all persons in insertion order.\nExample: list",
            CommandWord::Sort => "sort: Sorts the displayed persons by name.\nExample: sort",
            CommandWord::ListMostSearched => {
                "listmostsearched (lms): Lists all persons, most searched first.\nExample: lms"
            }
            CommandWord::Choose => {
                "choose: selects the type of display in the main browser window.\n\
                 Parameters: <TYPE> (linkedin, facebook or meeting)\n\
                 Example: choose linkedin"
            }
            CommandWord::Select => {
                "select: Selects the person identified by the index number used in the last person listing.\n\
                 Parameters: INDEX (must be a positive integer)\n\
                 Example: select 1"
            }
            CommandWord::Meetings => "meetings: Lists all meetings by date.\nExample: meetings",
            CommandWord::History => {
                "history: Lists all the commands that you have entered in reverse chronological order.\n\
                 Example: history"
            }
            CommandWord::Undo => "undo: Undoes the previous undoable command.\nExample: undo",
            CommandWord::Redo => "redo: Redoes the previously undone command.\nExample: redo",
            CommandWord::Help => "help: Shows program usage instructions.\nExample: help",
            CommandWord::Exit => "exit: Exits the program.\nExample: exit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command")]
    UnknownCommand,
    #[error("This person already exists in the address book")]
    DuplicatePerson,
    #[error("This meeting already exists in the meeting list")]
    DuplicateMeeting,
    #[error("The person index provided is invalid")]
    InvalidIndex,
    #[error("The target person (internal id {0}) is missing")]
    PersonNotFound(InternalId),
    #[error("Tag not found")]
    TagNotFound,
    #[error("No more commands to undo!")]
    EmptyUndoStack,
    #[error("No more commands to redo!")]
    EmptyRedoStack,
    #[error(transparent)]
    InvalidValue(#[from] FieldError),
    #[error(transparent)]
    Model(ModelError),
}

impl From<ModelError> for CommandError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::DuplicatePerson => CommandError::DuplicatePerson,
            ModelError::DuplicateMeeting => CommandError::DuplicateMeeting,
            ModelError::InvalidIndex => CommandError::InvalidIndex,
            ModelError::PersonNotFound(id) => CommandError::PersonNotFound(id),
            other => CommandError::Model(other),
        }
    }
}

impl From<UndoError> for CommandError {
    fn from(err: UndoError) -> Self {
        match err {
            UndoError::EmptyUndo => CommandError::EmptyUndoStack,
            UndoError::EmptyRedo => CommandError::EmptyRedoStack,
            UndoError::Model(err) => err.into(),
        }
    }
}

/// Feedback for the user plus at most one notification for view collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub feedback: String,
    pub event: Option<UiEvent>,
}

impl CommandResult {
    pub fn new(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            event: None,
        }
    }

    pub fn with_event(feedback: impl Into<String>, event: UiEvent) -> Self {
        Self {
            feedback: feedback.into(),
            event: Some(event),
        }
    }

    fn changed(feedback: impl Into<String>) -> Self {
        Self::with_event(feedback, UiEvent::AddressBookChanged)
    }

    fn view_changed(feedback: impl Into<String>) -> Self {
        Self::with_event(feedback, UiEvent::PersonListChanged)
    }
}

/// Fields `edit` overwrites; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditPersonDescriptor {
    pub name: Option<Name>,
    pub phone: Option<Phone>,
    pub email: Option<Email>,
    pub address: Option<Address>,
    pub tags: Option<BTreeSet<Tag>>,
}

impl EditPersonDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.name.is_some()
            || self.phone.is_some()
            || self.email.is_some()
            || self.address.is_some()
            || self.tags.is_some()
    }

    pub fn apply(&self, current: &PersonDetails) -> PersonDetails {
        PersonDetails {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            phone: self.phone.clone().unwrap_or_else(|| current.phone.clone()),
            email: self.email.clone().unwrap_or_else(|| current.email.clone()),
            address: self.address.clone().unwrap_or_else(|| current.address.clone()),
            tags: self.tags.clone().unwrap_or_else(|| current.tags.clone()),
        }
    }
}

/// A parsed, not yet executed command. Indexes stay unresolved until
/// `execute`, so they always refer to the list the user sees at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(PersonDetails),
    Edit {
        index: Index,
        descriptor: EditPersonDescriptor,
    },
    Delete(Index),
    DeleteTag(Vec<Tag>),
    AddMeeting {
        date_time: PrimitiveDateTime,
        location: Location,
        notes: String,
        participants: Vec<Index>,
    },
    Clear,
    Find(SearchQuery),
    List,
    Sort,
    ListMostSearched,
    Choose(DisplayType),
    Select(Index),
    Meetings,
    History,
    Undo,
    Redo,
    Help,
    Exit,
}

/// What a command may touch while executing.
pub struct ExecutionContext<'a> {
    pub model: &'a mut dyn Model,
    pub history: &'a CommandHistory,
    pub undo_stack: &'a mut UndoRedoStack,
}

impl ExecutionContext<'_> {
    fn commit(&mut self, result: CommandResult, operation: Operation) -> CommandResult {
        self.undo_stack.push(operation);
        result
    }

    fn read_only(&mut self, result: CommandResult) -> CommandResult {
        self.undo_stack.clear_redo();
        result
    }
}

impl Command {
    pub fn word(&self) -> CommandWord {
        match self {
            Command::Add(_) => CommandWord::Add,
            Command::Edit { .. } => CommandWord::Edit,
            Command::Delete(_) => CommandWord::Delete,
            Command::DeleteTag(_) => CommandWord::DeleteTag,
            Command::AddMeeting { .. } => CommandWord::AddMeeting,
            Command::Clear => CommandWord::Clear,
            Command::Find(_) => CommandWord::Find,
            Command::List => CommandWord::List,
            Command::Sort => CommandWord::Sort,
            Command::ListMostSearched => CommandWord::ListMostSearched,
            Command::Choose(_) => CommandWord::Choose,
            Command::Select(_) => CommandWord::Select,
            Command::Meetings => CommandWord::Meetings,
            Command::History => CommandWord::History,
            Command::Undo => CommandWord::Undo,
            Command::Redo => CommandWord::Redo,
            Command::Help => CommandWord::Help,
            Command::Exit => CommandWord::Exit,
        }
    }

    pub fn is_undoable(&self) -> bool {
        matches!(
            self,
            Command::Add(_)
                | Command::Edit { .. }
                | Command::Delete(_)
                | Command::DeleteTag(_)
                | Command::AddMeeting { .. }
                | Command::Clear
        )
    }

    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<CommandResult, CommandError> {
        match self {
            Command::Add(details) => {
                let (result, op) = add_person(ctx.model, details)?;
                Ok(ctx.commit(result, op))
            }
            Command::Edit { index, descriptor } => {
                let (result, op) = edit_person(ctx.model, *index, descriptor)?;
                Ok(ctx.commit(result, op))
            }
            Command::Delete(index) => {
                let (result, op) = delete_person(ctx.model, *index)?;
                Ok(ctx.commit(result, op))
            }
            Command::DeleteTag(tags) => {
                let (result, op) = delete_tags(ctx.model, tags)?;
                Ok(ctx.commit(result, op))
            }
            Command::AddMeeting {
                date_time,
                location,
                notes,
                participants,
            } => {
                let (result, op) =
                    add_meeting(ctx.model, *date_time, location, notes, participants)?;
                Ok(ctx.commit(result, op))
            }
            Command::Clear => {
                let previous = Operation::Clear {
                    book: ctx.model.address_book().clone(),
                    meetings: ctx.model.meeting_list().clone(),
                };
                ctx.model.reset_data(AddressBook::new(), MeetingList::new());
                Ok(ctx.commit(CommandResult::changed(MESSAGE_CLEAR_SUCCESS), previous))
            }
            Command::Find(query) => {
                ctx.model
                    .update_filtered_person_list(PersonPredicate::Query(query.clone()));
                ctx.model.record_search_history();
                let listed = ctx.model.filtered_person_list().len();
                Ok(ctx.read_only(CommandResult::view_changed(format!("{listed} persons listed!"))))
            }
            Command::List => {
                ctx.model.update_filtered_person_list(PersonPredicate::ShowAll);
                ctx.model.sort_person_list(SortOrder::Insertion);
                Ok(ctx.read_only(CommandResult::view_changed(MESSAGE_LIST_SUCCESS)))
            }
            Command::Sort => {
                ctx.model.sort_person_list(SortOrder::Name);
                Ok(ctx.read_only(CommandResult::view_changed(MESSAGE_SORT_SUCCESS)))
            }
            Command::ListMostSearched => {
                ctx.model.update_filtered_person_list(PersonPredicate::ShowAll);
                ctx.model.sort_person_list(SortOrder::SearchCountDescending);
                Ok(ctx.read_only(CommandResult::view_changed(MESSAGE_MOST_SEARCHED_SUCCESS)))
            }
            Command::Choose(display) => Ok(ctx.read_only(CommandResult::with_event(
                format!("{MESSAGE_CHOOSE_SUCCESS}{display}"),
                UiEvent::JumpToBrowser { display: *display },
            ))),
            Command::Select(index) => {
                if index.zero_based() >= ctx.model.filtered_person_list().len() {
                    return Err(CommandError::InvalidIndex);
                }
                Ok(ctx.read_only(CommandResult::with_event(
                    format!("{MESSAGE_SELECT_SUCCESS}{index}"),
                    UiEvent::JumpToListRequest { index: *index },
                )))
            }
            Command::Meetings => {
                let feedback = describe_meetings(&*ctx.model);
                Ok(ctx.read_only(CommandResult::new(feedback)))
            }
            Command::History => {
                let feedback = describe_history(ctx.history);
                Ok(ctx.read_only(CommandResult::new(feedback)))
            }
            Command::Undo => {
                ctx.undo_stack.undo(ctx.model)?;
                ctx.model.update_filtered_person_list(PersonPredicate::ShowAll);
                tracing::info!("undo applied");
                Ok(CommandResult::changed(MESSAGE_UNDO_SUCCESS))
            }
            Command::Redo => {
                ctx.undo_stack.redo(ctx.model)?;
                ctx.model.update_filtered_person_list(PersonPredicate::ShowAll);
                tracing::info!("redo applied");
                Ok(CommandResult::changed(MESSAGE_REDO_SUCCESS))
            }
            Command::Help => Ok(ctx.read_only(CommandResult::new(help_text()))),
            Command::Exit => Ok(ctx.read_only(CommandResult::with_event(
                MESSAGE_EXIT,
                UiEvent::ExitAppRequest,
            ))),
        }
    }
}

fn add_person(
    model: &mut dyn Model,
    details: &PersonDetails,
) -> Result<(CommandResult, Operation), CommandError> {
    let person = model.add_person(details.clone())?;
    let position = model.address_book().len().saturating_sub(1);
    let result = CommandResult::changed(format!("{MESSAGE_ADD_SUCCESS}{person}"));
    Ok((result, Operation::PersonAdd { person, position }))
}

fn edit_person(
    model: &mut dyn Model,
    index: Index,
    descriptor: &EditPersonDescriptor,
) -> Result<(CommandResult, Operation), CommandError> {
    let id = model.visible_to_internal_id(index)?;
    let current = model
        .address_book()
        .get(id)
        .ok_or(CommandError::PersonNotFound(id))?;
    let edited = descriptor.apply(current.details());
    let previous = model.update_person(id, edited.clone())?;
    let updated = previous.with_details(edited.clone());
    let result = CommandResult::changed(format!("{MESSAGE_EDIT_SUCCESS}{updated}"));
    Ok((
        result,
        Operation::PersonEdit {
            id,
            before: previous.details().clone(),
            after: edited,
        },
    ))
}

fn delete_person(
    model: &mut dyn Model,
    index: Index,
) -> Result<(CommandResult, Operation), CommandError> {
    let id = model.visible_to_internal_id(index)?;
    let (person, position) = model.delete_person(id)?;
    let result = CommandResult::changed(format!("{MESSAGE_DELETE_SUCCESS}{person}"));
    Ok((result, Operation::PersonDelete { person, position }))
}

fn delete_tags(
    model: &mut dyn Model,
    tags: &[Tag],
) -> Result<(CommandResult, Operation), CommandError> {
    let previous = model.delete_tags(tags)?;
    if previous.is_empty() {
        return Err(CommandError::TagNotFound);
    }
    let listed: String = tags.iter().map(Tag::to_string).collect();
    let result = CommandResult::changed(format!("{MESSAGE_DELETE_TAG_SUCCESS}{listed}"));
    Ok((
        result,
        Operation::TagsDelete {
            tags: tags.to_vec(),
            previous,
        },
    ))
}

fn add_meeting(
    model: &mut dyn Model,
    date_time: PrimitiveDateTime,
    location: &Location,
    notes: &str,
    participants: &[Index],
) -> Result<(CommandResult, Operation), CommandError> {
    let ids = participants
        .iter()
        .map(|index| model.visible_to_internal_id(*index))
        .collect::<Result<BTreeSet<_>, _>>()?;
    let meeting = Meeting::new(date_time, location.clone(), notes, ids)?;
    model.add_meeting(meeting.clone())?;
    let result = CommandResult::changed(MESSAGE_ADD_MEETING_SUCCESS);
    Ok((result, Operation::MeetingAdd { meeting }))
}

fn describe_meetings(model: &dyn Model) -> String {
    let meetings = model.meeting_list();
    if meetings.is_empty() {
        return MESSAGE_NO_MEETINGS.to_owned();
    }
    let mut out = format!("Listed {} meeting(s):", meetings.len());
    for (i, meeting) in meetings.iter().enumerate() {
        let names: Vec<&str> = meeting
            .participants()
            .iter()
            .map(|id| {
                model
                    .address_book()
                    .get(*id)
                    .map_or("(removed)", |p| p.name().as_str())
            })
            .collect();
        let _ = write!(out, "\n{}. {} with {}", i + 1, meeting, names.join(", "));
    }
    out
}

fn describe_history(history: &CommandHistory) -> String {
    if history.is_empty() {
        return MESSAGE_NO_HISTORY.to_owned();
    }
    let lines: Vec<&str> = history.most_recent_first().collect();
    format!("{MESSAGE_HISTORY_HEADER}\n{}", lines.join("\n"))
}

pub fn help_text() -> String {
    let mut out = String::from("Available commands:");
    for word in CommandWord::iter() {
        let summary = word.usage().lines().next().unwrap_or_default();
        let _ = write!(out, "\n  {summary}");
    }
    out
}
