use std::collections::BTreeSet;
use std::str::FromStr;

use thiserror::Error;

use crate::logic::commands::{Command, CommandError, CommandWord, EditPersonDescriptor};
use crate::logic::events::DisplayType;
use crate::logic::tokenizer::{
    tokenize, ArgumentMultimap, Prefix, PREFIX_ADDRESS, PREFIX_DATE_TIME, PREFIX_EMAIL,
    PREFIX_LOCATION, PREFIX_NAME, PREFIX_NOTES, PREFIX_PARTICIPANT, PREFIX_PHONE, PREFIX_TAG,
};
use crate::logic::LogicError;
use crate::model::{
    parse_date_time, Address, Email, FieldError, Index, Location, Name, PersonDetails, Phone, Tag,
};
use crate::search::parse_query;

pub const MESSAGE_INVALID_INDEX: &str = "Index is not a non-zero unsigned integer.";
pub const MESSAGE_NOT_EDITED: &str = "At least one field to edit must be provided.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid command format! \n{usage}")]
    InvalidFormat { usage: &'static str },
    #[error(transparent)]
    InvalidValue(#[from] FieldError),
    #[error("Index is not a non-zero unsigned integer.")]
    InvalidIndex,
    #[error("At least one field to edit must be provided.")]
    NothingToEdit,
}

impl ParseError {
    fn format(word: CommandWord) -> Self {
        ParseError::InvalidFormat {
            usage: word.usage(),
        }
    }
}

/// Parses one line of user input. The first word picks the command and the
/// rest goes to that command's argument parser.
pub fn parse_command(input: &str) -> Result<Command, LogicError> {
    let trimmed = input.trim();
    let (word, args) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    if word.is_empty() {
        return Err(ParseError::format(CommandWord::Help).into());
    }
    let word = CommandWord::from_str(word).map_err(|_| CommandError::UnknownCommand)?;
    Ok(parse_arguments(word, args)?)
}

pub fn parse_arguments(word: CommandWord, args: &str) -> Result<Command, ParseError> {
    let command = match word {
        CommandWord::Add => parse_add(args)?,
        CommandWord::Edit => parse_edit(args)?,
        CommandWord::Delete => Command::Delete(index_or_usage(args, word)?),
        CommandWord::DeleteTag => parse_delete_tag(args)?,
        CommandWord::AddMeeting => parse_add_meeting(args)?,
        CommandWord::Find => parse_find(args)?,
        CommandWord::Choose => {
            let display =
                DisplayType::from_str(args.trim()).map_err(|_| ParseError::format(word))?;
            Command::Choose(display)
        }
        CommandWord::Select => Command::Select(index_or_usage(args, word)?),
        CommandWord::Clear => Command::Clear,
        CommandWord::List => Command::List,
        CommandWord::Sort => Command::Sort,
        CommandWord::ListMostSearched => Command::ListMostSearched,
        CommandWord::Meetings => Command::Meetings,
        CommandWord::History => Command::History,
        CommandWord::Undo => Command::Undo,
        CommandWord::Redo => Command::Redo,
        CommandWord::Help => Command::Help,
        CommandWord::Exit => Command::Exit,
    };
    Ok(command)
}

/// Leading and trailing whitespace is ignored.
pub fn parse_index(raw: &str) -> Result<Index, ParseError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(Index::from_one_based)
        .ok_or(ParseError::InvalidIndex)
}

fn index_or_usage(raw: &str, word: CommandWord) -> Result<Index, ParseError> {
    parse_index(raw).map_err(|_| ParseError::format(word))
}

fn required<'a>(
    map: &'a ArgumentMultimap,
    prefix: Prefix,
    word: CommandWord,
) -> Result<&'a str, ParseError> {
    map.value(prefix).ok_or_else(|| ParseError::format(word))
}

fn parse_tags(values: &[String]) -> Result<BTreeSet<Tag>, ParseError> {
    values
        .iter()
        .map(|raw| Tag::parse(raw).map_err(ParseError::from))
        .collect()
}

fn parse_add(args: &str) -> Result<Command, ParseError> {
    let word = CommandWord::Add;
    let map = tokenize(
        args,
        &[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS, PREFIX_TAG],
    );
    if !map.preamble().is_empty() {
        return Err(ParseError::format(word));
    }
    let name = required(&map, PREFIX_NAME, word)?;
    let phone = required(&map, PREFIX_PHONE, word)?;
    let email = required(&map, PREFIX_EMAIL, word)?;
    let address = required(&map, PREFIX_ADDRESS, word)?;
    Ok(Command::Add(PersonDetails {
        name: Name::parse(name)?,
        phone: Phone::parse(phone)?,
        email: Email::parse(email)?,
        address: Address::parse(address)?,
        tags: parse_tags(map.all_values(PREFIX_TAG))?,
    }))
}

fn parse_edit(args: &str) -> Result<Command, ParseError> {
    let word = CommandWord::Edit;
    let map = tokenize(
        args,
        &[PREFIX_NAME, PREFIX_PHONE, PREFIX_EMAIL, PREFIX_ADDRESS, PREFIX_TAG],
    );
    let index = index_or_usage(map.preamble(), word)?;

    let descriptor = EditPersonDescriptor {
        name: map.value(PREFIX_NAME).map(Name::parse).transpose()?,
        phone: map.value(PREFIX_PHONE).map(Phone::parse).transpose()?,
        email: map.value(PREFIX_EMAIL).map(Email::parse).transpose()?,
        address: map.value(PREFIX_ADDRESS).map(Address::parse).transpose()?,
        tags: parse_tags_for_edit(map.all_values(PREFIX_TAG))?,
    };
    if !descriptor.is_any_field_edited() {
        return Err(ParseError::NothingToEdit);
    }
    Ok(Command::Edit { index, descriptor })
}

/// A lone empty `t/` clears every tag.
fn parse_tags_for_edit(values: &[String]) -> Result<Option<BTreeSet<Tag>>, ParseError> {
    match values {
        [] => Ok(None),
        [only] if only.is_empty() => Ok(Some(BTreeSet::new())),
        values => parse_tags(values).map(Some),
    }
}

fn parse_delete_tag(args: &str) -> Result<Command, ParseError> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return Err(ParseError::format(CommandWord::DeleteTag));
    }
    let mut tags: Vec<Tag> = Vec::new();
    for raw in trimmed.split_whitespace() {
        let tag = Tag::parse(raw)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(Command::DeleteTag(tags))
}

fn parse_add_meeting(args: &str) -> Result<Command, ParseError> {
    let word = CommandWord::AddMeeting;
    let map = tokenize(
        args,
        &[PREFIX_DATE_TIME, PREFIX_LOCATION, PREFIX_NOTES, PREFIX_PARTICIPANT],
    );
    if !map.preamble().is_empty() || !map.contains(PREFIX_PARTICIPANT) {
        return Err(ParseError::format(word));
    }
    let date_time = parse_date_time(required(&map, PREFIX_DATE_TIME, word)?)?;
    let location = Location::parse(required(&map, PREFIX_LOCATION, word)?)?;
    let notes = map.value(PREFIX_NOTES).unwrap_or_default().to_owned();
    let participants = map
        .all_values(PREFIX_PARTICIPANT)
        .iter()
        .map(|raw| parse_index(raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Command::AddMeeting {
        date_time,
        location,
        notes,
        participants,
    })
}

fn parse_find(args: &str) -> Result<Command, ParseError> {
    let query = parse_query(args)?;
    if !query.has_terms() && !query.has_filters() {
        return Err(ParseError::format(CommandWord::Find));
    }
    Ok(Command::Find(query))
}
