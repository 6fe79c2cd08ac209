use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use time::format_description::{self, FormatItem};
use time::PrimitiveDateTime;

use super::person::InternalId;
use super::FieldError;

pub const MESSAGE_DATE_TIME_CONSTRAINTS: &str =
    "Meeting date-time should be in the format YYYY-MM-DD HH:MM";
pub const MESSAGE_LOCATION_CONSTRAINTS: &str =
    "Meeting locations can take any values, and it should not be blank";
pub const MESSAGE_PARTICIPANTS_CONSTRAINTS: &str = "A meeting needs at least one participant";

static DATE_TIME_FORMATS: Lazy<Vec<Vec<FormatItem<'static>>>> = Lazy::new(|| {
    [
        "[year]-[month]-[day] [hour]:[minute]",
        "[year]-[month]-[day]T[hour]:[minute]",
    ]
    .into_iter()
    .map(|desc| format_description::parse(desc).expect("valid date-time format description"))
    .collect()
});

pub fn parse_date_time(raw: &str) -> Result<PrimitiveDateTime, FieldError> {
    let trimmed = raw.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(trimmed, format).ok())
        .ok_or(FieldError(MESSAGE_DATE_TIME_CONSTRAINTS))
}

pub fn format_date_time(value: PrimitiveDateTime) -> String {
    value
        .format(&DATE_TIME_FORMATS[0])
        .unwrap_or_else(|_| value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError(MESSAGE_LOCATION_CONSTRAINTS));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A meeting between people, referenced by internal id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meeting {
    date_time: PrimitiveDateTime,
    location: Location,
    notes: String,
    participants: BTreeSet<InternalId>,
}

impl Meeting {
    pub fn new(
        date_time: PrimitiveDateTime,
        location: Location,
        notes: impl Into<String>,
        participants: BTreeSet<InternalId>,
    ) -> Result<Self, FieldError> {
        if participants.is_empty() {
            return Err(FieldError(MESSAGE_PARTICIPANTS_CONSTRAINTS));
        }
        Ok(Self {
            date_time,
            location,
            notes: notes.into().trim().to_owned(),
            participants,
        })
    }

    pub fn date_time(&self) -> PrimitiveDateTime {
        self.date_time
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn participants(&self) -> &BTreeSet<InternalId> {
        &self.participants
    }

    /// Notes are free text and do not distinguish meetings.
    pub fn is_same_meeting(&self, other: &Meeting) -> bool {
        self.date_time == other.date_time
            && self.location == other.location
            && self.participants == other.participants
    }
}

impl fmt::Display for Meeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}",
            format_date_time(self.date_time),
            self.location
        )?;
        if !self.notes.is_empty() {
            write!(f, " ({})", self.notes)?;
        }
        Ok(())
    }
}

/// Meetings ordered by date-time; equal times keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetingList {
    meetings: Vec<Meeting>,
}

impl MeetingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meetings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Meeting> {
        self.meetings.iter()
    }

    pub fn contains(&self, meeting: &Meeting) -> bool {
        self.meetings.iter().any(|m| m.is_same_meeting(meeting))
    }

    /// Returns `false` and leaves the list untouched when a same meeting exists.
    pub(crate) fn add(&mut self, meeting: Meeting) -> bool {
        if self.contains(&meeting) {
            return false;
        }
        let position = self
            .meetings
            .partition_point(|m| m.date_time <= meeting.date_time);
        self.meetings.insert(position, meeting);
        true
    }

    pub(crate) fn remove(&mut self, meeting: &Meeting) -> Option<Meeting> {
        let position = self.meetings.iter().position(|m| m.is_same_meeting(meeting))?;
        Some(self.meetings.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn meeting(at: PrimitiveDateTime, location: &str, ids: &[u64]) -> Meeting {
        Meeting::new(
            at,
            Location::parse(location).unwrap(),
            "notes",
            ids.iter().copied().map(InternalId::new).collect(),
        )
        .unwrap()
    }

    #[test]
    fn parses_both_date_time_separators() {
        assert_eq!(parse_date_time("2020-10-31 18:00").unwrap(), datetime!(2020-10-31 18:00));
        assert_eq!(parse_date_time("2020-10-31T18:00").unwrap(), datetime!(2020-10-31 18:00));
        assert!(parse_date_time("31/10/2020 6pm").is_err());
        assert_eq!(format_date_time(datetime!(2020-01-02 09:05)), "2020-01-02 09:05");
    }

    #[test]
    fn meeting_requires_participants() {
        let err = Meeting::new(
            datetime!(2020-10-31 18:00),
            Location::parse("Computing").unwrap(),
            "",
            BTreeSet::new(),
        )
        .unwrap_err();
        assert_eq!(err.0, MESSAGE_PARTICIPANTS_CONSTRAINTS);
    }

    #[test]
    fn list_rejects_same_meeting_and_keeps_time_order() {
        let mut list = MeetingList::new();
        assert!(list.add(meeting(datetime!(2020-11-01 10:00), "COM1", &[1])));
        assert!(list.add(meeting(datetime!(2020-10-31 18:00), "Computing", &[1, 2])));
        assert!(!list.add(meeting(datetime!(2020-10-31 18:00), "Computing", &[2, 1])));
        assert!(list.add(meeting(datetime!(2020-10-31 18:00), "Computing", &[2])));

        let locations: Vec<_> = list.iter().map(|m| m.location().as_str().to_owned()).collect();
        assert_eq!(locations, ["Computing", "Computing", "COM1"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn remove_finds_meeting_by_key() {
        let mut list = MeetingList::new();
        let target = meeting(datetime!(2020-10-31 18:00), "Computing", &[1]);
        list.add(target.clone());
        assert!(list.remove(&target).is_some());
        assert!(list.remove(&target).is_none());
        assert!(list.is_empty());
    }
}
