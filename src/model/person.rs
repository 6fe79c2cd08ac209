use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::tag::Tag;
use super::FieldError;

pub const MESSAGE_NAME_CONSTRAINTS: &str =
    "Person names should only contain alphanumeric characters and spaces, and it should not be blank";
pub const MESSAGE_PHONE_CONSTRAINTS: &str =
    "Phone numbers can only contain numbers, and should be at least 3 digits long";
pub const MESSAGE_EMAIL_CONSTRAINTS: &str =
    "Person emails should be 2 parts separated by '@', a local part and a domain of letters, digits, '-' and '.'";
pub const MESSAGE_ADDRESS_CONSTRAINTS: &str =
    "Person addresses can take any values, and it should not be blank";

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} ]*$").expect("valid name regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{3,}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_!#$%&'*+/=?`{|}~^.\-]+@[A-Za-z0-9][A-Za-z0-9.\-]*$")
        .expect("valid email regex")
});

/// Stable identity of a person. Allocated by the model store and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InternalId(u64);

impl InternalId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! text_field {
    ($name:ident, $message:expr, $valid:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, FieldError> {
                let trimmed = raw.trim();
                let valid: fn(&str) -> bool = $valid;
                if !valid(trimmed) {
                    return Err(FieldError($message));
                }
                Ok(Self(trimmed.to_owned()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_field!(Name, MESSAGE_NAME_CONSTRAINTS, |s| NAME_RE.is_match(s));
text_field!(Phone, MESSAGE_PHONE_CONSTRAINTS, |s| PHONE_RE.is_match(s));
text_field!(Email, MESSAGE_EMAIL_CONSTRAINTS, |s| EMAIL_RE.is_match(s));
text_field!(Address, MESSAGE_ADDRESS_CONSTRAINTS, |s| !s.is_empty());

/// Number of times a person showed up in `find` results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchData {
    count: u32,
}

impl SearchData {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }
}

/// Everything a user can type about a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDetails {
    pub name: Name,
    pub phone: Phone,
    pub email: Email,
    pub address: Address,
    pub tags: BTreeSet<Tag>,
}

impl PersonDetails {
    /// Two entries describe the same person when every contact field matches.
    /// Tags do not take part.
    pub fn is_same_person(&self, other: &PersonDetails) -> bool {
        self.name == other.name
            && self.phone == other.phone
            && self.email == other.email
            && self.address == other.address
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    id: InternalId,
    details: PersonDetails,
    search: SearchData,
}

impl Person {
    pub fn new(id: InternalId, details: PersonDetails) -> Self {
        Self {
            id,
            details,
            search: SearchData::default(),
        }
    }

    pub fn id(&self) -> InternalId {
        self.id
    }

    pub fn details(&self) -> &PersonDetails {
        &self.details
    }

    pub fn name(&self) -> &Name {
        &self.details.name
    }

    pub fn phone(&self) -> &Phone {
        &self.details.phone
    }

    pub fn email(&self) -> &Email {
        &self.details.email
    }

    pub fn address(&self) -> &Address {
        &self.details.address
    }

    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.details.tags
    }

    pub fn search_count(&self) -> u32 {
        self.search.count()
    }

    pub(crate) fn record_search(&mut self) {
        self.search.increment();
    }

    /// Same identity and search history, new details.
    pub fn with_details(&self, details: PersonDetails) -> Self {
        Self {
            id: self.id,
            details,
            search: self.search,
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Phone: {} Email: {} Address: {} Tags: ",
            self.name(),
            self.phone(),
            self.email(),
            self.address()
        )?;
        for tag in self.tags() {
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn details(name: &str, phone: &str, tags: &[&str]) -> PersonDetails {
        let email = format!("{}@example.com", name.replace(' ', "").to_lowercase());
        PersonDetails {
            name: Name::parse(name).unwrap(),
            phone: Phone::parse(phone).unwrap(),
            email: Email::parse(&email).unwrap(),
            address: Address::parse("Blk 30 Geylang Street 29, #06-40").unwrap(),
            tags: tags.iter().map(|t| Tag::parse(t).unwrap()).collect(),
        }
    }

    #[test]
    fn field_validation_matches_constraints() {
        assert!(Name::parse("Alex Yeoh").is_ok());
        assert_eq!(
            Name::parse("  ").unwrap_err().to_string(),
            MESSAGE_NAME_CONSTRAINTS
        );
        assert!(Name::parse("peter*").is_err());
        assert!(Phone::parse("911").is_ok());
        assert!(Phone::parse("91").is_err());
        assert!(Phone::parse("9011p041").is_err());
        assert!(Email::parse("PeterJack_1190@example.com").is_ok());
        assert!(Email::parse("peterjack@").is_err());
        assert!(Email::parse("@example.com").is_err());
        assert!(Address::parse("").is_err());
    }

    #[test]
    fn duplicate_detection_ignores_tags_and_identity() {
        let alice = details("Alice Pauline", "94351253", &["friends"]);
        let retagged = details("Alice Pauline", "94351253", &["colleagues"]);
        let other_phone = details("Alice Pauline", "91234567", &["friends"]);
        assert!(alice.is_same_person(&retagged));
        assert!(!alice.is_same_person(&other_phone));
    }

    #[test]
    fn with_details_keeps_id_and_search_count() {
        let mut person = Person::new(InternalId::new(4), details("Bob", "123", &[]));
        person.record_search();
        let edited = person.with_details(details("Bobby", "123", &[]));
        assert_eq!(edited.id(), InternalId::new(4));
        assert_eq!(edited.search_count(), 1);
        assert_eq!(edited.name().as_str(), "Bobby");
    }

    #[test]
    fn display_lists_fields_and_tags() {
        let person = Person::new(
            InternalId::new(1),
            details("Carl Kurz", "95352563", &["owesMoney", "friends"]),
        );
        assert_eq!(
            person.to_string(),
            "Carl Kurz Phone: 95352563 Email: carlkurz@example.com Address: Blk 30 Geylang Street 29, #06-40 Tags: [friends][owesMoney]"
        );
    }
}
