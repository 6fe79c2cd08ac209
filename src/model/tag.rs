use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::FieldError;

pub const MESSAGE_TAG_CONSTRAINTS: &str = "Tags names should be alphanumeric";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}\p{N}]+$").expect("valid tag regex"));

/// A label attached to people. Tags only exist through the people carrying them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if !TAG_RE.is_match(trimmed) {
            return Err(FieldError(MESSAGE_TAG_CONSTRAINTS));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}
