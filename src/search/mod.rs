use crate::model::{Person, Tag};

/// A parsed `find` query: name keywords plus `tag:` filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub tags: Vec<Tag>,
}

impl SearchQuery {
    pub fn has_terms(&self) -> bool {
        !self.keywords.is_empty()
    }

    pub fn has_filters(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Any keyword equal (ignoring case) to a word of the name, and every tag
    /// filter carried by the person.
    pub fn matches(&self, person: &Person) -> bool {
        let name_matches = !self.has_terms()
            || person.name().as_str().split_whitespace().any(|word| {
                let word = word.to_lowercase();
                self.keywords.iter().any(|keyword| keyword.to_lowercase() == word)
            });
        let tags_match = self.tags.iter().all(|tag| person.tags().contains(tag));
        name_matches && tags_match
    }
}

/// Predicate of the filtered person view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PersonPredicate {
    #[default]
    ShowAll,
    Query(SearchQuery),
}

impl PersonPredicate {
    pub fn matches(&self, person: &Person) -> bool {
        match self {
            PersonPredicate::ShowAll => true,
            PersonPredicate::Query(query) => query.matches(person),
        }
    }
}

/// Splits raw `find` arguments. Malformed `tag:` values are reported back so
/// the parser can surface them.
pub fn parse_query(input: &str) -> Result<SearchQuery, crate::model::FieldError> {
    let mut query = SearchQuery::default();
    for raw in input.split_whitespace() {
        if let Some(tag) = raw.strip_prefix("tag:") {
            let tag = Tag::parse(tag)?;
            if !query.tags.contains(&tag) {
                query.tags.push(tag);
            }
            continue;
        }
        if let Some(value) = sanitize_term(raw) {
            query.keywords.push(value);
        }
    }
    Ok(query)
}

fn sanitize_term(raw: &str) -> Option<String> {
    let term: String = raw.chars().filter(|ch| ch.is_alphanumeric()).collect();
    if term.is_empty() {
        None
    } else {
        Some(term)
    }
}
