use std::collections::HashMap;

/// Marks the start of an argument value, e.g. `n/` in `n/John Doe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix(&'static str);

impl Prefix {
    pub const fn new(token: &'static str) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

pub const PREFIX_NAME: Prefix = Prefix::new("n/");
pub const PREFIX_PHONE: Prefix = Prefix::new("p/");
pub const PREFIX_EMAIL: Prefix = Prefix::new("e/");
pub const PREFIX_ADDRESS: Prefix = Prefix::new("a/");
pub const PREFIX_TAG: Prefix = Prefix::new("t/");
pub const PREFIX_DATE_TIME: Prefix = Prefix::new("d/");
pub const PREFIX_LOCATION: Prefix = Prefix::new("l/");
pub const PREFIX_NOTES: Prefix = Prefix::new("n/");
pub const PREFIX_PARTICIPANT: Prefix = Prefix::new("p/");

/// Values collected per prefix, in the order they appeared, plus the text
/// before the first prefix.
#[derive(Debug, Clone, Default)]
pub struct ArgumentMultimap {
    preamble: String,
    values: HashMap<Prefix, Vec<String>>,
}

impl ArgumentMultimap {
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn value(&self, prefix: Prefix) -> Option<&str> {
        self.values
            .get(&prefix)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    pub fn all_values(&self, prefix: Prefix) -> &[String] {
        self.values.get(&prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, prefix: Prefix) -> bool {
        self.values.contains_key(&prefix)
    }
}

/// Splits `args` on the given prefixes. A prefix only counts at the start of
/// the string or right after whitespace, so `a/` inside `foo@bar/a/` is text.
pub fn tokenize(args: &str, prefixes: &[Prefix]) -> ArgumentMultimap {
    let mut positions: Vec<(usize, Prefix)> = prefixes
        .iter()
        .flat_map(|prefix| {
            args.match_indices(prefix.as_str())
                .filter(|(pos, _)| {
                    *pos == 0
                        || args[..*pos]
                            .chars()
                            .next_back()
                            .is_some_and(char::is_whitespace)
                })
                .map(move |(pos, _)| (pos, *prefix))
        })
        .collect();
    positions.sort_by_key(|(pos, _)| *pos);
    positions.dedup_by_key(|(pos, _)| *pos);

    let mut map = ArgumentMultimap::default();
    let preamble_end = positions.first().map_or(args.len(), |(pos, _)| *pos);
    map.preamble = args[..preamble_end].trim().to_owned();

    for (i, (start, prefix)) in positions.iter().enumerate() {
        let value_start = start + prefix.as_str().len();
        let value_end = positions.get(i + 1).map_or(args.len(), |(next, _)| *next);
        let value = args[value_start..value_end].trim().to_owned();
        map.values.entry(*prefix).or_default().push(value);
    }
    map
}
