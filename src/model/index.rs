use std::fmt;
use std::num::NonZeroUsize;

use serde::Serialize;

/// 1-based position into the person list as currently shown.
///
/// Only meaningful against the filtered and sorted view it was typed against;
/// resolve it to an `InternalId` right before mutating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Index(NonZeroUsize);

impl Index {
    pub fn from_one_based(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(Self)
    }

    pub fn one_based(self) -> usize {
        self.0.get()
    }

    pub fn zero_based(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_bases() {
        assert!(Index::from_one_based(0).is_none());
        let third = Index::from_one_based(3).unwrap();
        assert_eq!(third.zero_based(), 2);
        assert_eq!(third.to_string(), "3");
    }
}
