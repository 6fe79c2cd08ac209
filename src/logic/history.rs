pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Raw command lines as entered, oldest first.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: Vec<String>,
    limit: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl CommandHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn add(&mut self, input: &str) {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return;
        }
        self.entries.push(trimmed.to_owned());
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(0..overflow);
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn most_recent_first(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_skips_blank_lines_and_drops_oldest() {
        let mut history = CommandHistory::new(2);
        history.add("list");
        history.add("   ");
        history.add("find alice");
        history.add(" undo ");
        assert_eq!(history.entries(), ["find alice", "undo"]);
        assert_eq!(history.most_recent_first().collect::<Vec<_>>(), ["undo", "find alice"]);
    }
}
