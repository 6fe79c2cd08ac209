use thiserror::Error;

pub mod commands;
pub mod events;
pub mod history;
pub mod parser;
pub mod tokenizer;
pub mod undo;

pub use commands::{Command, CommandError, CommandResult, CommandWord, ExecutionContext};
pub use events::{DisplayType, EventObserver, Observers, UiEvent};
pub use history::CommandHistory;
pub use parser::{parse_command, ParseError};
pub use undo::{Operation, UndoRedoStack};

use crate::model::{Model, ModelManager, Person};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Owns the session state. `execute` is the only way in.
#[derive(Debug)]
pub struct LogicManager {
    model: ModelManager,
    history: CommandHistory,
    undo_stack: UndoRedoStack,
    observers: Observers,
}

impl LogicManager {
    pub fn new(model: ModelManager, undo_limit: usize, history_limit: usize) -> Self {
        Self {
            model,
            history: CommandHistory::new(history_limit),
            undo_stack: UndoRedoStack::new(undo_limit),
            observers: Observers::default(),
        }
    }

    pub fn register_observer(&mut self, observer: impl EventObserver + 'static) {
        self.observers.register(observer);
    }

    /// Runs one command line. The line is recorded in the history whether or
    /// not it succeeds; observers only hear about successful commands.
    pub fn execute(&mut self, input: &str) -> Result<CommandResult, LogicError> {
        let outcome = self.run(input);
        self.history.add(input);
        let result = outcome?;
        if let Some(event) = &result.event {
            self.observers.publish(event);
        }
        Ok(result)
    }

    fn run(&mut self, input: &str) -> Result<CommandResult, LogicError> {
        let command = parse_command(input)?;
        tracing::debug!(
            word = %command.word(),
            undoable = command.is_undoable(),
            "executing command"
        );
        let mut ctx = ExecutionContext {
            model: &mut self.model,
            history: &self.history,
            undo_stack: &mut self.undo_stack,
        };
        command.execute(&mut ctx).map_err(|err| {
            tracing::debug!(word = %command.word(), %err, "command failed");
            LogicError::from(err)
        })
    }

    pub fn model(&self) -> &ModelManager {
        &self.model
    }

    pub fn filtered_person_list(&self) -> Vec<&Person> {
        self.model.filtered_person_list()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }
}
