pub mod cli;
pub mod config;
pub mod logic;
pub mod model;
pub mod search;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use logic::{LogicError, LogicManager};
pub use model::{Model, ModelManager};
