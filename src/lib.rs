pub mod cli;
pub mod config;
pub mod database;
pub mod models;
pub mod notify;
pub mod planner;
pub mod ratings;
pub mod rollover;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod time;
pub mod tui;
pub mod utils;
pub mod validator;

pub use config::Config;
pub use database::Database;
pub use models::{DailyLogEntry, Task, TaskColor, TaskId, View};
pub use planner::{Planner, PlannerError};
pub use storage::{KeyValueStore, MemoryStore};
pub use time::TimeOfDay;
pub use utils::Profile;
