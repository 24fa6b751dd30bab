use crate::models::{Task, TaskColor, TaskId};
use crate::time::TimeOfDay;
use crate::validator::{self, ValidationError};

/// Today's blocks, always sorted by start time.
///
/// `add_task` is the only way in that runs validation; `replace_all` trusts its
/// input (restored state) but still sorts it.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    tasks: Vec<Task>,
    colors_assigned: usize,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut schedule = Self::new();
        schedule.replace_all(tasks);
        schedule
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Validate and insert a new block, returning the stored task
    pub fn add_task(
        &mut self,
        title: &str,
        start: Option<TimeOfDay>,
        end: Option<TimeOfDay>,
    ) -> Result<Task, ValidationError> {
        let (start, end) = validator::validate(title, start, end, &self.tasks)?;

        let color = TaskColor::nth(self.colors_assigned);
        self.colors_assigned += 1;

        let task = Task::new(title.trim().to_string(), start, end, color);
        self.tasks.push(task.clone());
        self.sort();

        tracing::debug!(id = %task.id, start = %task.start_time, end = %task.end_time, "task added");
        Ok(task)
    }

    /// Remove by id; an unknown id is a no-op
    pub fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| &t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn clear_all(&mut self) {
        self.tasks.clear();
    }

    /// Set the whole collection verbatim (no validation)
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.colors_assigned = tasks.len();
        self.tasks = tasks;
        self.sort();
    }

    // Stable, so equal starts keep insertion order
    fn sort(&mut self) {
        self.tasks.sort_by_key(|t| t.start_minutes());
    }
}
