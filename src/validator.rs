use thiserror::Error;

use crate::models::Task;
use crate::time::TimeOfDay;

/// Why a proposed block was refused. The message is what the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name your task!")]
    EmptyTitle,
    #[error("Set start and end times!")]
    MissingTime,
    #[error("End time must be after start!")]
    InvalidRange,
    #[error("Time overlaps with another task!")]
    Overlap,
}

/// Half-open interval intersection
pub fn overlaps(start: TimeOfDay, end: TimeOfDay, task: &Task) -> bool {
    start < task.end_time && end > task.start_time
}

/// Check a proposed block against the existing schedule.
///
/// Checks run in order and stop at the first failure: title, presence of both
/// times, `start < end`, then overlap with every existing task. Returns the
/// validated `(start, end)` pair. Nothing is mutated.
pub fn validate(
    title: &str,
    start: Option<TimeOfDay>,
    end: Option<TimeOfDay>,
    existing: &[Task],
) -> Result<(TimeOfDay, TimeOfDay), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(ValidationError::MissingTime),
    };

    if start >= end {
        return Err(ValidationError::InvalidRange);
    }

    if existing.iter().any(|task| overlaps(start, end, task)) {
        return Err(ValidationError::Overlap);
    }

    Ok((start, end))
}
