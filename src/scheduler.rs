//! Live evaluation of the schedule against the wall clock.
//!
//! `evaluate` is a pure function of (now, tasks, previously active id). The
//! focus view keeps a [`FocusTicker`] which carries the previous id between
//! ticks and rings the transition cue on task-ending edges.

use crate::models::{Task, TaskId};
use crate::notify::{Cue, Notifier};

/// Result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation<'a> {
    /// Task whose `[start, end)` contains now
    pub active: Option<&'a Task>,
    /// Earliest task starting strictly after now
    pub next: Option<&'a Task>,
    /// The previously active task just stopped being active
    pub transitioned: bool,
}

/// Evaluate `now` (minutes since midnight) against a start-sorted task list.
///
/// `transitioned` is true only when something was active before and now either
/// nothing is or a different task is. Idle -> task and the very first
/// evaluation (no previous id) never transition.
pub fn evaluate<'a>(now: u16, tasks: &'a [Task], previous_active: Option<&TaskId>) -> Evaluation<'a> {
    let active = tasks.iter().find(|t| t.contains(now));
    let next = tasks.iter().find(|t| t.start_minutes() > now);

    let transitioned = match previous_active {
        Some(prev) => active.map(|t| &t.id) != Some(prev),
        None => false,
    };

    Evaluation { active, next, transitioned }
}

/// Elapsed share of the active task, clamped to `0.0..=100.0`
pub fn progress_percent(active: &Task, now: u16) -> f64 {
    let start = f64::from(active.start_minutes());
    let end = f64::from(active.end_minutes());
    // end > start is a schedule invariant
    let pct = 100.0 * (f64::from(now) - start) / (end - start);
    pct.clamp(0.0, 100.0)
}

/// Minutes left in the active task, never negative
pub fn remaining_minutes(active: &Task, now: u16) -> u16 {
    active.end_minutes().saturating_sub(now)
}

/// Minutes until the next task starts, never negative
pub fn minutes_until(next: &Task, now: u16) -> u16 {
    next.start_minutes().saturating_sub(now)
}

/// Everything the focus screen needs for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct FocusSnapshot {
    pub now: u16,
    pub active: Option<ActiveBlock>,
    pub next: Option<UpcomingBlock>,
    pub transitioned: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBlock {
    pub task: Task,
    pub progress_percent: f64,
    pub remaining_minutes: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingBlock {
    pub task: Task,
    pub minutes_until: u16,
}

/// Per-focus-session evaluator state.
///
/// Lives exactly as long as the focus view; dropping it is how the periodic
/// evaluation stops. A fresh ticker has no previous task, so its first tick
/// never rings.
#[derive(Debug, Default, Clone)]
pub struct FocusTicker {
    previous_active: Option<TaskId>,
}

impl FocusTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_active(&self) -> Option<&TaskId> {
        self.previous_active.as_ref()
    }

    /// Evaluate once, ring on a task-ending edge, remember the active id
    pub fn tick(&mut self, now: u16, tasks: &[Task], notifier: &mut dyn Notifier) -> FocusSnapshot {
        let evaluation = evaluate(now, tasks, self.previous_active.as_ref());

        if evaluation.transitioned {
            tracing::info!(
                from = ?self.previous_active,
                to = ?evaluation.active.map(|t| &t.id),
                "active block ended"
            );
            notifier.play(Cue::Transition);
        }

        self.previous_active = evaluation.active.map(|t| t.id.clone());

        FocusSnapshot {
            now,
            active: evaluation.active.map(|task| ActiveBlock {
                task: task.clone(),
                progress_percent: progress_percent(task, now),
                remaining_minutes: remaining_minutes(task, now),
            }),
            next: evaluation.next.map(|task| UpcomingBlock {
                task: task.clone(),
                minutes_until: minutes_until(task, now),
            }),
            transitioned: evaluation.transitioned,
        }
    }
}
