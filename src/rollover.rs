use chrono::NaiveDate;

use crate::models::{Task, View};

/// What startup should restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverOutcome {
    pub tasks: Vec<Task>,
    pub view: View,
    /// Today differs from the recorded session date; the caller records the new date
    pub new_day: bool,
}

/// Decide whether persisted state still belongs to today.
///
/// A different (or missing) session date means a fresh day: no tasks, build
/// view. On the same day the tasks come back verbatim, and the saved view is
/// kept only if it is past build and there is something to show; a focus or
/// review marker with no tasks falls back to build.
pub fn rollover(
    recorded_date: Option<NaiveDate>,
    today: NaiveDate,
    persisted_tasks: Vec<Task>,
    persisted_view: Option<View>,
) -> RolloverOutcome {
    if recorded_date != Some(today) {
        tracing::info!(?recorded_date, %today, discarded = persisted_tasks.len(), "new day, starting fresh");
        return RolloverOutcome {
            tasks: Vec::new(),
            view: View::Build,
            new_day: true,
        };
    }

    let view = match persisted_view {
        Some(view) if view != View::Build && !persisted_tasks.is_empty() => view,
        _ => View::Build,
    };

    RolloverOutcome {
        tasks: persisted_tasks,
        view,
        new_day: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskColor;

    fn date(s: &str) -> NaiveDate {
        crate::time::parse_date(s).unwrap()
    }

    fn tasks() -> Vec<Task> {
        vec![Task::new(
            "Work".to_string(),
            "09:00".parse().unwrap(),
            "10:00".parse().unwrap(),
            TaskColor::Purple,
        )]
    }

    #[test]
    fn new_day_discards_everything() {
        let out = rollover(Some(date("2024-01-01")), date("2024-01-02"), tasks(), Some(View::Focus));
        assert!(out.tasks.is_empty());
        assert_eq!(out.view, View::Build);
        assert!(out.new_day);
    }

    #[test]
    fn missing_date_is_new_day() {
        let out = rollover(None, date("2024-01-02"), tasks(), Some(View::Review));
        assert!(out.tasks.is_empty());
        assert_eq!(out.view, View::Build);
        assert!(out.new_day);
    }

    #[test]
    fn same_day_restores_tasks_and_view() {
        let saved = tasks();
        let out = rollover(Some(date("2024-01-02")), date("2024-01-02"), saved.clone(), Some(View::Focus));
        assert_eq!(out.tasks, saved);
        assert_eq!(out.view, View::Focus);
        assert!(!out.new_day);
    }

    #[test]
    fn focus_without_tasks_falls_back_to_build() {
        let out = rollover(Some(date("2024-01-02")), date("2024-01-02"), Vec::new(), Some(View::Focus));
        assert_eq!(out.view, View::Build);
        let out = rollover(Some(date("2024-01-02")), date("2024-01-02"), Vec::new(), Some(View::Review));
        assert_eq!(out.view, View::Build);
    }

    #[test]
    fn missing_view_is_build() {
        let out = rollover(Some(date("2024-01-02")), date("2024-01-02"), tasks(), None);
        assert_eq!(out.view, View::Build);
        assert_eq!(out.tasks.len(), 1);
    }
}
