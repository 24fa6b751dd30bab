//! Session controller: one day's schedule, the rating history and the current
//! view, kept in sync with a [`KeyValueStore`].
//!
//! Every mutation persists before returning. A failed write is logged and
//! surfaced as [`PlannerError::Storage`], but the in-memory state has already
//! changed and stays authoritative for the rest of the run.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Task, TaskId, View};
use crate::notify::{Cue, Notifier};
use crate::ratings::{RatingError, RatingLog};
use crate::rollover::rollover;
use crate::schedule::Schedule;
use crate::scheduler::{FocusSnapshot, FocusTicker};
use crate::storage::{self, KeyValueStore, PersistedState, StorageError};
use crate::time::TimeOfDay;
use crate::validator::ValidationError;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("The schedule is locked while focusing. Go back to edit it.")]
    Frozen,
    #[error("Add at least one block before starting the day")]
    EmptySchedule,
    #[error("Not available from the {0} view")]
    WrongView(View),
}

pub struct Planner<S: KeyValueStore> {
    store: S,
    notifier: Box<dyn Notifier>,
    schedule: Schedule,
    ratings: RatingLog,
    view: View,
    session_date: NaiveDate,
    ticker: Option<FocusTicker>,
}

impl<S: KeyValueStore> Planner<S> {
    /// Load persisted state and apply the daily rollover.
    ///
    /// Must run before anything else looks at the store. On a new day the
    /// session date and an empty task list are written back immediately.
    /// Failed writes are only logged; the session runs on the rollover result.
    pub fn open(mut store: S, notifier: Box<dyn Notifier>, today: NaiveDate) -> Self {
        let persisted = PersistedState::load(&store);
        let outcome = rollover(persisted.session_date, today, persisted.tasks, persisted.view);

        if outcome.new_day {
            let _ = storage::save_session_date(&mut store, today).inspect_err(log_write_failure);
            let _ = storage::save_tasks(&mut store, &outcome.tasks).inspect_err(log_write_failure);
        }
        let _ = storage::save_view(&mut store, outcome.view).inspect_err(log_write_failure);

        let ticker = (outcome.view == View::Focus).then(FocusTicker::new);

        tracing::info!(
            %today,
            view = %outcome.view,
            tasks = outcome.tasks.len(),
            ratings = persisted.logs.len(),
            "planner opened"
        );

        Self {
            store,
            notifier,
            schedule: Schedule::from_tasks(outcome.tasks),
            ratings: RatingLog::from_entries(persisted.logs),
            view: outcome.view,
            session_date: today,
            ticker,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn tasks(&self) -> &[Task] {
        self.schedule.tasks()
    }

    pub fn ratings(&self) -> &RatingLog {
        &self.ratings
    }

    pub fn session_date(&self) -> NaiveDate {
        self.session_date
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether the focus evaluator is running
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Play a cue for UI-only events, such as arming the reset
    pub fn cue(&mut self, cue: Cue) {
        self.notifier.play(cue);
    }

    /// Add a block. Refusals ring the rejection cue and leave everything as is.
    pub fn add_task(
        &mut self,
        title: &str,
        start: Option<TimeOfDay>,
        end: Option<TimeOfDay>,
    ) -> Result<Task, PlannerError> {
        self.require_editable()?;

        match self.schedule.add_task(title, start, end) {
            Ok(task) => {
                self.notifier.play(Cue::Interaction);
                self.persist_tasks()?;
                Ok(task)
            }
            Err(e) => {
                tracing::debug!(reason = ?e, "block rejected");
                self.notifier.play(Cue::Rejection);
                Err(e.into())
            }
        }
    }

    /// Remove a block; unknown ids are ignored
    pub fn remove_task(&mut self, id: &TaskId) -> Result<Option<Task>, PlannerError> {
        self.require_editable()?;
        let removed = self.schedule.remove_task(id);
        if removed.is_some() {
            self.notifier.play(Cue::Interaction);
            self.persist_tasks()?;
        }
        Ok(removed)
    }

    pub fn clear_all(&mut self) -> Result<(), PlannerError> {
        self.require_editable()?;
        self.schedule.clear_all();
        self.notifier.play(Cue::Interaction);
        self.persist_tasks()
    }

    /// build -> focus
    pub fn start_day(&mut self) -> Result<(), PlannerError> {
        self.require_view(View::Build)?;
        if self.schedule.is_empty() {
            self.notifier.play(Cue::Rejection);
            return Err(PlannerError::EmptySchedule);
        }
        self.set_view(View::Focus)
    }

    /// focus -> build
    pub fn edit_schedule(&mut self) -> Result<(), PlannerError> {
        self.require_view(View::Focus)?;
        self.set_view(View::Build)
    }

    /// focus -> review
    pub fn finish_day(&mut self) -> Result<(), PlannerError> {
        self.require_view(View::Focus)?;
        self.set_view(View::Review)
    }

    /// review -> focus
    pub fn cancel_review(&mut self) -> Result<(), PlannerError> {
        self.require_view(View::Review)?;
        self.set_view(View::Focus)
    }

    /// Save the day's rating, then start over with an empty schedule.
    ///
    /// Allowed from any view so the CLI can rate without walking the screens.
    pub fn save_rating(&mut self, rating: u8, date: NaiveDate) -> Result<(), PlannerError> {
        if let Err(e) = self.ratings.record(date, rating) {
            self.notifier.play(Cue::Rejection);
            return Err(e.into());
        }
        tracing::info!(%date, rating, "day rated");

        // Memory moves on in full first; the earliest write failure is reported
        self.schedule.clear_all();
        let logs = storage::save_logs(&mut self.store, self.ratings.entries()).inspect_err(log_write_failure);
        let tasks = self.persist_tasks();
        let view = self.set_view(View::Build);
        logs.map_err(PlannerError::from).and(tasks).and(view)
    }

    /// Evaluate the focus screen for `now`; `None` unless focusing
    pub fn tick(&mut self, now: u16) -> Option<FocusSnapshot> {
        let ticker = self.ticker.as_mut()?;
        Some(ticker.tick(now, self.schedule.tasks(), self.notifier.as_mut()))
    }

    fn require_view(&self, expected: View) -> Result<(), PlannerError> {
        if self.view == expected {
            Ok(())
        } else {
            Err(PlannerError::WrongView(self.view))
        }
    }

    fn require_editable(&self) -> Result<(), PlannerError> {
        match self.view {
            View::Build => Ok(()),
            _ => Err(PlannerError::Frozen),
        }
    }

    fn set_view(&mut self, view: View) -> Result<(), PlannerError> {
        tracing::info!(from = %self.view, to = %view, "view change");
        self.notifier.play(Cue::Interaction);
        self.view = view;
        // A new focus stint starts with no memory of earlier ticks
        self.ticker = (view == View::Focus).then(FocusTicker::new);
        storage::save_view(&mut self.store, view).inspect_err(log_write_failure)?;
        Ok(())
    }

    fn persist_tasks(&mut self) -> Result<(), PlannerError> {
        storage::save_tasks(&mut self.store, self.schedule.tasks()).inspect_err(log_write_failure)?;
        Ok(())
    }
}

fn log_write_failure(e: &StorageError) {
    tracing::warn!(error = %e, "failed to persist planner state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Recorder;
    use crate::database::DatabaseError;
    use crate::storage::{MemoryStore, TASKS_KEY, VIEW_KEY};

    /// Reads from a seeded store, refuses every write
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.load(key)
        }

        fn save(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(DatabaseError::DirectoryError("read-only".to_string()).into())
        }
    }

    fn date(s: &str) -> NaiveDate {
        crate::time::parse_date(s).unwrap()
    }

    fn t(s: &str) -> Option<TimeOfDay> {
        Some(s.parse().unwrap())
    }

    fn open(store: MemoryStore, today: &str) -> (Planner<MemoryStore>, Recorder) {
        let recorder = Recorder::new();
        let planner = Planner::open(store, Box::new(recorder.clone()), date(today));
        (planner, recorder)
    }

    #[test]
    fn fresh_store_opens_in_build() {
        let (planner, _) = open(MemoryStore::new(), "2024-01-01");
        assert_eq!(planner.view(), View::Build);
        assert!(planner.tasks().is_empty());
        assert!(!planner.is_ticking());
        assert_eq!(planner.store().raw(VIEW_KEY), Some("\"build\""));
        assert_eq!(planner.store().raw(TASKS_KEY), Some("[]"));
    }

    #[test]
    fn add_persists_and_cues() {
        let (mut planner, cues) = open(MemoryStore::new(), "2024-01-01");
        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        assert_eq!(cues.cues(), vec![Cue::Interaction]);
        let saved = planner.store().raw(TASKS_KEY).unwrap();
        assert!(saved.contains("\"Work\""));
    }

    #[test]
    fn rejected_add_cues_rejection() {
        let (mut planner, cues) = open(MemoryStore::new(), "2024-01-01");
        let err = planner.add_task("Work", t("10:00"), t("09:00")).unwrap_err();
        assert!(matches!(err, PlannerError::Validation(ValidationError::InvalidRange)));
        assert_eq!(cues.cues(), vec![Cue::Rejection]);
        assert!(planner.tasks().is_empty());
    }

    #[test]
    fn cannot_start_empty_day() {
        let (mut planner, cues) = open(MemoryStore::new(), "2024-01-01");
        assert!(matches!(planner.start_day(), Err(PlannerError::EmptySchedule)));
        assert_eq!(planner.view(), View::Build);
        assert_eq!(cues.count(Cue::Rejection), 1);
    }

    #[test]
    fn schedule_frozen_while_focusing() {
        let (mut planner, _) = open(MemoryStore::new(), "2024-01-01");
        let task = planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        planner.start_day().unwrap();

        assert!(matches!(planner.add_task("More", t("11:00"), t("12:00")), Err(PlannerError::Frozen)));
        assert!(matches!(planner.remove_task(&task.id), Err(PlannerError::Frozen)));
        assert!(matches!(planner.clear_all(), Err(PlannerError::Frozen)));
        assert_eq!(planner.tasks().len(), 1);
    }

    #[test]
    fn view_transitions() {
        let (mut planner, _) = open(MemoryStore::new(), "2024-01-01");
        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();

        assert!(matches!(planner.finish_day(), Err(PlannerError::WrongView(View::Build))));

        planner.start_day().unwrap();
        assert_eq!(planner.view(), View::Focus);
        assert!(planner.is_ticking());

        planner.edit_schedule().unwrap();
        assert_eq!(planner.view(), View::Build);
        assert!(!planner.is_ticking());

        planner.start_day().unwrap();
        planner.finish_day().unwrap();
        assert_eq!(planner.view(), View::Review);
        assert!(!planner.is_ticking());
        assert_eq!(planner.store().raw(VIEW_KEY), Some("\"review\""));

        planner.cancel_review().unwrap();
        assert_eq!(planner.view(), View::Focus);
        assert!(planner.is_ticking());
    }

    #[test]
    fn tick_only_while_focusing() {
        let (mut planner, cues) = open(MemoryStore::new(), "2024-01-01");
        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        assert!(planner.tick(570).is_none());

        planner.start_day().unwrap();
        let snap = planner.tick(570).unwrap();
        assert_eq!(snap.active.map(|a| a.task.title), Some("Work".to_string()));

        let snap = planner.tick(600).unwrap();
        assert!(snap.transitioned);
        assert_eq!(cues.count(Cue::Transition), 1);
    }

    #[test]
    fn leaving_focus_resets_edge_memory() {
        let (mut planner, cues) = open(MemoryStore::new(), "2024-01-01");
        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        planner.start_day().unwrap();
        planner.tick(570);

        planner.edit_schedule().unwrap();
        planner.start_day().unwrap();
        // Fresh ticker: first tick after re-entering never rings
        let snap = planner.tick(600).unwrap();
        assert!(!snap.transitioned);
        assert_eq!(cues.count(Cue::Transition), 0);
    }

    #[test]
    fn save_rating_resets_day() {
        let (mut planner, _) = open(MemoryStore::new(), "2024-01-01");
        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        planner.start_day().unwrap();
        planner.finish_day().unwrap();

        planner.save_rating(7, date("2024-01-01")).unwrap();
        assert_eq!(planner.view(), View::Build);
        assert!(planner.tasks().is_empty());
        assert_eq!(planner.ratings().get(date("2024-01-01")).map(|e| e.rating), Some(7));

        planner.save_rating(9, date("2024-01-01")).unwrap();
        assert_eq!(planner.ratings().len(), 1);
        assert_eq!(planner.ratings().get(date("2024-01-01")).map(|e| e.rating), Some(9));
    }

    #[test]
    fn bad_rating_changes_nothing() {
        let (mut planner, _) = open(MemoryStore::new(), "2024-01-01");
        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        assert!(matches!(planner.save_rating(11, date("2024-01-01")), Err(PlannerError::Rating(_))));
        assert_eq!(planner.tasks().len(), 1);
        assert!(planner.ratings().is_empty());
    }

    #[test]
    fn same_day_reopen_restores_focus() {
        let (mut planner, _) = open(MemoryStore::new(), "2024-01-01");
        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        planner.start_day().unwrap();
        let store = planner.store().clone();

        let (reopened, _) = open(store, "2024-01-01");
        assert_eq!(reopened.view(), View::Focus);
        assert_eq!(reopened.tasks().len(), 1);
        assert!(reopened.is_ticking());
    }

    #[test]
    fn next_day_reopen_starts_fresh_but_keeps_ratings() {
        let (mut planner, _) = open(MemoryStore::new(), "2024-01-01");
        planner.save_rating(6, date("2024-01-01")).unwrap();
        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        planner.start_day().unwrap();
        let store = planner.store().clone();

        let (reopened, _) = open(store, "2024-01-02");
        assert_eq!(reopened.view(), View::Build);
        assert!(reopened.tasks().is_empty());
        assert_eq!(reopened.ratings().len(), 1);
        assert_eq!(reopened.store().raw(crate::storage::SESSION_DATE_KEY), Some("\"2024-01-02\""));
    }

    #[test]
    fn user_actions_cue_interaction() {
        let (mut planner, cues) = open(MemoryStore::new(), "2024-01-01");
        let task = planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        assert_eq!(cues.count(Cue::Interaction), 1);

        planner.remove_task(&task.id).unwrap();
        assert_eq!(cues.count(Cue::Interaction), 2);
        // Nothing removed, nothing heard
        planner.remove_task(&task.id).unwrap();
        assert_eq!(cues.count(Cue::Interaction), 2);

        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        planner.clear_all().unwrap();
        assert_eq!(cues.count(Cue::Interaction), 4);

        planner.add_task("Work", t("09:00"), t("10:00")).unwrap();
        planner.start_day().unwrap();
        assert_eq!(cues.count(Cue::Interaction), 6);
        planner.edit_schedule().unwrap();
        assert_eq!(cues.count(Cue::Interaction), 7);
        planner.start_day().unwrap();
        planner.finish_day().unwrap();
        assert_eq!(cues.count(Cue::Interaction), 9);
        planner.cancel_review().unwrap();
        assert_eq!(cues.count(Cue::Interaction), 10);
        planner.finish_day().unwrap();
        planner.save_rating(8, date("2024-01-01")).unwrap();
        assert_eq!(cues.count(Cue::Interaction), 12);
        assert_eq!(cues.count(Cue::Rejection), 0);
    }

    #[test]
    fn failed_writes_keep_memory_state() {
        let mut seeded = MemoryStore::new();
        storage::save_session_date(&mut seeded, date("2023-12-31")).unwrap();
        storage::save_view(&mut seeded, View::Focus).unwrap();

        // New day over an unwritable store still opens, on the rollover result
        let recorder = Recorder::new();
        let mut planner = Planner::open(ReadOnlyStore(seeded), Box::new(recorder), date("2024-01-01"));
        assert_eq!(planner.view(), View::Build);
        assert!(planner.tasks().is_empty());

        let err = planner.add_task("Work", t("09:00"), t("10:00")).unwrap_err();
        assert!(matches!(err, PlannerError::Storage(_)));
        assert_eq!(planner.tasks().len(), 1);

        assert!(matches!(planner.start_day(), Err(PlannerError::Storage(_))));
        assert_eq!(planner.view(), View::Focus);
        assert!(planner.is_ticking());

        assert!(matches!(planner.finish_day(), Err(PlannerError::Storage(_))));
        assert_eq!(planner.view(), View::Review);
    }

    #[test]
    fn failed_rating_save_still_resets_day() {
        let mut planner = Planner::open(
            ReadOnlyStore(MemoryStore::new()),
            Box::new(Recorder::new()),
            date("2024-01-01"),
        );
        let _ = planner.add_task("Work", t("09:00"), t("10:00"));
        let _ = planner.start_day();
        let _ = planner.finish_day();

        let err = planner.save_rating(7, date("2024-01-01")).unwrap_err();
        assert!(matches!(err, PlannerError::Storage(_)));
        assert_eq!(planner.view(), View::Build);
        assert!(planner.tasks().is_empty());
        assert!(!planner.is_ticking());
        assert_eq!(planner.ratings().get(date("2024-01-01")).map(|e| e.rating), Some(7));
    }
}
