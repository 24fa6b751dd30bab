use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

use crate::config::KeyBindings;
use crate::models::{Task, View};
use crate::notify::Cue;
use crate::planner::{Planner, PlannerError};
use crate::ratings::{MAX_RATING, MIN_RATING};
use crate::scheduler::FocusSnapshot;
use crate::storage::KeyValueStore;
use crate::time::{self, TimeOfDay};
use crate::tui::error::TuiError;
use crate::tui::widgets::editor::Editor;
use crate::utils::{ParsedKeyBinding, parse_key_binding};
use crate::Config;

/// The planner as the TUI drives it; the store is picked at startup
pub type SessionPlanner = Planner<Box<dyn KeyValueStore>>;

/// Second press of the reset key must land inside this window
pub const RESET_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

pub const DEFAULT_REVIEW_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Form,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Start,
    End,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Start,
            FormField::Start => FormField::End,
            FormField::End => FormField::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Title => FormField::End,
            FormField::Start => FormField::Title,
            FormField::End => FormField::Start,
        }
    }
}

/// The add-block form on the build screen
#[derive(Debug, Clone, Default)]
pub struct BlockForm {
    pub current_field: FormField,
    pub title: Editor,
    pub start: Editor,
    pub end: Editor,
}

impl BlockForm {
    pub fn editor(&self, field: FormField) -> &Editor {
        match field {
            FormField::Title => &self.title,
            FormField::Start => &self.start,
            FormField::End => &self.end,
        }
    }

    pub fn current_editor_mut(&mut self) -> &mut Editor {
        match self.current_field {
            FormField::Title => &mut self.title,
            FormField::Start => &mut self.start,
            FormField::End => &mut self.end,
        }
    }

    /// Blank or unreadable time fields count as missing
    fn time_field(editor: &Editor) -> Option<TimeOfDay> {
        if editor.is_blank() {
            return None;
        }
        editor.text().trim().parse().ok()
    }

    /// Ready the form for the next block: it starts where this one ended
    fn prepare_next(&mut self, previous_end: TimeOfDay) {
        self.title.clear();
        self.start.set_content(previous_end.to_string());
        self.end.clear();
        self.current_field = FormField::Title;
    }
}

/// Key bindings parsed once at startup
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub quit: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
    pub new: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub reset: ParsedKeyBinding,
    pub start: ParsedKeyBinding,
    pub end_day: ParsedKeyBinding,
    pub edit: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
    pub next_field: ParsedKeyBinding,
}

impl KeyMap {
    pub fn from_config(bindings: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |s: &str| parse_key_binding(s).map_err(TuiError::KeyBindingError);
        Ok(Self {
            quit: parse(&bindings.quit)?,
            help: parse(&bindings.help)?,
            new: parse(&bindings.new)?,
            delete: parse(&bindings.delete)?,
            reset: parse(&bindings.reset)?,
            start: parse(&bindings.start)?,
            end_day: parse(&bindings.end_day)?,
            edit: parse(&bindings.edit)?,
            list_up: parse(&bindings.list_up)?,
            list_down: parse(&bindings.list_down)?,
            next_field: parse(&bindings.next_field)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            selected_index: 0,
            list_state: ListState::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct ReviewState {
    pub rating: u8,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            rating: DEFAULT_REVIEW_RATING,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FocusState {
    pub snapshot: Option<FocusSnapshot>,
    pub last_tick: Option<Instant>,
}

pub struct App {
    pub config: Config,
    pub keys: KeyMap,
    pub planner: SessionPlanner,
    pub ui: UiState,
    pub form: BlockForm,
    pub status: StatusState,
    pub review: ReviewState,
    pub focus: FocusState,
    pub reset_armed_at: Option<Instant>,
}

impl App {
    pub fn new(config: Config, planner: SessionPlanner) -> Result<Self, TuiError> {
        let keys = KeyMap::from_config(&config.key_bindings)?;
        let mut app = Self {
            config,
            keys,
            planner,
            ui: UiState::default(),
            form: BlockForm::default(),
            status: StatusState::default(),
            review: ReviewState::default(),
            focus: FocusState::default(),
            reset_armed_at: None,
        };
        app.adjust_selected_index();
        Ok(app)
    }

    pub fn view(&self) -> View {
        self.planner.view()
    }

    pub fn tasks(&self) -> &[Task] {
        self.planner.tasks()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks().get(self.ui.selected_index)
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time {
            if time.elapsed() >= Duration::from_secs(self.config.status_message_timeout_secs) {
                self.clear_status_message();
            }
        }
    }

    fn report(&mut self, err: PlannerError) {
        let message = match &err {
            PlannerError::Storage(e) => format!("Could not save: {}", e),
            _ => err.to_string(),
        };
        self.set_status_message(message);
    }

    /// Keep the selection inside the list after it shrinks or grows
    pub fn adjust_selected_index(&mut self) {
        let len = self.tasks().len();
        if len == 0 {
            self.ui.selected_index = 0;
            self.ui.list_state.select(None);
        } else {
            self.ui.selected_index = self.ui.selected_index.min(len - 1);
            self.ui.list_state.select(Some(self.ui.selected_index));
        }
    }

    pub fn move_selection_up(&mut self) {
        if self.ui.selected_index > 0 {
            self.ui.selected_index -= 1;
        }
        self.adjust_selected_index();
    }

    pub fn move_selection_down(&mut self) {
        self.ui.selected_index = self.ui.selected_index.saturating_add(1);
        self.adjust_selected_index();
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::Normal;
    }

    pub fn enter_form_mode(&mut self) {
        if self.view() != View::Build {
            return;
        }
        self.ui.mode = Mode::Form;
        self.form.current_field = FormField::Title;
    }

    /// Leave the form; typed input is kept for next time
    pub fn exit_form_mode(&mut self) {
        self.ui.mode = Mode::Normal;
    }

    pub fn navigate_form_field(&mut self, forward: bool) {
        self.form.current_field = if forward {
            self.form.current_field.next()
        } else {
            self.form.current_field.previous()
        };
    }

    /// Try to add the form's block. Refused input stays in the form.
    pub fn submit_form(&mut self) {
        let start = BlockForm::time_field(&self.form.start);
        let end = BlockForm::time_field(&self.form.end);
        let title = self.form.title.text().to_string();

        match self.planner.add_task(&title, start, end) {
            Ok(task) => {
                self.form.prepare_next(task.end_time);
                if let Some(index) = self.tasks().iter().position(|t| t.id == task.id) {
                    self.ui.selected_index = index;
                }
                self.adjust_selected_index();
                self.set_status_message(format!(
                    "Added \"{}\" {} - {}",
                    task.title,
                    time::format_clock_display(task.start_time),
                    time::format_clock_display(task.end_time)
                ));
            }
            Err(e) => self.report(e),
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        match self.planner.remove_task(&id) {
            Ok(Some(task)) => self.set_status_message(format!("Removed \"{}\"", task.title)),
            Ok(None) => {}
            Err(e) => self.report(e),
        }
        self.adjust_selected_index();
    }

    /// First press arms, a second press within the window clears everything
    pub fn request_reset(&mut self, now: Instant) {
        let confirmed = self
            .reset_armed_at
            .is_some_and(|armed| now.duration_since(armed) < RESET_CONFIRM_WINDOW);

        if !confirmed {
            if self.tasks().is_empty() {
                return;
            }
            self.reset_armed_at = Some(now);
            self.planner.cue(Cue::Interaction);
            self.set_status_message("Press reset again to clear every block".to_string());
            return;
        }

        self.reset_armed_at = None;
        match self.planner.clear_all() {
            Ok(()) => self.set_status_message("Schedule cleared".to_string()),
            Err(e) => self.report(e),
        }
        self.adjust_selected_index();
    }

    pub fn start_day(&mut self) {
        match self.planner.start_day() {
            Ok(()) => {
                self.ui.mode = Mode::Normal;
                self.focus = FocusState::default();
                self.refresh_focus(time::now_minutes());
            }
            Err(e) => self.report(e),
        }
    }

    pub fn edit_schedule(&mut self) {
        match self.planner.edit_schedule() {
            Ok(()) => {
                self.focus = FocusState::default();
                self.adjust_selected_index();
            }
            Err(e) => self.report(e),
        }
    }

    pub fn finish_day(&mut self) {
        match self.planner.finish_day() {
            Ok(()) => {
                self.focus = FocusState::default();
                self.review = ReviewState::default();
            }
            Err(e) => self.report(e),
        }
    }

    pub fn cancel_review(&mut self) {
        match self.planner.cancel_review() {
            Ok(()) => self.refresh_focus(time::now_minutes()),
            Err(e) => self.report(e),
        }
    }

    pub fn adjust_rating(&mut self, delta: i8) {
        let rating = i16::from(self.review.rating) + i16::from(delta);
        self.review.rating = rating.clamp(i16::from(MIN_RATING), i16::from(MAX_RATING)) as u8;
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.review.rating = rating.clamp(MIN_RATING, MAX_RATING);
    }

    pub fn save_rating(&mut self) {
        let rating = self.review.rating;
        let date = self.planner.session_date();
        match self.planner.save_rating(rating, date) {
            Ok(()) => {
                self.review = ReviewState::default();
                self.form = BlockForm::default();
                self.adjust_selected_index();
                self.set_status_message(format!("Saved {}/{} for {}", rating, MAX_RATING, time::date_string(date)));
            }
            Err(e) => self.report(e),
        }
    }

    /// Whether the focus screen is due for re-evaluation
    pub fn tick_due(&self, now: Instant) -> bool {
        if !self.planner.is_ticking() {
            return false;
        }
        match self.focus.last_tick {
            None => true,
            Some(last) => now.duration_since(last) >= Duration::from_millis(self.config.tick_interval_ms),
        }
    }

    /// Evaluate the schedule at `now_minutes` and keep the result for rendering
    pub fn refresh_focus(&mut self, now_minutes: u16) {
        self.focus.snapshot = self.planner.tick(now_minutes);
        self.focus.last_tick = Some(Instant::now());
    }

    /// Called from the event loop on every pass
    pub fn on_tick(&mut self) {
        if self.tick_due(Instant::now()) {
            self.refresh_focus(time::now_minutes());
        }
    }

    /// Key hints for the status bar given the current view and mode
    pub fn key_hints(&self) -> Vec<String> {
        use crate::utils::format_key_binding_for_display as show;
        let kb = &self.config.key_bindings;

        match (self.ui.mode, self.view()) {
            (Mode::Help, _) => vec![format!("{}/Esc: Close help", show(&kb.help))],
            (Mode::Form, _) => vec![
                "Enter: Add block".to_string(),
                format!("{}: Next field", show(&kb.next_field)),
                "Esc: Done".to_string(),
            ],
            (Mode::Normal, View::Build) => vec![
                format!("{}: New block", show(&kb.new)),
                format!("{}: Start day", show(&kb.start)),
                format!("{}: Delete", show(&kb.delete)),
                format!("{}: Reset", show(&kb.reset)),
                format!("{}: Help", show(&kb.help)),
                format!("{}: Quit", show(&kb.quit)),
            ],
            (Mode::Normal, View::Focus) => vec![
                format!("{}: Edit schedule", show(&kb.edit)),
                format!("{}: End day", show(&kb.end_day)),
                format!("{}: Help", show(&kb.help)),
                format!("{}: Quit", show(&kb.quit)),
            ],
            (Mode::Normal, View::Review) => vec![
                "←/→: Rating".to_string(),
                "Enter: Save".to_string(),
                "Esc: Go back".to_string(),
                format!("{}: Quit", show(&kb.quit)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Recorder, Silent};
    use crate::storage::MemoryStore;

    fn test_app() -> App {
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        let planner = Planner::open(store, Box::new(Silent), time::parse_date("2024-04-01").unwrap());
        App::new(Config::default(), planner).unwrap()
    }

    fn fill(app: &mut App, title: &str, start: &str, end: &str) {
        app.form.title.set_content(title.to_string());
        app.form.start.set_content(start.to_string());
        app.form.end.set_content(end.to_string());
    }

    #[test]
    fn submit_prefills_next_start() {
        let mut app = test_app();
        app.enter_form_mode();
        fill(&mut app, "Deep work", "09:00", "10:30");
        app.submit_form();

        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.form.title.text(), "");
        assert_eq!(app.form.start.text(), "10:30");
        assert_eq!(app.form.end.text(), "");
        assert_eq!(app.form.current_field, FormField::Title);
        assert!(app.status.message.as_deref().unwrap().contains("Deep work"));
    }

    #[test]
    fn refused_submit_keeps_input() {
        let mut app = test_app();
        fill(&mut app, "Lunch", "13:00", "12:00");
        app.submit_form();

        assert!(app.tasks().is_empty());
        assert_eq!(app.form.title.text(), "Lunch");
        assert_eq!(app.status.message.as_deref(), Some("End time must be after start!"));

        fill(&mut app, "Lunch", "noon", "13:00");
        app.submit_form();
        assert_eq!(app.status.message.as_deref(), Some("Set start and end times!"));

        fill(&mut app, "Lunch", "12:00", "   ");
        app.submit_form();
        assert_eq!(app.status.message.as_deref(), Some("Set start and end times!"));
        assert!(app.tasks().is_empty());
    }

    #[test]
    fn reset_needs_two_presses_in_window() {
        let mut app = test_app();
        fill(&mut app, "A", "09:00", "10:00");
        app.submit_form();

        let t0 = Instant::now();
        app.request_reset(t0);
        assert_eq!(app.tasks().len(), 1);

        // Too slow: re-arms instead of clearing
        app.request_reset(t0 + RESET_CONFIRM_WINDOW + Duration::from_millis(1));
        assert_eq!(app.tasks().len(), 1);

        let t1 = t0 + RESET_CONFIRM_WINDOW + Duration::from_millis(1);
        app.request_reset(t1 + Duration::from_secs(1));
        assert!(app.tasks().is_empty());
        assert!(app.reset_armed_at.is_none());
    }

    #[test]
    fn arming_reset_cues_once_and_clear_cues_again() {
        let recorder = Recorder::new();
        let store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        let planner = Planner::open(store, Box::new(recorder.clone()), time::parse_date("2024-04-01").unwrap());
        let mut app = App::new(Config::default(), planner).unwrap();

        let t0 = Instant::now();
        app.request_reset(t0);
        assert_eq!(recorder.count(Cue::Interaction), 0);

        fill(&mut app, "A", "09:00", "10:00");
        app.submit_form();
        app.request_reset(t0);
        assert_eq!(recorder.count(Cue::Interaction), 2);
        app.request_reset(t0 + Duration::from_secs(1));
        assert!(app.tasks().is_empty());
        assert_eq!(recorder.count(Cue::Interaction), 3);
    }

    #[test]
    fn delete_keeps_selection_in_bounds() {
        let mut app = test_app();
        fill(&mut app, "A", "09:00", "10:00");
        app.submit_form();
        fill(&mut app, "B", "10:00", "11:00");
        app.submit_form();
        assert_eq!(app.ui.selected_index, 1);

        app.delete_selected();
        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.ui.selected_index, 0);
        assert_eq!(app.selected_task().map(|t| t.title.as_str()), Some("A"));
    }

    #[test]
    fn focus_refresh_and_review_flow() {
        let mut app = test_app();
        app.start_day();
        assert_eq!(app.view(), View::Build);
        assert_eq!(app.status.message.as_deref(), Some("Add at least one block before starting the day"));

        fill(&mut app, "Work", "09:00", "10:00");
        app.submit_form();
        app.start_day();
        assert_eq!(app.view(), View::Focus);

        app.refresh_focus(9 * 60 + 30);
        let snapshot = app.focus.snapshot.clone().unwrap();
        assert_eq!(snapshot.active.unwrap().remaining_minutes, 30);
        assert!(!app.tick_due(Instant::now()));

        app.finish_day();
        assert_eq!(app.view(), View::Review);
        assert_eq!(app.review.rating, DEFAULT_REVIEW_RATING);
        assert!(!app.tick_due(Instant::now()));

        app.adjust_rating(10);
        assert_eq!(app.review.rating, MAX_RATING);
        app.adjust_rating(-20);
        assert_eq!(app.review.rating, MIN_RATING);
        app.set_rating(8);
        app.save_rating();

        assert_eq!(app.view(), View::Build);
        assert!(app.tasks().is_empty());
        assert_eq!(app.planner.ratings().len(), 1);
    }
}
