use ratatui::layout::{Alignment, Constraint, Layout as RatLayout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, ListState, Paragraph};
use ratatui::Frame;

use crate::models::View;
use crate::time;
use crate::tui::app::Mode;
use crate::tui::widgets::{
    color::parse_color,
    focus::render_focus_card,
    form::render_block_form,
    help::render_help,
    history::render_history,
    review::render_review,
    schedule_list::render_schedule_list,
    status_bar::render_status_bar,
};
use crate::tui::{App, Layout};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    // Outer border with the app name centered in the top border
    let fg_color = parse_color(&app.config.theme.fg);
    let bg_color = parse_color(&app.config.theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("dayblock")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_header(f, layout.header_area, app);

    match app.view() {
        View::Build => render_build(f, layout.main_area, app),
        View::Focus => render_focus(f, layout.main_area, app),
        View::Review => render_review(f, layout.main_area, app.review.rating, &app.config),
    }

    let hints = app.key_hints();
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &hints, &app.config);

    if app.ui.mode == Mode::Help {
        render_help(f, layout.inner_area, &app.config);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let accent = parse_color(&app.config.theme.accent);
    let date = app.planner.session_date().format("%A, %B %-d").to_string();
    let view = match app.view() {
        View::Build => "PLAN",
        View::Focus => "FOCUS",
        View::Review => "REVIEW",
    };

    let left = Paragraph::new(Line::from(vec![
        Span::styled(view, Style::default().fg(accent).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::raw(date),
    ]));
    f.render_widget(left, area);

    // Clock only matters while focusing; it follows the last evaluation
    if app.view() == View::Focus {
        let now = app
            .focus
            .snapshot
            .as_ref()
            .map(|s| s.now)
            .unwrap_or_else(time::now_minutes);
        if let Some(clock) = time::TimeOfDay::from_minutes(now) {
            let right = Paragraph::new(time::format_clock_display(clock)).alignment(Alignment::Right);
            f.render_widget(right, area);
        }
    }
}

fn render_build(f: &mut Frame, area: Rect, app: &mut App) {
    let [form_area, list_area, history_area] = Layout::build_areas(area);
    let form_active = app.ui.mode == Mode::Form;

    render_block_form(f, form_area, &app.form, &app.config, form_active);
    render_schedule_list(
        f,
        list_area,
        app.planner.tasks(),
        &mut app.ui.list_state,
        None,
        "Today's Blocks",
        &app.config,
    );
    render_history(f, history_area, app.planner.ratings(), &app.config);
}

fn render_focus(f: &mut Frame, area: Rect, app: &App) {
    let [card_area, list_area] = RatLayout::vertical([Constraint::Length(9), Constraint::Min(3)]).areas(area);
    let snapshot = app.focus.snapshot.as_ref();

    render_focus_card(f, card_area, snapshot, &app.config);

    // Highlight the running block in the day overview
    let current = snapshot.and_then(|s| s.active.as_ref()).map(|a| &a.task.id);
    let mut list_state = ListState::default();
    if let Some(id) = current {
        list_state.select(app.planner.tasks().iter().position(|t| &t.id == id));
    }
    render_schedule_list(f, list_area, app.planner.tasks(), &mut list_state, current, "Schedule", &app.config);
}
