use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use crate::scheduler::{ActiveBlock, FocusSnapshot};
use crate::time;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color, task_color};
use crate::Config;

/// Text for the card when nothing is running
pub fn idle_message(snapshot: &FocusSnapshot) -> String {
    match &snapshot.next {
        Some(next) => format!(
            "Up next in {}: {}",
            time::format_duration(u32::from(next.minutes_until)),
            next.task.title
        ),
        None => "You are free for the rest of the day.".to_string(),
    }
}

fn render_active(f: &mut Frame, area: Rect, active: &ActiveBlock, config: &Config) {
    let color = task_color(active.task.color);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(1),
            Constraint::Length(1), // Progress
            Constraint::Length(1),
            Constraint::Length(1), // Remaining / until
            Constraint::Min(0),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        active.task.title.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, rows[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(parse_color(&config.theme.bg)))
        .label(Span::styled(
            format!("{:.0}%", active.progress_percent),
            Style::default().fg(get_contrast_text_color(color)),
        ))
        .ratio((active.progress_percent / 100.0).clamp(0.0, 1.0));
    f.render_widget(gauge, rows[2]);

    let detail = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} left", time::format_duration(u32::from(active.remaining_minutes))),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  ·  "),
        Span::raw(format!("Until {}", time::format_clock_display(active.task.end_time))),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(detail, rows[4]);
}

/// The "Right Now" card
pub fn render_focus_card(f: &mut Frame, area: Rect, snapshot: Option<&FocusSnapshot>, config: &Config) {
    let accent = parse_color(&config.theme.accent);

    let title = match snapshot.and_then(|s| s.active.as_ref()) {
        Some(_) => "Right Now",
        None => "Nothing Scheduled",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(accent));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(snapshot) = snapshot else {
        // Before the first evaluation lands
        return;
    };

    match &snapshot.active {
        Some(active) => render_active(f, inner, active, config),
        None => {
            let message = Paragraph::new(idle_message(snapshot))
                .alignment(Alignment::Center)
                .wrap(ratatui::widgets::Wrap { trim: true });
            let [_, row, _] = Layout::vertical([Constraint::Fill(1), Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
            f.render_widget(message, row);
        }
    }
}
