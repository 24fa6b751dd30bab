use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget,
};
use ratatui::Frame;

use crate::models::{Task, TaskId};
use crate::time;
use crate::tui::widgets::color::{highlight_colors, parse_color, task_color};
use crate::Config;

/// One row: colour swatch, start, title, end and length
fn task_line(task: &Task, max_width: usize, current: bool) -> Line<'static> {
    let start = format!("{:>8} ", time::format_clock_display(task.start_time));
    let tail = format!(
        "  until {} ({})",
        time::format_clock_display(task.end_time),
        time::format_duration(u32::from(task.duration_minutes()))
    );

    // Title gets whatever the fixed parts leave over
    let fixed = 2 + start.chars().count() + tail.chars().count();
    let room = max_width.saturating_sub(fixed).max(4);
    let mut title = task.title.clone();
    if title.chars().count() > room {
        title = title.chars().take(room.saturating_sub(3)).collect::<String>() + "...";
    }

    let mut title_style = Style::default();
    if current {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }

    Line::from(vec![
        Span::styled("■ ", Style::default().fg(task_color(task.color))),
        Span::raw(start),
        Span::styled(title, title_style),
        Span::styled(tail, Style::default().add_modifier(Modifier::DIM)),
    ])
}

/// Today's blocks in start order. `current` marks the running block (focus view).
pub fn render_schedule_list(
    f: &mut Frame,
    area: Rect,
    tasks: &[Task],
    list_state: &mut ListState,
    current: Option<&TaskId>,
    title: &str,
    config: &Config,
) {
    // Account for borders and padding
    let max_width = area.width.saturating_sub(4) as usize;
    let (highlight_bg, highlight_fg) = highlight_colors(&config.theme);

    let items: Vec<ListItem> = if tasks.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No blocks yet. Add one to plan your day.",
            Style::default().add_modifier(Modifier::DIM),
        )))]
    } else {
        tasks
            .iter()
            .map(|task| ListItem::new(task_line(task, max_width, current == Some(&task.id))))
            .collect()
    };
    let total_items = items.len();

    // Split area to reserve space for scrollbar
    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // Scrollbar
        ])
        .split(area);
    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("{} ({})", title, tasks.len())))
        .style(Style::default().fg(parse_color(&config.theme.fg)))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    let visible_items = list_area.height.saturating_sub(2) as usize;
    if total_items > visible_items && scrollbar_area.width > 0 && list_area.height > 2 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1, // Start after top border
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );

        let selected_index = list_state.selected().unwrap_or(0);
        let scroll_position = selected_index.saturating_sub(visible_items.saturating_sub(1));
        let mut scrollbar_state = ScrollbarState::new(total_items)
            .viewport_content_length(visible_items)
            .position(scroll_position);

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskColor;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn row_shows_times_and_length() {
        let task = Task::new("Standup".into(), "09:00".parse().unwrap(), "09:15".parse().unwrap(), TaskColor::Blue);
        let text = line_text(&task_line(&task, 80, false));
        assert_eq!(text, "■  9:00 AM Standup  until 9:15 AM (15m)");
    }

    #[test]
    fn long_title_is_truncated() {
        let task = Task::new("x".repeat(200), "13:00".parse().unwrap(), "15:00".parse().unwrap(), TaskColor::Pink);
        let text = line_text(&task_line(&task, 50, true));
        assert!(text.contains("..."));
        assert!(text.chars().count() <= 50);
    }
}
