use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::ratings::RatingLog;
use crate::Config;
use crate::tui::widgets::color::parse_color;

fn rating_color(rating: u8) -> Color {
    match rating {
        8..=10 => Color::Green,
        5..=7 => Color::Yellow,
        _ => Color::Red,
    }
}

/// Most recent ratings first, as "MM-DD n" chips
pub fn history_line(ratings: &RatingLog, limit: usize) -> Line<'static> {
    if ratings.is_empty() {
        return Line::from("No days rated yet");
    }

    let mut spans = Vec::new();
    for (i, entry) in ratings.recent(limit).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::raw(format!("{} ", entry.date.format("%m-%d"))));
        spans.push(Span::styled(entry.rating.to_string(), Style::default().fg(rating_color(entry.rating))));
    }
    Line::from(spans)
}

pub fn render_history(f: &mut Frame, area: Rect, ratings: &RatingLog, config: &Config) {
    let title = match ratings.average() {
        Some(average) => format!("History (avg {:.1})", average),
        None => "History".to_string(),
    };
    let paragraph = Paragraph::new(history_line(ratings, config.history_length))
        .style(Style::default().fg(parse_color(&config.theme.fg)))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(paragraph, area);
}
