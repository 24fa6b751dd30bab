use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::ratings::{MAX_RATING, MIN_RATING};
use crate::tui::widgets::color::{highlight_colors, parse_color};
use crate::Config;

/// One cell per possible rating, filled up to the current one
fn rating_scale(rating: u8, config: &Config) -> Line<'static> {
    let (highlight_bg, highlight_fg) = highlight_colors(&config.theme);
    let spans: Vec<Span> = (MIN_RATING..=MAX_RATING)
        .map(|value| {
            let style = if value == rating {
                Style::default().fg(highlight_fg).bg(highlight_bg).add_modifier(Modifier::BOLD)
            } else if value < rating {
                Style::default().fg(highlight_bg)
            } else {
                Style::default().add_modifier(Modifier::DIM)
            };
            Span::styled(format!(" {} ", value), style)
        })
        .collect();
    Line::from(spans)
}

pub fn render_review(f: &mut Frame, area: Rect, rating: u8, config: &Config) {
    let accent = parse_color(&config.theme.accent);

    let lines = vec![
        Line::from(Span::styled(
            "How did today go?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        rating_scale(rating, config),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}/{}", rating, MAX_RATING),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter saves and starts a fresh schedule · Esc goes back",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let [_, card, _] = Layout::vertical([Constraint::Fill(1), Constraint::Length(9), Constraint::Fill(1)]).areas(area);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Daily Review")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(accent)),
        )
        .alignment(Alignment::Center);
    f.render_widget(paragraph, card);
}
