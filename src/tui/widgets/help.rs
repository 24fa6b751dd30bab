use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display as show;
use crate::Config;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let fg_color = parse_color(&config.theme.fg);
    let bg_color = parse_color(&config.theme.bg);

    // Calculate popup area (60% width, 70% height, centered)
    let popup_area = popup_area(area, 60, 70);

    // Clear the background first - this prevents content from showing through
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

/// Centered rect using a percentage of the available rect
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Plan:\n");
    text.push_str(&format!("  {}: New block (opens the form)\n", show(&kb.new)));
    text.push_str(&format!("  {} / Shift+Tab: Next / previous field\n", show(&kb.next_field)));
    text.push_str("  Enter: Add block, Esc: Leave form\n");
    text.push_str(&format!("  {} / {}: Move selection\n", show(&kb.list_up), show(&kb.list_down)));
    text.push_str(&format!("  {}: Delete selected block\n", show(&kb.delete)));
    text.push_str(&format!("  {} twice within 3s: Clear every block\n", show(&kb.reset)));
    text.push_str(&format!("  {}: Start the day\n", show(&kb.start)));
    text.push('\n');

    text.push_str("Focus:\n");
    text.push_str(&format!("  {}: Back to editing the schedule\n", show(&kb.edit)));
    text.push_str(&format!("  {}: End the day and review it\n", show(&kb.end_day)));
    text.push('\n');

    text.push_str("Review:\n");
    text.push_str("  ←/→ or 1-9, 0: Choose a rating (0 is 10)\n");
    text.push_str("  Enter: Save rating, Esc: Go back\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Show/hide help\n", show(&kb.help)));
    text.push_str(&format!("  {} / Ctrl+c: Quit\n", show(&kb.quit)));

    text
}
