use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::app::{BlockForm, FormField};
use crate::tui::widgets::color::{highlight_colors, parse_color};
use crate::Config;

const FIELDS: [(FormField, &str); 3] = [
    (FormField::Title, "Task"),
    (FormField::Start, "Start"),
    (FormField::End, "End"),
];

/// Title, start and end inputs on one row. The cursor is only placed while
/// the form has focus.
pub fn render_block_form(f: &mut Frame, area: Rect, form: &BlockForm, config: &Config, active: bool) {
    if area.width < 2 || area.height < 3 {
        return;
    }

    let (highlight_bg, highlight_fg) = highlight_colors(&config.theme);
    let highlight_style = Style::default().bg(highlight_bg).fg(highlight_fg);
    let inactive_field_style = Style::default()
        .fg(parse_color(&config.theme.fg))
        .add_modifier(Modifier::DIM);

    let field_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),    // Title
            Constraint::Length(9), // Start (HH:MM plus borders and room)
            Constraint::Length(9), // End
        ])
        .split(area);

    for (index, (field, label)) in FIELDS.iter().enumerate() {
        let field_area = field_areas[index];
        let focused = active && form.current_field == *field;
        let editor = form.editor(*field);

        let inner_width = field_area.width.saturating_sub(2) as usize;
        let (visible, cursor_col) = editor.visible(inner_width);

        let placeholder = match field {
            FormField::Title => "",
            FormField::Start | FormField::End => "HH:MM",
        };
        let (text, text_style) = if editor.text().is_empty() && !focused {
            (placeholder.to_string(), inactive_field_style)
        } else {
            (visible, Style::default())
        };

        let border_style = if focused { highlight_style } else if active { Style::default() } else { inactive_field_style };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(*label)
            .border_style(border_style);

        f.render_widget(Paragraph::new(text).style(text_style).block(block), field_area);

        if focused && inner_width > 0 {
            let x = field_area.x + 1 + cursor_col as u16;
            let y = field_area.y + 1;
            f.set_cursor_position((x, y));
        }
    }
}
