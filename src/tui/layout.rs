use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub header_area: Rect,
    pub main_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Width: 40 columns fits the form's three fields side by side
    /// Height: 14 lines (header + form + a few list rows + history strip + status)
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 14;

    pub fn calculate(size: Rect) -> Self {
        // Ensure minimum terminal size (accounting for outer border)
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header: date, view, clock
                Constraint::Min(1),    // View content
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        Self {
            inner_area,
            header_area: vertical[0],
            main_area: vertical[1],
            status_area: vertical[2],
        }
    }

    /// Build view: add form, schedule list, history strip
    pub fn build_areas(main_area: Rect) -> [Rect; 3] {
        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Form fields (bordered, one line each)
                Constraint::Min(3),    // Schedule list
                Constraint::Length(3), // History strip
            ])
            .split(main_area);
        [vertical[0], vertical[1], vertical[2]]
    }
}
