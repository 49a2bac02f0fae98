use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub tabs_area: Rect,
    pub timeline_area: Rect,
    pub main_area: Rect,
    pub input_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Height: tabs + timeline + 3 list lines + input box (3) + status
    pub const MIN_WIDTH: u16 = 36;
    pub const MIN_HEIGHT: u16 = 9;

    pub fn calculate(size: Rect, input_open: bool) -> Self {
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

        let input_height = if input_open { 3 } else { 0 };
        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),            // Workspace tabs
                Constraint::Length(1),            // Timeline
                Constraint::Min(3),               // Note
                Constraint::Length(input_height), // Input
                Constraint::Length(1),            // Status
            ])
            .split(inner_area);

        Self {
            inner_area,
            tabs_area: vertical[0],
            timeline_area: vertical[1],
            main_area: vertical[2],
            input_area: vertical[3],
            status_area: vertical[4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_box_only_takes_space_when_open() {
        let closed = Layout::calculate(Rect::new(0, 0, 80, 24), false);
        let open = Layout::calculate(Rect::new(0, 0, 80, 24), true);
        assert_eq!(closed.input_area.height, 0);
        assert_eq!(open.input_area.height, 3);
        assert_eq!(closed.main_area.height, open.main_area.height + 3);
        assert_eq!(open.status_area.y, 22);
    }

    #[test]
    fn tiny_terminals_are_padded_to_the_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5), false);
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
    }
}
