use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Marker shown in place of a line break in single-line renderings.
pub(crate) const NEWLINE_MARKER: char = '⏎';

/// Collapse multi-line text onto one line for table cells and form inputs.
/// Every break becomes exactly one marker character so cursor math holds.
pub(crate) fn single_line(value: &str) -> String {
    value
        .replace("\r\n", "\n")
        .chars()
        .map(|ch| if ch == '\n' { NEWLINE_MARKER } else { ch })
        .collect()
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Column widths for the profile table, in `PROFILE_COLUMNS` order.
pub(crate) fn profile_column_widths() -> [Constraint; 7] {
    [
        Constraint::Length(6),
        Constraint::Percentage(14),
        Constraint::Percentage(16),
        Constraint::Percentage(18),
        Constraint::Percentage(12),
        Constraint::Percentage(18),
        Constraint::Fill(1),
    ]
}

/// Show the root cause of an error chain, which is the message meant for
/// the user.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_become_single_markers() {
        assert_eq!(single_line("a\nb\r\nc"), "a⏎b⏎c");
        assert_eq!(single_line("plain"), "plain");
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 50, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
        assert_eq!(popup.width, 60);
    }
}
