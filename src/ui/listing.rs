use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::model::DisplayState;
use crate::state::{AppState, ListAction};
use crate::timer::format_clock;

/// Window bounds in the user's local time, e.g. `01.03.2025 09:00`.
pub fn format_local(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%d.%m.%Y %H:%M")
        .to_string()
}

fn state_color(state: DisplayState) -> Color {
    match state {
        DisplayState::Available => Color::Green,
        DisplayState::InProgress => Color::Yellow,
        DisplayState::Paused => Color::LightBlue,
        DisplayState::Completed => Color::Cyan,
        DisplayState::Scheduled => Color::White,
        DisplayState::Expired | DisplayState::Cancelled => Color::DarkGray,
    }
}

pub fn draw_listing(f: &mut Frame, area: Rect, state: &AppState) {
    if state.assignments.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(""),
            Line::from(Span::styled(
                "No assessments are assigned to you.",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "[r] Refresh   [q] Quit",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(widget, area);
        return;
    }

    let now = state.now();
    let header = Row::new(["", "Assessment", "State", "Exam", "Window", "Time", "Qs", ""])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = state
        .assignments
        .iter()
        .map(|a| {
            let display = a.display_state(now);
            let color = state_color(display);
            Row::new(vec![
                Cell::from(display.icon()),
                Cell::from(a.name.clone()),
                Cell::from(Span::styled(display.label(), Style::default().fg(color))),
                Cell::from(a.exam_name.clone()),
                Cell::from(format!("{} – {}", format_local(a.start_time), format_local(a.end_time))),
                Cell::from(format_clock(a.duration)),
                Cell::from(a.question_count.to_string()),
                Cell::from(Span::styled(
                    ListAction::for_state(display).label(),
                    Style::default().fg(Color::Cyan),
                )),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(16),
        Constraint::Length(12),
        Constraint::Min(12),
        Constraint::Length(35),
        Constraint::Length(8),
        Constraint::Length(4),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸");

    let mut table_state = TableState::default().with_selected(Some(state.list_cursor));
    f.render_stateful_widget(table, area, &mut table_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_format_has_day_first() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let printed = format_local(instant);
        assert_eq!(printed.len(), "01.03.2025 12:00".len());
        assert!(printed.contains(".03.2025"));
    }
}
