use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::marks::Mark;
use crate::state::AppState;

pub fn draw_statusbar(f: &mut Frame, area: Rect, state: &AppState) {
    let counts = state.mark_counts();

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{} {} yes", Mark::Yes.icon(), counts.yes),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("{} {} no", Mark::No.icon(), counts.no),
            Style::default().fg(Color::Red),
        ),
        Span::raw("   "),
        Span::styled(
            format!("{} {} unknown", Mark::Unknown.icon(), counts.unknown),
            Style::default().fg(Color::White),
        ),
        Span::raw("   "),
        Span::styled(
            format!("○ {} questions open", counts.untouched_questions),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("   "),
        Span::styled("[?] help", Style::default().fg(Color::DarkGray)),
    ]);

    let widget = Paragraph::new(line).style(Style::default().bg(Color::Rgb(30, 30, 30)));
    f.render_widget(widget, area);
}
