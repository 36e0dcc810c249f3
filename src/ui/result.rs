use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::model::AssessmentResult;
use crate::state::AppState;
use crate::timer::format_clock;

fn score_color(score: f64) -> Color {
    if score >= 80.0 {
        Color::Green
    } else if score >= 50.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn result_lines(title: &str, result: &AssessmentResult) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            format!("✓  {}", title),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{:.1}%", result.score_percentage),
            Style::default()
                .fg(score_color(result.score_percentage))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("{} questions", result.total_questions)),
        Line::from(format!("✅ {} correct", result.correct_answers)),
        Line::from(format!("❌ {} incorrect", result.incorrect_answers)),
        Line::from(format!("⏱ {}", format_clock(result.time_spent_seconds))),
        Line::from(""),
    ]
}

pub fn draw_result(f: &mut Frame, area: Rect, state: &AppState) {
    let mut lines = match &state.result {
        Some(result) => result_lines(&state.result_title, result),
        None => vec![Line::from(""), Line::from("No result loaded.")],
    };
    lines.push(Line::from(Span::styled(
        "[Enter] Back to list   [Ctrl+Q] Exit",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default().borders(Borders::ALL).title(" Result ");
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

pub fn draw_busy(f: &mut Frame, area: Rect, state: &AppState) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            state.busy_message.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}
