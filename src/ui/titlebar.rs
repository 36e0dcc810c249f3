use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::AppState;
use crate::timer::{format_clock, Severity};

pub fn timer_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
        Severity::Warning => Style::default().fg(Color::Black).bg(Color::Yellow),
        Severity::Normal => Style::default().fg(Color::Rgb(200, 200, 120)),
    }
}

pub fn draw_titlebar(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(session) = state.session.as_ref() else {
        return;
    };
    let snapshot = session.snapshot();

    let timer_text = format!(" ⏰ {} ", format_clock(snapshot.remaining_seconds));
    let timer_len = timer_text.chars().count();
    let timer_span = Span::styled(timer_text, timer_style(snapshot.severity));

    draw_centered(f, area, &session.assignment().name, Some((timer_span, timer_len)));
}

pub fn draw_list_titlebar(f: &mut Frame, area: Rect, state: &AppState) {
    let stats = state.stats();
    let summary = format!(
        " {} assigned · {} available · {} in progress · {} completed ",
        stats.total, stats.available, stats.in_progress, stats.completed
    );
    let len = summary.chars().count();
    let span = Span::styled(summary, Style::default().fg(Color::Rgb(200, 200, 120)));
    draw_centered(f, area, "My assessments", Some((span, len)));
}

fn draw_centered(f: &mut Frame, area: Rect, title: &str, right: Option<(Span<'static>, usize)>) {
    let title_text = format!("[ {} ]", title);
    let title_len = title_text.chars().count();
    let title_span = Span::styled(
        title_text,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    // Center the title: pad left so title sits in the middle of the full width
    let available = area.width as usize;
    let right_len = right.as_ref().map(|(_, len)| *len).unwrap_or(0);
    let center_pad = available.saturating_sub(title_len) / 2;
    let right_pad = available.saturating_sub(center_pad + title_len + right_len);

    let mut spans = vec![
        Span::raw(" ".repeat(center_pad)),
        title_span,
        Span::raw(" ".repeat(right_pad)),
    ];
    if let Some((span, _)) = right {
        spans.push(span);
    }

    let widget = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray))
        .alignment(Alignment::Left);
    f.render_widget(widget, area);
}
