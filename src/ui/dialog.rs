use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::reconcile::{reconcile, ReconcileInput};
use crate::state::{AppState, Dialog, Screen};
use crate::timer::format_clock;
use crate::ui::question::wrap_text;

pub fn draw_dialog(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(dialog) = state.top_dialog() else {
        return;
    };

    match dialog {
        Dialog::ConfirmStart => draw_confirm_start(f, area, state),
        Dialog::ConfirmResume => draw_confirm_resume(f, area, state),
        Dialog::ConfirmPause => draw_confirm(
            f,
            area,
            "Pause assessment?",
            &["The time worked so far is recorded.", "You can continue until the window closes."],
        ),
        Dialog::ConfirmSubmit => draw_confirm_submit(f, area, state),
        Dialog::ConfirmQuit => draw_confirm(
            f,
            area,
            "Quit?",
            &["The assessment is paused first.", "Marks are not kept across visits."],
        ),
        Dialog::Notice { title, message } => draw_notice(f, area, title, message),
        Dialog::Help => draw_help(f, area, state),
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn heading(text: &str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        format!("   {}", text),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn confirm_keys() -> Line<'static> {
    Line::from(vec![
        Span::styled("   [Enter] Confirm", Style::default().fg(Color::Green)),
        Span::raw("    "),
        Span::styled("[Esc] Cancel", Style::default().fg(Color::DarkGray)),
    ])
}

fn render_box(f: &mut Frame, area: Rect, lines: Vec<Line<'static>>, width: u16, color: Color) {
    let rect = centered_rect(width, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, rect);
}

fn draw_confirm(f: &mut Frame, area: Rect, title: &str, body: &[&str]) {
    let mut lines = vec![Line::from(""), heading(title, Color::Yellow), Line::from("")];
    lines.extend(body.iter().map(|l| Line::from(format!("   {}", l))));
    lines.push(Line::from(""));
    lines.push(confirm_keys());
    render_box(f, area, lines, 50, Color::Yellow);
}

fn draw_confirm_start(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(a) = state.selected_assignment() else {
        return;
    };
    let mut lines = vec![
        Line::from(""),
        heading(&format!("Start \"{}\"?", a.name), Color::Yellow),
        Line::from(""),
        Line::from(format!("   {} questions, {} to work.", a.question_count, format_clock(a.duration))),
        Line::from(format!(
            "   The window closes {}.",
            a.end_time.with_timezone(&chrono::Local).format("%d.%m.%Y %H:%M")
        )),
        Line::from("   The clock starts immediately."),
    ];
    lines.push(Line::from(""));
    lines.push(confirm_keys());
    render_box(f, area, lines, 56, Color::Yellow);
}

fn draw_confirm_resume(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(a) = state.selected_assignment() else {
        return;
    };
    let remaining = reconcile(&ReconcileInput::for_assignment(a, state.now()));
    let mut lines = vec![
        Line::from(""),
        heading(&format!("Continue \"{}\"?", a.name), Color::Yellow),
        Line::from(""),
        Line::from(format!("   About {} remaining.", format_clock(remaining.remaining_secs))),
        Line::from("   Answers start unmarked on every visit."),
    ];
    if remaining.limited_by_window {
        lines.push(Line::from(Span::styled(
            "   The window closes before your time runs out.",
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(confirm_keys());
    render_box(f, area, lines, 56, Color::Yellow);
}

fn draw_confirm_submit(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(session) = state.session.as_ref() else {
        return;
    };
    let submission = session.pending_submission();
    let mut lines = vec![
        Line::from(""),
        heading("Submit your answers?", Color::Yellow),
        Line::from(""),
    ];
    for l in wrap_text(&submission.summary(), 44) {
        lines.push(Line::from(format!("   {}", l)));
    }
    if session.is_expired() {
        lines.push(Line::from(Span::styled(
            "   Time is up; the answers are submitted as they are.",
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
    lines.push(confirm_keys());
    render_box(f, area, lines, 56, Color::Yellow);
}

fn draw_notice(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let width: u16 = 56;
    let mut lines = vec![Line::from(""), heading(title, Color::Cyan), Line::from("")];
    for l in wrap_text(message, width as usize - 8) {
        lines.push(Line::from(format!("   {}", l)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "          [Enter] OK",
        Style::default().fg(Color::Green),
    )));

    let rect = centered_rect(width, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), rect);
}

fn help_rows(screen: &Screen) -> &'static [&'static str] {
    match screen {
        Screen::Working => &[
            "   ↑/↓        Move between answers",
            "   ←/→        Previous/Next question",
            "   Home/End   First/Last question",
            "   Space      Cycle mark ❓ → ✅ → ❌",
            "   Ctrl+P     Pause and leave",
            "   Ctrl+S     Submit answers",
            "   Ctrl+Q     Pause and quit",
            "   ?          This help",
        ],
        _ => &[
            "   ↑/↓ j/k    Select assessment",
            "   Enter      Start, continue or show result",
            "   r          Refresh the list",
            "   q          Quit",
            "   ?          This help",
        ],
    }
}

fn draw_help(f: &mut Frame, area: Rect, state: &AppState) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Key Bindings",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(help_rows(&state.screen).iter().map(|r| Line::from(*r)));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "        [Esc] Close",
        Style::default().fg(Color::DarkGray),
    )));

    let rect = centered_rect(50, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(lines).block(block), rect);
}
