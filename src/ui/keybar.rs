use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::{AppState, ListAction, Screen};

pub fn bindings(state: &AppState) -> Vec<(&'static str, &'static str)> {
    if state.has_dialog() {
        return vec![("Enter", "confirm"), ("Esc", "cancel")];
    }
    match state.screen {
        Screen::List => {
            let mut keys = vec![("↑/↓", "select")];
            match state.selected_action() {
                ListAction::None => {}
                action => keys.push(("Enter", action.label())),
            }
            keys.extend([("r", "refresh"), ("?", "help"), ("q", "quit")]);
            keys
        }
        Screen::Working => vec![
            ("↑/↓", "option"),
            ("←/→", "question"),
            ("Space", "mark"),
            ("Ctrl+P", "pause"),
            ("Ctrl+S", "submit"),
            ("Ctrl+Q", "quit"),
        ],
        Screen::Result => vec![("Enter", "back to list"), ("Ctrl+Q", "quit")],
        Screen::Busy => Vec::new(),
    }
}

pub fn draw_keybar(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, action)) in bindings(state).iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let line = Line::from(spans);
    let widget = Paragraph::new(line).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(widget, area);
}
