use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::marks::Mark;
use crate::state::AppState;
use crate::ui::markdown::markdown_to_lines;

fn mark_style(mark: Mark) -> Style {
    match mark {
        Mark::Yes => Style::default().fg(Color::Green),
        Mark::No => Style::default().fg(Color::Red),
        Mark::Unknown => Style::default(),
    }
}

/// Wrap a styled Line at `width`, preserving span styles across breaks.
pub fn wrap_styled_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line];
    }

    // Flatten into (char, style) pairs
    let mut chars: Vec<(char, Style)> = Vec::new();
    for span in &line.spans {
        for c in span.content.chars() {
            chars.push((c, span.style));
        }
    }
    if chars.len() <= width {
        return vec![line];
    }

    let mut result: Vec<Line<'static>> = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars.len() - pos <= width {
            result.push(styled_chars_to_line(&chars[pos..]));
            break;
        }

        let chunk_end = pos + width;
        let break_at = if chars[chunk_end].0 == ' ' {
            chunk_end
        } else if let Some(sp) = chars[pos..chunk_end].iter().rposition(|(c, _)| *c == ' ') {
            if sp > 0 { pos + sp } else { chunk_end }
        } else {
            chunk_end
        };

        result.push(styled_chars_to_line(&chars[pos..break_at]));
        pos = break_at;
        if pos < chars.len() && chars[pos].0 == ' ' {
            pos += 1;
        }
    }

    if result.is_empty() {
        result.push(Line::from(""));
    }

    result
}

/// Rebuild a Line from (char, style) pairs, grouping consecutive same-style chars into spans.
fn styled_chars_to_line(chars: &[(char, Style)]) -> Line<'static> {
    let Some(&(_, first_style)) = chars.first() else {
        return Line::from("");
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current_text = String::new();
    let mut current_style = first_style;

    for &(c, style) in chars {
        if style != current_style {
            if !current_text.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut current_text), current_style));
            }
            current_style = style;
        }
        current_text.push(c);
    }
    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, current_style));
    }

    Line::from(spans)
}

/// Wrap text to fit within `width` columns, breaking at word boundaries.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut result = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            result.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

pub fn draw_question(f: &mut Frame, area: Rect, state: &AppState) {
    let (Some(question), Some(session)) = (state.current_question(), state.session.as_ref()) else {
        let p = Paragraph::new("No questions").block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };
    let tracker = session.tracker();

    let mut lines: Vec<Line> = Vec::new();

    // Question header
    lines.push(Line::from(Span::styled(
        format!("  ## {}. {}", state.current_question + 1, question.title),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!("  {} · {}", question.category, question.difficulty_label()),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    // Prompt (with wrapping)
    let body_wrap_width = (area.width as usize).saturating_sub(4); // 2 indent left + 2 margin right
    for line in markdown_to_lines(&question.prompt) {
        for wline in wrap_styled_line(line, body_wrap_width) {
            let indented = Line::from(
                std::iter::once(Span::raw("  "))
                    .chain(wline.spans)
                    .collect::<Vec<_>>(),
            );
            lines.push(indented);
        }
    }

    if question.options.is_empty() {
        lines.push(Line::from(Span::styled(
            "  This question has no answer options.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let mut cursor_line = lines.len();
    for (i, option) in question.options.iter().enumerate() {
        let mark = tracker.mark(question.id, &option.text);
        let is_cursor = i == state.option_cursor;
        let mut style = mark_style(mark);
        if is_cursor {
            style = style.add_modifier(Modifier::BOLD).bg(Color::Rgb(40, 40, 40));
            cursor_line = lines.len();
        }

        // Prefix: " ▸ ✅ " = 5 columns plus icon width
        let prefix = format!("{}{} ", if is_cursor { " ▸ " } else { "   " }, mark.icon());
        let prefix_len = prefix.chars().count() + 1; // icons render two columns wide
        let text_width = (area.width as usize).saturating_sub(prefix_len + 2);
        for (li, wline) in wrap_text(&option.text, text_width).into_iter().enumerate() {
            let lead = if li == 0 {
                Span::styled(prefix.clone(), style)
            } else {
                Span::raw(" ".repeat(prefix_len))
            };
            lines.push(Line::from(vec![lead, Span::styled(wline, style)]));
        }
    }

    if question.legacy_format {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  (answers imported from a plain-text list)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Keep the option under the cursor on screen
    let total_content_lines = lines.len();
    let visible_height = area.height as usize;
    let scroll = cursor_line
        .saturating_sub(visible_height.saturating_sub(2))
        .min(total_content_lines.saturating_sub(visible_height));
    let display_lines: Vec<Line> = lines.into_iter().skip(scroll).collect();

    f.render_widget(Paragraph::new(display_lines), area);

    if total_content_lines > visible_height {
        let mut scrollbar_state = ScrollbarState::new(total_content_lines)
            .position(scroll)
            .viewport_content_length(visible_height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}
