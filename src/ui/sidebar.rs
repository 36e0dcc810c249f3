use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::state::AppState;

const STATUS_ROWS: usize = 3; // 1 separator + 2 count lines

/// First visible row so that `current` stays inside a window of `height` rows.
pub fn scroll_offset(current: usize, total: usize, height: usize) -> usize {
    if height == 0 || total <= height {
        return 0;
    }
    current
        .saturating_sub(height - 1)
        .min(total - height)
}

pub fn draw_sidebar(f: &mut Frame, area: Rect, state: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    let inner_height = area.height.saturating_sub(1) as usize; // title row
    let inner_width = area.width.saturating_sub(1) as usize; // -1 for right border
    let question_height = inner_height.saturating_sub(STATUS_ROWS);
    let questions = state.questions();
    let total = questions.len();
    let current = state.current_question;
    let offset = scroll_offset(current, total, question_height);

    let title_max_len = area.width.saturating_sub(11) as usize; // cursor+icon+space+number+dot+space

    for (qi, q) in questions.iter().enumerate().skip(offset).take(question_height) {
        let touched = state.is_question_touched(q);
        let (icon, color) = if touched {
            ("●", Color::Green)
        } else {
            ("○", Color::White)
        };

        let is_current = qi == current;
        let style = if is_current {
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        // Truncate title to fit
        let title_display = if q.title.chars().count() > title_max_len {
            let cut: String = q.title.chars().take(title_max_len.saturating_sub(1)).collect();
            format!("{}…", cut)
        } else {
            q.title.clone()
        };

        lines.push(Line::from(vec![
            Span::styled(if is_current { " ▸ " } else { "   " }, style),
            Span::styled(format!("{} ", icon), style.fg(color)),
            Span::styled(format!("{:>2}. ", qi + 1), style),
            Span::styled(title_display, style),
        ]));
    }

    // Pad remaining question area with blank lines
    while lines.len() < question_height {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "─".repeat(inner_width),
        Style::default().fg(Color::DarkGray),
    )));

    let counts = state.mark_counts();
    let touched = total.saturating_sub(counts.untouched_questions);
    lines.push(Line::from(Span::styled(
        format!("  ● {} answered", touched),
        Style::default().fg(Color::Green),
    )));
    lines.push(Line::from(Span::styled(
        format!("  ○ {} open", counts.untouched_questions),
        Style::default().fg(Color::White),
    )));

    let block = Block::default()
        .borders(Borders::RIGHT)
        .title(format!(" {} Questions ", total))
        .title_style(Style::default().add_modifier(Modifier::BOLD));

    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, area);

    if total > question_height {
        let scrollbar_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: question_height as u16,
        };
        let mut scrollbar_state = ScrollbarState::new(total.saturating_sub(1))
            .position(current)
            .viewport_content_length(3);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_keeps_current_visible() {
        assert_eq!(scroll_offset(3, 5, 10), 0);
        assert_eq!(scroll_offset(0, 50, 10), 0);
        assert_eq!(scroll_offset(9, 50, 10), 0);
        assert_eq!(scroll_offset(10, 50, 10), 1);
        assert_eq!(scroll_offset(49, 50, 10), 40);
        assert_eq!(scroll_offset(5, 50, 0), 0);
    }
}
