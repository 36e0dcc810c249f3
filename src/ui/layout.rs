use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub titlebar: Rect,
    pub sidebar: Rect,
    pub main: Rect,
    pub statusbar: Rect,
    pub keybar: Rect,
}

pub struct ListLayout {
    pub titlebar: Rect,
    pub main: Rect,
    pub keybar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // titlebar
            Constraint::Min(5),    // middle (sidebar + main)
            Constraint::Length(1), // statusbar
            Constraint::Length(1), // keybar
        ])
        .split(area);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30), // sidebar (cursor + icon + number + title)
            Constraint::Min(20),    // main content
        ])
        .split(vertical[1]);

    AppLayout {
        titlebar: vertical[0],
        sidebar: middle[0],
        main: middle[1],
        statusbar: vertical[2],
        keybar: vertical[3],
    }
}

pub fn compute_list_layout(area: Rect) -> ListLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    ListLayout {
        titlebar: vertical[0],
        main: vertical[1],
        keybar: vertical[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_layout_splits_rows() {
        let layout = compute_layout(Rect::new(0, 0, 100, 40));
        assert_eq!(layout.titlebar.height, 1);
        assert_eq!(layout.statusbar.height, 1);
        assert_eq!(layout.keybar.y, 39);
        assert_eq!(layout.sidebar.width, 30);
        assert_eq!(layout.main.width, 70);
        assert_eq!(layout.main.height, 37);
    }
}
