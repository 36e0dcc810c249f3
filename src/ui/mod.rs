pub mod dialog;
pub mod keybar;
pub mod layout;
pub mod listing;
pub mod markdown;
pub mod question;
pub mod result;
pub mod sidebar;
pub mod statusbar;
pub mod titlebar;

use ratatui::layout::Rect;
use ratatui::Frame;

use crate::state::{AppState, Screen};

pub fn draw(f: &mut Frame, state: &AppState) {
    let area = f.area();

    match state.screen {
        Screen::List => draw_list(f, area, state),
        Screen::Working => draw_working(f, area, state),
        Screen::Busy => result::draw_busy(f, area, state),
        Screen::Result => result::draw_result(f, area, state),
    }

    // Dialog overlay
    if state.has_dialog() {
        dialog::draw_dialog(f, area, state);
    }
}

fn draw_list(f: &mut Frame, area: Rect, state: &AppState) {
    let layout = layout::compute_list_layout(area);

    titlebar::draw_list_titlebar(f, layout.titlebar, state);
    listing::draw_listing(f, layout.main, state);
    keybar::draw_keybar(f, layout.keybar, state);
}

fn draw_working(f: &mut Frame, area: Rect, state: &AppState) {
    let layout = layout::compute_layout(area);

    titlebar::draw_titlebar(f, layout.titlebar, state);
    sidebar::draw_sidebar(f, layout.sidebar, state);
    question::draw_question(f, layout.main, state);
    statusbar::draw_statusbar(f, layout.statusbar, state);
    keybar::draw_keybar(f, layout.keybar, state);
}
