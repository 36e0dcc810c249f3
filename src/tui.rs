use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Runtime;

use crate::api::AssessmentApi;
use crate::error::SessionError;
use crate::session::{PauseOutcome, Session, SessionEvent};
use crate::state::*;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Everything a command needs besides the app state.
struct Ctx<'a> {
    terminal: &'a mut Term,
    api: Arc<dyn AssessmentApi>,
    rt: &'a Runtime,
}

pub fn run_tui(mut state: AppState, api: Arc<dyn AssessmentApi>, rt: &Runtime) -> Result<()> {
    enable_raw_mode().context("cannot enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("cannot enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("cannot create terminal")?;

    let mut ctx = Ctx {
        terminal: &mut terminal,
        api,
        rt,
    };
    let result = main_loop(&mut ctx, &mut state);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn main_loop(ctx: &mut Ctx<'_>, state: &mut AppState) -> Result<()> {
    loop {
        ctx.terminal
            .draw(|f| crate::ui::draw(f, state))
            .context("draw error")?;

        if state.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100)).context("poll error")? {
            if let Event::Key(key) = event::read().context("read error")? {
                if key.kind == KeyEventKind::Press {
                    handle_key(ctx, key, state)?;
                }
            }
        }

        // Countdown
        let expiring = state.session.as_ref().is_some_and(|s| s.expiry_due());
        let previous = if expiring {
            Some(show_busy(ctx, state, "Time expired, submitting...")?)
        } else {
            None
        };
        if let Some(session) = state.session.as_mut() {
            if let Some(ev) = ctx.rt.block_on(session.tick()) {
                handle_session_event(ev, state);
            }
        }
        if let Some(previous) = previous {
            if state.screen == Screen::Busy {
                state.screen = previous;
            }
        }
    }
    Ok(())
}

fn handle_session_event(ev: SessionEvent, state: &mut AppState) {
    match ev {
        SessionEvent::Tick { .. } => {}
        SessionEvent::Expired(Ok(result)) => {
            let title = state
                .leave_session()
                .map(|a| a.name)
                .unwrap_or_default();
            state.dialog_stack.clear();
            state.show_result(title, result);
            state.notice(
                "Time expired",
                "Your answers were submitted automatically.",
            );
        }
        SessionEvent::Expired(Err(e)) => {
            state.dialog_stack.clear();
            state.notice(
                "Time expired",
                format!("Automatic submission failed: {}. Press Ctrl+S to retry.", e),
            );
        }
    }
}

/// Switch to the busy screen and draw it before a network call blocks.
fn show_busy(ctx: &mut Ctx<'_>, state: &mut AppState, message: &str) -> Result<Screen> {
    let previous = std::mem::replace(&mut state.screen, Screen::Busy);
    state.busy_message = message.to_string();
    ctx.terminal
        .draw(|f| crate::ui::draw(f, state))
        .context("draw error")?;
    Ok(previous)
}

fn handle_key(ctx: &mut Ctx<'_>, key: KeyEvent, state: &mut AppState) -> Result<()> {
    if state.has_dialog() {
        return handle_dialog_key(ctx, key, state);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match state.screen {
        Screen::List => match key.code {
            KeyCode::Char('q') => state.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => state.move_list_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => state.move_list_cursor(1),
            KeyCode::Char('r') => refresh(ctx, state)?,
            KeyCode::Char('?') => state.push_dialog(Dialog::Help),
            KeyCode::Enter => activate_selected(ctx, state)?,
            _ => {}
        },
        Screen::Working => match key.code {
            KeyCode::Char('q') if ctrl => state.push_dialog(Dialog::ConfirmQuit),
            KeyCode::Char('p') if ctrl => state.push_dialog(Dialog::ConfirmPause),
            KeyCode::Char('s') if ctrl => request_submit(state),
            KeyCode::Up => state.move_option_cursor(-1),
            KeyCode::Down => state.move_option_cursor(1),
            KeyCode::Left => state.prev_question(),
            KeyCode::Right => state.next_question(),
            KeyCode::Home => state.navigate_to(0),
            KeyCode::End => state.navigate_to(state.questions().len().saturating_sub(1)),
            KeyCode::Char(' ') | KeyCode::Enter => toggle_selected(state),
            KeyCode::Char('?') => state.push_dialog(Dialog::Help),
            _ => {}
        },
        Screen::Result => match key.code {
            KeyCode::Char('q') if ctrl => state.should_quit = true,
            KeyCode::Enter | KeyCode::Esc => {
                state.result = None;
                state.screen = Screen::List;
                refresh(ctx, state)?;
            }
            _ => {}
        },
        Screen::Busy => {}
    }
    Ok(())
}

fn handle_dialog_key(ctx: &mut Ctx<'_>, key: KeyEvent, state: &mut AppState) -> Result<()> {
    let Some(dialog) = state.top_dialog().cloned() else {
        return Ok(());
    };

    match dialog {
        Dialog::Help | Dialog::Notice { .. } => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?')) {
                state.pop_dialog();
            }
        }
        _ => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                state.pop_dialog();
                match dialog {
                    Dialog::ConfirmStart => open_session(ctx, state, false)?,
                    Dialog::ConfirmResume => open_session(ctx, state, true)?,
                    Dialog::ConfirmPause => pause_session(ctx, state)?,
                    Dialog::ConfirmSubmit => submit_session(ctx, state)?,
                    Dialog::ConfirmQuit => {
                        state.should_quit = true;
                        pause_session(ctx, state)?;
                    }
                    Dialog::Help | Dialog::Notice { .. } => {}
                }
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                state.pop_dialog();
            }
            _ => {}
        },
    }
    Ok(())
}

fn activate_selected(ctx: &mut Ctx<'_>, state: &mut AppState) -> Result<()> {
    let Some(selected) = state.selected_assignment() else {
        return Ok(());
    };
    let display = selected.display_state(state.now());

    match ListAction::for_state(display) {
        ListAction::Start => state.push_dialog(Dialog::ConfirmStart),
        ListAction::Resume => state.push_dialog(Dialog::ConfirmResume),
        ListAction::ViewResult => {
            let (id, name) = (selected.id, selected.name.clone());
            let previous = show_busy(ctx, state, "Loading result...")?;
            match ctx.rt.block_on(ctx.api.fetch_result(id)) {
                Ok(result) => state.show_result(name, result),
                Err(e) => {
                    state.screen = previous;
                    state.notice("Could not load result", e.to_string());
                }
            }
        }
        ListAction::None => {
            state.notice(
                "Not available",
                format!("This assessment is {} and cannot be opened.", display),
            );
        }
    }
    Ok(())
}

fn refresh(ctx: &mut Ctx<'_>, state: &mut AppState) -> Result<()> {
    let previous = show_busy(ctx, state, "Loading assessments...")?;
    match ctx.rt.block_on(ctx.api.list_available()) {
        Ok(list) => state.set_assignments(list),
        Err(e) => state.notice("Could not load assessments", e.to_string()),
    }
    state.screen = previous;
    Ok(())
}

fn open_session(ctx: &mut Ctx<'_>, state: &mut AppState, resume: bool) -> Result<()> {
    let Some(assignment) = state.selected_assignment().cloned() else {
        return Ok(());
    };

    show_busy(ctx, state, "Loading questions...")?;
    let opened = ctx
        .rt
        .block_on(Session::open(ctx.api.clone(), assignment, state.clock));
    let mut session = match opened {
        Ok(session) => session,
        Err(e) => {
            state.screen = Screen::List;
            state.notice("Could not load questions", e.to_string());
            return Ok(());
        }
    };

    let message = if resume { "Resuming..." } else { "Starting..." };
    show_busy(ctx, state, message)?;
    let outcome = if resume {
        ctx.rt.block_on(session.resume())
    } else {
        ctx.rt.block_on(session.start())
    };

    match outcome {
        Ok(_) => state.enter_session(session),
        Err(e) => {
            state.screen = Screen::List;
            let title = if resume {
                "Could not resume"
            } else {
                "Could not start"
            };
            state.notice(title, e.to_string());
        }
    }
    Ok(())
}

fn pause_session(ctx: &mut Ctx<'_>, state: &mut AppState) -> Result<()> {
    let Some(session) = state.session.as_mut() else {
        return Ok(());
    };
    if !session.is_running() && !session.is_expired() {
        state.leave_session();
        state.screen = Screen::List;
        return Ok(());
    }

    show_busy(ctx, state, "Pausing...")?;
    let Some(session) = state.session.as_mut() else {
        return Ok(());
    };
    let outcome = ctx.rt.block_on(session.pause());
    state.leave_session();
    state.screen = Screen::List;

    match outcome {
        Ok(PauseOutcome::Recorded { segment_secs }) => {
            state.notice(
                "Paused",
                format!(
                    "{} of work recorded. Continue any time before the window closes.",
                    crate::timer::format_wait_duration(segment_secs)
                ),
            );
        }
        Ok(PauseOutcome::Unrecorded { error, .. }) => {
            state.notice(
                "Paused locally",
                format!("The service did not confirm the pause: {}", error),
            );
        }
        Err(e) => state.notice("Could not pause", e.to_string()),
    }

    if !state.should_quit {
        refresh(ctx, state)?;
    }
    Ok(())
}

fn request_submit(state: &mut AppState) {
    let Some(session) = state.session.as_ref() else {
        return;
    };
    let untouched = session.snapshot().untouched_questions;
    if untouched > 0 && !session.is_expired() {
        state.notice(
            "Not finished",
            format!(
                "{} question(s) have no marked answer. Mark at least one option on every question.",
                untouched
            ),
        );
    } else {
        state.push_dialog(Dialog::ConfirmSubmit);
    }
}

fn submit_session(ctx: &mut Ctx<'_>, state: &mut AppState) -> Result<()> {
    show_busy(ctx, state, "Submitting...")?;
    let Some(session) = state.session.as_mut() else {
        state.screen = Screen::List;
        return Ok(());
    };
    let forced = session.is_expired();
    let outcome = ctx.rt.block_on(session.submit(forced));

    match outcome {
        Ok(result) => {
            let title = state
                .leave_session()
                .map(|a| a.name)
                .unwrap_or_default();
            state.show_result(title, result);
        }
        Err(SessionError::Incomplete { untouched }) => {
            state.screen = Screen::Working;
            state.notice(
                "Not finished",
                format!("{} question(s) have no marked answer.", untouched),
            );
        }
        Err(SessionError::Api(e)) if e.is_retryable() => {
            state.screen = Screen::Working;
            state.notice(
                "Submission failed",
                format!("{}. Your answers are kept; press Ctrl+S to retry.", e),
            );
        }
        Err(e) => {
            state.screen = Screen::Working;
            state.notice("Submission failed", e.to_string());
        }
    }
    Ok(())
}

fn toggle_selected(state: &mut AppState) {
    let Some((qid, text)) = state.selected_option() else {
        return;
    };
    let Some(session) = state.session.as_mut() else {
        return;
    };
    match session.toggle_mark(qid, &text) {
        Ok(mark) => tracing::debug!(question = qid, mark = mark.as_str(), "mark changed"),
        Err(e) => tracing::debug!(%e, "mark refused"),
    }
}
