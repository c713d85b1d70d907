//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, Screen, ASSETS_PATH, OWNERS_PATH, PAGE_SCROLL_SIZE};
use crate::form::{FieldKind, Form};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ConfirmingQuit => return Ok(handle_quit_confirm(app, key)),
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::Editing => {
            handle_form_input(app, key).await;
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.confirm_delete().await;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    match app.screen {
        Screen::Login | Screen::Register => handle_auth_input(app, key).await,
        Screen::Owners | Screen::Assets => Ok(handle_list_input(app, key)),
    }
}

fn handle_quit_confirm(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.state = AppState::Quitting;
            true
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.state = AppState::Normal;
            false
        }
        _ => false,
    }
}

/// Shared text editing keys. Returns true if the key was consumed.
fn edit_field(form: &mut Form, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => {
            if let Some(field) = form.focused_mut() {
                field.backspace();
            }
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(field) = form.focused_mut() {
                field.push_char(c);
            }
        }
        _ => return false,
    }
    true
}

async fn handle_auth_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let on_login = app.screen == Screen::Login;
    match key.code {
        KeyCode::Esc => {
            if on_login {
                app.state = AppState::ConfirmingQuit;
            } else {
                let login = app.login_path();
                app.navigate(&login);
            }
        }
        KeyCode::Enter => {
            if app.login_form.is_last_field() {
                if on_login {
                    app.submit_login().await;
                } else {
                    app.submit_register().await;
                }
            } else {
                app.login_form.focus_next();
            }
        }
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) && on_login => {
            if let Some(register) = app.register_path() {
                app.navigate(&register);
            }
        }
        _ => {
            edit_field(&mut app.login_form, key);
        }
    }
    Ok(false)
}

fn handle_list_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('1') => app.navigate(OWNERS_PATH),
        KeyCode::Char('2') => app.navigate(ASSETS_PATH),
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
            let target = if app.screen == Screen::Owners {
                ASSETS_PATH
            } else {
                OWNERS_PATH
            };
            app.navigate(target);
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.move_selection(isize::MIN / 2),
        KeyCode::End => app.move_selection(isize::MAX / 2),
        KeyCode::Char('n') | KeyCode::Char('a') => app.start_create(),
        KeyCode::Char('e') | KeyCode::Enter => app.start_edit(),
        KeyCode::Char('d') | KeyCode::Delete => app.start_delete(),
        KeyCode::Char('s') => app.toggle_sort(),
        KeyCode::Char('u') | KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('L') => app.logout(),
        _ => {}
    }
    false
}

async fn handle_form_input(app: &mut App, key: KeyEvent) {
    let on_owner_choice = app
        .edit_form
        .as_ref()
        .and_then(Form::focused)
        .is_some_and(|f| f.kind == FieldKind::OwnerChoice);

    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => {
            let last = app.edit_form.as_ref().is_some_and(Form::is_last_field);
            if last {
                app.submit_edit_form().await;
            } else if let Some(form) = app.edit_form.as_mut() {
                form.focus_next();
            }
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.submit_edit_form().await;
        }
        KeyCode::Left | KeyCode::Right if on_owner_choice => {
            app.cycle_form_owner(key.code == KeyCode::Right);
        }
        _ => {
            if let Some(form) = app.edit_form.as_mut() {
                edit_field(form, key);
            }
        }
    }
}
