use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    app.poll_generation().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_file_dialog {
        handle_file_dialog(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_prompt_editing(app, key),
    }
}

/// A paste naming a file is a drop; anything else is typed text
fn handle_paste(app: &mut App, text: &str) {
    if app.show_file_dialog {
        let line = text.lines().next().unwrap_or_default();
        insert_text(&mut app.path_input, &mut app.path_cursor, line);
        return;
    }

    if app.handle_drop(text) {
        return;
    }

    if app.input_mode == InputMode::Editing {
        let flattened = text.replace(['\r', '\n'], " ");
        insert_text(app.workflow.prompt_mut(), &mut app.prompt_cursor, &flattened);
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Browse for an image
        KeyCode::Char('o') => app.open_file_dialog(),

        // Edit the prompt
        KeyCode::Char('i') | KeyCode::Char('p') | KeyCode::Tab => {
            app.prompt_cursor = app.workflow.prompt().chars().count();
            app.input_mode = InputMode::Editing;
        }

        // Generate (disabled without an image or while submitting)
        KeyCode::Enter | KeyCode::Char('g') => {
            if app.workflow.can_generate() {
                app.start_generation();
            }
        }

        // Save the result
        KeyCode::Char('s') => {
            if let Err(err) = app.save_result() {
                tracing::error!(error = %err, "could not save result");
                app.notice = Some(format!("Could not save result: {}", err));
            }
        }

        // Dismiss the banner
        KeyCode::Esc | KeyCode::Char('x') => app.workflow.dismiss_error(),

        _ => {}
    }
}

fn handle_prompt_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        // A visible banner takes the first Esc
        KeyCode::Esc if app.workflow.error().is_some() => app.workflow.dismiss_error(),
        KeyCode::Esc | KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            if app.workflow.can_generate() {
                app.start_generation();
            }
        }
        _ => edit_line(app.workflow.prompt_mut(), &mut app.prompt_cursor, key),
    }
}

fn handle_file_dialog(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_file_dialog(),
        KeyCode::Enter => app.submit_file_dialog(),
        _ => edit_line(&mut app.path_input, &mut app.path_cursor, key),
    }
}

/// Single-line editing shared by the prompt and the path dialog
fn edit_line(input: &mut String, cursor: &mut usize, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = input.chars().count();
            if *cursor < char_count {
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = input.chars().count();
            *cursor = (*cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(input, *cursor);
            input.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => {}
    }
}

fn insert_text(input: &mut String, cursor: &mut usize, text: &str) {
    let byte_pos = char_to_byte_index(input, *cursor);
    input.insert_str(byte_pos, text);
    *cursor += text.chars().count();
}
