use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Tab cycles focus: Sidebar -> Chat -> Suggestions -> Input
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Sidebar => FocusPane::Chat,
                FocusPane::Chat => FocusPane::Suggestions,
                FocusPane::Suggestions => FocusPane::Input,
                FocusPane::Input => FocusPane::Sidebar,
            };

            // Auto-enter editing mode when focusing the input
            if app.focus == FocusPane::Input {
                app.input_mode = InputMode::Editing;
                // Cursor at end of existing text
                app.input_cursor = app.input.chars().count();
            }
        }

        // Jump straight into the input
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
            app.input_cursor = app.input.chars().count();
        }

        // New chat
        KeyCode::Char('n') => app.new_chat(),

        // Collapse/expand the sidebar
        KeyCode::Char('s') => app.toggle_sidebar(),

        // Language label in the header (display only)
        KeyCode::Char('L') => app.toggle_language(),

        // Navigation/scrolling based on focus
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Sidebar => app.sidebar_nav_down(),
            FocusPane::Chat => app.scroll_chat_down(),
            FocusPane::Suggestions | FocusPane::Input => {}
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Sidebar => app.sidebar_nav_up(),
            FocusPane::Chat => app.scroll_chat_up(),
            FocusPane::Suggestions | FocusPane::Input => {}
        },
        KeyCode::Char('h') | KeyCode::Left => {
            if app.focus == FocusPane::Suggestions {
                app.suggestion_prev();
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if app.focus == FocusPane::Suggestions {
                app.suggestion_next();
            }
        }

        // Half-page scroll in the chat
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.focus == FocusPane::Chat {
                app.scroll_half_page_down();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.focus == FocusPane::Chat {
                app.scroll_half_page_up();
            }
        }

        // Jump to top/bottom of the chat
        KeyCode::Char('g') => {
            if app.focus == FocusPane::Chat {
                app.chat_scroll = 0;
            }
        }
        KeyCode::Char('G') => {
            if app.focus == FocusPane::Chat {
                app.scroll_chat_to_bottom();
            }
        }

        // Enter sends the selected suggestion chip
        KeyCode::Enter => {
            if app.focus == FocusPane::Suggestions {
                let chip = app.selected_suggestion();
                send_question(app, Some(chip));
            }
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            send_question(app, None);
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Accept the question and start its request. Every submit spawns an
/// independent task; answers append in completion order.
fn send_question(app: &mut App, text: Option<&str>) {
    let Some(question) = app.submit(text) else {
        return;
    };

    let client = app.client.clone();
    app.pending.push(tokio::spawn(async move {
        client.ask(&question).await
    }));
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // Determine which area the mouse is in (position-based scrolling)
    let in_sidebar = app.sidebar_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_chat {
                app.scroll_chat_down();
                app.scroll_chat_down();
                app.scroll_chat_down();
            } else if in_sidebar {
                app.sidebar_nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_chat {
                app.scroll_chat_up();
                app.scroll_chat_up();
                app.scroll_chat_up();
            } else if in_sidebar {
                app.sidebar_nav_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn editing_keeps_cursor_consistent_through_utf8() {
        let mut app = App::new();
        app.focus = FocusPane::Input;
        app.input_mode = InputMode::Editing;

        for c in "habari żź".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.input, "habari żź");
        assert_eq!(app.input_cursor, 9);

        handle_key(&mut app, key(KeyCode::Left));
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.input, "habari ź");
        assert_eq!(app.input_cursor, 7);

        handle_key(&mut app, key(KeyCode::Home));
        handle_key(&mut app, key(KeyCode::Delete));
        assert_eq!(app.input, "abari ź");
        assert_eq!(app.input_cursor, 0);

        handle_key(&mut app, key(KeyCode::End));
        assert_eq!(app.input_cursor, 7);
    }

    #[tokio::test]
    async fn enter_in_editing_mode_submits_the_draft() {
        let mut app = App::new();
        app.focus = FocusPane::Input;
        app.input_mode = InputMode::Editing;

        for c in "How do I pay tuition fees?".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        handle_key(&mut app, key(KeyCode::Enter));

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].text, "How do I pay tuition fees?");
        assert!(app.input.is_empty());
        assert_eq!(app.pending.len(), 1);
        assert!(app.is_loading());
    }

    #[tokio::test]
    async fn enter_on_a_chip_submits_its_text() {
        let mut app = App::new();
        app.focus = FocusPane::Suggestions;
        app.input_mode = InputMode::Normal;
        app.suggestion_next();

        handle_key(&mut app, key(KeyCode::Enter));

        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].text, "What is the grading system?");
        assert_eq!(app.pending.len(), 1);
    }

    #[tokio::test]
    async fn submits_are_not_serialized() {
        let mut app = App::new();
        app.focus = FocusPane::Input;
        app.input_mode = InputMode::Editing;

        handle_key(&mut app, key(KeyCode::Char('a')));
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Char('b')));
        handle_key(&mut app, key(KeyCode::Enter));

        assert_eq!(app.pending.len(), 2);
        assert_eq!(app.messages.len(), 2);
    }

    #[test]
    fn tab_into_input_enters_editing_with_cursor_at_end() {
        let mut app = App::new();
        app.focus = FocusPane::Suggestions;
        app.input_mode = InputMode::Normal;
        app.input = "draft".to_string();

        handle_key(&mut app, key(KeyCode::Tab));

        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.input_cursor, 5);
    }
}
