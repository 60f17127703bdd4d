use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use paper_search_core::Variant;
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply { variant, id, outcome } => app.apply_reply(variant, id, outcome),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('l') => {
                app.reset_current();
                return;
            }
            _ => {}
        }
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Start typing
        KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.query_cursor = app.query_input.chars().count();
        }

        // Mode switching
        KeyCode::Tab => {
            let next = app.mode.next();
            app.switch_mode(next);
        }
        KeyCode::Char('1') => app.switch_mode(Variant::Search),
        KeyCode::Char('2') => app.switch_mode(Variant::Papers),
        KeyCode::Char('3') => app.switch_mode(Variant::Chat),

        // Results navigation
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('g') => {
            if app.mode.keeps_history() {
                app.chat_scroll = 0;
            } else {
                app.results_first();
            }
        }
        KeyCode::Char('G') => {
            if app.mode.keeps_history() {
                app.scroll_chat_to_bottom();
            } else {
                app.results_last();
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
            if app.submit_query() && !app.mode.keeps_history() {
                // Leave the search box so j/k move through results
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Backspace => {
            if app.query_cursor > 0 {
                app.query_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
                app.query_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.query_input.chars().count();
            if app.query_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
                app.query_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.query_cursor = app.query_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.query_input.chars().count();
            app.query_cursor = (app.query_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.query_cursor = 0;
        }
        KeyCode::End => {
            app.query_cursor = app.query_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.query_input, app.query_cursor);
            app.query_input.insert(byte_pos, c);
            app.query_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_results = app
        .results_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_results {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            for _ in 0..3 {
                app.scroll_down();
            }
        }
        MouseEventKind::ScrollUp => {
            for _ in 0..3 {
                app.scroll_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paper_search_core::{BackendError, Config, DisplayItem, RawReply, RequestState};
    use tokio::sync::mpsc;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(Config::new(), None, Some(Variant::Search), tx).unwrap()
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[test]
    fn test_editing_inserts_at_cursor() {
        let mut app = test_app();
        type_str(&mut app, "grph");
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.query_input, "graph");
        assert_eq!(app.query_cursor, 3);

        press(&mut app, KeyCode::Home);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.query_input, "raph");

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.query_input, "rap");
    }

    #[test]
    fn test_escape_then_mode_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.mode, Variant::Chat);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.mode, Variant::Search);

        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_digits_are_text_while_editing() {
        let mut app = test_app();
        type_str(&mut app, "2024");
        assert_eq!(app.mode, Variant::Search);
        assert_eq!(app.query_input, "2024");
    }

    #[tokio::test]
    async fn test_enter_submits_and_leaves_search_box() {
        let mut app = test_app();
        type_str(&mut app, "rust");
        press(&mut app, KeyCode::Enter);
        assert!(app.current().is_busy());
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_key(&mut app, KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(!app.current().is_busy());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = test_app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_reply_event_completes_request() {
        let mut app = test_app();
        let pending = app.search.begin("rust").unwrap();

        let outcome = Ok(RawReply {
            status: 200,
            body: r#"{"messages":[{"content":"A"},{"content":"B"}]}"#.to_string(),
        });
        handle_event(&mut app, AppEvent::Reply { variant: Variant::Search, id: pending.id, outcome }).unwrap();

        assert_eq!(app.search.state(), RequestState::Succeeded);
        assert_eq!(app.search.results(), &[DisplayItem::text("A"), DisplayItem::text("B")]);
        assert_eq!(app.results_state.selected(), Some(0));
    }

    #[test]
    fn test_reply_event_for_other_mode_leaves_selection() {
        let mut app = test_app();
        let pending = app.chat.begin("hi").unwrap();

        let outcome = Err(BackendError::Transport("refused".to_string()));
        handle_event(&mut app, AppEvent::Reply { variant: Variant::Chat, id: pending.id, outcome }).unwrap();

        assert!(!app.chat.is_busy());
        assert_eq!(app.chat.history().len(), 2);
        assert_eq!(app.results_state.selected(), None);
    }
}
