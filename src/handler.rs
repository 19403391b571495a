use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, Screen};
use crate::input::InputField;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on every screen
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        app.should_quit = true;
        return;
    }

    match app.screen() {
        Screen::Upload => handle_upload(app, key),
        Screen::Chat if app.show_file_prompt => handle_file_prompt(app, key),
        Screen::Chat => handle_chat(app, key),
    }
}

fn handle_upload(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => submit_file_path(app),
        _ if !app.loading => edit_field(&mut app.file_path, key),
        _ => {}
    }
}

fn handle_file_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if !app.loading {
                app.close_file_prompt();
            }
        }
        KeyCode::Enter => submit_file_path(app),
        _ if !app.loading => edit_field(&mut app.file_path, key),
        _ => {}
    }
}

fn handle_chat(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.open_file_prompt();
        }
        KeyCode::Enter => app.submit_question(),
        KeyCode::Esc => app.question.clear(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        _ => edit_field(&mut app.question, key),
    }
}

fn submit_file_path(app: &mut App) {
    let path = app.file_path.text().trim().to_string();
    if !path.is_empty() {
        app.process_file(path);
    }
}

fn edit_field(field: &mut InputField, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => field.insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen() != Screen::Chat {
        return;
    }

    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::app::NOT_A_PDF;
    use crate::state::{ChatMessage, SessionId};
    use crossterm::event::KeyEventState;
    use crossterm::event::KeyEventKind;
    use std::sync::Arc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    fn chat_app(api: MockApi) -> App {
        let mut app = App::new(Arc::new(api));
        app.session_id = SessionId::new("abc123");
        app.messages.push(ChatMessage::assistant("welcome"));
        app
    }

    #[test]
    fn test_ctrl_c_quits_from_any_screen() {
        let mut app = App::new(Arc::new(MockApi::new()));
        handle_event(&mut app, ctrl('c'));
        assert!(app.should_quit);

        let mut app = chat_app(MockApi::new());
        handle_event(&mut app, ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_typing_on_upload_screen_edits_path() {
        let mut app = App::new(Arc::new(MockApi::new()));
        type_text(&mut app, "lease.pdff");
        handle_event(&mut app, key(KeyCode::Backspace));

        assert_eq!(app.file_path.text(), "lease.pdf");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_enter_on_non_pdf_sets_status() {
        let api = Arc::new(MockApi::new());
        let mut app = App::new(api.clone());
        type_text(&mut app, "notes.docx");
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.status, NOT_A_PDF);
        assert_eq!(api.upload_calls(), 0);
    }

    #[tokio::test]
    async fn test_enter_on_upload_screen_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lease.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let mut app = App::new(Arc::new(MockApi::new().with_session("abc123")));
        type_text(&mut app, path.to_str().unwrap());
        handle_event(&mut app, key(KeyCode::Enter));
        assert!(app.loading);

        app.settle().await;
        assert_eq!(app.screen(), Screen::Chat);
    }

    #[tokio::test]
    async fn test_enter_in_chat_sends_question() {
        let api = Arc::new(MockApi::new().with_answer("Clause 5 covers termination."));
        let mut app = App::new(api.clone());
        app.session_id = SessionId::new("abc123");

        type_text(&mut app, "What is the termination clause?");
        handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.messages.len(), 1);
        assert!(app.question.is_empty());

        app.settle().await;
        assert_eq!(app.messages.len(), 2);
        assert_eq!(api.chat_calls(), 1);
    }

    #[test]
    fn test_ctrl_o_opens_and_esc_closes_file_prompt() {
        let mut app = chat_app(MockApi::new());
        handle_event(&mut app, ctrl('o'));
        assert!(app.show_file_prompt);
        assert!(app.question.is_empty());

        type_text(&mut app, "new.pdf");
        assert_eq!(app.file_path.text(), "new.pdf");
        assert!(app.question.is_empty());

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_file_prompt);
        assert!(app.file_path.is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_mouse_scroll_inside_chat_area() {
        let mut app = chat_app(MockApi::new());
        app.chat_area = Some(Rect::new(0, 1, 40, 10));
        app.chat_scroll = 5;

        handle_event(
            &mut app,
            AppEvent::Mouse(MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 3,
                row: 4,
                modifiers: KeyModifiers::NONE,
            }),
        );
        assert_eq!(app.chat_scroll, 2);

        handle_event(
            &mut app,
            AppEvent::Mouse(MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 60,
                row: 4,
                modifiers: KeyModifiers::NONE,
            }),
        );
        assert_eq!(app.chat_scroll, 2);
    }

    #[test]
    fn test_tick_animates_only_while_loading() {
        let mut app = chat_app(MockApi::new());
        handle_event(&mut app, AppEvent::Tick);
        assert_eq!(app.animation_frame, 0);

        app.loading = true;
        handle_event(&mut app, AppEvent::Tick);
        handle_event(&mut app, AppEvent::Tick);
        handle_event(&mut app, AppEvent::Tick);
        assert_eq!(app.animation_frame, 0);
        handle_event(&mut app, AppEvent::Tick);
        assert_eq!(app.animation_frame, 1);
    }
}
