use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;

pub fn update(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc | KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key_event.modifiers == KeyModifiers::CONTROL => app.quit(),
        KeyCode::Char('c') => app.toggle_run(),
        KeyCode::Char('s') => app.step(),
        KeyCode::Char('r') => app.reset(),
        KeyCode::Char('b') => app.toggle_breakpoint(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::PageUp => app.scroll_up_page(),
        KeyCode::PageDown => app.scroll_down_page(),
        KeyCode::Left => {
            app.selected_widget = app.selected_widget.prev();
        }
        KeyCode::Right => {
            app.selected_widget = app.selected_widget.next();
        }
        _ => {}
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assembler::compiler::CommandSet,
        emulator::{session::SessionState, tui::app::AppWidget},
    };

    fn press(app: &mut App, code: KeyCode) {
        update(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_keys() {
        let mut app = App::new("IN r0\nOUT r0\nHALT\n", CommandSet::zero(), vec![4]);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.cursor, 1);
        press(&mut app, KeyCode::Char('b'));
        assert!(app.session().breakpoints().contains(1));
        press(&mut app, KeyCode::Char('c'));
        assert!(app.is_running());
        app.tick();
        assert_eq!(app.session().state(), SessionState::Halted);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected_widget, AppWidget::Memory);
        assert!(!app.should_quit());
        update(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }
}
