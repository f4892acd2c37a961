use std::{
    io::{self, Stderr},
    panic,
};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;

use super::{
    app::App,
    event::{Event, EventHandler},
    ui,
};

pub type CrosstermTerminal = ratatui::Terminal<CrosstermBackend<Stderr>>;

/// The terminal in raw mode on the alternate screen, drawn on stderr so stdout stays free.
pub struct Terminal {
    terminal: CrosstermTerminal,
    events: EventHandler,
}

impl Terminal {
    pub fn new(events: EventHandler) -> anyhow::Result<Self> {
        let terminal = ratatui::Terminal::new(CrosstermBackend::new(io::stderr()))?;
        Ok(Self { terminal, events })
    }

    pub fn enter(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

        // Restore the terminal before the panic message is printed
        let panic_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if let Err(err) = Self::reset() {
                eprintln!("Failed to reset the terminal: {}", err);
            }
            panic_hook(info);
        }));

        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn draw(&mut self, app: &mut App) -> anyhow::Result<()> {
        self.terminal.draw(|frame| ui::render(app, frame))?;
        Ok(())
    }

    pub fn next_event(&self) -> anyhow::Result<Event> {
        self.events.next()
    }

    fn reset() -> anyhow::Result<()> {
        terminal::disable_raw_mode()?;
        crossterm::execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
        Ok(())
    }

    pub fn exit(&mut self) -> anyhow::Result<()> {
        Self::reset()?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
