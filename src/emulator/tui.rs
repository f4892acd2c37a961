pub mod app;
pub mod event;
pub mod terminal;
pub mod ui;
pub mod update;

use std::time::Duration;

use self::{
    app::App,
    event::{Event, EventHandler},
    terminal::Terminal,
    update::update,
};

const TICK_RATE: Duration = Duration::from_millis(50);

/// Runs the interactive debugger until the user quits.
pub fn run(mut app: App) -> anyhow::Result<()> {
    let mut terminal = Terminal::new(EventHandler::new(TICK_RATE))?;
    terminal.enter()?;

    let result = event_loop(&mut app, &mut terminal);

    terminal.exit()?;
    result
}

fn event_loop(app: &mut App, terminal: &mut Terminal) -> anyhow::Result<()> {
    while !app.should_quit() {
        terminal.draw(app)?;

        match terminal.next_event()? {
            Event::Tick => app.tick(),
            Event::Key(key_event) => update(app, key_event),
            Event::Mouse(_) | Event::Resize(_, _) => {}
        };
    }
    Ok(())
}
