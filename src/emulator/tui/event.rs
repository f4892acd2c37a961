use std::{
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};

/// Terminal events.
#[derive(Clone, Copy, Debug)]
pub enum Event {
    /// Terminal tick, drives continuous runs.
    Tick,
    /// Key press.
    Key(KeyEvent),
    /// Mouse click/scroll.
    Mouse(MouseEvent),
    /// Terminal resize.
    Resize(u16, u16),
}

/// Polls the terminal on a background thread and forwards [`Event`]s.
///
/// The thread ends when the receiving side is dropped or the terminal can no longer be read.
#[derive(Debug)]
pub struct EventHandler {
    receiver: mpsc::Receiver<Event>,
    #[allow(dead_code)]
    handler: thread::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();
        let handler = thread::spawn(move || {
            if let Err(err) = poll_loop(&sender, tick_rate) {
                tracing::error!("terminal event loop stopped: {}", err);
            }
        });
        Self { receiver, handler }
    }

    /// Receive the next event from the handler thread.
    ///
    /// Blocks until an event arrives.
    pub fn next(&self) -> anyhow::Result<Event> {
        Ok(self.receiver.recv()?)
    }
}

fn poll_loop(sender: &mpsc::Sender<Event>, tick_rate: Duration) -> anyhow::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            let event = match event::read()? {
                // Windows also reports releases
                CrosstermEvent::Key(e) if e.kind == KeyEventKind::Press => Some(Event::Key(e)),
                CrosstermEvent::Mouse(e) => Some(Event::Mouse(e)),
                CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                _ => None,
            };
            if let Some(event) = event {
                sender.send(event)?;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            sender.send(Event::Tick)?;
            last_tick = Instant::now();
        }
    }
}
