use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, KeyEvent, MouseEvent};

pub enum Event {
    /// Presses, repeats and (where the terminal reports them) releases.
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());
                let sent = match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(event::Event::Key(key)) => tx.send(Event::Key(key)),
                        Ok(event::Event::Mouse(mouse)) => tx.send(Event::Mouse(mouse)),
                        Ok(event::Event::Resize(..)) => tx.send(Event::Resize),
                        Ok(_) => Ok(()),
                        Err(e) => {
                            log::warn!("terminal read failed: {e}");
                            Ok(())
                        }
                    },
                    Ok(false) => Ok(()),
                    Err(e) => {
                        log::warn!("terminal poll failed: {e}");
                        Ok(())
                    }
                };
                if sent.is_err() {
                    return;
                }
                // Input bursts must not starve the games of ticks
                if last_tick.elapsed() >= tick_rate {
                    if tx.send(Event::Tick).is_err() {
                        return;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> Result<Event> {
        self.rx.recv().context("event thread stopped")
    }
}
