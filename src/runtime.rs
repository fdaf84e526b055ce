use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the host loop
#[derive(Clone, Debug)]
pub enum HostEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal input for the host loop
pub trait HostEventSource {
    /// Block for up to `timeout` waiting for input.
    fn recv_timeout(&self, timeout: Duration) -> Result<HostEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<HostEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                Ok(CtEvent::Key(key)) => HostEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => HostEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<HostEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for headless tests
pub struct ChannelEventSource {
    rx: Receiver<HostEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<HostEvent>) -> Self {
        Self { rx }
    }
}

impl HostEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<HostEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the host one event or tick at a time
pub struct Runner<E: HostEventSource> {
    source: E,
    tick: Duration,
}

impl<E: HostEventSource> Runner<E> {
    pub fn new(source: E, tick: Duration) -> Self {
        Self { source, tick }
    }

    /// Next input, or `Tick` once the tick interval passes without any
    pub fn step(&self) -> HostEvent {
        self.source
            .recv_timeout(self.tick)
            .unwrap_or(HostEvent::Tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));
        assert!(matches!(runner.step(), HostEvent::Tick));
    }

    #[test]
    fn step_returns_tick_when_disconnected() {
        let (tx, rx) = mpsc::channel::<HostEvent>();
        drop(tx);
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(1));
        assert!(matches!(runner.step(), HostEvent::Tick));
    }

    #[test]
    fn step_passes_keys_through() {
        let (tx, rx) = mpsc::channel();
        tx.send(HostEvent::Key(KeyEvent::new(
            KeyCode::Char('t'),
            KeyModifiers::NONE,
        )))
        .unwrap();
        let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(10));
        match runner.step() {
            HostEvent::Key(key) => assert_eq!(key.code, KeyCode::Char('t')),
            other => panic!("expected key event, got {other:?}"),
        }
    }
}
