//! Terminal input plus fixed-rate tick/render pulses, merged onto one
//! channel by a background task.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Terminal size changed; the next frame re-lays out from scratch.
    Resize,
    /// Animation and toast expiry pulse.
    Tick,
    /// Redraw pulse.
    Render,
}

impl Event {
    /// Keep key presses and resizes. Releases, repeats, mouse and focus
    /// events are dropped.
    fn from_terminal(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Key(key)),
            CrosstermEvent::Resize(..) => Some(Self::Resize),
            _ => None,
        }
    }
}

fn pulse(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Owns the reader task. Dropping it stops the task.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            let mut terminal = EventStream::new();
            let mut ticks = pulse(tick_rate);
            let mut renders = pulse(render_rate);

            loop {
                let event = tokio::select! {
                    () = task_cancel.cancelled() => break,
                    _ = ticks.tick() => Event::Tick,
                    _ = renders.tick() => Event::Render,
                    Some(Ok(raw)) = terminal.next() => match Event::from_terminal(raw) {
                        Some(event) => event,
                        None => continue,
                    },
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel }
    }

    /// `None` once the reader task has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    use super::*;

    fn key(kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn only_presses_and_resizes_pass_through() {
        let press = key(KeyEventKind::Press);
        assert_eq!(
            Event::from_terminal(CrosstermEvent::Key(press)),
            Some(Event::Key(press))
        );
        assert_eq!(
            Event::from_terminal(CrosstermEvent::Key(key(KeyEventKind::Release))),
            None
        );
        assert_eq!(
            Event::from_terminal(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize)
        );
        assert_eq!(Event::from_terminal(CrosstermEvent::FocusGained), None);
    }
}
