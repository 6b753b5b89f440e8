//! Scripted transport for deterministic lifecycle tests.

use std::sync::Arc;

use midisock::transport::{Connector, TransportCommand, TransportEvent, TransportLink};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// One recorded dial: the test's ends of the transport the manager got.
pub struct MockDial {
    /// Host the manager asked for.
    pub host: String,
    /// Emit transport events into the manager's pump.
    pub events: mpsc::UnboundedSender<TransportEvent>,
    /// Commands the manager (and its channels) issued.
    pub commands: mpsc::UnboundedReceiver<TransportCommand>,
}

impl MockDial {
    /// Drive the connection to established.
    pub fn open(&self) {
        self.events
            .send(TransportEvent::Open)
            .expect("manager pump is gone");
    }

    /// Deliver one inbound text frame.
    pub fn message(&self, text: impl Into<String>) {
        self.events
            .send(TransportEvent::Message(text.into()))
            .expect("manager pump is gone");
    }

    /// Report a transport error.
    pub fn error(&self, reason: impl Into<String>) {
        self.events
            .send(TransportEvent::Error(reason.into()))
            .expect("manager pump is gone");
    }

    /// Terminate the transport.
    pub fn close(&self, clean: bool, code: Option<u16>) {
        self.events
            .send(TransportEvent::Closed { clean, code })
            .expect("manager pump is gone");
    }

    /// Next command the manager issued, or panic after the shared wait.
    pub async fn next_command(&mut self) -> TransportCommand {
        tokio::time::timeout(super::WAIT, self.commands.recv())
            .await
            .expect("timed out waiting for transport command")
            .expect("manager dropped the transport handle")
    }
}

/// A [`Connector`] that records every dial and hands the test the far end
/// of each transport.
#[derive(Default)]
pub struct MockConnector {
    dials: Mutex<Vec<Option<MockDial>>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// How many times the manager has dialed so far.
    pub fn dial_count(&self) -> usize {
        self.dials.lock().len()
    }

    /// Take ownership of dial number `index` (0-based, in dial order).
    pub fn take_dial(&self, index: usize) -> MockDial {
        self.dials
            .lock()
            .get_mut(index)
            .and_then(Option::take)
            .expect("no such dial (or already taken)")
    }

    /// Wait until at least `count` dials have happened, then return the
    /// latest one.
    pub async fn wait_for_dial(&self, count: usize) -> MockDial {
        super::wait_until("transport dial", || self.dial_count() >= count).await;
        self.take_dial(count - 1)
    }
}

impl Connector for MockConnector {
    fn connect(&self, host: &str) -> TransportLink {
        let (link, command_rx, event_tx) = TransportLink::pair();
        self.dials.lock().push(Some(MockDial {
            host: host.to_string(),
            events: event_tx,
            commands: command_rx,
        }));
        link
    }
}
