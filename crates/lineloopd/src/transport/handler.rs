//! Connection handling for the background accept loop.

use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;

use crate::dispenser::{Dispenser, MismatchPolicy, SharedCursor};
use crate::reporter::LifecycleReporter;

/// Handles accepted socket connections.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: TcpStream, peer: SocketAddr);
}

/// Serves each connection with a [`Dispenser`] drawing from one shared cursor.
pub struct DispenserHandler {
    cursor: SharedCursor,
    policy: MismatchPolicy,
    reporter: Arc<dyn LifecycleReporter>,
}

impl DispenserHandler {
    /// Builds a handler sharing `cursor` across every connection.
    #[must_use]
    pub fn new(
        cursor: SharedCursor,
        policy: MismatchPolicy,
        reporter: Arc<dyn LifecycleReporter>,
    ) -> Self {
        Self {
            cursor,
            policy,
            reporter,
        }
    }
}

impl ConnectionHandler for DispenserHandler {
    fn handle(&self, stream: TcpStream, peer: SocketAddr) {
        self.reporter.connection_accepted(peer);
        let mut dispenser = Dispenser::new(self.cursor.clone(), self.policy);
        match dispenser.serve(&stream) {
            Ok(outcome) => self.reporter.connection_closed(peer, &outcome),
            Err(error) => self.reporter.connection_failed(peer, &error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    use lineloop_core::{LineCursor, MemoryLineSource};

    use super::*;
    use crate::reporter::StructuredReporter;

    #[test]
    fn dispenser_handler_answers_triggers() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        let cursor = LineCursor::from_source(MemoryLineSource::new("memory", ["apple"]))
            .expect("open cursor");
        let handler = DispenserHandler::new(
            SharedCursor::new(cursor),
            MismatchPolicy::Ignore,
            Arc::new(StructuredReporter::new()),
        );
        let server = thread::spawn(move || {
            let (stream, peer) = listener.accept().expect("accept connection");
            handler.handle(stream, peer);
        });

        let mut client = TcpStream::connect(addr).expect("connect client");
        client.write_all(b"LINE\n").expect("write trigger");
        let mut response = String::new();
        let mut reader = BufReader::new(&client);
        reader.read_line(&mut response).expect("read response");
        assert_eq!(response, "APPLE\n");

        drop(reader);
        drop(client);
        server.join().expect("join server");
    }
}
