//! TCP listener for the line server.
//!
//! The transport binds the configured endpoint and either accepts a single
//! connection on the calling thread or runs an accept loop in a background
//! thread, handing each connection to a [`ConnectionHandler`].

mod errors;
mod handler;
mod listener;

pub use self::errors::ListenerError;
pub use self::handler::{ConnectionHandler, DispenserHandler};
pub use self::listener::{ListenerHandle, SocketListener};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
