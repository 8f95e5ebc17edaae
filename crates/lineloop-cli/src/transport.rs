//! Socket transport helpers for the verifying client.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use lineloop_config::Endpoint;

use crate::verifier::VerifyError;

pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves `endpoint` and connects to the first address that accepts.
pub(crate) fn connect(endpoint: &Endpoint) -> Result<TcpStream, VerifyError> {
    let addresses =
        resolve_tcp_addresses(endpoint.host(), endpoint.port()).map_err(|source| {
            VerifyError::Resolve {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

    let mut last_error = None;
    for address in addresses {
        match TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT) {
            Ok(stream) => return Ok(stream),
            Err(error) => last_error = Some(error),
        }
    }
    Err(VerifyError::Connect {
        endpoint: endpoint.to_string(),
        source: last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses")
        }),
    })
}

fn resolve_tcp_addresses(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    let addresses: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    if addresses.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "no resolved addresses",
        ));
    }
    Ok(addresses)
}
