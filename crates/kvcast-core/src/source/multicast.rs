//! Live IPv4 multicast reception.

use std::fmt;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::{SystemTime, UNIX_EPOCH};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info};

use super::{Datagram, DatagramSource, MAX_DATAGRAM_LEN, SourceError};

/// Group membership parameters, validated on construction.
///
/// # Examples
/// ```
/// use std::net::Ipv4Addr;
///
/// use kvcast_core::MulticastConfig;
///
/// let config = MulticastConfig::new(Ipv4Addr::new(239, 0, 0, 1), 5000)?;
/// assert_eq!(config.interface, Ipv4Addr::UNSPECIFIED);
/// assert!(MulticastConfig::new(Ipv4Addr::new(10, 0, 0, 1), 5000).is_err());
/// # Ok::<(), kvcast_core::SourceError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MulticastConfig {
    pub group: Ipv4Addr,
    pub port: u16,
    /// Local interface used for the membership; `0.0.0.0` lets the OS pick.
    pub interface: Ipv4Addr,
}

impl MulticastConfig {
    pub fn new(group: Ipv4Addr, port: u16) -> Result<Self, SourceError> {
        if port == 0 {
            return Err(SourceError::InvalidPort { port });
        }
        if !group.is_multicast() {
            return Err(SourceError::InvalidGroup { group });
        }
        Ok(Self {
            group,
            port,
            interface: Ipv4Addr::UNSPECIFIED,
        })
    }

    pub fn with_interface(mut self, interface: Ipv4Addr) -> Self {
        self.interface = interface;
        self
    }
}

/// Socket setup or receive stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketStep {
    /// Socket creation and option setup.
    Socket,
    Bind,
    /// Group membership.
    Join,
    Recv,
}

impl fmt::Display for SocketStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SocketStep::Socket => "socket",
            SocketStep::Bind => "bind",
            SocketStep::Join => "join",
            SocketStep::Recv => "recv",
        })
    }
}

/// Blocking receiver bound to a multicast group.
pub struct MulticastSource {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl MulticastSource {
    /// Binds `0.0.0.0:port` with address reuse and joins the group.
    pub fn join(config: &MulticastConfig) -> Result<Self, SourceError> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|source| SourceError::Socket {
                step: SocketStep::Socket,
                source,
            })?;
        socket
            .set_reuse_address(true)
            .map_err(|source| SourceError::Socket {
                step: SocketStep::Socket,
                source,
            })?;
        #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
        {
            if let Err(err) = socket.set_reuse_port(true) {
                debug!(%err, "SO_REUSEPORT unavailable");
            }
        }

        let local = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port);
        socket
            .bind(&local.into())
            .map_err(|source| SourceError::Socket {
                step: SocketStep::Bind,
                source,
            })?;
        socket
            .join_multicast_v4(&config.group, &config.interface)
            .map_err(|source| SourceError::Socket {
                step: SocketStep::Join,
                source,
            })?;
        info!(group = %config.group, port = config.port, interface = %config.interface, "joined multicast group");

        Ok(Self::from_socket(socket.into()))
    }

    /// Wraps an already bound socket.
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self {
            socket,
            buf: vec![0u8; MAX_DATAGRAM_LEN],
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SourceError> {
        Ok(self.socket.local_addr()?)
    }
}

impl DatagramSource for MulticastSource {
    fn next_datagram(&mut self) -> Result<Option<Datagram>, SourceError> {
        loop {
            match self.socket.recv_from(&mut self.buf) {
                Ok((len, origin)) => {
                    return Ok(Some(Datagram::new(
                        &self.buf[..len],
                        Some(origin),
                        unix_now(),
                    )));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(SourceError::Socket {
                        step: SocketStep::Recv,
                        source,
                    });
                }
            }
        }
    }
}

fn unix_now() -> Option<f64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|elapsed| elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{MulticastConfig, MulticastSource, SocketStep};
    use crate::source::SourceError;

    #[test]
    fn config_rejects_port_zero() {
        let err = MulticastConfig::new(Ipv4Addr::new(239, 0, 0, 1), 0).unwrap_err();
        assert!(matches!(err, SourceError::InvalidPort { port: 0 }));
    }

    #[test]
    fn config_rejects_unicast_group() {
        let err = MulticastConfig::new(Ipv4Addr::new(192, 168, 1, 1), 5000).unwrap_err();
        assert!(matches!(err, SourceError::InvalidGroup { .. }));
        assert!(err.to_string().contains("192.168.1.1"));
    }

    #[test]
    fn config_accepts_group_range_bounds() {
        assert!(MulticastConfig::new(Ipv4Addr::new(224, 0, 0, 0), 1).is_ok());
        assert!(MulticastConfig::new(Ipv4Addr::new(239, 255, 255, 255), 65535).is_ok());
    }

    #[test]
    fn config_keeps_interface() {
        let config = MulticastConfig::new(Ipv4Addr::new(239, 1, 1, 1), 9000)
            .unwrap()
            .with_interface(Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(config.interface, Ipv4Addr::new(10, 0, 0, 5));
    }

    #[test]
    fn socket_steps_have_short_names() {
        let names = [
            SocketStep::Socket,
            SocketStep::Bind,
            SocketStep::Join,
            SocketStep::Recv,
        ]
        .map(|step| step.to_string());
        assert_eq!(names, ["socket", "bind", "join", "recv"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn join_on_foreign_interface_reports_join_step() {
        let port = std::net::UdpSocket::bind("0.0.0.0:0")
            .and_then(|socket| socket.local_addr())
            .unwrap()
            .port();
        let config = MulticastConfig::new(Ipv4Addr::new(239, 255, 0, 99), port)
            .unwrap()
            .with_interface(Ipv4Addr::new(192, 0, 2, 123));

        let err = match MulticastSource::join(&config) {
            Ok(_) => panic!("membership on an unassigned interface must fail"),
            Err(err) => err,
        };
        assert!(matches!(
            err,
            SourceError::Socket {
                step: SocketStep::Join,
                ..
            }
        ));
        assert!(err.to_string().starts_with("socket error (join)"));
    }
}
