
use crate::transmitter::{DataSink, FeedbackSource};

use std::io;
use std::net;

/// Sends data packets over a UDP socket connected to a single destination.
pub struct UdpDataSink {
    socket: net::UdpSocket,
}

impl UdpDataSink {
    /// Opens a non-blocking UDP socket on an ephemeral port, and connects it to `dst_addr`.
    ///
    /// The local address is unspecified, of the same family as `dst_addr`.
    ///
    /// # Error Handling
    ///
    /// Forwards any errors resulting from socket initialization.
    pub fn connect(dst_addr: net::SocketAddr) -> Result<Self, io::Error> {
        let bind_addr = match dst_addr {
            net::SocketAddr::V4(_) => net::SocketAddr::new(net::IpAddr::V4(net::Ipv4Addr::UNSPECIFIED), 0),
            net::SocketAddr::V6(_) => net::SocketAddr::new(net::IpAddr::V6(net::Ipv6Addr::UNSPECIFIED), 0),
        };

        let socket = net::UdpSocket::bind(bind_addr)?;

        socket.set_nonblocking(true)?;
        socket.connect(dst_addr)?;

        Ok(Self { socket })
    }

    /// Returns the local address of the internal UDP socket.
    pub fn local_addr(&self) -> Result<net::SocketAddr, io::Error> {
        self.socket.local_addr()
    }

    /// Returns the address data packets are sent to.
    pub fn peer_addr(&self) -> Result<net::SocketAddr, io::Error> {
        self.socket.peer_addr()
    }
}

impl DataSink for UdpDataSink {
    fn send(&mut self, packet: &[u8]) {
        // Losses are repaired by the fountain, whatever their cause
        if let Err(err) = self.socket.send(packet) {
            log::trace!("data send failed: {}", err);
        }
    }
}

/// Receives rank reports on a non-blocking UDP socket.
pub struct UdpFeedbackSource {
    socket: net::UdpSocket,
}

impl UdpFeedbackSource {
    /// Binds a non-blocking UDP socket to `addr`.
    ///
    /// # Error Handling
    ///
    /// Forwards any errors resulting from socket initialization.
    pub fn bind<A: net::ToSocketAddrs>(addr: A) -> Result<Self, io::Error> {
        let socket = net::UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;

        Ok(Self { socket })
    }

    /// Returns the local address of the internal UDP socket.
    pub fn local_addr(&self) -> Result<net::SocketAddr, io::Error> {
        self.socket.local_addr()
    }
}

impl FeedbackSource for UdpFeedbackSource {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (size, _) = self.socket.recv_from(buf)?;
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time;

    #[test]
    fn feedback_would_block_when_empty() {
        let mut source = UdpFeedbackSource::bind((net::Ipv4Addr::LOCALHOST, 0)).unwrap();
        let mut buf = [0u8; 16];

        match source.recv(&mut buf) {
            Err(err) => assert_eq!(err.kind(), io::ErrorKind::WouldBlock),
            Ok(size) => panic!("received {} bytes from nowhere", size),
        }
    }

    #[test]
    fn sink_reaches_source() {
        let mut source = UdpFeedbackSource::bind((net::Ipv4Addr::LOCALHOST, 0)).unwrap();
        let mut sink = UdpDataSink::connect(source.local_addr().unwrap()).unwrap();

        assert_eq!(sink.peer_addr().unwrap(), source.local_addr().unwrap());

        sink.send(&[1, 2, 3, 4]);

        let mut buf = [0u8; 16];
        let deadline = time::Instant::now() + time::Duration::from_secs(5);

        loop {
            match source.recv(&mut buf) {
                Ok(size) => {
                    assert_eq!(&buf[..size], &[1, 2, 3, 4]);
                    break;
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    assert!(time::Instant::now() < deadline, "datagram never arrived");
                    std::thread::sleep(time::Duration::from_millis(1));
                }
                Err(err) => panic!("{}", err),
            }
        }
    }
}
