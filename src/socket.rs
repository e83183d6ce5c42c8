//! A blocking, BSD-shaped socket facade.
//!
//! Sockets follow the classic create/bind/connect/listen lifecycle and block
//! the calling thread, while the I/O underneath runs on the crate's shared
//! runtime. Nonblocking mode switches the data path (`send`/`recv`) to
//! readiness-checked calls that fail with [`std::io::ErrorKind::WouldBlock`];
//! `connect` and `accept` always block.

use std::fmt;
use std::io;
use std::mem;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr as StdSocketAddr};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream, UdpSocket};

use crate::addr::{Family, SockAddr, SockType};
use crate::{error, runtime, Error, Result};

/// A blocking stream or datagram socket.
pub struct Socket {
    conn: Conn,
    family: Family,
    socktype: SockType,
    blocking: bool,
    reuseaddr: bool,
}

enum Conn {
    /// Created but not yet bound or connected.
    New,
    /// A bound stream socket awaiting `listen` or `connect`.
    Bound(TcpSocket),
    Stream(TcpStream),
    Listener(TcpListener),
    Dgram(UdpSocket),
    Closed,
}

impl Conn {
    fn state(&self) -> &'static str {
        match self {
            Conn::New => "new",
            Conn::Bound(_) => "bound",
            Conn::Stream(_) => "connected",
            Conn::Listener(_) => "listening",
            Conn::Dgram(_) => "datagram",
            Conn::Closed => "closed",
        }
    }
}

fn invalid_state(msg: &'static str) -> Error {
    error::socket(io::Error::new(io::ErrorKind::InvalidInput, msg))
}

impl Socket {
    /// Creates an unbound socket.
    ///
    /// The protocol follows the socket type: TCP for streams, UDP for
    /// datagrams. The family must be explicit.
    pub fn new(family: Family, socktype: SockType) -> Result<Socket> {
        if family == Family::Unspec {
            return Err(error::builder("socket family must be V4 or V6"));
        }
        Ok(Socket {
            conn: Conn::New,
            family,
            socktype,
            blocking: true,
            reuseaddr: false,
        })
    }

    /// Binds to a local address.
    pub fn bind(&mut self, addr: &SockAddr) -> Result<()> {
        self.check_open()?;
        if !matches!(self.conn, Conn::New) {
            return Err(invalid_state("socket already bound or connected"));
        }
        let target = addr.to_std()?;
        self.conn = match self.socktype {
            SockType::Stream => {
                let sock = self.tcp_socket()?;
                sock.bind(target).map_err(error::socket)?;
                Conn::Bound(sock)
            }
            SockType::Dgram => {
                let sock = runtime::global()
                    .block_on(UdpSocket::bind(target))
                    .map_err(error::socket)?;
                Conn::Dgram(sock)
            }
        };
        Ok(())
    }

    /// Connects to a remote address, blocking until established.
    ///
    /// Datagram sockets are bound to an unspecified local address first if
    /// needed; the remote address then becomes the only send/recv peer.
    pub fn connect(&mut self, addr: &SockAddr) -> Result<()> {
        self.check_open()?;
        let target = addr.to_std()?;
        match self.socktype {
            SockType::Stream => {
                let sock = match mem::replace(&mut self.conn, Conn::New) {
                    Conn::New => self.tcp_socket()?,
                    Conn::Bound(sock) => sock,
                    other => {
                        self.conn = other;
                        return Err(invalid_state("stream socket already connected or listening"));
                    }
                };
                let stream = runtime::global()
                    .block_on(sock.connect(target))
                    .map_err(error::socket)?;
                self.conn = Conn::Stream(stream);
                Ok(())
            }
            SockType::Dgram => {
                if matches!(self.conn, Conn::New) {
                    let local = self.unspecified_local();
                    let sock = runtime::global()
                        .block_on(UdpSocket::bind(local))
                        .map_err(error::socket)?;
                    self.conn = Conn::Dgram(sock);
                }
                match &self.conn {
                    Conn::Dgram(sock) => runtime::global()
                        .block_on(sock.connect(target))
                        .map_err(error::socket),
                    _ => Err(invalid_state("datagram socket cannot connect in this state")),
                }
            }
        }
    }

    /// Starts listening on a bound stream socket.
    pub fn listen(&mut self, backlog: u32) -> Result<()> {
        self.check_open()?;
        match mem::replace(&mut self.conn, Conn::New) {
            Conn::Bound(sock) => {
                // Listener registration needs the runtime's reactor.
                let _guard = runtime::global().enter();
                let listener = sock.listen(backlog).map_err(error::socket)?;
                self.conn = Conn::Listener(listener);
                Ok(())
            }
            other => {
                self.conn = other;
                Err(invalid_state("listen requires a bound stream socket"))
            }
        }
    }

    /// Accepts one connection, blocking until a peer arrives.
    ///
    /// Returns the connected socket and the peer's address.
    pub fn accept(&mut self) -> Result<(Socket, SockAddr)> {
        self.check_open()?;
        match &mut self.conn {
            Conn::Listener(listener) => {
                let (stream, peer) = runtime::global()
                    .block_on(listener.accept())
                    .map_err(error::socket)?;
                let socket = Socket {
                    conn: Conn::Stream(stream),
                    family: self.family,
                    socktype: SockType::Stream,
                    blocking: true,
                    reuseaddr: false,
                };
                Ok((socket, SockAddr::from(peer)))
            }
            _ => Err(invalid_state("accept requires a listening socket")),
        }
    }

    /// Sends bytes, returning how many were written.
    pub fn send(&mut self, buf: &[u8]) -> Result<usize> {
        let blocking = self.blocking;
        match &mut self.conn {
            Conn::Stream(stream) => {
                if blocking {
                    runtime::global()
                        .block_on(stream.write(buf))
                        .map_err(error::socket)
                } else {
                    stream.try_write(buf).map_err(error::socket)
                }
            }
            Conn::Dgram(sock) => {
                if blocking {
                    runtime::global()
                        .block_on(sock.send(buf))
                        .map_err(error::socket)
                } else {
                    sock.try_send(buf).map_err(error::socket)
                }
            }
            Conn::Closed => Err(error::closed()),
            _ => Err(invalid_state("socket not connected")),
        }
    }

    /// Receives up to `max_len` bytes.
    ///
    /// An empty buffer means the peer closed the stream in an orderly way.
    pub fn recv(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let blocking = self.blocking;
        let mut buf = vec![0u8; max_len];
        let n = match &mut self.conn {
            Conn::Stream(stream) => {
                if blocking {
                    runtime::global().block_on(stream.read(&mut buf))
                } else {
                    stream.try_read(&mut buf)
                }
            }
            Conn::Dgram(sock) => {
                if blocking {
                    runtime::global().block_on(sock.recv(&mut buf))
                } else {
                    sock.try_recv(&mut buf)
                }
            }
            Conn::Closed => return Err(error::closed()),
            _ => return Err(invalid_state("socket not connected")),
        }
        .map_err(error::socket)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Switches the data path between blocking and nonblocking.
    pub fn set_blocking(&mut self, blocking: bool) -> Result<()> {
        self.check_open()?;
        self.blocking = blocking;
        Ok(())
    }

    /// Allows rebinding a recently used local address.
    ///
    /// Takes effect when a stream socket is bound.
    pub fn set_reuseaddr(&mut self, reuseaddr: bool) -> Result<()> {
        self.check_open()?;
        self.reuseaddr = reuseaddr;
        Ok(())
    }

    /// The locally bound address.
    pub fn local_addr(&self) -> Result<SockAddr> {
        let addr = match &self.conn {
            Conn::Bound(sock) => sock.local_addr(),
            Conn::Stream(stream) => stream.local_addr(),
            Conn::Listener(listener) => listener.local_addr(),
            Conn::Dgram(sock) => sock.local_addr(),
            Conn::New => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "socket not bound",
            )),
            Conn::Closed => return Err(error::closed()),
        }
        .map_err(error::socket)?;
        Ok(SockAddr::from(addr))
    }

    /// Closes the socket. Further operations fail with the closed-socket
    /// error; closing again is a no-op.
    pub fn close(&mut self) {
        self.conn = Conn::Closed;
    }

    fn check_open(&self) -> Result<()> {
        match self.conn {
            Conn::Closed => Err(error::closed()),
            _ => Ok(()),
        }
    }

    fn tcp_socket(&self) -> Result<TcpSocket> {
        let sock = match self.family {
            Family::V4 => TcpSocket::new_v4(),
            Family::V6 => TcpSocket::new_v6(),
            Family::Unspec => {
                return Err(error::builder("socket family must be V4 or V6"));
            }
        }
        .map_err(error::socket)?;
        if self.reuseaddr {
            sock.set_reuseaddr(true).map_err(error::socket)?;
        }
        Ok(sock)
    }

    fn unspecified_local(&self) -> StdSocketAddr {
        match self.family {
            Family::V6 => (Ipv6Addr::UNSPECIFIED, 0).into(),
            _ => (Ipv4Addr::UNSPECIFIED, 0).into(),
        }
    }
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Socket")
            .field("state", &self.conn.state())
            .field("family", &self.family)
            .field("socktype", &self.socktype)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::{Read, Write};
    use std::net::TcpListener as StdTcpListener;
    use std::thread;

    fn loopback(port: u16) -> SockAddr {
        SockAddr::v4("127.0.0.1", port)
    }

    #[test]
    fn stream_round_trip() {
        let server = StdTcpListener::bind("127.0.0.1:0").unwrap();
        let port = server.local_addr().unwrap().port();
        let echo = thread::spawn(move || {
            let (mut conn, _) = server.accept().unwrap();
            let mut buf = [0u8; 16];
            let n = conn.read(&mut buf).unwrap();
            conn.write_all(&buf[..n]).unwrap();
        });

        let mut sock = Socket::new(Family::V4, SockType::Stream).unwrap();
        sock.connect(&loopback(port)).unwrap();
        assert_eq!(sock.send(b"ping").unwrap(), 4);
        assert_eq!(sock.recv(16).unwrap(), b"ping");

        // After the peer hangs up, an orderly close reads as empty.
        echo.join().unwrap();
        assert_eq!(sock.recv(16).unwrap(), b"");
    }

    #[test]
    fn listener_accepts_and_reports_peer() {
        let mut listener = Socket::new(Family::V4, SockType::Stream).unwrap();
        listener.set_reuseaddr(true).unwrap();
        listener.bind(&loopback(0)).unwrap();
        listener.listen(1).unwrap();
        let port = listener.local_addr().unwrap().port();

        let client = thread::spawn(move || {
            let mut conn = std::net::TcpStream::connect(("127.0.0.1", port)).unwrap();
            conn.write_all(b"hello").unwrap();
        });

        let (mut accepted, peer) = listener.accept().unwrap();
        assert_eq!(peer.family(), Family::V4);
        assert_eq!(peer.addr(), "127.0.0.1");
        assert_eq!(accepted.recv(16).unwrap(), b"hello");
        client.join().unwrap();
    }

    #[test]
    fn datagram_round_trip() {
        let mut a = Socket::new(Family::V4, SockType::Dgram).unwrap();
        let mut b = Socket::new(Family::V4, SockType::Dgram).unwrap();
        a.bind(&loopback(0)).unwrap();
        b.bind(&loopback(0)).unwrap();
        let addr_a = a.local_addr().unwrap();
        let addr_b = b.local_addr().unwrap();

        a.connect(&addr_b).unwrap();
        b.connect(&addr_a).unwrap();

        assert_eq!(a.send(b"datagram").unwrap(), 8);
        assert_eq!(b.recv(64).unwrap(), b"datagram");
    }

    #[test]
    fn closed_socket_rejects_operations() {
        let mut sock = Socket::new(Family::V4, SockType::Stream).unwrap();
        sock.close();
        sock.close();

        let err = sock.send(b"late").unwrap_err();
        assert!(err.is_closed());
        let err = sock.bind(&loopback(0)).unwrap_err();
        assert!(err.is_closed());
    }

    #[test]
    fn nonblocking_recv_reports_would_block() {
        let server = StdTcpListener::bind("127.0.0.1:0").unwrap();
        let port = server.local_addr().unwrap().port();

        let mut sock = Socket::new(Family::V4, SockType::Stream).unwrap();
        sock.connect(&loopback(port)).unwrap();
        let (_conn, _) = server.accept().unwrap();

        sock.set_blocking(false).unwrap();
        let err = sock.recv(16).unwrap_err();
        let kind = err
            .source()
            .and_then(|e| e.downcast_ref::<io::Error>())
            .map(io::Error::kind);
        assert_eq!(kind, Some(io::ErrorKind::WouldBlock));
    }

    #[test]
    fn listen_requires_bind_first() {
        let mut sock = Socket::new(Family::V4, SockType::Stream).unwrap();
        let err = sock.listen(1).unwrap_err();
        assert!(err.is_socket());
    }

    #[test]
    fn unspecified_family_is_rejected() {
        let err = Socket::new(Family::Unspec, SockType::Stream).unwrap_err();
        assert!(err.is_builder());
    }
}
