use std::error::Error as StdError;
use std::fmt;
use std::io;

/// A `Result` alias where the `Err` case is `netbind::Error`.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// The errors that may occur when resolving names or operating sockets.
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

#[derive(Debug)]
pub(crate) enum Kind {
    Builder,
    /// The resolver reported a terminal error and no records were collected.
    ///
    /// The code is the native resolver's status, passed through opaquely.
    Resolve { code: i32 },
    Socket,
    Closed,
    InvalidAddr,
}

impl Error {
    pub(crate) fn new(kind: Kind, source: Option<BoxError>) -> Error {
        Error {
            inner: Box::new(Inner { kind, source }),
        }
    }

    /// Returns true if the error came from constructing a resolver or socket.
    pub fn is_builder(&self) -> bool {
        matches!(self.inner.kind, Kind::Builder)
    }

    /// Returns true if the error is a failed name resolution.
    pub fn is_resolve(&self) -> bool {
        matches!(self.inner.kind, Kind::Resolve { .. })
    }

    /// Returns true if the error came from a socket operation.
    pub fn is_socket(&self) -> bool {
        matches!(self.inner.kind, Kind::Socket)
    }

    /// Returns true if the error is an operation on a closed socket.
    pub fn is_closed(&self) -> bool {
        matches!(self.inner.kind, Kind::Closed)
    }

    /// The native resolver status code, if this is a resolution error.
    pub fn resolve_code(&self) -> Option<i32> {
        match self.inner.kind {
            Kind::Resolve { code } => Some(code),
            _ => None,
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut builder = f.debug_struct("netbind::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner.kind {
            Kind::Builder => f.write_str("builder error")?,
            Kind::Resolve { code } => write!(f, "name resolution failed (status {code})")?,
            Kind::Socket => f.write_str("socket error")?,
            Kind::Closed => f.write_str("operation on closed socket")?,
            Kind::InvalidAddr => f.write_str("invalid address")?,
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

// constructors

pub(crate) fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder, Some(e.into()))
}

pub(crate) fn resolve(code: i32) -> Error {
    Error::new(Kind::Resolve { code }, None)
}

pub(crate) fn socket(e: io::Error) -> Error {
    Error::new(Kind::Socket, Some(Box::new(e)))
}

pub(crate) fn closed() -> Error {
    Error::new(Kind::Closed, None)
}

pub(crate) fn invalid_addr<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidAddr, Some(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn test_send_sync() {
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_resolve_code() {
        let err = resolve(-2);
        assert!(err.is_resolve());
        assert_eq!(err.resolve_code(), Some(-2));
        assert_eq!(err.to_string(), "name resolution failed (status -2)");
    }

    #[test]
    fn test_socket_source() {
        let io = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err = socket(io);
        assert!(err.is_socket());
        let source = err
            .source()
            .and_then(|e| e.downcast_ref::<io::Error>())
            .expect("io source");
        assert_eq!(source.kind(), io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn test_closed_has_no_code() {
        let err = closed();
        assert!(err.is_closed());
        assert_eq!(err.resolve_code(), None);
    }
}
