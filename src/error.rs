//! Library error types.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::kind::Kind;

/// A bsv-frame Result, normally returning a bsv-frame [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A bsv-frame error. Encompasses any issue that can happen while encoding or
/// decoding a block stream.
#[derive(Clone, Debug)]
pub enum Error {
    /// The underlying byte source or sink failed.
    Io(Arc<io::Error>),
    /// A tag byte matched no block kind. Unreachable with the current kind
    /// table, which covers every byte value.
    UnexpectedByte(u8),
    /// A ContainerEnd block appeared without a matching open unbounded
    /// container.
    UnexpectedEnd {
        /// Kind of the frame on top of the stack, if any.
        top: Option<Kind>,
    },
    /// A read crossed the end of an enclosing bounded container.
    BoundedOverrun {
        /// Stack depth of the violated frame.
        depth: usize,
        /// Total stack depth at the time of the violation.
        of: usize,
        /// Declared payload size of the violated frame.
        size: u64,
        /// Payload bytes the frame had left.
        remaining: u64,
        /// Bytes the read tried to consume.
        consuming: u64,
    },
    /// A bounded container was closed with payload bytes still unread.
    BoundedUnderfull {
        /// Declared payload size of the frame.
        size: u64,
        /// Payload bytes never consumed.
        remaining: u64,
    },
    /// An operation was requested on a block kind that does not support it.
    InvalidOperation {
        /// The operation that was attempted.
        op: &'static str,
        /// The current block kind, if a field was loaded.
        kind: Option<Kind>,
    },
    /// Zero-length input where the wire format requires at least one byte.
    InvalidSize,
    /// A second field was written into a symmetric container.
    SymmetricAlreadyWritten,
    /// A symmetric closure finished without writing its one field.
    SymmetricEmpty,
    /// The stream requested a size this implementation does not support.
    Unimplemented(&'static str),
}

impl Error {
    pub(crate) fn invalid_op(op: &'static str, kind: Option<Kind>) -> Self {
        Error::InvalidOperation { op, kind }
    }

    pub(crate) fn eof(what: &'static str) -> Self {
        Error::Io(Arc::new(io::Error::new(io::ErrorKind::UnexpectedEof, what)))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => write!(f, "I/O failure: {}", err),
            Error::UnexpectedByte(b) => write!(f, "unexpected byte: {:#010b}", b),
            Error::UnexpectedEnd { top: Some(kind) } => write!(
                f,
                "unexpected container end (top of stack is {})",
                kind.abbr()
            ),
            Error::UnexpectedEnd { top: None } => {
                write!(f, "unexpected container end (not in a container)")
            }
            Error::BoundedOverrun {
                depth,
                of,
                size,
                remaining,
                consuming,
            } => write!(
                f,
                "exceeded bounded container: depth={}/{} size={} remaining={} consuming={}",
                depth, of, size, remaining, consuming
            ),
            Error::BoundedUnderfull { size, remaining } => write!(
                f,
                "data remaining in bounded container: size={} remaining={}",
                size, remaining
            ),
            Error::InvalidOperation {
                op,
                kind: Some(kind),
            } => write!(f, "invalid operation: {} on {}", op, kind.abbr()),
            Error::InvalidOperation { op, kind: None } => {
                write!(f, "invalid operation: {} before any field was read", op)
            }
            Error::InvalidSize => write!(f, "invalid size: input must not be empty"),
            Error::SymmetricAlreadyWritten => write!(f, "symmetric field already written"),
            Error::SymmetricEmpty => write!(f, "symmetric field empty"),
            Error::Unimplemented(what) => write!(f, "unimplemented: {}", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}
