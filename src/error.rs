use std::io;

use crate::symbols::{MsgKind, Namespace};

/// Failure to turn bytes into a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("not enough bytes to read {field}")]
    Truncated { field: &'static str },
    #[error("{what} declares {declared} bytes but {available} are available")]
    BadLength {
        what: &'static str,
        declared: usize,
        available: usize,
    },
    #[error("header declares length {length}, shorter than the header itself")]
    HeaderLength { length: u16 },
    #[error("{field} is not valid UTF-8")]
    NotUtf8 { field: &'static str },
    #[error("unexpected value {value:#x} for {field}")]
    UnexpectedValue { field: &'static str, value: u64 },
}

/// Failure to turn a message into bytes.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("flag {flag:?} has no bit in namespace {namespace}")]
    UnknownFlag { namespace: Namespace, flag: String },
    #[error("flag {flag:?} of namespace {namespace} maps to bit {bit}, outside a {width}-byte field")]
    FlagOutOfRange {
        namespace: Namespace,
        flag: String,
        bit: u8,
        width: usize,
    },
    #[error("message kind {0:?} has no wire type")]
    UnmappedMessage(MsgKind),
    #[error("{what} of {length} bytes does not fit its length field")]
    TooLong { what: &'static str, length: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Attach the name of the field being read to a byteorder read failure.
pub(crate) trait ReadContext<T> {
    fn context(self, field: &'static str) -> Result<T, DecodeError>;
}

impl<T> ReadContext<T> for io::Result<T> {
    fn context(self, field: &'static str) -> Result<T, DecodeError> {
        self.map_err(|_| DecodeError::Truncated { field })
    }
}
