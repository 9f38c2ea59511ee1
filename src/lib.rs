#![crate_name = "rust_ofp_codec"]
#![crate_type = "lib"]

//! Bit-accurate encoder and decoder for OpenFlow 1.0 messages.
//!
//! Every call takes the read-only `SymbolTable` that maps flag names to bit positions
//! and message kinds to wire type integers.

use log::warn;

pub mod bits;
pub mod error;
pub mod ofp_header;
pub mod ofp_message;
pub mod ofp_utils;
pub mod openflow0x01;
pub mod symbols;

pub use crate::error::{DecodeError, EncodeError};
pub use crate::ofp_header::{OfpHeader, OFP_HEADER_LEN, OFP_VERSION};
pub use crate::ofp_message::OfpMessage;
pub use crate::openflow0x01::message::{Body, Message};
pub use crate::symbols::{MsgKind, Namespace, SymbolTable};

/// Marshal `msg` into a buffer holding its header followed by its body.
pub fn encode(table: &SymbolTable, msg: &Message) -> Result<Vec<u8>, EncodeError> {
    msg.marshal(table)
}

/// Parse one message from the front of `buf`.
///
/// Bytes past the length declared by the header are ignored.
pub fn decode(table: &SymbolTable, buf: &[u8]) -> Result<Message, DecodeError> {
    let header = OfpHeader::parse(buf)?;
    let length = header.length();
    if buf.len() < length {
        return Err(DecodeError::BadLength {
            what: "message",
            declared: length,
            available: buf.len(),
        });
    }
    if buf.len() > length {
        warn!("ignoring {} bytes past the declared message length {}",
              buf.len() - length,
              length);
    }
    Message::parse(table, &header, &buf[OFP_HEADER_LEN..length])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_short_buffer() {
        let table = SymbolTable::default();
        let buf = [0x01, 0x02, 0x00, 0x0c, 0, 0, 0, 1, 0xaa];
        assert_eq!(decode(&table, &buf),
                   Err(DecodeError::BadLength {
                       what: "message",
                       declared: 12,
                       available: 9,
                   }));
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let table = SymbolTable::default();
        let buf = [0x01, 0x02, 0x00, 0x0a, 0, 0, 0, 1, 0xaa, 0xbb, 0xcc, 0xdd];
        assert_eq!(decode(&table, &buf).unwrap(),
                   Message::new(1, Body::EchoRequest(vec![0xaa, 0xbb])));
    }

    #[test]
    fn decode_truncated_header() {
        let table = SymbolTable::default();
        assert_eq!(decode(&table, &[0x01, 0x00, 0x00]),
                   Err(DecodeError::Truncated { field: "ofp_header.length" }));
    }
}
