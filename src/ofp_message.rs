use crate::error::{DecodeError, EncodeError};
use crate::ofp_header::OfpHeader;
use crate::symbols::SymbolTable;

/// OpenFlow Message
///
/// Version-agnostic API for handling OpenFlow messages at the byte-buffer level.
pub trait OfpMessage: Sized {
    /// Return the byte-size of an `OfpMessage`, header included.
    fn size_of(&self) -> usize;
    /// Create the `OfpHeader` that precedes the message on the wire.
    fn header_of(&self, table: &SymbolTable) -> Result<OfpHeader, EncodeError>;
    /// Return a marshaled buffer containing an OpenFlow header and the message.
    fn marshal(&self, table: &SymbolTable) -> Result<Vec<u8>, EncodeError>;
    /// Parse a message from the given OpenFlow header `header` and body buffer `buf`.
    fn parse(table: &SymbolTable, header: &OfpHeader, buf: &[u8]) -> Result<Self, DecodeError>;
}
