use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{DecodeError, EncodeError, ReadContext};

/// OpenFlow protocol version spoken by this codec.
pub const OFP_VERSION: u8 = 0x01;

/// Byte-size of an `OfpHeader`.
pub const OFP_HEADER_LEN: usize = 8;

/// OpenFlow Header
///
/// The first fields of every OpenFlow message, no matter the protocol version.
/// This is parsed to determine version and length of the remaining message, so that
/// it can be properly handled. The top bit of the version byte is the experimental
/// flag; the remaining seven bits are the version proper.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OfpHeader {
    experimental: bool,
    version: u8,
    typ: u8,
    length: u16,
    xid: u32,
}

impl OfpHeader {
    /// Create an `OfpHeader` out of the arguments.
    pub fn new(experimental: bool, version: u8, typ: u8, length: u16, xid: u32) -> OfpHeader {
        OfpHeader {
            experimental: experimental,
            version: version & 0x7f,
            typ: typ,
            length: length,
            xid: xid,
        }
    }

    /// Return the byte-size of an `OfpHeader`.
    pub fn size() -> usize {
        OFP_HEADER_LEN
    }

    /// Fills a message buffer with the header fields of an `OfpHeader`.
    pub fn marshal(&self, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        let exp = if self.experimental { 0x80 } else { 0 };
        bytes.write_u8(exp | self.version)?;
        bytes.write_u8(self.typ)?;
        bytes.write_u16::<BigEndian>(self.length)?;
        bytes.write_u32::<BigEndian>(self.xid)?;
        Ok(())
    }

    /// Reads an `OfpHeader` from the front of `buf`.
    pub fn parse(buf: &[u8]) -> Result<OfpHeader, DecodeError> {
        let mut bytes = Cursor::new(buf);
        let version = bytes.read_u8().context("ofp_header.version")?;
        let typ = bytes.read_u8().context("ofp_header.type")?;
        let length = bytes.read_u16::<BigEndian>().context("ofp_header.length")?;
        let xid = bytes.read_u32::<BigEndian>().context("ofp_header.xid")?;
        if (length as usize) < OFP_HEADER_LEN {
            return Err(DecodeError::HeaderLength { length: length });
        }
        Ok(OfpHeader::new(version & 0x80 != 0, version, typ, length, xid))
    }

    /// Whether the experimental bit of the version byte is set.
    pub fn experimental(&self) -> bool {
        self.experimental
    }

    /// Return the `version` field of a header, without the experimental bit.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Return the raw OpenFlow message type integer of a header.
    pub fn type_code(&self) -> u8 {
        self.typ
    }

    /// Return the `length` field of a header. Includes the length of the header itself.
    pub fn length(&self) -> usize {
        self.length as usize
    }

    /// Return the length of the body following the header.
    pub fn body_length(&self) -> usize {
        self.length().saturating_sub(OFP_HEADER_LEN)
    }

    /// Return the `xid` field of a header, the transaction id associated with this packet.
    ///  Replies use the same id to facilitate pairing.
    pub fn xid(&self) -> u32 {
        self.xid
    }
}
