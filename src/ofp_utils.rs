use std::io::{BufRead, Cursor, Read, Write};

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{DecodeError, EncodeError, ReadContext};

/// Number of unread bytes left in `bytes`.
pub fn remaining(bytes: &Cursor<&[u8]>) -> usize {
    bytes.get_ref().len().saturating_sub(bytes.position() as usize)
}

/// Skip `n` reserved bytes, failing if fewer are left.
pub fn skip_padding(bytes: &mut Cursor<&[u8]>, n: usize, field: &'static str) -> Result<(), DecodeError> {
    if remaining(bytes) < n {
        return Err(DecodeError::Truncated { field });
    }
    bytes.consume(n);
    Ok(())
}

/// Write `n` zero bytes.
pub fn write_padding_bytes(bytes: &mut Vec<u8>, n: usize) -> Result<(), EncodeError> {
    bytes.write_all(&vec![0; n])?;
    Ok(())
}

/// Write `s` as exactly `width` bytes: truncated if longer, NUL padded if shorter.
///
/// Truncation never splits a UTF-8 character, so the result always reads back.
pub fn write_fixed_size_string(bytes: &mut Vec<u8>, s: &str, width: usize) -> Result<(), EncodeError> {
    let mut n = s.len().min(width);
    while !s.is_char_boundary(n) {
        n -= 1;
    }
    bytes.write_all(&s.as_bytes()[..n])?;
    write_padding_bytes(bytes, width - n)
}

/// Read a `width`-byte NUL padded string, dropping the trailing NULs.
pub fn read_fixed_size_string(bytes: &mut Cursor<&[u8]>,
                              width: usize,
                              field: &'static str)
                              -> Result<String, DecodeError> {
    let mut arr = vec![0; width];
    bytes.read_exact(&mut arr).context(field)?;
    let end = arr.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    arr.truncate(end);
    String::from_utf8(arr).map_err(|_| DecodeError::NotUtf8 { field })
}

/// Read a 6-byte hardware address.
pub fn read_mac(bytes: &mut Cursor<&[u8]>, field: &'static str) -> Result<[u8; 6], DecodeError> {
    let mut arr = [0; 6];
    bytes.read_exact(&mut arr).context(field)?;
    Ok(arr)
}

pub fn bytes_of_mac(addr: u64) -> [u8; 6] {
    let mut arr = [0; 6];
    for (i, b) in arr.iter_mut().enumerate() {
        *b = (addr >> (8 * (5 - i))) as u8;
    }
    arr
}

pub fn mac_of_bytes(addr: [u8; 6]) -> u64 {
    addr.iter().fold(0, |acc, b| (acc << 8) | *b as u64)
}

/// Write the low 48 bits of `addr` as a big-endian hardware address.
pub fn write_mac(bytes: &mut Vec<u8>, addr: u64) -> Result<(), EncodeError> {
    bytes.write_u48::<BigEndian>(addr & 0xffff_ffff_ffff)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_string_is_padded() {
        let mut bytes = vec![];
        write_fixed_size_string(&mut bytes, "eth0", 8).unwrap();
        assert_eq!(bytes, b"eth0\0\0\0\0".to_vec());
    }

    #[test]
    fn fixed_string_is_truncated() {
        let mut bytes = vec![];
        write_fixed_size_string(&mut bytes, "a-very-long-name", 4).unwrap();
        assert_eq!(bytes, b"a-ve".to_vec());
    }

    #[test]
    fn truncation_keeps_whole_characters() {
        let mut bytes = vec![];
        write_fixed_size_string(&mut bytes, "ethernet-port-x\u{e9}1", 16).unwrap();
        assert_eq!(bytes, b"ethernet-port-x\0".to_vec());
        let mut cursor = Cursor::new(&bytes[..]);
        assert_eq!(read_fixed_size_string(&mut cursor, 16, "name").unwrap(),
                   "ethernet-port-x");
    }

    #[test]
    fn read_trims_trailing_nuls() {
        let raw = b"br\0x\0\0";
        let mut bytes = Cursor::new(&raw[..]);
        assert_eq!(read_fixed_size_string(&mut bytes, 6, "name").unwrap(), "br\0x");
        assert_eq!(remaining(&bytes), 0);
    }

    #[test]
    fn read_short_string_fails() {
        let raw = [0x41; 3];
        let mut bytes = Cursor::new(&raw[..]);
        assert_eq!(read_fixed_size_string(&mut bytes, 16, "name"),
                   Err(DecodeError::Truncated { field: "name" }));
    }

    #[test]
    fn padding_checks_bounds() {
        let raw = [0; 2];
        let mut bytes = Cursor::new(&raw[..]);
        assert!(skip_padding(&mut bytes, 2, "pad").is_ok());
        assert_eq!(skip_padding(&mut bytes, 1, "pad"),
                   Err(DecodeError::Truncated { field: "pad" }));
    }

    #[test]
    fn mac_conversions() {
        let mac = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];
        assert_eq!(mac_of_bytes(mac), 0x0011_2233_4455);
        assert_eq!(bytes_of_mac(0x0011_2233_4455), mac);
        let mut bytes = vec![];
        write_mac(&mut bytes, 0xffff_0011_2233_4455).unwrap();
        assert_eq!(bytes, mac.to_vec());
        assert_eq!(read_mac(&mut Cursor::new(&bytes[..]), "mac").unwrap(), mac);
    }
}
