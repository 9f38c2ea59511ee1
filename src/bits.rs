use std::collections::BTreeSet;

use log::trace;

use crate::error::EncodeError;
use crate::symbols::{Namespace, SymbolTable};

/// An unordered, duplicate-free set of flag names.
pub type FlagSet = BTreeSet<&'static str>;

/// Set bit `bit` of `x` on if `toggle` is true, otherwise off.
pub fn bit(bit: u64, x: u64, toggle: bool) -> u64 {
    if toggle {
        x | (1 << bit)
    } else {
        x & !(1 << bit)
    }
}

/// Test whether bit `bit` of `x` is set.
pub fn test_bit(bit: u64, x: u64) -> bool {
    (x >> bit) & 1 == 1
}

/// Pack `flags` into a big-endian bit field `width` bytes wide.
///
/// Every flag must have a bit in namespace `ns`, and that bit must fit in the field.
pub fn encode_flags<I, S>(table: &SymbolTable,
                          ns: Namespace,
                          flags: I,
                          width: usize)
                          -> Result<Vec<u8>, EncodeError>
    where I: IntoIterator<Item = S>,
          S: AsRef<str>
{
    let mut field = vec![0; width];
    for flag in flags {
        let flag = flag.as_ref();
        let b = table.bit_of(ns, flag).ok_or_else(|| {
                EncodeError::UnknownFlag {
                    namespace: ns,
                    flag: flag.to_string(),
                }
            })?;
        let byte = b as usize / 8;
        if byte >= width {
            return Err(EncodeError::FlagOutOfRange {
                namespace: ns,
                flag: flag.to_string(),
                bit: b,
                width: width,
            });
        }
        field[width - 1 - byte] |= 1 << (b % 8);
    }
    Ok(field)
}

/// Unpack a big-endian bit field into the flags of namespace `ns`.
///
/// Set bits without a name in `ns` are dropped.
pub fn decode_flags(table: &SymbolTable, ns: Namespace, bytes: &[u8]) -> FlagSet {
    let mut flags = FlagSet::new();
    let width = bytes.len();
    for (i, byte) in bytes.iter().enumerate() {
        for b in (0..8).rev() {
            if !test_bit(b, *byte as u64) {
                continue;
            }
            let index = (width - 1 - i) * 8 + b as usize;
            let flag = if index <= u8::MAX as usize {
                table.flag_of(ns, index as u8)
            } else {
                None
            };
            match flag {
                Some(flag) => {
                    flags.insert(flag);
                }
                None => trace!("dropping unknown bit {} of {}", index, ns),
            }
        }
    }
    flags
}

/// `encode_flags` over a 32-bit field.
pub fn encode_flags_u32<I, S>(table: &SymbolTable, ns: Namespace, flags: I) -> Result<u32, EncodeError>
    where I: IntoIterator<Item = S>,
          S: AsRef<str>
{
    let field = encode_flags(table, ns, flags, 4)?;
    Ok(u32::from_be_bytes([field[0], field[1], field[2], field[3]]))
}

/// `decode_flags` over a 32-bit field.
pub fn decode_flags_u32(table: &SymbolTable, ns: Namespace, word: u32) -> FlagSet {
    decode_flags(table, ns, &word.to_be_bytes())
}

/// Address mask with the low `n` bits wildcarded.
///
/// `n` counts wildcarded bits the way the `ofp_match` wildcards word does: 0 is an
/// exact match (`0xffffffff`), 32 or more wildcards the whole address.
pub fn mask_of(n: u32) -> u32 {
    if n >= 32 {
        0
    } else {
        u32::MAX << n
    }
}

/// Inverse of `mask_of`: the number of trailing zero bits of `mask`.
pub fn prefix_len_of(mask: u32) -> u32 {
    mask.trailing_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(flags: &[&'static str]) -> FlagSet {
        flags.iter().cloned().collect()
    }

    #[test]
    fn bit_toggles() {
        assert_eq!(bit(3, 0, true), 0b1000);
        assert_eq!(bit(3, 0b1010, false), 0b0010);
        assert!(test_bit(1, 0b10));
        assert!(!test_bit(0, 0b10));
    }

    #[test]
    fn encode_places_bits_big_endian() {
        let table = SymbolTable::default();
        let field = encode_flags(&table, Namespace::FlowWildcard, &["in_port", "ip_dscp"], 4)
            .unwrap();
        assert_eq!(field, vec![0x00, 0x20, 0x00, 0x01]);
    }

    #[test]
    fn encode_empty_is_zero() {
        let table = SymbolTable::default();
        let none: [&str; 0] = [];
        assert_eq!(encode_flags(&table, Namespace::PortConfig, &none, 2).unwrap(),
                   vec![0, 0]);
    }

    #[test]
    fn encode_rejects_unknown_flag() {
        let table = SymbolTable::default();
        match encode_flags(&table, Namespace::PortConfig, &["jumbo"], 4) {
            Err(EncodeError::UnknownFlag { namespace, flag }) => {
                assert_eq!(namespace, Namespace::PortConfig);
                assert_eq!(flag, "jumbo");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn encode_rejects_narrow_field() {
        let table = SymbolTable::default();
        assert!(matches!(encode_flags(&table, Namespace::FlowWildcard, &["vlan_pcp"], 2),
                         Err(EncodeError::FlagOutOfRange { bit: 20, width: 2, .. })));
    }

    #[test]
    fn decode_ignores_unknown_bits() {
        let table = SymbolTable::default();
        let flags = decode_flags_u32(&table, Namespace::Capabilities, 0x8000_0010 | 0b1001);
        assert_eq!(flags, set(&["flow_stats", "stp"]));
    }

    #[test]
    fn flags_round_trip() {
        let table = SymbolTable::default();
        let subsets: Vec<FlagSet> = vec![set(&[]),
                                         set(&["10mb_hd"]),
                                         set(&["copper", "fiber", "pause_asym"]),
                                         set(&["10mb_hd", "10mb_fd", "100mb_hd", "100mb_fd",
                                               "1gb_hd", "1gb_fd", "10gb_fd", "copper",
                                               "fiber", "autoneg", "pause", "pause_asym"])];
        for flags in subsets {
            for width in 2..9 {
                let field = encode_flags(&table, Namespace::PortSupported, &flags, width).unwrap();
                assert_eq!(field.len(), width);
                assert_eq!(decode_flags(&table, Namespace::PortSupported, &field), flags);
            }
        }
    }

    #[test]
    fn u32_helpers() {
        let table = SymbolTable::default();
        let word = encode_flags_u32(&table, Namespace::StatsReplyFlags, &["reply_more"]).unwrap();
        assert_eq!(word, 1);
        assert_eq!(decode_flags_u32(&table, Namespace::StatsReplyFlags, word),
                   set(&["reply_more"]));
    }

    #[test]
    fn prefix_masks() {
        assert_eq!(mask_of(0), 0xffff_ffff);
        assert_eq!(mask_of(8), 0xffff_ff00);
        assert_eq!(mask_of(31), 0x8000_0000);
        assert_eq!(mask_of(32), 0);
        assert_eq!(mask_of(63), 0);
        for n in 0..32 {
            assert_eq!(prefix_len_of(mask_of(n)), n);
        }
        assert_eq!(prefix_len_of(0), 32);
    }
}
