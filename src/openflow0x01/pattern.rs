use std::collections::BTreeSet;
use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::bits::{bit, decode_flags_u32, encode_flags_u32, mask_of, prefix_len_of, test_bit};
use crate::error::{DecodeError, EncodeError, ReadContext};
use crate::ofp_utils::{mac_of_bytes, read_mac, skip_padding, write_mac, write_padding_bytes};
use crate::symbols::{Namespace, SymbolTable};

/// Byte-size of an `ofp_match` block.
pub const OFP_MATCH_LEN: usize = 40;

const OFPFW_TP_SRC: u64 = 6;
const OFPFW_TP_DST: u64 = 7;
const OFPFW_NW_SRC_SHIFT: u32 = 8;
const OFPFW_NW_DST_SHIFT: u32 = 14;
const OFPFW_NW_BITS: u32 = 0x3f;
/// Bits of the wildcards word that are not generic per-field flags.
const OFPFW_SPECIAL: u32 = (0b11 << OFPFW_TP_SRC) | (0xfff << OFPFW_NW_SRC_SHIFT);

const IP_PROTO_TCP: u64 = 6;
const IP_PROTO_UDP: u64 = 17;

/// Header fields a flow can match on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    InPort,
    EthSrc,
    EthDst,
    VlanVid,
    VlanPcp,
    EthType,
    IpDscp,
    IpProto,
    Ipv4Src,
    Ipv4Dst,
    TcpSrc,
    TcpDst,
    UdpSrc,
    UdpDst,
}

impl FieldKind {
    /// Fields whose presence is carried by a single bit of the `flow_wildcard` namespace.
    pub const GENERIC: [FieldKind; 8] = [FieldKind::InPort,
                                         FieldKind::VlanVid,
                                         FieldKind::EthSrc,
                                         FieldKind::EthDst,
                                         FieldKind::EthType,
                                         FieldKind::IpProto,
                                         FieldKind::VlanPcp,
                                         FieldKind::IpDscp];

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::InPort => "in_port",
            FieldKind::EthSrc => "eth_src",
            FieldKind::EthDst => "eth_dst",
            FieldKind::VlanVid => "vlan_vid",
            FieldKind::VlanPcp => "vlan_pcp",
            FieldKind::EthType => "eth_type",
            FieldKind::IpDscp => "ip_dscp",
            FieldKind::IpProto => "ip_proto",
            FieldKind::Ipv4Src => "ipv4_src",
            FieldKind::Ipv4Dst => "ipv4_dst",
            FieldKind::TcpSrc => "tcp_src",
            FieldKind::TcpDst => "tcp_dst",
            FieldKind::UdpSrc => "udp_src",
            FieldKind::UdpDst => "udp_dst",
        }
    }
}

/// One matched header field: raw value bits plus, for IPv4 addresses, a mask.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Field {
    pub kind: FieldKind,
    pub value: u64,
    pub mask: Option<u32>,
}

impl Field {
    pub fn new(kind: FieldKind, value: u64) -> Field {
        Field {
            kind: kind,
            value: value,
            mask: None,
        }
    }

    pub fn masked(kind: FieldKind, value: u64, mask: u32) -> Field {
        Field {
            kind: kind,
            value: value,
            mask: Some(mask),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchType {
    Standard,
}

/// Fields to match against flows.
///
/// `fields` is a bag: two matches are equal when they hold the same set of fields,
/// whatever the order. Decoding always yields `ipv4_src` and `ipv4_dst`, each with an
/// explicit mask.
#[derive(Clone, Debug)]
pub struct Match {
    pub typ: MatchType,
    pub fields: Vec<Field>,
}

impl PartialEq for Match {
    fn eq(&self, other: &Match) -> bool {
        self.typ == other.typ && self.field_set() == other.field_set()
    }
}

impl Eq for Match {}

impl Match {
    pub fn new(fields: Vec<Field>) -> Match {
        Match {
            typ: MatchType::Standard,
            fields: fields,
        }
    }

    /// The first field of kind `kind`, if any.
    pub fn get(&self, kind: FieldKind) -> Option<&Field> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    fn value_of(&self, kind: FieldKind) -> u64 {
        self.get(kind).map_or(0, |f| f.value)
    }

    fn field_set(&self) -> BTreeSet<&Field> {
        self.fields.iter().collect()
    }

    pub fn size_of(&self) -> usize {
        OFP_MATCH_LEN
    }

    /// Transport ports carried in the `tp_src`/`tp_dst` slots. Only tcp fields under
    /// ip_proto 6 and udp fields under ip_proto 17 are representable.
    fn transport_ports(&self) -> (Option<u16>, Option<u16>) {
        let (src, dst) = match self.get(FieldKind::IpProto).map(|f| f.value) {
            Some(IP_PROTO_TCP) => (FieldKind::TcpSrc, FieldKind::TcpDst),
            Some(IP_PROTO_UDP) => (FieldKind::UdpSrc, FieldKind::UdpDst),
            _ => return (None, None),
        };
        (self.get(src).map(|f| f.value as u16), self.get(dst).map(|f| f.value as u16))
    }

    /// Wildcarded low bits of an IPv4 address field.
    fn nw_wildcard_bits(field: Option<&Field>) -> u32 {
        match field {
            None => 32,
            Some(f) => f.mask.map_or(0, prefix_len_of),
        }
    }

    fn wildcards(&self, table: &SymbolTable) -> Result<u32, EncodeError> {
        let absent = FieldKind::GENERIC
            .iter()
            .filter(|kind| self.get(**kind).is_none())
            .map(|kind| kind.name());
        let w = encode_flags_u32(table, Namespace::FlowWildcard, absent)? as u64;
        let (tp_src, tp_dst) = self.transport_ports();
        let w = bit(OFPFW_TP_SRC, w, tp_src.is_none());
        let w = bit(OFPFW_TP_DST, w, tp_dst.is_none()) as u32;
        let nw_src = Self::nw_wildcard_bits(self.get(FieldKind::Ipv4Src)) & OFPFW_NW_BITS;
        let nw_dst = Self::nw_wildcard_bits(self.get(FieldKind::Ipv4Dst)) & OFPFW_NW_BITS;
        Ok(w | (nw_src << OFPFW_NW_SRC_SHIFT) | (nw_dst << OFPFW_NW_DST_SHIFT))
    }

    pub fn marshal(&self, table: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        let (tp_src, tp_dst) = self.transport_ports();
        bytes.write_u32::<BigEndian>(self.wildcards(table)?)?;
        bytes.write_u16::<BigEndian>(self.value_of(FieldKind::InPort) as u16)?;
        write_mac(bytes, self.value_of(FieldKind::EthSrc))?;
        write_mac(bytes, self.value_of(FieldKind::EthDst))?;
        bytes.write_u16::<BigEndian>(self.value_of(FieldKind::VlanVid) as u16)?;
        bytes.write_u8(self.value_of(FieldKind::VlanPcp) as u8)?;
        write_padding_bytes(bytes, 1)?;
        bytes.write_u16::<BigEndian>(self.value_of(FieldKind::EthType) as u16)?;
        bytes.write_u8(self.value_of(FieldKind::IpDscp) as u8)?;
        bytes.write_u8(self.value_of(FieldKind::IpProto) as u8)?;
        write_padding_bytes(bytes, 2)?;
        bytes.write_u32::<BigEndian>(self.value_of(FieldKind::Ipv4Src) as u32)?;
        bytes.write_u32::<BigEndian>(self.value_of(FieldKind::Ipv4Dst) as u32)?;
        bytes.write_u16::<BigEndian>(tp_src.unwrap_or(0))?;
        bytes.write_u16::<BigEndian>(tp_dst.unwrap_or(0))?;
        Ok(())
    }

    pub fn parse(table: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<Match, DecodeError> {
        let w = bytes.read_u32::<BigEndian>().context("ofp_match.wildcards")?;
        let wildcarded = decode_flags_u32(table, Namespace::FlowWildcard, w & !OFPFW_SPECIAL);
        let matched = |kind: FieldKind| !wildcarded.contains(kind.name());

        let in_port = bytes.read_u16::<BigEndian>().context("ofp_match.in_port")?;
        let eth_src = mac_of_bytes(read_mac(bytes, "ofp_match.dl_src")?);
        let eth_dst = mac_of_bytes(read_mac(bytes, "ofp_match.dl_dst")?);
        let vlan_vid = bytes.read_u16::<BigEndian>().context("ofp_match.dl_vlan")?;
        let vlan_pcp = bytes.read_u8().context("ofp_match.dl_vlan_pcp")?;
        skip_padding(bytes, 1, "ofp_match.pad1")?;
        let eth_type = bytes.read_u16::<BigEndian>().context("ofp_match.dl_type")?;
        let ip_dscp = bytes.read_u8().context("ofp_match.nw_tos")?;
        let ip_proto = bytes.read_u8().context("ofp_match.nw_proto")?;
        skip_padding(bytes, 2, "ofp_match.pad2")?;
        let ipv4_src = bytes.read_u32::<BigEndian>().context("ofp_match.nw_src")?;
        let ipv4_dst = bytes.read_u32::<BigEndian>().context("ofp_match.nw_dst")?;
        let tp_src = bytes.read_u16::<BigEndian>().context("ofp_match.tp_src")?;
        let tp_dst = bytes.read_u16::<BigEndian>().context("ofp_match.tp_dst")?;

        // Fields driven by the wildcards word first, then the two address fields.
        let mut fields = vec![];
        let values = [(FieldKind::InPort, in_port as u64),
                      (FieldKind::EthSrc, eth_src),
                      (FieldKind::EthDst, eth_dst),
                      (FieldKind::VlanVid, vlan_vid as u64),
                      (FieldKind::VlanPcp, vlan_pcp as u64),
                      (FieldKind::EthType, eth_type as u64),
                      (FieldKind::IpDscp, ip_dscp as u64),
                      (FieldKind::IpProto, ip_proto as u64)];
        for (kind, value) in values.iter() {
            if matched(*kind) {
                fields.push(Field::new(*kind, *value));
            }
        }
        if matched(FieldKind::IpProto) {
            let kinds = match ip_proto as u64 {
                IP_PROTO_TCP => Some((FieldKind::TcpSrc, FieldKind::TcpDst)),
                IP_PROTO_UDP => Some((FieldKind::UdpSrc, FieldKind::UdpDst)),
                _ => None,
            };
            if let Some((src, dst)) = kinds {
                if !test_bit(OFPFW_TP_SRC, w as u64) {
                    fields.push(Field::new(src, tp_src as u64));
                }
                if !test_bit(OFPFW_TP_DST, w as u64) {
                    fields.push(Field::new(dst, tp_dst as u64));
                }
            }
        }
        let nw_src = (w >> OFPFW_NW_SRC_SHIFT) & OFPFW_NW_BITS;
        let nw_dst = (w >> OFPFW_NW_DST_SHIFT) & OFPFW_NW_BITS;
        fields.push(Field::masked(FieldKind::Ipv4Src, ipv4_src as u64, mask_of(nw_src)));
        fields.push(Field::masked(FieldKind::Ipv4Dst, ipv4_dst as u64, mask_of(nw_dst)));

        Ok(Match::new(fields))
    }
}
