//! Name <-> wire integer tables.
//!
//! The codec never hardcodes flag bit positions or message type codes. It asks a
//! `SymbolTable` instead, which is handed in by the caller and only ever read.

use std::fmt;

/// A named set of flag bits sharing one bit-index table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Generic presence bits of the `ofp_match` wildcards word.
    FlowWildcard,
    PortConfig,
    PortState,
    PortCurrent,
    PortAdvertised,
    PortSupported,
    PortPeer,
    Capabilities,
    Actions,
    StatsRequestFlags,
    StatsReplyFlags,
}

impl Namespace {
    pub fn name(self) -> &'static str {
        match self {
            Namespace::FlowWildcard => "flow_wildcard",
            Namespace::PortConfig => "port_config",
            Namespace::PortState => "port_state",
            Namespace::PortCurrent => "port_current",
            Namespace::PortAdvertised => "port_advertised",
            Namespace::PortSupported => "port_supported",
            Namespace::PortPeer => "port_peer",
            Namespace::Capabilities => "capabilities",
            Namespace::Actions => "actions",
            Namespace::StatsRequestFlags => "stats_request_flags",
            Namespace::StatsReplyFlags => "stats_reply_flags",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// OpenFlow 1.0 message kinds, used by headers to identify meaning of the rest of a message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MsgKind {
    Hello,
    Error,
    EchoRequest,
    EchoReply,
    Vendor,
    FeaturesRequest,
    FeaturesReply,
    GetConfigRequest,
    GetConfigReply,
    SetConfig,
    PacketIn,
    FlowRemoved,
    PortStatus,
    PacketOut,
    FlowMod,
    PortMod,
    StatsRequest,
    StatsReply,
    BarrierRequest,
    BarrierReply,
    QueueGetConfigRequest,
    QueueGetConfigReply,
}

/// `(flag name, bit index)` pairs of one namespace.
pub type FlagTable = &'static [(&'static str, u8)];

const FLOW_WILDCARD: FlagTable = &[
    ("in_port", 0),
    ("vlan_vid", 1),
    ("eth_src", 2),
    ("eth_dst", 3),
    ("eth_type", 4),
    ("ip_proto", 5),
    ("vlan_pcp", 20),
    ("ip_dscp", 21),
];

const PORT_CONFIG: FlagTable = &[
    ("port_down", 0),
    ("no_stp", 1),
    ("no_recv", 2),
    ("no_recv_stp", 3),
    ("no_flood", 4),
    ("no_fwd", 5),
    ("no_packet_in", 6),
];

const PORT_STATE: FlagTable = &[("link_down", 0), ("stp_learn", 8), ("stp_forward", 9)];

const PORT_FEATURES: FlagTable = &[
    ("10mb_hd", 0),
    ("10mb_fd", 1),
    ("100mb_hd", 2),
    ("100mb_fd", 3),
    ("1gb_hd", 4),
    ("1gb_fd", 5),
    ("10gb_fd", 6),
    ("copper", 7),
    ("fiber", 8),
    ("autoneg", 9),
    ("pause", 10),
    ("pause_asym", 11),
];

const CAPABILITIES: FlagTable = &[
    ("flow_stats", 0),
    ("table_stats", 1),
    ("port_stats", 2),
    ("stp", 3),
    ("ip_reasm", 5),
    ("queue_stats", 6),
    ("arp_match_ip", 7),
];

const ACTIONS: FlagTable = &[
    ("output", 0),
    ("set_vlan_vid", 1),
    ("set_vlan_pcp", 2),
    ("strip_vlan", 3),
    ("set_dl_src", 4),
    ("set_dl_dst", 5),
    ("set_nw_src", 6),
    ("set_nw_dst", 7),
    ("set_nw_tos", 8),
    ("set_tp_src", 9),
    ("set_tp_dst", 10),
    ("enqueue", 11),
];

const STATS_REQUEST_FLAGS: FlagTable = &[];

const STATS_REPLY_FLAGS: FlagTable = &[("reply_more", 0)];

const OPENFLOW0X01_NAMESPACES: &[(Namespace, FlagTable)] = &[
    (Namespace::FlowWildcard, FLOW_WILDCARD),
    (Namespace::PortConfig, PORT_CONFIG),
    (Namespace::PortState, PORT_STATE),
    (Namespace::PortCurrent, PORT_FEATURES),
    (Namespace::PortAdvertised, PORT_FEATURES),
    (Namespace::PortSupported, PORT_FEATURES),
    (Namespace::PortPeer, PORT_FEATURES),
    (Namespace::Capabilities, CAPABILITIES),
    (Namespace::Actions, ACTIONS),
    (Namespace::StatsRequestFlags, STATS_REQUEST_FLAGS),
    (Namespace::StatsReplyFlags, STATS_REPLY_FLAGS),
];

const OPENFLOW0X01_TYPES: &[(MsgKind, u8)] = &[
    (MsgKind::Hello, 0),
    (MsgKind::Error, 1),
    (MsgKind::EchoRequest, 2),
    (MsgKind::EchoReply, 3),
    (MsgKind::Vendor, 4),
    (MsgKind::FeaturesRequest, 5),
    (MsgKind::FeaturesReply, 6),
    (MsgKind::GetConfigRequest, 7),
    (MsgKind::GetConfigReply, 8),
    (MsgKind::SetConfig, 9),
    (MsgKind::PacketIn, 10),
    (MsgKind::FlowRemoved, 11),
    (MsgKind::PortStatus, 12),
    (MsgKind::PacketOut, 13),
    (MsgKind::FlowMod, 14),
    (MsgKind::PortMod, 15),
    (MsgKind::StatsRequest, 16),
    (MsgKind::StatsReply, 17),
    (MsgKind::BarrierRequest, 18),
    (MsgKind::BarrierReply, 19),
    (MsgKind::QueueGetConfigRequest, 20),
    (MsgKind::QueueGetConfigReply, 21),
];

/// Read-only lookup tables injected into every encode/decode call.
///
/// Each namespace is a bijection between flag names and bit indices, and the message
/// table is a bijection between `MsgKind`s and wire type integers. Lookups that miss
/// return `None`; it is up to the caller whether that is an error (encode) or
/// something to skip (decode).
#[derive(Copy, Clone, Debug)]
pub struct SymbolTable {
    namespaces: &'static [(Namespace, FlagTable)],
    types: &'static [(MsgKind, u8)],
}

impl SymbolTable {
    /// Create a `SymbolTable` out of the given flag and message-type tables.
    pub const fn new(
        namespaces: &'static [(Namespace, FlagTable)],
        types: &'static [(MsgKind, u8)],
    ) -> SymbolTable {
        SymbolTable { namespaces, types }
    }

    /// The OpenFlow 1.0 tables.
    pub const fn openflow0x01() -> SymbolTable {
        SymbolTable::new(OPENFLOW0X01_NAMESPACES, OPENFLOW0X01_TYPES)
    }

    fn flags(&self, ns: Namespace) -> FlagTable {
        self.namespaces
            .iter()
            .find(|(n, _)| *n == ns)
            .map(|(_, table)| *table)
            .unwrap_or(&[])
    }

    /// Bit index of flag `name` in namespace `ns`.
    pub fn bit_of(&self, ns: Namespace, name: &str) -> Option<u8> {
        self.flags(ns).iter().find(|(n, _)| *n == name).map(|(_, bit)| *bit)
    }

    /// Flag name at bit index `bit` of namespace `ns`.
    pub fn flag_of(&self, ns: Namespace, bit: u8) -> Option<&'static str> {
        self.flags(ns).iter().find(|(_, b)| *b == bit).map(|(n, _)| *n)
    }

    /// Wire type integer of a message kind.
    pub fn type_code(&self, kind: MsgKind) -> Option<u8> {
        self.types.iter().find(|(k, _)| *k == kind).map(|(_, code)| *code)
    }

    /// Message kind of a wire type integer.
    pub fn kind_of(&self, code: u8) -> Option<MsgKind> {
        self.types.iter().find(|(_, c)| *c == code).map(|(kind, _)| *kind)
    }
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::openflow0x01()
    }
}
