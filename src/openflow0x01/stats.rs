use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::bits::{decode_flags, encode_flags, FlagSet};
use crate::error::{DecodeError, EncodeError, ReadContext};
use crate::ofp_utils::{read_fixed_size_string, skip_padding, write_fixed_size_string,
                       write_padding_bytes};
use crate::symbols::{Namespace, SymbolTable};

use super::pattern::{Match, OFP_MATCH_LEN};
use super::MessageType;

pub const DESC_STR_LEN: usize = 256;
pub const SERIAL_NUM_LEN: usize = 32;

const OFPST_DESC: u16 = 0;
const OFPST_FLOW: u16 = 1;
const OFPST_AGGREGATE: u16 = 2;

const OFP_STATS_HEADER_LEN: usize = 4;
const OFP_DESC_STATS_LEN: usize = 4 * DESC_STR_LEN + SERIAL_NUM_LEN;
const OFP_FLOW_STATS_REQUEST_LEN: usize = OFP_MATCH_LEN + 4;
const OFP_AGGREGATE_STATS_REPLY_LEN: usize = 24;

/// Whether a stats type integer has a body codec here.
pub fn supported_request_type(typ: u16) -> bool {
    match typ {
        OFPST_DESC | OFPST_FLOW | OFPST_AGGREGATE => true,
        _ => false,
    }
}

pub fn supported_reply_type(typ: u16) -> bool {
    match typ {
        OFPST_DESC | OFPST_AGGREGATE => true,
        _ => false,
    }
}

fn read_stats_flags(table: &SymbolTable,
                    ns: Namespace,
                    bytes: &mut Cursor<&[u8]>)
                    -> Result<FlagSet, DecodeError> {
    let flags = bytes.read_u16::<BigEndian>().context("ofp_stats.flags")?;
    Ok(decode_flags(table, ns, &flags.to_be_bytes()))
}

fn write_stats_header(table: &SymbolTable,
                      ns: Namespace,
                      typ: u16,
                      flags: &FlagSet,
                      bytes: &mut Vec<u8>)
                      -> Result<(), EncodeError> {
    bytes.write_u16::<BigEndian>(typ)?;
    bytes.extend(encode_flags(table, ns, flags, 2)?);
    Ok(())
}

/// Selects the flows a flow or aggregate stats request covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowStatsRequest {
    pub pattern: Match,
    pub table_id: u8,
    pub out_port: u16,
}

impl FlowStatsRequest {
    fn parse(table: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<FlowStatsRequest, DecodeError> {
        let pattern = Match::parse(table, bytes)?;
        let table_id = bytes.read_u8().context("ofp_flow_stats_request.table_id")?;
        skip_padding(bytes, 1, "ofp_flow_stats_request.pad")?;
        let out_port = bytes.read_u16::<BigEndian>().context("ofp_flow_stats_request.out_port")?;
        Ok(FlowStatsRequest {
            pattern: pattern,
            table_id: table_id,
            out_port: out_port,
        })
    }

    fn marshal(&self, table: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        self.pattern.marshal(table, bytes)?;
        bytes.write_u8(self.table_id)?;
        write_padding_bytes(bytes, 1)?;
        bytes.write_u16::<BigEndian>(self.out_port)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatsReqBody {
    Desc,
    Flow(FlowStatsRequest),
    Aggregate(FlowStatsRequest),
}

/// Statistics request from the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsReq {
    pub flags: FlagSet,
    pub body: StatsReqBody,
}

impl MessageType for StatsReq {
    fn size_of(&self) -> usize {
        OFP_STATS_HEADER_LEN +
        match self.body {
            StatsReqBody::Desc => 0,
            StatsReqBody::Flow(_) |
            StatsReqBody::Aggregate(_) => OFP_FLOW_STATS_REQUEST_LEN,
        }
    }

    fn parse(table: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<StatsReq, DecodeError> {
        let typ = bytes.read_u16::<BigEndian>().context("ofp_stats_request.type")?;
        let flags = read_stats_flags(table, Namespace::StatsRequestFlags, bytes)?;
        let body = match typ {
            OFPST_DESC => StatsReqBody::Desc,
            OFPST_FLOW => StatsReqBody::Flow(FlowStatsRequest::parse(table, bytes)?),
            OFPST_AGGREGATE => StatsReqBody::Aggregate(FlowStatsRequest::parse(table, bytes)?),
            t => {
                return Err(DecodeError::UnexpectedValue {
                    field: "ofp_stats_request.type",
                    value: t as u64,
                })
            }
        };
        Ok(StatsReq {
            flags: flags,
            body: body,
        })
    }

    fn marshal(&self, table: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        let typ = match self.body {
            StatsReqBody::Desc => OFPST_DESC,
            StatsReqBody::Flow(_) => OFPST_FLOW,
            StatsReqBody::Aggregate(_) => OFPST_AGGREGATE,
        };
        write_stats_header(table, Namespace::StatsRequestFlags, typ, &self.flags, bytes)?;
        match self.body {
            StatsReqBody::Desc => Ok(()),
            StatsReqBody::Flow(ref req) |
            StatsReqBody::Aggregate(ref req) => req.marshal(table, bytes),
        }
    }
}

/// Description of the switch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchDesc {
    pub manufacturer: String,
    pub hardware: String,
    pub software: String,
    pub serial_number: String,
    pub datapath: String,
}

impl SwitchDesc {
    fn parse(bytes: &mut Cursor<&[u8]>) -> Result<SwitchDesc, DecodeError> {
        Ok(SwitchDesc {
            manufacturer: read_fixed_size_string(bytes, DESC_STR_LEN, "ofp_desc_stats.mfr_desc")?,
            hardware: read_fixed_size_string(bytes, DESC_STR_LEN, "ofp_desc_stats.hw_desc")?,
            software: read_fixed_size_string(bytes, DESC_STR_LEN, "ofp_desc_stats.sw_desc")?,
            serial_number: read_fixed_size_string(bytes, SERIAL_NUM_LEN, "ofp_desc_stats.serial_num")?,
            datapath: read_fixed_size_string(bytes, DESC_STR_LEN, "ofp_desc_stats.dp_desc")?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        write_fixed_size_string(bytes, &self.manufacturer, DESC_STR_LEN)?;
        write_fixed_size_string(bytes, &self.hardware, DESC_STR_LEN)?;
        write_fixed_size_string(bytes, &self.software, DESC_STR_LEN)?;
        write_fixed_size_string(bytes, &self.serial_number, SERIAL_NUM_LEN)?;
        write_fixed_size_string(bytes, &self.datapath, DESC_STR_LEN)
    }
}

/// Totals over the flows selected by an aggregate request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AggregateStats {
    pub packet_count: u64,
    pub byte_count: u64,
    pub flow_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatsRespBody {
    Desc(SwitchDesc),
    Aggregate(AggregateStats),
}

/// Statistics reply from the switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsResp {
    pub flags: FlagSet,
    pub body: StatsRespBody,
}

impl MessageType for StatsResp {
    fn size_of(&self) -> usize {
        OFP_STATS_HEADER_LEN +
        match self.body {
            StatsRespBody::Desc(_) => OFP_DESC_STATS_LEN,
            StatsRespBody::Aggregate(_) => OFP_AGGREGATE_STATS_REPLY_LEN,
        }
    }

    fn parse(table: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<StatsResp, DecodeError> {
        let typ = bytes.read_u16::<BigEndian>().context("ofp_stats_reply.type")?;
        let flags = read_stats_flags(table, Namespace::StatsReplyFlags, bytes)?;
        let body = match typ {
            OFPST_DESC => StatsRespBody::Desc(SwitchDesc::parse(bytes)?),
            OFPST_AGGREGATE => {
                let packet_count = bytes.read_u64::<BigEndian>()
                    .context("ofp_aggregate_stats_reply.packet_count")?;
                let byte_count = bytes.read_u64::<BigEndian>()
                    .context("ofp_aggregate_stats_reply.byte_count")?;
                let flow_count = bytes.read_u32::<BigEndian>()
                    .context("ofp_aggregate_stats_reply.flow_count")?;
                skip_padding(bytes, 4, "ofp_aggregate_stats_reply.pad")?;
                StatsRespBody::Aggregate(AggregateStats {
                    packet_count: packet_count,
                    byte_count: byte_count,
                    flow_count: flow_count,
                })
            }
            t => {
                return Err(DecodeError::UnexpectedValue {
                    field: "ofp_stats_reply.type",
                    value: t as u64,
                })
            }
        };
        Ok(StatsResp {
            flags: flags,
            body: body,
        })
    }

    fn marshal(&self, table: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        let typ = match self.body {
            StatsRespBody::Desc(_) => OFPST_DESC,
            StatsRespBody::Aggregate(_) => OFPST_AGGREGATE,
        };
        write_stats_header(table, Namespace::StatsReplyFlags, typ, &self.flags, bytes)?;
        match self.body {
            StatsRespBody::Desc(ref desc) => desc.marshal(bytes),
            StatsRespBody::Aggregate(ref agg) => {
                bytes.write_u64::<BigEndian>(agg.packet_count)?;
                bytes.write_u64::<BigEndian>(agg.byte_count)?;
                bytes.write_u32::<BigEndian>(agg.flow_count)?;
                write_padding_bytes(bytes, 4)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openflow0x01::pattern::{Field, FieldKind};
    use pretty_assertions::assert_eq;

    fn desc() -> SwitchDesc {
        SwitchDesc {
            manufacturer: "Nicira, Inc.".to_string(),
            hardware: "Open vSwitch".to_string(),
            software: "2.17.0".to_string(),
            serial_number: "None".to_string(),
            datapath: "br0".to_string(),
        }
    }

    fn encode<T: MessageType>(msg: &T) -> Vec<u8> {
        let mut bytes = vec![];
        msg.marshal(&SymbolTable::default(), &mut bytes).unwrap();
        assert_eq!(bytes.len(), msg.size_of());
        bytes
    }

    fn decode<T: MessageType>(bytes: &[u8]) -> T {
        T::parse(&SymbolTable::default(), &mut Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn desc_reply_columns_are_padded() {
        let reply = StatsResp {
            flags: FlagSet::new(),
            body: StatsRespBody::Desc(desc()),
        };
        let bytes = encode(&reply);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        let mfr = &bytes[4..4 + DESC_STR_LEN];
        assert_eq!(&mfr[..12], b"Nicira, Inc.");
        assert!(mfr[12..].iter().all(|b| *b == 0));
        let serial = &bytes[4 + 3 * DESC_STR_LEN..4 + 3 * DESC_STR_LEN + SERIAL_NUM_LEN];
        assert_eq!(&serial[..4], b"None");
        assert!(serial[4..].iter().all(|b| *b == 0));
        assert_eq!(decode::<StatsResp>(&bytes), reply);
    }

    #[test]
    fn desc_reply_with_reply_more() {
        let reply = StatsResp {
            flags: ["reply_more"].iter().cloned().collect(),
            body: StatsRespBody::Desc(SwitchDesc::default()),
        };
        let bytes = encode(&reply);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 1]);
        assert_eq!(decode::<StatsResp>(&bytes), reply);
    }

    #[test]
    fn desc_request() {
        let req = StatsReq {
            flags: FlagSet::new(),
            body: StatsReqBody::Desc,
        };
        let bytes = encode(&req);
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert_eq!(decode::<StatsReq>(&bytes), req);
    }

    #[test]
    fn flow_request_round_trip() {
        let req = StatsReq {
            flags: FlagSet::new(),
            body: StatsReqBody::Flow(FlowStatsRequest {
                pattern: Match::new(vec![Field::new(FieldKind::InPort, 2),
                                         Field::masked(FieldKind::Ipv4Src, 0x0a00_0000, 0xff00_0000),
                                         Field::masked(FieldKind::Ipv4Dst, 0, 0)]),
                table_id: 0xff,
                out_port: 0xffff,
            }),
        };
        let bytes = encode(&req);
        assert_eq!(&bytes[0..2], &[0, 1]);
        assert_eq!(&bytes[44..48], &[0xff, 0, 0xff, 0xff]);
        assert_eq!(decode::<StatsReq>(&bytes), req);
    }

    #[test]
    fn aggregate_round_trip() {
        let reply = StatsResp {
            flags: FlagSet::new(),
            body: StatsRespBody::Aggregate(AggregateStats {
                packet_count: 1 << 40,
                byte_count: 12345,
                flow_count: 3,
            }),
        };
        assert_eq!(decode::<StatsResp>(&encode(&reply)), reply);
    }

    #[test]
    fn unknown_request_flag_fails() {
        let req = StatsReq {
            flags: ["reply_more"].iter().cloned().collect(),
            body: StatsReqBody::Desc,
        };
        let mut bytes = vec![];
        assert!(matches!(req.marshal(&SymbolTable::default(), &mut bytes),
                         Err(EncodeError::UnknownFlag { namespace: Namespace::StatsRequestFlags, .. })));
    }

    #[test]
    fn truncated_desc_reply() {
        let bytes = encode(&StatsResp {
            flags: FlagSet::new(),
            body: StatsRespBody::Desc(desc()),
        });
        let mut cursor = Cursor::new(&bytes[..bytes.len() - 1]);
        assert_eq!(StatsResp::parse(&SymbolTable::default(), &mut cursor),
                   Err(DecodeError::Truncated { field: "ofp_desc_stats.dp_desc" }));
    }

    #[test]
    fn supported_types() {
        assert!(supported_request_type(OFPST_FLOW));
        assert!(!supported_reply_type(OFPST_FLOW));
        assert!(!supported_request_type(4));
    }
}
