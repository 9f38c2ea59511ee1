use std::io::Cursor;

use crate::error::{DecodeError, EncodeError};
use crate::symbols::SymbolTable;

pub mod features;
pub mod pattern;
pub mod port;
pub mod queue;
pub mod stats;

pub use self::features::SwitchFeatures;
pub use self::pattern::{Field, FieldKind, Match, MatchType};
pub use self::port::{PortDesc, PortReason, PortStatus};
pub use self::queue::{PacketQueue, QueueGetConfigReply, QueueGetConfigRequest, QueueProperty};
pub use self::stats::{AggregateStats, FlowStatsRequest, StatsReq, StatsReqBody, StatsResp,
                      StatsRespBody, SwitchDesc};

/// Common API for message bodies that have a wire layout.
pub trait MessageType: Sized {
    /// Return the byte-size of a message body.
    fn size_of(&self) -> usize;
    /// Parse a message body out of `bytes`.
    fn parse(table: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<Self, DecodeError>;
    /// Marshal a message body onto the end of `bytes`.
    fn marshal(&self, table: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError>;
}

/// Encapsulates handling of messages implementing `MessageType` trait.
pub mod message {
    use super::*;
    use byteorder::{BigEndian, ReadBytesExt};
    use log::{debug, warn};

    use crate::error::ReadContext;
    use crate::ofp_header::{OfpHeader, OFP_VERSION};
    use crate::ofp_message::OfpMessage;
    use crate::symbols::MsgKind;

    /// Abstractions of OpenFlow message bodies mapping to message kinds.
    ///
    /// Kinds without a body codec here, and stats types other than the ones `stats`
    /// knows, decode to `Unsupported` carrying the raw type integer and body bytes.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Body {
        Hello,
        EchoRequest(Vec<u8>),
        EchoReply(Vec<u8>),
        FeaturesReq,
        FeaturesReply(SwitchFeatures),
        PortStatus(PortStatus),
        StatsRequest(StatsReq),
        StatsReply(StatsResp),
        BarrierRequest,
        BarrierReply,
        QueueGetConfigRequest(QueueGetConfigRequest),
        QueueGetConfigReply(QueueGetConfigReply),
        Unsupported { typ: u8, payload: Vec<u8> },
    }

    impl Body {
        /// Map `Body` to its message kind. `Unsupported` bodies have none.
        pub fn kind(&self) -> Option<MsgKind> {
            self.wired_kind().ok()
        }

        /// The message kind of a body, or the raw type integer of an `Unsupported` one.
        fn wired_kind(&self) -> Result<MsgKind, u8> {
            match *self {
                Body::Hello => Ok(MsgKind::Hello),
                Body::EchoRequest(_) => Ok(MsgKind::EchoRequest),
                Body::EchoReply(_) => Ok(MsgKind::EchoReply),
                Body::FeaturesReq => Ok(MsgKind::FeaturesRequest),
                Body::FeaturesReply(_) => Ok(MsgKind::FeaturesReply),
                Body::PortStatus(_) => Ok(MsgKind::PortStatus),
                Body::StatsRequest(_) => Ok(MsgKind::StatsRequest),
                Body::StatsReply(_) => Ok(MsgKind::StatsReply),
                Body::BarrierRequest => Ok(MsgKind::BarrierRequest),
                Body::BarrierReply => Ok(MsgKind::BarrierReply),
                Body::QueueGetConfigRequest(_) => Ok(MsgKind::QueueGetConfigRequest),
                Body::QueueGetConfigReply(_) => Ok(MsgKind::QueueGetConfigReply),
                Body::Unsupported { typ, .. } => Err(typ),
            }
        }

        /// Wire type integer of a body.
        pub fn type_code(&self, table: &SymbolTable) -> Result<u8, EncodeError> {
            match self.wired_kind() {
                Ok(kind) => table.type_code(kind).ok_or(EncodeError::UnmappedMessage(kind)),
                Err(typ) => Ok(typ),
            }
        }

        /// Return the byte-size of a body.
        pub fn size_of(&self) -> usize {
            match *self {
                Body::Hello |
                Body::FeaturesReq |
                Body::BarrierRequest |
                Body::BarrierReply => 0,
                Body::EchoRequest(ref buf) |
                Body::EchoReply(ref buf) |
                Body::Unsupported { payload: ref buf, .. } => buf.len(),
                Body::FeaturesReply(ref features) => features.size_of(),
                Body::PortStatus(ref ps) => ps.size_of(),
                Body::StatsRequest(ref req) => req.size_of(),
                Body::StatsReply(ref resp) => resp.size_of(),
                Body::QueueGetConfigRequest(ref req) => req.size_of(),
                Body::QueueGetConfigReply(ref reply) => reply.size_of(),
            }
        }

        /// Marshal the body of an OpenFlow message.
        pub fn marshal(&self, table: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
            match *self {
                Body::Hello |
                Body::FeaturesReq |
                Body::BarrierRequest |
                Body::BarrierReply => Ok(()),
                Body::EchoRequest(ref buf) |
                Body::EchoReply(ref buf) |
                Body::Unsupported { payload: ref buf, .. } => {
                    bytes.extend_from_slice(buf);
                    Ok(())
                }
                Body::FeaturesReply(ref features) => features.marshal(table, bytes),
                Body::PortStatus(ref ps) => ps.marshal(table, bytes),
                Body::StatsRequest(ref req) => req.marshal(table, bytes),
                Body::StatsReply(ref resp) => resp.marshal(table, bytes),
                Body::QueueGetConfigRequest(ref req) => req.marshal(table, bytes),
                Body::QueueGetConfigReply(ref reply) => reply.marshal(table, bytes),
            }
        }

        fn unsupported(typ: u8, buf: &[u8]) -> Body {
            debug!("no body codec for message type {}", typ);
            Body::Unsupported {
                typ: typ,
                payload: buf.to_vec(),
            }
        }

        /// Parse the body of a message of wire type `typ`.
        pub fn parse(table: &SymbolTable, typ: u8, buf: &[u8]) -> Result<Body, DecodeError> {
            let kind = match table.kind_of(typ) {
                Some(kind) => kind,
                None => return Ok(Body::unsupported(typ, buf)),
            };
            let mut bytes = Cursor::new(buf);
            let body = match kind {
                MsgKind::Hello => Body::Hello,
                MsgKind::EchoRequest => Body::EchoRequest(buf.to_vec()),
                MsgKind::EchoReply => Body::EchoReply(buf.to_vec()),
                MsgKind::FeaturesRequest => Body::FeaturesReq,
                MsgKind::FeaturesReply => {
                    Body::FeaturesReply(SwitchFeatures::parse(table, &mut bytes)?)
                }
                MsgKind::PortStatus => Body::PortStatus(PortStatus::parse(table, &mut bytes)?),
                MsgKind::StatsRequest => {
                    let stats_type = Cursor::new(buf)
                        .read_u16::<BigEndian>()
                        .context("ofp_stats_request.type")?;
                    if stats::supported_request_type(stats_type) {
                        Body::StatsRequest(StatsReq::parse(table, &mut bytes)?)
                    } else {
                        Body::unsupported(typ, buf)
                    }
                }
                MsgKind::StatsReply => {
                    let stats_type = Cursor::new(buf)
                        .read_u16::<BigEndian>()
                        .context("ofp_stats_reply.type")?;
                    if stats::supported_reply_type(stats_type) {
                        Body::StatsReply(StatsResp::parse(table, &mut bytes)?)
                    } else {
                        Body::unsupported(typ, buf)
                    }
                }
                MsgKind::BarrierRequest => Body::BarrierRequest,
                MsgKind::BarrierReply => Body::BarrierReply,
                MsgKind::QueueGetConfigRequest => {
                    Body::QueueGetConfigRequest(QueueGetConfigRequest::parse(table, &mut bytes)?)
                }
                MsgKind::QueueGetConfigReply => {
                    Body::QueueGetConfigReply(QueueGetConfigReply::parse(table, &mut bytes)?)
                }
                MsgKind::Error |
                MsgKind::Vendor |
                MsgKind::GetConfigRequest |
                MsgKind::GetConfigReply |
                MsgKind::SetConfig |
                MsgKind::PacketIn |
                MsgKind::FlowRemoved |
                MsgKind::PacketOut |
                MsgKind::FlowMod |
                MsgKind::PortMod => Body::unsupported(typ, buf),
            };
            let consumed = match body {
                Body::EchoRequest(_) |
                Body::EchoReply(_) |
                Body::Unsupported { .. } => buf.len(),
                _ => bytes.position() as usize,
            };
            if consumed < buf.len() {
                warn!("ignoring {} bytes past the {:?} body", buf.len() - consumed, kind);
            }
            Ok(body)
        }
    }

    /// An OpenFlow message: header fields plus a body.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Message {
        pub experimental: bool,
        pub version: u8,
        pub xid: u32,
        pub body: Body,
    }

    impl Message {
        /// A non-experimental OpenFlow 1.0 message.
        pub fn new(xid: u32, body: Body) -> Message {
            Message {
                experimental: false,
                version: OFP_VERSION,
                xid: xid,
                body: body,
            }
        }
    }

    impl OfpMessage for Message {
        fn size_of(&self) -> usize {
            OfpHeader::size() + self.body.size_of()
        }

        fn header_of(&self, table: &SymbolTable) -> Result<OfpHeader, EncodeError> {
            let sizeof_buf = self.size_of();
            if sizeof_buf > u16::MAX as usize {
                return Err(EncodeError::TooLong {
                    what: "message",
                    length: sizeof_buf,
                });
            }
            Ok(OfpHeader::new(self.experimental,
                              self.version,
                              self.body.type_code(table)?,
                              sizeof_buf as u16,
                              self.xid))
        }

        fn marshal(&self, table: &SymbolTable) -> Result<Vec<u8>, EncodeError> {
            let hdr = self.header_of(table)?;
            let mut bytes = Vec::with_capacity(hdr.length());
            hdr.marshal(&mut bytes)?;
            self.body.marshal(table, &mut bytes)?;
            Ok(bytes)
        }

        fn parse(table: &SymbolTable, header: &OfpHeader, buf: &[u8]) -> Result<Message, DecodeError> {
            Ok(Message {
                experimental: header.experimental(),
                version: header.version(),
                xid: header.xid(),
                body: Body::parse(table, header.type_code(), buf)?,
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::bits::FlagSet;
        use pretty_assertions::assert_eq;

        #[test]
        fn body_type_codes() {
            let table = SymbolTable::default();
            assert_eq!(Body::Hello.type_code(&table).unwrap(), 0);
            assert_eq!(Body::BarrierReply.type_code(&table).unwrap(), 19);
            let stats = Body::StatsRequest(StatsReq {
                flags: FlagSet::new(),
                body: StatsReqBody::Desc,
            });
            assert_eq!(stats.type_code(&table).unwrap(), 16);
            let raw = Body::Unsupported {
                typ: 14,
                payload: vec![],
            };
            assert_eq!(raw.type_code(&table).unwrap(), 14);
        }

        #[test]
        fn unmapped_kind_fails_to_encode() {
            const TYPES: &[(MsgKind, u8)] = &[(MsgKind::Hello, 0)];
            let table = SymbolTable::new(&[], TYPES);
            let msg = Message::new(1, Body::EchoRequest(vec![1, 2, 3]));
            assert!(matches!(msg.marshal(&table),
                             Err(EncodeError::UnmappedMessage(MsgKind::EchoRequest))));
        }

        #[test]
        fn unwired_kinds_decode_to_unsupported() {
            let table = SymbolTable::default();
            let body = Body::parse(&table, 14, &[1, 2, 3]).unwrap();
            assert_eq!(body,
                       Body::Unsupported {
                           typ: 14,
                           payload: vec![1, 2, 3],
                       });
            assert_eq!(Body::parse(&table, 0xc8, &[]).unwrap(),
                       Body::Unsupported {
                           typ: 0xc8,
                           payload: vec![],
                       });
        }

        #[test]
        fn unknown_stats_type_is_unsupported() {
            let table = SymbolTable::default();
            // Port stats request: type 4, flags, port_no, pad.
            let buf = [0, 4, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];
            assert_eq!(Body::parse(&table, 16, &buf).unwrap(),
                       Body::Unsupported {
                           typ: 16,
                           payload: buf.to_vec(),
                       });
        }

        #[test]
        fn short_stats_body_is_truncated() {
            let table = SymbolTable::default();
            assert_eq!(Body::parse(&table, 16, &[0]),
                       Err(DecodeError::Truncated { field: "ofp_stats_request.type" }));
            assert_eq!(Body::parse(&table, 17, &[]),
                       Err(DecodeError::Truncated { field: "ofp_stats_reply.type" }));
        }

        #[test]
        fn trailing_body_bytes_are_ignored() {
            let table = SymbolTable::default();
            let req = QueueGetConfigRequest { port: 5 };
            let mut buf = vec![];
            req.marshal(&table, &mut buf).unwrap();
            buf.extend(vec![0xee; 4]);
            assert_eq!(Body::parse(&table, 20, &buf).unwrap(),
                       Body::QueueGetConfigRequest(req));
            let desc = StatsReq {
                flags: FlagSet::new(),
                body: StatsReqBody::Desc,
            };
            assert_eq!(Body::parse(&table, 16, &[0, 0, 0, 0, 0xee]).unwrap(),
                       Body::StatsRequest(desc));
        }

        #[test]
        fn empty_bodies() {
            let table = SymbolTable::default();
            for (typ, body) in vec![(0, Body::Hello),
                                    (5, Body::FeaturesReq),
                                    (18, Body::BarrierRequest),
                                    (19, Body::BarrierReply)] {
                assert_eq!(body.size_of(), 0);
                assert_eq!(Body::parse(&table, typ, &[]).unwrap(), body);
            }
        }

        #[test]
        fn header_of_counts_body() {
            let table = SymbolTable::default();
            let msg = Message::new(9, Body::EchoReply(vec![0xab; 5]));
            let header = msg.header_of(&table).unwrap();
            assert_eq!(header.length(), 13);
            assert_eq!(header.type_code(), 3);
            assert_eq!(header.xid(), 9);
        }

        #[test]
        fn oversized_message() {
            let table = SymbolTable::default();
            let msg = Message::new(9, Body::EchoRequest(vec![0; u16::MAX as usize]));
            assert!(matches!(msg.marshal(&table),
                             Err(EncodeError::TooLong { what: "message", .. })));
        }
    }
}
