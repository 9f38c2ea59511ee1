use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::error::{DecodeError, EncodeError, ReadContext};
use crate::ofp_utils::{remaining, skip_padding, write_padding_bytes};
use crate::symbols::SymbolTable;

use super::MessageType;

const OFP_PACKET_QUEUE_LEN: usize = 8;
const OFP_QUEUE_PROP_HEADER_LEN: usize = 8;
const OFP_QUEUE_PROP_MIN_RATE_LEN: usize = 16;

const OFPQT_MIN_RATE: u16 = 1;

/// A property of a queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueueProperty {
    /// Minimum datarate guaranteed, in 1/10 of a percent.
    MinRate { rate: u16 },
}

impl QueueProperty {
    fn size_of(&self) -> usize {
        match *self {
            QueueProperty::MinRate { .. } => OFP_QUEUE_PROP_MIN_RATE_LEN,
        }
    }

    fn marshal(&self, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        match *self {
            QueueProperty::MinRate { rate } => {
                bytes.write_u16::<BigEndian>(OFPQT_MIN_RATE)?;
                bytes.write_u16::<BigEndian>(OFP_QUEUE_PROP_MIN_RATE_LEN as u16)?;
                write_padding_bytes(bytes, 4)?;
                bytes.write_u16::<BigEndian>(rate)?;
                write_padding_bytes(bytes, 6)?;
            }
        }
        Ok(())
    }

    /// Parse one property out of the next `available` bytes. Property kinds this codec
    /// does not know are skipped over and yield `None`.
    fn parse(bytes: &mut Cursor<&[u8]>, available: usize) -> Result<Option<QueueProperty>, DecodeError> {
        let typ = bytes.read_u16::<BigEndian>().context("ofp_queue_prop_header.property")?;
        let len = bytes.read_u16::<BigEndian>().context("ofp_queue_prop_header.len")? as usize;
        if len < OFP_QUEUE_PROP_HEADER_LEN || len > available {
            return Err(DecodeError::BadLength {
                what: "queue property",
                declared: len,
                available: available,
            });
        }
        skip_padding(bytes, 4, "ofp_queue_prop_header.pad")?;
        match typ {
            OFPQT_MIN_RATE => {
                if len != OFP_QUEUE_PROP_MIN_RATE_LEN {
                    return Err(DecodeError::BadLength {
                        what: "min rate queue property",
                        declared: len,
                        available: OFP_QUEUE_PROP_MIN_RATE_LEN,
                    });
                }
                let rate = bytes.read_u16::<BigEndian>().context("ofp_queue_prop_min_rate.rate")?;
                skip_padding(bytes, 6, "ofp_queue_prop_min_rate.pad")?;
                Ok(Some(QueueProperty::MinRate { rate: rate }))
            }
            t => {
                debug!("skipping queue property of type {} ({} bytes)", t, len);
                skip_padding(bytes, len - OFP_QUEUE_PROP_HEADER_LEN, "ofp_queue_prop")?;
                Ok(None)
            }
        }
    }
}

/// A queue attached to a port, with its configured properties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketQueue {
    pub queue_id: u32,
    pub properties: Vec<QueueProperty>,
}

impl PacketQueue {
    pub fn size_of(&self) -> usize {
        OFP_PACKET_QUEUE_LEN + self.properties.iter().map(QueueProperty::size_of).sum::<usize>()
    }

    pub fn marshal(&self, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        let len = self.size_of();
        if len > u16::MAX as usize {
            return Err(EncodeError::TooLong {
                what: "packet queue",
                length: len,
            });
        }
        bytes.write_u32::<BigEndian>(self.queue_id)?;
        bytes.write_u16::<BigEndian>(len as u16)?;
        write_padding_bytes(bytes, 2)?;
        for prop in &self.properties {
            prop.marshal(bytes)?;
        }
        Ok(())
    }

    /// Parse one queue, consuming exactly the number of bytes its length field declares.
    pub fn parse(bytes: &mut Cursor<&[u8]>) -> Result<PacketQueue, DecodeError> {
        let queue_id = bytes.read_u32::<BigEndian>().context("ofp_packet_queue.queue_id")?;
        let len = bytes.read_u16::<BigEndian>().context("ofp_packet_queue.len")? as usize;
        skip_padding(bytes, 2, "ofp_packet_queue.pad")?;
        let available = remaining(bytes);
        if len < OFP_PACKET_QUEUE_LEN || len - OFP_PACKET_QUEUE_LEN > available {
            return Err(DecodeError::BadLength {
                what: "packet queue",
                declared: len,
                available: available + OFP_PACKET_QUEUE_LEN,
            });
        }
        let end = bytes.position() as usize + len - OFP_PACKET_QUEUE_LEN;
        let mut properties = vec![];
        while (bytes.position() as usize) < end {
            let left = end - bytes.position() as usize;
            if let Some(prop) = QueueProperty::parse(bytes, left)? {
                properties.push(prop);
            }
        }
        Ok(PacketQueue {
            queue_id: queue_id,
            properties: properties,
        })
    }

    /// Parse queues until `bytes` is exhausted.
    pub fn parse_sequence(bytes: &mut Cursor<&[u8]>) -> Result<Vec<PacketQueue>, DecodeError> {
        let mut queues = vec![];
        while remaining(bytes) > 0 {
            queues.push(PacketQueue::parse(bytes)?);
        }
        Ok(queues)
    }
}

/// Query for the queues configured on a port.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueueGetConfigRequest {
    pub port: u16,
}

impl MessageType for QueueGetConfigRequest {
    fn size_of(&self) -> usize {
        4
    }

    fn parse(_: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<QueueGetConfigRequest, DecodeError> {
        let port = bytes.read_u16::<BigEndian>().context("ofp_queue_get_config_request.port")?;
        skip_padding(bytes, 2, "ofp_queue_get_config_request.pad")?;
        Ok(QueueGetConfigRequest { port: port })
    }

    fn marshal(&self, _: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        bytes.write_u16::<BigEndian>(self.port)?;
        write_padding_bytes(bytes, 2)
    }
}

/// Queues configured on a port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueGetConfigReply {
    pub port: u16,
    pub queues: Vec<PacketQueue>,
}

impl MessageType for QueueGetConfigReply {
    fn size_of(&self) -> usize {
        8 + self.queues.iter().map(PacketQueue::size_of).sum::<usize>()
    }

    fn parse(_: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<QueueGetConfigReply, DecodeError> {
        let port = bytes.read_u16::<BigEndian>().context("ofp_queue_get_config_reply.port")?;
        skip_padding(bytes, 6, "ofp_queue_get_config_reply.pad")?;
        let queues = PacketQueue::parse_sequence(bytes)?;
        Ok(QueueGetConfigReply {
            port: port,
            queues: queues,
        })
    }

    fn marshal(&self, _: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        bytes.write_u16::<BigEndian>(self.port)?;
        write_padding_bytes(bytes, 6)?;
        for queue in &self.queues {
            queue.marshal(bytes)?;
        }
        Ok(())
    }
}
