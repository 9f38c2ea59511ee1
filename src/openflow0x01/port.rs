use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::bits::{decode_flags_u32, encode_flags_u32, FlagSet};
use crate::error::{DecodeError, EncodeError, ReadContext};
use crate::ofp_utils::{read_fixed_size_string, read_mac, skip_padding, write_fixed_size_string,
                       write_padding_bytes};
use crate::symbols::{Namespace, SymbolTable};

use super::MessageType;

/// Byte-size of a port description block.
pub const OFP_PORT_LEN: usize = 60;
pub const OFP_MAX_PORT_NAME_LEN: usize = 16;

/// Description of a physical port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortDesc {
    pub port_no: u16,
    pub hw_addr: [u8; 6],
    pub name: String,
    pub config: FlagSet,
    pub state: FlagSet,
    pub curr: FlagSet,
    pub advertised: FlagSet,
    pub supported: FlagSet,
    pub peer: FlagSet,
    pub curr_speed: u32,
    pub max_speed: u32,
}

impl PortDesc {
    pub fn size_of(&self) -> usize {
        OFP_PORT_LEN
    }

    pub fn parse(table: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<PortDesc, DecodeError> {
        let port_no = bytes.read_u16::<BigEndian>().context("ofp_port.port_no")?;
        skip_padding(bytes, 2, "ofp_port.pad")?;
        let hw_addr = read_mac(bytes, "ofp_port.hw_addr")?;
        skip_padding(bytes, 2, "ofp_port.pad2")?;
        let name = read_fixed_size_string(bytes, OFP_MAX_PORT_NAME_LEN, "ofp_port.name")?;
        let mut flags = |ns: Namespace, field: &'static str| -> Result<FlagSet, DecodeError> {
            let d = bytes.read_u32::<BigEndian>().context(field)?;
            Ok(decode_flags_u32(table, ns, d))
        };
        let config = flags(Namespace::PortConfig, "ofp_port.config")?;
        let state = flags(Namespace::PortState, "ofp_port.state")?;
        let curr = flags(Namespace::PortCurrent, "ofp_port.curr")?;
        let advertised = flags(Namespace::PortAdvertised, "ofp_port.advertised")?;
        let supported = flags(Namespace::PortSupported, "ofp_port.supported")?;
        let peer = flags(Namespace::PortPeer, "ofp_port.peer")?;
        let curr_speed = bytes.read_u32::<BigEndian>().context("ofp_port.curr_speed")?;
        let max_speed = bytes.read_u32::<BigEndian>().context("ofp_port.max_speed")?;
        Ok(PortDesc {
            port_no: port_no,
            hw_addr: hw_addr,
            name: name,
            config: config,
            state: state,
            curr: curr,
            advertised: advertised,
            supported: supported,
            peer: peer,
            curr_speed: curr_speed,
            max_speed: max_speed,
        })
    }

    pub fn marshal(&self, table: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        bytes.write_u16::<BigEndian>(self.port_no)?;
        write_padding_bytes(bytes, 2)?;
        bytes.extend_from_slice(&self.hw_addr);
        write_padding_bytes(bytes, 2)?;
        write_fixed_size_string(bytes, &self.name, OFP_MAX_PORT_NAME_LEN)?;
        let flag_fields = [(Namespace::PortConfig, &self.config),
                           (Namespace::PortState, &self.state),
                           (Namespace::PortCurrent, &self.curr),
                           (Namespace::PortAdvertised, &self.advertised),
                           (Namespace::PortSupported, &self.supported),
                           (Namespace::PortPeer, &self.peer)];
        for (ns, flags) in flag_fields.iter() {
            bytes.write_u32::<BigEndian>(encode_flags_u32(table, *ns, flags.iter())?)?;
        }
        bytes.write_u32::<BigEndian>(self.curr_speed)?;
        bytes.write_u32::<BigEndian>(self.max_speed)?;
        Ok(())
    }
}

/// What changed about a physical port.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PortReason {
    PortAdd,
    PortDelete,
    PortModify,
}

impl PortReason {
    fn of_int(d: u8) -> Result<PortReason, DecodeError> {
        match d {
            0 => Ok(PortReason::PortAdd),
            1 => Ok(PortReason::PortDelete),
            2 => Ok(PortReason::PortModify),
            _ => {
                Err(DecodeError::UnexpectedValue {
                    field: "ofp_port_status.reason",
                    value: d as u64,
                })
            }
        }
    }
}

/// A physical port has changed in the datapath.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortStatus {
    pub reason: PortReason,
    pub desc: PortDesc,
}

impl MessageType for PortStatus {
    fn size_of(&self) -> usize {
        8 + OFP_PORT_LEN
    }

    fn parse(table: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<PortStatus, DecodeError> {
        let reason = PortReason::of_int(bytes.read_u8().context("ofp_port_status.reason")?)?;
        skip_padding(bytes, 7, "ofp_port_status.pad")?;
        let desc = PortDesc::parse(table, bytes)?;
        Ok(PortStatus {
            reason: reason,
            desc: desc,
        })
    }

    fn marshal(&self, table: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        bytes.write_u8(self.reason as u8)?;
        write_padding_bytes(bytes, 7)?;
        self.desc.marshal(table, bytes)
    }
}
