use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::bits::{decode_flags_u32, encode_flags_u32, FlagSet};
use crate::error::{DecodeError, EncodeError, ReadContext};
use crate::ofp_utils::{remaining, skip_padding, write_padding_bytes};
use crate::symbols::{Namespace, SymbolTable};

use super::port::{PortDesc, OFP_PORT_LEN};
use super::MessageType;

const OFP_SWITCH_FEATURES_LEN: usize = 24;

/// Switch features.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchFeatures {
    pub datapath_id: u64,
    pub num_buffers: u32,
    pub num_tables: u8,
    pub supported_capabilities: FlagSet,
    pub supported_actions: FlagSet,
    pub ports: Vec<PortDesc>,
}

impl MessageType for SwitchFeatures {
    fn size_of(&self) -> usize {
        let pds: usize = self.ports.iter().map(PortDesc::size_of).sum();
        OFP_SWITCH_FEATURES_LEN + pds
    }

    fn parse(table: &SymbolTable, bytes: &mut Cursor<&[u8]>) -> Result<SwitchFeatures, DecodeError> {
        let datapath_id = bytes.read_u64::<BigEndian>().context("ofp_switch_features.datapath_id")?;
        let num_buffers = bytes.read_u32::<BigEndian>().context("ofp_switch_features.n_buffers")?;
        let num_tables = bytes.read_u8().context("ofp_switch_features.n_tables")?;
        skip_padding(bytes, 3, "ofp_switch_features.pad")?;
        let supported_capabilities = {
            let d = bytes.read_u32::<BigEndian>().context("ofp_switch_features.capabilities")?;
            decode_flags_u32(table, Namespace::Capabilities, d)
        };
        let supported_actions = {
            let d = bytes.read_u32::<BigEndian>().context("ofp_switch_features.actions")?;
            decode_flags_u32(table, Namespace::Actions, d)
        };
        let left = remaining(bytes);
        if left % OFP_PORT_LEN != 0 {
            return Err(DecodeError::BadLength {
                what: "switch features port list",
                declared: left - left % OFP_PORT_LEN + OFP_PORT_LEN,
                available: left,
            });
        }
        let mut ports = vec![];
        for _ in 0..left / OFP_PORT_LEN {
            ports.push(PortDesc::parse(table, bytes)?);
        }
        Ok(SwitchFeatures {
            datapath_id: datapath_id,
            num_buffers: num_buffers,
            num_tables: num_tables,
            supported_capabilities: supported_capabilities,
            supported_actions: supported_actions,
            ports: ports,
        })
    }

    fn marshal(&self, table: &SymbolTable, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
        bytes.write_u64::<BigEndian>(self.datapath_id)?;
        bytes.write_u32::<BigEndian>(self.num_buffers)?;
        bytes.write_u8(self.num_tables)?;
        write_padding_bytes(bytes, 3)?;
        bytes.write_u32::<BigEndian>(encode_flags_u32(table,
                                                      Namespace::Capabilities,
                                                      &self.supported_capabilities)?)?;
        bytes.write_u32::<BigEndian>(encode_flags_u32(table,
                                                      Namespace::Actions,
                                                      &self.supported_actions)?)?;
        for port in &self.ports {
            port.marshal(table, bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openflow0x01::port::tests::port_desc;
    use pretty_assertions::assert_eq;

    fn switch_features() -> SwitchFeatures {
        let mut second = port_desc();
        second.port_no = 2;
        second.name = "eth1".to_string();
        SwitchFeatures {
            datapath_id: 0x0011_2233_4455_6677,
            num_buffers: 256,
            num_tables: 2,
            supported_capabilities: ["flow_stats", "port_stats", "arp_match_ip"]
                .iter()
                .cloned()
                .collect(),
            supported_actions: ["output", "enqueue"].iter().cloned().collect(),
            ports: vec![port_desc(), second],
        }
    }

    #[test]
    fn features_round_trip() {
        let table = SymbolTable::default();
        let features = switch_features();
        let mut bytes = vec![];
        features.marshal(&table, &mut bytes).unwrap();
        assert_eq!(bytes.len(), features.size_of());
        assert_eq!(&bytes[16..24], &[0, 0, 0, 0x85, 0, 0, 0x08, 0x01]);
        let mut cursor = Cursor::new(&bytes[..]);
        assert_eq!(SwitchFeatures::parse(&table, &mut cursor).unwrap(), features);
    }

    #[test]
    fn partial_port_is_rejected() {
        let table = SymbolTable::default();
        let mut bytes = vec![];
        switch_features().marshal(&table, &mut bytes).unwrap();
        bytes.truncate(bytes.len() - 10);
        let mut cursor = Cursor::new(&bytes[..]);
        assert_eq!(SwitchFeatures::parse(&table, &mut cursor),
                   Err(DecodeError::BadLength {
                       what: "switch features port list",
                       declared: 120,
                       available: 110,
                   }));
    }
}
