//! Configuration descriptor walk used to classify attached peripherals.

#![deny(static_mut_refs)]

use thiserror::Error;
use tracing::debug;

use crate::types::ProtocolFamily;

const DESCRIPTOR_CONFIGURATION: u8 = 0x02;
const DESCRIPTOR_INTERFACE: u8 = 0x04;
const DESCRIPTOR_ENDPOINT: u8 = 0x05;
const INTERFACE_DESCRIPTOR_LEN: usize = 9;
const ENDPOINT_DESCRIPTOR_LEN: usize = 7;
const TRANSFER_TYPE_MASK: u8 = 0x03;
const TRANSFER_INTERRUPT: u8 = 0x03;
const DIRECTION_IN: u8 = 0x80;

/// Errors raised while walking a configuration descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The buffer does not start with a configuration descriptor.
    #[error("not a configuration descriptor (type {0:#04x})")]
    NotConfiguration(u8),
    /// A descriptor header claims more bytes than are available.
    #[error("descriptor at offset {offset} is truncated")]
    Truncated {
        /// Byte offset of the offending descriptor.
        offset: usize,
    },
    /// A descriptor has a zero or one byte length and the walk cannot advance.
    #[error("descriptor at offset {offset} has invalid length {length}")]
    InvalidLength {
        /// Byte offset of the offending descriptor.
        offset: usize,
        /// Declared `bLength`.
        length: u8,
    },
}

/// One interface discovered during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveredInterface {
    /// `bInterfaceNumber`.
    pub number: u8,
    /// `bInterfaceClass`.
    pub class: u8,
    /// `bInterfaceSubClass`.
    pub subclass: u8,
    /// `bInterfaceProtocol`.
    pub protocol: u8,
    /// Classification of the interface.
    pub family: ProtocolFamily,
    /// First interrupt IN endpoint address, if any.
    pub in_endpoint: Option<u8>,
    /// First interrupt OUT endpoint address, if any.
    pub out_endpoint: Option<u8>,
}

/// Walk a full configuration descriptor and classify every interface.
///
/// Only alternate setting 0 of each interface is reported.
pub fn parse_configuration(
    data: &[u8],
    vendor_id: u16,
) -> Result<Vec<DiscoveredInterface>, DescriptorError> {
    match data.get(1) {
        Some(&DESCRIPTOR_CONFIGURATION) => {}
        Some(&other) => return Err(DescriptorError::NotConfiguration(other)),
        None => return Err(DescriptorError::Truncated { offset: 0 }),
    }

    let mut interfaces: Vec<DiscoveredInterface> = Vec::new();
    let mut current: Option<DiscoveredInterface> = None;
    let mut offset = 0usize;

    while offset < data.len() {
        let length = data[offset];
        if length < 2 {
            return Err(DescriptorError::InvalidLength { offset, length });
        }
        let end = offset + usize::from(length);
        let descriptor = data
            .get(offset..end)
            .ok_or(DescriptorError::Truncated { offset })?;

        match descriptor[1] {
            DESCRIPTOR_INTERFACE if descriptor.len() >= INTERFACE_DESCRIPTOR_LEN => {
                interfaces.extend(current.take());
                if descriptor[3] == 0 {
                    let (number, num_endpoints) = (descriptor[2], descriptor[4]);
                    let (class, subclass, protocol) = (descriptor[5], descriptor[6], descriptor[7]);
                    current = Some(DiscoveredInterface {
                        number,
                        class,
                        subclass,
                        protocol,
                        family: ProtocolFamily::classify(
                            class,
                            subclass,
                            protocol,
                            num_endpoints,
                            number,
                            vendor_id,
                        ),
                        in_endpoint: None,
                        out_endpoint: None,
                    });
                }
            }
            DESCRIPTOR_ENDPOINT if descriptor.len() >= ENDPOINT_DESCRIPTOR_LEN => {
                if let Some(iface) = current.as_mut() {
                    let (address, attributes) = (descriptor[2], descriptor[3]);
                    if attributes & TRANSFER_TYPE_MASK == TRANSFER_INTERRUPT {
                        let slot = if address & DIRECTION_IN != 0 {
                            &mut iface.in_endpoint
                        } else {
                            &mut iface.out_endpoint
                        };
                        if slot.is_none() {
                            *slot = Some(address);
                        }
                    }
                }
            }
            _ => {}
        }
        offset = end;
    }
    interfaces.extend(current.take());

    for iface in &interfaces {
        debug!(
            interface = iface.number,
            family = %iface.family,
            "classified interface {:02x}/{:02x}/{:02x}",
            iface.class,
            iface.subclass,
            iface.protocol
        );
    }
    Ok(interfaces)
}
