//! Device registry sidecar.
//!
//! Alongside the topology document, a JSON registry of every synthesized
//! device identity is written so that operators can correlate IMSIs seen
//! at the EPC with the roles that produced them.

use serde::Serialize;
use std::net::Ipv4Addr;

use crate::binding::DeclaredDevice;

/// One synthesized device, in declaration order.
#[derive(Serialize, Debug)]
pub struct DeviceRecord {
    pub ordinal: u32,
    pub subscriber_id: String,
    pub equipment_id: String,
    pub local_address: Ipv4Addr,
    /// NodeB role id the device is bound to, or `any`.
    pub serving: String,
}

/// Registry of all devices in the run.
#[derive(Serialize, Debug)]
pub struct DeviceRegistry {
    pub devices: Vec<DeviceRecord>,
}

/// Build the registry from the declared devices of one run.
pub fn build_device_registry(devices: &[DeclaredDevice]) -> DeviceRegistry {
    let devices = devices
        .iter()
        .map(|d| DeviceRecord {
            ordinal: d.identity.ordinal,
            subscriber_id: d.identity.subscriber_id.clone(),
            equipment_id: d.identity.equipment_id.clone(),
            local_address: d.identity.local_address,
            serving: d
                .bound_target
                .clone()
                .unwrap_or_else(|| "any".to_string()),
        })
        .collect();
    DeviceRegistry { devices }
}
