//! Device identity synthesis.
//!
//! This module derives the per-device identity tuple (subscriber id,
//! equipment id, local tunnel address) handed to the srsLTE configuration
//! scripts. Identities embed a per-run random salt so that concurrent
//! deployments sharing a radio environment do not collide on IMSI/IMEI.

use serde::Serialize;
use std::net::Ipv4Addr;

/// Operator prefix for subscriber ids (test PLMN 001/01).
pub const SUBSCRIBER_PREFIX: &str = "001010";

/// Type allocation prefix for equipment ids.
pub const EQUIPMENT_PREFIX: &str = "353490";

/// Base of the private subnet device tunnel addresses are carved from.
const DEVICE_SUBNET_BASE: Ipv4Addr = Ipv4Addr::new(192, 168, 0, 0);

/// Host offset added to the device ordinal inside the tunnel subnet.
const DEVICE_HOST_OFFSET: u32 = 10;

/// Per-run random salt embedded into every synthesized identity.
///
/// The salt is drawn once per compilation run; all devices in the run share
/// it, and the per-device ordinal provides uniqueness within the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentitySalt(u32);

impl IdentitySalt {
    /// Draw a fresh salt in `[0, 1_000_000)` from the thread RNG.
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        IdentitySalt(rng.gen_range(0..1_000_000))
    }

    /// Build a salt from a fixed value, reduced into the valid range.
    ///
    /// Useful for reproducing a previous run or pinning tests.
    pub fn from_value(value: u32) -> Self {
        IdentitySalt(value % 1_000_000)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Synthesized identity tuple for one user-equipment role.
///
/// Immutable once created; the ordinal is unique among all devices in a run
/// and doubles as the positional index in remote-service arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    /// 1-based device ordinal, unique within the run.
    pub ordinal: u32,
    /// 15-digit subscriber id (IMSI): operator prefix + salt + ordinal.
    pub subscriber_id: String,
    /// 15-digit equipment id (IMEI): type prefix + salt + ordinal.
    pub equipment_id: String,
    /// Tunnel address the device is reachable at once attached.
    pub local_address: Ipv4Addr,
}

/// Synthesize the identity tuple for the device with the given ordinal.
///
/// Pure function of `(ordinal, salt)`: distinct ordinals under one salt
/// always yield distinct subscriber and equipment ids because the ordinal
/// is embedded verbatim in both.
pub fn synthesize(ordinal: u32, salt: &IdentitySalt) -> DeviceIdentity {
    let subscriber_id = format!("{}{:06}{:03}", SUBSCRIBER_PREFIX, salt.value(), ordinal);
    let equipment_id = format!("{}{:06}{:03}", EQUIPMENT_PREFIX, salt.value(), ordinal);
    // Integer addition on the subnet base: ordinals past the last octet
    // carry into the third octet instead of truncating.
    let host = u32::from(DEVICE_SUBNET_BASE) + ordinal + DEVICE_HOST_OFFSET;
    DeviceIdentity {
        ordinal,
        subscriber_id,
        equipment_id,
        local_address: Ipv4Addr::from(host),
    }
}
