//! Device-to-NodeB binding resolution.
//!
//! Each user-equipment role is either bound to one specific NodeB role or
//! left unbound. Unbound devices have broadcast semantics: they are
//! provisioned into the subscriber database of every NodeB in the run,
//! ahead of that NodeB's explicitly bound devices.

use std::collections::HashMap;
use thiserror::Error;

use crate::identity::DeviceIdentity;

/// Bucket key in the binding table.
///
/// A tagged variant instead of an empty-string sentinel: the unbound bucket
/// is a first-class key, not a magic value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingKey {
    /// Devices visible to every NodeB.
    Unbound,
    /// Devices bound to the named NodeB role.
    NodeB(String),
}

/// A device role together with its declared bound target, in declaration
/// order. Input to [`resolve`].
#[derive(Debug, Clone)]
pub struct DeclaredDevice {
    /// NodeB role id this device is bound to, if any.
    pub bound_target: Option<String>,
    pub identity: DeviceIdentity,
}

/// Binding resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("bound target '{target}' does not name an allocated NodeB role")]
    TargetNotFound { target: String },
}

/// Mapping from binding key to the devices in that bucket.
///
/// Within a bucket, devices keep the order in which their roles were
/// declared. That ordering fixes the positional indices of remote-service
/// arguments, so it is an observable contract.
#[derive(Debug, Default)]
pub struct BindingTable {
    buckets: HashMap<BindingKey, Vec<DeviceIdentity>>,
}

impl BindingTable {
    /// Devices in the unbound bucket, in declaration order.
    pub fn unbound(&self) -> &[DeviceIdentity] {
        self.buckets
            .get(&BindingKey::Unbound)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Devices bound exclusively to the given NodeB, in declaration order.
    pub fn bound_to(&self, nodeb_id: &str) -> &[DeviceIdentity] {
        self.buckets
            .get(&BindingKey::NodeB(nodeb_id.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Merged device list for one NodeB: the unbound bucket first, then the
    /// NodeB's own bucket, each internally in declaration order.
    pub fn merged(&self, nodeb_id: &str) -> Vec<&DeviceIdentity> {
        self.unbound()
            .iter()
            .chain(self.bound_to(nodeb_id).iter())
            .collect()
    }

    /// Total number of devices across all buckets.
    pub fn device_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Resolve declared devices into a binding table.
///
/// Every bound target must name one of `known_nodebs`; a target naming a
/// role that was never allocated as a NodeB (including a UE role) is a
/// fatal error and no table is produced. NodeB roles are all registered
/// before resolution runs, so declaration order between a device and its
/// target does not matter.
pub fn resolve(
    devices: &[DeclaredDevice],
    known_nodebs: &[String],
) -> Result<BindingTable, BindingError> {
    let mut table = BindingTable::default();
    for device in devices {
        let key = match &device.bound_target {
            Some(target) => {
                if !known_nodebs.iter().any(|id| id == target) {
                    return Err(BindingError::TargetNotFound {
                        target: target.clone(),
                    });
                }
                BindingKey::NodeB(target.clone())
            }
            None => BindingKey::Unbound,
        };
        table
            .buckets
            .entry(key)
            .or_default()
            .push(device.identity.clone());
    }
    Ok(table)
}
