//! Offset-based IP address allocation.
//!
//! This file contains the subnet allocation algorithm used to derive
//! shared-VLAN addresses for NodeB roles: integer addition of a per-role
//! offset to a subnet base address, validated against the netmask.

use std::net::Ipv4Addr;
use thiserror::Error;

/// Allocation failed because the offset left the base address's subnet.
///
/// This is a hard failure: an address outside the shared subnet would put
/// the node on the wrong network, so the caller must pick a larger subnet
/// or a smaller offset and re-invoke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("insufficient space in netmask {mask} to advance {base} by {offset}")]
pub struct AllocationError {
    pub base: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub offset: u32,
}

/// Compute the address at `offset` from `base` inside the subnet `mask`.
///
/// `base` and `mask` are interpreted as 32-bit big-endian values and the
/// offset is added arithmetically, so the candidate may carry across octet
/// boundaries. The result is valid only if it still lies in `base`'s
/// network under `mask`; otherwise the allocation fails.
pub fn allocate(base: Ipv4Addr, mask: Ipv4Addr, offset: u32) -> Result<Ipv4Addr, AllocationError> {
    let base_bits = u32::from(base);
    let mask_bits = u32::from(mask);
    let candidate = base_bits.wrapping_add(offset);
    if base_bits & mask_bits != candidate & mask_bits {
        return Err(AllocationError { base, mask, offset });
    }
    Ok(Ipv4Addr::from(candidate))
}
