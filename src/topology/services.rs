//! Per-node service command synthesis.
//!
//! Builds the startup commands that tune each node and push the resolved
//! identity/address/frequency arguments into the srsLTE configuration
//! scripts shipped on the disk images. Radio parameters travel as an
//! environment-variable prefix on the command line; identity tuples travel
//! as positional quoted arguments.

use std::net::Ipv4Addr;

use crate::config::RadioRoleConfig;
use crate::identity::DeviceIdentity;
use crate::topology::types::ServiceCommand;

/// Directory the provisioning scripts live in on the disk images.
pub const SCRIPT_BIN_DIR: &str = "/local/repository/bin";

/// Physical radio family behind a role; selects the tuning script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioKind {
    X310,
    B210,
}

impl RadioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadioKind::X310 => "x310",
            RadioKind::B210 => "b210",
        }
    }
}

/// Radio parameters forwarded to a node's configuration script.
#[derive(Debug, Clone, Default)]
pub struct RadioParams {
    pub dl_freq: Option<String>,
    pub ul_freq: Option<String>,
    pub prbs: Option<u32>,
    pub dl_mask: Option<String>,
    pub ul_mask: Option<String>,
}

impl From<&RadioRoleConfig> for RadioParams {
    fn from(role: &RadioRoleConfig) -> Self {
        RadioParams {
            dl_freq: role.dl_freq.clone(),
            ul_freq: role.ul_freq.clone(),
            prbs: role.prbs,
            dl_mask: role.dl_mask.clone(),
            ul_mask: role.ul_mask.clone(),
        }
    }
}

fn bash(command: String) -> ServiceCommand {
    ServiceCommand {
        shell: "bash".to_string(),
        command,
    }
}

/// `KEY=value` pairs joined into a command prefix, empty when no pair is set.
fn env_prefix(pairs: &[(&str, Option<String>)]) -> String {
    let assignments: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}={}", key, v)))
        .collect();
    if assignments.is_empty() {
        String::new()
    } else {
        format!("{} ", assignments.join(" "))
    }
}

pub fn tune_cpu() -> ServiceCommand {
    bash(format!("{}/tune-cpu.sh", SCRIPT_BIN_DIR))
}

pub fn tune_radio(kind: RadioKind) -> ServiceCommand {
    bash(format!("{}/tune-{}.sh", SCRIPT_BIN_DIR, kind.as_str()))
}

pub fn setup_stack() -> ServiceCommand {
    bash(format!("{}/setup-srslte.sh", SCRIPT_BIN_DIR))
}

/// Route the services-experiment subnets via the shared-VLAN gateway.
pub fn setup_ip_routes(gateway: Ipv4Addr, subnets: &str) -> ServiceCommand {
    bash(format!(
        "{}/setup-ip-config.sh {} '{}'",
        SCRIPT_BIN_DIR, gateway, subnets
    ))
}

/// Push one device's identity pair into the UE configuration, with the
/// role's frequencies as an environment prefix.
pub fn update_device_config(
    identity: &DeviceIdentity,
    dl_freq: Option<&str>,
    ul_freq: Option<&str>,
) -> ServiceCommand {
    let prefix = env_prefix(&[
        ("DL_FREQ", dl_freq.map(String::from)),
        ("UL_FREQ", ul_freq.map(String::from)),
    ]);
    bash(format!(
        "{}{}/update-ue-config-files.sh '{},{}'",
        prefix, SCRIPT_BIN_DIR, identity.subscriber_id, identity.equipment_id
    ))
}

/// Push the cell id and the merged device list into a NodeB configuration.
///
/// The hex cell id is derived from the NodeB's 1-based index; each merged
/// device contributes one `'ordinal,imsi,imei,address'` tuple in merged
/// order, which fixes the positional indices the EPC assigns.
pub fn update_nodeb_config(
    nodeb_index: u32,
    merged_devices: &[&DeviceIdentity],
    params: &RadioParams,
) -> ServiceCommand {
    let prefix = env_prefix(&[
        ("DL_FREQ", params.dl_freq.clone()),
        ("UL_FREQ", params.ul_freq.clone()),
        ("PRBS", params.prbs.map(|p| p.to_string())),
        ("DL_MASK", params.dl_mask.clone()),
        ("UL_MASK", params.ul_mask.clone()),
    ]);
    let device_args: Vec<String> = merged_devices
        .iter()
        .map(|d| {
            format!(
                "'{},{},{},{}'",
                d.ordinal, d.subscriber_id, d.equipment_id, d.local_address
            )
        })
        .collect();
    let mut command = format!(
        "{}{}/update-enb-config-files.sh '0x{:03x}'",
        prefix, SCRIPT_BIN_DIR, nodeb_index
    );
    for arg in &device_args {
        command.push(' ');
        command.push_str(arg);
    }
    bash(command)
}
