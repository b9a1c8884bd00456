use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::Ipv4Addr;

use crate::utils::validation::{is_valid_frequency, is_valid_prb_mask};

/// Default disk image for compute nodes.
pub const DEFAULT_DISK_IMAGE: &str =
    "urn:publicid:IDN+emulab.net+image+emulab-ops//UBUNTU22-64-GR310";

/// Default hardware type for the compute node paired with a split radio.
pub const DEFAULT_COMPUTE_NODE_TYPE: &str = "d430";

/// Role a radio plays in the deployment
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    /// Base station terminating the radio link toward UE roles
    NodeB,
    /// User-equipment role representing a mobile device client
    #[serde(rename = "UE")]
    Ue,
}

/// Selector for the physical radio a role is allocated on.
///
/// Either a specific radio id, or a candidate list meaning "pick any";
/// resolved exactly once before assembly begins.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum NodeSelector {
    /// A specific radio, e.g. `ota-x310-1`.
    Specific(String),
    /// Any radio from the candidate list; an empty list leaves the choice
    /// to the provisioner.
    AnyOf { any_of: Vec<String> },
}

impl NodeSelector {
    /// Resolve this selector against the set of radio ids already claimed
    /// in this run. A specific id is claimed as-is; a candidate list yields
    /// the first unclaimed candidate. `None` means the provisioner is free
    /// to choose (empty candidate list), `Some` claims the returned id.
    pub fn resolve(&self, claimed: &mut HashSet<String>) -> Result<Option<String>, ValidationError> {
        match self {
            NodeSelector::Specific(id) => {
                if !claimed.insert(id.clone()) {
                    return Err(ValidationError::InvalidRole(format!(
                        "radio '{}' is claimed by more than one role",
                        id
                    )));
                }
                Ok(Some(id.clone()))
            }
            NodeSelector::AnyOf { any_of } => {
                if any_of.is_empty() {
                    return Ok(None);
                }
                for candidate in any_of {
                    if !claimed.contains(candidate) {
                        claimed.insert(candidate.clone());
                        return Ok(Some(candidate.clone()));
                    }
                }
                Err(ValidationError::InvalidRole(format!(
                    "no unclaimed radio among candidates [{}]",
                    any_of.join(", ")
                )))
            }
        }
    }
}

/// Unified deployment configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub general: GeneralSettings,
    /// Roles backed by an external radio with a separate compute node.
    #[serde(default)]
    pub split_radio_roles: Vec<RadioRoleConfig>,
    /// Roles backed by a radio integrated into the compute node.
    #[serde(default)]
    pub integrated_radio_roles: Vec<RadioRoleConfig>,
    /// Auto-allocated controlled-RF NodeB + UE group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<MatrixSettings>,
}

/// Global deployment settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneralSettings {
    /// Name of a pre-existing shared VLAN to attach NodeB nodes to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_vlan_name: Option<String>,
    /// Subnet mask for shared VLAN interfaces.
    #[serde(default = "default_shared_vlan_netmask")]
    pub shared_vlan_netmask: Ipv4Addr,
    /// Gateway address of the adjacent services experiment on the shared VLAN.
    #[serde(default = "default_services_gateway")]
    pub services_gateway: Ipv4Addr,
    /// Space-separated CIDR subnets routed via the services gateway.
    #[serde(default = "default_services_subnets")]
    pub services_subnets: String,
    /// Multiplex links over physical interfaces using VLANs.
    #[serde(default = "default_true")]
    pub multiplex_networks: bool,
    /// Install VNC on compute nodes.
    #[serde(default = "default_true")]
    pub install_vnc: bool,
}

fn default_shared_vlan_netmask() -> Ipv4Addr {
    Ipv4Addr::new(255, 255, 255, 0)
}

fn default_services_gateway() -> Ipv4Addr {
    Ipv4Addr::new(10, 254, 254, 1)
}

fn default_services_subnets() -> String {
    "10.96.0.0/12".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            shared_vlan_name: None,
            shared_vlan_netmask: default_shared_vlan_netmask(),
            services_gateway: default_services_gateway(),
            services_subnets: default_services_subnets(),
            multiplex_networks: true,
            install_vnc: true,
        }
    }
}

/// One declared radio role (NodeB or UE)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RadioRoleConfig {
    /// The radio this role is allocated on.
    pub radio: NodeSelector,
    /// Hardware type of the paired compute node (split-radio roles only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_image: Option<String>,
    pub role: RoleKind,
    /// If this is a UE, provision its identity only into the named NodeB.
    /// Leave unset to provision it into every NodeB in the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_to: Option<String>,
    /// Explicit shared VLAN address; derived from the services gateway when
    /// unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_vlan_address: Option<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dl_freq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ul_freq: Option<String>,
    /// Bandwidth in physical resource blocks (NodeB only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prbs: Option<u32>,
    /// DL RBG mask bit string (NodeB only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dl_mask: Option<String>,
    /// UL PRB mask bit string (NodeB only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ul_mask: Option<String>,
}

/// Controlled-RF matrix group settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatrixSettings {
    /// Number of controlled-RF UEs to allocate; 0 disables the group.
    #[serde(default)]
    pub ue_count: u32,
    /// NodeB radio selector; unset lets the provisioner choose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodeb: Option<NodeSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_vlan_address: Option<Ipv4Addr>,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid role configuration: {0}")]
    InvalidRole(String),
    #[error("Invalid matrix configuration: {0}")]
    InvalidMatrix(String),
}

impl DeploymentConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        for role in &self.split_radio_roles {
            if let NodeSelector::AnyOf { any_of } = &role.radio {
                if any_of.is_empty() {
                    return Err(ValidationError::InvalidRole(
                        "split-radio role needs a specific radio or a candidate list".to_string(),
                    ));
                }
            }
            self.validate_role(role)?;
        }
        for role in &self.integrated_radio_roles {
            if let NodeSelector::AnyOf { any_of } = &role.radio {
                if any_of.is_empty() {
                    return Err(ValidationError::InvalidRole(
                        "integrated-radio role needs a specific radio or a candidate list"
                            .to_string(),
                    ));
                }
            }
            self.validate_role(role)?;
        }

        self.validate_unique_radios()?;

        if let Some(matrix) = &self.matrix {
            if matrix.ue_count == 0 && matrix.nodeb.is_some() {
                return Err(ValidationError::InvalidMatrix(
                    "a NodeB radio is selected but ue_count is 0".to_string(),
                ));
            }
            if matrix.shared_vlan_address.is_some() && self.general.shared_vlan_name.is_none() {
                return Err(ValidationError::InvalidMatrix(
                    "shared_vlan_address requires a shared_vlan_name".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_role(&self, role: &RadioRoleConfig) -> Result<(), ValidationError> {
        match role.role {
            RoleKind::NodeB => {
                if role.prbs.is_none() {
                    return Err(ValidationError::InvalidRole(
                        "NodeB role requires a PRB count".to_string(),
                    ));
                }
                if role.bind_to.is_some() {
                    return Err(ValidationError::InvalidRole(
                        "bind_to is only valid on UE roles".to_string(),
                    ));
                }
            }
            RoleKind::Ue => {
                if role.prbs.is_some() || role.dl_mask.is_some() || role.ul_mask.is_some() {
                    return Err(ValidationError::InvalidRole(
                        "PRB and mask parameters are only valid on NodeB roles".to_string(),
                    ));
                }
            }
        }

        for freq in [&role.dl_freq, &role.ul_freq].into_iter().flatten() {
            if !is_valid_frequency(freq) {
                return Err(ValidationError::InvalidRole(format!(
                    "'{}' is not a valid frequency",
                    freq
                )));
            }
        }
        for mask in [&role.dl_mask, &role.ul_mask].into_iter().flatten() {
            if !is_valid_prb_mask(mask) {
                return Err(ValidationError::InvalidRole(format!(
                    "'{}' is not a valid PRB mask",
                    mask
                )));
            }
        }

        if role.shared_vlan_address.is_some() && self.general.shared_vlan_name.is_none() {
            return Err(ValidationError::InvalidRole(
                "shared_vlan_address requires a shared_vlan_name".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_unique_radios(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        let roles = self
            .split_radio_roles
            .iter()
            .chain(self.integrated_radio_roles.iter());
        for role in roles {
            if let NodeSelector::Specific(id) = &role.radio {
                if !seen.insert(id.as_str()) {
                    return Err(ValidationError::InvalidRole(format!(
                        "radio '{}' is declared by more than one role",
                        id
                    )));
                }
            }
        }
        Ok(())
    }
}
