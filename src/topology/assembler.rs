//! Topology assembly.
//!
//! One deterministic pass over the declared roles: indices are assigned in
//! declaration order, identities are synthesized per device, shared-VLAN
//! addresses are allocated per NodeB, and the binding table is resolved
//! before the NodeB service commands are emitted. Any allocation or
//! binding failure aborts the run without a partial topology.

use log::{debug, info};
use std::collections::HashSet;
use std::net::Ipv4Addr;

use crate::binding::{self, DeclaredDevice};
use crate::config::{
    DeploymentConfig, GeneralSettings, MatrixSettings, RadioRoleConfig, RoleKind,
    ValidationError, DEFAULT_COMPUTE_NODE_TYPE, DEFAULT_DISK_IMAGE,
};
use crate::identity::{synthesize, IdentitySalt};
use crate::ip::allocate;
use crate::registry::{build_device_registry, DeviceRegistry};
use crate::topology::services::{self, RadioKind, RadioParams};
use crate::topology::types::{
    Desire, Interface, InterfaceAddress, Link, LinkEndpoint, LinkKind, Node, TopologyGraph,
};
use crate::topology::CompileError;

/// Authority managing the testbed components.
pub const COMPONENT_MANAGER_ID: &str = "urn:publicid:IDN+emulab.net+authority+cm";

/// Hardware type of the controlled-RF NUCs in the matrix.
pub const CONTROLLED_RF_HWTYPE: &str = "nuc5300";

/// Address of the compute-side interface on a split-radio link.
const RADIO_IF_ADDRESS: Ipv4Addr = Ipv4Addr::new(192, 168, 40, 1);
const RADIO_IF_NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Bandwidth of the dedicated compute-to-radio link.
const RADIO_LINK_BANDWIDTH_KBPS: u64 = 10_000_000;

/// The result of one compilation run.
#[derive(Debug)]
pub struct Compilation {
    pub graph: TopologyGraph,
    pub registry: DeviceRegistry,
}

/// The two 1-based index counters for a run.
///
/// Both increment in declaration order across all role groups; the index
/// spaces are independent of each other.
#[derive(Debug, Default)]
struct RoleCounters {
    nodeb: u32,
    device: u32,
}

impl RoleCounters {
    fn next_nodeb(&mut self) -> u32 {
        self.nodeb += 1;
        self.nodeb
    }

    fn next_device(&mut self) -> u32 {
        self.device += 1;
        self.device
    }
}

/// A NodeB allocated during the role walk, pending service emission.
struct NodeBRecord {
    /// Binding key: the radio id, or the generated matrix NodeB name.
    key: String,
    /// Index of the NodeB's compute node in the graph's node list.
    node_index: usize,
    nodeb_index: u32,
    radio_kind: RadioKind,
    params: RadioParams,
}

/// Working state of one compilation run; owns the counters and the
/// intermediate role records until the graph is sealed.
struct Assembler<'a> {
    general: &'a GeneralSettings,
    salt: IdentitySalt,
    counters: RoleCounters,
    claimed_radios: HashSet<String>,
    nodes: Vec<Node>,
    links: Vec<Link>,
    nodebs: Vec<NodeBRecord>,
    devices: Vec<DeclaredDevice>,
}

/// Compile a deployment with a fresh per-run identity salt.
pub fn compile(config: &DeploymentConfig) -> Result<Compilation, CompileError> {
    compile_with_salt(config, IdentitySalt::generate())
}

/// Compile a deployment with a caller-supplied salt.
///
/// Given the same configuration and salt, the output is structurally
/// identical across invocations.
pub fn compile_with_salt(
    config: &DeploymentConfig,
    salt: IdentitySalt,
) -> Result<Compilation, CompileError> {
    config.validate()?;

    let mut assembler = Assembler {
        general: &config.general,
        salt,
        counters: RoleCounters::default(),
        claimed_radios: HashSet::new(),
        nodes: Vec::new(),
        links: Vec::new(),
        nodebs: Vec::new(),
        devices: Vec::new(),
    };

    for role in &config.split_radio_roles {
        assembler.assemble_split_role(role)?;
    }
    for role in &config.integrated_radio_roles {
        assembler.assemble_integrated_role(role)?;
    }
    if let Some(matrix) = &config.matrix {
        if matrix.ue_count > 0 {
            assembler.assemble_matrix_group(matrix)?;
        }
    }

    assembler.seal()
}

impl Assembler<'_> {
    /// A role backed by an external radio: a compute node plus a separate
    /// radio node, joined by a dedicated point-to-point link.
    fn assemble_split_role(&mut self, role: &RadioRoleConfig) -> Result<(), CompileError> {
        let radio_id = self.resolve_radio(role)?;
        let node_name = format!("{}-comp", radio_id);
        let radio_if = format!("{}-usrp-if", node_name);

        let mut node = Node {
            name: node_name.clone(),
            hardware_type: Some(
                role.node_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COMPUTE_NODE_TYPE.to_string()),
            ),
            disk_image: Some(
                role.disk_image
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DISK_IMAGE.to_string()),
            ),
            component_id: None,
            component_manager_id: Some(COMPONENT_MANAGER_ID.to_string()),
            desires: vec![],
            interfaces: vec![Interface {
                name: radio_if.clone(),
                addresses: vec![InterfaceAddress {
                    address: RADIO_IF_ADDRESS,
                    netmask: RADIO_IF_NETMASK,
                }],
            }],
            services: vec![],
            start_vnc: false,
        };

        let radio_node = Node {
            name: radio_id.clone(),
            hardware_type: None,
            disk_image: None,
            component_id: Some(radio_id.clone()),
            component_manager_id: Some(COMPONENT_MANAGER_ID.to_string()),
            desires: vec![],
            interfaces: vec![Interface {
                name: format!("{}-radio-if", radio_id),
                addresses: vec![],
            }],
            services: vec![],
            start_vnc: false,
        };

        self.links.push(Link {
            name: format!("{}-radio-link", node_name),
            kind: LinkKind::PointToPoint,
            endpoints: vec![
                LinkEndpoint {
                    node: node_name.clone(),
                    interface: radio_if,
                },
                LinkEndpoint {
                    node: radio_id.clone(),
                    interface: format!("{}-radio-if", radio_id),
                },
            ],
            bandwidth_kbps: Some(RADIO_LINK_BANDWIDTH_KBPS),
            shared_vlan: None,
            multiplexed: false,
            best_effort: false,
        });

        match role.role {
            RoleKind::NodeB => {
                let nodeb_index = self.counters.next_nodeb();
                debug!("Allocated NodeB #{} on radio {}", nodeb_index, radio_id);
                self.connect_shared_vlan(&mut node, role.shared_vlan_address, nodeb_index)?;
                self.nodes.push(node);
                self.nodes.push(radio_node);
                self.nodebs.push(NodeBRecord {
                    key: radio_id,
                    node_index: self.nodes.len() - 2,
                    nodeb_index,
                    radio_kind: RadioKind::X310,
                    params: RadioParams::from(role),
                });
            }
            RoleKind::Ue => {
                self.attach_device(&mut node, role, RadioKind::X310);
                self.nodes.push(node);
                self.nodes.push(radio_node);
            }
        }
        Ok(())
    }

    /// A role whose radio is integrated into the compute node: one node
    /// pinned to the radio's component id.
    fn assemble_integrated_role(&mut self, role: &RadioRoleConfig) -> Result<(), CompileError> {
        let radio_id = self.resolve_radio(role)?;

        let mut node = Node {
            name: radio_id.clone(),
            hardware_type: None,
            disk_image: Some(
                role.disk_image
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DISK_IMAGE.to_string()),
            ),
            component_id: Some(radio_id.clone()),
            component_manager_id: Some(COMPONENT_MANAGER_ID.to_string()),
            desires: vec![],
            interfaces: vec![],
            services: vec![],
            start_vnc: false,
        };

        match role.role {
            RoleKind::NodeB => {
                let nodeb_index = self.counters.next_nodeb();
                debug!("Allocated NodeB #{} on radio {}", nodeb_index, radio_id);
                self.connect_shared_vlan(&mut node, role.shared_vlan_address, nodeb_index)?;
                self.nodes.push(node);
                self.nodebs.push(NodeBRecord {
                    key: radio_id,
                    node_index: self.nodes.len() - 1,
                    nodeb_index,
                    radio_kind: RadioKind::B210,
                    params: RadioParams::from(role),
                });
            }
            RoleKind::Ue => {
                self.attach_device(&mut node, role, RadioKind::B210);
                self.nodes.push(node);
            }
        }
        Ok(())
    }

    /// The controlled-RF matrix: one auto-named NodeB plus `ue_count` UE
    /// nodes, each joined to the NodeB by a dedicated RF link.
    fn assemble_matrix_group(&mut self, matrix: &MatrixSettings) -> Result<(), CompileError> {
        let nodeb_index = self.counters.next_nodeb();
        let key = format!("m-nb-{}", nodeb_index);
        let component_id = match &matrix.nodeb {
            Some(selector) => selector.resolve(&mut self.claimed_radios)?,
            None => None,
        };
        let disk_image = matrix
            .disk_image
            .clone()
            .unwrap_or_else(|| DEFAULT_DISK_IMAGE.to_string());

        let mut nb_node = Node {
            name: key.clone(),
            hardware_type: Some(CONTROLLED_RF_HWTYPE.to_string()),
            disk_image: Some(disk_image.clone()),
            component_id,
            component_manager_id: Some(COMPONENT_MANAGER_ID.to_string()),
            desires: vec![Desire {
                name: "rf-controlled".to_string(),
                weight: 1,
            }],
            interfaces: vec![],
            services: vec![],
            start_vnc: false,
        };
        self.connect_shared_vlan(&mut nb_node, matrix.shared_vlan_address, nodeb_index)?;
        self.nodes.push(nb_node);
        let nb_node_index = self.nodes.len() - 1;

        for _ in 0..matrix.ue_count {
            let ordinal = self.counters.next_device();
            let ue_name = format!("m-ue-{}", ordinal);
            let nb_if = format!("m-ue{}-rf", ordinal);

            let identity = synthesize(ordinal, &self.salt);
            let ue_node = Node {
                name: ue_name.clone(),
                hardware_type: Some(CONTROLLED_RF_HWTYPE.to_string()),
                disk_image: Some(disk_image.clone()),
                component_id: None,
                component_manager_id: Some(COMPONENT_MANAGER_ID.to_string()),
                desires: vec![Desire {
                    name: "rf-controlled".to_string(),
                    weight: 1,
                }],
                interfaces: vec![Interface {
                    name: "m-nb1-rf".to_string(),
                    addresses: vec![],
                }],
                services: vec![
                    services::tune_cpu(),
                    services::tune_radio(RadioKind::B210),
                    services::setup_stack(),
                    services::update_device_config(&identity, None, None),
                ],
                start_vnc: self.general.install_vnc,
            };

            self.nodes[nb_node_index].interfaces.push(Interface {
                name: nb_if.clone(),
                addresses: vec![],
            });
            self.links.push(Link {
                name: format!("rflink-{}", ordinal),
                kind: LinkKind::Rf,
                endpoints: vec![
                    LinkEndpoint {
                        node: key.clone(),
                        interface: nb_if,
                    },
                    LinkEndpoint {
                        node: ue_name,
                        interface: "m-nb1-rf".to_string(),
                    },
                ],
                bandwidth_kbps: None,
                shared_vlan: None,
                multiplexed: false,
                best_effort: false,
            });

            self.devices.push(DeclaredDevice {
                bound_target: Some(key.clone()),
                identity,
            });
            self.nodes.push(ue_node);
        }

        self.nodebs.push(NodeBRecord {
            key,
            node_index: nb_node_index,
            nodeb_index,
            radio_kind: RadioKind::B210,
            params: RadioParams::default(),
        });
        Ok(())
    }

    fn resolve_radio(&mut self, role: &RadioRoleConfig) -> Result<String, CompileError> {
        match role.radio.resolve(&mut self.claimed_radios)? {
            Some(id) => Ok(id),
            // Unreachable for validated configs: fixed-radio roles reject
            // empty candidate lists.
            None => Err(ValidationError::InvalidRole(
                "fixed-radio role resolved to no radio".to_string(),
            )
            .into()),
        }
    }

    /// Synthesize a device identity for a UE role and attach its services.
    fn attach_device(&mut self, node: &mut Node, role: &RadioRoleConfig, kind: RadioKind) {
        let ordinal = self.counters.next_device();
        let identity = synthesize(ordinal, &self.salt);
        debug!(
            "Synthesized device #{} ({}) on {}",
            ordinal, identity.subscriber_id, node.name
        );
        node.services = vec![
            services::tune_cpu(),
            services::tune_radio(kind),
            services::setup_stack(),
            services::update_device_config(
                &identity,
                role.dl_freq.as_deref(),
                role.ul_freq.as_deref(),
            ),
        ];
        node.start_vnc = self.general.install_vnc;
        self.devices.push(DeclaredDevice {
            bound_target: role.bind_to.clone(),
            identity,
        });
    }

    /// Attach `node` to the shared VLAN, if one is configured.
    ///
    /// The interface address is the explicitly supplied one, or derived
    /// from the services gateway at the NodeB's own index.
    fn connect_shared_vlan(
        &mut self,
        node: &mut Node,
        explicit_address: Option<Ipv4Addr>,
        nodeb_index: u32,
    ) -> Result<(), CompileError> {
        let Some(vlan_name) = &self.general.shared_vlan_name else {
            return Ok(());
        };
        let address = match explicit_address {
            Some(address) => address,
            None => allocate(
                self.general.services_gateway,
                self.general.shared_vlan_netmask,
                nodeb_index,
            )?,
        };
        node.interfaces.push(Interface {
            name: "ifSharedVlan".to_string(),
            addresses: vec![InterfaceAddress {
                address,
                netmask: self.general.shared_vlan_netmask,
            }],
        });
        self.links.push(Link {
            name: format!("{}-shvlan", node.name),
            kind: LinkKind::SharedVlan,
            endpoints: vec![LinkEndpoint {
                node: node.name.clone(),
                interface: "ifSharedVlan".to_string(),
            }],
            bandwidth_kbps: None,
            shared_vlan: Some(vlan_name.clone()),
            multiplexed: self.general.multiplex_networks,
            best_effort: self.general.multiplex_networks,
        });
        Ok(())
    }

    /// Resolve bindings, emit NodeB services, and seal the graph.
    fn seal(mut self) -> Result<Compilation, CompileError> {
        let known: Vec<String> = self.nodebs.iter().map(|r| r.key.clone()).collect();
        let table = binding::resolve(&self.devices, &known)?;
        info!(
            "Resolved {} devices across {} NodeB roles ({} unbound)",
            table.device_count(),
            known.len(),
            table.unbound().len()
        );

        for record in &self.nodebs {
            let merged = table.merged(&record.key);
            let node = &mut self.nodes[record.node_index];
            node.services = vec![
                services::tune_cpu(),
                services::tune_radio(record.radio_kind),
                services::setup_ip_routes(
                    self.general.services_gateway,
                    &self.general.services_subnets,
                ),
                services::setup_stack(),
                services::update_nodeb_config(record.nodeb_index, &merged, &record.params),
            ];
            node.start_vnc = self.general.install_vnc;
        }

        let registry = build_device_registry(&self.devices);
        let graph = TopologyGraph {
            nodes: self.nodes,
            links: self.links,
        };
        info!(
            "Assembled topology with {} nodes and {} links",
            graph.nodes.len(),
            graph.links.len()
        );
        Ok(Compilation { graph, registry })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatrixSettings, NodeSelector};

    fn role(radio: &str, kind: RoleKind) -> RadioRoleConfig {
        RadioRoleConfig {
            radio: NodeSelector::Specific(radio.to_string()),
            node_type: None,
            disk_image: None,
            role: kind,
            bind_to: None,
            shared_vlan_address: None,
            dl_freq: None,
            ul_freq: None,
            prbs: match kind {
                RoleKind::NodeB => Some(25),
                RoleKind::Ue => None,
            },
            dl_mask: None,
            ul_mask: None,
        }
    }

    fn base_config() -> DeploymentConfig {
        DeploymentConfig {
            general: GeneralSettings::default(),
            split_radio_roles: vec![],
            integrated_radio_roles: vec![],
            matrix: None,
        }
    }

    fn salt() -> IdentitySalt {
        IdentitySalt::from_value(123456)
    }

    #[test]
    fn test_two_nodebs_two_ues_merged_ordering() {
        let mut config = base_config();
        config.integrated_radio_roles = vec![
            role("nuc1", RoleKind::NodeB),
            role("nuc2", RoleKind::NodeB),
            role("nuc3", RoleKind::Ue),
            role("nuc4", RoleKind::Ue),
        ];
        // First UE is unbound, second bound to NodeB #1.
        config.integrated_radio_roles[3].bind_to = Some("nuc1".to_string());

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let graph = &compilation.graph;

        // NodeB #1 sees the unbound UE first, then its bound UE.
        let nb1 = graph.node("nuc1").unwrap();
        let configure = &nb1.services.last().unwrap().command;
        let unbound_pos = configure.find("001010123456001").unwrap();
        let bound_pos = configure.find("001010123456002").unwrap();
        assert!(unbound_pos < bound_pos);

        // NodeB #2 sees only the unbound UE.
        let nb2 = graph.node("nuc2").unwrap();
        let configure = &nb2.services.last().unwrap().command;
        assert!(configure.contains("001010123456001"));
        assert!(!configure.contains("001010123456002"));
    }

    #[test]
    fn test_cell_ids_follow_declaration_order() {
        let mut config = base_config();
        config.integrated_radio_roles =
            vec![role("nuc1", RoleKind::NodeB), role("nuc2", RoleKind::NodeB)];

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let nb1 = compilation.graph.node("nuc1").unwrap();
        let nb2 = compilation.graph.node("nuc2").unwrap();
        assert!(nb1.services.last().unwrap().command.contains("'0x001'"));
        assert!(nb2.services.last().unwrap().command.contains("'0x002'"));
    }

    #[test]
    fn test_split_role_builds_compute_and_radio_nodes() {
        let mut config = base_config();
        config.split_radio_roles = vec![role("ota-x310-1", RoleKind::NodeB)];

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let graph = &compilation.graph;

        assert_eq!(graph.nodes.len(), 2);
        let compute = graph.node("ota-x310-1-comp").unwrap();
        assert_eq!(compute.hardware_type.as_deref(), Some("d430"));
        assert!(compute.component_id.is_none());
        let radio = graph.node("ota-x310-1").unwrap();
        assert_eq!(radio.component_id.as_deref(), Some("ota-x310-1"));

        let link = graph.link("ota-x310-1-comp-radio-link").unwrap();
        assert_eq!(link.kind, LinkKind::PointToPoint);
        assert_eq!(link.bandwidth_kbps, Some(10_000_000));
        assert_eq!(link.endpoints.len(), 2);

        // Compute side carries the radio-network address.
        assert_eq!(
            compute.interfaces[0].addresses[0].address,
            Ipv4Addr::new(192, 168, 40, 1)
        );
    }

    #[test]
    fn test_shared_vlan_address_derived_from_nodeb_index() {
        let mut config = base_config();
        config.general.shared_vlan_name = Some("oran-vlan".to_string());
        config.integrated_radio_roles =
            vec![role("nuc1", RoleKind::NodeB), role("nuc2", RoleKind::NodeB)];

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let graph = &compilation.graph;

        // Gateway 10.254.254.1 plus NodeB index.
        let nb1 = graph.node("nuc1").unwrap();
        assert_eq!(
            nb1.interfaces[0].addresses[0].address,
            Ipv4Addr::new(10, 254, 254, 2)
        );
        let nb2 = graph.node("nuc2").unwrap();
        assert_eq!(
            nb2.interfaces[0].addresses[0].address,
            Ipv4Addr::new(10, 254, 254, 3)
        );

        let link = graph.link("nuc1-shvlan").unwrap();
        assert_eq!(link.kind, LinkKind::SharedVlan);
        assert_eq!(link.shared_vlan.as_deref(), Some("oran-vlan"));
        assert!(link.multiplexed);
        assert!(link.best_effort);
    }

    #[test]
    fn test_explicit_shared_vlan_address_wins() {
        let mut config = base_config();
        config.general.shared_vlan_name = Some("oran-vlan".to_string());
        config.integrated_radio_roles = vec![role("nuc1", RoleKind::NodeB)];
        config.integrated_radio_roles[0].shared_vlan_address =
            Some(Ipv4Addr::new(10, 254, 254, 77));

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let nb = compilation.graph.node("nuc1").unwrap();
        assert_eq!(
            nb.interfaces[0].addresses[0].address,
            Ipv4Addr::new(10, 254, 254, 77)
        );
    }

    #[test]
    fn test_multiplexing_disabled() {
        let mut config = base_config();
        config.general.shared_vlan_name = Some("oran-vlan".to_string());
        config.general.multiplex_networks = false;
        config.integrated_radio_roles = vec![role("nuc1", RoleKind::NodeB)];

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let link = compilation.graph.link("nuc1-shvlan").unwrap();
        assert!(!link.multiplexed);
        assert!(!link.best_effort);
    }

    #[test]
    fn test_shared_vlan_allocation_overflow_is_fatal() {
        let mut config = base_config();
        config.general.shared_vlan_name = Some("oran-vlan".to_string());
        // A /31 has no room for the derived address at index 1: the
        // candidate 10.254.254.2 lands outside the base's network.
        config.general.shared_vlan_netmask = Ipv4Addr::new(255, 255, 255, 254);
        config.integrated_radio_roles = vec![role("nuc1", RoleKind::NodeB)];

        let err = compile_with_salt(&config, salt()).unwrap_err();
        assert!(matches!(err, CompileError::Allocation(_)));
    }

    #[test]
    fn test_unknown_bound_target_is_fatal() {
        let mut config = base_config();
        config.integrated_radio_roles = vec![role("nuc1", RoleKind::Ue)];
        config.integrated_radio_roles[0].bind_to = Some("enb-missing".to_string());

        let err = compile_with_salt(&config, salt()).unwrap_err();
        assert!(matches!(err, CompileError::Binding(_)));
    }

    #[test]
    fn test_binding_to_ue_role_is_fatal() {
        // A target naming another UE role is a binding error, not a
        // silently empty binding.
        let mut config = base_config();
        config.integrated_radio_roles =
            vec![role("nuc1", RoleKind::Ue), role("nuc2", RoleKind::Ue)];
        config.integrated_radio_roles[1].bind_to = Some("nuc1".to_string());

        let err = compile_with_salt(&config, salt()).unwrap_err();
        assert!(matches!(err, CompileError::Binding(_)));
    }

    #[test]
    fn test_matrix_group_rf_links() {
        let mut config = base_config();
        config.matrix = Some(MatrixSettings {
            ue_count: 2,
            nodeb: None,
            disk_image: None,
            shared_vlan_address: None,
        });

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let graph = &compilation.graph;

        // One NodeB node plus two UE nodes.
        assert_eq!(graph.nodes.len(), 3);
        let nb = graph.node("m-nb-1").unwrap();
        assert_eq!(nb.hardware_type.as_deref(), Some("nuc5300"));
        assert!(nb.component_id.is_none());
        assert_eq!(nb.desires[0].name, "rf-controlled");

        for ordinal in 1..=2u32 {
            let ue = graph.node(&format!("m-ue-{}", ordinal)).unwrap();
            assert_eq!(ue.interfaces[0].name, "m-nb1-rf");
            let link = graph.link(&format!("rflink-{}", ordinal)).unwrap();
            assert_eq!(link.kind, LinkKind::Rf);
            assert_eq!(link.endpoints.len(), 2);
            assert_eq!(link.endpoints[0].node, "m-nb-1");
            assert_eq!(link.endpoints[0].interface, format!("m-ue{}-rf", ordinal));
            assert_eq!(link.endpoints[1].node, format!("m-ue-{}", ordinal));
        }

        // Matrix UEs are bound to the matrix NodeB.
        let configure = &nb.services.last().unwrap().command;
        assert!(configure.contains("001010123456001"));
        assert!(configure.contains("001010123456002"));
    }

    #[test]
    fn test_matrix_nodeb_sees_unbound_devices_first() {
        let mut config = base_config();
        config.integrated_radio_roles = vec![role("nuc1", RoleKind::Ue)];
        config.matrix = Some(MatrixSettings {
            ue_count: 1,
            nodeb: None,
            disk_image: None,
            shared_vlan_address: None,
        });

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let nb = compilation.graph.node("m-nb-1").unwrap();
        let configure = &nb.services.last().unwrap().command;
        let unbound_pos = configure.find("001010123456001").unwrap();
        let matrix_pos = configure.find("001010123456002").unwrap();
        assert!(unbound_pos < matrix_pos);
    }

    #[test]
    fn test_matrix_fixed_nodeb_selector() {
        let mut config = base_config();
        config.matrix = Some(MatrixSettings {
            ue_count: 1,
            nodeb: Some(NodeSelector::Specific("nuc7".to_string())),
            disk_image: None,
            shared_vlan_address: None,
        });

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let nb = compilation.graph.node("m-nb-1").unwrap();
        assert_eq!(nb.component_id.as_deref(), Some("nuc7"));
    }

    #[test]
    fn test_counters_span_heterogeneous_groups() {
        let mut config = base_config();
        config.split_radio_roles = vec![
            role("ota-x310-1", RoleKind::NodeB),
            role("ota-x310-2", RoleKind::Ue),
        ];
        config.integrated_radio_roles = vec![role("nuc1", RoleKind::Ue)];
        config.matrix = Some(MatrixSettings {
            ue_count: 1,
            nodeb: None,
            disk_image: None,
            shared_vlan_address: None,
        });

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let graph = &compilation.graph;

        // Device ordinals 1 (split UE), 2 (integrated UE), 3 (matrix UE);
        // NodeB indices 1 (split NodeB), 2 (matrix NodeB).
        assert_eq!(compilation.registry.devices.len(), 3);
        let ordinals: Vec<u32> = compilation.registry.devices.iter().map(|d| d.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert!(graph.node("m-ue-3").is_some());
        let matrix_nb = graph.node("m-nb-2").unwrap();
        assert!(matrix_nb
            .services
            .last()
            .unwrap()
            .command
            .contains("'0x002'"));
    }

    #[test]
    fn test_ue_services_order_and_arguments() {
        let mut config = base_config();
        config.integrated_radio_roles = vec![role("nuc1", RoleKind::Ue)];
        config.integrated_radio_roles[0].dl_freq = Some("3435e6".to_string());
        config.integrated_radio_roles[0].ul_freq = Some("3410e6".to_string());

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let ue = compilation.graph.node("nuc1").unwrap();
        let commands: Vec<&str> = ue.services.iter().map(|s| s.command.as_str()).collect();

        assert_eq!(commands.len(), 4);
        assert!(commands[0].contains("tune-cpu"));
        assert!(commands[1].contains("tune-b210"));
        assert!(commands[2].contains("setup-srslte"));
        assert!(commands[3].contains("update-ue-config-files"));
        assert!(commands[3].starts_with("DL_FREQ=3435e6 UL_FREQ=3410e6"));
        assert!(commands[3].contains("'001010123456001,353490123456001'"));
        assert!(ue.start_vnc);
    }

    #[test]
    fn test_nodeb_services_include_route_setup() {
        let mut config = base_config();
        config.integrated_radio_roles = vec![role("nuc1", RoleKind::NodeB)];

        let compilation = compile_with_salt(&config, salt()).unwrap();
        let nb = compilation.graph.node("nuc1").unwrap();
        let commands: Vec<&str> = nb.services.iter().map(|s| s.command.as_str()).collect();

        assert_eq!(commands.len(), 5);
        assert!(commands[0].contains("tune-cpu"));
        assert!(commands[1].contains("tune-b210"));
        assert!(commands[2].contains("setup-ip-config.sh 10.254.254.1 '10.96.0.0/12'"));
        assert!(commands[3].contains("setup-srslte"));
        assert!(commands[4].contains("update-enb-config-files"));
    }

    #[test]
    fn test_install_vnc_disabled() {
        let mut config = base_config();
        config.general.install_vnc = false;
        config.integrated_radio_roles =
            vec![role("nuc1", RoleKind::NodeB), role("nuc2", RoleKind::Ue)];

        let compilation = compile_with_salt(&config, salt()).unwrap();
        assert!(!compilation.graph.node("nuc1").unwrap().start_vnc);
        assert!(!compilation.graph.node("nuc2").unwrap().start_vnc);
    }

    #[test]
    fn test_compile_is_idempotent_under_fixed_salt() {
        let mut config = base_config();
        config.general.shared_vlan_name = Some("oran-vlan".to_string());
        config.integrated_radio_roles = vec![
            role("nuc1", RoleKind::NodeB),
            role("nuc2", RoleKind::Ue),
        ];
        config.matrix = Some(MatrixSettings {
            ue_count: 2,
            nodeb: None,
            disk_image: None,
            shared_vlan_address: None,
        });

        let first = compile_with_salt(&config, salt()).unwrap();
        let second = compile_with_salt(&config, salt()).unwrap();
        assert_eq!(
            serde_yaml::to_string(&first.graph).unwrap(),
            serde_yaml::to_string(&second.graph).unwrap()
        );
    }

    #[test]
    fn test_no_partial_topology_on_binding_failure() {
        let mut config = base_config();
        config.integrated_radio_roles = vec![
            role("nuc1", RoleKind::NodeB),
            role("nuc2", RoleKind::Ue),
        ];
        config.integrated_radio_roles[1].bind_to = Some("missing".to_string());

        assert!(compile_with_salt(&config, salt()).is_err());
    }
}
