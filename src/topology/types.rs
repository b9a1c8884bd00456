//! Topology document type definitions.
//!
//! This module contains the type definitions for the compiled topology
//! document: compute and radio nodes, the links joining their interfaces,
//! and the per-node service commands that configure the srsLTE stack.
//! The whole document is serialized as-is for the provisioning layer.

use serde::Serialize;
use std::net::Ipv4Addr;

/// The compiled topology: the terminal output of a run.
///
/// Never mutated after assembly finishes; the provisioning layer owns
/// serialization.
#[derive(Serialize, Debug)]
pub struct TopologyGraph {
    /// Compute and radio nodes, in allocation order
    pub nodes: Vec<Node>,
    /// Wired and RF links, in allocation order
    pub links: Vec<Link>,
}

impl TopologyGraph {
    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Look up a link by name.
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }
}

/// A single allocated node (compute host or bare radio).
#[derive(Serialize, Debug)]
pub struct Node {
    /// Unique node name within the run
    pub name: String,
    /// Hardware type constraint (e.g. "d430", "nuc5300")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_type: Option<String>,
    /// Disk image to load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_image: Option<String>,
    /// Specific physical component to allocate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    /// Authority that manages the component
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_manager_id: Option<String>,
    /// Soft allocation constraints (e.g. rf-controlled)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub desires: Vec<Desire>,
    /// Network interfaces referenced by links
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
    /// Startup commands, executed in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceCommand>,
    /// Start a VNC server on this node
    pub start_vnc: bool,
}

/// Weighted soft constraint on node allocation.
#[derive(Serialize, Debug)]
pub struct Desire {
    pub name: String,
    pub weight: u32,
}

/// A network interface on a node.
#[derive(Serialize, Debug)]
pub struct Interface {
    /// Interface name, unique within the node
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<InterfaceAddress>,
}

/// An IPv4 address bound to an interface.
#[derive(Serialize, Debug)]
pub struct InterfaceAddress {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

/// Kind of link between node interfaces.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Dedicated wired link between two interfaces
    PointToPoint,
    /// Attachment to a pre-existing shared VLAN
    SharedVlan,
    /// Direct radio-frequency connection between two radio interfaces
    Rf,
}

/// A link joining node interfaces.
#[derive(Serialize, Debug)]
pub struct Link {
    /// Unique link name within the run
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    /// Interfaces this link connects
    pub endpoints: Vec<LinkEndpoint>,
    /// Provisioned bandwidth in kbps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_kbps: Option<u64>,
    /// Name of the shared VLAN joined (shared-VLAN links only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_vlan: Option<String>,
    /// Carry this link over a VLAN on a shared physical interface
    pub multiplexed: bool,
    /// Accept best-effort bandwidth instead of a reservation
    pub best_effort: bool,
}

/// Reference to one interface endpoint of a link.
#[derive(Serialize, Debug)]
pub struct LinkEndpoint {
    pub node: String,
    pub interface: String,
}

/// A startup command executed on a node by the provisioner.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ServiceCommand {
    pub shell: String,
    pub command: String,
}
