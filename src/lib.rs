//! # RanForge - Topology compiler for srsLTE controlled-RF testbed deployments
//!
//! This library compiles a declarative description of a radio-access-network
//! test deployment into a concrete resource topology: uniquely identified
//! nodes, point-to-point and shared links, allocated IP addresses, and a
//! binding graph between user-equipment roles and the base stations that
//! serve them.
//!
//! ## Overview
//!
//! A deployment is declared as lists of NodeB and UE roles on fixed radios,
//! plus an optional controlled-RF "matrix" group, plus global settings such
//! as a shared VLAN toward an adjacent services experiment. Compilation is a
//! single deterministic pass: each run is a pure function from the validated
//! parameter set (and a per-run identity salt) to a topology document.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: Type-safe role declarations, global settings, and validation
//! - `config_loader`: Configuration file loading
//! - `identity`: Collision-resistant device identity synthesis
//! - `ip`: Offset-based address allocation inside a shared subnet
//! - `binding`: Device-to-NodeB binding resolution
//! - `topology`: Graph types, service synthesis, and the assembler
//! - `registry`: Device registry sidecar generation
//! - `utils`: Parameter string validation helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ranforge::{config_loader, topology};
//! use std::path::Path;
//!
//! // Load configuration from YAML file
//! let config = config_loader::load_config(Path::new("deployment.yaml"))?;
//!
//! // Compile the topology document
//! let compilation = topology::compile(&config)?;
//! println!("{}", serde_yaml::to_string(&compilation.graph)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration Format
//!
//! Configurations use YAML format:
//!
//! ```yaml
//! general:
//!   shared_vlan_name: "oran-vlan"
//!   services_gateway: "10.254.254.1"
//!   multiplex_networks: true
//!
//! split_radio_roles:
//!   - radio: "ota-x310-1"
//!     node_type: "d740"
//!     role: NodeB
//!     prbs: 25
//!     dl_freq: "3435e6"
//!     ul_freq: "3410e6"
//!
//! integrated_radio_roles:
//!   - radio: "ota-nuc1"
//!     role: UE
//!     bind_to: "ota-x310-1"
//!
//! matrix:
//!   ue_count: 2
//! ```
//!
//! ## Error Handling
//!
//! All compilation failures (`AllocationError`, `BindingError`, validation
//! errors) are fatal for the run: no partial topology is ever produced. The
//! binary reports them through `color_eyre`.

pub mod binding;
pub mod config;
pub mod config_loader;
pub mod identity;
pub mod ip;
pub mod registry;
pub mod topology;
pub mod utils;
