//! Azure game-server deployment for gameserver
//!
//! Declares the resource group, network, VM and outputs of a single game
//! server into a [`gameserver_cloud::Stack`], and provides the
//! [`AzureProvisioner`] that creates them through the `az` CLI.
//!
//! # Requirements
//!
//! - `az` CLI must be installed and logged in (`az login`)
//! - The subscription is the CLI's default unless one is passed explicitly
//!
//! # Example
//!
//! ```ignore
//! use gameserver_azure::{AzureProvisioner, GameServerDeployment};
//! use gameserver_cloud::{ProjectStore, Stack, apply};
//! use gameserver_config::{ConfigReader, DeploymentConfig};
//!
//! let config = DeploymentConfig::from_reader(&ConfigReader::discover()?);
//! let store = ProjectStore::new(std::env::current_dir()?);
//! let mut stack = Stack::new("gameserver");
//! let deployment = GameServerDeployment::declare(&mut stack, &config, &store).await?;
//!
//! let result = apply(stack, &AzureProvisioner::default()).await;
//! let outputs = deployment.outputs.resolve().await;
//! ```

pub mod az;
pub mod boot_script;
pub mod deployment;
pub mod error;
pub mod group;
pub mod keys;
pub mod label;
pub mod network;
pub mod outputs;
pub mod provider;
pub mod resources;
pub mod vm;

pub use az::AzCli;
pub use boot_script::BootScript;
pub use deployment::GameServerDeployment;
pub use error::{AzureError, Result};
pub use group::{ResourceGroupHandle, declare_resource_group};
pub use keys::{DeclaredKey, KeyPair, declare_key_pair, load_key, load_or_create_key};
pub use label::{declare_dns_label, dns_label};
pub use network::{NetworkArtifacts, PublicIpHandle, declare_network};
pub use outputs::{DeploymentOutputs, ResolvedOutputs, project_outputs};
pub use provider::AzureProvisioner;
pub use resources::ResourceHandle;
pub use vm::{ImageReference, VirtualMachineHandle, VirtualMachineSpec, declare_virtual_machine};
