//! Full game-server deployment
//!
//! Wires key, resource group, network, VM and outputs into one stack. The
//! image reference is validated first, so a bad `osImage` fails before
//! anything is declared or any key is generated.

use crate::error::Result;
use crate::group::{ResourceGroupHandle, declare_resource_group};
use crate::keys::{DeclaredKey, KeyPair, RSA_BITS, declare_key_pair, load_or_create_key};
use crate::network::{NetworkArtifacts, declare_network};
use crate::outputs::{DeploymentOutputs, project_outputs};
use crate::vm::{VirtualMachineHandle, VirtualMachineSpec};
use gameserver_cloud::{ProjectStore, Stack};
use gameserver_config::DeploymentConfig;

/// Handles to everything declared for one deployment
#[derive(Debug, Clone)]
pub struct GameServerDeployment {
    pub key: DeclaredKey,
    pub resource_group: ResourceGroupHandle,
    pub network: NetworkArtifacts,
    pub vm: VirtualMachineHandle,
    pub outputs: DeploymentOutputs,
}

impl GameServerDeployment {
    /// Declares the deployment with the key stored in `store`, generating
    /// and storing a 4096-bit one on the first run
    pub async fn declare(
        stack: &mut Stack,
        config: &DeploymentConfig,
        store: &ProjectStore,
    ) -> Result<Self> {
        Self::declare_with_store(stack, config, store, RSA_BITS).await
    }

    async fn declare_with_store(
        stack: &mut Stack,
        config: &DeploymentConfig,
        store: &ProjectStore,
        bits: usize,
    ) -> Result<Self> {
        let machine = VirtualMachineSpec::new(
            &config.vm_name,
            &config.admin_username,
            &config.os_image,
        )?;
        let key = load_or_create_key(store, bits).await?;
        Self::declare_machine(stack, config, machine, &key)
    }

    /// Declares the deployment around an existing key pair
    pub fn declare_with_key(
        stack: &mut Stack,
        config: &DeploymentConfig,
        key: &KeyPair,
    ) -> Result<Self> {
        let machine = VirtualMachineSpec::new(
            &config.vm_name,
            &config.admin_username,
            &config.os_image,
        )?;
        Self::declare_machine(stack, config, machine, key)
    }

    fn declare_machine(
        stack: &mut Stack,
        config: &DeploymentConfig,
        machine: VirtualMachineSpec,
        key: &KeyPair,
    ) -> Result<Self> {
        tracing::info!(
            vm = %config.vm_name,
            location = %config.location,
            resource_group = %config.resource_group_name,
            image = %machine.image,
            "Declaring game server"
        );

        let key = declare_key_pair(stack, key)?;
        let resource_group =
            declare_resource_group(stack, &config.resource_group_name, &config.location)?;
        let network = declare_network(stack, &resource_group, &config.vm_name, &config.service_port)?;
        let vm = machine.declare(
            stack,
            &resource_group,
            &network.network_interface,
            &key.public_key,
        )?;
        let outputs = project_outputs(
            stack,
            &resource_group,
            &vm,
            &network.public_ip,
            &config.service_port,
            &key.private_key,
        )?;

        Ok(Self {
            key,
            resource_group,
            network,
            vm,
            outputs,
        })
    }
}
