//! Azure provisioner implementation

use crate::az::{AzCli, provisioning_state, resource_id};
use crate::error::{AzureError, Result};
use crate::resources::{
    GetPublicIpAddressArgs, NetworkInterfaceArgs, NetworkSecurityGroupArgs, PublicIpAddressArgs,
    ResourceGroupArgs, VirtualMachineArgs, VirtualNetworkArgs, types,
};
use async_trait::async_trait;
use gameserver_cloud::{
    AuthStatus, CloudError, InvokeRequest, Provisioner, ResourceRequest, ResourceState,
    ResourceStatus,
};
use serde_json::Value;

/// Creates resources through the `az` CLI.
///
/// Key material and random strings are produced locally at declaration time;
/// their nodes are acknowledged without a cloud call.
pub struct AzureProvisioner {
    az: AzCli,
}

impl Default for AzureProvisioner {
    fn default() -> Self {
        Self::new(AzCli::new())
    }
}

impl AzureProvisioner {
    pub fn new(az: AzCli) -> Self {
        Self { az }
    }

    async fn create_remote(&self, request: &ResourceRequest) -> Result<Value> {
        match request.resource_type.as_str() {
            types::RESOURCE_GROUP => {
                let args: ResourceGroupArgs = request.props_as()?;
                self.az.create_resource_group(&args).await
            }
            types::VIRTUAL_NETWORK => {
                let args: VirtualNetworkArgs = request.props_as()?;
                self.az.create_virtual_network(&args).await
            }
            types::PUBLIC_IP_ADDRESS => {
                let args: PublicIpAddressArgs = request.props_as()?;
                self.az.create_public_ip(&args).await
            }
            types::NETWORK_SECURITY_GROUP => {
                let args: NetworkSecurityGroupArgs = request.props_as()?;
                self.az.create_network_security_group(&args).await
            }
            types::NETWORK_INTERFACE => {
                let args: NetworkInterfaceArgs = request.props_as()?;
                self.az.create_network_interface(&args).await
            }
            types::VIRTUAL_MACHINE => {
                let args: VirtualMachineArgs = request.props_as()?;
                self.az.create_virtual_machine(&args).await
            }
            other => Err(CloudError::UnsupportedResource(other.to_string()).into()),
        }
    }
}

/// State for a node that never leaves this process
fn local_state(request: &ResourceRequest) -> ResourceState {
    ResourceState::new(
        format!("{}/{}", request.resource_type, request.name),
        request.resource_type.clone(),
    )
    .with_status(ResourceStatus::Succeeded)
    .with_attributes(&request.props)
}

/// Builds the resource state from what `az ... create` printed
pub fn remote_state(request: &ResourceRequest, output: &Value) -> Result<ResourceState> {
    let id = resource_id(output).ok_or_else(|| {
        AzureError::UnexpectedOutput(format!("no id in the result for {}", request.name))
    })?;
    let status = provisioning_state(output)
        .map(|s| ResourceStatus::from_provisioning_state(&s))
        .unwrap_or(ResourceStatus::Succeeded);

    Ok(ResourceState::new(id, request.resource_type.clone())
        .with_status(status)
        .with_attributes(output))
}

#[async_trait]
impl Provisioner for AzureProvisioner {
    fn name(&self) -> &str {
        "azure"
    }

    async fn check_auth(&self) -> gameserver_cloud::Result<AuthStatus> {
        match self.az.check_auth().await {
            Ok(account) => {
                let user = account
                    .user
                    .map(|u| u.name)
                    .unwrap_or_else(|| "unknown user".to_string());
                Ok(AuthStatus::ok(format!(
                    "{} ({}) as {}",
                    account.name, account.id, user
                )))
            }
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn create(&self, request: &ResourceRequest) -> gameserver_cloud::Result<ResourceState> {
        match request.resource_type.as_str() {
            types::PRIVATE_KEY | types::RANDOM_STRING => Ok(local_state(request)),
            _ => {
                tracing::info!(resource = %request.name, kind = %request.resource_type, "Creating");
                let output = self.create_remote(request).await?;
                Ok(remote_state(request, &output)?)
            }
        }
    }

    async fn invoke(&self, request: &InvokeRequest) -> gameserver_cloud::Result<Value> {
        match request.token.as_str() {
            types::GET_PUBLIC_IP_ADDRESS => {
                let args: GetPublicIpAddressArgs = request.args_as()?;
                Ok(self.az.show_public_ip(&args).await?)
            }
            other => Err(CloudError::UnsupportedResource(other.to_string())),
        }
    }
}
