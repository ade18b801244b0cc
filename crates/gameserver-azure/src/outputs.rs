//! Output projection
//!
//! Once the VM exists, the public IP is looked up again to read the address
//! and DNS name the cloud assigned. Missing DNS settings are not an error:
//! `hostname` and `url` are simply absent.

use crate::error::Result;
use crate::group::ResourceGroupHandle;
use crate::network::PublicIpHandle;
use crate::resources::{GetPublicIpAddressArgs, PublicIpAddressLookup, types};
use crate::vm::VirtualMachineHandle;
use gameserver_cloud::{DeploymentRecord, Output, Secret, Stack};
use serde::Serialize;

pub const LOOKUP_NAME: &str = "vm-address";

/// Exported output names
pub mod names {
    pub const IP: &str = "ip";
    pub const HOSTNAME: &str = "hostname";
    pub const URL: &str = "url";
    pub const PRIVATE_KEY: &str = "privatekey";
}

pub fn service_url(hostname: &str, service_port: &str) -> String {
    format!("http://{}:{}", hostname, service_port)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// The exported values, still deferred
#[derive(Debug, Clone)]
pub struct DeploymentOutputs {
    pub ip: Output<String>,
    pub hostname: Output<String>,
    pub url: Output<String>,
    pub private_key: Output<Secret>,
}

impl DeploymentOutputs {
    /// Waits for every output; call while or after the stack is applied
    pub async fn resolve(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            ip: self.ip.resolve().await,
            hostname: self.hostname.resolve().await,
            url: self.url.resolve().await,
            private_key: self.private_key.resolve().await,
        }
    }
}

/// Settled outputs. Serializing masks the private key.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedOutputs {
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "privatekey")]
    pub private_key: Option<Secret>,
}

impl ResolvedOutputs {
    /// Stores the non-sensitive outputs in the deployment record
    pub fn write_to(&self, record: &mut DeploymentRecord) {
        record.set_output(names::IP, self.ip.clone());
        record.set_output(names::HOSTNAME, self.hostname.clone());
        record.set_output(names::URL, self.url.clone());
    }
}

/// Declares the public IP lookup and derives the exported values from it.
///
/// The lookup arguments are computed from the VM id, so the query runs only
/// after the VM has been created.
pub fn project_outputs(
    stack: &mut Stack,
    group: &ResourceGroupHandle,
    vm: &VirtualMachineHandle,
    public_ip: &PublicIpHandle,
    service_port: &str,
    private_key: &Output<Secret>,
) -> Result<DeploymentOutputs> {
    let address_name = public_ip.address_name.clone();
    let args = vm
        .id()
        .zip(&group.name())
        .map(move |(_, resource_group_name)| GetPublicIpAddressArgs {
            resource_group_name,
            public_ip_address_name: address_name,
        })
        .with_dependency(public_ip.handle.name.clone());

    let lookup = stack
        .invoke(types::GET_PUBLIC_IP_ADDRESS, LOOKUP_NAME, args)?
        .and_then(|value| match serde_json::from_value::<PublicIpAddressLookup>(value) {
            Ok(lookup) => Some(lookup),
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable public IP lookup result");
                None
            }
        });

    let ip = lookup.and_then(|l| non_empty(l.ip_address));
    let hostname = lookup.and_then(|l| non_empty(l.dns_settings.and_then(|d| d.fqdn)));
    let port = service_port.to_string();
    let url = hostname.map(move |h| service_url(&h, &port));

    Ok(DeploymentOutputs {
        ip,
        hostname,
        url,
        private_key: private_key.clone(),
    })
}
