//! Network declarations
//!
//! Builds the virtual network, public IP, security group and network
//! interface the VM attaches to. Every resource is scoped to the same
//! resource group through [`ResourceGroupHandle::scope`].

use crate::error::Result;
use crate::group::ResourceGroupHandle;
use crate::label::declare_dns_label;
use crate::resources::{
    AddressSpace, IpAllocationMethod, IpConfiguration, NetworkInterfaceArgs,
    NetworkSecurityGroupArgs, PublicIpAddressArgs, PublicIpDnsSettings, ResourceHandle,
    SecurityRule, SecurityRuleAccess, SecurityRuleDirection, SecurityRuleProtocol, SubResource,
    SubnetArgs, VirtualNetworkArgs, types,
};
use gameserver_cloud::{Output, Stack};

pub const VNET_ADDRESS_SPACE: &str = "10.0.0.0/16";
pub const SUBNET_NAME: &str = "subnet";
pub const SUBNET_PREFIX: &str = "10.0.1.0/24";
pub const SSH_PORT: &str = "22";
pub const RULE_NAME: &str = "securityrule";
pub const RULE_PRIORITY: u32 = 1000;
pub const IP_CONFIGURATION_NAME: &str = "ipconfiguration";

/// Logical names within the stack
pub mod names {
    pub const VIRTUAL_NETWORK: &str = "network";
    pub const PUBLIC_IP: &str = "public-ip";
    pub const SECURITY_GROUP: &str = "security-group";
    pub const NETWORK_INTERFACE: &str = "network-interface";
}

/// Ports opened by the inbound rule, in order, without duplicates
pub fn destination_ports(service_port: &str) -> Vec<String> {
    let mut ports: Vec<String> = Vec::with_capacity(2);
    for port in [service_port, SSH_PORT] {
        if !ports.iter().any(|p| p == port) {
            ports.push(port.to_string());
        }
    }
    ports
}

/// Id of a named subnet inside a virtual network
pub fn subnet_id(vnet_id: &str, subnet_name: &str) -> String {
    format!("{}/subnets/{}", vnet_id, subnet_name)
}

/// The public IP plus the cloud-side name the output lookup needs
#[derive(Debug, Clone)]
pub struct PublicIpHandle {
    pub handle: ResourceHandle,
    pub address_name: String,
}

impl PublicIpHandle {
    pub fn id(&self) -> Output<String> {
        self.handle.id()
    }
}

#[derive(Debug, Clone)]
pub struct NetworkArtifacts {
    pub virtual_network: ResourceHandle,
    /// First (and only) subnet of the virtual network
    pub subnet_id: Output<String>,
    pub dns_label: Output<String>,
    pub public_ip: PublicIpHandle,
    pub security_group: ResourceHandle,
    pub network_interface: ResourceHandle,
}

/// Declares the network resources for one VM.
///
/// `vm_name_seed` prefixes the DNS label and the cloud-side resource names.
pub fn declare_network(
    stack: &mut Stack,
    group: &ResourceGroupHandle,
    vm_name_seed: &str,
    service_port: &str,
) -> Result<NetworkArtifacts> {
    let scope = group.scope();

    let vnet_name = format!("{}-vnet", vm_name_seed);
    let vnet_args = scope.map(move |(resource_group_name, location)| VirtualNetworkArgs {
        resource_group_name,
        virtual_network_name: vnet_name,
        location,
        address_space: AddressSpace {
            address_prefixes: vec![VNET_ADDRESS_SPACE.to_string()],
        },
        subnets: vec![SubnetArgs {
            name: SUBNET_NAME.to_string(),
            address_prefix: SUBNET_PREFIX.to_string(),
        }],
    });
    let vnet_state = stack.register(types::VIRTUAL_NETWORK, names::VIRTUAL_NETWORK, vnet_args)?;
    let virtual_network = ResourceHandle::new(names::VIRTUAL_NETWORK, vnet_state);
    let subnet_id = virtual_network
        .id()
        .map(|vnet_id| subnet_id(&vnet_id, SUBNET_NAME));

    let dns_label = declare_dns_label(stack, vm_name_seed)?;

    let address_name = format!("{}-ip", vm_name_seed);
    let ip_name = address_name.clone();
    let ip_args = scope
        .zip(&dns_label)
        .map(move |((resource_group_name, location), domain_name_label)| {
            PublicIpAddressArgs {
                resource_group_name,
                public_ip_address_name: ip_name,
                location,
                public_ip_allocation_method: IpAllocationMethod::Dynamic,
                dns_settings: PublicIpDnsSettings { domain_name_label },
            }
        });
    let ip_state = stack.register(types::PUBLIC_IP_ADDRESS, names::PUBLIC_IP, ip_args)?;
    let public_ip = PublicIpHandle {
        handle: ResourceHandle::new(names::PUBLIC_IP, ip_state),
        address_name,
    };

    let ports = destination_ports(service_port);
    tracing::debug!(ports = ?ports, "Inbound ports");
    let nsg_name = format!("{}-nsg", vm_name_seed);
    let nsg_args = scope.map(move |(resource_group_name, location)| NetworkSecurityGroupArgs {
        resource_group_name,
        network_security_group_name: nsg_name,
        location,
        security_rules: vec![SecurityRule {
            name: RULE_NAME.to_string(),
            priority: RULE_PRIORITY,
            direction: SecurityRuleDirection::Inbound,
            access: SecurityRuleAccess::Allow,
            protocol: SecurityRuleProtocol::Tcp,
            source_port_range: "*".to_string(),
            source_address_prefix: "*".to_string(),
            destination_address_prefix: "*".to_string(),
            destination_port_ranges: ports,
        }],
    });
    let nsg_state = stack.register(
        types::NETWORK_SECURITY_GROUP,
        names::SECURITY_GROUP,
        nsg_args,
    )?;
    let security_group = ResourceHandle::new(names::SECURITY_GROUP, nsg_state);

    let nic_name = format!("{}-nic", vm_name_seed);
    let nic_args = scope
        .zip(&security_group.id())
        .zip(&subnet_id.zip(&public_ip.id()))
        .map(
            move |(((resource_group_name, location), nsg_id), (subnet_id, ip_id))| {
                NetworkInterfaceArgs {
                    resource_group_name,
                    network_interface_name: nic_name,
                    location,
                    network_security_group: SubResource { id: nsg_id },
                    ip_configurations: vec![IpConfiguration {
                        name: IP_CONFIGURATION_NAME.to_string(),
                        private_ip_allocation_method: IpAllocationMethod::Dynamic,
                        subnet: SubResource { id: subnet_id },
                        public_ip_address: SubResource { id: ip_id },
                    }],
                }
            },
        );
    let nic_state = stack.register(
        types::NETWORK_INTERFACE,
        names::NETWORK_INTERFACE,
        nic_args,
    )?;

    Ok(NetworkArtifacts {
        virtual_network,
        subnet_id,
        dns_label,
        public_ip,
        security_group,
        network_interface: ResourceHandle::new(names::NETWORK_INTERFACE, nic_state),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::declare_resource_group;
    use gameserver_cloud::{DryRunProvisioner, apply};

    #[test]
    fn test_destination_ports() {
        assert_eq!(destination_ports("25565"), vec!["25565", "22"]);
        assert_eq!(destination_ports("8080"), vec!["8080", "22"]);
        assert_eq!(destination_ports("22"), vec!["22"]);
    }

    #[test]
    fn test_subnet_id() {
        assert_eq!(
            subnet_id("/subscriptions/s/virtualNetworks/vnet", "subnet"),
            "/subscriptions/s/virtualNetworks/vnet/subnets/subnet"
        );
    }

    #[test]
    fn test_dependency_edges() {
        let mut stack = Stack::new("test");
        let group = declare_resource_group(&mut stack, "rg", "EastUS").unwrap();
        declare_network(&mut stack, &group, "test", "25565").unwrap();

        let plan = stack.plan();
        let deps = |name: &str| {
            plan.actions
                .iter()
                .find(|a| a.name == name)
                .unwrap()
                .dependencies
                .clone()
        };
        assert_eq!(deps(names::VIRTUAL_NETWORK), vec!["rg"]);
        assert_eq!(deps(names::PUBLIC_IP), vec!["domain-label", "rg"]);
        assert_eq!(
            deps(names::NETWORK_INTERFACE),
            vec!["network", "public-ip", "rg", "security-group"]
        );
    }

    #[tokio::test]
    async fn test_ssh_port_is_not_duplicated() {
        let mut stack = Stack::new("test");
        let group = declare_resource_group(&mut stack, "rg", "EastUS").unwrap();
        declare_network(&mut stack, &group, "test", "22").unwrap();

        let provisioner = DryRunProvisioner::new();
        assert!(apply(stack, &provisioner).await.is_success());

        let groups = provisioner.created_of_type(types::NETWORK_SECURITY_GROUP);
        assert_eq!(groups.len(), 1);
        let nsg: NetworkSecurityGroupArgs = groups[0].props_as().unwrap();
        assert_eq!(nsg.security_rules.len(), 1);
        assert_eq!(nsg.security_rules[0].destination_port_ranges, vec!["22"]);
    }

    #[tokio::test]
    async fn test_interface_binds_subnet_ip_and_group() {
        let mut stack = Stack::new("test");
        let group = declare_resource_group(&mut stack, "rg", "EastUS").unwrap();
        let network = declare_network(&mut stack, &group, "test", "25565").unwrap();

        let provisioner = DryRunProvisioner::new();
        assert!(apply(stack, &provisioner).await.is_success());

        let nic: NetworkInterfaceArgs = provisioner.created_of_type(types::NETWORK_INTERFACE)[0]
            .props_as()
            .unwrap();
        let ip_config = &nic.ip_configurations[0];
        assert_eq!(
            ip_config.subnet.id,
            "/dry-run/azure/network/VirtualNetwork/network/subnets/subnet"
        );
        assert_eq!(
            ip_config.public_ip_address.id,
            network.public_ip.id().resolve().await.unwrap()
        );
        assert_eq!(
            nic.network_security_group.id,
            network.security_group.id().resolve().await.unwrap()
        );
        assert_eq!(nic.resource_group_name, "rg");

        let ip: PublicIpAddressArgs = provisioner.created_of_type(types::PUBLIC_IP_ADDRESS)[0]
            .props_as()
            .unwrap();
        assert_eq!(ip.public_ip_allocation_method, IpAllocationMethod::Dynamic);
        assert!(ip.dns_settings.domain_name_label.starts_with("test-"));
        assert_eq!(ip.public_ip_address_name, network.public_ip.address_name);
    }
}
