//! Typed resource descriptors
//!
//! Property names follow the Azure Resource Manager schema so the serialized
//! form reads like an ARM request body.

use gameserver_cloud::{Output, ResourceState};
use serde::{Deserialize, Serialize};

/// Resource type and function tokens
pub mod types {
    pub const RESOURCE_GROUP: &str = "azure:resources:ResourceGroup";
    pub const VIRTUAL_NETWORK: &str = "azure:network:VirtualNetwork";
    pub const PUBLIC_IP_ADDRESS: &str = "azure:network:PublicIPAddress";
    pub const NETWORK_SECURITY_GROUP: &str = "azure:network:NetworkSecurityGroup";
    pub const NETWORK_INTERFACE: &str = "azure:network:NetworkInterface";
    pub const VIRTUAL_MACHINE: &str = "azure:compute:VirtualMachine";
    pub const PRIVATE_KEY: &str = "tls:PrivateKey";
    pub const RANDOM_STRING: &str = "random:RandomString";

    pub const GET_PUBLIC_IP_ADDRESS: &str = "azure:network:getPublicIPAddress";
}

/// A declared resource: its logical name and deferred live state
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    pub name: String,
    pub state: Output<ResourceState>,
}

impl ResourceHandle {
    pub fn new(name: impl Into<String>, state: Output<ResourceState>) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }

    /// Provider-assigned id, available once the resource exists
    pub fn id(&self) -> Output<String> {
        self.state.map(|s| s.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupArgs {
    pub resource_group_name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    pub address_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetArgs {
    pub name: String,
    pub address_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkArgs {
    pub resource_group_name: String,
    pub virtual_network_name: String,
    pub location: String,
    pub address_space: AddressSpace,
    pub subnets: Vec<SubnetArgs>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpAllocationMethod {
    Dynamic,
    Static,
}

impl IpAllocationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpAllocationMethod::Dynamic => "Dynamic",
            IpAllocationMethod::Static => "Static",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpDnsSettings {
    pub domain_name_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressArgs {
    pub resource_group_name: String,
    pub public_ip_address_name: String,
    pub location: String,
    #[serde(rename = "publicIPAllocationMethod")]
    pub public_ip_allocation_method: IpAllocationMethod,
    pub dns_settings: PublicIpDnsSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityRuleDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityRuleAccess {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityRuleProtocol {
    Tcp,
    Udp,
    #[serde(rename = "*")]
    Any,
}

impl SecurityRuleProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityRuleProtocol::Tcp => "Tcp",
            SecurityRuleProtocol::Udp => "Udp",
            SecurityRuleProtocol::Any => "*",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRule {
    pub name: String,
    pub priority: u32,
    pub direction: SecurityRuleDirection,
    pub access: SecurityRuleAccess,
    pub protocol: SecurityRuleProtocol,
    pub source_port_range: String,
    pub source_address_prefix: String,
    pub destination_address_prefix: String,
    pub destination_port_ranges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSecurityGroupArgs {
    pub resource_group_name: String,
    pub network_security_group_name: String,
    pub location: String,
    pub security_rules: Vec<SecurityRule>,
}

/// Reference to another resource by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubResource {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpConfiguration {
    pub name: String,
    #[serde(rename = "privateIPAllocationMethod")]
    pub private_ip_allocation_method: IpAllocationMethod,
    pub subnet: SubResource,
    #[serde(rename = "publicIPAddress")]
    pub public_ip_address: SubResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceArgs {
    pub resource_group_name: String,
    pub network_interface_name: String,
    pub location: String,
    pub network_security_group: SubResource,
    pub ip_configurations: Vec<IpConfiguration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceReference {
    pub id: String,
    pub primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    pub network_interfaces: Vec<NetworkInterfaceReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    pub vm_size: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiskCreateOption {
    FromImage,
    Attach,
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsDisk {
    pub create_option: DiskCreateOption,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    pub os_disk: OsDisk,
    pub image_reference: crate::vm::ImageReference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshPublicKey {
    pub key_data: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshConfiguration {
    pub public_keys: Vec<SshPublicKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinuxConfiguration {
    pub disable_password_authentication: bool,
    pub ssh: SshConfiguration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsProfile {
    pub admin_username: String,
    pub computer_name: String,
    /// Base64-encoded boot script
    pub custom_data: String,
    pub linux_configuration: LinuxConfiguration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineArgs {
    pub resource_group_name: String,
    pub vm_name: String,
    pub location: String,
    pub network_profile: NetworkProfile,
    pub hardware_profile: HardwareProfile,
    pub storage_profile: StorageProfile,
    pub os_profile: OsProfile,
}

/// Declared shape of the SSH key resource; the private half never appears here
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateKeyArgs {
    pub algorithm: String,
    pub rsa_bits: usize,
    pub public_key_openssh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomStringArgs {
    pub length: usize,
    pub upper: bool,
    pub special: bool,
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPublicIpAddressArgs {
    pub resource_group_name: String,
    pub public_ip_address_name: String,
}

/// Live attributes of a public IP as returned by the lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressLookup {
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub dns_settings: Option<PublicIpDnsLookup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpDnsLookup {
    #[serde(default)]
    pub domain_name_label: Option<String>,
    #[serde(default)]
    pub fqdn: Option<String>,
}
