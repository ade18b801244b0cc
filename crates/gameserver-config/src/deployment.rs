//! Typed deployment settings
//!
//! Every key is resolved exactly once; components receive these values as
//! plain parameters instead of reading configuration themselves.

use crate::reader::ConfigReader;
use serde::Serialize;

pub const DEFAULT_VM_NAME: &str = "my-server";
pub const DEFAULT_OS_IMAGE: &str = "canonical:0001-com-ubuntu-server-jammy:22_04-lts:latest";
pub const DEFAULT_ADMIN_USERNAME: &str = "pulumiuser";
pub const DEFAULT_SERVICE_PORT: &str = "25565";
pub const DEFAULT_LOCATION: &str = "EastUS";
pub const DEFAULT_RESOURCE_GROUP_NAME: &str = "minecraft-server-resource-group";

/// Keys understood by [`DeploymentConfig::from_reader`]
pub mod keys {
    pub const VM_NAME: &str = "vmName";
    /// Older spelling of [`VM_NAME`], consulted when `vmName` is unset
    pub const VIRTUAL_MACHINE_NAME: &str = "virtualMachineName";
    pub const OS_IMAGE: &str = "osImage";
    pub const ADMIN_USERNAME: &str = "adminUsername";
    pub const SERVICE_PORT: &str = "servicePort";
    pub const LOCATION: &str = "location";
    pub const RESOURCE_GROUP_NAME: &str = "resourceGroupName";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    /// Seeds the DNS label and names the VM and its computer name
    pub vm_name: String,
    /// `publisher:offer:sku:version`
    pub os_image: String,
    pub admin_username: String,
    /// Opened alongside port 22
    pub service_port: String,
    pub location: String,
    pub resource_group_name: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self::from_reader(&ConfigReader::new())
    }
}

impl DeploymentConfig {
    pub fn from_reader(reader: &ConfigReader) -> Self {
        let vm_name = reader
            .get_opt(keys::VM_NAME)
            .or_else(|| reader.get_opt(keys::VIRTUAL_MACHINE_NAME))
            .unwrap_or(DEFAULT_VM_NAME)
            .to_string();

        Self {
            vm_name,
            os_image: reader.get(keys::OS_IMAGE, DEFAULT_OS_IMAGE),
            admin_username: reader.get(keys::ADMIN_USERNAME, DEFAULT_ADMIN_USERNAME),
            service_port: reader.get(keys::SERVICE_PORT, DEFAULT_SERVICE_PORT),
            location: reader.get(keys::LOCATION, DEFAULT_LOCATION),
            resource_group_name: reader.get(keys::RESOURCE_GROUP_NAME, DEFAULT_RESOURCE_GROUP_NAME),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeploymentConfig::default();
        assert_eq!(config.vm_name, "my-server");
        assert_eq!(config.os_image, DEFAULT_OS_IMAGE);
        assert_eq!(config.admin_username, "pulumiuser");
        assert_eq!(config.service_port, "25565");
        assert_eq!(config.location, "EastUS");
    }

    #[test]
    fn test_vm_name_alias() {
        let legacy = ConfigReader::from_pairs([("virtualMachineName", "mc-server")]);
        assert_eq!(DeploymentConfig::from_reader(&legacy).vm_name, "mc-server");

        let both = ConfigReader::from_pairs([("virtualMachineName", "mc-server"), ("vmName", "test")]);
        assert_eq!(DeploymentConfig::from_reader(&both).vm_name, "test");
    }

    #[test]
    fn test_values_are_not_validated() {
        let reader = ConfigReader::from_pairs([("osImage", "not-an-image"), ("servicePort", "abc")]);
        let config = DeploymentConfig::from_reader(&reader);
        assert_eq!(config.os_image, "not-an-image");
        assert_eq!(config.service_port, "abc");
    }
}
