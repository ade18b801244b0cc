//! Virtual machine declaration

use crate::boot_script::BootScript;
use crate::error::{AzureError, Result};
use crate::group::ResourceGroupHandle;
use crate::resources::{
    DiskCreateOption, HardwareProfile, LinuxConfiguration, NetworkInterfaceReference,
    NetworkProfile, OsDisk, OsProfile, ResourceHandle, SshConfiguration, SshPublicKey,
    StorageProfile, VirtualMachineArgs, types,
};
use gameserver_cloud::{Output, Stack};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// General-purpose size used for every deployment
pub const VM_SIZE: &str = "Standard_D2_v2";
pub const VM_RESOURCE_NAME: &str = "server-instance";

/// Marketplace image, parsed from `publisher:offer:sku:version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

impl FromStr for ImageReference {
    type Err = AzureError;

    fn from_str(value: &str) -> Result<Self> {
        let fields: Vec<&str> = value.split(':').collect();
        match fields.as_slice() {
            [publisher, offer, sku, version] if fields.iter().all(|f| !f.is_empty()) => {
                Ok(Self {
                    publisher: publisher.to_string(),
                    offer: offer.to_string(),
                    sku: sku.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(AzureError::InvalidImageReference(value.to_string())),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.publisher, self.offer, self.sku, self.version
        )
    }
}

pub fn authorized_keys_path(admin_username: &str) -> String {
    format!("/home/{}/.ssh/authorized_keys", admin_username)
}

/// Everything about the VM that is known before declaration
#[derive(Debug, Clone)]
pub struct VirtualMachineSpec {
    /// VM name and computer name
    pub vm_name: String,
    pub admin_username: String,
    pub image: ImageReference,
    pub boot_script: BootScript,
}

impl VirtualMachineSpec {
    /// Validates `os_image`; nothing is declared when it is malformed
    pub fn new(vm_name: &str, admin_username: &str, os_image: &str) -> Result<Self> {
        Ok(Self {
            vm_name: vm_name.to_string(),
            admin_username: admin_username.to_string(),
            image: os_image.parse()?,
            boot_script: BootScript::default(),
        })
    }

    pub fn with_boot_script(mut self, boot_script: BootScript) -> Self {
        self.boot_script = boot_script;
        self
    }

    /// Registers the VM after the network interface and key it references
    pub fn declare(
        &self,
        stack: &mut Stack,
        group: &ResourceGroupHandle,
        network_interface: &ResourceHandle,
        ssh_public_key: &Output<String>,
    ) -> Result<VirtualMachineHandle> {
        let vm_name = self.vm_name.clone();
        let admin_username = self.admin_username.clone();
        let image = self.image.clone();
        let custom_data = self.boot_script.to_custom_data();

        let args = group
            .scope()
            .zip(&network_interface.id())
            .zip(ssh_public_key)
            .map(
                move |(((resource_group_name, location), nic_id), key_data)| VirtualMachineArgs {
                    resource_group_name,
                    vm_name: vm_name.clone(),
                    location,
                    network_profile: NetworkProfile {
                        network_interfaces: vec![NetworkInterfaceReference {
                            id: nic_id,
                            primary: true,
                        }],
                    },
                    hardware_profile: HardwareProfile {
                        vm_size: VM_SIZE.to_string(),
                    },
                    storage_profile: StorageProfile {
                        os_disk: OsDisk {
                            create_option: DiskCreateOption::FromImage,
                        },
                        image_reference: image,
                    },
                    os_profile: OsProfile {
                        admin_username: admin_username.clone(),
                        computer_name: vm_name,
                        custom_data,
                        linux_configuration: LinuxConfiguration {
                            disable_password_authentication: true,
                            ssh: SshConfiguration {
                                public_keys: vec![SshPublicKey {
                                    key_data,
                                    path: authorized_keys_path(&admin_username),
                                }],
                            },
                        },
                    },
                },
            );

        let state = stack.register(types::VIRTUAL_MACHINE, VM_RESOURCE_NAME, args)?;
        tracing::debug!(vm = %self.vm_name, image = %self.image, size = VM_SIZE, "Declared VM");

        Ok(VirtualMachineHandle {
            handle: ResourceHandle::new(VM_RESOURCE_NAME, state),
            vm_name: self.vm_name.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct VirtualMachineHandle {
    pub handle: ResourceHandle,
    pub vm_name: String,
}

impl VirtualMachineHandle {
    pub fn id(&self) -> Output<String> {
        self.handle.id()
    }
}

/// Declares the game-server VM.
///
/// `os_image` is parsed before anything is registered, so a malformed value
/// leaves the stack untouched.
pub fn declare_virtual_machine(
    stack: &mut Stack,
    group: &ResourceGroupHandle,
    network_interface: &ResourceHandle,
    os_image: &str,
    admin_username: &str,
    vm_name: &str,
    ssh_public_key: &Output<String>,
) -> Result<VirtualMachineHandle> {
    VirtualMachineSpec::new(vm_name, admin_username, os_image)?.declare(
        stack,
        group,
        network_interface,
        ssh_public_key,
    )
}
