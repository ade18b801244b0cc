//! az CLI wrapper
//!
//! Wraps the `az` commands needed to create the game-server resources.
//! Argument lists are built by plain functions so they can be checked
//! without a subscription.

use crate::boot_script::decode_custom_data;
use crate::error::{AzureError, Result};
use crate::resources::{
    GetPublicIpAddressArgs, NetworkInterfaceArgs, NetworkSecurityGroupArgs, PublicIpAddressArgs,
    ResourceGroupArgs, SecurityRule, VirtualMachineArgs, VirtualNetworkArgs,
};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Keys under which `az ... create` nests the created resource
const RESULT_WRAPPERS: [&str; 4] = ["newVNet", "publicIp", "NewNSG", "NewNIC"];

/// `az account show` result
#[derive(Debug, Clone, Deserialize)]
pub struct AzAccount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub user: Option<AzUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AzUser {
    pub name: String,
}

/// az CLI wrapper
#[derive(Debug, Clone, Default)]
pub struct AzCli {
    subscription: Option<String>,
}

impl AzCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command against `subscription` instead of the default one
    pub fn with_subscription(subscription: impl Into<String>) -> Self {
        Self {
            subscription: Some(subscription.into()),
        }
    }

    /// Check if az is installed and logged in
    pub async fn check_auth(&self) -> Result<AzAccount> {
        let which = Command::new("which").arg("az").output().await?;
        if !which.status.success() {
            return Err(AzureError::AzNotFound);
        }

        let output = self
            .run_json(&strings(&["account", "show"]))
            .await
            .map_err(|e| match e {
                AzureError::CommandFailed(message) => AzureError::AuthenticationFailed(message),
                other => other,
            })?;
        Ok(serde_json::from_value(output)?)
    }

    /// Run an az command and parse its JSON output
    async fn run_json(&self, args: &[String]) -> Result<Value> {
        let mut cmd = Command::new("az");
        cmd.args(args);
        cmd.args(["--output", "json", "--only-show-errors"]);
        if let Some(subscription) = &self.subscription {
            cmd.arg("--subscription").arg(subscription);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: az {}", args.join(" "));

        let output = cmd.output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AzureError::AzNotFound,
            _ => AzureError::IoError(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::CommandFailed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&stdout)?)
    }

    pub async fn create_resource_group(&self, args: &ResourceGroupArgs) -> Result<Value> {
        self.run_json(&group_create_args(args)).await
    }

    pub async fn create_virtual_network(&self, args: &VirtualNetworkArgs) -> Result<Value> {
        self.run_json(&vnet_create_args(args)?).await.map(unwrap_result)
    }

    pub async fn create_public_ip(&self, args: &PublicIpAddressArgs) -> Result<Value> {
        self.run_json(&public_ip_create_args(args)).await.map(unwrap_result)
    }

    /// Creates the group, then each of its rules
    pub async fn create_network_security_group(
        &self,
        args: &NetworkSecurityGroupArgs,
    ) -> Result<Value> {
        let group = self.run_json(&nsg_create_args(args)).await.map(unwrap_result)?;
        for rule in &args.security_rules {
            self.run_json(&nsg_rule_create_args(args, rule)).await?;
        }
        Ok(group)
    }

    pub async fn create_network_interface(&self, args: &NetworkInterfaceArgs) -> Result<Value> {
        self.run_json(&nic_create_args(args)?).await.map(unwrap_result)
    }

    /// The boot script goes through a temporary file; az encodes it again
    pub async fn create_virtual_machine(&self, args: &VirtualMachineArgs) -> Result<Value> {
        let script = decode_custom_data(&args.os_profile.custom_data)?;
        let custom_data = tempfile::Builder::new()
            .prefix("gameserver-boot-")
            .suffix(".sh")
            .tempfile()?;
        tokio::fs::write(custom_data.path(), script).await?;

        self.run_json(&vm_create_args(args, custom_data.path())?)
            .await
    }

    pub async fn show_public_ip(&self, args: &GetPublicIpAddressArgs) -> Result<Value> {
        self.run_json(&public_ip_show_args(args)).await
    }
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Strips the wrapper object some create commands put around the resource
pub fn unwrap_result(value: Value) -> Value {
    for key in RESULT_WRAPPERS {
        if let Some(inner) = value.get(key) {
            return inner.clone();
        }
    }
    value
}

/// `id` of a created resource, looking through any wrapper object
pub fn resource_id(value: &Value) -> Option<String> {
    unwrap_result(value.clone())
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub fn provisioning_state(value: &Value) -> Option<String> {
    unwrap_result(value.clone())
        .get("provisioningState")
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub fn group_create_args(args: &ResourceGroupArgs) -> Vec<String> {
    strings(&[
        "group",
        "create",
        "--name",
        args.resource_group_name.as_str(),
        "--location",
        args.location.as_str(),
    ])
}

pub fn vnet_create_args(args: &VirtualNetworkArgs) -> Result<Vec<String>> {
    let subnet = args.subnets.first().ok_or_else(|| {
        AzureError::UnexpectedOutput(format!(
            "virtual network {} declares no subnet",
            args.virtual_network_name
        ))
    })?;

    let mut cmd = strings(&[
        "network",
        "vnet",
        "create",
        "--resource-group",
        args.resource_group_name.as_str(),
        "--name",
        args.virtual_network_name.as_str(),
        "--location",
        args.location.as_str(),
        "--address-prefixes",
    ]);
    cmd.extend(args.address_space.address_prefixes.iter().cloned());
    cmd.extend(strings(&[
        "--subnet-name",
        subnet.name.as_str(),
        "--subnet-prefixes",
        subnet.address_prefix.as_str(),
    ]));
    Ok(cmd)
}

pub fn public_ip_create_args(args: &PublicIpAddressArgs) -> Vec<String> {
    strings(&[
        "network",
        "public-ip",
        "create",
        "--resource-group",
        args.resource_group_name.as_str(),
        "--name",
        args.public_ip_address_name.as_str(),
        "--location",
        args.location.as_str(),
        // Dynamic allocation is only offered on the Basic SKU
        "--sku",
        "Basic",
        "--allocation-method",
        args.public_ip_allocation_method.as_str(),
        "--dns-name",
        args.dns_settings.domain_name_label.as_str(),
    ])
}

pub fn nsg_create_args(args: &NetworkSecurityGroupArgs) -> Vec<String> {
    strings(&[
        "network",
        "nsg",
        "create",
        "--resource-group",
        args.resource_group_name.as_str(),
        "--name",
        args.network_security_group_name.as_str(),
        "--location",
        args.location.as_str(),
    ])
}

pub fn nsg_rule_create_args(group: &NetworkSecurityGroupArgs, rule: &SecurityRule) -> Vec<String> {
    let priority = rule.priority.to_string();
    let direction = format!("{:?}", rule.direction);
    let access = format!("{:?}", rule.access);

    let mut cmd = strings(&[
        "network",
        "nsg",
        "rule",
        "create",
        "--resource-group",
        group.resource_group_name.as_str(),
        "--nsg-name",
        group.network_security_group_name.as_str(),
        "--name",
        rule.name.as_str(),
        "--priority",
        priority.as_str(),
        "--direction",
        direction.as_str(),
        "--access",
        access.as_str(),
        "--protocol",
        rule.protocol.as_str(),
        "--source-port-ranges",
        rule.source_port_range.as_str(),
        "--source-address-prefixes",
        rule.source_address_prefix.as_str(),
        "--destination-address-prefixes",
        rule.destination_address_prefix.as_str(),
        "--destination-port-ranges",
    ]);
    cmd.extend(rule.destination_port_ranges.iter().cloned());
    cmd
}

pub fn nic_create_args(args: &NetworkInterfaceArgs) -> Result<Vec<String>> {
    let ip_config = args.ip_configurations.first().ok_or_else(|| {
        AzureError::UnexpectedOutput(format!(
            "network interface {} declares no IP configuration",
            args.network_interface_name
        ))
    })?;

    Ok(strings(&[
        "network",
        "nic",
        "create",
        "--resource-group",
        args.resource_group_name.as_str(),
        "--name",
        args.network_interface_name.as_str(),
        "--location",
        args.location.as_str(),
        "--subnet",
        ip_config.subnet.id.as_str(),
        "--public-ip-address",
        ip_config.public_ip_address.id.as_str(),
        "--network-security-group",
        args.network_security_group.id.as_str(),
    ]))
}

pub fn vm_create_args(args: &VirtualMachineArgs, custom_data: &Path) -> Result<Vec<String>> {
    let key = args
        .os_profile
        .linux_configuration
        .ssh
        .public_keys
        .first()
        .ok_or_else(|| {
            AzureError::UnexpectedOutput(format!("VM {} declares no SSH key", args.vm_name))
        })?;
    let nics: Vec<String> = args
        .network_profile
        .network_interfaces
        .iter()
        .map(|nic| nic.id.clone())
        .collect();
    let image = args.storage_profile.image_reference.to_string();
    let authentication_type = if args.os_profile.linux_configuration.disable_password_authentication
    {
        "ssh"
    } else {
        "all"
    };

    let mut cmd = strings(&[
        "vm",
        "create",
        "--resource-group",
        args.resource_group_name.as_str(),
        "--name",
        args.vm_name.as_str(),
        "--location",
        args.location.as_str(),
        "--size",
        args.hardware_profile.vm_size.as_str(),
        "--image",
        image.as_str(),
        "--admin-username",
        args.os_profile.admin_username.as_str(),
        "--computer-name",
        args.os_profile.computer_name.as_str(),
        "--authentication-type",
        authentication_type,
        "--ssh-key-values",
        key.key_data.as_str(),
        "--ssh-dest-key-path",
        key.path.as_str(),
        "--custom-data",
    ]);
    cmd.push(custom_data.display().to_string());
    cmd.push("--nics".to_string());
    cmd.extend(nics);
    Ok(cmd)
}

pub fn public_ip_show_args(args: &GetPublicIpAddressArgs) -> Vec<String> {
    strings(&[
        "network",
        "public-ip",
        "show",
        "--resource-group",
        args.resource_group_name.as_str(),
        "--name",
        args.public_ip_address_name.as_str(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boot_script::BootScript;
    use crate::resources::{
        AddressSpace, DiskCreateOption, HardwareProfile, IpAllocationMethod, IpConfiguration,
        LinuxConfiguration, NetworkInterfaceReference, NetworkProfile, OsDisk, OsProfile,
        PublicIpDnsSettings, SecurityRuleAccess, SecurityRuleDirection, SecurityRuleProtocol,
        SshConfiguration, SshPublicKey, StorageProfile, SubResource, SubnetArgs,
    };
    use serde_json::json;

    fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_resource_id_through_wrappers() {
        assert_eq!(
            resource_id(&json!({"newVNet": {"id": "/vnet", "provisioningState": "Succeeded"}})),
            Some("/vnet".to_string())
        );
        assert_eq!(
            resource_id(&json!({"NewNIC": {"id": "/nic"}})),
            Some("/nic".to_string())
        );
        assert_eq!(
            resource_id(&json!({"id": "/vm", "powerState": "VM running"})),
            Some("/vm".to_string())
        );
        assert_eq!(resource_id(&json!({})), None);
        assert_eq!(
            provisioning_state(&json!({"publicIp": {"provisioningState": "Succeeded"}})).as_deref(),
            Some("Succeeded")
        );
    }

    #[test]
    fn test_vnet_args() {
        let args = vnet_create_args(&VirtualNetworkArgs {
            resource_group_name: "rg".to_string(),
            virtual_network_name: "test-vnet".to_string(),
            location: "EastUS".to_string(),
            address_space: AddressSpace {
                address_prefixes: vec!["10.0.0.0/16".to_string()],
            },
            subnets: vec![SubnetArgs {
                name: "subnet".to_string(),
                address_prefix: "10.0.1.0/24".to_string(),
            }],
        })
        .unwrap();
        assert_eq!(&args[..3], ["network", "vnet", "create"]);
        assert_eq!(flag_value(&args, "--address-prefixes"), Some("10.0.0.0/16"));
        assert_eq!(flag_value(&args, "--subnet-name"), Some("subnet"));
        assert_eq!(flag_value(&args, "--subnet-prefixes"), Some("10.0.1.0/24"));
    }

    #[test]
    fn test_public_ip_args() {
        let args = public_ip_create_args(&PublicIpAddressArgs {
            resource_group_name: "rg".to_string(),
            public_ip_address_name: "test-ip".to_string(),
            location: "EastUS".to_string(),
            public_ip_allocation_method: IpAllocationMethod::Dynamic,
            dns_settings: PublicIpDnsSettings {
                domain_name_label: "test-ab12cd34".to_string(),
            },
        });
        assert_eq!(flag_value(&args, "--allocation-method"), Some("Dynamic"));
        assert_eq!(flag_value(&args, "--dns-name"), Some("test-ab12cd34"));
    }

    #[test]
    fn test_rule_args_list_each_port() {
        let group = NetworkSecurityGroupArgs {
            resource_group_name: "rg".to_string(),
            network_security_group_name: "test-nsg".to_string(),
            location: "EastUS".to_string(),
            security_rules: vec![SecurityRule {
                name: "securityrule".to_string(),
                priority: 1000,
                direction: SecurityRuleDirection::Inbound,
                access: SecurityRuleAccess::Allow,
                protocol: SecurityRuleProtocol::Tcp,
                source_port_range: "*".to_string(),
                source_address_prefix: "*".to_string(),
                destination_address_prefix: "*".to_string(),
                destination_port_ranges: vec!["8080".to_string(), "22".to_string()],
            }],
        };
        let args = nsg_rule_create_args(&group, &group.security_rules[0]);
        assert_eq!(flag_value(&args, "--nsg-name"), Some("test-nsg"));
        assert_eq!(flag_value(&args, "--priority"), Some("1000"));
        assert_eq!(flag_value(&args, "--direction"), Some("Inbound"));
        assert_eq!(flag_value(&args, "--access"), Some("Allow"));
        assert_eq!(flag_value(&args, "--protocol"), Some("Tcp"));
        assert_eq!(&args[args.len() - 3..], ["--destination-port-ranges", "8080", "22"]);
    }

    #[test]
    fn test_nic_args_reference_ids() {
        let args = nic_create_args(&NetworkInterfaceArgs {
            resource_group_name: "rg".to_string(),
            network_interface_name: "test-nic".to_string(),
            location: "EastUS".to_string(),
            network_security_group: SubResource {
                id: "/nsg".to_string(),
            },
            ip_configurations: vec![IpConfiguration {
                name: "ipconfiguration".to_string(),
                private_ip_allocation_method: IpAllocationMethod::Dynamic,
                subnet: SubResource {
                    id: "/vnet/subnets/subnet".to_string(),
                },
                public_ip_address: SubResource {
                    id: "/ip".to_string(),
                },
            }],
        })
        .unwrap();
        assert_eq!(flag_value(&args, "--subnet"), Some("/vnet/subnets/subnet"));
        assert_eq!(flag_value(&args, "--public-ip-address"), Some("/ip"));
        assert_eq!(flag_value(&args, "--network-security-group"), Some("/nsg"));
    }

    #[test]
    fn test_vm_args() {
        let vm = VirtualMachineArgs {
            resource_group_name: "rg".to_string(),
            vm_name: "test".to_string(),
            location: "EastUS".to_string(),
            network_profile: NetworkProfile {
                network_interfaces: vec![NetworkInterfaceReference {
                    id: "/nic".to_string(),
                    primary: true,
                }],
            },
            hardware_profile: HardwareProfile {
                vm_size: "Standard_D2_v2".to_string(),
            },
            storage_profile: StorageProfile {
                os_disk: OsDisk {
                    create_option: DiskCreateOption::FromImage,
                },
                image_reference: "pub:off:sku:ver".parse().unwrap(),
            },
            os_profile: OsProfile {
                admin_username: "pulumiuser".to_string(),
                computer_name: "test".to_string(),
                custom_data: BootScript::default().to_custom_data(),
                linux_configuration: LinuxConfiguration {
                    disable_password_authentication: true,
                    ssh: SshConfiguration {
                        public_keys: vec![SshPublicKey {
                            key_data: "ssh-rsa AAAA".to_string(),
                            path: "/home/pulumiuser/.ssh/authorized_keys".to_string(),
                        }],
                    },
                },
            },
        };
        let args = vm_create_args(&vm, Path::new("/tmp/boot.sh")).unwrap();
        assert_eq!(flag_value(&args, "--image"), Some("pub:off:sku:ver"));
        assert_eq!(flag_value(&args, "--size"), Some("Standard_D2_v2"));
        assert_eq!(flag_value(&args, "--computer-name"), Some("test"));
        assert_eq!(flag_value(&args, "--authentication-type"), Some("ssh"));
        assert_eq!(
            flag_value(&args, "--ssh-dest-key-path"),
            Some("/home/pulumiuser/.ssh/authorized_keys")
        );
        assert_eq!(flag_value(&args, "--custom-data"), Some("/tmp/boot.sh"));
        assert_eq!(flag_value(&args, "--nics"), Some("/nic"));
    }
}
