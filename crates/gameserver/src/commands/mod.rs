pub mod outputs;
pub mod preview;
pub mod up;

use colored::Colorize;
use gameserver_cloud::{ActionType, Plan};
use gameserver_config::{ConfigReader, DeploymentConfig};
use std::path::PathBuf;

/// Stack name recorded in `.gameserver/state.json`
pub const STACK_NAME: &str = "gameserver";

/// Resolved settings plus the file they came from
pub struct LoadedConfig {
    pub deployment: DeploymentConfig,
    pub source: Option<PathBuf>,
}

/// Discovers the config file and applies `-c key=value` overrides on top
pub fn load_config(overrides: &[String]) -> anyhow::Result<LoadedConfig> {
    let mut reader = ConfigReader::discover()?;
    for pair in overrides {
        reader.apply_override(pair)?;
    }

    Ok(LoadedConfig {
        source: reader.source().map(|p| p.to_path_buf()),
        deployment: DeploymentConfig::from_reader(&reader),
    })
}

pub fn print_config(loaded: &LoadedConfig) {
    match &loaded.source {
        Some(path) => println!("📄 Config: {}", path.display().to_string().cyan()),
        None => println!("📄 Config: {}", "(no config file, using defaults)".dimmed()),
    }

    let config = &loaded.deployment;
    println!("  vmName:            {}", config.vm_name.cyan());
    println!("  osImage:           {}", config.os_image);
    println!("  adminUsername:     {}", config.admin_username);
    println!("  servicePort:       {}", config.service_port);
    println!("  location:          {}", config.location);
    println!("  resourceGroupName: {}", config.resource_group_name);
}

pub fn print_plan(plan: &Plan) {
    println!();
    println!("{}", "Plan:".bold());
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Read => "~".blue(),
        };
        print!(
            "  {} {:<16} {}",
            marker,
            action.name.cyan(),
            action.resource_type.dimmed()
        );
        if !action.dependencies.is_empty() {
            print!("  {}", format!("after: {}", action.dependencies.join(", ")).dimmed());
        }
        if action.props.is_none() {
            print!("  {}", "(inputs known after apply)".dimmed());
        }
        println!();
    }
    println!();
    println!("{}", plan.summary().to_string().bold());
}

/// One output line; absent values print as `(none)`
pub fn print_output(name: &str, value: Option<&str>) {
    match value {
        Some(value) => println!("  {:<11} {}", format!("{}:", name), value),
        None => println!("  {:<11} {}", format!("{}:", name), "(none)".dimmed()),
    }
}
