use super::{LoadedConfig, STACK_NAME, print_config, print_output, print_plan};
use anyhow::Context;
use colored::Colorize;
use gameserver_azure::keys::{KEY_SECRET_NAME, RSA_BITS};
use gameserver_azure::outputs::names;
use gameserver_azure::{
    AzCli, AzureProvisioner, GameServerDeployment, ImageReference, KeyPair, ResolvedOutputs,
    load_key, load_or_create_key,
};
use gameserver_cloud::{
    ApplyResult, DeploymentRecord, DryRunProvisioner, ProjectStore, Provisioner, Secret, Stack,
    apply,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct UpOptions {
    pub yes: bool,
    pub dry_run: bool,
    pub show_secrets: bool,
    pub key_out: Option<PathBuf>,
    pub subscription: Option<String>,
}

pub async fn handle(loaded: &LoadedConfig, options: UpOptions) -> anyhow::Result<()> {
    println!("{}", "Deploying game server...".blue().bold());
    print_config(loaded);

    // A bad image must fail before a key is generated
    loaded.deployment.os_image.parse::<ImageReference>()?;

    let store = ProjectStore::new(std::env::current_dir()?);
    let key = match load_key(&store).await? {
        Some(key) => key,
        None if !options.yes => KeyPair::pending(),
        None if options.dry_run => KeyPair::generate()?,
        None => load_or_create_key(&store, RSA_BITS).await?,
    };

    let mut stack = Stack::new(STACK_NAME);
    let deployment = GameServerDeployment::declare_with_key(&mut stack, &loaded.deployment, &key)?;
    print_plan(&stack.plan());

    if !options.yes {
        println!();
        println!("{}", "Resources will be created in Azure.".yellow());
        println!("Pass --yes to apply");
        return Ok(());
    }

    // An unwritable path fails here, before anything exists in Azure
    let key_file = options
        .key_out
        .as_deref()
        .map(|path| open_key_file(path).map(|file| (path, file)))
        .transpose()?;

    let provisioner: Box<dyn Provisioner> = if options.dry_run {
        Box::new(DryRunProvisioner::new())
    } else {
        let az = match &options.subscription {
            Some(subscription) => AzCli::with_subscription(subscription),
            None => AzCli::new(),
        };
        Box::new(AzureProvisioner::new(az))
    };

    println!();
    println!("{}", "Checking authentication...".blue());
    let auth = provisioner.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "Not authenticated with {}: {}",
            provisioner.name(),
            auth.error.unwrap_or_default()
        );
    }
    if let Some(account) = &auth.account_info {
        println!("  {} {}", "✓".green(), account);
    }

    println!();
    println!("{}", "Applying...".blue());
    let result = apply(stack, provisioner.as_ref()).await;
    print_result(&result);

    let outputs = deployment.outputs.resolve().await;
    print_outputs(&outputs, options.show_secrets);

    if options.dry_run {
        println!();
        println!("{}", "Dry run: nothing was created in Azure.".dimmed());
    } else {
        let mut record = DeploymentRecord::new(STACK_NAME);
        for (name, resource) in &result.resources {
            record.set_resource(name.clone(), resource.clone());
        }
        outputs.write_to(&mut record);
        store.save(&record).await?;
        println!(
            "  {} SSH key kept in {}",
            "✓".green(),
            store.secret_path(KEY_SECRET_NAME).display()
        );
    }

    if let Some((path, file)) = key_file {
        write_private_key(file, path, &key.private_key)?;
        println!("  {} private key written to {}", "✓".green(), path.display());
    }

    if !result.is_success() {
        anyhow::bail!(
            "{} of {} nodes failed; resources created before the failure were kept",
            result.failed.len(),
            result.failed.len() + result.succeeded.len()
        );
    }
    Ok(())
}

fn print_result(result: &ApplyResult) {
    for success in &result.succeeded {
        println!("  {} {} {}", "✓".green(), success.name.cyan(), success.message.dimmed());
    }
    for failure in &result.failed {
        println!(
            "  {} {} {}",
            "✗".red(),
            failure.name.cyan(),
            failure.error.as_deref().unwrap_or("failed").red()
        );
    }
    println!(
        "{}",
        format!(
            "{} succeeded, {} failed in {} ms",
            result.succeeded.len(),
            result.failed.len(),
            result.duration_ms
        )
        .bold()
    );
}

fn print_outputs(outputs: &ResolvedOutputs, show_secrets: bool) {
    println!();
    println!("{}", "Outputs:".bold());
    print_output(names::IP, outputs.ip.as_deref());
    print_output(names::HOSTNAME, outputs.hostname.as_deref());
    print_output(names::URL, outputs.url.as_deref());

    match &outputs.private_key {
        Some(key) if show_secrets => {
            println!("  {}:", names::PRIVATE_KEY);
            println!("{}", key.expose());
        }
        Some(key) => print_output(names::PRIVATE_KEY, Some(&key.to_string())),
        None => print_output(names::PRIVATE_KEY, None),
    }
}

fn open_key_file(path: &Path) -> anyhow::Result<File> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}

fn write_private_key(mut file: File, path: &Path, key: &Secret) -> anyhow::Result<()> {
    file.write_all(key.expose().as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))
}
