use super::{LoadedConfig, STACK_NAME, print_config, print_plan};
use colored::Colorize;
use gameserver_azure::keys::KEY_SECRET_NAME;
use gameserver_azure::{GameServerDeployment, KeyPair, load_key};
use gameserver_cloud::{ProjectStore, Stack};

pub async fn handle(loaded: &LoadedConfig) -> anyhow::Result<()> {
    println!("{}", "Previewing game server deployment...".blue().bold());
    print_config(loaded);

    // Previews never create key material
    let store = ProjectStore::new(std::env::current_dir()?);
    let stored = load_key(&store).await?;
    let key = stored.clone().unwrap_or_else(KeyPair::pending);

    let mut stack = Stack::new(STACK_NAME);
    GameServerDeployment::declare_with_key(&mut stack, &loaded.deployment, &key)?;
    print_plan(&stack.plan());

    println!();
    let key_path = store.secret_path(KEY_SECRET_NAME);
    if stored.is_some() {
        println!("{} {}", "SSH key:".dimmed(), key_path.display());
    } else {
        println!(
            "{}",
            format!(
                "SSH key: generated on the first `up --yes` and kept in {}",
                key_path.display()
            )
            .dimmed()
        );
    }
    println!(
        "{}",
        "The DNS label suffix is drawn fresh on every run.".dimmed()
    );
    Ok(())
}
