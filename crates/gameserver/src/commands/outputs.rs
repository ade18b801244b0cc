use super::print_output;
use colored::Colorize;
use gameserver_azure::keys::KEY_SECRET_NAME;
use gameserver_azure::outputs::names;
use gameserver_cloud::ProjectStore;

pub async fn handle(json: bool, show_secrets: bool) -> anyhow::Result<()> {
    let store = ProjectStore::new(std::env::current_dir()?);
    let record = store.load().await?.ok_or_else(|| {
        anyhow::anyhow!("No deployment record found. Run `gameserver up --yes` first")
    })?;
    let private_key = store.load_secret(KEY_SECRET_NAME).await?;

    if json {
        let mut outputs = record.outputs.clone();
        if show_secrets {
            if let Some(key) = &private_key {
                outputs.insert(
                    names::PRIVATE_KEY.to_string(),
                    serde_json::Value::String(key.expose().to_string()),
                );
            }
        }
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Last deployment:".bold(),
        record.updated_at.to_rfc3339().dimmed()
    );
    for name in [names::IP, names::HOSTNAME, names::URL] {
        let value = record.outputs.get(name).and_then(|v| v.as_str());
        print_output(name, value);
    }

    match private_key {
        Some(key) if show_secrets => {
            println!("  {}:", names::PRIVATE_KEY);
            println!("{}", key.expose());
        }
        Some(key) => {
            let path = store.secret_path(KEY_SECRET_NAME);
            print_output(
                names::PRIVATE_KEY,
                Some(&format!("{} ({})", key, path.display())),
            );
        }
        None => print_output(names::PRIVATE_KEY, None),
    }
    Ok(())
}
