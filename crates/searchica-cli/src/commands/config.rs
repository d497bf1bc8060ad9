use anyhow::{Context, Result};
use searchica_client::config::{self, CONFIG_KEYS};
use searchica_client::Config;

/// Show the current effective configuration.
pub fn show_config(api_url: Option<String>) -> Result<()> {
    let config = Config::load()?.with_api_base_url(api_url);
    let config_path = config::config_file_path();

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config_path.display());
    let exists = config_path.exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    for key in CONFIG_KEYS {
        println!("  {}: {}", key, config.get(key)?);
    }
    println!("\nLog file (interactive UI): {}", config::default_log_path().display());

    println!("\nPriority: CLI args > ENV vars (SEARCHICA_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value, or print the whole config file.
pub fn get_config(key: Option<String>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;
        println!("{}", config.get(&key)?);
    } else {
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'searchica config init' to create it.");
        }
    }

    Ok(())
}

/// Set a config value in the config file.
pub fn set_config(key: &str, value: &str) -> Result<()> {
    let config_path = config::config_file_path();
    config::set_value(&config_path, key, value)?;

    println!("\u{2713} Updated {} = {}", key, value);
    println!("  in {}", config_path.display());

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let config_path = config::config_file_path();
    let created = config::ensure_config_file(&config_path)?;

    if created {
        println!("\u{2713} Created config file: {}", config_path.display());
        println!("\nEdit this file to configure searchica.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
