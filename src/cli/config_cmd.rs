use anyhow::Result;

use crate::cli::output::OutputOptions;
use crate::core::api::validate_endpoint;
use crate::core::config::AppConfig;

pub fn init(
    account: Option<String>,
    api_url: Option<String>,
    _opts: &OutputOptions,
) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    if let Some(url) = &api_url {
        if let Err(e) = validate_endpoint(url) {
            eprintln!("Invalid API URL: {}", e);
            std::process::exit(1);
        }
    }

    let mut config = AppConfig::default();
    if let Some(account) = account {
        config.account.id = account;
    }
    config.api.base_url = api_url;

    match config.save() {
        Ok(path) => {
            println!("Generated config at {}", path.display());
            println!("  Account: {}", config.account.id);
            match &config.api.base_url {
                Some(url) => println!(
                    "  API: {} (token from ${})",
                    url, config.api.api_key_env
                ),
                None => println!("  API: not configured, using local data"),
            }
        }
        Err(e) => {
            eprintln!("Failed to generate config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

pub fn check(_opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if !path.exists() {
        eprintln!("No config file found at {}", path.display());
        eprintln!("Run `navi config init` to create one.");
        return Ok(());
    }

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let issues = config.validate();
    if issues.is_empty() {
        println!("Config is valid: {}", path.display());
        println!("  Account: {}", config.account.id);
        println!("  Store: {}", config.store_path().display());
        match &config.api.base_url {
            Some(url) => {
                let token = if config.api.api_key().is_some() {
                    "set"
                } else {
                    "not set"
                };
                println!("  API: {} (${} {})", url, config.api.api_key_env, token);
            }
            None => println!("  API: not configured"),
        }
    } else {
        eprintln!("Config issues found in {}:", path.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }
    Ok(())
}
