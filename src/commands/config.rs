//! Config command handlers.

use anyhow::Result;

use slackstat::Config;

/// Print the current configuration as TOML.
pub fn show() -> Result<()> {
    let config = Config::load()?;
    let toml_str = toml::to_string_pretty(&config)?;
    print!("{}", toml_str);
    Ok(())
}

/// Print the config file path.
pub fn path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}

/// Write a default config file, unless one already exists.
pub fn init() -> Result<()> {
    let config_path = Config::config_path()?;
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return Ok(());
    }

    Config::default().save()?;
    println!("Created {}", config_path.display());
    Ok(())
}
