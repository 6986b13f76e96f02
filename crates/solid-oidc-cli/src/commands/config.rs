use anyhow::Result;
use solid_oidc_auth::ClientConfig;

use crate::cli::OutputFormat;
use crate::config::default_config_path;
use crate::output::print_json;

pub fn show(config: &ClientConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Table => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
    }
}

pub fn path() -> Result<()> {
    println!("{}", default_config_path()?.display());
    Ok(())
}
