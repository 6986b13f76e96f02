use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "solid-oidc")]
#[command(about = "Solid-OIDC relying party: run the login flow and check a provider")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a client configuration file (TOML)
    #[arg(short, long, global = true, env = "SOLID_OIDC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, env = "SOLID_OIDC_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Requirement catalog used to annotate reports (overrides config)
    #[arg(long, global = true, env = "SOLID_OIDC_SPEC_DATA")]
    pub spec_data: Option<String>,

    /// Client identifier (overrides config)
    #[arg(long, global = true, env = "SOLID_OIDC_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Redirect URI (overrides config)
    #[arg(long, global = true, env = "SOLID_OIDC_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Allow plain http:// URLs (local testing only)
    #[arg(long, global = true, env = "SOLID_OIDC_ALLOW_HTTP")]
    pub allow_http: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch provider metadata and run the discovery checks
    Discover(IssuerArgs),
    /// Print an authorization URL and the PKCE verifier to keep for `token`
    Authorize(IssuerArgs),
    /// Exchange an authorization code and run the ID token checks
    Token(TokenArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct IssuerArgs {
    /// Issuer URL of the identity provider
    #[arg(short, long, env = "SOLID_OIDC_ISSUER")]
    pub issuer: String,
}

#[derive(clap::Args)]
pub struct TokenArgs {
    /// Issuer URL of the identity provider
    #[arg(short, long, env = "SOLID_OIDC_ISSUER")]
    pub issuer: String,
    /// Authorization code from the redirect
    #[arg(long)]
    pub code: String,
    /// PKCE verifier printed by `authorize`
    #[arg(long)]
    pub verifier: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the default config file location
    Path,
}
