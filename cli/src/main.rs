//! vellum - render a template using environment variables and vault
//! secrets.
//!
//! Reads a template from a file or standard input, authenticates against
//! the configured vault, and writes the rendered output to a file or
//! standard output. Nothing is written if rendering fails partway.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vellum::env::environment;
use vellum::render::Renderer;
use vellum_vault::{Session, VaultConfig};

#[derive(Parser)]
#[command(
    name = "vellum",
    about = "Templates a file using environment variables and vault values",
    version
)]
struct Cli {
    /// Template file to render; '-' or omitted reads standard input
    #[arg(value_name = "FILE")]
    template: Option<PathBuf>,

    /// Vault server address, including protocol and port
    #[arg(short = 'v', long, env = "VAULT_ADDR")]
    vault_addr: Option<String>,

    /// Vault token
    #[arg(short = 't', long, env = "VAULT_TOKEN")]
    vault_token: Option<String>,

    /// Vault App-ID
    #[arg(short = 'a', long, env = "APP_ID")]
    app_id: Option<String>,

    /// Path to the user-id file for App-ID authentication
    #[arg(short = 'u', long, env = "USER_ID_PATH")]
    user_id_path: Option<PathBuf>,

    /// Write output to this file instead of standard output
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl Cli {
    fn vault_config(&self) -> VaultConfig {
        let mut config = VaultConfig::new(self.vault_addr.clone().unwrap_or_default());
        if let Some(token) = &self.vault_token {
            config = config.with_token(token.clone());
        }
        config.app_id = self.app_id.clone();
        config.user_id_path = self.user_id_path.clone();
        config
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("vellum: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.vault_config();
    config.validate().context("invalid configuration")?;

    let session = Session::authenticate(&config).context("error configuring vault")?;

    let source = read_template(cli.template.as_deref()).context("error reading template")?;

    let mut renderer = Renderer::new(Arc::new(session));
    renderer.parse(&source).context("error parsing template")?;
    let output = renderer
        .render(&environment())
        .context("error populating template")?;
    debug!(bytes = output.len(), "template rendered");

    // Only a fully rendered result reaches the sink.
    write_output(cli.output.as_deref(), &output).context("error writing output")?;
    Ok(())
}

fn read_template(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::read_to_string(path).with_context(|| format!("{}", path.display()))
        }
        _ => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn write_output(path: Option<&Path>, output: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, output).with_context(|| format!("{}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output)?;
            stdout.flush()?;
            Ok(())
        }
    }
}
