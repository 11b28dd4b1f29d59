// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WagerGenie - AI-assisted sports betting picks.
//!
//! This is the binary entry point for the WagerGenie web server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wagergenie_config::model::GenieConfig;

/// WagerGenie - AI-assisted sports betting picks.
#[derive(Parser, Debug)]
#[command(name = "wagergenie", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start the web server (the default).
    Serve,
    /// Validate the configuration and exit.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> GenieConfig {
    let loaded = match path {
        Some(path) => wagergenie_config::load_and_validate_path(path),
        None => wagergenie_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            wagergenie_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::CheckConfig => {
            println!(
                "wagergenie: config ok (app.name={}, listen={}:{})",
                config.app.name, config.server.host, config.server.port
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["wagergenie"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_after_subcommand() {
        let cli =
            Cli::try_parse_from(["wagergenie", "check-config", "--config", "/etc/genie.toml"])
                .unwrap();
        assert_eq!(cli.command, Some(Commands::CheckConfig));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/genie.toml")));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["wagergenie", "shell"]).is_err());
    }

    #[test]
    fn config_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wagergenie.toml");
        std::fs::write(
            &path,
            r#"
[provider]
url = "https://project.supabase.co"
anon_key = "anon"

[server]
port = 4100
"#,
        )
        .unwrap();
        let config = load_config(Some(&path));
        assert_eq!(config.server.port, 4100);
    }
}
