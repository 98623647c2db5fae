//! # cookie-cloud
//!
//! CLI tool for Cookie Cloud: manage the local key and peers, read synced
//! cookies and headers, and resolve placeholders the way the browser
//! extension would.
//!
//! ## Commands
//!
//! - `keygen`: Generate a key pair (optionally save it as the local key)
//! - `pubkey`: Print the local public key
//! - `peer`: Add, remove, list peers and pick the default
//! - `cache-time`, `endpoint`, `enable`, `disable`: Edit settings
//! - `id`: Print the remote ids for a domain's cookie scopes
//! - `fetch`: Fetch and decrypt a domain's records
//! - `cookie`: Print the Cookie header a peer's records produce for a URL
//! - `resolve`: Resolve `!{..}` / `${..}` placeholders in headers
//! - `seal`: Encrypt a payload for a set of recipients
//!
//! ## Example
//!
//! ```bash
//! cookie-cloud keygen --save
//! cookie-cloud endpoint https://store.example
//! cookie-cloud peer add alice alice-chrome 02ab... --default
//! cookie-cloud enable
//!
//! cookie-cloud cookie --peer alice https://www.qq.com/
//! cookie-cloud resolve https://www.qq.com/ -H 'Cookie: sid=${alice}'
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cookie_client::HttpTransport;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{fetch, id, keys, peer, resolve, seal, settings};

/// CLI tool for Cookie Cloud end-to-end encrypted cookie sync.
#[derive(Parser, Debug)]
#[command(name = "cookie-cloud")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a secp256k1 key pair
    Keygen {
        /// Store the private key as the local key
        #[arg(long)]
        save: bool,

        /// Replace an existing local key
        #[arg(long, requires = "save")]
        force: bool,
    },

    /// Print the local public key
    Pubkey,

    /// Manage peers
    Peer {
        #[command(subcommand)]
        action: PeerAction,
    },

    /// Set the cache lifetime in minutes (0 disables caching)
    CacheTime {
        /// Minutes
        #[arg(allow_hyphen_values = true)]
        minutes: i64,
    },

    /// Set the store endpoint
    Endpoint {
        /// Base URL, e.g. https://store.example
        url: String,
    },

    /// Enable request rewriting
    Enable,

    /// Disable request rewriting
    Disable,

    /// Print the remote id for each cookie scope of a domain
    Id {
        /// Peer alias (default peer if omitted)
        #[arg(long, default_value = "")]
        peer: String,

        /// Domain, e.g. www.qq.com
        domain: String,
    },

    /// Fetch and decrypt the records for a domain
    Fetch {
        /// Peer alias (default peer if omitted)
        #[arg(long, default_value = "")]
        peer: String,

        /// Domain, e.g. www.qq.com
        domain: String,
    },

    /// Print the Cookie header for a URL
    Cookie {
        /// Peer alias (default peer if omitted)
        #[arg(long, default_value = "")]
        peer: String,

        /// Request URL
        url: String,

        /// Bypass the cache
        #[arg(long)]
        force: bool,
    },

    /// Resolve placeholders in request headers
    Resolve {
        /// Request URL
        url: String,

        /// Header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },

    /// Encrypt a payload for one or more recipients
    Seal {
        /// Recipient public key (repeatable)
        #[arg(long = "to", required = true)]
        recipients: Vec<String>,

        /// Payload JSON (or use --file)
        json: Option<String>,

        /// File holding the payload JSON
        #[arg(long, short, conflicts_with = "json")]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum PeerAction {
    /// Add a peer
    Add {
        /// Local alias used in placeholders
        name: String,
        /// Name the peer publishes under
        peer_name: String,
        /// Peer public key (hex)
        public_key: String,
        /// Make this the default peer
        #[arg(long)]
        default: bool,
    },

    /// Remove a peer
    Remove {
        /// Alias
        name: String,
    },

    /// Make a peer the default
    Default {
        /// Alias
        name: String,
    },

    /// List peers
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.command {
        Commands::Keygen { save, force } => {
            keys::keygen(&config_path, save, force).await?;
        }
        Commands::Pubkey => {
            keys::pubkey(&config_path).await?;
        }
        Commands::Peer { action } => match action {
            PeerAction::Add {
                name,
                peer_name,
                public_key,
                default,
            } => {
                peer::add(&config_path, &name, &peer_name, &public_key, default).await?;
            }
            PeerAction::Remove { name } => {
                peer::remove(&config_path, &name).await?;
            }
            PeerAction::Default { name } => {
                peer::set_default(&config_path, &name).await?;
            }
            PeerAction::List => {
                peer::list(&config_path).await?;
            }
        },
        Commands::CacheTime { minutes } => {
            settings::cache_time(&config_path, minutes).await?;
        }
        Commands::Endpoint { url } => {
            settings::endpoint(&config_path, &url).await?;
        }
        Commands::Enable => {
            settings::set_enabled(&config_path, true).await?;
        }
        Commands::Disable => {
            settings::set_enabled(&config_path, false).await?;
        }
        Commands::Id { peer, domain } => {
            let settings = config::load_existing(&config_path).await?;
            id::run(&settings, &peer, &domain)?;
        }
        Commands::Fetch { peer, domain } => {
            let settings = config::load_existing(&config_path).await?;
            let out = fetch::fetch(settings, HttpTransport::new()?, &peer, &domain).await?;
            println!("{}", out);
        }
        Commands::Cookie { peer, url, force } => {
            let settings = config::load_existing(&config_path).await?;
            let out = fetch::cookie(settings, HttpTransport::new()?, &peer, &url, force).await?;
            println!("{}", out);
        }
        Commands::Resolve { url, headers } => {
            let settings = config::load_existing(&config_path).await?;
            resolve::run(settings, HttpTransport::new()?, &url, &headers).await?;
        }
        Commands::Seal {
            recipients,
            json,
            file,
        } => {
            let payload = if let Some(json) = json {
                json
            } else if let Some(path) = file {
                tokio::fs::read_to_string(&path)
                    .await
                    .context("Failed to read file")?
            } else {
                anyhow::bail!("Must specify payload JSON or --file");
            };
            let settings = config::load_existing(&config_path).await?;
            seal::run(&settings, &recipients, &payload)?;
        }
    }

    Ok(())
}

/// Get the default configuration file path.
fn default_config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "cookie-cloud", "cookie-cloud")
        .context("Could not determine home directory")?;
    Ok(dirs.config_dir().join("cookie-cloud.json"))
}
