use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use csust_portal::config::{Account, Config};
use csust_portal::portal::{self, LivePortal, Outcome, status};

#[derive(Parser)]
#[command(name = "csust-portal")]
#[command(about = "Captive-portal auto-login for the CSUST campus network")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to the per-user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the portal and retry until connectivity is confirmed
    Login {
        /// Use this account id instead of a random draw
        #[arg(short, long)]
        account: Option<String>,
    },
    /// Stay logged in: probe connectivity and re-login when it drops
    Watch,
    /// Show the portal's view of this client and probe the internet
    Status,
    /// Generate default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging on stderr; stdout is for the user-facing banners
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Login { account } => {
            let config = load_config(cli.config.as_deref())?;
            let accounts = match account {
                Some(id) => vec![forced_account(&config, &id)?],
                None => config.selectable_accounts()?.to_vec(),
            };

            let outcome = portal::run(&LivePortal, &accounts, config.retry.policy()).await;
            match outcome {
                Outcome::Connected => {
                    println!("==============");
                    println!("  Login succeeded");
                    println!("==============");
                    println!("This tool may be studied and shared, but never sold.");
                }
                Outcome::ManualIntervention(reason) => {
                    println!("Login aborted: {}", reason);
                    println!("Fix the connection, then run `csust-portal login` again.");
                    std::process::exit(1);
                }
                Outcome::RetriesExhausted => {
                    println!("Could not get online within the configured number of attempts.");
                    std::process::exit(1);
                }
            }
        }
        Commands::Watch => {
            let config = load_config(cli.config.as_deref())?;
            csust_portal::watch::watch(&config).await?;
        }
        Commands::Status => {
            show_status().await;
        }
        Commands::Init => {
            info!("Generating default config...");
            let path = cli
                .config
                .or_else(Config::default_path)
                .unwrap_or_else(|| PathBuf::from("csust-portal.toml"));
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Config::default().save(&path)?;
            println!("Created default config: {}", path.display());
            println!("Edit it to add your accounts; the first entry is a reserved");
            println!("template slot and is never selected.");
        }
    }

    Ok(())
}

fn load_config(override_path: Option<&std::path::Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()
            .ok_or("could not determine the config directory; pass --config")?,
    };
    Config::load(&path).map_err(|e| {
        format!(
            "{} ({}); run `csust-portal init` to create one",
            e,
            path.display()
        )
        .into()
    })
}

/// Resolve `login --account`: prefer the configured entry, otherwise
/// prompt for the password on the terminal.
fn forced_account(config: &Config, id: &str) -> Result<Account, std::io::Error> {
    if let Some(found) = config.find_account(id) {
        return Ok(found.clone());
    }
    info!("Account {} not in the config, asking for its password", id);
    let password = rpassword::prompt_password(format!("Password for {}: ", id))?;
    Ok(Account {
        account: id.to_string(),
        password,
    })
}

async fn show_status() {
    match status::fetch_status_body().await {
        Ok(body) => {
            match status::parse_chkstatus(&body) {
                Some(payload) => {
                    let online = payload["result"] == 1 || payload["result"] == "1";
                    println!(
                        "Portal session: {}",
                        if online { "logged in" } else { "not logged in" }
                    );
                    if let Some(account) = payload["account"].as_str() {
                        println!("  Account: {}", account);
                    }
                }
                None => println!("Portal session: response not understood"),
            }
            match status::extract_v46ip(&body) {
                Some(address) => println!("  Client address: {}", address),
                None => println!("  Client address: unknown"),
            }
        }
        Err(e) => println!("Status check failed: {}", e),
    }

    let reachable = csust_portal::portal::probe::check_connectivity().await;
    println!(
        "Internet: {}",
        if reachable { "reachable" } else { "unreachable" }
    );
}
