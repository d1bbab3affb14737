//! Lunie CLI - staking state from the command line
//!
//!   lunie networks                        → networks known to the GraphQL endpoint
//!   lunie validators [--network <id>]     → all validators of a network
//!   lunie validator <address>             → one validator profile
//!   lunie sync --address <addr>           → one forced sync, prints state
//!   lunie watch --address <addr>          → follow the chain until Ctrl+C
//!
//! Endpoints come from LUNIE_* env vars (see `--help`), overridable by flags.
//!
//! Output format:
//!   --json     Compact JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use anyhow::{anyhow, bail, Context};
use lunie_client::logging::init_logging;
use lunie_client::runtime::install_signal_handlers;
use lunie_client::{Client, ClientConfig, SigningMethod};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_WATCH_INTERVAL_SECS: u64 = 6;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("lunie {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let Some(command) = opts.command.clone() else {
        print_usage();
        return;
    };

    let result = tokio::runtime::Runtime::new()
        .context("failed to create runtime")
        .and_then(|rt| rt.block_on(run(&command, &opts)));

    let pretty = !opts.json && (opts.pretty || std::io::stdout().is_terminal());
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{e:#}")}), pretty));
            std::process::exit(1);
        }
    }
}

async fn run(command: &str, opts: &ParsedArgs) -> anyhow::Result<Value> {
    match command {
        "networks" => cmd_networks(opts).await,
        "validators" => cmd_validators(opts).await,
        "validator" => cmd_validator(opts).await,
        "sync" => cmd_sync(opts).await,
        "watch" => cmd_watch(opts).await,
        other => bail!("Unknown command: {other}"),
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    target: Option<String>,
    network: Option<String>,
    lcd_url: Option<String>,
    graphql_url: Option<String>,
    address: Option<String>,
    height: Option<u64>,
    interval: Option<u64>,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let value = args.get(i + 1).cloned();
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--network" | "-n" => {
                    opts.network = value;
                    i += 1;
                }
                "--lcd" => {
                    opts.lcd_url = value;
                    i += 1;
                }
                "--graphql" => {
                    opts.graphql_url = value;
                    i += 1;
                }
                "--address" | "-a" => {
                    opts.address = value;
                    i += 1;
                }
                "--height" => {
                    opts.height = value.and_then(|v| v.parse().ok());
                    i += 1;
                }
                "--interval" | "-i" => {
                    opts.interval = value.and_then(|v| v.parse().ok());
                    i += 1;
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        let mut positional = positional.into_iter();
        opts.command = positional.next();
        opts.target = positional.next();
        opts
    }

    /// Env config with flags on top.
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        if let Some(network) = &self.network {
            config.network = network.clone();
        }
        if let Some(url) = &self.lcd_url {
            config = config.with_lcd_url(url.clone());
        }
        if let Some(url) = &self.graphql_url {
            config = config.with_graphql_url(Some(url.clone()));
        }
        Ok(config)
    }

    fn client(&self) -> anyhow::Result<Client> {
        Ok(Client::from_config(self.client_config()?)?)
    }

    fn address(&self) -> anyhow::Result<&str> {
        self.address
            .as_deref()
            .or(self.target.as_deref())
            .ok_or_else(|| anyhow!("--address <addr> is required"))
    }
}

fn print_usage() {
    println!(
        r#"lunie - staking wallet client

USAGE:
    lunie <command> [target] [options]

COMMANDS:
    networks                List networks
    validators              List validators of the current network
    validator <address>     Show one validator
    sync                    Fetch delegations, rewards and minting data once
    watch                   Poll the node and keep state fresh until Ctrl+C

OPTIONS:
    --network, -n <id>      Network id: cosmoshub|gaia-testnet (env: LUNIE_NETWORK)
    --lcd <url>             LCD REST endpoint (env: LUNIE_LCD_URL)
    --graphql <url>         GraphQL endpoint (env: LUNIE_GRAPHQL_URL)
    --address, -a <addr>    Delegator address (sync, watch)
    --height <n>            Header height to sync at (sync)
    --interval, -i <secs>   Poll interval (watch, default: 6)

OUTPUT OPTIONS:
    --json                  Compact JSON
    --pretty                Pretty-print JSON
    --version, -V           Print version

ENVIRONMENT:
    LUNIE_DENOM             Staking denom (default: uatom)
    LUNIE_LOG_FORMAT        pretty|compact|json
    RUST_LOG                Log filter (default: info)

EXAMPLES:
    lunie validators --network gaia-testnet
    lunie sync --address cosmos1... --json | jq .delegation.committed_delegates
    lunie watch --address cosmos1... --interval 10
"#
    );
}

async fn cmd_networks(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let networks = opts.client()?.load_networks().await?;
    Ok(serde_json::to_value(networks)?)
}

async fn cmd_validators(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let validators = opts.client()?.validators().await?;
    Ok(json!({"count": validators.len(), "validators": validators}))
}

async fn cmd_validator(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let address = opts.target.as_deref().ok_or_else(|| anyhow!("validator <address> is required"))?;
    match opts.client()?.validator(address).await? {
        Some(validator) => Ok(serde_json::to_value(validator)?),
        None => bail!("validator {address} not found"),
    }
}

/// Sign in read-only and mark the node reachable at `height`.
async fn start_session(client: &Client, address: &str, height: u64) {
    client
        .store()
        .update(|state| {
            state.set_connected(true);
            state.set_last_header_height(height);
        })
        .await;
    client.sign_in(address, SigningMethod::Extension).await;
}

async fn cmd_sync(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let client = opts.client()?;
    let address = opts.address()?;
    let height = match opts.height {
        Some(height) => height,
        None => client.synchronizer().node().latest_height().await.context("fetching latest height")?,
    };

    start_session(&client, address, height).await;
    let state = client.store().snapshot().await;
    Ok(serde_json::to_value(state)?)
}

async fn cmd_watch(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let client = opts.client()?;
    let address = opts.address()?;
    let interval = Duration::from_secs(opts.interval.unwrap_or(DEFAULT_WATCH_INTERVAL_SECS).max(1));
    let shutdown = install_signal_handlers();

    let height = client.synchronizer().node().latest_height().await.context("fetching latest height")?;
    start_session(&client, address, height).await;
    info!(%address, height, "watching");

    let mut polls = 0u64;
    while shutdown.sleep(interval).await {
        polls += 1;
        match client.synchronizer().poll().await {
            Ok((height, report)) => {
                for (module, outcome) in report {
                    info!(height, module, ?outcome, "sync");
                }
            }
            Err(e) => warn!(error = %e, "poll failed"),
        }
    }

    info!("shutdown signal received, stopping");
    let state = client.store().snapshot().await;
    Ok(json!({"status": "stopped", "polls": polls, "state": state}))
}
