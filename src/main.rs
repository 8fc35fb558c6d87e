//! nodeman - manage the hosts registered with a cluster node API

use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing_subscriber::EnvFilter;

use nodeman::api::{HttpNodeApi, NodeApi};
use nodeman::display::{format_nodes, format_saved};
use nodeman::models::{Config, Node, NodeDraft};
use nodeman::tui;
use nodeman::tui::app::{PageAction, PageState};

#[derive(Parser)]
#[command(name = "nodeman")]
#[command(about = "Manage the hosts registered with a cluster node API", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the node API (overrides config and NODEMAN_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive node page (default)
    #[command(alias = "ui")]
    Tui,

    /// Print all nodes, sorted by host name
    #[command(alias = "ls")]
    List {
        /// Watch mode: refresh every N seconds (0 disables)
        #[arg(short, long, value_name = "SECONDS", default_value = "0", value_parser = parse_watch_interval)]
        watch: f64,
    },

    /// Register a new node
    Add {
        /// Host name
        #[arg(long)]
        name: String,

        /// SSH port
        #[arg(long, default_value = "22", value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,

        /// SSH user
        #[arg(long)]
        user: String,

        /// SSH password
        #[arg(long)]
        password: String,
    },

    /// Update an existing node; omitted fields keep their current values
    Edit {
        /// Host name of the node to update
        name: String,

        /// SSH port
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,

        /// SSH user
        #[arg(long)]
        user: Option<String>,

        /// SSH password
        #[arg(long)]
        password: Option<String>,
    },
}

/// Shortest accepted watch interval in seconds
const MIN_WATCH_INTERVAL: f64 = 0.1;

/// Parse `--watch`: 0 disables, otherwise a finite number of seconds >= 0.1
fn parse_watch_interval(s: &str) -> std::result::Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if secs == 0.0 {
        return Ok(0.0);
    }
    if !secs.is_finite() || secs < MIN_WATCH_INTERVAL {
        return Err(format!(
            "must be 0 or a finite number of seconds >= {}",
            MIN_WATCH_INTERVAL
        ));
    }
    Ok(secs)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(interactive)?;

    let (config, warnings) = Config::load().context("failed to load configuration")?;
    let config = config.with_api_url(cli.api_url);
    if !interactive {
        for warning in &warnings {
            eprintln!("Warning: {}", warning);
        }
    }

    let api = HttpNodeApi::new(&config.api).context("invalid API settings")?;
    tracing::debug!(base_url = %api.base_url(), "using node API");

    match cli.command {
        None | Some(Commands::Tui) => {
            tui::run(config, warnings, Arc::new(api))?;
        }
        Some(Commands::List { watch }) => {
            let rt = tokio::runtime::Runtime::new()?;
            let name_max = config.display.name_max_length;
            let list = || rt.block_on(handle_list_command(&api, name_max));
            if watch > 0.0 {
                watch_loop(watch, list)?;
            } else {
                println!("{}", list()?);
            }
        }
        Some(Commands::Add {
            name,
            port,
            user,
            password,
        }) => {
            let draft = NodeDraft {
                name,
                port,
                user,
                password: Some(password),
            };
            let rt = tokio::runtime::Runtime::new()?;
            let node = rt
                .block_on(api.create_node(&draft))
                .with_context(|| format!("failed to add node '{}'", draft.name))?;
            println!("{}", format_saved(&node, true));
        }
        Some(Commands::Edit {
            name,
            port,
            user,
            password,
        }) => {
            let rt = tokio::runtime::Runtime::new()?;
            let node = rt
                .block_on(handle_edit_command(&api, &name, port, user, password))
                .with_context(|| format!("failed to update node '{}'", name))?;
            println!("{}", format_saved(&node, false));
        }
    }

    Ok(())
}

/// Set up `tracing`. Never writes to the terminal the TUI draws on.
fn init_logging(interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("NODEMAN_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match std::env::var_os("NODEMAN_LOG_FILE") {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("could not open log file {:?}", path))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
        }
        None if interactive => builder.with_writer(io::sink).try_init(),
        None => builder.with_writer(io::stderr).try_init(),
    };

    result.map_err(|e| anyhow!("failed to initialize logging: {}", e))
}

/// Fetch and render the node list, sorted the same way as the node page
async fn handle_list_command(api: &HttpNodeApi, name_max: usize) -> Result<String> {
    let response = api.fetch_nodes().await.context("failed to fetch nodes")?;
    let page = PageState::mount().reduce(PageAction::NodesLoaded(response.result));
    Ok(format_nodes(page.nodes(), name_max))
}

async fn handle_edit_command(
    api: &HttpNodeApi,
    name: &str,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
) -> Result<Node> {
    let current = api
        .fetch_nodes()
        .await?
        .result
        .unwrap_or_default()
        .into_iter()
        .find(|n| n.name == name)
        .ok_or_else(|| anyhow!("no node named '{}'", name))?;

    let draft = merge_edit(&current, port, user, password)?;
    Ok(api.update_node(name, &draft).await?)
}

/// Fill fields not given on the command line from the current record
fn merge_edit(
    current: &Node,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
) -> Result<NodeDraft> {
    let port = port
        .or(current.port)
        .filter(|p| *p > 0)
        .ok_or_else(|| anyhow!("node '{}' has no valid port; pass --port", current.name))?;
    let user = user
        .or_else(|| current.user.clone())
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| anyhow!("node '{}' has no user; pass --user", current.name))?;

    Ok(NodeDraft {
        name: current.name.clone(),
        port,
        user,
        password,
    })
}

/// Watch loop that repeatedly executes a command with flicker-free updates
fn watch_loop<F>(interval: f64, command: F) -> Result<()>
where
    F: Fn() -> Result<String>,
{
    let running = Arc::new(std::sync::atomic::AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, std::sync::atomic::Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let cleanup = || -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Show, LeaveAlternateScreen)?;
        Ok(())
    };

    let result = (|| -> Result<()> {
        while running.load(std::sync::atomic::Ordering::SeqCst) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

            let output = match command() {
                Ok(s) => s,
                Err(e) => format!("Error: {:#}", e),
            };

            let screen_content = format!(
                "{}\n\nLast updated: {} | Refreshing every {}s | Press Ctrl+C to exit",
                output, timestamp, interval
            );

            // Synchronized update (DEC private mode 2026) so the frame lands at once
            write!(stdout, "\x1B[?2026h")?;
            write!(stdout, "\x1B[H{}\x1B[J", screen_content)?;
            write!(stdout, "\x1B[?2026l")?;
            stdout.flush()?;

            thread::sleep(Duration::from_secs_f64(interval));
        }
        Ok(())
    })();

    cleanup()?;
    println!("Watch mode stopped.");

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> Node {
        let mut node = Node::named("node01");
        node.user = Some("ohara".to_string());
        node.port = Some(2222);
        node
    }

    #[test]
    fn test_merge_edit_keeps_current_values() {
        let draft = merge_edit(&current(), None, None, None).unwrap();
        assert_eq!(draft.port, 2222);
        assert_eq!(draft.user, "ohara");
        assert_eq!(draft.password, None);
    }

    #[test]
    fn test_merge_edit_overrides() {
        let draft = merge_edit(&current(), Some(22), Some("root".to_string()), Some("pw".to_string()))
            .unwrap();
        assert_eq!(draft.port, 22);
        assert_eq!(draft.user, "root");
        assert_eq!(draft.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_merge_edit_missing_port() {
        let mut node = current();
        node.port = None;
        assert!(merge_edit(&node, None, None, None).is_err());
        assert!(merge_edit(&node, Some(22), None, None).is_ok());
    }

    #[test]
    fn test_parse_watch_interval() {
        assert_eq!(parse_watch_interval("0"), Ok(0.0));
        assert_eq!(parse_watch_interval("2.5"), Ok(2.5));
        assert!(parse_watch_interval("inf").is_err());
        assert!(parse_watch_interval("NaN").is_err());
        assert!(parse_watch_interval("-1").is_err());
        assert!(parse_watch_interval("0.001").is_err());
        assert!(parse_watch_interval("soon").is_err());

        assert!(Cli::try_parse_from(["nodeman", "list", "--watch", "inf"]).is_err());
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["nodeman", "--api-url", "http://x:1", "edit", "n1", "--port", "23"])
            .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x:1"));
        assert!(matches!(cli.command, Some(Commands::Edit { port: Some(23), .. })));

        assert!(Cli::try_parse_from(["nodeman", "add", "--name", "n", "--port", "0", "--user", "u", "--password", "p"]).is_err());
    }
}
