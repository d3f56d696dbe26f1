use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command};
use consoleport_engine::{AbilityGate, CommandBridge, NoopRuntime, PermissionPolicy, ProcessRuntime};
use consoleport_registry::{BridgeConfig, CommandRegistry, CommandRuntime, build_run_command, collect_input};
use consoleport_server::{BridgeHttpServer, render_listing, resolve_bind_address};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let config = BridgeConfig::load(config_path_from_args(&args).as_deref()).context("could not load configuration")?;
    let catalog = CommandRegistry::new(Arc::new(ProcessRuntime::from_config(&config)));
    let matches = build_cli(&catalog).get_matches_from(args);
    let gate = gate_from_matches(&matches);

    match matches.subcommand() {
        Some(("list", sub)) => list_commands(&config, catalog, &gate, sub.get_flag("json")),
        Some(("run", sub)) => run_command(&config, catalog, gate, sub).await,
        Some(("serve", sub)) => serve(&config, catalog, sub.get_one::<String>("bind").map(String::as_str)).await,
        _ => Err(anyhow!("expected a subcommand")),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn build_cli(catalog: &CommandRegistry) -> Command {
    Command::new("consoleport")
        .about("List and run registered commands")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .action(ArgAction::Set)
                .value_name("PATH")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("grant")
                .long("grant")
                .global(true)
                .action(ArgAction::Append)
                .value_name("ABILITY")
                .help("Ability granted to the caller (repeatable)"),
        )
        .subcommand(
            Command::new("list").about("List the commands you may run").arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Print the grouped listing as JSON"),
            ),
        )
        .subcommand(
            build_run_command(catalog).arg(
                Arg::new("dry-run")
                    .long("dry-run")
                    .action(ArgAction::SetTrue)
                    .help("Print the translated parameters instead of running the command"),
            ),
        )
        .subcommand(
            Command::new("serve").about("Serve the command bridge over local HTTP").arg(
                Arg::new("bind")
                    .long("bind")
                    .action(ArgAction::Set)
                    .value_name("ADDR")
                    .help("Loopback address to bind (default 127.0.0.1:8080)"),
            ),
        )
}

/// The configuration path must be known before the `run` tree can be built,
/// so it is read from the raw arguments ahead of the full parse.
fn config_path_from_args(args: &[String]) -> Option<PathBuf> {
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if arg == "--config" {
            return iter.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn gate_from_matches(matches: &ArgMatches) -> AbilityGate {
    let mut abilities: Vec<&String> = matches.get_many::<String>("grant").map(Iterator::collect).unwrap_or_default();
    if let Some((_, sub)) = matches.subcommand()
        && let Some(granted) = sub.get_many::<String>("grant")
    {
        abilities.extend(granted);
    }
    AbilityGate::new(abilities.into_iter().cloned())
}

fn list_commands(config: &BridgeConfig, catalog: CommandRegistry, gate: &AbilityGate, json: bool) -> Result<ExitCode> {
    let bridge = CommandBridge::new(catalog, PermissionPolicy::from_config(config));
    let listing = bridge.list_for_client(&config.groups, gate);
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        print!("{}", render_listing(&listing));
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_command(config: &BridgeConfig, catalog: CommandRegistry, gate: AbilityGate, matches: &ArgMatches) -> Result<ExitCode> {
    let (name, command_matches) = matches.subcommand().context("expected a command to run")?;
    let command = catalog.find(name)?;
    let input = collect_input(&command, command_matches);

    let runtime: Arc<dyn CommandRuntime> = if matches.get_flag("dry-run") {
        debug!(command = %name, "dry run; parameters are echoed instead of executed");
        Arc::new(NoopRuntime::new(catalog.list_all().clone()))
    } else {
        Arc::new(ProcessRuntime::from_config(config))
    };
    let bridge = CommandBridge::new(CommandRegistry::new(runtime), PermissionPolicy::from_config(config));

    let identifier = name.to_string();
    let result = tokio::task::spawn_blocking(move || bridge.run(&identifier, &input, &gate))
        .await
        .context("command task failed")??;

    print!("{}", result.output);
    if !result.output.is_empty() && !result.output.ends_with('\n') {
        println!();
    }
    Ok(exit_code(result.status))
}

async fn serve(config: &BridgeConfig, catalog: CommandRegistry, bind: Option<&str>) -> Result<ExitCode> {
    let address = resolve_bind_address(bind)?;
    let bridge = CommandBridge::new(catalog, PermissionPolicy::from_config(config));
    let server = BridgeHttpServer::new(address, bridge, config).start().await?;
    info!(address = %server.bound_address(), "press Ctrl-C to stop");

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    server.stop().await?;
    Ok(ExitCode::SUCCESS)
}

fn exit_code(status: i32) -> ExitCode {
    ExitCode::from(exit_status(status))
}

/// Statuses outside `0..=255` cannot be reported by the process; they become 1.
fn exit_status(status: i32) -> u8 {
    u8::try_from(status).unwrap_or(1)
}
