use std::collections::HashSet;

use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use consoleport_types::{ArgumentSpec, OptionSpec};
use serde_json::{Map, Value};

use crate::{CommandRegistry, ResolvedCommand};

/// Builds the `run` command tree from the registry's command definitions.
///
/// Every registered command becomes a subcommand of `run`; its arguments are
/// positional clap args and its options (the synthetic `env` option included)
/// are long flags. Presence and type rules are not enforced here: matched
/// values are collected with [`collect_input`] and validated by the bridge.
///
/// # Examples
///
/// ```rust,ignore
/// use consoleport_registry::build_run_command;
///
/// let run = build_run_command(&registry);
/// let matches = run.get_matches_from(["run", "migrate", "5", "--seeders", "users"]);
/// ```
pub fn build_run_command(registry: &CommandRegistry) -> ClapCommand {
    let mut run = ClapCommand::new("run")
        .about("Run a registered command")
        .subcommand_required(true)
        .arg_required_else_help(true);

    for definition in registry.list_all().values() {
        let resolved = ResolvedCommand::new(definition.clone());
        run = run.subcommand(build_subcommand(&resolved));
    }
    run
}

fn build_subcommand(command: &ResolvedCommand) -> ClapCommand {
    let name: &'static str = Box::leak(command.name().to_string().into_boxed_str());
    let mut subcommand = ClapCommand::new(name).about(command.definition().description.clone());

    subcommand = add_positional_arguments(subcommand, command);
    add_options(subcommand, command.options())
}

/// Only the last positional may take multiple values.
fn add_positional_arguments(mut subcommand: ClapCommand, command: &ResolvedCommand) -> ClapCommand {
    let arguments = command.arguments();
    let last_index = arguments.len().saturating_sub(1);
    for (index, argument) in arguments.iter().enumerate() {
        let id: &'static str = Box::leak(positional_id(command, argument).into_boxed_str());
        let name: &'static str = Box::leak(argument.name.clone().into_boxed_str());
        let mut arg = Arg::new(id)
            .index(index + 1)
            .value_name(name)
            .help(argument.description.clone());
        arg = if argument.is_array && index == last_index {
            arg.num_args(1..).action(ArgAction::Append)
        } else {
            arg.action(ArgAction::Set)
        };
        subcommand = subcommand.arg(arg);
    }
    subcommand
}

/// Long names already taken by clap or by the host CLI's global flags.
const RESERVED_LONGS: &[&str] = &["help", "config", "grant"];

/// Clap ids are unique per command, so an argument sharing its name with an
/// option or a reserved flag is registered under a suffixed id.
fn positional_id(command: &ResolvedCommand, argument: &ArgumentSpec) -> String {
    let name = argument.name.as_str();
    if command.is_option(name) || RESERVED_LONGS.contains(&name) {
        format!("{name}-argument")
    } else {
        name.to_string()
    }
}

/// Options with a reserved long name and the `-h` shortcut are skipped.
fn add_options(mut subcommand: ClapCommand, options: &[OptionSpec]) -> ClapCommand {
    let mut used_shorts: HashSet<char> = HashSet::from(['h']);
    for option in options.iter().filter(|option| !RESERVED_LONGS.contains(&option.name.as_str())) {
        let mut arg = build_option_argument(option);
        if let Some(short) = option.shortcut.as_deref().and_then(|shortcut| shortcut.chars().next())
            && used_shorts.insert(short)
        {
            arg = arg.short(short);
        }
        subcommand = subcommand.arg(arg);
    }
    subcommand
}

fn build_option_argument(option: &OptionSpec) -> Arg {
    let name: &'static str = Box::leak(option.name.clone().into_boxed_str());
    let arg = Arg::new(name).long(name).help(option.description.clone());

    if !option.accepts_value {
        arg.action(ArgAction::SetTrue)
    } else if option.is_array {
        arg.num_args(1).action(ArgAction::Append)
    } else if option.value_required {
        arg.num_args(1).action(ArgAction::Set)
    } else {
        arg.num_args(0..=1).action(ArgAction::Set)
    }
}

/// Collects matched values into a field map keyed by raw argument/option name.
///
/// Flags that were not passed and values that were not supplied are omitted.
pub fn collect_input(command: &ResolvedCommand, matches: &ArgMatches) -> Map<String, Value> {
    let mut input = Map::new();

    for argument in command.arguments() {
        let id = positional_id(command, argument);
        let value = if argument.is_array {
            many_values(matches, &id)
        } else {
            one_value(matches, &id)
        };
        if let Some(value) = value {
            input.insert(argument.name.clone(), value);
        }
    }

    for option in command.options() {
        let value = if !option.accepts_value {
            matches
                .try_get_one::<bool>(&option.name)
                .ok()
                .flatten()
                .copied()
                .filter(|set| *set)
                .map(Value::Bool)
        } else if option.is_array {
            many_values(matches, &option.name)
        } else {
            one_value(matches, &option.name)
        };
        if let Some(value) = value {
            input.insert(option.name.clone(), value);
        }
    }

    input
}

fn one_value(matches: &ArgMatches, name: &str) -> Option<Value> {
    matches.try_get_one::<String>(name).ok().flatten().map(|value| Value::String(value.clone()))
}

fn many_values(matches: &ArgMatches, name: &str) -> Option<Value> {
    // A single-valued positional (array but not last) still yields one value.
    let values = matches.try_get_many::<String>(name).ok().flatten()?;
    Some(Value::Array(values.map(|value| Value::String(value.clone())).collect()))
}
