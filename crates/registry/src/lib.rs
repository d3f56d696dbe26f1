//! Registry crate for looking up Consoleport command definitions.
//!
//! Command definitions are owned by a [`CommandRuntime`]; this crate offers a
//! read-only [`CommandRegistry`] over them, the [`ResolvedCommand`] handle that
//! carries the augmented option set, the configuration snapshot, and a clap
//! builder for exposing registered commands on the command line.

pub mod clap_builder;
pub mod config;
pub mod models;
pub mod resolved;
pub mod runtime;
pub mod utils;

pub use clap_builder::{build_run_command, collect_input};
pub use config::{BridgeConfig, CONFIG_PATH_ENV, CatalogEntry, ConfigError, DEFAULT_ENVIRONMENT_VARIABLE, default_config_path};
pub use consoleport_types::{ArgumentSpec, CommandDefinition, OptionSpec};
pub use models::CommandRegistry;
pub use resolved::{ResolvedCommand, augment_options};
pub use runtime::{CommandMap, CommandRuntime};
pub use utils::*;
