//! # Consoleport Engine
//!
//! The command introspection and execution bridge. Given registered command
//! definitions whose shape is only known at runtime, the engine:
//!
//! - projects each definition into a client schema ([`project`])
//! - derives validation rules from the same metadata ([`derive_rules`]) and
//!   enforces them ([`validate_input`])
//! - gates listing and running behind per-command permissions
//!   ([`PermissionPolicy`])
//! - marshals validated input into runtime parameters and folds every runtime
//!   failure into a uniform [`ExecutionResult`](consoleport_types::ExecutionResult)
//!   ([`CommandBridge::run`])
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use consoleport_engine::{AbilityGate, CommandBridge, NoopRuntime, PermissionPolicy};
//! use consoleport_registry::{CommandMap, CommandRegistry};
//! use consoleport_types::{ArgumentSpec, CommandDefinition};
//!
//! let mut commands = CommandMap::new();
//! commands.insert(
//!     "migrate".into(),
//!     Arc::new(CommandDefinition::new("migrate").with_argument(ArgumentSpec::required("step"))),
//! );
//! let registry = CommandRegistry::new(Arc::new(NoopRuntime::new(commands)));
//! let bridge = CommandBridge::new(registry, PermissionPolicy::default());
//!
//! let input = serde_json::json!({ "step": "5" });
//! let result = bridge.run("migrate", input.as_object().unwrap(), &AbilityGate::default())?;
//! assert_eq!(result.status, 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod executor;
pub mod listing;
pub mod permissions;
pub mod rules;
pub mod schema;
pub mod validation;

pub use executor::{CommandBridge, Invocation, NoopRuntime, ProcessRuntime, marshal_parameters};
pub use permissions::{AbilityGate, Gate, PermissionPolicy};
pub use rules::derive_rules;
pub use schema::{display_title, project, project_arguments, project_options};
pub use validation::{ValidatedInput, validate_input};
