//! Shared type definitions for Consoleport.
//!
//! Command metadata, the schemas projected from it for clients, validation
//! rule tokens, execution results and the operation-level error taxonomy.

pub mod command;
pub mod errors;
pub mod execution;
pub mod rules;
pub mod schema;
pub mod value;

pub use command::{ArgumentSpec, CommandDefinition, ENV_OPTION_DESCRIPTION, ENV_OPTION_NAME, OptionSpec};
pub use errors::{BridgeError, ValidationErrors};
pub use execution::{
    BufferedOutput, ExecutionResult, NO_ANSI_FLAG, ParameterMap, RuntimeError, RuntimeOutcome, SERVER_ERROR_STATUS, Verbosity,
};
pub use rules::{RuleToken, ValidationRuleSet};
pub use schema::{ArgumentSchema, CommandListing, CommandSchema, GroupedListing, MissingCommand, NOT_FOUND_ERROR, OptionSchema};
pub use value::{is_empty_value, non_empty};
