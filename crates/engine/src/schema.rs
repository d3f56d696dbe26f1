//! Projects command definitions into display-ready schemas.

use consoleport_registry::ResolvedCommand;
use consoleport_types::{ArgumentSchema, CommandSchema, OptionSchema, non_empty};
use heck::ToTitleCase;

/// Human-readable title for a field or group name.
///
/// `dry_run`, `dry-run` and `dryRun` all become `Dry Run`.
pub fn display_title(name: &str) -> String {
    name.to_title_case()
}

/// Projects a resolved command into its client schema.
///
/// Pure function of the definition: projecting the same command twice yields
/// identical output.
pub fn project(command: &ResolvedCommand) -> CommandSchema {
    let definition = command.definition();
    CommandSchema {
        name: definition.name.clone(),
        description: definition.description.clone(),
        synopsis: definition.synopsis(),
        arguments: project_arguments(command),
        options: project_options(command),
    }
}

/// `None` when the command declares no arguments.
pub fn project_arguments(command: &ResolvedCommand) -> Option<Vec<ArgumentSchema>> {
    let arguments: Vec<ArgumentSchema> = command
        .arguments()
        .iter()
        .map(|argument| ArgumentSchema {
            title: display_title(&argument.name),
            name: argument.name.clone(),
            description: argument.description.clone(),
            default: non_empty(argument.default.as_ref()),
            required: argument.required,
            array: argument.is_array,
        })
        .collect();

    (!arguments.is_empty()).then_some(arguments)
}

/// Projects the augmented option set, `env` included.
pub fn project_options(command: &ResolvedCommand) -> Option<Vec<OptionSchema>> {
    let options: Vec<OptionSchema> = command
        .options()
        .iter()
        .map(|option| OptionSchema {
            title: display_title(&option.name),
            name: option.name.clone(),
            description: option.description.clone(),
            shortcut: option.shortcut.clone(),
            required: option.value_required,
            array: option.is_array,
            accept_value: option.accepts_value,
            default: non_empty(option.default.as_ref()),
        })
        .collect();

    (!options.is_empty()).then_some(options)
}

#[cfg(test)]
mod tests {
    use consoleport_types::{ArgumentSpec, CommandDefinition, ENV_OPTION_DESCRIPTION, OptionSpec};
    use serde_json::json;

    use super::*;

    fn migrate() -> ResolvedCommand {
        CommandDefinition::new("migrate")
            .with_description("Run the database migrations")
            .with_argument(ArgumentSpec::required("step").with_description("Steps to run"))
            .with_argument(ArgumentSpec::optional("paths").array().with_default(json!([])))
            .with_option(OptionSpec::flag("force").with_shortcut("f").with_default(json!(false)))
            .with_option(OptionSpec::required_value("database_connection").with_default(json!("mysql")))
            .into()
    }

    #[test]
    fn titles_are_space_separated_words() {
        assert_eq!(display_title("step"), "Step");
        assert_eq!(display_title("database_connection"), "Database Connection");
        assert_eq!(display_title("no-interaction"), "No Interaction");
        assert_eq!(display_title("dryRun"), "Dry Run");
    }

    #[test]
    fn arguments_carry_flags_and_normalized_defaults() {
        let arguments = project_arguments(&migrate()).expect("arguments declared");
        assert_eq!(arguments.len(), 2);

        assert_eq!(arguments[0].title, "Step");
        assert_eq!(arguments[0].description, "Steps to run");
        assert!(arguments[0].required);
        assert!(!arguments[0].array);
        assert_eq!(arguments[0].default, None);

        assert!(arguments[1].array);
        assert_eq!(arguments[1].default, None, "empty array default is reported as absent");
    }

    #[test]
    fn options_include_env_exactly_once() {
        let options = project_options(&migrate()).expect("options present");
        let names: Vec<&str> = options.iter().map(|option| option.name.as_str()).collect();
        assert_eq!(names, vec!["force", "database_connection", "env"]);

        let force = &options[0];
        assert_eq!(force.shortcut.as_deref(), Some("f"));
        assert!(!force.accept_value);
        assert_eq!(force.default, None, "false default is reported as absent");

        let connection = &options[1];
        assert_eq!(connection.title, "Database Connection");
        assert!(connection.required);
        assert_eq!(connection.default, Some(json!("mysql")));

        let env = &options[2];
        assert_eq!(env.title, "Env");
        assert_eq!(env.description, ENV_OPTION_DESCRIPTION);
        assert!(env.accept_value);
        assert!(!env.required);
        assert!(env.shortcut.is_none());
    }

    #[test]
    fn command_without_arguments_projects_null_arguments() {
        let schema = project(&CommandDefinition::new("about").into());
        assert_eq!(schema.arguments, None);
        assert_eq!(schema.options.as_ref().map(Vec::len), Some(1));
        assert_eq!(schema.synopsis, "about");
    }

    #[test]
    fn projection_is_idempotent() {
        let command = migrate();
        let first = project(&command);
        let second = project(&command);
        assert_eq!(first, second);
        assert_eq!(first.synopsis, "migrate [-f|--force] [--database_connection=DATABASE_CONNECTION] [--] <step> [<paths>...]");
    }
}
