use std::{
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use consoleport_registry::{BridgeConfig, CommandMap, CommandRuntime};
use consoleport_types::{BufferedOutput, ENV_OPTION_NAME, NO_ANSI_FLAG, ParameterMap, RuntimeError, RuntimeOutcome};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// How a catalog command is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Launcher {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

/// Runtime that launches each catalog command as a child process.
///
/// No shell is involved; the translated parameters are turned into an argv
/// and passed to the configured program.
#[derive(Debug, Clone)]
pub struct ProcessRuntime {
    commands: CommandMap,
    launchers: IndexMap<String, Launcher>,
    environment_variable: String,
}

/// A fully prepared child invocation, inspectable before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub working_dir: Option<PathBuf>,
}

impl ProcessRuntime {
    pub fn from_config(config: &BridgeConfig) -> Self {
        let launchers = config
            .commands
            .iter()
            .map(|entry| {
                let launcher = Launcher {
                    program: entry.program.clone(),
                    args: entry.args.clone(),
                    working_dir: entry.working_dir.clone(),
                };
                (entry.definition.name.clone(), launcher)
            })
            .collect();

        Self {
            commands: config.definitions(),
            launchers,
            environment_variable: config.environment_variable.clone(),
        }
    }

    /// Translates `parameters` into the argv and environment for `name`.
    ///
    /// Positionals follow a `--` separator so values starting with a dash
    /// are never read as options by the child.
    ///
    /// # Errors
    ///
    /// When `name` has no launcher configured.
    pub fn build_invocation(&self, name: &str, parameters: &ParameterMap) -> Result<Invocation, RuntimeError> {
        let launcher = self
            .launchers
            .get(name)
            .ok_or_else(|| RuntimeError::new(format!("no launcher configured for command '{name}'")))?;

        let definition = self.commands.get(name);
        let is_flag = |option: &str| {
            definition.is_some_and(|definition| {
                definition
                    .options
                    .iter()
                    .any(|spec| spec.name == option && !spec.accepts_value)
            })
        };

        let mut positionals = Vec::new();
        let mut flags = Vec::new();
        let mut env = Vec::new();

        for (key, value) in parameters {
            let Some(option) = key.strip_prefix("--") else {
                push_values(&mut positionals, value, None);
                continue;
            };
            if key == NO_ANSI_FLAG {
                env.push(("NO_COLOR".to_string(), "1".to_string()));
                env.push(("TERM".to_string(), "dumb".to_string()));
            } else if option == ENV_OPTION_NAME {
                if let Some(environment) = scalar_text(value) {
                    env.push((self.environment_variable.clone(), environment));
                }
            } else if is_flag(option) || value == &Value::Bool(true) {
                flags.push(key.clone());
            } else {
                push_values(&mut flags, value, Some(key.as_str()));
            }
        }

        let mut args = launcher.args.clone();
        args.extend(flags);
        if !positionals.is_empty() {
            args.push("--".to_string());
            args.extend(positionals);
        }

        Ok(Invocation {
            program: launcher.program.clone(),
            args,
            env,
            working_dir: launcher.working_dir.clone(),
        })
    }
}

fn push_values(target: &mut Vec<String>, value: &Value, key: Option<&str>) {
    let values: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    for text in values.into_iter().filter_map(scalar_text) {
        match key {
            Some(key) => target.push(format!("{key}={text}")),
            None => target.push(text),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl CommandRuntime for ProcessRuntime {
    fn all(&self) -> &CommandMap {
        &self.commands
    }

    fn call(&self, name: &str, parameters: &ParameterMap, output: &mut BufferedOutput) -> RuntimeOutcome {
        let invocation = self.build_invocation(name, parameters)?;
        debug!(command = %name, program = %invocation.program, args = ?invocation.args, "spawning command process");

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null());
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        let child = command
            .output()
            .map_err(|error| RuntimeError::new(format!("failed to start '{}': {error}", invocation.program)))?;

        output
            .write_all(&child.stdout)
            .and_then(|()| output.write_all(&child.stderr))
            .map_err(|error| RuntimeError::new(format!("failed to capture output: {error}")))?;

        child
            .status
            .code()
            .ok_or_else(|| RuntimeError::new(format!("command '{name}' was terminated by a signal")))
    }
}

/// A runtime that echoes the parameters it receives instead of executing
/// anything. Used for dry runs and previews.
#[derive(Debug, Clone, Default)]
pub struct NoopRuntime {
    commands: CommandMap,
}

impl NoopRuntime {
    pub fn new(commands: CommandMap) -> Self {
        Self { commands }
    }
}

impl CommandRuntime for NoopRuntime {
    fn all(&self) -> &CommandMap {
        &self.commands
    }

    fn call(&self, name: &str, parameters: &ParameterMap, output: &mut BufferedOutput) -> RuntimeOutcome {
        let preview = serde_json::json!({ "command": name, "parameters": parameters });
        let text = serde_json::to_string_pretty(&preview).map_err(|error| RuntimeError::new(error.to_string()))?;
        output
            .write_all(text.as_bytes())
            .map_err(|error| RuntimeError::new(error.to_string()))?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use consoleport_types::Verbosity;
    use serde_json::json;

    use super::*;

    fn runtime(program: &str, args: &[&str]) -> ProcessRuntime {
        let config = BridgeConfig::from_json(
            &json!({
                "environment_variable": "STAGE",
                "commands": [{
                    "name": "report",
                    "program": program,
                    "args": args,
                    "arguments": [{ "name": "target", "required": true }],
                    "options": [
                        { "name": "tags", "accepts_value": true, "array": true },
                        { "name": "force" }
                    ]
                }]
            })
            .to_string(),
        )
        .expect("config");
        ProcessRuntime::from_config(&config)
    }

    fn parameters(value: Value) -> ParameterMap {
        serde_json::from_value(value).expect("parameter map")
    }

    #[test]
    fn invocation_translates_parameters_into_argv_and_env() {
        let runtime = runtime("report-tool", &["run"]);
        let invocation = runtime
            .build_invocation(
                "report",
                &ParameterMap::from([
                    ("target".to_string(), json!("users")),
                    ("--tags".to_string(), json!(["a", "b"])),
                    ("--force".to_string(), json!(true)),
                    ("--env".to_string(), json!("staging")),
                    ("--no-ansi".to_string(), json!(true)),
                ]),
            )
            .expect("invocation");

        assert_eq!(invocation.program, "report-tool");
        assert_eq!(invocation.args, vec!["run", "--tags=a", "--tags=b", "--force", "--", "users"]);
        assert_eq!(
            invocation.env,
            vec![
                ("STAGE".to_string(), "staging".to_string()),
                ("NO_COLOR".to_string(), "1".to_string()),
                ("TERM".to_string(), "dumb".to_string()),
            ]
        );
    }

    #[test]
    fn dash_prefixed_argument_values_stay_positional() {
        let invocation = runtime("report-tool", &[])
            .build_invocation("report", &ParameterMap::from([("target".to_string(), json!("--delete-everything"))]))
            .expect("invocation");
        assert_eq!(invocation.args, vec!["--", "--delete-everything"]);

        let invocation = runtime("report-tool", &[])
            .build_invocation("report", &ParameterMap::from([("--tags".to_string(), json!(["x"]))]))
            .expect("invocation");
        assert_eq!(invocation.args, vec!["--tags=x"]);
    }

    #[test]
    fn truthy_flag_values_become_bare_flags() {
        let runtime = runtime("report-tool", &[]);
        for value in [json!("1"), json!(1), json!(true)] {
            let invocation = runtime
                .build_invocation("report", &ParameterMap::from([("--force".to_string(), value)]))
                .expect("invocation");
            assert_eq!(invocation.args, vec!["--force"]);
        }
    }

    #[test]
    fn unknown_command_has_no_launcher() {
        let err = runtime("true", &[]).build_invocation("missing", &ParameterMap::new()).expect_err("no launcher");
        assert_eq!(err.code, None);
    }

    #[test]
    fn spawn_failure_is_a_codeless_runtime_error() {
        let runtime = runtime("/nonexistent/consoleport-test-binary", &[]);
        let mut output = BufferedOutput::new(Verbosity::Normal, false);
        let err = runtime
            .call("report", &parameters(json!({ "target": "x" })), &mut output)
            .expect_err("spawn fails");
        assert_eq!(err.code, None);
        assert!(err.message.contains("failed to start"));
    }

    #[cfg(unix)]
    #[test]
    fn process_output_and_exit_code_are_captured() {
        let runtime = runtime("sh", &["-c", "[ \"$1\" = -- ] && shift; echo \"target=$1 stage=$STAGE color=$NO_COLOR\"; echo oops >&2; exit 3", "sh"]);
        let mut output = BufferedOutput::new(Verbosity::Normal, false);
        let status = runtime
            .call(
                "report",
                &parameters(json!({ "target": "users", "--env": "qa", "--no-ansi": true })),
                &mut output,
            )
            .expect("process runs");

        assert_eq!(status, 3);
        assert_eq!(output.fetch(), "target=users stage=qa color=1\noops\n");
    }

    #[test]
    fn noop_runtime_echoes_parameters() {
        let runtime = NoopRuntime::default();
        let mut output = BufferedOutput::default();
        let status = runtime
            .call("migrate", &parameters(json!({ "step": "5", "--no-ansi": true })), &mut output)
            .expect("noop");

        assert_eq!(status, 0);
        let echoed: Value = serde_json::from_str(&output.fetch()).expect("json output");
        assert_eq!(echoed, json!({ "command": "migrate", "parameters": { "step": "5", "--no-ansi": true } }));
    }
}
