#![cfg(unix)]

use std::sync::Arc;

use consoleport_engine::{AbilityGate, CommandBridge, PermissionPolicy, ProcessRuntime};
use consoleport_registry::{BridgeConfig, CommandRegistry};
use serde_json::{Map, Value, json};

const CONFIG: &str = r#"
environment_variable: STAGE
permissions:
  report:fail: view-failures
commands:
  - name: report
    description: Print a report for a target
    program: sh
    args: ["-c", "echo \"$@ stage=$STAGE\"", "report"]
    arguments:
      - name: target
        required: true
    options:
      - name: verbose
      - name: tag
        accepts_value: true
        array: true
  - name: report:args
    program: sh
    args: ["-c", "for a in \"$@\"; do echo \"[$a]\"; done", "report:args"]
    arguments:
      - name: target
        required: true
    options:
      - name: force
  - name: report:fail
    program: sh
    args: ["-c", "echo failing >&2; exit 4"]
"#;

fn bridge() -> CommandBridge {
    let config = BridgeConfig::from_yaml(CONFIG).expect("config");
    let registry = CommandRegistry::new(Arc::new(ProcessRuntime::from_config(&config)));
    CommandBridge::new(registry, PermissionPolicy::from_config(&config))
}

fn input(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object input")
}

#[test]
fn process_receives_translated_argv_and_environment() {
    let result = bridge()
        .run(
            "report",
            &input(json!({ "target": "users", "verbose": true, "tag": ["a", "b"], "env": "qa" })),
            &AbilityGate::default(),
        )
        .expect("run");

    assert_eq!(result.status, 0);
    assert_eq!(result.output, "--verbose --tag=a --tag=b -- users stage=qa\n");
    assert_eq!(result.command, "report");
}

#[test]
fn dash_prefixed_argument_reaches_the_process_as_a_positional() {
    let result = bridge()
        .run(
            "report:args",
            &input(json!({ "target": "--delete-everything" })),
            &AbilityGate::default(),
        )
        .expect("run");

    assert_eq!(result.status, 0);
    assert_eq!(result.output, "[--]\n[--delete-everything]\n");
}

#[test]
fn string_and_numeric_flag_values_are_passed_bare() {
    for force in [json!("1"), json!(1)] {
        let result = bridge()
            .run("report:args", &input(json!({ "target": "users", "force": force })), &AbilityGate::default())
            .expect("run");
        assert_eq!(result.output, "[--force]\n[--]\n[users]\n");
    }
}

#[test]
fn failing_process_is_captured_not_raised() {
    let result = bridge()
        .run("report:fail", &Map::new(), &AbilityGate::new(["view-failures"]))
        .expect("captured");
    assert_eq!(result.status, 4);
    assert_eq!(result.output, "failing\n");
}

#[test]
fn guard_is_checked_before_the_process_starts() {
    let err = bridge().run("report:fail", &Map::new(), &AbilityGate::default()).expect_err("forbidden");
    assert_eq!(err.status_code(), 403);
}
