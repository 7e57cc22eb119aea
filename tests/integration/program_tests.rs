use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use rill::{
    config::{Config, ConfigError},
    driver::{ProgramError, load_program, run_program},
    lang::Program,
    runtime::Value,
};

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

fn scratch_file(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "rill-program-{}-{}.json",
        std::process::id(),
        NEXT_FILE.fetch_add(1, Ordering::Relaxed)
    ));
    fs::write(&path, contents).unwrap();
    path
}

const SQUARES: &str = r#"{
    "definitions": [
        {
            "name": "square",
            "function": {
                "formals": [{ "name": "x" }],
                "body": { "Call": {
                    "function": { "Symbol": "*" },
                    "args": [
                        { "value": { "Symbol": "x" } },
                        { "value": { "Symbol": "x" } }
                    ]
                } }
            }
        },
        {
            "name": "total",
            "function": {
                "formals": [{ "name": "..." }],
                "body": { "Call": {
                    "function": { "Symbol": "sum" },
                    "args": [{ "value": { "Symbol": "..." } }]
                } }
            }
        }
    ],
    "body": { "Call": {
        "function": { "Symbol": "total" },
        "args": [
            { "value": { "Call": {
                "function": { "Symbol": "square" },
                "args": [{ "value": { "Int": 3 } }]
            } } },
            { "name": "b", "value": { "Int": 4 } }
        ]
    } }
}"#;

#[test]
fn runs_a_program_from_json() {
    let program = Program::from_json(SQUARES).unwrap();
    assert_eq!(program.definitions.len(), 2);
    let value = run_program(&program, &Config::default()).unwrap();
    assert_eq!(value, Value::Int(13));
}

#[test]
fn sequential_and_parallel_compilation_agree() {
    let program = Program::from_json(SQUARES).unwrap();
    let mut config = Config::default();
    config.compiler.parallel = false;
    assert_eq!(run_program(&program, &config).unwrap(), Value::Int(13));
}

#[test]
fn loads_a_program_file() {
    let path = scratch_file(SQUARES);
    let program = load_program(&path).unwrap();
    fs::remove_file(&path).unwrap();
    assert_eq!(program.body.to_string(), "total(square(3L), b = 4L)");
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("rill-definitely-missing.json");
    let err = load_program(&path).unwrap_err();
    assert!(matches!(err, ProgramError::Io { .. }));
    assert!(err.to_string().starts_with("cannot read"), "{err}");
}

#[test]
fn malformed_program_is_a_parse_error() {
    let path = scratch_file(r#"{ "definitions": [] }"#);
    let err = load_program(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(matches!(err, ProgramError::Parse { .. }));
}

#[test]
fn lowering_errors_carry_their_code() {
    // `...` outside any function.
    let program = Program::from_json(r#"{ "body": { "Symbol": "..." } }"#).unwrap();
    let err = run_program(&program, &Config::default()).unwrap_err();
    assert!(matches!(err, ProgramError::Lowering(_)));
    assert_eq!(
        err.to_string(),
        "[E204] compile error: '...' used in an incorrect context"
    );
}

#[test]
fn config_file_sets_options() {
    let path = scratch_file(
        r#"{ "compiler": { "integer_fast_path": false, "static_primitives": ["sum"] },
             "runtime": { "max_depth": 64 } }"#,
    );
    let config = Config::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert!(!config.compiler.integer_fast_path);
    assert!(config.compiler.inline_control_flow);
    assert_eq!(config.runtime.max_depth, 64);

    let program = Program::from_json(SQUARES).unwrap();
    assert_eq!(run_program(&program, &config).unwrap(), Value::Int(13));
}

#[test]
fn unreadable_config_is_reported() {
    let path = scratch_file("{ not json");
    let err = Config::load(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(matches!(err, ConfigError::Parse { .. }));
    let err = ProgramError::from(err);
    assert!(err.to_string().starts_with("invalid config file"), "{err}");
}
