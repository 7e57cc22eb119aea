//! Loading, compiling and running whole programs.
use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::info;
use thiserror::Error;

use crate::{
    bytecode::{CompiledProgram, LoweringError, compile_program},
    config::{Config, ConfigError, RuntimeOptions},
    lang::Program,
    runtime::{Context, EvalError, Machine, Value, closure::Closure},
};

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid program {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("[{}] compile error: {}", .0.code(), .0)]
    Lowering(#[from] LoweringError),
    #[error("[{}] error: {}", .0.code(), .0)]
    Eval(#[from] EvalError),
}

pub fn load_program(path: &Path) -> Result<Program, ProgramError> {
    let source = fs::read_to_string(path).map_err(|source| ProgramError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Program::from_json(&source).map_err(|source| ProgramError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Binds every definition in a fresh global environment, then runs the
/// body there.
pub fn execute_program(
    program: &CompiledProgram,
    options: &RuntimeOptions,
) -> Result<Value, EvalError> {
    let ctx = Context::new(options.clone());
    let global = ctx.global();
    for (name, unit) in &program.definitions {
        let closure = Closure::new(unit.clone(), global.clone());
        global.set_variable(name.clone(), Value::Closure(Rc::new(closure)));
    }
    Machine::new(&ctx).execute(&program.main, global)
}

pub fn run_program(program: &Program, config: &Config) -> Result<Value, ProgramError> {
    let compiled = compile_program(program, &config.compiler)?;
    info!(
        "running {} ({} definitions)",
        compiled.main.fingerprint(),
        compiled.definitions.len()
    );
    Ok(execute_program(&compiled, &config.runtime)?)
}
