use std::{
    env,
    path::{Path, PathBuf},
    process, thread,
};

use log::{LevelFilter, info};
use rill::{
    bytecode::compile_program,
    config::Config,
    driver::{ProgramError, load_program, run_program},
    ir::{ControlFlowGraph, Translator},
};

/// Evaluation recurses on the native stack; give it room.
const EVAL_STACK_SIZE: usize = 64 * 1024 * 1024;

fn main() {
    let mut args: Vec<String> = env::args().collect();
    let verbose = args.iter().any(|arg| arg == "--verbose");
    let trace = args.iter().any(|arg| arg == "--trace");
    let no_fast_path = args.iter().any(|arg| arg == "--no-fast-path");
    let sequential = args.iter().any(|arg| arg == "--sequential");
    args.retain(|arg| {
        !matches!(
            arg.as_str(),
            "--verbose" | "--trace" | "--no-fast-path" | "--sequential"
        )
    });
    let config_path = match extract_config_path(&mut args) {
        Some(path) => path,
        None => return,
    };

    init_logging(verbose, trace);

    let mut config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    };
    if trace {
        config.runtime.trace = true;
    }
    if no_fast_path {
        config.compiler.integer_fast_path = false;
    }
    if sequential {
        config.compiler.parallel = false;
    }

    if args.len() < 3 {
        print_help();
        return;
    }

    let command = args[1].clone();
    let file = PathBuf::from(&args[2]);
    let result = match command.as_str() {
        "run" => run_on_eval_stack(file, config),
        "bytecode" => show_bytecode(&file, &config),
        "cfg" => show_cfg(&file, &config),
        "-h" | "--help" | "help" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Error: unknown command `{}`", other);
            print_help();
            process::exit(2);
        }
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn print_help() {
    println!(
        "\
Rill CLI

Usage:
  rill run <program.json>
  rill bytecode <program.json>
  rill cfg <program.json>

Flags:
  --verbose          Log compilation summaries
  --trace            Trace every executed instruction
  --config <path>    Read options from a JSON file
  --no-fast-path     Compile loop counters as ordinary values
  --sequential       Compile definitions on one thread

Environment:
  RILL_TRACE, RILL_MAX_DEPTH, RILL_PARALLEL, RUST_LOG
"
    );
}

/// Removes `--config <path>` from `args`. `None` means the flag was given
/// without a value and usage has been printed.
fn extract_config_path(args: &mut Vec<String>) -> Option<Option<PathBuf>> {
    let Some(index) = args.iter().position(|arg| arg == "--config") else {
        return Some(None);
    };
    if index + 1 >= args.len() {
        eprintln!("Usage: rill --config <path> <command> <program.json>");
        return None;
    }
    let path = PathBuf::from(args.remove(index + 1));
    args.remove(index);
    Some(Some(path))
}

fn init_logging(verbose: bool, trace: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if trace {
        builder.filter_module("rill", LevelFilter::Trace);
    } else if verbose {
        builder.filter_module("rill", LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn load_config(path: Option<&Path>) -> Result<Config, ProgramError> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    Ok(config)
}

fn run_on_eval_stack(file: PathBuf, config: Config) -> Result<(), ProgramError> {
    let handle = thread::Builder::new()
        .name("rill-eval".to_string())
        .stack_size(EVAL_STACK_SIZE)
        .spawn(move || -> Result<String, String> {
            let program = load_program(&file).map_err(|err| err.to_string())?;
            let value = run_program(&program, &config).map_err(|err| err.to_string())?;
            Ok(value.to_string())
        });

    let outcome = match handle {
        Ok(handle) => handle.join(),
        Err(err) => {
            eprintln!("Error: cannot start evaluator thread: {}", err);
            process::exit(1);
        }
    };
    match outcome {
        Ok(Ok(value)) => {
            println!("{}", value);
            Ok(())
        }
        Ok(Err(message)) => {
            eprintln!("{}", message);
            process::exit(1);
        }
        Err(_) => {
            eprintln!("Error: evaluator thread panicked");
            process::exit(101);
        }
    }
}

fn show_bytecode(file: &Path, config: &Config) -> Result<(), ProgramError> {
    let program = load_program(file)?;
    let compiled = compile_program(&program, &config.compiler)?;
    for (name, unit) in &compiled.definitions {
        info!("{} body fingerprint {}", name, unit.body.fingerprint());
    }
    println!("fingerprint: {}", compiled.main.fingerprint());
    print!("{}", compiled.disassemble());
    Ok(())
}

fn show_cfg(file: &Path, config: &Config) -> Result<(), ProgramError> {
    let program = load_program(file)?;
    let translator = Translator::new(&config.compiler);
    for definition in &program.definitions {
        let function =
            translator.translate_function(Some(definition.name.clone()), &definition.function)?;
        println!("== {} ==", function.display_name());
        print!("{}", ControlFlowGraph::build(&function.body));
    }
    let body = translator.translate_body(&program.body)?;
    println!("== main ==");
    print!("{}", ControlFlowGraph::build(&body));
    Ok(())
}
