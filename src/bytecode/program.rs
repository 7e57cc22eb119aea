use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use crate::{
    bytecode::{
        code_unit::{ClosureUnit, CodeUnit},
        compiler::{
            Compiler,
            errors::LoweringResult,
        },
    },
    config::CompilerOptions,
    ir::Translator,
    lang::{Definition, Program, Symbol},
};

/// Name of the unit compiled from a program's body.
pub const MAIN_UNIT: &str = "main";

/// Every unit of a program: one closure per top-level definition and the
/// body.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub definitions: Vec<(Symbol, Arc<ClosureUnit>)>,
    pub main: Arc<CodeUnit>,
}

impl CompiledProgram {
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for (_, closure) in &self.definitions {
            for formal in &closure.formals {
                if let Some(default) = &formal.default {
                    out.push_str(&default.disassemble());
                }
            }
            out.push_str(&closure.body.disassemble());
        }
        out.push_str(&self.main.disassemble());
        out
    }
}

fn compile_definition(
    definition: &Definition,
    options: &CompilerOptions,
) -> LoweringResult<(Symbol, Arc<ClosureUnit>)> {
    let translator = Translator::new(options);
    let function = translator.translate_function(Some(definition.name.clone()), &definition.function)?;
    let unit = Compiler::compile_function(definition.name.to_string(), &function, options)?;
    Ok((definition.name.clone(), Arc::new(unit)))
}

/// Compiles each definition independently, on the rayon pool when
/// `options.parallel` is set, then the body. Output order follows the
/// source either way.
pub fn compile_program(program: &Program, options: &CompilerOptions) -> LoweringResult<CompiledProgram> {
    let definitions = if options.parallel {
        program
            .definitions
            .par_iter()
            .map(|definition| compile_definition(definition, options))
            .collect::<LoweringResult<Vec<_>>>()?
    } else {
        program
            .definitions
            .iter()
            .map(|definition| compile_definition(definition, options))
            .collect::<LoweringResult<Vec<_>>>()?
    };

    let body = Translator::new(options).translate_body(&program.body)?;
    let main = Compiler::new(MAIN_UNIT, options).compile_body(&body)?;
    debug!(
        "compiled program: {} definitions, main {} bytes",
        definitions.len(),
        main.instructions.len()
    );

    Ok(CompiledProgram {
        definitions,
        main: Arc::new(main),
    })
}
