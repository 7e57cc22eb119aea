use crate::{
    lang::Symbol,
    runtime::{builtin_function::BuiltinFunction, env::Env, value::Value},
};

mod helpers;
mod numeric_ops;
mod string_ops;
mod vector_ops;

use numeric_ops::{
    builtin_add, builtin_div, builtin_eq, builtin_ge, builtin_lt, builtin_mul, builtin_not,
    builtin_sub, builtin_sum,
};
use string_ops::builtin_paste;
use vector_ops::{builtin_c, builtin_element, builtin_identity, builtin_length, builtin_list};

/// Every builtin installed in a fresh global environment. Primitive calls
/// resolve against this table by name at compile time.
pub static BUILTINS: &[BuiltinFunction] = &[
    BuiltinFunction {
        name: "+",
        func: builtin_add,
    },
    BuiltinFunction {
        name: "-",
        func: builtin_sub,
    },
    BuiltinFunction {
        name: "*",
        func: builtin_mul,
    },
    BuiltinFunction {
        name: "/",
        func: builtin_div,
    },
    BuiltinFunction {
        name: ">=",
        func: builtin_ge,
    },
    BuiltinFunction {
        name: "<",
        func: builtin_lt,
    },
    BuiltinFunction {
        name: "==",
        func: builtin_eq,
    },
    BuiltinFunction {
        name: "!",
        func: builtin_not,
    },
    BuiltinFunction {
        name: "sum",
        func: builtin_sum,
    },
    BuiltinFunction {
        name: "c",
        func: builtin_c,
    },
    BuiltinFunction {
        name: "list",
        func: builtin_list,
    },
    BuiltinFunction {
        name: "length",
        func: builtin_length,
    },
    BuiltinFunction {
        name: "identity",
        func: builtin_identity,
    },
    BuiltinFunction {
        name: "[[",
        func: builtin_element,
    },
    BuiltinFunction {
        name: "paste",
        func: builtin_paste,
    },
];

pub fn lookup(name: &str) -> Option<BuiltinFunction> {
    BUILTINS.iter().find(|b| b.name == name).copied()
}

pub fn install(env: &Env) {
    for builtin in BUILTINS {
        env.set_variable(Symbol::from(builtin.name), Value::Builtin(*builtin));
    }
}

#[cfg(test)]
mod test_support;
