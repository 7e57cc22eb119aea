pub mod bytecode;
pub mod config;
pub mod driver;
pub mod ir;
pub mod lang;
pub mod runtime;
