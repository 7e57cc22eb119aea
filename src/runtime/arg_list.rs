use crate::{
    lang::Symbol,
    runtime::{error::EvalError, value::Value},
};

/// One supplied argument, possibly tagged and possibly still a promise.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<Symbol>,
    pub value: Value,
}

/// Ordered, optionally named arguments. Used both as the closure calling
/// convention and as the contents of `...`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgList {
    args: Vec<Arg>,
}

impl ArgList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: Option<Symbol>, value: Value) {
        self.args.push(Arg { name, value });
    }

    pub fn extend_from(&mut self, other: &ArgList) {
        self.args.extend(other.args.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.args.iter()
    }

    pub fn into_args(self) -> Vec<Arg> {
        self.args
    }
}

impl FromIterator<Arg> for ArgList {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}

/// Replaces the entry at `position` with the names of `dots`.
pub fn splice_names(
    names: &mut Vec<Option<Symbol>>,
    position: usize,
    dots: &ArgList,
) -> Result<(), EvalError> {
    if position >= names.len() {
        return Err(splice_out_of_range("names", position, names.len()));
    }
    names.splice(position..=position, dots.iter().map(|arg| arg.name.clone()));
    Ok(())
}

/// Replaces the entry at `position` with the forced values of `dots`.
pub fn splice_values(
    values: &mut Vec<Value>,
    position: usize,
    dots: &ArgList,
) -> Result<(), EvalError> {
    if position >= values.len() {
        return Err(splice_out_of_range("values", position, values.len()));
    }
    let forced = dots
        .iter()
        .map(|arg| arg.value.force())
        .collect::<Result<Vec<_>, _>>()?;
    values.splice(position..=position, forced);
    Ok(())
}

#[cold]
fn splice_out_of_range(array: &str, position: usize, len: usize) -> EvalError {
    EvalError::Internal(format!(
        "splice position {} outside {} array of length {}",
        position, array, len
    ))
}
