use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use crate::{
    ir::function::{IrBody, IrFunction},
    lang::{CallNode, Sexp, Symbol},
};

static NEXT_NODE: AtomicU32 = AtomicU32::new(0);
static NEXT_VARIABLE: AtomicU32 = AtomicU32::new(0);

fn next_variable_id() -> u32 {
    NEXT_VARIABLE.fetch_add(1, Ordering::Relaxed)
}

/// Identity of a nested thunk or closure literal.
///
/// Compiled units are cached by this id, never by structure: two identical
/// expressions written twice are two nodes and get two units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Key under which the slot allocator tracks local storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKey {
    Temp(u32),
    Local(u32),
}

/// Compiler-introduced temporary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temp {
    id: u32,
}

impl Temp {
    pub fn fresh() -> Self {
        Self {
            id: next_variable_id(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

/// A named variable the IR keeps in a machine slot instead of the
/// environment (loop counters and similar).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalVariable {
    id: u32,
    pub name: Symbol,
}

impl LocalVariable {
    pub fn fresh(name: &str) -> Self {
        Self {
            id: next_variable_id(),
            name: Symbol::from(name),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvironmentVariable {
    pub name: Symbol,
}

impl EnvironmentVariable {
    pub fn new(name: &str) -> Self {
        Self {
            name: Symbol::from(name),
        }
    }
}

/// Assignment target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LValue {
    Temp(Temp),
    Local(LocalVariable),
    Environment(EnvironmentVariable),
}

impl LValue {
    pub fn slot_key(&self) -> Option<SlotKey> {
        match self {
            LValue::Temp(temp) => Some(SlotKey::Temp(temp.id)),
            LValue::Local(local) => Some(SlotKey::Local(local.id)),
            LValue::Environment(_) => None,
        }
    }
}

impl From<Temp> for LValue {
    fn from(temp: Temp) -> Self {
        LValue::Temp(temp)
    }
}

impl From<LocalVariable> for LValue {
    fn from(local: LocalVariable) -> Self {
        LValue::Local(local)
    }
}

impl From<EnvironmentVariable> for LValue {
    fn from(variable: EnvironmentVariable) -> Self {
        LValue::Environment(variable)
    }
}

/// Literal operand. Native integers are pushed as machine integers and may
/// live in integer slots; everything else is rebuilt as a runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum IrConstant {
    Int(i32),
    Value(Sexp),
}

/// A deferred argument: the original expression plus the IR of its body.
#[derive(Debug, Clone)]
pub struct IrThunk {
    pub id: NodeId,
    pub sexp: Sexp,
    pub body: Arc<IrBody>,
}

impl IrThunk {
    pub fn new(sexp: Sexp, body: IrBody) -> Self {
        Self {
            id: NodeId::fresh(),
            sexp,
            body: Arc::new(body),
        }
    }

    /// The referenced variable when the thunk wraps a bare name.
    pub fn variable(&self) -> Option<&Symbol> {
        self.sexp.as_symbol()
    }
}

#[derive(Debug, Clone)]
pub struct MakeClosure {
    pub id: NodeId,
    pub function: Arc<IrFunction>,
}

impl MakeClosure {
    pub fn new(function: IrFunction) -> Self {
        Self {
            id: NodeId::fresh(),
            function: Arc::new(function),
        }
    }
}

/// What a dynamic call invokes.
#[derive(Debug, Clone)]
pub enum Callee {
    /// Looked up with function-position semantics at run time.
    Name(Symbol),
    /// Evaluated, then checked for callability.
    Expression(Box<Expression>),
}

/// Argument payload shared by dynamic and primitive calls.
#[derive(Debug, Clone)]
pub struct CallArguments {
    pub call: Arc<CallNode>,
    pub arguments: Vec<Expression>,
    pub names: Vec<Option<Symbol>>,
}

impl CallArguments {
    pub fn new(call: Arc<CallNode>, arguments: Vec<Expression>, names: Vec<Option<Symbol>>) -> Self {
        Self {
            call,
            arguments,
            names,
        }
    }

    pub fn positional(call: Arc<CallNode>, arguments: Vec<Expression>) -> Self {
        let names = vec![None; arguments.len()];
        Self::new(call, arguments, names)
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn ellipsis_index(&self) -> Option<usize> {
        self.arguments
            .iter()
            .position(|argument| matches!(argument, Expression::Ellipsis))
    }

    pub fn has_ellipsis(&self) -> bool {
        self.ellipsis_index().is_some()
    }

    pub fn ellipsis_count(&self) -> usize {
        self.arguments
            .iter()
            .filter(|argument| matches!(argument, Expression::Ellipsis))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct DynamicCall {
    pub callee: Callee,
    pub args: CallArguments,
}

/// Call of a builtin known at compile time, bypassing the category test.
#[derive(Debug, Clone)]
pub struct PrimitiveCall {
    pub primitive: Symbol,
    pub args: CallArguments,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Constant(IrConstant),
    Temp(Temp),
    LocalVariable(LocalVariable),
    EnvironmentVariable(EnvironmentVariable),
    ElementAccess {
        vector: Box<Expression>,
        index: Box<Expression>,
    },
    Length(Box<Expression>),
    Increment(Box<Expression>),
    /// `op1 >= op2`.
    CmpGe(Box<Expression>, Box<Expression>),
    MakeClosure(MakeClosure),
    Thunk(IrThunk),
    /// Splice marker standing for the enclosing function's `...`.
    Ellipsis,
    PrimitiveCall(PrimitiveCall),
    DynamicCall(DynamicCall),
}

impl Expression {
    pub fn int(value: i32) -> Self {
        Expression::Constant(IrConstant::Int(value))
    }

    pub fn constant(value: Sexp) -> Self {
        Expression::Constant(IrConstant::Value(value))
    }

    pub fn null() -> Self {
        Self::constant(Sexp::Null)
    }

    pub fn variable(name: &str) -> Self {
        Expression::EnvironmentVariable(EnvironmentVariable::new(name))
    }

    pub fn length(vector: Expression) -> Self {
        Expression::Length(Box::new(vector))
    }

    pub fn increment(counter: Expression) -> Self {
        Expression::Increment(Box::new(counter))
    }

    pub fn element_access(vector: Expression, index: Expression) -> Self {
        Expression::ElementAccess {
            vector: Box::new(vector),
            index: Box::new(index),
        }
    }

    pub fn cmp_ge(op1: Expression, op2: Expression) -> Self {
        Expression::CmpGe(Box::new(op1), Box::new(op2))
    }

    /// Slot-resident operands: temporaries and local variables.
    pub fn slot_key(&self) -> Option<SlotKey> {
        match self {
            Expression::Temp(temp) => Some(SlotKey::Temp(temp.id())),
            Expression::LocalVariable(local) => Some(SlotKey::Local(local.id())),
            _ => None,
        }
    }

    /// True for operands whose evaluation has no effect and can be dropped.
    pub fn is_trivial(&self) -> bool {
        matches!(
            self,
            Expression::Constant(_) | Expression::Temp(_) | Expression::LocalVariable(_)
        )
    }
}

impl From<LValue> for Expression {
    fn from(lvalue: LValue) -> Self {
        match lvalue {
            LValue::Temp(temp) => Expression::Temp(temp),
            LValue::Local(local) => Expression::LocalVariable(local),
            LValue::Environment(variable) => Expression::EnvironmentVariable(variable),
        }
    }
}

impl From<Temp> for Expression {
    fn from(temp: Temp) -> Self {
        Expression::Temp(temp)
    }
}

impl fmt::Display for LValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LValue::Temp(temp) => write!(f, "t{}", temp.id),
            LValue::Local(local) => write!(f, "{}_{}", local.name, local.id),
            LValue::Environment(variable) => write!(f, "{}", variable.name),
        }
    }
}

fn write_arguments(f: &mut fmt::Formatter<'_>, args: &CallArguments) -> fmt::Result {
    write!(f, "(")?;
    for (i, argument) in args.arguments.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        if let Some(Some(name)) = args.names.get(i) {
            write!(f, "{} = ", name)?;
        }
        write!(f, "{}", argument)?;
    }
    write!(f, ")")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(IrConstant::Int(v)) => write!(f, "{}i", v),
            Expression::Constant(IrConstant::Value(sexp)) => write!(f, "{}", sexp),
            Expression::Temp(temp) => write!(f, "t{}", temp.id),
            Expression::LocalVariable(local) => write!(f, "{}_{}", local.name, local.id),
            Expression::EnvironmentVariable(variable) => write!(f, "{}", variable.name),
            Expression::ElementAccess { vector, index } => write!(f, "{}[{}]", vector, index),
            Expression::Length(vector) => write!(f, "length({})", vector),
            Expression::Increment(counter) => write!(f, "increment({})", counter),
            Expression::CmpGe(op1, op2) => write!(f, "{} >= {}", op1, op2),
            Expression::MakeClosure(closure) => write!(f, "closure{}", closure.id),
            Expression::Thunk(thunk) => write!(f, "thunk{}<{}>", thunk.id, thunk.sexp),
            Expression::Ellipsis => write!(f, "..."),
            Expression::PrimitiveCall(call) => {
                write!(f, "primitive<{}>", call.primitive)?;
                write_arguments(f, &call.args)
            }
            Expression::DynamicCall(call) => {
                match &call.callee {
                    Callee::Name(name) => write!(f, "{}", name)?,
                    Callee::Expression(callee) => write!(f, "({})", callee)?,
                }
                write_arguments(f, &call.args)
            }
        }
    }
}
