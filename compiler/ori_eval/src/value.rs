//! Runtime values.
//!
//! Values cross task boundaries, so every shared payload sits behind an
//! `Arc` and `Value: Send + Sync`.

#![allow(
    clippy::disallowed_types,
    reason = "Arc payloads are moved between task threads"
)]

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use ori_ir::{ExprId, ExternId, FunctionId, Name};

use crate::channel::Channel;

/// A closure: parameters, body, and the bindings visible where it was made.
#[derive(Debug)]
pub struct Lambda {
    pub params: Vec<Name>,
    pub body: ExprId,
    pub captures: FxHashMap<Name, Value>,
    /// Function whose body created the lambda; its capabilities apply.
    pub owner: Option<FunctionId>,
}

#[derive(Clone, Debug)]
pub enum FunctionValue {
    Named(FunctionId),
    Lambda(Arc<Lambda>),
    Extern(ExternId),
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FunctionValue::Named(a), FunctionValue::Named(b)) => a == b,
            (FunctionValue::Lambda(a), FunctionValue::Lambda(b)) => Arc::ptr_eq(a, b),
            (FunctionValue::Extern(a), FunctionValue::Extern(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FunctionValue {}

#[derive(Clone, Debug)]
pub enum Value {
    Unit,
    Int(i64),
    Bool(bool),
    Str(Arc<str>),
    /// Nanoseconds.
    Duration(u64),
    List(Arc<Vec<Value>>),
    Tuple(Arc<Vec<Value>>),
    Some(Box<Value>),
    None,
    Ok(Box<Value>),
    Err(Box<Value>),
    Function(FunctionValue),
    Producer(Arc<Channel>),
    Consumer(Arc<Channel>),
    /// Payload of the `Err` a `timeout` produces when its deadline wins.
    TimedOut,
}

impl Value {
    pub fn string(text: &str) -> Self {
        Value::Str(Arc::from(text))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Arc::new(items))
    }

    pub fn some(value: Value) -> Self {
        Value::Some(Box::new(value))
    }

    pub fn ok(value: Value) -> Self {
        Value::Ok(Box::new(value))
    }

    pub fn err(value: Value) -> Self {
        Value::Err(Box::new(value))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "void",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::Duration(_) => "Duration",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Some(_) | Value::None => "Option",
            Value::Ok(_) | Value::Err(_) => "Result",
            Value::Function(_) => "function",
            Value::Producer(_) => "Producer",
            Value::Consumer(_) => "Consumer",
            Value::TimedOut => "TimedOut",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the value can key a `cache`.
    ///
    /// Functions and channel endpoints have identity, not structure.
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::Unit
            | Value::Int(_)
            | Value::Bool(_)
            | Value::Str(_)
            | Value::Duration(_)
            | Value::None
            | Value::TimedOut => true,
            Value::List(items) | Value::Tuple(items) => items.iter().all(Value::is_hashable),
            Value::Some(inner) | Value::Ok(inner) | Value::Err(inner) => inner.is_hashable(),
            Value::Function(_) | Value::Producer(_) | Value::Consumer(_) => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit)
            | (Value::None, Value::None)
            | (Value::TimedOut, Value::TimedOut) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Some(a), Value::Some(b))
            | (Value::Ok(a), Value::Ok(b))
            | (Value::Err(a), Value::Err(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Producer(a), Value::Producer(b)) | (Value::Consumer(a), Value::Consumer(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int(n) => n.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Duration(d) => d.hash(state),
            Value::List(items) | Value::Tuple(items) => items.hash(state),
            Value::Some(inner) | Value::Ok(inner) | Value::Err(inner) => inner.hash(state),
            // Identity-compared values hash by kind only.
            Value::Unit
            | Value::None
            | Value::TimedOut
            | Value::Function(_)
            | Value::Producer(_)
            | Value::Consumer(_) => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Duration(ns) => fmt_duration(*ns, f),
            Value::List(items) => {
                write!(f, "[")?;
                fmt_items(items, f)?;
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                fmt_items(items, f)?;
                write!(f, ")")
            }
            Value::Some(inner) => write!(f, "Some({inner})"),
            Value::None => write!(f, "None"),
            Value::Ok(inner) => write!(f, "Ok({inner})"),
            Value::Err(inner) => write!(f, "Err({inner})"),
            Value::Function(_) => write!(f, "<function>"),
            Value::Producer(_) => write!(f, "<producer>"),
            Value::Consumer(_) => write!(f, "<consumer>"),
            Value::TimedOut => write!(f, "TimedOut"),
        }
    }
}

fn fmt_items(items: &[Value], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn fmt_duration(ns: u64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    const UNITS: [(u64, &str); 4] = [
        (1_000_000_000, "s"),
        (1_000_000, "ms"),
        (1_000, "us"),
        (1, "ns"),
    ];
    for (scale, suffix) in UNITS {
        if ns != 0 && ns.checked_rem(scale) == Some(0) {
            return write!(f, "{}{suffix}", ns.checked_div(scale).unwrap_or(0));
        }
    }
    write!(f, "0ns")
}
