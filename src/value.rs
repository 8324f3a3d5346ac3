//! Runtime values manipulated by the evaluator.
//!
//! Truthiness and equality live in the interpreter ([`crate::interpreter`]);
//! this module only defines the value kinds and their textual form.

use std::cell::RefCell;
use std::rc::Rc;

use crate::class::{LoxClass, LoxInstance};
use crate::function::LoxFunction;

/// A native function is a plain Rust fn pointer plus a declared arity.
/// Errors are plain messages; the interpreter attaches the call-site line.
pub type NativeFn = fn(&[Value]) -> Result<Value, String>;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,

    Bool(bool),

    Number(f64),

    String(String),

    /// Built-in function defined on the global frame at startup.
    NativeFunction {
        name: &'static str,
        arity: usize,
        func: NativeFn,
    },

    /// User-declared function or bound method, with its captured closure.
    Function(Rc<LoxFunction>),

    /// A class is itself a callable (calling it instantiates).
    Class(Rc<LoxClass>),

    /// Instances share their class and own their field map.
    Instance(Rc<RefCell<LoxInstance>>),

    /// Reserved marker for a declared-but-unassigned binding.  Never the
    /// result of evaluating an expression; reads of it are surfaced by the
    /// environment as an unassigned-variable error.
    Uninit,
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::NativeFunction { name, .. } => write!(f, "<native fn {}>", name),

            Value::Function(func) => write!(f, "<fn {}>", func.name()),

            Value::Class(class) => write!(f, "{}", class.name()),

            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class_name()),

            Value::Uninit => write!(f, "<uninitialized>"),
        }
    }
}
