//! User-declared functions: an immutable declaration paired with the
//! environment captured at its definition site.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::stmt::Stmt;
use crate::token::Token;
use crate::value::Value;

/// A first-class Lox function or method.
///
/// The declaration (`params`, `body`) is shared, never copied: [`bind`]
/// produces a new `LoxFunction` with the same `Rc`s but a fresh one-frame
/// closure holding `this`.
///
/// [`bind`]: LoxFunction::bind
#[derive(Debug)]
pub struct LoxFunction {
    name: Token,
    params: Rc<Vec<Token>>,
    body: Rc<Vec<Stmt>>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        name: Token,
        params: Rc<Vec<Token>>,
        body: Rc<Vec<Stmt>>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            name,
            params,
            body,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_initializer(&self) -> bool {
        self.is_initializer
    }

    /// Return a copy of this function whose closure is a fresh environment
    /// binding `this` to `instance`, parented on the original closure.
    ///
    /// This is what gives every instance's methods an independent `this`
    /// without mutating the shared declaration.
    pub fn bind(&self, instance: Value) -> LoxFunction {
        let mut environment = Environment::with_enclosing(self.closure.clone());
        environment.define("this", instance);

        LoxFunction {
            name: self.name.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }

    /// Invoke the function.  Arity has already been checked at the call site.
    ///
    /// One fresh child of the closure is created per call; the body executes
    /// against it directly (not a further nested block).  A `Return` unwinds
    /// to here and yields its value — except for initializers, which always
    /// yield the `this` bound at distance zero in their closure.
    pub fn call(&self, interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
        debug!(
            "Calling function '{}' with {} argument(s)",
            self.name.lexeme,
            arguments.len()
        );

        let mut environment = Environment::with_enclosing(self.closure.clone());
        for (param, argument) in self.params.iter().zip(arguments.iter()) {
            environment.define(&param.lexeme, argument.clone());
        }

        let flow: Flow =
            interpreter.execute_block(&self.body, Rc::new(RefCell::new(environment)))?;

        if self.is_initializer {
            // `return <value>;` inside an initializer was rejected at resolve
            // time, so any Return reaching here is a bare `return;`.
            return self
                .closure
                .borrow()
                .get_at(0, "this")
                .map_err(|msg| LoxError::runtime(self.name.line, msg));
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}
