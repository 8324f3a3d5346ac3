//! The tree-walking evaluator.
//!
//! Executes statements and evaluates expressions against a live chain of
//! [`Environment`] frames, using the hop distances the resolver recorded
//! (keyed by AST node id) for direct variable access; names with no
//! side-table entry resolve against the global frame.
//!
//! Non-local `return` is threaded back through statement execution as a
//! [`Flow`] value — it is control flow, not failure, so it never travels on
//! the error channel.  Runtime errors use `Err` and abort the whole
//! statement sequence; they are reported once, by the caller of
//! [`Interpreter::interpret`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::expr::{Expr, LiteralValue};
use crate::function::LoxFunction;
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Outcome of executing one statement: either fall through to the next, or
/// unwind to the nearest enclosing function call carrying a return value.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Wall-clock seconds since the Unix epoch; the only built-in native.
fn clock_native(_args: &[Value]) -> Result<Value, String> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

pub struct Interpreter {
    /// Current-environment cursor; swapped and restored around every block
    /// and call, on every exit path.
    environment: Rc<RefCell<Environment>>,

    /// The single global frame; natives live here and unresolved names
    /// fall back to it.
    globals: Rc<RefCell<Environment>>,

    /// Resolver side-table: AST node id → hop distance.  Absent ⇒ global.
    locals: HashMap<usize, usize>,

    /// High-water mark of node ids the resolver has reported.  Parsers
    /// for follow-up units seed their counters here so ids stay unique
    /// across everything this interpreter can still reach.
    next_id: usize,

    /// Where `print` (and the top-level expression convenience) writes.
    output: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Create an interpreter printing to the given sink.  Used by tests to
    /// capture program output.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock",
                arity: 0,
                func: clock_native,
            },
        );

        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            next_id: 0,
            output,
        }
    }

    /// Record a resolved local: the resolver calls this once per
    /// variable/`this`/`super` occurrence it could bind to a scope.
    pub fn note_local(&mut self, id: usize, depth: usize) {
        self.next_id = self.next_id.max(id + 1);
        self.locals.insert(id, depth);
    }

    /// Record an occurrence the resolver found in no scope: it resolves
    /// against the global frame at evaluation time and needs no entry;
    /// a re-resolved node that previously had one loses it.
    pub fn note_global(&mut self, id: usize) {
        self.next_id = self.next_id.max(id + 1);
        self.locals.remove(&id);
    }

    /// First node id not in use by anything this interpreter can reach.
    ///
    /// Seed [`Parser::with_start_id`] with this when parsing a follow-up
    /// unit: function values created by earlier units keep their resolved
    /// distances alive, so a later unit reusing their ids would corrupt
    /// the side-table.
    ///
    /// [`Parser::with_start_id`]: crate::parser::Parser::with_start_id
    pub fn next_node_id(&self) -> usize {
        self.next_id
    }

    /// The single entry point: run a resolved program against the global
    /// environment.
    ///
    /// As a REPL-style convenience, a bare top-level expression statement
    /// prints its value.  A runtime error aborts the remaining statements
    /// and is returned to the caller for one-time reporting; the cursor has
    /// already been restored to the global frame by then, so independent
    /// follow-up units evaluate cleanly.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statement(s)", statements.len());

        for stmt in statements {
            match stmt {
                Stmt::Expression(expr) => {
                    let value = self.evaluate(expr)?;
                    writeln!(self.output, "{}", value)?;
                }

                _ => {
                    // Top-level `return` was rejected at resolve time, so
                    // any Flow::Return here is unreachable by construction.
                    self.execute(stmt)?;
                }
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute a single statement.
    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                let _ = self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.output, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                // Without an initializer the binding holds the reserved
                // marker; reading it before assignment is a runtime error.
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Uninit,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let environment = Rc::new(RefCell::new(Environment::with_enclosing(
                    self.environment.clone(),
                )));

                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.evaluate(condition)?;

                if is_truthy(&condition) {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }

                Ok(Flow::Normal)
            }

            Stmt::Function { name, params, body } => {
                debug!("Defining function '{}'", name.lexeme);

                // Close over the *current* environment: this is what gives
                // nested functions access to their defining scope after that
                // scope's block has exited.
                let function = LoxFunction::new(
                    name.clone(),
                    Rc::new(params.clone()),
                    Rc::new(body.clone()),
                    self.environment.clone(),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Execute `statements` with the cursor switched to `environment`,
    /// restoring the prior cursor on every exit path (normal completion,
    /// `return` unwinding, or error).
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut flow = Flow::Normal;
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}

                Ok(returning @ Flow::Return(_)) => {
                    flow = returning;
                    break;
                }

                Err(e) => {
                    self.environment = previous;
                    return Err(e);
                }
            }
        }

        self.environment = previous;
        Ok(flow)
    }

    /// `class` declaration: evaluate the superclass, pre-bind the name,
    /// thread `super` through the method closures, then bind the real class.
    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Stmt],
    ) -> Result<Flow> {
        debug!("Declaring class '{}'", name.lexeme);

        let superclass: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => {
                let line = match expr {
                    Expr::Variable { name, .. } => name.line,
                    _ => name.line,
                };

                match self.evaluate(expr)? {
                    Value::Class(class) => Some(class),
                    _ => {
                        return Err(LoxError::runtime(line, "Superclass must be a class."));
                    }
                }
            }
            None => None,
        };

        // Pre-bind the name so methods can reference their own class.
        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        let previous = self.environment.clone();

        if let Some(ref sc) = superclass {
            // The method closures see `super` one frame outside `this`.
            let mut environment = Environment::with_enclosing(self.environment.clone());
            environment.define("super", Value::Class(sc.clone()));
            self.environment = Rc::new(RefCell::new(environment));
        }

        let mut method_map: HashMap<String, Rc<LoxFunction>> = HashMap::new();
        for method in methods {
            if let Stmt::Function {
                name: method_name,
                params,
                body,
            } = method
            {
                let is_initializer = method_name.lexeme == "init";

                let function = LoxFunction::new(
                    method_name.clone(),
                    Rc::new(params.clone()),
                    Rc::new(body.clone()),
                    self.environment.clone(),
                    is_initializer,
                );

                method_map.insert(method_name.lexeme.clone(), Rc::new(function));
            }
        }

        let class = LoxClass::new(name.lexeme.clone(), superclass, method_map);

        self.environment = previous;

        self.environment
            .borrow_mut()
            .assign(&name.lexeme, Value::Class(Rc::new(class)))
            .map_err(|msg| LoxError::runtime(name.line, msg))?;

        Ok(Flow::Normal)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression evaluation
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluate an expression and return a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                let result = match self.locals.get(id) {
                    Some(&distance) => {
                        self.environment
                            .borrow_mut()
                            .assign_at(distance, &name.lexeme, value.clone())
                    }
                    None => self.globals.borrow_mut().assign(&name.lexeme, value.clone()),
                };

                result.map_err(|msg| LoxError::runtime(name.line, msg))?;
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.invoke_callable(&callee, paren, &args)
            }

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => LoxInstance::get(&instance, name),
                    _ => Err(LoxError::runtime(
                        name.line,
                        "Only instances have properties.",
                    )),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;

                let Value::Instance(instance) = object else {
                    return Err(LoxError::runtime(name.line, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;
                instance.borrow_mut().set(&name.lexeme, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    /// Variable/`this` reads go through the side-table: a recorded distance
    /// walks exactly that many frames; no entry reads the global frame.
    fn look_up_variable(&self, id: usize, name: &Token) -> Result<Value> {
        let result = match self.locals.get(&id) {
            Some(&distance) => self.environment.borrow().get_at(distance, &name.lexeme),
            None => self.globals.borrow().get(&name.lexeme),
        };

        result.map_err(|msg| LoxError::runtime(name.line, msg))
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(
                    operator.line,
                    "Operand must be a number.",
                )),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&right))),

            _ => Err(LoxError::runtime(operator.line, "Invalid unary operator.")),
        }
    }

    /// Short-circuiting `and`/`or`; both return the actual operand value,
    /// never a coerced boolean.
    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left = self.evaluate(left)?;

        match operator.token_type {
            TokenType::OR if is_truthy(&left) => Ok(left),
            TokenType::AND if !is_truthy(&left) => Ok(left),
            _ => self.evaluate(right),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(LoxError::runtime(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.")),
            },

            TokenType::STAR => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.")),
            },

            // Division is deliberately unguarded: x/0 follows IEEE-754 and
            // yields an infinity or NaN, never a runtime error.
            TokenType::SLASH => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.")),
            },

            TokenType::GREATER => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.")),
            },

            TokenType::GREATER_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.")),
            },

            TokenType::LESS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.")),
            },

            TokenType::LESS_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
                _ => Err(LoxError::runtime(operator.line, "Operands must be numbers.")),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(is_equal(&left, &right))),

            TokenType::BANG_EQUAL => Ok(Value::Bool(!is_equal(&left, &right))),

            _ => Err(LoxError::runtime(operator.line, "Invalid binary operator.")),
        }
    }

    /// `super.m` resolves the superclass at the recorded distance and `this`
    /// exactly one frame closer (guaranteed by the resolver's scope
    /// construction), then binds the superclass's method to the current
    /// instance.  Overrides on the subclass never affect this dispatch.
    fn evaluate_super(&mut self, id: usize, keyword: &Token, method: &Token) -> Result<Value> {
        let Some(&distance) = self.locals.get(&id) else {
            // Inside a class without a superclass, `super` resolved as a
            // global; there is never a global named `super`.
            return Err(LoxError::runtime(
                keyword.line,
                "Undefined variable 'super'.",
            ));
        };

        let superclass = self
            .environment
            .borrow()
            .get_at(distance, "super")
            .map_err(|msg| LoxError::runtime(keyword.line, msg))?;

        let object = self
            .environment
            .borrow()
            .get_at(distance - 1, "this")
            .map_err(|msg| LoxError::runtime(keyword.line, msg))?;

        let Value::Class(superclass) = superclass else {
            return Err(LoxError::runtime(
                keyword.line,
                "Internal resolution fault: 'super' is not bound to a class.",
            ));
        };

        let Some(found) = superclass.find_method(&method.lexeme) else {
            return Err(LoxError::runtime(
                method.line,
                format!("Undefined property '{}'.", method.lexeme),
            ));
        };

        Ok(Value::Function(Rc::new(found.bind(object))))
    }

    /// Invoke a callable (native function, user function, or class).
    /// Argument count must equal the callable's declared arity.
    fn invoke_callable(&mut self, callee: &Value, paren: &Token, args: &[Value]) -> Result<Value> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                debug!("Calling native function '{}'", name);
                self.check_arity(*arity, args.len(), paren)?;

                func(args).map_err(|msg| LoxError::runtime(paren.line, msg))
            }

            Value::Function(function) => {
                self.check_arity(function.arity(), args.len(), paren)?;

                function.call(self, args)
            }

            Value::Class(class) => {
                self.check_arity(class.arity(), args.len(), paren)?;

                LoxClass::instantiate(class, self, args)
            }

            _ => Err(LoxError::runtime(
                paren.line,
                "Can only call functions and classes.",
            )),
        }
    }

    fn check_arity(&self, expected: usize, actual: usize, paren: &Token) -> Result<()> {
        if expected != actual {
            return Err(LoxError::runtime(
                paren.line,
                format!("Expected {} arguments but got {}.", expected, actual),
            ));
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Nil and false are the only falsy values; everything else, including
/// numeric zero and the empty string, is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        _ => true,
    }
}

/// Kind-disjoint equality: values of different kinds are never equal,
/// `nil` equals only `nil`, callables and instances compare by identity.
fn is_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Nil, Value::Nil) => true,
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
        (
            Value::NativeFunction { name: a, .. },
            Value::NativeFunction { name: b, .. },
        ) => a == b,
        _ => false,
    }
}
