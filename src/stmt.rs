//! **Abstract-Syntax-Tree nodes** for *statements* (complete executable
//! constructs).  A program is a sequence of these nodes returned by
//! [`crate::parser::Parser::parse`].
//!
//! There is no `for` node: the parser desugars `for` loops into an
//! initializer block wrapping a `While`.

use crate::expr::Expr;
use crate::token::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand-alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.
    While { condition: Expr, body: Box<Stmt> },

    /// Function declaration - becomes a first-class callable value.
    Function {
        name: Token,

        /// Parameter name tokens (arity ≤ 255).
        params: Vec<Token>,

        /// Body executed when the function is called.
        body: Vec<Stmt>,
    },

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Optional expression to return.
        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    /// Class declaration with an optional superclass and a method list.
    /// `superclass` is always an `Expr::Variable`; `methods` are always
    /// `Stmt::Function` nodes.
    Class {
        name: Token,
        superclass: Option<Expr>,
        methods: Vec<Stmt>,
    },
}
