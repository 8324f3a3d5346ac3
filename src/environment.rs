//! A chain of scope frames mapping names to mutable runtime values.
//!
//! Frames are created when entering a block, function call, or class body,
//! and are shared (`Rc<RefCell<..>>`) by every closure that captured them:
//! a frame lives as long as its longest-lived holder, not the lexical block
//! that created it.  A child's `enclosing` pointer always references a frame
//! created strictly earlier, so the chain is acyclic.
//!
//! `get`/`assign` walk the chain dynamically and are used for globals, which
//! the resolver never records distances for.  `get_at`/`assign_at` walk an
//! exact number of parent links supplied by the resolver; a bad distance
//! there is an interpreter invariant violation, not a user error.

use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// The single global frame: no parent.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A child frame of `enclosing` (block, call, or class body).
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Insert or overwrite a binding in this frame unconditionally.
    /// Redefinition is legal here; the resolver enforces the static
    /// no-redeclaration rule within a lexical block.
    pub fn define(&mut self, name: &str, value: Value) {
        debug!("define '{}' = {}", name, value);

        self.values.insert(name.to_string(), value);
    }

    /// Search this frame, then parents, for `name`.
    ///
    /// Fails with an undefined-variable message if no frame binds the name,
    /// and with an unassigned-variable message if the binding still holds
    /// the not-yet-initialized marker.
    pub fn get(&self, name: &str) -> Result<Value, String> {
        if let Some(value) = self.values.get(name) {
            if matches!(value, Value::Uninit) {
                Err(format!("Variable '{}' has not been initialized.", name))
            } else {
                Ok(value.clone())
            }
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(format!("Undefined variable '{}'.", name))
        }
    }

    /// Same search as [`get`](Self::get), but mutate the first frame where
    /// the name is found.  No implicit global creation on assignment.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), String> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(format!("Undefined variable '{}'.", name))
        }
    }

    /// Read `name` in the frame exactly `distance` parent links away.
    ///
    /// The distance comes from the resolver, so a missing frame or binding
    /// here means the static and dynamic scope chains have diverged.
    pub fn get_at(&self, distance: usize, name: &str) -> Result<Value, String> {
        if distance == 0 {
            match self.values.get(name) {
                Some(Value::Uninit) => {
                    Err(format!("Variable '{}' has not been initialized.", name))
                }
                Some(value) => Ok(value.clone()),
                None => Err(format!(
                    "Internal resolution fault: no binding '{}' at resolved scope.",
                    name
                )),
            }
        } else {
            match &self.enclosing {
                Some(enclosing) => enclosing.borrow().get_at(distance - 1, name),
                None => Err(format!(
                    "Internal resolution fault: scope chain shorter than distance for '{}'.",
                    name
                )),
            }
        }
    }

    /// Write `name` in the frame exactly `distance` parent links away.
    pub fn assign_at(&mut self, distance: usize, name: &str, value: Value) -> Result<(), String> {
        if distance == 0 {
            if self.values.contains_key(name) {
                self.values.insert(name.to_string(), value);
                Ok(())
            } else {
                Err(format!(
                    "Internal resolution fault: no binding '{}' at resolved scope.",
                    name
                ))
            }
        } else {
            match &self.enclosing {
                Some(enclosing) => enclosing.borrow_mut().assign_at(distance - 1, name, value),
                None => Err(format!(
                    "Internal resolution fault: scope chain shorter than distance for '{}'.",
                    name
                )),
            }
        }
    }
}
