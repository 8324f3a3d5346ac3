#[cfg(test)]
mod environment_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use loxide::environment::Environment;
    use loxide::value::Value;

    fn number(v: &Value) -> f64 {
        match v {
            Value::Number(n) => *n,
            other => panic!("expected number, got {:?}", other),
        }
    }

    /// global → middle → inner, with `x` bound at every level.
    fn three_frame_chain() -> Rc<RefCell<Environment>> {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("x", Value::Number(0.0));

        let middle = Rc::new(RefCell::new(Environment::with_enclosing(global)));
        middle.borrow_mut().define("x", Value::Number(1.0));

        let inner = Rc::new(RefCell::new(Environment::with_enclosing(middle)));
        inner.borrow_mut().define("x", Value::Number(2.0));

        inner
    }

    #[test]
    fn test_get_walks_parent_links() {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("a", Value::Number(7.0));

        let child = Environment::with_enclosing(global);

        let value = child.get("a").expect("a is bound in the parent");
        assert_eq!(number(&value), 7.0);
    }

    #[test]
    fn test_get_undefined_variable() {
        let env = Environment::new();

        let err = env.get("missing").unwrap_err();
        assert!(err.contains("Undefined variable 'missing'"), "{}", err);
    }

    #[test]
    fn test_get_unassigned_variable_is_distinct_error() {
        let mut env = Environment::new();
        env.define("a", Value::Uninit);

        let err = env.get("a").unwrap_err();
        assert!(err.contains("has not been initialized"), "{}", err);

        // Assignment replaces the marker; reads succeed afterwards.
        env.assign("a", Value::Number(5.0)).unwrap();
        assert_eq!(number(&env.get("a").unwrap()), 5.0);
    }

    #[test]
    fn test_assign_mutates_first_frame_found() {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("a", Value::Number(1.0));

        let mut child = Environment::with_enclosing(global.clone());
        child.assign("a", Value::Number(2.0)).unwrap();

        // No implicit shadowing: the global binding was mutated.
        assert_eq!(number(&global.borrow().get("a").unwrap()), 2.0);
    }

    #[test]
    fn test_assign_never_creates_bindings() {
        let mut env = Environment::new();

        let err = env.assign("ghost", Value::Nil).unwrap_err();
        assert!(err.contains("Undefined variable 'ghost'"), "{}", err);
    }

    #[test]
    fn test_get_at_reads_exact_frame() {
        let inner = three_frame_chain();

        assert_eq!(number(&inner.borrow().get_at(0, "x").unwrap()), 2.0);
        assert_eq!(number(&inner.borrow().get_at(1, "x").unwrap()), 1.0);
        assert_eq!(number(&inner.borrow().get_at(2, "x").unwrap()), 0.0);
    }

    #[test]
    fn test_assign_at_writes_exact_frame() {
        let inner = three_frame_chain();

        inner
            .borrow_mut()
            .assign_at(1, "x", Value::Number(42.0))
            .unwrap();

        // Only the middle frame changed.
        assert_eq!(number(&inner.borrow().get_at(0, "x").unwrap()), 2.0);
        assert_eq!(number(&inner.borrow().get_at(1, "x").unwrap()), 42.0);
        assert_eq!(number(&inner.borrow().get_at(2, "x").unwrap()), 0.0);
    }

    #[test]
    fn test_malformed_distance_is_an_internal_fault() {
        let inner = three_frame_chain();

        let err = inner.borrow().get_at(9, "x").unwrap_err();
        assert!(err.contains("Internal resolution fault"), "{}", err);
    }

    #[test]
    fn test_define_overwrites_within_frame() {
        // Redefinition is legal at this layer; the resolver owns the static
        // no-redeclaration rule.
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.define("a", Value::Number(2.0));

        assert_eq!(number(&env.get("a").unwrap()), 2.0);
    }
}
