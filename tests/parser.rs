#[cfg(test)]
mod parser_tests {
    use loxide::expr::{Expr, LiteralValue};
    use loxide::parser::Parser;
    use loxide::scanner::Scanner;
    use loxide::stmt::Stmt;
    use loxide::token::{Token, TokenType};

    fn parse(source: &str) -> Result<Vec<Stmt>, loxide::error::LoxError> {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .collect::<Result<_, _>>()
            .expect("source lexes");

        Parser::new(&tokens).parse()
    }

    fn parse_ok(source: &str) -> Vec<Stmt> {
        parse(source).expect("source parses")
    }

    fn single_expression(source: &str) -> Expr {
        let mut statements = parse_ok(source);
        assert_eq!(statements.len(), 1);

        match statements.remove(0) {
            Stmt::Expression(expr) => expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_factor_binds_tighter_than_term() {
        let expr = single_expression("1 + 2 * 3;");

        let Expr::Binary {
            operator, right, ..
        } = expr
        else {
            panic!("expected binary expression");
        };

        assert_eq!(operator.token_type, TokenType::PLUS);
        assert!(matches!(
            *right,
            Expr::Binary {
                ref operator,
                ..
            } if operator.token_type == TokenType::STAR
        ));
    }

    #[test]
    fn test_unary_binds_tighter_than_factor() {
        let expr = single_expression("-1 * 2;");

        let Expr::Binary { left, operator, .. } = expr else {
            panic!("expected binary expression");
        };

        assert_eq!(operator.token_type, TokenType::STAR);
        assert!(matches!(*left, Expr::Unary { .. }));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let statements = parse_ok("var a; var b; a = b = 1;");

        let Stmt::Expression(Expr::Assign { ref value, .. }) = statements[2] else {
            panic!("expected assignment statement");
        };

        assert!(matches!(**value, Expr::Assign { .. }));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse("1 = 2;").unwrap_err();

        assert!(
            err.to_string().contains("Invalid assignment target"),
            "{}",
            err
        );
    }

    #[test]
    fn test_property_assignment_becomes_set() {
        let expr = single_expression("obj.field = 1;");

        assert!(matches!(expr, Expr::Set { .. }));
    }

    #[test]
    fn test_for_desugars_into_block_and_while() {
        let statements = parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");
        assert_eq!(statements.len(), 1);

        // { var i = 0; while (i < 3) { print i; i = i + 1; } }
        let Stmt::Block(ref outer) = statements[0] else {
            panic!("expected desugared block, got {:?}", statements[0]);
        };
        assert_eq!(outer.len(), 2);
        assert!(matches!(outer[0], Stmt::Var { .. }));

        let Stmt::While { ref body, .. } = outer[1] else {
            panic!("expected while loop, got {:?}", outer[1]);
        };

        let Stmt::Block(ref inner) = **body else {
            panic!("expected loop body block");
        };
        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn test_for_without_clauses_loops_on_true() {
        let statements = parse_ok("for (;;) print 1;");

        let Stmt::While { ref condition, .. } = statements[0] else {
            panic!("expected bare while, got {:?}", statements[0]);
        };

        assert_eq!(*condition, Expr::Literal(LiteralValue::True));
    }

    #[test]
    fn test_node_ids_are_unique_per_occurrence() {
        let statements = parse_ok("a; a; a;");

        let ids: Vec<usize> = statements
            .iter()
            .map(|stmt| match stmt {
                Stmt::Expression(Expr::Variable { id, .. }) => *id,
                other => panic!("expected variable statement, got {:?}", other),
            })
            .collect();

        assert_eq!(ids.len(), 3);
        assert!(ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2]);
    }

    #[test]
    fn test_class_declaration_with_superclass() {
        let statements = parse_ok("class B < A { method() {} }");

        let Stmt::Class {
            ref name,
            ref superclass,
            ref methods,
        } = statements[0]
        else {
            panic!("expected class declaration");
        };

        assert_eq!(name.lexeme, "B");
        assert!(
            matches!(superclass, Some(Expr::Variable { name, .. }) if name.lexeme == "A")
        );
        assert_eq!(methods.len(), 1);
        assert!(matches!(methods[0], Stmt::Function { .. }));
    }

    #[test]
    fn test_super_requires_a_method_access() {
        let err = parse("super;").unwrap_err();

        assert!(
            err.to_string().contains("Expected '.' after 'super'"),
            "{}",
            err
        );
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse("print 1").unwrap_err();

        assert!(err.to_string().contains("Expected ';'"), "{}", err);
    }

    #[test]
    fn test_call_and_property_chains() {
        // a.b(1).c — Get(Call(Get(Variable)))
        let expr = single_expression("a.b(1).c;");

        let Expr::Get { object, name } = expr else {
            panic!("expected property access");
        };
        assert_eq!(name.lexeme, "c");
        assert!(matches!(*object, Expr::Call { .. }));
    }
}
