#[cfg(test)]
mod scanner_tests {
    use loxide::scanner::Scanner;
    use loxide::token::TokenType;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source.as_bytes());
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_two_char_operators() {
        assert_token_sequence(
            "! != = == < <= > >=",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_keywords_and_identifiers() {
        assert_token_sequence(
            "class Foo < Bar { init super this }",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::LESS, "<"),
                (TokenType::IDENTIFIER, "Bar"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::IDENTIFIER, "init"),
                (TokenType::SUPER, "super"),
                (TokenType::THIS, "this"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_literals() {
        let scanner = Scanner::new(b"123 3.14 \"hello\"" as &[u8]);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 4);

        match &tokens[0].token_type {
            TokenType::NUMBER(n) => assert_eq!(*n, 123.0),
            other => panic!("expected NUMBER, got {:?}", other),
        }

        match &tokens[1].token_type {
            TokenType::NUMBER(n) => assert_eq!(*n, 3.14),
            other => panic!("expected NUMBER, got {:?}", other),
        }

        match &tokens[2].token_type {
            TokenType::STRING(s) => assert_eq!(s, "hello"),
            other => panic!("expected STRING, got {:?}", other),
        }

        assert_eq!(tokens[3].token_type, TokenType::EOF);
    }

    #[test]
    fn test_scanner_comments_and_whitespace() {
        assert_token_sequence(
            "var x; // the rest is ignored ,.$(\nprint x;",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::PRINT, "print"),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_tracks_lines() {
        let scanner = Scanner::new(b"var a;\nvar b;\n\nvar c;" as &[u8]);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        let lines: Vec<usize> = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::VAR)
            .map(|t| t.line)
            .collect();

        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn test_scanner_unexpected_character() {
        let results: Vec<_> = Scanner::new(b"var $;" as &[u8]).collect();

        let errors: Vec<_> = results.iter().filter(|r| r.is_err()).collect();
        assert_eq!(errors.len(), 1);

        let message = format!("{}", results[1].as_ref().unwrap_err());
        assert!(message.contains("Unexpected character"), "{}", message);
    }

    #[test]
    fn test_scanner_unterminated_string() {
        let results: Vec<_> = Scanner::new(b"\"never closed" as &[u8]).collect();

        let error = results
            .iter()
            .find(|r| r.is_err())
            .expect("expected a lex error");

        let message = format!("{}", error.as_ref().unwrap_err());
        assert!(message.contains("Unterminated string"), "{}", message);
    }
}
