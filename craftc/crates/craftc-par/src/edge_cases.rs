//! Edge case tests for craftc-par

#[cfg(test)]
mod tests {
    use crate::cst::{CommandComponent, Expr, File, Statement};
    use crate::{parse_file, ParseResult};
    use craftc_walk::Walker;

    fn parse(source: &str) -> ParseResult<File<'_>> {
        let mut walker = Walker::new(source);
        parse_file(&mut walker)
    }

    fn parse_ok(source: &str) -> File<'_> {
        match parse(source) {
            Ok(file) => file,
            Err(e) => panic!("parse failed: {} in {:?}", e, source),
        }
    }

    fn body<'a>(file: &'a File<'_>, index: usize) -> &'a [Statement<'a>] {
        &file.func_defs[index].statements
    }

    // ==================== FILE STRUCTURE ====================

    #[test]
    fn test_minimal_file() {
        let file = parse_ok("namespace a\r\nmain(): void\r\n\tnop\r\n");
        assert_eq!(file.namespace.components.len(), 1);
        assert_eq!(file.namespace.components[0], "a");
        assert_eq!(file.func_defs.len(), 1);
        assert_eq!(file.func_defs[0].identifier, "main");
        assert_eq!(file.func_defs[0].return_type, "void");
        assert_eq!(body(&file, 0), &[Statement::Nop]);
    }

    #[test]
    fn test_namespace_only() {
        let file = parse_ok("namespace a.b.c");
        assert_eq!(file.namespace.components.len(), 3);
        assert!(file.func_defs.is_empty());
    }

    #[test]
    fn test_namespace_spaced_dots() {
        let file = parse_ok("namespace a . b\t. c");
        let names: Vec<_> = file
            .namespace
            .components
            .iter()
            .map(|c| c.lexeme())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_missing_namespace() {
        assert!(parse("main(): void\r\n\tnop").is_err());
    }

    #[test]
    fn test_unexpected_indent_at_top_level() {
        let err = parse("  namespace a").unwrap_err();
        assert_eq!(err.message, "unexpected indent");
    }

    #[test]
    fn test_duplicate_function() {
        let err = parse("namespace a\r\nf(): void\r\n\tnop\r\nf(): void\r\n\tnop").unwrap_err();
        assert_eq!(err.message, "function 'f' already defined");
    }

    #[test]
    fn test_multiple_functions_and_params() {
        let file = parse_ok(
            "namespace a\r\nf(x: score, y: entity): score\r\n\treturn x\r\ng(): void\r\n\tnop",
        );
        assert_eq!(file.func_defs.len(), 2);
        let f = &file.func_defs[0];
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].identifier, "x");
        assert_eq!(f.params[0].ty, "score");
        assert_eq!(f.params[1].ty, "entity");
    }

    #[test]
    fn test_trailing_comma_in_params() {
        assert!(parse("namespace a\r\nf(x: score,): void\r\n\tnop").is_err());
    }

    #[test]
    fn test_blank_lines_between_functions() {
        let file = parse_ok("namespace a\r\n\r\n\r\nf(): void\r\n\tnop\r\n\r\ng(): void\r\n\tnop");
        assert_eq!(file.func_defs.len(), 2);
    }

    // ==================== STATEMENTS ====================

    #[test]
    fn test_assignments() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tx = 1\r\n\tx += 2\r\n\tx &= y");
        let stmts = body(&file, 0);
        assert_eq!(stmts.len(), 3);
        for (statement, op) in stmts.iter().zip(["=", "+=", "&="]) {
            match statement {
                Statement::Assign(assign) => assert_eq!(assign.operator, op),
                other => panic!("expected assignment, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_swap() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tp >< q");
        match &body(&file, 0)[0] {
            Statement::Swap(swap) => {
                assert_eq!(swap.left, "p");
                assert_eq!(swap.right, "q");
            }
            other => panic!("expected swap, got {:?}", other),
        }
    }

    #[test]
    fn test_nop_with_trailing_junk_is_an_error() {
        assert!(parse("namespace a\r\nf(): void\r\n\tnop nop").is_err());
    }

    #[test]
    fn test_return_parenthesized_without_space() {
        let file = parse_ok("namespace a\r\nf(): score\r\n\treturn(1)");
        match &body(&file, 0)[0] {
            Statement::Return(ret) => assert!(matches!(ret.expr, Expr::Parens(_))),
            other => panic!("expected return, got {:?}", other),
        }
    }

    #[test]
    fn test_return_without_expression() {
        assert!(parse("namespace a\r\nf(): void\r\n\treturn\r\n").is_err());
    }

    #[test]
    fn test_call_statement_args() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tg(1, ref x, y)");
        match &body(&file, 0)[0] {
            Statement::Call(call) => {
                assert_eq!(call.identifier, "g");
                assert_eq!(call.args.len(), 3);
                assert!(!call.args[0].by_ref);
                assert!(call.args[1].by_ref);
                assert!(!call.args[2].by_ref);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_arg_list_comma_errors() {
        assert!(parse("namespace a\r\nf(): void\r\n\tg(1,)").is_err());
        assert!(parse("namespace a\r\nf(): void\r\n\tg(1, )").is_err());
        assert!(parse("namespace a\r\nf(): void\r\n\tg(1 2)").is_err());
    }

    #[test]
    fn test_ref_prefix_identifier_is_a_value_arg() {
        // 'refx' and a bare 'ref' are ordinary identifiers, not by-ref markers.
        let file = parse_ok("namespace a\r\nf(): void\r\n\tg(refx, ref)");
        match &body(&file, 0)[0] {
            Statement::Call(call) => {
                assert!(call.args.iter().all(|a| !a.by_ref));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    // ==================== CONTROL FLOW ====================

    #[test]
    fn test_if_else() {
        let file = parse_ok(
            "namespace a\r\nf(): void\r\n\tif x\r\n\t\ty = 1\r\n\telse\r\n\t\ty = 2\r\n\t\tz = 3",
        );
        match &body(&file, 0)[0] {
            Statement::If(if_statement) => {
                assert_eq!(if_statement.if_true.len(), 1);
                assert_eq!(if_statement.if_false.len(), 2);
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_else() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tif x\r\n\t\tnop\r\n\ty = 1");
        let stmts = body(&file, 0);
        assert_eq!(stmts.len(), 2);
        match &stmts[0] {
            Statement::If(if_statement) => assert!(if_statement.if_false.is_empty()),
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_identifier_starting_with_else_is_not_an_else() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tif x\r\n\t\tnop\r\n\telsewhere = 1");
        let stmts = body(&file, 0);
        assert_eq!(stmts.len(), 2);
        assert!(matches!(stmts[1], Statement::Assign(_)));
    }

    #[test]
    fn test_while() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\twhile x\r\n\t\tnop");
        match &body(&file, 0)[0] {
            Statement::While(while_statement) => {
                assert_eq!(while_statement.statements.len(), 1);
            }
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_do_while() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tdo\r\n\t\tnop\r\n\twhile x");
        match &body(&file, 0)[0] {
            Statement::DoWhile(do_while) => {
                assert_eq!(do_while.statements.len(), 1);
                assert!(matches!(do_while.condition, Expr::Identifier(_)));
            }
            other => panic!("expected do-while, got {:?}", other),
        }
    }

    #[test]
    fn test_do_without_while_is_an_error() {
        assert!(parse("namespace a\r\nf(): void\r\n\tdo\r\n\t\tnop").is_err());
    }

    // ==================== CALL VS CONTROL AMBIGUITY ====================

    #[test]
    fn test_if_call_with_block_is_a_statement() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tif(x)\r\n\t\tnop");
        match &body(&file, 0)[0] {
            Statement::If(if_statement) => {
                assert!(matches!(if_statement.condition, Expr::Parens(_)));
                assert_eq!(if_statement.if_true.len(), 1);
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_call_without_block_is_a_call() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tif(x)\r\n\tnop");
        let stmts = body(&file, 0);
        assert!(matches!(&stmts[0], Statement::Call(call) if call.identifier == "if"));
        assert!(matches!(stmts[1], Statement::Nop));
    }

    #[test]
    fn test_if_call_at_eof_is_a_call() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tif(x)");
        assert!(matches!(&body(&file, 0)[0], Statement::Call(_)));
    }

    #[test]
    fn test_if_with_ref_arg_is_a_call() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tif(ref x)");
        assert!(matches!(&body(&file, 0)[0], Statement::Call(_)));
        // A block after it is not owned by the call, so the indent is stray.
        assert!(parse("namespace a\r\nf(): void\r\n\tif(ref x)\r\n\t\tnop").is_err());
    }

    #[test]
    fn test_if_with_two_args_is_a_call() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tif(x, y)");
        match &body(&file, 0)[0] {
            Statement::Call(call) => assert_eq!(call.args.len(), 2),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_while_call_ambiguity() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\twhile(x)\r\n\t\tnop");
        assert!(matches!(&body(&file, 0)[0], Statement::While(_)));
        let file = parse_ok("namespace a\r\nf(): void\r\n\twhile(x)");
        assert!(matches!(&body(&file, 0)[0], Statement::Call(_)));
    }

    // ==================== INDENTATION ====================

    #[test]
    fn test_tab_rounds_up_to_multiple_of_four() {
        // " \t" is column 1 rounded up to 4, the same level as "\t".
        let file = parse_ok("namespace a\r\nf(): void\r\n\tnop\r\n \tnop");
        assert_eq!(body(&file, 0).len(), 2);
    }

    #[test]
    fn test_deeper_dedent_closes_block() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\t\tif x\r\n\t\t\tnop\r\n\t\tnop");
        let stmts = body(&file, 0);
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn test_stray_indent_is_an_error() {
        let err = parse("namespace a\r\nf(): void\r\n\tnop\r\n\t\tnop").unwrap_err();
        assert_eq!(err.message, "invalid indentation level");
    }

    #[test]
    fn test_blank_lines_inside_block() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tnop\r\n\r\n   \r\n\tnop");
        assert_eq!(body(&file, 0).len(), 2);
    }

    // ==================== EXPRESSIONS ====================

    #[test]
    fn test_precedence_shape() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tx = 1 + 2 * 3");
        match &body(&file, 0)[0] {
            Statement::Assign(assign) => match &assign.expr {
                Expr::Binary(add) => {
                    assert_eq!(add.operator, "+");
                    assert!(matches!(&*add.right, Expr::Binary(mul) if mul.operator == "*"));
                }
                other => panic!("expected binary, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tx = 1 - 2 - 3");
        match &body(&file, 0)[0] {
            Statement::Assign(assign) => match &assign.expr {
                Expr::Binary(outer) => {
                    assert!(matches!(&*outer.left, Expr::Binary(_)));
                    assert!(matches!(&*outer.right, Expr::Literal(_)));
                }
                other => panic!("expected binary, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_signed_literals_are_not_unary() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tx = -1\r\n\ty = - x\r\n\tz = !b");
        let stmts = body(&file, 0);
        match &stmts[0] {
            Statement::Assign(assign) => {
                assert!(matches!(&assign.expr, Expr::Literal(l) if l.token == "-1"));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
        match &stmts[1] {
            Statement::Assign(assign) => assert!(matches!(&assign.expr, Expr::Unary(_))),
            other => panic!("expected assignment, got {:?}", other),
        }
        match &stmts[2] {
            Statement::Assign(assign) => {
                assert!(matches!(&assign.expr, Expr::Unary(u) if u.operator == "!"));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_range() {
        assert!(parse("namespace a\r\nf(): void\r\n\tx = 2147483647").is_ok());
        assert!(parse("namespace a\r\nf(): void\r\n\tx = -2147483648").is_ok());
        let err = parse("namespace a\r\nf(): void\r\n\tx = 2147483648").unwrap_err();
        assert_eq!(err.message, "integer out of range");
        let err = parse("namespace a\r\nf(): void\r\n\tx = 99999999999999999999").unwrap_err();
        assert_eq!(err.message, "integer out of range");
    }

    #[test]
    fn test_entity_literal() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\te = <@e[tag=alive]>");
        match &body(&file, 0)[0] {
            Statement::Assign(assign) => {
                assert!(matches!(&assign.expr, Expr::Literal(l) if l.token == "@e[tag=alive]"));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_entity_literal_errors() {
        let err = parse("namespace a\r\nf(): void\r\n\te = <@e\r\n").unwrap_err();
        assert_eq!(err.message, "illegal newline");
        let err = parse("namespace a\r\nf(): void\r\n\te = <@e").unwrap_err();
        assert_eq!(err.message, "unexpected EOF");
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        let err = parse("namespace a\r\nf(): void\r\n\tx = (1 + 2").unwrap_err();
        assert_eq!(err.message, "unbalanced parenthesis");
    }

    #[test]
    fn test_call_expression() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\tx = g(1) + 2");
        match &body(&file, 0)[0] {
            Statement::Assign(assign) => match &assign.expr {
                Expr::Binary(add) => assert!(matches!(&*add.left, Expr::Call(_))),
                other => panic!("expected binary, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    // ==================== COMMAND STATEMENTS ====================

    #[test]
    fn test_command_verbatim() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\t/say hello world");
        match &body(&file, 0)[0] {
            Statement::Command(command) => {
                assert_eq!(command.components.len(), 1);
                match &command.components[0] {
                    CommandComponent::Verbatim(token) => assert_eq!(*token, "say hello world"),
                    other => panic!("expected verbatim, got {:?}", other),
                }
            }
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn test_command_interpolation() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\t/say $(x + 1) and $(ref y)!");
        match &body(&file, 0)[0] {
            Statement::Command(command) => {
                assert_eq!(command.components.len(), 5);
                assert!(matches!(&command.components[0],
                    CommandComponent::Verbatim(t) if *t == "say "));
                assert!(matches!(&command.components[1],
                    CommandComponent::Arg(arg) if !arg.by_ref));
                assert!(matches!(&command.components[2],
                    CommandComponent::Verbatim(t) if *t == " and "));
                assert!(matches!(&command.components[3],
                    CommandComponent::Arg(arg) if arg.by_ref));
                assert!(matches!(&command.components[4],
                    CommandComponent::Verbatim(t) if *t == "!"));
            }
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_command() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\t/");
        match &body(&file, 0)[0] {
            Statement::Command(command) => assert!(command.components.is_empty()),
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn test_command_dollar_without_paren_is_verbatim() {
        let file = parse_ok("namespace a\r\nf(): void\r\n\t/give @p $item");
        match &body(&file, 0)[0] {
            Statement::Command(command) => {
                assert_eq!(command.components.len(), 1);
            }
            other => panic!("expected command, got {:?}", other),
        }
    }

    // ==================== ROUND TRIP ====================

    fn assert_round_trip(source: &str) {
        let file = parse_ok(source);
        let canonical = file.to_string();
        let mut walker = Walker::new(&canonical);
        let reparsed = match parse_file(&mut walker) {
            Ok(file) => file,
            Err(e) => panic!("canonical form failed to reparse: {}\n{:?}", e, canonical),
        };
        assert_eq!(file, reparsed, "round trip changed the tree for {:?}", source);
        // A second stringification is a fixed point.
        assert_eq!(canonical, reparsed.to_string());
    }

    #[test]
    fn test_round_trip_simple() {
        assert_round_trip("namespace a\r\nmain(): void\r\n\tnop\r\n");
    }

    #[test]
    fn test_round_trip_whitespace_normalization() {
        assert_round_trip("namespace  a . b\r\nf( x :score): score\r\n\treturn   x+1");
    }

    #[test]
    fn test_round_trip_control_flow() {
        assert_round_trip(
            "namespace a.b\r\nf(n: score): score\r\n\tif n > 1\r\n\t\tn -= 1\r\n\telse\r\n\t\tn = 0\r\n\twhile n < 10\r\n\t\tn += 1\r\n\tdo\r\n\t\tn *= 2\r\n\twhile n < 100\r\n\treturn n",
        );
    }

    #[test]
    fn test_round_trip_commands_and_calls() {
        assert_round_trip(
            "namespace a\r\nf(p: score): void\r\n\t/say value is $( p ) end\r\n\tg(1, ref p)\r\n\tx = g(2) * -3\r\ng(q: score): score\r\n\treturn q",
        );
    }

    #[test]
    fn test_round_trip_entity_algebra() {
        assert_round_trip(
            "namespace a\r\nf(): void\r\n\ts = <@e[type=cow]> & <@e[tag=hit]>\r\n\tt = ! (s == s)",
        );
    }

    // ==================== ERROR POSITIONS ====================

    #[test]
    fn test_error_position() {
        let err = parse("namespace a\r\nbad!(): void\r\n\tnop").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 3);
        assert!(err.to_string().contains("line 2, column 4"));
    }
}
