//! Statement parsing.
//!
//! The first character decides: `/` opens a command statement, anything else
//! must start with an identifier. The identifier's lexeme and the characters
//! after it then steer the dispatch; `if(x)` and `while(x)` are genuinely
//! ambiguous between a control statement and a call to a function named
//! `if`/`while`, and are resolved by looking ahead for an indented block.

use craftc_walk::character::{is_newline, is_whitespace};
use craftc_walk::Walker;

use crate::cst::{
    AssignStatement, CommandComponent, CommandStatement, DoWhileStatement, FuncCall, IfStatement,
    ReturnStatement, Statement, SwapStatement, WhileStatement,
};
use crate::expr::{parse_args, parse_expr, parse_ref_or_expr};
use crate::{match_newlines, parse_block, parse_identifier, parse_indent, skip_whitespace,
    ParseError, ParseResult};

/// Parses a single statement at the cursor. `current_indent` is the indent
/// of the line the statement starts on; nested blocks must exceed it.
pub fn parse_statement<'a>(
    walker: &mut Walker<'a>,
    current_indent: usize,
) -> ParseResult<Statement<'a>> {
    // A '/' always opens a command statement.
    if walker.match_str("/").is_some() {
        return Ok(Statement::Command(parse_command(walker)?));
    }

    // Every other statement starts with an identifier, which might be a
    // keyword.
    let initial_pos = walker.pos();
    let identifier = parse_identifier(walker);
    if identifier.is_empty() {
        return Err(ParseError::at(walker, "invalid statement"));
    }

    let pos = walker.pos();
    let lexeme = identifier.lexeme();
    skip_whitespace(walker);
    let ahead2 = walker.ahead(2);
    let ahead1 = walker.ahead(1);

    // '=' after the identifier: an assignment.
    if ahead1 == "=" {
        let op_start = walker.pos();
        walker.advance(1);
        let operator = walker.token(op_start);
        skip_whitespace(walker);
        return Ok(Statement::Assign(AssignStatement {
            identifier,
            operator,
            expr: parse_expr(walker)?,
        }));
    }

    // A compound assignment operator: also an assignment.
    if matches!(ahead2, "*=" | "/=" | "%=" | "+=" | "-=" | "&=" | "^=" | "|=") {
        let op_start = walker.pos();
        walker.advance(2);
        let operator = walker.token(op_start);
        skip_whitespace(walker);
        return Ok(Statement::Assign(AssignStatement {
            identifier,
            operator,
            expr: parse_expr(walker)?,
        }));
    }

    // '><' after the identifier: a swap statement.
    if ahead2 == "><" {
        walker.advance(2);
        skip_whitespace(walker);
        let right = parse_identifier(walker);
        if right.is_empty() {
            return Err(ParseError::at(walker, "illegal second identifier for swap statement"));
        }
        return Ok(Statement::Swap(SwapStatement { left: identifier, right }));
    }

    // 'nop' with nothing else on the line is the nop statement.
    if lexeme == "nop" {
        match walker.peek_char() {
            None => return Ok(Statement::Nop),
            Some(c) if is_newline(c) => return Ok(Statement::Nop),
            _ => {}
        }
    }

    // '(' after the identifier: probably a function call. If the identifier
    // is 'if' or 'while' the construct is ambiguous:
    //
    //  * 0 arguments: definitely a function call;
    //  * 1 argument passed by value: maybe an if/while statement (*);
    //  * 1 argument passed by reference: definitely a function call;
    //  * 2 or more arguments: definitely a function call.
    //
    // In case (*), a following line indented deeper than the current
    // statement makes it an if/while statement with the argument as its
    // condition; otherwise it stays a call. The lookahead never commits: the
    // cursor is restored either way.
    if ahead1 == "(" {
        let args = parse_args(walker)?;
        let mut is_call_statement = true;

        if matches!(lexeme, "if" | "while") && args.len() == 1 && !args[0].by_ref {
            let pos2 = walker.pos();
            skip_whitespace(walker);
            match walker.peek_char() {
                None => {}
                Some(c) if !is_newline(c) => is_call_statement = false,
                Some(_) => {
                    walker.advance(1);
                    if parse_indent(walker) > current_indent {
                        is_call_statement = false;
                    }
                }
            }
            walker.set_pos(pos2);
        }

        if is_call_statement {
            return Ok(Statement::Call(FuncCall { identifier, args }));
        }
    }

    // From here on only keyword statements remain; rewind to just after the
    // identifier.
    walker.set_pos(pos);

    if lexeme == "return" {
        if skip_whitespace(walker).is_empty() && walker.ahead(1) != "(" {
            return Err(ParseError::at(walker, "expected return expression"));
        }
        return Ok(Statement::Return(ReturnStatement {
            expr: parse_expr(walker)?,
        }));
    }

    if lexeme == "if" {
        if skip_whitespace(walker).is_empty() && walker.ahead(1) != "(" {
            return Err(ParseError::at(walker, "expected if condition"));
        }

        let condition = parse_expr(walker)?;
        skip_whitespace(walker);
        if match_newlines(walker).is_empty() {
            return Err(ParseError::at(walker, "expected newline after if condition"));
        }

        let if_true = parse_block(walker, current_indent)?;

        // Look for a lone 'else' at the same indent on a following line;
        // anything else rewinds and leaves the if without an else branch.
        let mut if_false = Vec::new();
        let pos = walker.pos();
        skip_whitespace(walker);
        let mut have_else = false;
        if !match_newlines(walker).is_empty()
            && parse_indent(walker) == current_indent
            && walker.match_str("else").is_some()
        {
            skip_whitespace(walker);
            if !match_newlines(walker).is_empty() {
                if_false = parse_block(walker, current_indent)?;
                have_else = true;
            }
        }
        if !have_else {
            walker.set_pos(pos);
        }

        return Ok(Statement::If(IfStatement {
            condition,
            if_true,
            if_false,
        }));
    }

    if lexeme == "while" {
        if skip_whitespace(walker).is_empty() && walker.ahead(1) != "(" {
            return Err(ParseError::at(walker, "expected while condition"));
        }

        let condition = parse_expr(walker)?;
        skip_whitespace(walker);
        if match_newlines(walker).is_empty() {
            return Err(ParseError::at(walker, "expected newline after while condition"));
        }

        return Ok(Statement::While(WhileStatement {
            condition,
            statements: parse_block(walker, current_indent)?,
        }));
    }

    if lexeme == "do" {
        skip_whitespace(walker);
        if match_newlines(walker).is_empty() {
            return Err(ParseError::at(walker, "expected newline after 'do'"));
        }

        let statements = parse_block(walker, current_indent)?;
        let pos = walker.pos();

        if parse_indent(walker) == current_indent && parse_identifier(walker) == "while" {
            match walker.peek_char() {
                Some(c) if is_whitespace(c) || c == '(' => {}
                _ => {
                    return Err(ParseError::at(walker, "expected condition for do-while statement"))
                }
            }
            skip_whitespace(walker);
            return Ok(Statement::DoWhile(DoWhileStatement {
                statements,
                condition: parse_expr(walker)?,
            }));
        }

        walker.set_pos(pos);
        return Err(ParseError::at(walker, "expected condition for do-while statement"));
    }

    // Nothing matched; restore the cursor to where the statement began.
    walker.set_pos(initial_pos);
    Err(ParseError::at(walker, "illegal statement"))
}

/// Parses the remainder of a command statement after the leading '/'. The
/// line is captured verbatim, except that `$(expr)` and `$(ref name)` are
/// interpolation arguments holding a nested expression.
fn parse_command<'a>(walker: &mut Walker<'a>) -> ParseResult<CommandStatement<'a>> {
    let mut components = Vec::new();
    let mut start = walker.pos();

    loop {
        match walker.peek_char() {
            None => break,
            Some(c) if is_newline(c) => break,
            Some('$') if walker.ahead(2) == "$(" => {
                if walker.pos() > start {
                    components.push(CommandComponent::Verbatim(walker.token(start)));
                }
                walker.advance(2);
                skip_whitespace(walker);
                let arg = parse_ref_or_expr(walker)?;
                skip_whitespace(walker);
                if walker.match_str(")").is_none() {
                    return Err(ParseError::at(walker, "expected ')'"));
                }
                components.push(CommandComponent::Arg(arg));
                start = walker.pos();
            }
            Some(_) => {
                walker.advance(1);
            }
        }
    }

    if walker.pos() > start {
        components.push(CommandComponent::Verbatim(walker.token(start)));
    }

    Ok(CommandStatement { components })
}
