//! Expression parsing.
//!
//! One function per precedence level, lowest binding first:
//! `|` < `^` < `&` < `== !=` < `< > <= >=` < `+ -` < `* / %` < unary
//! `! + -` < primary. All binary operators are left-associative.

use craftc_util::VarType;
use craftc_walk::character::{is_digit, is_newline};
use craftc_walk::Walker;

use crate::cst::{Arg, BinaryExpr, Expr, FuncCall, LiteralExpr, UnaryExpr};
use crate::{parse_identifier, skip_whitespace, ParseError, ParseResult};

/// Parses an expression at the cursor.
pub fn parse_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    parse_or_expr(walker)
}

fn parse_or_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    let mut expr = parse_xor_expr(walker)?;

    loop {
        let pos = walker.pos();
        skip_whitespace(walker);

        if walker.ahead(1) != "|" {
            walker.set_pos(pos);
            break;
        }

        let op_start = walker.pos();
        walker.advance(1);
        let operator = walker.token(op_start);

        skip_whitespace(walker);
        let right = parse_xor_expr(walker)?;
        expr = Expr::Binary(BinaryExpr {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        });
    }

    Ok(expr)
}

fn parse_xor_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    let mut expr = parse_and_expr(walker)?;

    loop {
        let pos = walker.pos();
        skip_whitespace(walker);

        if walker.ahead(1) != "^" {
            walker.set_pos(pos);
            break;
        }

        let op_start = walker.pos();
        walker.advance(1);
        let operator = walker.token(op_start);

        skip_whitespace(walker);
        let right = parse_and_expr(walker)?;
        expr = Expr::Binary(BinaryExpr {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        });
    }

    Ok(expr)
}

fn parse_and_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    let mut expr = parse_equality_expr(walker)?;

    loop {
        let pos = walker.pos();
        skip_whitespace(walker);

        if walker.ahead(1) != "&" {
            walker.set_pos(pos);
            break;
        }

        let op_start = walker.pos();
        walker.advance(1);
        let operator = walker.token(op_start);

        skip_whitespace(walker);
        let right = parse_equality_expr(walker)?;
        expr = Expr::Binary(BinaryExpr {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        });
    }

    Ok(expr)
}

fn parse_equality_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    let mut expr = parse_relational_expr(walker)?;

    loop {
        let pos = walker.pos();
        skip_whitespace(walker);

        if !matches!(walker.ahead(2), "==" | "!=") {
            walker.set_pos(pos);
            break;
        }

        let op_start = walker.pos();
        walker.advance(2);
        let operator = walker.token(op_start);

        skip_whitespace(walker);
        let right = parse_relational_expr(walker)?;
        expr = Expr::Binary(BinaryExpr {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        });
    }

    Ok(expr)
}

fn parse_relational_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    let mut expr = parse_additive_expr(walker)?;

    loop {
        let pos = walker.pos();
        skip_whitespace(walker);

        if !matches!(walker.ahead(1), "<" | ">") {
            walker.set_pos(pos);
            break;
        }

        let op_start = walker.pos();
        walker.advance(1);
        if walker.ahead(1) == "=" {
            walker.advance(1);
        }
        let operator = walker.token(op_start);

        skip_whitespace(walker);
        let right = parse_additive_expr(walker)?;
        expr = Expr::Binary(BinaryExpr {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        });
    }

    Ok(expr)
}

fn parse_additive_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    let mut expr = parse_multiplicative_expr(walker)?;

    loop {
        let pos = walker.pos();
        skip_whitespace(walker);

        if !matches!(walker.ahead(1), "+" | "-") {
            walker.set_pos(pos);
            break;
        }

        let op_start = walker.pos();
        walker.advance(1);
        let operator = walker.token(op_start);

        skip_whitespace(walker);
        let right = parse_multiplicative_expr(walker)?;
        expr = Expr::Binary(BinaryExpr {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        });
    }

    Ok(expr)
}

fn parse_multiplicative_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    let mut expr = parse_unary_expr(walker)?;

    loop {
        let pos = walker.pos();
        skip_whitespace(walker);

        if !matches!(walker.ahead(1), "*" | "/" | "%") {
            walker.set_pos(pos);
            break;
        }

        let op_start = walker.pos();
        walker.advance(1);
        let operator = walker.token(op_start);

        skip_whitespace(walker);
        let right = parse_unary_expr(walker)?;
        expr = Expr::Binary(BinaryExpr {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        });
    }

    Ok(expr)
}

fn parse_unary_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    // A '+' or '-' directly followed by a digit is the sign of a score
    // literal, not a unary operator; anything else after it is an operand.
    let ahead2 = walker.ahead(2);
    let mut chars = ahead2.chars();
    let first = chars.next();
    let second = chars.next();

    let is_unary = match first {
        Some('!') => true,
        Some('+') | Some('-') => !matches!(second, Some(c) if is_digit(c)),
        _ => false,
    };

    if is_unary {
        let op_start = walker.pos();
        walker.advance(1);
        let operator = walker.token(op_start);
        skip_whitespace(walker);
        let expr = parse_unary_expr(walker)?;
        return Ok(Expr::Unary(UnaryExpr {
            operator,
            expr: Box::new(expr),
        }));
    }

    parse_primary_expr(walker)
}

fn parse_primary_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    let ahead2 = walker.ahead(2);
    let mut chars = ahead2.chars();
    let first = chars.next();
    let second = chars.next();

    match first {
        Some('(') => {
            walker.advance(1);
            skip_whitespace(walker);
            let inner = parse_expr(walker)?;
            skip_whitespace(walker);
            if walker.advance(1) != ")" {
                walker.retreat(1);
                return Err(ParseError::at(walker, "unbalanced parenthesis"));
            }
            Ok(Expr::Parens(Box::new(inner)))
        }

        Some(c) if is_digit(c) => parse_score_literal(walker),

        Some('+') | Some('-') if matches!(second, Some(d) if is_digit(d)) => {
            parse_score_literal(walker)
        }

        Some('<') => {
            // Entity literal: everything up to the closing '>' is kept
            // verbatim; newlines are not allowed inside.
            walker.advance(1);
            let start = walker.pos();
            loop {
                match walker.peek_char() {
                    Some('>') => {
                        let token = walker.token(start);
                        walker.advance(1);
                        return Ok(Expr::Literal(LiteralExpr {
                            token,
                            ty: VarType::Entity,
                        }));
                    }
                    Some(c) if is_newline(c) => {
                        return Err(ParseError::at(walker, "illegal newline"));
                    }
                    None => return Err(ParseError::at(walker, "unexpected EOF")),
                    Some(_) => {
                        walker.advance(1);
                    }
                }
            }
        }

        _ => {
            let identifier = parse_identifier(walker);
            if identifier.is_empty() {
                return Err(ParseError::at(walker, "invalid expression"));
            }

            let pos = walker.pos();
            skip_whitespace(walker);

            if walker.ahead(1) == "(" {
                let args = parse_args(walker)?;
                Ok(Expr::Call(FuncCall { identifier, args }))
            } else {
                walker.set_pos(pos);
                Ok(Expr::Identifier(identifier))
            }
        }
    }
}

fn parse_score_literal<'a>(walker: &mut Walker<'a>) -> ParseResult<Expr<'a>> {
    let start = walker.pos();
    walker.match_offset(|offset, c| {
        Some(if offset == 0 {
            is_digit(c) || c == '+' || c == '-'
        } else {
            is_digit(c)
        })
    });
    let token = walker.token(start);
    let lexeme = token.lexeme();

    let digits = lexeme
        .strip_prefix('+')
        .or_else(|| lexeme.strip_prefix('-'))
        .unwrap_or(lexeme);
    if digits.is_empty() {
        walker.set_pos(start);
        return Err(ParseError::at(walker, "invalid integer value"));
    }

    match lexeme.parse::<i64>() {
        Ok(value) if i32::try_from(value).is_ok() => Ok(Expr::Literal(LiteralExpr {
            token,
            ty: VarType::Score,
        })),
        _ => {
            walker.set_pos(start);
            Err(ParseError::at(walker, "integer out of range"))
        }
    }
}

/// Parses a parenthesized, comma-separated argument list. Each argument is
/// either `ref identifier` (by-reference) or an expression (by-value).
/// Trailing commas and `, )` are errors.
pub(crate) fn parse_args<'a>(walker: &mut Walker<'a>) -> ParseResult<Vec<Arg<'a>>> {
    if walker.match_str("(").is_none() {
        return Err(ParseError::at(walker, "expected '('"));
    }

    let mut args = Vec::new();

    loop {
        skip_whitespace(walker);

        if walker.match_str(")").is_some() {
            break;
        }

        if !args.is_empty() {
            if walker.match_str(",").is_none() {
                return Err(ParseError::at(walker, "expected ',' or ')'"));
            }
            skip_whitespace(walker);
            if walker.ahead(1) == ")" {
                return Err(ParseError::at(walker, "unexpected ')'"));
            }
        }

        args.push(parse_ref_or_expr(walker)?);
    }

    Ok(args)
}

pub(crate) fn parse_ref_or_expr<'a>(walker: &mut Walker<'a>) -> ParseResult<Arg<'a>> {
    let pos = walker.pos();

    // 'ref' only counts as the by-reference marker when followed by
    // whitespace; otherwise it is the start of an ordinary identifier.
    if walker.match_str("ref").is_some() && !skip_whitespace(walker).is_empty() {
        let start = walker.pos();
        if parse_identifier(walker).is_empty() {
            return Err(ParseError::at(walker, "illegal identifier"));
        }
        return Ok(Arg {
            expr: Expr::Identifier(walker.token(start)),
            by_ref: true,
        });
    }

    walker.set_pos(pos);
    Ok(Arg {
        expr: parse_expr(walker)?,
        by_ref: false,
    })
}
