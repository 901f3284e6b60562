//! craftc-par - Recursive-descent parser for CraftLang.
//!
//! The parser reads characters straight off a [`Walker`]; there is no token
//! stream. Every parsing function follows the same conventions:
//!
//! - each function parses a single feature of the grammar, starting at the
//!   current cursor position and advancing only as far as the feature
//!   reaches;
//! - if a function looks ahead past the feature (disambiguation, `else`
//!   lookup), it restores the cursor before returning on the path that does
//!   not commit.
//!
//! Blocks are indentation-based: a block is introduced by a newline followed
//! by an indent strictly greater than the enclosing statement's indent, and
//! ends at the first line whose indent is less than or equal to it.
//! Indentation is measured in columns, with tabs rounding up to the next
//! multiple of 4.

pub mod cst;
mod edge_cases;
mod expr;
mod stmt;

use thiserror::Error;

use craftc_walk::character::{is_identifier_continue, is_identifier_start, is_newline, is_whitespace};
use craftc_walk::{Token, Walker};

use cst::{File, FuncDef, NamespaceDecl, Param};

pub use expr::parse_expr;
pub use stmt::parse_statement;

/// A syntax error, carrying the 0-based source position where parsing
/// stopped. Displayed 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {}, column {})", .line + 1, .column + 1)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn at(walker: &Walker<'_>, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            line: walker.line(),
            column: walker.column(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a whole source file: a namespace declaration followed by any
/// number of function definitions, all at indent zero.
pub fn parse_file<'a>(walker: &mut Walker<'a>) -> ParseResult<File<'a>> {
    if parse_indent(walker) > 0 {
        return Err(ParseError::at(walker, "unexpected indent"));
    }

    let namespace = parse_namespace_decl(walker)?;
    let mut func_defs: Vec<FuncDef<'a>> = Vec::new();

    loop {
        let indent = parse_indent(walker);

        if walker.at_end() {
            break;
        }

        if indent > 0 {
            return Err(ParseError::at(walker, "unexpected indent"));
        }

        let pos = walker.pos();
        let func_def = parse_func_def(walker)?;
        if func_defs.iter().any(|f| f.identifier == func_def.identifier) {
            walker.set_pos(pos);
            return Err(ParseError::at(
                walker,
                format!("function '{}' already defined", func_def.identifier),
            ));
        }

        func_defs.push(func_def);
    }

    Ok(File { namespace, func_defs })
}

fn parse_namespace_decl<'a>(walker: &mut Walker<'a>) -> ParseResult<NamespaceDecl<'a>> {
    if walker.match_str("namespace").is_none() {
        return Err(ParseError::at(walker, "expected namespace declaration"));
    }

    if skip_whitespace(walker).is_empty() {
        return Err(ParseError::at(walker, "expected whitespace"));
    }

    let mut components = Vec::new();

    loop {
        let component = parse_identifier(walker);
        if component.is_empty() {
            return Err(ParseError::at(walker, "illegal namespace identifier"));
        }
        components.push(component);

        let pos = walker.pos();
        skip_whitespace(walker);
        if walker.advance(1) == "." {
            skip_whitespace(walker);
        } else {
            walker.set_pos(pos);
            break;
        }
    }

    Ok(NamespaceDecl { components })
}

fn parse_func_def<'a>(walker: &mut Walker<'a>) -> ParseResult<FuncDef<'a>> {
    let identifier = parse_identifier(walker);
    if identifier.is_empty() {
        return Err(ParseError::at(walker, "illegal function identifier"));
    }

    skip_whitespace(walker);
    if walker.match_str("(").is_none() {
        return Err(ParseError::at(walker, "expected '('"));
    }

    skip_whitespace(walker);
    let mut params = Vec::new();

    while walker.match_str(")").is_none() {
        let param_identifier = parse_identifier(walker);
        if param_identifier.is_empty() {
            return Err(ParseError::at(walker, "illegal function parameter identifier"));
        }

        skip_whitespace(walker);
        if walker.match_str(":").is_none() {
            return Err(ParseError::at(walker, "expected ':'"));
        }

        skip_whitespace(walker);
        let ty = parse_identifier(walker);
        if ty.is_empty() {
            return Err(ParseError::at(walker, "illegal function parameter type"));
        }

        params.push(Param {
            identifier: param_identifier,
            ty,
        });

        if walker.ahead(1) == "," {
            walker.advance(1);
            skip_whitespace(walker);
            if walker.ahead(1) == ")" {
                return Err(ParseError::at(walker, "unexpected ')'"));
            }
        }
    }

    skip_whitespace(walker);
    if walker.advance(1) != ":" {
        walker.retreat(1);
        return Err(ParseError::at(walker, "expected ':'"));
    }

    skip_whitespace(walker);
    let return_type = parse_identifier(walker);
    if return_type.is_empty() {
        return Err(ParseError::at(walker, "illegal function return type"));
    }

    skip_whitespace(walker);
    match walker.peek_char() {
        Some(c) if is_newline(c) => {}
        _ => return Err(ParseError::at(walker, "expected newline")),
    }

    let statements = parse_block(walker, 0)?;

    Ok(FuncDef {
        identifier,
        params,
        return_type,
        statements,
    })
}

/// Parses a block of statements indented strictly deeper than
/// `current_indent`. The block ends at the first line indented at or below
/// `current_indent`; that line is left unconsumed.
pub fn parse_block<'a>(
    walker: &mut Walker<'a>,
    current_indent: usize,
) -> ParseResult<Vec<cst::Statement<'a>>> {
    let new_indent = parse_indent(walker);
    if new_indent <= current_indent {
        return Err(ParseError::at(walker, "expected indent"));
    }

    let mut block = vec![parse_statement(walker, new_indent)?];

    loop {
        let pos = walker.pos();
        skip_whitespace(walker);

        if walker.at_end() {
            walker.set_pos(pos);
            break;
        }

        if match_newlines(walker).is_empty() {
            return Err(ParseError::at(walker, "expected newline"));
        }

        let continue_indent = parse_indent(walker);

        if continue_indent == new_indent {
            block.push(parse_statement(walker, new_indent)?);
        } else if continue_indent <= current_indent {
            walker.set_pos(pos);
            break;
        } else {
            return Err(ParseError::at(walker, "invalid indentation level"));
        }
    }

    Ok(block)
}

/// Consumes blank lines and leading whitespace, returning the indent of the
/// first non-blank line in columns. Tabs round up to the next multiple of 4.
pub(crate) fn parse_indent(walker: &mut Walker<'_>) -> usize {
    loop {
        match_newlines(walker);

        let mut indent = 0;
        while let Some(c) = walker.peek_char() {
            if !is_whitespace(c) {
                break;
            }
            walker.advance(1);
            if c == '\t' {
                indent = (indent + 4) / 4 * 4;
            } else {
                indent += 1;
            }
        }

        match walker.peek_char() {
            Some(c) if is_newline(c) => continue,
            _ => return indent,
        }
    }
}

/// Parses a (possibly empty) identifier token at the cursor.
pub(crate) fn parse_identifier<'a>(walker: &mut Walker<'a>) -> Token<'a> {
    let start = walker.pos();
    walker.match_offset(|offset, c| {
        Some(if offset == 0 {
            is_identifier_start(c)
        } else {
            is_identifier_continue(c)
        })
    });
    walker.token(start)
}

/// Consumes a run of horizontal whitespace, returning it (possibly empty).
pub(crate) fn skip_whitespace<'a>(walker: &mut Walker<'a>) -> &'a str {
    walker.match_pred(|c| Some(is_whitespace(c))).unwrap_or("")
}

/// Consumes a run of newline characters, returning it (possibly empty).
pub(crate) fn match_newlines<'a>(walker: &mut Walker<'a>) -> &'a str {
    walker.match_pred(|c| Some(is_newline(c))).unwrap_or("")
}
