//! craftc-par - CST node definitions.
//!
//! The concrete syntax tree keeps every source token as a slice into the
//! original buffer, so error messages and stringification are exact. Each
//! node's `Display` implementation produces the canonical text form (CRLF
//! line endings, one tab per indent level), which re-parses to an equal
//! tree.

use std::fmt;

use craftc_util::VarType;
use craftc_walk::Token;

/// A whole source file: one namespace declaration followed by function
/// definitions with unique identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct File<'a> {
    pub namespace: NamespaceDecl<'a>,
    pub func_defs: Vec<FuncDef<'a>>,
}

/// `namespace a.b.c` - a non-empty list of dot-separated identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl<'a> {
    pub components: Vec<Token<'a>>,
}

/// A top-level function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef<'a> {
    pub identifier: Token<'a>,
    pub params: Vec<Param<'a>>,
    pub return_type: Token<'a>,
    pub statements: Vec<Statement<'a>>,
}

/// A `name: type` parameter pair. The type is kept as a token; it is
/// resolved against the type table during code generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Param<'a> {
    pub identifier: Token<'a>,
    pub ty: Token<'a>,
}

/// A single statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'a> {
    Nop,
    Command(CommandStatement<'a>),
    Assign(AssignStatement<'a>),
    Swap(SwapStatement<'a>),
    Return(ReturnStatement<'a>),
    If(IfStatement<'a>),
    While(WhileStatement<'a>),
    DoWhile(DoWhileStatement<'a>),
    Call(FuncCall<'a>),
}

/// `/...` - a raw Minecraft command. Text is kept verbatim except for
/// `$(expr)` / `$(ref name)` interpolation arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandStatement<'a> {
    pub components: Vec<CommandComponent<'a>>,
}

/// One piece of a command statement.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandComponent<'a> {
    Verbatim(Token<'a>),
    Arg(Arg<'a>),
}

/// `name = expr` or a compound assignment (`+=`, `&=`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStatement<'a> {
    pub identifier: Token<'a>,
    pub operator: Token<'a>,
    pub expr: Expr<'a>,
}

/// `left >< right` - swaps the values of two variables.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapStatement<'a> {
    pub left: Token<'a>,
    pub right: Token<'a>,
}

/// `return expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement<'a> {
    pub expr: Expr<'a>,
}

/// `if cond` with an indented then-block and an optional `else` block at the
/// same indent as the `if`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement<'a> {
    pub condition: Expr<'a>,
    pub if_true: Vec<Statement<'a>>,
    pub if_false: Vec<Statement<'a>>,
}

/// `while cond` with an indented body.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement<'a> {
    pub condition: Expr<'a>,
    pub statements: Vec<Statement<'a>>,
}

/// `do` with an indented body, closed by `while cond` at the same indent.
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatement<'a> {
    pub statements: Vec<Statement<'a>>,
    pub condition: Expr<'a>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Parens(Box<Expr<'a>>),
    Unary(UnaryExpr<'a>),
    Binary(BinaryExpr<'a>),
    Identifier(Token<'a>),
    Literal(LiteralExpr<'a>),
    Call(FuncCall<'a>),
}

/// A prefix operator applied to a unary-level expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr<'a> {
    pub operator: Token<'a>,
    pub expr: Box<Expr<'a>>,
}

/// A binary operator; all binary operators are left-associative.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr<'a> {
    pub left: Box<Expr<'a>>,
    pub operator: Token<'a>,
    pub right: Box<Expr<'a>>,
}

/// A score literal (`42`, `-1`) or an entity literal (`<@e[tag=x]>`). Entity
/// literal tokens hold the selector text between the angle brackets,
/// verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr<'a> {
    pub token: Token<'a>,
    pub ty: VarType,
}

/// A function call; usable both as a statement and as an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCall<'a> {
    pub identifier: Token<'a>,
    pub args: Vec<Arg<'a>>,
}

/// A call argument: an expression, optionally passed by reference (`ref x`,
/// in which case the expression is always a plain identifier).
#[derive(Debug, Clone, PartialEq)]
pub struct Arg<'a> {
    pub expr: Expr<'a>,
    pub by_ref: bool,
}

fn write_tabs(f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    for _ in 0..indent {
        f.write_str("\t")?;
    }
    Ok(())
}

fn write_block(f: &mut fmt::Formatter<'_>, statements: &[Statement<'_>], indent: usize) -> fmt::Result {
    for statement in statements {
        f.write_str("\r\n")?;
        statement.fmt_indented(f, indent)?;
    }
    Ok(())
}

impl fmt::Display for File<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespace)?;
        for func_def in &self.func_defs {
            write!(f, "\r\n\r\n{}", func_def)?;
        }
        Ok(())
    }
}

impl fmt::Display for NamespaceDecl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("namespace ")?;
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl fmt::Display for FuncDef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.identifier)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, "): {}", self.return_type)?;
        write_block(f, &self.statements, 1)
    }
}

impl fmt::Display for Param<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.ty)
    }
}

impl Statement<'_> {
    pub(crate) fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write_tabs(f, indent)?;
        match self {
            Statement::Nop => f.write_str("nop"),
            Statement::Command(command) => {
                f.write_str("/")?;
                for component in &command.components {
                    match component {
                        CommandComponent::Verbatim(token) => write!(f, "{}", token)?,
                        CommandComponent::Arg(arg) => write!(f, "$({})", arg)?,
                    }
                }
                Ok(())
            }
            Statement::Assign(assign) => {
                write!(f, "{} {} {}", assign.identifier, assign.operator, assign.expr)
            }
            Statement::Swap(swap) => write!(f, "{} >< {}", swap.left, swap.right),
            Statement::Return(ret) => write!(f, "return {}", ret.expr),
            Statement::If(if_statement) => {
                write!(f, "if {}", if_statement.condition)?;
                write_block(f, &if_statement.if_true, indent + 1)?;
                if !if_statement.if_false.is_empty() {
                    f.write_str("\r\n")?;
                    write_tabs(f, indent)?;
                    f.write_str("else")?;
                    write_block(f, &if_statement.if_false, indent + 1)?;
                }
                Ok(())
            }
            Statement::While(while_statement) => {
                write!(f, "while {}", while_statement.condition)?;
                write_block(f, &while_statement.statements, indent + 1)
            }
            Statement::DoWhile(do_while) => {
                f.write_str("do")?;
                write_block(f, &do_while.statements, indent + 1)?;
                f.write_str("\r\n")?;
                write_tabs(f, indent)?;
                write!(f, "while {}", do_while.condition)
            }
            Statement::Call(call) => write!(f, "{}", call),
        }
    }
}

impl fmt::Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl fmt::Display for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Parens(inner) => write!(f, "({})", inner),
            Expr::Unary(unary) => write!(f, "{} {}", unary.operator, unary.expr),
            Expr::Binary(binary) => {
                write!(f, "{} {} {}", binary.left, binary.operator, binary.right)
            }
            Expr::Identifier(token) => write!(f, "{}", token),
            Expr::Literal(literal) => {
                if literal.ty == VarType::Entity {
                    write!(f, "<{}>", literal.token)
                } else {
                    write!(f, "{}", literal.token)
                }
            }
            Expr::Call(call) => write!(f, "{}", call),
        }
    }
}

impl fmt::Display for FuncCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.identifier)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.by_ref {
            f.write_str("ref ")?;
        }
        write!(f, "{}", self.expr)
    }
}
