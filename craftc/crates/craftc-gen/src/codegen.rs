//! Lowering from the CST to Minecraft command text.
//!
//! Expressions evaluate onto a typed stack of scoreboard players / entity
//! tags named `stack.0, stack.1, ...`; the `stack` vector tracks the type at
//! each live depth and is empty at the start and end of every statement.
//! Sub-expressions always evaluate left then right, then the operator's
//! commands pop two slots and push the result.
//!
//! Minecraft function files have no in-file control flow, so every `if`
//! branch and loop body spills into an auxiliary function file invoked by an
//! `execute if score ... run function ...` line. Auxiliary ids count up per
//! function definition, which keeps them collision-free.

use std::io::Write;

use indexmap::IndexMap;

use craftc_par::cst::{Arg, CommandComponent, Expr, File, FuncCall, FuncDef, Statement};
use craftc_sem::{Binding, ScopeTree};
use craftc_util::{asciify, VarType};
use craftc_walk::Token;

use crate::error::CompileError;
use crate::names::{PackNames, OBJECTIVE};
use crate::writer::PackWriter;

/// Compiles a parsed file into a complete datapack under `writer`.
pub fn compile_file<'a>(file: &'a File<'a>, writer: &mut dyn PackWriter) -> Result<(), CompileError> {
    let names = PackNames::new(&file.namespace);
    crate::datapack::emit(&names, writer)?;

    // The parser rejects duplicate definitions, so plain inserts suffice;
    // insertion order is the file order.
    let mut functions: IndexMap<&'a str, &'a FuncDef<'a>> = IndexMap::new();
    for func_def in &file.func_defs {
        functions.insert(func_def.identifier.lexeme(), func_def);
    }

    for func_def in &file.func_defs {
        compile_func_def(&functions, &names, func_def, writer)?;
    }

    Ok(())
}

struct FuncCx<'a, 'w> {
    functions: &'a IndexMap<&'a str, &'a FuncDef<'a>>,
    names: &'a PackNames,
    writer: &'w mut dyn PackWriter,
    /// ASCII-folded name of the function being compiled.
    func_name: String,
    aux_counter: u32,
    iid_counter: u32,
    scope: ScopeTree,
    ret_slot: String,
    ret_type: VarType,
}

impl FuncCx<'_, '_> {
    /// Allocates the next auxiliary function: its callable id and an open
    /// handle on its file.
    fn alloc_aux(&mut self) -> Result<(String, Box<dyn Write>), CompileError> {
        let k = self.aux_counter;
        self.aux_counter += 1;
        let id = self.names.aux_id(&self.func_name, k);
        let out = self
            .writer
            .create(&self.names.mcfunction_path(&format!("{}.{}", self.func_name, k)))?;
        Ok((id, out))
    }

    /// Assignment binding: re-types an existing binding (keeping its
    /// internal id) or allocates a fresh local slot. Fresh ids are only
    /// drawn when actually needed, so the `locals.*` numbering is dense.
    fn bind(&mut self, name: &str, ty: VarType) -> Binding {
        let FuncCx {
            scope,
            iid_counter,
            names,
            func_name,
            ..
        } = self;
        scope
            .bind(
                name,
                ty,
                || {
                    let k = *iid_counter;
                    *iid_counter += 1;
                    names.locals_iid(func_name, k)
                },
                true,
            )
            .clone()
    }

    fn get(&self, name: &str) -> Result<&Binding, CompileError> {
        self.scope
            .get(name, true)
            .ok_or_else(|| CompileError::Undefined(name.to_string()))
    }
}

fn resolve_type(token: &Token<'_>) -> Result<VarType, CompileError> {
    VarType::from_keyword(token.lexeme())
        .ok_or_else(|| CompileError::UnknownType(token.lexeme().to_string()))
}

fn ref_arg_name<'a>(arg: &Arg<'a>) -> Result<&'a str, CompileError> {
    match &arg.expr {
        Expr::Identifier(token) => Ok(token.lexeme()),
        _ => Err(CompileError::ByRefNotIdentifier),
    }
}

fn compile_func_def<'a>(
    functions: &'a IndexMap<&'a str, &'a FuncDef<'a>>,
    names: &'a PackNames,
    func_def: &'a FuncDef<'a>,
    writer: &mut dyn PackWriter,
) -> Result<(), CompileError> {
    let func_name = asciify(func_def.identifier.lexeme());

    let mut scope = ScopeTree::new();
    for (i, param) in func_def.params.iter().enumerate() {
        let ty = resolve_type(&param.ty)?;
        scope.insert(
            param.identifier.lexeme(),
            Binding::new(names.args_iid(&func_name, i), ty),
            true,
        );
    }

    let ret_type = resolve_type(&func_def.return_type)?;
    let mut out = writer.create(&names.mcfunction_path(&func_name))?;

    let mut cx = FuncCx {
        functions,
        names,
        writer,
        ret_slot: names.rets_iid(&func_name),
        func_name,
        aux_counter: 0,
        iid_counter: 0,
        scope,
        ret_type,
    };

    let params = func_def
        .params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    write!(
        out,
        "# {}({}): {}\r\n",
        func_def.identifier, params, func_def.return_type
    )?;

    for statement in &func_def.statements {
        out.write_all(b"\r\n")?;
        compile_statement(&mut cx, statement, &mut *out)?;
    }

    out.flush()?;
    Ok(())
}

fn compile_statement(
    cx: &mut FuncCx<'_, '_>,
    statement: &Statement<'_>,
    out: &mut dyn Write,
) -> Result<(), CompileError> {
    let mut stack: Vec<VarType> = Vec::new();

    match statement {
        Statement::Nop => {
            write!(out, "# {}\r\n", statement)?;
        }

        Statement::Command(command) => {
            write!(out, "# {}\r\n", statement)?;

            // By-value arguments evaluate right to left, so that popping
            // them again while writing the command line left to right hits
            // the slots in order. By-reference arguments never touch the
            // stack; they resolve to the variable's own id.
            for component in command.components.iter().rev() {
                if let CommandComponent::Arg(arg) = component {
                    if !arg.by_ref {
                        compile_expr(cx, &arg.expr, out, &mut stack)?;
                    }
                }
            }

            for component in &command.components {
                match component {
                    CommandComponent::Verbatim(token) => {
                        write!(out, "{}", token)?;
                    }
                    CommandComponent::Arg(arg) => {
                        if arg.by_ref {
                            let binding = cx.get(ref_arg_name(arg)?)?;
                            write!(out, "{}", binding.iid)?;
                        } else {
                            stack.pop();
                            write!(out, "stack.{}", stack.len())?;
                        }
                    }
                }
            }
            out.write_all(b"\r\n")?;
        }

        Statement::Swap(swap) => {
            write!(out, "# {}\r\n", statement)?;

            let left = cx.get(swap.left.lexeme())?.clone();
            let right = cx.get(swap.right.lexeme())?.clone();
            let d = stack.len();

            match (left.ty, right.ty) {
                (VarType::Boolean, VarType::Boolean) | (VarType::Score, VarType::Score) => {
                    write!(
                        out,
                        "scoreboard players operation {} {obj} >< {} {obj}\r\n",
                        left.iid,
                        right.iid,
                        obj = OBJECTIVE
                    )?;
                }
                (VarType::Entity, VarType::Entity) => {
                    // Three-cycle through a scratch tag.
                    write!(
                        out,
                        "tag @e remove stack.{d}\r\n\
                         tag @e[tag={l}] add stack.{d}\r\n\
                         tag @e remove {l}\r\n\
                         tag @e[tag={r}] add {l}\r\n\
                         tag @e remove {r}\r\n\
                         tag @e[tag=stack.{d}] add {r}\r\n",
                        d = d,
                        l = left.iid,
                        r = right.iid
                    )?;
                }
                (l, r) => {
                    return Err(CompileError::BinaryTypeMismatch {
                        operator: "><".to_string(),
                        left: l,
                        right: r,
                    })
                }
            }
        }

        Statement::Assign(assign) => {
            write!(out, "# {}\r\n", statement)?;

            let ty = compile_expr(cx, &assign.expr, out, &mut stack)?;
            stack.pop();
            let d = stack.len();
            let name = assign.identifier.lexeme();
            let operator = assign.operator.lexeme();

            match operator {
                "=" => match ty {
                    VarType::Boolean | VarType::Score => {
                        let binding = cx.bind(name, ty);
                        write!(
                            out,
                            "scoreboard players operation {} {obj} = stack.{d} {obj}\r\n",
                            binding.iid,
                            d = d,
                            obj = OBJECTIVE
                        )?;
                    }
                    VarType::Entity => {
                        let binding = cx.bind(name, VarType::Entity);
                        write!(
                            out,
                            "tag @e remove {iid}\r\n\
                             tag @e[tag=stack.{d}] add {iid}\r\n",
                            iid = binding.iid,
                            d = d
                        )?;
                    }
                    VarType::Void => return Err(CompileError::VoidValue),
                },

                "*=" | "/=" | "%=" => {
                    let binding = cx.get(name)?;
                    if binding.ty == VarType::Score && ty == VarType::Score {
                        write!(
                            out,
                            "scoreboard players operation {} {obj} {op} stack.{d} {obj}\r\n",
                            binding.iid,
                            op = operator,
                            d = d,
                            obj = OBJECTIVE
                        )?;
                    } else {
                        return Err(compound_mismatch(operator, binding.ty, ty));
                    }
                }

                "+=" => {
                    let binding = cx.get(name)?;
                    if binding.ty == VarType::Score && ty == VarType::Score {
                        write!(
                            out,
                            "scoreboard players operation {} {obj} += stack.{d} {obj}\r\n",
                            binding.iid,
                            d = d,
                            obj = OBJECTIVE
                        )?;
                    } else {
                        return Err(compound_mismatch(operator, binding.ty, ty));
                    }
                }

                "-=" => {
                    let binding = cx.get(name)?;
                    if binding.ty == VarType::Score && ty == VarType::Score {
                        write!(
                            out,
                            "scoreboard players operation {} {obj} -= stack.{d} {obj}\r\n",
                            binding.iid,
                            d = d,
                            obj = OBJECTIVE
                        )?;
                    } else if binding.ty == VarType::Entity && ty == VarType::Entity {
                        write!(out, "tag @e[tag=stack.{}] remove {}\r\n", d, binding.iid)?;
                    } else {
                        return Err(compound_mismatch(operator, binding.ty, ty));
                    }
                }

                "&=" => {
                    let binding = cx.get(name)?;
                    if binding.ty == VarType::Boolean && ty == VarType::Boolean {
                        write!(
                            out,
                            "scoreboard players operation {iid} {obj} += stack.{d} {obj}\r\n\
                             execute if score {iid} {obj} matches 1 run scoreboard players set {iid} {obj} 0\r\n",
                            iid = binding.iid,
                            d = d,
                            obj = OBJECTIVE
                        )?;
                    } else if binding.ty == VarType::Entity && ty == VarType::Entity {
                        write!(
                            out,
                            "tag @e[tag={iid},tag=!stack.{d}] remove {iid}\r\n",
                            iid = binding.iid,
                            d = d
                        )?;
                    } else {
                        return Err(compound_mismatch(operator, binding.ty, ty));
                    }
                }

                "^=" => {
                    let binding = cx.get(name)?;
                    if binding.ty == VarType::Boolean && ty == VarType::Boolean {
                        write!(
                            out,
                            "scoreboard players operation {iid} {obj} += stack.{d} {obj}\r\n\
                             execute if score {iid} {obj} matches 2 run scoreboard players set {iid} {obj} 0\r\n",
                            iid = binding.iid,
                            d = d,
                            obj = OBJECTIVE
                        )?;
                    } else if binding.ty == VarType::Entity && ty == VarType::Entity {
                        // Symmetric difference: intersect into a scratch
                        // tag, add the operand, remove the intersection.
                        write!(
                            out,
                            "tag @e remove stack.{d1}\r\n\
                             tag @e[tag={iid},tag=stack.{d}] add stack.{d1}\r\n\
                             tag @e[tag=stack.{d}] add {iid}\r\n\
                             tag @e[tag=stack.{d1}] remove {iid}\r\n",
                            iid = binding.iid,
                            d = d,
                            d1 = d + 1
                        )?;
                    } else {
                        return Err(compound_mismatch(operator, binding.ty, ty));
                    }
                }

                "|=" => {
                    let binding = cx.get(name)?;
                    if binding.ty == VarType::Boolean && ty == VarType::Boolean {
                        write!(
                            out,
                            "scoreboard players operation {iid} {obj} += stack.{d} {obj}\r\n\
                             execute if score {iid} {obj} matches 2 run scoreboard players set {iid} {obj} 1\r\n",
                            iid = binding.iid,
                            d = d,
                            obj = OBJECTIVE
                        )?;
                    } else if binding.ty == VarType::Entity && ty == VarType::Entity {
                        write!(out, "tag @e[tag=stack.{}] add {}\r\n", d, binding.iid)?;
                    } else {
                        return Err(compound_mismatch(operator, binding.ty, ty));
                    }
                }

                other => {
                    return Err(CompileError::BinaryTypeMismatch {
                        operator: other.to_string(),
                        left: cx.get(name)?.ty,
                        right: ty,
                    })
                }
            }
        }

        Statement::Return(ret) => {
            write!(out, "# {}\r\n", statement)?;

            let ty = compile_expr(cx, &ret.expr, out, &mut stack)?;
            stack.pop();
            let d = stack.len();

            if ty != cx.ret_type {
                return Err(CompileError::ReturnTypeMismatch {
                    expected: cx.ret_type,
                    found: ty,
                });
            }

            match ty {
                VarType::Boolean | VarType::Score => {
                    write!(
                        out,
                        "scoreboard players operation {} {obj} = stack.{d} {obj}\r\n",
                        cx.ret_slot,
                        d = d,
                        obj = OBJECTIVE
                    )?;
                }
                VarType::Entity => {
                    write!(
                        out,
                        "tag @e remove {ret}\r\n\
                         tag @e[tag=stack.{d}] add {ret}\r\n",
                        ret = cx.ret_slot,
                        d = d
                    )?;
                }
                VarType::Void => return Err(CompileError::VoidValue),
            }
        }

        Statement::If(if_statement) => {
            write!(out, "# if {}\r\n", if_statement.condition)?;

            let ty = compile_expr(cx, &if_statement.condition, out, &mut stack)?;
            stack.pop();
            let d = stack.len();
            if ty != VarType::Boolean {
                return Err(CompileError::ConditionNotBoolean(ty));
            }

            if !if_statement.if_true.is_empty() {
                let (aux_id, mut aux_out) = cx.alloc_aux()?;
                write!(
                    out,
                    "execute if score stack.{} {} matches 1 run function {}\r\n",
                    d, OBJECTIVE, aux_id
                )?;
                for s in &if_statement.if_true {
                    compile_statement(cx, s, &mut *aux_out)?;
                }
                aux_out.flush()?;
            }

            if !if_statement.if_false.is_empty() {
                let (aux_id, mut aux_out) = cx.alloc_aux()?;
                write!(
                    out,
                    "execute if score stack.{} {} matches 0 run function {}\r\n",
                    d, OBJECTIVE, aux_id
                )?;
                for s in &if_statement.if_false {
                    compile_statement(cx, s, &mut *aux_out)?;
                }
                aux_out.flush()?;
            }
        }

        Statement::While(while_statement) => {
            write!(out, "# while {}\r\n", while_statement.condition)?;

            let ty = compile_expr(cx, &while_statement.condition, out, &mut stack)?;
            stack.pop();
            if ty != VarType::Boolean {
                return Err(CompileError::ConditionNotBoolean(ty));
            }

            if !while_statement.statements.is_empty() {
                let (aux_id, mut aux_out) = cx.alloc_aux()?;
                write!(
                    out,
                    "execute if score stack.{} {} matches 1 run function {}\r\n",
                    stack.len(),
                    OBJECTIVE,
                    aux_id
                )?;

                // The auxiliary runs the body, re-evaluates the condition
                // and re-invokes itself while it holds.
                for s in &while_statement.statements {
                    compile_statement(cx, s, &mut *aux_out)?;
                }
                let ty = compile_expr(cx, &while_statement.condition, &mut *aux_out, &mut stack)?;
                stack.pop();
                if ty != VarType::Boolean {
                    return Err(CompileError::ConditionNotBoolean(ty));
                }
                write!(
                    aux_out,
                    "execute if score stack.{} {} matches 1 run function {}\r\n",
                    stack.len(),
                    OBJECTIVE,
                    aux_id
                )?;
                aux_out.flush()?;
            }
        }

        Statement::DoWhile(do_while) => {
            write!(out, "# do\r\n")?;

            if !do_while.statements.is_empty() {
                let (aux_id, mut aux_out) = cx.alloc_aux()?;
                write!(out, "function {}\r\n", aux_id)?;

                for s in &do_while.statements {
                    compile_statement(cx, s, &mut *aux_out)?;
                }
                let ty = compile_expr(cx, &do_while.condition, &mut *aux_out, &mut stack)?;
                stack.pop();
                if ty != VarType::Boolean {
                    return Err(CompileError::ConditionNotBoolean(ty));
                }
                write!(
                    aux_out,
                    "execute if score stack.{} {} matches 1 run function {}\r\n",
                    stack.len(),
                    OBJECTIVE,
                    aux_id
                )?;
                aux_out.flush()?;
            }
        }

        Statement::Call(call) => {
            write!(out, "# {}\r\n", statement)?;
            compile_func_call(cx, call, out, &mut stack)?;
        }
    }

    Ok(())
}

fn compound_mismatch(operator: &str, left: VarType, right: VarType) -> CompileError {
    CompileError::BinaryTypeMismatch {
        operator: operator.to_string(),
        left,
        right,
    }
}

fn compile_expr(
    cx: &FuncCx<'_, '_>,
    expr: &Expr<'_>,
    out: &mut dyn Write,
    stack: &mut Vec<VarType>,
) -> Result<VarType, CompileError> {
    match expr {
        Expr::Parens(inner) => compile_expr(cx, inner, out, stack),

        Expr::Literal(literal) => {
            let d = stack.len();
            match literal.ty {
                VarType::Boolean => {
                    match literal.token.lexeme() {
                        "false" => write!(out, "scoreboard players set stack.{} {} 0\r\n", d, OBJECTIVE)?,
                        "true" => write!(out, "scoreboard players set stack.{} {} 1\r\n", d, OBJECTIVE)?,
                        other => return Err(CompileError::Undefined(other.to_string())),
                    }
                    stack.push(VarType::Boolean);
                    Ok(VarType::Boolean)
                }
                VarType::Score => {
                    write!(
                        out,
                        "scoreboard players set stack.{} {} {}\r\n",
                        d, OBJECTIVE, literal.token
                    )?;
                    stack.push(VarType::Score);
                    Ok(VarType::Score)
                }
                VarType::Entity => {
                    write!(out, "tag @e remove stack.{}\r\n", d)?;
                    if !literal.token.is_empty() {
                        write!(out, "tag {} add stack.{}\r\n", literal.token, d)?;
                    }
                    stack.push(VarType::Entity);
                    Ok(VarType::Entity)
                }
                VarType::Void => Err(CompileError::VoidValue),
            }
        }

        Expr::Identifier(token) => {
            let name = token.lexeme();
            let d = stack.len();
            match cx.scope.get(name, true) {
                // 'true' and 'false' are ordinary identifiers unless the
                // user has bound them to something else.
                None => match name {
                    "false" => {
                        write!(out, "scoreboard players set stack.{} {} 0\r\n", d, OBJECTIVE)?;
                        stack.push(VarType::Boolean);
                        Ok(VarType::Boolean)
                    }
                    "true" => {
                        write!(out, "scoreboard players set stack.{} {} 1\r\n", d, OBJECTIVE)?;
                        stack.push(VarType::Boolean);
                        Ok(VarType::Boolean)
                    }
                    _ => Err(CompileError::Undefined(name.to_string())),
                },
                Some(binding) => match binding.ty {
                    VarType::Boolean | VarType::Score => {
                        write!(
                            out,
                            "scoreboard players operation stack.{} {obj} = {} {obj}\r\n",
                            d,
                            binding.iid,
                            obj = OBJECTIVE
                        )?;
                        stack.push(binding.ty);
                        Ok(binding.ty)
                    }
                    VarType::Entity => {
                        write!(
                            out,
                            "tag @e remove stack.{d}\r\n\
                             tag @e[tag={}] add stack.{d}\r\n",
                            binding.iid,
                            d = d
                        )?;
                        stack.push(VarType::Entity);
                        Ok(VarType::Entity)
                    }
                    VarType::Void => Err(CompileError::VoidValue),
                },
            }
        }

        Expr::Unary(unary) => {
            let ty = compile_expr(cx, &unary.expr, out, stack)?;
            let d = stack.len() - 1;
            let operator = unary.operator.lexeme();

            match (operator, ty) {
                ("!", VarType::Boolean) => {
                    write!(
                        out,
                        "scoreboard players add stack.{d} {obj} 1\r\n\
                         execute if score stack.{d} {obj} matches 2 run scoreboard players set stack.{d} {obj} 0\r\n",
                        d = d,
                        obj = OBJECTIVE
                    )?;
                    Ok(VarType::Boolean)
                }
                ("+", VarType::Score) => Ok(VarType::Score),
                ("-", VarType::Score) => {
                    write!(
                        out,
                        "scoreboard players set stack.{d1} {obj} -1\r\n\
                         scoreboard players operation stack.{d} {obj} *= stack.{d1} {obj}\r\n",
                        d = d,
                        d1 = d + 1,
                        obj = OBJECTIVE
                    )?;
                    Ok(VarType::Score)
                }
                (op, operand) => Err(CompileError::UnaryTypeMismatch {
                    operator: op.to_string(),
                    operand,
                }),
            }
        }

        Expr::Binary(binary) => {
            let left = compile_expr(cx, &binary.left, out, stack)?;
            let right = compile_expr(cx, &binary.right, out, stack)?;
            stack.pop();
            stack.pop();
            let d = stack.len();
            let operator = binary.operator.lexeme();

            let result = lower_binary_op(out, operator, left, right, d)?;
            stack.push(result);
            Ok(result)
        }

        Expr::Call(call) => {
            let ret_type = compile_func_call(cx, call, out, stack)?;
            if ret_type == VarType::Void {
                return Err(CompileError::VoidCallExpression(
                    call.identifier.lexeme().to_string(),
                ));
            }

            let d = stack.len();
            let rets = cx.names.rets_iid(&asciify(call.identifier.lexeme()));
            match ret_type {
                VarType::Boolean | VarType::Score => {
                    write!(
                        out,
                        "scoreboard players operation stack.{} {obj} = {} {obj}\r\n",
                        d,
                        rets,
                        obj = OBJECTIVE
                    )?;
                }
                VarType::Entity => {
                    write!(
                        out,
                        "tag @e remove stack.{d}\r\n\
                         tag @e[tag={}] add stack.{d}\r\n",
                        rets,
                        d = d
                    )?;
                }
                VarType::Void => return Err(CompileError::VoidValue),
            }
            stack.push(ret_type);
            Ok(ret_type)
        }
    }
}

/// Emits the commands for one binary operator over the slots `stack.d` and
/// `stack.d+1`, leaving the result in `stack.d` and returning its type.
/// Relational and equality lowerings scratch at `stack.d+2`.
fn lower_binary_op(
    out: &mut dyn Write,
    operator: &str,
    left: VarType,
    right: VarType,
    d: usize,
) -> Result<VarType, CompileError> {
    use VarType::{Boolean, Entity, Score};

    match (operator, left, right) {
        ("*" | "/" | "%" | "+" | "-", Score, Score) => {
            write!(
                out,
                "scoreboard players operation stack.{d} {obj} {op}= stack.{d1} {obj}\r\n",
                d = d,
                d1 = d + 1,
                op = operator,
                obj = OBJECTIVE
            )?;
            Ok(Score)
        }

        ("-", Entity, Entity) => {
            write!(out, "tag @e[tag=stack.{}] remove stack.{}\r\n", d + 1, d)?;
            Ok(Entity)
        }

        ("<" | ">" | "<=" | ">=", Score, Score) => {
            write!(
                out,
                "scoreboard players operation stack.{d2} {obj} = stack.{d} {obj}\r\n\
                 scoreboard players set stack.{d} {obj} 0\r\n\
                 execute if score stack.{d2} {obj} {op} stack.{d1} {obj} run scoreboard players set stack.{d} {obj} 1\r\n",
                d = d,
                d1 = d + 1,
                d2 = d + 2,
                op = operator,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        ("==", Score, Score) | ("==", Boolean, Boolean) => {
            write!(
                out,
                "scoreboard players operation stack.{d2} {obj} = stack.{d} {obj}\r\n\
                 scoreboard players set stack.{d} {obj} 0\r\n\
                 execute if score stack.{d2} {obj} = stack.{d1} {obj} run scoreboard players set stack.{d} {obj} 1\r\n",
                d = d,
                d1 = d + 1,
                d2 = d + 2,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        // Entity comparisons treat the operands as sets under the subset
        // order, probing "tagged left but not right" (and the mirror image)
        // with single selector tests.
        ("<", Entity, Entity) => {
            write!(
                out,
                "scoreboard players set stack.{d} {obj} 0\r\n\
                 execute if entity @e[tag=!stack.{d},tag=stack.{d1}] run scoreboard players set stack.{d} {obj} 1\r\n\
                 execute if entity @e[tag=stack.{d},tag=!stack.{d1}] run scoreboard players set stack.{d} {obj} 0\r\n",
                d = d,
                d1 = d + 1,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        (">", Entity, Entity) => {
            write!(
                out,
                "scoreboard players set stack.{d} {obj} 0\r\n\
                 execute if entity @e[tag=stack.{d},tag=!stack.{d1}] run scoreboard players set stack.{d} {obj} 1\r\n\
                 execute if entity @e[tag=!stack.{d},tag=stack.{d1}] run scoreboard players set stack.{d} {obj} 0\r\n",
                d = d,
                d1 = d + 1,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        ("<=", Entity, Entity) => {
            write!(
                out,
                "scoreboard players set stack.{d} {obj} 1\r\n\
                 execute if entity @e[tag=stack.{d},tag=!stack.{d1}] run scoreboard players set stack.{d} {obj} 0\r\n",
                d = d,
                d1 = d + 1,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        (">=", Entity, Entity) => {
            write!(
                out,
                "scoreboard players set stack.{d} {obj} 1\r\n\
                 execute if entity @e[tag=!stack.{d},tag=stack.{d1}] run scoreboard players set stack.{d} {obj} 0\r\n",
                d = d,
                d1 = d + 1,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        ("==", Entity, Entity) => {
            write!(
                out,
                "scoreboard players set stack.{d} {obj} 1\r\n\
                 execute if entity @e[tag=stack.{d},tag=!stack.{d1}] run scoreboard players set stack.{d} {obj} 0\r\n\
                 execute if entity @e[tag=!stack.{d},tag=stack.{d1}] run scoreboard players set stack.{d} {obj} 0\r\n",
                d = d,
                d1 = d + 1,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        // Boolean connectives work on the sum of the operands: 0, 1 or 2.
        ("&", Boolean, Boolean) => {
            write!(
                out,
                "scoreboard players operation stack.{d} {obj} += stack.{d1} {obj}\r\n\
                 execute if score stack.{d} {obj} matches 1 run scoreboard players set stack.{d} {obj} 0\r\n",
                d = d,
                d1 = d + 1,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        ("^", Boolean, Boolean) => {
            write!(
                out,
                "scoreboard players operation stack.{d} {obj} += stack.{d1} {obj}\r\n\
                 execute if score stack.{d} {obj} matches 2 run scoreboard players set stack.{d} {obj} 0\r\n",
                d = d,
                d1 = d + 1,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        ("|", Boolean, Boolean) => {
            write!(
                out,
                "scoreboard players operation stack.{d} {obj} += stack.{d1} {obj}\r\n\
                 execute if score stack.{d} {obj} matches 2 run scoreboard players set stack.{d} {obj} 1\r\n",
                d = d,
                d1 = d + 1,
                obj = OBJECTIVE
            )?;
            Ok(Boolean)
        }

        ("&", Entity, Entity) => {
            write!(
                out,
                "tag @e[tag=stack.{d},tag=!stack.{d1}] remove stack.{d}\r\n",
                d = d,
                d1 = d + 1
            )?;
            Ok(Entity)
        }

        ("^", Entity, Entity) => {
            write!(
                out,
                "tag @e remove stack.{d2}\r\n\
                 tag @e[tag=stack.{d},tag=stack.{d1}] add stack.{d2}\r\n\
                 tag @e[tag=stack.{d1}] add stack.{d}\r\n\
                 tag @e[tag=stack.{d2}] remove stack.{d}\r\n",
                d = d,
                d1 = d + 1,
                d2 = d + 2
            )?;
            Ok(Entity)
        }

        ("|", Entity, Entity) => {
            write!(
                out,
                "tag @e[tag=stack.{d1}] add stack.{d}\r\n",
                d = d,
                d1 = d + 1
            )?;
            Ok(Entity)
        }

        (op, l, r) => Err(CompileError::BinaryTypeMismatch {
            operator: op.to_string(),
            left: l,
            right: r,
        }),
    }
}

fn compile_func_call(
    cx: &FuncCx<'_, '_>,
    call: &FuncCall<'_>,
    out: &mut dyn Write,
    stack: &mut Vec<VarType>,
) -> Result<VarType, CompileError> {
    let callee_name = call.identifier.lexeme();
    let Some(callee) = cx.functions.get(callee_name).copied() else {
        return Err(CompileError::UnknownFunction(callee_name.to_string()));
    };

    if call.args.len() != callee.params.len() {
        return Err(CompileError::Arity {
            function: callee_name.to_string(),
            expected: callee.params.len(),
            found: call.args.len(),
        });
    }

    let callee_ascii = asciify(callee_name);

    for (i, (arg, param)) in call.args.iter().zip(&callee.params).enumerate() {
        let param_ty = resolve_type(&param.ty)?;

        let (source_id, arg_ty) = if arg.by_ref {
            let binding = cx.get(ref_arg_name(arg)?)?;
            (binding.iid.clone(), binding.ty)
        } else {
            let ty = compile_expr(cx, &arg.expr, out, stack)?;
            stack.pop();
            (format!("stack.{}", stack.len()), ty)
        };

        if arg_ty != param_ty {
            return Err(CompileError::ArgumentTypeMismatch {
                function: callee_name.to_string(),
                index: i + 1,
                expected: param_ty,
                found: arg_ty,
            });
        }

        let slot = cx.names.args_iid(&callee_ascii, i);
        match arg_ty {
            VarType::Boolean | VarType::Score => {
                write!(
                    out,
                    "scoreboard players operation {} {obj} = {} {obj}\r\n",
                    slot,
                    source_id,
                    obj = OBJECTIVE
                )?;
            }
            VarType::Entity => {
                write!(
                    out,
                    "tag @e remove {slot}\r\n\
                     tag @e[tag={}] add {slot}\r\n",
                    source_id,
                    slot = slot
                )?;
            }
            VarType::Void => return Err(CompileError::VoidValue),
        }
    }

    write!(out, "function {}\r\n", cx.names.function_id(&callee_ascii))?;

    // Copy parameter slots back into by-reference arguments, so mutation
    // inside the callee is visible to the caller.
    for (i, arg) in call.args.iter().enumerate() {
        if !arg.by_ref {
            continue;
        }
        let binding = cx.get(ref_arg_name(arg)?)?.clone();
        let slot = cx.names.args_iid(&callee_ascii, i);
        match binding.ty {
            VarType::Boolean | VarType::Score => {
                write!(
                    out,
                    "scoreboard players operation {} {obj} = {} {obj}\r\n",
                    binding.iid,
                    slot,
                    obj = OBJECTIVE
                )?;
            }
            VarType::Entity => {
                write!(
                    out,
                    "tag @e remove {iid}\r\n\
                     tag @e[tag={}] add {iid}\r\n",
                    slot,
                    iid = binding.iid
                )?;
            }
            VarType::Void => return Err(CompileError::VoidValue),
        }
    }

    resolve_type(&callee.return_type)
}
