//! Static type checking.
//!
//! Types are checked, not inferred into the tree: the checker walks the
//! AST once, consulting and updating a `ScopeStack<Type>` exactly the
//! way the interpreter later walks it with a `ScopeStack<Value>`. `Na`
//! is the wildcard produced by indexing an array (the element type is
//! not tracked per-slot) and is compatible with every concrete type.

use crate::ast::*;
use crate::error::{Diagnostic, Result};
use crate::scope::ScopeStack;
use crate::token::TokenKind;
use crate::value::Type;

pub struct TypeChecker {
    scopes: ScopeStack<Type>,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
        }
    }

    pub fn check_program(&mut self, program: &Program) -> Result<()> {
        self.check_block(&program.stmts)
    }

    fn check_block(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::Print { expr, .. } => {
                self.check_expr(expr)?;
                Ok(())
            }
            Stmt::If(if_stmt) => self.check_if(if_stmt),
            Stmt::While { cond, body, .. } => {
                self.check_bool_expr(cond)?;
                self.scopes.push();
                let result = self.check_block(body);
                self.scopes.pop();
                result
            }
        }
    }

    fn check_if(&mut self, if_stmt: &IfStmt) -> Result<()> {
        self.check_basic_if(&if_stmt.if_part)?;
        for elseif in &if_stmt.elseifs {
            self.check_basic_if(elseif)?;
        }
        self.scopes.push();
        let result = self.check_block(&if_stmt.else_part);
        self.scopes.pop();
        result
    }

    fn check_basic_if(&mut self, basic: &BasicIf) -> Result<()> {
        self.check_bool_expr(&basic.cond)?;
        self.scopes.push();
        let result = self.check_block(&basic.body);
        self.scopes.pop();
        result
    }

    fn check_assign(&mut self, assign: &Assign) -> Result<()> {
        let rhs_ty = self.check_expr(&assign.expr)?;
        match &assign.target {
            LValue::Var(name) => {
                if let Some(existing) = self.scopes.get(name).copied() {
                    if !existing.compatible(rhs_ty) {
                        return Err(Diagnostic::new(
                            format!("cannot assign {rhs_ty} to variable '{name}' of type {existing}"),
                            assign.pos,
                        ));
                    }
                    if existing == Type::Na {
                        self.scopes.add(name.to_string(), rhs_ty);
                    }
                } else {
                    self.scopes.add(name.to_string(), rhs_ty);
                }
                Ok(())
            }
            LValue::Index { name, index } => {
                let array_ty = self
                    .scopes
                    .get(name)
                    .copied()
                    .ok_or_else(|| Diagnostic::new(format!("undefined variable '{name}'"), assign.pos))?;
                if !array_ty.compatible(Type::Array) {
                    return Err(Diagnostic::new(
                        format!("'{name}' is not an array"),
                        assign.pos,
                    ));
                }
                if let Some(index_expr) = index {
                    let index_ty = self.check_expr(index_expr)?;
                    if !index_ty.compatible(Type::Int) {
                        return Err(Diagnostic::new(
                            "array index must be an INT",
                            index_expr.pos,
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    fn check_bool_expr(&mut self, bexpr: &BoolExpr) -> Result<()> {
        match &bexpr.kind {
            BoolExprKind::Value(expr) => {
                let ty = self.check_expr(expr)?;
                if !ty.compatible(Type::Bool) {
                    return Err(Diagnostic::new(
                        format!("condition must be a BOOL, found {ty}"),
                        expr.pos,
                    ));
                }
                Ok(())
            }
            BoolExprKind::Relational { lhs, op, rhs } => {
                let lt = self.check_expr(lhs)?;
                let rt = self.check_expr(rhs)?;
                if !lt.compatible(rt) {
                    return Err(Diagnostic::new(
                        format!("cannot compare {lt} and {rt}"),
                        bexpr.pos,
                    ));
                }
                // Only INT and BOOL are comparable at all; STRING and
                // ARRAY have no relational operators in a condition.
                if !lt.compatible(Type::Int) && !lt.compatible(Type::Bool) {
                    return Err(Diagnostic::new(
                        format!("encountered uncomparable type {lt}"),
                        bexpr.pos,
                    ));
                }
                let ordering = matches!(
                    op,
                    RelOp::LessThan | RelOp::GreaterThan | RelOp::LessThanEqual | RelOp::GreaterThanEqual
                );
                if ordering && !lt.compatible(Type::Int) {
                    return Err(Diagnostic::new(
                        format!("ordering comparisons require INT, found {lt}"),
                        bexpr.pos,
                    ));
                }
                Ok(())
            }
            BoolExprKind::Not(inner) => self.check_bool_expr(inner),
            BoolExprKind::And(lhs, rhs) | BoolExprKind::Or(lhs, rhs) => {
                self.check_bool_expr(lhs)?;
                self.check_bool_expr(rhs)
            }
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Result<Type> {
        match &expr.kind {
            ExprKind::Int(_) => Ok(Type::Int),
            ExprKind::Str(_) => Ok(Type::String),
            ExprKind::Bool(_) => Ok(Type::Bool),
            ExprKind::Id(name) => self
                .scopes
                .get(name)
                .copied()
                .ok_or_else(|| Diagnostic::new(format!("undefined variable '{name}'"), expr.pos)),
            ExprKind::Index { name, index } => {
                let array_ty = self
                    .scopes
                    .get(name)
                    .copied()
                    .ok_or_else(|| Diagnostic::new(format!("undefined variable '{name}'"), expr.pos))?;
                if !array_ty.compatible(Type::Array) {
                    return Err(Diagnostic::new(format!("'{name}' is not an array"), expr.pos));
                }
                let index_ty = self.check_expr(index)?;
                if !index_ty.compatible(Type::Int) {
                    return Err(Diagnostic::new("array index must be an INT", index.pos));
                }
                // The element type is not tracked per-slot: indexing
                // always yields the wildcard until refined by use.
                Ok(Type::Na)
            }
            ExprKind::Len(inner) => {
                self.check_expr(inner)?;
                Ok(Type::Int)
            }
            ExprKind::Read { kind, prompt } => {
                let prompt_ty = self.check_expr(prompt)?;
                if !prompt_ty.compatible(Type::String) {
                    return Err(Diagnostic::new("read prompt must be a STRING", prompt.pos));
                }
                Ok(match kind {
                    ReadKind::Int => Type::Int,
                    ReadKind::Str => Type::String,
                })
            }
            ExprKind::ArrayLit(items) => {
                let mut elem_ty = Type::Na;
                for item in items {
                    let item_ty = self.check_expr(item)?;
                    if !elem_ty.compatible(item_ty) {
                        return Err(Diagnostic::new(
                            "array elements must all share one type",
                            item.pos,
                        ));
                    }
                    if elem_ty == Type::Na {
                        elem_ty = item_ty;
                    }
                }
                Ok(Type::Array)
            }
            ExprKind::BinOp { lhs, op, rhs } => self.check_binop(expr, lhs, *op, rhs),
        }
    }

    fn check_binop(&mut self, expr: &Expr, lhs: &Expr, op: TokenKind, rhs: &Expr) -> Result<Type> {
        let lt = self.check_expr(lhs)?;
        let rt = self.check_expr(rhs)?;

        // Unify operand types: identical types, the single left-biased
        // STRING + INT exception, or NA absorbing whichever side isn't NA.
        let result = if lt == rt {
            lt
        } else if lt == Type::String && rt == Type::Int {
            Type::String
        } else if lt == Type::Na || rt == Type::Na {
            Type::Na
        } else {
            return Err(Diagnostic::new(format!("expected {lt}, got {rt}"), expr.pos));
        };

        // Which operators a type permits is keyed off the left operand;
        // a NA left operand is a wildcard and skips the check entirely.
        if lt != Type::Na {
            let allowed = match lt {
                Type::Array => op == TokenKind::Plus,
                Type::Int => true,
                Type::String => op == TokenKind::Plus,
                Type::Bool | Type::Na => false,
            };
            if !allowed {
                return Err(Diagnostic::new(
                    format!("cannot perform '{op}' on {lt} type"),
                    expr.pos,
                ));
            }
        }

        Ok(result)
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(src: &str) -> Result<()> {
        let program = parse(src).unwrap();
        TypeChecker::new().check_program(&program)
    }

    #[test]
    fn undefined_variable_is_an_error() {
        assert!(check("println(y);").is_err());
    }

    #[test]
    fn string_concatenation_with_int_is_allowed() {
        assert!(check("x = \"count: \" + 5;").is_ok());
    }

    #[test]
    fn arithmetic_on_string_is_rejected() {
        assert!(check("x = \"a\" - 1;").is_err());
    }

    #[test]
    fn indexed_assignment_requires_array_variable() {
        assert!(check("a = 1; a[0] = 2;").is_err());
        assert!(check("a = []; a[] = 2;").is_ok());
    }

    #[test]
    fn comparing_incompatible_types_is_an_error() {
        assert!(check("if 1 == \"a\" { println(1); }").is_err());
    }

    #[test]
    fn string_equality_is_uncomparable_in_a_condition() {
        assert!(check("if \"a\" == \"a\" { println(1); }").is_err());
    }

    #[test]
    fn bool_equality_is_allowed_in_a_condition() {
        assert!(check("if true == false { println(1); }").is_ok());
    }

    #[test]
    fn int_ordering_is_allowed_in_a_condition() {
        assert!(check("if 1 < 2 { println(1); }").is_ok());
    }

    #[test]
    fn int_plus_string_is_rejected() {
        assert!(check("x = 5 + \"count: \";").is_err());
    }

    #[test]
    fn string_plus_bool_is_rejected() {
        assert!(check("x = \"a\" + true;").is_err());
    }

    #[test]
    fn array_concatenation_is_allowed() {
        assert!(check("x = [1] + [2];").is_ok());
    }

    #[test]
    fn array_plus_non_array_is_rejected() {
        assert!(check("x = [1] + 2;").is_err());
    }

    #[test]
    fn na_plus_int_stays_na() {
        // indexing yields NA; adding a concrete INT to it must not force
        // a concrete result type (spec: "mixed operand types with NA
        // yields NA"), so a second, differently-typed use still checks.
        assert!(check("a = [1]; x = a[0] + 1; x = \"s\";").is_ok());
    }
}
