//! The tree-walking interpreter.
//!
//! Holds one `ScopeStack<Value>`, shaped exactly like the type
//! checker's `ScopeStack<Type>`, and a pair of I/O ports so `print`,
//! `println`, `readint`, and `readstr` can be driven against anything
//! that implements `Write`/`BufRead` — a real terminal in `main.rs`, or
//! an in-memory buffer in tests.

use std::io::{BufRead, Write};

use crate::ast::*;
use crate::error::{Diagnostic, Result};
use crate::scope::ScopeStack;
use crate::token::Position;
use crate::value::Value;

pub struct Interpreter<'a> {
    scopes: ScopeStack<Value>,
    stdin: &'a mut dyn BufRead,
    stdout: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(stdin: &'a mut dyn BufRead, stdout: &'a mut dyn Write) -> Self {
        Self {
            scopes: ScopeStack::new(),
            stdin,
            stdout,
        }
    }

    pub fn run(&mut self, program: &Program) -> Result<()> {
        self.exec_block(&program.stmts)
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign(assign) => self.exec_assign(assign),
            Stmt::Print { expr, newline, .. } => {
                let value = self.eval_expr(expr)?;
                write!(self.stdout, "{value}")
                    .and_then(|_| if *newline { writeln!(self.stdout) } else { Ok(()) })
                    .map_err(|e| Diagnostic::new(format!("write failed: {e}"), expr.pos))
            }
            Stmt::If(if_stmt) => self.exec_if(if_stmt),
            Stmt::While { cond, body, .. } => {
                while self.eval_bool_expr(cond)? {
                    self.scopes.push();
                    let result = self.exec_block(body);
                    self.scopes.pop();
                    result?;
                }
                Ok(())
            }
        }
    }

    fn exec_if(&mut self, if_stmt: &IfStmt) -> Result<()> {
        if self.eval_bool_expr(&if_stmt.if_part.cond)? {
            self.scopes.push();
            let result = self.exec_block(&if_stmt.if_part.body);
            self.scopes.pop();
            return result;
        }
        for elseif in &if_stmt.elseifs {
            if self.eval_bool_expr(&elseif.cond)? {
                self.scopes.push();
                let result = self.exec_block(&elseif.body);
                self.scopes.pop();
                return result;
            }
        }
        self.scopes.push();
        let result = self.exec_block(&if_stmt.else_part);
        self.scopes.pop();
        result
    }

    fn exec_assign(&mut self, assign: &Assign) -> Result<()> {
        let value = self.eval_expr(&assign.expr)?;
        match &assign.target {
            LValue::Var(name) => {
                if let Some(slot) = self.scopes.get_mut(name) {
                    *slot = value;
                } else {
                    self.scopes.add(name.to_string(), value);
                }
                Ok(())
            }
            LValue::Index { name, index } => {
                let idx = match index {
                    None => None,
                    Some(index_expr) => {
                        let idx_val = self.eval_expr(index_expr)?;
                        match idx_val {
                            Value::Int(n) => Some((n, index_expr.pos)),
                            other => {
                                return Err(Diagnostic::new(
                                    format!("array index must be an INT, found {}", other.type_of()),
                                    index_expr.pos,
                                ))
                            }
                        }
                    }
                };
                let arr = self
                    .scopes
                    .get_mut(name)
                    .ok_or_else(|| Diagnostic::new(format!("undefined variable '{name}'"), assign.pos))?;
                let items = match arr {
                    Value::Array(items) => items,
                    other => {
                        return Err(Diagnostic::new(
                            format!("'{name}' is not an array (found {})", other.type_of()),
                            assign.pos,
                        ))
                    }
                };
                match idx {
                    None => items.push(value),
                    Some((n, pos)) => {
                        if n < 0 || n as usize >= items.len() {
                            return Err(Diagnostic::new(
                                format!("index {n} out of bounds for array of length {}", items.len()),
                                pos,
                            ));
                        }
                        items[n as usize] = value;
                    }
                }
                Ok(())
            }
        }
    }

    fn eval_bool_expr(&mut self, bexpr: &BoolExpr) -> Result<bool> {
        match &bexpr.kind {
            BoolExprKind::Value(expr) => {
                // A bare value used as a condition coerces to truthiness
                // rather than requiring BOOL: nonzero, nonempty, and
                // non-absent are all true.
                Ok(self.eval_expr(expr)?.truthy())
            }
            BoolExprKind::Relational { lhs, op, rhs } => {
                let lv = self.eval_expr(lhs)?;
                let rv = self.eval_expr(rhs)?;
                Self::relate(*op, &lv, &rv, bexpr.pos)
            }
            // `and`/`or` are not short-circuiting: both sides always evaluate.
            BoolExprKind::Not(inner) => Ok(!self.eval_bool_expr(inner)?),
            BoolExprKind::And(lhs, rhs) => {
                let l = self.eval_bool_expr(lhs)?;
                let r = self.eval_bool_expr(rhs)?;
                Ok(l && r)
            }
            BoolExprKind::Or(lhs, rhs) => {
                let l = self.eval_bool_expr(lhs)?;
                let r = self.eval_bool_expr(rhs)?;
                Ok(l || r)
            }
        }
    }

    fn relate(op: RelOp, lhs: &Value, rhs: &Value, pos: Position) -> Result<bool> {
        use std::cmp::Ordering;
        let ordering = match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => {
                return match op {
                    RelOp::Equal => Ok(lhs == rhs),
                    RelOp::NotEqual => Ok(lhs != rhs),
                    _ => Err(Diagnostic::new(
                        format!("cannot order {} and {}", lhs.type_of(), rhs.type_of()),
                        pos,
                    )),
                }
            }
        };
        Ok(match op {
            RelOp::Equal => ordering == Ordering::Equal,
            RelOp::NotEqual => ordering != Ordering::Equal,
            RelOp::LessThan => ordering == Ordering::Less,
            RelOp::GreaterThan => ordering == Ordering::Greater,
            RelOp::LessThanEqual => ordering != Ordering::Greater,
            RelOp::GreaterThanEqual => ordering != Ordering::Less,
        })
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Str(s) => Ok(Value::String(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Id(name) => self
                .scopes
                .get(name)
                .cloned()
                .ok_or_else(|| Diagnostic::new(format!("undefined variable '{name}'"), expr.pos)),
            ExprKind::Index { name, index } => {
                let idx_val = self.eval_expr(index)?;
                let idx = match idx_val {
                    Value::Int(n) => n,
                    other => {
                        return Err(Diagnostic::new(
                            format!("array index must be an INT, found {}", other.type_of()),
                            index.pos,
                        ))
                    }
                };
                let arr = self
                    .scopes
                    .get(name)
                    .ok_or_else(|| Diagnostic::new(format!("undefined variable '{name}'"), expr.pos))?;
                match arr {
                    Value::Array(items) => {
                        if idx < 0 || idx as usize >= items.len() {
                            return Err(Diagnostic::new(
                                format!("index {idx} out of bounds for array of length {}", items.len()),
                                expr.pos,
                            ));
                        }
                        Ok(items[idx as usize].clone())
                    }
                    other => Err(Diagnostic::new(
                        format!("'{name}' is not an array (found {})", other.type_of()),
                        expr.pos,
                    )),
                }
            }
            ExprKind::Len(inner) => {
                let value = self.eval_expr(inner)?;
                Ok(Value::Int(value.len()))
            }
            ExprKind::Read { kind, prompt } => {
                let prompt_value = self.eval_expr(prompt)?;
                write!(self.stdout, "{prompt_value}")
                    .and_then(|_| self.stdout.flush())
                    .map_err(|e| Diagnostic::new(format!("write failed: {e}"), prompt.pos))?;
                let mut line = String::new();
                self.stdin
                    .read_line(&mut line)
                    .map_err(|e| Diagnostic::new(format!("read failed: {e}"), expr.pos))?;
                let trimmed = line.trim_end_matches(['\n', '\r']);
                Ok(match kind {
                    // Malformed input silently becomes 0, matching the
                    // original's tolerant read.
                    ReadKind::Int => Value::Int(trimmed.parse().unwrap_or(0)),
                    ReadKind::Str => Value::String(trimmed.to_string()),
                })
            }
            ExprKind::ArrayLit(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(Value::Array(values))
            }
            ExprKind::BinOp { lhs, op, rhs } => {
                let lv = self.eval_expr(lhs)?;
                let rv = self.eval_expr(rhs)?;
                self.eval_binop(expr.pos, *op, lv, rv)
            }
        }
    }

    fn eval_binop(
        &mut self,
        pos: Position,
        op: crate::token::TokenKind,
        lv: Value,
        rv: Value,
    ) -> Result<Value> {
        use crate::token::TokenKind as T;
        match op {
            T::Plus => match (&lv, &rv) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
                (Value::Array(a), Value::Array(b)) => {
                    let mut items = a.clone();
                    items.extend(b.iter().cloned());
                    Ok(Value::Array(items))
                }
                // Left-biased: a STRING on the left concatenates with
                // anything; a bare non-string right operand never coerces
                // the left side (the type checker already rejects that).
                (Value::String(_), _) => {
                    Ok(Value::String(format!("{}{}", lv.display_as_string(), rv.display_as_string())))
                }
                _ => Err(Diagnostic::new(
                    format!("operator '+' is not supported between {} and {}", lv.type_of(), rv.type_of()),
                    pos,
                )),
            },
            T::Minus | T::Multiply | T::Divide | T::Modulus => match (lv, rv) {
                (Value::Int(a), Value::Int(b)) => match op {
                    T::Minus => Ok(Value::Int(a - b)),
                    T::Multiply => Ok(Value::Int(a * b)),
                    T::Divide => {
                        if b == 0 {
                            Err(Diagnostic::new("division by zero", pos))
                        } else {
                            Ok(Value::Int(a / b))
                        }
                    }
                    T::Modulus => {
                        if b == 0 {
                            Err(Diagnostic::new("modulus by zero", pos))
                        } else {
                            Ok(Value::Int(a % b))
                        }
                    }
                    _ => unreachable!(),
                },
                (a, b) => Err(Diagnostic::new(
                    format!("operator '{op}' requires INT operands, found {} and {}", a.type_of(), b.type_of()),
                    pos,
                )),
            },
            _ => unreachable!("parser only produces arithmetic ops in BinOp"),
        }
    }
}
