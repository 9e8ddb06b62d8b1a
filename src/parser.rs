//! Recursive-descent parser.
//!
//! Arithmetic expressions are parsed flat — a list of operands
//! alternating with operators — then folded into a tree by repeatedly
//! splitting at the *rightmost* occurrence of the *lowest-weight*
//! operator still in the list. Splitting rightmost-first and recursing
//! into both halves yields the usual left-associative, precedence-
//! correct tree without a separate grammar rule per precedence level.
//!
//! Boolean conditions are parsed the same way a condition is read: as
//! a plain expression first, then promoted into a `BoolExpr` by
//! looking for a trailing relational operator and an optional
//! `and`/`or` connector (right-recursive, so `a and b and c` nests as
//! `a and (b and c)`).

use crate::ast::*;
use crate::error::{Diagnostic, Result};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub struct Parser {
    lexer: Lexer,
    cur: Token,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let cur = lexer.next_token()?;
        Ok(Self { lexer, cur })
    }

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.cur, next))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.cur.kind == kind {
            self.advance()
        } else {
            Err(Diagnostic::new(
                format!("expected {} but found {}", kind, self.cur.kind),
                self.cur.pos(),
            ))
        }
    }

    /// A statement's trailing `;` is optional when it's the last thing
    /// in the program — i.e. immediately followed by EOS.
    fn semicolon(&mut self) -> Result<()> {
        if self.cur.kind == TokenKind::Eos {
            return Ok(());
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    pub fn parse_program(&mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        while self.cur.kind != TokenKind::Eos {
            stmts.push(self.parse_stmt()?);
        }
        Ok(Program { stmts })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.cur.kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Print | TokenKind::Println => self.parse_print(),
            TokenKind::Id => self.parse_assign(),
            _ => Err(Diagnostic::new(
                format!("expected a statement but found {}", self.cur.kind),
                self.cur.pos(),
            )),
        }
    }

    fn parse_print(&mut self) -> Result<Stmt> {
        let pos = self.cur.pos();
        let newline = self.cur.kind == TokenKind::Println;
        self.advance()?;
        self.expect(TokenKind::Lparen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Rparen)?;
        self.semicolon()?;
        Ok(Stmt::Print { expr, newline, pos })
    }

    fn parse_assign(&mut self) -> Result<Stmt> {
        let pos = self.cur.pos();
        let name = self.cur.lexeme.clone();
        self.advance()?;
        let target = if self.cur.kind == TokenKind::Lbracket {
            self.advance()?;
            let index = if self.cur.kind == TokenKind::Rbracket {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect(TokenKind::Rbracket)?;
            LValue::Index { name, index }
        } else {
            LValue::Var(name)
        };
        self.expect(TokenKind::Assign)?;
        let expr = self.parse_expr()?;
        self.semicolon()?;
        Ok(Stmt::Assign(Assign { target, expr, pos }))
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.expect(TokenKind::Lbrace)?;
        let mut stmts = Vec::new();
        while self.cur.kind != TokenKind::Rbrace {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::Rbrace)?;
        Ok(stmts)
    }

    /// `if`/`elseif`/`while` conditions are not parenthesized: the
    /// boolean expression runs directly up to the opening `{`.
    fn parse_if_header(&mut self) -> Result<BoolExpr> {
        self.parse_bool_expr()
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let pos = self.cur.pos();
        self.advance()?;
        let cond = self.parse_if_header()?;
        let body = self.parse_block()?;
        let mut elseifs = Vec::new();
        while self.cur.kind == TokenKind::Elseif {
            self.advance()?;
            let cond = self.parse_if_header()?;
            let body = self.parse_block()?;
            elseifs.push(BasicIf { cond, body });
        }
        let else_part = if self.cur.kind == TokenKind::Else {
            self.advance()?;
            self.parse_block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::If(IfStmt {
            if_part: BasicIf { cond, body },
            elseifs,
            else_part,
            pos,
        }))
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        let pos = self.cur.pos();
        self.advance()?;
        let cond = self.parse_if_header()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body, pos })
    }

    fn parse_bool_expr(&mut self) -> Result<BoolExpr> {
        let pos = self.cur.pos();
        if self.cur.kind == TokenKind::Not {
            self.advance()?;
            let inner = self.parse_bool_expr()?;
            return Ok(BoolExpr::new(BoolExprKind::Not(Box::new(inner)), pos));
        }
        let simple = self.parse_simple_bool_expr()?;
        match self.cur.kind {
            TokenKind::And => {
                self.advance()?;
                let rest = self.parse_bool_expr()?;
                Ok(BoolExpr::new(
                    BoolExprKind::And(Box::new(simple), Box::new(rest)),
                    pos,
                ))
            }
            TokenKind::Or => {
                self.advance()?;
                let rest = self.parse_bool_expr()?;
                Ok(BoolExpr::new(
                    BoolExprKind::Or(Box::new(simple), Box::new(rest)),
                    pos,
                ))
            }
            _ => Ok(simple),
        }
    }

    fn parse_simple_bool_expr(&mut self) -> Result<BoolExpr> {
        let pos = self.cur.pos();
        let lhs = self.parse_expr()?;
        if let Some(op) = RelOp::from_kind(self.cur.kind) {
            self.advance()?;
            let rhs = self.parse_expr()?;
            return Ok(BoolExpr::new(BoolExprKind::Relational { lhs, op, rhs }, pos));
        }
        Ok(BoolExpr::new(BoolExprKind::Value(lhs), pos))
    }

    fn is_arith_op(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Multiply
                | TokenKind::Divide
                | TokenKind::Modulus
        )
    }

    pub fn parse_expr(&mut self) -> Result<Expr> {
        let mut values = vec![self.parse_base_expr()?];
        let mut ops: Vec<Token> = Vec::new();
        while Self::is_arith_op(self.cur.kind) {
            ops.push(self.advance()?);
            values.push(self.parse_base_expr()?);
        }
        Ok(Self::fold(values, ops))
    }

    /// Recursively split at the rightmost lowest-weight operator.
    fn fold(mut values: Vec<Expr>, mut ops: Vec<Token>) -> Expr {
        if ops.is_empty() {
            return values.pop().expect("at least one operand");
        }
        let min_weight = ops.iter().map(|t| t.weight()).min().expect("non-empty");
        let split = ops
            .iter()
            .rposition(|t| t.weight() == min_weight)
            .expect("min_weight came from this list");

        let right_values = values.split_off(split + 1);
        let op = ops.remove(split);
        let right_ops = ops.split_off(split);
        let left_values = values;
        let left_ops = ops;

        let lhs = Self::fold(left_values, left_ops);
        let rhs = Self::fold(right_values, right_ops);
        let pos = lhs.pos;
        Expr::new(
            ExprKind::BinOp {
                lhs: Box::new(lhs),
                op: op.kind,
                rhs: Box::new(rhs),
            },
            pos,
        )
    }

    fn parse_base_expr(&mut self) -> Result<Expr> {
        let pos = self.cur.pos();
        match self.cur.kind {
            TokenKind::Int => {
                let lexeme = self.cur.lexeme.clone();
                self.advance()?;
                let n: i64 = lexeme
                    .parse()
                    .map_err(|_| Diagnostic::new("invalid integer literal", pos))?;
                Ok(Expr::new(ExprKind::Int(n), pos))
            }
            TokenKind::String => {
                let s = self.cur.lexeme.to_string();
                self.advance()?;
                Ok(Expr::new(ExprKind::Str(s), pos))
            }
            TokenKind::Bool => {
                let b = self.cur.lexeme == "true";
                self.advance()?;
                Ok(Expr::new(ExprKind::Bool(b), pos))
            }
            TokenKind::Len => {
                self.advance()?;
                self.expect(TokenKind::Lparen)?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::Rparen)?;
                Ok(Expr::new(ExprKind::Len(Box::new(inner)), pos))
            }
            TokenKind::Readint | TokenKind::Readstr => {
                let kind = if self.cur.kind == TokenKind::Readint {
                    ReadKind::Int
                } else {
                    ReadKind::Str
                };
                self.advance()?;
                self.expect(TokenKind::Lparen)?;
                let prompt = self.parse_expr()?;
                self.expect(TokenKind::Rparen)?;
                Ok(Expr::new(
                    ExprKind::Read {
                        kind,
                        prompt: Box::new(prompt),
                    },
                    pos,
                ))
            }
            TokenKind::Lbracket => {
                self.advance()?;
                let mut items = Vec::new();
                if self.cur.kind != TokenKind::Rbracket {
                    items.push(self.parse_expr()?);
                    while self.cur.kind == TokenKind::Comma {
                        self.advance()?;
                        items.push(self.parse_expr()?);
                    }
                }
                self.expect(TokenKind::Rbracket)?;
                Ok(Expr::new(ExprKind::ArrayLit(items), pos))
            }
            TokenKind::Lparen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::Rparen)?;
                Ok(inner)
            }
            TokenKind::Id => {
                let name = self.cur.lexeme.clone();
                self.advance()?;
                if self.cur.kind == TokenKind::Lbracket {
                    self.advance()?;
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::Rbracket)?;
                    Ok(Expr::new(
                        ExprKind::Index {
                            name,
                            index: Box::new(index),
                        },
                        pos,
                    ))
                } else {
                    Ok(Expr::new(ExprKind::Id(name), pos))
                }
            }
            _ => Err(Diagnostic::new(
                format!("unexpected token '{}' in expression", self.cur.lexeme),
                pos,
            )),
        }
    }
}

/// Parse a full program from source text.
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse("x = 1 + 2 * 3;").unwrap();
        match &program.stmts[0] {
            Stmt::Assign(Assign { expr, .. }) => match &expr.kind {
                ExprKind::BinOp { op, lhs, rhs } => {
                    assert_eq!(*op, TokenKind::Plus);
                    assert!(matches!(lhs.kind, ExprKind::Int(1)));
                    assert!(matches!(rhs.kind, ExprKind::BinOp { op: TokenKind::Multiply, .. }));
                }
                other => panic!("expected BinOp, got {other:?}"),
            },
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn left_associative_chain_of_same_weight_ops() {
        let program = parse("x = 1 - 2 - 3;").unwrap();
        match &program.stmts[0] {
            Stmt::Assign(Assign { expr, .. }) => match &expr.kind {
                ExprKind::BinOp { op, lhs, rhs } => {
                    assert_eq!(*op, TokenKind::Minus);
                    assert!(matches!(lhs.kind, ExprKind::BinOp { op: TokenKind::Minus, .. }));
                    assert!(matches!(rhs.kind, ExprKind::Int(3)));
                }
                other => panic!("expected BinOp, got {other:?}"),
            },
            other => panic!("expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn index_assignment_with_omitted_index_is_append() {
        let program = parse("a[] = 1;").unwrap();
        match &program.stmts[0] {
            Stmt::Assign(Assign { target: LValue::Index { index, .. }, .. }) => {
                assert!(index.is_none());
            }
            other => panic!("expected index assign, got {other:?}"),
        }
    }

    #[test]
    fn bool_expr_promotes_relational_and_connector() {
        let program = parse("if x < 10 and y > 0 { println(x); }").unwrap();
        match &program.stmts[0] {
            Stmt::If(IfStmt { if_part, .. }) => {
                assert!(matches!(if_part.cond.kind, BoolExprKind::And(_, _)));
            }
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn while_and_if_chains_parse() {
        let src = "while x < 10 { if x == 5 { print(x); } elseif x == 6 { print(x); } else { print(x); } x = x + 1; }";
        let program = parse(src).unwrap();
        assert_eq!(program.stmts.len(), 1);
    }

    #[test]
    fn trailing_semicolon_is_optional_at_eos() {
        assert!(parse("x = 1").is_ok());
        assert!(parse(r#"println("hi")"#).is_ok());
    }

    #[test]
    fn missing_semicolon_before_another_statement_is_an_error() {
        assert!(parse("x = 1 y = 2;").is_err());
    }
}
