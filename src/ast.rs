//! The closed AST. Every node carries the `Position` of its leading
//! token so the checker and interpreter can report precise diagnostics
//! without threading a separate token stream alongside the tree.

use crate::token::{Position, TokenKind};
use smartstring::{LazyCompact, SmartString};

pub type Ident = SmartString<LazyCompact>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadKind {
    Int,
    Str,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Int(i64),
    Str(String),
    Bool(bool),
    Id(Ident),
    /// `name[index]`.
    Index { name: Ident, index: Box<Expr> },
    Len(Box<Expr>),
    Read { kind: ReadKind, prompt: Box<Expr> },
    ArrayLit(Vec<Expr>),
    /// A binary operator application; `op` is one of the arithmetic
    /// `TokenKind`s (`Plus`, `Minus`, `Multiply`, `Divide`, `Modulus`).
    BinOp {
        lhs: Box<Expr>,
        op: TokenKind,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Position,
}

impl Expr {
    pub fn new(kind: ExprKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

/// A relational comparison operator, as distinguished from arithmetic
/// operators once a `BoolExpr` is promoted out of a plain `Expr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
}

impl RelOp {
    pub fn from_kind(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Equal => RelOp::Equal,
            TokenKind::NotEqual => RelOp::NotEqual,
            TokenKind::LessThan => RelOp::LessThan,
            TokenKind::GreaterThan => RelOp::GreaterThan,
            TokenKind::LessThanEqual => RelOp::LessThanEqual,
            TokenKind::GreaterThanEqual => RelOp::GreaterThanEqual,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum BoolExprKind {
    /// A bare expression used directly as a condition (no relop).
    Value(Expr),
    Relational { lhs: Expr, op: RelOp, rhs: Expr },
    Not(Box<BoolExpr>),
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
}

#[derive(Debug, Clone)]
pub struct BoolExpr {
    pub kind: BoolExprKind,
    pub pos: Position,
}

impl BoolExpr {
    pub fn new(kind: BoolExprKind, pos: Position) -> Self {
        Self { kind, pos }
    }
}

#[derive(Debug, Clone)]
pub enum LValue {
    Var(Ident),
    /// `None` index means "append" (the source wrote `name[] = expr`).
    Index { name: Ident, index: Option<Expr> },
}

#[derive(Debug, Clone)]
pub struct Assign {
    pub target: LValue,
    pub expr: Expr,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct BasicIf {
    pub cond: BoolExpr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub if_part: BasicIf,
    pub elseifs: Vec<BasicIf>,
    /// Empty when there is no trailing `else`.
    pub else_part: Vec<Stmt>,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Assign(Assign),
    Print {
        expr: Expr,
        newline: bool,
        pos: Position,
    },
    If(IfStmt),
    While {
        cond: BoolExpr,
        body: Vec<Stmt>,
        pos: Position,
    },
}

impl Stmt {
    pub fn pos(&self) -> Position {
        match self {
            Stmt::Assign(a) => a.pos,
            Stmt::Print { pos, .. } => *pos,
            Stmt::If(i) => i.pos,
            Stmt::While { pos, .. } => *pos,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}
