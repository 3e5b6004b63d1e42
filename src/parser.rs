//! Recursive-descent parser: statement dispatch plus a precedence-climbing
//! expression grammar.
//!
//! Expression levels, loosest first:
//!   comma      `,`                        left
//!   assignment `=`                        right, target must be an identifier
//!   or         `||`                       left
//!   and        `&&`                       left
//!   equality   `==` `!=`                  left
//!   comparison `<` `>` `<=` `>=`          left
//!   term       `+` `-`                    left
//!   factor     `*` `/` `%`                left
//!   unary      `-` `!` sin cos tan log exp sqrt   prefix, right-recursive
//!   primary    literals, identifiers, `( expr )`

use tracing::debug;

use crate::ast::{BinaryOp, DeclType, Expr, Program, Stmt, UnaryOp};
use crate::error::ParseError;
use crate::token::{Token, TokenKind};

type ParseResult<T> = Result<T, ParseError>;

/// Parse a whole token stream. The first error aborts the unit; no partial
/// program is returned.
pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    let program = Parser::new(tokens).parse_program()?;
    debug!(statements = program.statements.len(), "parsed program");
    Ok(program)
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// The stream is expected to end with `Eof`; one is appended if missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let pos = tokens.last().map(|t| t.pos).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", pos));
        }
        Self { tokens, current: 0 }
    }

    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    // ---- statements ----

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::LBrace => self.block(),
            kind if kind.is_type_keyword() => self.var_decl(),
            TokenKind::If => self.if_stmt(),
            TokenKind::Print => self.print_stmt(),
            _ => self.expression_stmt(),
        }
    }

    fn block(&mut self) -> ParseResult<Stmt> {
        let pos = self.consume(TokenKind::LBrace, "`{`")?.pos;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.statement()?);
        }
        self.consume(TokenKind::RBrace, "`}`")?;
        Ok(Stmt::Block { statements, pos })
    }

    fn var_decl(&mut self) -> ParseResult<Stmt> {
        let type_token = self.advance();
        let pos = type_token.pos;
        let ty = match type_token.kind {
            TokenKind::KwInt => DeclType::Int,
            TokenKind::KwDouble => DeclType::Double,
            TokenKind::KwString => DeclType::String,
            TokenKind::KwBool => DeclType::Bool,
            TokenKind::KwFunction => DeclType::Function,
            _ => return Err(self.expected_here("a type name")),
        };
        let name = self.consume(TokenKind::Identifier, "variable name")?.lexeme;

        let init = if self.check(TokenKind::Assign) {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "`;` after variable declaration")?;
        Ok(Stmt::VarDecl {
            ty,
            name,
            init,
            pos,
        })
    }

    fn if_stmt(&mut self) -> ParseResult<Stmt> {
        let pos = self.consume(TokenKind::If, "`if`")?.pos;
        self.consume(TokenKind::LParen, "`(` after `if`")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RParen, "`)` after condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.check(TokenKind::Else) {
            self.advance();
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            pos,
        })
    }

    fn print_stmt(&mut self) -> ParseResult<Stmt> {
        let pos = self.consume(TokenKind::Print, "`print`")?.pos;
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "`;` after print value")?;
        Ok(Stmt::Print { value, pos })
    }

    fn expression_stmt(&mut self) -> ParseResult<Stmt> {
        let pos = self.peek().pos;
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "`;` after expression")?;
        Ok(Stmt::Expression { expr, pos })
    }

    // ---- expressions ----

    pub fn expression(&mut self) -> ParseResult<Expr> {
        self.left_assoc(&[(TokenKind::Comma, BinaryOp::Comma)], Self::assignment)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.logical_or()?;
        if !self.check(TokenKind::Assign) {
            return Ok(expr);
        }
        let (target, pos) = match expr {
            Expr::Identifier { name, pos } => (name, pos),
            other => return Err(ParseError::InvalidAssignmentTarget { pos: other.pos() }),
        };
        self.advance();
        // right-associative: recurse into the same level
        let value = self.assignment()?;
        Ok(Expr::assignment(target, value, pos))
    }

    fn logical_or(&mut self) -> ParseResult<Expr> {
        self.left_assoc(&[(TokenKind::Or, BinaryOp::Or)], Self::logical_and)
    }

    fn logical_and(&mut self) -> ParseResult<Expr> {
        self.left_assoc(&[(TokenKind::And, BinaryOp::And)], Self::equality)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[(TokenKind::Eq, BinaryOp::Eq), (TokenKind::Neq, BinaryOp::Ne)],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::Leq, BinaryOp::Le),
                (TokenKind::Geq, BinaryOp::Ge),
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
            Self::factor,
        )
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.left_assoc(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Rem),
            ],
            Self::unary,
        )
    }

    /// One left-associative level: parse the tighter level, then keep folding
    /// while the lookahead is one of `ops`.
    fn left_assoc(
        &mut self,
        ops: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = next(self)?;
        while let Some(op) = self.match_binary(ops) {
            let pos = self.advance().pos;
            let right = next(self)?;
            expr = Expr::binary(op, expr, right, pos);
        }
        Ok(expr)
    }

    fn match_binary(&self, ops: &[(TokenKind, BinaryOp)]) -> Option<BinaryOp> {
        let kind = self.peek().kind;
        ops.iter().find(|(k, _)| *k == kind).map(|(_, op)| *op)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Sin => UnaryOp::Sin,
            TokenKind::Cos => UnaryOp::Cos,
            TokenKind::Tan => UnaryOp::Tan,
            TokenKind::Log => UnaryOp::Log,
            TokenKind::Exp => UnaryOp::Exp,
            TokenKind::Sqrt => UnaryOp::Sqrt,
            _ => return self.primary(),
        };
        let pos = self.advance().pos;
        let operand = self.unary()?;
        Ok(Expr::unary(op, operand, pos))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let pos = token.pos;
        let expr = match token.kind {
            TokenKind::IntLit => Expr::Int {
                value: token.lexeme.parse().map_err(|e| invalid_literal(&token, e))?,
                pos,
            },
            TokenKind::DoubleLit => Expr::Double {
                value: token.lexeme.parse().map_err(|e| invalid_literal(&token, e))?,
                pos,
            },
            TokenKind::StrLit => Expr::Str {
                value: unescape(&token)?,
                pos,
            },
            TokenKind::BoolLit | TokenKind::True | TokenKind::False => Expr::Bool {
                value: token.lexeme == "true",
                pos,
            },
            TokenKind::Identifier => Expr::Identifier {
                name: token.lexeme,
                pos,
            },
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(TokenKind::RParen, "`)`")?;
                return Ok(inner);
            }
            _ => {
                return Err(ParseError::ExpectedExpression {
                    found: token.describe(),
                    pos,
                })
            }
        };
        self.advance();
        Ok(expr)
    }

    // ---- token helpers ----

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    /// Returns the current token and moves past it; `Eof` is never consumed.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected_here(expected))
        }
    }

    fn expected_here(&self, expected: &str) -> ParseError {
        let found = self.peek();
        ParseError::Expected {
            expected: expected.to_string(),
            found: found.describe(),
            pos: found.pos,
        }
    }
}

fn invalid_literal(token: &Token, err: impl std::fmt::Display) -> ParseError {
    ParseError::InvalidLiteral {
        lexeme: token.lexeme.clone(),
        reason: err.to_string(),
        pos: token.pos,
    }
}

/// Strip the quotes and resolve `\n \t \" \\`.
fn unescape(token: &Token) -> ParseResult<String> {
    let raw = &token.lexeme;
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| invalid_literal(token, "missing quotes"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                return Err(invalid_literal(token, format!("unsupported escape \\{other}")))
            }
            None => return Err(invalid_literal(token, "dangling backslash")),
        }
    }
    Ok(out)
}
