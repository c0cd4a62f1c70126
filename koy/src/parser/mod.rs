//! Recursive-descent parser with ordered backtracking alternatives
//!
//! Every rule works on the token stream produced by [`crate::lexer`]. A rule
//! that fails leaves a record of the furthest token position reached and the
//! tokens that would have been accepted there; [`Parser::attempt`] rewinds the
//! cursor so the next alternative can start from the same place. When a whole
//! parse fails, that furthest record becomes the [`CompileError::Parser`].

use crate::ast::{BinOp, Expr, FnDef, FunctionLit, LabeledArg, Program, Span, TopLevel, UnOp};
use crate::error::{CompileError, Result};
use crate::lexer::{tokenize, Token};


/// Marker for a failed rule; details live in the parser's furthest-failure record
#[derive(Debug)]
struct Fail;

type PResult<T> = std::result::Result<T, Fail>;

type Rule<'t, T> = fn(&mut Parser<'t>) -> PResult<T>;

/// Parse tokens into a program
pub fn parse(source: &str, tokens: Vec<(Token, Span)>) -> Result<Program> {
    tracing::debug!(tokens = tokens.len(), "parsing program");
    let mut parser = Parser::new(&tokens, source.len());
    parser.run(Parser::program)
}

/// Parse a complete program: an ordered sequence of top-level definitions
pub fn parse_program(source: &str) -> Result<Program> {
    let tokens = tokenize(source)?;
    parse(source, tokens)
}

/// Parse a single expression spanning the whole input
pub fn parse_expression(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    tracing::debug!(tokens = tokens.len(), "parsing expression");
    let mut parser = Parser::new(&tokens, source.len());
    parser.run(Parser::expression)
}

/// Parse one or more statements ("lines")
pub fn parse_statements(source: &str) -> Result<Vec<Expr>> {
    let tokens = tokenize(source)?;
    tracing::debug!(tokens = tokens.len(), "parsing statements");
    let mut parser = Parser::new(&tokens, source.len());
    parser.run(Parser::lines)
}

struct Parser<'t> {
    tokens: &'t [(Token, Span)],
    pos: usize,
    source_len: usize,
    /// Furthest token index at which a rule failed
    furthest: usize,
    /// Tokens accepted at `furthest`, in the order they were tried
    expected: Vec<String>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [(Token, Span)], source_len: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            source_len,
            furthest: 0,
            expected: Vec::new(),
        }
    }

    /// Run a rule that must consume the entire input
    fn run<T>(&mut self, rule: Rule<'t, T>) -> Result<T> {
        match rule(self).and_then(|value| self.eof().map(|_| value)) {
            Ok(value) => Ok(value),
            Err(Fail) => Err(self.error()),
        }
    }

    fn error(&self) -> CompileError {
        let (found, span) = match self.tokens.get(self.furthest) {
            Some((token, span)) => (format!("`{token}`"), *span),
            None => ("end of input".to_string(), Span::point(self.source_len)),
        };
        let message = match self.expected.as_slice() {
            [] => format!("unexpected {found}"),
            [single] => format!("expected {single}, found {found}"),
            many => format!("expected one of {}, found {found}", many.join(", ")),
        };
        CompileError::parser(message, span, self.expected.clone())
    }

    // ------------------------------------------------------------------
    // Cursor primitives
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn record(&mut self, expected: String) {
        if self.pos > self.furthest {
            self.furthest = self.pos;
            self.expected.clear();
        }
        if self.pos == self.furthest && !self.expected.contains(&expected) {
            self.expected.push(expected);
        }
    }

    fn expect(&mut self, token: Token) -> PResult<()> {
        if self.peek() == Some(&token) {
            self.advance();
            Ok(())
        } else {
            self.record(token.describe());
            Err(Fail)
        }
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn ident(&mut self) -> PResult<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => {
                self.record("identifier".to_string());
                Err(Fail)
            }
        }
    }

    fn eof(&mut self) -> PResult<()> {
        if self.pos < self.tokens.len() {
            self.record("end of input".to_string());
            Err(Fail)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Combinators
    // ------------------------------------------------------------------

    /// Run `rule`, rewinding the cursor if it fails
    fn attempt<T>(&mut self, rule: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let start = self.pos;
        let result = rule(self);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    /// Ordered choice: the first alternative that succeeds wins
    fn one_of<T>(&mut self, alternatives: &[Rule<'t, T>]) -> PResult<T> {
        for alternative in alternatives {
            if let Ok(value) = self.attempt(|p| alternative(p)) {
                return Ok(value);
            }
        }
        Err(Fail)
    }

    /// Zero or more repetitions of `rule`
    fn many<T>(&mut self, rule: Rule<'t, T>) -> Vec<T> {
        let mut items = Vec::new();
        while let Ok(item) = self.attempt(|p| rule(p)) {
            items.push(item);
        }
        items
    }

    /// Zero or more `rule`s separated by `sep`
    fn sep_by<T>(&mut self, rule: Rule<'t, T>, sep: Token) -> Vec<T> {
        let mut items = Vec::new();
        let Ok(first) = self.attempt(|p| rule(p)) else {
            return items;
        };
        items.push(first);
        loop {
            let next = self.attempt(|p| {
                p.expect(sep.clone())?;
                rule(p)
            });
            match next {
                Ok(item) => items.push(item),
                Err(Fail) => break,
            }
        }
        items
    }

    /// `open item (sep item)* close`
    fn delimited<T>(&mut self, open: Token, rule: Rule<'t, T>, close: Token) -> PResult<Vec<T>> {
        self.expect(open)?;
        let items = self.sep_by(rule, Token::Comma);
        self.expect(close)?;
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Top level
    // ------------------------------------------------------------------

    fn program(&mut self) -> PResult<Program> {
        let items = self.many(Self::top_level);
        Ok(Program { items })
    }

    fn top_level(&mut self) -> PResult<TopLevel> {
        self.one_of(&[Self::function_definition, Self::val_definition, Self::mutable_val_definition])
    }

    /// fn name(params) { ... }
    fn function_definition(&mut self) -> PResult<TopLevel> {
        self.expect(Token::Fn)?;
        let name = self.ident()?;
        let params = self.delimited(Token::LParen, Self::ident, Token::RParen)?;
        let body = self.block_body()?;
        Ok(TopLevel::FnDef(FnDef { name, params, body }))
    }

    fn val_definition(&mut self) -> PResult<TopLevel> {
        let (name, value) = self.val_binding()?;
        Ok(TopLevel::Val { name, value })
    }

    fn mutable_val_definition(&mut self) -> PResult<TopLevel> {
        let (name, value) = self.mutable_val_binding()?;
        Ok(TopLevel::MutableVal { name, value })
    }

    /// 'val' name '=' expression ';'
    fn val_binding(&mut self) -> PResult<(String, Expr)> {
        self.expect(Token::Val)?;
        self.binding_tail()
    }

    /// 'mutable' 'val' name '=' expression ';'
    fn mutable_val_binding(&mut self) -> PResult<(String, Expr)> {
        self.expect(Token::Mutable)?;
        self.expect(Token::Val)?;
        self.binding_tail()
    }

    fn binding_tail(&mut self) -> PResult<(String, Expr)> {
        let name = self.ident()?;
        self.expect(Token::Eq)?;
        let value = self.expression()?;
        self.expect(Token::Semi)?;
        Ok((name, value))
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// line+
    fn lines(&mut self) -> PResult<Vec<Expr>> {
        let first = self.line()?;
        let mut lines = vec![first];
        lines.extend(self.many(Self::line));
        Ok(lines)
    }

    fn line(&mut self) -> PResult<Expr> {
        self.one_of(&[
            Self::println_statement,
            Self::assignment,
            Self::val_declaration,
            Self::mutable_val_declaration,
            Self::expression_statement,
            Self::block,
            Self::if_expression,
            Self::for_in_expression,
            Self::while_expression,
        ])
    }

    fn println_statement(&mut self) -> PResult<Expr> {
        self.expect(Token::Println)?;
        self.expect(Token::LParen)?;
        let arg = self.expression()?;
        self.expect(Token::RParen)?;
        self.expect(Token::Semi)?;
        Ok(Expr::Println(Box::new(arg)))
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let name = self.ident()?;
        self.expect(Token::Eq)?;
        let value = self.expression()?;
        self.expect(Token::Semi)?;
        Ok(Expr::assign(name, value))
    }

    fn val_declaration(&mut self) -> PResult<Expr> {
        let (name, value) = self.val_binding()?;
        Ok(Expr::Val {
            name,
            value: Box::new(value),
        })
    }

    fn mutable_val_declaration(&mut self) -> PResult<Expr> {
        let (name, value) = self.mutable_val_binding()?;
        Ok(Expr::MutableVal {
            name,
            value: Box::new(value),
        })
    }

    fn expression_statement(&mut self) -> PResult<Expr> {
        let expr = self.expression()?;
        self.expect(Token::Semi)?;
        Ok(expr)
    }

    fn block(&mut self) -> PResult<Expr> {
        self.block_body().map(Expr::Block)
    }

    /// '{' line* '}'
    fn block_body(&mut self) -> PResult<Vec<Expr>> {
        self.expect(Token::LBrace)?;
        let lines = self.many(Self::line);
        self.expect(Token::RBrace)?;
        Ok(lines)
    }

    /// 'if' '(' expression ')' line ('else' line)?
    fn if_expression(&mut self) -> PResult<Expr> {
        self.expect(Token::If)?;
        let cond = self.parenthesized()?;
        let then_branch = self.line()?;
        let else_branch = self
            .attempt(|p| {
                p.expect(Token::Else)?;
                p.line()
            })
            .ok();
        Ok(Expr::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    /// 'for' '(' name 'in' start 'to' end ')' line
    ///
    /// Rewritten on the spot into
    /// `{ mutable val name = start; while (name < end) { line name = name + 1; } }`
    fn for_in_expression(&mut self) -> PResult<Expr> {
        self.expect(Token::For)?;
        self.expect(Token::LParen)?;
        let name = self.ident()?;
        self.expect(Token::In)?;
        let start = self.expression()?;
        self.expect(Token::To)?;
        let end = self.expression()?;
        self.expect(Token::RParen)?;
        let body = self.line()?;

        let step = Expr::assign(
            name.clone(),
            Expr::binary(BinOp::Add, Expr::var(name.clone()), Expr::IntLit(1)),
        );
        Ok(Expr::Block(vec![
            Expr::MutableVal {
                name: name.clone(),
                value: Box::new(start),
            },
            Expr::While {
                cond: Box::new(Expr::binary(BinOp::Lt, Expr::var(name), end)),
                body: Box::new(Expr::Block(vec![body, step])),
            },
        ]))
    }

    /// 'while' '(' expression ')' line
    fn while_expression(&mut self) -> PResult<Expr> {
        self.expect(Token::While)?;
        let cond = self.parenthesized()?;
        let body = self.line()?;
        Ok(Expr::While {
            cond: Box::new(cond),
            body: Box::new(body),
        })
    }

    fn parenthesized(&mut self) -> PResult<Expr> {
        self.expect(Token::LParen)?;
        let expr = self.expression()?;
        self.expect(Token::RParen)?;
        Ok(expr)
    }

    // ------------------------------------------------------------------
    // Expressions, lowest precedence first
    // ------------------------------------------------------------------

    fn expression(&mut self) -> PResult<Expr> {
        self.comparative()
    }

    fn comparative(&mut self) -> PResult<Expr> {
        self.chain_left(Self::additive, |token| match token {
            Token::EqEq => Some(BinOp::Eq),
            Token::NotEq => Some(BinOp::Ne),
            Token::Lt => Some(BinOp::Lt),
            Token::LtEq => Some(BinOp::Le),
            Token::Gt => Some(BinOp::Gt),
            Token::GtEq => Some(BinOp::Ge),
            Token::And => Some(BinOp::And),
            Token::Or => Some(BinOp::Or),
            _ => None,
        })
    }

    fn additive(&mut self) -> PResult<Expr> {
        self.chain_left(Self::multitive, |token| match token {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn multitive(&mut self) -> PResult<Expr> {
        self.chain_left(Self::unary, |token| match token {
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Percent => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// operand (op operand)*, folded to the left
    fn chain_left(&mut self, operand: Rule<'t, Expr>, operator: fn(&Token) -> Option<BinOp>) -> PResult<Expr> {
        let mut left = operand(self)?;
        while let Some(op) = self.peek().and_then(operator) {
            self.advance();
            let right = operand(self)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    /// ('++' / '--') identifier / postfix
    fn unary(&mut self) -> PResult<Expr> {
        let op = match self.peek() {
            Some(Token::PlusPlus) => UnOp::Increment,
            Some(Token::MinusMinus) => UnOp::Decrement,
            _ => return self.postfix(),
        };
        self.advance();
        let name = self.ident()?;
        Ok(Expr::Unary { op, name })
    }

    /// primary ('->' primary / '<-' primary)*
    fn postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.check(&Token::Arrow) {
                self.advance();
                let index = self.primary()?;
                expr = Expr::Index {
                    collection: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.check(&Token::LeftArrow) {
                self.advance();
                let element = self.primary()?;
                expr = Expr::Push {
                    target: Box::new(expr),
                    element: Box::new(element),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn primary(&mut self) -> PResult<Expr> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => {
                self.record("expression".to_string());
                return Err(Fail);
            }
        };
        match token {
            Token::LParen => self.parenthesized(),
            Token::IntLit(n) => {
                self.advance();
                Ok(Expr::IntLit(n))
            }
            Token::Minus => {
                self.advance();
                match self.peek() {
                    Some(Token::IntLit(n)) => {
                        let n = n.wrapping_neg();
                        self.advance();
                        Ok(Expr::IntLit(n))
                    }
                    _ => {
                        self.record("integer".to_string());
                        Err(Fail)
                    }
                }
            }
            Token::True => {
                self.advance();
                Ok(Expr::BoolLit(true))
            }
            Token::False => {
                self.advance();
                Ok(Expr::BoolLit(false))
            }
            Token::Nil => {
                self.advance();
                Ok(Expr::Nil)
            }
            Token::StringLit(s) => {
                self.advance();
                Ok(Expr::StringLit(s))
            }
            // Forms sharing an identifier prefix, most specific first
            Token::Ident(_) => self.one_of(&[
                Self::method_call,
                Self::function_call,
                Self::labeled_call,
                Self::identifier,
            ]),
            Token::SetOpen => {
                let items = self.delimited(Token::SetOpen, Self::expression, Token::RBrace)?;
                Ok(Expr::SetLit(items))
            }
            Token::LBracket => {
                let items = self.delimited(Token::LBracket, Self::expression, Token::RBracket)?;
                Ok(Expr::ArrayLit(items))
            }
            Token::LBrace => {
                let object = self.object_literal()?;
                self.member_suffix(object)
            }
            Token::Pipe => self.function_literal(),
            _ => {
                self.record("expression".to_string());
                Err(Fail)
            }
        }
    }

    /// name '.' member ('(' args ')')?
    fn method_call(&mut self) -> PResult<Expr> {
        let name = self.ident()?;
        if !self.check(&Token::Dot) {
            self.record(Token::Dot.describe());
            return Err(Fail);
        }
        self.member_suffix(Expr::Var(name))
    }

    /// Optional `.member` / `.member(args)` after an object-valued receiver
    fn member_suffix(&mut self, receiver: Expr) -> PResult<Expr> {
        if !self.check(&Token::Dot) {
            return Ok(receiver);
        }
        self.advance();
        let member = self.ident()?;
        let args = if self.check(&Token::LParen) {
            self.delimited(Token::LParen, Self::expression, Token::RParen)?
        } else {
            Vec::new()
        };
        Ok(Expr::MethodCall {
            receiver: Box::new(receiver),
            member,
            args,
        })
    }

    /// name '(' args ')'
    fn function_call(&mut self) -> PResult<Expr> {
        let func = self.ident()?;
        let args = self.delimited(Token::LParen, Self::expression, Token::RParen)?;
        Ok(Expr::Call { func, args })
    }

    /// name '[' label '=' expr, ... ']'
    fn labeled_call(&mut self) -> PResult<Expr> {
        let func = self.ident()?;
        let args = self.delimited(Token::LBracket, Self::labeled_arg, Token::RBracket)?;
        Ok(Expr::LabeledCall { func, args })
    }

    fn labeled_arg(&mut self) -> PResult<LabeledArg> {
        let label = self.ident()?;
        self.expect(Token::Eq)?;
        let value = self.expression()?;
        Ok(LabeledArg { label, value })
    }

    fn identifier(&mut self) -> PResult<Expr> {
        self.ident().map(Expr::Var)
    }

    /// '{' (name ':' expression (',' name ':' expression)*)? '}'
    fn object_literal(&mut self) -> PResult<Expr> {
        let properties = self.delimited(Token::LBrace, Self::property, Token::RBrace)?;
        Ok(Expr::ObjectLit(properties))
    }

    fn property(&mut self) -> PResult<(String, Expr)> {
        let name = self.ident()?;
        self.expect(Token::Colon)?;
        let value = self.expression()?;
        Ok((name, value))
    }

    /// '|' params '|' block
    fn function_literal(&mut self) -> PResult<Expr> {
        let params = self.delimited(Token::Pipe, Self::ident, Token::Pipe)?;
        let body = self.block_body()?;
        Ok(Expr::FunctionLit(FunctionLit { params, body }))
    }
}
