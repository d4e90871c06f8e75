use crate::ast::{
    CodeBox, CompleteSymbol, Expr, LiteralBox, ObjectBox, SlotDef, SlotKind,
    UnfinishedSymbol,
};
use crate::span::{Pos, Span};
use crate::token::{Token, TokenKind};

/// Selector that turns a one-argument implicit send into an explicit return.
const RETURN_SELECTOR: &str = "return";

/// Deepest nesting of expressions and object literals accepted.
pub const MAX_NESTING: usize = 256;

/// A grammar violation. The parser never recovers; the first one aborts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {}, found {found} at {span}", .expected.join(" or "))]
pub struct ParserError {
    /// Names of the token kinds (or constructs) that would have been valid.
    pub expected: Vec<&'static str>,
    /// Description of the token actually encountered.
    pub found: String,
    pub span: Span,
}

impl ParserError {
    fn new(expected: &[&'static str], found: &Token) -> Self {
        Self {
            expected: expected.to_vec(),
            found: found.describe(),
            span: found.span,
        }
    }
}

/// Tokens that can begin an expression, for error messages.
const EXPRESSION: &[&str] = &[
    TokenKind::BRACKET_OPEN,
    TokenKind::SYMBOL,
    TokenKind::INTEGER,
    TokenKind::STRING,
    TokenKind::OBJECT_OPEN,
];

/// Recursive-descent parser over a scanned token sequence.
///
/// The cursor only moves forward; lookahead is unbounded but the parser
/// never backtracks once a production has consumed a token.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
}

impl Parser {
    /// Create a parser. A trailing EOF token is appended if missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let end = tokens.last().map_or(Pos::origin(), |t| t.span.end);
            tokens.push(Token::new(TokenKind::Eof, Span::point(end), ""));
        }
        Self {
            tokens,
            index: 0,
            depth: 0,
        }
    }

    // ── cursor ─────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        self.peek_at(self.index)
    }

    fn peek_at(&self, index: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if !tok.is_eof() {
            self.index += 1;
        }
        tok
    }

    /// Index of the first non-whitespace token at or after `index`.
    fn skip_whitespace_from(&self, mut index: usize) -> usize {
        while self.peek_at(index).kind.is_whitespace() {
            index += 1;
        }
        index
    }

    fn skip_whitespace(&mut self) {
        self.index = self.skip_whitespace_from(self.index);
    }

    fn unexpected(&self, expected: &[&'static str]) -> ParserError {
        ParserError::new(expected, self.peek())
    }

    /// Run `production` one nesting level deeper, failing past
    /// [`MAX_NESTING`].
    fn nested<T>(
        &mut self,
        production: impl FnOnce(&mut Self) -> Result<T, ParserError>,
    ) -> Result<T, ParserError> {
        if self.depth >= MAX_NESTING {
            return Err(self.unexpected(&["shallower nesting"]));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    fn expect_comma(&mut self) -> Result<Token, ParserError> {
        match self.peek_kind() {
            TokenKind::Comma => Ok(self.advance()),
            _ => Err(self.unexpected(&[TokenKind::COMMA])),
        }
    }

    fn expect_close(&mut self) -> Result<Token, ParserError> {
        match self.peek_kind() {
            TokenKind::BracketClose(_) => Ok(self.advance()),
            _ => Err(self.unexpected(&[TokenKind::BRACKET_CLOSE])),
        }
    }

    // ── program ────────────────────────────────────────────────────

    /// `program := (expression ',')* EOF`
    pub fn parse_program(mut self) -> Result<CodeBox, ParserError> {
        let mut body = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek().is_eof() {
                break;
            }
            body.push(self.parse_expression()?);
            self.skip_whitespace();
            self.expect_comma()?;
        }
        log::debug!("parsed program with {} expressions", body.len());
        Ok(CodeBox::new(body))
    }

    // ── expressions ────────────────────────────────────────────────

    /// `expression := WS* primary WS* (keyword-send)* (operator-send)*`
    pub fn parse_expression(&mut self) -> Result<Expr, ParserError> {
        self.nested(|p| {
            p.skip_whitespace();
            let primary = p.parse_primary()?;
            p.skip_whitespace();
            let main = p.parse_keyword_sends(primary)?;
            p.parse_operator_sends(main)
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParserError> {
        match self.peek_kind() {
            TokenKind::BracketOpen(_) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.skip_whitespace();
                self.expect_close()?;
                Ok(inner)
            }
            TokenKind::Symbol(..) => self.parse_implicit_send(),
            TokenKind::Integer(_)
            | TokenKind::String(_)
            | TokenKind::ObjectOpen => {
                let start = self.peek().span;
                let value = self.parse_literal()?;
                let end = self.peek_at(self.index.saturating_sub(1)).span;
                Ok(Expr::literal(value, start.merge(end)))
            }
            _ => Err(self.unexpected(EXPRESSION)),
        }
    }

    /// A selector at the start of an expression is sent to `self`.
    fn parse_implicit_send(&mut self) -> Result<Expr, ParserError> {
        let tok = self.advance();
        let name = symbol_text(&tok);
        let (mut parameters, end) = self.parse_message_args(tok.span)?;
        let span = tok.span.merge(end);
        if name == RETURN_SELECTOR && parameters.len() == 1 {
            if let Some(value) = parameters.pop() {
                return Ok(Expr::explicit_return(value, span));
            }
        }
        Ok(Expr::send(
            Expr::myself(Span::point(tok.span.start)),
            UnfinishedSymbol::new(name),
            parameters,
            span,
        ))
    }

    /// `keyword-send := ':' symbol message-args`, left-associative.
    fn parse_keyword_sends(
        &mut self,
        mut main: Expr,
    ) -> Result<Expr, ParserError> {
        while matches!(self.peek_kind(), TokenKind::Colon) {
            self.advance();
            self.skip_whitespace();
            let tok = match self.peek_kind() {
                TokenKind::Symbol(..) => self.advance(),
                _ => return Err(self.unexpected(&[TokenKind::SYMBOL])),
            };
            let (parameters, end) = self.parse_message_args(tok.span)?;
            let span = main.span.merge(end);
            main = Expr::send(
                main,
                UnfinishedSymbol::new(symbol_text(&tok)),
                parameters,
                span,
            );
            self.skip_whitespace();
        }
        Ok(main)
    }

    /// `operator-send := operator-symbol WS* [expression]`
    ///
    /// The argument is a full expression, which drains any further
    /// operator sends itself: `a + b + c` nests as `a + (b + c)`.
    fn parse_operator_sends(
        &mut self,
        mut main: Expr,
    ) -> Result<Expr, ParserError> {
        while self.peek_kind().is_operator() {
            let tok = self.advance();
            self.skip_whitespace();
            let mut span = main.span.merge(tok.span);
            let parameters = if self.peek_kind().starts_expression() {
                let arg = self.parse_expression()?;
                span = span.merge(arg.span);
                vec![arg]
            } else {
                Vec::new()
            };
            main = Expr::send(
                main,
                UnfinishedSymbol::new(symbol_text(&tok)),
                parameters,
                span,
            );
            self.skip_whitespace();
        }
        Ok(main)
    }

    /// `message-args := [':'] '(' expression (',' expression)* ')' | ε`
    ///
    /// The optional `:` is only taken when the next non-whitespace token
    /// after it opens a bracket; otherwise it belongs to a keyword send.
    /// Returns the arguments and the span of the last consumed token.
    fn parse_message_args(
        &mut self,
        selector: Span,
    ) -> Result<(Vec<Expr>, Span), ParserError> {
        let open = match self.peek_kind() {
            TokenKind::BracketOpen(_) => self.index,
            TokenKind::Colon => {
                let next = self.skip_whitespace_from(self.index + 1);
                match self.peek_at(next).kind {
                    TokenKind::BracketOpen(_) => next,
                    _ => return Ok((Vec::new(), selector)),
                }
            }
            _ => return Ok((Vec::new(), selector)),
        };
        self.index = open + 1;

        let mut parameters = vec![self.parse_expression()?];
        loop {
            self.skip_whitespace();
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                    parameters.push(self.parse_expression()?);
                }
                TokenKind::BracketClose(_) => {
                    let close = self.advance();
                    return Ok((parameters, close.span));
                }
                _ => {
                    return Err(self.unexpected(&[
                        TokenKind::COMMA,
                        TokenKind::BRACKET_CLOSE,
                    ]));
                }
            }
        }
    }

    // ── literals ───────────────────────────────────────────────────

    /// `literal := INTEGER | STRING | object-literal`
    fn parse_literal(&mut self) -> Result<LiteralBox, ParserError> {
        match self.peek_kind() {
            TokenKind::Integer(v) => {
                let v = *v;
                self.advance();
                Ok(LiteralBox::Integer(v))
            }
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Ok(LiteralBox::String(s))
            }
            TokenKind::ObjectOpen => {
                let object = self.nested(Self::parse_object_literal)?;
                Ok(LiteralBox::Object(object))
            }
            _ => Err(self.unexpected(&[
                TokenKind::INTEGER,
                TokenKind::STRING,
                TokenKind::OBJECT_OPEN,
            ])),
        }
    }

    /// `object-literal := OBJECT_OPEN slot-def* [';' (expression ',')*] OBJECT_CLOSE`
    fn parse_object_literal(&mut self) -> Result<ObjectBox, ParserError> {
        self.advance(); // object open

        let mut slots = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek_kind() {
                TokenKind::Symbol(..) => slots.push(self.parse_slot_def()?),
                _ => break,
            }
        }

        let code = if matches!(self.peek_kind(), TokenKind::Semicolon) {
            self.advance();
            let mut body = Vec::new();
            loop {
                self.skip_whitespace();
                match self.peek_kind() {
                    TokenKind::ObjectClose => break,
                    kind if kind.starts_expression() => {
                        body.push(self.parse_expression()?);
                        self.skip_whitespace();
                        self.expect_comma()?;
                    }
                    _ => {
                        let mut expected = vec![TokenKind::OBJECT_CLOSE];
                        expected.extend_from_slice(EXPRESSION);
                        return Err(self.unexpected(&expected));
                    }
                }
            }
            Some(CodeBox::new(body))
        } else {
            None
        };

        match self.peek_kind() {
            TokenKind::ObjectClose => {
                self.advance();
                Ok(ObjectBox { slots, code })
            }
            _ => Err(self.unexpected(&[
                TokenKind::SYMBOL,
                TokenKind::SEMICOLON,
                TokenKind::OBJECT_CLOSE,
            ])),
        }
    }

    /// `slot-def := symbol '(' INTEGER ')' ['=' literal] ','`
    fn parse_slot_def(&mut self) -> Result<SlotDef, ParserError> {
        let name_tok = self.advance();
        self.skip_whitespace();
        match self.peek_kind() {
            TokenKind::BracketOpen(_) => {
                self.advance();
            }
            _ => return Err(self.unexpected(&[TokenKind::BRACKET_OPEN])),
        }
        self.skip_whitespace();
        let arity = match self.peek_kind() {
            TokenKind::Integer(v) => match u64::try_from(*v) {
                Ok(arity) => arity,
                Err(_) => {
                    return Err(self.unexpected(&["non-negative arity"]));
                }
            },
            _ => return Err(self.unexpected(&[TokenKind::INTEGER])),
        };
        self.advance();
        self.skip_whitespace();
        self.expect_close()?;
        self.skip_whitespace();

        let value = match self.peek_kind() {
            TokenKind::Symbol(s, _) if s == "=" => {
                self.advance();
                self.skip_whitespace();
                Some(self.parse_literal()?)
            }
            _ => None,
        };
        self.skip_whitespace();
        let comma = match self.peek_kind() {
            TokenKind::Comma => self.advance(),
            _ if value.is_some() => {
                return Err(self.unexpected(&[TokenKind::COMMA]));
            }
            _ => return Err(self.unexpected(&["`=`", TokenKind::COMMA])),
        };

        Ok(SlotDef {
            name: CompleteSymbol::new(symbol_text(&name_tok), arity),
            kind: SlotKind::Unspecified,
            value: value.unwrap_or(LiteralBox::None),
            span: name_tok.span.merge(comma.span),
        })
    }
}

fn symbol_text(tok: &Token) -> String {
    match &tok.kind {
        TokenKind::Symbol(s, _) => s.clone(),
        _ => tok.lexeme.clone(),
    }
}

/// Parse a whole program: comma-terminated expressions up to EOF.
pub fn parse_program(tokens: Vec<Token>) -> Result<CodeBox, ParserError> {
    Parser::new(tokens).parse_program()
}

/// Parse exactly one expression, optionally surrounded by whitespace.
pub fn parse_expression(tokens: Vec<Token>) -> Result<Expr, ParserError> {
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expression()?;
    parser.skip_whitespace();
    if !parser.peek().is_eof() {
        return Err(parser.unexpected(&[TokenKind::EOF]));
    }
    Ok(expr)
}
