//! Single-pass scanner for source text.
//!
//! The [`Lexer`] walks the source left to right without backtracking
//! and implements [`Iterator`] over `Result<Token, TokenizerError>`. It
//! tracks byte offset, line, and column for every token it produces.
//! The stream ends with a synthetic [`TokenKind::Eof`] token, or with
//! the first error.
//!
//! # Token rules (checked in this order)
//!
//! | Input                       | Token                          |
//! |-----------------------------|--------------------------------|
//! | `:` / `,`                   | `Colon` / `Comma`              |
//! | `;` + closing bracket       | `ObjectClose`                  |
//! | `;`                         | `Semicolon`                    |
//! | opening bracket + `;`       | `ObjectOpen`                   |
//! | `(` `[` `{`                 | `BracketOpen`                  |
//! | `)` `]` `}`                 | `BracketClose`                 |
//! | `"…"`                       | `String` (no escapes)          |
//! | digit run                   | `Integer`                      |
//! | space, tab, `\n`, `\r`      | one `Whitespace` per character |
//! | operator character run      | `Symbol` (operator-shaped)     |
//! | `_`/letter, then word chars | `Symbol` (keyword-shaped)      |
use crate::span::{Pos, Span};
use crate::token::{SymbolShape, Token, TokenKind};

// ═══════════════════════════════════════════════════════════════════
// Character classes
// ═══════════════════════════════════════════════════════════════════

/// Characters that may appear in operator-shaped symbols.
fn is_op_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '\\' | '/' | '%' | '=' | '!' | '<' | '>' | '|' | '&'
    )
}

fn is_open_bracket(c: char) -> bool {
    matches!(c, '(' | '[' | '{')
}

fn is_close_bracket(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

fn is_word_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

// ═══════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════

/// Raised for unterminated strings and unrecognized characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {pos}")]
pub struct TokenizerError {
    pub message: String,
    pub pos: Pos,
}

impl TokenizerError {
    pub fn new(message: impl Into<String>, pos: Pos) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Lexer
// ═══════════════════════════════════════════════════════════════════

/// A scanner over an in-memory source string.
///
/// ```rust
/// use parser::{Lexer, TokenKind};
///
/// let kinds: Vec<TokenKind> = Lexer::from_str("1,")
///     .map(|t| t.map(|t| t.kind))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(kinds, vec![TokenKind::Integer(1), TokenKind::Comma, TokenKind::Eof]);
/// ```
pub struct Lexer<'a> {
    source: &'a str,
    pos: Pos,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from a source string.
    pub fn from_str(source: &'a str) -> Self {
        Self {
            source,
            pos: Pos::origin(),
            finished: false,
        }
    }

    fn pos(&self) -> Pos {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos.offset..]
    }

    /// Peek the current character.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Peek `n` characters ahead (`peek_ahead(0)` == `peek()`).
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Consume one character, updating position tracking.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos = self.pos.advance(c);
        Some(c)
    }

    /// Build a token covering everything consumed since `start`.
    fn finish(&self, kind: TokenKind, start: Pos) -> Token {
        let lexeme = &self.source[start.offset..self.pos.offset];
        Token::new(kind, Span::new(start, self.pos()), lexeme)
    }

    /// Consume `len` characters and emit `kind`.
    fn single(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.pos();
        for _ in 0..len {
            self.advance();
        }
        self.finish(kind, start)
    }

    // ───────────────────────────────────────────────────────────
    //  String literals:  "..."
    // ───────────────────────────────────────────────────────────

    /// Everything up to the next `"` is taken verbatim.
    fn lex_string(&mut self) -> Result<Token, TokenizerError> {
        let start = self.pos();
        self.advance(); // opening `"`
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => break,
                Some(c) => value.push(c),
                None => {
                    return Err(TokenizerError::new(
                        "unterminated string",
                        self.pos(),
                    ));
                }
            }
        }
        Ok(self.finish(TokenKind::String(value), start))
    }

    // ───────────────────────────────────────────────────────────
    //  Numbers
    // ───────────────────────────────────────────────────────────

    /// A run of ASCII digits. A following `.` is not consumed; decimal
    /// literals are not part of the token set.
    fn lex_integer(&mut self) -> Result<Token, TokenizerError> {
        let start = self.pos();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let digits = &self.source[start.offset..self.pos.offset];
        let value = digits.parse::<i64>().map_err(|_| {
            TokenizerError::new("integer literal out of range", start)
        })?;
        Ok(self.finish(TokenKind::Integer(value), start))
    }

    // ───────────────────────────────────────────────────────────
    //  Symbols
    // ───────────────────────────────────────────────────────────

    fn lex_symbol(
        &mut self,
        shape: SymbolShape,
        accept: fn(char) -> bool,
    ) -> Token {
        let start = self.pos();
        while self.peek().is_some_and(accept) {
            self.advance();
        }
        let text = self.source[start.offset..self.pos.offset].to_string();
        self.finish(TokenKind::Symbol(text, shape), start)
    }

    // ───────────────────────────────────────────────────────────
    //  Main dispatch
    // ───────────────────────────────────────────────────────────

    /// Produce the next token from the source.
    pub fn next_token(&mut self) -> Result<Token, TokenizerError> {
        let start = self.pos();

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::Eof, Span::point(start), "")),
        };

        let token = match c {
            ':' => self.single(TokenKind::Colon, 1),
            ',' => self.single(TokenKind::Comma, 1),

            // ── Object markers take priority over bare brackets ──
            ';' if self.peek_ahead(1).is_some_and(is_close_bracket) => {
                self.single(TokenKind::ObjectClose, 2)
            }
            ';' => self.single(TokenKind::Semicolon, 1),
            c if is_open_bracket(c) && self.peek_ahead(1) == Some(';') => {
                self.single(TokenKind::ObjectOpen, 2)
            }
            c if is_open_bracket(c) => {
                self.single(TokenKind::BracketOpen(c), 1)
            }
            c if is_close_bracket(c) => {
                self.single(TokenKind::BracketClose(c), 1)
            }

            '"' => self.lex_string()?,
            '0'..='9' => self.lex_integer()?,

            ' ' | '\t' | '\n' | '\r' => {
                self.single(TokenKind::Whitespace(c), 1)
            }

            c if is_op_char(c) => {
                self.lex_symbol(SymbolShape::Operator, is_op_char)
            }
            c if c == '_' || c.is_ascii_alphabetic() => {
                self.lex_symbol(SymbolShape::Keyword, is_word_char)
            }

            c => {
                return Err(TokenizerError::new(
                    format!("unexpected character: {:?}", c),
                    start,
                ));
            }
        };
        Ok(token)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, TokenizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(tok) if !tok.is_eof() => {}
            _ => self.finished = true,
        }
        Some(result)
    }
}

/// Scan a whole source text. The last token is always [`TokenKind::Eof`].
pub fn scan(source: &str) -> Result<Vec<Token>, TokenizerError> {
    let tokens = Lexer::from_str(source).collect::<Result<Vec<_>, _>>()?;
    log::debug!("scanned {} tokens from {} bytes", tokens.len(), source.len());
    Ok(tokens)
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(src: &str) -> Vec<Token> {
        scan(src).expect("scan error")
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokens(src).into_iter().map(|t| t.kind).collect()
    }

    fn kw(s: &str) -> TokenKind {
        TokenKind::Symbol(s.to_string(), SymbolShape::Keyword)
    }

    fn op(s: &str) -> TokenKind {
        TokenKind::Symbol(s.to_string(), SymbolShape::Operator)
    }

    // ── Basic literals ────────────────────────────────────────

    #[test]
    fn lex_integer() {
        assert_eq!(kinds("42"), vec![TokenKind::Integer(42), TokenKind::Eof]);
    }

    #[test]
    fn lex_integer_max() {
        assert_eq!(
            kinds("9223372036854775807"),
            vec![TokenKind::Integer(i64::MAX), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_integer_overflow() {
        let err = scan("9223372036854775808").unwrap_err();
        assert_eq!(err.message, "integer literal out of range");
        assert_eq!(err.pos, Pos::origin());
    }

    #[test]
    fn lex_decimal_point_is_not_consumed() {
        let err = scan("3.14").unwrap_err();
        assert!(err.message.starts_with("unexpected character"));
        assert_eq!(err.pos.column, 1);
    }

    #[test]
    fn lex_string() {
        assert_eq!(
            kinds(r#""hello world""#),
            vec![TokenKind::String("hello world".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_string_is_verbatim() {
        assert_eq!(
            kinds(r#""a\nb""#),
            vec![TokenKind::String(r"a\nb".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_empty_string() {
        assert_eq!(
            kinds(r#""""#),
            vec![TokenKind::String(String::new()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_multibyte_string() {
        assert_eq!(
            kinds("\"héllo ✓\""),
            vec![TokenKind::String("héllo ✓".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string() {
        let err = scan("\"abc").unwrap_err();
        assert_eq!(err.message, "unterminated string");
        assert_eq!(err.pos, Pos::new(4, 0, 4));
    }

    // ── Symbols ───────────────────────────────────────────────

    #[test]
    fn lex_keyword_symbols() {
        assert_eq!(
            kinds("foo _bar x1_y"),
            vec![
                kw("foo"),
                TokenKind::Whitespace(' '),
                kw("_bar"),
                TokenKind::Whitespace(' '),
                kw("x1_y"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_operator_symbols() {
        assert_eq!(
            kinds("+ <= \\&|"),
            vec![
                op("+"),
                TokenKind::Whitespace(' '),
                op("<="),
                TokenKind::Whitespace(' '),
                op("\\&|"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn digit_run_splits_from_word() {
        assert_eq!(
            kinds("12abc"),
            vec![TokenKind::Integer(12), kw("abc"), TokenKind::Eof]
        );
    }

    #[test]
    fn operator_run_splits_from_word() {
        assert_eq!(
            kinds("a+b"),
            vec![kw("a"), op("+"), kw("b"), TokenKind::Eof]
        );
    }

    // ── Brackets and punctuation ──────────────────────────────

    #[test]
    fn keyword_send_with_arguments() {
        assert_eq!(
            kinds("foo: (1, 2)"),
            vec![
                kw("foo"),
                TokenKind::Colon,
                TokenKind::Whitespace(' '),
                TokenKind::BracketOpen('('),
                TokenKind::Integer(1),
                TokenKind::Comma,
                TokenKind::Whitespace(' '),
                TokenKind::Integer(2),
                TokenKind::BracketClose(')'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn object_markers() {
        assert_eq!(
            kinds("(;;)"),
            vec![TokenKind::ObjectOpen, TokenKind::ObjectClose, TokenKind::Eof]
        );
    }

    #[test]
    fn object_markers_need_not_match() {
        assert_eq!(
            kinds("[; ;}"),
            vec![
                TokenKind::ObjectOpen,
                TokenKind::Whitespace(' '),
                TokenKind::ObjectClose,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn open_bracket_claims_semicolon() {
        // Lexed as `(;` `)`, never `(` `;)`.
        assert_eq!(
            kinds("(;)"),
            vec![
                TokenKind::ObjectOpen,
                TokenKind::BracketClose(')'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn bare_semicolon() {
        assert_eq!(
            kinds("; x"),
            vec![
                TokenKind::Semicolon,
                TokenKind::Whitespace(' '),
                kw("x"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn whitespace_is_one_token_per_character() {
        assert_eq!(
            kinds(" \t\r\n"),
            vec![
                TokenKind::Whitespace(' '),
                TokenKind::Whitespace('\t'),
                TokenKind::Whitespace('\r'),
                TokenKind::Whitespace('\n'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unexpected_character() {
        let err = scan("foo #").unwrap_err();
        assert_eq!(err.message, "unexpected character: '#'");
        assert_eq!(err.pos, Pos::new(4, 0, 4));
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    // ── Positions ─────────────────────────────────────────────

    #[test]
    fn positions_track_lines_and_columns() {
        let toks = tokens("a,\n  bc");
        let bc = toks
            .iter()
            .find(|t| t.kind == kw("bc"))
            .expect("bc token");
        assert_eq!(bc.span.start, Pos::new(5, 1, 2));
        assert_eq!(bc.span.end, Pos::new(7, 1, 4));
        assert_eq!(bc.lexeme, "bc");
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let toks = tokens("\"é\" x");
        let x = toks.iter().find(|t| t.kind == kw("x")).expect("x token");
        assert_eq!(x.span.start.column, 4);
        assert_eq!(x.span.start.offset, 5);
    }

    #[test]
    fn error_position_on_later_line() {
        let err = scan("1,\n2,\n  @").unwrap_err();
        assert_eq!(err.pos.line, 2);
        assert_eq!(err.pos.column, 2);
    }

    #[test]
    fn iterator_stops_after_error() {
        let items: Vec<_> = Lexer::from_str("a $ b").collect();
        assert_eq!(items.len(), 3);
        assert!(items[2].is_err());
    }

    #[test]
    fn eof_span_is_at_end() {
        let toks = tokens("ab");
        let eof = toks.last().expect("eof");
        assert!(eof.is_eof());
        assert_eq!(eof.span, Span::point(Pos::new(2, 0, 2)));
    }
}
