//! Lexer (tokenizer) for script source code
//!
//! Pulls one [`Token`] at a time from raw source text. The parser drives it
//! through [`Lexer::next_token`] and inspects upcoming tokens with
//! [`Lexer::look`], which replays the lexer from a saved cursor and restores
//! it afterwards.
//!
//! Characters are classified in a fixed order: single-character
//! punctuation, the `.`/`...` family, `=`-suffixed operators, the four-form
//! `* < >` family, the three-form `& | + -` family, comments, strings,
//! numbers, identifiers and whitespace. Several characters belong to more
//! than one family; the earlier family always wins.

use super::ast::SourceLocation;
use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

/// Every lexical category the lexer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literal-carrying
    Identifier,
    String,
    Integer,
    Float,

    // Keywords
    True,
    False,
    Const,
    Import,
    Function,
    Return,
    Var,
    For,
    While,
    Do,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    If,
    Else,
    Has,
    Is,
    In,
    Null,

    // Brackets
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,

    // Punctuation
    Comma,
    Colon,
    Semicolon,
    QuestionMark,

    // Repeat family
    Period,
    Ellipses,

    // Equal-suffix family
    Assign,
    Equal,
    LogNot,
    NotEqual,
    Divide,
    DivideAssign,
    Modulo,
    ModuloAssign,
    BinXor,
    BinXorAssign,
    BinNot,
    BinNotAssign,

    // Combination family
    Multiply,
    MultiplyAssign,
    Pow,
    PowAssign,
    Lesser,
    LesserEqual,
    LeftShift,
    LeftShiftAssign,
    Greater,
    GreaterEqual,
    RightShift,
    RightShiftAssign,

    // Three-form family
    BinAnd,
    BinAndAssign,
    LogAnd,
    BinOr,
    BinOrAssign,
    LogOr,
    Plus,
    PlusAssign,
    Increment,
    Minus,
    MinusAssign,
    Decrement,

    Eof,
}

impl TokenKind {
    /// Whether tokens of this kind carry their source text
    pub fn has_lexeme(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier | TokenKind::String | TokenKind::Integer | TokenKind::Float
        )
    }

    /// Fixed spelling of the token, `None` for literal-carrying kinds and EOF
    pub fn spelling(self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Identifier
            | TokenKind::String
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Eof => return None,
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Const => "const",
            TokenKind::Import => "import",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::Var => "var",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Has => "has",
            TokenKind::Is => "is",
            TokenKind::In => "in",
            TokenKind::Null => "null",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::QuestionMark => "?",
            TokenKind::Period => ".",
            TokenKind::Ellipses => "...",
            TokenKind::Assign => "=",
            TokenKind::Equal => "==",
            TokenKind::LogNot => "!",
            TokenKind::NotEqual => "!=",
            TokenKind::Divide => "/",
            TokenKind::DivideAssign => "/=",
            TokenKind::Modulo => "%",
            TokenKind::ModuloAssign => "%=",
            TokenKind::BinXor => "^",
            TokenKind::BinXorAssign => "^=",
            TokenKind::BinNot => "~",
            TokenKind::BinNotAssign => "~=",
            TokenKind::Multiply => "*",
            TokenKind::MultiplyAssign => "*=",
            TokenKind::Pow => "**",
            TokenKind::PowAssign => "**=",
            TokenKind::Lesser => "<",
            TokenKind::LesserEqual => "<=",
            TokenKind::LeftShift => "<<",
            TokenKind::LeftShiftAssign => "<<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::RightShift => ">>",
            TokenKind::RightShiftAssign => ">>=",
            TokenKind::BinAnd => "&",
            TokenKind::BinAndAssign => "&=",
            TokenKind::LogAnd => "&&",
            TokenKind::BinOr => "|",
            TokenKind::BinOrAssign => "|=",
            TokenKind::LogOr => "||",
            TokenKind::Plus => "+",
            TokenKind::PlusAssign => "+=",
            TokenKind::Increment => "++",
            TokenKind::Minus => "-",
            TokenKind::MinusAssign => "-=",
            TokenKind::Decrement => "--",
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spelling() {
            Some(text) => write!(f, "'{}'", text),
            None => match self {
                TokenKind::Identifier => write!(f, "identifier"),
                TokenKind::String => write!(f, "string literal"),
                TokenKind::Integer => write!(f, "integer literal"),
                TokenKind::Float => write!(f, "float literal"),
                _ => write!(f, "end of file"),
            },
        }
    }
}

/// Reserved words and the token each one produces
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("import", TokenKind::Import),
    ("function", TokenKind::Function),
    ("return", TokenKind::Return),
    ("const", TokenKind::Const),
    ("var", TokenKind::Var),
    ("for", TokenKind::For),
    ("while", TokenKind::While),
    ("do", TokenKind::Do),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("switch", TokenKind::Switch),
    ("case", TokenKind::Case),
    ("default", TokenKind::Default),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("has", TokenKind::Has),
    ("is", TokenKind::Is),
    ("in", TokenKind::In),
    ("null", TokenKind::Null),
    ("and", TokenKind::LogAnd),
    ("or", TokenKind::LogOr),
    ("not", TokenKind::LogNot),
];

lazy_static! {
    static ref KEYWORD_LOOKUP: FxHashMap<&'static str, TokenKind> =
        KEYWORDS.iter().copied().collect();
}

/// Look up a reserved word
pub fn keyword(text: &str) -> Option<TokenKind> {
    KEYWORD_LOOKUP.get(text).copied()
}

/// A classified lexical unit
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, present only for identifiers, strings and numbers
    pub lexeme: Option<String>,
    /// Where the token starts
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        debug_assert!(!kind.has_lexeme(), "{kind:?} tokens carry a lexeme");
        Token {
            kind,
            lexeme: None,
            location,
        }
    }

    pub fn with_lexeme(kind: TokenKind, lexeme: String, location: SourceLocation) -> Self {
        debug_assert!(kind.has_lexeme(), "{kind:?} tokens have a fixed spelling");
        Token {
            kind,
            lexeme: Some(lexeme),
            location,
        }
    }

    pub fn lexeme(&self) -> &str {
        self.lexeme.as_deref().unwrap_or("")
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.lexeme) {
            (TokenKind::String, Some(text)) => write!(f, "string literal \"{}\"", text),
            (TokenKind::Identifier, Some(text)) => write!(f, "identifier '{}'", text),
            (kind, Some(text)) => write!(f, "{} {}", kind, text),
            (kind, None) => write!(f, "{}", kind),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// End of line or input reached inside a string literal
    #[error("Lexer error at {location}: string literal not closed (read so far: {partial:?})")]
    StringNotClosed {
        partial: String,
        location: SourceLocation,
    },

    #[error("Lexer error at {location}: unknown character '{character}'")]
    UnknownCharacter {
        character: char,
        location: SourceLocation,
    },

    /// Number-shaped text that is not a valid number, e.g. `1.2.3`
    #[error("Lexer error at {location}: invalid number literal '{lexeme}'")]
    UnknownIdentifier {
        lexeme: String,
        location: SourceLocation,
    },

    /// Escape character with nothing left to escape
    #[error("Lexer error at {location}: dangling '{operator}' in string literal")]
    InvalidOperator {
        operator: String,
        location: SourceLocation,
    },

    /// Lookahead distance below one; a caller bug, not a source error
    #[error("Lexer error at {location}: lookahead distance must be at least 1, got {requested}")]
    LookParamLessOne {
        requested: usize,
        location: SourceLocation,
    },
}

impl LexError {
    pub fn location(&self) -> SourceLocation {
        match self {
            LexError::StringNotClosed { location, .. }
            | LexError::UnknownCharacter { location, .. }
            | LexError::UnknownIdentifier { location, .. }
            | LexError::InvalidOperator { location, .. }
            | LexError::LookParamLessOne { location, .. } => *location,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LexError::StringNotClosed { .. } => "StringNotClosed",
            LexError::UnknownCharacter { .. } => "UnknownCharacter",
            LexError::UnknownIdentifier { .. } => "UnknownIdentifier",
            LexError::InvalidOperator { .. } => "InvalidOperator",
            LexError::LookParamLessOne { .. } => "LookParamLessOne",
        }
    }
}

/// Saved lexer position used to replay lookahead
#[derive(Debug, Clone, Copy)]
struct Cursor {
    position: usize,
    line: usize,
    column: usize,
}

/// Lexer for script source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input; the last token is always EOF
    #[tracing::instrument(skip_all, fields(source_len = self.input.len()))]
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }

        tracing::trace!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }

    /// Consume and return the next token
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let Some(ch) = self.peek() else {
                return Ok(Token::new(TokenKind::Eof, self.current_location()));
            };

            if is_whitespace(ch) {
                self.advance();
                continue;
            }

            if ch == '#' {
                self.skip_comment();
                continue;
            }

            return self.classify(ch);
        }
    }

    /// Return the `n`-th upcoming token without consuming anything
    pub fn look(&mut self, n: usize) -> Result<Token, LexError> {
        if n < 1 {
            return Err(LexError::LookParamLessOne {
                requested: n,
                location: self.current_location(),
            });
        }

        let saved = self.save();
        let mut result = self.next_token();
        for _ in 1..n {
            if result.is_err() {
                break;
            }
            result = self.next_token();
        }
        self.restore(saved);

        result
    }

    /// Current line/column of the cursor
    pub fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    fn classify(&mut self, ch: char) -> Result<Token, LexError> {
        let loc = self.current_location();

        if let Some(kind) = single_token(ch) {
            self.advance();
            return Ok(Token::new(kind, loc));
        }

        if ch == '.' {
            if let Some(token) = self.period_or_ellipses(loc) {
                return Ok(token);
            }
        } else if let Some([bare, with_equal]) = equal_suffix_family(ch) {
            self.advance();
            let kind = if self.match_char('=') { with_equal } else { bare };
            return Ok(Token::new(kind, loc));
        } else if let Some([bare, with_equal, doubled, doubled_equal]) = combination_family(ch) {
            self.advance();
            let kind = if self.match_char('=') {
                with_equal
            } else if self.match_char(ch) {
                if self.match_char('=') {
                    doubled_equal
                } else {
                    doubled
                }
            } else {
                bare
            };
            return Ok(Token::new(kind, loc));
        } else if let Some([bare, with_equal, doubled]) = three_form_family(ch) {
            self.advance();
            let kind = if self.match_char('=') {
                with_equal
            } else if self.match_char(ch) {
                doubled
            } else {
                bare
            };
            return Ok(Token::new(kind, loc));
        } else if ch == '"' || ch == '\'' {
            return self.string_literal(ch, loc);
        } else if ch.is_ascii_digit() {
            return self.number_literal(loc);
        } else if is_ident_start(ch) {
            return Ok(self.identifier_or_keyword(loc));
        }

        Err(LexError::UnknownCharacter {
            character: ch,
            location: loc,
        })
    }

    /// `.` or `...`; a lone `..` is rolled back and left unclaimed
    fn period_or_ellipses(&mut self, loc: SourceLocation) -> Option<Token> {
        self.advance();
        if self.peek() != Some('.') {
            return Some(Token::new(TokenKind::Period, loc));
        }

        self.advance();
        if self.match_char('.') {
            return Some(Token::new(TokenKind::Ellipses, loc));
        }

        // Undo both dots, including their column advance
        self.position -= 2;
        self.column -= 2;
        None
    }

    /// Parse string literal delimited by `quote`
    fn string_literal(&mut self, quote: char, loc: SourceLocation) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut string = String::new();

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(LexError::StringNotClosed {
                        partial: string,
                        location: self.current_location(),
                    });
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        None | Some('\n') => {
                            return Err(LexError::InvalidOperator {
                                operator: "\\".to_string(),
                                location: self.current_location(),
                            });
                        }
                        Some(escaped) => {
                            string.push(escaped);
                            self.advance();
                        }
                    }
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(Token::with_lexeme(TokenKind::String, string, loc));
                }
                Some(ch) => {
                    string.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Parse numeric literal: digits and dots, at most one dot
    fn number_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut num_str = String::new();
        let mut dots = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
            } else if ch == '.' {
                dots += 1;
                num_str.push(ch);
            } else {
                break;
            }
            self.advance();
        }

        match dots {
            0 => Ok(Token::with_lexeme(TokenKind::Integer, num_str, loc)),
            1 => Ok(Token::with_lexeme(TokenKind::Float, num_str, loc)),
            _ => Err(LexError::UnknownIdentifier {
                lexeme: num_str,
                location: self.current_location(),
            }),
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, loc: SourceLocation) -> Token {
        let mut ident = String::new();

        while let Some(ch) = self.peek() {
            if is_ident_continue(ch) {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match keyword(&ident) {
            Some(kind) => Token::new(kind, loc),
            None => Token::with_lexeme(TokenKind::Identifier, ident, loc),
        }
    }

    /// Skip `# ...` up to, not including, the line break
    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn save(&self) -> Cursor {
        Cursor {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    fn restore(&mut self, cursor: Cursor) {
        self.position = cursor.position;
        self.line = cursor.line;
        self.column = cursor.column;
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Consume the current character if it equals `expected`
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        }
        self.column += 1;

        Some(ch)
    }
}

fn single_token(ch: char) -> Option<TokenKind> {
    let kind = match ch {
        '(' => TokenKind::OpenParen,
        ')' => TokenKind::CloseParen,
        '[' => TokenKind::OpenBracket,
        ']' => TokenKind::CloseBracket,
        '{' => TokenKind::OpenBrace,
        '}' => TokenKind::CloseBrace,
        ',' => TokenKind::Comma,
        ':' => TokenKind::Colon,
        ';' => TokenKind::Semicolon,
        '?' => TokenKind::QuestionMark,
        _ => return None,
    };
    Some(kind)
}

/// `[bare, =]`
fn equal_suffix_family(ch: char) -> Option<[TokenKind; 2]> {
    let forms = match ch {
        '=' => [TokenKind::Assign, TokenKind::Equal],
        '!' => [TokenKind::LogNot, TokenKind::NotEqual],
        '/' => [TokenKind::Divide, TokenKind::DivideAssign],
        '%' => [TokenKind::Modulo, TokenKind::ModuloAssign],
        '^' => [TokenKind::BinXor, TokenKind::BinXorAssign],
        '~' => [TokenKind::BinNot, TokenKind::BinNotAssign],
        _ => return None,
    };
    Some(forms)
}

/// `[bare, =, doubled, doubled=]`
fn combination_family(ch: char) -> Option<[TokenKind; 4]> {
    let forms = match ch {
        '*' => [
            TokenKind::Multiply,
            TokenKind::MultiplyAssign,
            TokenKind::Pow,
            TokenKind::PowAssign,
        ],
        '<' => [
            TokenKind::Lesser,
            TokenKind::LesserEqual,
            TokenKind::LeftShift,
            TokenKind::LeftShiftAssign,
        ],
        '>' => [
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::RightShift,
            TokenKind::RightShiftAssign,
        ],
        _ => return None,
    };
    Some(forms)
}

/// `[bare, =, doubled]`
fn three_form_family(ch: char) -> Option<[TokenKind; 3]> {
    let forms = match ch {
        '&' => [TokenKind::BinAnd, TokenKind::BinAndAssign, TokenKind::LogAnd],
        '|' => [TokenKind::BinOr, TokenKind::BinOrAssign, TokenKind::LogOr],
        '+' => [TokenKind::Plus, TokenKind::PlusAssign, TokenKind::Increment],
        '-' => [TokenKind::Minus, TokenKind::MinusAssign, TokenKind::Decrement],
        _ => return None,
    };
    Some(forms)
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n' | '\u{0B}' | '\u{0C}')
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
