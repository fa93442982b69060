use std::collections::BTreeMap;
use std::fmt;

use fractus_core::FractusError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Real,
    Imaginary,
    Identifier,
    Parameter,

    // Operators
    Plus,
    Minus,
    Dot,
    Fraction,
    Caret,

    // Grouping
    LeftParen,
    RightParen,

    // Reserved functions
    Sqrt,
    Sin,
    Cos,
    Tan,
    Ln,
    Log,
}

impl TokenKind {
    /// Prefix functions: `\sqrt`, `\sin`, `\cos`, `\tan`, `\log`, `\ln`.
    pub const FUNCTIONS: [TokenKind; 6] = [
        TokenKind::Sqrt,
        TokenKind::Sin,
        TokenKind::Cos,
        TokenKind::Tan,
        TokenKind::Log,
        TokenKind::Ln,
    ];

    pub fn is_function(self) -> bool {
        Self::FUNCTIONS.contains(&self)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Real => "REAL",
            TokenKind::Imaginary => "IMAGINARY",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Parameter => "PARAMETER",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Dot => "DOT",
            TokenKind::Fraction => "FRACTION",
            TokenKind::Caret => "CARET",
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::Sqrt => "SQRT",
            TokenKind::Sin => "SIN",
            TokenKind::Cos => "COS",
            TokenKind::Tan => "TAN",
            TokenKind::Ln => "LN",
            TokenKind::Log => "LOG",
        };
        write!(f, "{}", name)
    }
}

/// A token with its kind, optional text payload and the character offset it
/// started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<String>,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Self {
            kind,
            value: None,
            offset,
        }
    }

    pub fn with_value(kind: TokenKind, value: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            value: Some(value.into()),
            offset,
        }
    }

    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{{{}: {}}}", self.kind, value),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Backslash commands, matched by prefix in this order.
const COMMANDS: [(&str, TokenKind); 10] = [
    ("left", TokenKind::LeftParen),
    ("right", TokenKind::RightParen),
    ("cdot", TokenKind::Dot),
    ("frac", TokenKind::Fraction),
    ("sqrt", TokenKind::Sqrt),
    ("sin", TokenKind::Sin),
    ("cos", TokenKind::Cos),
    ("tan", TokenKind::Tan),
    ("ln", TokenKind::Ln),
    ("log", TokenKind::Log),
];

/// Greek letters usable as variable names, e.g. `\alpha` or `\theta_{1}`.
const GREEK_LETTERS: [&str; 24] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "omicron", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi",
    "psi", "omega",
];

/// A non-fatal problem met while lexing (a skipped character).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub offset: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning: {} at character {}", self.message, self.offset)
    }
}

/// Lexing stopped at a backslash command outside the command table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexFailure {
    pub command: String,
    pub offset: usize,
}

impl From<LexFailure> for FractusError {
    fn from(failure: LexFailure) -> Self {
        FractusError::UnknownCommand {
            command: failure.command,
            offset: failure.offset,
        }
    }
}

/// Everything the lexer produced. On failure `tokens` holds whatever was
/// collected before the offending command.
#[derive(Debug, Clone, PartialEq)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
    pub failure: Option<LexFailure>,
}

impl LexOutput {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// The markup lexer. One instance per source string.
pub struct Lexer<'a> {
    source: Vec<char>,
    pos: usize,
    parameters: &'a BTreeMap<String, String>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &str, parameters: &'a BTreeMap<String, String>) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            parameters,
        }
    }

    /// Tokenize the entire source.
    pub fn tokenize(mut self) -> LexOutput {
        let mut tokens = Vec::new();
        let mut diagnostics = Vec::new();
        let mut failure = None;

        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                c if c.is_whitespace() || c == '(' || c == ')' => {
                    self.advance();
                }
                '{' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::LeftParen, start));
                }
                '}' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::RightParen, start));
                }
                '+' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Plus, start));
                }
                '-' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Minus, start));
                }
                '^' => {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Caret, start));
                }
                '\\' => match self.read_command() {
                    Ok(Some(token)) => tokens.push(token),
                    Ok(None) => {}
                    Err(err) => {
                        tracing::warn!(
                            "unknown command '\\{}' at character {}, lexing stopped",
                            err.command,
                            err.offset
                        );
                        failure = Some(err);
                        break;
                    }
                },
                c if c.is_ascii_digit() => tokens.push(self.read_number()),
                c if c.is_ascii_alphabetic() => tokens.push(self.read_identifier()),
                other => {
                    self.advance();
                    tracing::warn!("skipping invalid character '{}' at {}", other, start);
                    diagnostics.push(Diagnostic {
                        message: format!("invalid character '{}'", other),
                        offset: start,
                    });
                }
            }
        }

        tracing::debug!(
            "lexed {} tokens: {}",
            tokens.len(),
            tokens
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        );

        LexOutput {
            tokens,
            diagnostics,
            failure,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }

    /// Whether `word` immediately follows the character under the cursor.
    fn matches_after_cursor(&self, word: &str) -> bool {
        let mut idx = self.pos + 1;
        for expected in word.chars() {
            if self.source.get(idx) != Some(&expected) {
                return false;
            }
            idx += 1;
        }
        true
    }

    /// Cursor is on a backslash. `Ok(None)` means the command is skipped.
    fn read_command(&mut self) -> Result<Option<Token>, LexFailure> {
        let start = self.pos;

        if let Some((name, kind)) = COMMANDS
            .iter()
            .find(|(name, _)| self.matches_after_cursor(name))
        {
            self.pos += name.chars().count() + 1;
            return Ok(Some(Token::new(*kind, start)));
        }

        if let Some(letter) = GREEK_LETTERS
            .iter()
            .find(|letter| self.matches_after_cursor(letter))
        {
            self.pos += letter.chars().count() + 1;
            let mut identifier = format!("\\{}", letter);
            self.read_subscript(&mut identifier);
            return Ok(Some(Token::with_value(
                TokenKind::Identifier,
                identifier,
                start,
            )));
        }

        if self.peek_next() == Some(' ') {
            self.pos += 2;
            return Ok(None);
        }

        let command: String = self.source[start + 1..]
            .iter()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        let command = if command.is_empty() {
            self.peek_next().map(String::from).unwrap_or_default()
        } else {
            command
        };
        Err(LexFailure {
            command,
            offset: start,
        })
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;
        let mut literal = self.read_digits();
        if self.peek() == Some('.') {
            self.advance();
            literal.push('.');
            literal.push_str(&self.read_digits());
        }

        if self.peek() == Some('i') && self.peek_next() != Some('_') {
            self.advance();
            return Token::with_value(TokenKind::Imaginary, literal, start);
        }
        Token::with_value(TokenKind::Real, literal, start)
    }

    fn read_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        digits
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.pos;
        let mut identifier = String::new();
        if let Some(letter) = self.advance() {
            identifier.push(letter);
        }
        self.read_subscript(&mut identifier);

        match self.parameters.get(&identifier) {
            Some(substitution) => {
                Token::with_value(TokenKind::Parameter, substitution.clone(), start)
            }
            None => Token::with_value(TokenKind::Identifier, identifier, start),
        }
    }

    /// Appends `_x` or a brace-balanced `_{...}` run to `identifier`.
    fn read_subscript(&mut self, identifier: &mut String) {
        if self.peek() != Some('_') {
            return;
        }
        identifier.push('_');
        self.advance();

        match self.advance() {
            Some('{') => {
                identifier.push('{');
                let mut depth = 1;
                while depth > 0 {
                    let Some(ch) = self.advance() else { break };
                    match ch {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ => {}
                    }
                    identifier.push(ch);
                }
            }
            Some(ch) => identifier.push(ch),
            None => {}
        }
    }
}

/// Tokenize `source` against the parameter dictionary.
pub fn tokenize(source: &str, parameters: &BTreeMap<String, String>) -> LexOutput {
    Lexer::new(source, parameters).tokenize()
}
