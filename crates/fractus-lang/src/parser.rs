use fractus_core::{FractusError, FractusResult, GroupingMode, ImplicitProducts, ParserConfig};

use crate::ast::Expression;
use crate::lexer::{Token, TokenKind};

/// Tokens that may start an implicitly multiplied factor (`2x`, `a(z+1)`).
const IMPLICIT_FACTOR_START: [TokenKind; 9] = [
    TokenKind::LeftParen,
    TokenKind::Identifier,
    TokenKind::Parameter,
    TokenKind::Sqrt,
    TokenKind::Sin,
    TokenKind::Cos,
    TokenKind::Tan,
    TokenKind::Log,
    TokenKind::Ln,
];

/// Result of a parse: the tree plus the validity flag and the first error.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub ast: Expression,
    pub valid: bool,
    pub error_message: Option<String>,
}

impl Parsed {
    /// Reject an invalid parse. `source_name` labels the formula in the error.
    pub fn into_result(self, source_name: &str) -> FractusResult<Expression> {
        if self.valid {
            Ok(self.ast)
        } else {
            let message = self
                .error_message
                .unwrap_or_else(|| "invalid syntax".to_string());
            Err(FractusError::parse(message, source_name))
        }
    }
}

/// Recursive-descent parser over a token sequence.
///
/// Grammar, loosest first:
///
/// ```text
/// term      := product ( (PLUS|MINUS) term )?
/// product   := unary ( DOT product | implicit-chain )?
/// unary     := MINUS unary | exponent
/// exponent  := quotient ( CARET exponent )?
/// quotient  := FRACTION quotient quotient | func
/// func      := (SQRT|SIN|COS|TAN|LOG|LN) func | primary
/// primary   := REAL | IMAGINARY | IDENTIFIER | PARAMETER | LEFT_PAREN term RIGHT_PAREN
/// ```
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    grouping: GroupingMode,
    implicit_products: ImplicitProducts,
    valid: bool,
    error_message: Option<String>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            grouping: GroupingMode::default(),
            implicit_products: ImplicitProducts::default(),
            valid: true,
            error_message: None,
        }
    }

    pub fn with_grouping(mut self, grouping: GroupingMode) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_implicit_products(mut self, implicit_products: ImplicitProducts) -> Self {
        self.implicit_products = implicit_products;
        self
    }

    pub fn parse(mut self) -> Parsed {
        let mut ast = self.term();

        if !self.is_at_end() {
            match self.grouping {
                GroupingMode::Strict => {
                    let message = format!(
                        "unexpected {} at token {}",
                        self.tokens[self.pos], self.pos
                    );
                    ast = self.error(message);
                }
                GroupingMode::Lenient => {
                    tracing::debug!(
                        "ignoring {} trailing tokens",
                        self.tokens.len() - self.pos
                    );
                }
            }
        }

        tracing::debug!("AST: {}", ast);

        Parsed {
            ast,
            valid: self.valid,
            error_message: self.error_message,
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn matches(&self, kinds: &[TokenKind]) -> bool {
        self.peek().is_some_and(|t| kinds.contains(&t.kind))
    }

    fn advance(&mut self) -> Token {
        debug_assert!(!self.is_at_end(), "parser advanced past end of input");
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        self.pos += 1;
        token
    }

    /// Mark the parse invalid and build the error placeholder. Only the first
    /// message is kept.
    fn error(&mut self, message: String) -> Expression {
        self.valid = false;
        if self.error_message.is_none() {
            self.error_message = Some(message.clone());
        }
        Expression::ParseError { message }
    }

    fn term(&mut self) -> Expression {
        let left = self.product();

        if self.matches(&[TokenKind::Plus, TokenKind::Minus]) {
            let op = self.advance();
            let right = self.term();
            return Expression::binary(left, op, right);
        }

        left
    }

    fn product(&mut self) -> Expression {
        let left = self.unary();

        if self.matches(&[TokenKind::Dot]) {
            let op = self.advance();
            let right = self.product();
            return Expression::binary(left, op, right);
        }

        if !self.matches(&IMPLICIT_FACTOR_START) {
            return left;
        }

        let mut chain = left;
        while self.matches(&IMPLICIT_FACTOR_START) {
            let op = Token::new(TokenKind::Dot, self.tokens[self.pos].offset);
            let factor = self.implicit_factor();
            chain = Expression::binary(chain, op, factor);
        }

        if self.implicit_products == ImplicitProducts::Exponent && self.matches(&[TokenKind::Dot]) {
            let op = self.advance();
            let right = self.product();
            return Expression::binary(chain, op, right);
        }

        chain
    }

    /// One factor of an implicit chain. Cursor is on an `IMPLICIT_FACTOR_START` token.
    fn implicit_factor(&mut self) -> Expression {
        match self.implicit_products {
            ImplicitProducts::Exponent => self.exponent(),
            ImplicitProducts::Primary if self.matches(&TokenKind::FUNCTIONS) => self.func(),
            ImplicitProducts::Primary => self.primary(),
        }
    }

    fn unary(&mut self) -> Expression {
        if self.matches(&[TokenKind::Minus]) {
            let op = self.advance();
            let inner = self.unary();
            return Expression::unary(op, inner);
        }

        self.exponent()
    }

    fn exponent(&mut self) -> Expression {
        let base = self.quotient();

        if self.matches(&[TokenKind::Caret]) {
            let op = self.advance();
            let exp = self.exponent();
            return Expression::binary(base, op, exp);
        }

        base
    }

    fn quotient(&mut self) -> Expression {
        if self.matches(&[TokenKind::Fraction]) {
            let op = self.advance();
            let numerator = self.quotient();
            let denominator = self.quotient();
            return Expression::binary(numerator, op, denominator);
        }

        self.func()
    }

    fn func(&mut self) -> Expression {
        if self.matches(&TokenKind::FUNCTIONS) {
            let op = self.advance();
            let inner = self.func();
            return Expression::unary(op, inner);
        }

        self.primary()
    }

    fn primary(&mut self) -> Expression {
        let Some(kind) = self.peek().map(|t| t.kind) else {
            let message = format!("invalid syntax at end of input (token {})", self.pos);
            return self.error(message);
        };

        match kind {
            TokenKind::Real | TokenKind::Imaginary => Expression::Literal {
                value: self.advance(),
            },
            TokenKind::Identifier | TokenKind::Parameter => Expression::Variable {
                identifier: self.advance(),
            },
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.term();
                self.close_group(inner)
            }
            _ => {
                let message = format!(
                    "invalid syntax at token {} (character {})",
                    self.pos, self.tokens[self.pos].offset
                );
                self.error(message)
            }
        }
    }

    fn close_group(&mut self, inner: Expression) -> Expression {
        match self.grouping {
            GroupingMode::Lenient => {
                if !self.is_at_end() {
                    self.advance();
                }
                inner
            }
            GroupingMode::Strict => {
                if self.matches(&[TokenKind::RightParen]) {
                    self.advance();
                    inner
                } else {
                    let message = match self.peek() {
                        Some(token) => format!(
                            "expected closing delimiter at token {} (character {})",
                            self.pos, token.offset
                        ),
                        None => "expected closing delimiter at end of input".to_string(),
                    };
                    self.error(message)
                }
            }
        }
    }
}

/// Parse a token sequence with the given grouping mode.
pub fn parse(tokens: Vec<Token>, grouping: GroupingMode) -> Parsed {
    Parser::new(tokens).with_grouping(grouping).parse()
}

/// Parse a token sequence with every parser option from `config`.
pub fn parse_with_config(tokens: Vec<Token>, config: &ParserConfig) -> Parsed {
    Parser::new(tokens)
        .with_grouping(config.grouping)
        .with_implicit_products(config.implicit_products)
        .parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use fractus_core::ParametersConfig;

    fn parse_with(src: &str, grouping: GroupingMode) -> Parsed {
        let parameters = ParametersConfig::default().names;
        let lexed = tokenize(src, &parameters);
        parse(lexed.tokens, grouping)
    }

    fn ast(src: &str) -> String {
        let parsed = parse_with(src, GroupingMode::Lenient);
        assert!(parsed.valid, "{} failed: {:?}", src, parsed.error_message);
        parsed.ast.to_string()
    }

    #[test]
    fn test_single_literal() {
        assert_eq!(ast("0"), "{REAL: 0}");
    }

    #[test]
    fn test_addition_is_right_leaning() {
        assert_eq!(
            ast("a+b+d"),
            "PLUS[{IDENTIFIER: a}, PLUS[{IDENTIFIER: b}, {IDENTIFIER: d}]]"
        );
    }

    #[test]
    fn test_exponent_is_right_associative() {
        assert_eq!(
            ast("2^3^2"),
            "CARET[{REAL: 2}, CARET[{REAL: 3}, {REAL: 2}]]"
        );
    }

    #[test]
    fn test_implicit_multiplication_is_left_leaning() {
        assert_eq!(
            ast("2xy"),
            "DOT[DOT[{REAL: 2}, {PARAMETER: x}], {IDENTIFIER: y}]"
        );
    }

    #[test]
    fn test_implicit_and_explicit_products_differ() {
        assert_eq!(ast("2a"), "DOT[{REAL: 2}, {IDENTIFIER: a}]");
        assert_eq!(ast("a\\cdot 2"), "DOT[{IDENTIFIER: a}, {REAL: 2}]");
    }

    fn ast_with(src: &str, config: &ParserConfig) -> Parsed {
        let parameters = ParametersConfig::default().names;
        parse_with_config(tokenize(src, &parameters).tokens, config)
    }

    #[test]
    fn test_implicit_factor_is_a_single_primary() {
        // The trailing `^2` is not part of the chain.
        assert_eq!(ast("2z^2"), "DOT[{REAL: 2}, {PARAMETER: z}]");
        let strict = parse_with("2z^2", GroupingMode::Strict);
        assert!(!strict.valid);
        assert_eq!(
            strict.error_message.as_deref(),
            Some("unexpected CARET at token 2")
        );
    }

    #[test]
    fn test_implicit_function_factor_stops_at_its_argument() {
        assert_eq!(
            ast("a\\sin b^2"),
            "DOT[{IDENTIFIER: a}, SIN[{IDENTIFIER: b}]]"
        );
    }

    #[test]
    fn test_explicit_dot_after_implicit_chain_is_not_consumed() {
        assert_eq!(
            ast("2a\\cdot b"),
            "DOT[{REAL: 2}, {IDENTIFIER: a}]"
        );
        assert!(!parse_with("2a\\cdot b", GroupingMode::Strict).valid);
    }

    #[test]
    fn test_exponent_level_implicit_products() {
        let config = ParserConfig {
            implicit_products: ImplicitProducts::Exponent,
            ..ParserConfig::default()
        };
        assert_eq!(
            ast_with("2z^2", &config).ast.to_string(),
            "DOT[{REAL: 2}, CARET[{PARAMETER: z}, {REAL: 2}]]"
        );
        assert_eq!(
            ast_with("2a\\cdot b", &config).ast.to_string(),
            "DOT[DOT[{REAL: 2}, {IDENTIFIER: a}], {IDENTIFIER: b}]"
        );
        assert_eq!(
            ast_with("a\\sin b^2", &config).ast.to_string(),
            "DOT[{IDENTIFIER: a}, CARET[SIN[{IDENTIFIER: b}], {REAL: 2}]]"
        );
    }

    #[test]
    fn test_implicit_function_operand() {
        assert_eq!(
            ast("a\\sin b"),
            "DOT[{IDENTIFIER: a}, SIN[{IDENTIFIER: b}]]"
        );
    }

    #[test]
    fn test_stacked_functions() {
        assert_eq!(
            ast("\\sin\\cos a"),
            "SIN[COS[{IDENTIFIER: a}]]"
        );
    }

    #[test]
    fn test_fraction_is_prefix() {
        assert_eq!(
            ast("\\frac{1}{z^2}+a"),
            "PLUS[FRACTION[{REAL: 1}, CARET[{PARAMETER: z}, {REAL: 2}]], {IDENTIFIER: a}]"
        );
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(ast("-a"), "MINUS[{IDENTIFIER: a}]");
        assert_eq!(ast("--a"), "MINUS[MINUS[{IDENTIFIER: a}]]");
        assert_eq!(
            ast("a-b"),
            "MINUS[{IDENTIFIER: a}, {IDENTIFIER: b}]"
        );
    }

    #[test]
    fn test_leading_plus_is_an_error() {
        let parsed = parse_with("+a", GroupingMode::Lenient);
        assert!(!parsed.valid);
    }

    #[test]
    fn test_groups() {
        assert_eq!(
            ast("\\left(a+b\\right)c"),
            "DOT[PLUS[{IDENTIFIER: a}, {IDENTIFIER: b}], {PARAMETER: c}]"
        );
    }

    #[test]
    fn test_imaginary_literal() {
        assert_eq!(ast("3i"), "{IMAGINARY: 3}");
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let parsed = parse_with("", GroupingMode::Lenient);
        assert!(!parsed.valid);
        assert_eq!(
            parsed.error_message.as_deref(),
            Some("invalid syntax at end of input (token 0)")
        );
        assert!(matches!(parsed.ast, Expression::ParseError { .. }));
    }

    #[test]
    fn test_errors_in_siblings_keep_first_message() {
        let parsed = parse_with("\\frac{}{}", GroupingMode::Lenient);
        assert!(!parsed.valid);
        assert_eq!(
            parsed.error_message.as_deref(),
            Some("invalid syntax at token 2 (character 6)")
        );
        if let Expression::Binary { left, right, .. } = &parsed.ast {
            assert!(!left.is_valid());
            assert!(!right.is_valid());
        } else {
            panic!("Expected fraction node");
        }
    }

    #[test]
    fn test_into_result() {
        let err = parse_with("a+", GroupingMode::Lenient)
            .into_result("iteration step")
            .unwrap_err();
        assert!(err.to_string().contains("iteration step"));
        assert!(parse_with("a", GroupingMode::Lenient)
            .into_result("iteration step")
            .is_ok());
    }

    #[test]
    fn test_lenient_group_skips_any_closer() {
        // The token after the group is consumed whatever it is.
        assert_eq!(ast("{a+b"), "PLUS[{IDENTIFIER: a}, {IDENTIFIER: b}]");
        assert_eq!(ast("{a{b"), "DOT[{IDENTIFIER: a}, {IDENTIFIER: b}]");
    }

    #[test]
    fn test_strict_group_requires_closer() {
        let parsed = parse_with("{a+b", GroupingMode::Strict);
        assert!(!parsed.valid);
        assert_eq!(
            parsed.error_message.as_deref(),
            Some("expected closing delimiter at end of input")
        );
        assert!(parse_with("{a+b}", GroupingMode::Strict).valid);
    }

    #[test]
    fn test_trailing_tokens() {
        let lenient = parse_with("a}", GroupingMode::Lenient);
        assert!(lenient.valid);
        let strict = parse_with("a}", GroupingMode::Strict);
        assert!(!strict.valid);
        assert_eq!(
            strict.error_message.as_deref(),
            Some("unexpected RIGHT_PAREN at token 1")
        );
    }

    #[test]
    fn test_presets_parse() {
        for src in [
            "z^2+a\\left(\\cos\\left(t\\right)+i\\sin\\left(t\\right)\\right)",
            "\\frac{1}{4}\\sin\\left(z^2+\\ln\\left(z\\right)+\\cos\\left(2t\\right)+i\\sin\\left(2t\\right)\\right)",
            "z^x+z^z",
        ] {
            assert!(parse_with(src, GroupingMode::Strict).valid, "{}", src);
        }
    }

    #[test]
    fn test_deterministic() {
        let src = "\\frac{1}{z^2} + a\\sin x";
        assert_eq!(
            parse_with(src, GroupingMode::Lenient),
            parse_with(src, GroupingMode::Lenient)
        );
    }
}
