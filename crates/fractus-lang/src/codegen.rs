use fractus_core::{FractusError, FractusResult, ParametersConfig};

use crate::ast::Expression;
use crate::lexer::{Token, TokenKind};
use crate::variables::VariableTable;

/// Renders expressions as WGSL over `vec2<f32>` complex numbers.
pub struct Codegen<'a> {
    variables: &'a VariableTable,
}

impl<'a> Codegen<'a> {
    pub fn new(variables: &'a VariableTable) -> Self {
        Self { variables }
    }

    pub fn generate(&self, expr: &Expression) -> FractusResult<String> {
        match expr {
            Expression::Unary { op, inner } => {
                let inner = self.generate(inner)?;
                match op.kind {
                    TokenKind::Minus => Ok(format!("-({})", inner)),
                    kind => Ok(format!("{}({})", function_name(kind, op)?, inner)),
                }
            }
            Expression::Binary { left, op, right } => {
                let left = self.generate(left)?;
                let right = self.generate(right)?;
                match op.kind {
                    TokenKind::Plus => Ok(format!("({}) + ({})", left, right)),
                    TokenKind::Minus => Ok(format!("({}) - ({})", left, right)),
                    TokenKind::Dot => Ok(format!("complex_mult({}, {})", left, right)),
                    TokenKind::Fraction => Ok(format!("complex_div({}, {})", left, right)),
                    TokenKind::Caret => Ok(format!("complex_pow({}, {})", left, right)),
                    _ => Err(unexpected(op, "binary operator")),
                }
            }
            Expression::Literal { value } => {
                let number = float_literal(parse_number(value)?);
                match value.kind {
                    TokenKind::Real => Ok(format!("vec2<f32>({}, 0.0)", number)),
                    TokenKind::Imaginary => Ok(format!("vec2<f32>(0.0, {})", number)),
                    _ => Err(unexpected(value, "literal")),
                }
            }
            Expression::Variable { identifier } => match identifier.kind {
                TokenKind::Identifier => {
                    let var = self.variables.get(identifier.text()).ok_or_else(|| {
                        FractusError::Compile(format!(
                            "variable '{}' has no uniform slot",
                            identifier.text()
                        ))
                    })?;
                    Ok(format!("uniforms.u{}", var.id))
                }
                TokenKind::Parameter => Ok(parameter_reference(identifier.text())),
                _ => Err(unexpected(identifier, "variable")),
            },
            Expression::ParseError { message } => Err(FractusError::Compile(format!(
                "cannot generate code for invalid expression: {}",
                message
            ))),
        }
    }
}

fn function_name(kind: TokenKind, op: &Token) -> FractusResult<&'static str> {
    match kind {
        TokenKind::Sqrt => Ok("complex_sqrt"),
        TokenKind::Sin => Ok("complex_sin"),
        TokenKind::Cos => Ok("complex_cos"),
        TokenKind::Tan => Ok("complex_tan"),
        TokenKind::Log => Ok("complex_log"),
        TokenKind::Ln => Ok("complex_ln"),
        _ => Err(unexpected(op, "unary operator")),
    }
}

/// Live parameters read from the uniform struct; anything else is a symbol
/// the shader template declares itself.
fn parameter_reference(text: &str) -> String {
    match text {
        ParametersConfig::TIME | ParametersConfig::MOUSE_CONSTANT => format!("uniforms.{}", text),
        other => other.to_string(),
    }
}

/// Literals must fit the shader's `f32`.
fn parse_number(token: &Token) -> FractusResult<f64> {
    let value = token.text().parse::<f64>().map_err(|_| {
        FractusError::Compile(format!(
            "invalid numeric literal '{}' at character {}",
            token.text(),
            token.offset
        ))
    })?;
    if !(value as f32).is_finite() {
        return Err(FractusError::Compile(format!(
            "numeric literal '{}' at character {} is out of f32 range",
            token.text(),
            token.offset
        )));
    }
    Ok(value)
}

fn unexpected(token: &Token, position: &str) -> FractusError {
    FractusError::Compile(format!(
        "{} is not a valid {} (character {})",
        token.kind, position, token.offset
    ))
}

/// Format a number as a WGSL float literal, always with a decimal point.
pub(crate) fn float_literal(value: f64) -> String {
    let s = format!("{}", value);
    if s.contains('.') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use fractus_core::GroupingMode;

    fn ast(src: &str) -> Expression {
        let parameters = ParametersConfig::default().names;
        parse(tokenize(src, &parameters).tokens, GroupingMode::Lenient).ast
    }

    fn code(src: &str) -> String {
        let expr = ast(src);
        let mut table = VariableTable::new();
        table.reconcile(&ast("0"), &expr).unwrap();
        Codegen::new(&table).generate(&expr).unwrap()
    }

    #[test]
    fn test_mandelbrot_step() {
        assert_eq!(
            code("z^2+x"),
            "(complex_pow(z, vec2<f32>(2.0, 0.0))) + (x)"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(code("3"), "vec2<f32>(3.0, 0.0)");
        assert_eq!(code("0.25"), "vec2<f32>(0.25, 0.0)");
        assert_eq!(code("7."), "vec2<f32>(7.0, 0.0)");
        assert_eq!(code("2i"), "vec2<f32>(0.0, 2.0)");
    }

    #[test]
    fn test_live_parameters_read_uniforms() {
        assert_eq!(code("t"), "uniforms.t");
        assert_eq!(code("c"), "uniforms.c");
        assert_eq!(code("i"), "vec2<f32>(0.0, 1.0)");
    }

    #[test]
    fn test_identifiers_use_slots() {
        assert_eq!(
            code("a-b"),
            "(uniforms.u0) - (uniforms.u1)"
        );
    }

    #[test]
    fn test_functions_and_negation() {
        assert_eq!(code("-\\sqrt z"), "-(complex_sqrt(z))");
        assert_eq!(
            code("\\sin\\cos\\tan\\ln\\log z"),
            "complex_sin(complex_cos(complex_tan(complex_ln(complex_log(z)))))"
        );
    }

    #[test]
    fn test_products_and_fractions() {
        assert_eq!(code("2a"), "complex_mult(vec2<f32>(2.0, 0.0), uniforms.u0)");
        assert_eq!(
            code("a\\cdot 2"),
            "complex_mult(uniforms.u0, vec2<f32>(2.0, 0.0))"
        );
        assert_eq!(
            code("\\frac{1}{z}"),
            "complex_div(vec2<f32>(1.0, 0.0), z)"
        );
    }

    #[test]
    fn test_missing_variable_slot() {
        let table = VariableTable::new();
        let err = Codegen::new(&table).generate(&ast("a")).unwrap_err();
        assert!(err.to_string().contains("'a' has no uniform slot"));
    }

    #[test]
    fn test_parse_error_not_generated() {
        let table = VariableTable::new();
        let err = Codegen::new(&table).generate(&ast("z+")).unwrap_err();
        assert!(matches!(err, FractusError::Compile(_)));
    }

    #[test]
    fn test_literal_beyond_f32_range_rejected() {
        let huge = format!("1{}", "0".repeat(41));
        let expr = ast(&format!("z^2+x+{}", huge));
        let table = VariableTable::new();
        let err = Codegen::new(&table).generate(&expr).unwrap_err();
        assert!(err.to_string().contains("out of f32 range"));

        let largest = ast("340000000000000000000000000000000000000");
        assert!(Codegen::new(&table).generate(&largest).is_ok());
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(float_literal(4.0), "4.0");
        assert_eq!(float_literal(0.5), "0.5");
        assert_eq!(float_literal(-3.0), "-3.0");
    }
}
