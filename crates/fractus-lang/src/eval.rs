use std::collections::HashMap;

use fractus_core::{Complex, FractusError, FractusResult, ParametersConfig};

use crate::ast::Expression;
use crate::lexer::TokenKind;
use crate::variables::VariableTable;

/// Values for one CPU evaluation: parameters keyed by substitution text,
/// user variables read from the table.
pub struct Environment<'a> {
    parameters: HashMap<String, Complex>,
    variables: &'a VariableTable,
}

impl<'a> Environment<'a> {
    pub fn new(variables: &'a VariableTable) -> Self {
        Self {
            parameters: HashMap::new(),
            variables,
        }
    }

    /// Bind every entry of the parameter dictionary. `x` and `z` take the
    /// given values, the time and mouse parameters take `time` and `c`, and
    /// the imaginary unit resolves to `i`.
    pub fn with_parameters(
        variables: &'a VariableTable,
        dictionary: &ParametersConfig,
        x: Complex,
        z: Complex,
        time: f64,
        c: Complex,
    ) -> Self {
        let mut env = Self::new(variables);
        for (name, substitution) in &dictionary.names {
            let value = match name.as_str() {
                "x" => x,
                "z" => z,
                "i" => Complex::I,
                ParametersConfig::TIME => Complex::real(time),
                ParametersConfig::MOUSE_CONSTANT => c,
                _ => continue,
            };
            env.bind(substitution, value);
        }
        env
    }

    pub fn bind(&mut self, substitution: &str, value: Complex) {
        self.parameters.insert(substitution.to_string(), value);
    }

    pub fn evaluate(&self, expr: &Expression) -> FractusResult<Complex> {
        match expr {
            Expression::Unary { op, inner } => {
                let a = self.evaluate(inner)?;
                match op.kind {
                    TokenKind::Minus => Ok(-a),
                    TokenKind::Sqrt => Ok(a.sqrt()),
                    TokenKind::Sin => Ok(a.sin()),
                    TokenKind::Cos => Ok(a.cos()),
                    TokenKind::Tan => Ok(a.tan()),
                    TokenKind::Log => Ok(a.log()),
                    TokenKind::Ln => Ok(a.ln()),
                    other => Err(FractusError::Compile(format!("{} is not a unary operator", other))),
                }
            }
            Expression::Binary { left, op, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                match op.kind {
                    TokenKind::Plus => Ok(l + r),
                    TokenKind::Minus => Ok(l - r),
                    TokenKind::Dot => Ok(l * r),
                    TokenKind::Fraction => Ok(l / r),
                    TokenKind::Caret => Ok(l.pow(r)),
                    other => Err(FractusError::Compile(format!("{} is not a binary operator", other))),
                }
            }
            Expression::Literal { value } => {
                let number: f64 = value.text().parse().map_err(|_| {
                    FractusError::Compile(format!("invalid numeric literal '{}'", value.text()))
                })?;
                match value.kind {
                    TokenKind::Imaginary => Ok(Complex::new(0.0, number)),
                    _ => Ok(Complex::real(number)),
                }
            }
            Expression::Variable { identifier } => match identifier.kind {
                TokenKind::Parameter => self
                    .parameters
                    .get(identifier.text())
                    .copied()
                    .ok_or_else(|| FractusError::UnknownVariable(identifier.text().to_string())),
                _ => self
                    .variables
                    .get(identifier.text())
                    .map(|var| Complex::new(f64::from(var.real), f64::from(var.imag)))
                    .ok_or_else(|| FractusError::UnknownVariable(identifier.text().to_string())),
            },
            Expression::ParseError { message } => Err(FractusError::Compile(format!(
                "cannot evaluate invalid expression: {}",
                message
            ))),
        }
    }
}

/// Iteration count at which the orbit of pixel `x` escapes, or `None` if it
/// stays bounded for `max_iterations` steps.
pub fn escape_time(
    initial: &Expression,
    step: &Expression,
    variables: &VariableTable,
    dictionary: &ParametersConfig,
    x: Complex,
    max_iterations: u32,
    escape_radius: f64,
) -> FractusResult<Option<u32>> {
    let radius_sq = escape_radius * escape_radius;
    let env = Environment::with_parameters(variables, dictionary, x, Complex::zero(), 0.0, Complex::zero());
    let mut z = env.evaluate(initial)?;

    for n in 0..max_iterations {
        let env = Environment::with_parameters(variables, dictionary, x, z, 0.0, Complex::zero());
        z = env.evaluate(step)?;
        if z.norm_sqr() > radius_sq {
            return Ok(Some(n));
        }
    }
    Ok(None)
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

    fn eval(src: &str, x: Complex, z: Complex) -> Complex {
        let table = VariableTable::new();
        let env = Environment::with_parameters(
            &table,
            &ParametersConfig::default(),
            x,
            z,
            0.0,
            Complex::zero(),
        );
        env.evaluate(&ast(src)).unwrap()
    }

    #[test]
    fn test_power_is_right_associative() {
        let value = eval("2^3^2", Complex::zero(), Complex::zero());
        assert!(value.approx_eq(&Complex::real(512.0), 1e-6));
    }

    #[test]
    fn test_implicit_and_explicit_products_agree() {
        let x = Complex::new(0.3, -1.2);
        let implicit = eval("2x", x, Complex::zero());
        let explicit = eval(r"x\cdot 2", x, Complex::zero());
        assert!(implicit.approx_eq(&explicit, 1e-12));
        assert!(implicit.approx_eq(&Complex::new(0.6, -2.4), 1e-12));
    }

    #[test]
    fn test_imaginary_unit_and_literal() {
        let unit = eval("i", Complex::zero(), Complex::zero());
        assert_eq!(unit, Complex::I);
        let literal = eval("3i", Complex::zero(), Complex::zero());
        assert_eq!(literal, Complex::new(0.0, 3.0));
    }

    #[test]
    fn test_user_variables() {
        let mut table = VariableTable::new();
        let step = ast("z^2+a");
        table.reconcile(&ast("x"), &step).unwrap();
        table.set_value("a", 0.5, 0.25).unwrap();
        let env = Environment::with_parameters(
            &table,
            &ParametersConfig::default(),
            Complex::zero(),
            Complex::real(1.0),
            0.0,
            Complex::zero(),
        );
        let value = env.evaluate(&step).unwrap();
        assert!(value.approx_eq(&Complex::new(1.5, 0.25), 1e-9));
    }

    #[test]
    fn test_parse_error_is_rejected() {
        let table = VariableTable::new();
        let env = Environment::new(&table);
        assert!(env.evaluate(&ast("")).is_err());
    }

    #[test]
    fn test_mandelbrot_escape_time() {
        let table = VariableTable::new();
        let params = ParametersConfig::default();
        let initial = ast("0");
        let step = ast("z^2+x");

        let inside = escape_time(&initial, &step, &table, &params, Complex::real(-1.0), 100, 2.0);
        assert_eq!(inside.unwrap(), None);

        let outside = escape_time(&initial, &step, &table, &params, Complex::real(3.0), 100, 2.0);
        assert_eq!(outside.unwrap(), Some(0));
    }
}
