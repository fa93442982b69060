use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A complex number, matching the shader's `vec2<f32>` (re, im) layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const I: Complex = Complex { re: 0.0, im: 1.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    pub fn zero() -> Self {
        Self { re: 0.0, im: 0.0 }
    }

    pub fn real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    pub fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn abs(&self) -> f64 {
        self.norm_sqr().sqrt()
    }

    pub fn arg(&self) -> f64 {
        self.im.atan2(self.re)
    }

    pub fn ln(&self) -> Complex {
        Complex::new(self.abs().ln(), self.arg())
    }

    /// Base-10 logarithm.
    pub fn log(&self) -> Complex {
        let ln = self.ln();
        let ln10 = 10f64.ln();
        Complex::new(ln.re / ln10, ln.im / ln10)
    }

    /// Principal power via polar form. A zero base yields zero.
    pub fn pow(&self, exp: Complex) -> Complex {
        if self.re == 0.0 && self.im == 0.0 {
            return Complex::zero();
        }
        let log_r = self.abs().ln();
        let theta = self.arg();
        let magnitude = (exp.re * log_r - exp.im * theta).exp();
        let angle = exp.im * log_r + exp.re * theta;
        Complex::new(magnitude * angle.cos(), magnitude * angle.sin())
    }

    pub fn sqrt(&self) -> Complex {
        let r = self.abs();
        let sign = if self.im < 0.0 { -1.0 } else { 1.0 };
        Complex::new(
            ((r + self.re) * 0.5).max(0.0).sqrt(),
            sign * ((r - self.re) * 0.5).max(0.0).sqrt(),
        )
    }

    pub fn sin(&self) -> Complex {
        Complex::new(self.re.sin() * self.im.cosh(), self.re.cos() * self.im.sinh())
    }

    pub fn cos(&self) -> Complex {
        Complex::new(self.re.cos() * self.im.cosh(), -self.re.sin() * self.im.sinh())
    }

    pub fn tan(&self) -> Complex {
        self.sin() / self.cos()
    }

    /// Component-wise closeness check.
    pub fn approx_eq(&self, other: &Complex, epsilon: f64) -> bool {
        (self.re - other.re).abs() <= epsilon && (self.im - other.im).abs() <= epsilon
    }
}

impl Default for Complex {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// Unguarded: dividing by zero gives non-finite parts, as on the GPU.
impl Div for Complex {
    type Output = Complex;
    fn div(self, rhs: Complex) -> Complex {
        let d = rhs.norm_sqr();
        Complex::new(
            (self.re * rhs.re + self.im * rhs.im) / d,
            (self.im * rhs.re - self.re * rhs.im) / d,
        )
    }
}

impl Neg for Complex {
    type Output = Complex;
    fn neg(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }
}
