use fractus_core::{FractusError, FractusResult};

/// A named pair of formulas with starting values for their variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub initial: &'static str,
    pub step: &'static str,
    /// `(name, real, imag)` seeds applied after compiling.
    pub variables: &'static [(&'static str, f32, f32)],
}

pub const PRESETS: [Preset; 8] = [
    Preset {
        name: "time-julia-set",
        initial: "x",
        step: r"z^2+a\left(\cos\left(t\right)+i\sin\left(t\right)\right)",
        variables: &[("a", 0.9, 0.0)],
    },
    Preset {
        name: "mouse-julia-set",
        initial: "ax",
        step: "z^2 + c",
        variables: &[("a", 1.0, 0.0)],
    },
    Preset {
        name: "star-julia",
        initial: "x",
        step: "z^5 + a",
        variables: &[("a", 0.765, 0.535)],
    },
    Preset {
        name: "inverse-julia",
        initial: "x",
        step: r"\frac{1}{z^2} + a",
        variables: &[("a", 0.016, 0.535)],
    },
    Preset {
        name: "mandelbrot-set",
        initial: "0",
        step: "z^2 + x",
        variables: &[],
    },
    Preset {
        name: "sine-mandelbrot",
        initial: "0",
        step: r"\sin\left(z^2+x\right)",
        variables: &[],
    },
    Preset {
        name: "moth",
        initial: "x",
        step: "z^x+z^z",
        variables: &[],
    },
    Preset {
        name: "web",
        initial: "x^5",
        step: r"\frac{1}{4}\sin\left(z^2+\ln\left(z\right)+\cos\left(2t\right)+i\sin\left(2t\right)\right)",
        variables: &[],
    },
];

pub fn find(name: &str) -> FractusResult<&'static Preset> {
    PRESETS
        .iter()
        .find(|preset| preset.name == name)
        .ok_or_else(|| FractusError::UnknownPreset(name.to_string()))
}
