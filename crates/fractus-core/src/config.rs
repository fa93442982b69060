use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::color::ColorMap;
use crate::error::{FractusError, FractusResult};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Hard upper bound of the escape-time loop, baked into the shader.
    pub max_iterations: u32,
    pub escape_radius: f32,
    pub color_map: ColorMap,
    /// RGBA colour written for pixels that never escape.
    pub non_escape_color: [f32; 4],
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            max_iterations: 256,
            escape_radius: 2.0,
            color_map: ColorMap::default(),
            non_escape_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// How the parser treats the token that follows a parenthesised group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    /// Skip whatever token follows the group without checking it.
    #[default]
    Lenient,
    /// Require a closing delimiter and reject unconsumed trailing tokens.
    Strict,
}

/// What an implicit product such as `2x` or `a\sin b` folds onto its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImplicitProducts {
    /// One primary or function application per factor. `2z^2` stops after
    /// `2z` and a `\cdot` following the chain is left unconsumed.
    #[default]
    Primary,
    /// Factors parse at exponent level (`2z^2` is `2·(z^2)`) and a
    /// `\cdot` after the chain continues the product.
    Exponent,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ParserConfig {
    pub grouping: GroupingMode,
    pub implicit_products: ImplicitProducts,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ParametersConfig {
    /// Reserved identifier → substitution text.
    pub names: BTreeMap<String, String>,
}

impl ParametersConfig {
    pub const TIME: &'static str = "t";
    pub const MOUSE_CONSTANT: &'static str = "c";
}

impl Default for ParametersConfig {
    fn default() -> Self {
        let names = [
            ("x", "x"),
            ("t", Self::TIME),
            ("z", "z"),
            ("c", Self::MOUSE_CONSTANT),
            ("i", "vec2<f32>(0.0, 1.0)"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { names }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct FractusConfig {
    #[serde(default)]
    pub shader: ShaderConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
}

impl FractusConfig {
    pub fn load_from_file(path: &std::path::Path) -> FractusResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| FractusError::config(e.to_string(), path))
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> FractusResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| FractusError::config(e.to_string(), path))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
