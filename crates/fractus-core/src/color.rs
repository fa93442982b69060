use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FractusError;

/// Colour map applied to the normalised, smoothed escape count.
///
/// Each map is a WGSL function body receiving `t: f32` and returning a
/// `vec3<f32>` colour. It is substituted verbatim into the generated shader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMap {
    Green,
    #[default]
    Rainbow,
    Viridis,
    /// A user supplied WGSL function body.
    Custom(String),
}

impl ColorMap {
    /// All built-in maps, in display order.
    pub const BUILTIN: [ColorMap; 3] = [ColorMap::Green, ColorMap::Rainbow, ColorMap::Viridis];

    pub fn name(&self) -> &str {
        match self {
            ColorMap::Green => "green",
            ColorMap::Rainbow => "rainbow",
            ColorMap::Viridis => "viridis",
            ColorMap::Custom(_) => "custom",
        }
    }

    /// The WGSL body of `fn color_map(t: f32) -> vec3<f32>`.
    pub fn snippet(&self) -> &str {
        match self {
            ColorMap::Green => GREEN,
            ColorMap::Rainbow => RAINBOW,
            ColorMap::Viridis => VIRIDIS,
            ColorMap::Custom(body) => body,
        }
    }
}

impl FromStr for ColorMap {
    type Err = FractusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "green" => Ok(ColorMap::Green),
            "rainbow" => Ok(ColorMap::Rainbow),
            "viridis" => Ok(ColorMap::Viridis),
            _ => Err(FractusError::UnknownColorMap(s.to_string())),
        }
    }
}

const GREEN: &str = "    return 2.0 * mix(vec3<f32>(0.0, 0.0, 0.0), vec3<f32>(0.4, 0.8, 0.6), vec3<f32>(t));";

// HSV to RGB with the hue driven by t.
const RAINBOW: &str = "    let c = vec3<f32>(5.0 * t, 0.5, 1.0);
    let k = vec4<f32>(1.0, 2.0 / 3.0, 1.0 / 3.0, 3.0);
    let p = abs(fract(c.xxx + k.xyz) * 6.0 - k.www);
    return c.z * mix(k.xxx, clamp(p - k.xxx, vec3<f32>(0.0), vec3<f32>(1.0)), vec3<f32>(c.y));";

// Polynomial fit of matplotlib's viridis.
const VIRIDIS: &str = "    let s = t * 2.0;
    let c0 = vec3<f32>(0.274344, 0.004462, 0.331359);
    let c1 = vec3<f32>(0.108915, 1.397291, 1.388110);
    let c2 = vec3<f32>(-0.319631, 0.243490, 0.156419);
    let c3 = vec3<f32>(-4.629188, -5.882803, -19.646115);
    let c4 = vec3<f32>(6.181719, 14.388598, 57.442181);
    let c5 = vec3<f32>(4.876952, -13.955112, -66.125783);
    let c6 = vec3<f32>(-5.513165, 4.709245, 26.582180);
    return c0 + s * (c1 + s * (c2 + s * (c3 + s * (c4 + s * (c5 + s * c6)))));";
