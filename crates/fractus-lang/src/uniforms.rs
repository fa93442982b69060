use fractus_core::ShaderConfig;

use crate::variables::VariableTable;

/// Number of `f32`s in the fixed part of the uniform struct.
pub const HEADER_FLOATS: usize = 14;

/// The fixed leading fields of the `Uniforms` struct, laid out exactly as
/// WGSL sees them. Time is the complex `t`, so its imaginary half stays zero.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Colour of pixels that never escape.
    pub color: [f32; 4],
    pub time: f32,
    time_imag: f32,
    /// Mouse-driven constant.
    pub c: [f32; 2],
    pub canvas: [f32; 2],
    pub zoom: f32,
    /// Runtime iteration cap, clamped to the shader's compile-time bound.
    pub iterations: f32,
    pub pan: [f32; 2],
}

impl FrameUniforms {
    pub fn from_config(config: &ShaderConfig) -> Self {
        Self {
            color: config.non_escape_color,
            iterations: config.max_iterations as f32,
            ..Self::default()
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0, 1.0],
            time: 0.0,
            time_imag: 0.0,
            c: [0.0, 0.0],
            canvas: [800.0, 600.0],
            zoom: 2.0,
            iterations: 256.0,
            pan: [0.0, 0.0],
        }
    }
}

/// Total float count of the uniform buffer for `variable_count` user slots,
/// rounded up to the struct's 16-byte alignment.
pub fn uniform_len(variable_count: usize) -> usize {
    (HEADER_FLOATS + 2 * variable_count).div_ceil(4) * 4
}

/// Lay out `[header..., u0.re, u0.im, u1.re, u1.im, ...]` zero-padded to
/// [`uniform_len`].
pub fn pack_uniforms(frame: &FrameUniforms, variables: &VariableTable) -> Vec<f32> {
    let len = uniform_len(variables.len());
    let mut data = Vec::with_capacity(len);
    data.extend_from_slice(bytemuck::cast_slice::<FrameUniforms, f32>(
        std::slice::from_ref(frame),
    ));
    for (_name, var) in variables.iter() {
        data.push(var.real);
        data.push(var.imag);
    }
    data.resize(len, 0.0);
    data
}

/// Byte view for uploading to a GPU buffer.
pub fn as_bytes(data: &[f32]) -> &[u8] {
    bytemuck::cast_slice(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;
    use fractus_core::{GroupingMode, ParametersConfig};

    #[test]
    fn test_header_size_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), HEADER_FLOATS * 4);
    }

    #[test]
    fn test_uniform_len_rounds_to_vec4() {
        assert_eq!(uniform_len(0), 16);
        assert_eq!(uniform_len(1), 16);
        assert_eq!(uniform_len(2), 20);
        assert_eq!(uniform_len(3), 20);
    }

    #[test]
    fn test_pack_layout() {
        let parameters = ParametersConfig::default().names;
        let ast = |src: &str| parse(tokenize(src, &parameters).tokens, GroupingMode::Lenient).ast;
        let mut table = VariableTable::new();
        table.reconcile(&ast("0"), &ast("z^2+a+b")).unwrap();
        table.set_value("a", 0.5, 1.5).unwrap();
        table.set_value("b", -1.0, 2.0).unwrap();

        let mut frame = FrameUniforms::default();
        frame.time = 3.0;
        frame.c = [0.25, -0.25];
        frame.canvas = [1024.0, 768.0];
        frame.pan = [0.1, 0.2];

        let data = pack_uniforms(&frame, &table);
        assert_eq!(data.len(), 20);
        assert_eq!(&data[0..4], &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(&data[4..6], &[3.0, 0.0]);
        assert_eq!(&data[6..8], &[0.25, -0.25]);
        assert_eq!(&data[8..10], &[1024.0, 768.0]);
        assert_eq!(data[10], 2.0);
        assert_eq!(data[11], 256.0);
        assert_eq!(&data[12..14], &[0.1, 0.2]);
        assert_eq!(&data[14..18], &[0.5, 1.5, -1.0, 2.0]);
        assert_eq!(&data[18..20], &[0.0, 0.0]);
        assert_eq!(as_bytes(&data).len(), 80);
    }

    #[test]
    fn test_from_config() {
        let config = ShaderConfig {
            max_iterations: 64,
            non_escape_color: [1.0, 0.0, 0.0, 1.0],
            ..ShaderConfig::default()
        };
        let frame = FrameUniforms::from_config(&config);
        assert_eq!(frame.iterations, 64.0);
        assert_eq!(frame.color, [1.0, 0.0, 0.0, 1.0]);
    }
}
