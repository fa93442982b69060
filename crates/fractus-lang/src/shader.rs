use fractus_core::ShaderConfig;

use crate::codegen::float_literal;
use crate::variables::VariableTable;

/// Complex helpers over `vec2<f32>` (re, im).
const COMPLEX_LIBRARY: &str = "
fn complex_mult(a: vec2<f32>, b: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x);
}

fn complex_div(a: vec2<f32>, b: vec2<f32>) -> vec2<f32> {
    let d = dot(b, b);
    return vec2<f32>(a.x * b.x + a.y * b.y, a.y * b.x - a.x * b.y) / d;
}

fn complex_ln(a: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(log(length(a)), atan2(a.y, a.x));
}

fn complex_log(a: vec2<f32>) -> vec2<f32> {
    return complex_ln(a) / 2.302585092994046;
}

fn complex_pow(a: vec2<f32>, b: vec2<f32>) -> vec2<f32> {
    if (a.x == 0.0 && a.y == 0.0) {
        return vec2<f32>(0.0, 0.0);
    }
    let log_r = log(length(a));
    let theta = atan2(a.y, a.x);
    let magnitude = exp(b.x * log_r - b.y * theta);
    let angle = b.y * log_r + b.x * theta;
    return magnitude * vec2<f32>(cos(angle), sin(angle));
}

fn complex_sqrt(a: vec2<f32>) -> vec2<f32> {
    let r = length(a);
    var s: f32 = 1.0;
    if (a.y < 0.0) {
        s = -1.0;
    }
    return vec2<f32>(sqrt(max((r + a.x) * 0.5, 0.0)), s * sqrt(max((r - a.x) * 0.5, 0.0)));
}

fn complex_sin(a: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(sin(a.x) * cosh(a.y), cos(a.x) * sinh(a.y));
}

fn complex_cos(a: vec2<f32>) -> vec2<f32> {
    return vec2<f32>(cos(a.x) * cosh(a.y), -sin(a.x) * sinh(a.y));
}

fn complex_tan(a: vec2<f32>) -> vec2<f32> {
    return complex_div(complex_sin(a), complex_cos(a));
}
";

const VERTEX_STAGE: &str = "
@vertex
fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 0.0, 1.0);
}
";

/// Builds the full WGSL program around two generated expressions.
pub struct ShaderAssembler<'a> {
    config: &'a ShaderConfig,
}

impl<'a> ShaderAssembler<'a> {
    pub fn new(config: &'a ShaderConfig) -> Self {
        Self { config }
    }

    pub fn assemble(&self, initial_code: &str, step_code: &str, variables: &VariableTable) -> String {
        let mut wgsl = String::new();

        wgsl.push_str("// Fractus Generated Shader\n");
        wgsl.push_str(&format!(
            "const MAX_ITERATIONS: u32 = {}u;\n",
            self.config.max_iterations
        ));
        let radius = f64::from(self.config.escape_radius);
        wgsl.push_str(&format!(
            "const ESCAPE_RADIUS_SQ: f32 = {};\n",
            float_literal(radius * radius)
        ));

        wgsl.push_str(
            "
struct Uniforms {
    color: vec4<f32>,
    t: vec2<f32>,
    c: vec2<f32>,
    canvas: vec2<f32>,
    zoom: f32,
    iterations: f32,
    pan: vec2<f32>,
",
        );
        for (_name, var) in variables.iter() {
            wgsl.push_str(&format!("    u{}: vec2<f32>,\n", var.id));
        }
        wgsl.push_str("};\n@group(0) @binding(0) var<uniform> uniforms: Uniforms;\n");

        wgsl.push_str(VERTEX_STAGE);
        wgsl.push_str(COMPLEX_LIBRARY);

        wgsl.push_str("\nfn color_map(t: f32) -> vec3<f32> {\n");
        wgsl.push_str(self.config.color_map.snippet());
        wgsl.push_str("\n}\n");

        wgsl.push_str(
            "
@fragment
fn fs_main(@builtin(position) pos: vec4<f32>) -> @location(0) vec4<f32> {
    let uv = pos.xy / uniforms.canvas * 2.0 - 1.0;
    let aspect = uniforms.canvas.x / uniforms.canvas.y;
    let x = vec2<f32>((uv.x + uniforms.pan.x) * aspect, uv.y + uniforms.pan.y) * uniforms.zoom;

    var z = vec2<f32>(0.0, 0.0);
",
        );
        wgsl.push_str(&format!("    z = {};\n", initial_code));
        wgsl.push_str(
            "
    let limit = min(u32(uniforms.iterations), MAX_ITERATIONS);
    for (var n: u32 = 0u; n < limit; n = n + 1u) {
",
        );
        wgsl.push_str(&format!("        z = {};\n", step_code));
        wgsl.push_str(
            "        if (dot(z, z) > ESCAPE_RADIUS_SQ) {
            let smoothed = f32(n) + 1.0 - log2(log(length(z)));
            return vec4<f32>(color_map(smoothed / f32(limit)), 1.0);
        }
    }
    return uniforms.color;
}
",
        );

        wgsl
    }
}
