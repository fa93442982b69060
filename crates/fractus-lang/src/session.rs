use fractus_core::{ColorMap, FractusConfig, FractusResult};

use crate::ast::Expression;
use crate::codegen::Codegen;
use crate::lexer::tokenize;
use crate::parser::parse_with_config;
use crate::presets::{self, Preset};
use crate::shader::ShaderAssembler;
use crate::uniforms::{self, FrameUniforms};
use crate::variables::VariableTable;

/// Output of a successful compile.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledShader {
    /// Complete WGSL module.
    pub source: String,
    /// Float count of the uniform buffer this shader expects.
    pub uniform_len: usize,
    pub initial_code: String,
    pub step_code: String,
}

/// Compiler state that persists across edits of the two formulas.
///
/// A compile either replaces both the variable table and the shader or
/// leaves them exactly as they were.
pub struct Session {
    config: FractusConfig,
    variables: VariableTable,
    shader: Option<CompiledShader>,
}

impl Session {
    pub fn new(config: FractusConfig) -> Self {
        Self {
            config,
            variables: VariableTable::new(),
            shader: None,
        }
    }

    pub fn config(&self) -> &FractusConfig {
        &self.config
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn shader(&self) -> Option<&CompiledShader> {
        self.shader.as_ref()
    }

    /// Compile an initial value and an iteration step into a shader.
    pub fn compile(&mut self, initial: &str, step: &str) -> FractusResult<&CompiledShader> {
        let initial_ast = self.parse_source(initial, "initial value")?;
        let step_ast = self.parse_source(step, "iteration step")?;

        let mut variables = self.variables.clone();
        variables.reconcile(&initial_ast, &step_ast)?;

        let codegen = Codegen::new(&variables);
        let initial_code = codegen.generate(&initial_ast)?;
        let step_code = codegen.generate(&step_ast)?;

        let source =
            ShaderAssembler::new(&self.config.shader).assemble(&initial_code, &step_code, &variables);
        let compiled = CompiledShader {
            source,
            uniform_len: uniforms::uniform_len(variables.len()),
            initial_code,
            step_code,
        };

        tracing::info!(
            "compiled shader: {} variables, {} bytes of WGSL",
            variables.len(),
            compiled.source.len()
        );
        self.variables = variables;
        Ok(&*self.shader.insert(compiled))
    }

    pub fn set_variable(&mut self, name: &str, real: f32, imag: f32) -> FractusResult<()> {
        self.variables.set_value(name, real, imag)
    }

    /// Swap the colour map, re-assembling the current shader if there is one.
    pub fn set_color_map(&mut self, color_map: ColorMap) {
        self.config.shader.color_map = color_map;
        if let Some(shader) = self.shader.as_mut() {
            shader.source = ShaderAssembler::new(&self.config.shader).assemble(
                &shader.initial_code,
                &shader.step_code,
                &self.variables,
            );
        }
    }

    /// Compile a preset by name and seed its variable values.
    pub fn apply_preset(&mut self, name: &str) -> FractusResult<&CompiledShader> {
        let preset: &Preset = presets::find(name)?;
        self.compile(preset.initial, preset.step)?;
        for &(var, real, imag) in preset.variables {
            self.variables.set_value(var, real, imag)?;
        }
        tracing::info!("applied preset '{}'", preset.name);
        self.shader
            .as_ref()
            .ok_or_else(|| fractus_core::FractusError::Compile("preset produced no shader".into()))
    }

    /// Frame state seeded from the shader configuration.
    pub fn frame_uniforms(&self) -> FrameUniforms {
        FrameUniforms::from_config(&self.config.shader)
    }

    pub fn pack_uniforms(&self, frame: &FrameUniforms) -> Vec<f32> {
        uniforms::pack_uniforms(frame, &self.variables)
    }

    fn parse_source(&self, source: &str, source_name: &str) -> FractusResult<Expression> {
        let lexed = tokenize(source, &self.config.parameters.names);
        if let Some(failure) = lexed.failure {
            return Err(failure.into());
        }
        parse_with_config(lexed.tokens, &self.config.parser).into_result(source_name)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(FractusConfig::default())
    }
}
