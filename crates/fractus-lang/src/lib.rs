pub mod lexer;
pub mod ast;
pub mod parser;
pub mod variables;
pub mod codegen;
pub mod shader;
pub mod uniforms;
pub mod session;
pub mod presets;
pub mod eval;

pub use ast::Expression;
pub use lexer::{tokenize, LexOutput, Token, TokenKind};
pub use parser::{parse, parse_with_config, Parsed};
pub use session::{CompiledShader, Session};
pub use uniforms::{pack_uniforms, FrameUniforms};
pub use variables::{UserVariable, VariableTable};

use fractus_core::{FractusConfig, FractusResult};

/// Compile an initial value and an iteration step into WGSL with the
/// default configuration.
pub fn compile(initial: &str, step: &str) -> FractusResult<String> {
    let mut session = Session::new(FractusConfig::default());
    let shader = session.compile(initial, step)?;
    Ok(shader.source.clone())
}
