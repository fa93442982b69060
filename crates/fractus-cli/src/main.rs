use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use fractus_core::{ColorMap, FractusConfig};
use fractus_lang::presets::PRESETS;
use fractus_lang::{CompiledShader, Session, VariableTable};

#[derive(Parser)]
#[command(
    name = "fractus",
    version,
    about = "Fractus: compile escape-time fractal formulas to WGSL",
    long_about = "Fractus turns an initial value and an iteration step written in LaTeX-like\nmarkup into a complete WGSL shader for escape-time fractal rendering."
)]
struct Cli {
    /// Path to a fractus.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an initial value and an iteration step into WGSL
    Compile {
        /// Initial value of z, e.g. "0" or "x"
        initial: String,

        /// Iteration step, e.g. "z^2+x"
        step: String,

        /// Colour map: green, rainbow, viridis
        #[arg(long)]
        color_map: Option<String>,

        /// Write the shader to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the variable table and uniform length as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the token stream of a formula
    Tokens {
        markup: String,
    },
    /// Print the syntax tree of a formula
    Ast {
        markup: String,
    },
    /// List the built-in presets, or compile one by name
    Presets {
        name: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration to a file
    InitConfig {
        #[arg(default_value = "fractus.toml")]
        path: PathBuf,
    },
}

/// JSON summary of a compile.
#[derive(Serialize)]
struct CompileReport<'a> {
    variables: &'a VariableTable,
    uniform_len: usize,
    initial_code: &'a str,
    step_code: &'a str,
}

impl<'a> CompileReport<'a> {
    fn new(shader: &'a CompiledShader, variables: &'a VariableTable) -> Self {
        Self {
            variables,
            uniform_len: shader.uniform_len,
            initial_code: &shader.initial_code,
            step_code: &shader.step_code,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only shader text or JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compile {
            initial,
            step,
            color_map,
            output,
            json,
        } => cmd_compile(config, &initial, &step, color_map, output, json),
        Commands::Tokens { markup } => cmd_tokens(&config, &markup),
        Commands::Ast { markup } => cmd_ast(&config, &markup),
        Commands::Presets { name, json } => cmd_presets(config, name, json),
        Commands::InitConfig { path } => cmd_init_config(&path),
    }
}

fn load_config(path: Option<&Path>) -> Result<FractusConfig> {
    match path {
        Some(path) => FractusConfig::load_from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(FractusConfig::default()),
    }
}

fn cmd_compile(
    mut config: FractusConfig,
    initial: &str,
    step: &str,
    color_map: Option<String>,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    if let Some(name) = color_map {
        config.shader.color_map = name.parse::<ColorMap>()?;
    }

    let mut session = Session::new(config);
    session
        .compile(initial, step)
        .context("compilation failed")?;
    emit(&session, output, json)
}

fn cmd_tokens(config: &FractusConfig, markup: &str) -> Result<()> {
    let lexed = fractus_lang::tokenize(markup, &config.parameters.names);
    for token in &lexed.tokens {
        println!("{:>4}  {}", token.offset, token);
    }
    for diagnostic in &lexed.diagnostics {
        eprintln!("{}", diagnostic);
    }
    if let Some(failure) = lexed.failure {
        return Err(fractus_core::FractusError::from(failure).into());
    }
    Ok(())
}

fn cmd_ast(config: &FractusConfig, markup: &str) -> Result<()> {
    let lexed = fractus_lang::tokenize(markup, &config.parameters.names);
    if let Some(failure) = lexed.failure {
        return Err(fractus_core::FractusError::from(failure).into());
    }
    let parsed = fractus_lang::parse_with_config(lexed.tokens, &config.parser);
    println!("{}", parsed.ast);
    if let Some(message) = parsed.error_message {
        anyhow::bail!("invalid syntax: {}", message);
    }
    Ok(())
}

fn cmd_presets(config: FractusConfig, name: Option<String>, json: bool) -> Result<()> {
    let Some(name) = name else {
        for preset in PRESETS {
            println!("{:<16} z0 = {:<6} z -> {}", preset.name, preset.initial, preset.step);
        }
        return Ok(());
    };

    let mut session = Session::new(config);
    session
        .apply_preset(&name)
        .with_context(|| format!("failed to compile preset '{}'", name))?;
    emit(&session, None, json)
}

fn cmd_init_config(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    FractusConfig::default()
        .save_to_file(path)
        .with_context(|| format!("failed to write config: {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn emit(session: &Session, output: Option<PathBuf>, json: bool) -> Result<()> {
    let shader = session
        .shader()
        .context("no shader has been compiled")?;

    if json {
        let report = CompileReport::new(shader, session.variables());
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match output {
        Some(path) => {
            std::fs::write(&path, &shader.source)
                .with_context(|| format!("failed to write shader: {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => print!("{}", shader.source),
    }
    Ok(())
}
