use fractus_core::{ColorMap, FractusConfig};
use fractus_lang::presets::PRESETS;
use fractus_lang::Session;

/// Parse and validate a WGSL module, panicking with naga's report on failure.
fn validate(source: &str) {
    let module = match naga::front::wgsl::parse_str(source) {
        Ok(module) => module,
        Err(err) => panic!(
            "WGSL parse failed:\n{}\n--- source ---\n{}",
            err.emit_to_string(source),
            source
        ),
    };
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    if let Err(err) = validator.validate(&module) {
        panic!("WGSL validation failed: {:?}\n--- source ---\n{}", err, source);
    }
}

#[test]
fn test_every_preset_validates() {
    let mut session = Session::default();
    for preset in PRESETS {
        let shader = session
            .apply_preset(preset.name)
            .unwrap_or_else(|e| panic!("preset {} failed: {}", preset.name, e));
        validate(&shader.source);
    }
}

#[test]
fn test_every_color_map_validates() {
    for map in ColorMap::BUILTIN {
        let mut config = FractusConfig::default();
        config.shader.color_map = map;
        let mut session = Session::new(config);
        let shader = session.compile("0", "z^2+x").unwrap();
        validate(&shader.source);
    }
}

#[test]
fn test_every_function_validates() {
    let mut session = Session::default();
    let step = r"\sqrt{z}+\sin{z}+\cos{z}+\tan{z}+\ln{z}+\log{z}-\frac{x}{z}\cdot 2.5i+a_{1}\alpha";
    let shader = session.compile("-x", step).unwrap().clone();
    assert_eq!(session.variables().len(), 2);
    validate(&shader.source);
}

#[test]
fn test_user_variables_extend_uniform_struct() {
    let mut session = Session::default();
    let shader = session.compile("x", "z^2+a+b+c").unwrap();
    assert!(shader.source.contains("    u0: vec2<f32>,\n    u1: vec2<f32>,\n};"));
    assert!(shader.step_code.contains("uniforms.u0"));
    assert!(shader.step_code.contains("uniforms.u1"));
    assert!(shader.step_code.contains("uniforms.c"));
    assert_eq!(shader.uniform_len, 20);
    validate(&shader.source);
}
