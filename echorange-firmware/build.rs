//! Build script for echorange-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates ranging.toml at compile time
//! - Generates the `RANGING` configuration constant from it

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sensor minimum trigger pulse
const MIN_TRIGGER_PULSE_US: i64 = 10;

/// Panel height of the 128x32 OLED
const PANEL_HEIGHT: i64 = 32;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    setup_linker(&out_dir);
    let config = validate_config();
    generate_config(&out_dir, &config);
}

/// Set up linker search paths and scripts
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Values read from ranging.toml
struct Ranging {
    period_ms: i64,
    pulse_width_us: i64,
    receive_timeout_ms: i64,
    publish_timeout_ms: i64,
    max_pulse_width_us: i64,
    stale_timeout_limit: i64,
    readiness_timeout_ms: i64,
    sample_timeout_ms: i64,
    max_range_cm: f64,
    text_scale: i64,
    bar_y: i64,
}

/// Validate ranging.toml at compile time
fn validate_config() -> Ranging {
    // Re-run if ranging.toml changes
    println!("cargo:rerun-if-changed=ranging.toml");

    let config_path = Path::new("ranging.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: ranging.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a ranging.toml configuration file.        ║\n\
            ║  Please create one in the echorange-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read ranging.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in ranging.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let ranging = Ranging {
        period_ms: integer(&config, "trigger", "period_ms", &mut errors),
        pulse_width_us: integer(&config, "trigger", "pulse_width_us", &mut errors),
        receive_timeout_ms: integer(&config, "echo", "receive_timeout_ms", &mut errors),
        publish_timeout_ms: integer(&config, "echo", "publish_timeout_ms", &mut errors),
        max_pulse_width_us: integer(&config, "echo", "max_pulse_width_us", &mut errors),
        stale_timeout_limit: integer(&config, "echo", "stale_timeout_limit", &mut errors),
        readiness_timeout_ms: integer(&config, "display", "readiness_timeout_ms", &mut errors),
        sample_timeout_ms: integer(&config, "display", "sample_timeout_ms", &mut errors),
        max_range_cm: float(&config, "display", "max_range_cm", &mut errors),
        text_scale: integer(&config, "display", "text_scale", &mut errors),
        bar_y: integer(&config, "display", "bar_y", &mut errors),
    };

    if errors.is_empty() {
        check_ranges(&ranging, &mut errors);
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in ranging.toml                           ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=ranging.toml validated successfully");
    ranging
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn lookup<'a>(
    config: &'a toml::Value,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::Value> {
    let Some(table) = config.get(section) else {
        let msg = format!("Missing [{}] section", section);
        if !errors.contains(&msg) {
            errors.push(msg);
        }
        return None;
    };
    let value = table.get(key);
    if value.is_none() {
        errors.push(format!("[{}] missing '{}'", section, key));
    }
    value
}

fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> i64 {
    match lookup(config, section, key, errors) {
        Some(toml::Value::Integer(v)) => *v,
        Some(_) => {
            errors.push(format!("[{}] '{}' must be an integer", section, key));
            0
        }
        None => 0,
    }
}

fn float(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> f64 {
    match lookup(config, section, key, errors) {
        Some(toml::Value::Float(v)) => *v,
        Some(toml::Value::Integer(v)) => *v as f64,
        Some(_) => {
            errors.push(format!("[{}] '{}' must be a number", section, key));
            0.0
        }
        None => 0.0,
    }
}

fn check_ranges(r: &Ranging, errors: &mut Vec<String>) {
    let u32_fields = [
        ("trigger.period_ms", r.period_ms),
        ("trigger.pulse_width_us", r.pulse_width_us),
        ("echo.receive_timeout_ms", r.receive_timeout_ms),
        ("echo.publish_timeout_ms", r.publish_timeout_ms),
        ("echo.max_pulse_width_us", r.max_pulse_width_us),
        ("display.readiness_timeout_ms", r.readiness_timeout_ms),
        ("display.sample_timeout_ms", r.sample_timeout_ms),
    ];
    for (name, value) in u32_fields {
        if value <= 0 || value > u32::MAX as i64 {
            errors.push(format!("{} must be between 1 and {}", name, u32::MAX));
        }
    }

    if r.pulse_width_us < MIN_TRIGGER_PULSE_US {
        errors.push(format!(
            "trigger.pulse_width_us must be at least {}",
            MIN_TRIGGER_PULSE_US
        ));
    }
    if r.pulse_width_us >= r.period_ms.saturating_mul(1000) {
        errors.push("trigger.pulse_width_us must be shorter than period_ms".to_string());
    }
    if !(1..=255).contains(&r.stale_timeout_limit) {
        errors.push("echo.stale_timeout_limit must be between 1 and 255".to_string());
    }
    if !r.max_range_cm.is_finite() || r.max_range_cm <= 0.0 {
        errors.push("display.max_range_cm must be a positive number".to_string());
    }
    if !(1..=2).contains(&r.text_scale) {
        errors.push("display.text_scale must be 1 or 2".to_string());
    }
    if !(0..PANEL_HEIGHT).contains(&r.bar_y) {
        errors.push(format!("display.bar_y must be between 0 and {}", PANEL_HEIGHT - 1));
    }
}

/// Write `$OUT_DIR/ranging_config.rs`
fn generate_config(out_dir: &Path, r: &Ranging) {
    let code = format!(
        "/// Ranging configuration generated from ranging.toml\n\
        pub const RANGING: RangingConfig = RangingConfig {{\n    \
            trigger: TriggerConfig {{\n        \
                period_ms: {},\n        \
                pulse_width_us: {},\n    \
            }},\n    \
            echo: EchoConfig {{\n        \
                receive_timeout_ms: {},\n        \
                publish_timeout_ms: {},\n        \
                max_pulse_width_us: {},\n        \
                stale_timeout_limit: {},\n    \
            }},\n    \
            display: DisplayConfig {{\n        \
                readiness_timeout_ms: {},\n        \
                sample_timeout_ms: {},\n        \
                max_range_cm: {:?}_f32,\n        \
                text_scale: {},\n        \
                bar_y: {},\n    \
            }},\n\
        }};\n",
        r.period_ms,
        r.pulse_width_us,
        r.receive_timeout_ms,
        r.publish_timeout_ms,
        r.max_pulse_width_us,
        r.stale_timeout_limit,
        r.readiness_timeout_ms,
        r.sample_timeout_ms,
        r.max_range_cm,
        r.text_scale,
        r.bar_y,
    );

    fs::write(out_dir.join("ranging_config.rs"), code).unwrap();
}
