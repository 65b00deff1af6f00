//! Carve CLI - query and simulate the built-in demo scene

use anyhow::{Context, Result};
use carve_core::{MovementConfig, MovementIntegrator, Sdf, SphereTracer, TraceConfig};
use carve_math::Fixie;
use carve_sdf::{Program, box3, cube, cylinder, ground, sphere, torus};
use clap::{Parser, Subcommand};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "carve")]
#[command(about = "Query and simulate compiled SDF scenes", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON settings file with `trace` and `movement` sections
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the demo scene's bytecode
    Disasm,

    /// Evaluate distance and normal at a point
    Eval {
        /// Query point as x,y,z
        #[arg(value_parser = parse_vec3, allow_hyphen_values = true)]
        point: Vec3,
    },

    /// Cast a ray and report the first surface
    Trace {
        /// Ray origin as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        from: Vec3,

        /// Point the ray aims through, as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        to: Vec3,
    },

    /// Soft-shadow visibility of a light from a point
    Shadow {
        /// Shaded point as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        from: Vec3,

        /// Light position as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        light: Vec3,

        /// Light radius; larger lights cast softer shadows
        #[arg(long, default_value = "0.1")]
        size: f32,
    },

    /// Step a body through the scene and print its path
    Simulate {
        /// Start position as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "-6,0.5,1")]
        position: Vec3,

        /// Initial velocity as x,y,z
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true, default_value = "4,0,-1")]
        velocity: Vec3,

        /// Timestep in seconds
        #[arg(long, default_value = "0.05")]
        dt: f32,

        /// Number of steps
        #[arg(short, long, default_value = "60")]
        steps: u32,
    },
}

/// Settings loaded from `--config`
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Settings {
    trace: TraceConfig,
    movement: MovementConfig,
}

impl Settings {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        settings.trace.validate()?;
        settings.movement.validate()?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    tracing::debug!(?settings, "loaded settings");

    let scene = demo_scene();
    let tracer = SphereTracer::new(settings.trace);

    match cli.command {
        Commands::Disasm => {
            println!("{scene}");
            println!(
                "; {} leaves, stack depth {}",
                scene.leaf_count(),
                scene.stack_depth()
            );
        }
        Commands::Eval { point } => {
            println!("distance: {:.6}", scene.distance(point));
            println!("normal:   {}", fmt_vec3(scene.gradient(point)));
        }
        Commands::Trace { from, to } => {
            let hit = tracer.trace(&scene, from, to);
            if hit.hit {
                println!(
                    "hit at {} after {:.4} ({} steps)",
                    fmt_vec3(hit.point),
                    hit.travel,
                    hit.steps
                );
                println!("normal: {}", fmt_vec3(scene.gradient(hit.point)));
            } else {
                println!("miss after {:.4} ({} steps)", hit.travel, hit.steps);
            }
        }
        Commands::Shadow { from, light, size } => {
            let visibility = tracer.light_trace(&scene, from, light, size);
            println!("visibility: {visibility:.4}");
        }
        Commands::Simulate {
            position,
            velocity,
            dt,
            steps,
        } => {
            let integrator = MovementIntegrator::try_new(settings.movement, settings.trace)?;
            run_simulation(&integrator, &scene, position, velocity, dt, steps);
        }
    }

    Ok(())
}

fn run_simulation(
    integrator: &MovementIntegrator,
    scene: &Program,
    position: Vec3,
    velocity: Vec3,
    dt: f32,
    steps: u32,
) {
    let mut position = Fixie::from_vec3(position);
    let mut velocity = velocity;

    println!("{:>5}  {:>30}  {:>30}", "step", "position", "velocity");
    for step in 0..=steps {
        println!(
            "{step:>5}  {:>30}  {:>30}",
            fmt_vec3(position.to_vec3()),
            fmt_vec3(velocity)
        );
        if step == steps {
            break;
        }
        (position, velocity) = integrator.step(scene, position, velocity, dt);
    }
}

/// Ground with a pillar, an arch and a carved block.
fn demo_scene() -> Program {
    let pillar = cylinder(1.0, 4.0)
        .blend_union(&sphere(1.6).translate(Vec3::new(0.0, 0.0, 2.0)), 0.3)
        .translate(Vec3::new(0.0, 0.0, 2.0));
    let arch = torus(4.0, 0.6)
        .rotate_x(std::f32::consts::FRAC_PI_2)
        .diff(&box3(6.0, 2.0, 3.0).translate(Vec3::new(0.0, 0.0, -1.5)))
        .translate(Vec3::new(4.0, 0.0, 0.0));
    let block = cube(2.0)
        .diff(&sphere(2.5))
        .rotate_z(0.4)
        .translate(Vec3::new(-3.0, 3.0, 1.0));

    ground()
        .blend_union(&pillar, 0.5)
        .union(&arch)
        .union(&block)
}

fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{s}'"));
    };
    let parse = |v: &str| {
        v.parse::<f32>()
            .map_err(|e| format!("invalid component '{v}': {e}"))
    };
    Ok(Vec3::new(parse(x)?, parse(y)?, parse(z)?))
}

fn fmt_vec3(v: Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1,-2.5, 3"), Ok(Vec3::new(1.0, -2.5, 3.0)));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,2,x").is_err());
    }

    #[test]
    fn test_demo_scene_is_valid() {
        let scene = demo_scene();
        assert_eq!(scene.validate(), Ok(()));
        // Above the pillar top
        assert!(scene.distance(Vec3::new(0.0, 0.0, 10.0)) > 0.0);
        // Inside the pillar
        assert!(scene.distance(Vec3::new(0.0, 0.0, 2.0)) < 0.0);
    }

    #[test]
    fn test_settings_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"movement": {"skin": 0.2}}"#).unwrap();
        assert_eq!(settings.movement.skin, 0.2);
        assert_eq!(settings.trace, TraceConfig::default());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["carve", "eval", "0,-1,2"]).unwrap();
        assert!(matches!(cli.command, Commands::Eval { point } if point == Vec3::new(0.0, -1.0, 2.0)));

        let cli = Cli::try_parse_from(["carve", "simulate", "--steps", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Simulate { steps: 3, .. }));
    }
}
