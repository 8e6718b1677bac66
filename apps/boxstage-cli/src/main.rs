mod script;

use anyhow::{Context, bail};
use boxstage_render::{DebugTextRenderer, FrameReport, RenderView, Renderer};
use boxstage_scene::{SceneComposer, SceneConfig, Snap};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boxstage-cli", about = "Headless tools for the box stage")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON scene description (defaults are used when omitted)
    #[arg(long, global = true)]
    scene: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the scene description as JSON
    DefaultScene,
    /// Replay a key/click script against the scene without a window
    Simulate {
        /// Tokens: down:<key> up:<key> frame[:n] click
        #[arg(short, long)]
        script: String,
        /// Seconds per simulated frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Print a report line after every frame
        #[arg(long)]
        trace_frames: bool,
        /// Jump straight to the scale target instead of springing
        #[arg(long)]
        snap: bool,
    },
}

fn load_scene(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("boxstage-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", boxstage_input::crate_info());
            println!("scene: {}", boxstage_scene::crate_info());
            println!("render: {}", boxstage_render::crate_info());
            let config = SceneConfig::default();
            println!(
                "default scene: box {:?} at {:?}, {} point lights, shadow map {}x{}",
                config.controllable.size.to_array(),
                config.controllable.position.to_array(),
                config.point_lights.len(),
                config.sun.shadow.map_width,
                config.sun.shadow.map_height
            );
        }
        Commands::DefaultScene => {
            let config = load_scene(cli.scene.as_deref())?;
            println!("{}", config.to_json_pretty()?);
        }
        Commands::Simulate {
            script,
            dt,
            trace_frames,
            snap,
        } => {
            if !(dt.is_finite() && dt > 0.0) {
                bail!("--dt must be a positive number of seconds, got {dt}");
            }
            let steps = script::parse(&script).context("parsing --script")?;
            let config = load_scene(cli.scene.as_deref())?;
            let view = RenderView::from_camera(&config.camera);

            let mut scene = SceneComposer::new(config);
            if snap {
                scene.mount_with(Box::new(Snap));
            } else {
                scene.mount();
            }
            tracing::debug!(steps = steps.len(), dt, "running script");

            let held = script::run(&steps, &mut scene, dt, |scene, input| {
                if trace_frames {
                    println!("{}", FrameReport::capture(scene, input));
                }
            });

            print!("{}", DebugTextRenderer::new().render(&scene, held, &view));
            scene.unmount();
        }
    }

    Ok(())
}
