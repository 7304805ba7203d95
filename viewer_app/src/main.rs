//! Headless scene viewer
//!
//! Loads a scene description, runs a number of frames against the recording
//! backend and logs what each frame submitted.
//!
//! ```text
//! scene_viewer <scene.json> [--config viewer.toml] [--frames N] [--shading phong]
//! ```

use std::path::PathBuf;

use clap::Parser;
use scene_engine::assets::FileSystemSource;
use scene_engine::core::config::{Config, ViewerConfig};
use scene_engine::foundation::logging;
use scene_engine::input::ViewerIntent;
use scene_engine::render::{RecordingBackend, ShadingMode};
use scene_engine::{ScriptedFrames, Viewer};

const DEFAULT_CONFIG: &str = "viewer.toml";
const DEFAULT_FRAMES: usize = 1;

/// Headless scene viewer
#[derive(Parser, Debug)]
#[command(name = "scene_viewer", version)]
struct Args {
    /// Scene description, relative to the configured assets directory
    scene: String,

    /// Viewer configuration file (TOML or RON)
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Number of frames to run
    #[arg(long, value_name = "N", default_value_t = DEFAULT_FRAMES)]
    frames: usize,

    /// Shading mode selected on the first frame
    #[arg(long, value_name = "MODE", value_parser = parse_shading)]
    shading: Option<ShadingMode>,
}

fn parse_shading(text: &str) -> Result<ShadingMode, String> {
    ShadingMode::ALL.into_iter().find(|mode| mode.name() == text).ok_or_else(|| {
        let names: Vec<_> = ShadingMode::ALL.iter().map(|mode| mode.name()).collect();
        format!("unknown shading mode '{}', expected one of: {}", text, names.join(", "))
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = ViewerConfig::load_or_default(&args.config)?;

    logging::init_with_filter(&config.engine.log_level);
    log::info!("Starting scene viewer for {}", args.scene);

    let assets = FileSystemSource::new(&config.assets.assets_dir);
    let mut viewer = Viewer::load(&assets, &args.scene, config)?;

    let mut frames = ScriptedFrames::idle(args.frames);
    if let Some(mode) = args.shading {
        let mut scripted: Vec<Vec<ViewerIntent>> = vec![vec![ViewerIntent::SelectShading(mode)]];
        scripted.extend(std::iter::repeat_with(Vec::new).take(args.frames.saturating_sub(1)));
        frames = ScriptedFrames::new(scripted);
    }

    let mut backend = RecordingBackend::new();
    match viewer.run(&mut frames, &mut backend) {
        Ok(summary) => {
            log::info!(
                "Rendered {} frames: {} nodes visited, {} draw calls, {} vertices, {} backend calls",
                summary.frames,
                summary.totals.nodes_visited,
                summary.totals.draw_calls,
                summary.totals.vertices_submitted,
                backend.calls().len()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Scene viewer failed: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("scene_viewer").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_defaults() {
        let args = parse(&["scenes/demo.json"]).unwrap();
        assert_eq!(args.scene, "scenes/demo.json");
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG));
        assert_eq!(args.frames, DEFAULT_FRAMES);
        assert_eq!(args.shading, None);
    }

    #[test]
    fn test_parse_flags() {
        let args = parse(&["--frames", "30", "demo.json", "--shading", "gouraud", "--config", "a.ron"]).unwrap();
        assert_eq!(args.scene, "demo.json");
        assert_eq!(args.frames, 30);
        assert_eq!(args.shading, Some(ShadingMode::Gouraud));
        assert_eq!(args.config, PathBuf::from("a.ron"));
    }

    #[test]
    fn test_parse_errors() {
        let kind = |args: &[&str]| parse(args).unwrap_err().kind();
        assert_eq!(kind(&[]), ErrorKind::MissingRequiredArgument);
        assert_eq!(kind(&["a.json", "--frames"]), ErrorKind::InvalidValue);
        assert_eq!(kind(&["a.json", "--frames", "many"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["a.json", "--shading", "toon"]), ErrorKind::ValueValidation);
        assert_eq!(kind(&["a.json", "b.json"]), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_every_shading_mode_parses_by_name() {
        for mode in ShadingMode::ALL {
            assert_eq!(parse_shading(mode.name()), Ok(mode));
        }
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
