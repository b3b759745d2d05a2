use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use glam::DVec3;
use lookdev_core::anim::turntable::{env_light_rotation_track, orbit_tracks, FrameRange};
use lookdev_core::bounds::{analyze, BoundingBox};
use lookdev_core::config::schema::check_start_frame;
use lookdev_core::scene::{node_name, parent_path, MemorySceneGraph};
use lookdev_core::settings::SettingsCache;
use lookdev_core::{config, RigAssembler, RigConfig, Subject, VERSION};

#[derive(Parser, Debug)]
#[command(name = "lookdev", version = VERSION, about = "Procedural turntable look-dev rig")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, validate and print a rig config YAML
    Inspect { path: PathBuf },
    /// Print the rig plan for a subject as JSON
    Plan {
        #[command(flatten)]
        subject: SubjectArgs,
        #[command(flatten)]
        rig: RigArgs,
    },
    /// Build the rig into an in-memory scene and print a summary
    Build {
        #[command(flatten)]
        subject: SubjectArgs,
        #[command(flatten)]
        rig: RigArgs,
    },
    /// Print camera and environment light keys as CSV
    Tracks {
        #[command(flatten)]
        subject: SubjectArgs,
        #[command(flatten)]
        rig: RigArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct SubjectArgs {
    /// Subject bounds minimum, x,y,z
    #[arg(
        long,
        value_parser = parse_vec3,
        allow_hyphen_values = true,
        default_value = "-1,-1,-1"
    )]
    subject_min: DVec3,
    /// Subject bounds maximum, x,y,z
    #[arg(
        long,
        value_parser = parse_vec3,
        allow_hyphen_values = true,
        default_value = "1,1,1"
    )]
    subject_max: DVec3,
    #[arg(long, default_value = "/obj/subject")]
    subject_path: String,
}

impl SubjectArgs {
    fn subject(&self) -> Subject {
        Subject {
            path: self.subject_path.clone(),
            bounds: BoundingBox::from_min_max(self.subject_min, self.subject_max),
        }
    }
}

/// Overrides applied on top of the settings cache and `--config`.
#[derive(Args, Debug, Clone, Default)]
struct RigArgs {
    /// Rig config YAML; replaces the cached settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ignore and do not update the settings cache
    #[arg(long)]
    no_settings: bool,
    #[arg(long)]
    hdri: Option<PathBuf>,
    /// Initial orbit angle, degrees
    #[arg(long, allow_hyphen_values = true)]
    rotation_offset: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    hdri_rotation_offset: Option<f64>,
    #[arg(long)]
    no_sweep: bool,
    #[arg(long)]
    no_reference_kit: bool,
    #[arg(long)]
    macbeth: Option<PathBuf>,
    #[arg(long)]
    start_frame: Option<i32>,
}

impl RigArgs {
    fn resolve(&self, cache: &SettingsCache) -> Result<RigConfig> {
        let mut cfg = if self.no_settings {
            RigConfig::default()
        } else {
            cache.load()
        };
        if let Some(path) = &self.config {
            cfg = config::load_from_path(path)?;
        }
        if let Some(p) = &self.hdri {
            cfg.hdri_path = p.clone();
        }
        if let Some(v) = self.rotation_offset {
            cfg.rotation_offset = v;
        }
        if let Some(v) = self.hdri_rotation_offset {
            cfg.hdri_rotation_offset = v;
        }
        if self.no_sweep {
            cfg.sweep_enabled = false;
        }
        if self.no_reference_kit {
            cfg.add_reference_kit = false;
        }
        if let Some(p) = &self.macbeth {
            cfg.macbeth_path = p.clone();
        }
        if let Some(f) = self.start_frame {
            cfg.start_frame = f;
        }
        Ok(cfg)
    }
}

fn parse_vec3(s: &str) -> Result<DVec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [x, y, z] => Ok(DVec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got '{s}'")),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn tracks_csv(cfg: &RigConfig, bounds: &BoundingBox) -> Result<String> {
    check_start_frame(cfg.start_frame)?;
    let assembler = RigAssembler::new(cfg.clone());
    let orbit = assembler.orbit(&analyze(bounds));
    let cam = orbit_tracks(&orbit)?;
    let light = env_light_rotation_track(orbit.initial_angle_deg, orbit.start_frame)?;
    let mut out = String::from("frame,cam_tx,cam_ty,cam_tz,env_ry\n");
    for f in FrameRange::full(cfg.start_frame)?.frames() {
        let t = f as f64;
        let value = |v: Option<f64>| v.map(|v| format!("{v:.6}")).unwrap_or_default();
        out.push_str(&format!(
            "{f},{},{},{},{}\n",
            value(cam.tx.value_at(t)),
            value(cam.ty.value_at(t)),
            value(cam.tz.value_at(t)),
            value(light.value_at(t)),
        ));
    }
    Ok(out)
}

fn build(subject: &SubjectArgs, cfg: &RigConfig) -> Result<()> {
    let mut scene = MemorySceneGraph::new();
    let parent = parent_path(&subject.subject_path)
        .ok_or_else(|| anyhow!("invalid subject path {}", subject.subject_path))?;
    scene
        .add_geometry(parent, node_name(&subject.subject_path), subject.subject().bounds)
        .with_context(|| format!("placing subject at {}", subject.subject_path))?;

    let rig = RigAssembler::new(cfg.clone()).build(&mut scene, Some(&subject.subject_path))?;
    println!("Built turntable rig in {}", rig.paths.container);
    println!(
        "  camera: {} (distance {:.3})",
        rig.paths.camera, rig.bounds.camera_distance
    );
    println!("  control: {}", rig.paths.control);
    println!("  sweep: {}", if cfg.sweep_enabled { "on" } else { "off" });
    println!(
        "  reference kit: {}",
        if cfg.add_reference_kit { "on" } else { "off" }
    );
    for b in &rig.bindings {
        println!("  {}.{} <- {}", b.node, b.channel, b.expression());
    }
    println!("  nodes created: {}", rig.applied.created.len());
    println!("{}", serde_json::to_string_pretty(&rig.render_job)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let cache = SettingsCache::from_env();
    match cli.cmd {
        Command::Inspect { path } => {
            let cfg = config::load_from_path(&path)?;
            println!("Loaded rig config: {}", path.display());
            println!("  hdri: {}", cfg.hdri_path.display());
            println!(
                "  rotation offset: {:.1}°, hdri rotation offset: {:.1}°",
                cfg.rotation_offset, cfg.hdri_rotation_offset
            );
            println!(
                "  sweep: {}, reference kit: {}",
                cfg.sweep_enabled, cfg.add_reference_kit
            );
            println!("  macbeth: {}", cfg.macbeth_path.display());
            match FrameRange::full(cfg.start_frame) {
                Ok(frames) => println!("  frames: {}-{}", frames.start, frames.end),
                Err(e) => println!("  frames: {e}"),
            }
            match cfg.validate() {
                Ok(()) => println!("  valid"),
                Err(e) => println!("  invalid: {e}"),
            }
        }
        Command::Plan { subject, rig } => {
            let cfg = rig.resolve(&cache)?;
            let plan = RigAssembler::new(cfg).plan(&subject.subject())?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Build { subject, rig } => {
            let cfg = rig.resolve(&cache)?;
            build(&subject, &cfg)?;
            if !rig.no_settings {
                cache.save(&cfg);
            }
        }
        Command::Tracks { subject, rig } => {
            let cfg = rig.resolve(&cache)?;
            print!("{}", tracks_csv(&cfg, &subject.subject().bounds)?);
        }
    }
    Ok(())
}
