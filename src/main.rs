//! Eye target — headless gaze simulation.
//!
//! Builds a scene from command-line mirrors and window cameras, sweeps a
//! viewer's head left and right, and reports every gaze strategy change.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use eye_target::clock::{Clock, SystemClock, TestClock};
use eye_target::gaze::{EyeTargetEngine, FreeEyeTarget, Quat, Vec3, ViewerFrame};
use eye_target::world::SceneWorld;

#[derive(Parser, Debug)]
#[command(name = "eye-target", about = "Headless gaze targeting simulation")]
struct Cli {
    /// Glass panel facing the viewer, as x,y,z (repeatable)
    #[arg(long, value_parser = parse_vec3)]
    mirror: Vec<Vec3>,

    /// Window camera position, as x,y,z (repeatable)
    #[arg(long, value_parser = parse_vec3)]
    camera: Vec<Vec3>,

    /// Number of ticks to simulate
    #[arg(long, default_value = "270")]
    ticks: u32,

    /// Tick rate in Hz
    #[arg(long, default_value = "90")]
    rate: f64,

    /// Peak head yaw of the left/right sweep, in degrees
    #[arg(long, default_value = "0")]
    sweep_deg: f32,

    /// Eye height of the viewer
    #[arg(long, default_value = "1.6")]
    eye_height: f32,

    /// Lock-on frustum half-angle in degrees
    #[arg(long)]
    half_angle: Option<f32>,

    /// Shake radius
    #[arg(long)]
    shake_radius: Option<f32>,

    /// Minimum seconds between shake refreshes
    #[arg(long)]
    shake_min: Option<f32>,

    /// Maximum seconds between shake refreshes
    #[arg(long)]
    shake_max: Option<f32>,

    /// Ignore mirrors
    #[arg(long)]
    no_mirrors: bool,

    /// Ignore window cameras
    #[arg(long)]
    no_cameras: bool,

    /// Seed for the shake generator
    #[arg(long)]
    seed: Option<u64>,

    /// Run against wall-clock time instead of a fixed step
    #[arg(long)]
    realtime: bool,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got '{}'", s));
    };
    let num = |v: &str| v.parse::<f32>().map_err(|e| format!("'{}': {}", v, e));
    Ok(Vec3::new(num(*x)?, num(*y)?, num(*z)?))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eye_target=info".into()),
        )
        .init();

    info!("eye-target v{} starting", env!("CARGO_PKG_VERSION"));

    if !(cli.rate.is_finite() && cli.rate > 0.0) {
        anyhow::bail!("--rate must be a positive number, got {}", cli.rate);
    }

    let mut world = SceneWorld::new();
    for m in &cli.mirror {
        // Face the panel toward the vertical axis through the viewer.
        let yaw = (-m.x).atan2(-m.z);
        world.add_glass(*m, Quat::from_yaw(yaw));
    }
    for c in &cli.camera {
        world.add_window_camera(*c);
    }
    info!(
        "scene: {} mirror(s), {} camera(s)",
        cli.mirror.len(),
        cli.camera.len()
    );

    let mut engine = EyeTargetEngine::new(world, FreeEyeTarget::default());
    if let Some(seed) = cli.seed {
        engine = engine.with_seed(seed);
    }
    engine.set_track_mirrors(!cli.no_mirrors);
    engine.set_track_window_cameras(!cli.no_cameras);
    if let Some(deg) = cli.half_angle {
        engine
            .set_frustum_half_angle_deg(deg)
            .context("invalid --half-angle")?;
    }
    if let Some(r) = cli.shake_radius {
        engine.set_shake_radius(r).context("invalid --shake-radius")?;
    }
    if let Some(s) = cli.shake_min {
        engine.set_shake_min_duration_s(s).context("invalid --shake-min")?;
    }
    if let Some(s) = cli.shake_max {
        engine.set_shake_max_duration_s(s).context("invalid --shake-max")?;
    }

    let head = Vec3::new(0.0, cli.eye_height, 0.0);
    let frame_at = |tick: u32| {
        let phase = tick as f32 / cli.ticks.max(1) as f32 * std::f32::consts::TAU;
        let yaw = cli.sweep_deg.to_radians() * phase.sin();
        ViewerFrame::centered(head, 0.064, Vec3::new(yaw.sin(), 0.0, yaw.cos()))
    };

    if !engine.activate(&frame_at(0)) {
        info!("nothing to look at; idle gaze only");
    }

    let test_clock = TestClock::new();
    let system_clock = SystemClock::new();
    let clock: &dyn Clock = if cli.realtime {
        &system_clock
    } else {
        &test_clock
    };
    let step = Duration::from_secs_f64(1.0 / cli.rate);

    let mut last = None;
    let mut final_aim = None;
    for tick in 0..cli.ticks {
        let Some(aim) = engine.tick_with_clock(clock, &frame_at(tick)) else {
            break;
        };
        if last != Some((aim.strategy, aim.target)) {
            println!(
                "t={:7.3}s  {:<6}  target={:<8}  aim=({:.3}, {:.3}, {:.3})",
                clock.now_s(),
                aim.strategy.as_str(),
                aim.target.map_or("-".to_string(), |id| id.0.to_string()),
                aim.point.x,
                aim.point.y,
                aim.point.z
            );
            last = Some((aim.strategy, aim.target));
        }
        final_aim = Some(aim);

        if cli.realtime {
            std::thread::sleep(step);
        } else {
            test_clock.advance(step);
        }
    }

    engine.deactivate();

    if let Some(aim) = final_aim {
        info!(
            "finished after {} tick(s); final strategy {}",
            cli.ticks,
            aim.strategy.as_str()
        );
    }
    Ok(())
}
