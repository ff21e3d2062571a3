//! Gaze resolver — decides each tick where the eyes aim.
//!
//! Three mutually exclusive strategies, in strict precedence:
//! 1. `Locked`: a trackable object inside the gaze frustum.
//! 2. `MirrorGaze`: one's own reflection in the selected mirror.
//! 3. `Idle`: a point a short distance straight ahead.
//!
//! Scans run on their own cadence (see `schedule`) and always complete
//! before the resolve step of the same tick reads their results. A
//! shake offset is added to whichever strategy wins.

use tracing::{debug, info, trace, warn};

use super::geometry::{build_frustum, raycast_oriented_box, reflect_across_plane, Ray};
use super::math::{Quat, Vec3};
use super::registry::{CandidateRegistry, LockCandidate};
use super::schedule::ScanScheduler;
use super::shake::ShakeGenerator;
use crate::clock::Clock;
use crate::config::{ConfigError, EyeTargetConfig};
use crate::world::{ObjectId, TopologyNotifier, WorldQuery};

/// Distance ahead of the eyes for idle gaze.
pub const NATURAL_LOOK_DISTANCE: f32 = 0.4;
/// Width / height of the lock-on frustum.
pub const FRUSTUM_ASPECT_RATIO: f32 = 1.3;
pub const FRUSTUM_NEAR: f32 = 0.15;
pub const FRUSTUM_FAR: f32 = 10.0;
/// Maximum range of the mirror selection ray.
pub const MIRROR_RAY_RANGE: f32 = 20.0;
/// Half-size of the box used to test a trackable point against the frustum.
pub const CONTAINMENT_EPSILON: f32 = 0.0005;

// ── External eye-target controller ──────────────────────────

/// Look mode of the character's eye controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookMode {
    None,
    Player,
    Target,
    Custom,
}

impl LookMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Player => "player",
            Self::Target => "target",
            Self::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "player" => Some(Self::Player),
            "target" => Some(Self::Target),
            "custom" => Some(Self::Custom),
            _ => Option::None,
        }
    }
}

/// The host's eye-target control the engine drives while active.
pub trait EyeTargetControl {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn look_mode(&self) -> LookMode;
    fn set_look_mode(&mut self, mode: LookMode);
}

/// Plain in-memory eye target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeEyeTarget {
    pub position: Vec3,
    pub look_mode: LookMode,
}

impl Default for FreeEyeTarget {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            look_mode: LookMode::Player,
        }
    }
}

impl EyeTargetControl for FreeEyeTarget {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn look_mode(&self) -> LookMode {
        self.look_mode
    }

    fn set_look_mode(&mut self, mode: LookMode) {
        self.look_mode = mode;
    }
}

// ── Viewer frame ────────────────────────────────────────────

/// Per-tick viewer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerFrame {
    pub left_eye: Vec3,
    pub right_eye: Vec3,
    pub head_position: Vec3,
    /// Head forward direction; need not be normalized.
    pub forward: Vec3,
}

impl ViewerFrame {
    pub fn new(left_eye: Vec3, right_eye: Vec3, forward: Vec3) -> Self {
        Self {
            left_eye,
            right_eye,
            head_position: left_eye.midpoint(right_eye),
            forward,
        }
    }

    /// Frame for eyes symmetric about `center`, `ipd` apart along X.
    pub fn centered(center: Vec3, ipd: f32, forward: Vec3) -> Self {
        let half = Vec3::new(ipd * 0.5, 0.0, 0.0);
        Self::new(center - half, center + half, forward)
    }

    /// Forward is the head's local +Z axis.
    pub fn from_head_rotation(left_eye: Vec3, right_eye: Vec3, head_position: Vec3, rotation: Quat) -> Self {
        Self {
            left_eye,
            right_eye,
            head_position,
            forward: rotation.rotate(Vec3::FORWARD),
        }
    }

    pub fn eye_midpoint(&self) -> Vec3 {
        self.left_eye.midpoint(self.right_eye)
    }
}

// ── Output ──────────────────────────────────────────────────

/// Which strategy produced the aim point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeStrategy {
    Locked,
    MirrorGaze,
    Idle,
}

impl GazeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::MirrorGaze => "mirror",
            Self::Idle => "idle",
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeAim {
    pub point: Vec3,
    pub strategy: GazeStrategy,
    /// Locked object or looked-at mirror.
    pub target: Option<ObjectId>,
}

/// Mirror the viewer is deemed to look into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorSelection {
    pub id: ObjectId,
    /// Ray-hit (or single-mirror straight-line) distance; infinite for
    /// the closest-by-position fallback.
    pub hit_distance: f32,
}

/// Pick the mirror looked at from `eyes` along `forward`.
///
/// One mirror is always selected. With several, the closest ray hit wins
/// and the closest mirror by position is the fallback.
pub fn select_mirror<W: WorldQuery + ?Sized>(
    world: &W,
    mirrors: &[ObjectId],
    eyes: Vec3,
    forward: Vec3,
) -> Option<MirrorSelection> {
    if let [id] = mirrors {
        let collider = world.oriented_box(*id).filter(|c| c.center.is_finite())?;
        return Some(MirrorSelection {
            id: *id,
            hit_distance: eyes.distance(collider.center),
        });
    }

    let ray = Ray::new(eyes, forward);
    let mut hit: Option<MirrorSelection> = None;
    let mut closest: Option<(ObjectId, f32)> = None;
    for &id in mirrors {
        let Some(collider) = world.oriented_box(id).filter(|c| c.center.is_finite()) else {
            continue;
        };
        let distance = eyes.distance(collider.center);
        if closest.map_or(true, |(_, d)| distance < d) {
            closest = Some((id, distance));
        }
        if let Some(t) = raycast_oriented_box(&ray, &collider, MIRROR_RAY_RANGE) {
            if hit.map_or(true, |h| t < h.hit_distance) {
                hit = Some(MirrorSelection { id, hit_distance: t });
            }
        }
    }

    hit.or_else(|| {
        closest.map(|(id, _)| MirrorSelection {
            id,
            hit_distance: f32::INFINITY,
        })
    })
}

struct RestoreState {
    position: Vec3,
    look_mode: LookMode,
}

// ── Engine ──────────────────────────────────────────────────

/// Per-frame gaze targeting engine.
pub struct EyeTargetEngine<W: WorldQuery, C: EyeTargetControl> {
    world: W,
    control: C,
    config: EyeTargetConfig,
    scheduler: ScanScheduler,
    registry: CandidateRegistry,
    shake: ShakeGenerator,
    mirror: Option<MirrorSelection>,
    lock_target: Option<ObjectId>,
    topology: TopologyNotifier,
    active: bool,
    restore: Option<RestoreState>,
    last_eyes: Vec3,
    last_forward: Vec3,
    last_strategy: Option<GazeStrategy>,
}

impl<W: WorldQuery, C: EyeTargetControl> EyeTargetEngine<W, C> {
    pub fn new(world: W, control: C) -> Self {
        Self::with_config(world, control, EyeTargetConfig::default())
    }

    pub fn with_config(world: W, control: C, config: EyeTargetConfig) -> Self {
        Self {
            world,
            control,
            config,
            scheduler: ScanScheduler::default(),
            registry: CandidateRegistry::new(),
            shake: ShakeGenerator::new(),
            mirror: None,
            lock_target: None,
            topology: TopologyNotifier::new(),
            active: false,
            restore: None,
            last_eyes: Vec3::ZERO,
            last_forward: Vec3::FORWARD,
            last_strategy: None,
        }
    }

    /// Use a seeded shake generator for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shake = ShakeGenerator::with_seed(seed);
        self
    }

    // ── Lifecycle ───────────────────────────────────────────

    /// Start driving the eye target. Returns whether anything worth
    /// looking at (a mirror or trackable) was found.
    pub fn activate(&mut self, frame: &ViewerFrame) -> bool {
        if self.active {
            debug!("eye target: already active");
            return !self.registry.is_empty();
        }

        self.restore = Some(RestoreState {
            position: self.control.position(),
            look_mode: self.control.look_mode(),
        });
        self.control.set_look_mode(LookMode::Target);
        self.sanitize(frame);
        self.active = true;
        // The rescan below covers anything already pending.
        self.topology.take();
        self.rescan();

        let found = !self.registry.is_empty();
        info!(
            "eye target: activated ({} mirror(s), {} trackable(s))",
            self.registry.mirrors().len(),
            self.registry.objects().len()
        );
        found
    }

    /// Stop driving the eye target and restore what activation overrode.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        if let Some(restore) = self.restore.take() {
            self.control.set_position(restore.position);
            self.control.set_look_mode(restore.look_mode);
        }
        self.active = false;
        self.clear();
        info!("eye target: deactivated");
    }

    /// Drop every candidate and selection; all scans fire next tick.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.scheduler.reset();
        self.shake.reset();
        self.mirror = None;
        self.lock_target = None;
        self.last_strategy = None;
    }

    /// Clear and immediately repopulate both registries.
    pub fn rescan(&mut self) {
        self.clear();
        let mirrors = self
            .registry
            .rescan_mirrors(&self.world, self.config.track_mirrors());
        let objects = self
            .registry
            .rescan_objects(&self.world, self.config.track_window_cameras());
        info!("eye target: rescan found {} mirror(s), {} trackable(s)", mirrors, objects);
    }

    /// Handle for delivering topology-changed events.
    pub fn topology_notifier(&self) -> TopologyNotifier {
        self.topology.clone()
    }

    // ── Tick ────────────────────────────────────────────────

    /// Compute this tick's aim point and write it to the eye target.
    /// Returns `None` while inactive.
    pub fn tick(&mut self, now_s: f64, frame: &ViewerFrame) -> Option<GazeAim> {
        if !self.active {
            return None;
        }
        if self.topology.take() {
            debug!("eye target: topology changed");
            self.rescan();
        }

        let (eyes, forward, degraded) = self.sanitize(frame);

        let (min_s, max_s) = (
            self.config.shake_min_duration_s(),
            self.config.shake_max_duration_s(),
        );
        let shake = &mut self.shake;
        let due = self.scheduler.poll(now_s, || shake.next_span_s(min_s, max_s));

        if !degraded {
            if due.mirrors {
                self.scan_mirrors(eyes, forward);
            }
            if due.objects {
                self.scan_objects(eyes, forward);
            }
        }
        if due.jitter {
            self.shake.refresh(self.config.shake_radius());
        }

        let aim = self.resolve(eyes, forward, degraded);
        self.control.set_position(aim.point);

        if self.last_strategy != Some(aim.strategy) {
            debug!(
                "eye target: strategy {} (target {:?})",
                aim.strategy.as_str(),
                aim.target
            );
            self.last_strategy = Some(aim.strategy);
        }
        trace!("eye target: aim {:?}", aim.point);
        Some(aim)
    }

    /// `tick` with the time taken from `clock`.
    pub fn tick_with_clock(&mut self, clock: &dyn Clock, frame: &ViewerFrame) -> Option<GazeAim> {
        self.tick(clock.now_s(), frame)
    }

    /// Validate the frame, falling back to the last good eye midpoint and
    /// forward direction. The flag is set when the eyes were unusable.
    fn sanitize(&mut self, frame: &ViewerFrame) -> (Vec3, Vec3, bool) {
        let mut degraded = false;

        let eyes = frame.eye_midpoint();
        if eyes.is_finite() {
            self.last_eyes = eyes;
        } else {
            warn!("eye target: non-finite eye positions, holding idle gaze");
            degraded = true;
        }

        let forward = frame.forward.normalize();
        if forward != Vec3::ZERO {
            self.last_forward = forward;
        } else {
            warn!("eye target: degenerate forward direction, reusing last");
        }

        (self.last_eyes, self.last_forward, degraded)
    }

    fn scan_mirrors(&mut self, eyes: Vec3, forward: Vec3) {
        self.mirror = select_mirror(&self.world, self.registry.mirrors(), eyes, forward);
        if let Some(sel) = self.mirror {
            debug!("eye target: mirror {:?} at {:.3}", sel.id, sel.hit_distance);
        }
    }

    fn scan_objects(&mut self, eyes: Vec3, forward: Vec3) {
        let frustum = build_frustum(
            eyes,
            forward,
            self.config.frustum_fov_radians(),
            FRUSTUM_ASPECT_RATIO,
            FRUSTUM_NEAR,
            FRUSTUM_FAR,
        );
        // A mirror in front of a trackable hides it.
        let mirror_limit = self.mirror.map_or(f32::INFINITY, |m| m.hit_distance);
        let limit_sq = mirror_limit * mirror_limit;

        let candidates: Vec<LockCandidate> = self
            .registry
            .object_positions(&self.world)
            .filter(|(_, p)| frustum.contains_point(*p, CONTAINMENT_EPSILON))
            .map(|(id, p)| LockCandidate {
                id,
                distance_sq: p.distance_squared(eyes),
            })
            .filter(|c| c.distance_sq <= limit_sq)
            .collect();

        let count = candidates.len();
        let previous = self.registry.replace_lock_candidates(candidates);
        // Same count keeps the current lock, even if the set changed.
        if count != previous {
            self.lock_target = self.registry.nearest_lock_candidate().map(|c| c.id);
            debug!(
                "eye target: {} lock candidate(s), locked {:?}",
                count, self.lock_target
            );
        }
    }

    fn resolve(&self, eyes: Vec3, forward: Vec3, degraded: bool) -> GazeAim {
        let shake = self.shake.offset();

        if !degraded {
            if let Some(id) = self.lock_target {
                if let Some(p) = self.world.point_proxy(id).filter(|p| p.is_finite()) {
                    return GazeAim {
                        point: p + shake,
                        strategy: GazeStrategy::Locked,
                        target: Some(id),
                    };
                }
            }

            if let Some(sel) = self.mirror {
                if let Some(collider) = self.world.oriented_box(sel.id) {
                    let normal = collider.face_normal();
                    if normal != Vec3::ZERO && collider.center.is_finite() {
                        return GazeAim {
                            point: reflect_across_plane(normal, collider.center, eyes) + shake,
                            strategy: GazeStrategy::MirrorGaze,
                            target: Some(sel.id),
                        };
                    }
                }
            }
        }

        GazeAim {
            point: eyes + forward * NATURAL_LOOK_DISTANCE + shake,
            strategy: GazeStrategy::Idle,
            target: None,
        }
    }

    // ── Configuration ───────────────────────────────────────

    pub fn config(&self) -> &EyeTargetConfig {
        &self.config
    }

    /// Toggle mirror gaze; rescans when active.
    pub fn set_track_mirrors(&mut self, on: bool) {
        self.config.set_track_mirrors(on);
        if self.active {
            self.rescan();
        }
    }

    /// Toggle window-camera lock-on; rescans when active.
    pub fn set_track_window_cameras(&mut self, on: bool) {
        self.config.set_track_window_cameras(on);
        if self.active {
            self.rescan();
        }
    }

    pub fn set_frustum_half_angle_deg(&mut self, deg: f32) -> Result<(), ConfigError> {
        self.config.set_frustum_half_angle_deg(deg)
    }

    pub fn set_shake_min_duration_s(&mut self, s: f32) -> Result<(), ConfigError> {
        self.config.set_shake_min_duration_s(s)
    }

    pub fn set_shake_max_duration_s(&mut self, s: f32) -> Result<(), ConfigError> {
        self.config.set_shake_max_duration_s(s)
    }

    pub fn set_shake_radius(&mut self, radius: f32) -> Result<(), ConfigError> {
        self.config.set_shake_radius(radius)
    }

    // ── Introspection ───────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn registry(&self) -> &CandidateRegistry {
        &self.registry
    }

    pub fn locked_target(&self) -> Option<ObjectId> {
        self.lock_target
    }

    pub fn mirror_selection(&self) -> Option<MirrorSelection> {
        self.mirror
    }

    pub fn shake_offset(&self) -> Vec3 {
        self.shake.offset()
    }

    pub fn strategy(&self) -> Option<GazeStrategy> {
        self.last_strategy
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Mutable access to the world; changes that add or remove objects
    /// should be followed by a topology notification.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn control(&self) -> &C {
        &self.control
    }
}
