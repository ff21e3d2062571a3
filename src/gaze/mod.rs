//! Gaze targeting — geometry kernel, scan cadence, candidate registry,
//! shake generator and the per-tick resolver.

pub mod engine;
pub mod geometry;
pub mod math;
pub mod registry;
pub mod schedule;
pub mod shake;

pub use engine::{
    EyeTargetControl, EyeTargetEngine, FreeEyeTarget, GazeAim, GazeStrategy, LookMode,
    MirrorSelection, ViewerFrame,
};
pub use geometry::{OrientedBox, Ray};
pub use math::{Quat, Vec3};
