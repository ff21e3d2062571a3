//! Eye target — per-frame gaze targeting for an embodied viewer.
//!
//! Every tick the engine picks where the eyes aim: a trackable object in
//! view, one's own reflection in a mirror, or a natural point ahead, with
//! a small random shake on top. The binary entry point in `main.rs` runs
//! the engine headless against a scripted scene.

pub mod clock;
pub mod config;
pub mod gaze;
pub mod world;
