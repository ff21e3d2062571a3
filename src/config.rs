//! Gaze targeting configuration surface.
//!
//! Values are validated on write; the tick loop only ever sees a
//! consistent configuration. Persisting these values is the host's job.

use thiserror::Error;

/// Rejected configuration write.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

pub const FRUSTUM_HALF_ANGLE_RANGE_DEG: (f32, f32) = (0.0, 45.0);
pub const SHAKE_DURATION_RANGE_S: (f32, f32) = (0.0, 1.0);
pub const SHAKE_RADIUS_RANGE: (f32, f32) = (0.0, 0.1);

/// Tunable gaze-targeting behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeTargetConfig {
    /// Look at one's reflection in glass and reflective panels.
    track_mirrors: bool,
    /// Lock onto window cameras inside the gaze frustum.
    track_window_cameras: bool,
    /// Half of the lock-on field of view (degrees).
    frustum_half_angle_deg: f32,
    /// Shortest time between shake refreshes (seconds).
    shake_min_duration_s: f32,
    /// Longest time between shake refreshes (seconds).
    shake_max_duration_s: f32,
    /// Radius of the shake offset ball (world units).
    shake_radius: f32,
}

impl Default for EyeTargetConfig {
    fn default() -> Self {
        Self {
            track_mirrors: true,
            track_window_cameras: true,
            frustum_half_angle_deg: 16.0,
            shake_min_duration_s: 0.2,
            shake_max_duration_s: 0.5,
            shake_radius: 0.015,
        }
    }
}

fn check(field: &'static str, value: f32, (min, max): (f32, f32)) -> Result<f32, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

impl EyeTargetConfig {
    pub fn track_mirrors(&self) -> bool {
        self.track_mirrors
    }

    pub fn track_window_cameras(&self) -> bool {
        self.track_window_cameras
    }

    pub fn frustum_half_angle_deg(&self) -> f32 {
        self.frustum_half_angle_deg
    }

    pub fn shake_min_duration_s(&self) -> f32 {
        self.shake_min_duration_s
    }

    pub fn shake_max_duration_s(&self) -> f32 {
        self.shake_max_duration_s
    }

    pub fn shake_radius(&self) -> f32 {
        self.shake_radius
    }

    pub fn set_track_mirrors(&mut self, on: bool) {
        self.track_mirrors = on;
    }

    pub fn set_track_window_cameras(&mut self, on: bool) {
        self.track_window_cameras = on;
    }

    pub fn set_frustum_half_angle_deg(&mut self, deg: f32) -> Result<(), ConfigError> {
        self.frustum_half_angle_deg = check("frustum_half_angle_deg", deg, FRUSTUM_HALF_ANGLE_RANGE_DEG)?;
        Ok(())
    }

    /// Set the minimum shake interval; raises the maximum to match if needed.
    pub fn set_shake_min_duration_s(&mut self, s: f32) -> Result<(), ConfigError> {
        let s = check("shake_min_duration_s", s, SHAKE_DURATION_RANGE_S)?;
        self.shake_min_duration_s = s;
        self.shake_max_duration_s = self.shake_max_duration_s.max(s);
        Ok(())
    }

    /// Set the maximum shake interval; lowers the minimum to match if needed.
    pub fn set_shake_max_duration_s(&mut self, s: f32) -> Result<(), ConfigError> {
        let s = check("shake_max_duration_s", s, SHAKE_DURATION_RANGE_S)?;
        self.shake_max_duration_s = s;
        self.shake_min_duration_s = self.shake_min_duration_s.min(s);
        Ok(())
    }

    pub fn set_shake_radius(&mut self, radius: f32) -> Result<(), ConfigError> {
        self.shake_radius = check("shake_radius", radius, SHAKE_RADIUS_RANGE)?;
        Ok(())
    }

    /// Full lock-on field of view in radians.
    pub fn frustum_fov_radians(&self) -> f32 {
        (self.frustum_half_angle_deg * 2.0).to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = EyeTargetConfig::default();
        assert!(c.track_mirrors());
        assert!(c.track_window_cameras());
        assert_eq!(c.frustum_half_angle_deg(), 16.0);
        assert!(c.shake_min_duration_s() <= c.shake_max_duration_s());
        assert_eq!(c.shake_radius(), 0.015);
    }

    #[test]
    fn test_min_above_max_raises_max() {
        let mut c = EyeTargetConfig::default();
        c.set_shake_min_duration_s(0.8).unwrap();
        assert_eq!(c.shake_min_duration_s(), 0.8);
        assert_eq!(c.shake_max_duration_s(), 0.8);
    }

    #[test]
    fn test_max_below_min_lowers_min() {
        let mut c = EyeTargetConfig::default();
        c.set_shake_max_duration_s(0.1).unwrap();
        assert_eq!(c.shake_max_duration_s(), 0.1);
        assert_eq!(c.shake_min_duration_s(), 0.1);
    }

    #[test]
    fn test_clamping_leaves_consistent_values_alone() {
        let mut c = EyeTargetConfig::default();
        c.set_shake_min_duration_s(0.3).unwrap();
        c.set_shake_max_duration_s(0.9).unwrap();
        assert_eq!(c.shake_min_duration_s(), 0.3);
        assert_eq!(c.shake_max_duration_s(), 0.9);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut c = EyeTargetConfig::default();
        let err = c.set_frustum_half_angle_deg(60.0).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "frustum_half_angle_deg", .. }));
        assert_eq!(c.frustum_half_angle_deg(), 16.0);

        assert!(c.set_shake_min_duration_s(-0.1).is_err());
        assert!(c.set_shake_max_duration_s(1.5).is_err());
        assert!(c.set_shake_radius(0.2).is_err());
        assert_eq!(c, EyeTargetConfig::default());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut c = EyeTargetConfig::default();
        assert_eq!(
            c.set_shake_radius(f32::NAN),
            Err(ConfigError::NotFinite { field: "shake_radius" })
        );
    }

    #[test]
    fn test_error_message() {
        let mut c = EyeTargetConfig::default();
        let err = c.set_shake_radius(0.5).unwrap_err();
        assert_eq!(err.to_string(), "shake_radius must be within [0, 0.1], got 0.5");
    }

    #[test]
    fn test_fov_is_twice_half_angle() {
        let mut c = EyeTargetConfig::default();
        c.set_frustum_half_angle_deg(45.0).unwrap();
        assert!((c.frustum_fov_radians() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
