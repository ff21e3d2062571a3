//! Scan cadence — three independent "next allowed time" deadlines for
//! mirror scans, trackable-object scans and shake refreshes.
//!
//! Times are plain seconds supplied by the host each tick. A deadline
//! fires at most once per poll; a long frame never causes catch-up
//! bursts, it simply reschedules from the current time.

/// Seconds between mirror scans.
pub const MIRROR_SCAN_SPAN_S: f64 = 0.5;
/// Seconds between trackable-object scans.
pub const OBJECT_SCAN_SPAN_S: f64 = 0.1;

/// A single "not before" deadline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadline {
    next_s: f64,
}

impl Default for Deadline {
    fn default() -> Self {
        Self::immediate()
    }
}

impl Deadline {
    /// A deadline that fires on the next poll.
    pub fn immediate() -> Self {
        Self {
            next_s: f64::NEG_INFINITY,
        }
    }

    /// Next time this deadline may fire.
    pub fn next_s(&self) -> f64 {
        self.next_s
    }

    pub fn is_due(&self, now_s: f64) -> bool {
        now_s >= self.next_s
    }

    /// Fire if due, rescheduling to `now + span()`. `span` is only
    /// evaluated when the deadline fires.
    pub fn poll_with(&mut self, now_s: f64, span: impl FnOnce() -> f64) -> bool {
        if !self.is_due(now_s) {
            return false;
        }
        let span = span();
        self.next_s = now_s + if span.is_finite() { span.max(0.0) } else { 0.0 };
        true
    }

    pub fn poll(&mut self, now_s: f64, span_s: f64) -> bool {
        self.poll_with(now_s, || span_s)
    }

    pub fn reset(&mut self) {
        *self = Self::immediate();
    }
}

/// Which scans fire this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueScans {
    pub mirrors: bool,
    pub objects: bool,
    pub jitter: bool,
}

impl DueScans {
    pub fn any(&self) -> bool {
        self.mirrors || self.objects || self.jitter
    }
}

/// Owner of the three scan deadlines.
#[derive(Debug, Clone)]
pub struct ScanScheduler {
    pub mirror_span_s: f64,
    pub object_span_s: f64,
    mirrors: Deadline,
    objects: Deadline,
    jitter: Deadline,
}

impl Default for ScanScheduler {
    fn default() -> Self {
        Self::new(MIRROR_SCAN_SPAN_S, OBJECT_SCAN_SPAN_S)
    }
}

impl ScanScheduler {
    pub fn new(mirror_span_s: f64, object_span_s: f64) -> Self {
        Self {
            mirror_span_s,
            object_span_s,
            mirrors: Deadline::immediate(),
            objects: Deadline::immediate(),
            jitter: Deadline::immediate(),
        }
    }

    /// Decide which scans fire at `now_s`. The jitter span is randomized
    /// per cycle by the caller and only drawn when the jitter fires.
    pub fn poll(&mut self, now_s: f64, jitter_span: impl FnOnce() -> f64) -> DueScans {
        if !now_s.is_finite() {
            return DueScans::default();
        }
        DueScans {
            mirrors: self.mirrors.poll(now_s, self.mirror_span_s),
            objects: self.objects.poll(now_s, self.object_span_s),
            jitter: self.jitter.poll_with(now_s, jitter_span),
        }
    }

    /// Make every scan fire on the next poll.
    pub fn reset(&mut self) {
        self.mirrors.reset();
        self.objects.reset();
        self.jitter.reset();
    }

    pub fn next_mirror_scan_s(&self) -> f64 {
        self.mirrors.next_s()
    }

    pub fn next_object_scan_s(&self) -> f64 {
        self.objects.next_s()
    }

    pub fn next_jitter_s(&self) -> f64 {
        self.jitter.next_s()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_fires_first_poll() {
        let mut s = ScanScheduler::default();
        let due = s.poll(0.0, || 0.3);
        assert!(due.mirrors && due.objects && due.jitter);
    }

    #[test]
    fn test_spans_respected() {
        let mut s = ScanScheduler::default();
        s.poll(10.0, || 0.3);

        let due = s.poll(10.05, || 0.3);
        assert!(!due.any());

        let due = s.poll(10.15, || 0.3);
        assert!(due.objects);
        assert!(!due.mirrors);
        assert!(!due.jitter);

        let due = s.poll(10.35, || 0.3);
        assert!(due.jitter);
        assert!(due.objects);
        assert!(!due.mirrors);

        let due = s.poll(10.55, || 0.3);
        assert!(due.mirrors);
    }

    #[test]
    fn test_no_catch_up_after_long_frame() {
        let mut s = ScanScheduler::default();
        s.poll(0.0, || 0.2);
        // Five spans elapse in a single frame: one firing only.
        let due = s.poll(2.5, || 0.2);
        assert!(due.mirrors && due.objects && due.jitter);
        let due = s.poll(2.5, || 0.2);
        assert!(!due.any());
        assert!((s.next_mirror_scan_s() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_jitter_span_drawn_only_when_due() {
        let mut s = ScanScheduler::default();
        let mut draws = 0;
        s.poll(0.0, || {
            draws += 1;
            0.4
        });
        s.poll(0.1, || {
            draws += 1;
            0.4
        });
        assert_eq!(draws, 1);
        assert!((s.next_jitter_s() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_reset_fires_immediately() {
        let mut s = ScanScheduler::default();
        s.poll(5.0, || 1.0);
        s.reset();
        let due = s.poll(5.01, || 1.0);
        assert!(due.mirrors && due.objects && due.jitter);
    }

    #[test]
    fn test_non_finite_time_never_fires() {
        let mut s = ScanScheduler::default();
        assert!(!s.poll(f64::NAN, || 0.1).any());
        // Still pending for the next valid tick.
        assert!(s.poll(0.0, || 0.1).mirrors);
    }

    #[test]
    fn test_deadline_negative_span_clamped() {
        let mut d = Deadline::immediate();
        assert!(d.poll(1.0, -5.0));
        assert_eq!(d.next_s(), 1.0);
    }
}
