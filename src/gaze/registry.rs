//! Candidate registry — mirrors and trackable objects discovered by the
//! last full rescan, plus the lock candidates of the last object scan.

use tracing::debug;

use super::math::Vec3;
use crate::world::{ObjectId, WorldQuery};

/// Trackable object inside the gaze frustum at the last object scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockCandidate {
    pub id: ObjectId,
    /// Squared distance from the eye midpoint.
    pub distance_sq: f32,
}

#[derive(Debug, Default, Clone)]
pub struct CandidateRegistry {
    mirrors: Vec<ObjectId>,
    objects: Vec<ObjectId>,
    lock_candidates: Vec<LockCandidate>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the mirror list: active reflective objects with a collider.
    /// `enabled == false` leaves the list empty.
    pub fn rescan_mirrors<W: WorldQuery + ?Sized>(&mut self, world: &W, enabled: bool) -> usize {
        self.mirrors.clear();
        if !enabled {
            return 0;
        }
        self.mirrors.extend(
            world
                .objects()
                .into_iter()
                .filter(|o| o.kind.is_mirror() && o.active)
                .filter(|o| world.oriented_box(o.id).is_some())
                .map(|o| o.id),
        );
        debug!("registry: {} mirror(s)", self.mirrors.len());
        self.mirrors.len()
    }

    /// Rebuild the trackable list: active window cameras that are switched
    /// on and resolve to a point. `enabled == false` leaves the list empty.
    pub fn rescan_objects<W: WorldQuery + ?Sized>(&mut self, world: &W, enabled: bool) -> usize {
        self.objects.clear();
        if !enabled {
            return 0;
        }
        self.objects.extend(
            world
                .objects()
                .into_iter()
                .filter(|o| o.kind.is_trackable() && o.active && o.enabled)
                .filter(|o| world.point_proxy(o.id).is_some())
                .map(|o| o.id),
        );
        debug!("registry: {} trackable object(s)", self.objects.len());
        self.objects.len()
    }

    /// Forget every mirror, object and lock candidate.
    pub fn clear(&mut self) {
        self.mirrors.clear();
        self.objects.clear();
        self.lock_candidates.clear();
    }

    pub fn mirrors(&self) -> &[ObjectId] {
        &self.mirrors
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub fn lock_candidates(&self) -> &[LockCandidate] {
        &self.lock_candidates
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty() && self.objects.is_empty()
    }

    /// Install the candidates of a fresh object scan, returning how many
    /// the previous scan produced.
    pub fn replace_lock_candidates(&mut self, candidates: Vec<LockCandidate>) -> usize {
        let previous = self.lock_candidates.len();
        self.lock_candidates = candidates;
        previous
    }

    /// Closest lock candidate, if any.
    pub fn nearest_lock_candidate(&self) -> Option<LockCandidate> {
        self.lock_candidates
            .iter()
            .copied()
            .min_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq))
    }

    /// Live positions of the registered trackables; vanished objects are
    /// skipped.
    pub fn object_positions<'a, W: WorldQuery + ?Sized>(
        &'a self,
        world: &'a W,
    ) -> impl Iterator<Item = (ObjectId, Vec3)> + 'a {
        self.objects
            .iter()
            .filter_map(move |&id| world.point_proxy(id).map(|p| (id, p)))
    }
}
