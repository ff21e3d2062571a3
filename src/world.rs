//! World query seam — what the gaze engine may ask about the scene.
//!
//! The host implements `WorldQuery` over its own object model and hands
//! it to the engine at construction. `SceneWorld` is a self-contained
//! in-memory implementation used by the headless simulator and tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::gaze::geometry::OrientedBox;
use crate::gaze::math::{Quat, Vec3};

// ── Object identity and kind ────────────────────────────────

/// Stable handle of a world object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

/// Kind of a world object, as far as gaze targeting cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Glass,
    StainedGlass,
    ReflectiveSlate,
    ReflectiveWoodPanel,
    /// On-screen camera proxy the viewer may lock onto.
    WindowCamera,
    /// Anything else; ignored by every scan.
    Other(String),
}

impl ObjectKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Glass => "Glass",
            Self::StainedGlass => "Glass-Stained",
            Self::ReflectiveSlate => "ReflectiveSlate",
            Self::ReflectiveWoodPanel => "ReflectiveWoodPanel",
            Self::WindowCamera => "WindowCamera",
            Self::Other(name) => name,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Glass" => Self::Glass,
            "Glass-Stained" => Self::StainedGlass,
            "ReflectiveSlate" => Self::ReflectiveSlate,
            "ReflectiveWoodPanel" => Self::ReflectiveWoodPanel,
            "WindowCamera" => Self::WindowCamera,
            other => Self::Other(other.to_string()),
        }
    }

    /// Reflective surface kinds.
    pub fn is_mirror(&self) -> bool {
        matches!(
            self,
            Self::Glass | Self::StainedGlass | Self::ReflectiveSlate | Self::ReflectiveWoodPanel
        )
    }

    pub fn is_trackable(&self) -> bool {
        matches!(self, Self::WindowCamera)
    }
}

/// One entry of the world enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    /// Object is switched on in the scene.
    pub active: bool,
    /// Kind-specific enabled predicate (e.g. camera output on).
    pub enabled: bool,
}

// ── Query trait ─────────────────────────────────────────────

/// Read-only view of the world used by the scans.
///
/// Lookups return `None` for objects that no longer exist; the engine
/// treats that as absence, never as an error.
pub trait WorldQuery {
    /// Enumerate world objects.
    fn objects(&self) -> Vec<WorldObject>;

    /// Box collider of a reflective object.
    fn oriented_box(&self, id: ObjectId) -> Option<OrientedBox>;

    /// Point proxy of a trackable object.
    fn point_proxy(&self, id: ObjectId) -> Option<Vec3>;
}

impl<W: WorldQuery + ?Sized> WorldQuery for &W {
    fn objects(&self) -> Vec<WorldObject> {
        (**self).objects()
    }

    fn oriented_box(&self, id: ObjectId) -> Option<OrientedBox> {
        (**self).oriented_box(id)
    }

    fn point_proxy(&self, id: ObjectId) -> Option<Vec3> {
        (**self).point_proxy(id)
    }
}

impl<W: WorldQuery + ?Sized> WorldQuery for Arc<W> {
    fn objects(&self) -> Vec<WorldObject> {
        (**self).objects()
    }

    fn oriented_box(&self, id: ObjectId) -> Option<OrientedBox> {
        (**self).oriented_box(id)
    }

    fn point_proxy(&self, id: ObjectId) -> Option<Vec3> {
        (**self).point_proxy(id)
    }
}

// ── Topology notification ───────────────────────────────────

/// Cloneable "topology changed" flag.
///
/// Hosts call `notify()` from whatever context delivers object
/// add/remove/rename events; the engine consumes the flag at the start
/// of its next tick.
#[derive(Debug, Clone, Default)]
pub struct TopologyNotifier {
    dirty: Arc<AtomicBool>,
}

impl TopologyNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

// ── In-memory world ─────────────────────────────────────────

#[derive(Debug, Clone)]
enum Shape {
    Box(OrientedBox),
    Point(Vec3),
    None,
}

#[derive(Debug, Clone)]
struct SceneEntry {
    kind: ObjectKind,
    active: bool,
    enabled: bool,
    shape: Shape,
}

/// Simple `WorldQuery` over a map of objects.
#[derive(Debug, Default)]
pub struct SceneWorld {
    entries: BTreeMap<ObjectId, SceneEntry>,
    next_id: u64,
    notifier: Option<TopologyNotifier>,
}

impl SceneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver add/remove events to `notifier`.
    pub fn attach_notifier(&mut self, notifier: TopologyNotifier) {
        self.notifier = Some(notifier);
    }

    fn insert(&mut self, entry: SceneEntry) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        debug!("scene: add {:?} as {}", id, entry.kind.as_str());
        self.entries.insert(id, entry);
        self.topology_changed();
        id
    }

    fn topology_changed(&self) {
        if let Some(n) = &self.notifier {
            n.notify();
        }
    }

    /// Add a reflective object with the given collider.
    pub fn add_mirror(&mut self, kind: ObjectKind, collider: OrientedBox) -> ObjectId {
        self.insert(SceneEntry {
            kind,
            active: true,
            enabled: true,
            shape: Shape::Box(collider),
        })
    }

    /// Add a 1 x 1 glass panel at `center` facing along `rotation`'s +Z.
    pub fn add_glass(&mut self, center: Vec3, rotation: Quat) -> ObjectId {
        self.add_mirror(ObjectKind::Glass, OrientedBox::panel(center, rotation, 1.0, 1.0))
    }

    /// Add a window camera with its output switched on.
    pub fn add_window_camera(&mut self, position: Vec3) -> ObjectId {
        self.insert(SceneEntry {
            kind: ObjectKind::WindowCamera,
            active: true,
            enabled: true,
            shape: Shape::Point(position),
        })
    }

    /// Add an object no scan is interested in.
    pub fn add_other(&mut self, kind: &str, position: Vec3) -> ObjectId {
        self.insert(SceneEntry {
            kind: ObjectKind::from_str(kind),
            active: true,
            enabled: true,
            shape: Shape::Point(position),
        })
    }

    /// Add an object of `kind` that resolves to no geometry at all.
    pub fn add_shapeless(&mut self, kind: ObjectKind) -> ObjectId {
        self.insert(SceneEntry {
            kind,
            active: true,
            enabled: true,
            shape: Shape::None,
        })
    }

    pub fn remove(&mut self, id: ObjectId) -> bool {
        let removed = self.entries.remove(&id).is_some();
        if removed {
            debug!("scene: remove {:?}", id);
            self.topology_changed();
        }
        removed
    }

    /// Remove without notifying, as if the host lost the event.
    pub fn remove_silently(&mut self, id: ObjectId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn set_active(&mut self, id: ObjectId, active: bool) {
        if let Some(e) = self.entries.get_mut(&id) {
            e.active = active;
        }
    }

    pub fn set_camera_on(&mut self, id: ObjectId, on: bool) {
        if let Some(e) = self.entries.get_mut(&id) {
            e.enabled = on;
        }
    }

    /// Move a point proxy, or re-centre a box collider.
    pub fn move_object(&mut self, id: ObjectId, position: Vec3) {
        if let Some(e) = self.entries.get_mut(&id) {
            match &mut e.shape {
                Shape::Box(b) => b.center = position,
                Shape::Point(p) => *p = position,
                Shape::None => {}
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl WorldQuery for SceneWorld {
    fn objects(&self) -> Vec<WorldObject> {
        self.entries
            .iter()
            .map(|(id, e)| WorldObject {
                id: *id,
                kind: e.kind.clone(),
                active: e.active,
                enabled: e.enabled,
            })
            .collect()
    }

    fn oriented_box(&self, id: ObjectId) -> Option<OrientedBox> {
        match self.entries.get(&id)?.shape {
            Shape::Box(b) => Some(b),
            _ => None,
        }
    }

    fn point_proxy(&self, id: ObjectId) -> Option<Vec3> {
        match self.entries.get(&id)?.shape {
            Shape::Point(p) => Some(p),
            Shape::Box(b) => Some(b.center),
            Shape::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip_names() {
        for name in ["Glass", "Glass-Stained", "ReflectiveSlate", "ReflectiveWoodPanel", "WindowCamera"] {
            assert_eq!(ObjectKind::from_str(name).as_str(), name);
        }
        assert_eq!(ObjectKind::from_str("Person"), ObjectKind::Other("Person".into()));
    }

    #[test]
    fn test_kind_classification() {
        assert!(ObjectKind::Glass.is_mirror());
        assert!(ObjectKind::ReflectiveWoodPanel.is_mirror());
        assert!(!ObjectKind::WindowCamera.is_mirror());
        assert!(ObjectKind::WindowCamera.is_trackable());
        assert!(!ObjectKind::Other("Glass ".into()).is_mirror());
    }

    #[test]
    fn test_scene_world_lookup() {
        let mut world = SceneWorld::new();
        let glass = world.add_glass(Vec3::new(0.0, 1.0, 3.0), Quat::IDENTITY);
        let cam = world.add_window_camera(Vec3::new(0.0, 1.5, 2.0));

        assert_eq!(world.objects().len(), 2);
        assert!(world.oriented_box(glass).is_some());
        assert!(world.oriented_box(cam).is_none());
        assert_eq!(world.point_proxy(cam), Some(Vec3::new(0.0, 1.5, 2.0)));

        world.move_object(cam, Vec3::ZERO);
        assert_eq!(world.point_proxy(cam), Some(Vec3::ZERO));

        assert!(world.remove(glass));
        assert!(world.oriented_box(glass).is_none());
        assert!(!world.remove(glass));
    }

    #[test]
    fn test_scene_world_notifies_topology() {
        let notifier = TopologyNotifier::new();
        let mut world = SceneWorld::new();
        world.attach_notifier(notifier.clone());

        let id = world.add_window_camera(Vec3::ZERO);
        assert!(notifier.take());
        assert!(!notifier.take());

        world.set_camera_on(id, false);
        assert!(!notifier.is_dirty());

        world.remove(id);
        assert!(notifier.take());
    }

    #[test]
    fn test_notifier_shared_across_threads() {
        let notifier = TopologyNotifier::new();
        let remote = notifier.clone();
        std::thread::spawn(move || remote.notify())
            .join()
            .expect("notifier thread panicked");
        assert!(notifier.take());
    }
}
