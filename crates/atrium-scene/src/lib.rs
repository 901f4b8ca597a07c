pub mod comments;
pub mod pick;

pub use comments::CommentLog;
pub use pick::Ray;

use atrium_3d::Aabb;
use glam::Mat4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HouseId(pub u32);

pub struct House {
    pub id: HouseId,
    pub name: String,
    pub transform: Mat4,
    pub bounds: Aabb,
}

/// All mutable viewer state: the loaded houses, their comment lists, and
/// the current selection. Houses are registered once at startup and never
/// removed; ids are dense registration-order indices.
#[derive(Default)]
pub struct Scene {
    houses: Vec<House>,
    comments: CommentLog,
    selected: Option<HouseId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_house(&mut self, name: impl Into<String>, transform: Mat4, bounds: Aabb) -> HouseId {
        let id = HouseId(self.houses.len() as u32);
        let name = name.into();
        self.comments.register(&name);
        self.houses.push(House {
            id,
            name,
            transform,
            bounds,
        });
        id
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    pub fn house(&self, id: HouseId) -> Option<&House> {
        self.houses.get(id.0 as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.houses.is_empty()
    }

    pub fn selected(&self) -> Option<HouseId> {
        self.selected
    }

    pub fn selected_house(&self) -> Option<&House> {
        self.selected.and_then(|id| self.house(id))
    }

    pub fn select(&mut self, id: HouseId) {
        if self.house(id).is_some() {
            self.selected = Some(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn comments(&self) -> &CommentLog {
        &self.comments
    }

    /// Casts a pick ray against every house and returns the nearest hit.
    /// Hits are ordered by a stable sort on world-space distance, so equal
    /// distances resolve to the lower house id.
    pub fn pick(&self, ray: Ray) -> Option<HouseId> {
        let mut hits: Vec<(HouseId, f32)> = self
            .houses
            .iter()
            .filter_map(|h| pick::ray_box_hit(ray, h.transform, h.bounds).map(|t| (h.id, t)))
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.first().map(|(id, _)| *id)
    }

    /// Confirms the comment box: appends trimmed non-empty text to the
    /// selected house's list, and clears the selection regardless of
    /// whether anything was appended. Returns true if a comment was stored.
    pub fn submit_comment(&mut self, text: &str) -> bool {
        let selected_name = self.selected_house().map(|h| h.name.clone());
        let appended = match selected_name {
            Some(name) if !text.trim().is_empty() => {
                self.comments.add(&name, text);
                true
            }
            _ => false,
        };
        self.selected = None;
        appended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn unit_bounds() -> Aabb {
        Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        }
    }

    fn street_scene() -> Scene {
        // Two houses spread along x, one row back, like the startup scan.
        let mut scene = Scene::new();
        scene.add_house(
            "house1",
            Mat4::from_translation(Vec3::new(0.0, 0.0, -16.0)),
            unit_bounds(),
        );
        scene.add_house(
            "house2",
            Mat4::from_translation(Vec3::new(10.0, 0.0, -16.0)),
            unit_bounds(),
        );
        scene
    }

    fn ray_toward(x: f32) -> Ray {
        Ray::new(Vec3::new(x, 0.0, 0.0), Vec3::NEG_Z)
    }

    #[test]
    fn houses_register_with_empty_comment_lists() {
        let scene = street_scene();
        assert_eq!(scene.houses().len(), 2);
        assert_eq!(scene.comments().house_count(), 2);
        assert_eq!(scene.comments().for_house("house1"), Some(&[][..]));
        assert_eq!(scene.comments().for_house("house2"), Some(&[][..]));
    }

    #[test]
    fn ids_follow_registration_order() {
        let scene = street_scene();
        assert_eq!(scene.houses()[0].id, HouseId(0));
        assert_eq!(scene.houses()[1].id, HouseId(1));
        assert_eq!(scene.house(HouseId(1)).unwrap().name, "house2");
    }

    #[test]
    fn pick_hits_the_house_under_the_ray() {
        let scene = street_scene();
        assert_eq!(scene.pick(ray_toward(0.0)), Some(HouseId(0)));
        assert_eq!(scene.pick(ray_toward(10.0)), Some(HouseId(1)));
    }

    #[test]
    fn pick_between_houses_misses() {
        let scene = street_scene();
        assert_eq!(scene.pick(ray_toward(5.0)), None);
    }

    #[test]
    fn pick_prefers_the_nearest_house() {
        let mut scene = street_scene();
        // Third house directly in front of house1, closer to the camera.
        let near = scene.add_house(
            "house3",
            Mat4::from_translation(Vec3::new(0.0, 0.0, -8.0)),
            unit_bounds(),
        );
        assert_eq!(scene.pick(ray_toward(0.0)), Some(near));
    }

    #[test]
    fn selecting_unknown_id_is_ignored() {
        let mut scene = street_scene();
        scene.select(HouseId(7));
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn submit_appends_to_selected_house_and_clears_selection() {
        let mut scene = street_scene();
        scene.select(HouseId(0));
        assert!(scene.submit_comment("leaky roof"));
        assert_eq!(scene.comments().for_house("house1").unwrap(), ["leaky roof"]);
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn submit_without_selection_changes_nothing() {
        let mut scene = street_scene();
        assert!(!scene.submit_comment("orphan comment"));
        assert_eq!(scene.comments().for_house("house1"), Some(&[][..]));
        assert_eq!(scene.comments().for_house("house2"), Some(&[][..]));
    }

    #[test]
    fn empty_submit_keeps_comments_but_clears_selection() {
        let mut scene = street_scene();
        scene.select(HouseId(0));
        assert!(scene.submit_comment("leaky roof"));

        scene.select(HouseId(0));
        assert!(!scene.submit_comment("   "));
        assert_eq!(scene.comments().for_house("house1").unwrap(), ["leaky roof"]);
        assert_eq!(scene.selected(), None);
    }
}
