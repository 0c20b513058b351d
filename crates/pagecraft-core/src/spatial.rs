use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::{rotate_point, BBox, Point};
use crate::schema::{Schema, SchemaId};

/// An entry in the R-tree, referencing one schema on a page.
#[derive(Debug, Clone)]
pub struct HitEntry {
    pub schema_id: SchemaId,
    /// Position of the schema in the page's draw order.
    pub z_index: usize,
    /// Bounds of the rotated shape.
    pub bbox: BBox,
    center: Point,
    rotate: f64,
    half_width: f64,
    half_height: f64,
}

impl HitEntry {
    pub fn from_schema(schema: &Schema, z_index: usize) -> Self {
        Self {
            schema_id: schema.id,
            z_index,
            bbox: schema.bbox(),
            center: schema.center(),
            rotate: schema.rotate,
            half_width: schema.width / 2.0,
            half_height: schema.height / 2.0,
        }
    }

    /// Exact test against the rotated rectangle, not just its bounds.
    pub fn contains(&self, point: &Point) -> bool {
        let local = rotate_point(*point, self.center, -self.rotate);
        (local.x - self.center.x).abs() <= self.half_width
            && (local.y - self.center.y).abs() <= self.half_height
    }
}

impl RTreeObject for HitEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

/// Spatial index over one page's schemas for hover and click hit-testing
/// in stored (top-left origin) coordinates.
pub struct HitIndex {
    tree: RTree<HitEntry>,
}

impl HitIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build the index from a page's schema list, keeping draw order.
    pub fn build(schemas: &[Schema]) -> Self {
        let entries = schemas
            .iter()
            .enumerate()
            .map(|(z, s)| HitEntry::from_schema(s, z))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn insert(&mut self, entry: HitEntry) {
        self.tree.insert(entry);
    }

    /// The topmost schema under `point`, if any.
    pub fn hit(&self, point: &Point) -> Option<SchemaId> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x, point.y]))
            .filter(|e| e.contains(point))
            .max_by_key(|e| e.z_index)
            .map(|e| e.schema_id)
    }

    /// All schemas whose bounds intersect `region` (rubber-band selection).
    pub fn query_region(&self, region: &BBox) -> Vec<SchemaId> {
        let envelope = AABB::from_corners(
            [region.min.x, region.min.y],
            [region.max.x, region.max.y],
        );
        let mut hits: Vec<&HitEntry> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .collect();
        hits.sort_by_key(|e| e.z_index);
        hits.into_iter().map(|e| e.schema_id).collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for HitIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_prefers_topmost() {
        let below = Schema::new("rectangle").with_position(0.0, 0.0).with_size(10.0, 10.0);
        let above = Schema::new("rectangle").with_position(5.0, 5.0).with_size(10.0, 10.0);
        let index = HitIndex::build(&[below.clone(), above.clone()]);

        assert_eq!(index.hit(&Point::new(2.0, 2.0)), Some(below.id));
        assert_eq!(index.hit(&Point::new(7.0, 7.0)), Some(above.id));
        assert_eq!(index.hit(&Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn test_hit_respects_rotation() {
        // A 20x2 bar rotated 90 degrees becomes a 2x20 bar around (10, 1).
        let bar = Schema::new("line")
            .with_position(0.0, 0.0)
            .with_size(20.0, 2.0)
            .with_rotate(90.0);
        let index = HitIndex::build(&[bar.clone()]);

        assert_eq!(index.hit(&Point::new(10.0, 8.0)), Some(bar.id));
        assert_eq!(index.hit(&Point::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_hit_ignores_bbox_corners() {
        // A 10x10 square turned 45 degrees is a diamond around (5, 5); its
        // bounds reach about -2.07 on both axes.
        let diamond = Schema::new("rectangle")
            .with_position(0.0, 0.0)
            .with_size(10.0, 10.0)
            .with_rotate(45.0);
        let index = HitIndex::build(&[diamond.clone()]);

        assert_eq!(index.hit(&Point::new(-1.0, -1.0)), None);
        assert_eq!(index.hit(&Point::new(0.0, 0.0)), None);
        assert_eq!(index.hit(&Point::new(5.0, 5.0)), Some(diamond.id));
        assert_eq!(index.hit(&Point::new(5.0, -1.0)), Some(diamond.id));
    }

    #[test]
    fn test_query_region() {
        let a = Schema::new("rectangle").with_position(0.0, 0.0).with_size(10.0, 10.0);
        let b = Schema::new("rectangle").with_position(20.0, 20.0).with_size(10.0, 10.0);
        let index = HitIndex::build(&[a.clone(), b]);
        let region = BBox::new(Point::new(-5.0, -5.0), Point::new(15.0, 15.0));
        assert_eq!(index.query_region(&region), vec![a.id]);
        assert_eq!(index.len(), 2);
    }
}
