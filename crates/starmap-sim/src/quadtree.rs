use glam::Vec2;
use smallvec::SmallVec;

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 16;

#[derive(Clone, Copy)]
pub(crate) struct QuadBounds {
    pub center: Vec2,
    pub half_extent: f32,
}

impl QuadBounds {
    fn from_points(points: &[Vec2]) -> Option<Self> {
        let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for &point in points {
            min = min.min(point);
            max = max.max(point);
        }
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let span = (max.x - min.x).max(max.y - min.y).max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => Vec2::new(-quarter, -quarter),
            1 => Vec2::new(quarter, -quarter),
            2 => Vec2::new(-quarter, quarter),
            _ => Vec2::new(quarter, quarter),
        };
        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        match (point.x >= self.center.x, point.y >= self.center.y) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    pub fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }
}

pub(crate) struct QuadNode {
    pub bounds: QuadBounds,
    pub center_of_mass: Vec2,
    pub mass: f32,
    pub indices: SmallVec<[usize; LEAF_CAPACITY]>,
    pub children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub fn build(positions: &[Vec2]) -> Option<Self> {
        let bounds = QuadBounds::from_points(positions)?;
        let indices: Vec<usize> = (0..positions.len()).collect();
        Some(Self::build_node(bounds, indices, positions, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        depth: usize,
    ) -> Self {
        let mut center_of_mass = Vec2::ZERO;
        for &index in &indices {
            center_of_mass += positions[index];
        }
        let mass = indices.len() as f32;
        if mass > 0.0 {
            center_of_mass = center_of_mass / mass;
        }

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            indices: SmallVec::new(),
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || indices.len() <= LEAF_CAPACITY {
            node.indices.extend(indices);
            return node;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for index in indices {
            buckets[bounds.quadrant_for(positions[index])].push(index);
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                depth + 1,
            )));
        }
        node
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}
