use crate::quadtree::QuadNode;
use glam::Vec2;

const THETA_SQ: f32 = 0.81;
const DISTANCE_MIN_SQ: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub distance: f32,
    pub strength: f32,
    pub columns: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
}

impl LayoutConfig {
    pub fn new(distance: f32, strength: f32, columns: f32) -> Self {
        let alpha_min = 0.001_f32;
        Self {
            distance,
            strength,
            columns,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
        }
    }

    pub fn total_iterations(&self) -> u32 {
        if self.alpha_decay <= 0.0 || self.alpha_decay >= 1.0 {
            return 1;
        }
        let n = self.alpha_min.ln() / (1.0 - self.alpha_decay).ln();
        n.ceil().max(1.0) as u32
    }
}

pub struct Layout {
    config: LayoutConfig,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    links: Vec<(usize, usize)>,
    link_strength: Vec<f32>,
    link_bias: Vec<f32>,
    alpha: f32,
    iteration: u32,
    total: u32,
}

impl Layout {
    pub fn new(node_count: usize, links_buffer: &[u32], config: LayoutConfig) -> Self {
        let positions = grid_positions(node_count, config.columns, config.distance);

        let mut links = Vec::with_capacity(links_buffer.len() / 2);
        let mut skipped = 0usize;
        for pair in links_buffer.chunks_exact(2) {
            let (source, target) = (pair[0] as usize, pair[1] as usize);
            if source >= node_count || target >= node_count {
                skipped += 1;
                continue;
            }
            links.push((source, target));
        }
        if skipped > 0 {
            tracing::warn!(skipped, node_count, "dropping out-of-range link pairs");
        }

        let mut degree = vec![0u32; node_count];
        for &(source, target) in &links {
            degree[source] += 1;
            degree[target] += 1;
        }
        let link_strength = links
            .iter()
            .map(|&(s, t)| 1.0 / degree[s].min(degree[t]).max(1) as f32)
            .collect();
        let link_bias = links
            .iter()
            .map(|&(s, t)| degree[s] as f32 / (degree[s] + degree[t]).max(1) as f32)
            .collect();

        Self {
            total: config.total_iterations(),
            config,
            velocities: vec![Vec2::ZERO; positions.len()],
            positions,
            links,
            link_strength,
            link_bias,
            alpha: 1.0,
            iteration: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn total_iterations(&self) -> u32 {
        self.total
    }

    pub fn progress(&self) -> f32 {
        (self.iteration as f32 / self.total as f32).clamp(0.0, 1.0)
    }

    pub fn is_done(&self) -> bool {
        self.iteration >= self.total
    }

    pub fn step(&mut self) -> bool {
        if self.is_done() {
            return false;
        }
        self.alpha += (0.0 - self.alpha) * self.config.alpha_decay;

        self.apply_links();
        self.apply_many_body();

        let keep = 1.0 - self.config.velocity_decay;
        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *velocity *= keep;
            *position += *velocity;
        }
        self.recenter();

        self.iteration += 1;
        true
    }

    pub fn snapshot(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.positions.len() * 2);
        for p in &self.positions {
            out.push(p.x);
            out.push(p.y);
        }
        out
    }

    fn apply_links(&mut self) {
        for (i, &(source, target)) in self.links.iter().enumerate() {
            if source == target {
                continue;
            }
            let mut delta = (self.positions[target] + self.velocities[target])
                - (self.positions[source] + self.velocities[source]);
            if delta.length_squared() == 0.0 {
                delta = jiggle(i);
            }
            let length = delta.length();
            let pull =
                (length - self.config.distance) / length * self.alpha * self.link_strength[i];
            let delta = delta * pull;
            let bias = self.link_bias[i];
            self.velocities[target] -= delta * bias;
            self.velocities[source] += delta * (1.0 - bias);
        }
    }

    fn apply_many_body(&mut self) {
        let Some(tree) = QuadNode::build(&self.positions) else {
            return;
        };
        let strength = self.config.strength;
        let alpha = self.alpha;
        for index in 0..self.positions.len() {
            let mut force = Vec2::ZERO;
            accumulate(&tree, index, &self.positions, strength, alpha, &mut force);
            self.velocities[index] += force;
        }
    }

    fn recenter(&mut self) {
        let count = self.positions.len();
        if count == 0 {
            return;
        }
        let mut centroid = Vec2::ZERO;
        for p in &self.positions {
            centroid += *p;
        }
        let centroid = centroid / count as f32;
        for p in &mut self.positions {
            *p -= centroid;
        }
    }
}

fn accumulate(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    alpha: f32,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }
    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            if delta.length_squared() == 0.0 {
                delta = jiggle(index ^ other);
            }
            let distance_sq = delta.length_squared().max(DISTANCE_MIN_SQ);
            *force += delta * (strength * alpha / distance_sq);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance_sq = delta.length_squared().max(DISTANCE_MIN_SQ);
    let side = node.bounds.side_length();
    if !node.bounds.contains(point) && side * side / THETA_SQ < distance_sq {
        *force += delta * (strength * node.mass * alpha / distance_sq);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate(child, index, positions, strength, alpha, force);
    }
}

fn jiggle(seed: usize) -> Vec2 {
    let angle = (seed as f32 * 0.618_034 + 0.37) * std::f32::consts::TAU;
    Vec2::new(angle.cos(), angle.sin()) * 1e-3
}

fn grid_positions(node_count: usize, columns: f32, spacing: f32) -> Vec<Vec2> {
    let columns = if columns.is_finite() {
        (columns.round() as usize).max(1)
    } else {
        1
    };
    let rows = node_count.div_ceil(columns).max(1);
    let spacing = if spacing > 0.0 { spacing } else { 1.0 };
    let x0 = (columns.min(node_count.max(1)) as f32 - 1.0) * 0.5;
    let y0 = (rows as f32 - 1.0) * 0.5;

    (0..node_count)
        .map(|i| {
            let col = (i % columns) as f32;
            let row = (i / columns) as f32;
            Vec2::new((col - x0) * spacing, (row - y0) * spacing) + jiggle(i)
        })
        .collect()
}
