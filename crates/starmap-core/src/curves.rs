// f(n) = (A - D) / (1 + (n / C)^B) + D, fitted against hand-tuned layouts.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Logistic4 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Logistic4 {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn eval(&self, n: f64) -> f64 {
        (self.a - self.d) / (1.0 + (n / self.c).powf(self.b)) + self.d
    }
}

pub const CAMERA_DISTANCE: Logistic4 = Logistic4::new(480.0, 0.9, 81_160.0, 40_000.0);
pub const ATTRACTION_DISTANCE: Logistic4 = Logistic4::new(18.0, 0.9, 2_500.0, 72.0);
pub const REPULSION_STRENGTH: Logistic4 = Logistic4::new(60.0, 0.8, 4_000.0, 900.0);
pub const GRID_COLUMNS: Logistic4 = Logistic4::new(1.0, 0.5, 500_000.0, 2_200.0);

pub fn camera_distance(node_count: usize) -> f64 {
    CAMERA_DISTANCE.eval(node_count as f64)
}

pub fn attraction_distance(node_count: usize) -> f64 {
    ATTRACTION_DISTANCE.eval(node_count as f64)
}

pub fn repulsion_strength(node_count: usize) -> f64 {
    -REPULSION_STRENGTH.eval(node_count as f64)
}

pub fn grid_columns(node_count: usize) -> f64 {
    GRID_COLUMNS.eval(node_count as f64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    pub distance: f64,
    pub strength: f64,
    pub columns: f64,
}

impl SimParams {
    pub fn for_node_count(node_count: usize) -> Self {
        Self {
            distance: attraction_distance(node_count),
            strength: repulsion_strength(node_count),
            columns: grid_columns(node_count),
        }
    }
}
