use bevy::math::Vec2;

use crate::graph::state::GraphState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub link: usize,
    pub tip: Vec2,
    pub direction: Vec2,
}

pub fn arrow_head(source: Vec2, target: Vec2, target_radius: f32) -> Option<(Vec2, Vec2)> {
    let direction = (target - source).try_normalize()?;
    Some((target - direction * target_radius, direction))
}

impl GraphState {
    pub fn compute_arrows(&mut self) {
        let mut arrows = Vec::with_capacity(self.model.link_count());
        for (position, link) in self.model.links.iter().enumerate() {
            let (Some(source), Some(target)) = (
                self.model.index_of(&link.source),
                self.model.index_of(&link.target),
            ) else {
                continue;
            };
            let (Some(from), Some(to)) =
                (self.target_position(source), self.target_position(target))
            else {
                continue;
            };
            let radius = self.node_radius(&link.target);
            if let Some((tip, direction)) = arrow_head(from.into(), to.into(), radius) {
                arrows.push(Arrow {
                    link: position,
                    tip,
                    direction,
                });
            }
        }
        tracing::debug!(arrows = arrows.len(), "arrow heads placed");
        self.arrows = arrows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::state::test_support::triangle;

    #[test]
    fn tip_is_pulled_back_by_radius() {
        let (tip, direction) =
            arrow_head(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0).expect("arrow");
        assert_eq!(direction, Vec2::X);
        assert_eq!(tip, Vec2::new(8.0, 0.0));
    }

    #[test]
    fn coincident_endpoints_have_no_arrow() {
        assert!(arrow_head(Vec2::splat(3.0), Vec2::splat(3.0), 1.0).is_none());
    }

    #[test]
    fn one_arrow_per_link_skipping_zero_length() {
        let mut st = triangle();
        st.cfg.node_size = 4.0;
        // a and b coincide; c is apart
        st.interp.prime(vec![0.0, 0.0, 0.0, 0.0, 0.0, 20.0]);
        st.compute_arrows();

        let links: Vec<usize> = st.arrows.iter().map(|a| a.link).collect();
        assert_eq!(links, vec![1, 2]);
        assert_eq!(st.arrows[0].tip, Vec2::new(0.0, 18.0));
        assert_eq!(st.arrows[0].direction, Vec2::Y);
    }
}
