use starmap_core::{NodeId, TextureState};
use std::time::Instant;

use crate::avatar::ImageLoadError;
use crate::graph::state::{GraphState, TextureRequest};

impl GraphState {
    pub fn drain_texture_requests(&mut self) -> Vec<TextureRequest> {
        std::mem::take(&mut self.fetch.outbox)
    }

    /// Completes a fetch: `Loading -> Loaded`, or `Loading -> Failed` with the
    /// image cleared. Frees a budget slot and, if the last pass left visible
    /// nodes waiting, asks for another one.
    pub fn finish_texture(
        &mut self,
        id: &NodeId,
        result: Result<(), ImageLoadError>,
        now: Instant,
    ) {
        let Some(info) = self.model.info_mut(id) else {
            tracing::warn!(%id, "texture completion for unknown node");
            return;
        };
        if info.texture != TextureState::Loading {
            tracing::warn!(%id, state = ?info.texture, "texture completion without fetch");
            return;
        }

        match result {
            Ok(()) => {
                info.texture = TextureState::Loaded;
                self.fetch.loaded += 1;
            }
            Err(err) => {
                tracing::debug!(%id, error = %err, "avatar failed to load");
                info.texture = TextureState::Failed;
                info.image = None;
                self.fetch.failed += 1;
            }
        }
        self.fetch.in_flight = self.fetch.in_flight.saturating_sub(1);

        if self.cull.deferred > 0 {
            self.request_visibility(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::state::test_support::with_images;
    use crate::graph::state::CameraState;

    fn loading(count: usize, budget: usize) -> GraphState {
        let mut st = with_images(count);
        st.interp.prime(vec![0.0; count * 2]);
        st.channel.interaction_armed = true;
        st.camera = CameraState::for_node_count(count, 1.0);
        st.cfg.max_concurrent_fetches = budget;
        st.run_visibility_pass();
        st
    }

    #[test]
    fn success_marks_loaded_and_frees_slot() {
        let mut st = loading(1, 4);
        let requests = st.drain_texture_requests();
        assert_eq!(requests.len(), 1);
        assert!(st.fetch.outbox.is_empty());

        st.finish_texture(&requests[0].id, Ok(()), Instant::now());
        let info = st.model.info(&requests[0].id).expect("info");
        assert_eq!(info.texture, TextureState::Loaded);
        assert_eq!(info.image.as_deref(), Some("n0.png"));
        assert_eq!(st.fetch.in_flight, 0);
    }

    #[test]
    fn failure_clears_image() {
        let mut st = loading(1, 4);
        let id = NodeId::new("n0");
        let err = ImageLoadError::Decode {
            path: "n0.png".into(),
            reason: "not a png".into(),
        };
        st.finish_texture(&id, Err(err), Instant::now());

        let info = st.model.info(&id).expect("info");
        assert_eq!(info.texture, TextureState::Failed);
        assert_eq!(info.image, None);
        assert_eq!(st.fetch.failed, 1);
    }

    #[test]
    fn completion_requests_pass_for_deferred_nodes() {
        let mut st = loading(3, 1);
        assert_eq!(st.cull.deferred, 2);
        let now = Instant::now();

        st.finish_texture(&NodeId::new("n0"), Ok(()), now);
        assert!(st.cull.throttle.is_pending());
    }

    #[test]
    fn stray_completion_is_ignored() {
        let mut st = with_images(1);
        let id = NodeId::new("n0");
        st.finish_texture(&id, Ok(()), Instant::now());
        let info = st.model.info(&id).expect("info");
        assert_eq!(info.texture, TextureState::Unloaded);
        assert_eq!(st.fetch.loaded, 0);
    }
}
