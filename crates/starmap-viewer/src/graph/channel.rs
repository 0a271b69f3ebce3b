use starmap_core::{FromWorker, SimParams, ToWorker};
use std::time::{Duration, Instant};

use crate::graph::state::{GraphState, Phase};

pub const SETTLE_DELAY: Duration = Duration::from_millis(500);
pub const IDLE_STOP_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleChanges {
    pub finished: bool,
    pub render_stopped: bool,
}

impl GraphState {
    pub fn start_simulation(&mut self, now: Instant) -> ToWorker {
        let node_count = self.model.node_count();
        let params = SimParams::for_node_count(node_count);
        self.perf.start(now);
        self.phase = Phase::Layouting;
        tracing::info!(
            nodes = node_count,
            distance = params.distance,
            strength = params.strength,
            columns = params.columns,
            "starting layout"
        );
        ToWorker::start(node_count as u32, params, self.model.take_links_buffer())
    }

    pub fn apply(&mut self, msg: FromWorker, now: Instant) -> bool {
        if self.channel.ended {
            return self.drop_message("message after end");
        }
        let expected = self.model.node_count() * 2;
        if msg.snapshot().len() != expected {
            tracing::warn!(
                got = msg.snapshot().len(),
                expected,
                "snapshot length mismatch"
            );
            return self.drop_message("bad snapshot length");
        }

        match msg {
            FromWorker::Tick {
                current_tick,
                progress,
                nodes,
            } => {
                if current_tick <= self.channel.last_tick {
                    tracing::warn!(
                        tick = current_tick,
                        last = self.channel.last_tick,
                        "tick out of order"
                    );
                    return self.drop_message("tick out of order");
                }
                self.on_tick(current_tick, progress, nodes, now);
            }
            FromWorker::End { nodes } => self.on_end(nodes, now),
        }
        true
    }

    fn drop_message(&mut self, reason: &'static str) -> bool {
        self.channel.dropped += 1;
        tracing::warn!(reason, dropped = self.channel.dropped, "dropping worker message");
        false
    }

    fn on_tick(&mut self, tick: u32, progress: f32, nodes: Vec<f32>, now: Instant) {
        self.channel.last_tick = tick;
        self.perf.record_tick(tick, progress, now);
        if tick == 1 || !self.interp.is_primed() {
            self.interp.prime(nodes);
            return;
        }
        if self.render.start() {
            tracing::debug!(tick, "render loop started");
        }
        self.interp.push_target(nodes);
    }

    fn on_end(&mut self, nodes: Vec<f32>, now: Instant) {
        self.channel.ended = true;
        self.channel.interaction_armed = true;
        self.channel.settle_at = Some(now + SETTLE_DELAY);
        self.phase = Phase::Settling;
        self.perf.record_end(now);
        self.interp.push_target(nodes);
        self.render.start();
        tracing::info!(
            ticks = self.perf.ticks_received,
            elapsed_ms = self.perf.elapsed.as_millis() as u64,
            "layout ended"
        );
    }

    pub fn on_worker_disconnected(&mut self) {
        if self.channel.disconnected {
            return;
        }
        self.channel.disconnected = true;
        if !self.channel.ended {
            tracing::warn!(
                last_tick = self.channel.last_tick,
                "layout worker disconnected before end"
            );
        }
    }

    pub fn tick_lifecycle(&mut self, now: Instant) -> LifecycleChanges {
        let mut changes = LifecycleChanges::default();

        if self.channel.settle_at.is_some_and(|at| now >= at) {
            self.channel.settle_at = None;
            self.phase = Phase::Finished;
            self.perf.finished = true;
            if self.cfg.show_arrow {
                self.compute_arrows();
            }
            self.request_visibility(now);
            self.channel.idle_stop_at = Some(now + IDLE_STOP_DELAY);
            changes.finished = true;
        }

        if self.channel.idle_stop_at.is_some_and(|at| now >= at) {
            self.channel.idle_stop_at = None;
            if self.pointer.is_outside() && self.render.stop() {
                tracing::debug!("render loop idle-stopped");
                changes.render_stopped = true;
            }
        }
        changes
    }

    pub fn set_pointer(&mut self, inside_chart: bool, over_panel: bool, now: Instant) {
        let was_outside = self.pointer.is_outside();
        self.pointer.inside_chart = inside_chart;
        self.pointer.over_panel = over_panel;
        if self.phase != Phase::Finished {
            return;
        }

        if self.pointer.is_outside() {
            if !was_outside {
                self.channel.idle_stop_at = Some(now + IDLE_STOP_DELAY);
            }
        } else {
            self.channel.idle_stop_at = None;
            self.render.start();
        }
    }

    pub fn wake(&mut self, now: Instant) {
        if self.phase != Phase::Finished {
            return;
        }
        self.render.start();
        if self.pointer.is_outside() {
            self.channel.idle_stop_at = Some(now + IDLE_STOP_DELAY);
        }
    }
}
