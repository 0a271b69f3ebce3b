use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use starmap_core::{FromWorker, ToWorker};
use std::thread::JoinHandle;
use std::time::Instant;

use crate::layout::{Layout, LayoutConfig};

pub struct WorkerHandle {
    pub commands: Sender<ToWorker>,
    pub events: Receiver<FromWorker>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Closes both channels and waits for the worker thread to exit. A layout
    /// in progress stops at its next send.
    pub fn shutdown(self) {
        let WorkerHandle {
            commands,
            events,
            thread,
        } = self;
        drop(commands);
        drop(events);
        if let Some(thread) = thread {
            let _ = thread.join();
        }
    }
}

pub fn spawn_worker() -> Result<WorkerHandle> {
    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
    let (evt_tx, evt_rx) = crossbeam_channel::unbounded();

    let thread = std::thread::Builder::new()
        .name("starmap-layout".to_string())
        .spawn(move || run(cmd_rx, evt_tx))
        .context("spawn layout worker thread")?;

    Ok(WorkerHandle {
        commands: cmd_tx,
        events: evt_rx,
        thread: Some(thread),
    })
}

fn run(commands: Receiver<ToWorker>, events: Sender<FromWorker>) {
    while let Ok(cmd) = commands.recv() {
        match cmd {
            ToWorker::Start {
                nodes,
                distance,
                strength,
                col,
                links_buffer,
            } => {
                let config = LayoutConfig::new(distance, strength, col);
                let layout = Layout::new(nodes as usize, &links_buffer, config);
                drop(links_buffer);
                if run_layout(layout, &events).is_err() {
                    tracing::debug!("layout consumer went away; worker exiting");
                    return;
                }
            }
        }
    }
}

pub fn run_layout(
    mut layout: Layout,
    events: &Sender<FromWorker>,
) -> Result<(), crossbeam_channel::SendError<FromWorker>> {
    let started = Instant::now();
    tracing::info!(
        nodes = layout.node_count(),
        links = layout.link_count(),
        iterations = layout.total_iterations(),
        "layout started"
    );

    while layout.step() {
        events.send(FromWorker::Tick {
            current_tick: layout.iteration(),
            progress: layout.progress(),
            nodes: layout.snapshot(),
        })?;
    }

    events.send(FromWorker::End {
        nodes: layout.snapshot(),
    })?;
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "layout finished"
    );
    Ok(())
}
