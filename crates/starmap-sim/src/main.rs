use anyhow::{Context, Result};
use serde_json::{Map, Value};
use starmap_core::{curves::SimParams, FromWorker, GraphInput, ToWorker};
use starmap_sim::spawn_worker;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
struct HeadlessArgs {
    graph: PathBuf,
    out: Option<PathBuf>,
}

fn parse_args_from<I>(args: I) -> Result<HeadlessArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let mut graph = None;
    let mut out = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--out" || arg == "-o" {
            let Some(path) = args.next() else {
                anyhow::bail!("--out expects a path");
            };
            out = Some(PathBuf::from(path));
        } else if arg.to_string_lossy().starts_with('-') {
            anyhow::bail!("unknown argument: {:?}", arg);
        } else if graph.is_none() {
            graph = Some(PathBuf::from(arg));
        } else {
            anyhow::bail!("unexpected extra argument: {:?}", arg);
        }
    }

    let Some(graph) = graph else {
        anyhow::bail!("usage: starmap-sim <graph.json> [--out positions.json]");
    };
    Ok(HeadlessArgs { graph, out })
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let args = parse_args_from(std::env::args_os().skip(1))?;

    let bytes = std::fs::read(&args.graph)
        .with_context(|| format!("read graph {}", args.graph.display()))?;
    let input = GraphInput::from_json(&bytes)
        .with_context(|| format!("parse graph {}", args.graph.display()))?;
    let mut model = input.index().context("index graph")?;
    tracing::info!(
        nodes = model.node_count(),
        links = model.link_count(),
        "graph indexed"
    );

    let worker = spawn_worker()?;
    let node_count = model.node_count();
    worker
        .commands
        .send(ToWorker::start(
            node_count as u32,
            SimParams::for_node_count(node_count),
            model.take_links_buffer(),
        ))
        .context("send start to worker")?;

    let positions = loop {
        match worker.events.recv().context("worker exited before end")? {
            FromWorker::Tick { .. } => {}
            FromWorker::End { nodes } => break nodes,
        }
    };
    worker.shutdown();

    let mut map = Map::new();
    for node in &model.nodes {
        let (x, y) = (positions[node.index * 2], positions[node.index * 2 + 1]);
        map.insert(node.id.0.clone(), serde_json::json!([x, y]));
    }
    let rendered = serde_json::to_string_pretty(&Value::Object(map))?;

    match args.out {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("write positions {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_graph_and_out() {
        let args = parse_args_from(os(&["graph.json", "--out", "pos.json"])).expect("args");
        assert_eq!(
            args,
            HeadlessArgs {
                graph: PathBuf::from("graph.json"),
                out: Some(PathBuf::from("pos.json")),
            }
        );
    }

    #[test]
    fn requires_a_graph_path() {
        assert!(parse_args_from(os(&[])).is_err());
        assert!(parse_args_from(os(&["--out"])).is_err());
        assert!(parse_args_from(os(&["a.json", "b.json"])).is_err());
        assert!(parse_args_from(os(&["a.json", "--fast"])).is_err());
    }
}
