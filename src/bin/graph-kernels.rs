use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dsi_progress_logger::prelude::*;
use graph_kernels::centralities::{betweenness, geometric_centralities, top_k_harmonic};
use graph_kernels::connected_components::connected_components;
use graph_kernels::distances::exact_sum_sweep::{All, Level};
use graph_kernels::distances::hyperball::HyperBallBuilder;
use graph_kernels::distances::neighbourhood_function::compute_exact;
use graph_kernels::error::KernelError;
use graph_kernels::sccs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use webgraph::graphs::bvgraph::BvGraph;
use webgraph::traits::SequentialLabeling;

/// Analytic kernels over large immutable directed graphs stored in the `webgraph` BvGraph format.
#[derive(Parser)]
#[command(name = "graph-kernels")]
struct Cli {
    /// Basename of the BvGraph to load (and, for commands needing it, of its `-t` transpose).
    basename: PathBuf,
    #[command(subcommand)]
    command: Command,
    /// Logging verbosity (0 = warnings only, higher = more detail).
    #[arg(short, long, default_value_t = 2)]
    verbosity: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Strongly connected components.
    Scc,
    /// Weakly (= connected) components; requires the graph to be symmetric.
    Wcc,
    /// Radius and diameter via the SumSweep heuristic; requires the `-t` transpose.
    Diameter,
    /// Exact betweenness centrality.
    Betweenness,
    /// Closeness, Lin, harmonic and exponential centralities.
    GeometricCentralities,
    /// The `k` nodes with highest harmonic centrality.
    TopK {
        #[arg(default_value_t = 10)]
        k: usize,
    },
    /// Approximate neighbourhood function and centralities via HyperBall.
    HyperBall {
        #[arg(default_value_t = 8)]
        log2m: usize,
        /// Path to a flat, little-endian int32 array of n per-node seed weights. A weight of 0
        /// starts that node's counter empty; defaults to weight 1 for every node.
        #[arg(long)]
        weights: Option<PathBuf>,
        /// Back the counter arrays with tempfile-mapped storage instead of RAM, for graphs too
        /// large to hold both arrays in memory at once.
        #[arg(long)]
        external: bool,
    },
    /// Exact neighbourhood function (one BFS per node).
    NeighbourhoodFunction,
}

fn write_ints(path: impl AsRef<Path>, values: impl IntoIterator<Item = i32>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for value in values {
        out.write_all(&value.to_le_bytes())?;
    }
    Ok(out.flush()?)
}

fn write_floats(path: impl AsRef<Path>, values: impl IntoIterator<Item = f64>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for value in values {
        out.write_all(&value.to_le_bytes())?;
    }
    Ok(out.flush()?)
}

fn write_bits(path: impl AsRef<Path>, num_bits: usize, get: impl Fn(usize) -> bool) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    let mut bytes = vec![0u8; num_bits.div_ceil(8)];
    for i in 0..num_bits {
        if get(i) {
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    out.write_all(&bytes)?;
    Ok(out.flush()?)
}

fn write_lines(path: impl AsRef<Path>, values: impl IntoIterator<Item = f64>) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for value in values {
        writeln!(out, "{value}")?;
    }
    Ok(out.flush()?)
}

/// Reads a flat, little-endian int32 array of per-node weights, rejecting negative entries.
fn read_weights(path: impl AsRef<Path>) -> Result<Vec<usize>> {
    let bytes = std::fs::read(path)?;
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let value = i32::from_le_bytes(chunk.try_into().unwrap());
            usize::try_from(value)
                .map_err(|_| KernelError::InputShape(format!("negative node weight: {value}")).into())
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    stderrlog::new()
        .verbosity(cli.verbosity)
        .timestamp(stderrlog::Timestamp::Second)
        .init()
        .context("Could not initialize logging")?;

    let basename = cli.basename.to_string_lossy().into_owned();
    let graph = BvGraph::with_basename(&basename)
        .load()
        .with_context(|| format!("Could not load graph {basename}"))?;
    let mut pl = progress_logger![display_memory = true];

    match cli.command {
        Command::Scc => {
            let scc = sccs::tarjan(&graph, &mut pl);
            write_ints(
                format!("{basename}.scc"),
                scc.components().iter().map(|&c| c as i32),
            )?;
            write_ints(
                format!("{basename}.sccsizes"),
                scc.compute_sizes().into_iter().map(|s| s as i32),
            )?;
            let buckets = scc.compute_buckets(&graph);
            write_bits(format!("{basename}.buckets"), graph.num_nodes(), |i| {
                buckets.get(i)
            })?;
        }
        Command::Wcc => {
            let cc = connected_components(&graph, &mut pl);
            write_ints(
                format!("{basename}.wcc"),
                cc.components().iter().map(|&c| c as i32),
            )?;
            write_ints(
                format!("{basename}.wccsizes"),
                cc.compute_sizes().into_iter().map(|s| s as i32),
            )?;
        }
        Command::Diameter => {
            let transpose = BvGraph::with_basename(format!("{basename}-t"))
                .load()
                .context("Could not load transpose graph (expected basename + \"-t\")")?;
            let result = All::run(&graph, &transpose, None, &mut pl);
            eprintln!(
                "radius = {}, diameter = {}",
                result.radius, result.diameter
            );
            write_ints(
                format!("{basename}.ecc"),
                result.forward_eccentricities.iter().map(|&e| e as i32),
            )?;
        }
        Command::Betweenness => {
            let centrality = betweenness(&graph, &mut pl)?;
            write_floats(format!("{basename}.betweenness"), centrality.iter().copied())?;
        }
        Command::GeometricCentralities => {
            let centralities = geometric_centralities(&graph, 0.5, &mut pl);
            write_floats(format!("{basename}.closeness"), centralities.closeness.iter().copied())?;
            write_floats(format!("{basename}.lin"), centralities.lin.iter().copied())?;
            write_floats(format!("{basename}.harmonic"), centralities.harmonic.iter().copied())?;
            write_floats(
                format!("{basename}.exponential"),
                centralities.exponential.iter().copied(),
            )?;
        }
        Command::TopK { k } => {
            let top = top_k_harmonic(&graph, k, &mut pl);
            write_ints(
                format!("{basename}.topk.nodes"),
                top.iter().map(|entry| entry.node as i32),
            )?;
            write_floats(
                format!("{basename}.topk.values"),
                top.iter().map(|entry| entry.centrality),
            )?;
        }
        Command::HyperBall { log2m, weights, external } => {
            let weights = weights.map(read_weights).transpose()?;
            let mut builder = HyperBallBuilder::new(&graph)
                .log_2_num_registers(log2m)
                .sum_of_distances(true)
                .sum_of_inverse_distances(true)
                .external(external);
            if let Some(weights) = &weights {
                builder = builder.weights(Some(weights.as_slice()));
            }
            let mut hyperball = builder.build().context("Could not initialize HyperBall")?;
            hyperball.run(usize::MAX, 1e-3, &mut pl)?;
            write_lines(
                format!("{basename}.nf"),
                hyperball.neighbourhood_function().iter().copied(),
            )?;
        }
        Command::NeighbourhoodFunction => {
            let nf = compute_exact(&graph, &mut pl);
            write_lines(format!("{basename}.nf"), nf)?;
        }
    }

    Ok(())
}
