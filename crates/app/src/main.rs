use anyhow::{Context, Result};
use clap::Parser;
use grid_layout::{CancelToken, GridLayout, GridMetrics};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

mod graph;

use graph::{GraphFile, LayoutFile};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph description in RON
    input: PathBuf,

    /// Write the layout there instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Height of a grid row in pixels
    #[arg(long, default_value_t = 40)]
    row_height: i32,

    /// Gap between rows reserved for edge jogs
    #[arg(long, default_value_t = 50)]
    row_gap: i32,

    /// Width of a grid column, a vertex spans two of them
    #[arg(long, default_value_t = 30)]
    column_width: i32,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let file = GraphFile::parse(&source)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    let graph = file.to_graph()?;
    debug!(
        "Loaded {} vertices and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let layout = GridLayout::new(args.row_gap);
    let cancel = CancelToken::new();
    let placement = layout.compute_grid_placement(&graph, &file.entry(), &cancel)?;
    info!("Placed on {} rows and {} columns", placement.rows(), placement.columns());

    let metrics =
        GridMetrics::for_placement(&placement, args.row_height, args.row_gap, args.column_width);
    let cells: HashMap<_, _> = placement
        .iter()
        .filter_map(|(node, cell)| {
            let center = metrics.cell_center(cell.row, cell.column)?;
            Some((node, (cell, center)))
        })
        .collect();
    let positions: HashMap<_, _> = cells.iter().map(|(&node, &(_, p))| (node, p)).collect();
    let articulations = placement.edge_articulations(&positions, &metrics, &cancel)?;

    let output = LayoutFile::new(
        &graph,
        placement.rows(),
        placement.columns(),
        &cells,
        articulations,
    )
    .to_ron()?;
    match &args.output {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{output}"),
    }
    Ok(())
}
