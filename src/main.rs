use std::convert::TryFrom;
use std::{fs::File, io, io::prelude::*};

use docopt::Docopt;
use itertools::Itertools;
use labyrinth::{
    config::LabyrinthConfig,
    generators::{EntrancePolicy, ExitPolicy},
    grid_displays::{CarveSummary, CellTable},
    labyrinth::Labyrinth,
    units::{RingsCount, SubdivisionFactor},
};
use serde_derive::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Labyrinth

Usage:
    labyrinth_driver -h | --help
    labyrinth_driver [--rings=<n>] [--subdivision=<f>] [--base-radius=<r>] [--ring-spacing=<s>] [--entrance=<policy>] [--exit=<policy>] [--seed=<n>] [--show-cells] [--show-path] [--save-edges=<path>] [--save-json=<path>]

Options:
    -h --help              Show this screen.
    --rings=<n>            Number of rings including the centre cell [default: 3].
    --subdivision=<f>      Subdivision factor, ring r has 2^(floor(log2 r) + f) sectors [default: 1].
    --base-radius=<r>      Radius of the centre cell's outer wall [default: 500].
    --ring-spacing=<s>     Radial thickness of every ring after the centre [default: 200].
    --entrance=<policy>    Where carving starts: center or perimeter [default: center].
    --exit=<policy>        Where the exit opens: center, farest or random-perimeter [default: farest].
    --seed=<n>             Seed for the random generator [default: 0].
    --show-cells           Print a table of every cell with its neighbours and passages.
    --show-path            Print the path from the entrance to the exit, and mark it in the cell table.
    --save-edges=<path>    Serialize the labyrinth to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
    --save-json=<path>     Serialize the labyrinth topology, passages and openings as JSON.
";
#[derive(Debug, Deserialize)]
struct LabyrinthArgs {
    flag_rings: i64,
    flag_subdivision: i64,
    flag_base_radius: f64,
    flag_ring_spacing: f64,
    flag_entrance: String,
    flag_exit: String,
    flag_seed: u64,
    flag_show_cells: bool,
    flag_show_path: bool,
    flag_save_edges: String,
    flag_save_json: String,
}

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types for the driver.
    // Library errors are linked so `?` works on anything the labyrinth crate returns.
    use error_chain::*;
    error_chain! {

        links {
            Labyrinth(::labyrinth::errors::Error, ::labyrinth::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
            Json(::serde_json::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: LabyrinthArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;
    let config = config_from_args(&args)?;
    let labyrinth = Labyrinth::generate(&config)?;

    print!("{}", CarveSummary(&labyrinth));

    let path = if args.flag_show_path {
        let path = labyrinth.solution().ok_or("The exit cannot be reached from the entrance.")?;
        println!("path ({} cells): {}", path.len(), path.iter().join(" -> "));
        path
    } else {
        Vec::new()
    };

    if args.flag_show_cells {
        println!();
        print!("{}", CellTable::with_path(&labyrinth, &path));
    }

    if !args.flag_save_edges.is_empty() {
        save_labyrinth_graph(&labyrinth, &args.flag_save_edges)?;
    }

    if !args.flag_save_json.is_empty() {
        let json = serde_json::to_string_pretty(&labyrinth.snapshot())?;
        write_text_to_file(&json, &args.flag_save_json)
            .chain_err(|| format!("Failed to write labyrinth to json file {}", args.flag_save_json))?;
    }

    Ok(())
}

fn config_from_args(args: &LabyrinthArgs) -> Result<LabyrinthConfig> {
    let config = LabyrinthConfig {
        max_rings: RingsCount::try_from(args.flag_rings)?,
        subdivision_factor: SubdivisionFactor::try_from(args.flag_subdivision)?,
        base_radius: args.flag_base_radius,
        ring_spacing: args.flag_ring_spacing,
        entrance: args.flag_entrance.parse::<EntrancePolicy>()?,
        exit: args.flag_exit.parse::<ExitPolicy>()?,
        seed: args.flag_seed,
    };
    config.validate()?;
    Ok(config)
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_labyrinth_graph(labyrinth: &Labyrinth, file_path: &str) -> Result<()> {

    let mut graph_data = String::new();
    let passages = labyrinth.passages();
    graph_data.push_str(&format!("{} {}\n", passages.cells_count(), passages.links_count()));

    for (src, dst) in passages.iter_links() {
        graph_data.push_str(&format!("{} {}\n", src + 1, dst + 1));
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write labyrinth graph to text file {}", file_path))?;

    Ok(())
}
