use clap::Parser;
use repath::io::{load_graph, load_paths, save_gfa, save_graph, save_paths};
use repath::{repath, KmerGraphBuilder, PlaceSource, RepathParams};

#[derive(Parser, Debug)]
#[command(name = "repath", version = "0.1.0", about = "Rebuild a sequence graph at a larger K and translate read paths")]
struct Args {
    /// Input graph (JSON)
    #[arg(short, long)]
    graph: String,

    /// Input read paths (JSON)
    #[arg(short, long)]
    paths: String,

    /// Overlap length of the new graph
    #[arg(short = 'k', long)]
    k2: usize,

    /// Output graph (JSON)
    #[arg(short, long = "out-graph")]
    out_graph: String,

    /// Output read paths (JSON)
    #[arg(long = "out-paths")]
    out_paths: Option<String>,

    /// Also write the new graph, with translated paths, as GFA
    #[arg(long)]
    gfa: Option<String>,

    /// Extend places along unambiguous chains before rebuilding
    #[arg(long)]
    extend: bool,

    /// Skip path translation
    #[arg(long = "no-translate")]
    no_translate: bool,

    /// Build places from multi-edge paths plus all long-enough edges
    #[arg(long = "edges-as-places")]
    edges_as_places: bool,

    /// Minimum apparent k-mer count kept in the new graph
    #[arg(short, long)]
    coverage: Option<u32>,

    /// Number of threads
    #[arg(short, long, default_value = "4")]
    threads: usize,

    /// Verbosity (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Only initialize thread pool if not already initialized
    let _ = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global();

    let graph = load_graph(&args.graph)?;
    let paths = load_paths(&args.paths)?;
    log::info!("loaded {} edges and {} paths", graph.edge_count(), paths.len());

    let params = RepathParams {
        k2: args.k2,
        extend_paths: args.extend,
        translate: !args.no_translate,
        source: if args.edges_as_places {
            PlaceSource::ReadsAndEdges
        } else {
            PlaceSource::Reads
        },
        coverage: args.coverage,
    };
    let out = repath(&graph, &paths, &params, &KmerGraphBuilder)?;

    save_graph(&args.out_graph, &out.graph)?;
    let new_paths = out.paths.unwrap_or_default();
    if let Some(path) = &args.out_paths {
        save_paths(path, &new_paths)?;
    }
    if let Some(path) = &args.gfa {
        save_gfa(path, &out.graph, &new_paths)?;
    }
    println!("{}", serde_json::to_string(&out.stats)?);
    Ok(())
}
