use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use tsukuri::graph::visualizer::ElementDump;
use tsukuri::prelude::*;

/// CLI-specific mirror of `SearchMode` for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeCli {
    Dfs,
    Bfs,
    Bidirectional,
}

impl From<ModeCli> for SearchMode {
    fn from(mode: ModeCli) -> Self {
        match mode {
            ModeCli::Dfs => SearchMode::Dfs,
            ModeCli::Bfs => SearchMode::Bfs,
            ModeCli::Bidirectional => SearchMode::Bidirectional,
        }
    }
}

/// A concurrent recipe-tree solver for element combination crafting puzzles
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional JSON config file; environment variables still override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the element catalog JSON file
    #[arg(short, long, global = true, env = "TSUKURI_CATALOG")]
    catalog: Option<PathBuf>,

    /// Base URL that image paths are resolved against
    #[arg(long, global = true)]
    image_base_url: Option<String>,

    /// Fail if tiering leaves any element unresolved
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find recipe trees for an element
    Solve {
        /// The element to craft
        target: String,

        /// The search strategy to use
        #[arg(short, long, value_enum, default_value = "dfs")]
        mode: ModeCli,

        /// Maximum number of distinct trees to return
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Stream paced progress updates to stderr every N milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Return only the tree with the fewest nodes
        #[arg(long, conflicts_with = "first")]
        best: bool,

        /// Return one quick derivation following the first recipe of every element
        #[arg(long)]
        first: bool,

        /// Print trees as JSON instead of one line each
        #[arg(long)]
        json: bool,
    },

    /// Inspect the element graph
    Graph {
        /// Dump the neighborhood of this element instead of the whole graph
        element: Option<String>,

        /// Maximum depth of the dump; negative means unlimited
        #[arg(short, long, default_value_t = 2, allow_hyphen_values = true)]
        depth: i32,

        /// Print every node with its recipes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer JSON-lines search requests from stdin until EOF
    Serve,
}

fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli);
    init_tracing(&config.log_filter);

    let load_start = Instant::now();
    let catalog = Catalog::from_file(&config.catalog_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to load catalog: {}", e));
    });
    let graph = GraphBuilder::from_config(catalog, &config)
        .build()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build element graph: {}", e)));
    let load_duration = load_start.elapsed();

    match cli.command {
        Command::Solve {
            target,
            mode,
            count,
            delay_ms,
            best,
            first,
            json,
        } => {
            let mode = SearchMode::from(mode);
            run_solve(&graph, &target, mode, count, delay_ms, best, first, json, load_duration);
        }
        Command::Graph {
            element,
            depth,
            json,
        } => run_graph(&graph, element.as_deref(), depth, json),
        Command::Serve => run_serve(&graph),
    }
}

fn load_config(cli: &Cli) -> Config {
    let loaded = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    };
    let mut config =
        loaded.unwrap_or_else(|e| exit_with_error(&format!("Invalid configuration: {}", e)));
    if let Some(catalog) = &cli.catalog {
        config.catalog_path = catalog.clone();
    }
    if let Some(url) = &cli.image_base_url {
        config.image_base_url = url.clone();
    }
    config.strict |= cli.strict;
    config
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env("TSUKURI_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn run_solve(
    graph: &ElementGraph,
    target: &str,
    mode: SearchMode,
    count: usize,
    delay_ms: u64,
    best: bool,
    first: bool,
    json: bool,
    load_duration: Duration,
) {
    let solver = Solver::new(graph);
    let search_start = Instant::now();

    let outcome = if first {
        solver.first_tree(target).map(|tree| SearchOutcome {
            trees: vec![tree],
            duration: search_start.elapsed(),
            nodes_explored: 0,
        })
    } else if best {
        solver.best_tree(target, mode)
    } else {
        let request = SearchRequest::new(target, mode)
            .max_tree_count(count)
            .delay(Duration::from_millis(delay_ms));
        let mut progress = JsonLinesSink::new(io::stderr());
        solver.solve_paced(&request, Some(&mut progress))
    };
    let outcome =
        outcome.unwrap_or_else(|e| exit_with_error(&format!("Search for '{}' failed: {}", target, e)));

    if json {
        let output = serde_json::to_string_pretty(&outcome.trees)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize trees: {}", e)));
        println!("{}", output);
        return;
    }

    println!("\nFound {} tree(s) for '{}' using {}:", outcome.trees.len(), target, mode);
    for (i, tree) in outcome.trees.iter().enumerate() {
        println!(
            "  {:>3}. {} ({} nodes, depth {})",
            i + 1,
            tree,
            tree.node_count(),
            tree.depth()
        );
    }

    println!("\n--- Performance Summary ---");
    println!("Graph Construction:   {:?}", load_duration);
    println!("Search:               {:?}", outcome.duration);
    println!("Nodes Explored:       {}", outcome.nodes_explored);
    println!("Elements:             {}", graph.len());
    println!("Max Tier:             {}", graph.max_tier());
    println!();
}

fn run_graph(graph: &ElementGraph, element: Option<&str>, depth: i32, json: bool) {
    if json {
        let output = serde_json::to_string_pretty(&graph.summaries())
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize graph: {}", e)));
        println!("{}", output);
        return;
    }

    match element {
        Some(name) => {
            let dump = ElementDump::element(graph, name, depth)
                .unwrap_or_else(|| exit_with_error(&format!("Unknown element '{}'", name)));
            print!("{}", dump);
        }
        None => print!("{}", ElementDump::from_base(graph, depth)),
    }

    if !graph.unresolved().is_empty() {
        println!("\nUnresolved elements ({}):", graph.unresolved().len());
        for &id in graph.unresolved() {
            println!("  - {}", graph.name(id));
        }
    }
}

/// Reads one request per line and writes paced updates followed by the final response,
/// each as a JSON line.
fn run_serve(graph: &ElementGraph) {
    let session = Session::new(graph);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => exit_with_error(&format!("Failed to read request: {}", e)),
        };
        if line.trim().is_empty() {
            continue;
        }

        let mut updates = JsonLinesSink::new(io::stdout());
        let response = session.handle_line(&line, Some(&mut updates));

        let mut stdout = io::stdout().lock();
        let written = serde_json::to_writer(&mut stdout, &response)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(stdout))
            .and_then(|()| stdout.flush());
        if let Err(e) = written {
            exit_with_error(&format!("Failed to write response: {}", e));
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
