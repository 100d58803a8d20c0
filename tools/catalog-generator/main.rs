use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::fs;
use tsukuri::catalog::{Catalog, ElementDefinition};
use tsukuri::config::DEFAULT_PRIMITIVES;

/// A CLI tool to generate synthetic element catalogs for benchmarking the solver
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_catalog.json")]
    output: String,

    /// Number of tiers above the primitives
    #[arg(long, default_value_t = 8)]
    tiers: usize,

    /// Number of elements created on each tier
    #[arg(long, default_value_t = 25)]
    per_tier: usize,

    /// Maximum number of recipes per element
    #[arg(long, default_value_t = 4)]
    max_recipes: usize,

    /// Number of backward (cyclic) recipes to inject
    #[arg(long, default_value_t = 0)]
    cycles: usize,

    /// Seed for reproducible output
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.max_recipes == 0 {
        eprintln!("Error: --max-recipes must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating catalog ({} tiers x {} elements, up to {} recipes each, seed {})...",
        cli.tiers, cli.per_tier, cli.max_recipes, cli.seed
    );

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut elements = generate_tiers(&mut rng, cli.tiers, cli.per_tier, cli.max_recipes);
    let injected = inject_cycles(&mut rng, &mut elements, cli.cycles);

    let catalog: Catalog = elements.into_iter().collect();
    let json_output = serde_json::to_string_pretty(&catalog)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated {} elements ({} injected cycles) and saved to '{}'",
        catalog.len(),
        injected,
        cli.output
    );

    Ok(())
}

/// Builds the catalog tier by tier. Every recipe on tier `t` uses at least one element of
/// tier `t - 1`, so each element lands exactly on its tier.
fn generate_tiers(
    rng: &mut StdRng,
    tiers: usize,
    per_tier: usize,
    max_recipes: usize,
) -> Vec<ElementDefinition> {
    let mut elements: Vec<ElementDefinition> = DEFAULT_PRIMITIVES
        .iter()
        .map(|name| ElementDefinition::primitive(*name).image(format!("/images/{}.svg", name)))
        .collect();
    let mut previous: Vec<String> = DEFAULT_PRIMITIVES.iter().map(|s| s.to_string()).collect();
    let mut available = previous.clone();

    for tier in 1..=tiers {
        let mut current = Vec::with_capacity(per_tier);
        for index in 0..per_tier {
            let name = format!("T{}E{}", tier, index);
            let count = rng.random_range(1..=max_recipes);
            let recipes: Vec<(String, String)> = (0..count)
                .filter_map(|_| {
                    let first = previous.choose(rng)?.clone();
                    let second = available.choose(rng)?.clone();
                    Some((first, second))
                })
                .collect();
            elements.push(
                ElementDefinition::with_recipes(&name, recipes)
                    .image(format!("/images/{}.svg", name)),
            );
            current.push(name);
        }
        println!("-> Generated tier {} ({} elements).", tier, current.len());
        available.extend(current.iter().cloned());
        previous = current;
    }
    elements
}

/// Adds recipes whose ingredients sit at or above their target's tier.
fn inject_cycles(rng: &mut StdRng, elements: &mut [ElementDefinition], cycles: usize) -> usize {
    let primitives = DEFAULT_PRIMITIVES.len();
    if elements.len() <= primitives + 1 {
        return 0;
    }
    for _ in 0..cycles {
        let target = rng.random_range(primitives..elements.len() - 1);
        let later = rng.random_range(target..elements.len());
        let ingredient = elements[later].name.clone();
        let partner = elements[rng.random_range(0..elements.len())].name.clone();
        elements[target].recipes.push(vec![ingredient, partner]);
    }
    cycles
}
