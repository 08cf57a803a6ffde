use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;

use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;

use memoria_core::{
    DifficultyResolver, GroupCatalog, GroupQuery, GroupSelector, LevelCatalog, ParameterSpace,
    ResolveMode,
};

#[derive(Debug, Parser)]
#[command(name = "memoria", version, about = "Memory room difficulty and item-set query tool")]
struct Args {
    /// Curated difficulty-sets JSON (categories -> subpools -> sets).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Level catalog JSON (ordered array of level definitions).
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Re-assign evenly spaced target scores after loading the catalog.
    #[arg(long, default_value_t = false)]
    auto_scores: bool,

    /// Difficulty estimate in [0,1]; takes precedence over --level.
    #[arg(long)]
    score: Option<f32>,

    /// 1-based level index into the catalog.
    #[arg(long)]
    level: Option<i32>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Restrict selection to one category.
    #[arg(long)]
    category: Option<String>,

    /// Restrict selection to one subpool.
    #[arg(long)]
    subpool: Option<String>,

    /// Rounds to draw; earlier picks are excluded from later rounds.
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Comma-separated member ids: report which subpool holds this group,
    /// then exit without drawing rounds.
    #[arg(long, value_name = "IDS")]
    locate: Option<String>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> memoria_core::Result<()> {
    // A missing or malformed dataset is not fatal here: the engine treats
    // an empty catalog as "no data" and the widest query tier reports it.
    let catalog = match args.data.as_ref() {
        Some(path) => match GroupCatalog::from_json_file(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!("could not load dataset {}: {err}", path.display());
                GroupCatalog::empty()
            }
        },
        None => GroupCatalog::empty(),
    };

    let selector = GroupSelector::new(&catalog);

    if let Some(ids) = args.locate.as_ref() {
        let members: Vec<String> = ids
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        match selector.find_subpool_for_group(&members, None, args.category.as_deref()) {
            Some(subpool) => println!("subpool: {subpool}"),
            None => println!("subpool: not found"),
        }
        return Ok(());
    }

    let mut level_catalog = match args.levels.as_ref() {
        Some(path) => LevelCatalog::from_json_file(path)?,
        None => LevelCatalog::empty(),
    };
    if args.auto_scores {
        level_catalog.normalize();
    }

    let resolver = DifficultyResolver::new(ParameterSpace::default(), level_catalog);
    let mode = ResolveMode {
        override_score: args.score.unwrap_or(-1.0),
        use_manual_level: args.level.is_some(),
        manual_level: args.level.unwrap_or(1),
    };
    let params = resolver.resolve_auto(&mode);

    println!(
        "level {} (score {:.2}): {} items, memorise {} units, swap {}, {} pool, category {}",
        params.level,
        params.score,
        params.item_count,
        params.memorise_time,
        if params.swap_enabled { "on" } else { "off" },
        params.pool_similarity.tier(),
        params.category,
    );
    println!(
        "layout: {} columns, phase gap {:.1}",
        params.columns(),
        params.phase_gap()
    );

    // "Any" means no category preference; passing it through would just
    // fail tier 1 and rescan at tier 2.
    let preferred_category = args
        .category
        .clone()
        .or_else(|| (params.category != "Any").then(|| params.category.clone()));

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut used: HashSet<String> = HashSet::new();

    for round in 1..=args.rounds {
        let query = GroupQuery {
            size: params.item_count,
            difficulty: Some(params.pool_similarity.tier()),
            category: preferred_category.as_deref(),
            subpool: args.subpool.as_deref(),
        };
        let candidates = selector.select_candidates(&query);
        println!("round {round}: {} candidates", candidates.len());

        match selector.select_one_avoiding(&query, &used, &mut rng) {
            Some(group) => {
                println!(
                    "  chosen [{} / {} / {}]: {}",
                    group.category,
                    group.subpool_id,
                    group.difficulty,
                    group.members.join(", ")
                );
                used.extend(group.members.iter().cloned());
            }
            None => println!("  no matching group in the dataset"),
        }
    }

    Ok(())
}
