//! Evolution command - run the genetic algorithm to find a strong roster
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_evolution_config(), run_evolution(), save_results()
//! - Level 3: save_champions(), save_fitness_history(), print_summary()
//! - Level 4: file I/O, formatting utilities

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use dugout_core::{CardPool, GameConfig};
use dugout_evolve::{EvolutionConfig, EvolutionResult, GenerationStats, GeneticOptimizer, ProgressObserver};
use dugout_tournament::EvalConfig;

use crate::common::{save_team, PoolArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct EvolveArgs {
    #[command(flatten)]
    pub pool: PoolArgs,

    /// Population size
    #[arg(long, default_value = "30")]
    pub population: usize,

    /// Number of generations to run
    #[arg(long, default_value = "20")]
    pub generations: usize,

    /// Benchmark teams each candidate plays
    #[arg(long, default_value = "5")]
    pub benchmarks: usize,

    /// Games against each benchmark team
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Mutation rate (0.0-1.0)
    #[arg(long, default_value = "0.8")]
    pub mutation_rate: f64,

    /// Card swaps attempted per mutation
    #[arg(long, default_value = "1")]
    pub swaps: usize,

    /// Number of elite rosters to preserve
    #[arg(long, default_value = "3")]
    pub elitism: usize,

    /// Share of each generation filled with fresh random rosters
    #[arg(long, default_value = "0.1")]
    pub immigration: f64,

    /// Tournament size for parent selection
    #[arg(long, default_value = "3")]
    pub tournament: usize,

    /// Add pitcher control to the pitch roll
    #[arg(long)]
    pub control: bool,

    /// Evaluate on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Stop at the next generation boundary after this many seconds
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<u64>,

    /// Output directory for results
    #[arg(long, default_value = "evolution_output")]
    pub output: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run evolution command
///
/// 1. Load the card pool and build the configuration
/// 2. Run the optimizer
/// 3. Save results
pub fn run(args: EvolveArgs, seed: Option<u64>) -> Result<()> {
    let pool = args.pool.load()?;
    let config = build_evolution_config(&args, seed);

    tracing::info!(
        "Starting evolution: pop={}, gen={}, benchmarks={}x{} games",
        config.population_size,
        config.generations,
        config.num_benchmark_teams,
        config.eval.games_per_benchmark
    );

    let result = run_evolution(&pool, config, &args)?;

    save_results(&result, &args)?;
    print_summary(&result, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_evolution_config(args: &EvolveArgs, seed: Option<u64>) -> EvolutionConfig {
    let mut game = GameConfig::default().with_log(false);
    if args.control {
        game = game.with_pitch_rule(dugout_core::PitchRule::RollPlusControl);
    }
    let mut eval = EvalConfig::new(args.games).with_game(game);
    if args.sequential {
        eval = eval.sequential();
    }

    EvolutionConfig {
        population_size: args.population,
        generations: args.generations,
        mutation_rate: args.mutation_rate,
        num_mutation_swaps: args.swaps,
        elitism: args.elitism,
        immigration_rate: args.immigration,
        tournament_size: args.tournament,
        num_benchmark_teams: args.benchmarks,
        points: args.pool.points(),
        seed,
        ..Default::default()
    }
    .with_eval(eval)
}

fn run_evolution(pool: &CardPool, config: EvolutionConfig, args: &EvolveArgs) -> Result<EvolutionResult> {
    let optimizer = GeneticOptimizer::new(pool, config).context("Invalid evolution settings")?;

    if let Some(secs) = args.time_limit {
        let handle = optimizer.stop_handle();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            tracing::info!("Time limit reached, stopping after this generation");
            handle.request_stop();
        });
    }

    let mut progress = GenerationPrinter { quiet: args.json };
    let result = optimizer.run_with_observer(&mut progress).context("Evolution failed")?;
    Ok(result)
}

fn save_results(result: &EvolutionResult, args: &EvolveArgs) -> Result<()> {
    create_output_directory(&args.output)?;
    if let Some(best) = result.best_team() {
        save_team(best, &args.output.join("best_roster.json"))?;
    }
    save_champions(result, &args.output)?;
    save_fitness_history(&result.history, &args.output)?;
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Prints one line per generation to stdout
struct GenerationPrinter {
    quiet: bool,
}

impl ProgressObserver for GenerationPrinter {
    fn generation(&mut self, stats: &GenerationStats) {
        if !self.quiet {
            println!(
                "gen {:>3}  best {:.3}  avg {:.3}  best-ever {:.3}",
                stats.generation, stats.best, stats.average, stats.best_ever
            );
        }
    }
}

fn create_output_directory(output: &Path) -> Result<()> {
    std::fs::create_dir_all(output.join("champions")).context("Failed to create output directory")
}

/// Save the top rosters of the final population
fn save_champions(result: &EvolutionResult, output: &Path) -> Result<()> {
    let champions_dir = output.join("champions");
    for (i, candidate) in result.population.iter().take(5).enumerate() {
        let path = champions_dir.join(format!("champion_{}.json", i + 1));
        save_team(&candidate.team, &path)?;
    }
    Ok(())
}

fn save_fitness_history(history: &[GenerationStats], output: &Path) -> Result<()> {
    let path = output.join("fitness_history.csv");
    std::fs::write(&path, fitness_history_csv(history)).context("Failed to write fitness history")?;
    tracing::info!("Saved fitness history to {}", path.display());
    Ok(())
}

fn print_summary(result: &EvolutionResult, args: &EvolveArgs) -> Result<()> {
    if args.json {
        #[derive(serde::Serialize)]
        struct JsonOutput<'a> {
            phase: String,
            generations_run: usize,
            best_fitness: Option<f64>,
            best_roster: Option<&'a dugout_core::Team>,
        }
        let output = JsonOutput {
            phase: format!("{:?}", result.phase),
            generations_run: result.history.len(),
            best_fitness: result.best_fitness(),
            best_roster: result.best_team(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n=== Evolution {:?} ===", result.phase);
    println!("Generations evaluated: {}", result.history.len());
    match &result.best {
        Some(best) => {
            println!("Best fitness: {:.4}", best.fitness_or_zero());
            if let Some(record) = &best.result {
                println!(
                    "Record: {}-{}-{}  runs {}:{}",
                    record.wins, record.losses, record.draws, record.runs_scored, record.runs_allowed
                );
            }
            println!();
            print!("{}", best.team);
        }
        None => println!("No roster was evaluated"),
    }
    println!("Output directory: {}", args.output.display());
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn fitness_history_csv(history: &[GenerationStats]) -> String {
    let mut content = String::from("generation,best_fitness,avg_fitness,best_ever\n");
    for stats in history {
        content.push_str(&format!(
            "{},{:.4},{:.4},{:.4}\n",
            stats.generation, stats.best, stats.average, stats.best_ever
        ));
    }
    content
}

// ============================================================================
// TESTS
// ============================================================================
