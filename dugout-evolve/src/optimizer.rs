//! Genetic roster optimizer
//!
//! ## Architecture
//!
//! - Level 1: `run_with_observer()` - Init, then evaluate/evolve per generation
//! - Level 2: `init()`, `evaluate_population()`, `next_generation()`
//! - Level 3: candidate construction, naming, bookkeeping
//!
//! The run is a small state machine: Init -> Evaluating -> Evolving
//! (repeats) -> Done, or Stopped when the stop handle is set. The stop flag
//! is only read at generation boundaries, so games in flight always finish.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use dugout_core::{CardPool, RosterBuilder, RosterError, Team};
use dugout_tournament::EvaluationSession;

use crate::candidate::Candidate;
use crate::mutation::mutate_roster;
use crate::naming::roster_name;
use crate::selection::tournament_select;
use crate::{ConfigError, EvolutionConfig, EvolveError};

// ============================================================================
// Public types
// ============================================================================

/// Optimizer lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Init,
    Evaluating,
    Evolving,
    Done,
    Stopped,
}

/// Cooperative stop signal, shareable across threads
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Summary of one evaluated generation
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub best: f64,
    pub average: f64,
    pub best_ever: f64,
}

/// Receives progress while the optimizer runs. All methods default to no-ops.
pub trait ProgressObserver {
    fn progress(&mut self, _percent: f64, _message: &str) {}
    fn generation(&mut self, _stats: &GenerationStats) {}
    fn log(&mut self, _line: &str) {}
}

/// Observer that ignores everything
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// What a run produced
#[derive(Clone, Debug)]
pub struct EvolutionResult {
    /// Best candidate seen in any generation; `None` if stopped before the
    /// first evaluation finished
    pub best: Option<Candidate>,
    /// Final population, best first
    pub population: Vec<Candidate>,
    pub history: Vec<GenerationStats>,
    pub phase: Phase,
    pub benchmarks: Vec<Team>,
}

impl EvolutionResult {
    pub fn best_team(&self) -> Option<&Team> {
        self.best.as_ref().map(|c| &c.team)
    }

    pub fn best_fitness(&self) -> Option<f64> {
        self.best.as_ref().and_then(|c| c.fitness)
    }
}

// ============================================================================
// Optimizer
// ============================================================================

pub struct GeneticOptimizer<'a> {
    pool: &'a CardPool,
    config: EvolutionConfig,
    builder: RosterBuilder<'a>,
    rng: ChaCha8Rng,
    stop: StopHandle,
    phase: Phase,
    population: Vec<Candidate>,
    benchmarks: Vec<Team>,
    best: Option<Candidate>,
    history: Vec<GenerationStats>,
    next_id: usize,
}

impl<'a> GeneticOptimizer<'a> {
    /// Validate the configuration and prepare a run. No games are played here.
    pub fn new(pool: &'a CardPool, config: EvolutionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let builder = RosterBuilder::new(pool, config.points).with_max_attempts(config.max_build_attempts);
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            pool,
            config,
            builder,
            rng,
            stop: StopHandle::default(),
            phase: Phase::Init,
            population: Vec::new(),
            benchmarks: Vec::new(),
            best: None,
            history: Vec::new(),
            next_id: 0,
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Handle another thread can use to stop the run
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    pub fn run(self) -> Result<EvolutionResult, EvolveError> {
        self.run_with_observer(&mut NoProgress)
    }

    // ========================================================================
    // Level 1 - Orchestration
    // ========================================================================

    /// Run the optimizer to completion or until a stop is requested
    pub fn run_with_observer(mut self, observer: &mut dyn ProgressObserver) -> Result<EvolutionResult, EvolveError> {
        self.init(observer)?;

        if self.stop.is_stop_requested() {
            return Ok(self.finish(Phase::Stopped, observer));
        }

        self.evaluate_population();
        self.record_generation(0, observer);

        for generation in 1..=self.config.generations {
            if self.stop.is_stop_requested() {
                return Ok(self.finish(Phase::Stopped, observer));
            }
            self.phase = Phase::Evolving;
            self.next_generation();
            self.evaluate_population();
            self.record_generation(generation, observer);
        }

        Ok(self.finish(Phase::Done, observer))
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Build the initial population and the benchmark rosters
    fn init(&mut self, observer: &mut dyn ProgressObserver) -> Result<(), EvolveError> {
        self.phase = Phase::Init;
        observer.progress(0.0, "building initial population");

        let wanted = self.config.population_size;
        let (population, last_error) = fill_up(wanted, wanted * 2, |_| self.build_candidate());
        self.population = population;
        if self.population.is_empty() {
            return Err(EvolveError::EmptyPopulation {
                reason: describe(last_error),
            });
        }
        if self.population.len() < wanted {
            tracing::warn!(built = self.population.len(), wanted, "initial population is short");
        }

        let wanted = self.config.num_benchmark_teams;
        let builder = &self.builder;
        let rng = &mut self.rng;
        let build_benchmark = |built: usize| -> Result<Team, RosterError> {
            let mut team = builder.build(&format!("benchmark-{}", built + 1), &mut *rng)?;
            team.stats.clear();
            Ok(team)
        };
        let (benchmarks, last_error) = fill_up(wanted, wanted * BENCHMARK_RETRY_FACTOR, build_benchmark);
        self.benchmarks = benchmarks;
        if self.benchmarks.is_empty() {
            return Err(EvolveError::NoBenchmarks {
                reason: describe(last_error),
            });
        }
        if self.benchmarks.len() < wanted {
            tracing::warn!(built = self.benchmarks.len(), wanted, "benchmark set is short");
        }

        let line = format!(
            "Initial population: {} rosters, {} benchmarks",
            self.population.len(),
            self.benchmarks.len()
        );
        tracing::info!("{}", line);
        observer.log(&line);
        Ok(())
    }

    /// Score every candidate that has no fitness yet, then sort best first
    fn evaluate_population(&mut self) {
        self.phase = Phase::Evaluating;

        // Seeds are drawn in population order so parallel runs stay reproducible
        let seeds: Vec<Option<u64>> = self
            .population
            .iter()
            .map(|c| if c.is_scored() { None } else { Some(self.rng.gen()) })
            .collect();

        let session = EvaluationSession::new(&self.benchmarks, &self.config.eval);
        let score = |(candidate, seed): (&mut Candidate, &Option<u64>)| {
            if let Some(seed) = *seed {
                let result = session.evaluate(&mut candidate.team, seed);
                candidate.set_result(result);
            }
        };

        if self.config.eval.parallel {
            self.population.par_iter_mut().zip(seeds.par_iter()).for_each(score);
        } else {
            self.population.iter_mut().zip(seeds.iter()).for_each(score);
        }

        self.population.sort_by(|a, b| {
            b.fitness_or_zero()
                .partial_cmp(&a.fitness_or_zero())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Elites, then immigrants, then tournament offspring
    fn next_generation(&mut self) {
        let target = self.config.population_size;
        let mut next: Vec<Candidate> = Vec::with_capacity(target);

        let elite = self.config.elitism.min(self.population.len());
        next.extend(self.population[..elite].iter().cloned());

        for _ in 0..self.config.immigrants() {
            match self.build_candidate() {
                Ok(candidate) => next.push(candidate),
                Err(e) => tracing::debug!(error = %e, "immigrant could not be built"),
            }
        }

        let fitness: Vec<f64> = self.population.iter().map(Candidate::fitness_or_zero).collect();
        while next.len() < target {
            let parent = tournament_select(&self.population, &fitness, self.config.tournament_size, &mut self.rng);

            let mutated = if self.rng.gen_bool(self.config.mutation_rate) {
                mutate_roster(
                    &parent.team,
                    self.pool,
                    self.config.points,
                    self.config.num_mutation_swaps,
                    &mut self.rng,
                )
            } else {
                None
            };

            let child = match mutated {
                Some(mut team) => {
                    team.name = fresh_name(&team, self.next_id);
                    self.next_id += 1;
                    Candidate::new(team)
                }
                None => Candidate::new(parent.team.clone()),
            };
            next.push(child);
        }

        self.population = next;
    }

    // ========================================================================
    // Level 3 - Steps
    // ========================================================================

    fn build_candidate(&mut self) -> Result<Candidate, RosterError> {
        let mut team = self.builder.build("candidate", &mut self.rng)?;
        team.name = fresh_name(&team, self.next_id);
        self.next_id += 1;
        Ok(Candidate::new(team))
    }

    fn record_generation(&mut self, generation: usize, observer: &mut dyn ProgressObserver) {
        let Some(leader) = self.population.first() else {
            return;
        };
        let best = leader.fitness_or_zero();

        let improved = match &self.best {
            Some(current) => best > current.fitness_or_zero(),
            None => true,
        };
        if improved {
            self.best = Some(leader.clone());
        }

        let average =
            self.population.iter().map(Candidate::fitness_or_zero).sum::<f64>() / self.population.len() as f64;
        let stats = GenerationStats {
            generation,
            best,
            average,
            best_ever: self.best.as_ref().map_or(best, Candidate::fitness_or_zero),
        };

        tracing::info!(
            "Generation {}: best={:.3}, avg={:.3}, best_ever={:.3} ({})",
            generation,
            stats.best,
            stats.average,
            stats.best_ever,
            leader.team.name
        );

        let percent = 100.0 * (generation + 1) as f64 / (self.config.generations + 1) as f64;
        observer.generation(&stats);
        observer.progress(percent, &format!("generation {} of {}", generation, self.config.generations));
        self.history.push(stats);
    }

    fn finish(mut self, phase: Phase, observer: &mut dyn ProgressObserver) -> EvolutionResult {
        self.phase = phase;
        let line = match (&self.best, phase) {
            (Some(best), Phase::Done) => format!("Done: best {} ({:.3})", best.team.name, best.fitness_or_zero()),
            (Some(best), _) => format!("Stopped: best so far {} ({:.3})", best.team.name, best.fitness_or_zero()),
            (None, _) => "Stopped before any evaluation".to_string(),
        };
        tracing::info!("{}", line);
        observer.log(&line);

        EvolutionResult {
            best: self.best,
            population: self.population,
            history: self.history,
            phase: self.phase,
            benchmarks: self.benchmarks,
        }
    }
}

/// Build calls allowed per wanted benchmark roster
const BENCHMARK_RETRY_FACTOR: usize = 10;

/// Call `build` until `wanted` items exist or `max_calls` calls are spent.
/// `build` receives the number of items built so far. Returns the items and
/// the last error seen.
fn fill_up<T, E>(
    wanted: usize,
    max_calls: usize,
    mut build: impl FnMut(usize) -> Result<T, E>,
) -> (Vec<T>, Option<E>) {
    let mut items = Vec::with_capacity(wanted);
    let mut last_error = None;
    for _ in 0..max_calls {
        if items.len() >= wanted {
            break;
        }
        match build(items.len()) {
            Ok(item) => items.push(item),
            Err(e) => last_error = Some(e),
        }
    }
    (items, last_error)
}

fn fresh_name(team: &Team, id: usize) -> String {
    format!("{}-{}", roster_name(team), id)
}

fn describe(error: Option<RosterError>) -> String {
    error.map_or_else(|| "no attempts made".to_string(), |e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dugout_core::demo_pool;
    use dugout_tournament::EvalConfig;

    fn make_test_config(seed: u64) -> EvolutionConfig {
        EvolutionConfig {
            population_size: 6,
            generations: 2,
            elitism: 1,
            immigration_rate: 0.2,
            ..Default::default()
        }
        .with_benchmarks(2, 2)
        .with_seed(seed)
    }

    #[derive(Default)]
    struct Recorder {
        generations: Vec<GenerationStats>,
        lines: Vec<String>,
        stop_after: Option<(usize, StopHandle)>,
    }

    impl ProgressObserver for Recorder {
        fn generation(&mut self, stats: &GenerationStats) {
            self.generations.push(stats.clone());
            if let Some((gen, handle)) = &self.stop_after {
                if stats.generation >= *gen {
                    handle.request_stop();
                }
            }
        }

        fn log(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }
    }

    #[test]
    fn test_fill_up_retries_failed_builds() {
        let mut calls = 0;
        let (items, last_error) = fill_up(3, 30, |built| {
            calls += 1;
            if calls % 2 == 1 {
                Err(format!("call {} failed", calls))
            } else {
                Ok(built)
            }
        });
        assert_eq!(items, vec![0, 1, 2]);
        assert_eq!(calls, 6);
        assert_eq!(last_error.as_deref(), Some("call 5 failed"));
    }

    #[test]
    fn test_fill_up_gives_up_after_max_calls() {
        let mut calls = 0;
        let (items, last_error) = fill_up(2, 20, |_| {
            calls += 1;
            Err::<u8, _>("no roster")
        });
        assert!(items.is_empty());
        assert_eq!(calls, 20);
        assert_eq!(last_error, Some("no roster"));
    }

    #[test]
    fn test_next_generation_keeps_elites_and_adds_immigrants() {
        let pool = demo_pool(42);
        let config = EvolutionConfig {
            population_size: 10,
            elitism: 2,
            immigration_rate: 0.3,
            ..make_test_config(11)
        };
        let mut optimizer = GeneticOptimizer::new(&pool, config).unwrap();
        optimizer.init(&mut NoProgress).unwrap();
        optimizer.evaluate_population();

        let previous = optimizer.population.clone();
        let previous_names: Vec<&str> = previous.iter().map(|c| c.team.name.as_str()).collect();
        optimizer.next_generation();
        let next = &optimizer.population;

        assert_eq!(next.len(), 10);
        assert_eq!(optimizer.config.immigrants(), 3);

        // Elites carry over with their scores
        for (kept, old) in next[..2].iter().zip(&previous[..2]) {
            assert_eq!(kept.team.name, old.team.name);
            assert_eq!(kept.fitness, old.fitness);
            assert!(kept.is_scored());
        }

        // Immigrants are fresh rosters
        for immigrant in &next[2..5] {
            assert!(!previous_names.contains(&immigrant.team.name.as_str()));
            assert!(immigrant.team.validate().is_ok());
        }

        // Everyone past the elites waits for evaluation
        assert!(next[2..].iter().all(|c| c.fitness.is_none() && c.result.is_none()));

        // Offspring are clones or small mutations of the previous generation
        for child in &next[5..] {
            let keys: Vec<_> = child.team.to_parts().card_keys().collect();
            let closest = previous
                .iter()
                .map(|p| {
                    let parent: Vec<_> = p.team.to_parts().card_keys().collect();
                    keys.iter().filter(|k| !parent.contains(*k)).count()
                })
                .min()
                .unwrap();
            assert!(closest <= optimizer.config.num_mutation_swaps, "{} is not an offspring", child.team.name);
        }
    }

    #[test]
    fn test_run_completes() {
        let pool = demo_pool(42);
        let optimizer = GeneticOptimizer::new(&pool, make_test_config(1)).unwrap();
        let result = optimizer.run().unwrap();

        assert_eq!(result.phase, Phase::Done);
        assert_eq!(result.history.len(), 3);
        assert_eq!(result.population.len(), 6);
        assert_eq!(result.benchmarks.len(), 2);

        let best = result.best_fitness().unwrap();
        assert!((0.0..=1.0).contains(&best));
        assert!(result.population.iter().all(Candidate::is_scored));
        assert!(result.best_team().unwrap().validate().is_ok());
    }

    #[test]
    fn test_best_ever_non_decreasing() {
        let pool = demo_pool(42);
        let result = GeneticOptimizer::new(&pool, make_test_config(2).with_generations(4))
            .unwrap()
            .run()
            .unwrap();

        for pair in result.history.windows(2) {
            assert!(pair[1].best_ever >= pair[0].best_ever);
        }
        for stats in &result.history {
            assert!(stats.best_ever >= stats.best);
            assert!(stats.best >= stats.average);
        }
    }

    #[test]
    fn test_population_sorted_best_first() {
        let pool = demo_pool(42);
        let result = GeneticOptimizer::new(&pool, make_test_config(3)).unwrap().run().unwrap();
        for pair in result.population.windows(2) {
            assert!(pair[0].fitness_or_zero() >= pair[1].fitness_or_zero());
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let pool = demo_pool(42);
        let a = GeneticOptimizer::new(&pool, make_test_config(4)).unwrap().run().unwrap();
        let b = GeneticOptimizer::new(&pool, make_test_config(4)).unwrap().run().unwrap();
        assert_eq!(a.history, b.history);
        assert_eq!(a.best_team().map(|t| &t.name), b.best_team().map(|t| &t.name));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pool = demo_pool(42);
        let parallel = GeneticOptimizer::new(&pool, make_test_config(5)).unwrap().run().unwrap();

        let mut config = make_test_config(5);
        config.eval = EvalConfig::new(2).sequential();
        let sequential = GeneticOptimizer::new(&pool, config).unwrap().run().unwrap();

        assert_eq!(parallel.history, sequential.history);
    }

    #[test]
    fn test_stop_before_run_returns_nothing() {
        let pool = demo_pool(42);
        let optimizer = GeneticOptimizer::new(&pool, make_test_config(6)).unwrap();
        optimizer.request_stop();
        let result = optimizer.run().unwrap();

        assert_eq!(result.phase, Phase::Stopped);
        assert!(result.best.is_none());
        assert!(result.history.is_empty());
    }

    #[test]
    fn test_stop_at_generation_boundary() {
        let pool = demo_pool(42);
        let optimizer = GeneticOptimizer::new(&pool, make_test_config(7).with_generations(5)).unwrap();
        let mut recorder = Recorder {
            stop_after: Some((1, optimizer.stop_handle())),
            ..Default::default()
        };
        let result = optimizer.run_with_observer(&mut recorder).unwrap();

        assert_eq!(result.phase, Phase::Stopped);
        assert_eq!(result.history.len(), 2);
        assert_eq!(recorder.generations.len(), 2);
        assert!(result.best.is_some());
        assert!(recorder.lines.iter().any(|l| l.starts_with("Stopped")));
    }

    #[test]
    fn test_zero_generations_evaluates_once() {
        let pool = demo_pool(42);
        let mut recorder = Recorder::default();
        let result = GeneticOptimizer::new(&pool, make_test_config(8).with_generations(0))
            .unwrap()
            .run_with_observer(&mut recorder)
            .unwrap();

        assert_eq!(result.phase, Phase::Done);
        assert_eq!(recorder.generations.len(), 1);
        assert!(result.best.is_some());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let pool = demo_pool(42);
        let config = EvolutionConfig {
            elitism: 6,
            ..make_test_config(9)
        };
        assert!(matches!(
            GeneticOptimizer::new(&pool, config),
            Err(ConfigError::ElitismTooLarge { .. })
        ));
    }

    #[test]
    fn test_empty_pool_fails_init() {
        let pool = CardPool::from_cards(Vec::new()).unwrap();
        let result = GeneticOptimizer::new(&pool, make_test_config(10)).unwrap().run();
        assert!(matches!(result, Err(EvolveError::EmptyPopulation { .. })));
    }
}
