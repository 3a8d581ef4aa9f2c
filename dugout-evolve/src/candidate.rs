//! Population members

use dugout_core::Team;
use dugout_tournament::FitnessResult;

/// A roster in the population, scored or not
#[derive(Clone, Debug)]
pub struct Candidate {
    pub team: Team,
    /// `None` until evaluated
    pub fitness: Option<f64>,
    /// Record behind the fitness
    pub result: Option<FitnessResult>,
}

impl Candidate {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            fitness: None,
            result: None,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.fitness.is_some()
    }

    /// Fitness for ranking; unscored candidates rank last
    pub fn fitness_or_zero(&self) -> f64 {
        self.fitness.unwrap_or(0.0)
    }

    pub fn set_result(&mut self, result: FitnessResult) {
        self.fitness = Some(result.fitness);
        self.result = Some(result);
    }
}
