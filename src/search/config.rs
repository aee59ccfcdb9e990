//! Search configuration.
//!
//! [`SearchConfig`] holds the run parameters of the local-search loop:
//! budgets, plateau detection, mutation strategy, seeding, and retention.

use serde::{Deserialize, Serialize};

use super::mutate::MutationStrategy;

/// Configuration for one search run.
///
/// # Builder Pattern
///
/// ```
/// use roster_engine::search::{MutationStrategy, SearchConfig};
///
/// let config = SearchConfig::default()
///     .with_max_iterations(2_000)
///     .with_mutation_strategy(MutationStrategy::Swap)
///     .with_seed(42)
///     .with_top_k(3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Iteration budget. Zero means "score the initial roster only".
    pub max_iterations: usize,

    /// Optional wall-clock budget in milliseconds.
    ///
    /// Checked between iterations, so the actual runtime may exceed the
    /// limit by one wave's worth of work. `None` disables it.
    pub time_limit_ms: Option<u64>,

    /// Consecutive non-improving iterations before the search stops.
    ///
    /// Set to 0 to disable plateau-based termination.
    pub plateau_patience: usize,

    /// How candidate mutations are chosen.
    pub mutation_strategy: MutationStrategy,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,

    /// Number of best candidates retained and returned.
    pub top_k: usize,

    /// Candidates generated per iteration.
    pub wave_size: usize,

    /// Whether to validate and score a wave's candidates in parallel
    /// using rayon. Results are identical either way: slot sub-seeds are
    /// derived from the run seed, not from worker scheduling.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5_000,
            time_limit_ms: None,
            plateau_patience: 500,
            mutation_strategy: MutationStrategy::default(),
            seed: None,
            top_k: 5,
            wave_size: 8,
            parallel: true,
        }
    }
}

impl SearchConfig {
    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the wall-clock budget in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the plateau patience (0 to disable).
    pub fn with_plateau_patience(mut self, n: usize) -> Self {
        self.plateau_patience = n;
        self
    }

    /// Sets the mutation strategy.
    pub fn with_mutation_strategy(mut self, strategy: MutationStrategy) -> Self {
        self.mutation_strategy = strategy;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets how many top candidates are retained.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Sets the number of candidates generated per iteration.
    pub fn with_wave_size(mut self, n: usize) -> Self {
        self.wave_size = n;
        self
    }

    /// Enables or disables parallel wave evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Preset for quick runs: small budgets, early plateau stop.
    pub fn fast() -> Self {
        Self {
            max_iterations: 1_000,
            plateau_patience: 100,
            wave_size: 4,
            time_limit_ms: Some(5_000),
            ..Self::default()
        }
    }

    /// Preset balancing quality and runtime.
    pub fn balanced() -> Self {
        Self {
            max_iterations: 5_000,
            plateau_patience: 500,
            time_limit_ms: Some(15_000),
            ..Self::default()
        }
    }

    /// Preset for quality: large budgets, patient plateau detection.
    pub fn quality() -> Self {
        Self {
            max_iterations: 20_000,
            plateau_patience: 2_000,
            time_limit_ms: Some(60_000),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be at least 1".into());
        }
        if self.wave_size == 0 {
            return Err("wave_size must be at least 1".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        Ok(())
    }
}
