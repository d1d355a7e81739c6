use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::{Result, SimError};
use crate::mitigation::MitigationComposer;
use crate::sampler::EventSampler;
use crate::types::{DefenseSystem, RiskEvent};

/// Shared flag for abandoning a run from another thread. Checked before each
/// chunk; a cancelled run yields `SimError::Cancelled` and no sample.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Total mitigated loss of one simulated year. Events that do not occur
/// contribute nothing.
pub fn run_trial(
    samplers: &[EventSampler],
    composer: &MitigationComposer,
    rng: &mut impl Rng,
) -> f64 {
    samplers
        .iter()
        .filter_map(|s| s.sample(rng))
        .map(|base| composer.mitigate(base))
        .sum()
}

/// Run `iterations` trials back to back on one generator.
///
/// Fails with `SimError::Computation` if any trial loss is not finite, e.g.
/// when impacts near `f64::MAX` overflow on summation.
pub fn run_trials(
    samplers: &[EventSampler],
    composer: &MitigationComposer,
    iterations: usize,
    rng: &mut impl Rng,
) -> Result<Vec<f64>> {
    if samplers.is_empty() {
        return Err(SimError::validation("at least one risk event required"));
    }
    let mut losses = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let loss = run_trial(samplers, composer, rng);
        if !loss.is_finite() {
            return Err(SimError::computation(format!("trial {i} produced non-finite loss {loss}")));
        }
        losses.push(loss);
    }
    Ok(losses)
}

/// Monte Carlo loop over a validated set of risk events and defenses.
///
/// Trials are grouped into chunks of `config.chunk_size`. Chunk `k` draws from
/// its own ChaCha20 stream (`seed`, stream `k`), so chunks never share random
/// numbers and the sample is the same whether chunks run serially or on the
/// rayon pool, on any number of threads.
///
/// More iterations shrink the sampling noise in the estimated percentiles;
/// they do not change the distribution being estimated.
pub struct Simulation {
    samplers: Vec<EventSampler>,
    composer: MitigationComposer,
    config: SimulationConfig,
    cancel: CancelToken,
}

impl Simulation {
    pub fn new(
        risk_events: &[RiskEvent],
        defense_systems: &[DefenseSystem],
        config: SimulationConfig,
    ) -> Result<Self> {
        config.validate()?;
        if risk_events.is_empty() {
            return Err(SimError::validation("at least one risk event required"));
        }
        let samplers = EventSampler::for_events(risk_events)?;
        let composer = MitigationComposer::new(defense_systems)?;
        Ok(Simulation { samplers, composer, config, cancel: CancelToken::new() })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn n_chunks(&self) -> usize {
        self.config.iterations.div_ceil(self.config.chunk_size)
    }

    fn chunk_rng(&self, chunk: usize) -> ChaCha20Rng {
        let mut rng = ChaCha20Rng::seed_from_u64(self.config.seed);
        rng.set_stream(chunk as u64);
        rng
    }

    fn run_chunk(&self, chunk: usize) -> Result<Vec<f64>> {
        if self.cancel.is_cancelled() {
            return Err(SimError::Cancelled);
        }
        let start = chunk * self.config.chunk_size;
        let len = self.config.chunk_size.min(self.config.iterations - start);
        let mut rng = self.chunk_rng(chunk);
        run_trials(&self.samplers, &self.composer, len, &mut rng)
    }

    /// Produce the full trial-loss sample, `config.iterations` values long.
    pub fn run(&self) -> Result<Vec<f64>> {
        let n_chunks = self.n_chunks();
        debug!(
            seed = self.config.seed,
            iterations = self.config.iterations,
            chunks = n_chunks,
            parallel = self.config.parallel,
            events = self.samplers.len(),
            residual_factor = self.composer.residual_factor(),
            "starting simulation"
        );

        let chunks: Result<Vec<Vec<f64>>> = if self.config.parallel {
            (0..n_chunks).into_par_iter().map(|k| self.run_chunk(k)).collect()
        } else {
            (0..n_chunks).map(|k| self.run_chunk(k)).collect()
        };

        let chunks = match chunks {
            Ok(c) => c,
            Err(SimError::Cancelled) => {
                warn!(seed = self.config.seed, "simulation cancelled; discarding partial sample");
                return Err(SimError::Cancelled);
            }
            Err(e) => return Err(e),
        };

        let mut losses = Vec::with_capacity(self.config.iterations);
        for c in chunks {
            losses.extend(c);
        }
        info!(seed = self.config.seed, iterations = losses.len(), "simulation complete");
        Ok(losses)
    }
}
