//! xorshift64* random number generator
//!
//! Small, fast and deterministic. Every random draw made by the simulation
//! (inter-arrival gaps, job types, service perturbations) comes from one
//! instance of this generator, so a seed fully determines a run.
//!
//! # Algorithm
//!
//! xorshift64* keeps 64 bits of state and scrambles the output with a
//! multiplication, which fixes the weak low bits of plain xorshift.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use repair_queue_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let u = rng.next_f64();
/// assert!((0.0..1.0).contains(&u));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced by 1 (xorshift never leaves the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Current internal state (a generator rebuilt from it continues the sequence)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// Uses the top 53 bits so every value is exactly representable.
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform draw in `[low, high)`
    ///
    /// Degenerate bounds (`low == high`) always return `low`.
    ///
    /// # Panics
    /// Panics if `low > high`.
    ///
    /// # Example
    /// ```
    /// use repair_queue_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let x = rng.uniform(20.0, 40.0);
    /// assert!(x >= 20.0 && x < 40.0);
    /// ```
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        assert!(low <= high, "low must not exceed high");
        low + (high - low) * self.next_f64()
    }

    /// Exponential draw with the given mean (inverse transform)
    ///
    /// # Panics
    /// Panics if `mean` is not positive.
    pub fn exponential(&mut self, mean: f64) -> f64 {
        assert!(mean > 0.0, "mean must be positive");
        // 1 - u lies in (0, 1], so the logarithm is finite
        -mean * (1.0 - self.next_f64()).ln()
    }
}
