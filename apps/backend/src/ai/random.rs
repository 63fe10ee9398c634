//! Uniform random choices for computer players.
//!
//! Used whenever the provider's reply is unusable: the pick is always one
//! of the candidates handed in, so a decision never fails to be legal.

use parking_lot::Mutex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Seedable source of fallback picks and scheduling jitter.
///
/// The RNG sits behind a `Mutex` because choosers are shared between
/// concurrently running decision tasks.
pub struct RandomChooser {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomChooser {
    /// `Some(seed)` for reproducible runs, `None` for OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Uniformly random element, `None` only for an empty slice.
    pub fn pick<T: Copy>(&self, items: &[T]) -> Option<T> {
        let mut rng = self.rng.lock();
        items.choose(&mut *rng).copied()
    }

    /// Uniform fraction in `[0, 1)`.
    pub fn fraction(&self) -> f64 {
        self.rng.lock().random::<f64>()
    }

    /// Run `f` with exclusive access to the underlying RNG.
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> R) -> R {
        let mut rng = self.rng.lock();
        f(&mut rng)
    }
}
