use crate::{config::seconds, error::Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

pub const JITTER_LOW: f64 = 0.75;
pub const JITTER_HIGH: f64 = 1.25;

/// Exponential backoff with ±25% jitter. The RNG is injected so tests can
/// reproduce delays.
pub struct Backoff {
    base: f64,
    max: Duration,
    rng: Mutex<StdRng>,
    #[cfg(test)]
    waits: Mutex<Vec<(u32, f64)>>,
}

impl Backoff {
    pub fn new(base_secs: f64, max_secs: f64) -> Result<Self> {
        Self::with_rng(base_secs, max_secs, StdRng::from_entropy())
    }

    pub fn seeded(base_secs: f64, max_secs: f64, seed: u64) -> Result<Self> {
        Self::with_rng(base_secs, max_secs, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(base_secs: f64, max_secs: f64, rng: StdRng) -> Result<Self> {
        seconds("RETRY_BASE_DELAY", base_secs)?;
        let max = seconds("RETRY_MAX_DELAY", max_secs)?;
        Ok(Self {
            base: base_secs,
            max,
            rng: Mutex::new(rng),
            #[cfg(test)]
            waits: Mutex::new(Vec::new()),
        })
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
    }

    /// `min(base * 2^retry * multiplier, max)`, before jitter.
    pub fn raw_delay(&self, retry: u32, multiplier: f64) -> Duration {
        let exp = 2f64.powi(retry.min(62) as i32);
        self.capped(self.base * exp * multiplier)
    }

    /// Jittered delay, never above the configured maximum.
    pub fn delay(&self, retry: u32, multiplier: f64) -> Duration {
        let factor = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(JITTER_LOW..=JITTER_HIGH)
        };
        self.capped(self.raw_delay(retry, multiplier).as_secs_f64() * factor)
    }

    pub async fn wait(&self, retry: u32, multiplier: f64) -> Duration {
        #[cfg(test)]
        self.waits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((retry, multiplier));

        let delay = self.delay(retry, multiplier);
        log::debug!("Backing off: retry={} delay_secs={:.2}", retry, delay.as_secs_f64());
        tokio::time::sleep(delay).await;
        delay
    }

    /// `(retry, multiplier)` of every wait requested so far.
    #[cfg(test)]
    pub(crate) fn recorded_waits(&self) -> Vec<(u32, f64)> {
        self.waits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn capped(&self, secs: f64) -> Duration {
        Duration::try_from_secs_f64(secs.min(self.max.as_secs_f64())).unwrap_or(self.max)
    }
}
