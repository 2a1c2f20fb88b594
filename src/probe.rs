use rand::Rng;
use std::env;
use std::time::Duration;
use tracing::info;

static DELAY_STARTUP_ENV: &str = "DELAY_STARTUP";
static FAIL_LIVENESS_ENV: &str = "FAIL_LIVENESS";
static FAIL_READINESS_ENV: &str = "FAIL_READINESS";

pub const STARTUP_DELAY: Duration = Duration::from_secs(60);

/// Probe behavior, resolved once at startup and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeConfig {
    pub delay_startup: bool,
    pub fail_liveness: bool,
    pub fail_readiness: bool,
}

impl ProbeConfig {
    pub fn from_env(enable_probes: bool) -> Self {
        Self::resolve(enable_probes, |name| env::var(name).ok(), &mut rand::rng())
    }

    /// With probes disabled the service runs without any simulated behavior, so none of the
    /// probe variables are read.
    pub fn resolve<F, R>(enable_probes: bool, lookup: F, rng: &mut R) -> Self
    where
        F: Fn(&str) -> Option<String>,
        R: Rng,
    {
        if !enable_probes {
            info!("Probes disabled, ignoring probe environment variables");
            return ProbeConfig::default();
        }
        let config = Self::from_lookup(lookup, rng);
        config.log();
        config
    }

    /// Builds the config from an arbitrary variable lookup. `FAIL_READINESS` is settled with a
    /// single draw from `rng`.
    pub fn from_lookup<F, R>(lookup: F, rng: &mut R) -> Self
    where
        F: Fn(&str) -> Option<String>,
        R: Rng,
    {
        let flag = |name: &str| is_enabled(lookup(name).as_deref());

        ProbeConfig {
            delay_startup: flag(DELAY_STARTUP_ENV),
            fail_liveness: flag(FAIL_LIVENESS_ENV),
            fail_readiness: resolve_readiness_failure(flag(FAIL_READINESS_ENV), rng),
        }
    }

    fn log(&self) {
        info!("delay_startup: {}", self.delay_startup);
        info!("fail_liveness: {}", self.fail_liveness);
        info!("fail_readiness: {}", self.fail_readiness);
    }
}

/// Only the exact string `true` enables a flag.
pub fn is_enabled(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Coin flip deciding whether readiness fails for the whole process lifetime.
pub fn resolve_readiness_failure<R: Rng>(requested: bool, rng: &mut R) -> bool {
    if !requested {
        return false;
    }
    rng.random::<f64>() < 0.5
}

/// Blocks the calling thread, stalling everything that comes after it in startup.
pub fn delay_startup(duration: Duration) {
    info!("Delaying startup for {:?}", duration);
    std::thread::sleep(duration);
    info!("Startup delay elapsed");
}
