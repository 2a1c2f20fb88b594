use crate::probe::ProbeConfig;
use std::sync::Arc;

/// Everything a request handler can see. Built once in `main` and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub(crate) color: Arc<str>,
    pub(crate) hostname: Arc<str>,
    pub(crate) probes: ProbeConfig,
}

impl AppState {
    pub fn new(
        color: impl Into<Arc<str>>,
        hostname: impl Into<Arc<str>>,
        probes: ProbeConfig,
    ) -> Self {
        AppState {
            color: color.into(),
            hostname: hostname.into(),
            probes,
        }
    }
}

pub fn resolve_hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_hostname_is_not_empty() {
        assert!(!resolve_hostname().is_empty());
    }
}
