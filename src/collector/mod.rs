//! Per-platform discovery of saved Wi-Fi networks and their keys.
//!
//! The platform is fixed when the [`Collector`] is built. A failure to list
//! networks at all is returned as a [`CollectError`]. A failure for a single
//! network only replaces that network's secret with a placeholder.

mod linux;
mod macos;
mod windows;

use crate::config::Config;
use crate::error::CollectError;
use crate::models::{Platform, ResultSet};
use crate::runner::{CommandRunner, SystemRunner};

pub(crate) trait Collect: Send + Sync {
    fn collect(&self) -> Result<ResultSet, CollectError>;
}

#[derive(Debug)]
pub(crate) struct Collector<R = SystemRunner> {
    platform: Platform,
    config: Config,
    runner: R,
}

impl Collector<SystemRunner> {
    pub(crate) fn new(platform: Platform, config: Config) -> Self {
        Self::with_runner(platform, config, SystemRunner)
    }
}

impl<R: CommandRunner> Collector<R> {
    pub(crate) fn with_runner(platform: Platform, config: Config, runner: R) -> Self {
        Self {
            platform,
            config,
            runner,
        }
    }

    pub(crate) fn platform(&self) -> &Platform {
        &self.platform
    }
}

impl<R: CommandRunner> Collect for Collector<R> {
    fn collect(&self) -> Result<ResultSet, CollectError> {
        let results = match &self.platform {
            Platform::Windows => windows::collect(&self.runner, &self.config.windows),
            Platform::MacOs => macos::collect(&self.runner, &self.config.macos),
            Platform::Linux => linux::collect(&self.runner, &self.config.linux),
            Platform::Unsupported(name) => Err(CollectError::UnsupportedPlatform(name.clone())),
        };

        match results {
            Ok(results) => {
                tracing::info!(platform = %self.platform, networks = results.len(), "scan finished");
                Ok(results.finish())
            }
            Err(err) => {
                tracing::warn!(platform = %self.platform, error = %err, "scan failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Secret;
    use crate::runner::testing::ScriptedRunner;

    #[test]
    fn unsupported_platform_is_an_error() {
        let collector = Collector::with_runner(
            Platform::Unsupported("haiku".to_string()),
            Config::default(),
            ScriptedRunner::default(),
        );
        let err = collector.collect().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported OS: haiku");
        assert!(ResultSet::from_error(&err).is_error());
    }

    #[test]
    fn result_set_is_sorted_and_numbered() {
        let runner = ScriptedRunner::default()
            .ok(
                "netsh wlan show profiles",
                "    All User Profile     : B\n    All User Profile     : a\n    All User Profile     : C\n",
            );
        let collector = Collector::with_runner(Platform::Windows, Config::default(), runner);
        let set = collector.collect().unwrap();

        let rows: Vec<_> = set
            .records()
            .iter()
            .map(|r| (r.seq, r.name.as_str()))
            .collect();
        assert_eq!(rows, [(1, "B"), (2, "C"), (3, "a")]);
        assert!(set.records().iter().all(|r| !matches!(r.secret, Secret::Key(_))));
    }
}
