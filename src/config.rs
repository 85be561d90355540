use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::Platform;
use crate::parse::DEFAULT_PROFILE_MARKER;

const AIRPORT_PATHS: [&str; 2] = [
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport",
    "/usr/sbin/airport",
];

/// Settings loaded from an optional TOML file. Every field has a default, so
/// an empty file is valid.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Overrides the platform detected from the build target.
    pub(crate) platform: Option<String>,
    pub(crate) windows: WindowsConfig,
    pub(crate) macos: MacOsConfig,
    pub(crate) linux: LinuxConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowsConfig {
    /// Substring identifying profile lines in `netsh wlan show profiles`.
    /// Localized Windows installs print a translated label.
    pub(crate) profile_marker: String,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            profile_marker: DEFAULT_PROFILE_MARKER.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MacOsConfig {
    pub(crate) interface: String,
    /// Candidate locations of the `airport` tool, first existing one wins.
    pub(crate) airport_paths: Vec<PathBuf>,
}

impl Default for MacOsConfig {
    fn default() -> Self {
        Self {
            interface: "en0".to_string(),
            airport_paths: AIRPORT_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl MacOsConfig {
    pub(crate) fn airport_path(&self) -> PathBuf {
        self.airport_paths
            .iter()
            .find(|p| p.exists())
            .or_else(|| self.airport_paths.last())
            .cloned()
            .unwrap_or_else(|| PathBuf::from("airport"))
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LinuxBackend {
    #[default]
    NetworkManager,
    Iwd,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LinuxConfig {
    pub(crate) backend: LinuxBackend,
    pub(crate) connections_dir: PathBuf,
    pub(crate) iwd_storage_dir: PathBuf,
}

impl Default for LinuxConfig {
    fn default() -> Self {
        Self {
            backend: LinuxBackend::NetworkManager,
            connections_dir: PathBuf::from("/etc/NetworkManager/system-connections"),
            iwd_storage_dir: PathBuf::from("/var/lib/iwd"),
        }
    }
}

impl Config {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Configured platform, or the build target's when unset.
    pub(crate) fn platform(&self) -> Platform {
        self.platform
            .as_deref()
            .map(Platform::from_os_name)
            .unwrap_or_else(Platform::detect)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.windows.profile_marker, "All User Profile");
        assert_eq!(config.macos.interface, "en0");
        assert_eq!(config.linux.backend, LinuxBackend::NetworkManager);
        assert_eq!(
            config.linux.connections_dir,
            PathBuf::from("/etc/NetworkManager/system-connections")
        );
        assert_eq!(config.platform(), Platform::detect());
    }

    #[test]
    fn file_overrides_are_applied() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
platform = "linux"

[linux]
backend = "iwd"
iwd_storage_dir = "/tmp/iwd"

[macos]
interface = "en1"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.platform(), Platform::Linux);
        assert_eq!(config.linux.backend, LinuxBackend::Iwd);
        assert_eq!(config.linux.iwd_storage_dir, PathBuf::from("/tmp/iwd"));
        assert_eq!(config.macos.interface, "en1");
        assert_eq!(config.windows.profile_marker, "All User Profile");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[linux]\nbackend = \"wicd\"\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn airport_path_prefers_existing_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("airport");
        fs::write(&present, "").unwrap();
        let config = MacOsConfig {
            interface: "en0".to_string(),
            airport_paths: vec![dir.path().join("missing"), present.clone()],
        };
        assert_eq!(config.airport_path(), present);
    }
}
