use std::fs;
use std::path::Path;

use crate::config::{LinuxBackend, LinuxConfig};
use crate::dbus::IwdDbus;
use crate::error::CollectError;
use crate::models::{KnownNetwork, Placeholder, ResultBuilder, Secret};
use crate::parse::{iwd_storage_stem, parse_iwd_psk, parse_iwlist_essids, parse_nm_keyfile};
use crate::runner::CommandRunner;

const NM_SUFFIX: &str = ".nmconnection";

pub(super) fn collect(
    runner: &impl CommandRunner,
    config: &LinuxConfig,
) -> Result<ResultBuilder, CollectError> {
    match config.backend {
        LinuxBackend::NetworkManager => collect_network_manager(runner, &config.connections_dir),
        LinuxBackend::Iwd => collect_iwd(&config.iwd_storage_dir),
    }
}

fn collect_network_manager(
    runner: &impl CommandRunner,
    connections_dir: &Path,
) -> Result<ResultBuilder, CollectError> {
    if !connections_dir.exists() {
        tracing::debug!(dir = %connections_dir.display(), "no NetworkManager profiles, scanning instead");
        return collect_wireless_scan(runner);
    }

    let entries = fs::read_dir(connections_dir).map_err(|source| CollectError::ConnectionDir {
        path: connections_dir.to_path_buf(),
        source,
    })?;

    let mut results = ResultBuilder::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let stem = file_name.strip_suffix(NM_SUFFIX).unwrap_or(&file_name);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let (name, secret) = parse_nm_keyfile(&content, stem);
                results.insert(name, secret);
            }
            Err(err) => {
                tracing::debug!(file = %path.display(), error = %err, "cannot read connection profile");
                results.insert(stem, Placeholder::PermissionDenied);
            }
        }
    }
    Ok(results)
}

fn collect_wireless_scan(runner: &impl CommandRunner) -> Result<ResultBuilder, CollectError> {
    let output = runner
        .run("iwlist", &["scanning"])
        .map_err(CollectError::WirelessScan)?;

    let mut results = ResultBuilder::default();
    for name in parse_iwlist_essids(&output.stdout) {
        results.insert(name, Placeholder::SystemKeyring);
    }
    Ok(results)
}

fn collect_iwd(storage_dir: &Path) -> Result<ResultBuilder, CollectError> {
    let iwd = IwdDbus::new().map_err(CollectError::Iwd)?;
    let known = iwd.list_known_networks().map_err(CollectError::Iwd)?;
    tracing::debug!(networks = known.len(), "listed iwd known networks");
    Ok(known_network_secrets(&known, storage_dir))
}

fn known_network_secrets(known: &[KnownNetwork], storage_dir: &Path) -> ResultBuilder {
    let mut results = ResultBuilder::default();
    for network in known {
        let secret = match network.network_type.as_deref() {
            Some("psk") => read_iwd_psk(storage_dir, &network.name),
            Some("8021x") => Placeholder::Enterprise.into(),
            Some(_) => Placeholder::NoPassword.into(),
            None => Placeholder::ErrorRetrieving.into(),
        };
        results.insert(network.name.clone(), secret);
    }
    results
}

fn read_iwd_psk(storage_dir: &Path, ssid: &str) -> Secret {
    let path = storage_dir.join(format!("{}.psk", iwd_storage_stem(ssid)));
    match fs::read_to_string(&path) {
        Ok(content) => parse_iwd_psk(&content),
        Err(err) => {
            tracing::debug!(file = %path.display(), error = %err, "cannot read iwd profile");
            Placeholder::PermissionDenied.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::ScriptedRunner;

    fn secrets(results: ResultBuilder) -> Vec<(String, Secret)> {
        results
            .finish()
            .records()
            .iter()
            .map(|r| (r.name.clone(), r.secret.clone()))
            .collect()
    }

    #[test]
    fn keyfiles_are_read_from_connection_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Home.nmconnection"),
            "[wifi]\nssid=HomeNet\n\n[wifi-security]\npsk=hunter22\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("Campus.nmconnection"),
            "[wifi]\nssid=eduroam\n\n[802-1x]\neap=peap;\n",
        )
        .unwrap();
        fs::write(dir.path().join("Cafe.nmconnection"), "[wifi-security]\npsk=latte\n").unwrap();
        fs::create_dir(dir.path().join("backup")).unwrap();

        let runner = ScriptedRunner::default();
        let results = collect_network_manager(&runner, dir.path()).unwrap();

        assert_eq!(
            secrets(results),
            [
                ("Cafe".to_string(), Secret::Key("latte".to_string())),
                ("HomeNet".to_string(), Secret::Key("hunter22".to_string())),
                (
                    "eduroam".to_string(),
                    Secret::Unavailable(Placeholder::NoPasswordOrEnterprise)
                ),
            ]
        );
        assert!(runner.calls().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_keyfile_degrades_to_placeholder() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("Locked.nmconnection");
        fs::write(&locked, "[wifi]\nssid=Locked\npsk=secret\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        fs::write(dir.path().join("Open.nmconnection"), "[wifi]\nssid=Open\npsk=pw\n").unwrap();

        // root ignores file modes
        if fs::read_to_string(&locked).is_ok() {
            return;
        }

        let results = collect_network_manager(&ScriptedRunner::default(), dir.path()).unwrap();
        assert_eq!(
            secrets(results),
            [
                (
                    "Locked".to_string(),
                    Secret::Unavailable(Placeholder::PermissionDenied)
                ),
                ("Open".to_string(), Secret::Key("pw".to_string())),
            ]
        );
    }

    #[test]
    fn missing_connection_dir_falls_back_to_iwlist() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::default().ok(
            "iwlist scanning",
            "          Cell 01\n                    ESSID:\"HomeNet\"\n                    ESSID:\"\"\n",
        );

        let results = collect_network_manager(&runner, &dir.path().join("absent")).unwrap();
        assert_eq!(
            secrets(results),
            [(
                "HomeNet".to_string(),
                Secret::Unavailable(Placeholder::SystemKeyring)
            )]
        );
    }

    #[test]
    fn failed_iwlist_is_an_enumeration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_network_manager(&ScriptedRunner::default(), &dir.path().join("absent"))
            .unwrap_err();
        assert!(matches!(err, CollectError::WirelessScan(_)));
    }

    #[test]
    fn iwd_known_networks_map_to_storage_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Home Net.psk"), "[Security]\nPassphrase=hunter22\n").unwrap();
        fs::write(dir.path().join("=612e62.psk"), "[Security]\nPreSharedKey=00ff\n").unwrap();

        let known = [
            ("Home Net", "psk"),
            ("a.b", "psk"),
            ("Gone", "psk"),
            ("eduroam", "8021x"),
            ("Library", "open"),
        ]
        .map(|(name, network_type)| KnownNetwork {
            name: name.to_string(),
            network_type: Some(network_type.to_string()),
        });

        assert_eq!(
            secrets(known_network_secrets(&known, dir.path())),
            [
                (
                    "Gone".to_string(),
                    Secret::Unavailable(Placeholder::PermissionDenied)
                ),
                ("Home Net".to_string(), Secret::Key("hunter22".to_string())),
                (
                    "Library".to_string(),
                    Secret::Unavailable(Placeholder::NoPassword)
                ),
                ("a.b".to_string(), Secret::Key("00ff".to_string())),
                (
                    "eduroam".to_string(),
                    Secret::Unavailable(Placeholder::Enterprise)
                ),
            ]
        );
    }

    #[test]
    fn unreadable_iwd_type_is_an_error_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Home.psk"), "[Security]\nPassphrase=hunter22\n").unwrap();

        let known = [
            KnownNetwork {
                name: "Home".to_string(),
                network_type: Some("psk".to_string()),
            },
            KnownNetwork {
                name: "Mystery".to_string(),
                network_type: None,
            },
        ];

        assert_eq!(
            secrets(known_network_secrets(&known, dir.path())),
            [
                ("Home".to_string(), Secret::Key("hunter22".to_string())),
                (
                    "Mystery".to_string(),
                    Secret::Unavailable(Placeholder::ErrorRetrieving)
                ),
            ]
        );
    }
}
