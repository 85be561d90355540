use crate::config::MacOsConfig;
use crate::error::CollectError;
use crate::models::{Placeholder, ResultBuilder, Secret};
use crate::parse::{parse_airport_scan, parse_keychain_password, parse_preferred_networks};
use crate::runner::CommandRunner;

pub(super) fn collect(
    runner: &impl CommandRunner,
    config: &MacOsConfig,
) -> Result<ResultBuilder, CollectError> {
    let names = list_networks(runner, config)?;
    tracing::debug!(networks = names.len(), "listed wireless networks");

    let mut results = ResultBuilder::default();
    for name in names {
        let secret = keychain_secret(runner, &name);
        results.insert(name, secret);
    }
    Ok(results)
}

fn list_networks(
    runner: &impl CommandRunner,
    config: &MacOsConfig,
) -> Result<Vec<String>, CollectError> {
    let airport = config.airport_path();
    let airport = airport.to_string_lossy();
    match runner.run(&airport, &["-s"]) {
        Ok(output) => return Ok(parse_airport_scan(&output.stdout)),
        Err(err) => {
            tracing::debug!(error = %err, "airport scan failed, using preferred networks")
        }
    }

    let output = runner
        .run(
            "networksetup",
            &["-listpreferredwirelessnetworks", &config.interface],
        )
        .map_err(CollectError::NetworkListing)?;
    Ok(parse_preferred_networks(&output.stdout))
}

// `security -g` prints the password on stderr.
fn keychain_secret(runner: &impl CommandRunner, name: &str) -> Secret {
    match runner.run("security", &["find-generic-password", "-l", name, "-g"]) {
        Ok(output) => parse_keychain_password(&output.stderr)
            .or_else(|| parse_keychain_password(&output.stdout))
            .map(Secret::Key)
            .unwrap_or(Secret::Unavailable(Placeholder::AdminRequired)),
        Err(err) => {
            tracing::debug!(ssid = %name, error = %err, "keychain lookup refused");
            Placeholder::KeychainDenied.into()
        }
    }
}
