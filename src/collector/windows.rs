use crate::config::WindowsConfig;
use crate::error::{CollectError, CommandError};
use crate::models::{Placeholder, ResultBuilder};
use crate::parse::{needs_quoted_retry, parse_profile_detail, parse_profile_names};
use crate::runner::CommandRunner;

const NETSH: &str = "netsh";

pub(super) fn collect(
    runner: &impl CommandRunner,
    config: &WindowsConfig,
) -> Result<ResultBuilder, CollectError> {
    let listing = runner
        .run(NETSH, &["wlan", "show", "profiles"])
        .map_err(CollectError::ProfileListing)?;
    let names = parse_profile_names(&listing.stdout, &config.profile_marker);
    tracing::debug!(profiles = names.len(), "listed wlan profiles");

    let mut results = ResultBuilder::default();
    for name in names {
        let secret = match profile_detail(runner, &name) {
            Ok(detail) => parse_profile_detail(&detail),
            Err(err) => {
                tracing::warn!(ssid = %name, error = %err, "failed to read wlan profile");
                Placeholder::ErrorRetrieving.into()
            }
        };
        results.insert(name, secret);
    }
    Ok(results)
}

fn profile_detail(runner: &impl CommandRunner, name: &str) -> Result<String, CommandError> {
    let plain = format!("name={name}");
    match runner.run(NETSH, &["wlan", "show", "profile", &plain, "key=clear"]) {
        Ok(output) if !needs_quoted_retry(&output.stdout) => return Ok(output.stdout),
        Ok(_) => tracing::debug!(ssid = %name, "short profile output, retrying with quoted name"),
        Err(err) => tracing::debug!(ssid = %name, error = %err, "retrying with quoted name"),
    }

    let quoted = format!("name=\"{name}\"");
    runner
        .run(NETSH, &["wlan", "show", "profile", &quoted, "key=clear"])
        .map(|output| output.stdout)
}
