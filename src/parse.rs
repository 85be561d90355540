//! Text parsers for the output of the platform network tools and for the
//! keyfiles they leave on disk. Nothing here runs a process or touches the
//! filesystem.

use crate::models::{Placeholder, Secret};

pub(crate) const DEFAULT_PROFILE_MARKER: &str = "All User Profile";

const KEY_CONTENT_MARKER: &str = "Key Content";
const ENTERPRISE_MARKERS: [&str; 2] = ["WPA2-Enterprise", "WPA3-Enterprise"];
/// Counted over `split('\n')` pieces, so a trailing newline adds an empty
/// piece: `"a\nb\n"` is three and is not retried.
const MIN_DETAIL_LINES: usize = 3;

/// Profile names from `netsh wlan show profiles`.
pub(crate) fn parse_profile_names(output: &str, marker: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains(marker))
        .filter_map(|line| line.split_once(": "))
        .map(|(_, name)| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Detail output shorter than a real profile listing is retried with the
/// name quoted.
pub(crate) fn needs_quoted_retry(detail: &str) -> bool {
    detail.split('\n').count() < MIN_DETAIL_LINES
}

/// Secret from `netsh wlan show profile name=<X> key=clear`. The key is
/// everything after the first `": "`; leading spaces belong to the passphrase.
pub(crate) fn parse_profile_detail(output: &str) -> Secret {
    if ENTERPRISE_MARKERS.iter().any(|m| output.contains(m)) {
        return Placeholder::Enterprise.into();
    }

    match output.lines().find(|line| line.contains(KEY_CONTENT_MARKER)) {
        Some(line) => match line.split_once(": ") {
            Some((_, key)) => Secret::Key(key.trim_end().to_string()),
            None => Placeholder::ErrorRetrieving.into(),
        },
        None => Placeholder::NoPassword.into(),
    }
}

/// Network names from `airport -s`. The first column is the SSID, so names
/// containing spaces are cut at the first space.
pub(crate) fn parse_airport_scan(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Network names from `networksetup -listpreferredwirelessnetworks <iface>`.
pub(crate) fn parse_preferred_networks(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Password from `security find-generic-password -g`, which prints it as
/// `password: "<value>"`.
pub(crate) fn parse_keychain_password(output: &str) -> Option<String> {
    const MARKER: &str = "password: \"";

    output.lines().find_map(|line| {
        let start = line.find(MARKER)? + MARKER.len();
        let rest = &line[start..];
        let end = rest.rfind('"')?;
        Some(rest[..end].to_string())
    })
}

/// Network names from `iwlist scanning`.
pub(crate) fn parse_iwlist_essids(output: &str) -> Vec<String> {
    const MARKER: &str = "ESSID:\"";

    output
        .lines()
        .filter_map(|line| {
            let start = line.find(MARKER)? + MARKER.len();
            let rest = &line[start..];
            let name = rest.split('"').next().unwrap_or(rest);
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// First non-empty `key=value` entry for `key` in an INI-style keyfile,
/// ignoring sections.
pub(crate) fn keyfile_value<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    content.lines().find_map(|line| {
        let (k, v) = line.split_once('=')?;
        let v = v.trim();
        (k.trim() == key && !v.is_empty()).then_some(v)
    })
}

/// SSID and secret of a NetworkManager connection keyfile. Files without an
/// `ssid=` entry are named after `fallback_name`.
pub(crate) fn parse_nm_keyfile(content: &str, fallback_name: &str) -> (String, Secret) {
    let name = keyfile_value(content, "ssid")
        .unwrap_or(fallback_name)
        .to_string();
    let secret = match keyfile_value(content, "psk") {
        Some(psk) => Secret::Key(psk.to_string()),
        None => Placeholder::NoPasswordOrEnterprise.into(),
    };
    (name, secret)
}

/// Secret of an iwd `.psk` storage file.
pub(crate) fn parse_iwd_psk(content: &str) -> Secret {
    keyfile_value(content, "Passphrase")
        .or_else(|| keyfile_value(content, "PreSharedKey"))
        .map(|key| Secret::Key(key.to_string()))
        .unwrap_or(Secret::Unavailable(Placeholder::NoPassword))
}

/// File stem iwd uses for a network: the SSID itself when it is made of
/// alphanumerics, `-`, `_` and spaces, otherwise `=` followed by its hex bytes.
pub(crate) fn iwd_storage_stem(ssid: &str) -> String {
    let plain = ssid
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ' ');
    if plain {
        return ssid.to_string();
    }

    let mut out = String::with_capacity(1 + ssid.len() * 2);
    out.push('=');
    for byte in ssid.as_bytes() {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
