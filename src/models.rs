use std::collections::BTreeMap;
use std::fmt;

use crate::error::CollectError;

/// Fixed status strings shown in place of a key that could not be disclosed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Placeholder {
    Enterprise,
    NoPassword,
    ErrorRetrieving,
    AdminRequired,
    KeychainDenied,
    SystemKeyring,
    NoPasswordOrEnterprise,
    PermissionDenied,
}

impl Placeholder {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Enterprise => "Enterprise Authentication - Not Available",
            Self::NoPassword => "No Password or Not Available",
            Self::ErrorRetrieving => "Error Retrieving Password",
            Self::AdminRequired => "Password access requires admin privileges",
            Self::KeychainDenied => "Not Available (Admin privileges required)",
            Self::SystemKeyring => "Password stored in system keyring",
            Self::NoPasswordOrEnterprise => "No Password or Enterprise Auth",
            Self::PermissionDenied => "Permission Denied (Run as root)",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Secret {
    Key(String),
    Unavailable(Placeholder),
    /// Message of a scan that failed before any network could be named.
    Error(String),
}

impl Secret {
    pub(crate) fn is_key(&self) -> bool {
        matches!(self, Self::Key(_))
    }
}

impl From<Placeholder> for Secret {
    fn from(value: Placeholder) -> Self {
        Self::Unavailable(value)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Unavailable(placeholder) => f.write_str(placeholder.as_str()),
            Self::Error(message) => f.write_str(message),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct NetworkRecord {
    pub(crate) seq: usize,
    pub(crate) name: String,
    pub(crate) secret: Secret,
}

/// Accumulates name/secret pairs during a scan. A repeated name replaces the
/// earlier secret.
#[derive(Debug, Default)]
pub(crate) struct ResultBuilder {
    entries: BTreeMap<String, Secret>,
}

impl ResultBuilder {
    pub(crate) fn insert(&mut self, name: impl Into<String>, secret: impl Into<Secret>) {
        self.entries.insert(name.into(), secret.into());
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn finish(self) -> ResultSet {
        let records = self
            .entries
            .into_iter()
            .enumerate()
            .map(|(idx, (name, secret))| NetworkRecord {
                seq: idx + 1,
                name,
                secret,
            })
            .collect();
        ResultSet { records }
    }
}

/// Name-sorted scan result, numbered from 1.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ResultSet {
    records: Vec<NetworkRecord>,
}

impl ResultSet {
    pub(crate) fn from_error(err: &CollectError) -> Self {
        let mut builder = ResultBuilder::default();
        builder.insert("Error", Secret::Error(err.to_string()));
        builder.finish()
    }

    pub(crate) fn records(&self) -> &[NetworkRecord] {
        &self.records
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&NetworkRecord> {
        self.records.get(idx)
    }

    pub(crate) fn is_error(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r.secret, Secret::Error(_)))
    }
}

/// Network iwd holds a profile for, as reported over D-Bus.
#[derive(Clone, Debug, Default)]
pub(crate) struct KnownNetwork {
    pub(crate) name: String,
    /// `psk`, `open`, `8021x` or `wep`; `None` when iwd did not answer.
    pub(crate) network_type: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Platform {
    Windows,
    MacOs,
    Linux,
    Unsupported(String),
}

impl Platform {
    pub(crate) fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub(crate) fn from_os_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "windows" => Self::Windows,
            "macos" | "darwin" => Self::MacOs,
            "linux" => Self::Linux,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => f.write_str("Windows"),
            Self::MacOs => f.write_str("macOS"),
            Self::Linux => f.write_str("Linux"),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}
