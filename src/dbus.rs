use std::collections::HashMap;

use zbus::blocking::{Connection, Proxy};
use zvariant::{OwnedObjectPath, OwnedValue};

use crate::models::KnownNetwork;

const IWD_SERVICE: &str = "net.connman.iwd";
const OBJECT_MANAGER_IFACE: &str = "org.freedesktop.DBus.ObjectManager";
const KNOWN_NETWORK_IFACE: &str = "net.connman.iwd.KnownNetwork";

type PropMap = HashMap<String, OwnedValue>;
type InterfaceMap = HashMap<String, PropMap>;
type ManagedObjects = HashMap<OwnedObjectPath, InterfaceMap>;

/// Read-only view of the networks iwd has stored credentials for.
#[derive(Debug)]
pub(crate) struct IwdDbus {
    conn: Connection,
}

impl IwdDbus {
    pub(crate) fn new() -> Result<Self, String> {
        let conn = Connection::system().map_err(|e| e.to_string())?;
        Ok(Self { conn })
    }

    fn managed_objects(&self) -> Result<ManagedObjects, String> {
        let proxy = Proxy::new(&self.conn, IWD_SERVICE, "/", OBJECT_MANAGER_IFACE)
            .map_err(|e| e.to_string())?;
        proxy
            .call("GetManagedObjects", &())
            .map_err(|e| e.to_string())
    }

    /// Known networks from iwd's object tree. Only an unreachable iwd is an
    /// error; an object whose name cannot be read is skipped.
    pub(crate) fn list_known_networks(&self) -> Result<Vec<KnownNetwork>, String> {
        let objects = self.managed_objects()?;
        let mut out = Vec::new();

        for (path, interfaces) in objects {
            if !interfaces.contains_key(KNOWN_NETWORK_IFACE) {
                continue;
            }

            let proxy =
                match Proxy::new(&self.conn, IWD_SERVICE, path.as_str(), KNOWN_NETWORK_IFACE) {
                    Ok(proxy) => proxy,
                    Err(err) => {
                        tracing::warn!(object = path.as_str(), error = %err, "skipping known network");
                        continue;
                    }
                };

            let name: String = match proxy.get_property("Name") {
                Ok(name) => name,
                Err(err) => {
                    tracing::warn!(object = path.as_str(), error = %err, "failed to read known network name");
                    continue;
                }
            };
            let network_type: Option<String> = match proxy.get_property("Type") {
                Ok(network_type) => Some(network_type),
                Err(err) => {
                    tracing::warn!(ssid = %name, error = %err, "failed to read known network type");
                    None
                }
            };

            out.push(KnownNetwork { name, network_type });
        }

        Ok(out)
    }
}
