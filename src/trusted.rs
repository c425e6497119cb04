//! Clients trusted with privileged protocol interfaces
//!
//! Each interface name maps to the clients allowed to bind it. Registering a
//! client subscribes to its destroy notification, and the entry is removed
//! inside that notification, so a disconnected client is never reported as
//! trusted.

use log::{debug, info};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::compositor::{ClientId, ClientRegistry};
use crate::error::Result;

type TrustTable = HashMap<String, Vec<ClientId>>;

#[derive(Debug, Default)]
pub struct TrustedClients {
    table: Rc<RefCell<TrustTable>>,
}

impl TrustedClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust `client` for `interface`. Registering the same pair twice keeps
    /// a single entry.
    pub fn add(
        &mut self,
        interface: &str,
        client: ClientId,
        clients: &mut ClientRegistry,
    ) -> Result<()> {
        if self.is_trusted(interface, client) {
            debug!("{} already trusted for {}", client, interface);
            return Ok(());
        }

        let weak: Weak<RefCell<TrustTable>> = Rc::downgrade(&self.table);
        let name = interface.to_string();
        clients.add_destroy_listener(
            client,
            Box::new(move |gone| {
                let Some(table) = weak.upgrade() else {
                    return;
                };
                let mut table = table.borrow_mut();
                if let Some(list) = table.get_mut(&name) {
                    list.retain(|&c| c != gone);
                    if list.is_empty() {
                        table.remove(&name);
                    }
                }
                debug!("{} no longer trusted for {}", gone, name);
            }),
        )?;

        self.table
            .borrow_mut()
            .entry(interface.to_string())
            .or_default()
            .push(client);
        info!("🔐 Trusted {} for {}", client, interface);
        Ok(())
    }

    pub fn is_trusted(&self, interface: &str, client: ClientId) -> bool {
        self.table
            .borrow()
            .get(interface)
            .map_or(false, |list| list.contains(&client))
    }

    /// Number of (interface, client) entries
    pub fn len(&self) -> usize {
        self.table.borrow().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellError;

    const DESKTOP_SHELL: &str = "desktop_shell";
    const SCREENSHOOTER: &str = "orbital_screenshooter";

    #[test]
    fn test_trust_is_dropped_on_disconnect() {
        let mut clients = ClientRegistry::default();
        let mut trusted = TrustedClients::new();
        let c = clients.connect(4242);

        trusted.add(DESKTOP_SHELL, c, &mut clients).unwrap();
        assert!(trusted.is_trusted(DESKTOP_SHELL, c));
        assert!(!trusted.is_trusted(SCREENSHOOTER, c));

        assert!(clients.disconnect(c));
        assert!(!trusted.is_trusted(DESKTOP_SHELL, c));
        assert!(trusted.is_empty());
    }

    #[test]
    fn test_duplicate_registration_is_single_entry() {
        let mut clients = ClientRegistry::default();
        let mut trusted = TrustedClients::new();
        let c = clients.connect(1);

        trusted.add(DESKTOP_SHELL, c, &mut clients).unwrap();
        trusted.add(DESKTOP_SHELL, c, &mut clients).unwrap();
        trusted.add(SCREENSHOOTER, c, &mut clients).unwrap();
        assert_eq!(trusted.len(), 2);

        clients.disconnect(c);
        assert!(trusted.is_empty());
    }

    #[test]
    fn test_other_clients_survive_disconnect() {
        let mut clients = ClientRegistry::default();
        let mut trusted = TrustedClients::new();
        let a = clients.connect(1);
        let b = clients.connect(2);
        trusted.add(DESKTOP_SHELL, a, &mut clients).unwrap();
        trusted.add(DESKTOP_SHELL, b, &mut clients).unwrap();

        clients.disconnect(a);
        assert!(!trusted.is_trusted(DESKTOP_SHELL, a));
        assert!(trusted.is_trusted(DESKTOP_SHELL, b));
    }

    #[test]
    fn test_unknown_client_is_rejected() {
        let mut clients = ClientRegistry::default();
        let mut trusted = TrustedClients::new();
        let err = trusted
            .add(DESKTOP_SHELL, ClientId(99), &mut clients)
            .unwrap_err();
        assert_eq!(err, ShellError::UnknownClient(ClientId(99)));
        assert!(trusted.is_empty());
    }

    #[test]
    fn test_registry_outliving_trust_table() {
        let mut clients = ClientRegistry::default();
        let c = clients.connect(1);
        {
            let mut trusted = TrustedClients::new();
            trusted.add(DESKTOP_SHELL, c, &mut clients).unwrap();
        }
        assert!(clients.disconnect(c));
    }
}
