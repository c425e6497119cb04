//! Connected clients and their destroy notification.
//!
//! Listeners attached to a client run synchronously inside
//! [`ClientRegistry::disconnect`], after the client has been removed from the
//! registry and before `disconnect` returns, so nothing can observe a
//! half-destroyed client.

use log::debug;
use std::collections::HashMap;
use std::fmt;

use super::ClientId;
use crate::error::{Result, ShellError};

pub type DestroyListener = Box<dyn FnMut(ClientId)>;

struct ClientEntry {
    pid: u32,
    destroy_listeners: Vec<DestroyListener>,
}

#[derive(Default)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, ClientEntry>,
    next_id: u64,
}

impl fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.clients.keys().collect();
        ids.sort();
        f.debug_struct("ClientRegistry")
            .field("clients", &ids)
            .finish()
    }
}

impl ClientRegistry {
    /// Register a new connection with the credentials of its process.
    pub fn connect(&mut self, pid: u32) -> ClientId {
        let id = ClientId(self.next_id);
        self.next_id += 1;
        self.clients.insert(
            id,
            ClientEntry {
                pid,
                destroy_listeners: Vec::new(),
            },
        );
        debug!("Client {} connected (pid {})", id, pid);
        id
    }

    pub fn is_connected(&self, client: ClientId) -> bool {
        self.clients.contains_key(&client)
    }

    pub fn pid(&self, client: ClientId) -> Option<u32> {
        self.clients.get(&client).map(|c| c.pid)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn add_destroy_listener(
        &mut self,
        client: ClientId,
        listener: DestroyListener,
    ) -> Result<()> {
        let entry = self
            .clients
            .get_mut(&client)
            .ok_or(ShellError::UnknownClient(client))?;
        entry.destroy_listeners.push(listener);
        Ok(())
    }

    /// Tear down a connection, firing its destroy listeners in registration
    /// order. Returns false if the client was not connected.
    pub fn disconnect(&mut self, client: ClientId) -> bool {
        let Some(entry) = self.clients.remove(&client) else {
            return false;
        };
        debug!(
            "Client {} disconnected, notifying {} listener(s)",
            client,
            entry.destroy_listeners.len()
        );
        for mut listener in entry.destroy_listeners {
            listener(client);
        }
        true
    }
}
