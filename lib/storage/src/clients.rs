//! Stored demo clients
//!
//! A read-only set of known applications (features plus the observed
//! outcome) that can be scored and explained by id.

use crate::metadata::read_json;
use ahash::AHashMap;
use creditx_core::{Error, PartialClientRecord, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredClient {
    pub client_id: u64,
    /// Observed outcome: 1 defaulted, 0 repaid
    #[serde(default)]
    pub real_target: Option<u8>,
    pub features: PartialClientRecord,
}

#[derive(Debug, Clone, Default)]
pub struct ClientStore {
    clients: Vec<StoredClient>,
    index: AHashMap<u64, usize>,
}

impl ClientStore {
    pub fn new(clients: Vec<StoredClient>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(clients.len());
        for (position, client) in clients.iter().enumerate() {
            if let Some(target) = client.real_target {
                if target > 1 {
                    return Err(Error::SchemaLoad(format!(
                        "client {} has real_target {}, expected 0 or 1",
                        client.client_id, target
                    )));
                }
            }
            if index.insert(client.client_id, position).is_some() {
                return Err(Error::SchemaLoad(format!(
                    "duplicate client id {}",
                    client.client_id
                )));
            }
        }
        Ok(Self { clients, index })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let clients: Vec<StoredClient> = read_json(path, "client list")?;
        Self::new(clients)
    }

    pub fn get(&self, client_id: u64) -> Option<&StoredClient> {
        self.index.get(&client_id).map(|&i| &self.clients[i])
    }

    /// First `limit` clients in file order
    pub fn list(&self, limit: usize) -> &[StoredClient] {
        &self.clients[..limit.min(self.clients.len())]
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: u64, target: Option<u8>) -> StoredClient {
        StoredClient {
            client_id: id,
            real_target: target,
            features: PartialClientRecord::new().with("AMT_CREDIT", 1000.0),
        }
    }

    #[test]
    fn test_lookup_and_list() {
        let store = ClientStore::new(vec![
            client(396899, Some(0)),
            client(345558, Some(1)),
            client(100002, None),
        ])
        .unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get(345558).unwrap().real_target, Some(1));
        assert!(store.get(1).is_none());
        assert_eq!(store.list(2).len(), 2);
        assert_eq!(store.list(100).len(), 3);
        assert_eq!(store.list(2)[0].client_id, 396899);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = ClientStore::new(vec![client(1, None), client(1, Some(0))]);
        assert!(matches!(result, Err(Error::SchemaLoad(_))));
    }

    #[test]
    fn test_invalid_target_rejected() {
        let result = ClientStore::new(vec![client(1, Some(3))]);
        assert!(matches!(result, Err(Error::SchemaLoad(_))));
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clients.json");
        std::fs::write(
            &path,
            r#"[{"client_id": 7, "real_target": 0, "features": {"AMT_CREDIT": 1.0, "CODE_GENDER": "F"}}]"#,
        )
        .unwrap();

        let store = ClientStore::load(&path).unwrap();
        let stored = store.get(7).unwrap();
        assert_eq!(stored.features.get("CODE_GENDER").and_then(|v| v.as_str()), Some("F"));
    }
}
