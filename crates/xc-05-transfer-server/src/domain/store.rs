//! # Transfer Store
//!
//! In-memory registry of committed aggregates. One writer (the aggregation
//! engine) and any number of readers share a single reader/writer lock.
//! Entries are never removed.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use shared_types::TransferId;
use tracing::debug;
use xc_01_data_segment::Aggregate;

use super::entities::Transfer;

#[derive(Debug, Default)]
struct Registry {
    next_id: TransferId,
    entries: HashMap<TransferId, Arc<Transfer>>,
}

/// Registry of transfers keyed by monotonically increasing ids.
#[derive(Debug, Clone, Default)]
pub struct TransferStore {
    inner: Arc<RwLock<Registry>>,
}

impl TransferStore {
    /// Empty registry; the first id is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an aggregate and return its fresh id.
    pub fn register(&self, locations: Vec<String>, aggregate: Arc<Aggregate>) -> TransferId {
        let mut registry = self.inner.write();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.insert(
            id,
            Arc::new(Transfer {
                id,
                locations,
                aggregate,
            }),
        );
        debug!(transfer_id = id, "[xc-05] Transfer registered");
        id
    }

    /// Look up a transfer.
    pub fn get(&self, id: TransferId) -> Option<Arc<Transfer>> {
        self.inner.read().entries.get(&id).cloned()
    }

    /// Number of registered transfers.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// True when nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{PaddedPieceSize, PieceCommitment, PieceInfo};

    fn aggregate() -> Arc<Aggregate> {
        let piece = PieceInfo {
            size: PaddedPieceSize::new(512).unwrap(),
            commitment: PieceCommitment::from_node([1u8; 32]).unwrap(),
        };
        Arc::new(Aggregate::new(PaddedPieceSize::new(4096).unwrap(), &[piece]).unwrap())
    }

    #[test]
    fn test_ids_start_at_zero_and_increase() {
        let store = TransferStore::new();
        assert!(store.is_empty());
        assert_eq!(store.register(vec!["a".into()], aggregate()), 0);
        assert_eq!(store.register(vec!["b".into()], aggregate()), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_get_returns_registered_entry() {
        let store = TransferStore::new();
        let id = store.register(vec!["http://piece".into()], aggregate());
        let transfer = store.get(id).unwrap();
        assert_eq!(transfer.locations, vec!["http://piece".to_string()]);
        assert!(store.get(id + 1).is_none());
    }

    #[test]
    fn test_concurrent_registration_yields_unique_ids() {
        let store = TransferStore::new();
        let agg = aggregate();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let agg = Arc::clone(&agg);
                std::thread::spawn(move || store.register(vec![], agg))
            })
            .collect();
        let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());
    }
}
