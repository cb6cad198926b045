//! Shared active/archive storage behind the in-memory repositories.

use std::collections::HashMap;
use std::hash::Hash;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::ports::{RepositoryError, RepositoryResult};

/// Active and archive collections for one record kind.
#[derive(Debug)]
pub(super) struct Collections<K, V> {
    pub(super) active: HashMap<K, V>,
    pub(super) archive: HashMap<K, V>,
}

impl<K, V> Default for Collections<K, V> {
    fn default() -> Self {
        Self {
            active: HashMap::new(),
            archive: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy, V> Collections<K, V> {
    /// Copies the active record into the archive, then removes it.
    pub(super) fn move_to_archive(&mut self, key: K) -> bool {
        let Some(record) = self.active.remove(&key) else {
            return false;
        };
        self.archive.insert(key, record);
        true
    }

    pub(super) fn contains(&self, key: &K) -> bool {
        self.active.contains_key(key) || self.archive.contains_key(key)
    }
}

/// Lock-protected collections with a connectivity switch.
#[derive(Debug)]
pub(super) struct SharedCollections<K, V> {
    state: Arc<RwLock<Collections<K, V>>>,
    online: Arc<AtomicBool>,
}

impl<K, V> Clone for SharedCollections<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            online: Arc::clone(&self.online),
        }
    }
}

impl<K, V> Default for SharedCollections<K, V> {
    fn default() -> Self {
        Self {
            state: Arc::default(),
            online: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl<K, V> SharedCollections<K, V> {
    pub(super) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> RepositoryResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::unavailable(io::Error::new(
                io::ErrorKind::NotConnected,
                "in-memory store is offline",
            )))
        }
    }

    pub(super) fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Collections<K, V>>> {
        self.ensure_online()?;
        self.state
            .read()
            .map_err(|err| RepositoryError::unavailable(io::Error::other(err.to_string())))
    }

    pub(super) fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Collections<K, V>>> {
        self.ensure_online()?;
        self.state
            .write()
            .map_err(|err| RepositoryError::unavailable(io::Error::other(err.to_string())))
    }
}
