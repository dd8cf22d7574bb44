//! Pre-generated ephemeral key shares.
//!
//! Generating an ECDHE key costs a scalar multiplication per handshake. A
//! [`KeyPool`] front-loads that work: it generates `capacity` keys once and
//! then serves a uniformly chosen one to each handshake. The pooled list is
//! published through a [`OnceLock`], so readers either see no list or a fully
//! generated one; after publication reads take no lock.
//!
//! Pooled keys are shared read-only and the same key may be handed to several
//! concurrent handshakes. Callers that need a fresh key per connection should
//! use [`KeyExchange::generate`] directly.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use rand::Rng;
use tlskeys_types::TlsError;
use tracing::{debug, warn};

use super::key_exchange::KeyExchange;
use crate::config::KeyPoolConfig;
use crate::crypt::NamedGroup;

pub use crate::config::KEY_POOL_CAPACITY;

/// Fixed set of pre-generated keys for one named group.
#[derive(Debug)]
pub struct KeyPool {
    group: NamedGroup,
    capacity: usize,
    keys: OnceLock<Vec<Arc<KeyExchange>>>,
}

impl KeyPool {
    pub fn new(group: NamedGroup, capacity: usize) -> Self {
        Self {
            group,
            capacity,
            keys: OnceLock::new(),
        }
    }

    pub fn group(&self) -> NamedGroup {
        self.group
    }

    /// Generate and publish the pool; later calls are no-ops.
    ///
    /// Concurrent callers block until the first one has published. A key
    /// whose generation fails is skipped, so the pool may end up short.
    /// Returns the number of published keys.
    pub fn initialize(&self) -> usize {
        self.keys.get_or_init(|| self.fill()).len()
    }

    fn fill(&self) -> Vec<Arc<KeyExchange>> {
        let mut keys = Vec::with_capacity(self.capacity);
        for _ in 0..self.capacity {
            match KeyExchange::generate(self.group) {
                Ok(kx) => keys.push(Arc::new(kx)),
                Err(e) => warn!(group = self.group.0, error = %e, "key pool: skipping key"),
            }
        }
        debug!(
            group = self.group.0,
            generated = keys.len(),
            capacity = self.capacity,
            "key pool filled"
        );
        keys
    }

    pub fn is_initialized(&self) -> bool {
        self.keys.get().is_some()
    }

    /// Number of published keys (0 before initialization).
    pub fn len(&self) -> usize {
        self.keys.get().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A uniformly chosen published key, or `None` if the pool is unpublished
    /// or empty.
    ///
    /// Index selection uses the thread-local RNG; key material itself always
    /// comes from the OS CSPRNG.
    pub fn random_key(&self) -> Option<Arc<KeyExchange>> {
        let keys = self.keys.get()?;
        if keys.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..keys.len());
        Some(Arc::clone(&keys[idx]))
    }
}

/// Key pools for a set of named groups.
#[derive(Debug)]
pub struct KeyPoolSet {
    pools: HashMap<NamedGroup, KeyPool>,
    lazy_fill: bool,
}

static GLOBAL_POOLS: OnceLock<KeyPoolSet> = OnceLock::new();

impl KeyPoolSet {
    /// Build an (unfilled) set. Configured groups without a key exchange
    /// primitive get no pool.
    pub fn new(config: &KeyPoolConfig) -> Self {
        let mut pools = HashMap::with_capacity(config.groups.len());
        for &group in &config.groups {
            if !group.is_supported() {
                warn!(group = group.0, "key pool: unsupported group not pooled");
                continue;
            }
            pools.insert(group, KeyPool::new(group, config.capacity));
        }
        Self {
            pools,
            lazy_fill: config.lazy_fill,
        }
    }

    /// Process-wide set built from [`KeyPoolConfig::default`].
    pub fn global() -> &'static KeyPoolSet {
        GLOBAL_POOLS.get_or_init(|| KeyPoolSet::new(&KeyPoolConfig::default()))
    }

    pub fn pool(&self, group: NamedGroup) -> Option<&KeyPool> {
        self.pools.get(&group)
    }

    /// Fill every pool now.
    pub fn initialize_all(&self) {
        for pool in self.pools.values() {
            pool.initialize();
        }
    }

    /// Key share for `group`: a pooled key when one is available, otherwise a
    /// freshly generated one.
    pub fn acquire(&self, group: NamedGroup) -> Result<Arc<KeyExchange>, TlsError> {
        if let Some(pool) = self.pools.get(&group) {
            if self.lazy_fill {
                pool.initialize();
            }
            if let Some(key) = pool.random_key() {
                return Ok(key);
            }
        }
        KeyExchange::generate(group).map(Arc::new)
    }
}

/// [`KeyPoolSet::acquire`] on the global set.
pub fn acquire(group: NamedGroup) -> Result<Arc<KeyExchange>, TlsError> {
    KeyPoolSet::global().acquire(group)
}

/// [`KeyPoolSet::initialize_all`] on the global set.
pub fn initialize_all() {
    KeyPoolSet::global().initialize_all()
}
