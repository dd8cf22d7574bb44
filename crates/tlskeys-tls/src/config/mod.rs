//! Key pool configuration with builder pattern.

use crate::crypt::NamedGroup;

/// Default number of pre-generated keys per group.
pub const KEY_POOL_CAPACITY: usize = 100;

/// Configuration for a [`KeyPoolSet`](crate::handshake::key_pool::KeyPoolSet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPoolConfig {
    /// Keys generated per pool on first fill.
    pub capacity: usize,
    /// Groups that get a pool. Other groups are always generated on demand.
    pub groups: Vec<NamedGroup>,
    /// Fill a pool on its first `acquire` instead of waiting for
    /// `initialize_all`.
    pub lazy_fill: bool,
}

impl KeyPoolConfig {
    pub fn builder() -> KeyPoolConfigBuilder {
        KeyPoolConfigBuilder::default()
    }
}

impl Default for KeyPoolConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for `KeyPoolConfig`.
#[derive(Debug)]
pub struct KeyPoolConfigBuilder {
    capacity: usize,
    groups: Vec<NamedGroup>,
    lazy_fill: bool,
}

impl Default for KeyPoolConfigBuilder {
    fn default() -> Self {
        Self {
            capacity: KEY_POOL_CAPACITY,
            groups: vec![
                NamedGroup::X25519,
                NamedGroup::SECP256R1,
                NamedGroup::SECP384R1,
                NamedGroup::SECP521R1,
            ],
            lazy_fill: true,
        }
    }
}

impl KeyPoolConfigBuilder {
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn groups(mut self, groups: &[NamedGroup]) -> Self {
        self.groups = groups.to_vec();
        self
    }

    pub fn lazy_fill(mut self, enabled: bool) -> Self {
        self.lazy_fill = enabled;
        self
    }

    /// Duplicate groups collapse to their first occurrence.
    pub fn build(self) -> KeyPoolConfig {
        let mut groups: Vec<NamedGroup> = Vec::with_capacity(self.groups.len());
        for group in self.groups {
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
        KeyPoolConfig {
            capacity: self.capacity,
            groups,
            lazy_fill: self.lazy_fill,
        }
    }
}
