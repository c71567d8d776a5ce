//! Fixed-shape per-category tag sets

use crate::taxonomy::CategoryKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One tag set per role category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    pub dbs: BTreeSet<String>,
    pub servers: BTreeSet<String>,
    pub buses: BTreeSet<String>,
    pub langs: BTreeSet<String>,
    pub gates: BTreeSet<String>,
    pub monitors: BTreeSet<String>,
    pub discos: BTreeSet<String>,
}

impl Tags {
    /// Create an empty tag record
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tags of one category
    pub fn get(&self, kind: CategoryKind) -> &BTreeSet<String> {
        match kind {
            CategoryKind::Dbs => &self.dbs,
            CategoryKind::Servers => &self.servers,
            CategoryKind::Buses => &self.buses,
            CategoryKind::Langs => &self.langs,
            CategoryKind::Gates => &self.gates,
            CategoryKind::Monitors => &self.monitors,
            CategoryKind::Discos => &self.discos,
        }
    }

    /// Returns the mutable tags of one category
    pub fn get_mut(&mut self, kind: CategoryKind) -> &mut BTreeSet<String> {
        match kind {
            CategoryKind::Dbs => &mut self.dbs,
            CategoryKind::Servers => &mut self.servers,
            CategoryKind::Buses => &mut self.buses,
            CategoryKind::Langs => &mut self.langs,
            CategoryKind::Gates => &mut self.gates,
            CategoryKind::Monitors => &mut self.monitors,
            CategoryKind::Discos => &mut self.discos,
        }
    }

    /// Add a single tag to a category
    pub fn insert(&mut self, kind: CategoryKind, tag: impl Into<String>) {
        self.get_mut(kind).insert(tag.into());
    }

    /// Union every category of `other` into this record
    pub fn merge(&mut self, other: &Tags) {
        for kind in CategoryKind::all() {
            self.get_mut(*kind)
                .extend(other.get(*kind).iter().cloned());
        }
    }

    /// Returns true if any infrastructure category carries a tag
    pub fn has_infrastructure(&self) -> bool {
        CategoryKind::infrastructure()
            .iter()
            .any(|kind| !self.get(*kind).is_empty())
    }

    /// Per-category cardinalities
    pub fn counts(&self) -> TagCounts {
        TagCounts {
            num_dbs: self.dbs.len(),
            num_servers: self.servers.len(),
            num_buses: self.buses.len(),
            num_langs: self.langs.len(),
            num_gates: self.gates.len(),
            num_monitors: self.monitors.len(),
            num_discos: self.discos.len(),
        }
    }
}

/// Per-category tag counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    pub num_dbs: usize,
    pub num_servers: usize,
    pub num_buses: usize,
    pub num_langs: usize,
    pub num_gates: usize,
    pub num_monitors: usize,
    pub num_discos: usize,
}
