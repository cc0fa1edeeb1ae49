//! UTXO Set: 𝒰𝒮 = 𝒪 → 𝒯
//!
//! Snapshots are persistent: a child snapshot is a thin layer of additions
//! and removals on top of a shared, immutable parent. Layers are flattened
//! once a chain of them grows past [`MAX_SNAPSHOT_DEPTH`], which bounds both
//! lookup cost and how much pruned history a live snapshot can pin.

use crate::constants::MAX_SNAPSHOT_DEPTH;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct Layer {
    added: HashMap<OutPoint, TransactionOutput>,
    spent: HashSet<OutPoint>,
    parent: Option<Arc<Layer>>,
    depth: usize,
}

impl Layer {
    fn get(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        let mut layer = self;
        loop {
            if let Some(output) = layer.added.get(outpoint) {
                return Some(output);
            }
            if layer.spent.contains(outpoint) {
                return None;
            }
            layer = layer.parent.as_deref()?;
        }
    }

    fn parent_contains(&self, outpoint: &OutPoint) -> bool {
        self.parent.as_deref().map_or(false, |p| p.get(outpoint).is_some())
    }
}

/// A snapshot of spendable outputs on one branch.
///
/// Cloning is O(1). Mutating a clone never affects the original.
#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    top: Arc<Layer>,
    len: usize,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new snapshot on top of this one.
    pub fn branch(&self) -> UtxoSet {
        if self.top.depth >= MAX_SNAPSHOT_DEPTH {
            return self.flatten().branch_unchecked();
        }
        self.branch_unchecked()
    }

    fn branch_unchecked(&self) -> UtxoSet {
        // An empty top layer adds nothing to share.
        if self.top.added.is_empty() && self.top.spent.is_empty() {
            return self.clone();
        }
        UtxoSet {
            top: Arc::new(Layer {
                parent: Some(Arc::clone(&self.top)),
                depth: self.top.depth + 1,
                ..Layer::default()
            }),
            len: self.len,
        }
    }

    /// Collapse every layer into a single standalone one.
    pub fn flatten(&self) -> UtxoSet {
        UtxoSet {
            top: Arc::new(Layer {
                added: self.to_map(),
                ..Layer::default()
            }),
            len: self.len,
        }
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.top.get(outpoint).is_some()
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&TransactionOutput> {
        self.top.get(outpoint)
    }

    /// Insert or overwrite the output stored under `outpoint`.
    pub fn add_utxo(&mut self, outpoint: OutPoint, output: TransactionOutput) {
        let existed = self.contains(&outpoint);
        Arc::make_mut(&mut self.top).added.insert(outpoint, output);
        if !existed {
            self.len += 1;
        }
    }

    /// Remove `outpoint`, returning the output it held.
    pub fn remove_utxo(&mut self, outpoint: &OutPoint) -> Option<TransactionOutput> {
        let output = self.get(outpoint)?.clone();
        let shadow = self.top.parent_contains(outpoint);
        let top = Arc::make_mut(&mut self.top);
        top.added.remove(outpoint);
        if shadow {
            top.spent.insert(*outpoint);
        }
        self.len -= 1;
        Some(output)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of stacked layers behind this snapshot.
    pub fn depth(&self) -> usize {
        self.top.depth
    }

    /// All outpoints currently spendable, in no particular order.
    pub fn outpoints(&self) -> Vec<OutPoint> {
        self.to_map().into_keys().collect()
    }

    /// Materialize the snapshot as a plain map.
    pub fn to_map(&self) -> HashMap<OutPoint, TransactionOutput> {
        let mut layers = Vec::with_capacity(self.top.depth + 1);
        let mut layer = Some(self.top.as_ref());
        while let Some(l) = layer {
            layers.push(l);
            layer = l.parent.as_deref();
        }

        let mut map = HashMap::with_capacity(self.len);
        for l in layers.into_iter().rev() {
            for outpoint in &l.spent {
                map.remove(outpoint);
            }
            for (outpoint, output) in &l.added {
                map.insert(*outpoint, output.clone());
            }
        }
        map
    }
}

impl PartialEq for UtxoSet {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.to_map() == other.to_map()
    }
}

impl Eq for UtxoSet {}

impl FromIterator<(OutPoint, TransactionOutput)> for UtxoSet {
    fn from_iter<I: IntoIterator<Item = (OutPoint, TransactionOutput)>>(iter: I) -> Self {
        let mut set = UtxoSet::new();
        for (outpoint, output) in iter {
            set.add_utxo(outpoint, output);
        }
        set
    }
}
