//! Order book store
//!
//! Two independent price → quantity maps, one per side. Each side is a
//! `BTreeMap` behind a `parking_lot::RwLock`: the applier is the only writer,
//! any number of threads read through [`SideView`] handles. A pair is always
//! written and read under the lock, so readers never see a price with a
//! quantity from a different write.

use l2book_core::{Price, PriceLevel, Quantity};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which side of the book a map holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideKind {
    Bid,
    Ask,
}

impl SideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SideKind::Bid => "bids",
            SideKind::Ask => "asks",
        }
    }
}

type Levels = BTreeMap<Decimal, Decimal>;

/// Writable side of the book. Owned by the applier.
#[derive(Debug)]
pub struct BookSide {
    kind: SideKind,
    levels: Arc<RwLock<Levels>>,
}

impl BookSide {
    pub fn new(kind: SideKind) -> Self {
        BookSide {
            kind,
            levels: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn kind(&self) -> SideKind {
        self.kind
    }

    /// Read-only handle sharing this side's storage
    pub fn view(&self) -> SideView {
        SideView {
            kind: self.kind,
            levels: Arc::clone(&self.levels),
        }
    }

    /// Insert or overwrite `price`. A zero quantity removes the level instead.
    pub fn upsert(&self, price: Price, quantity: Quantity) {
        let mut levels = self.levels.write();
        write_level(&mut levels, price, quantity);
    }

    /// Remove `price`; returns the quantity that was resting there, if any
    pub fn remove(&self, price: Price) -> Option<Quantity> {
        self.levels.write().remove(&price)
    }

    /// Apply several changes under one write lock, in order
    pub fn apply_batch<I>(&self, changes: I) -> usize
    where
        I: IntoIterator<Item = (Price, Quantity)>,
    {
        let mut levels = self.levels.write();
        let mut applied = 0;
        for (price, quantity) in changes {
            write_level(&mut levels, price, quantity);
            applied += 1;
        }
        applied
    }

    /// Replace every level with `levels` under one write lock
    pub fn replace<I>(&self, levels: I) -> usize
    where
        I: IntoIterator<Item = (Price, Quantity)>,
    {
        let mut current = self.levels.write();
        current.clear();
        let mut applied = 0;
        for (price, quantity) in levels {
            write_level(&mut current, price, quantity);
            applied += 1;
        }
        applied
    }

    /// Drop every level
    pub fn clear(&self) {
        self.levels.write().clear();
    }

    pub fn get(&self, price: Price) -> Option<Quantity> {
        self.view().get(price)
    }

    pub fn best(&self) -> Option<PriceLevel> {
        self.view().best()
    }

    pub fn len(&self) -> usize {
        self.levels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.read().is_empty()
    }
}

fn write_level(levels: &mut Levels, price: Price, quantity: Quantity) {
    if quantity.is_zero() {
        levels.remove(&price);
    } else {
        levels.insert(price, quantity);
    }
}

/// Read-only, clone-able handle to one side of the book
///
/// Every method takes the read lock for the duration of the call only; the
/// multi-level reads copy levels out so no lock is held by the caller.
#[derive(Debug, Clone)]
pub struct SideView {
    kind: SideKind,
    levels: Arc<RwLock<Levels>>,
}

impl SideView {
    pub fn kind(&self) -> SideKind {
        self.kind
    }

    /// Quantity resting at `price`
    pub fn get(&self, price: Price) -> Option<Quantity> {
        self.levels.read().get(&price).copied()
    }

    pub fn contains(&self, price: Price) -> bool {
        self.levels.read().contains_key(&price)
    }

    /// Best level: highest bid or lowest ask
    pub fn best(&self) -> Option<PriceLevel> {
        let levels = self.levels.read();
        let best = match self.kind {
            SideKind::Bid => levels.iter().next_back(),
            SideKind::Ask => levels.iter().next(),
        };
        best.map(|(p, q)| PriceLevel::new(*p, *q))
    }

    /// Worst level: lowest bid or highest ask
    pub fn worst(&self) -> Option<PriceLevel> {
        let levels = self.levels.read();
        let worst = match self.kind {
            SideKind::Bid => levels.iter().next(),
            SideKind::Ask => levels.iter().next_back(),
        };
        worst.map(|(p, q)| PriceLevel::new(*p, *q))
    }

    /// Every level, lowest price first
    pub fn ascending(&self) -> Vec<PriceLevel> {
        self.levels
            .read()
            .iter()
            .map(|(p, q)| PriceLevel::new(*p, *q))
            .collect()
    }

    /// Every level, highest price first
    pub fn descending(&self) -> Vec<PriceLevel> {
        self.levels
            .read()
            .iter()
            .rev()
            .map(|(p, q)| PriceLevel::new(*p, *q))
            .collect()
    }

    /// Top `n` levels, best first
    pub fn top(&self, n: usize) -> Vec<PriceLevel> {
        let levels = self.levels.read();
        let to_level = |(p, q): (&Decimal, &Decimal)| PriceLevel::new(*p, *q);
        match self.kind {
            SideKind::Bid => levels.iter().rev().take(n).map(to_level).collect(),
            SideKind::Ask => levels.iter().take(n).map(to_level).collect(),
        }
    }

    /// Total quantity across the top `n` levels
    pub fn depth(&self, n: usize) -> Quantity {
        self.top(n).iter().map(|level| level.quantity).sum()
    }

    /// Visit levels lowest price first while holding the read lock.
    /// Keep `f` short: the writer waits for it.
    pub fn for_each_ascending<F>(&self, mut f: F)
    where
        F: FnMut(Price, Quantity),
    {
        for (p, q) in self.levels.read().iter() {
            f(*p, *q);
        }
    }

    pub fn len(&self) -> usize {
        self.levels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.read().is_empty()
    }
}

/// Owned copy of both sides, best levels first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthSnapshot {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl DepthSnapshot {
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.first().copied()
    }
}
