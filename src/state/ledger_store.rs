use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, B256};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::error::LedgerError;
use crate::types::{Market, Position};

// ---------------------------------------------------------------------------
// MarketBook
// ---------------------------------------------------------------------------

/// A market record together with every position taken on it.
///
/// Each book sits behind its own `RwLock`: writers to one market never contend
/// with another market, and a reader holding the guard sees the market and its
/// positions at the same point in time.
#[derive(Debug)]
pub struct MarketBook {
    pub market: Market,
    /// user → position. At most one per user.
    positions: HashMap<Address, Position>,
}

impl MarketBook {
    pub fn position(&self, user: &Address) -> Option<&Position> {
        self.positions.get(user)
    }

    pub fn position_mut(&mut self, user: &Address) -> Option<&mut Position> {
        self.positions.get_mut(user)
    }

    pub fn has_position(&self, user: &Address) -> bool {
        self.positions.contains_key(user)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    fn insert_position(&mut self, user: Address, position: Position) -> Result<(), LedgerError> {
        match self.positions.entry(user) {
            std::collections::hash_map::Entry::Occupied(_) => Err(LedgerError::DuplicatePosition),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(position);
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LedgerStore
// ---------------------------------------------------------------------------

struct MarketSlot {
    /// Creation order across the whole store.
    seq: u64,
    book: Arc<RwLock<MarketBook>>,
}

pub struct LedgerStore {
    /// market_id → book
    markets: DashMap<B256, MarketSlot>,
    /// user → market_ids with a position, in bet order
    user_markets: DashMap<Address, Vec<B256>>,
    next_seq: AtomicU64,
}

impl LedgerStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a fresh market. Fails with `DuplicateMarket` if the id is taken;
    /// the existing record is left untouched.
    ///
    /// `on_insert` runs while the id's slot is still locked, before any other
    /// caller can reach the new book.
    pub fn insert_market<F>(&self, market: Market, on_insert: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&Market),
    {
        match self.markets.entry(market.id) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateMarket),
            Entry::Vacant(slot) => {
                on_insert(&market);
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(MarketSlot {
                    seq,
                    book: Arc::new(RwLock::new(MarketBook { market, positions: HashMap::new() })),
                });
                Ok(())
            }
        }
    }

    pub fn contains_market(&self, market_id: &B256) -> bool {
        self.markets.contains_key(market_id)
    }

    /// Shared handle to a market's book. The DashMap shard guard is released
    /// before returning so callers can hold the book lock for as long as needed.
    pub fn book(&self, market_id: &B256) -> Option<Arc<RwLock<MarketBook>>> {
        self.markets.get(market_id).map(|entry| Arc::clone(&entry.book))
    }

    /// Record a new position inside an already-held write guard and index it by user.
    pub fn insert_position(
        &self,
        book: &mut MarketBook,
        user: Address,
        position: Position,
    ) -> Result<(), LedgerError> {
        book.insert_position(user, position)?;
        self.user_markets.entry(user).or_default().push(book.market.id);
        Ok(())
    }

    pub fn get_market(&self, market_id: &B256) -> Option<Market> {
        let book = self.book(market_id)?;
        let guard = book.read();
        Some(guard.market.clone())
    }

    pub fn get_position(&self, market_id: &B256, user: &Address) -> Option<Position> {
        let book = self.book(market_id)?;
        let guard = book.read();
        guard.position(user).copied()
    }

    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// All market ids in creation order.
    pub fn all_market_ids(&self) -> Vec<B256> {
        let mut ids: Vec<(u64, B256)> = self
            .markets
            .iter()
            .map(|entry| (entry.seq, *entry.key()))
            .collect();
        ids.sort_unstable_by_key(|(seq, _)| *seq);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Markets the user holds a position on, in the order the bets were placed.
    pub fn user_market_ids(&self, user: &Address) -> Vec<B256> {
        self.user_markets
            .get(user)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self {
            markets: DashMap::new(),
            user_markets: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
