//! Price-ordered limit order book, stored as an arena of indexed nodes
//! rather than pointer-linked allocations, so the whole book can be
//! (de)serialized as a flat map alongside the rest of vault state.

use cosmwasm_std::{Addr, Uint256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::VaultError;
use crate::fixed::Fixed64x64;

pub type OrderId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer: Addr,
    pub price: Fixed64x64,
    pub size: Uint256,
    prev: Option<OrderId>,
    next: Option<OrderId>,
}

/// An arena-backed, price-descending singly-and-doubly linked list of
/// resting orders. `head` is the highest-priced order; ties are broken
/// FIFO, oldest first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderBook {
    nodes: HashMap<OrderId, Order>,
    head: Option<OrderId>,
    next_id: OrderId,
    len: u64,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook {
            nodes: HashMap::new(),
            head: None,
            next_id: 1,
            len: 0,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<OrderId> {
        self.head
    }

    pub fn get_order_by_id(&self, id: OrderId) -> Option<&Order> {
        self.nodes.get(&id)
    }

    pub fn get_next_order(&self, id: OrderId) -> Option<OrderId> {
        self.nodes.get(&id).and_then(|o| o.next)
    }

    pub fn get_previous_order(&self, id: OrderId) -> Option<OrderId> {
        self.nodes.get(&id).and_then(|o| o.prev)
    }

    /// Inserts a new order, walking from `head` to find the first node
    /// whose price is strictly lower than `price`, and returns the new
    /// order's id. Ids are never reused, even across removals.
    pub fn insert(&mut self, buyer: Addr, price: Fixed64x64, size: Uint256) -> OrderId {
        let id = self.next_id;
        self.next_id += 1;

        let mut cursor = self.head;
        let mut prior: Option<OrderId> = None;
        while let Some(cursor_id) = cursor {
            let cursor_price = self.nodes[&cursor_id].price;
            if cursor_price < price {
                break;
            }
            prior = cursor;
            cursor = self.nodes[&cursor_id].next;
        }

        let node = Order {
            id,
            buyer,
            price,
            size,
            prev: prior,
            next: cursor,
        };
        self.nodes.insert(id, node);

        match prior {
            Some(prior_id) => {
                self.nodes.get_mut(&prior_id).unwrap().next = Some(id);
            }
            None => self.head = Some(id),
        }
        if let Some(next_id) = cursor {
            self.nodes.get_mut(&next_id).unwrap().prev = Some(id);
        }

        self.len += 1;
        id
    }

    /// Unlinks and returns the order with the given id.
    pub fn remove(&mut self, id: OrderId) -> Result<Order, VaultError> {
        let node = self.nodes.remove(&id).ok_or(VaultError::OrderNotFound)?;

        match node.prev {
            Some(prev_id) => {
                self.nodes.get_mut(&prev_id).unwrap().next = node.next;
            }
            None => self.head = node.next,
        }
        if let Some(next_id) = node.next {
            self.nodes.get_mut(&next_id).unwrap().prev = node.prev;
        }

        self.len -= 1;
        Ok(node)
    }

    /// Removes and returns the head order, if any. Used by the auction
    /// engine to fill orders best-price-first.
    pub fn pop_head(&mut self) -> Option<Order> {
        self.head.map(|id| self.remove(id).expect("head id must exist"))
    }

    /// Iterates orders from highest to lowest price, FIFO within a price
    /// level. Intended for views, not the hot fill path.
    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        OrderBookIter {
            book: self,
            cursor: self.head,
        }
    }

    /// Checks the structural invariants this book is supposed to uphold.
    /// Only used by tests and debug assertions; never called from
    /// production code paths.
    #[cfg(test)]
    fn check_invariants(&self) {
        let mut count = 0u64;
        let mut cursor = self.head;
        let mut last_price: Option<Fixed64x64> = None;
        let mut prev_id: Option<OrderId> = None;
        while let Some(id) = cursor {
            let node = &self.nodes[&id];
            assert_eq!(node.prev, prev_id, "prev/next must be mutually consistent");
            if let Some(last) = last_price {
                assert!(node.price <= last, "prices must be non-increasing");
            }
            last_price = Some(node.price);
            prev_id = Some(id);
            cursor = node.next;
            count += 1;
        }
        assert_eq!(count, self.len, "length must equal reachable node count");
    }
}

struct OrderBookIter<'a> {
    book: &'a OrderBook,
    cursor: Option<OrderId>,
}

impl<'a> Iterator for OrderBookIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = &self.book.nodes[&id];
        self.cursor = node.next;
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Addr {
        Addr::unchecked(s)
    }

    fn price(s: &str) -> Fixed64x64 {
        Fixed64x64::from_decimal_str(s).unwrap()
    }

    #[test]
    fn insert_keeps_descending_price_order_with_fifo_ties() {
        let mut book = OrderBook::new();
        // A mix of strictly-descending and tied prices; regardless of
        // insertion order, the book must read back non-increasing with
        // ties broken oldest-first.
        let prices = [
            "10.5", "12.0", "12.0", "9.0", "11.0", "12.0", "8.5", "9.0", "15.0", "1.0", "11.0",
            "7.25", "9.0", "12.0", "6.0", "11.0", "5.0",
        ];
        let mut ids = Vec::new();
        for p in prices {
            ids.push(book.insert(addr("buyer"), price(p), Uint256::from(1u128)));
        }

        book.check_invariants();
        assert_eq!(book.len(), prices.len() as u64);

        let traversed: Vec<Fixed64x64> = book.iter().map(|o| o.price).collect();
        let mut sorted = traversed.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(traversed, sorted, "book must read back price-descending");

        // Within the "12.0" tier, ids must come back in insertion order.
        let twelves: Vec<OrderId> = book
            .iter()
            .filter(|o| o.price == price("12.0"))
            .map(|o| o.id)
            .collect();
        let expected_twelves: Vec<OrderId> = ids
            .iter()
            .zip(prices.iter())
            .filter(|(_, p)| **p == "12.0")
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(twelves, expected_twelves);
    }

    #[test]
    fn remove_unlinks_and_never_reuses_ids() {
        let mut book = OrderBook::new();
        let a = book.insert(addr("a"), price("5"), Uint256::from(1u128));
        let b = book.insert(addr("b"), price("6"), Uint256::from(1u128));
        let c = book.insert(addr("c"), price("4"), Uint256::from(1u128));

        book.remove(b).unwrap();
        book.check_invariants();
        assert_eq!(book.len(), 2);
        assert!(book.get_order_by_id(b).is_none());

        let d = book.insert(addr("d"), price("6"), Uint256::from(1u128));
        assert_ne!(d, a);
        assert_ne!(d, b);
        assert_ne!(d, c);
        assert!(d > c);
    }

    #[test]
    fn pop_head_fills_best_price_first() {
        let mut book = OrderBook::new();
        book.insert(addr("a"), price("5"), Uint256::from(1u128));
        book.insert(addr("b"), price("9"), Uint256::from(1u128));
        book.insert(addr("c"), price("7"), Uint256::from(1u128));

        let first = book.pop_head().unwrap();
        assert_eq!(first.price, price("9"));
        let second = book.pop_head().unwrap();
        assert_eq!(second.price, price("7"));
        let third = book.pop_head().unwrap();
        assert_eq!(third.price, price("5"));
        assert!(book.pop_head().is_none());
    }

    #[test]
    fn remove_missing_id_is_order_not_found() {
        let mut book = OrderBook::new();
        assert_eq!(book.remove(999).unwrap_err(), VaultError::OrderNotFound);
    }
}
