//! Chain grouping: connect transactions into trading episodes.
//!
//! Three linkages connect rows on one account + underlying: sharing an
//! order id (legs of one placement), sharing a match id (fills that reduced
//! each other), and overlapping in time while the position was non-flat.
//! Connectivity is computed with a union-find over four closed node kinds
//! (transaction, order, match, span) instead of a general graph of
//! string-keyed nodes; chain ids come from the earliest transaction of each
//! component, so reruns reproduce them bit for bit.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDateTime;

use crate::domain::{
    Account, ChainId, Decimal, MatchId, OrderId, Transaction, TxnOrderingKey, Underlying,
};
use crate::error::{EngineError, ValidationError};

/// Disjoint-set forest over dense node indices.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn with_capacity(capacity: usize) -> Self {
        UnionFind {
            parent: Vec::with_capacity(capacity),
            rank: Vec::with_capacity(capacity),
        }
    }

    fn add(&mut self) -> usize {
        let node = self.parent.len();
        self.parent.push(node);
        self.rank.push(0);
        node
    }

    fn find(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression.
        let mut current = node;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Stamp a chain id onto every row.
///
/// Expects the matching phase to have run first (synthetic closing rows
/// included), so that every open match has a closing row and every span
/// terminates; a span still open at the end of the scan is a validation
/// failure, not a best-effort guess.
pub fn chain_transactions(rows: &mut [Transaction]) -> Result<(), EngineError> {
    check_positions_closed(rows)?;

    let mut uf = UnionFind::with_capacity(rows.len() * 2);

    // One node per transaction, indexed by row position.
    let txn_nodes: Vec<usize> = rows.iter().map(|_| uf.add()).collect();

    // Linking nodes, keyed in sorted maps so allocation order is stable.
    let mut order_nodes: BTreeMap<OrderId, usize> = BTreeMap::new();
    let mut match_nodes: BTreeMap<MatchId, usize> = BTreeMap::new();
    for (index, row) in rows.iter().enumerate() {
        if let Some(order_id) = &row.order_id {
            let node = *order_nodes
                .entry(order_id.clone())
                .or_insert_with(|| uf.add());
            uf.union(txn_nodes[index], node);
        }
        if let Some(match_id) = &row.match_id {
            let node = *match_nodes
                .entry(match_id.clone())
                .or_insert_with(|| uf.add());
            uf.union(txn_nodes[index], node);
        }
    }

    link_overlapping_spans(rows, &match_nodes, &mut uf)?;

    // Components, then the earliest member names the chain.
    let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
    for (index, node) in txn_nodes.iter().enumerate() {
        components.entry(uf.find(*node)).or_default().push(index);
    }
    for members in components.values() {
        let earliest = members
            .iter()
            .map(|&index| TxnOrderingKey::of(&rows[index]))
            .min()
            .expect("components are non-empty");
        let chain_id = ChainId::from_earliest(&earliest.transaction_id);
        for &index in members {
            rows[index].chain_id = Some(chain_id.clone());
        }
    }
    Ok(())
}

type SpanKey = (Account, Underlying);

/// Terminal invariant of the matching phase: every open has a close, the
/// synthesized Mark/Expire rows included, so each account + underlying sums
/// to a flat position. Rows that reach the chain builder without their
/// closing side would produce spans that never terminate.
fn check_positions_closed(rows: &[Transaction]) -> Result<(), EngineError> {
    let mut net: BTreeMap<SpanKey, Decimal> = BTreeMap::new();
    for row in rows {
        let (Some(instruction), Some(quantity)) = (row.instruction, row.quantity) else {
            continue;
        };
        let key = (row.account.clone(), row.instrument.underlying.clone());
        let entry = net.entry(key).or_default();
        *entry += quantity * instruction.sign();
    }
    for ((_, underlying), balance) in net {
        if !balance.is_zero() {
            return Err(ValidationError::UnclosedSpan { underlying }.into());
        }
    }
    Ok(())
}

/// Link matches that overlap in time on one account + underlying.
///
/// Each match contributes two events, at its first and last transaction
/// time. Stepping through events in order, a match entering an empty
/// active set opens a fresh span node; every match active before the set
/// drains back to empty is unioned with that same span node.
fn link_overlapping_spans(
    rows: &[Transaction],
    match_nodes: &BTreeMap<MatchId, usize>,
    uf: &mut UnionFind,
) -> Result<(), EngineError> {
    // Min/max transaction time per (account, underlying, match).
    let mut extents: BTreeMap<(SpanKey, MatchId), (NaiveDateTime, NaiveDateTime)> =
        BTreeMap::new();
    for row in rows {
        let Some(match_id) = &row.match_id else {
            continue;
        };
        let key = (
            (row.account.clone(), row.instrument.underlying.clone()),
            match_id.clone(),
        );
        extents
            .entry(key)
            .and_modify(|(min, max)| {
                *min = (*min).min(row.datetime);
                *max = (*max).max(row.datetime);
            })
            .or_insert((row.datetime, row.datetime));
    }

    let mut events: Vec<(NaiveDateTime, SpanKey, MatchId)> = Vec::with_capacity(extents.len() * 2);
    for ((span_key, match_id), (min, max)) in extents {
        events.push((min, span_key.clone(), match_id.clone()));
        events.push((max, span_key, match_id));
    }
    events.sort();

    let mut active: BTreeMap<SpanKey, BTreeSet<MatchId>> = BTreeMap::new();
    let mut current_span: BTreeMap<SpanKey, usize> = BTreeMap::new();
    for (_, span_key, match_id) in events {
        let active_set = active.entry(span_key.clone()).or_default();
        if active_set.remove(&match_id) {
            if active_set.is_empty() {
                current_span.remove(&span_key);
            }
        } else {
            let span_node = *current_span
                .entry(span_key)
                .or_insert_with(|| uf.add());
            uf.union(match_nodes[&match_id], span_node);
            active_set.insert(match_id);
        }
    }

    // Every open toggles closed again; a leftover means the matching phase
    // failed to close out a position.
    for (span_key, active_set) in active {
        if !active_set.is_empty() {
            return Err(ValidationError::UnclosedSpan {
                underlying: span_key.1,
            }
            .into());
        }
    }
    Ok(())
}
