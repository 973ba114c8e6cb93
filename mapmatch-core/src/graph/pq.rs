use std::hash::Hash;

use priority_queue::PriorityQueue;

/// Ordered so that a *smaller* distance sorts as a *greater* priority --
/// this lets [`priority_queue::PriorityQueue`], a max-heap, serve as the
/// min-distance frontier Dijkstra and A* need.
#[derive(Copy, Clone, Debug, PartialEq)]
struct RevDistance(f64);

impl Eq for RevDistance {}

impl PartialOrd for RevDistance {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RevDistance {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.0.total_cmp(&self.0)
    }
}

/// A decrease-key priority queue over `f64` distances, satisfying the
/// `push` / `pop` / `decrease_key` / `contains` contract the search
/// algorithms in this module are written against. A Fibonacci heap or a
/// pairing heap with hash-indexed handles would satisfy the same
/// contract; this wraps the `priority-queue` crate's indexed binary heap.
pub struct Frontier<K: Hash + Eq + Clone> {
    inner: PriorityQueue<K, RevDistance>,
}

impl<K: Hash + Eq + Clone> Default for Frontier<K> {
    fn default() -> Self {
        Self {
            inner: PriorityQueue::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> Frontier<K> {
    pub fn push(&mut self, key: K, distance: f64) {
        self.inner.push(key, RevDistance(distance));
    }

    /// Pops the key with the smallest distance, along with that distance.
    pub fn pop(&mut self) -> Option<(K, f64)> {
        self.inner.pop().map(|(k, d)| (k, d.0))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.get(key).is_some()
    }

    /// Lowers `key`'s distance to `distance` if it is currently absent or
    /// higher than `distance`; otherwise a no-op. Internally this calls
    /// `push_increase` on the reversed priority, since increasing
    /// `RevDistance` corresponds to decreasing the underlying distance.
    pub fn decrease_key(&mut self, key: K, distance: f64) {
        self.inner.push_increase(key, RevDistance(distance));
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_smallest_distance_first() {
        let mut f = Frontier::default();
        f.push("a", 5.0);
        f.push("b", 1.0);
        f.push("c", 3.0);
        assert_eq!(f.pop(), Some(("b", 1.0)));
        assert_eq!(f.pop(), Some(("c", 3.0)));
        assert_eq!(f.pop(), Some(("a", 5.0)));
    }

    #[test]
    fn decrease_key_lowers_priority() {
        let mut f = Frontier::default();
        f.push("a", 10.0);
        f.decrease_key("a", 2.0);
        assert_eq!(f.pop(), Some(("a", 2.0)));
    }

    #[test]
    fn decrease_key_ignores_higher_distance() {
        let mut f = Frontier::default();
        f.push("a", 2.0);
        f.decrease_key("a", 10.0);
        assert_eq!(f.pop(), Some(("a", 2.0)));
    }
}
