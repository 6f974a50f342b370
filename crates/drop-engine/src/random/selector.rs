use super::source::RandomSource;

/// Errors raised when building a [`CyclingSelector`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("cycling selector needs at least one item")]
    Empty,
}

/// Hands out items one at a time without repeats inside a cycle.
///
/// Over any `len` consecutive draws aligned to a cycle boundary every item
/// appears exactly once. When the cursor wraps, the permutation is reshuffled
/// before it is read again.
#[derive(Debug, Clone)]
pub struct CyclingSelector<T> {
    permutation: Vec<T>,
    cursor: usize,
}

impl<T: Clone> CyclingSelector<T> {
    /// Build a selector over `items`, starting from a fresh shuffle.
    pub fn new(items: &[T], rng: &mut RandomSource) -> Result<Self, SelectorError> {
        if items.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self {
            permutation: rng.shuffle(items),
            cursor: 0,
        })
    }

    /// Return the item under the cursor and advance it.
    pub fn next(&mut self, rng: &mut RandomSource) -> T {
        let item = self.permutation[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.permutation.len();
        if self.cursor == 0 {
            self.permutation = rng.shuffle(&self.permutation);
        }
        item
    }

    /// Number of items in one cycle.
    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    /// Always false: construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The visiting order of the current cycle.
    pub fn permutation(&self) -> &[T] {
        &self.permutation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rng(seed: u64) -> RandomSource {
        RandomSource::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = CyclingSelector::<&str>::new(&[], &mut rng(1)).unwrap_err();
        assert_eq!(err, SelectorError::Empty);
    }

    #[test]
    fn each_cycle_visits_every_item_once() {
        let mut rng = rng(8);
        let keys = ["coffee", "tea", "cake", "sushi", "taco"];
        let mut selector = CyclingSelector::new(&keys, &mut rng).unwrap();

        for _cycle in 0..20 {
            let drawn: Vec<&str> = (0..keys.len()).map(|_| selector.next(&mut rng)).collect();
            let unique: HashSet<&str> = drawn.iter().copied().collect();
            assert_eq!(unique.len(), keys.len(), "repeat inside cycle: {drawn:?}");
            assert_eq!(selector.cursor(), 0);
        }
    }

    #[test]
    fn single_item_always_returns_it() {
        let mut rng = rng(2);
        let mut selector = CyclingSelector::new(&["A"], &mut rng).unwrap();
        for _ in 0..5 {
            assert_eq!(selector.next(&mut rng), "A");
        }
    }

    #[test]
    fn cursor_wraps_after_len_draws() {
        let mut rng = rng(4);
        let mut selector = CyclingSelector::new(&[1, 2, 3], &mut rng).unwrap();
        let first = selector.permutation()[0];
        assert_eq!(selector.next(&mut rng), first);
        assert_eq!(selector.cursor(), 1);
        selector.next(&mut rng);
        selector.next(&mut rng);
        assert_eq!(selector.cursor(), 0);
        assert_eq!(selector.len(), 3);
    }

    #[test]
    fn cycles_are_reshuffled() {
        let mut rng = rng(77);
        let items: Vec<u32> = (0..8).collect();
        let mut selector = CyclingSelector::new(&items, &mut rng).unwrap();

        let mut orders = HashSet::new();
        for _ in 0..10 {
            let order: Vec<u32> = (0..items.len()).map(|_| selector.next(&mut rng)).collect();
            orders.insert(order);
        }
        // 8! orders; ten identical cycles in a row would mean no reshuffle.
        assert!(orders.len() > 1);
    }
}
