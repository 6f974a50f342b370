use super::source::RandomSource;

impl RandomSource {
    /// Fisher-Yates shuffle into a new Vec. The input slice is left untouched.
    ///
    /// Each swap index comes from [`RandomSource::random_int`], so every
    /// permutation is equally likely.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = self.random_int(0, i as i64) as usize;
            out.swap(i, j);
        }
        out
    }
}
