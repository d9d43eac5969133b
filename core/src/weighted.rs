//! Cumulative-weight random selection.

use rand::Rng;

/// Table of values selected with probability proportional to their weight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightedTable<T> {
    entries: Vec<T>,
    cumulative: Vec<u32>,
}

impl<T> Default for WeightedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WeightedTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            cumulative: Vec::new(),
        }
    }

    /// Adds a value. Zero weights are ignored.
    pub fn push(&mut self, value: T, weight: u32) {
        if weight == 0 {
            return;
        }
        let total = self.total().saturating_add(weight);
        self.entries.push(value);
        self.cumulative.push(total);
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Number of selectable values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no selectable values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draws a value, or `None` when the table is empty.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let roll = rng.gen_range(0..total);
        let index = self.cumulative.partition_point(|&bound| bound <= roll);
        self.entries.get(index)
    }
}

impl<T> FromIterator<(T, u32)> for WeightedTable<T> {
    fn from_iter<I: IntoIterator<Item = (T, u32)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (value, weight) in iter {
            table.push(value, weight);
        }
        table
    }
}
