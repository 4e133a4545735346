use std::{collections::HashMap, hash::Hash};

/// Frequency counter that remembers first-seen order, so equal counts rank by first occurrence.
#[derive(Debug, Clone)]
pub struct OrderedCounter<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K: Eq + Hash + Clone> OrderedCounter<K> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn get(&self, key: &K) -> usize {
        self.index.get(key).map(|&i| self.entries[i].1).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Top `n` entries by descending count. `sort_by` is stable, which keeps first-seen order on ties.
    pub fn most_common(self, n: usize) -> Vec<(K, usize)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }
}

impl<K: Eq + Hash + Clone> Default for OrderedCounter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for OrderedCounter<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut counter = Self::new();
        for key in iter {
            counter.add(key);
        }
        counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_first_seen_order() {
        let counter: OrderedCounter<&str> = ["b", "a", "c", "a", "b"].into_iter().collect();
        let top = counter.most_common(10);
        assert_eq!(top, vec![("b", 2), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn most_common_truncates() {
        let counter: OrderedCounter<u8> = [1, 2, 3, 3].into_iter().collect();
        assert_eq!(counter.total(), 4);
        assert_eq!(counter.get(&3), 2);
        assert_eq!(counter.most_common(1), vec![(3, 2)]);
    }
}
