use serde::{Serialize, Deserialize};
use crate::matcher::SimilarityCalculator;

/// One input value paired with its extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item<T> {
    value: T,
    text: String,
    // Normalized comparison key, only stored when it differs from `text`
    key: Option<String>,
}

impl<T> Item<T> {
    pub fn new(value: T, text: String, calc: &SimilarityCalculator) -> Self {
        let key = match calc.comparison_key(&text) {
            std::borrow::Cow::Owned(key) if key != text => Some(key),
            _ => None,
        };
        Self { value, text, key }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn comparison_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.text)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// A non-empty group of similar items. The first item is the representative
/// and never moves, since items are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster<T> {
    items: Vec<Item<T>>,
}

impl<T> Cluster<T> {
    pub(crate) fn new(first: Item<T>) -> Self {
        Self { items: vec![first] }
    }

    pub fn representative(&self) -> &str {
        self.items[0].text()
    }

    pub(crate) fn representative_key(&self) -> &str {
        self.items[0].comparison_key()
    }

    pub fn items(&self) -> &[Item<T>] {
        &self.items
    }

    pub fn item(&self, position: usize) -> Option<&Item<T>> {
        self.items.get(position)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(Item::value)
    }

    pub fn into_items(self) -> Vec<Item<T>> {
        self.items
    }

    pub(crate) fn push(&mut self, item: Item<T>) {
        self.items.push(item);
    }

    /// Appends all of `other`'s items; `self` keeps its representative.
    pub(crate) fn absorb(&mut self, other: Cluster<T>) {
        self.items.extend(other.items);
    }
}

/// Ordered clusters, in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSet<T> {
    clusters: Vec<Cluster<T>>,
}

impl<T> Default for ClusterSet<T> {
    fn default() -> Self {
        Self { clusters: Vec::new() }
    }
}

impl<T> ClusterSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clusters(&self) -> &[Cluster<T>] {
        &self.clusters
    }

    pub fn cluster(&self, index: usize) -> Option<&Cluster<T>> {
        self.clusters.get(index)
    }

    /// Item at `position` inside cluster `index`.
    pub fn item(&self, index: usize, position: usize) -> Option<&Item<T>> {
        self.cluster(index).and_then(|cluster| cluster.item(position))
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster<T>> {
        self.clusters.iter()
    }

    /// Clusters with their indices, biggest first; ties keep creation order.
    pub fn largest_first(&self) -> Vec<(usize, &Cluster<T>)> {
        let mut ordered: Vec<(usize, &Cluster<T>)> = self.clusters.iter().enumerate().collect();
        ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        ordered
    }

    /// Flat report rows in creation order. `max_members` caps the member
    /// texts listed per row, not the count.
    pub fn summaries(&self, max_members: Option<usize>) -> Vec<ClusterSummary> {
        self.clusters.iter().enumerate()
            .map(|(index, cluster)| ClusterSummary::new(index, cluster, max_members))
            .collect()
    }

    /// Index of the first cluster, in creation order, whose representative matches `key`.
    pub(crate) fn first_match(&self, key: &str, calc: &SimilarityCalculator) -> Option<usize> {
        self.clusters.iter()
            .position(|cluster| calc.matches_keys(cluster.representative_key(), key))
    }

    /// Appends `item` to cluster `index`, or opens a new cluster for it when
    /// the index is out of range.
    pub(crate) fn append_item(&mut self, index: usize, item: Item<T>) {
        match self.clusters.get_mut(index) {
            Some(cluster) => cluster.push(item),
            None => self.clusters.push(Cluster::new(item)),
        }
    }

    /// Moves `other`'s items into cluster `index`, or appends `other` whole
    /// when the index is out of range.
    pub(crate) fn absorb_into(&mut self, index: usize, other: Cluster<T>) {
        match self.clusters.get_mut(index) {
            Some(cluster) => cluster.absorb(other),
            None => self.clusters.push(other),
        }
    }

    pub(crate) fn push(&mut self, cluster: Cluster<T>) {
        self.clusters.push(cluster);
    }
}

impl<T> IntoIterator for ClusterSet<T> {
    type Item = Cluster<T>;
    type IntoIter = std::vec::IntoIter<Cluster<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ClusterSet<T> {
    type Item = &'a Cluster<T>;
    type IntoIter = std::slice::Iter<'a, Cluster<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}

// For JSON / CSV output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub index: usize,
    pub representative: String,
    pub count: usize,
    pub members: Vec<String>,
}

impl ClusterSummary {
    pub fn new<T>(index: usize, cluster: &Cluster<T>, max_members: Option<usize>) -> Self {
        let limit = max_members.unwrap_or(usize::MAX);
        Self {
            index,
            representative: cluster.representative().to_string(),
            count: cluster.len(),
            members: cluster.items().iter().take(limit).map(|item| item.text().to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimilarityConfig;

    fn calc() -> SimilarityCalculator {
        SimilarityCalculator::new(&SimilarityConfig::default().with_case_sensitive(false)).unwrap()
    }

    #[test]
    fn key_is_only_stored_when_different() {
        let calc = calc();
        let lower = Item::new(1, "plain".to_string(), &calc);
        assert_eq!(lower.comparison_key(), "plain");
        assert!(lower.key.is_none());

        let upper = Item::new(2, "Plain".to_string(), &calc);
        assert_eq!(upper.text(), "Plain");
        assert_eq!(upper.comparison_key(), "plain");
    }

    #[test]
    fn representative_survives_absorb() {
        let calc = calc();
        let mut first = Cluster::new(Item::new("a", "first".to_string(), &calc));
        let mut second = Cluster::new(Item::new("b", "second".to_string(), &calc));
        second.push(Item::new("c", "third".to_string(), &calc));

        first.absorb(second);
        assert_eq!(first.representative(), "first");
        assert_eq!(first.values().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn views_and_summaries() {
        let calc = calc();
        let mut set = ClusterSet::new();
        set.push(Cluster::new(Item::new(0, "small".to_string(), &calc)));
        let mut big = Cluster::new(Item::new(1, "big".to_string(), &calc));
        big.push(Item::new(2, "bigger".to_string(), &calc));
        set.push(big);

        assert_eq!(set.len(), 2);
        assert_eq!(set.item_count(), 3);
        assert_eq!(set.item(1, 1).map(|item| *item.value()), Some(2));
        assert!(set.item(2, 0).is_none());
        let ordered = set.largest_first();
        assert_eq!(ordered[0].0, 1);
        assert_eq!(ordered[0].1.representative(), "big");

        let rows = set.summaries(Some(1));
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[1].members, vec!["big".to_string()]);
    }
}
