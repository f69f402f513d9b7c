//! Sparse hash grid for hotspot queries
//!
//! Buckets are keyed by `(floor(x / cell), floor(y / cell))` and remember
//! the order in which they were first touched. Hotspot ranking breaks ties
//! by that order, so two observers that insert the same points in the same
//! order always get the same ranking.

use ahash::AHashMap;

use crate::core::types::TileCoord;

pub type BucketKey = (i32, i32);

/// A tagged point stored in a bucket
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialPoint<T> {
    pub x: i32,
    pub y: i32,
    pub payload: T,
}

/// A bucket ranked by occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotspot {
    pub key: BucketKey,
    pub count: usize,
    /// Centre of the bucket in tile coordinates
    pub center: TileCoord,
}

/// Uniform grid hash of tagged points
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    cell_size: i32,
    lookup: AHashMap<BucketKey, usize>,
    buckets: Vec<(BucketKey, Vec<SpatialPoint<T>>)>,
    len: usize,
}

impl<T> SpatialIndex<T> {
    pub fn new(cell_size: i32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            lookup: AHashMap::new(),
            buckets: Vec::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    #[inline]
    pub fn bucket_key(&self, x: i32, y: i32) -> BucketKey {
        (x.div_euclid(self.cell_size), y.div_euclid(self.cell_size))
    }

    pub fn bucket_center(&self, key: BucketKey) -> TileCoord {
        let half = self.cell_size / 2;
        TileCoord::new(key.0 * self.cell_size + half, key.1 * self.cell_size + half)
    }

    pub fn clear(&mut self) {
        self.lookup.clear();
        self.buckets.clear();
        self.len = 0;
    }

    pub fn insert(&mut self, x: i32, y: i32, payload: T) {
        let key = self.bucket_key(x, y);
        let slot = match self.lookup.get(&key) {
            Some(&slot) => slot,
            None => {
                self.buckets.push((key, Vec::new()));
                let slot = self.buckets.len() - 1;
                self.lookup.insert(key, slot);
                slot
            }
        };
        self.buckets[slot].1.push(SpatialPoint { x, y, payload });
        self.len += 1;
    }

    /// Rebuild from scratch; no points survive from the previous contents
    pub fn rebuild(&mut self, points: impl IntoIterator<Item = (i32, i32, T)>) {
        self.clear();
        for (x, y, payload) in points {
            self.insert(x, y, payload);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Points in the bucket containing `(x, y)`
    pub fn query_bucket(&self, x: i32, y: i32) -> &[SpatialPoint<T>] {
        self.lookup
            .get(&self.bucket_key(x, y))
            .map(|&slot| self.buckets[slot].1.as_slice())
            .unwrap_or(&[])
    }

    /// Non-empty buckets in first-insertion order
    pub fn buckets(&self) -> impl Iterator<Item = (BucketKey, &[SpatialPoint<T>])> + '_ {
        self.buckets
            .iter()
            .filter(|(_, points)| !points.is_empty())
            .map(|(key, points)| (*key, points.as_slice()))
    }

    /// Top `limit` buckets by occupant count, ties kept in insertion order
    pub fn hotspots(&self, limit: usize) -> Vec<Hotspot> {
        let mut ranked: Vec<Hotspot> = self
            .buckets()
            .map(|(key, points)| Hotspot {
                key,
                count: points.len(),
                center: self.bucket_center(key),
            })
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_key_floors_negatives() {
        let index: SpatialIndex<()> = SpatialIndex::new(8);
        assert_eq!(index.bucket_key(0, 0), (0, 0));
        assert_eq!(index.bucket_key(7, 8), (0, 1));
        assert_eq!(index.bucket_key(-1, -8), (-1, -1));
        assert_eq!(index.bucket_key(-9, 15), (-2, 1));
    }

    #[test]
    fn test_each_point_in_exactly_one_bucket() {
        let mut index = SpatialIndex::new(4);
        for x in 0..12 {
            for y in 0..12 {
                index.insert(x, y, ());
            }
        }
        assert_eq!(index.len(), 144);
        assert_eq!(index.bucket_count(), 9);
        let total: usize = index.buckets().map(|(_, pts)| pts.len()).sum();
        assert_eq!(total, 144);
        assert!(index.buckets().all(|(_, pts)| pts.len() == 16));
    }

    #[test]
    fn test_hotspots_sorted_with_stable_ties() {
        let mut index = SpatialIndex::new(10);
        // Bucket (2,0) touched first with 2 points
        index.insert(25, 1, "a");
        index.insert(26, 2, "b");
        // Bucket (0,0) with 3 points
        index.insert(1, 1, "c");
        index.insert(2, 2, "d");
        index.insert(3, 3, "e");
        // Bucket (0,1) with 2 points, inserted after (2,0)
        index.insert(1, 11, "f");
        index.insert(2, 12, "g");

        let hotspots = index.hotspots(10);
        let keys: Vec<BucketKey> = hotspots.iter().map(|h| h.key).collect();
        assert_eq!(keys, vec![(0, 0), (2, 0), (0, 1)]);
        assert_eq!(hotspots[0].count, 3);
        assert_eq!(hotspots[0].center, TileCoord::new(5, 5));

        assert_eq!(index.hotspots(1).len(), 1);
    }

    #[test]
    fn test_rebuild_discards_previous_points() {
        let mut index = SpatialIndex::new(5);
        index.rebuild(vec![(0, 0, 1u8), (1, 1, 2u8)]);
        assert_eq!(index.len(), 2);

        index.rebuild(vec![(40, 40, 3u8)]);
        assert_eq!(index.len(), 1);
        assert!(index.query_bucket(0, 0).is_empty());
        assert_eq!(index.query_bucket(41, 42)[0].payload, 3);
    }
}
