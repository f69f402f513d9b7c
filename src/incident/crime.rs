//! Vandalism detection
//!
//! Re-samples a bounded slice of known path tiles per update, looking for
//! broken path additions. The sampling window rotates so that, across
//! updates, every discovered path is eventually looked at.

use crate::analysis::scanner::PathTile;
use crate::spatial::{Hotspot, SpatialIndex};
use crate::world::ParkWorld;

/// Default number of path tiles sampled per update
pub const DEFAULT_SAMPLE_LIMIT: usize = 300;

pub struct CrimeDetector {
    index: SpatialIndex<()>,
    crime_count: u32,
    vandalism_total: u64,
    sample_limit: usize,
    cursor: usize,
}

impl CrimeDetector {
    pub fn new(sample_limit: usize, cell_size: i32) -> Self {
        Self {
            index: SpatialIndex::new(cell_size),
            crime_count: 0,
            vandalism_total: 0,
            sample_limit,
            cursor: 0,
        }
    }

    /// Re-sample up to `sample_limit` paths and rebuild the crime buckets
    pub fn update(&mut self, world: &dyn ParkWorld, paths: &[PathTile]) {
        self.index.clear();
        self.crime_count = 0;

        if paths.is_empty() {
            self.cursor = 0;
            return;
        }

        let samples = self.sample_limit.min(paths.len());
        let start = self.cursor % paths.len();
        for offset in 0..samples {
            let path = &paths[(start + offset) % paths.len()];
            let broken = match world.tile_elements(path.coord) {
                Ok(elements) => elements.iter().any(|e| e.is_broken_path()),
                Err(_) => false,
            };
            if broken {
                self.index.insert(path.coord.x, path.coord.y, ());
                self.crime_count += 1;
                self.vandalism_total += 1;
            }
        }
        self.cursor = (start + samples) % paths.len();

        if self.crime_count > 0 {
            tracing::debug!(crimes = self.crime_count, sampled = samples, "Vandalism detected");
        }
    }

    pub fn crime_count(&self) -> u32 {
        self.crime_count
    }

    /// Broken paths seen across every update since creation
    pub fn vandalism_total(&self) -> u64 {
        self.vandalism_total
    }

    pub fn needs_more_security(&self, threshold: u32) -> bool {
        self.crime_count >= threshold
    }

    pub fn crime_hotspots(&self, limit: usize) -> Vec<Hotspot> {
        self.index.hotspots(limit)
    }

    pub fn reset(&mut self) {
        self.index.clear();
        self.crime_count = 0;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TileCoord;
    use crate::sandbox::SandboxPark;

    fn path(x: i32, y: i32) -> PathTile {
        PathTile {
            coord: TileCoord::new(x, y),
            is_queue_line: false,
        }
    }

    #[test]
    fn test_security_threshold() {
        let mut park = SandboxPark::new(20, 20);
        let mut paths = Vec::new();
        for x in 0..2 {
            park.add_broken_path(TileCoord::new(x, 0));
            paths.push(path(x, 0));
        }
        park.add_path(TileCoord::new(5, 5));
        paths.push(path(5, 5));

        let mut detector = CrimeDetector::new(DEFAULT_SAMPLE_LIMIT, 8);
        detector.update(&park, &paths);
        assert_eq!(detector.crime_count(), 2);
        assert!(!detector.needs_more_security(3));

        park.add_broken_path(TileCoord::new(2, 0));
        paths.push(path(2, 0));
        detector.update(&park, &paths);
        assert_eq!(detector.crime_count(), 3);
        assert!(detector.needs_more_security(3));

        let hotspots = detector.crime_hotspots(5);
        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].count, 3);
    }

    #[test]
    fn test_sampling_window_rotates() {
        let mut park = SandboxPark::new(20, 20);
        let mut paths = Vec::new();
        for x in 0..10 {
            park.add_path(TileCoord::new(x, 1));
            paths.push(path(x, 1));
        }
        // Only the last path is broken; a window of 4 reaches it on the third update
        park.add_broken_path(TileCoord::new(9, 2));
        paths.push(path(9, 2));

        let mut detector = CrimeDetector::new(4, 8);
        detector.update(&park, &paths);
        assert_eq!(detector.crime_count(), 0);
        detector.update(&park, &paths);
        assert_eq!(detector.crime_count(), 0);
        detector.update(&park, &paths);
        assert_eq!(detector.crime_count(), 1);
        assert_eq!(detector.vandalism_total(), 1);
    }

    #[test]
    fn test_no_paths_no_crime() {
        let park = SandboxPark::new(4, 4);
        let mut detector = CrimeDetector::new(DEFAULT_SAMPLE_LIMIT, 8);
        detector.update(&park, &[]);
        assert_eq!(detector.crime_count(), 0);
        assert!(detector.crime_hotspots(3).is_empty());
    }
}
