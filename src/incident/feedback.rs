//! Guest feedback analysis
//!
//! Turns guest happiness, nausea and thoughts into the need signals that
//! drive handyman and entertainer hiring.

use ordered_float::OrderedFloat;

use crate::analysis::scanner::GuestSample;
use crate::core::config::Thresholds;
use crate::core::types::TileCoord;
use crate::spatial::{BucketKey, SpatialIndex};
use crate::world::ParkWorld;

/// Nausea at or above this counts as an implicit disgust complaint
pub const NAUSEA_DISGUST_LEVEL: u8 = 200;

/// Buckets need more than this many guests to be judged
pub const MIN_AREA_GUESTS: usize = 2;

/// A crowded area whose guests are, on average, unhappy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnhappyArea {
    pub key: BucketKey,
    pub center: TileCoord,
    pub guests: usize,
    pub happiness_percent: f32,
}

#[derive(Debug, Default)]
pub struct GuestFeedbackAnalyzer {
    guest_count: usize,
    happiness_percent: f32,
    disgust_count: u32,
    litter_complaints: u32,
}

impl GuestFeedbackAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every signal from the live guest list
    pub fn update(&mut self, world: &dyn ParkWorld) {
        self.guest_count = 0;
        self.happiness_percent = 0.0;
        self.disgust_count = 0;
        self.litter_complaints = 0;

        let guests = match world.guests() {
            Ok(guests) => guests,
            Err(e) => {
                tracing::debug!("Guest query failed: {}", e);
                return;
            }
        };

        let mut average = 0.0f32;
        for (i, guest) in guests.iter().enumerate() {
            // Running mean
            average += (guest.happiness_percent() - average) / (i + 1) as f32;

            let mut disgusted = guest.nausea >= NAUSEA_DISGUST_LEVEL;
            for thought in &guest.thoughts {
                if thought.is_disgust() {
                    disgusted = true;
                }
                if thought.is_litter_complaint() {
                    self.litter_complaints += 1;
                }
            }
            if disgusted {
                self.disgust_count += 1;
            }
        }

        self.guest_count = guests.len();
        self.happiness_percent = average;
    }

    pub fn guest_count(&self) -> usize {
        self.guest_count
    }

    /// Average guest happiness, 0 when the park is empty
    pub fn happiness_percent(&self) -> f32 {
        self.happiness_percent
    }

    pub fn disgust_count(&self) -> u32 {
        self.disgust_count
    }

    pub fn litter_complaints(&self) -> u32 {
        self.litter_complaints
    }

    /// Any one of disgust, litter complaints or raw litter suffices
    pub fn needs_more_handymen(&self, litter_items: usize, thresholds: &Thresholds) -> bool {
        self.disgust_count >= thresholds.disgust
            || self.litter_complaints >= thresholds.litter_complaints
            || litter_items >= thresholds.litter_items as usize
    }

    pub fn needs_more_entertainers(&self, thresholds: &Thresholds) -> bool {
        self.guest_count > 0 && self.happiness_percent < thresholds.happiness_percent
    }

    /// Crowded buckets below `unhappy_percent`, least happy first
    pub fn unhappy_areas(
        &self,
        density: &SpatialIndex<GuestSample>,
        unhappy_percent: f32,
    ) -> Vec<UnhappyArea> {
        let mut areas: Vec<UnhappyArea> = density
            .buckets()
            .filter(|(_, guests)| guests.len() > MIN_AREA_GUESTS)
            .map(|(key, guests)| {
                let total: f32 = guests.iter().map(|g| g.payload.happiness_percent).sum();
                UnhappyArea {
                    key,
                    center: density.bucket_center(key),
                    guests: guests.len(),
                    happiness_percent: total / guests.len() as f32,
                }
            })
            .filter(|area| area.happiness_percent < unhappy_percent)
            .collect();
        areas.sort_by_key(|area| OrderedFloat(area.happiness_percent));
        areas
    }
}
