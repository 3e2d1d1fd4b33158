//! Per-seat move latency collection
//!
//! One `TimeSheet` exists per (match, seat). Move samples are appended as
//! the play loop measures them; `episode_finished` closes the running
//! episode total and starts a new one. Samples are never removed.

use serde::{Deserialize, Serialize};

const NS_PER_MS: f64 = 1_000_000.0;

/// Append-only latency record for one seat of one match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSheet {
    /// Every per-move sample, across all episodes
    move_ns: Vec<u64>,
    /// Total time of each closed episode
    episode_ns: Vec<u64>,
    /// Move count of each closed episode
    episode_moves: Vec<u32>,
    /// Accumulation for the episode currently in flight
    open_ns: u64,
    open_moves: u32,
}

impl TimeSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one per-move latency sample in the open episode.
    pub fn record_move(&mut self, elapsed_ns: u64) {
        self.move_ns.push(elapsed_ns);
        self.open_ns += elapsed_ns;
        self.open_moves += 1;
    }

    /// Close the open episode. Episodes without samples are not recorded;
    /// only proper measurements enter the per-episode statistics.
    pub fn episode_finished(&mut self) {
        if self.open_moves > 0 {
            self.episode_ns.push(self.open_ns);
            self.episode_moves.push(self.open_moves);
        }
        self.open_ns = 0;
        self.open_moves = 0;
    }

    pub fn move_count(&self) -> usize {
        self.move_ns.len()
    }

    pub fn episode_count(&self) -> usize {
        self.episode_ns.len()
    }

    pub fn min_move_ms(&self) -> f64 {
        self.move_ns
            .iter()
            .min()
            .map_or(0.0, |&ns| ns as f64 / NS_PER_MS)
    }

    pub fn max_move_ms(&self) -> f64 {
        self.move_ns
            .iter()
            .max()
            .map_or(0.0, |&ns| ns as f64 / NS_PER_MS)
    }

    pub fn average_move_ms(&self) -> f64 {
        if self.move_ns.is_empty() {
            return 0.0;
        }
        let total: u64 = self.move_ns.iter().sum();
        total as f64 / self.move_ns.len() as f64 / NS_PER_MS
    }

    pub fn median_move_ms(&self) -> f64 {
        let ms: Vec<f64> = self.move_ns.iter().map(|&ns| ns as f64 / NS_PER_MS).collect();
        median(&ms)
    }

    pub fn average_episode_ms(&self) -> f64 {
        if self.episode_ns.is_empty() {
            return 0.0;
        }
        let total: u64 = self.episode_ns.iter().sum();
        total as f64 / self.episode_ns.len() as f64 / NS_PER_MS
    }

    pub fn median_episode_ms(&self) -> f64 {
        let ms: Vec<f64> = self.episode_ns.iter().map(|&ns| ns as f64 / NS_PER_MS).collect();
        median(&ms)
    }

    pub fn average_moves_per_episode(&self) -> f64 {
        if self.episode_moves.is_empty() {
            return 0.0;
        }
        let total: u32 = self.episode_moves.iter().sum();
        f64::from(total) / self.episode_moves.len() as f64
    }

    pub fn median_moves_per_episode(&self) -> f64 {
        let counts: Vec<f64> = self.episode_moves.iter().map(|&c| f64::from(c)).collect();
        median(&counts)
    }

    /// Grand total across all samples, including the open episode.
    pub fn total_ms(&self) -> f64 {
        let closed: u64 = self.move_ns.iter().sum();
        closed as f64 / NS_PER_MS
    }
}

/// Median of an unsorted slice. 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[7.0]), 7.0);
    }

    #[test]
    fn test_move_stats() {
        let mut sheet = TimeSheet::new();
        sheet.record_move(1_000_000); // 1 ms
        sheet.record_move(3_000_000); // 3 ms
        sheet.record_move(2_000_000); // 2 ms

        assert_eq!(sheet.move_count(), 3);
        assert_eq!(sheet.min_move_ms(), 1.0);
        assert_eq!(sheet.max_move_ms(), 3.0);
        assert_eq!(sheet.average_move_ms(), 2.0);
        assert_eq!(sheet.median_move_ms(), 2.0);
        assert_eq!(sheet.total_ms(), 6.0);
    }

    #[test]
    fn test_episode_totals_close_on_finish() {
        let mut sheet = TimeSheet::new();
        sheet.record_move(1_000_000);
        sheet.record_move(1_000_000);
        sheet.episode_finished();
        sheet.record_move(4_000_000);
        sheet.episode_finished();

        assert_eq!(sheet.episode_count(), 2);
        assert_eq!(sheet.average_episode_ms(), 3.0);
        assert_eq!(sheet.median_episode_ms(), 3.0);
        assert_eq!(sheet.average_moves_per_episode(), 1.5);
    }

    #[test]
    fn test_empty_episode_not_recorded() {
        let mut sheet = TimeSheet::new();
        sheet.episode_finished();
        assert_eq!(sheet.episode_count(), 0);

        sheet.record_move(1_000_000);
        sheet.episode_finished();
        sheet.episode_finished(); // double finish adds nothing
        assert_eq!(sheet.episode_count(), 1);
    }

    #[test]
    fn test_stats_empty_sheet() {
        let sheet = TimeSheet::new();
        assert_eq!(sheet.min_move_ms(), 0.0);
        assert_eq!(sheet.max_move_ms(), 0.0);
        assert_eq!(sheet.average_move_ms(), 0.0);
        assert_eq!(sheet.median_episode_ms(), 0.0);
        assert_eq!(sheet.total_ms(), 0.0);
    }

    #[test]
    fn test_totals_are_monotone() {
        let mut sheet = TimeSheet::new();
        let mut last = 0.0;
        for i in 1..=10 {
            sheet.record_move(i * 100_000);
            if i % 3 == 0 {
                sheet.episode_finished();
            }
            let total = sheet.total_ms();
            assert!(total >= last);
            last = total;
        }
    }
}
