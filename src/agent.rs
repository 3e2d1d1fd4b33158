//! Agent roster and per-tournament statistics
//!
//! Agents are identified by their stable position in the registry. Selection
//! is ordinary data on the entry, toggled by the caller before locking.

use serde::{Deserialize, Serialize};

use crate::rating::AgentRatings;

/// Stable agent identifier: position in the registry.
pub type AgentId = usize;

/// A contestant and its mutable tournament state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    /// Display name
    pub name: String,
    /// Agent type tag ("random", "optimal", ...)
    pub kind: String,
    /// Whether this agent takes part in the next tournament
    pub selected: bool,
    pub wins: u32,
    pub ties: u32,
    pub losses: u32,
    /// Per-episode scores for one-player games
    pub single_scores: Vec<f64>,
    /// Rating state, persistent across tournaments
    pub ratings: AgentRatings,
}

impl AgentEntry {
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            selected: true,
            wins: 0,
            ties: 0,
            losses: 0,
            single_scores: Vec::new(),
            ratings: AgentRatings::default(),
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.ties + self.losses
    }

    pub fn add_won_game(&mut self) {
        self.wins += 1;
    }

    pub fn add_tie_game(&mut self) {
        self.ties += 1;
    }

    pub fn add_lost_game(&mut self) {
        self.losses += 1;
    }

    pub fn push_single_score(&mut self, score: f64) {
        self.single_scores.push(score);
    }

    pub fn best_single_score(&self) -> f64 {
        self.single_scores.iter().copied().fold(f64::MIN, f64::max)
    }

    pub fn worst_single_score(&self) -> f64 {
        self.single_scores.iter().copied().fold(f64::MAX, f64::min)
    }

    pub fn average_single_score(&self) -> f64 {
        if self.single_scores.is_empty() {
            return 0.0;
        }
        self.single_scores.iter().sum::<f64>() / self.single_scores.len() as f64
    }

    pub fn median_single_score(&self) -> f64 {
        crate::timing::median(&self.single_scores)
    }

    /// Zero the per-tournament counters. Ratings are left alone.
    fn reset_scores(&mut self) {
        self.wins = 0;
        self.ties = 0;
        self.losses = 0;
        self.single_scores.clear();
    }
}

/// The roster of all registered agents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRegistry {
    entries: Vec<AgentEntry>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent and return its id. The runner guards this against
    /// registration while locked.
    pub fn register(&mut self, name: &str, kind: &str) -> AgentId {
        self.entries.push(AgentEntry::new(name, kind));
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut AgentEntry> {
        self.entries.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &AgentEntry)> {
        self.entries.iter().enumerate()
    }

    pub fn set_selected(&mut self, id: AgentId, selected: bool) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.selected = selected;
        }
    }

    /// Ids of selected agents, in registry order.
    pub fn selected_ids(&self) -> Vec<AgentId> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.selected)
            .map(|(id, _)| id)
            .collect()
    }

    /// Zero every agent's per-tournament counters.
    pub fn reset_scores(&mut self) {
        for entry in &mut self.entries {
            entry.reset_scores();
        }
    }

    /// Mutable access to two distinct agents at once.
    ///
    /// Panics if `a == b`; the schedule invariant (no agent paired with
    /// itself) makes that unreachable from the runner.
    pub fn pair_mut(&mut self, a: AgentId, b: AgentId) -> (&mut AgentEntry, &mut AgentEntry) {
        assert_ne!(a, b, "an agent cannot be paired with itself");
        if a < b {
            let (left, right) = self.entries.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.entries.split_at_mut(a);
            (&mut right[0], &mut left[b])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut registry = AgentRegistry::new();
        assert_eq!(registry.register("a", "random"), 0);
        assert_eq!(registry.register("b", "random"), 1);
        assert_eq!(registry.register("c", "optimal"), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_selected_ids_in_registry_order() {
        let mut registry = AgentRegistry::new();
        registry.register("a", "random");
        registry.register("b", "random");
        registry.register("c", "random");
        registry.set_selected(1, false);
        assert_eq!(registry.selected_ids(), vec![0, 2]);
    }

    #[test]
    fn test_pair_mut_returns_distinct_entries() {
        let mut registry = AgentRegistry::new();
        registry.register("a", "random");
        registry.register("b", "random");

        let (a, b) = registry.pair_mut(0, 1);
        a.add_won_game();
        b.add_lost_game();

        assert_eq!(registry.get(0).unwrap().wins, 1);
        assert_eq!(registry.get(1).unwrap().losses, 1);

        // Reversed order works too
        let (b, a) = registry.pair_mut(1, 0);
        b.add_tie_game();
        a.add_tie_game();
        assert_eq!(registry.get(0).unwrap().ties, 1);
        assert_eq!(registry.get(1).unwrap().ties, 1);
    }

    #[test]
    fn test_reset_scores_keeps_ratings() {
        let mut registry = AgentRegistry::new();
        registry.register("a", "random");
        let entry = registry.get_mut(0).unwrap();
        entry.add_won_game();
        entry.push_single_score(12.0);
        entry.ratings.elo_fide.rating = 1600.0;

        registry.reset_scores();

        let entry = registry.get(0).unwrap();
        assert_eq!(entry.wins, 0);
        assert!(entry.single_scores.is_empty());
        assert_eq!(entry.ratings.elo_fide.rating, 1600.0);
    }

    #[test]
    fn test_single_score_stats() {
        let mut entry = AgentEntry::new("a", "random");
        for s in [3.0, 1.0, 2.0, 5.0] {
            entry.push_single_score(s);
        }
        assert_eq!(entry.best_single_score(), 5.0);
        assert_eq!(entry.worst_single_score(), 1.0);
        assert_eq!(entry.average_single_score(), 2.75);
        assert_eq!(entry.median_single_score(), 2.5);
    }
}
