//! Round-robin game plan generation
//!
//! Pure schedule construction: selected agent ids in, ordered pairing list
//! out. Double round-robin plans can be trimmed to a user-set match count;
//! a safe set of matches is protected from removal so every agent keeps at
//! least one appearance.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;

/// Tournament mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Every unordered pair once.
    Single,
    /// Every ordered pair once, so both seat orders are played.
    Double,
}

/// One scheduled match. `second` is absent for one-player games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub first: AgentId,
    pub second: Option<AgentId>,
}

impl Pairing {
    pub fn versus(first: AgentId, second: AgentId) -> Self {
        Self {
            first,
            second: Some(second),
        }
    }

    pub fn solo(first: AgentId) -> Self {
        Self {
            first,
            second: None,
        }
    }

    /// Agent in the given seat (0 or 1).
    pub fn seat(&self, seat: usize) -> Option<AgentId> {
        match seat {
            0 => Some(self.first),
            1 => self.second,
            _ => None,
        }
    }
}

/// The smallest double round-robin plan a trim may produce for `n`
/// selected agents.
pub fn minimum_matches(n: usize) -> usize {
    n / 2 + 1
}

/// Generate the game plan for the selected agents.
///
/// One-player games get one solo pairing per agent; mode and limit do not
/// apply. Two-player games enumerate pairs in selection order, i outer,
/// j inner. A `limit` trims a double round-robin plan; it is rejected below
/// [`minimum_matches`] and ignored (with a warning) everywhere else it has
/// no meaning.
pub fn generate(
    selected: &[AgentId],
    players_per_match: usize,
    mode: Mode,
    limit: Option<usize>,
    rng: &mut StdRng,
) -> Result<Vec<Pairing>> {
    match players_per_match {
        1 => {
            if selected.is_empty() {
                bail!("one-player tournament needs at least 1 selected agent");
            }
            Ok(selected.iter().map(|&id| Pairing::solo(id)).collect())
        }
        2 => {
            if selected.len() < 2 {
                bail!(
                    "two-player tournament needs at least 2 selected agents, found {}",
                    selected.len()
                );
            }
            match mode {
                Mode::Single => {
                    if limit.is_some() {
                        eprintln!("gameplan: match limit only applies to double round-robin, ignoring");
                    }
                    Ok(single_round_robin(selected))
                }
                Mode::Double => {
                    let full = double_round_robin(selected);
                    match limit {
                        Some(limit) if limit < full.len() => trim(full, selected, limit, rng),
                        Some(limit) if limit > full.len() => {
                            eprintln!(
                                "gameplan: match limit {limit} exceeds full plan of {}, ignoring",
                                full.len()
                            );
                            Ok(full)
                        }
                        _ => Ok(full),
                    }
                }
            }
        }
        n => bail!("game plan generation not supported for {n}-player games"),
    }
}

/// Each unordered pair exactly once, row-major.
fn single_round_robin(selected: &[AgentId]) -> Vec<Pairing> {
    let mut plan = Vec::with_capacity(selected.len() * (selected.len() - 1) / 2);
    for i in 0..selected.len() {
        for j in (i + 1)..selected.len() {
            plan.push(Pairing::versus(selected[i], selected[j]));
        }
    }
    plan
}

/// Each ordered pair exactly once: for i in ids, for j in ids, skip i == j.
fn double_round_robin(selected: &[AgentId]) -> Vec<Pairing> {
    let mut plan = Vec::with_capacity(selected.len() * (selected.len() - 1));
    for i in 0..selected.len() {
        for j in 0..selected.len() {
            if i != j {
                plan.push(Pairing::versus(selected[i], selected[j]));
            }
        }
    }
    plan
}

/// Trim a full double round-robin plan down to `limit` matches.
///
/// Safe matches pair neighbours (0,1), (2,3), ... in selection order,
/// wrapping the last unpaired agent back to the first when n is odd; they
/// guarantee every agent keeps at least one match. The removals are drawn
/// uniformly from the remaining positions, preserving relative order of
/// the survivors.
fn trim(
    full: Vec<Pairing>,
    selected: &[AgentId],
    limit: usize,
    rng: &mut StdRng,
) -> Result<Vec<Pairing>> {
    let minimum = minimum_matches(selected.len());
    if limit < minimum {
        bail!(
            "match limit {limit} is below the minimum of {minimum} needed so every agent plays"
        );
    }

    let mut safe = Vec::new();
    let mut k = 0;
    while k < selected.len() {
        let pair = if k + 1 == selected.len() {
            (selected[k], selected[0])
        } else {
            (selected[k], selected[k + 1])
        };
        if let Some(pos) = position_of(&full, pair.0, pair.1) {
            if !safe.contains(&pos) {
                safe.push(pos);
            }
        }
        k += 2;
    }

    // Draw distinct removal positions, rejecting safe ones
    let to_remove_count = full.len() - limit;
    let mut to_remove: Vec<usize> = Vec::with_capacity(to_remove_count);
    while to_remove.len() < to_remove_count {
        let candidate = rng.gen_range(0..full.len());
        if safe.contains(&candidate) || to_remove.contains(&candidate) {
            continue;
        }
        to_remove.push(candidate);
    }

    Ok(full
        .into_iter()
        .enumerate()
        .filter(|(pos, _)| !to_remove.contains(pos))
        .map(|(_, pairing)| pairing)
        .collect())
}

/// Position of the match (first, second) in a plan, if present.
pub fn position_of(plan: &[Pairing], first: AgentId, second: AgentId) -> Option<usize> {
    plan.iter()
        .position(|p| p.first == first && p.second == Some(second))
}
