//! Standings, score matrix, timing summaries and JSON export
//!
//! Everything here is pull-based: the report reads the tournament, the
//! tournament never pushes. Rendering of heat maps and charts belongs to
//! external consumers of [`TournamentReport`].

use serde::Serialize;

use crate::agent::AgentId;
use crate::game::GameState;
use crate::gameplan::{self, Mode};
use crate::runner::Tournament;
use crate::timing::median;

/// One row of the two-player standings, ranked by WTL score.
#[derive(Debug, Clone, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub name: String,
    pub kind: String,
    pub wins: u32,
    pub ties: u32,
    pub losses: u32,
    pub wtl_score: f64,
    pub elo_fide: f64,
    pub elo_uscf: f64,
    pub glicko2_rating: f64,
    pub glicko2_deviation: f64,
    pub glicko2_volatility: f64,
    /// Achieved share of the maximum possible WTL score
    pub success_rate: f64,
    pub games_played: u32,
}

/// One row of the one-player standings, ranked by median score.
#[derive(Debug, Clone, Serialize)]
pub struct SoloRankingEntry {
    pub rank: usize,
    pub name: String,
    pub kind: String,
    pub episodes: usize,
    pub best_score: f64,
    pub worst_score: f64,
    pub average_score: f64,
    pub median_score: f64,
}

/// Per-match result line for the JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub match_index: usize,
    pub first: String,
    pub second: Option<String>,
    pub first_wins: u32,
    pub ties: u32,
    pub second_wins: u32,
}

/// Timing summary for one seat of one match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchTimingRow {
    pub match_index: usize,
    pub name: String,
    pub kind: String,
    pub fastest_move_ms: f64,
    pub slowest_move_ms: f64,
    pub average_move_ms: f64,
    pub median_move_ms: f64,
    pub average_episode_ms: f64,
    pub median_episode_ms: f64,
    pub total_ms: f64,
    pub average_moves_per_episode: f64,
    pub median_moves_per_episode: f64,
}

/// Timing summary aggregated over all of one agent's matches.
#[derive(Debug, Clone, Serialize)]
pub struct AgentTimingRow {
    pub name: String,
    pub kind: String,
    pub fastest_move_ms: f64,
    pub slowest_move_ms: f64,
    pub average_move_ms: f64,
    pub median_move_ms: f64,
    pub average_episode_ms: f64,
    pub median_episode_ms: f64,
    pub total_ms: f64,
}

/// Full tournament results for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentReport {
    pub game: String,
    pub mode: Mode,
    pub episodes_per_match: usize,
    pub random_start_plies: usize,
    pub matches_played: usize,
    pub standings: Vec<RankingEntry>,
    pub solo_standings: Vec<SoloRankingEntry>,
    pub matches: Vec<MatchSummary>,
    /// WTL score of (row agent as first seat) vs (column agent); None on
    /// the diagonal and for matches trimmed out of the plan
    pub score_matrix: Vec<Vec<Option<f64>>>,
    pub match_timings: Vec<MatchTimingRow>,
    pub agent_timings: Vec<AgentTimingRow>,
    pub timestamp: String,
}

/// Two-player standings, best WTL score first.
pub fn standings<G: GameState>(t: &Tournament<G>) -> Vec<RankingEntry> {
    let mut ranked: Vec<RankingEntry> = t
        .agents
        .iter()
        .filter(|(_, e)| e.selected)
        .map(|(_, e)| RankingEntry {
            rank: 0,
            name: e.name.clone(),
            kind: e.kind.clone(),
            wins: e.wins,
            ties: e.ties,
            losses: e.losses,
            wtl_score: t.ratings.wtl_score(e),
            elo_fide: e.ratings.elo_fide.rating,
            elo_uscf: e.ratings.elo_uscf.rating,
            glicko2_rating: e.ratings.glicko2.rating,
            glicko2_deviation: e.ratings.glicko2.deviation,
            glicko2_volatility: e.ratings.glicko2.volatility,
            success_rate: t.ratings.success_rate(e),
            games_played: e.games_played(),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.wtl_score
            .partial_cmp(&a.wtl_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (i, entry) in ranked.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    ranked
}

/// One-player standings, best median score first.
pub fn solo_standings<G: GameState>(t: &Tournament<G>) -> Vec<SoloRankingEntry> {
    let mut ranked: Vec<SoloRankingEntry> = t
        .agents
        .iter()
        .filter(|(_, e)| e.selected && !e.single_scores.is_empty())
        .map(|(_, e)| SoloRankingEntry {
            rank: 0,
            name: e.name.clone(),
            kind: e.kind.clone(),
            episodes: e.single_scores.len(),
            best_score: e.best_single_score(),
            worst_score: e.worst_single_score(),
            average_score: e.average_single_score(),
            median_score: e.median_single_score(),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.median_score
            .partial_cmp(&a.median_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (i, entry) in ranked.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    ranked
}

/// Pairwise WTL score matrix over the selected agents, in selection order.
/// Cell (i, j) is the first-seat score of agent i against agent j; `None`
/// marks the diagonal and pairs without a scheduled match.
pub fn score_matrix<G: GameState>(t: &Tournament<G>) -> Vec<Vec<Option<f64>>> {
    let selected = t.agents.selected_ids();
    let weights = t.ratings.weights;
    selected
        .iter()
        .map(|&row| {
            selected
                .iter()
                .map(|&col| {
                    if row == col {
                        return None;
                    }
                    gameplan::position_of(t.gameplan(), row, col).map(|pos| {
                        let cell = t.results()[pos];
                        f64::from(cell[0]) * weights.win
                            + f64::from(cell[1]) * weights.tie
                            + f64::from(cell[2]) * weights.loss
                    })
                })
                .collect()
        })
        .collect()
}

pub fn match_summaries<G: GameState>(t: &Tournament<G>) -> Vec<MatchSummary> {
    t.gameplan()
        .iter()
        .zip(t.results())
        .enumerate()
        .map(|(i, (pairing, cell))| MatchSummary {
            match_index: i,
            first: agent_name(t, pairing.first),
            second: pairing.second.map(|id| agent_name(t, id)),
            first_wins: cell[0],
            ties: cell[1],
            second_wins: cell[2],
        })
        .collect()
}

/// Per-seat timing rows, one per (match, seat).
pub fn match_timings<G: GameState>(t: &Tournament<G>) -> Vec<MatchTimingRow> {
    let mut rows = Vec::new();
    for (i, (pairing, sheets)) in t.gameplan().iter().zip(t.time_sheets()).enumerate() {
        for (seat, sheet) in sheets.iter().enumerate() {
            let Some(id) = pairing.seat(seat) else {
                continue;
            };
            let entry = match t.agents.get(id) {
                Some(e) => e,
                None => continue,
            };
            rows.push(MatchTimingRow {
                match_index: i,
                name: entry.name.clone(),
                kind: entry.kind.clone(),
                fastest_move_ms: sheet.min_move_ms(),
                slowest_move_ms: sheet.max_move_ms(),
                average_move_ms: sheet.average_move_ms(),
                median_move_ms: sheet.median_move_ms(),
                average_episode_ms: sheet.average_episode_ms(),
                median_episode_ms: sheet.median_episode_ms(),
                total_ms: sheet.total_ms(),
                average_moves_per_episode: sheet.average_moves_per_episode(),
                median_moves_per_episode: sheet.median_moves_per_episode(),
            });
        }
    }
    rows
}

/// Timing rows aggregated per agent over all its seats. Only proper
/// measurements (> 0) enter the aggregates.
pub fn agent_timings<G: GameState>(t: &Tournament<G>) -> Vec<AgentTimingRow> {
    t.agents
        .selected_ids()
        .into_iter()
        .filter_map(|id| {
            let entry = t.agents.get(id)?;
            let mut fastest = Vec::new();
            let mut slowest = Vec::new();
            let mut averages = Vec::new();
            let mut medians = Vec::new();
            let mut episode_averages = Vec::new();
            let mut episode_medians = Vec::new();
            let mut total = 0.0;

            for (pairing, sheets) in t.gameplan().iter().zip(t.time_sheets()) {
                for (seat, sheet) in sheets.iter().enumerate() {
                    if pairing.seat(seat) != Some(id) {
                        continue;
                    }
                    push_if_measured(&mut fastest, sheet.min_move_ms());
                    push_if_measured(&mut slowest, sheet.max_move_ms());
                    push_if_measured(&mut averages, sheet.average_move_ms());
                    push_if_measured(&mut medians, sheet.median_move_ms());
                    push_if_measured(&mut episode_averages, sheet.average_episode_ms());
                    push_if_measured(&mut episode_medians, sheet.median_episode_ms());
                    total += sheet.total_ms();
                }
            }

            Some(AgentTimingRow {
                name: entry.name.clone(),
                kind: entry.kind.clone(),
                fastest_move_ms: if fastest.is_empty() {
                    0.0
                } else {
                    fastest.iter().copied().fold(f64::INFINITY, f64::min)
                },
                slowest_move_ms: slowest.iter().copied().fold(0.0, f64::max),
                average_move_ms: average(&averages),
                median_move_ms: median(&medians),
                average_episode_ms: average(&episode_averages),
                median_episode_ms: median(&episode_medians),
                total_ms: total,
            })
        })
        .collect()
}

fn push_if_measured(values: &mut Vec<f64>, value: f64) {
    if value > 0.0 {
        values.push(value);
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn agent_name<G: GameState>(t: &Tournament<G>, id: AgentId) -> String {
    t.agents
        .get(id)
        .map_or_else(|| format!("agent #{id}"), |e| e.name.clone())
}

/// Build the full pull-based report for export.
pub fn build_report<G: GameState>(t: &Tournament<G>) -> TournamentReport {
    TournamentReport {
        game: G::NAME.to_string(),
        mode: t.mode(),
        episodes_per_match: t.episodes_per_match(),
        random_start_plies: t.random_start_plies(),
        matches_played: t.gameplan().len(),
        standings: if G::PLAYERS > 1 {
            standings(t)
        } else {
            Vec::new()
        },
        solo_standings: if G::PLAYERS == 1 {
            solo_standings(t)
        } else {
            Vec::new()
        },
        matches: match_summaries(t),
        score_matrix: if G::PLAYERS > 1 {
            score_matrix(t)
        } else {
            Vec::new()
        },
        match_timings: match_timings(t),
        agent_timings: agent_timings(t),
        timestamp: chrono_lite_now(),
    }
}

/// Print the standings table to stdout.
pub fn print_standings<G: GameState>(t: &Tournament<G>) {
    if G::PLAYERS == 1 {
        println!(
            " {:>2}  {:16}  {:>8}  {:>8}  {:>8}  {:>8}",
            "#", "Name", "Best", "Worst", "Avg", "Median"
        );
        println!("{:-<60}", "");
        for entry in solo_standings(t) {
            println!(
                " {:>2}  {:16}  {:>8.1}  {:>8.1}  {:>8.2}  {:>8.2}",
                entry.rank,
                entry.name,
                entry.best_score,
                entry.worst_score,
                entry.average_score,
                entry.median_score
            );
        }
        return;
    }

    println!(
        " {:>2}  {:16}  {:>4}  {:>4}  {:>4}  {:>6}  {:>7}  {:>7}  {:>15}  {:>6}",
        "#", "Name", "W", "T", "L", "Score", "FIDE", "USCF", "Glicko2 (dev)", "Win%"
    );
    println!("{:-<88}", "");
    for entry in standings(t) {
        println!(
            " {:>2}  {:16}  {:>4}  {:>4}  {:>4}  {:>6.1}  {:>7.1}  {:>7.1}  {:>8.1} ({:>4.0})  {:>5.1}%",
            entry.rank,
            entry.name,
            entry.wins,
            entry.ties,
            entry.losses,
            entry.wtl_score,
            entry.elo_fide,
            entry.elo_uscf,
            entry.glicko2_rating,
            entry.glicko2_deviation,
            entry.success_rate * 100.0
        );
    }
}

/// Print the final summary block to stdout.
pub fn print_final_summary<G: GameState>(t: &Tournament<G>) {
    let (played, total) = t.progress();
    println!("\n{}", "=".repeat(60));
    println!("=== Tournament Results: {} ===", G::NAME);
    println!(
        "Matches: {} | Episodes per match: {} | Episodes played: {played}/{total}",
        t.gameplan().len(),
        t.episodes_per_match()
    );
    println!();
    print_standings(t);
}

/// Unix-seconds timestamp without a calendar dependency.
fn chrono_lite_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("unix:{}", duration.as_secs())
}
