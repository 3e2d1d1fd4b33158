//! Rating engine: per-game Elo on two scales, batched Glicko-2, WTL scores
//!
//! Elo is applied synchronously after every recorded game. Glicko-2
//! observations are collected across the whole tournament and applied as a
//! single rating period by [`RatingEngine::apply_rating_period`]; the two
//! must never be interchanged - a per-game Glicko-2 application produces
//! different (and wrong) numbers.

use serde::{Deserialize, Serialize};
use skillratings::elo::{elo, EloConfig, EloRating};
use skillratings::glicko2::{decay_deviation, glicko2_rating_period, Glicko2Config, Glicko2Rating};
use skillratings::Outcomes;

use crate::agent::{AgentEntry, AgentId, AgentRegistry};
use crate::game::MatchOutcome;

/// Both Elo scales start here.
pub const ELO_START: f64 = 1500.0;

/// Glicko-2 system constant, as in the original rating setup.
const GLICKO2_TAU: f64 = 0.5;

/// Elo parameterization. The two scales differ only in their K-factor
/// curves and are tracked independently per agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EloScale {
    Fide,
    Uscf,
}

impl EloScale {
    /// K-factor for a player on this scale.
    pub fn k_factor(self, rating: f64, games: u32) -> f64 {
        match self {
            // Provisional players move fast, masters barely move
            EloScale::Fide => {
                if games < 30 {
                    40.0
                } else if rating < 2400.0 {
                    20.0
                } else {
                    10.0
                }
            }
            EloScale::Uscf => {
                if rating < 2100.0 {
                    32.0
                } else if rating < 2400.0 {
                    24.0
                } else {
                    16.0
                }
            }
        }
    }
}

/// Elo state on one scale: rating plus rated-game count (the FIDE curve
/// switches on it).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScaledElo {
    pub rating: f64,
    pub games: u32,
}

impl Default for ScaledElo {
    fn default() -> Self {
        Self {
            rating: ELO_START,
            games: 0,
        }
    }
}

/// Glicko-2 state. Mirrors `skillratings::glicko2::Glicko2Rating` so the
/// whole rating block serializes with the rest of the tournament.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Glicko2State {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl Default for Glicko2State {
    fn default() -> Self {
        let start = Glicko2Rating::new();
        Self {
            rating: start.rating,
            deviation: start.deviation,
            volatility: start.volatility,
        }
    }
}

impl Glicko2State {
    fn as_rating(self) -> Glicko2Rating {
        Glicko2Rating {
            rating: self.rating,
            deviation: self.deviation,
            volatility: self.volatility,
        }
    }

    fn from_rating(rating: Glicko2Rating) -> Self {
        Self {
            rating: rating.rating,
            deviation: rating.deviation,
            volatility: rating.volatility,
        }
    }
}

/// Full rating state carried by every agent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AgentRatings {
    pub elo_fide: ScaledElo,
    pub elo_uscf: ScaledElo,
    pub glicko2: Glicko2State,
}

/// Weights for the win/tie/loss ranking score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RatingWeights {
    pub win: f64,
    pub tie: f64,
    pub loss: f64,
}

impl Default for RatingWeights {
    fn default() -> Self {
        Self {
            win: 1.0,
            tie: 0.5,
            loss: 0.0,
        }
    }
}

/// One Glicko-2 observation, kept until the period is applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Observation {
    first: AgentId,
    second: AgentId,
    outcome: MatchOutcome,
}

/// Applies Elo per game and Glicko-2 per tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingEngine {
    pub weights: RatingWeights,
    batch: Vec<Observation>,
    period_applied: bool,
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::new(RatingWeights::default())
    }
}

impl RatingEngine {
    pub fn new(weights: RatingWeights) -> Self {
        Self {
            weights,
            batch: Vec::new(),
            period_applied: false,
        }
    }

    /// Observations collected so far in the current rating period.
    pub fn observations(&self) -> usize {
        self.batch.len()
    }

    pub fn period_applied(&self) -> bool {
        self.period_applied
    }

    /// Start a fresh rating period. Called at lock time.
    pub fn begin_period(&mut self) {
        self.batch.clear();
        self.period_applied = false;
    }

    /// Record one finished game: updates both Elo scales of both agents
    /// immediately and appends the observation to the Glicko-2 batch.
    pub fn record_game(
        &mut self,
        registry: &mut AgentRegistry,
        first: AgentId,
        second: AgentId,
        outcome: MatchOutcome,
    ) {
        let (a, b) = registry.pair_mut(first, second);
        update_elo(
            EloScale::Fide,
            &mut a.ratings.elo_fide,
            &mut b.ratings.elo_fide,
            outcome,
        );
        update_elo(
            EloScale::Uscf,
            &mut a.ratings.elo_uscf,
            &mut b.ratings.elo_uscf,
            outcome,
        );
        self.batch.push(Observation {
            first,
            second,
            outcome,
        });
    }

    /// Apply the whole batch as one Glicko-2 rating period.
    ///
    /// Every observation is evaluated against opponents' pre-period
    /// ratings. Agents with no observation keep their rating but their
    /// deviation inflates (inactivity decay). A second call without a new
    /// period is a logged no-op.
    pub fn apply_rating_period(&mut self, registry: &mut AgentRegistry) {
        if self.period_applied {
            eprintln!("rating: rating period already applied, ignoring");
            return;
        }
        self.period_applied = true;

        let config = Glicko2Config {
            tau: GLICKO2_TAU,
            ..Glicko2Config::new()
        };

        // Snapshot pre-period ratings; all per-agent updates read from it.
        let before: Vec<Glicko2Rating> = (0..registry.len())
            .map(|id| {
                registry
                    .get(id)
                    .map(|e| e.ratings.glicko2.as_rating())
                    .unwrap_or_else(Glicko2Rating::new)
            })
            .collect();

        for id in 0..registry.len() {
            let results: Vec<(Glicko2Rating, Outcomes)> = self
                .batch
                .iter()
                .filter_map(|obs| {
                    if obs.first == id {
                        Some((before[obs.second], to_outcomes(obs.outcome)))
                    } else if obs.second == id {
                        Some((before[obs.first], to_outcomes(obs.outcome.flipped())))
                    } else {
                        None
                    }
                })
                .collect();

            let updated = if results.is_empty() {
                decay_deviation(&before[id])
            } else {
                glicko2_rating_period(&before[id], &results, &config)
            };
            if let Some(entry) = registry.get_mut(id) {
                entry.ratings.glicko2 = Glicko2State::from_rating(updated);
            }
        }
    }

    /// Weighted win/tie/loss ranking score.
    pub fn wtl_score(&self, entry: &AgentEntry) -> f64 {
        f64::from(entry.wins) * self.weights.win
            + f64::from(entry.ties) * self.weights.tie
            + f64::from(entry.losses) * self.weights.loss
    }

    /// Achieved share of the maximum possible score, in [0, 1].
    pub fn success_rate(&self, entry: &AgentEntry) -> f64 {
        let max = f64::from(entry.games_played()) * self.weights.win;
        if max == 0.0 {
            return 0.0;
        }
        self.wtl_score(entry) / max
    }
}

/// Symmetric expected-score Elo update on one scale. Each side's delta uses
/// its own K-factor, taken from the scale's curve before the update.
fn update_elo(scale: EloScale, a: &mut ScaledElo, b: &mut ScaledElo, outcome: MatchOutcome) {
    let k_a = scale.k_factor(a.rating, a.games);
    let k_b = scale.k_factor(b.rating, b.games);
    let rating_a = EloRating { rating: a.rating };
    let rating_b = EloRating { rating: b.rating };
    let outcomes = to_outcomes(outcome);

    let (new_a, _) = elo(&rating_a, &rating_b, &outcomes, &EloConfig { k: k_a });
    let (_, new_b) = elo(&rating_a, &rating_b, &outcomes, &EloConfig { k: k_b });

    a.rating = new_a.rating;
    b.rating = new_b.rating;
    a.games += 1;
    b.games += 1;
}

fn to_outcomes(outcome: MatchOutcome) -> Outcomes {
    match outcome {
        MatchOutcome::FirstWins => Outcomes::WIN,
        MatchOutcome::Tie => Outcomes::DRAW,
        MatchOutcome::SecondWins => Outcomes::LOSS,
    }
}
