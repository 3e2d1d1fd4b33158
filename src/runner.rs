//! Tournament state machine
//!
//! `Tournament` owns the roster, the locked game plan, the per-match result
//! accumulators, the per-seat time sheets and the rating engine, and steps
//! through the plan one recorded episode at a time. It never plays a game:
//! the surrounding play loop asks for the next pairing and start state,
//! plays, and reports the outcome back.
//!
//! States: unlocked -> locked -> (stepping) -> done; `unlock` returns to
//! unlocked without discarding anything, so results stay inspectable.
//!
//! Mid-tournament usage errors (recording while unlocked, registering while
//! locked, stale cursor) are reported to the console and ignored; they
//! never panic and never corrupt state.

use anyhow::Result;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, AgentRegistry};
use crate::game::{advance_random_plies, GameState, MatchOutcome};
use crate::gameplan::{self, Mode, Pairing};
use crate::rating::{RatingEngine, RatingWeights};
use crate::timing::TimeSheet;

/// A full tournament: roster, plan, accumulators, timings and ratings.
///
/// The start-state cache is transient: it is rebuilt at lock time and not
/// part of the saved state, so loaded tournaments are inspectable but must
/// be re-locked to play again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Tournament<G: GameState> {
    pub agents: AgentRegistry,
    pub ratings: RatingEngine,
    mode: Mode,
    match_limit: Option<usize>,
    episodes_per_match: Option<usize>,
    random_start_plies: usize,
    locked: bool,
    done: bool,
    gameplan: Vec<Pairing>,
    /// Per match: [first wins, ties, second wins]
    results: Vec<[u32; 3]>,
    /// Per match, per seat
    timings: Vec<Vec<TimeSheet>>,
    cursor: usize,
    episodes_played: usize,
    #[serde(skip)]
    start_states: Vec<G>,
}

impl<G: GameState> Tournament<G> {
    pub fn new(mode: Mode, match_limit: Option<usize>) -> Self {
        Self {
            agents: AgentRegistry::new(),
            ratings: RatingEngine::new(RatingWeights::default()),
            mode,
            match_limit,
            episodes_per_match: None,
            random_start_plies: 0,
            locked: false,
            done: false,
            gameplan: Vec::new(),
            results: Vec::new(),
            timings: Vec::new(),
            cursor: 0,
            episodes_played: 0,
            start_states: Vec::new(),
        }
    }

    /// Register an agent. Refused (logged, `None`) while locked.
    pub fn register(&mut self, name: &str, kind: &str) -> Option<AgentId> {
        if self.locked {
            eprintln!("tournament: locked to compete, cannot register '{name}'");
            return None;
        }
        Some(self.agents.register(name, kind))
    }

    pub fn set_episodes_per_match(&mut self, episodes: usize) {
        if self.locked {
            eprintln!("tournament: locked to compete, episode count unchanged");
            return;
        }
        self.episodes_per_match = Some(episodes.max(1));
    }

    pub fn set_random_start_plies(&mut self, plies: usize) {
        if self.locked {
            eprintln!("tournament: locked to compete, start plies unchanged");
            return;
        }
        self.random_start_plies = plies;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn episodes_per_match(&self) -> usize {
        self.episodes_per_match.unwrap_or(1)
    }

    pub fn random_start_plies(&self) -> usize {
        self.random_start_plies
    }

    pub fn gameplan(&self) -> &[Pairing] {
        &self.gameplan
    }

    pub fn results(&self) -> &[[u32; 3]] {
        &self.results
    }

    pub fn time_sheets(&self) -> &[Vec<TimeSheet>] {
        &self.timings
    }

    /// Lock the tournament: fix the plan, zero the accumulators and
    /// counters, start a fresh rating period and pre-generate the shared
    /// start states. Ratings persist across tournaments; W/T/L counters do
    /// not.
    pub fn lock(&mut self, rng: &mut StdRng) -> Result<()> {
        if self.locked {
            eprintln!("tournament: already locked to compete");
            return Ok(());
        }
        let episodes = match self.episodes_per_match {
            Some(n) => n,
            None => {
                eprintln!("tournament: episode count was not set, using 1");
                self.episodes_per_match = Some(1);
                1
            }
        };

        let selected = self.agents.selected_ids();
        self.gameplan = gameplan::generate(&selected, G::PLAYERS, self.mode, self.match_limit, rng)?;
        self.results = vec![[0; 3]; self.gameplan.len()];
        self.timings = (0..self.gameplan.len())
            .map(|_| (0..G::PLAYERS).map(|_| TimeSheet::new()).collect())
            .collect();
        self.cursor = 0;
        self.episodes_played = 0;
        self.agents.reset_scores();
        self.ratings.begin_period();

        // One start state per episode index, shared across every match so
        // all agents face the identical sequence of start positions.
        self.start_states = (0..episodes)
            .map(|_| {
                let mut state = G::initial();
                advance_random_plies(&mut state, self.random_start_plies, rng);
                state
            })
            .collect();

        self.locked = true;
        self.done = false;
        Ok(())
    }

    /// Unlock for configuration changes. Plan, results and timings stay
    /// allocated and readable.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// The pairing the cursor points at, if any remains.
    pub fn next_pairing(&self) -> Option<Pairing> {
        self.gameplan.get(self.cursor).copied()
    }

    pub fn current_match_index(&self) -> usize {
        self.cursor
    }

    /// Episodes already recorded for the current match. Drives the shared
    /// start-state index: one-player matches count scores, two-player
    /// matches count accumulator entries.
    fn episodes_recorded_current(&self) -> usize {
        if G::PLAYERS == 1 {
            self.next_pairing()
                .and_then(|p| self.agents.get(p.first))
                .map_or(0, |a| a.single_scores.len())
        } else {
            self.results
                .get(self.cursor)
                .map_or(0, |cell| cell.iter().sum::<u32>() as usize)
        }
    }

    /// Start state for the next episode of the current match, from the
    /// cache built at lock time. `None` on a loaded (cache-less) or
    /// exhausted tournament.
    pub fn next_start_state(&self) -> Option<&G> {
        self.start_states.get(self.episodes_recorded_current())
    }

    /// The current match's time sheet for one seat.
    pub fn time_sheet_mut(&mut self, seat: usize) -> Option<&mut TimeSheet> {
        self.timings.get_mut(self.cursor)?.get_mut(seat)
    }

    /// Record one two-player episode result for the current match.
    ///
    /// Updates the accumulator, both agents' W/T/L counters, both Elo
    /// scales (immediately) and the Glicko-2 batch (deferred), closes the
    /// episode on both time sheets, and advances the cursor once the match
    /// has all its episodes. Logged no-op when not locked or exhausted.
    pub fn record_outcome(&mut self, outcome: MatchOutcome) {
        if !self.locked {
            eprintln!("tournament: not locked, cannot record result");
            return;
        }
        let Some(pairing) = self.next_pairing() else {
            eprintln!("tournament: game plan exhausted, cannot record result");
            return;
        };
        let Some(second) = pairing.second else {
            eprintln!("tournament: one-player match takes a score, not an outcome");
            return;
        };

        self.results[self.cursor][outcome.code() as usize] += 1;

        let (first_entry, second_entry) = self.agents.pair_mut(pairing.first, second);
        match outcome {
            MatchOutcome::FirstWins => {
                first_entry.add_won_game();
                second_entry.add_lost_game();
            }
            MatchOutcome::Tie => {
                first_entry.add_tie_game();
                second_entry.add_tie_game();
            }
            MatchOutcome::SecondWins => {
                first_entry.add_lost_game();
                second_entry.add_won_game();
            }
        }
        self.ratings
            .record_game(&mut self.agents, pairing.first, second, outcome);

        for sheet in &mut self.timings[self.cursor] {
            sheet.episode_finished();
        }

        let recorded: u32 = self.results[self.cursor].iter().sum();
        if recorded as usize == self.episodes_per_match() {
            self.cursor += 1;
        }
        self.episodes_played += 1;
    }

    /// Record one one-player episode score for the current match.
    pub fn record_single_score(&mut self, score: f64) {
        if !self.locked {
            eprintln!("tournament: not locked, cannot record score");
            return;
        }
        let Some(pairing) = self.next_pairing() else {
            eprintln!("tournament: game plan exhausted, cannot record score");
            return;
        };
        if pairing.second.is_some() {
            eprintln!("tournament: two-player match takes an outcome, not a score");
            return;
        }
        if let Some(agent) = self.agents.get_mut(pairing.first) {
            agent.push_single_score(score);
        }
        if let Some(sheet) = self.time_sheet_mut(0) {
            sheet.episode_finished();
        }
        self.episodes_played += 1;
    }

    /// Whether a match remains to play. Marks the tournament done at the
    /// end of the plan. One-player matches have no symmetric outcome to
    /// advance on, so the cursor moves here once the current agent has all
    /// its episode scores.
    pub fn has_next(&mut self) -> bool {
        if self.cursor == self.gameplan.len() {
            self.done = true;
            return false;
        }
        if G::PLAYERS == 1 && self.episodes_recorded_current() == self.episodes_per_match() {
            self.cursor += 1;
            if self.cursor == self.gameplan.len() {
                self.done = true;
                return false;
            }
        }
        true
    }

    /// Apply the accumulated Glicko-2 batch as the tournament's single
    /// rating period. Safe to call once; repeats are logged no-ops.
    pub fn finish(&mut self) {
        self.ratings.apply_rating_period(&mut self.agents);
    }

    /// (episodes played, total episodes), for progress reporting.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.episodes_played,
            self.gameplan.len() * self.episodes_per_match(),
        )
    }
}
