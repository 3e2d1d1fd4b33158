/// Game-state and move-selection abstractions - just what the runner needs
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Result of one finished episode, seen from the first seat.
///
/// The numeric codes (0 = first wins, 1 = tie, 2 = second wins) are the
/// wire format used by drivers and saved results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    FirstWins,
    Tie,
    SecondWins,
}

impl MatchOutcome {
    /// Decode an outcome code. Returns `None` for anything outside 0..=2.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MatchOutcome::FirstWins),
            1 => Some(MatchOutcome::Tie),
            2 => Some(MatchOutcome::SecondWins),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            MatchOutcome::FirstWins => 0,
            MatchOutcome::Tie => 1,
            MatchOutcome::SecondWins => 2,
        }
    }

    /// +1 / 0 / -1 from the first seat's perspective.
    pub fn sign(self) -> i32 {
        match self {
            MatchOutcome::FirstWins => 1,
            MatchOutcome::Tie => 0,
            MatchOutcome::SecondWins => -1,
        }
    }

    /// The same result seen from the second seat.
    pub fn flipped(self) -> Self {
        match self {
            MatchOutcome::FirstWins => MatchOutcome::SecondWins,
            MatchOutcome::Tie => MatchOutcome::Tie,
            MatchOutcome::SecondWins => MatchOutcome::FirstWins,
        }
    }
}

/// Minimal game interface for tournament play.
///
/// The runner never plays a game itself; it only pre-generates start states
/// and records the outcomes the play loop hands back. Actions are opaque
/// `usize` indices whose meaning belongs to the game.
pub trait GameState: Clone + Send + 'static {
    /// Game name for dispatch and logging.
    const NAME: &'static str;

    /// Seats per match. 1 and 2 are supported.
    const PLAYERS: usize;

    /// Default start state.
    fn initial() -> Self;

    /// Actions currently legal. Empty only when the game is over.
    fn legal_actions(&self) -> Vec<usize>;

    /// Apply an action in place.
    fn apply(&mut self, action: usize);

    /// Seat to move (always 0 for one-player games).
    fn current_seat(&self) -> usize {
        0
    }

    fn is_over(&self) -> bool;

    /// Two-player games: the result once `is_over()`.
    fn outcome(&self) -> Option<MatchOutcome> {
        None
    }

    /// One-player games: the final score once `is_over()`.
    fn score(&self) -> f64 {
        0.0
    }

    /// Build a move-selection policy from an agent's type tag. Games
    /// override this to offer their own contestants; "random" is always
    /// available.
    fn policy(kind: &str) -> Result<Box<dyn Policy<Self>>>
    where
        Self: Sized,
    {
        match kind {
            "random" => Ok(Box::new(RandomPolicy)),
            other => anyhow::bail!("unknown policy kind '{other}' for game {}", Self::NAME),
        }
    }
}

/// Move selection for a single seat. Implementations are opaque to the
/// runner; timing is measured around `choose` by the play loop.
pub trait Policy<G: GameState> {
    fn choose(&mut self, state: &G, rng: &mut StdRng) -> usize;
}

/// Uniform-random legal move. Used both as a baseline contestant and to
/// randomize start states.
pub struct RandomPolicy;

impl<G: GameState> Policy<G> for RandomPolicy {
    fn choose(&mut self, state: &G, rng: &mut StdRng) -> usize {
        let legal = state.legal_actions();
        legal[rng.gen_range(0..legal.len())]
    }
}

/// Advance a state by up to `plies` uniformly-random legal moves, stopping
/// early if the game ends.
pub fn advance_random_plies<G: GameState>(state: &mut G, plies: usize, rng: &mut StdRng) {
    let mut random = RandomPolicy;
    for _ in 0..plies {
        if state.is_over() {
            break;
        }
        let action = random.choose(state, rng);
        state.apply(action);
    }
}
