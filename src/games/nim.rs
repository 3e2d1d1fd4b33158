/// Single-heap Nim, the built-in two-player benchmark game
///
/// 21 stones, take 1 to 3 per turn, whoever takes the last stone wins.
/// Positions that are a multiple of four are lost for the side to move,
/// which gives the "optimal" policy something to exploit.
use anyhow::Result;

use crate::game::{GameState, MatchOutcome, Policy, RandomPolicy};

const START_STONES: usize = 21;
const MAX_TAKE: usize = 3;

/// Nim game state. Actions are the number of stones to take.
#[derive(Debug, Clone)]
pub struct Nim {
    stones: usize,
    seat: usize,
    winner: Option<usize>,
}

impl GameState for Nim {
    const NAME: &'static str = "nim";
    const PLAYERS: usize = 2;

    fn initial() -> Self {
        Self {
            stones: START_STONES,
            seat: 0,
            winner: None,
        }
    }

    fn legal_actions(&self) -> Vec<usize> {
        (1..=self.stones.min(MAX_TAKE)).collect()
    }

    fn apply(&mut self, action: usize) {
        let take = action.clamp(1, self.stones.min(MAX_TAKE));
        self.stones -= take;
        if self.stones == 0 {
            // Taking the last stone wins
            self.winner = Some(self.seat);
        } else {
            self.seat = 1 - self.seat;
        }
    }

    fn current_seat(&self) -> usize {
        self.seat
    }

    fn is_over(&self) -> bool {
        self.stones == 0
    }

    fn outcome(&self) -> Option<MatchOutcome> {
        self.winner.map(|seat| {
            if seat == 0 {
                MatchOutcome::FirstWins
            } else {
                MatchOutcome::SecondWins
            }
        })
    }

    fn policy(kind: &str) -> Result<Box<dyn Policy<Self>>> {
        match kind {
            "random" => Ok(Box::new(RandomPolicy)),
            "optimal" => Ok(Box::new(OptimalNim)),
            other => anyhow::bail!("unknown policy kind '{other}' for game nim (random, optimal)"),
        }
    }
}

/// Perfect play: leave the opponent a multiple of four.
pub struct OptimalNim;

impl Policy<Nim> for OptimalNim {
    fn choose(&mut self, state: &Nim, _rng: &mut rand::rngs::StdRng) -> usize {
        let remainder = state.stones % (MAX_TAKE + 1);
        if remainder == 0 {
            // Lost position, stall with the minimum take
            1
        } else {
            remainder.min(state.stones)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn play(first: &mut dyn Policy<Nim>, second: &mut dyn Policy<Nim>, seed: u64) -> MatchOutcome {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = Nim::initial();
        while !state.is_over() {
            let action = if state.current_seat() == 0 {
                first.choose(&state, &mut rng)
            } else {
                second.choose(&state, &mut rng)
            };
            state.apply(action);
        }
        state.outcome().expect("finished game has an outcome")
    }

    #[test]
    fn test_initial_state() {
        let state = Nim::initial();
        assert_eq!(state.legal_actions(), vec![1, 2, 3]);
        assert_eq!(state.current_seat(), 0);
        assert!(!state.is_over());
        assert!(state.outcome().is_none());
    }

    #[test]
    fn test_taking_last_stone_wins() {
        let mut state = Nim::initial();
        // Drain to 2 stones, seat alternating
        for _ in 0..9 {
            state.apply(2);
        }
        assert_eq!(state.legal_actions(), vec![1, 2]);
        let mover = state.current_seat();
        state.apply(2);
        assert!(state.is_over());
        let expected = if mover == 0 {
            MatchOutcome::FirstWins
        } else {
            MatchOutcome::SecondWins
        };
        assert_eq!(state.outcome(), Some(expected));
    }

    #[test]
    fn test_optimal_first_mover_always_wins_from_21() {
        // 21 is a won position for the side to move
        for seed in 0..20 {
            let outcome = play(&mut OptimalNim, &mut RandomPolicy, seed);
            assert_eq!(outcome, MatchOutcome::FirstWins, "seed {seed}");
        }
        let outcome = play(&mut OptimalNim, &mut OptimalNim, 0);
        assert_eq!(outcome, MatchOutcome::FirstWins);
    }

    #[test]
    fn test_policy_factory() {
        assert!(Nim::policy("random").is_ok());
        assert!(Nim::policy("optimal").is_ok());
        assert!(Nim::policy("minimax").is_err());
    }
}
