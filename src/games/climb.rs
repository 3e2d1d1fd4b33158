/// Climb, the built-in one-player benchmark game
///
/// Start at zero, add 1 to 3 per move, stop once the total reaches 21.
/// Landing exactly on 21 scores full points; every point of overshoot
/// costs three. The "exact" policy always lands the target, the random
/// policy usually does not.
use anyhow::Result;

use crate::game::{GameState, Policy, RandomPolicy};

const TARGET: usize = 21;
const MAX_STEP: usize = 3;

/// Climb game state. Actions are the step size.
#[derive(Debug, Clone)]
pub struct Climb {
    total: usize,
}

impl GameState for Climb {
    const NAME: &'static str = "climb";
    const PLAYERS: usize = 1;

    fn initial() -> Self {
        Self { total: 0 }
    }

    fn legal_actions(&self) -> Vec<usize> {
        if self.is_over() {
            Vec::new()
        } else {
            (1..=MAX_STEP).collect()
        }
    }

    fn apply(&mut self, action: usize) {
        self.total += action.clamp(1, MAX_STEP);
    }

    fn is_over(&self) -> bool {
        self.total >= TARGET
    }

    fn score(&self) -> f64 {
        if !self.is_over() {
            return 0.0;
        }
        let overshoot = self.total - TARGET;
        TARGET as f64 - 3.0 * overshoot as f64
    }

    fn policy(kind: &str) -> Result<Box<dyn Policy<Self>>> {
        match kind {
            "random" => Ok(Box::new(RandomPolicy)),
            "exact" => Ok(Box::new(ExactClimb)),
            other => anyhow::bail!("unknown policy kind '{other}' for game climb (random, exact)"),
        }
    }
}

/// Steps straight to the target, never overshooting.
pub struct ExactClimb;

impl Policy<Climb> for ExactClimb {
    fn choose(&mut self, state: &Climb, _rng: &mut rand::rngs::StdRng) -> usize {
        (TARGET - state.total).min(MAX_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_exact_policy_scores_full_points() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut policy = ExactClimb;
        let mut state = Climb::initial();
        while !state.is_over() {
            let step = policy.choose(&state, &mut rng);
            state.apply(step);
        }
        assert_eq!(state.score(), TARGET as f64);
    }

    #[test]
    fn test_overshoot_is_penalized() {
        let mut state = Climb { total: 20 };
        state.apply(3);
        assert!(state.is_over());
        assert_eq!(state.score(), TARGET as f64 - 6.0);
    }

    #[test]
    fn test_score_zero_while_running() {
        let state = Climb { total: 10 };
        assert_eq!(state.score(), 0.0);
        assert_eq!(state.legal_actions(), vec![1, 2, 3]);
    }

    #[test]
    fn test_policy_factory() {
        assert!(Climb::policy("random").is_ok());
        assert!(Climb::policy("exact").is_ok());
        assert!(Climb::policy("sharp").is_err());
    }
}
