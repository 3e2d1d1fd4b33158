pub mod climb;
pub mod nim;

pub use climb::Climb;
pub use nim::Nim;

/// Dispatch to the correct game type based on its name.
/// Uses compile-time monomorphization for zero runtime overhead.
///
/// Usage:
/// ```ignore
/// dispatch_game!("nim", {
///     // Type G is now Nim
///     run_something::<G>()
/// });
/// ```
#[macro_export]
macro_rules! dispatch_game {
    ($game_name:expr, $callback:expr) => {{
        let name: &str = $game_name;
        match name {
            "nim" => {
                type G = $crate::games::Nim;
                $callback
            }
            "climb" => {
                type G = $crate::games::Climb;
                $callback
            }
            _ => {
                anyhow::bail!("Unknown game: '{}'. Supported: nim, climb", name)
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use crate::game::GameState;

    fn game_name<G: GameState>() -> &'static str {
        G::NAME
    }

    fn dispatch_by_name(name: &str) -> anyhow::Result<&'static str> {
        crate::dispatch_game!(name, Ok(game_name::<G>()))
    }

    #[test]
    fn test_dispatch_known_games() {
        assert_eq!(dispatch_by_name("nim").unwrap(), "nim");
        assert_eq!(dispatch_by_name("climb").unwrap(), "climb");
    }

    #[test]
    fn test_dispatch_unknown_game_errors() {
        let err = dispatch_by_name("checkers").unwrap_err();
        assert!(err.to_string().contains("Unknown game"));
        assert!(err.to_string().contains("checkers"));
    }

    #[test]
    fn test_dispatch_is_case_sensitive() {
        assert!(dispatch_by_name("Nim").is_err());
    }
}
