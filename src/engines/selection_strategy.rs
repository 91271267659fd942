use std::fmt;

/// Which selector the session consults for computer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionStrategy {
    EngineBacked,
    HeuristicFallback,
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStrategy::EngineBacked => write!(f, "engine-backed"),
            SelectionStrategy::HeuristicFallback => write!(f, "heuristic fallback"),
        }
    }
}
