//! Engine configuration.

/// How an already-discovered node is updated when a cheaper score shows up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relaxation {
    /// `g` is the cost of the last edge only and an improvement lowers `f`
    /// alone, keeping the original parent, `g` and `h`. Reconstructed paths
    /// can disagree with the recorded scores.
    #[default]
    FScoreOnly,
    /// `g` accumulates along the parent chain and an improvement rewrites
    /// parent, `g`, `h` and `f` together.
    Reparent,
}

/// Configuration for creating an [`Engine`](crate::Engine).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EngineConfig {
    /// Worker threads for asynchronous tickets. Zero runs every ticket
    /// synchronously inside [`Engine::update`](crate::Engine::update).
    pub workers: usize,
    pub relaxation: Relaxation,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_relaxation(mut self, relaxation: Relaxation) -> Self {
        self.relaxation = relaxation;
        self
    }
}
