use log::{info, warn};
use std::env;

/// Partition selection strategy.
///
/// `Classic` minimises seg splits, `Quality` additionally balances sectors
/// across the partition, `Lite` runs the classic scoring over a short
/// expanding window of candidates and skips the alias and side caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Classic,
    Quality,
    Lite,
}

impl Default for Algorithm {
    fn default() -> Algorithm {
        Algorithm::Classic
    }
}

#[derive(Clone, Debug, Default)]
pub struct BspOptions {
    pub algorithm: Algorithm,
    pub show_progress: bool,
    /// Drop segs whose two sides share a sector and have no mid-texture.
    pub reduce_linedefs: bool,
    /// Per-linedef: omit the linedef from the build entirely.
    pub ignore_linedefs: Option<Vec<bool>>,
    /// Per-linedef: mark derived segs as not splittable.
    pub dont_split: Option<Vec<bool>>,
    /// Per-sector: force flagged sectors into subsectors of their own.
    pub keep_unique: Option<Vec<bool>>,
}

/// Constants of the partition scoring formula
/// `(l * r) / (X1 * s / X2) - (X3 * s + X4) * s`, with the `Y` row applied
/// to sector counts by the quality selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoringWeights {
    pub x1: i64,
    pub x2: i64,
    pub x3: i64,
    pub x4: i64,
    pub y1: i64,
    pub y2: i64,
    pub y3: i64,
    pub y4: i64,
}

impl Default for ScoringWeights {
    fn default() -> ScoringWeights {
        ScoringWeights {
            x1: 24,
            x2: 5,
            x3: 1,
            x4: 25,
            y1: 1,
            y2: 7,
            y3: 1,
            y4: 0,
        }
    }
}

impl ScoringWeights {
    /// Default weights with `ZEN_X1..X4` / `ZEN_Y1..Y4` overrides applied.
    /// A zero divisor column is clamped to 1.
    pub fn from_env() -> ScoringWeights {
        let mut weights = ScoringWeights::default();
        override_from_env("ZEN_X1", &mut weights.x1);
        override_from_env("ZEN_X2", &mut weights.x2);
        override_from_env("ZEN_X3", &mut weights.x3);
        override_from_env("ZEN_X4", &mut weights.x4);
        override_from_env("ZEN_Y1", &mut weights.y1);
        override_from_env("ZEN_Y2", &mut weights.y2);
        override_from_env("ZEN_Y3", &mut weights.y3);
        override_from_env("ZEN_Y4", &mut weights.y4);
        if weights.x2 == 0 {
            weights.x2 = 1;
        }
        if weights.y2 == 0 {
            weights.y2 = 1;
        }
        weights
    }
}

fn override_from_env(name: &str, slot: &mut i64) {
    if let Ok(value) = env::var(name) {
        match value.trim().parse() {
            Ok(parsed) => {
                info!("Scoring override {}={}", name, parsed);
                *slot = parsed;
            }
            Err(_) => warn!("Ignoring unparseable {}=`{}`", name, value),
        }
    }
}
