//! Round configuration, fixed when a `Round` is constructed.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::scoring::TimeBonus;
use crate::selection::BoardGeometry;
use crate::types::{
    BOARD_COLS, BOARD_ROWS, MAX_CELL_VALUE, MIN_CELL_VALUE, ROUND_SECONDS, TIME_CAP_SECONDS,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundConfig {
    pub rows: u16,
    pub cols: u16,
    pub min_value: u8,
    pub max_value: u8,
    /// Clock value at round start
    pub round_seconds: u32,
    /// Bonus time never pushes the clock past this
    pub time_cap: u32,
    pub bonus: TimeBonus,
    pub geometry: BoardGeometry,
    pub seed: u32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            rows: BOARD_ROWS,
            cols: BOARD_COLS,
            min_value: MIN_CELL_VALUE,
            max_value: MAX_CELL_VALUE,
            round_seconds: ROUND_SECONDS,
            time_cap: TIME_CAP_SECONDS,
            bonus: TimeBonus::default(),
            geometry: BoardGeometry::default(),
            seed: 1,
        }
    }
}

impl RoundConfig {
    /// Defaults overridden by `APPLES_SEED`, `APPLES_ROWS` and `APPLES_COLS`.
    ///
    /// Missing, unparsable or zero values keep the default. Without
    /// `APPLES_SEED` the seed is taken from the wall clock.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        cfg.seed = env_parse::<u32>("APPLES_SEED").unwrap_or_else(clock_seed);
        if let Some(rows) = env_parse::<u16>("APPLES_ROWS").filter(|&v| v > 0) {
            cfg.rows = rows;
        }
        if let Some(cols) = env_parse::<u16>("APPLES_COLS").filter(|&v| v > 0) {
            cfg.cols = cols;
        }

        cfg
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_size(mut self, rows: u16, cols: u16) -> Self {
        self.rows = rows.max(1);
        self.cols = cols.max(1);
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_board() {
        let cfg = RoundConfig::default();
        assert_eq!((cfg.rows, cfg.cols), (8, 15));
        assert_eq!((cfg.min_value, cfg.max_value), (1, 9));
        assert_eq!(cfg.round_seconds, 60);
        assert_eq!(cfg.time_cap, 999);
        assert_eq!(cfg.geometry, BoardGeometry::new(840.0, 480.0));
    }

    #[test]
    fn builders_override_fields() {
        let cfg = RoundConfig::default().with_seed(7).with_size(0, 4);
        assert_eq!(cfg.seed, 7);
        assert_eq!((cfg.rows, cfg.cols), (1, 4));
    }
}
