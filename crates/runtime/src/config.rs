//! Runtime configuration and environment overrides.
use std::env;
use std::str::FromStr;

use game_core::GameConfig;

/// Runtime configuration shared across the registry and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Simulation steps per second. Zero disables the background ticker.
    pub tick_rate_hz: u32,
    pub event_buffer_size: usize,
    /// Capacity of each instance worker's command queue.
    pub command_buffer_size: usize,
    /// Generation attempts, each with a fresh seed, before an
    /// unplaceable floor is reported as failed.
    pub max_generation_attempts: u32,
    /// Ticks an instance may sit with no bound player before it is dropped.
    /// Only instances nobody has joined yet can be in that state.
    pub unclaimed_instance_ttl_ticks: u64,
    /// Fixed base seed. Instance seeds are derived from it so a run is
    /// reproducible; `None` seeds every floor randomly.
    pub seed: Option<u64>,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_RATE_HZ: u32 = 60;
    pub const DEFAULT_EVENT_BUFFER: usize = 256;
    pub const DEFAULT_COMMAND_BUFFER: usize = 64;
    pub const DEFAULT_GENERATION_ATTEMPTS: u32 = 3;
    pub const DEFAULT_UNCLAIMED_TTL_TICKS: u64 = 600;

    /// Construct configuration from process environment variables.
    ///
    /// - `DUNGEON_TICK_RATE`
    /// - `DUNGEON_SEED`
    /// - `DUNGEON_EVENT_BUFFER` / `DUNGEON_COMMAND_BUFFER`
    /// - `DUNGEON_GENERATION_ATTEMPTS`
    /// - `DUNGEON_UNCLAIMED_TTL`
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(rate) = read_env::<u32>("DUNGEON_TICK_RATE") {
            config.tick_rate_hz = rate;
        }

        if let Some(seed) = read_env::<u64>("DUNGEON_SEED") {
            config.seed = Some(seed);
        }

        if let Some(capacity) = read_env::<usize>("DUNGEON_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        if let Some(capacity) = read_env::<usize>("DUNGEON_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }

        if let Some(attempts) = read_env::<u32>("DUNGEON_GENERATION_ATTEMPTS") {
            config.max_generation_attempts = attempts.max(1);
        }

        if let Some(ticks) = read_env::<u64>("DUNGEON_UNCLAIMED_TTL") {
            config.unclaimed_instance_ttl_ticks = ticks;
        }

        config
    }

    pub fn with_game_config(mut self, game_config: GameConfig) -> Self {
        self.game_config = game_config;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tick_rate(mut self, tick_rate_hz: u32) -> Self {
        self.tick_rate_hz = tick_rate_hz;
        self
    }

    pub fn with_unclaimed_ttl(mut self, ticks: u64) -> Self {
        self.unclaimed_instance_ttl_ticks = ticks;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER,
            command_buffer_size: Self::DEFAULT_COMMAND_BUFFER,
            max_generation_attempts: Self::DEFAULT_GENERATION_ATTEMPTS,
            unclaimed_instance_ttl_ticks: Self::DEFAULT_UNCLAIMED_TTL_TICKS,
            seed: None,
        }
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}
