//! Helpers shared by the test suites of the workspace: reproducible random
//! sequences and a test-friendly logger.

use std::{
    collections::HashMap,
    env,
    error::Error,
    sync::{Mutex, OnceLock},
};

use log::info;
use rand::{random, rngs::StdRng, SeedableRng};

pub const DEFAULT_TEST_SEED_ENV: &str = "DEFAULT_TEST_SEED";

static SEEDS: OnceLock<Mutex<HashMap<&'static str, u64>>> = OnceLock::new();

fn seeds() -> &'static Mutex<HashMap<&'static str, u64>> {
    SEEDS.get_or_init(Mutex::default)
}

/// Seed for `scope`, read once from the environment variable of the same
/// name and drawn at random when it is missing or unparsable.
fn seed_for(scope: &'static str) -> Result<u64, Box<dyn Error>> {
    let mut seeds = seeds().lock().map_err(|error| error.to_string())?;
    let seed = *seeds.entry(scope).or_insert_with(|| {
        let seed = env::var(scope)
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or_else(random);
        info!("Using seed {seed} for {scope}, export {scope}={seed} to replay");
        seed
    });
    Ok(seed)
}

pub fn get_seeded_rng() -> Result<StdRng, Box<dyn Error>> {
    get_seeded_rng_from_scope(DEFAULT_TEST_SEED_ENV)
}

pub fn get_seeded_rng_from_scope(scope: &'static str) -> Result<StdRng, Box<dyn Error>> {
    init_logger();
    Ok(StdRng::seed_from_u64(seed_for(scope)?))
}

/// Routes `log` output through the test harness. Safe to call from every
/// test; only the first call installs the logger.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use crate::{get_seeded_rng_from_scope, init_logger, seed_for, seeds};

    #[test]
    fn test_seed_is_read_from_environment() {
        // Given
        let scope = "test_seed_is_read_from_environment";

        // When
        let seed = temp_env::with_var(scope, Some("42"), || seed_for(scope).unwrap());

        // Then
        assert_eq!(42, seed);
        assert!(seeds().lock().unwrap().contains_key(scope));
    }

    #[test]
    fn test_same_scope_replays_same_sequence() {
        // Given
        let scope = "test_same_scope_replays_same_sequence";

        // When
        let first = get_seeded_rng_from_scope(scope).unwrap().gen::<u64>();
        let second = get_seeded_rng_from_scope(scope).unwrap().gen::<u64>();

        // Then
        assert_eq!(first, second, "Should reuse the seed chosen for a scope");
    }

    #[test]
    fn test_init_logger_twice() {
        // When
        init_logger();

        // Then
        init_logger();
    }
}
