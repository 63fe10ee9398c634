// Shared proptest configuration for domain property tests.

use proptest::prelude::ProptestConfig;

/// Case count can be raised locally with `PROPTEST_CASES`.
pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(128);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}
