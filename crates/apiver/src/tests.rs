//! Property tests for range membership and chain ordering

use crate::chain::{DelegationChain, Fallback, VersionMap};
use crate::controller::ControllerSpec;
use crate::registry::VersionRegistry;
use crate::version::{version_number, VersionToken};
use proptest::prelude::*;
use std::sync::Arc;

fn token(n: u64) -> String {
    format!("v{}", n)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A version is active exactly when its ordinal lies in the range
    #[test]
    fn prop_active_iff_in_ordinal_range(
        a in 0u64..1000,
        span in 0u64..1000,
        probe in 0u64..3000,
    ) {
        let b = a + span;
        let registry = VersionRegistry::with_range(&token(a), &token(b)).unwrap();

        let active = registry.is_version_active(&token(probe)).unwrap();
        prop_assert_eq!(active, a <= probe && probe <= b);
    }

    /// The ordinal of `v<n>` is `n`
    #[test]
    fn prop_version_number_round_trip(n in 0u64..u64::MAX) {
        prop_assert_eq!(version_number(&token(n)).unwrap().value(), Some(n));
    }

    /// Tokens without a numeric remainder are never active
    #[test]
    fn prop_malformed_never_active(suffix in "[a-zA-Z.\\-]{1,8}") {
        let registry = VersionRegistry::with_range("v0", "v1000").unwrap();
        let candidate = format!("v{}", suffix);

        prop_assert!(!registry.is_version_active(&candidate).unwrap());
    }

    /// Each version falls back to the next-larger ordinal, the largest to latest
    #[test]
    fn prop_chain_is_sorted_by_ordinal(
        ordinals in proptest::collection::btree_set(0u64..500, 1..12),
    ) {
        let mut versions = VersionMap::new();
        for n in &ordinals {
            versions.insert(token(*n), ControllerSpec::new());
        }
        let chain = DelegationChain::build(Arc::new(ControllerSpec::new()), versions).unwrap();

        let sorted: Vec<u64> = ordinals.iter().copied().collect();
        let expected: Vec<VersionToken> = sorted
            .iter()
            .map(|n| VersionToken::new(token(*n)).unwrap())
            .collect();
        prop_assert_eq!(chain.versions(), expected.as_slice());

        for pair in sorted.windows(2) {
            prop_assert_eq!(
                chain.fallback_of(&token(pair[0])),
                Some(Fallback::Version(VersionToken::new(token(pair[1])).unwrap()))
            );
        }
        let newest = sorted[sorted.len() - 1];
        prop_assert_eq!(chain.fallback_of(&token(newest)), Some(Fallback::Latest));
    }
}
