//! "Did you mean" suggestions for unsupported names.

use crate::domain::Hint;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Picks the registered name closest to `input`, if any is close at all.
///
/// Matching runs in both directions so that both a truncated name
/// (`consol` → `console`) and an over-long one (`batched` → `batch`) find
/// their candidate. Exact matches never reach this function.
pub fn closest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Hint {
    let matcher = SkimMatcherV2::default().ignore_case();
    let needle = input.trim();
    if needle.is_empty() {
        return Hint::default();
    }

    let best = candidates
        .into_iter()
        .filter_map(|candidate| {
            let forward = matcher.fuzzy_match(candidate, needle);
            let backward = matcher.fuzzy_match(needle, candidate);
            forward.max(backward).map(|score| (score, candidate))
        })
        .max_by_key(|(score, _)| *score);

    Hint(best.map(|(_, candidate)| candidate.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_for_truncated_and_extended_names() {
        assert_eq!(
            closest("consol", ["console", "file", "otlp"]).suggestion(),
            Some("console")
        );
        assert_eq!(
            closest("batched", ["batch", "simple"]).suggestion(),
            Some("batch")
        );
        assert_eq!(
            closest("HTTP/PROTO", ["http/protobuf", "http/json"]).suggestion(),
            Some("http/protobuf")
        );
    }

    #[test]
    fn unrelated_names_get_no_hint() {
        assert_eq!(closest("grpc", ["http/protobuf", "http/json"]), Hint(None));
        assert_eq!(closest("", ["batch"]), Hint(None));
    }
}
