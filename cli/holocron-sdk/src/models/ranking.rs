//! Relevance ordering of search results.
//!
//! Names and queries are compared after [normalize_query]. A record scores by
//! how its name matches the query, in decreasing order of relevance:
//! exact match, prefix, prefix of a later word, anywhere in the name, the
//! query's characters in order, no match. Fuzzy matches rank by their skim
//! score. Otherwise names closer in length to the query rank first, and
//! records that score the same keep their input order.

use std::cmp::Ordering;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use holocron_catalog::Record;

use crate::utils::format::normalize_query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    None,
    Fuzzy,
    Substring,
    WordPrefix,
    Prefix,
    Exact,
}

/// How well a name matches a query, greater is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relevance {
    pub tier: MatchTier,
    /// Skim score of a [MatchTier::Fuzzy] match, 0 for every other tier
    pub score: i64,
    /// Difference in chars between name and query
    pub gap: usize,
}

impl Ord for Relevance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then_with(|| self.score.cmp(&other.score))
            .then_with(|| other.gap.cmp(&self.gap))
    }
}

impl PartialOrd for Relevance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Score a normalized name against a normalized query.
///
/// An empty query scores every name the same.
pub fn relevance(name: &str, query: &str) -> Relevance {
    if query.is_empty() {
        return Relevance {
            tier: MatchTier::None,
            score: 0,
            gap: 0,
        };
    }

    let mut score = 0;
    let tier = if name == query {
        MatchTier::Exact
    } else if name.starts_with(query) {
        MatchTier::Prefix
    } else if starts_at_word(name, query) {
        MatchTier::WordPrefix
    } else if name.contains(query) {
        MatchTier::Substring
    } else if let Some(fuzzy) = SkimMatcherV2::default().fuzzy_match(name, query) {
        score = fuzzy;
        MatchTier::Fuzzy
    } else {
        MatchTier::None
    };

    Relevance {
        tier,
        score,
        gap: name.chars().count().abs_diff(query.chars().count()),
    }
}

/// Order `records` by relevance to `query`, most relevant first.
///
/// The input is left untouched.
pub fn rank(records: &[Record], query: &str) -> Vec<Record> {
    let query = normalize_query(query);
    rank_by(records, |record| {
        relevance(&normalize_query(record.display_name()), &query)
    })
}

/// Stable descending sort of `items` by `score`.
///
/// Items with equal scores keep their relative order.
pub fn rank_by<T, K>(items: &[T], mut score: impl FnMut(&T) -> K) -> Vec<T>
where
    T: Clone,
    K: Ord,
{
    let mut scored: Vec<(K, &T)> = items.iter().map(|item| (score(item), item)).collect();
    // `sort_by` is stable
    scored.sort_by(|(a, _), (b, _)| b.cmp(a));
    scored.into_iter().map(|(_, item)| item.clone()).collect()
}

fn starts_at_word(name: &str, query: &str) -> bool {
    name.char_indices()
        .filter(|(i, _)| *i > 0 && name[..*i].ends_with(char::is_whitespace))
        .any(|(i, _)| name[i..].starts_with(query))
}
