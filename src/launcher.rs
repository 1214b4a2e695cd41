//! Spotlight-style application search

use crate::registry::{AppRegistry, PlanGate, Session};
use serde::Serialize;

/// How closely a query matched an app name; lower ranks sort first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchRank {
    Exact,
    Prefix,
    WordPrefix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub app_id: String,
    pub name: String,
    pub rank: MatchRank,

    /// Listed, but launching it will be refused by the plan gate
    pub locked: bool,
}

fn rank(name: &str, query: &str) -> Option<MatchRank> {
    let name = name.to_lowercase();
    if name == query {
        Some(MatchRank::Exact)
    } else if name.starts_with(query) {
        Some(MatchRank::Prefix)
    } else if name.split_whitespace().any(|word| word.starts_with(query)) {
        Some(MatchRank::WordPrefix)
    } else if name.contains(query) {
        Some(MatchRank::Substring)
    } else {
        None
    }
}

/// Case-insensitive search over the registry. An empty query lists every app
/// alphabetically. At most `limit` hits are returned.
pub fn search(
    registry: &dyn AppRegistry,
    gate: &dyn PlanGate,
    session: &Session,
    query: &str,
    limit: usize,
) -> Vec<SearchHit> {
    let query = query.trim().to_lowercase();

    let mut hits: Vec<SearchHit> = registry
        .apps()
        .into_iter()
        .filter_map(|app| {
            let rank = if query.is_empty() {
                MatchRank::Substring
            } else {
                rank(&app.name, &query)?
            };
            Some(SearchHit {
                locked: gate.is_locked(&app, session),
                app_id: app.id,
                name: app.name,
                rank,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    hits.truncate(limit);
    hits
}
