//! Search, type filter and sort over a fetched catalog.
//!
//! The search string is a space-separated list of terms, all of which must
//! match (AND). Supported forms:
//!
//! - `pika` matches names containing `pika` (case-insensitive)
//! - `'pikachu'` matches the name exactly (case-sensitive)
//! - `type:fire` / `t:fire` matches any of the entity's types
//! - `id:25` / `i:25` matches the id (`'25'` for exact)
//! - `hp:>=80`, `speed:<50`, `attack:=49` compare a stat; a bare number is a
//!   substring match on the stat's digits

use crate::model::Entity;
use std::cmp::{Ordering, Reverse};
use std::fmt;
use std::str::FromStr;

/// Represents a parsed search term with optional classifier and exact match flag.
#[derive(Debug, PartialEq)]
pub(crate) struct SearchTerm {
    /// Optional field classifier (e.g., "type", "hp").
    pub classifier: Option<String>,
    /// The pattern to match.
    pub pattern: String,
    /// Whether this is an exact match (value surrounded by single quotes).
    pub exact: bool,
}

/// Parses a search string into a `SearchTerm`.
/// Supports "classifier:value", "classifier:'exact_value'", "'exact_value'", and "pattern".
pub(crate) fn parse_search_term(term: &str) -> SearchTerm {
    let (classifier, value) = match term.split_once(':') {
        Some((classifier, value)) => (Some(classifier.to_lowercase()), value),
        None => (None, term),
    };

    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        SearchTerm {
            classifier,
            pattern: value[1..value.len() - 1].to_string(),
            exact: true,
        }
    } else {
        SearchTerm {
            classifier,
            pattern: value.to_string(),
            exact: false,
        }
    }
}

fn matches_text(value: &str, pattern: &str, exact: bool) -> bool {
    if exact {
        value == pattern
    } else {
        value.to_lowercase().contains(&pattern.to_lowercase())
    }
}

/// Matches a number against `>N`, `>=N`, `<N`, `<=N`, `=N`, or a digit pattern.
fn matches_number(value: u32, pattern: &str, exact: bool) -> bool {
    let comparisons: [(&str, fn(u32, u32) -> bool); 5] = [
        (">=", |v, n| v >= n),
        ("<=", |v, n| v <= n),
        (">", |v, n| v > n),
        ("<", |v, n| v < n),
        ("=", |v, n| v == n),
    ];
    for (op, cmp) in comparisons {
        if let Some(rest) = pattern.strip_prefix(op) {
            return rest.trim().parse().is_ok_and(|n| cmp(value, n));
        }
    }

    let digits = value.to_string();
    if exact {
        digits == pattern
    } else {
        digits.contains(pattern)
    }
}

fn matches_term(entity: &Entity, term: &SearchTerm) -> bool {
    match term.classifier.as_deref() {
        None | Some("name") | Some("n") => matches_text(entity.name(), &term.pattern, term.exact),
        Some("type") | Some("t") => entity
            .types()
            .iter()
            .any(|t| matches_text(t, &term.pattern, term.exact)),
        Some("id") | Some("i") => matches_number(entity.id(), &term.pattern, term.exact),
        Some(stat) => match entity.stats().get(stat) {
            Some(value) => matches_number(*value, &term.pattern, term.exact),
            None => false,
        },
    }
}

/// Returns true when `entity` satisfies every term of `query`.
pub fn matches(entity: &Entity, query: &str) -> bool {
    query
        .split_whitespace()
        .map(parse_search_term)
        .all(|term| matches_term(entity, &term))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Id,
    Hp,
    Attack,
    Defense,
    Speed,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "id" => Ok(SortKey::Id),
            "hp" => Ok(SortKey::Hp),
            "attack" | "atk" => Ok(SortKey::Attack),
            "defense" | "def" => Ok(SortKey::Defense),
            "speed" | "spd" => Ok(SortKey::Speed),
            _ => Err(format!(
                "unknown sort key '{s}' (expected name, id, hp, attack, defense, speed)"
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Name => "name",
            SortKey::Id => "id",
            SortKey::Hp => "hp",
            SortKey::Attack => "attack",
            SortKey::Defense => "defense",
            SortKey::Speed => "speed",
        };
        f.write_str(name)
    }
}

impl SortKey {
    /// Name and id ascend; stats descend, ties broken by name.
    pub fn compare(&self, a: &Entity, b: &Entity) -> Ordering {
        let by_name = || a.name().cmp(b.name()).then(a.id().cmp(&b.id()));
        let by_stat = |stat: fn(&Entity) -> u32| {
            Reverse(stat(a)).cmp(&Reverse(stat(b))).then_with(by_name)
        };
        match self {
            SortKey::Name => by_name(),
            SortKey::Id => a.id().cmp(&b.id()),
            SortKey::Hp => by_stat(Entity::hp),
            SortKey::Attack => by_stat(Entity::attack),
            SortKey::Defense => by_stat(Entity::defense),
            SortKey::Speed => by_stat(Entity::speed),
        }
    }
}

/// Search + primary-type filter + sort, applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    /// Primary type to keep; `None` keeps every type.
    pub type_filter: Option<String>,
    pub sort: SortKey,
}

impl CatalogQuery {
    pub fn apply<'a>(&self, entities: &'a [Entity]) -> Vec<&'a Entity> {
        let mut selected: Vec<&Entity> = entities
            .iter()
            .filter(|entity| match &self.type_filter {
                Some(wanted) => entity.primary_type().eq_ignore_ascii_case(wanted),
                None => true,
            })
            .filter(|entity| matches(entity, &self.search))
            .collect();
        selected.sort_by(|a, b| self.sort.compare(a, b));
        selected
    }
}
