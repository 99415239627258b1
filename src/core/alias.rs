//! Alias resolution: raw key spellings → canonical categories.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::domain::Category;

/// Precomputed alias sets, one per category, in declaration order
static ALIAS_TABLE: OnceLock<AliasTable> = OnceLock::new();

/// Lowercase form with everything except `a-z` and `0-9` removed
fn strip_punctuation(lower: &str) -> String {
    lower
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

type AliasTable = Vec<(Category, HashSet<String>)>;

/// Build alias sets in registration order.
///
/// Each category's set holds its name and synonyms in lowercase and
/// punctuation-stripped form.
fn build_alias_table<'a, I>(registrations: I) -> AliasTable
where
    I: IntoIterator<Item = (Category, &'a [&'a str])>,
{
    registrations
        .into_iter()
        .map(|(category, synonyms)| {
            let mut set = HashSet::new();
            for alias in std::iter::once(category.as_str()).chain(synonyms.iter().copied()) {
                let lower = alias.to_lowercase();
                set.insert(strip_punctuation(&lower));
                set.insert(lower);
            }
            (category, set)
        })
        .collect()
}

fn alias_table() -> &'static [(Category, HashSet<String>)] {
    ALIAS_TABLE.get_or_init(|| {
        build_alias_table(Category::ALL.into_iter().map(|c| (c, c.synonyms())))
    })
}

/// First registered category whose set holds either form of `raw`
fn lookup(table: &[(Category, HashSet<String>)], raw: &str) -> Option<Category> {
    let key = raw.trim();
    if key.is_empty() {
        return None;
    }

    let lower = key.to_lowercase();
    let sanitized = strip_punctuation(&lower);

    table
        .iter()
        .find(|(_, aliases)| aliases.contains(&lower) || aliases.contains(&sanitized))
        .map(|(category, _)| *category)
}

/// Resolve a raw string to a category.
///
/// Matching ignores surrounding whitespace, case, and any character that
/// is not an ASCII letter or digit. When an alias is shared, the category
/// declared first wins.
pub fn resolve_category(raw: &str) -> Option<Category> {
    lookup(alias_table(), raw)
}

/// Every stored alias form of a category, sorted (for display)
pub fn aliases_of(category: Category) -> Vec<&'static str> {
    let mut forms: Vec<&'static str> = alias_table()
        .iter()
        .filter(|(c, _)| *c == category)
        .flat_map(|(_, aliases)| aliases.iter().map(String::as_str))
        .collect();
    forms.sort_unstable();
    forms
}
