//! The canonical category → reference mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::category::Category;

/// One reference per category, assigned at most once.
///
/// Keys iterate (and serialize) in category declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalMapping(BTreeMap<Category, String>);

impl CanonicalMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference for a category
    pub fn get(&self, category: Category) -> Option<&str> {
        self.0.get(&category).map(String::as_str)
    }

    /// Whether a category already has a reference
    pub fn contains(&self, category: Category) -> bool {
        self.0.contains_key(&category)
    }

    /// Assign a reference unless the category is taken or the value is blank.
    ///
    /// Returns whether the assignment happened.
    pub fn assign_once(&mut self, category: Category, reference: impl Into<String>) -> bool {
        if self.contains(category) {
            return false;
        }
        let reference = reference.into();
        if reference.is_empty() {
            return false;
        }
        self.0.insert(category, reference);
        true
    }

    /// First category without a reference, in declaration order
    pub fn first_open(&self) -> Option<Category> {
        Category::ALL.into_iter().find(|c| !self.contains(*c))
    }

    /// Pick the preferred category if available, else the first available one
    pub fn select(&self, preferred: Category) -> Option<(Category, &str)> {
        if let Some(reference) = self.get(preferred) {
            return Some((preferred, reference));
        }
        self.iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &str)> {
        self.0.iter().map(|(c, r)| (*c, r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
