// File: ./src/category.rs
//! Visibility groups for events.
//!
//! Every `EventKind` belongs to exactly one `CategoryId`. The registry keeps the
//! set of categories currently shown; all of them are shown by default.
use crate::model::EventKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CategoryId {
    Work,
    Personal,
    Family,
    Holidays,
    Birthdays,
    Travel,
    Reminders,
    Deadlines,
}

/// The category an event kind is filed under.
pub fn category_of(kind: EventKind) -> CategoryId {
    match kind {
        EventKind::Work => CategoryId::Work,
        EventKind::Personal => CategoryId::Personal,
        EventKind::Family => CategoryId::Family,
        EventKind::Holiday => CategoryId::Holidays,
        EventKind::Birthday => CategoryId::Birthdays,
        EventKind::Travel => CategoryId::Travel,
        EventKind::Reminder => CategoryId::Reminders,
        EventKind::Deadline => CategoryId::Deadlines,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    visible: HashSet<CategoryId>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            visible: CategoryId::iter().collect(),
        }
    }
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with everything visible except `hidden`.
    pub fn with_hidden<I: IntoIterator<Item = CategoryId>>(hidden: I) -> Self {
        let mut registry = Self::default();
        for id in hidden {
            registry.visible.remove(&id);
        }
        registry
    }

    /// Build from category names as stored in config. Unknown names are skipped.
    pub fn from_hidden_names(names: &[String]) -> Self {
        let hidden = names.iter().filter_map(|name| match name.parse::<CategoryId>() {
            Ok(id) => Some(id),
            Err(_) => {
                log::warn!("Ignoring unknown hidden category '{}'", name);
                None
            }
        });
        Self::with_hidden(hidden)
    }

    /// Idempotent.
    pub fn set_visibility(&mut self, id: CategoryId, visible: bool) {
        if visible {
            self.visible.insert(id);
        } else {
            self.visible.remove(&id);
        }
    }

    pub fn is_visible(&self, id: CategoryId) -> bool {
        self.visible.contains(&id)
    }

    pub fn shows_kind(&self, kind: EventKind) -> bool {
        self.is_visible(category_of(kind))
    }

    /// Visible categories in declaration order.
    pub fn visible(&self) -> Vec<CategoryId> {
        CategoryId::iter().filter(|c| self.visible.contains(c)).collect()
    }

    /// Hidden categories in declaration order.
    pub fn hidden(&self) -> Vec<CategoryId> {
        CategoryId::iter().filter(|c| !self.visible.contains(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_maps_to_a_distinct_category() {
        let cats: HashSet<CategoryId> = EventKind::iter().map(category_of).collect();
        assert_eq!(cats.len(), 8);
        assert_eq!(category_of(EventKind::Holiday), CategoryId::Holidays);
        assert_eq!(category_of(EventKind::Birthday), CategoryId::Birthdays);
        assert_eq!(category_of(EventKind::Deadline), CategoryId::Deadlines);
    }

    #[test]
    fn unknown_kind_text_is_personal() {
        let of = |s| category_of(EventKind::parse_lossy(s));
        assert_eq!(of("sales-call"), CategoryId::Personal);
        assert_eq!(of(""), CategoryId::Personal);
        assert_eq!(of("Travel"), CategoryId::Travel);
    }

    #[test]
    fn all_visible_by_default() {
        let registry = CategoryRegistry::new();
        assert!(CategoryId::iter().all(|c| registry.is_visible(c)));
        assert!(registry.hidden().is_empty());
    }

    #[test]
    fn set_visibility_is_idempotent() {
        let mut registry = CategoryRegistry::new();
        registry.set_visibility(CategoryId::Work, false);
        registry.set_visibility(CategoryId::Work, false);
        assert_eq!(registry.hidden(), vec![CategoryId::Work]);
        registry.set_visibility(CategoryId::Work, true);
        registry.set_visibility(CategoryId::Work, true);
        assert!(registry.hidden().is_empty());
        assert_eq!(registry.visible().len(), 8);
    }

    #[test]
    fn hidden_names_from_config() {
        let names = vec!["holidays".to_string(), "Travel".to_string(), "bogus".to_string()];
        let registry = CategoryRegistry::from_hidden_names(&names);
        assert_eq!(
            registry.hidden(),
            vec![CategoryId::Holidays, CategoryId::Travel]
        );
        assert_eq!(CategoryId::Holidays.to_string(), "holidays");
    }
}
