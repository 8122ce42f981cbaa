//! Type-safe entity classes for the HBnB console
//!
//! Class names typed at the prompt and stored in the `__class__` tag are parsed
//! into [`EntityKind`] instead of being looked up in a string-keyed table, so
//! every dispatch over entity classes is an exhaustive match.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The closed set of entity classes the console knows about.
///
/// The string form is the class name exactly as users type it and as it
/// appears in composite keys (`"User.<id>"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum EntityKind {
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

impl EntityKind {
    /// Look up a class by name, `None` when the name is not a known class
    pub fn lookup(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Every class name, in declaration order
    pub fn names() -> Vec<String> {
        Self::iter().map(|kind| kind.to_string()).collect()
    }

    /// Composite storage key for an instance of this class
    pub fn key(self, id: &str) -> String {
        format!("{}.{}", self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_classes() {
        assert_eq!(EntityKind::lookup("User"), Some(EntityKind::User));
        assert_eq!(EntityKind::lookup("BaseModel"), Some(EntityKind::BaseModel));
        assert_eq!(EntityKind::lookup("Review"), Some(EntityKind::Review));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(EntityKind::lookup("user"), None);
        assert_eq!(EntityKind::lookup("USER"), None);
        assert_eq!(EntityKind::lookup(""), None);
    }

    #[test]
    fn test_display_matches_class_name() {
        assert_eq!(EntityKind::Amenity.to_string(), "Amenity");
        assert_eq!(EntityKind::City.to_string(), "City");
    }

    #[test]
    fn test_names_lists_all_seven() {
        let names = EntityKind::names();
        assert_eq!(
            names,
            vec!["BaseModel", "User", "State", "City", "Amenity", "Place", "Review"]
        );
    }

    #[test]
    fn test_key_format() {
        assert_eq!(EntityKind::Place.key("abc-123"), "Place.abc-123");
    }
}
