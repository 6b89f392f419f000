//! Store configuration: the fixed set of collection names.

/// Collections known to the admin front end.
pub const DEFAULT_COLLECTIONS: &[&str] = &[
    "bookings",
    "events",
    "eventOccurrences",
    "mediations",
    "offers",
    "offerers",
    "pendingOfferers",
    "providers",
    "stocks",
    "things",
    "types",
    "users",
    "userOfferers",
    "venues",
    "venueProviders",
];

/// Collection names the store is created with.
///
/// The set is fixed for the lifetime of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub collections: Vec<String>,
}

impl StoreConfig {
    /// Creates a configuration for the given collection names.
    pub fn new<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in collections {
            let name = name.into();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        Self { collections: names }
    }

    /// Parses a comma-separated list such as `"bookings, offers"`.
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTIONS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lists_all_front_end_collections() {
        let config = StoreConfig::default();
        assert_eq!(config.collections.len(), DEFAULT_COLLECTIONS.len());
        assert!(config.collections.iter().any(|c| c == "eventOccurrences"));
    }

    #[test]
    fn test_from_list_trims_and_skips_blanks_and_duplicates() {
        let config = StoreConfig::from_list(" bookings, offers,,bookings ");
        assert_eq!(config.collections, vec!["bookings", "offers"]);
    }
}
