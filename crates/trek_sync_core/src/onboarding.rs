//! crates/trek_sync_core/src/onboarding.rs
//!
//! The fixed interest survey shown to new users, and the selection built from it.

/// One group of options in the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestCategory {
    pub id: &'static str,
    pub title: &'static str,
    pub emoji: &'static str,
    pub options: &'static [&'static str],
}

pub const INTEREST_CATEGORIES: &[InterestCategory] = &[
    InterestCategory {
        id: "geography",
        title: "Geography",
        emoji: "🏔️",
        options: &["Mountains", "Hills", "Lakes", "Forests", "Valleys"],
    },
    InterestCategory {
        id: "experience",
        title: "Experience",
        emoji: "🧭",
        options: &[
            "Adventure",
            "Leisure",
            "Spiritual",
            "Cultural Immersion",
            "Historical Sites",
        ],
    },
    InterestCategory {
        id: "difficulty",
        title: "Difficulty Level",
        emoji: "🔥",
        options: &["Easy", "Moderate", "Challenging", "High Altitude"],
    },
    InterestCategory {
        id: "scenery",
        title: "Scenic Features",
        emoji: "📸",
        options: &[
            "Panoramic Views",
            "Villages",
            "Wildlife",
            "Sunrise/Sunset",
            "Snowy Mountains",
        ],
    },
    InterestCategory {
        id: "season",
        title: "Best Seasons",
        emoji: "🗓️",
        options: &["Spring", "Autumn", "Winter", "Monsoon"],
    },
    InterestCategory {
        id: "travelStyle",
        title: "Travel Style",
        emoji: "🎒",
        options: &["Solo Trekking", "Group Trek", "Family-Friendly", "Remote Areas"],
    },
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown interest: {0}")]
pub struct UnknownInterest(pub String);

/// Returns the canonical spelling of a survey option, matched case-insensitively.
pub fn canonical_interest(option: &str) -> Option<&'static str> {
    let wanted = option.trim();
    INTEREST_CATEGORIES
        .iter()
        .flat_map(|c| c.options.iter().copied())
        .find(|o| o.eq_ignore_ascii_case(wanted))
}

/// Options picked so far, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestSelection {
    selected: Vec<String>,
}

impl InterestSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects every given option once, in order.
    pub fn from_options<I, S>(options: I) -> Result<Self, UnknownInterest>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::new();
        for option in options {
            let canonical = canonical_interest(option.as_ref())
                .ok_or_else(|| UnknownInterest(option.as_ref().to_string()))?;
            if !selection.contains(canonical) {
                selection.selected.push(canonical.to_string());
            }
        }
        Ok(selection)
    }

    /// Flips an option. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, option: &str) -> Result<bool, UnknownInterest> {
        let canonical =
            canonical_interest(option).ok_or_else(|| UnknownInterest(option.to_string()))?;
        if self.contains(canonical) {
            self.selected.retain(|s| s != canonical);
            Ok(false)
        } else {
            self.selected.push(canonical.to_string());
            Ok(true)
        }
    }

    pub fn contains(&self, option: &str) -> bool {
        self.selected.iter().any(|s| s == option)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.selected
    }

    pub fn into_vec(self) -> Vec<String> {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_option_is_unique() {
        let mut all: Vec<_> = INTEREST_CATEGORIES
            .iter()
            .flat_map(|c| c.options.iter())
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = InterestSelection::new();
        assert!(selection.toggle("lakes").unwrap());
        assert!(selection.toggle("Spring").unwrap());
        assert!(!selection.toggle("LAKES").unwrap());
        assert_eq!(selection.as_slice().to_vec(), vec!["Spring".to_string()]);
    }

    #[test]
    fn unknown_options_are_rejected() {
        let mut selection = InterestSelection::new();
        assert_eq!(
            selection.toggle("Scuba"),
            Err(UnknownInterest("Scuba".to_string()))
        );
        assert!(InterestSelection::from_options(["Hills", "Scuba"]).is_err());
    }

    #[test]
    fn from_options_deduplicates_in_order() {
        let selection =
            InterestSelection::from_options(["wildlife", "Hills", "Wildlife"]).unwrap();
        assert_eq!(
            selection.into_vec(),
            vec!["Wildlife".to_string(), "Hills".to_string()]
        );
    }
}
