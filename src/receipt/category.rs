//! Keyword-based item categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Produce,
    Dairy,
    Meat,
    Cleaning,
    Pantry,
    Other,
}

/// Keywords per category, in match priority order. `Other` is the fallback.
const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Produce,
        &[
            "apple", "banana", "tomato", "lettuce", "carrot", "onion", "potato", "fruit",
            "vegetable",
        ],
    ),
    (
        Category::Dairy,
        &["milk", "cheese", "yogurt", "cream", "butter", "egg"],
    ),
    (
        Category::Meat,
        &["chicken", "beef", "pork", "fish", "turkey", "meat"],
    ),
    (
        Category::Cleaning,
        &["soap", "detergent", "cleaner", "wipes", "bleach", "sponge"],
    ),
    (
        Category::Pantry,
        &["bread", "rice", "pasta", "cereal", "flour", "sugar", "oil"],
    ),
    (Category::Other, &[]),
];

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Produce,
        Category::Dairy,
        Category::Meat,
        Category::Cleaning,
        Category::Pantry,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Produce => "Produce",
            Category::Dairy => "Dairy",
            Category::Meat => "Meat",
            Category::Cleaning => "Cleaning",
            Category::Pantry => "Pantry",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Pick the first category with a keyword contained in `name`
pub fn classify(name: &str) -> Category {
    let name = name.to_lowercase();

    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(classify("Bananas"), Category::Produce);
        assert_eq!(classify("WHOLE MILK"), Category::Dairy);
        assert_eq!(classify("chicken thighs"), Category::Meat);
        assert_eq!(classify("dish soap"), Category::Cleaning);
        assert_eq!(classify("brown rice"), Category::Pantry);
    }

    #[test]
    fn test_classify_fallback() {
        assert_eq!(classify("batteries"), Category::Other);
        assert_eq!(classify(""), Category::Other);
    }

    #[test]
    fn test_classify_priority_follows_declaration_order() {
        // Produce is checked before Dairy
        assert_eq!(classify("apple butter"), Category::Produce);
        // Dairy before Pantry
        assert_eq!(classify("buttered bread"), Category::Dairy);
        // "eggplant" contains "egg"
        assert_eq!(classify("eggplant"), Category::Dairy);
        // "boiled" contains "oil"
        assert_eq!(classify("boiled peanuts"), Category::Pantry);
    }

    #[test]
    fn test_classify_is_idempotent() {
        for name in ["milk", "mystery", "", "Fish Sticks", "123"] {
            let first = classify(name);
            assert_eq!(first, classify(name));
            assert!(Category::ALL.contains(&first));
        }
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>(), Ok(category));
        }
        assert_eq!("dairy".parse::<Category>(), Ok(Category::Dairy));
        assert!("snacks".parse::<Category>().is_err());
    }
}
