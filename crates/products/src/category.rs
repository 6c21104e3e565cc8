use core::str::FromStr;
use serde::{Deserialize, Serialize};

use safegear_core::DomainError;

/// Product category (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Gloves,
    Clothing,
    Eyewear,
    Footwear,
    Headgear,
    Hearing,
    Respiratory,
    Swabs,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Gloves,
        Category::Clothing,
        Category::Eyewear,
        Category::Footwear,
        Category::Headgear,
        Category::Hearing,
        Category::Respiratory,
        Category::Swabs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Gloves => "gloves",
            Category::Clothing => "clothing",
            Category::Eyewear => "eyewear",
            Category::Footwear => "footwear",
            Category::Headgear => "headgear",
            Category::Hearing => "hearing",
            Category::Respiratory => "respiratory",
            Category::Swabs => "swabs",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is the boundary where unknown categories are rejected; everything
/// downstream works with the closed enum.
impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| DomainError::validation(format!("unknown category: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_category_case_insensitively() {
        for category in Category::ALL {
            let upper = category.as_str().to_uppercase();
            assert_eq!(upper.parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let err = "toolbelts".parse::<Category>().unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("toolbelts")),
            _ => panic!("Expected Validation error for unknown category"),
        }
    }
}
