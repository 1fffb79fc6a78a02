use serde::{Deserialize, Serialize};

/// Shape of one tracked category (a lottery wheel) on the results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Label as printed on the page, matched case-insensitively.
    pub name: String,
    /// Exact count of numbers drawn for this category.
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_min")]
    pub min: u8,
    #[serde(default = "default_max")]
    pub max: u8,
}

fn default_count() -> usize {
    5
}

fn default_min() -> u8 {
    1
}

fn default_max() -> u8 {
    90
}

/// Italian Lotto wheels in the order they are printed.
pub const LOTTO_WHEELS: [&str; 11] = [
    "BARI",
    "CAGLIARI",
    "FIRENZE",
    "GENOVA",
    "MILANO",
    "NAPOLI",
    "PALERMO",
    "ROMA",
    "TORINO",
    "VENEZIA",
    "NAZIONALE",
];

impl CategorySpec {
    pub fn new(name: impl Into<String>, count: usize, min: u8, max: u8) -> Self {
        Self {
            name: name.into(),
            count,
            min,
            max,
        }
    }

    pub fn lotto_wheels() -> Vec<Self> {
        LOTTO_WHEELS
            .iter()
            .map(|name| Self::new(*name, default_count(), default_min(), default_max()))
            .collect()
    }

    pub fn accepts(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }
}
