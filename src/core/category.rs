//! Item categories
//!
//! Each category owns an item table and an independent location hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Item namespace with its own table and location tree
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Accessories,
    Adapters,
    Cables,
    Chargers,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Accessories,
        Category::Adapters,
        Category::Cables,
        Category::Chargers,
    ];

    /// Value stored in the catalog's `Category` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Accessories => "accessories",
            Category::Adapters => "adapters",
            Category::Cables => "cables",
            Category::Chargers => "chargers",
        }
    }

    /// Name of the item table for this category
    ///
    /// Table names are never taken from user input.
    pub fn table(&self) -> &'static str {
        match self {
            Category::Accessories => "Accessories",
            Category::Adapters => "Adapters",
            Category::Cables => "Cables",
            Category::Chargers => "Chargers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accessories" | "accessory" => Ok(Category::Accessories),
            "adapters" | "adapter" => Ok(Category::Adapters),
            "cables" | "cable" => Ok(Category::Cables),
            "chargers" | "charger" => Ok(Category::Chargers),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}
