//! Event categories and the listing category filter.
//!
//! Categories are stored as their kebab-case value (e.g. `"food-drink"`).
//! Rows written before a category was retired keep their raw value, which
//! is why display code goes through [`Category::from_value`] and falls back
//! to the raw string instead of failing.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The fixed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Music,
    Markets,
    FoodDrink,
    Wellness,
    ArtCultural,
    Workshops,
    Community,
    Charity,
    Holiday,
    Film,
    Nightlife,
    Sports,
    Educational,
    KidsFamily,
    Popup,
    CulturalCelebrations,
    Gaming,
    Networking,
    Outdoor,
    Literary,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 20] = [
        Category::Music,
        Category::Markets,
        Category::FoodDrink,
        Category::Wellness,
        Category::ArtCultural,
        Category::Workshops,
        Category::Community,
        Category::Charity,
        Category::Holiday,
        Category::Film,
        Category::Nightlife,
        Category::Sports,
        Category::Educational,
        Category::KidsFamily,
        Category::Popup,
        Category::CulturalCelebrations,
        Category::Gaming,
        Category::Networking,
        Category::Outdoor,
        Category::Literary,
    ];

    /// Stored value, e.g. `"kids-family"`.
    pub fn value(self) -> &'static str {
        match self {
            Category::Music => "music",
            Category::Markets => "markets",
            Category::FoodDrink => "food-drink",
            Category::Wellness => "wellness",
            Category::ArtCultural => "art-cultural",
            Category::Workshops => "workshops",
            Category::Community => "community",
            Category::Charity => "charity",
            Category::Holiday => "holiday",
            Category::Film => "film",
            Category::Nightlife => "nightlife",
            Category::Sports => "sports",
            Category::Educational => "educational",
            Category::KidsFamily => "kids-family",
            Category::Popup => "popup",
            Category::CulturalCelebrations => "cultural-celebrations",
            Category::Gaming => "gaming",
            Category::Networking => "networking",
            Category::Outdoor => "outdoor",
            Category::Literary => "literary",
        }
    }

    /// Human-readable label without the emoji.
    pub fn label(self) -> &'static str {
        match self {
            Category::Music => "Music",
            Category::Markets => "Markets & Flea Markets",
            Category::FoodDrink => "Food & Drink",
            Category::Wellness => "Wellness",
            Category::ArtCultural => "Art & Cultural",
            Category::Workshops => "Workshops & Classes",
            Category::Community => "Community",
            Category::Charity => "Charity & Benefit",
            Category::Holiday => "Holiday & Seasonal",
            Category::Film => "Film Screenings & Movie Nights",
            Category::Nightlife => "Nightlife",
            Category::Sports => "Sports",
            Category::Educational => "Educational",
            Category::KidsFamily => "Kids & Family",
            Category::Popup => "Pop-Up",
            Category::CulturalCelebrations => "Cultural Celebrations",
            Category::Gaming => "Gaming",
            Category::Networking => "Networking",
            Category::Outdoor => "Outdoor Adventures",
            Category::Literary => "Book Clubs & Literary",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::Music => "🎶",
            Category::Markets => "🛍️",
            Category::FoodDrink => "🍹",
            Category::Wellness => "🧘",
            Category::ArtCultural => "🎨",
            Category::Workshops => "🛠️",
            Category::Community => "🌳",
            Category::Charity => "💛",
            Category::Holiday => "🎉",
            Category::Film => "🎥",
            Category::Nightlife => "🌙",
            Category::Sports => "🏃",
            Category::Educational => "📚",
            Category::KidsFamily => "🧸",
            Category::Popup => "🏗️",
            Category::CulturalCelebrations => "🏮",
            Category::Gaming => "🎮",
            Category::Networking => "🤝",
            Category::Outdoor => "🏞️",
            Category::Literary => "📖",
        }
    }

    /// Parse a stored value. Returns `None` for unknown values.
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.value() == value)
    }

    /// Parse a submitted value, rejecting anything outside the fixed set.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::from_value(value.trim()).ok_or_else(|| {
            CoreError::Validation(format!("Unknown event category '{}'", value.trim()))
        })
    }
}

/// Listing filter: either every category or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

/// Query-string value meaning "no category restriction".
pub const FILTER_ALL: &str = "all";

impl CategoryFilter {
    /// Parse the `category` query parameter. Missing, empty, and `"all"`
    /// all mean no restriction.
    pub fn parse(value: Option<&str>) -> Result<Self, CoreError> {
        match value.map(str::trim) {
            None | Some("") | Some(FILTER_ALL) => Ok(Self::All),
            Some(other) => Category::parse(other).map(Self::Only),
        }
    }

    /// The category to push into the database query, if any.
    pub fn pushdown(self) -> Option<Category> {
        match self {
            Self::All => None,
            Self::Only(category) => Some(category),
        }
    }

    /// Whether a stored category value passes the filter.
    pub fn matches(self, stored: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => category.value() == stored,
        }
    }
}

/// One entry of the category picker, as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
}

/// The picker contents in display order.
pub fn category_options() -> Vec<CategoryOption> {
    Category::ALL
        .into_iter()
        .map(|c| CategoryOption {
            value: c.value(),
            label: c.label(),
            emoji: c.emoji(),
        })
        .collect()
}
