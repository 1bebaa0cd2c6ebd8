//! Food and drink catalogs.
//!
//! Draw catalogs are ordered sequences: the action resolver picks an index
//! uniformly at random, so listing an item twice doubles its odds. Category
//! catalogs (toxic food, alcoholic drinks) are sets and are only ever used for
//! membership checks.

use std::collections::HashSet;

use rand::Rng;

use crate::config::CatalogConfig;
use crate::error::{HowlError, Result};

/// Everything the persona can be fed. Some entries appear twice on purpose.
pub const DEFAULT_FOODS: &[&str] = &[
    "🍔", "🍟", "🍕", "🌭", "🥪", "🌮", "🌯", "🥙", "🧆", "🥚", "🍳", "🥘", "🍲", "🥣", "🥗",
    "🍿", "🧈", "🧂", "🥫", "🍱", "🍘", "🍙", "🍚", "🍛", "🍜", "🍝", "🍠", "🍢", "🍣", "🍤",
    "🍥", "🥮", "🍡", "🥟", "🥠", "🥡", "🦪", "🍦", "🍧", "🍨", "🍩", "🍪", "🎂", "🍰", "🧁",
    "🥧", "🍫", "🍬", "🍭", "🍮", "🍯", "🍇", "🍈", "🍉", "🍊", "🍋", "🍌", "🍍", "🥭", "🍎",
    "🍏", "🍐", "🍑", "🍒", "🍓", "🥝", "🍅", "🥥", "🥑", "🍆", "🥔", "🥕", "🌽", "🌶", "🥒",
    "🥬", "🥦", "🧄", "🧅", "🍄", "🥜", "🌰", "🍞", "🥐", "🥖", "🥨", "🥯", "🥞", "🧇", "🧀",
    "🍖", "🍗", "🥩", "🥓", "🍔", "🍟", "🍕", "🌭", "🥪", "🌮", "🌯", "🥙", "🧆", "🍳", "🥘",
    "🍲", "🥣", "🥗", "🍿", "🧈", "🧂", "🥫", "🍱", "🍘", "🍙", "🍚", "🍛", "🍜", "🍝", "🍠",
    "🍢", "🍣", "🍤", "🍥", "🥮", "🍡", "🥟", "🥠", "🥡", "🦪", "🍦", "🍧", "🍨", "🍩", "🍪",
    "🎂", "🍰", "🧁", "🥧", "🍫", "🍬", "🍭", "🍮", "🍯",
];

/// Foods that make a wolf sick.
pub const DEFAULT_TOXIC_FOODS: &[&str] = &[
    "🍫", "🧄", "☕", "🍇", "🧅", "🥑", "🍭", "🍬", "🥮", "🎂", "🍒",
];

/// Everything the persona can be given to drink.
pub const DEFAULT_DRINKS: &[&str] = &[
    "🍼", "🥛", "☕", "🍵", "🍶", "🍾", "🍷", "🍸", "🍹", "🍺", "🍻", "🥂", "🥃", "🥤", "🧋",
    "🧃", "🧉",
];

/// Drinks that raise intoxication.
pub const DEFAULT_ALCOHOLIC_DRINKS: &[&str] = &[
    "🍺", "🍻", "🍷", "🍸", "🍹", "🍾", "🍶", "🥃", "🥂",
];

/// An ordered, non-empty sequence of items to draw from.
#[derive(Debug, Clone)]
pub struct Catalog {
    name: String,
    items: Vec<String>,
}

impl Catalog {
    /// Build a draw catalog.
    ///
    /// # Errors
    /// Returns [`HowlError::EmptyCatalog`] if `items` is empty.
    pub fn new(name: impl Into<String>, items: Vec<String>) -> Result<Self> {
        let name = name.into();
        if items.is_empty() {
            return Err(HowlError::EmptyCatalog(name));
        }
        Ok(Self { name, items })
    }

    /// Uniform draw over the full sequence, duplicates included.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let index = rng.gen_range(0..self.items.len());
        &self.items[index]
    }

    /// Catalog name (used in logs).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All entries, in order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Number of entries, counting duplicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a constructed catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// How many times `item` appears.
    #[must_use]
    pub fn weight_of(&self, item: &str) -> usize {
        self.items.iter().filter(|i| *i == item).count()
    }
}

/// A membership-only category.
#[derive(Debug, Clone, Default)]
pub struct ItemSet(HashSet<String>);

impl ItemSet {
    /// Build from any list of items; duplicates collapse.
    #[must_use]
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(items.into_iter().map(Into::into).collect())
    }

    /// Set containment.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.0.contains(item)
    }
}

/// The four catalogs the action resolver works with.
#[derive(Debug, Clone)]
pub struct Catalogs {
    /// Food draw catalog.
    pub food: Catalog,
    /// Food that triggers the toxic outcome.
    pub toxic_food: ItemSet,
    /// Drink draw catalog.
    pub drink: Catalog,
    /// Drinks that trigger the alcoholic outcome.
    pub alcoholic_drink: ItemSet,
}

impl Catalogs {
    /// Build from the `[catalog]` configuration section.
    ///
    /// # Errors
    /// Returns [`HowlError::EmptyCatalog`] if a draw catalog is empty.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Ok(Self {
            food: Catalog::new("food", config.foods.clone())?,
            toxic_food: ItemSet::new(config.toxic_foods.iter().cloned()),
            drink: Catalog::new("drink", config.drinks.clone())?,
            alcoholic_drink: ItemSet::new(config.alcoholic_drinks.iter().cloned()),
        })
    }

    /// Whether eating `item` takes the toxic branch.
    #[must_use]
    pub fn is_toxic(&self, item: &str) -> bool {
        self.toxic_food.contains(item)
    }

    /// Whether drinking `item` takes the alcoholic branch.
    #[must_use]
    pub fn is_alcoholic(&self, item: &str) -> bool {
        self.alcoholic_drink.contains(item)
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        let to_vec = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
        Self {
            food: Catalog {
                name: "food".into(),
                items: to_vec(DEFAULT_FOODS),
            },
            toxic_food: ItemSet::new(DEFAULT_TOXIC_FOODS.iter().copied()),
            drink: Catalog {
                name: "drink".into(),
                items: to_vec(DEFAULT_DRINKS),
            },
            alcoholic_drink: ItemSet::new(DEFAULT_ALCOHOLIC_DRINKS.iter().copied()),
        }
    }
}
