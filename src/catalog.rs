//! Food knowledge catalog
//!
//! A fixed, ordered catalog of food entries with per-unit calories. Lookup
//! parses a leading quantity from the query, matches the item phrase against
//! canonical names and aliases, and returns the first match in catalog order.
//! A miss is an empty result, never an error; callers substitute their own
//! conservative estimate.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Built-in catalog document. Same shape as the food database the specialist
/// was originally backed by: calories arrive as strings.
const BUILTIN_CATALOG: &str = r#"{
  "food_response": [
    {
      "food_entry_name": "apple",
      "eaten": {
        "food_name_singular": "apple",
        "food_name_plural": "apples",
        "total_nutritional_content": { "calories": "95" }
      }
    },
    {
      "food_entry_name": "banana",
      "eaten": {
        "food_name_singular": "banana",
        "food_name_plural": "bananas",
        "total_nutritional_content": { "calories": "89" }
      }
    },
    {
      "food_entry_name": "toast",
      "eaten": {
        "food_name_singular": "slice of toast",
        "food_name_plural": "slices of toast",
        "total_nutritional_content": { "calories": "75" }
      }
    },
    {
      "food_entry_name": "cappuccino",
      "eaten": {
        "food_name_singular": "cappuccino",
        "food_name_plural": "cappuccinos",
        "total_nutritional_content": { "calories": "74" }
      }
    },
    {
      "food_entry_name": "cheese",
      "eaten": {
        "food_name_singular": "slice of cheese",
        "food_name_plural": "slices of cheese",
        "total_nutritional_content": { "calories": "113" }
      }
    },
    {
      "food_entry_name": "ham",
      "eaten": {
        "food_name_singular": "slice of ham",
        "food_name_plural": "slices of ham",
        "total_nutritional_content": { "calories": "46" }
      }
    },
    {
      "food_entry_name": "kfc meal",
      "eaten": {
        "food_name_singular": "kfc meal",
        "food_name_plural": "kfc meals",
        "total_nutritional_content": { "calories": "620" }
      }
    },
    {
      "food_entry_name": "pizza",
      "eaten": {
        "food_name_singular": "slice of pizza",
        "food_name_plural": "slices of pizza",
        "total_nutritional_content": { "calories": "285" }
      }
    },
    {
      "food_entry_name": "burger",
      "eaten": {
        "food_name_singular": "burger",
        "food_name_plural": "burgers",
        "total_nutritional_content": { "calories": "295" }
      }
    },
    {
      "food_entry_name": "chicken breast",
      "eaten": {
        "food_name_singular": "chicken breast",
        "food_name_plural": "chicken breasts",
        "total_nutritional_content": { "calories": "165" }
      }
    }
  ]
}"#;

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    food_response: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    food_entry_name: String,
    #[serde(default)]
    eaten: EatenInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EatenInfo {
    #[serde(default)]
    food_name_singular: Option<String>,
    #[serde(default)]
    food_name_plural: Option<String>,
    #[serde(default)]
    total_nutritional_content: NutritionalContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NutritionalContent {
    #[serde(default)]
    calories: Option<Value>,
}

impl CatalogEntry {
    pub fn canonical_name(&self) -> &str {
        &self.food_entry_name
    }

    /// Per-unit calories, if present and numeric. Source data stores these
    /// as strings, so both representations are accepted.
    fn per_unit_calories(&self) -> Option<f64> {
        match self.eaten.total_nutritional_content.calories.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn matches(&self, item: &str) -> bool {
        let candidates = [
            Some(self.food_entry_name.as_str()),
            self.eaten.food_name_singular.as_deref(),
            self.eaten.food_name_plural.as_deref(),
        ];
        candidates.into_iter().flatten().any(|name| {
            let name = name.to_lowercase();
            !name.is_empty() && (name == item || item.contains(&name) || name.contains(item))
        })
    }
}

/// Result of a successful catalog lookup
#[derive(Debug, Clone, PartialEq)]
pub struct FoodMatch {
    pub canonical_name: String,
    pub quantity: u32,
    pub calories_per_unit: f64,
    pub calories_total: u32,
}

/// Fixed, ordered food catalog
pub struct FoodCatalog {
    entries: Vec<CatalogEntry>,
    quantity_re: Regex,
}

impl FoodCatalog {
    /// Load the built-in catalog
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_CATALOG).expect("built-in catalog is valid JSON")
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let doc: CatalogDoc = serde_json::from_str(raw.trim())?;
        Ok(Self {
            entries: doc.food_response,
            quantity_re: Regex::new(r"^\s*(\d+)\s+([\w\s\-]+?)\s*$")
                .expect("quantity pattern is valid"),
        })
    }

    /// Look up a food query like `"3 banana"` or `"cappuccino"`.
    ///
    /// A leading integer is the quantity (default 1); the rest is matched
    /// case-insensitively against each entry's canonical name and aliases
    /// (equals, contains, or contained-by). The first matching entry in
    /// catalog order wins; there is no best-match scoring. Returns `None`
    /// when nothing matches or the entry has no usable calorie figure.
    pub fn lookup(&self, query: &str) -> Option<FoodMatch> {
        let (quantity, item) = self.parse_quantity(query);
        let item = item.to_lowercase();

        let entry = self.entries.iter().find(|e| e.matches(&item))?;
        let per_unit = entry.per_unit_calories()?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let calories_total = (f64::from(quantity) * per_unit).round() as u32;

        Some(FoodMatch {
            canonical_name: entry.canonical_name().to_string(),
            quantity,
            calories_per_unit: per_unit,
            calories_total,
        })
    }

    fn parse_quantity<'q>(&self, query: &'q str) -> (u32, &'q str) {
        if let Some(caps) = self.quantity_re.captures(query) {
            let qty = caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            let item = caps.get(2).map_or_else(|| query.trim(), |m| m.as_str());
            (qty, item)
        } else {
            (1, query.trim())
        }
    }
}
