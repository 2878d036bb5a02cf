use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::slot::Slot;

/// Activity category of a slot.
///
/// Unknown codes coming from the server are kept as `Other` instead of
/// failing deserialization, since the server may know categories this
/// client does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Administratif,
    Prestation,
    Ecole,
    Competition,
    Ouverture,
    Loisir,
    MiseEnPlace,
    Sante,
    Other(String),
}

/// Display metadata for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub label: &'static str,
    pub rgb: (u8, u8, u8),
    /// Whether text drawn on top of `rgb` should be light
    pub light_text: bool,
}

impl CategoryStyle {
    pub fn color_hex(&self) -> String {
        let (r, g, b) = self.rgb;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn text_color_hex(&self) -> &'static str {
        if self.light_text {
            "#ffffff"
        } else {
            "#1f2937"
        }
    }
}

const FALLBACK_STYLE: CategoryStyle = CategoryStyle {
    label: "other",
    rgb: (156, 163, 175),
    light_text: false,
};

impl Category {
    pub const KNOWN: [Category; 8] = [
        Category::Administratif,
        Category::Prestation,
        Category::Ecole,
        Category::Competition,
        Category::Ouverture,
        Category::Loisir,
        Category::MiseEnPlace,
        Category::Sante,
    ];

    pub fn code(&self) -> &str {
        match self {
            Category::Administratif => "administratif",
            Category::Prestation => "prestation",
            Category::Ecole => "ecole",
            Category::Competition => "competition",
            Category::Ouverture => "ouverture",
            Category::Loisir => "loisir",
            Category::MiseEnPlace => "mise_en_place",
            Category::Sante => "sante",
            Category::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "administratif" => Category::Administratif,
            "prestation" => Category::Prestation,
            "ecole" => Category::Ecole,
            "competition" => Category::Competition,
            "ouverture" => Category::Ouverture,
            "loisir" => Category::Loisir,
            "mise_en_place" => Category::MiseEnPlace,
            "sante" => Category::Sante,
            other => Category::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }

    pub fn style(&self) -> CategoryStyle {
        let (label, rgb, light_text) = match self {
            Category::Administratif => ("Administratif", (99, 102, 241), true),
            Category::Prestation => ("Prestation", (16, 185, 129), true),
            Category::Ecole => ("École", (245, 158, 11), false),
            Category::Competition => ("Compétition", (239, 68, 68), true),
            Category::Ouverture => ("Ouverture", (14, 165, 233), true),
            Category::Loisir => ("Loisir", (168, 85, 247), true),
            Category::MiseEnPlace => ("Mise en place", (250, 204, 21), false),
            Category::Sante => ("Santé", (236, 72, 153), true),
            Category::Other(_) => return FALLBACK_STYLE,
        };
        CategoryStyle {
            label,
            rgb,
            light_text,
        }
    }

    pub fn label(&self) -> &'static str {
        self.style().label
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Prestation
    }
}

impl From<String> for Category {
    fn from(code: String) -> Self {
        Category::from_code(&code)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.code().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Hours per category for a week
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals(pub BTreeMap<Category, f64>);

impl CategoryTotals {
    pub fn from_slots(slots: &[Slot]) -> Self {
        let mut totals = BTreeMap::new();
        for slot in slots {
            *totals.entry(slot.category.clone()).or_insert(0.0) +=
                slot.duration_minute as f64 / 60.0;
        }
        CategoryTotals(totals)
    }

    pub fn hours(&self, category: &Category) -> f64 {
        self.0.get(category).copied().unwrap_or(0.0)
    }

    pub fn total_hours(&self) -> f64 {
        self.0.values().sum()
    }
}

/// Share of each category in percent.
///
/// When every total is zero the result holds zero for each category
/// rather than dividing by zero.
pub fn calculate_repartition_percentages(totals: &CategoryTotals) -> BTreeMap<Category, f64> {
    let sum = totals.total_hours();
    totals
        .0
        .iter()
        .map(|(category, hours)| {
            let percentage = if sum > 0.0 { 100.0 * hours / sum } else { 0.0 };
            (category.clone(), percentage)
        })
        .collect()
}

/// Categories with hours, largest first
pub fn get_sorted_categories(totals: &CategoryTotals) -> Vec<(Category, f64)> {
    let mut categories: Vec<(Category, f64)> = totals
        .0
        .iter()
        .filter(|(_, hours)| **hours > 0.0)
        .map(|(category, hours)| (category.clone(), *hours))
        .collect();
    categories.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for category in Category::KNOWN {
            assert_eq!(Category::from_code(category.code()), category);
            assert!(category.is_known());
        }
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let category = Category::from_code("yoga");
        assert_eq!(category, Category::Other("yoga".to_string()));
        let style = category.style();
        assert_eq!(style.label, "other");
        assert_eq!(style.color_hex(), "#9ca3af");
    }

    #[test]
    fn test_serde_uses_wire_codes() {
        let json = serde_json::to_string(&Category::MiseEnPlace).unwrap();
        assert_eq!(json, "\"mise_en_place\"");
        let parsed: Category = serde_json::from_str("\"sante\"").unwrap();
        assert_eq!(parsed, Category::Sante);
        let unknown: Category = serde_json::from_str("\"nouveau\"").unwrap();
        assert_eq!(unknown.code(), "nouveau");
    }

    #[test]
    fn test_totals_serialize_as_map() {
        let mut map = BTreeMap::new();
        map.insert(Category::Ecole, 3.5);
        let json = serde_json::to_string(&CategoryTotals(map)).unwrap();
        assert_eq!(json, "{\"ecole\":3.5}");
        let parsed: CategoryTotals = serde_json::from_str("{\"loisir\":2.0,\"x\":1.0}").unwrap();
        assert_eq!(parsed.hours(&Category::Loisir), 2.0);
        assert_eq!(parsed.hours(&Category::Other("x".to_string())), 1.0);
    }

    #[test]
    fn test_percentages_all_zero() {
        let mut map = BTreeMap::new();
        map.insert(Category::Ecole, 0.0);
        map.insert(Category::Loisir, 0.0);
        let percentages = calculate_repartition_percentages(&CategoryTotals(map));
        assert_eq!(percentages.len(), 2);
        assert!(percentages.values().all(|p| *p == 0.0));
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let mut map = BTreeMap::new();
        map.insert(Category::Ecole, 3.0);
        map.insert(Category::Loisir, 1.5);
        map.insert(Category::Sante, 2.25);
        let percentages = calculate_repartition_percentages(&CategoryTotals(map));
        let sum: f64 = percentages.values().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((percentages[&Category::Ecole] - 44.444).abs() < 0.01);
    }

    #[test]
    fn test_sorted_categories_skip_zero() {
        let mut map = BTreeMap::new();
        map.insert(Category::Ecole, 1.0);
        map.insert(Category::Loisir, 0.0);
        map.insert(Category::Sante, 4.0);
        let sorted = get_sorted_categories(&CategoryTotals(map));
        assert_eq!(sorted, vec![(Category::Sante, 4.0), (Category::Ecole, 1.0)]);
    }
}
