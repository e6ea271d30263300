use super::normalizer::fold_label;
use crate::workflows::checklist::Category;

/// Category assigned when no rule recognizes the label.
pub(crate) const FALLBACK_CATEGORY: Category = Category::Common;

struct CategoryRule {
    keywords: &'static [&'static str],
    category: Category,
}

// First match wins. Keywords are compared against the folded label, so they
// are written lower-case and without accents.
const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        keywords: &["crit"],
        category: Category::Critical,
    },
    CategoryRule {
        keywords: &["infra"],
        category: Category::Infrastructure,
    },
    CategoryRule {
        keywords: &["comun", "common", "espacio", "space"],
        category: Category::Common,
    },
    CategoryRule {
        keywords: &["higiene", "hygiene", "limpieza", "cleaning", "basura", "trash"],
        category: Category::Hygiene,
    },
    CategoryRule {
        keywords: &["acceso", "access", "porton", "gate"],
        category: Category::Access,
    },
];

pub(crate) fn normalize_category(label: &str) -> Category {
    let folded = fold_label(label);
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| folded.contains(keyword)))
        .map(|rule| rule.category)
        .unwrap_or(FALLBACK_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_to_their_category() {
        for category in Category::ordered() {
            assert_eq!(normalize_category(category.label()), category);
        }
    }

    #[test]
    fn recognizes_free_text_synonyms() {
        assert_eq!(normalize_category("Sistemas críticos"), Category::Critical);
        assert_eq!(normalize_category("INFRAESTRUCTURA"), Category::Infrastructure);
        assert_eq!(normalize_category("Espacios comunes"), Category::Common);
        assert_eq!(normalize_category("Limpieza"), Category::Hygiene);
        assert_eq!(normalize_category("Trash room"), Category::Hygiene);
        assert_eq!(normalize_category("Portón"), Category::Access);
        assert_eq!(normalize_category("Main gate"), Category::Access);
    }

    #[test]
    fn earlier_rules_take_priority() {
        assert_eq!(normalize_category("Infra crítica"), Category::Critical);
        assert_eq!(normalize_category("Acceso a infra"), Category::Infrastructure);
    }

    #[test]
    fn unknown_labels_fall_back() {
        assert_eq!(normalize_category("Varios"), FALLBACK_CATEGORY);
    }
}
