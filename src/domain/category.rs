//! Canonical output categories.
//!
//! The set is closed: adding a category means adding a variant here and
//! its synonyms in `Category::synonyms`.

use serde::{Deserialize, Serialize};

/// A canonical download category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Association rules as an Excel workbook
    Excel,

    /// Association rules as CSV
    Csv,
}

impl Category {
    /// All categories in declaration order.
    ///
    /// This order drives alias resolution, fallback assignment and
    /// "first available" selection.
    pub const ALL: [Category; 2] = [Category::Excel, Category::Csv];

    /// Canonical name, as used for output keys and download routes
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Excel => "excel",
            Category::Csv => "csv",
        }
    }

    /// Raw spellings producers use for this category besides its name
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Category::Excel => &[
                "xlsx",
                "xls",
                "excel_file",
                "excelfile",
                "excelfilename",
                "excelpath",
                "excel_url",
                "excelurl",
            ],
            Category::Csv => &[
                "associationrules",
                "association_rules",
                "associationrulescsv",
                "rulescsv",
                "rules_csv",
                "csvfile",
            ],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        crate::core::resolve_category(s)
            .ok_or_else(|| anyhow::anyhow!("Unknown download category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        assert_eq!(Category::ALL, [Category::Excel, Category::Csv]);
        assert!(Category::Excel < Category::Csv);
    }

    #[test]
    fn test_from_str_accepts_aliases() {
        assert_eq!("excel".parse::<Category>().unwrap(), Category::Excel);
        assert_eq!("XLSX".parse::<Category>().unwrap(), Category::Excel);
        assert_eq!("rules-csv".parse::<Category>().unwrap(), Category::Csv);
        assert!("pdf".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_name() {
        let json = serde_json::to_string(&Category::Csv).unwrap();
        assert_eq!(json, "\"csv\"");
    }
}
