//! The ordered table of supported issue categories.

use helpdesk_types::IssueCategory;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while validating a catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The table has no categories at all.
    #[error("issue catalog must contain at least one category")]
    Empty,

    /// Two categories share a key.
    #[error("duplicate issue category key: {0}")]
    DuplicateKey(String),

    /// A category was configured with a zero price.
    #[error("issue category '{0}' must have a positive price")]
    ZeroPrice(String),

    /// A category has no usable keywords.
    #[error("issue category '{0}' must have at least one keyword")]
    NoKeywords(String),
}

/// Immutable, ordered set of issue categories.
///
/// Iteration order is significant: the classifier returns the first category
/// (in this order) whose keyword matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCatalog {
    categories: Vec<IssueCategory>,
}

impl IssueCatalog {
    /// Validates and normalizes a catalog table.
    ///
    /// Keywords are trimmed and lowercased; blank keywords are dropped.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the table is empty, a key repeats, a price
    /// is zero, or a category ends up with no keywords.
    pub fn new(categories: Vec<IssueCategory>) -> Result<Self, CatalogError> {
        if categories.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(categories.len());

        for mut category in categories {
            if !seen.insert(category.key.clone()) {
                return Err(CatalogError::DuplicateKey(category.key));
            }
            if category.unit_price == 0 {
                return Err(CatalogError::ZeroPrice(category.key));
            }

            category.keywords = category
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
            if category.keywords.is_empty() {
                return Err(CatalogError::NoKeywords(category.key));
            }

            normalized.push(category);
        }

        Ok(Self {
            categories: normalized,
        })
    }

    /// The four-category table the help desk ships with.
    pub fn reference() -> Self {
        let entry = |key: &str, name: &str, display: &str, price: u32, keywords: &[&str]| {
            IssueCategory {
                key: key.to_string(),
                name: name.to_string(),
                display_name: display.to_string(),
                unit_price: price,
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            }
        };

        Self {
            categories: vec![
                entry(
                    "wifi",
                    "Wi-Fi not working",
                    "Network connectivity issues",
                    20,
                    &[
                        "wifi",
                        "wi-fi",
                        "wireless",
                        "internet",
                        "connection",
                        "network",
                        "connectivity",
                    ],
                ),
                entry(
                    "email",
                    "Email login issues",
                    "Password reset and login problems",
                    15,
                    &[
                        "email", "login", "password", "reset", "account", "access", "signin",
                    ],
                ),
                entry(
                    "performance",
                    "Slow laptop performance",
                    "CPU change and optimization",
                    25,
                    &[
                        "laptop",
                        "slow",
                        "performance",
                        "cpu",
                        "speed",
                        "computer",
                        "pc",
                        "optimization",
                    ],
                ),
                entry(
                    "printer",
                    "Printer problems",
                    "Power plug or driver issues",
                    10,
                    &[
                        "printer", "printing", "power", "plug", "cable", "hardware", "driver",
                    ],
                ),
            ],
        }
    }

    /// Finds a category by its key.
    pub fn lookup_by_key(&self, key: &str) -> Option<&IssueCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// All categories in match order.
    pub fn all(&self) -> &[IssueCategory] {
        &self.categories
    }

    /// Number of configured categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always false for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Renders the supported options as one spoken sentence, e.g.
    /// "We handle Wi-Fi not working ($20) and Printer problems ($10)."
    pub fn spoken_summary(&self) -> String {
        let items: Vec<String> = self
            .categories
            .iter()
            .map(|c| format!("{} (${})", c.name, c.unit_price))
            .collect();

        let joined = match items.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [first, second] => format!("{} and {}", first, second),
            [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
        };

        format!("We handle {}.", joined)
    }
}

impl Default for IssueCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(key: &str, price: u32, keywords: &[&str]) -> IssueCategory {
        IssueCategory {
            key: key.to_string(),
            name: key.to_uppercase(),
            display_name: format!("{} issues", key),
            unit_price: price,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn reference_catalog_order_and_prices() {
        let catalog = IssueCatalog::reference();
        let keys: Vec<&str> = catalog.all().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["wifi", "email", "performance", "printer"]);

        let prices: Vec<u32> = catalog.all().iter().map(|c| c.unit_price).collect();
        assert_eq!(prices, [20, 15, 25, 10]);
    }

    #[test]
    fn reference_catalog_passes_validation() {
        let reference = IssueCatalog::reference();
        let validated =
            IssueCatalog::new(reference.all().to_vec()).expect("reference table is valid");
        assert_eq!(validated, reference);
    }

    #[test]
    fn lookup_by_key() {
        let catalog = IssueCatalog::reference();
        let printer = catalog.lookup_by_key("printer").expect("printer exists");
        assert_eq!(printer.display_name, "Power plug or driver issues");
        assert!(catalog.lookup_by_key("scanner").is_none());
    }

    #[test]
    fn new_normalizes_keywords() {
        let catalog = IssueCatalog::new(vec![category("vpn", 30, &[" VPN ", "", "Tunnel"])])
            .expect("should validate");
        assert_eq!(catalog.all()[0].keywords, ["vpn", "tunnel"]);
    }

    #[test]
    fn new_rejects_invalid_tables() {
        assert_eq!(IssueCatalog::new(vec![]), Err(CatalogError::Empty));
        assert_eq!(
            IssueCatalog::new(vec![category("vpn", 0, &["vpn"])]),
            Err(CatalogError::ZeroPrice("vpn".to_string()))
        );
        assert_eq!(
            IssueCatalog::new(vec![category("vpn", 5, &["  "])]),
            Err(CatalogError::NoKeywords("vpn".to_string()))
        );
        assert_eq!(
            IssueCatalog::new(vec![
                category("vpn", 5, &["vpn"]),
                category("vpn", 6, &["tunnel"]),
            ]),
            Err(CatalogError::DuplicateKey("vpn".to_string()))
        );
    }

    #[test]
    fn spoken_summary_lists_every_option() {
        assert_eq!(
            IssueCatalog::reference().spoken_summary(),
            "We handle Wi-Fi not working ($20), Email login issues ($15), \
             Slow laptop performance ($25), and Printer problems ($10)."
        );

        let pair = IssueCatalog::new(vec![
            category("vpn", 30, &["vpn"]),
            category("fax", 5, &["fax"]),
        ])
        .unwrap();
        assert_eq!(pair.spoken_summary(), "We handle VPN ($30) and FAX ($5).");
    }

    #[test]
    fn catalog_table_loads_from_toml() {
        #[derive(serde::Deserialize)]
        struct Table {
            issues: Vec<IssueCategory>,
        }

        let table: Table = toml::from_str(
            r#"
            [[issues]]
            key = "vpn"
            name = "VPN trouble"
            description = "Remote access tunnel issues"
            price = 30
            keywords = ["vpn", "tunnel"]
            "#,
        )
        .expect("should parse");

        let catalog = IssueCatalog::new(table.issues).expect("should validate");
        let vpn = catalog.lookup_by_key("vpn").unwrap();
        assert_eq!(vpn.display_name, "Remote access tunnel issues");
        assert_eq!(vpn.unit_price, 30);
    }
}
