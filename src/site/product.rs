//! Product-page crawl policy
//!
//! Visits listing and product pages matching a configured pattern, skips a
//! list of disallowed path fragments, visits product pages first and
//! extracts one [`Product`] per product page.

use crate::config::{SelectorConfig, SiteConfig};
use crate::crawler::CrawlPolicy;
use crate::CrawlError;
use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use serde::Serialize;

/// Number of category levels kept in a product record
const CATEGORY_LEVELS: usize = 4;

/// Path segment that only marks a category listing and carries no category
const CATEGORY_MARKER: &str = "categories";

/// Structured fields scraped from one product page
///
/// Every field is optional: a page missing an element yields an empty field,
/// never a failed crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub category_path: Option<String>,
    pub category_0: Option<String>,
    pub category_1: Option<String>,
    pub category_2: Option<String>,
    pub category_3: Option<String>,
}

/// Compiled selectors, one per product field
#[derive(Debug)]
struct ProductSelectors {
    id: Selector,
    name: Selector,
    brand: Selector,
    price: Selector,
    currency: Selector,
    category: Selector,
}

impl ProductSelectors {
    fn compile(config: &SelectorConfig) -> Result<Self, CrawlError> {
        Ok(Self {
            id: compile_selector(&config.id)?,
            name: compile_selector(&config.name)?,
            brand: compile_selector(&config.brand)?,
            price: compile_selector(&config.price)?,
            currency: compile_selector(&config.currency)?,
            category: compile_selector(&config.category)?,
        })
    }
}

/// Crawl policy for a product catalogue
///
/// Patterns and selectors are compiled once, when the policy is built.
#[derive(Debug)]
pub struct ProductPolicy {
    visit: Regex,
    collect: Regex,
    disallow: Vec<String>,
    selectors: ProductSelectors,
}

impl ProductPolicy {
    /// Builds the policy from site configuration
    ///
    /// Both patterns are matched case-insensitively.
    ///
    /// # Returns
    ///
    /// * `Ok(ProductPolicy)` - All patterns and selectors compiled
    /// * `Err(CrawlError::InvalidPattern)` - A regex or selector is invalid
    pub fn from_config(config: &SiteConfig) -> Result<Self, CrawlError> {
        Ok(Self {
            visit: compile_regex(&config.visit_pattern)?,
            collect: compile_regex(&config.collect_pattern)?,
            disallow: config.disallow.clone(),
            selectors: ProductSelectors::compile(&config.selectors)?,
        })
    }

    /// Extracts a product from a parsed page
    pub fn extract(&self, document: &Html) -> Product {
        let selectors = &self.selectors;
        let category_path = select_attr(document, &selectors.category, "href");
        let mut categories = category_path
            .as_deref()
            .map(category_segments)
            .unwrap_or_default()
            .into_iter();

        Product {
            id: select_attr(document, &selectors.id, "data-product"),
            name: select_text(document, &selectors.name),
            brand: select_text(document, &selectors.brand),
            price: select_attr(document, &selectors.price, "content"),
            currency: select_attr(document, &selectors.currency, "content"),
            category_path,
            category_0: categories.next(),
            category_1: categories.next(),
            category_2: categories.next(),
            category_3: categories.next(),
        }
    }
}

impl CrawlPolicy for ProductPolicy {
    type Record = Product;

    fn should_visit(&self, address: &str) -> bool {
        self.visit.is_match(address) && !self.disallow.iter().any(|path| address.contains(path))
    }

    fn should_prioritize(&self, address: &str) -> bool {
        self.collect.is_match(address)
    }

    fn should_collect(&self, address: &str, _status: u16) -> bool {
        self.collect.is_match(address)
    }

    fn collect(&self, _address: &str, document: Option<&Html>, _status: u16) -> Option<Product> {
        document.map(|document| self.extract(document))
    }
}

fn compile_regex(pattern: &str) -> Result<Regex, CrawlError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CrawlError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn compile_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|_| CrawlError::InvalidPattern {
        pattern: selector.to_string(),
        message: "invalid CSS selector".to_string(),
    })
}

/// First matching element's attribute, trimmed; empty values count as absent
fn select_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// First matching element's text with whitespace collapsed to single spaces
fn select_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
}

/// Splits a category link into at most [`CATEGORY_LEVELS`] segments
///
/// `/no/categories/488-mathall/489-kjottdisken/` gives
/// `["no", "488-mathall", "489-kjottdisken"]`.
fn category_segments(category_path: &str) -> Vec<String> {
    let path = match url::Url::parse(category_path) {
        Ok(url) => url.path().to_string(),
        Err(_) => category_path.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != CATEGORY_MARKER)
        .take(CATEGORY_LEVELS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::parse_document;

    const CHICKEN: &str = include_str!("../../tests/fixtures/product_chicken.html");
    const NELLIK: &str = include_str!("../../tests/fixtures/product_no_categories_nellik.html");

    fn create_site_config() -> SiteConfig {
        SiteConfig {
            visit_pattern: "^https://oda.com/no/(?:products|categories)/.*".to_string(),
            collect_pattern: r"^https://oda.com/no/products/\d+-.+".to_string(),
            disallow: vec![
                "/handlekurv/partial/".to_string(),
                "/handlelister/ajax/new/".to_string(),
                "/pakke/".to_string(),
            ],
            selectors: SelectorConfig::default(),
        }
    }

    fn create_policy() -> ProductPolicy {
        ProductPolicy::from_config(&create_site_config()).unwrap()
    }

    #[test]
    fn test_should_visit() {
        let policy = create_policy();
        assert!(policy.should_visit("https://oda.com/no/products/"));
        assert!(policy.should_visit("https://oda.com/no/categories/488-mathall/"));
        assert!(policy.should_visit("https://ODA.com/no/Products/31885-kylling/"));

        assert!(!policy.should_visit("https://oda.com/no/recipes/"));
        assert!(!policy.should_visit("https://other.com/no/products/"));
        assert!(!policy.should_visit("https://oda.com/no/products/pakke/12/"));
    }

    #[test]
    fn test_should_prioritize_and_collect_products_only() {
        let policy = create_policy();
        let product = "https://oda.com/no/products/42-apple";

        assert!(policy.should_prioritize(product));
        assert!(policy.should_collect(product, 200));
        assert!(policy.should_collect(product, 429));

        assert!(!policy.should_prioritize("https://oda.com/no/products/"));
        assert!(!policy.should_collect("https://oda.com/no/categories/488-mathall/", 200));
    }

    #[test]
    fn test_collect_none() {
        let policy = create_policy();
        assert_eq!(policy.collect("url", None, 200), None);
    }

    #[test]
    fn test_collect_product() {
        let policy = create_policy();
        let document = parse_document(CHICKEN);

        let product = policy.collect("url", Some(&document), 200).unwrap();

        assert_eq!(
            product,
            Product {
                id: Some("31885".to_string()),
                name: Some("Økologisk Hel kylling ca. 2,4 kg".to_string()),
                brand: Some("Hovelsrud Gård".to_string()),
                price: Some("386.60".to_string()),
                currency: Some("NOK".to_string()),
                category_path: Some("/no/categories/488-mathall/489-kjottdisken/".to_string()),
                category_0: Some("no".to_string()),
                category_1: Some("488-mathall".to_string()),
                category_2: Some("489-kjottdisken".to_string()),
                category_3: None,
            }
        );
    }

    #[test]
    fn test_collect_product_with_no_categories() {
        let policy = create_policy();
        let document = parse_document(NELLIK);

        let product = policy.collect("url", Some(&document), 200).unwrap();

        assert_eq!(
            product,
            Product {
                id: Some("6250".to_string()),
                name: Some("Nellik Malt 10 g".to_string()),
                brand: Some("Toro".to_string()),
                price: Some("7.40".to_string()),
                ..Product::default()
            }
        );
    }

    #[test]
    fn test_collect_unrelated_page_yields_empty_record() {
        let policy = create_policy();
        let document = parse_document("<html><body><p>Nothing here</p></body></html>");

        let product = policy.collect("url", Some(&document), 200).unwrap();
        assert_eq!(product, Product::default());
    }

    #[test]
    fn test_category_segments() {
        assert_eq!(
            category_segments("https://oda.com/no/categories/1-a/2-b/3-c/4-d/"),
            vec!["no", "1-a", "2-b", "3-c"]
        );
        assert_eq!(category_segments("/no/categories/?page=2"), vec!["no"]);
        assert!(category_segments("/").is_empty());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut site = create_site_config();
        site.visit_pattern = "(".to_string();
        assert!(matches!(
            ProductPolicy::from_config(&site),
            Err(CrawlError::InvalidPattern { .. })
        ));
    }
}
