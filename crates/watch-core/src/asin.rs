//! ASIN extraction from canonical product URLs.

use url::Url;

/// Catalog identifiers are exactly this many characters.
pub const ASIN_LENGTH: usize = 10;

/// Extract a catalog identifier from a canonical product URL.
///
/// Accepts the `/dp/<asin>` and `/gp/product/<asin>` path forms. The
/// identifier is matched case-insensitively, must be exactly
/// [`ASIN_LENGTH`] alphanumeric characters, and is normalized to
/// upper-case. Anything else is an extraction failure.
pub fn extract_asin(raw_url: &str) -> Option<String> {
    let url = Url::parse(raw_url).ok()?;
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

    let candidate = segments.windows(2).find_map(|pair| match pair {
        ["dp", asin] => Some(*asin),
        ["product", asin] if segments.contains(&"gp") => Some(*asin),
        _ => None,
    })?;

    normalize_asin(candidate)
}

/// Validate and upper-case a bare identifier candidate.
fn normalize_asin(candidate: &str) -> Option<String> {
    if candidate.len() != ASIN_LENGTH {
        return None;
    }
    if !candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(candidate.to_ascii_uppercase())
}

/// Check whether a URL points at one of the catalog's domains.
///
/// Matches the host exactly or as a subdomain (`www.amazon.com` matches
/// `amazon.com`).
pub fn is_catalog_host(raw_url: &str, domains: &[String]) -> bool {
    let Ok(url) = Url::parse(raw_url) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    domains
        .iter()
        .any(|d| host == d || host.ends_with(&format!(".{d}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_dp_path() {
        assert_eq!(
            extract_asin("https://shop.example/dp/B012345678"),
            Some("B012345678".to_string())
        );
    }

    #[test]
    fn test_extract_from_gp_product_path() {
        assert_eq!(
            extract_asin("https://shop.example/gp/product/B012345678"),
            Some("B012345678".to_string())
        );
    }

    #[test]
    fn test_extract_with_title_segment_and_query() {
        assert_eq!(
            extract_asin("https://www.shop.example/Some-Product-Title/dp/B012345678?th=1&psc=1"),
            Some("B012345678".to_string())
        );
    }

    #[test]
    fn test_extract_normalizes_case() {
        assert_eq!(
            extract_asin("https://shop.example/dp/b012345678"),
            Some("B012345678".to_string())
        );
    }

    #[test]
    fn test_extract_rejects_wrong_length() {
        assert_eq!(extract_asin("https://shop.example/dp/B01234567"), None);
        assert_eq!(extract_asin("https://shop.example/dp/B0123456789"), None);
    }

    #[test]
    fn test_extract_rejects_non_alphanumeric() {
        assert_eq!(extract_asin("https://shop.example/dp/B01234-678"), None);
    }

    #[test]
    fn test_extract_rejects_unrelated_paths() {
        assert_eq!(extract_asin("https://shop.example/s?k=widgets"), None);
        assert_eq!(extract_asin("https://shop.example/"), None);
        assert_eq!(extract_asin("not a url"), None);
    }

    #[test]
    fn test_catalog_host_matching() {
        let domains = vec!["amazon.com".to_string()];
        assert!(is_catalog_host("https://amazon.com/dp/B012345678", &domains));
        assert!(is_catalog_host("https://www.amazon.com/dp/B012345678", &domains));
        assert!(!is_catalog_host("https://evil.example/dp/B012345678", &domains));
        assert!(!is_catalog_host("https://notamazon.com/dp/B012345678", &domains));
        assert!(!is_catalog_host("garbage", &domains));
    }
}
