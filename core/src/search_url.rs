//! Search destination URLs built from a user-configurable template.

/// Template used when nothing has been configured.
pub const DEFAULT_SEARCH_TEMPLATE: &str = "https://www.google.com/search?q=%s";

/// Built-in engine keywords accepted by `//setsearch`.
pub fn engine_template(keyword: &str) -> Option<&'static str> {
    match keyword.to_lowercase().as_str() {
        "google" => Some(DEFAULT_SEARCH_TEMPLATE),
        "duckduckgo" | "ddg" => Some("https://duckduckgo.com/?q=%s"),
        "bing" => Some("https://www.bing.com/search?q=%s"),
        _ => None,
    }
}

/// Expand a search template for a query. `%s` occurrences are replaced with
/// the encoded query; templates without `%s` get a `q` parameter appended.
/// An empty template falls back to the default engine.
pub fn build_search_url(template: &str, query: &str) -> String {
    let template = template.trim();
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();

    if template.is_empty() {
        return DEFAULT_SEARCH_TEMPLATE.replace("%s", &encoded);
    }
    if template.contains("%s") {
        return template.replace("%s", &encoded);
    }
    let sep = if template.contains('?') { '&' } else { '?' };
    format!("{template}{sep}q={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_template_falls_back_to_google() {
        assert_eq!(
            build_search_url("", "rust"),
            "https://www.google.com/search?q=rust"
        );
    }

    #[test]
    fn template_placeholder_is_substituted() {
        assert_eq!(
            build_search_url("https://duckduckgo.com/?q=%s", "hello world"),
            "https://duckduckgo.com/?q=hello+world"
        );
    }

    #[test]
    fn template_without_placeholder_gets_query_param() {
        assert_eq!(
            build_search_url("https://example.com/search", "abc"),
            "https://example.com/search?q=abc"
        );
        assert_eq!(
            build_search_url("https://example.com/search?lang=en", "abc"),
            "https://example.com/search?lang=en&q=abc"
        );
    }

    #[test]
    fn query_is_encoded() {
        assert_eq!(
            build_search_url("https://e.com/?q=%s", "a&b=c"),
            "https://e.com/?q=a%26b%3Dc"
        );
    }

    #[test]
    fn known_engine_keywords() {
        assert_eq!(engine_template("google"), Some(DEFAULT_SEARCH_TEMPLATE));
        assert_eq!(engine_template("DuckDuckGo"), engine_template("ddg"));
        assert!(engine_template("altavista").is_none());
    }
}
