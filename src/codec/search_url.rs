use url::Url;

use crate::error::CodecError;

const SEARCH_SUFFIX: &str = "_search";

/// `<endpoint>/<index>/_search`, stored in the item's `url` field.
pub struct SearchUrlCodec;

impl SearchUrlCodec {
    #[must_use]
    pub fn encode(endpoint: &str, index: &str) -> String {
        format!(
            "{}/{index}/{SEARCH_SUFFIX}",
            endpoint.trim_end_matches('/')
        )
    }

    /// Index pattern: the path segment right before the final one.
    ///
    /// Only the path is inspected, so a URL such as `http://es:9200/_search`
    /// yields an error instead of the authority.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingIndexSegment`] when the path has fewer
    /// than two segments or the index segment is empty.
    pub fn decode_index(url: &str) -> Result<String, CodecError> {
        let missing = || CodecError::MissingIndexSegment {
            url: url.to_string(),
        };
        let path = path_of(url);
        let last = path.rfind('/').ok_or_else(missing)?;
        let second_last = path[..last].rfind('/').ok_or_else(missing)?;
        let index = &path[second_last + 1..last];
        if index.is_empty() {
            return Err(missing());
        }
        Ok(index.to_string())
    }

    /// Search backend endpoint: scheme and authority of the URL.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidUrl`] when the URL does not parse or has
    /// no host.
    pub fn decode_endpoint(url: &str) -> Result<String, CodecError> {
        let invalid = |message: String| CodecError::InvalidUrl {
            url: url.to_string(),
            message,
        };
        let parsed = Url::parse(url).map_err(|err| invalid(err.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| invalid("URL has no host".to_string()))?;
        Ok(match parsed.port() {
            Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
            None => format!("{}://{host}", parsed.scheme()),
        })
    }
}

/// Everything from the first `/` after the authority, or the whole input when
/// there is no scheme.
fn path_of(url: &str) -> &str {
    match url.find("://") {
        Some(pos) => {
            let rest = &url[pos + 3..];
            rest.find('/').map_or("", |slash| &rest[slash..])
        }
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::SearchUrlCodec;
    use crate::error::CodecError;

    #[test]
    fn encodes_without_double_slash() {
        assert_eq!(
            SearchUrlCodec::encode("http://es:9200/", "nginx-*"),
            "http://es:9200/nginx-*/_search"
        );
        assert_eq!(
            SearchUrlCodec::encode("https://es.internal", "app-logs"),
            "https://es.internal/app-logs/_search"
        );
    }

    #[test]
    fn recovers_index_and_endpoint() {
        let url = "http://es:9200/nginx-*/_search";
        assert_eq!(SearchUrlCodec::decode_index(url).as_deref(), Ok("nginx-*"));
        assert_eq!(
            SearchUrlCodec::decode_endpoint(url).as_deref(),
            Ok("http://es:9200")
        );
    }

    #[test]
    fn nested_paths_take_the_segment_before_search() {
        let url = "https://gw.example.com/es/logs-2024.*/_search";
        assert_eq!(
            SearchUrlCodec::decode_index(url).as_deref(),
            Ok("logs-2024.*")
        );
        assert_eq!(
            SearchUrlCodec::decode_endpoint(url).as_deref(),
            Ok("https://gw.example.com")
        );
    }

    #[test]
    fn short_urls_do_not_panic() {
        for url in ["http://es:9200/_search", "http://es:9200", "_search", "", "http://es//_search"] {
            assert!(
                matches!(
                    SearchUrlCodec::decode_index(url),
                    Err(CodecError::MissingIndexSegment { .. })
                ),
                "{url} should have no index"
            );
        }
    }

    #[test]
    fn relative_urls_have_no_endpoint() {
        assert!(matches!(
            SearchUrlCodec::decode_endpoint("/nginx-*/_search"),
            Err(CodecError::InvalidUrl { .. })
        ));
    }
}
