use serde::Serialize;
use serde_json::Value;

use crate::error::CodecError;

const TIMESTAMP_FORMAT: &str = "strict_date_optional_time";

/// `_search` body carried in the item's `posts` field.
///
/// The document is count-only (`size: 0`): a `query_string` clause holding the
/// operator's query, and a `@timestamp` range covering the last `delay`.
pub struct QueryDocumentCodec;

#[derive(Serialize)]
struct SearchBody<'a> {
    query: BoolQuery<'a>,
    size: u8,
}

#[derive(Serialize)]
struct BoolQuery<'a> {
    bool: MustClauses<'a>,
}

#[derive(Serialize)]
struct MustClauses<'a> {
    must: (QueryStringClause<'a>, RangeClause),
}

#[derive(Serialize)]
struct QueryStringClause<'a> {
    query_string: QueryString<'a>,
}

#[derive(Serialize)]
struct QueryString<'a> {
    query: &'a str,
}

#[derive(Serialize)]
struct RangeClause {
    range: TimestampRange,
}

#[derive(Serialize)]
struct TimestampRange {
    #[serde(rename = "@timestamp")]
    timestamp: Range,
}

#[derive(Serialize)]
struct Range {
    format: &'static str,
    gte: String,
    lte: &'static str,
}

impl QueryDocumentCodec {
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidDocument`] if serialization fails.
    pub fn encode(query_string: &str, delay: &str) -> Result<String, CodecError> {
        let body = SearchBody {
            query: BoolQuery {
                bool: MustClauses {
                    must: (
                        QueryStringClause {
                            query_string: QueryString {
                                query: query_string,
                            },
                        },
                        RangeClause {
                            range: TimestampRange {
                                timestamp: Range {
                                    format: TIMESTAMP_FORMAT,
                                    gte: format!("now-{delay}"),
                                    lte: "now",
                                },
                            },
                        },
                    ),
                },
            },
            size: 0,
        };
        serde_json::to_string(&body).map_err(|err| CodecError::InvalidDocument {
            message: err.to_string(),
        })
    }

    /// Recover the query string from a `posts` document.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidDocument`] when `posts` is not JSON,
    /// [`CodecError::MissingQueryClause`] when no `query_string` clause sits
    /// under `query.bool.must`.
    pub fn decode(posts: &str) -> Result<String, CodecError> {
        let document: Value =
            serde_json::from_str(posts).map_err(|err| CodecError::InvalidDocument {
                message: err.to_string(),
            })?;
        document
            .pointer("/query/bool/must")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .find_map(|clause| clause.pointer("/query_string/query").and_then(Value::as_str))
            .map(str::to_string)
            .ok_or(CodecError::MissingQueryClause)
    }
}

#[cfg(test)]
mod tests {
    use super::QueryDocumentCodec;
    use crate::error::CodecError;

    #[test]
    fn encodes_count_only_search() {
        let posts = match QueryDocumentCodec::encode("status:5*", "3m") {
            Ok(posts) => posts,
            Err(err) => panic!("encode failed: {err}"),
        };
        assert_eq!(
            posts,
            r#"{"query":{"bool":{"must":[{"query_string":{"query":"status:5*"}},{"range":{"@timestamp":{"format":"strict_date_optional_time","gte":"now-3m","lte":"now"}}}]}},"size":0}"#
        );
    }

    #[test]
    fn quotes_survive_a_round_trip() {
        let query = r#"message:"upstream timed out" AND path:\/api"#;
        let decoded = QueryDocumentCodec::encode(query, "5m")
            .and_then(|posts| QueryDocumentCodec::decode(&posts));
        assert_eq!(decoded.as_deref(), Ok(query));
    }

    #[test]
    fn malformed_posts_are_reported() {
        assert!(matches!(
            QueryDocumentCodec::decode("{\"query\":"),
            Err(CodecError::InvalidDocument { .. })
        ));
        assert_eq!(
            QueryDocumentCodec::decode(r#"{"query":{"match_all":{}},"size":0}"#),
            Err(CodecError::MissingQueryClause)
        );
        assert_eq!(
            QueryDocumentCodec::decode(r#"{"query":{"bool":{"must":[{"query_string":{"query":7}}]}}}"#),
            Err(CodecError::MissingQueryClause)
        );
    }

    #[test]
    fn clause_order_does_not_matter() {
        let posts = r#"{"query":{"bool":{"must":[{"range":{}},{"query_string":{"query":"level:error"}}]}}}"#;
        assert_eq!(
            QueryDocumentCodec::decode(posts).as_deref(),
            Ok("level:error")
        );
    }
}
