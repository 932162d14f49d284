use crate::error::CodecError;

const FUNCTION_PREFIX: &str = "last(/";
const WINDOW_SUFFIX: &str = ",#3)";

/// Trigger expression `last(/<host>/<key>,#3)<threshold>`.
///
/// The threshold is the raw comparison operator plus value (`>=10`) and is
/// appended verbatim.
pub struct ExpressionCodec;

impl ExpressionCodec {
    #[must_use]
    pub fn encode(host: &str, key: &str, threshold: &str) -> String {
        format!("{FUNCTION_PREFIX}{host}/{key}{WINDOW_SUFFIX}{threshold}")
    }

    /// Recover the threshold.
    ///
    /// `trigger.get` returns expressions with function ids (`{23297}>=10`),
    /// so everything after the first `}` is the threshold. Expressions in the
    /// form [`ExpressionCodec::encode`] produces are accepted as well.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingThreshold`] for any other shape.
    pub fn decode(expression: &str) -> Result<String, CodecError> {
        if let Some(pos) = expression.find('}') {
            return Ok(expression[pos + 1..].to_string());
        }
        if expression.starts_with(FUNCTION_PREFIX) {
            if let Some(pos) = expression.find(WINDOW_SUFFIX) {
                return Ok(expression[pos + WINDOW_SUFFIX.len()..].to_string());
            }
        }
        Err(CodecError::MissingThreshold {
            expression: expression.to_string(),
        })
    }
}
