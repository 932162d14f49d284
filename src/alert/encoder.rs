use crate::codec::{ExpressionCodec, QueryDocumentCodec, SearchUrlCodec, item_key};
use crate::error::CodecError;

use super::LogicalAlert;

/// The Zabbix-side strings for one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAlert {
    pub key: String,
    pub posts: String,
    pub url: String,
    pub expression: String,
}

/// Pack `alert` into item and trigger fields.
///
/// `host_name` is the technical name of the Zabbix host owning the item; the
/// trigger expression references the item through it.
///
/// # Errors
///
/// Returns a [`CodecError`] if the query document cannot be serialized.
pub fn encode(
    alert: &LogicalAlert,
    host_name: &str,
    search_endpoint: &str,
) -> Result<EncodedAlert, CodecError> {
    let key = item_key(&alert.name);
    let posts = QueryDocumentCodec::encode(&alert.query_string, &alert.delay)?;
    let url = SearchUrlCodec::encode(search_endpoint, &alert.index);
    let expression = ExpressionCodec::encode(host_name, &key, &alert.threshold);
    Ok(EncodedAlert {
        key,
        posts,
        url,
        expression,
    })
}
