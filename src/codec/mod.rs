//! Codecs for the alert attributes Zabbix can only hold as plain strings.
//!
//! A logical alert is spread over three Zabbix fields: the HTTP-agent item's
//! POST body, the item's URL, and the trigger expression. Each codec owns one
//! of those fields and can rebuild its part of the alert from it.

mod expression;
mod key;
mod query_document;
mod search_url;

pub use expression::ExpressionCodec;
pub use key::item_key;
pub use query_document::QueryDocumentCodec;
pub use search_url::SearchUrlCodec;
