use tracing::warn;

use crate::codec::{ExpressionCodec, QueryDocumentCodec, SearchUrlCodec};
use crate::error::CodecError;
use crate::zbx_client::{Item, Trigger};

use super::{AlertView, host_name_for};

/// Rebuild an alert from its item and (optional) trigger.
///
/// Never fails: a field that cannot be recovered is replaced by a
/// `<unrecoverable: ...>` placeholder so one damaged item does not hide the
/// others. A missing or unparsable trigger leaves the threshold empty.
#[must_use]
pub fn decode(item: &Item, trigger: Option<&Trigger>) -> AlertView {
    let query_string = recover(&item.name, "query_string", QueryDocumentCodec::decode(&item.posts));
    let index = SearchUrlCodec::decode_index(&item.url);
    let host_name = index
        .as_deref()
        .map_or_else(placeholder, |index| host_name_for(index));
    let index = recover(&item.name, "index", index);
    let search_endpoint = recover(
        &item.name,
        "elasticsearch",
        SearchUrlCodec::decode_endpoint(&item.url),
    );
    let threshold = trigger
        .and_then(|trigger| ExpressionCodec::decode(&trigger.expression).ok())
        .unwrap_or_default();

    AlertView {
        name: item.name.clone(),
        key: item.key.clone(),
        item_id: item.item_id.clone(),
        trigger_id: trigger.map(|trigger| trigger.trigger_id.clone()),
        host_id: item.host_id.clone(),
        host_name,
        search_endpoint,
        index,
        query_string,
        delay: item.delay.clone(),
        threshold,
        description: item.description.clone(),
    }
}

fn recover(item: &str, field: &'static str, value: Result<String, CodecError>) -> String {
    value.unwrap_or_else(|err| {
        warn!(item, field, error = %err, "alert field could not be decoded");
        placeholder(&err)
    })
}

fn placeholder(err: &CodecError) -> String {
    format!("<unrecoverable: {err}>")
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::alert::{LogicalAlert, encode};
    use crate::zbx_client::{Item, Trigger};

    fn nginx_alert() -> LogicalAlert {
        LogicalAlert {
            name: "err-5xx".to_string(),
            index: "nginx-*".to_string(),
            query_string: "status:5*".to_string(),
            delay: "3m".to_string(),
            threshold: ">=10".to_string(),
            description: "too many 5xx".to_string(),
        }
    }

    fn stored(alert: &LogicalAlert, endpoint: &str) -> (Item, Trigger) {
        let encoded = match encode(alert, "nginx-", endpoint) {
            Ok(encoded) => encoded,
            Err(err) => panic!("encode failed: {err}"),
        };
        let item = Item {
            item_id: "45001".to_string(),
            host_id: "10084".to_string(),
            name: alert.name.clone(),
            key: encoded.key,
            delay: alert.delay.clone(),
            url: encoded.url,
            posts: encoded.posts,
            description: alert.description.clone(),
        };
        let trigger = Trigger {
            trigger_id: "23001".to_string(),
            expression: encoded.expression,
            description: alert.name.clone(),
        };
        (item, trigger)
    }

    #[test]
    fn decode_reverses_encode() {
        let alert = nginx_alert();
        let (item, trigger) = stored(&alert, "https://es.internal:9200");
        let view = decode(&item, Some(&trigger));
        assert_eq!(view.query_string, alert.query_string);
        assert_eq!(view.index, alert.index);
        assert_eq!(view.search_endpoint, "https://es.internal:9200");
        assert_eq!(view.threshold, alert.threshold);
        assert_eq!(view.host_name, "nginx-");
        assert_eq!(view.trigger_id.as_deref(), Some("23001"));
        assert_eq!(view.description, "too many 5xx");
    }

    #[test]
    fn round_trip_holds_for_assorted_inputs() {
        let cases = [
            ("app-*", r#"level:error AND message:"disk full""#, "<3", "http://10.0.0.5:9200"),
            ("audit", "user:root", "<>0", "https://search.example.com"),
            ("k8s-*-prod", r"path:\/health*", ">100", "http://[::1]:9200"),
        ];
        for (index, query, threshold, endpoint) in cases {
            let alert = LogicalAlert {
                index: index.to_string(),
                query_string: query.to_string(),
                threshold: threshold.to_string(),
                ..nginx_alert()
            };
            let (item, trigger) = stored(&alert, endpoint);
            let view = decode(&item, Some(&trigger));
            assert_eq!(view.index, index);
            assert_eq!(view.query_string, query);
            assert_eq!(view.threshold, threshold);
            assert_eq!(view.search_endpoint, endpoint);
        }
    }

    #[test]
    fn zabbix_function_id_expressions_decode() {
        let (item, mut trigger) = stored(&nginx_alert(), "http://es:9200");
        trigger.expression = "{31337}>=10".to_string();
        assert_eq!(decode(&item, Some(&trigger)).threshold, ">=10");
    }

    #[test]
    fn damaged_fields_become_placeholders() {
        let item = Item {
            item_id: "1".to_string(),
            name: "broken".to_string(),
            posts: "{not json".to_string(),
            url: "http://es:9200/_search".to_string(),
            ..Item::default()
        };
        let view = decode(&item, None);
        assert!(view.query_string.starts_with("<unrecoverable:"));
        assert!(view.index.starts_with("<unrecoverable:"));
        assert!(view.host_name.starts_with("<unrecoverable:"));
        assert_eq!(view.search_endpoint, "http://es:9200");
        assert_eq!(view.threshold, "");
        assert_eq!(view.trigger_id, None);
    }

    #[test]
    fn trigger_without_threshold_leaves_it_empty() {
        let (item, mut trigger) = stored(&nginx_alert(), "http://es:9200");
        trigger.expression = "nodata(/nginx-/k,5m)=1".to_string();
        let view = decode(&item, Some(&trigger));
        assert_eq!(view.threshold, "");
        assert_eq!(view.query_string, "status:5*");
    }
}
