use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ZbxError;

pub(crate) const ALERT_TAG: &str = "logs";
pub(crate) const ALERT_TAG_VALUE: &str = "alert";
/// `item.get`/`trigger.get` tag operator meaning "tag exists".
const TAG_EXISTS: &str = "4";

const HTTP_AGENT_ITEM: u8 = 19;
const VALUE_NUMERIC_UNSIGNED: u8 = 3;
const OUTPUT_FORMAT_JSON: u8 = 1;
const AUTH_BASIC: u8 = 1;
const POST_TYPE_JSON: u8 = 2;
const REQUEST_METHOD_GET: u8 = 0;
const PREPROCESS_JSONPATH: &str = "12";
const HITS_TOTAL_PATH: &str = "$.body.hits.total.value";
const ITEM_TIMEOUT: &str = "30s";
const AGENT_INTERFACE: u8 = 1;

const HOST_OUTPUT: &[&str] = &["hostid", "host", "name"];
const ITEM_OUTPUT: &[&str] = &[
    "itemid",
    "hostid",
    "name",
    "key_",
    "delay",
    "url",
    "posts",
    "description",
];
const TRIGGER_OUTPUT: &[&str] = &["triggerid", "expression", "description"];

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Host {
    #[serde(rename = "hostid")]
    pub host_id: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Item {
    #[serde(rename = "itemid")]
    pub item_id: String,
    #[serde(rename = "hostid", default)]
    pub host_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "key_", default)]
    pub key: String,
    #[serde(default)]
    pub delay: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub posts: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Trigger {
    #[serde(rename = "triggerid")]
    pub trigger_id: String,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub description: String,
}

/// Everything needed to create the HTTP-agent item backing one alert.
#[derive(Debug, Clone, Copy)]
pub struct NewItem<'a> {
    pub host_id: &'a str,
    pub name: &'a str,
    pub key: &'a str,
    pub delay: &'a str,
    pub url: &'a str,
    pub posts: &'a str,
    pub description: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct NewTrigger<'a> {
    pub expression: &'a str,
    pub description: &'a str,
    pub priority: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct NewHost<'a> {
    pub host: &'a str,
    pub group_id: &'a str,
    pub interface_port: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HostIds {
    #[serde(rename = "hostids")]
    pub(crate) ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemIds {
    #[serde(rename = "itemids")]
    pub(crate) ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TriggerIds {
    #[serde(rename = "triggerids")]
    pub(crate) ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Tag {
    tag: &'static str,
    value: &'static str,
}

const ALERT_TAGS: [Tag; 1] = [Tag {
    tag: ALERT_TAG,
    value: ALERT_TAG_VALUE,
}];

#[derive(Debug, Serialize)]
struct TagFilter {
    tag: &'static str,
    operator: &'static str,
}

const ALERT_TAG_FILTER: [TagFilter; 1] = [TagFilter {
    tag: ALERT_TAG,
    operator: TAG_EXISTS,
}];

#[derive(Debug, Serialize)]
pub(crate) struct HostGet<'a> {
    output: &'static [&'static str],
    filter: HostFilter<'a>,
}

#[derive(Debug, Serialize)]
struct HostFilter<'a> {
    host: [&'a str; 1],
}

impl<'a> HostGet<'a> {
    pub(crate) const fn by_name(host: &'a str) -> Self {
        Self {
            output: HOST_OUTPUT,
            filter: HostFilter { host: [host] },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HostCreate<'a> {
    host: &'a str,
    groups: [GroupRef<'a>; 1],
    interfaces: [AgentInterface<'a>; 1],
}

#[derive(Debug, Serialize)]
struct GroupRef<'a> {
    groupid: &'a str,
}

#[derive(Debug, Serialize)]
struct AgentInterface<'a> {
    #[serde(rename = "type")]
    kind: u8,
    main: u8,
    useip: u8,
    ip: &'static str,
    dns: &'static str,
    port: &'a str,
}

impl<'a> HostCreate<'a> {
    pub(crate) fn new(host: &NewHost<'a>) -> Result<Self, ZbxError> {
        require("host", host.host)?;
        require_numeric("groups.groupid", host.group_id)?;
        require_numeric("interfaces.port", host.interface_port)?;
        Ok(Self {
            host: host.host,
            groups: [GroupRef {
                groupid: host.group_id,
            }],
            interfaces: [AgentInterface {
                kind: AGENT_INTERFACE,
                main: 1,
                useip: 1,
                ip: "127.0.0.1",
                dns: "",
                port: host.interface_port,
            }],
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ItemCreate<'a> {
    #[serde(rename = "type")]
    kind: u8,
    name: &'a str,
    key_: &'a str,
    hostid: &'a str,
    delay: &'a str,
    value_type: u8,
    output_format: u8,
    authtype: u8,
    username: &'a str,
    password: &'a str,
    timeout: &'static str,
    url: &'a str,
    posts: &'a str,
    post_type: u8,
    request_method: u8,
    headers: ContentTypeHeader,
    preprocessing: [Preprocessing; 1],
    description: &'a str,
    tags: [Tag; 1],
}

#[derive(Debug, Serialize)]
struct ContentTypeHeader {
    #[serde(rename = "Content-Type")]
    content_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Preprocessing {
    #[serde(rename = "type")]
    kind: &'static str,
    params: &'static str,
    error_handler: &'static str,
    error_handler_params: &'static str,
}

impl<'a> ItemCreate<'a> {
    pub(crate) fn new(item: &NewItem<'a>) -> Result<Self, ZbxError> {
        require_numeric("hostid", item.host_id)?;
        require("name", item.name)?;
        require("key_", item.key)?;
        require("delay", item.delay)?;
        Url::parse(item.url).map_err(|err| ZbxError::InvalidField {
            field: "url",
            message: err.to_string(),
        })?;
        serde_json::from_str::<serde_json::Value>(item.posts).map_err(|err| {
            ZbxError::InvalidField {
                field: "posts",
                message: err.to_string(),
            }
        })?;

        Ok(Self {
            kind: HTTP_AGENT_ITEM,
            name: item.name,
            key_: item.key,
            hostid: item.host_id,
            delay: item.delay,
            value_type: VALUE_NUMERIC_UNSIGNED,
            output_format: OUTPUT_FORMAT_JSON,
            authtype: AUTH_BASIC,
            username: item.username,
            password: item.password,
            timeout: ITEM_TIMEOUT,
            url: item.url,
            posts: item.posts,
            post_type: POST_TYPE_JSON,
            request_method: REQUEST_METHOD_GET,
            headers: ContentTypeHeader {
                content_type: "application/json",
            },
            preprocessing: [Preprocessing {
                kind: PREPROCESS_JSONPATH,
                params: HITS_TOTAL_PATH,
                error_handler: "0",
                error_handler_params: "",
            }],
            description: item.description,
            tags: ALERT_TAGS,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ItemGet<'a> {
    output: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<NameFilter<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostids: Option<[&'a str; 1]>,
    tags: [TagFilter; 1],
}

#[derive(Debug, Serialize)]
struct NameFilter<'a> {
    name: [&'a str; 1],
}

impl<'a> ItemGet<'a> {
    pub(crate) const fn alerts() -> Self {
        Self {
            output: ITEM_OUTPUT,
            filter: None,
            hostids: None,
            tags: ALERT_TAG_FILTER,
        }
    }

    pub(crate) const fn by_host(host_id: &'a str) -> Self {
        Self {
            hostids: Some([host_id]),
            ..Self::alerts()
        }
    }

    pub(crate) const fn by_name(name: &'a str, host_id: Option<&'a str>) -> Self {
        Self {
            filter: Some(NameFilter { name: [name] }),
            hostids: match host_id {
                Some(id) => Some([id]),
                None => None,
            },
            ..Self::alerts()
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TriggerCreate<'a> {
    expression: &'a str,
    description: &'a str,
    priority: String,
    tags: [Tag; 1],
}

impl<'a> TriggerCreate<'a> {
    pub(crate) fn new(trigger: &NewTrigger<'a>) -> Result<Self, ZbxError> {
        require("expression", trigger.expression)?;
        require("description", trigger.description)?;
        if trigger.priority > 5 {
            return Err(ZbxError::InvalidField {
                field: "priority",
                message: format!("expected 0..=5, got {}", trigger.priority),
            });
        }
        Ok(Self {
            expression: trigger.expression,
            description: trigger.description,
            priority: trigger.priority.to_string(),
            tags: ALERT_TAGS,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TriggerGet<'a> {
    output: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<DescriptionFilter<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    itemids: Option<[&'a str; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    triggerids: Option<[&'a str; 1]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<[TagFilter; 1]>,
}

#[derive(Debug, Serialize)]
struct DescriptionFilter<'a> {
    description: [&'a str; 1],
}

impl<'a> TriggerGet<'a> {
    /// Triggers built on `item_id` whose description is `description`.
    ///
    /// Names are not unique across hosts, so the item scope is what ties a
    /// trigger to one alert.
    pub(crate) const fn for_item(item_id: &'a str, description: &'a str) -> Self {
        Self {
            output: TRIGGER_OUTPUT,
            filter: Some(DescriptionFilter {
                description: [description],
            }),
            itemids: Some([item_id]),
            triggerids: None,
            tags: Some(ALERT_TAG_FILTER),
        }
    }

    pub(crate) const fn by_id(trigger_id: &'a str) -> Self {
        Self {
            output: TRIGGER_OUTPUT,
            filter: None,
            itemids: None,
            triggerids: Some([trigger_id]),
            tags: None,
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ZbxError> {
    if value.trim().is_empty() {
        return Err(ZbxError::InvalidField {
            field,
            message: "value cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn require_numeric(field: &'static str, value: &str) -> Result<(), ZbxError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ZbxError::InvalidField {
            field,
            message: format!("expected a numeric identifier, got {value:?}"),
        });
    }
    Ok(())
}
