use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::AlertError;
use crate::zbx_client::{Item, NewItem, NewTrigger, Trigger, ZbxClient};

use super::{AlertView, HostResolver, LogicalAlert, decode, encode};

/// Search system the generated items query at evaluation time.
#[derive(Debug, Clone)]
pub struct SearchBackend {
    pub endpoint: String,
    pub username: String,
    pub password: SecretString,
}

/// Fixed attributes of the objects created in Zabbix.
#[derive(Debug, Clone)]
pub struct ZabbixDefaults {
    pub host_group_id: String,
    pub interface_port: String,
    pub trigger_priority: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedAlert {
    #[serde(rename = "itemID")]
    pub item_id: String,
    #[serde(rename = "triggerID")]
    pub trigger_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedAlert {
    #[serde(rename = "itemName")]
    pub item_name: String,
    #[serde(rename = "itemID")]
    pub item_id: String,
}

/// Create, delete and list alerts. Holds no state between calls.
#[derive(Clone)]
pub struct AlertService {
    client: ZbxClient,
    hosts: HostResolver,
    search: SearchBackend,
    trigger_priority: u8,
}

impl AlertService {
    #[must_use]
    pub fn new(client: ZbxClient, search: SearchBackend, defaults: ZabbixDefaults) -> Self {
        let hosts = HostResolver::new(
            client.clone(),
            defaults.host_group_id,
            defaults.interface_port,
        );
        Self {
            client,
            hosts,
            search,
            trigger_priority: defaults.trigger_priority,
        }
    }

    /// Materialize `alert` as a host (if needed), an item and a trigger.
    ///
    /// Names must be unique: the item key is derived from the name and the
    /// trigger is found again by it. When the trigger cannot be created the
    /// item just created is removed again before the error is returned.
    /// Surrounding whitespace is stripped before validation and encoding.
    pub async fn create(&self, alert: &LogicalAlert) -> Result<CreatedAlert> {
        let alert = &alert.normalized();
        alert.validate()?;

        if !self.client.items_by_name(&alert.name, None).await?.is_empty() {
            return Err(AlertError::Conflict {
                name: alert.name.clone(),
            }
            .into());
        }

        let host = self.hosts.resolve(&alert.index).await?;
        let encoded = encode(alert, &host.host_name, &self.search.endpoint)?;

        let item_id = self
            .client
            .create_item(&NewItem {
                host_id: &host.host_id,
                name: &alert.name,
                key: &encoded.key,
                delay: &alert.delay,
                url: &encoded.url,
                posts: &encoded.posts,
                description: &alert.description,
                username: &self.search.username,
                password: self.search.password.expose_secret(),
            })
            .await?;

        let trigger = self
            .client
            .create_trigger(&NewTrigger {
                expression: &encoded.expression,
                description: &alert.name,
                priority: self.trigger_priority,
            })
            .await;
        let trigger_id = match trigger {
            Ok(id) => id,
            Err(err) => {
                self.discard_item(&item_id).await;
                return Err(err);
            }
        };

        info!(
            alert = %alert.name,
            index = %alert.index,
            host = %host.host_name,
            %item_id,
            %trigger_id,
            "alert created"
        );
        Ok(CreatedAlert {
            item_id,
            trigger_id,
        })
    }

    /// Delete the alert named `name`, optionally scoped to an index pattern.
    ///
    /// Nothing is modified when the host or the item cannot be found.
    pub async fn delete(&self, name: &str, index: Option<&str>) -> Result<DeletedAlert> {
        let host_id = match index {
            Some(index) => Some(
                self.hosts
                    .lookup(index)
                    .await?
                    .ok_or_else(|| AlertError::NotFound {
                        what: "host for index",
                        name: index.to_string(),
                    })?
                    .host_id,
            ),
            None => None,
        };

        let item = self
            .client
            .items_by_name(name, host_id.as_deref())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AlertError::NotFound {
                what: "alert",
                name: name.to_string(),
            })?;

        let trigger = self.paired_trigger(&item).await;
        self.client.delete_items(&[item.item_id.as_str()]).await?;
        if let Some(trigger) = trigger {
            self.sweep_trigger(&trigger).await;
        }

        info!(alert = %name, item_id = %item.item_id, "alert deleted");
        Ok(DeletedAlert {
            item_name: item.name,
            item_id: item.item_id,
        })
    }

    /// Alerts under `index`, or every alert when no index is given.
    pub async fn query(&self, index: Option<&str>) -> Result<Vec<AlertView>> {
        let items = match index {
            Some(index) => {
                let host = self
                    .hosts
                    .lookup(index)
                    .await?
                    .ok_or_else(|| AlertError::NotFound {
                        what: "host for index",
                        name: index.to_string(),
                    })?;
                self.client.items_by_host(&host.host_id).await?
            }
            None => self.client.alert_items().await?,
        };

        let mut alerts = Vec::with_capacity(items.len());
        for item in &items {
            let trigger = self.paired_trigger(item).await;
            alerts.push(decode(item, trigger.as_ref()));
        }
        debug!(index = index.unwrap_or("*"), count = alerts.len(), "alerts listed");
        Ok(alerts)
    }

    /// Trigger on this item sharing its name. Lookup failures count as
    /// "none".
    async fn paired_trigger(&self, item: &Item) -> Option<Trigger> {
        match self
            .client
            .trigger_for_item(&item.item_id, &item.name)
            .await
        {
            Ok(trigger) => trigger,
            Err(err) => {
                warn!(alert = %item.name, error = %err, "trigger lookup failed");
                None
            }
        }
    }

    async fn discard_item(&self, item_id: &str) {
        match self.client.delete_items(&[item_id]).await {
            Ok(_) => warn!(%item_id, "trigger creation failed, item removed"),
            Err(err) => warn!(
                %item_id,
                error = %err,
                "trigger creation failed and the item could not be removed"
            ),
        }
    }

    /// Zabbix drops triggers together with their last item; remove it
    /// explicitly if it is still there.
    async fn sweep_trigger(&self, trigger: &Trigger) {
        let trigger_id = trigger.trigger_id.as_str();
        match self.client.trigger_by_id(trigger_id).await {
            Ok(None) => debug!(%trigger_id, "trigger removed with its item"),
            Ok(Some(_)) => {
                if let Err(err) = self.client.delete_triggers(&[trigger_id]).await {
                    warn!(%trigger_id, error = %err, "orphaned trigger could not be deleted");
                }
            }
            Err(err) => warn!(%trigger_id, error = %err, "trigger cleanup check failed"),
        }
    }
}
