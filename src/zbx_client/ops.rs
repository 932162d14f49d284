use tracing::debug;

use crate::Result;
use crate::error::ZbxError;

use super::ZbxClient;
use super::models::{
    Host, HostCreate, HostGet, HostIds, Item, ItemCreate, ItemGet, ItemIds, NewHost, NewItem,
    NewTrigger, Trigger, TriggerCreate, TriggerGet, TriggerIds,
};

impl ZbxClient {
    /// Exact-name host lookup.
    pub async fn host_by_name(&self, host: &str) -> Result<Option<Host>> {
        let hosts: Vec<Host> = self.call("host.get", &HostGet::by_name(host)).await?;
        Ok(hosts.into_iter().next())
    }

    pub async fn create_host(&self, host: &NewHost<'_>) -> Result<String> {
        let params = HostCreate::new(host)?;
        let created: HostIds = self.call("host.create", &params).await?;
        first_id(created.ids, "hostids")
    }

    pub async fn create_item(&self, item: &NewItem<'_>) -> Result<String> {
        let params = ItemCreate::new(item)?;
        let created: ItemIds = self.call("item.create", &params).await?;
        first_id(created.ids, "itemids")
    }

    /// Every item carrying the `logs` tag.
    pub async fn alert_items(&self) -> Result<Vec<Item>> {
        self.call("item.get", &ItemGet::alerts()).await
    }

    pub async fn items_by_host(&self, host_id: &str) -> Result<Vec<Item>> {
        self.call("item.get", &ItemGet::by_host(host_id)).await
    }

    pub async fn items_by_name(&self, name: &str, host_id: Option<&str>) -> Result<Vec<Item>> {
        self.call("item.get", &ItemGet::by_name(name, host_id)).await
    }

    pub async fn delete_items(&self, item_ids: &[&str]) -> Result<Vec<String>> {
        let deleted: ItemIds = self.call("item.delete", &item_ids).await?;
        debug!(count = deleted.ids.len(), "items deleted");
        Ok(deleted.ids)
    }

    pub async fn create_trigger(&self, trigger: &NewTrigger<'_>) -> Result<String> {
        let params = TriggerCreate::new(trigger)?;
        let created: TriggerIds = self.call("trigger.create", &params).await?;
        first_id(created.ids, "triggerids")
    }

    /// Trigger named `description` that is built on item `item_id`.
    pub async fn trigger_for_item(
        &self,
        item_id: &str,
        description: &str,
    ) -> Result<Option<Trigger>> {
        let triggers: Vec<Trigger> = self
            .call("trigger.get", &TriggerGet::for_item(item_id, description))
            .await?;
        Ok(triggers.into_iter().next())
    }

    pub async fn trigger_by_id(&self, trigger_id: &str) -> Result<Option<Trigger>> {
        let triggers: Vec<Trigger> = self
            .call("trigger.get", &TriggerGet::by_id(trigger_id))
            .await?;
        Ok(triggers.into_iter().next())
    }

    pub async fn delete_triggers(&self, trigger_ids: &[&str]) -> Result<Vec<String>> {
        let deleted: TriggerIds = self.call("trigger.delete", &trigger_ids).await?;
        Ok(deleted.ids)
    }
}

fn first_id(ids: Vec<String>, field: &'static str) -> Result<String> {
    ids.into_iter()
        .next()
        .ok_or_else(|| ZbxError::MissingField { field }.into())
}
