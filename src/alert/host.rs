use tracing::info;

use crate::Result;
use crate::zbx_client::{NewHost, ZbxClient};

/// Zabbix host backing an index pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRef {
    pub host_id: String,
    pub host_name: String,
}

/// Host name for an index pattern: the pattern without its `*` wildcards.
#[must_use]
pub fn host_name_for(index: &str) -> String {
    index.replace('*', "")
}

/// Maps index patterns to Zabbix hosts, creating them on first use.
///
/// Lookup and creation are two separate calls; two concurrent first uses of
/// the same pattern can both create a host.
#[derive(Clone)]
pub struct HostResolver {
    client: ZbxClient,
    group_id: String,
    interface_port: String,
}

impl HostResolver {
    #[must_use]
    pub const fn new(client: ZbxClient, group_id: String, interface_port: String) -> Self {
        Self {
            client,
            group_id,
            interface_port,
        }
    }

    /// Existing host for `index`, if any. Never mutates Zabbix.
    pub async fn lookup(&self, index: &str) -> Result<Option<HostRef>> {
        let host_name = host_name_for(index);
        let host = self.client.host_by_name(&host_name).await?;
        Ok(host.map(|host| HostRef {
            host_id: host.host_id,
            host_name,
        }))
    }

    /// Host for `index`, created with the configured group and agent
    /// interface port when it does not exist yet.
    pub async fn resolve(&self, index: &str) -> Result<HostRef> {
        if let Some(host) = self.lookup(index).await? {
            return Ok(host);
        }
        let host_name = host_name_for(index);
        let host_id = self
            .client
            .create_host(&NewHost {
                host: &host_name,
                group_id: &self.group_id,
                interface_port: &self.interface_port,
            })
            .await?;
        info!(index, host = %host_name, %host_id, "created host for index pattern");
        Ok(HostRef { host_id, host_name })
    }
}

#[cfg(test)]
mod tests {
    use super::host_name_for;

    #[test]
    fn wildcards_are_stripped() {
        assert_eq!(host_name_for("nginx-*"), "nginx-");
        assert_eq!(host_name_for("*-app-*-prod"), "-app--prod");
        assert_eq!(host_name_for("audit"), "audit");
    }
}
