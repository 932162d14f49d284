use std::time::Duration;

pub(super) fn default_server_addr() -> String {
    "0.0.0.0".to_string()
}

pub(super) const fn default_server_port() -> u16 {
    8080
}

/// "Linux servers" in a stock Zabbix install.
pub(super) fn default_host_group_id() -> String {
    "2".to_string()
}

pub(super) fn default_interface_port() -> String {
    "10050".to_string()
}

pub(super) const fn default_trigger_priority() -> u8 {
    5
}

pub(super) const fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

pub(super) const fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

pub(super) const fn default_health_timeout() -> Duration {
    Duration::from_secs(3)
}
