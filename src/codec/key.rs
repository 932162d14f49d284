use md5::{Digest, Md5};

/// Item key for an alert: lowercase hex MD5 of its name.
///
/// Same name, same key. Items created by earlier deployments used the same
/// digest, so lookups by key keep working across upgrades.
#[must_use]
pub fn item_key(name: &str) -> String {
    hex::encode(Md5::digest(name.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::item_key;

    #[test]
    fn key_is_stable_md5_hex() {
        assert_eq!(item_key(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(item_key("err-5xx"), "f35ad5edf2157b69ab60b6704732c743");
        assert_eq!(item_key("err-5xx"), item_key("err-5xx"));
        assert_ne!(item_key("err-5xx"), item_key("err-4xx"));
    }
}
