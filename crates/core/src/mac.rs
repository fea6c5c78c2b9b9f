/// Normalize a MAC address to the form used in monitor data-source names:
/// lowercase hex digits with the colons removed.
pub fn normalize_mac(mac: &str) -> String {
    mac.replace(':', "").to_lowercase()
}
