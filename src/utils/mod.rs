use crate::error::ProvisionError;

/// Validate an IPv4 address (e.g., "192.168.1.1").
/// Returns true if the string is a valid dotted-decimal IPv4 address.
pub fn is_valid_ipv4(ip: &str) -> bool {
    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != 4 {
        return false;
    }
    parts.iter().all(|p| p.parse::<u8>().is_ok())
}

/// Unit number of a device: the last octet of its dotted-quad control host
pub fn unit_from_host(host: &str) -> Result<u32, ProvisionError> {
    let host = host.trim();
    if !is_valid_ipv4(host) {
        return Err(ProvisionError::InvalidHost(host.to_string()));
    }
    host.rsplit('.')
        .next()
        .and_then(|octet| octet.parse::<u32>().ok())
        .ok_or_else(|| ProvisionError::InvalidHost(host.to_string()))
}

/// Normalize an address prefix so it ends with exactly one dot
/// e.g., "232.20" -> "232.20."
pub fn ensure_dot_suffix(prefix: &str) -> String {
    let trimmed = prefix.trim();
    if trimmed.ends_with('.') {
        trimmed.to_string()
    } else {
        format!("{}.", trimmed)
    }
}

/// Strip scheme, path and port from a URL-ish string, leaving the host
/// e.g., "http://10.0.0.5:8010/ui" -> "10.0.0.5"
pub fn host_only(value: &str) -> String {
    let mut v = value.trim();
    if let Some((_, rest)) = v.split_once("://") {
        v = rest;
    }
    let v = v.split('/').next().unwrap_or("");
    v.split(':').next().unwrap_or("").to_string()
}

/// Multicast group `{prefix}{unit}.{suffix}`; prefix must already end in a dot
pub fn multicast_address(prefix: &str, unit: u32, suffix: u32) -> String {
    format!("{}{}.{}", prefix, unit, suffix)
}
