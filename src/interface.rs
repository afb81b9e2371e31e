use netdev::Interface;
use std::net::Ipv4Addr;

/// Pick the local IPv4 address used as the scan origin.
///
/// Wireless interfaces are preferred since the wireless segment is the
/// common case for hand-held use; any other non-loopback interface is the
/// fallback.
pub fn get_local_ipv4() -> Option<Ipv4Addr> {
    let interfaces = netdev::interface::get_interfaces();
    for iface in &interfaces {
        if is_wireless(iface) {
            if let Some(addr) = get_interface_ipv4(iface) {
                return Some(addr);
            }
        }
    }
    for iface in &interfaces {
        if iface.is_loopback() {
            continue;
        }
        if let Some(addr) = get_interface_ipv4(iface) {
            return Some(addr);
        }
    }
    None
}

/// First non-loopback IPv4 address of the interface.
pub fn get_interface_ipv4(iface: &Interface) -> Option<Ipv4Addr> {
    iface
        .ipv4
        .iter()
        .map(|net| net.addr)
        .find(|addr| !addr.is_loopback())
}

fn is_wireless(iface: &Interface) -> bool {
    if iface.name.starts_with("wl") || iface.name.contains("wlan") {
        return true;
    }
    match &iface.friendly_name {
        Some(name) => name.contains("Wi-Fi") || name.contains("Wireless"),
        None => false,
    }
}
