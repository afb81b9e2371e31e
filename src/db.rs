use phf::phf_map;

/// Well-known TCP service names for scan reports.
static SERVICE_NAMES: phf::Map<u16, &'static str> = phf_map! {
    21u16 => "FTP",
    22u16 => "SSH",
    23u16 => "Telnet",
    25u16 => "SMTP",
    53u16 => "DNS",
    80u16 => "HTTP",
    443u16 => "HTTPS",
    445u16 => "SMB",
    554u16 => "RTSP",
    3306u16 => "MySQL",
    3389u16 => "RDP",
    8080u16 => "WebProxy",
};

/// Service label for a TCP port. Unmapped ports fall back to a plain "TCP" tag.
pub fn service_name(port: u16) -> &'static str {
    SERVICE_NAMES.get(&port).copied().unwrap_or("TCP")
}
