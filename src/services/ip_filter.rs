//! Network-origin admission control.
//!
//! Organizations opt in to restriction: an empty allow-list admits every
//! address. Parsing never panics and never admits by accident: anything
//! that fails to parse, on either side, is simply a non-match.

use std::net::IpAddr;

use ipnet::IpNet;

/// Sentinel used when no client address can be determined at all.
pub const FALLBACK_CLIENT_IP: &str = "0.0.0.0";

/// Raw origin context handed in by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    /// `x-forwarded-for` header value, if present.
    pub forwarded_for: Option<String>,
    /// `x-real-ip` header value, if present.
    pub real_ip: Option<String>,
    /// Transport-level peer address.
    pub peer_addr: Option<String>,
    /// `user-agent` header value, carried through to audit records.
    pub user_agent: Option<String>,
}

/// Resolve the client address with fixed precedence: first forwarded-for
/// hop, then real-ip, then the peer address, then the fallback sentinel.
/// Only the first forwarded-for entry is trusted.
pub fn resolve_client_ip(ctx: &ClientContext) -> String {
    if let Some(forwarded) = ctx.forwarded_for.as_deref() {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = ctx.real_ip.as_deref() {
        return real_ip.to_string();
    }

    if let Some(peer) = ctx.peer_addr.as_deref() {
        return peer.to_string();
    }

    FALLBACK_CLIENT_IP.to_string()
}

/// Check a client address against an organization's allow-list of literal
/// addresses and CIDR ranges.
pub fn is_ip_allowed(client_ip: &str, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }

    let Ok(client) = client_ip.parse::<IpAddr>() else {
        return false;
    };

    for entry in allowed {
        if entry.contains('/') {
            // Host bits in the entry are tolerated; membership is decided
            // on the network range. Family mismatches never match.
            if let Ok(net) = entry.parse::<IpNet>() {
                if net.contains(&client) {
                    return true;
                }
            }
        } else if let Ok(addr) = entry.parse::<IpAddr>() {
            if addr == client {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_allow_list_admits_everything() {
        assert!(is_ip_allowed("10.0.0.5", &[]));
        assert!(is_ip_allowed("not-an-ip", &[]));
    }

    #[test]
    fn literal_address_match() {
        let allowed = list(&["10.0.0.5", "192.168.1.1"]);
        assert!(is_ip_allowed("10.0.0.5", &allowed));
        assert!(!is_ip_allowed("10.0.0.6", &allowed));
    }

    #[test]
    fn cidr_range_match() {
        let allowed = list(&["10.0.0.0/24"]);
        assert!(is_ip_allowed("10.0.0.5", &allowed));
        assert!(!is_ip_allowed("10.0.1.5", &allowed));
    }

    #[test]
    fn unparseable_client_never_matches() {
        let allowed = list(&["10.0.0.0/24"]);
        assert!(!is_ip_allowed("not-an-ip", &allowed));
        assert!(!is_ip_allowed("", &allowed));
        assert!(!is_ip_allowed("10.0.0", &allowed));
    }

    #[test]
    fn unparseable_allow_list_entries_are_skipped() {
        let allowed = list(&["garbage", "999.0.0.0/8", "10.0.0.5"]);
        assert!(is_ip_allowed("10.0.0.5", &allowed));
        assert!(!is_ip_allowed("10.0.0.6", &allowed));
    }

    #[test]
    fn address_family_mismatch_does_not_match() {
        assert!(!is_ip_allowed("::1", &list(&["10.0.0.0/24"])));
        assert!(!is_ip_allowed("10.0.0.5", &list(&["2001:db8::/32"])));
        assert!(is_ip_allowed("2001:db8::1", &list(&["2001:db8::/32"])));
    }

    #[test]
    fn forwarded_for_takes_precedence_and_only_first_hop_counts() {
        let ctx = ClientContext {
            forwarded_for: Some("203.0.113.7, 10.0.0.1, 172.16.0.1".to_string()),
            real_ip: Some("198.51.100.2".to_string()),
            peer_addr: Some("192.0.2.1".to_string()),
            user_agent: None,
        };
        assert_eq!(resolve_client_ip(&ctx), "203.0.113.7");
    }

    #[test]
    fn real_ip_beats_peer_address() {
        let ctx = ClientContext {
            forwarded_for: None,
            real_ip: Some("198.51.100.2".to_string()),
            peer_addr: Some("192.0.2.1".to_string()),
            user_agent: None,
        };
        assert_eq!(resolve_client_ip(&ctx), "198.51.100.2");
    }

    #[test]
    fn falls_back_to_peer_then_sentinel() {
        let ctx = ClientContext {
            peer_addr: Some("192.0.2.1".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_client_ip(&ctx), "192.0.2.1");

        assert_eq!(resolve_client_ip(&ClientContext::default()), "0.0.0.0");
    }
}
