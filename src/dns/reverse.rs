use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::RdnsError;

const IPV4_SUFFIX: &str = "in-addr.arpa";
const IPV6_SUFFIX: &str = "ip6.arpa";

/// Reverse lookup name of an address, fully qualified and without a trailing dot.
pub trait IpAddrToArpa {
    fn to_arpa(&self) -> String;
}

impl IpAddrToArpa for Ipv4Addr {
    fn to_arpa(&self) -> String {
        let [a, b, c, d] = self.octets();
        format!("{d}.{c}.{b}.{a}.{IPV4_SUFFIX}")
    }
}

impl IpAddrToArpa for Ipv6Addr {
    fn to_arpa(&self) -> String {
        // Low nibble first within each byte, last byte first
        let mut arpa = String::with_capacity(32 * 2 + IPV6_SUFFIX.len());
        for byte in self.octets().iter().rev() {
            for nibble in [byte & 0x0F, byte >> 4] {
                arpa.push(char::from_digit(u32::from(nibble), 16).unwrap_or('0'));
                arpa.push('.');
            }
        }
        arpa.push_str(IPV6_SUFFIX);
        arpa
    }
}

impl IpAddrToArpa for IpAddr {
    fn to_arpa(&self) -> String {
        match self {
            Self::V4(ip) => ip.to_arpa(),
            Self::V6(ip) => ip.to_arpa(),
        }
    }
}

pub fn parse_ip(input: &str) -> Result<IpAddr, RdnsError> {
    input
        .parse::<IpAddr>()
        .map_err(|_| RdnsError::InvalidAddress(input.to_owned()))
}

/// Parses a textual address and returns its reverse lookup name.
pub fn reverse_name(input: &str) -> Result<String, RdnsError> {
    parse_ip(input).map(|ip| ip.to_arpa())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Rebuilds the address from an ip6.arpa name by un-reversing the nibbles
    fn ipv6_from_arpa(name: &str) -> Option<Ipv6Addr> {
        let nibbles: Vec<u8> = name
            .strip_suffix(".ip6.arpa")?
            .split('.')
            .map(|n| u8::from_str_radix(n, 16).ok())
            .collect::<Option<_>>()?;
        if nibbles.len() != 32 {
            return None;
        }

        let mut octets = [0u8; 16];
        for (i, pair) in nibbles.rchunks(2).enumerate() {
            octets[i] = (pair[1] << 4) | pair[0];
        }
        Some(Ipv6Addr::from(octets))
    }

    #[test]
    fn test_ipv4_reverse_name() {
        assert_eq!(reverse_name("192.0.2.1").unwrap(), "1.2.0.192.in-addr.arpa");
        assert_eq!(reverse_name("10.20.30.40").unwrap(), "40.30.20.10.in-addr.arpa");
        assert_eq!(reverse_name("0.0.0.0").unwrap(), "0.0.0.0.in-addr.arpa");
        assert_eq!(
            reverse_name("255.255.255.255").unwrap(),
            "255.255.255.255.in-addr.arpa"
        );
    }

    #[test]
    fn test_ipv4_octets_reversed() {
        for (a, b, c, d) in [(1, 2, 3, 4), (192, 168, 1, 22), (8, 8, 4, 4), (100, 0, 0, 255)] {
            let ip = Ipv4Addr::new(a, b, c, d);
            assert_eq!(ip.to_arpa(), format!("{d}.{c}.{b}.{a}.in-addr.arpa"));
        }
    }

    #[test]
    fn test_ipv6_reverse_name() {
        assert_eq!(
            reverse_name("2001:db8::1").unwrap(),
            "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
        );
    }

    #[test]
    fn test_ipv6_non_canonical_forms_normalise() {
        let expanded = reverse_name("2001:0db8:0000:0000:0000:0000:0000:0001").unwrap();
        assert_eq!(reverse_name("2001:DB8::1").unwrap(), expanded);
        assert_eq!(reverse_name("2001:db8:0:0::1").unwrap(), expanded);

        // IPv4-mapped address keeps its embedded octets as the low nibbles
        assert_eq!(
            reverse_name("::ffff:192.0.2.1").unwrap(),
            "1.0.2.0.0.0.0.c.f.f.f.f.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.ip6.arpa"
        );
    }

    #[test]
    fn test_ipv6_nibbles_round_trip() {
        let samples = [
            "::",
            "::1",
            "2001:db8::1",
            "2606:4700:4700::1111",
            "fe80::1ff:fe23:4567:890a",
            "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff",
            "::ffff:192.0.2.1",
        ];
        for sample in samples {
            let ip: Ipv6Addr = sample.parse().unwrap();
            let name = ip.to_arpa();

            assert_eq!(name.split('.').count(), 34, "{name}");
            assert_eq!(ipv6_from_arpa(&name), Some(ip), "{sample}");
        }
    }

    #[test]
    fn test_ipv6_lowercase_hex() {
        let name = reverse_name("ABCD:EF01::").unwrap();
        assert!(name.ends_with("1.0.f.e.d.c.b.a.ip6.arpa"));
        assert_eq!(name, name.to_lowercase());
    }

    #[test]
    fn test_surrounding_whitespace_is_rejected() {
        for input in [" 192.0.2.1\n", "192.0.2.1 ", "\t2001:db8::1"] {
            assert!(
                matches!(reverse_name(input), Err(RdnsError::InvalidAddress(_))),
                "Expected invalid: {input:?}"
            );
        }
    }

    #[test]
    fn test_invalid_addresses() {
        for input in ["not-an-ip", "999.999.999.999", "", "192.0.2", "2001:db8:::1", "1.2.3.4/24"] {
            assert!(
                matches!(reverse_name(input), Err(RdnsError::InvalidAddress(_))),
                "Expected invalid: {input}"
            );
        }
    }
}
