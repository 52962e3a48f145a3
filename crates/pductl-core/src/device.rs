// ── Device identity ──
//
// Address and credentials for one PDU. The address is validated once,
// here, and never changes afterwards.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use secrecy::SecretString;

use crate::error::CoreError;

/// Validated dotted-quad address.
///
/// Accepts exactly four decimal octets (0-255) without leading zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceAddress(Ipv4Addr);

impl DeviceAddress {
    pub fn ip(&self) -> Ipv4Addr {
        self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `Ipv4Addr` already rejects leading zeros and out-of-range octets.
        s.parse::<Ipv4Addr>()
            .map(Self)
            .map_err(|_| CoreError::InvalidAddress {
                address: s.to_owned(),
            })
    }
}

impl From<Ipv4Addr> for DeviceAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip)
    }
}

/// A PDU's address plus login credentials. Immutable once built.
#[derive(Debug, Clone)]
pub struct Device {
    address: DeviceAddress,
    username: String,
    password: SecretString,
}

impl Device {
    /// Build a device identity, failing with [`CoreError::InvalidAddress`]
    /// if `address` is not a well-formed IPv4 dotted-quad.
    pub fn new(
        address: &str,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            address: address.parse()?,
            username: username.into(),
            password,
        })
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn device(address: &str) -> Result<Device, CoreError> {
        Device::new(address, "apc", "apc".to_string().into())
    }

    #[test]
    fn accepts_dotted_quad() {
        let dev = device("192.168.1.1").unwrap();
        assert_eq!(dev.address().to_string(), "192.168.1.1");
        assert_eq!(dev.username(), "apc");
    }

    #[test]
    fn rejects_out_of_range_octet() {
        assert!(matches!(
            device("192.168.1.256"),
            Err(CoreError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(device("192.168.1.1abc").is_err());
        assert!(device("192.168.1").is_err());
        assert!(device("pdu.example.com").is_err());
    }

    #[test]
    fn rejects_leading_zero_octet() {
        assert!(device("192.168.01.1").is_err());
    }

    #[test]
    fn invalid_address_names_the_input() {
        let err = device("10.0.0.x").unwrap_err();
        assert!(err.to_string().contains("10.0.0.x"));
    }
}
