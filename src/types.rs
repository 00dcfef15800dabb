//! Core value types shared by the stages.

use std::fmt;

use strum::{Display, EnumIter, EnumString};

/// Network interface that carries internet traffic, handed to the DNS script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter)]
pub enum NetworkDevice {
    #[strum(serialize = "wlan0")]
    Wlan0,
    #[strum(serialize = "eth1")]
    Eth1,
}

/// How the Pi authenticates to the wireless network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display, EnumString, EnumIter)]
pub enum WifiSecurity {
    /// WPA-PSK, a single pre-shared key. Typical home network.
    #[strum(serialize = "WPA-PSK")]
    PreSharedKey,
    /// WPA-EAP with PEAP/MSCHAPV2, username plus password. Typical enterprise network.
    #[strum(serialize = "WPA-EAP")]
    Enterprise,
}

/// Credentials for joining a wireless network.
#[derive(Clone, PartialEq, Eq)]
pub struct WirelessCredentials {
    pub ssid: String,
    /// Present for enterprise networks only
    pub username: Option<String>,
    pub password: String,
}

impl WirelessCredentials {
    pub fn security(&self) -> WifiSecurity {
        if self.username.is_some() {
            WifiSecurity::Enterprise
        } else {
            WifiSecurity::PreSharedKey
        }
    }
}

impl fmt::Debug for WirelessCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WirelessCredentials")
            .field("ssid", &self.ssid)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Internet uplink chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uplink {
    Wired,
    Wireless(WirelessCredentials),
}

impl Uplink {
    pub fn credentials(&self) -> Option<&WirelessCredentials> {
        match self {
            Uplink::Wired => None,
            Uplink::Wireless(creds) => Some(creds),
        }
    }

    /// Device the DNS script reports the address of.
    pub fn device(&self) -> NetworkDevice {
        device_for(self.credentials())
    }
}

/// `wlan0` when wireless credentials are present, `eth1` otherwise.
pub fn device_for(credentials: Option<&WirelessCredentials>) -> NetworkDevice {
    match credentials {
        Some(_) => NetworkDevice::Wlan0,
        None => NetworkDevice::Eth1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn psk() -> WirelessCredentials {
        WirelessCredentials {
            ssid: "Home".to_string(),
            username: None,
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_device_selector() {
        assert_eq!(Uplink::Wired.device(), NetworkDevice::Eth1);
        assert_eq!(Uplink::Wireless(psk()).device(), NetworkDevice::Wlan0);
        assert_eq!(device_for(None).to_string(), "eth1");
        assert_eq!(device_for(Some(&psk())).to_string(), "wlan0");
    }

    #[test]
    fn test_security_follows_username() {
        assert_eq!(psk().security(), WifiSecurity::PreSharedKey);

        let mut eap = psk();
        eap.username = Some("alice".to_string());
        assert_eq!(eap.security(), WifiSecurity::Enterprise);
        assert_eq!(eap.security().to_string(), "WPA-EAP");
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", Uplink::Wireless(psk()));
        assert!(debug.contains("Home"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_device_parses() {
        assert_eq!("wlan0".parse::<NetworkDevice>().unwrap(), NetworkDevice::Wlan0);
        assert!("eth0".parse::<NetworkDevice>().is_err());
    }
}
