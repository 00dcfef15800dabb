//! Network configuration: WPA supplicant block and interface definitions.
//!
//! The instrument-facing static interface is written in both modes, so the device
//! always exposes the same local endpoint whatever its uplink is.

use super::{ProvisionContext, announce};
use crate::config::{InstrumentInterface, Settings};
use crate::error::Result;
use crate::paths::SystemPaths;
use crate::types::{NetworkDevice, Uplink, WirelessCredentials};

pub const LOOPBACK_STANZA: &str = "\nauto lo\niface lo inet loopback\n";

/// `network={...}` block appended to `wpa_supplicant.conf`.
///
/// Enterprise networks get WPA-EAP with PEAP/MSCHAPV2; without a username the block
/// is a plain SSID/PSK pair.
pub fn wpa_network_block(creds: &WirelessCredentials) -> String {
    let body = match &creds.username {
        Some(identity) => format!(
            "\tssid=\"{ssid}\"\n\
             \tkey_mgmt=WPA-EAP\n\
             \tpairwise=CCMP TKIP\n\
             \tgroup=CCMP TKIP\n\
             \teap=PEAP\n\
             \tphase1=\"peapver=0\"\n\
             \tphase2=\"MSCHAPV2\"\n\
             \tidentity=\"{identity}\"\n\
             \tpassword=\"{password}\"\n",
            ssid = creds.ssid,
            identity = identity,
            password = creds.password,
        ),
        None => format!(
            "\tssid=\"{}\"\n\tpsk=\"{}\"\n",
            creds.ssid, creds.password
        ),
    };
    format!("\nnetwork={{\n{}}}\n", body)
}

/// Hooks that load the firewall before the uplink comes up and update DNS after.
fn uplink_hooks(paths: &SystemPaths) -> String {
    format!(
        "\tpre-up /bin/bash {}\n\tpost-up /bin/bash {}\n",
        paths.firewall_script().display(),
        paths.dns_script().display()
    )
}

/// DHCP stanza for the wired internet port.
pub fn wired_uplink_stanza(paths: &SystemPaths) -> String {
    let dev = NetworkDevice::Eth1;
    format!(
        "\nauto {dev}\niface {dev} inet dhcp\n{}",
        uplink_hooks(paths)
    )
}

/// DHCP stanza for the wireless uplink, authenticated through the supplicant file.
pub fn wireless_uplink_stanza(paths: &SystemPaths) -> String {
    let dev = NetworkDevice::Wlan0;
    format!(
        "\nauto {dev}\nallow-hotplug {dev}\niface {dev} inet dhcp\n\twpa-conf {}\n{}",
        paths.wpa_supplicant.display(),
        uplink_hooks(paths)
    )
}

/// Static stanza for the instrument-facing port.
pub fn instrument_stanza(iface: &InstrumentInterface) -> String {
    format!(
        "\nauto {dev}\niface {dev} inet static\n\taddress {}\n\tnetmask {}\n\tnetwork {}\n",
        iface.address,
        iface.netmask,
        iface.network,
        dev = iface.device
    )
}

/// Everything appended to `/etc/network/interfaces` for the given uplink.
pub fn interfaces_stanza(uplink: &Uplink, settings: &Settings, paths: &SystemPaths) -> String {
    let instrument = instrument_stanza(&settings.instrument);
    match uplink {
        Uplink::Wired => format!(
            "{}{}{}",
            LOOPBACK_STANZA,
            instrument,
            wired_uplink_stanza(paths)
        ),
        Uplink::Wireless(_) => format!(
            "{}{}{}",
            LOOPBACK_STANZA,
            wireless_uplink_stanza(paths),
            instrument
        ),
    }
}

/// Write the supplicant block (wireless only) and the interface definitions.
pub fn configure_network(ctx: &ProvisionContext<'_>, uplink: &Uplink) -> Result<()> {
    if let Uplink::Wireless(creds) = uplink {
        announce(&format!(
            "Adding {} configuration to {}",
            creds.security(),
            ctx.paths.wpa_supplicant.display()
        ));
        ctx.paths
            .wpa_supplicant_file()
            .apply(&wpa_network_block(creds))?;
    }

    announce(&format!(
        "Adding interface configuration to {}",
        ctx.paths.interfaces.display()
    ));
    ctx.paths
        .interfaces_file()
        .apply(&interfaces_stanza(uplink, ctx.settings, ctx.paths))?;
    Ok(())
}
