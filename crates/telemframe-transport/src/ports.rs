use serialport::SerialPortType;

use crate::error::{Result, TransportError};

/// What kind of device backs a serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    /// USB-serial adapter (CP210x, CH340, FTDI, native USB CDC, ...).
    Usb {
        vid: u16,
        pid: u16,
        manufacturer: Option<String>,
        product: Option<String>,
    },
    Pci,
    Bluetooth,
    Unknown,
}

impl PortKind {
    /// Short label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            PortKind::Usb { .. } => "usb",
            PortKind::Pci => "pci",
            PortKind::Bluetooth => "bluetooth",
            PortKind::Unknown => "unknown",
        }
    }
}

impl From<SerialPortType> for PortKind {
    fn from(value: SerialPortType) -> Self {
        match value {
            SerialPortType::UsbPort(usb) => PortKind::Usb {
                vid: usb.vid,
                pid: usb.pid,
                manufacturer: usb.manufacturer,
                product: usb.product,
            },
            SerialPortType::PciPort => PortKind::Pci,
            SerialPortType::BluetoothPort => PortKind::Bluetooth,
            SerialPortType::Unknown => PortKind::Unknown,
        }
    }
}

/// A serial device visible to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Path or name to pass to [`crate::SerialStream::open`].
    pub name: String,
    pub kind: PortKind,
}

/// List serial devices, sorted by name.
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .map_err(TransportError::Enumerate)?
        .into_iter()
        .map(|info| PortInfo {
            name: info.port_name,
            kind: info.port_type.into(),
        })
        .collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(count = ports.len(), "enumerated serial ports");
    Ok(ports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_kind_labels() {
        let usb = PortKind::Usb {
            vid: 0x10c4,
            pid: 0xea60,
            manufacturer: Some("Silicon Labs".to_string()),
            product: None,
        };
        assert_eq!(usb.label(), "usb");
        assert_eq!(PortKind::Pci.label(), "pci");
        assert_eq!(PortKind::Bluetooth.label(), "bluetooth");
        assert_eq!(PortKind::Unknown.label(), "unknown");
    }

    #[test]
    fn converts_serialport_types() {
        assert_eq!(PortKind::from(SerialPortType::PciPort), PortKind::Pci);
        assert_eq!(PortKind::from(SerialPortType::Unknown), PortKind::Unknown);
    }
}
