use std::time::Duration;

/// Baud rate the rig firmware configures on its UART.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Read timeout applied to freshly opened ports.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings used when opening a serial device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Line speed in bits per second.
    pub baud_rate: u32,
    /// How long a blocking read waits before returning `TimedOut`.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SerialConfig {
    /// Default settings with a different baud rate.
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }
}
