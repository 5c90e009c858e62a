use std::io::{Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{Result, TransportError};

/// An open serial device implementing `Read + Write`.
///
/// Reads block for at most the configured timeout and then fail with
/// `ErrorKind::TimedOut`, which callers treat as "no data yet".
pub struct SerialStream {
    inner: Box<dyn SerialPort>,
    path: String,
}

impl SerialStream {
    /// Open the serial device at `path`.
    pub fn open(path: impl Into<String>, config: &SerialConfig) -> Result<Self> {
        let path = path.into();
        let port = serialport::new(path.as_str(), config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        info!(
            port = %path,
            baud_rate = config.baud_rate,
            timeout_ms = config.timeout.as_millis() as u64,
            "serial port opened"
        );

        Ok(Self { inner: port, path })
    }

    /// Path the stream was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name reported by the driver, falling back to the open path.
    pub fn name(&self) -> String {
        self.inner.name().unwrap_or_else(|| self.path.clone())
    }

    /// Current line speed.
    pub fn baud_rate(&self) -> Result<u32> {
        self.inner.baud_rate().map_err(Into::into)
    }

    /// Change the read timeout.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.inner.set_timeout(timeout).map_err(Into::into)
    }

    /// Current read timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout()
    }

    /// Drop any bytes the driver has received but nobody has read.
    ///
    /// Call this after (re)connecting so stale data does not reach the decoder.
    pub fn clear_input(&self) -> Result<()> {
        debug!(port = %self.path, "clearing serial input buffer");
        self.inner.clear(ClearBuffer::Input).map_err(Into::into)
    }

    /// Try to clone this stream so reads and writes can live on different threads.
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self {
            inner: cloned,
            path: self.path.clone(),
        })
    }
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialStream")
            .field("path", &self.path)
            .finish()
    }
}
