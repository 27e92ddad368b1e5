//! [`Transport`] over a real serial port.

use std::io::{Read, Write};
use std::{fmt, thread, time::Duration};

use log::{trace, warn};
use serialport::SerialPort;

use super::{Transport, Unsupported};

/// Binds the command engine to an open [`SerialPort`].
///
/// Reads check the number of bytes waiting in the input buffer first, so
/// `read_byte` never blocks regardless of the port timeout. I/O errors from
/// the port are logged and swallowed: a failing port behaves like a silent
/// device and the protocol's own retries and validation take it from there.
///
/// There is no `log_line` sink; diagnostics already go through the `log`
/// facade.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        SerialTransport { port }
    }

    /// Give the port back, e.g. to switch it to data mode traffic.
    pub fn into_inner(self) -> Box<dyn SerialPort> {
        self.port
    }
}

impl Transport for SerialTransport {
    fn write_byte(&mut self, byte: u8) -> Result<(), Unsupported> {
        trace!("tx {:#04x}", byte);
        if let Err(e) = self.port.write_all(&[byte]) {
            warn!("error writing to {}: {}", port_name(&*self.port), e);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Unsupported> {
        match self.port.bytes_to_read() {
            Ok(0) => Ok(None),
            Ok(_) => {
                let mut byte = [0_u8; 1];
                match self.port.read(&mut byte) {
                    Ok(1) => {
                        trace!("rx {:#04x}", byte[0]);
                        Ok(Some(byte[0]))
                    }
                    Ok(_) => Ok(None),
                    Err(e) => {
                        warn!("error reading from {}: {}", port_name(&*self.port), e);
                        Ok(None)
                    }
                }
            }
            Err(e) => {
                warn!("error polling {}: {}", port_name(&*self.port), e);
                Ok(None)
            }
        }
    }

    fn delay_ms(&mut self, ms: u32) -> Result<(), Unsupported> {
        thread::sleep(Duration::from_millis(ms.into()));
        Ok(())
    }

    fn reinitialize_baud(&mut self, baud: u32) -> Result<(), Unsupported> {
        if let Err(e) = self.port.set_baud_rate(baud) {
            warn!(
                "could not set {} to {} baud: {}",
                port_name(&*self.port),
                baud,
                e
            );
        }
        Ok(())
    }
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let port = &self.port;
        debug_fmt_serialport!(port, f).finish()
    }
}

fn port_name(port: &dyn SerialPort) -> String {
    port.name().unwrap_or_else(|| "<unnamed port>".into())
}
