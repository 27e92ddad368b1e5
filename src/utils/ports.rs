//! Serial port discovery and opening.

use std::{thread, time::Duration};

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serialport::{available_ports, SerialPort, SerialPortType};

use crate::{error::Error, Settings};

//==============================================================================
// Public Interface
//==============================================================================

/// Interactively pick the serial port the device is attached to.
///
/// Waits, with a spinner, until at least one serial port shows up on the
/// system, then lets the user choose among them. Returns `None` when the
/// selection is cancelled.
pub fn select_port() -> Option<String> {
    let pb = spinner();
    let term = Term::stdout();
    // Avoid cursor flicker during the waiting
    let _ = term.hide_cursor();

    let mut waited: u64 = 0;
    let ports = loop {
        let ports = enumerate_serial_ports();
        if !ports.is_empty() {
            pb.finish_with_message("Select the port the device is attached to:");
            break ports;
        }
        pb.set_message(format!(
            "[{:03}s] ⌛ Waiting for a serial port to show up...",
            style(waited).dim()
        ));
        thread::sleep(Duration::from_secs(1));
        waited += 1;
    };
    let _ = term.show_cursor();

    let theme = ColorfulTheme::default();
    let mut select = Select::with_theme(&theme);
    for (name, description) in &ports {
        select.item(format!("{} {}", name, style(description).dim()));
    }
    match select.default(0).interact_on_opt(&Term::buffered_stderr()) {
        Ok(Some(index)) => ports.into_iter().nth(index).map(|(name, _)| name),
        Ok(None) => None,
        Err(e) => {
            info!("error: {}", e);
            None
        }
    }
}

/// Open the port described by `settings`, retrying a few times since the
/// device may still be coming up (e.g. right after a reboot).
pub fn open_and_setup_port(settings: &Settings) -> Result<Box<dyn SerialPort>, Error> {
    use retry::{delay, retry_with_index};

    let path = settings.path.clone().ok_or(Error::NoPort)?;
    let result = retry_with_index(
        delay::Fixed::from_millis(1000).take(4),
        |index| -> Result<Box<dyn SerialPort>, serialport::Error> {
            debug!("Opening {} (attempt {})", path, index);
            serialport::new(&path, settings.baud_rate)
                .data_bits(settings.data_bits)
                .stop_bits(settings.stop_bits)
                .parity(settings.parity)
                .flow_control(settings.flow_control)
                .timeout(Duration::from_millis(10))
                .open()
        },
    );

    let port = match result {
        Ok(port) => port,
        Err(retry::Error::Operation {
            error,
            total_delay,
            tries,
        }) => {
            info!(
                "Failed to open {} after {:?} and {} tries: {}",
                path, total_delay, tries, error
            );
            return Err(error.into());
        }
        Err(retry::Error::Internal(description)) => {
            return Err(serialport::Error::new(serialport::ErrorKind::Unknown, description).into());
        }
    };

    match port.baud_rate() {
        Ok(baud) if baud == settings.baud_rate => {}
        Ok(baud) => warn!(
            "{} runs at {} baud instead of the requested {}",
            path, baud, settings.baud_rate
        ),
        Err(e) => warn!("could not read back the baud rate of {}: {}", path, e),
    }
    info!("Connected to {} at {} baud", path, settings.baud_rate);
    debug!("data_bits    : {:?}", settings.data_bits);
    debug!("stop_bits    : {:?}", settings.stop_bits);
    debug!("parity       : {:?}", settings.parity);
    debug!("flow control : {:?}", settings.flow_control);

    Ok(port)
}

//==============================================================================
// Private stuff
//==============================================================================

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(120);
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"])
            .template("[AT] {spinner:.blue} {msg}"),
    );
    pb
}

/// Serial ports present on the system, with a short description of each.
fn enumerate_serial_ports() -> Vec<(String, String)> {
    match available_ports() {
        Ok(ports) => ports
            .into_iter()
            .map(|p| {
                let description = match p.port_type {
                    SerialPortType::UsbPort(info) => format!(
                        "({} / {})",
                        info.manufacturer.as_deref().unwrap_or(""),
                        info.product.as_deref().unwrap_or("")
                    ),
                    SerialPortType::BluetoothPort => "(bluetooth)".into(),
                    SerialPortType::PciPort => "(pci)".into(),
                    SerialPortType::Unknown => String::new(),
                };
                (p.port_name, description)
            })
            .collect(),
        Err(ref e) => {
            info!("error: {}", e);
            Vec::new()
        }
    }
}
