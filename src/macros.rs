//! Helper macros shared by the crate modules.

/// Emit a protocol diagnostic: logged at `debug` level through the `log`
/// facade and forwarded to the transport's `log_line` sink when it has one.
macro_rules! diag {
    ($transport:expr, $($arg:tt)+) => {{
        let line = format!($($arg)+);
        log::debug!("{}", line);
        let _ = $crate::transport::Transport::log_line(&mut *$transport, &line);
    }};
}

/// Generate debug formatting code for a [`SerialPort`](serialport::SerialPort)
/// like struct.
macro_rules! debug_fmt_serialport {
    ($port:ident, $f:ident) => {
        $f.debug_tuple("")
            .field(&$port.name())
            .field(&$port.baud_rate())
            .field(&$port.data_bits())
            .field(&$port.stop_bits())
            .field(&$port.parity())
            .field(&$port.flow_control())
    };
}
