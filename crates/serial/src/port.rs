use tokio_serial::{DataBits, SerialPortBuilderExt, SerialStream, StopBits};

use crate::config::{FlowControl, Parity, ReaderConfig};
use crate::pipeline::PipelineError;

/// Open the configured scanner device as a raw serial port.
///
/// The port is put in raw mode with the configured line settings, so bytes
/// such as ETX or CR reach the framer untouched.
pub fn open_port(config: &ReaderConfig) -> Result<SerialStream, PipelineError> {
    let path = config.device.to_string_lossy();
    let port = tokio_serial::new(path.as_ref(), config.baud_rate)
        .data_bits(data_bits(config.data_bits)?)
        .parity(parity(config.parity))
        .stop_bits(stop_bits(config.stop_bits)?)
        .flow_control(flow_control(config.flow_control))
        .open_native_async()?;

    tracing::info!(
        device = %path,
        baud_rate = config.baud_rate,
        data_bits = config.data_bits,
        parity = ?config.parity,
        stop_bits = config.stop_bits,
        "serial port opened"
    );
    Ok(port)
}

fn data_bits(bits: u8) -> Result<DataBits, PipelineError> {
    match bits {
        5 => Ok(DataBits::Five),
        6 => Ok(DataBits::Six),
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        other => Err(PipelineError::LineSetting(format!("unsupported data bits {other}"))),
    }
}

fn stop_bits(bits: u8) -> Result<StopBits, PipelineError> {
    match bits {
        1 => Ok(StopBits::One),
        2 => Ok(StopBits::Two),
        other => Err(PipelineError::LineSetting(format!("unsupported stop bits {other}"))),
    }
}

fn parity(parity: Parity) -> tokio_serial::Parity {
    match parity {
        Parity::None => tokio_serial::Parity::None,
        Parity::Odd => tokio_serial::Parity::Odd,
        Parity::Even => tokio_serial::Parity::Even,
    }
}

fn flow_control(flow: FlowControl) -> tokio_serial::FlowControl {
    match flow {
        FlowControl::None => tokio_serial::FlowControl::None,
        FlowControl::Software => tokio_serial::FlowControl::Software,
        FlowControl::Hardware => tokio_serial::FlowControl::Hardware,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_bits_cover_supported_range() {
        assert_eq!(data_bits(5).unwrap(), DataBits::Five);
        assert_eq!(data_bits(7).unwrap(), DataBits::Seven);
        assert_eq!(data_bits(8).unwrap(), DataBits::Eight);
        assert!(matches!(data_bits(9), Err(PipelineError::LineSetting(_))));
    }

    #[test]
    fn stop_bits_one_or_two() {
        assert_eq!(stop_bits(1).unwrap(), StopBits::One);
        assert_eq!(stop_bits(2).unwrap(), StopBits::Two);
        assert!(matches!(stop_bits(0), Err(PipelineError::LineSetting(_))));
    }

    #[test]
    fn parity_and_flow_control_map_across() {
        assert_eq!(parity(Parity::Even), tokio_serial::Parity::Even);
        assert_eq!(parity(Parity::None), tokio_serial::Parity::None);
        assert_eq!(flow_control(FlowControl::Software), tokio_serial::FlowControl::Software);
        assert_eq!(flow_control(FlowControl::Hardware), tokio_serial::FlowControl::Hardware);
    }

    #[tokio::test]
    async fn missing_device_is_serial_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReaderConfig {
            device: dir.path().join("ttyNOPE"),
            ..ReaderConfig::default()
        };
        assert!(matches!(open_port(&config), Err(PipelineError::Serial(_))));
    }

    #[test]
    fn invalid_line_setting_fails_before_opening() {
        let config = ReaderConfig { data_bits: 9, ..ReaderConfig::default() };
        assert!(matches!(open_port(&config), Err(PipelineError::LineSetting(_))));
    }
}
