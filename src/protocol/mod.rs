//! Device serial protocol: one command or report per line.
//!
//! The device speaks three kinds of line: `ON`, `OFF`, and a decimal
//! packed color (see the `color` module). Everything else is noise.

pub type ParserResult<T> = Result<T, ParseError>;

#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// The line was not ON, OFF or a decimal color value.
    BadLine(String),
}

/// One decoded line of device output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SerialEvent {
    PowerOn,
    PowerOff,
    /// A raw packed color report; may carry a white byte on top.
    ColorReport(u32),
}

impl SerialEvent {
    /// Parse one line of device output.
    ///
    /// `Ok(None)` means the line carried nothing to act on: a blank
    /// line (timed-out read) or the reserved zero color.
    pub fn parse(line: &str) -> ParserResult<Option<SerialEvent>> {
        let line = line.trim();
        match line {
            "" => Ok(None),
            "ON" => Ok(Some(SerialEvent::PowerOn)),
            "OFF" => Ok(Some(SerialEvent::PowerOff)),
            _ => match line.parse::<u32>() {
                Ok(0) => Ok(None),
                Ok(value) => Ok(Some(SerialEvent::ColorReport(value))),
                Err(_) => Err(ParseError::BadLine(line.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_power_lines() {
        assert_eq!(SerialEvent::parse("ON").unwrap(), Some(SerialEvent::PowerOn));
        assert_eq!(SerialEvent::parse("OFF").unwrap(), Some(SerialEvent::PowerOff));
        // Line terminators and padding are trimmed away.
        assert_eq!(
            SerialEvent::parse("  ON\r\n").unwrap(),
            Some(SerialEvent::PowerOn)
        );
    }

    #[test]
    fn parses_color_reports() {
        assert_eq!(
            SerialEvent::parse("16777215\n").unwrap(),
            Some(SerialEvent::ColorReport(16777215))
        );
    }

    #[test]
    fn zero_and_blank_lines_yield_nothing() {
        assert_eq!(SerialEvent::parse("0").unwrap(), None);
        assert_eq!(SerialEvent::parse("").unwrap(), None);
        assert_eq!(SerialEvent::parse("\r\n").unwrap(), None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(SerialEvent::parse("garbage").is_err());
        assert!(SerialEvent::parse("-1").is_err());
        assert!(SerialEvent::parse("on").is_err());
    }
}
