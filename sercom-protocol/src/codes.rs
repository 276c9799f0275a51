//! Station addresses, request codes and control bytes

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Station address on the link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Address(pub u8);

impl Address {
    /// Default address of the Main station
    pub const MAIN: Address = Address(0x20);
    /// Default address of the Sensor station
    pub const SENSOR: Address = Address(0x25);

    /// Raw wire value
    pub const fn to_byte(self) -> u8 {
        self.0
    }
}

impl From<u8> for Address {
    fn from(byte: u8) -> Self {
        Address(byte)
    }
}

// Wire format values
const REQ_DATE_TIME: u8 = 100;
const REQ_UNIX_TIME: u8 = 101;
const REQ_WEATHER: u8 = 102;

/// Request catalog
///
/// Every byte maps to a variant; bytes outside the catalog become
/// [`RequestCode::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestCode {
    /// Current date and time as `YYYY-MM-DD HH:MM:SS`
    DateTime,
    /// Seconds since the unix epoch, in decimal
    UnixTime,
    /// Weather report (no producer exists)
    Weather,
    /// Byte outside the catalog
    Unknown(u8),
}

impl RequestCode {
    /// Catalog entries, in wire order
    pub const CATALOG: [RequestCode; 3] = [
        RequestCode::DateTime,
        RequestCode::UnixTime,
        RequestCode::Weather,
    ];

    /// Parse a request code from its wire format byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            REQ_DATE_TIME => RequestCode::DateTime,
            REQ_UNIX_TIME => RequestCode::UnixTime,
            REQ_WEATHER => RequestCode::Weather,
            other => RequestCode::Unknown(other),
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            RequestCode::DateTime => REQ_DATE_TIME,
            RequestCode::UnixTime => REQ_UNIX_TIME,
            RequestCode::Weather => REQ_WEATHER,
            RequestCode::Unknown(byte) => byte,
        }
    }

    /// Returns true if this code is part of the catalog
    pub fn is_known(&self) -> bool {
        !matches!(self, RequestCode::Unknown(_))
    }

    /// Catalog name of this request
    pub fn name(&self) -> &'static str {
        match self {
            RequestCode::DateTime => "date_time",
            RequestCode::UnixTime => "unix_time",
            RequestCode::Weather => "weather",
            RequestCode::Unknown(_) => "unknown",
        }
    }

    /// Look up a catalog entry by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::CATALOG.into_iter().find(|code| code.name() == name)
    }
}

// ASCII control codes
const CTRL_STX: u8 = 0x02;
const CTRL_ACK: u8 = 0x06;
const CTRL_NAK: u8 = 0x15;

/// Control bytes used on the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlByte {
    /// Start of text: precedes the payload of a frame
    Stx,
    /// Acknowledge: a request was accepted
    Ack,
    /// Not acknowledged (never sent by Sercom nodes)
    Nak,
}

impl ControlByte {
    /// Parse a control byte from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CTRL_STX => Some(ControlByte::Stx),
            CTRL_ACK => Some(ControlByte::Ack),
            CTRL_NAK => Some(ControlByte::Nak),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub const fn to_byte(self) -> u8 {
        match self {
            ControlByte::Stx => CTRL_STX,
            ControlByte::Ack => CTRL_ACK,
            ControlByte::Nak => CTRL_NAK,
        }
    }
}

/// Start-of-text byte value
pub const STX: u8 = ControlByte::Stx.to_byte();
/// Acknowledge byte value
pub const ACK: u8 = ControlByte::Ack.to_byte();
/// Not-acknowledge byte value
pub const NAK: u8 = ControlByte::Nak.to_byte();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_code_mapping_is_total() {
        for byte in 0..=u8::MAX {
            let code = RequestCode::from_byte(byte);
            assert_eq!(code.to_byte(), byte);
            assert_eq!(code.is_known(), (100..=102).contains(&byte));
        }
    }

    #[test]
    fn test_request_code_values() {
        assert_eq!(RequestCode::DateTime.to_byte(), 100);
        assert_eq!(RequestCode::UnixTime.to_byte(), 101);
        assert_eq!(RequestCode::Weather.to_byte(), 102);
        assert_eq!(RequestCode::from_byte(250), RequestCode::Unknown(250));
    }

    #[test]
    fn test_request_code_names() {
        for code in RequestCode::CATALOG {
            assert_eq!(RequestCode::from_name(code.name()), Some(code));
        }
        assert_eq!(RequestCode::Unknown(7).name(), "unknown");
        assert_eq!(RequestCode::from_name("unknown"), None);
        assert_eq!(RequestCode::from_name("weather"), Some(RequestCode::Weather));
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(STX, 0x02);
        assert_eq!(ACK, 0x06);
        assert_eq!(NAK, 0x15);
        assert_eq!(ControlByte::from_byte(0x15), Some(ControlByte::Nak));
        assert_eq!(ControlByte::from_byte(b'2'), None);
    }

    #[test]
    fn test_well_known_addresses() {
        assert_eq!(Address::MAIN.to_byte(), 0x20);
        assert_eq!(Address::SENSOR.to_byte(), 0x25);
        assert_eq!(Address::from(0x25), Address::SENSOR);
    }
}
