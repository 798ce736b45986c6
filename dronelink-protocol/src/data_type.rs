//! Message type tags
//!
//! The first header byte of every frame selects the message kind. Only the
//! tags listed here are accepted by the receiver; anything else is rejected
//! before the length byte is read.
//!
//! Payload layouts for each kind belong to the application and are not
//! decoded here.

/// Known message type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataType {
    /// Placeholder / no data
    None = 0x00,

    // BLE + serial
    /// Link check
    Ping = 0x01,
    /// Reply to a request
    Ack = 0x02,
    Error = 0x03,
    Request = 0x04,
    /// New passcode for pairing
    Passcode = 0x05,

    // Control
    Control = 0x10,
    Command = 0x11,
    Command2 = 0x12,
    Command3 = 0x13,

    // Light
    LightMode = 0x20,
    LightMode2 = 0x21,
    LightModeCommand = 0x22,
    LightModeCommandIr = 0x23,
    LightModeColor = 0x24,
    LightModeColor2 = 0x25,
    LightEvent = 0x26,
    LightEvent2 = 0x27,
    LightEventCommand = 0x28,
    LightEventCommandIr = 0x29,
    LightEventColor = 0x2A,
    LightEventColor2 = 0x2B,
    LightModeDefaultColor = 0x2C,
    LightModeDefaultColor2 = 0x2D,

    // Status
    /// IEEE address
    Address = 0x30,
    /// Flight mode, coordinate system, battery level
    State = 0x31,
    /// Roll/pitch/yaw angles
    Attitude = 0x32,
    GyroBias = 0x33,
    TrimAll = 0x34,
    TrimFlight = 0x35,
    TrimDrive = 0x36,
    CountFlight = 0x37,
    CountDrive = 0x38,

    // IR
    IrMessage = 0x40,

    // Sensors
    /// Raw IMU
    Imu = 0x50,
    Pressure = 0x51,
    ImageFlow = 0x52,
    Button = 0x53,
    Battery = 0x54,
    /// Motor control value and current
    Motor = 0x55,
    Temperature = 0x56,
    /// Bottom IR range sensor
    Range = 0x57,

    // Firmware update
    UpdateLookupTarget = 0x90,
    UpdateInformation = 0x91,
    Update = 0x92,
    UpdateLocationCorrect = 0x93,

    // Link board
    LinkState = 0xE0,
    LinkEvent = 0xE1,
    LinkEventAddress = 0xE2,
    LinkRssi = 0xE3,
    LinkDiscoveredDevice = 0xE4,
    LinkPasscode = 0xE5,

    /// Free-form string message
    Message = 0xF0,

    EndOfType = 0xFF,
}

impl DataType {
    /// Decode a type tag from its wire byte
    ///
    /// Returns `None` for tags outside the catalog.
    pub fn from_byte(byte: u8) -> Option<Self> {
        use DataType::*;

        let data_type = match byte {
            0x00 => None,
            0x01 => Ping,
            0x02 => Ack,
            0x03 => Error,
            0x04 => Request,
            0x05 => Passcode,
            0x10 => Control,
            0x11 => Command,
            0x12 => Command2,
            0x13 => Command3,
            0x20 => LightMode,
            0x21 => LightMode2,
            0x22 => LightModeCommand,
            0x23 => LightModeCommandIr,
            0x24 => LightModeColor,
            0x25 => LightModeColor2,
            0x26 => LightEvent,
            0x27 => LightEvent2,
            0x28 => LightEventCommand,
            0x29 => LightEventCommandIr,
            0x2A => LightEventColor,
            0x2B => LightEventColor2,
            0x2C => LightModeDefaultColor,
            0x2D => LightModeDefaultColor2,
            0x30 => Address,
            0x31 => State,
            0x32 => Attitude,
            0x33 => GyroBias,
            0x34 => TrimAll,
            0x35 => TrimFlight,
            0x36 => TrimDrive,
            0x37 => CountFlight,
            0x38 => CountDrive,
            0x40 => IrMessage,
            0x50 => Imu,
            0x51 => Pressure,
            0x52 => ImageFlow,
            0x53 => Button,
            0x54 => Battery,
            0x55 => Motor,
            0x56 => Temperature,
            0x57 => Range,
            0x90 => UpdateLookupTarget,
            0x91 => UpdateInformation,
            0x92 => Update,
            0x93 => UpdateLocationCorrect,
            0xE0 => LinkState,
            0xE1 => LinkEvent,
            0xE2 => LinkEventAddress,
            0xE3 => LinkRssi,
            0xE4 => LinkDiscoveredDevice,
            0xE5 => LinkPasscode,
            0xF0 => Message,
            0xFF => EndOfType,
            _ => return Option::None,
        };

        Some(data_type)
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for DataType {
    type Error = u8;

    // `Self::Error` would be ambiguous with the `DataType::Error` variant
    fn try_from(byte: u8) -> Result<Self, u8> {
        DataType::from_byte(byte).ok_or(byte)
    }
}

impl From<DataType> for u8 {
    fn from(data_type: DataType) -> Self {
        data_type.to_byte()
    }
}
