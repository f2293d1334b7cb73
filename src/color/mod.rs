//! Packed-color codec for the serial wire format.
//!
//! The device takes colors as a single unsigned integer, rendered in
//! decimal: `(r << 16) | (g << 8) | b`. Reports coming back from the
//! device may carry a fourth "white" channel in the top byte. The
//! value zero is reserved to mean "no color" and is never a real color.

use std::fmt;

/// A 24-bit RGB color in the device's packed wire layout.
///
/// The white byte of an RGBW report is not kept here; only the color
/// channels cross the bridge boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedColor(u32);

impl PackedColor {
    /// Pack three 8-bit channels.
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> PackedColor {
        PackedColor(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// Take a raw wire value, keeping only the low 24 color bits.
    pub fn from_wire(value: u32) -> PackedColor {
        PackedColor(value & 0x00ff_ffff)
    }

    pub fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(&self) -> u8 {
        self.0 as u8
    }

    /// True for the reserved all-zero value ("no color", not black).
    pub fn is_blank(&self) -> bool {
        self.0 == 0
    }
}

/// The wire form: the packed value in decimal.
impl fmt::Display for PackedColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split a raw device report into (red, green, blue, white) channels.
pub fn split_rgbw(value: u32) -> (u8, u8, u8, u8) {
    (
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
        (value >> 24) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_channels_in_rgb_order() {
        let color = PackedColor::from_rgb(0x12, 0x34, 0x56);
        assert_eq!(color.to_string(), format!("{}", 0x123456));
    }

    #[test]
    fn round_trips_all_channel_extremes() {
        for &r in &[0u8, 1, 85, 170, 254, 255] {
            for &g in &[0u8, 1, 85, 170, 254, 255] {
                for &b in &[0u8, 1, 85, 170, 254, 255] {
                    let packed = PackedColor::from_rgb(r, g, b);
                    let wire: u32 = packed.to_string().parse().unwrap();
                    let back = PackedColor::from_wire(wire);
                    assert_eq!((back.red(), back.green(), back.blue()), (r, g, b));
                }
            }
        }
    }

    #[test]
    fn from_wire_drops_the_white_byte() {
        let color = PackedColor::from_wire(0xff_10_20_30);
        assert_eq!((color.red(), color.green(), color.blue()), (0x10, 0x20, 0x30));
        assert_eq!(color, PackedColor::from_rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn split_rgbw_extracts_all_four_channels() {
        assert_eq!(split_rgbw(16777215), (255, 255, 255, 0));
        assert_eq!(split_rgbw(0xc8_0a_14_1e), (10, 20, 30, 200));
    }

    #[test]
    fn zero_is_blank() {
        assert!(PackedColor::from_wire(0).is_blank());
        assert!(PackedColor::from_rgb(0, 0, 0).is_blank());
        assert!(!PackedColor::from_rgb(0, 0, 1).is_blank());
        // A pure-white report has no RGB bits left after masking.
        assert!(PackedColor::from_wire(0x01_00_00_00).is_blank());
    }
}
