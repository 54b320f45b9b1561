//! Shared plot palette.
//!
//! Two cycles: `primary` for data series, `shadow` for the matching
//! shaded bands and overlays. Index i of one cycle pairs with index i of
//! the other.

use plotters::style::RGBColor;

const PRIMARY: [RGBColor; 6] = [
    RGBColor(0x34, 0x49, 0x5e), // slate
    RGBColor(0xe7, 0x4c, 0x3c), // red
    RGBColor(0x27, 0xae, 0x60), // green
    RGBColor(0x29, 0x80, 0xb9), // blue
    RGBColor(0x8e, 0x44, 0xad), // purple
    RGBColor(0xf3, 0x9c, 0x12), // orange
];

const SHADOW: [RGBColor; 6] = [
    RGBColor(0x95, 0xa5, 0xa6),
    RGBColor(0xf1, 0x94, 0x8a),
    RGBColor(0x7d, 0xce, 0xa0),
    RGBColor(0x85, 0xc1, 0xe9),
    RGBColor(0xbb, 0x8f, 0xce),
    RGBColor(0xf8, 0xc4, 0x71),
];

/// Color for the i-th data series; cycles past the palette end.
pub fn primary(i: usize) -> RGBColor {
    PRIMARY[i % PRIMARY.len()]
}

/// Muted companion of [`primary`]`(i)`, for bands and reference curves.
pub fn shadow(i: usize) -> RGBColor {
    SHADOW[i % SHADOW.len()]
}
