//! European wheel topology and number characteristics.
//!
//! Everything here is a pure function of the winning number: physical
//! adjacency on the rim, diametric mirrors, colors, call-bet sections,
//! table layout (dozens and columns), and the characteristic sets used
//! by rule evaluation.

use crate::types::{Color, Parity, Section};

// ---------------------------------------------------------------------------
// Physical layout
// ---------------------------------------------------------------------------

/// Clockwise pocket order of a single-zero wheel, starting at 0.
pub const WHEEL_ORDER: [u8; 37] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5,
    24, 16, 33, 1, 20, 14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

/// Red pockets. The remaining non-zero pockets are black.
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Voisins du Zéro: the 17 pockets around zero.
pub const VOISINS: [u8; 17] = [
    22, 18, 29, 7, 28, 12, 35, 3, 26, 0, 32, 15, 19, 4, 21, 2, 25,
];

/// Orphelins: the two orphan arcs.
pub const ORPHELINS: [u8; 8] = [1, 20, 14, 31, 9, 17, 34, 6];

/// Tiers du Cylindre: the 12 pockets opposite zero.
pub const TIERS: [u8; 12] = [27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33];

// Reverse lookup: number -> rim position. Built once at compile time.
const WHEEL_POSITION: [u8; 37] = build_position_table();

const fn build_position_table() -> [u8; 37] {
    let mut table = [0u8; 37];
    let mut i = 0;
    while i < 37 {
        table[WHEEL_ORDER[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Rim position of a number (0 for the zero pocket). None if out of range.
pub fn position(number: u8) -> Option<usize> {
    if number > 36 {
        return None;
    }
    Some(WHEEL_POSITION[number as usize] as usize)
}

/// Physical neighbors within `distance` pockets on each side, in rim order,
/// excluding the number itself. Returns 2 * distance numbers.
pub fn neighbors(number: u8, distance: usize) -> Vec<u8> {
    let Some(pos) = position(number) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(distance * 2);
    for offset in 1..=distance.min(18) {
        out.push(WHEEL_ORDER[(pos + 37 - offset) % 37]);
        out.push(WHEEL_ORDER[(pos + offset) % 37]);
    }
    out
}

/// Diametrically opposite pocket: 18 positions away on the rim.
pub fn mirror(number: u8) -> Option<u8> {
    let pos = position(number)?;
    Some(WHEEL_ORDER[(pos + 18) % 37])
}

// ---------------------------------------------------------------------------
// Characteristics
// ---------------------------------------------------------------------------

pub fn is_red(number: u8) -> bool {
    RED_NUMBERS.contains(&number)
}

pub fn color(number: u8) -> Color {
    if number == 0 {
        Color::Green
    } else if is_red(number) {
        Color::Red
    } else {
        Color::Black
    }
}

/// Dozen 1-3 by table layout. None for zero.
pub fn dozen(number: u8) -> Option<u8> {
    match number {
        0 => None,
        1..=12 => Some(1),
        13..=24 => Some(2),
        _ => Some(3),
    }
}

/// Table column 1-3. None for zero.
pub fn column(number: u8) -> Option<u8> {
    if number == 0 || number > 36 {
        None
    } else {
        Some((number - 1) % 3 + 1)
    }
}

/// Even/odd parity. None for zero.
pub fn parity(number: u8) -> Option<Parity> {
    if number == 0 {
        None
    } else if number % 2 == 0 {
        Some(Parity::Even)
    } else {
        Some(Parity::Odd)
    }
}

/// High (19-36) or low (1-18). None for zero.
pub fn is_high(number: u8) -> Option<bool> {
    if number == 0 {
        None
    } else {
        Some(number >= 19)
    }
}

/// Coarse call-bet section of a number.
pub fn section(number: u8) -> Section {
    if number == 0 {
        Section::Zero
    } else if VOISINS.contains(&number) {
        Section::Voisins
    } else if ORPHELINS.contains(&number) {
        Section::Orphelins
    } else {
        Section::Tiers
    }
}

/// Members of a coarse section.
pub fn section_numbers(s: Section) -> &'static [u8] {
    match s {
        Section::Zero => &[0],
        Section::Voisins => &VOISINS,
        Section::Orphelins => &ORPHELINS,
        Section::Tiers => &TIERS,
    }
}

/// Numeric decade sector: 0 = 0-9, 1 = 10-19, 2 = 20-29, 3 = 30-36.
pub fn numeric_sector(number: u8) -> u8 {
    (number / 10).min(3)
}

// ---------------------------------------------------------------------------
// Characteristic sets
// ---------------------------------------------------------------------------

const ALL_RED: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

const ALL_BLACK: [u8; 18] = [
    2, 4, 6, 8, 10, 11, 13, 15, 17, 20, 22, 24, 26, 28, 29, 31, 33, 35,
];

const ALL_EVEN: [u8; 18] = [
    2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 26, 28, 30, 32, 34, 36,
];

const ALL_ODD: [u8; 18] = [
    1, 3, 5, 7, 9, 11, 13, 15, 17, 19, 21, 23, 25, 27, 29, 31, 33, 35,
];

/// Numbers of the opposite color, ascending. Zero maps to the red set.
pub fn opposite_color_numbers(number: u8) -> &'static [u8] {
    match color(number) {
        Color::Red => &ALL_BLACK,
        Color::Black => &ALL_RED,
        Color::Green => &ALL_RED,
    }
}

/// Numbers of the opposite parity, ascending. Zero maps to the even set.
pub fn opposite_parity_numbers(number: u8) -> &'static [u8] {
    match parity(number) {
        Some(Parity::Even) => &ALL_ODD,
        Some(Parity::Odd) => &ALL_EVEN,
        None => &ALL_EVEN,
    }
}

/// Members of a dozen (1-3), ascending. Empty for anything else.
pub fn dozen_numbers(d: u8) -> Vec<u8> {
    match d {
        1 => (1..=12).collect(),
        2 => (13..=24).collect(),
        3 => (25..=36).collect(),
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
