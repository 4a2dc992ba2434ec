// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge colors, which assign edges to the channels of a multi-channel distance field.

use core::fmt;
use core::ops::{BitAnd, BitOr, BitXor, Not};

/// A set of the red, green and blue channels an edge contributes to.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeColor(u8);

impl EdgeColor {
    /// No channel.
    pub const BLACK: Self = Self(0);
    /// The red channel.
    pub const RED: Self = Self(1);
    /// The green channel.
    pub const GREEN: Self = Self(2);
    /// The red and green channels.
    pub const YELLOW: Self = Self(3);
    /// The blue channel.
    pub const BLUE: Self = Self(4);
    /// The red and blue channels.
    pub const MAGENTA: Self = Self(5);
    /// The green and blue channels.
    pub const CYAN: Self = Self(6);
    /// All three channels.
    pub const WHITE: Self = Self(7);

    /// Create a color from its bit representation, ignoring bits above the blue channel.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 7)
    }

    /// The bit representation of the color.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every channel of `other` is part of this color.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether this color and `other` share at least one channel.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether the color contains at most one channel.
    pub const fn is_single_channel(self) -> bool {
        self.0 & self.0.wrapping_sub(1) == 0
    }

    /// Whether the edge contributes to the channel with the given index (0 = red).
    pub const fn has_channel(self, channel: usize) -> bool {
        channel < 3 && self.0 & (1 << channel) != 0
    }
}

impl Default for EdgeColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Debug for EdgeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::BLACK => "BLACK",
            Self::RED => "RED",
            Self::GREEN => "GREEN",
            Self::YELLOW => "YELLOW",
            Self::BLUE => "BLUE",
            Self::MAGENTA => "MAGENTA",
            Self::CYAN => "CYAN",
            _ => "WHITE",
        };
        write!(f, "EdgeColor::{name}")
    }
}

impl BitAnd for EdgeColor {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for EdgeColor {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitXor for EdgeColor {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Not for EdgeColor {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0 & 7)
    }
}
