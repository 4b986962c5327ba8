//! Type-level wire colors.
//!
//! Every combinator, connector and wire carries a color marker. A
//! [`RedGreen`] value drives both a red and a green network and can be
//! projected onto either color with `.r()` / `.g()`.

use std::fmt;

use crate::WireColor;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Red {}
    impl Sealed for super::Green {}
    impl Sealed for super::RedGreen {}
}

/// Implemented by [`Red`], [`Green`] and [`RedGreen`] only.
pub trait Color: sealed::Sealed + Copy + Default + fmt::Debug + Send + Sync + 'static {
    const RED: bool;
    const GREEN: bool;

    /// Wire colors covered by this marker, red first.
    fn wire_colors() -> impl Iterator<Item = WireColor> {
        [
            Self::RED.then_some(WireColor::Red),
            Self::GREEN.then_some(WireColor::Green),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Red;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Green;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RedGreen;

impl Color for Red {
    const RED: bool = true;
    const GREEN: bool = false;
}

impl Color for Green {
    const RED: bool = false;
    const GREEN: bool = true;
}

impl Color for RedGreen {
    const RED: bool = true;
    const GREEN: bool = true;
}
