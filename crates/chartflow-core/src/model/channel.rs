//! Encoding channels

use serde::{Deserialize, Serialize};
use std::fmt;

/// An encoding channel.
///
/// The declaration order doubles as the iteration order of an encoding map,
/// which fixes the order of generated transform steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    X,
    Y,
    X2,
    Y2,
    Row,
    Column,
    Color,
    Opacity,
    Size,
    Shape,
    Text,
    Tooltip,
    Detail,
    Order,
}

impl Channel {
    /// Channel name as it appears in specs
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::X2 => "x2",
            Channel::Y2 => "y2",
            Channel::Row => "row",
            Channel::Column => "column",
            Channel::Color => "color",
            Channel::Opacity => "opacity",
            Channel::Size => "size",
            Channel::Shape => "shape",
            Channel::Text => "text",
            Channel::Tooltip => "tooltip",
            Channel::Detail => "detail",
            Channel::Order => "order",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
