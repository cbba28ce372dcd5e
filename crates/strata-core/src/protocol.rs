//! Relay wire format.
//!
//! Messages are JSON objects tagged by `type`. The relay server only reads
//! `join`; `draw` payloads are forwarded to the other peers of the room.

use crate::raster::SerializableColor;
use crate::stroke::StrokeSegment;
use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// One stroke segment as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawMessage {
    pub prev: Point,
    pub curr: Point,
    /// CSS color string.
    pub color: String,
    pub size: f64,
    #[serde(default)]
    pub tool: ToolKind,
}

impl DrawMessage {
    pub fn from_segment(segment: &StrokeSegment) -> Self {
        Self {
            prev: segment.from,
            curr: segment.to,
            color: segment.color.to_hex(),
            size: segment.width,
            tool: segment.tool,
        }
    }

    /// Convert back into a segment. `None` for unparsable colors or
    /// unusable sizes.
    pub fn to_segment(&self) -> Option<StrokeSegment> {
        if !self.size.is_finite() || self.size <= 0.0 || !self.prev.is_finite() || !self.curr.is_finite() {
            return None;
        }
        let color = SerializableColor::parse(&self.color)?;
        Some(StrokeSegment {
            from: self.prev,
            to: self.curr,
            color,
            width: self.size,
            tool: self.tool,
        })
    }
}

/// Client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { room: String, name: String },
    Draw(DrawMessage),
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent to a client once it has joined; lists everyone in the room.
    Joined { players: Vec<String> },
    Draw(DrawMessage),
    Leave { name: String },
    Error { text: String },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
