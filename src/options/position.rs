//! Symbolic dialog positions and the window anchors they map to

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Position names understood by the dialog library's `position` option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    Top,
    TopStart,
    TopEnd,
    Center,
    CenterStart,
    CenterEnd,
    Bottom,
    BottomStart,
    BottomEnd,
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Position::Top),
            "top-start" => Ok(Position::TopStart),
            "top-end" => Ok(Position::TopEnd),
            "center" => Ok(Position::Center),
            "center-start" => Ok(Position::CenterStart),
            "center-end" => Ok(Position::CenterEnd),
            "bottom" => Ok(Position::Bottom),
            "bottom-start" => Ok(Position::BottomStart),
            "bottom-end" => Ok(Position::BottomEnd),
            other => Err(format!("unknown position: {}", other)),
        }
    }
}

/// Where a window is pinned on its work area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    LeftCenter,
    #[default]
    Center,
    RightCenter,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl From<Position> for Anchor {
    fn from(position: Position) -> Self {
        match position {
            Position::Top => Anchor::TopCenter,
            Position::TopStart => Anchor::TopLeft,
            Position::TopEnd => Anchor::TopRight,
            Position::Center => Anchor::Center,
            Position::CenterStart => Anchor::LeftCenter,
            Position::CenterEnd => Anchor::RightCenter,
            Position::Bottom => Anchor::BottomCenter,
            Position::BottomStart => Anchor::BottomLeft,
            Position::BottomEnd => Anchor::BottomRight,
        }
    }
}

/// Screen rectangle available to windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkArea {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Anchor {
    /// Map a symbolic position; anything unrecognized lands in the center
    pub fn from_symbolic(position: &str) -> Self {
        position.parse::<Position>().map(Anchor::from).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "topLeft",
            Anchor::TopCenter => "topCenter",
            Anchor::TopRight => "topRight",
            Anchor::LeftCenter => "leftCenter",
            Anchor::Center => "center",
            Anchor::RightCenter => "rightCenter",
            Anchor::BottomLeft => "bottomLeft",
            Anchor::BottomCenter => "bottomCenter",
            Anchor::BottomRight => "bottomRight",
        }
    }

    /// Top-left corner for a `width` x `height` window pinned at this anchor
    pub fn origin(&self, area: WorkArea, width: u32, height: u32) -> (i32, i32) {
        let free_x = area.width as i32 - width as i32;
        let free_y = area.height as i32 - height as i32;

        let x = match self {
            Anchor::TopLeft | Anchor::LeftCenter | Anchor::BottomLeft => area.x,
            Anchor::TopCenter | Anchor::Center | Anchor::BottomCenter => area.x + free_x / 2,
            Anchor::TopRight | Anchor::RightCenter | Anchor::BottomRight => area.x + free_x,
        };
        let y = match self {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => area.y,
            Anchor::LeftCenter | Anchor::Center | Anchor::RightCenter => area.y + free_y / 2,
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => area.y + free_y,
        };
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbolic_mapping() {
        assert_eq!(Anchor::from_symbolic("top-start"), Anchor::TopLeft);
        assert_eq!(Anchor::from_symbolic("bottom-end"), Anchor::BottomRight);
        assert_eq!(Anchor::from_symbolic("center-start"), Anchor::LeftCenter);
        assert_eq!(Anchor::from_symbolic("top"), Anchor::TopCenter);
    }

    #[test]
    fn test_unknown_position_falls_back_to_center() {
        assert_eq!(Anchor::from_symbolic("middle-ish"), Anchor::Center);
        assert_eq!(Anchor::from_symbolic(""), Anchor::Center);
    }

    #[test]
    fn test_origin() {
        let area = WorkArea { x: 0, y: 20, width: 1000, height: 800 };
        assert_eq!(Anchor::TopLeft.origin(area, 200, 100), (0, 20));
        assert_eq!(Anchor::Center.origin(area, 200, 100), (400, 370));
        assert_eq!(Anchor::BottomRight.origin(area, 200, 100), (800, 720));
        assert_eq!(Anchor::TopCenter.origin(area, 200, 100), (400, 20));
    }
}
