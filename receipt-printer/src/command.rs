//! Buffered printer commands
//!
//! A [`Command`] is an inert description of one printer call. Nothing
//! touches the device until [`Command::apply`] replays it through a
//! [`ConnectionManager`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::connection::ConnectionManager;
use crate::device::PrinterDevice;
use crate::error::PrintError;

/// Lines fed before cutting
pub const DEFAULT_CUT_FEED: u8 = 2;

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Justify {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Justify {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(PrintError::InvalidArgument(format!(
                "Invalid side: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Justify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

/// One deferred printer operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        justify: Option<Justify>,
    },
    Feed {
        lines: u8,
    },
    /// Horizontal rule of the printer's fill character
    Line,
    Justify {
        side: Justify,
    },
    Cut {
        feed: u8,
    },
    SetTextSize {
        width: u8,
        height: u8,
    },
}

impl Command {
    /// Replay this command on the printer
    pub async fn apply<D: PrinterDevice>(&self, printer: &mut ConnectionManager<D>) {
        match self {
            Self::Text { text, justify } => printer.print(text, *justify).await,
            Self::Feed { lines } => printer.feed(*lines).await,
            Self::Line => printer.print_fill_line(None).await,
            Self::Justify { side } => printer.justify(*side).await,
            Self::Cut { feed } => printer.cut(*feed).await,
            Self::SetTextSize { width, height } => printer.set_text_size(*width, *height).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_justify_from_str() {
        assert_eq!("center".parse::<Justify>().unwrap(), Justify::Center);
        assert_eq!(Justify::Right.to_string(), "right");
    }

    #[test]
    fn test_invalid_side_is_invalid_argument() {
        let err = "middle".parse::<Justify>().unwrap_err();
        assert!(matches!(err, PrintError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "Invalid argument: Invalid side: middle");
    }

    #[test]
    fn test_command_json_shape() {
        let cmd = Command::Text {
            text: "Total".into(),
            justify: Some(Justify::Right),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"op":"text","text":"Total","justify":"right"}"#);

        let back: Command = serde_json::from_str(r#"{"op":"set_text_size","width":2,"height":1}"#)
            .unwrap();
        assert_eq!(
            back,
            Command::SetTextSize {
                width: 2,
                height: 1
            }
        );
    }
}
