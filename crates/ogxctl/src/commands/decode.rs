//! `ogxctl decode`: one raw report to canonical pad state.

use anyhow::{Result, bail};
use ogx_hid_xinput_protocol::{decode_report, ChatpadEvent, InputFrame, PadState, Presence, ProtocolFamily};
use serde::Serialize;

use super::Format;
use crate::capture::parse_hex_bytes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PadView {
    pub buttons: String,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_stick: (i16, i16),
    pub right_stick: (i16, i16),
}

impl From<PadState> for PadView {
    fn from(pad: PadState) -> Self {
        Self {
            buttons: format!("0x{:04X}", pad.buttons),
            left_trigger: pad.left_trigger,
            right_trigger: pad.right_trigger,
            left_stick: (pad.left_stick_x, pad.left_stick_y),
            right_stick: (pad.right_stick_x, pad.right_stick_y),
        }
    }
}

/// What a report decoded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Decoded {
    Pad(PadView),
    LedEcho { quadrant: u8 },
    RumbleEcho { left: u8, right: u8 },
    Wireless {
        presence: Option<String>,
        chatpad_reinit: bool,
        pad: Option<PadView>,
        chatpad: Option<String>,
    },
    Inert,
}

pub fn decode(family: ProtocolFamily, data: &[u8]) -> Result<Decoded> {
    let Some(frame) = decode_report(family, data) else {
        bail!("{family} does not recognize this {}-byte report", data.len());
    };
    Ok(match frame {
        InputFrame::Pad(pad) => Decoded::Pad(pad.into()),
        InputFrame::LedEcho(quadrant) => Decoded::LedEcho { quadrant },
        InputFrame::RumbleEcho { left, right } => Decoded::RumbleEcho { left, right },
        InputFrame::Wireless(frame) => Decoded::Wireless {
            presence: frame.presence.map(|p| match p {
                Presence::Connected => "connected".to_string(),
                Presence::Disconnected => "disconnected".to_string(),
            }),
            chatpad_reinit: frame.chatpad_reinit,
            pad: frame.pad.map(PadView::from),
            chatpad: frame.chatpad.map(|event| match event {
                ChatpadEvent::Keys([modifiers, first, second]) => {
                    format!("keys modifiers=0x{modifiers:02X} {first} {second}")
                }
                ChatpadEvent::ReinitRequired => "reinit-required".to_string(),
                ChatpadEvent::LedEcho(leds) => format!("led-echo 0x{leds:02X}"),
            }),
        },
        InputFrame::Inert => Decoded::Inert,
    })
}

pub fn run(family: ProtocolFamily, hex: &str, format: Format) -> Result<()> {
    let data = parse_hex_bytes(hex)?;
    let decoded = decode(family, &data)?;
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&decoded)?),
        Format::Text => println!("{decoded:?}"),
    }
    Ok(())
}
