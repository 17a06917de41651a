//! Standard controller mapping.

use ogx_hid_xinput_protocol::canonical;
use ogx_hid_xinput_protocol::chatpad::modifiers;
use ogx_xid_device::{duke, DukeFeedback, DukeReport};

use super::SlotModifiers;
use crate::record::{DeviceRecord, Rumble};

const DIGITAL: [(u16, u16); 8] = [
    (canonical::DPAD_UP, duke::DPAD_UP),
    (canonical::DPAD_DOWN, duke::DPAD_DOWN),
    (canonical::DPAD_LEFT, duke::DPAD_LEFT),
    (canonical::DPAD_RIGHT, duke::DPAD_RIGHT),
    (canonical::START, duke::START),
    (canonical::BACK, duke::BACK),
    (canonical::LEFT_THUMB, duke::LEFT_THUMB),
    (canonical::RIGHT_THUMB, duke::RIGHT_THUMB),
];

fn analog(pressed: bool) -> u8 {
    if pressed { 0xFF } else { 0x00 }
}

pub(super) fn map(
    record: &mut DeviceRecord,
    state: &mut SlotModifiers,
    feedback: DukeFeedback,
) -> DukeReport {
    let pad = record.pad;
    let buttons = DIGITAL
        .iter()
        .filter(|(source, _)| pad.is_pressed(*source))
        .fold(0u16, |acc, (_, target)| acc | target);

    let mut report = DukeReport {
        buttons,
        a: analog(pad.is_pressed(canonical::A)),
        b: analog(pad.is_pressed(canonical::B)),
        x: analog(pad.is_pressed(canonical::X)),
        y: analog(pad.is_pressed(canonical::Y)),
        black: analog(pad.is_pressed(canonical::RIGHT_SHOULDER)),
        white: analog(pad.is_pressed(canonical::LEFT_SHOULDER)),
        left_trigger: pad.left_trigger,
        right_trigger: pad.right_trigger,
        left_stick_x: pad.left_stick_x,
        left_stick_y: pad.left_stick_y,
        right_stick_x: pad.right_stick_x,
        right_stick_y: pad.right_stick_y,
    };

    record.chatpad_led_requested = modifiers::GREEN;
    // Only the left motor byte is honoured; both pad motors follow it.
    let level = feedback.left_motor.to_be_bytes()[0];
    record.rumble_requested = Rumble {
        left: level,
        right: level,
    };

    // Bitwise NOT is -v - 1, which maps i16::MIN onto i16::MAX.
    if state.invert_right_y {
        report.right_stick_y = !pad.right_stick_y;
    }
    if state.invert_right_x {
        report.right_stick_x = !pad.right_stick_x;
    }

    if record.is_pressed(canonical::RIGHT_THUMB) {
        if record.was_pressed(canonical::DPAD_UP) || record.was_pressed(canonical::DPAD_DOWN) {
            state.invert_right_y = !state.invert_right_y;
        }
        if record.was_pressed(canonical::DPAD_RIGHT) || record.was_pressed(canonical::DPAD_LEFT) {
            state.invert_right_x = !state.invert_right_x;
        }
    }

    report
}
