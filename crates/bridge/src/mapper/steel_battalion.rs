//! Steel Battalion cockpit mapping.
//!
//! Button words are rebuilt from lookup tables every tick. Word 2 carries
//! the toggle switches, which live in [`SlotModifiers::toggles`] so the
//! per-frame rebuild cannot clear them.
//!
//! | Table    | Source            | Applies when                       |
//! |----------|-------------------|------------------------------------|
//! | pad      | pad buttons       | always                             |
//! | chatpad  | chatpad keys      | always                             |
//! | toggle   | chatpad key edge  | always, XORs a sticky bit          |
//! | alt1     | chatpad keys      | messenger or back held             |
//! | alt2     | chatpad keys      | neither modifier nor orange held   |

use ogx_hid_xinput_protocol::canonical;
use ogx_hid_xinput_protocol::chatpad::{keys, modifiers};
use ogx_xid_device::steel_battalion::{lamps, w0, w1, w2, AIMING_MID, TUNER_MAX};
use ogx_xid_device::{SteelBattalionFeedback, SteelBattalionReport};

use super::SlotModifiers;
use crate::record::{DeviceRecord, Rumble};

/// Right-stick travel ignored by the aiming cursor.
pub const AIMING_DEADZONE: i32 = 7_500;

/// Aiming sensitivity divisors selectable with orange + 1..9.
pub const SENSITIVITIES: [u16; 9] = [1200, 1000, 800, 650, 400, 350, 300, 250, 200];

const AIM_MAX: i32 = u16::MAX as i32;

struct Mapping<S> {
    source: S,
    word: usize,
    mask: u16,
}

const fn on<S>(source: S, word: usize, mask: u16) -> Mapping<S> {
    Mapping { source, word, mask }
}

const PAD_MAP: [Mapping<u16>; 9] = [
    on(canonical::START, 0, w0::START),
    on(canonical::LEFT_SHOULDER, 0, w0::RIGHT_JOY_FIRE),
    on(canonical::RIGHT_THUMB, 0, w0::RIGHT_JOY_LOCK_ON),
    on(canonical::B, 0, w0::RIGHT_JOY_LOCK_ON),
    on(canonical::RIGHT_SHOULDER, 0, w0::RIGHT_JOY_MAIN_WEAPON),
    on(canonical::A, 0, w0::RIGHT_JOY_MAIN_WEAPON),
    on(canonical::GUIDE, 0, w0::EJECT),
    on(canonical::LEFT_THUMB, 2, w2::LEFT_JOY_SIGHT_CHANGE),
    on(canonical::Y, 1, w1::CHAFF),
];

const CHATPAD_MAP: [Mapping<u8>; 19] = [
    on(keys::KEY_0, 0, w0::EJECT),
    on(keys::D, 1, w1::WASHING),
    on(keys::F, 1, w1::EXTINGUISHER),
    on(keys::G, 1, w1::CHAFF),
    on(keys::X, 1, w1::WEAPON_CON_MAIN),
    on(keys::RIGHT, 1, w1::WEAPON_CON_MAIN),
    on(keys::C, 1, w1::WEAPON_CON_SUB),
    on(keys::LEFT, 1, w1::WEAPON_CON_SUB),
    on(keys::V, 1, w1::WEAPON_CON_MAGAZINE),
    on(keys::SPACE, 1, w1::WEAPON_CON_MAGAZINE),
    on(keys::U, 0, w0::MULTIMON_OPEN_CLOSE),
    on(keys::J, 0, w0::MULTIMON_MODE_SELECT),
    on(keys::N, 0, w0::MAIN_MONITOR_ZOOM_IN),
    on(keys::I, 0, w0::MULTIMON_MAP_ZOOM_IN_OUT),
    on(keys::K, 0, w0::MULTIMON_SUB_MONITOR),
    on(keys::M, 0, w0::MAIN_MONITOR_ZOOM_OUT),
    on(keys::ENTER, 0, w0::START),
    on(keys::P, 0, w0::COCKPIT_HATCH),
    on(keys::COMMA, 0, w0::IGNITION),
];

const ALT1_MAP: [Mapping<u8>; 5] = [
    on(keys::KEY_1, 1, w1::COMM1),
    on(keys::KEY_2, 1, w1::COMM2),
    on(keys::KEY_3, 1, w1::COMM3),
    on(keys::KEY_4, 1, w1::COMM4),
    on(keys::KEY_5, 2, w2::COMM5),
];

const ALT2_MAP: [Mapping<u8>; 9] = [
    on(keys::KEY_1, 1, w1::FUNCTION_F1),
    on(keys::KEY_2, 1, w1::FUNCTION_TANK_DETACH),
    on(keys::KEY_3, 0, w0::FUNCTION_FSS),
    on(keys::KEY_4, 1, w1::FUNCTION_F2),
    on(keys::KEY_5, 1, w1::FUNCTION_OVERRIDE),
    on(keys::KEY_6, 0, w0::FUNCTION_MANIPULATOR),
    on(keys::KEY_7, 1, w1::FUNCTION_F3),
    on(keys::KEY_8, 1, w1::FUNCTION_NIGHT_SCOPE),
    on(keys::KEY_9, 0, w0::FUNCTION_LINE_COLOR_CHANGE),
];

const TOGGLE_MAP: [(u8, u16); 5] = [
    (keys::Q, w2::TOGGLE_OXYGEN_SUPPLY),
    (keys::A, w2::TOGGLE_FILTER_CONTROL),
    (keys::W, w2::TOGGLE_VT_LOCATION),
    (keys::S, w2::TOGGLE_BUFFER_MATERIAL),
    (keys::Z, w2::TOGGLE_FUEL_FLOW_RATE),
];

/// Shared, non-slot inputs to the mapping.
pub(super) struct Context {
    pub(super) sensitivity: u16,
    pub(super) recenter_hold_ms: u64,
    pub(super) now_ms: u64,
}

fn apply_chatpad(record: &DeviceRecord, table: &[Mapping<u8>], words: &mut [u16; 3]) {
    for mapping in table.iter().filter(|m| record.is_chatpad_pressed(m.source)) {
        words[mapping.word] |= mapping.mask;
    }
}

fn axis_to_u16(value: i32) -> u16 {
    u16::try_from(value.clamp(0, AIM_MAX)).unwrap_or(u16::MAX)
}

/// Build the cockpit report. Returns the report and the sensitivity picked
/// on this tick, if it differs from the current one.
pub(super) fn map(
    record: &mut DeviceRecord,
    state: &mut SlotModifiers,
    feedback: &SteelBattalionFeedback,
    context: &Context,
) -> (SteelBattalionReport, Option<u16>) {
    let mut words = [0u16; 3];

    for mapping in PAD_MAP.iter().filter(|m| record.is_pressed(m.source)) {
        words[mapping.word] |= mapping.mask;
    }
    apply_chatpad(record, &CHATPAD_MAP, &mut words);
    for (code, mask) in TOGGLE_MAP {
        if record.was_chatpad_pressed(code) {
            state.toggles ^= mask;
        }
    }

    // The X button does whatever the lit lamps say the vehicle needs.
    if record.is_pressed(canonical::X) {
        if feedback.low(lamps::CHAFF_EXTINGUISHER) != 0 {
            words[1] |= w1::EXTINGUISHER;
        }
        if feedback.low(lamps::COMM1_MAGAZINE_CHANGE) != 0 {
            words[1] |= w1::WEAPON_CON_MAGAZINE;
        }
        if feedback.high(lamps::WASHING_LINE_COLOR_CHANGE) != 0 {
            words[1] |= w1::WASHING;
        }
    }

    let modifier_held =
        record.is_chatpad_pressed(modifiers::MESSENGER) || record.is_pressed(canonical::BACK);
    if modifier_held {
        apply_chatpad(record, &ALT1_MAP, &mut words);
        if record.was_pressed(canonical::DPAD_UP) || record.was_pressed(canonical::DPAD_RIGHT) {
            state.tuner = state.tuner.saturating_add(1).min(TUNER_MAX);
        }
        if record.was_pressed(canonical::DPAD_DOWN) || record.was_pressed(canonical::DPAD_LEFT) {
            state.tuner = state.tuner.saturating_sub(1);
        }
    } else if !record.is_chatpad_pressed(modifiers::ORANGE) {
        apply_chatpad(record, &ALT2_MAP, &mut words);
        // No shifting while the lever is being rotated.
        if !record.is_pressed(canonical::DPAD_LEFT | canonical::DPAD_RIGHT) {
            if record.was_pressed(canonical::DPAD_UP) {
                state.gear = state.gear.shift_up();
            }
            if record.was_pressed(canonical::DPAD_DOWN) {
                state.gear = state.gear.shift_down();
            }
        }
    }

    if record.was_chatpad_pressed(modifiers::SHIFT) {
        state.toggles ^= w2::TOGGLE_MASK;
    }
    state.toggles &= w2::TOGGLE_MASK;
    words[2] |= state.toggles;

    let pad = record.pad;
    let rotation_lever = if modifier_held {
        0
    } else if pad.is_pressed(canonical::DPAD_LEFT) {
        i16::MIN
    } else if pad.is_pressed(canonical::DPAD_RIGHT) {
        i16::MAX
    } else {
        0
    };

    let divisor = i32::from(context.sensitivity.max(1));
    let rx = i32::from(pad.right_stick_x);
    if rx.abs() > AIMING_DEADZONE {
        state.aim_x += rx / divisor;
    }
    let ry = i32::from(pad.right_stick_y);
    if ry.abs() > AIMING_DEADZONE {
        state.aim_y -= ry / divisor;
    }
    state.aim_x = state.aim_x.clamp(0, AIM_MAX);
    state.aim_y = state.aim_y.clamp(0, AIM_MAX);

    if pad.is_pressed(canonical::LEFT_THUMB) {
        if context.now_ms.saturating_sub(state.hold_started_ms) > context.recenter_hold_ms {
            state.aim_x = i32::from(AIMING_MID);
            state.aim_y = i32::from(AIMING_MID);
        }
    } else {
        state.hold_started_ms = context.now_ms;
    }

    let mut report = SteelBattalionReport {
        buttons: words,
        aiming_x: axis_to_u16(state.aim_x),
        aiming_y: axis_to_u16(state.aim_y),
        rotation_lever,
        sight_change_x: pad.left_stick_x,
        sight_change_y: !pad.left_stick_y,
        left_pedal: u16::from(pad.left_trigger) << 8,
        middle_pedal: if record.is_chatpad_pressed(keys::BACK) { 0xFF00 } else { 0 },
        right_pedal: u16::from(pad.right_trigger) << 8,
        tuner_dial: state.tuner,
        gear_lever: state.gear,
    };

    let chaff = feedback.lamp_pair(lamps::CHAFF_EXTINGUISHER);
    let level = chaff
        | chaff << 4
        | feedback.lamp_pair(lamps::COMM1_MAGAZINE_CHANGE) << 4
        | feedback.lamp_pair(lamps::COCKPIT_HATCH_EMERGENCY_EJECT) << 4;
    record.rumble_requested = Rumble {
        left: level,
        right: level,
    };

    let mut selected = None;
    if record.is_chatpad_pressed(modifiers::ORANGE) {
        for (key, value) in keys::DIGITS_1_TO_9.into_iter().zip(SENSITIVITIES) {
            if record.was_chatpad_pressed(key) {
                if value != context.sensitivity {
                    selected = Some(value);
                }
                break;
            }
        }
    }

    // Ignition with the hatch open or a live cursor resets some consoles.
    if report.buttons[0] & w0::IGNITION != 0 {
        report.aiming_x = 0;
        report.aiming_y = 0;
        report.buttons[0] &= !w0::COCKPIT_HATCH;
    }

    (report, selected)
}
