//! Snapshot tests for encoded host commands.

use insta::assert_snapshot;
use ogx_hid_xinput_protocol::output::wireless;
use ogx_hid_xinput_protocol::{
    BringUpStep, CHATPAD_LEDS, HostCommand, ProtocolFamily, bring_up_sequence,
    chatpad_led_command, led_command, rumble_command,
};

fn hex(cmd: Option<HostCommand>) -> String {
    match cmd {
        Some(cmd) => cmd
            .as_bytes()
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" "),
        None => "none".to_string(),
    }
}

fn steps(steps: &[BringUpStep]) -> String {
    steps
        .iter()
        .map(|step| match step {
            BringUpStep::Interrupt(cmd) => hex(Some(*cmd)),
            BringUpStep::SetBootProtocol { interface } => format!("boot({interface})"),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

// ── Rumble ───────────────────────────────────────────────────────────────────

#[test]
fn test_snapshot_rumble_original_xbox() {
    assert_snapshot!(hex(rumble_command(ProtocolFamily::OriginalXbox, 0x40, 0x80)), @"00 06 40 40 80 80");
}

#[test]
fn test_snapshot_rumble_wired() {
    assert_snapshot!(hex(rumble_command(ProtocolFamily::Xbox360Wired, 0xFF, 0x10)), @"00 08 00 FF 10 00 00 00");
}

#[test]
fn test_snapshot_rumble_wireless() {
    assert_snapshot!(hex(rumble_command(ProtocolFamily::Xbox360Wireless, 0x12, 0x34)), @"00 01 0F C0 00 12 34 00 00 00 00 00");
}

#[test]
fn test_snapshot_rumble_xbox_one() {
    assert_snapshot!(hex(rumble_command(ProtocolFamily::XboxOne, 0x82, 0x00)), @"09 00 00 09 00 0F 00 00 32 00 FF 00 EB");
}

#[test]
fn test_snapshot_rumble_mouse() {
    assert_snapshot!(hex(rumble_command(ProtocolFamily::Mouse, 0xFF, 0xFF)), @"none");
}

// ── LEDs ─────────────────────────────────────────────────────────────────────

#[test]
fn test_snapshot_led_wired_player_one() {
    assert_snapshot!(hex(led_command(ProtocolFamily::Xbox360Wired, 1)), @"01 03 06");
}

#[test]
fn test_snapshot_led_wireless_player_four() {
    assert_snapshot!(hex(led_command(ProtocolFamily::Xbox360Wireless, 4)), @"00 00 08 49");
}

#[test]
fn test_snapshot_chatpad_orange_on() {
    assert_snapshot!(hex(Some(chatpad_led_command(CHATPAD_LEDS[2], true))), @"00 00 0C 0A");
}

// ── Wireless control packets ─────────────────────────────────────────────────

#[test]
fn test_snapshot_wireless_keepalive_cycle() {
    let cycle = [
        wireless::inquire_present(),
        wireless::controller_info(),
        wireless::chatpad_keepalive(false),
        wireless::chatpad_keepalive(true),
    ];
    let text = cycle
        .iter()
        .map(|cmd| hex(Some(*cmd)))
        .collect::<Vec<_>>()
        .join(" | ");
    assert_snapshot!(text, @"08 00 0F C0 | 00 00 00 40 | 00 00 0C 1F | 00 00 0C 1E");
}

// ── Bring-up sequences ───────────────────────────────────────────────────────

#[test]
fn test_snapshot_bring_up_wired_slot_two() {
    assert_snapshot!(steps(&bring_up_sequence(ProtocolFamily::Xbox360Wired, 0x045E, 0x028E, 0, 2)), @"01 03 04");
}

#[test]
fn test_snapshot_bring_up_wireless() {
    assert_snapshot!(steps(&bring_up_sequence(ProtocolFamily::Xbox360Wireless, 0x045E, 0x0719, 0, 0)), @"00 00 00 40 | 00 00 02 80 | 00 00 08 01");
}

#[test]
fn test_snapshot_bring_up_xbox_series() {
    assert_snapshot!(steps(&bring_up_sequence(ProtocolFamily::XboxOne, 0x045E, 0x0B00, 0, 0)), @"05 20 03 01 00 | 05 20 00 0F 06");
}

#[test]
fn test_snapshot_bring_up_power_a() {
    assert_snapshot!(steps(&bring_up_sequence(ProtocolFamily::XboxOne, 0x24C6, 0x543A, 0, 1)), @"05 20 03 01 00 | 09 00 00 09 00 0F 00 00 1D 1D FF 00 00 | 09 00 00 09 00 0F 00 00 00 00 00 00 00");
}

#[test]
fn test_snapshot_bring_up_mouse() {
    assert_snapshot!(steps(&bring_up_sequence(ProtocolFamily::Mouse, 0x046D, 0xC077, 0, 3)), @"boot(0)");
}
