//! Property tests: malformed input is inert, valid frames decode completely.

use ogx_hid_xinput_protocol::buttons::{self, canonical};
use ogx_hid_xinput_protocol::{ChatpadState, InputFrame, ProtocolFamily, decode_report};
use proptest::prelude::*;

fn any_family() -> impl Strategy<Value = ProtocolFamily> {
    prop_oneof![
        Just(ProtocolFamily::OriginalXbox),
        Just(ProtocolFamily::Xbox360Wired),
        Just(ProtocolFamily::Xbox360Wireless),
        Just(ProtocolFamily::XboxOne),
        Just(ProtocolFamily::Keyboard),
        Just(ProtocolFamily::Mouse),
        Just(ProtocolFamily::IdleInterface),
        Just(ProtocolFamily::Unknown),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_decode_never_panics(
        family in any_family(),
        data in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        if let Some(frame) = decode_report(family, &data) {
            prop_assert!(family != ProtocolFamily::Unknown, "unknown family decoded {:?}", frame);
        }
    }

    #[test]
    fn prop_original_xbox_requires_length_marker(
        mut data in proptest::collection::vec(any::<u8>(), 0..32),
        marker in any::<u8>().prop_filter("not 0x14", |m| *m != 0x14),
    ) {
        if let Some(byte) = data.get_mut(1) {
            *byte = marker;
        }
        prop_assert_eq!(decode_report(ProtocolFamily::OriginalXbox, &data), None);
    }

    #[test]
    fn prop_wired_unknown_leading_byte_is_rejected(
        lead in any::<u8>().prop_filter("not a wired shape", |b| ![0x00, 0x01, 0x03].contains(b)),
        rest in proptest::collection::vec(any::<u8>(), 0..31),
    ) {
        let mut data = vec![lead];
        data.extend(rest);
        prop_assert_eq!(decode_report(ProtocolFamily::Xbox360Wired, &data), None);
    }

    #[test]
    fn prop_xbox_one_requires_marker(
        lead in any::<u8>().prop_filter("not 0x20", |b| *b != 0x20),
        rest in proptest::collection::vec(any::<u8>(), 17..31),
    ) {
        let mut data = vec![lead];
        data.extend(rest);
        prop_assert_eq!(decode_report(ProtocolFamily::XboxOne, &data), None);
    }

    #[test]
    fn prop_wired_frame_decodes_every_field(
        wire in any::<u16>(),
        lt in any::<u8>(),
        rt in any::<u8>(),
        sticks in any::<[i16; 4]>(),
    ) {
        let mut data = vec![0x00, 0x14];
        data.extend_from_slice(&wire.to_le_bytes());
        data.push(lt);
        data.push(rt);
        for axis in sticks {
            data.extend_from_slice(&axis.to_le_bytes());
        }
        let frame = decode_report(ProtocolFamily::Xbox360Wired, &data);
        let Some(InputFrame::Pad(pad)) = frame else {
            return Err(TestCaseError::fail("expected a pad frame"));
        };
        prop_assert_eq!(pad.buttons, buttons::translate(wire, &buttons::XBOX360_WIRED));
        prop_assert_eq!(pad.buttons & canonical::GUIDE, 0);
        prop_assert_eq!((pad.left_trigger, pad.right_trigger), (lt, rt));
        prop_assert_eq!(
            [pad.left_stick_x, pad.left_stick_y, pad.right_stick_x, pad.right_stick_y],
            sticks
        );
    }

    #[test]
    fn prop_chatpad_edge_fires_once_per_press(
        key in prop_oneof![Just(23u8), Just(39u8), Just(99u8), Just(0x08u8)],
        presses in proptest::collection::vec(1usize..20, 1..10),
    ) {
        let mut pad = ChatpadState::default();
        let pressed = if key < 17 { [key, 0, 0] } else { [0, key, 0] };
        for held_for in presses {
            pad.update(pressed);
            let edges = (0..held_for).filter(|_| pad.was_pressed(key)).count();
            prop_assert_eq!(edges, 1);
            pad.update([0, 0, 0]);
            prop_assert!(!pad.was_pressed(key));
        }
    }
}
