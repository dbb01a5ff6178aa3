//! Property tests for chanlist structure and the persisted text form.

use daq_chanlist::{AnalogReference, ChannelList, ChanspecFlags, Direction};
use proptest::prelude::*;

fn aref() -> impl Strategy<Value = AnalogReference> {
    prop_oneof![
        Just(AnalogReference::Ground),
        Just(AnalogReference::Common),
        Just(AnalogReference::Differential),
        Just(AnalogReference::Other),
    ]
}

fn direction() -> impl Strategy<Value = Direction> {
    (0u32..6).prop_map(|code| Direction::from_code(code).unwrap_or(Direction::Input))
}

fn flags() -> impl Strategy<Value = ChanspecFlags> {
    any::<u32>().prop_map(ChanspecFlags::from_bits_truncate)
}

type Request = (u32, u32, AnalogReference, ChanspecFlags, Direction);

fn request() -> impl Strategy<Value = Request> {
    (0u32..=0xffff, 0u32..=0xff, aref(), flags(), direction())
}

fn io_request() -> impl Strategy<Value = Request> {
    (
        0u32..=0xffff,
        0u32..=0xff,
        aref(),
        flags(),
        prop_oneof![Just(Direction::Input), Just(Direction::Output)],
    )
}

fn build(requests: &[Request]) -> ChannelList {
    let mut list = ChannelList::new();
    for &(channel, range, aref, flags, direction) in requests {
        // Rejections are part of the property: the list must stay consistent
        let _ = list.add_channel(channel, range, aref, flags, direction);
    }
    list
}

proptest! {
    #[test]
    fn specials_form_a_legal_prefix(requests in prop::collection::vec(request(), 0..32)) {
        let list = build(&requests);
        let entries = list.entries();
        let first_io = list.first_io_index();

        prop_assert!(first_io <= 3);
        prop_assert!(entries[..first_io].iter().all(|e| e.direction.is_special()));
        prop_assert!(entries[first_io..].iter().all(|e| e.direction.is_io()));
        prop_assert_eq!(list.io_count(), list.len() - first_io);

        let specials = list.special_entries();
        let bases = specials.iter().filter(|e| e.direction == Direction::Base).count();
        let triggers = specials.iter().filter(|e| e.direction.is_trigger()).count();
        prop_assert!(bases <= 1);
        prop_assert!(bases == 0 || triggers == 0);
        for trigger in [Direction::StartTrigger, Direction::BeginTrigger, Direction::ConvertTrigger] {
            prop_assert!(specials.iter().filter(|e| e.direction == trigger).count() <= 1);
        }
    }

    #[test]
    fn remove_last_is_lifo(requests in prop::collection::vec(request(), 1..24)) {
        let mut list = build(&requests);
        let mut expected: Vec<_> = list.entries().to_vec();

        while let Some(removed) = list.remove_last() {
            prop_assert_eq!(Some(removed), expected.pop());
            prop_assert_eq!(list.entries(), expected.as_slice());
        }
        prop_assert!(expected.is_empty());
        prop_assert!(!list.has_base());
        prop_assert_eq!(list.first_io_index(), 0);
    }

    #[test]
    fn text_round_trip(requests in prop::collection::vec(io_request(), 0..24)) {
        let list = build(&requests);
        let restored = ChannelList::from_text(&list.to_text()).unwrap();
        prop_assert_eq!(restored, list);
    }

    #[test]
    fn exports_cover_only_io(requests in prop::collection::vec(request(), 0..24)) {
        let list = build(&requests);
        let io = list.io_entries();

        let channels = list.to_channel_numbers();
        prop_assert_eq!(channels.len(), list.io_count());
        prop_assert_eq!(list.to_direction_codes().len(), list.io_count());
        for (entry, channel) in io.iter().zip(&channels) {
            prop_assert_eq!(entry.chanspec.channel(), *channel);
        }
    }
}
