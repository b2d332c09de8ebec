//! Property-based tests for the protocol codec.
//!
//! These tests use proptest to verify:
//! - Codec never panics on arbitrary input
//! - Any frame cut short decodes to `None`
//! - Arbitrary messages survive the codec

#![cfg(test)]

use bytes::BytesMut;
use proptest::prelude::*;

use crate::inventory::{ChangeId, EntityId, ItemRecord, ResourceKind};
use crate::protocol::{
    ChangeAckPayload, Codec, ContainerSyncPayload, Message, MoveItemAmountPayload,
    MoveItemPayload, MoveItemToSlotsPayload,
};

// =============================================================================
// Arbitrary Generators
// =============================================================================

fn arb_entity() -> impl Strategy<Value = EntityId> {
    any::<u64>().prop_map(EntityId)
}

fn arb_change() -> impl Strategy<Value = ChangeId> {
    any::<u64>().prop_map(ChangeId)
}

prop_compose! {
    fn arb_record()(
        id in arb_entity(),
        kind in "[a-z]{1,12}",
        count in 1u32..=999,
    ) -> ItemRecord {
        ItemRecord { id, kind: ResourceKind(kind), count }
    }
}

fn arb_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        (arb_entity(), arb_entity(), any::<u32>(), arb_entity(), any::<u32>(), arb_change())
            .prop_map(|(instigator, from, from_slot, to, to_slot, change_id)| {
                Message::MoveItem(MoveItemPayload {
                    instigator,
                    from,
                    from_slot,
                    to,
                    to_slot,
                    change_id,
                })
            }),
        (
            arb_entity(),
            arb_entity(),
            any::<u32>(),
            arb_entity(),
            any::<u32>(),
            any::<u32>(),
            arb_change(),
        )
            .prop_map(|(instigator, from, from_slot, to, to_slot, count, change_id)| {
                Message::MoveItemAmount(MoveItemAmountPayload {
                    instigator,
                    from,
                    from_slot,
                    to,
                    to_slot,
                    count,
                    change_id,
                })
            }),
        (
            arb_entity(),
            arb_entity(),
            any::<u32>(),
            arb_entity(),
            prop::collection::vec(any::<u32>(), 0..64),
            arb_change(),
        )
            .prop_map(|(instigator, from, from_slot, to, to_slots, change_id)| {
                Message::MoveItemToSlots(MoveItemToSlotsPayload {
                    instigator,
                    from,
                    from_slot,
                    to,
                    to_slots,
                    change_id,
                })
            }),
        (arb_entity(), prop::collection::vec(prop::option::of(arb_record()), 0..64))
            .prop_map(|(container, slots)| {
                Message::ContainerSync(ContainerSyncPayload { container, slots })
            }),
        arb_change().prop_map(|change_id| Message::ChangeAck(ChangeAckPayload { change_id })),
    ]
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn roundtrip_arbitrary_message(msg in arb_message()) {
        let encoded = Codec::encode(&msg).unwrap();
        let decoded = Codec::decode_slice(&encoded).unwrap().unwrap();
        prop_assert_eq!(msg, decoded);
    }

    #[test]
    fn codec_never_panics_on_arbitrary_input(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        let mut buf = BytesMut::from(&data[..]);
        let _ = Codec::decode(&mut buf);
    }

    #[test]
    fn truncated_frame_returns_none(msg in arb_message(), cut in 0.0f64..1.0) {
        let encoded = Codec::encode(&msg).unwrap();
        let cut_at = ((encoded.len() as f64) * cut) as usize;
        prop_assume!(cut_at < encoded.len());

        let result = Codec::decode_slice(&encoded[..cut_at]);
        prop_assert!(result.is_ok());
        prop_assert!(result.unwrap().is_none());
    }
}
