//! # Claim Builder Properties
//!
//! Whatever the builder is given, the accessors read back, the header
//! survives a slot round-trip, and only index changes move `hi`.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use zkid_claims::{Claim, MerklizedPosition, SchemaHash, SubjectPosition};
use zkid_core::{FieldElement, IdType, Identifier};

fn arb_field() -> impl Strategy<Value = FieldElement> {
    any::<u64>().prop_map(FieldElement::from_u64)
}

proptest! {
    #[test]
    fn prop_builder_fields_read_back(
        schema in proptest::array::uniform16(any::<u8>()),
        nonce in any::<u64>(),
        version in any::<u32>(),
        updatable in any::<bool>(),
        expiration in proptest::option::of(0i64..4_000_000_000),
        data in (arb_field(), arb_field()),
    ) {
        let mut builder = Claim::builder(SchemaHash::from_bytes(schema))
            .with_revocation_nonce(nonce)
            .with_version(version)
            .with_updatable(updatable)
            .with_index_data(data.0, data.1);
        if let Some(secs) = expiration {
            builder = builder.with_expiration_date(Utc.timestamp_opt(secs, 0).unwrap());
        }
        let claim = builder.build().unwrap();

        prop_assert_eq!(claim.schema_hash(), SchemaHash::from_bytes(schema));
        prop_assert_eq!(claim.revocation_nonce(), nonce);
        prop_assert_eq!(claim.version(), version);
        prop_assert_eq!(claim.is_updatable(), updatable);
        prop_assert_eq!(claim.expiration().map(|e| e.timestamp()), expiration);
        prop_assert_eq!(claim.index_data(), data);
        prop_assert_eq!(claim.subject_position().unwrap(), SubjectPosition::None);
        prop_assert_eq!(claim.merklized_position().unwrap(), MerklizedPosition::None);
        prop_assert_eq!(Claim::from_slots(claim.slots()).unwrap(), claim);
    }

    #[test]
    fn prop_value_part_never_moves_hi(index in arb_field(), a in arb_field(), b in arb_field()) {
        prop_assume!(a != b);
        let make = |v: FieldElement| {
            Claim::builder(SchemaHash::from_bytes([9u8; 16]))
                .with_index_data(index, FieldElement::zero())
                .with_value_data(v, FieldElement::zero())
                .build()
                .unwrap()
        };
        let (hi_a, hv_a) = make(a).hi_hv().unwrap();
        let (hi_b, hv_b) = make(b).hi_hv().unwrap();
        prop_assert_eq!(hi_a, hi_b);
        prop_assert_ne!(hv_a, hv_b);
    }

    #[test]
    fn prop_subject_reads_back(state in any::<u64>(), in_index in any::<bool>()) {
        let id = Identifier::from_state(IdType([0x01, 0x00]), FieldElement::from_u64(state << 40));
        let builder = Claim::builder(SchemaHash::from_bytes([1u8; 16]));
        let builder = if in_index { builder.with_index_id(id) } else { builder.with_value_id(id) };
        let claim = builder.build().unwrap();
        let expected = if in_index { SubjectPosition::Index } else { SubjectPosition::Value };
        prop_assert_eq!(claim.subject_position().unwrap(), expected);
        prop_assert_eq!(claim.subject_id().unwrap(), Some(id));
    }
}
