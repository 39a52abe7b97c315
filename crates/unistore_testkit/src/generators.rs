//! Property-based test generators using proptest.
//!
//! Strategies generate values that satisfy the model's invariants: datetimes
//! stay within the representable range, complex values hold valid JSON, and
//! generated bags match the sample schemas.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use unistore_model::{FieldKind, PropertyBag, Value};
use uuid::Uuid;

/// Strategy for generating a value of one specific kind (never null).
pub fn value_of_kind_strategy(kind: FieldKind) -> BoxedStrategy<Value> {
    match kind {
        FieldKind::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        FieldKind::Int => any::<i32>().prop_map(Value::Int).boxed(),
        FieldKind::Long => any::<i64>().prop_map(Value::Long).boxed(),
        FieldKind::Double => {
            // NaN breaks total-order assertions, keep to finite values.
            prop::num::f64::NORMAL.prop_map(Value::Double).boxed()
        }
        FieldKind::Text => text_strategy().prop_map(Value::Text).boxed(),
        FieldKind::Bytes => prop::collection::vec(any::<u8>(), 0..64)
            .prop_map(Value::Bytes)
            .boxed(),
        FieldKind::Guid => prop::array::uniform16(any::<u8>())
            .prop_map(|bytes| Value::Guid(Uuid::from_bytes(bytes)))
            .boxed(),
        FieldKind::DateTime => timestamp_seconds_strategy()
            .prop_map(|secs| {
                let utc = Utc.timestamp_opt(secs, 0).single().expect("in range");
                Value::DateTime(utc.naive_utc())
            })
            .boxed(),
        FieldKind::DateTimeOffset => timestamp_seconds_strategy()
            .prop_map(|secs| {
                let utc = Utc.timestamp_opt(secs, 0).single().expect("in range");
                Value::DateTimeOffset(utc.fixed_offset())
            })
            .boxed(),
        FieldKind::Complex => prop::collection::btree_map(ident_strategy(), any::<i32>(), 0..4)
            .prop_map(|map| {
                // Keys match [a-z][a-z0-9_]*, so no JSON escaping is needed.
                let body = map
                    .iter()
                    .map(|(k, v)| format!("\"{k}\": {v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                Value::Complex(format!("{{{body}}}"))
            })
            .boxed(),
    }
}

/// Strategy for a value of any kind, including null.
pub fn any_value_strategy() -> BoxedStrategy<Value> {
    prop_oneof![
        Just(Value::Null),
        value_of_kind_strategy(FieldKind::Bool),
        value_of_kind_strategy(FieldKind::Int),
        value_of_kind_strategy(FieldKind::Long),
        value_of_kind_strategy(FieldKind::Double),
        value_of_kind_strategy(FieldKind::Text),
        value_of_kind_strategy(FieldKind::Bytes),
        value_of_kind_strategy(FieldKind::Guid),
        value_of_kind_strategy(FieldKind::DateTime),
        value_of_kind_strategy(FieldKind::DateTimeOffset),
        value_of_kind_strategy(FieldKind::Complex),
    ]
    .boxed()
}

/// Strategy for a populated instrument bag matching the sample schema.
pub fn instrument_bag_strategy() -> impl Strategy<Value = PropertyBag> {
    (
        text_strategy(),
        any::<i32>(),
        prop::num::f64::NORMAL,
        any::<bool>(),
    )
        .prop_map(|(name, rank, weight, in_stock)| {
            let mut bag = PropertyBag::new();
            bag.insert("name".into(), Value::Text(name));
            bag.insert("rank".into(), Value::Int(rank));
            bag.insert("weight".into(), Value::Double(weight));
            bag.insert("in_stock".into(), Value::Bool(in_stock));
            bag
        })
}

/// Strategy for valid field identifiers.
pub fn ident_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

fn text_strategy() -> impl Strategy<Value = String> {
    // Printable text including quotes, to exercise dialect escaping.
    prop::string::string_regex("[ -~]{0,32}").expect("Invalid regex")
}

fn timestamp_seconds_strategy() -> impl Strategy<Value = i64> {
    // 1970-01-01 through 2070 or so, safely inside chrono's range.
    0i64..3_155_760_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestStore;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn string_codec_round_trips(value in any_value_strategy()) {
            if let Some(kind) = value.kind() {
                let encoded = value.encode_field();
                let decoded = Value::decode_field(&encoded, kind).unwrap();
                prop_assert_eq!(decoded, value);
            }
        }

        #[test]
        fn null_decodes_from_the_sentinel(kind in prop_oneof![
            Just(FieldKind::Text),
            Just(FieldKind::Int),
            Just(FieldKind::Bytes),
            Just(FieldKind::DateTimeOffset),
        ]) {
            let encoded = Value::Null.encode_field();
            prop_assert_eq!(Value::decode_field(&encoded, kind).unwrap(), Value::Null);
        }

        #[test]
        fn generated_bags_are_storable(bag in instrument_bag_strategy()) {
            let test_store = TestStore::memory();
            let id = test_store.store.add("Instrument", bag).unwrap();
            prop_assert!(test_store.store.retrieve("Instrument", &id).unwrap().is_some());
        }

        #[test]
        fn generated_values_fit_their_kind(value in value_of_kind_strategy(FieldKind::Complex)) {
            prop_assert!(value.fits_kind(FieldKind::Complex));
        }
    }
}
