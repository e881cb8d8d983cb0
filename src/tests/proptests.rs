use crate::code::ColumnCode;
use crate::constants::{LVL_2_MAX, LVL_3_MAX, SIGN_BIAS, VALUE_MASK};
use crate::{decode, unsignify, Encoder, EncoderConfig, RowKind, Variant, WriteError};
use proptest::prelude::*;

prop_compose! {
    /// A column count and a sequence of rows that drift like sensor channels,
    /// with occasional jumps large enough to force raw fallbacks
    fn arb_table()(
        columns in 1usize..=16,
        count in 0usize..200,
    )(
        start in prop::collection::vec(0..=VALUE_MASK, columns),
        steps in prop::collection::vec(
            prop::collection::vec(prop_oneof![
                8 => -100i64..=100,
                3 => -3_000_000i64..=3_000_000,
                1 => -(i64::from(VALUE_MASK))..=i64::from(VALUE_MASK),
            ], columns),
            count,
        ),
    ) -> Vec<Vec<u32>> {
        let mut rows = Vec::with_capacity(steps.len() + 1);
        let mut cur = start;
        rows.push(cur.clone());
        for step in steps {
            for (v, d) in cur.iter_mut().zip(step) {
                *v = (i64::from(*v) + d).clamp(0, i64::from(VALUE_MASK)) as u32;
            }
            rows.push(cur.clone());
        }
        rows
    }
}

fn arb_variant() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::Rdes1), Just(Variant::Rdes2), Just(Variant::Rdes3)]
}

/// Encode a single step from `last` to `cur` and parse back the delta row's code
fn second_code(last: u32, cur: u32) -> (ColumnCode, Vec<u8>) {
    let mut enc = Encoder::with_columns(1, 0, [0u8; 8]).unwrap();
    enc.write_row(&[last]).unwrap();
    enc.write_row(&[cur]).unwrap();
    let tail = enc.as_bytes()[4..].to_vec();
    let (code, len) = ColumnCode::parse(Variant::Rdes2, &tail, 4).unwrap();
    assert_eq!(len, tail.len());
    (code, tail)
}

proptest! {
    /// Property: the first row is all raw values
    #[test]
    fn prop_first_row_size(columns in 1u8..=255, seed in 0..=VALUE_MASK) {
        let row: Vec<u32> = (0..u32::from(columns)).map(|c| seed.wrapping_add(c) & VALUE_MASK).collect();
        let mut enc = Encoder::with_columns(columns, 0, vec![0u8; 1024]).unwrap();
        prop_assert_eq!(enc.write_row(&row).unwrap(), RowKind::Keyframe);
        prop_assert_eq!(enc.size(), 4 * usize::from(columns));
    }

    /// Property: raw codes keep exactly the low 31 bits
    #[test]
    fn prop_raw_masks_top_bit(v in any::<u32>()) {
        let (bytes, len) = ColumnCode::Raw(v).pack(Variant::Rdes2);
        let (code, used) = ColumnCode::parse(Variant::Rdes2, &bytes[..len], 0).unwrap();
        prop_assert_eq!(used, 4);
        prop_assert_eq!(code.apply(0), v & VALUE_MASK);
    }

    /// Property: small changes use Delta2 and reconstruct exactly
    #[test]
    fn prop_delta2(last in 0..=VALUE_MASK, d in -i64::from(LVL_2_MAX)..=i64::from(LVL_2_MAX)) {
        let cur = i64::from(last) + d;
        prop_assume!((0..=i64::from(VALUE_MASK)).contains(&cur));
        let cur = cur as u32;
        let (code, bytes) = second_code(last, cur);
        prop_assert!(matches!(code, ColumnCode::Delta2 { .. }), "got {:?}", code);
        prop_assert_eq!(bytes.len(), 2);
        prop_assert_eq!(code.apply(last), cur);
    }

    /// Property: medium changes use Delta3 and reconstruct exactly
    #[test]
    fn prop_delta3(last in 0..=VALUE_MASK, m in (LVL_2_MAX + 1)..=LVL_3_MAX, up in any::<bool>()) {
        let cur = if up { i64::from(last) + i64::from(m) } else { i64::from(last) - i64::from(m) };
        prop_assume!((0..=i64::from(VALUE_MASK)).contains(&cur));
        let cur = cur as u32;
        let (code, bytes) = second_code(last, cur);
        prop_assert!(matches!(code, ColumnCode::Delta3 { .. }), "got {:?}", code);
        prop_assert_eq!(bytes.len(), 3);
        prop_assert_eq!(code.apply(last), cur);
    }

    /// Property: changes beyond 21 bits fall back to a raw value
    #[test]
    fn prop_large_change_is_raw(last in 0..=VALUE_MASK, cur in 0..=VALUE_MASK) {
        prop_assume!(last.abs_diff(cur) > LVL_3_MAX);
        let (code, bytes) = second_code(last, cur);
        prop_assert_eq!(code, ColumnCode::Raw(cur));
        prop_assert_eq!(bytes, cur.to_be_bytes().to_vec());
    }

    /// Property: decode(encode(rows)) == rows, for every variant
    #[test]
    fn prop_roundtrip(rows in arb_table(), refresh in 0u16..8, variant in arb_variant()) {
        let columns = rows[0].len();
        let config = EncoderConfig::new(columns as u8).with_refresh_interval(refresh).with_variant(variant);
        let mut enc = Encoder::new(config, vec![0u8; rows.len() * columns * 4]).unwrap();
        for row in &rows {
            enc.write_row(row).unwrap();
        }
        prop_assert!(enc.size() <= rows.len() * columns * 4);
        prop_assert_eq!(decode(enc.as_bytes(), columns as u8, variant).unwrap(), rows);
    }

    /// Property: a selected code packs to its own length and parses back unchanged
    #[test]
    fn prop_variant_code_roundtrip(variant in arb_variant(), last in 0..=VALUE_MASK, cur in 0..=VALUE_MASK) {
        let code = ColumnCode::select(variant, last, cur);
        prop_assert_eq!(code.is_raw(), last.abs_diff(cur) > variant.max_delta());
        let (bytes, len) = code.pack(variant);
        prop_assert_eq!(len, code.len());
        prop_assert_eq!(ColumnCode::parse(variant, &bytes[..len], 0).unwrap(), (code, len));
        prop_assert_eq!(code.apply(last), cur);
    }

    /// Property: with refresh interval R, every (R+1)th row is a keyframe
    #[test]
    fn prop_refresh_period(rows in arb_table(), refresh in 1u16..10) {
        let columns = rows[0].len();
        let mut enc = Encoder::with_columns(columns as u8, refresh, vec![0u8; rows.len() * columns * 4]).unwrap();
        let period = usize::from(refresh) + 1;
        for (i, row) in rows.iter().enumerate() {
            let expected = if i % period == 0 { RowKind::Keyframe } else { RowKind::Delta };
            prop_assert_eq!(enc.write_row(row).unwrap(), expected, "row {}", i);
        }
    }

    /// Property: a row rejected for lack of space changes nothing
    #[test]
    fn prop_exhaustion_is_clean(rows in arb_table(), capacity in 0usize..256) {
        let columns = rows[0].len();
        let mut storage = vec![0x5Au8; capacity];
        let mut enc = Encoder::with_columns(columns as u8, 0, &mut storage[..]).unwrap();
        let mut accepted = 0;
        for row in &rows {
            let before = enc.size();
            match enc.write_row(row) {
                Ok(_) => accepted += 1,
                Err(WriteError::BufferExhausted { needed, remaining }) => {
                    prop_assert!(needed > remaining);
                    prop_assert_eq!(enc.size(), before);
                    break;
                }
                Err(e) => prop_assert!(false, "unexpected error {:?}", e),
            }
        }
        let written = enc.size();
        prop_assert!(storage[written..].iter().all(|&b| b == 0x5A));
        let decoded = decode(&storage[..written], columns as u8, Variant::Rdes2).unwrap();
        prop_assert_eq!(decoded, rows[..accepted].to_vec());
    }

    /// Property: unsignify adds the bias modulo 2^32
    #[test]
    fn prop_unsignify(x in any::<i32>()) {
        let expected = ((i64::from(x) + i64::from(SIGN_BIAS)).rem_euclid(1 << 32)) as u32;
        prop_assert_eq!(unsignify(x), expected);
    }
}
