#![no_main]

use libfuzzer_sys::fuzz_target;
use rowdelta::{decode, Encoder, EncoderConfig, RowKind, Variant};

fuzz_target!(|data: &[u8]| {
    // First byte: variant and column count, second: refresh interval
    if data.len() < 2 {
        return;
    }
    let columns = (data[0] & 0x3F).max(1);
    let variant = match data[0] >> 6 {
        0 => Variant::Rdes1,
        1 => Variant::Rdes3,
        _ => Variant::Rdes2,
    };
    let refresh = u16::from(data[1]);

    // Remaining bytes are read as big-endian u32 values, masked to 31 bits
    let values: Vec<u32> = data[2..]
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]) & 0x7FFF_FFFF)
        .collect();
    let rows: Vec<&[u32]> = values.chunks_exact(usize::from(columns)).collect();

    let config = EncoderConfig::new(columns).with_refresh_interval(refresh).with_variant(variant);
    let mut enc = Encoder::new(config, vec![0u8; values.len() * 4]).unwrap();
    for (i, row) in rows.iter().enumerate() {
        let kind = enc.write_row(row).unwrap();
        // Property 1: the first row is always a keyframe
        if i == 0 {
            assert_eq!(kind, RowKind::Keyframe);
        }
    }

    // Property 2: output never exceeds the uncompressed size
    assert!(enc.uncompressed_size() >= enc.size() as u64, "output larger than input");

    // Property 3: decoding returns the rows exactly
    let decoded = decode(enc.as_bytes(), columns, variant).unwrap();
    assert_eq!(decoded.len(), rows.len(), "row count mismatch");
    for (d, r) in decoded.iter().zip(&rows) {
        assert_eq!(d.as_slice(), *r, "row mismatch");
    }
});
