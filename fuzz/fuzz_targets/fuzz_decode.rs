#![no_main]

use libfuzzer_sys::fuzz_target;
use rowdelta::{codes, decode, Variant};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let columns = (data[0] & 0x3F).max(1);
    let variant = match data[0] >> 6 {
        0 => Variant::Rdes1,
        1 => Variant::Rdes3,
        _ => Variant::Rdes2,
    };
    let stream = &data[1..];

    // Decoding arbitrary bytes must never panic
    let rows = decode(stream, columns, variant);

    // A clean decode consumes whole codes, so the code walk must also succeed
    if let Ok(rows) = rows {
        let n = codes(stream, variant).map(|c| c.unwrap()).count();
        assert_eq!(n, rows.len() * usize::from(columns), "code count mismatch");
    }
});
