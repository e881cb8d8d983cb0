#![no_main]

use libfuzzer_sys::fuzz_target;
use rowdelta::{decode, Encoder, Variant, WriteError};

fuzz_target!(|data: &[u8]| {
    // First byte: buffer capacity, then single-column u16 readings
    if data.len() < 3 {
        return;
    }
    let capacity = usize::from(data[0]);
    let mut storage = vec![0xEEu8; capacity];
    let mut enc = Encoder::with_columns(1, 4, &mut storage[..]).unwrap();
    let mut accepted = Vec::new();

    for chunk in data[1..].chunks_exact(2) {
        let value = u32::from(u16::from_be_bytes([chunk[0], chunk[1]])) * 64;
        match enc.write_row(&[value]) {
            Ok(_) => accepted.push(vec![value]),
            Err(WriteError::BufferExhausted { .. }) => break,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    // Property: bytes past the cursor are never touched
    let written = enc.size();
    assert!(storage[written..].iter().all(|&b| b == 0xEE), "wrote past cursor");
    assert_eq!(decode(&storage[..written], 1, Variant::Rdes2).unwrap(), accepted);
});
