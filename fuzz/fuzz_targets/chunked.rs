#![no_main]
use adlzw::{Encoder, LzwStatus};
use libfuzzer_sys::fuzz_target;

// The first byte picks the input chunk size, output is produced a few bytes at a time.
fuzz_target!(|raw_data: &[u8]| {
    let (chunk, data) = match raw_data.split_first() {
        Some((&chunk, data)) => (usize::from(chunk).max(1), data),
        None => return,
    };

    let mut reference = vec![];
    let _ = Encoder::new().into_stream(&mut reference).encode_all(data);

    let mut encoder = Encoder::new();
    let mut output = vec![];
    let mut outbuf = [0u8; 3];
    for part in data.chunks(chunk) {
        let mut part = part;
        while !part.is_empty() {
            let result = encoder.encode_bytes(part, &mut outbuf);
            part = &part[result.consumed_in..];
            output.extend_from_slice(&outbuf[..result.consumed_out]);
            result.status.unwrap();
        }
    }

    encoder.finish();
    loop {
        let result = encoder.encode_bytes(&[], &mut outbuf);
        output.extend_from_slice(&outbuf[..result.consumed_out]);
        match result.status.unwrap() {
            LzwStatus::Done | LzwStatus::Empty => break,
            LzwStatus::Ok => {}
            LzwStatus::NoProgress => panic!("stuck while finishing"),
        }
    }

    assert_eq!(output, reference);
});
