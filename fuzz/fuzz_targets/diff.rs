#![no_main]
use adlzw::{Encoder, LzwStatus, Strategy};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let encode = |strategy| {
        let mut encoder = Encoder::with_strategy(strategy);
        let mut output = vec![];
        let result = encoder.into_stream(&mut output).encode_all(data);
        (result.status.unwrap(), output)
    };

    let (tree_status, tree) = encode(Strategy::Tree);
    let (hashed_status, hashed) = encode(Strategy::Hashed);
    assert_eq!(tree_status, hashed_status);
    assert_eq!(tree, hashed);

    if data.is_empty() {
        assert_eq!(tree_status, LzwStatus::Empty);
    } else {
        assert_eq!(tree_status, LzwStatus::Done);
    }
});
