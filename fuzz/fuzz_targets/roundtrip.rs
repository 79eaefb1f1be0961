#![no_main]
use adlzw::{LzwStatus, Strategy};
use libfuzzer_sys::fuzz_target;

#[path = "../../tests/support/mod.rs"]
mod support;

fuzz_target!(|data: &[u8]| {
    let (encoded, status) = support::encode(Strategy::default(), data);
    if data.is_empty() {
        assert_eq!(status, LzwStatus::Empty);
        assert!(encoded.is_empty());
    } else {
        assert_eq!(status, LzwStatus::Done);
        assert_eq!(support::decode(&encoded), data);
    }
});
