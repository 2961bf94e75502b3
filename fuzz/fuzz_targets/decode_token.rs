#![no_main]

use libfuzzer_sys::fuzz_target;
use sqlite_binary::{BinaryBuffer, BinaryConfig, DecodePolicy, decode_from_storage, validate_token};

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary text must either succeed or report a malformed token
    let decoded = decode_from_storage(data);
    if let Ok(raw) = &decoded {
        assert_eq!(validate_token(data).ok(), Some(raw.len()));
    }

    // Both buffer policies must agree with the free function
    for policy in [DecodePolicy::Validate, DecodePolicy::InPlace] {
        let mut buffer = BinaryBuffer::with_config(BinaryConfig::new().decode_policy(policy));
        if buffer.set_encoded(data).is_err() {
            return;
        }
        match (&decoded, buffer.binary()) {
            (Ok(expected), Ok(actual)) => assert_eq!(&expected[..], actual),
            (Err(_), Err(err)) => assert!(err.is_malformed()),
            _ => panic!("buffer and decoder disagree"),
        }
    }
});
