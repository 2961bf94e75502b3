#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sqlite_binary::{BinaryBuffer, QUOTE, decode_from_storage, encode_into, max_encoded_len};

/// Ways a caller can fill a buffer before asking for the token.
#[derive(Debug, Arbitrary)]
enum FuzzFill {
    SetBinary(Vec<u8>),
    AllocBinary(Vec<u8>),
    ViaToken(Vec<u8>),
}

fuzz_target!(|input: FuzzFill| {
    let mut buffer = BinaryBuffer::new();
    let raw = match input {
        FuzzFill::SetBinary(raw) => {
            let _ = buffer.set_binary(&raw);
            raw
        }
        FuzzFill::AllocBinary(raw) => {
            if let Ok(slot) = buffer.alloc_binary(raw.len()) {
                slot.copy_from_slice(&raw);
            }
            raw
        }
        FuzzFill::ViaToken(raw) => {
            let mut token = Vec::new();
            encode_into(&raw, &mut token);
            let _ = buffer.set_encoded(&token);
            raw
        }
    };

    let Ok(token) = buffer.encoded_with_nul().map(<[u8]>::to_vec) else {
        return;
    };
    let len = token.len() - 1;
    assert!(token.len() <= max_encoded_len(raw.len()).unwrap_or(usize::MAX));
    assert!(!token[..len].contains(&0));
    assert!(!token[..len].contains(&QUOTE));

    let decoded = decode_from_storage(&token).expect("encoder output must decode");
    assert_eq!(&decoded[..], &raw[..]);
    assert_eq!(buffer.binary().ok(), Some(&raw[..]));
});
