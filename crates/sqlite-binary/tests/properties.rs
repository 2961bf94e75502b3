//! Codec property tests.
//!
//! Tests:
//! - Round trips for inputs up to 2 KiB
//! - Token alphabet and size bound
//! - Offset optimality against an exhaustive search
//! - Rejection of malformed tokens

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use sqlite_binary::{
    BinaryBuffer, BinaryError, ByteHistogram, MalformedReason, QUOTE, decode_from_storage,
    encode_for_storage, encode_into, escape_cost, is_valid_offset, max_encoded_len, validate_token,
};

fn encode_full(raw: &[u8]) -> (Vec<u8>, usize) {
    let mut token = Vec::new();
    let len = encode_into(raw, &mut token);
    (token, len)
}

// ============================================================================
// Round Trips
// ============================================================================

mod round_trip {
    use super::*;

    proptest! {
        #[test]
        fn decode_reverses_encode(raw in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let token = encode_for_storage(&raw).unwrap();
            let decoded = decode_from_storage(&token).unwrap();
            prop_assert_eq!(&decoded[..], &raw[..]);
        }

        #[test]
        fn skewed_inputs_round_trip(
            raw in proptest::collection::vec(
                prop_oneof![Just(0u8), Just(1u8), Just(0x27u8), any::<u8>()],
                0..1100,
            )
        ) {
            let token = encode_for_storage(&raw).unwrap();
            prop_assert_eq!(&decode_from_storage(&token).unwrap()[..], &raw[..]);
        }

        #[test]
        fn buffer_round_trips(raw in proptest::collection::vec(any::<u8>(), 0..1100)) {
            let mut buffer = BinaryBuffer::new();
            buffer.set_binary(&raw).unwrap();
            let token = buffer.encoded().unwrap().to_vec();

            let mut other = BinaryBuffer::new();
            other.set_encoded(&token).unwrap();
            prop_assert_eq!(other.binary().unwrap(), &raw[..]);
            prop_assert_eq!(buffer.binary().unwrap(), &raw[..]);
        }
    }

    #[test]
    fn every_single_byte() {
        for b in 0..=u8::MAX {
            let token = encode_for_storage(&[b]).unwrap();
            assert_eq!(&decode_from_storage(&token).unwrap()[..], &[b]);
        }
    }
}

// ============================================================================
// Token Shape
// ============================================================================

mod token_shape {
    use super::*;

    proptest! {
        #[test]
        fn alphabet_is_safe(raw in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let (token, len) = encode_full(&raw);
            prop_assert_eq!(token.len(), len + 1);
            prop_assert_eq!(token[len], 0);
            prop_assert!(!token[..len].contains(&0));
            prop_assert!(!token[..len].contains(&QUOTE));
        }

        #[test]
        fn size_is_bounded(raw in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let (token, _) = encode_full(&raw);
            prop_assert!(token.len() <= max_encoded_len(raw.len()).unwrap());
        }
    }

    #[test]
    fn empty_input_is_x() {
        let (token, len) = encode_full(&[]);
        assert_eq!(token, [0x78, 0x00]);
        assert_eq!(len, 1);
    }

    #[test]
    fn three_quotes() {
        let (token, _) = encode_full(&[0x27, 0x27, 0x27]);
        assert_eq!(token, [0x01, 0x26, 0x26, 0x26, 0x00]);
        assert_eq!(&decode_from_storage(&token).unwrap()[..], &[0x27, 0x27, 0x27]);
    }

    #[test]
    fn worst_case_input_fits() {
        // each value once, repeated: every offset costs three escapes per cycle
        let raw: Vec<u8> = (0..4096).map(|i| (i % 256) as u8).collect();
        let (token, _) = encode_full(&raw);
        assert!(token.len() <= max_encoded_len(raw.len()).unwrap());
    }
}

// ============================================================================
// Offset Optimality
// ============================================================================

mod offset_choice {
    use super::*;

    fn min_cost(hist: &ByteHistogram) -> usize {
        (1..=u8::MAX)
            .filter(|&e| is_valid_offset(e))
            .map(|e| escape_cost(hist, e))
            .min()
            .unwrap()
    }

    proptest! {
        #[test]
        fn chosen_offset_is_cheapest(raw in proptest::collection::vec(any::<u8>(), 1..1024)) {
            let (token, _) = encode_full(&raw);
            let offset = token[0];
            let hist = ByteHistogram::from_bytes(&raw);
            prop_assert!(is_valid_offset(offset));
            prop_assert_eq!(escape_cost(&hist, offset), min_cost(&hist));
        }

        #[test]
        fn chosen_offset_is_first_cheapest(raw in proptest::collection::vec(any::<u8>(), 1..512)) {
            let (token, _) = encode_full(&raw);
            let hist = ByteHistogram::from_bytes(&raw);
            let min = min_cost(&hist);
            let first = (1..=u8::MAX)
                .filter(|&e| is_valid_offset(e))
                .find(|&e| escape_cost(&hist, e) == min)
                .unwrap();
            prop_assert_eq!(token[0], first);
        }
    }

    #[test]
    fn control_and_quote_bytes() {
        let raw = [0x00, 0x01, 0x27];
        let (token, _) = encode_full(&raw);
        let hist = ByteHistogram::from_bytes(&raw);
        assert_eq!(escape_cost(&hist, token[0]), min_cost(&hist));
        assert_eq!(&decode_from_storage(&token).unwrap()[..], &raw);
    }
}

// ============================================================================
// Malformed Input
// ============================================================================

mod malformed {
    use super::*;

    proptest! {
        #[test]
        fn bad_escape_is_rejected(
            offset in any::<u8>().prop_filter("legal offset", |&e| is_valid_offset(e)),
            prefix in proptest::collection::vec(0x02u8..=0xFF, 0..32),
            bad in 0x04u8..=0xFF,
        ) {
            let prefix: Vec<u8> = prefix.into_iter().filter(|&b| b != QUOTE).collect();
            let mut token = vec![offset];
            token.extend_from_slice(&prefix);
            token.extend_from_slice(&[0x01, bad]);

            let err = decode_from_storage(&token).unwrap_err();
            prop_assert_eq!(
                err,
                BinaryError::MalformedEncoding {
                    position: prefix.len() + 2,
                    reason: MalformedReason::InvalidEscape(bad),
                }
            );
        }

        #[test]
        fn arbitrary_tokens_decode_or_reject(
            token in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            match decode_from_storage(&token) {
                Ok(raw) => prop_assert_eq!(raw.len(), validate_token(&token).unwrap()),
                Err(err) => prop_assert!(err.is_malformed()),
            }
        }
    }

    #[test]
    fn escape_then_zero_is_rejected() {
        let err = decode_from_storage(&[0x10, 0x41, 0x01, 0x00]).unwrap_err();
        assert!(err.is_malformed());
    }
}
