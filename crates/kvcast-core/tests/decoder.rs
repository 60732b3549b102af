use kvcast_core::{
    DecodeError, KEY_MAX_LEN, KeyFault, VALUE_MAX_LEN, ValueFault, decode_all, decode_payload,
};
use quickcheck::{QuickCheck, TestResult};

const SEPARATORS: [&str; 5] = [" ", "\t", "\r\n", "\n", "  \t "];

fn alnum(bytes: &[u8]) -> String {
    let text: String = bytes
        .iter()
        .map(|byte| (b'a' + byte % 26) as char)
        .collect();
    if text.is_empty() { "x".to_string() } else { text }
}

fn decoded(payload: &[u8]) -> Vec<(String, String)> {
    decode_all(payload)
        .pairs
        .iter()
        .map(|pair| (pair.key.to_string(), pair.value.to_string()))
        .collect()
}

#[test]
fn well_formed_payloads_decode_to_their_tokens() {
    fn prop(tokens: Vec<(Vec<u8>, Vec<u8>, u8)>) -> TestResult {
        if tokens.is_empty() {
            return TestResult::discard();
        }
        let expected: Vec<(String, String)> = tokens
            .iter()
            .map(|(key, value, _)| (alnum(key), alnum(value)))
            .collect();
        let payload = expected
            .iter()
            .zip(tokens.iter())
            .map(|((key, value), (_, _, sep))| {
                format!("{key}:{value}{}", SEPARATORS[*sep as usize % SEPARATORS.len()])
            })
            .collect::<String>();

        let outcome = decode_all(payload.as_bytes());
        TestResult::from_bool(outcome.is_complete() && decoded(payload.as_bytes()) == expected)
    }

    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(Vec<(Vec<u8>, Vec<u8>, u8)>) -> TestResult);
}

#[test]
fn quoted_values_keep_inner_whitespace() {
    fn prop(words: Vec<Vec<u8>>) -> TestResult {
        if words.is_empty() {
            return TestResult::discard();
        }
        let value = words
            .iter()
            .map(|word| alnum(word))
            .collect::<Vec<_>>()
            .join(" \t");
        let payload = format!("q:\"{value}\" tail:1");
        let outcome = decode_all(payload.as_bytes());
        let [quoted, tail] = outcome.pairs.as_slice() else {
            return TestResult::failed();
        };
        let kept = &value.as_bytes()[..value.len().min(VALUE_MAX_LEN)];
        TestResult::from_bool(
            outcome.is_complete()
                && quoted.key == "q"
                && quoted.value == *kept
                && quoted.value.original_len() == value.len()
                && quoted.value.is_truncated() == (value.len() > VALUE_MAX_LEN)
                && tail.key == "tail"
                && tail.value == "1",
        )
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Vec<Vec<u8>>) -> TestResult);
}

#[test]
fn arbitrary_bytes_respect_bounds_and_ordering() {
    fn prop(payload: Vec<u8>) -> bool {
        let outcome = decode_all(&payload);
        let mut last_end = 0;
        for pair in &outcome.pairs {
            if pair.key.is_empty()
                || pair.key.len() > KEY_MAX_LEN
                || pair.value.len() > VALUE_MAX_LEN
                || pair.span.start < last_end
                || pair.span.end > payload.len()
                || pair.span.start >= pair.span.end
            {
                return false;
            }
            last_end = pair.span.end;
        }
        outcome.error.as_ref().is_none_or(|err| err.offset() <= payload.len())
    }

    QuickCheck::new()
        .tests(1000)
        .quickcheck(prop as fn(Vec<u8>) -> bool);
}

#[test]
fn decoding_is_repeatable() {
    fn prop(payload: Vec<u8>) -> bool {
        decode_all(&payload) == decode_all(&payload)
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(Vec<u8>) -> bool);
}

#[test]
fn grammar_bytes_are_never_panicky() {
    fn prop(choices: Vec<u8>) -> bool {
        const ALPHABET: &[u8] = b"ab:\" \t\r\n";
        let payload: Vec<u8> = choices
            .iter()
            .map(|choice| ALPHABET[*choice as usize % ALPHABET.len()])
            .collect();
        let mut pairs = decode_payload(&payload);
        let mut errors = 0;
        for item in pairs.by_ref() {
            if item.is_err() {
                errors += 1;
            }
        }
        errors <= 1 && pairs.next().is_none()
    }

    QuickCheck::new()
        .tests(1000)
        .quickcheck(prop as fn(Vec<u8>) -> bool);
}

#[test]
fn documented_examples() {
    assert!(decode_all(b"").pairs.is_empty());
    assert!(decode_all(b" \t\r\n").is_complete());

    assert_eq!(
        decoded(b"a:\"hello world\" b:2"),
        vec![
            ("a".to_string(), "hello world".to_string()),
            ("b".to_string(), "2".to_string())
        ]
    );

    let mut long_key = "k".repeat(300).into_bytes();
    long_key.extend_from_slice(b":v");
    let outcome = decode_all(&long_key);
    assert!(outcome.is_complete());
    assert_eq!(outcome.pairs[0].key.len(), 254);

    let outcome = decode_all(b"a:\"oops");
    assert!(outcome.pairs.is_empty());
    assert!(matches!(
        outcome.error,
        Some(DecodeError::MalformedValue { ref key, fault: ValueFault::UnterminatedQuote, .. }) if key == "a"
    ));

    let outcome = decode_all(b"abc def:1");
    assert!(outcome.pairs.is_empty());
    assert!(matches!(
        outcome.error,
        Some(DecodeError::MalformedKey {
            fault: KeyFault::MissingDelimiter,
            ..
        })
    ));

    let outcome = decode_all(b"a:1 b:2 c");
    assert_eq!(
        decoded(b"a:1 b:2 c"),
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string())
        ]
    );
    assert!(matches!(outcome.error, Some(DecodeError::MalformedKey { .. })));
}
