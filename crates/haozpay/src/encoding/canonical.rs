use super::ParameterSet;

/// Name of the field that carries the signature. Never part of the signed text.
pub const SIGN_FIELD: &str = "sign";

/// Builds the canonical signing string for a parameter set.
///
/// Entries are emitted as `key=value` joined by `&`, in byte-wise ascending
/// key order. The `sign` field, null values and values that render blank are
/// skipped. Values are not escaped: `&` and `=` inside a value pass through
/// unchanged, which is what the platform hashes.
pub fn encode(params: &ParameterSet) -> String {
    let mut out = String::new();
    for (key, value) in params.iter() {
        if key == SIGN_FIELD || value.is_null() {
            continue;
        }
        let rendered = value.to_string();
        if rendered.trim().is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(&rendered);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ParamValue;
    use proptest::prelude::*;

    #[test]
    fn empty_params_encode_to_empty_string() {
        assert_eq!(encode(&ParameterSet::new()), "");
    }

    #[test]
    fn drops_sign_blank_and_null() {
        let mut params = ParameterSet::new();
        params.insert("a", "1");
        params.insert("b", "");
        params.insert("sign", "x");
        params.insert("c", 2);
        params.insert("d", ParamValue::Null);
        params.insert("e", "   ");
        assert_eq!(encode(&params), "a=1&c=2");
    }

    #[test]
    fn no_trailing_separator_when_last_entry_dropped() {
        let params: ParameterSet = [("a", "1"), ("z", " ")].into_iter().collect();
        assert_eq!(encode(&params), "a=1");
    }

    #[test]
    fn no_leading_separator_when_first_entry_dropped() {
        let params: ParameterSet = [("a", ""), ("b", "2")].into_iter().collect();
        assert_eq!(encode(&params), "b=2");
    }

    #[test]
    fn values_are_not_escaped() {
        let params: ParameterSet = [("notifyUrl", "https://m.example/cb?x=1&y=2")].into_iter().collect();
        assert_eq!(encode(&params), "notifyUrl=https://m.example/cb?x=1&y=2");
    }

    #[test]
    fn surrounding_whitespace_is_kept_when_not_blank() {
        let params: ParameterSet = [("memo", " hi ")].into_iter().collect();
        assert_eq!(encode(&params), "memo= hi ");
    }

    #[test]
    fn mixed_value_types() {
        let mut params = ParameterSet::new();
        params.insert("merchantNo", "HZ123");
        params.insert("timestamp", 1700000000000i64);
        params.insert("orderAmount", 0.02);
        params.insert("needNotify", true);
        assert_eq!(
            encode(&params),
            "merchantNo=HZ123&needNotify=true&orderAmount=0.02&timestamp=1700000000000"
        );
    }

    #[test]
    fn keys_sort_by_byte_value_not_locale() {
        let params: ParameterSet = [("amount", "1"), ("Zone", "2"), ("ID", "3")].into_iter().collect();
        assert_eq!(encode(&params), "ID=3&Zone=2&amount=1");
    }

    proptest! {
        #[test]
        fn encoding_ignores_insertion_order(entries in proptest::collection::vec(("[a-zA-Z_]{1,8}", "[ -~]{0,12}"), 0..16)) {
            let forward: ParameterSet = entries.iter().cloned().collect();
            let backward: ParameterSet = entries.iter().rev().cloned().collect();
            // Duplicate keys resolve differently per order, so compare only on unique keys.
            let mut seen = std::collections::HashSet::new();
            if entries.iter().all(|(k, _)| seen.insert(k.clone())) {
                prop_assert_eq!(encode(&forward), encode(&backward));
            }
            prop_assert_eq!(encode(&forward), encode(&forward.clone()));
        }

        #[test]
        fn output_is_sorted_and_filtered(entries in proptest::collection::vec(("[a-z]{1,6}", "[a-z ]{0,6}"), 0..16)) {
            let mut params: ParameterSet = entries.into_iter().collect();
            params.insert("sign", "signature");
            let encoded = encode(&params);
            if encoded.is_empty() {
                return Ok(());
            }
            let keys: Vec<&str> = encoded
                .split('&')
                .map(|pair| pair.split_once('=').map(|(k, _)| k).unwrap_or(pair))
                .collect();
            prop_assert!(!keys.contains(&SIGN_FIELD));
            prop_assert!(keys.windows(2).all(|w| w[0].as_bytes() < w[1].as_bytes()));
            for pair in encoded.split('&') {
                let (_, value) = pair.split_once('=').unwrap();
                prop_assert!(!value.trim().is_empty());
            }
        }
    }
}
