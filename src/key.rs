use crate::{Code, MAX_CODESIZE};

/// A string `prefix + suffix` packed into a single comparable scalar.
///
/// The layout is `{high nibble of suffix}{prefix}{low nibble of suffix}`. Prefix codes never
/// exceed `MAX_CODESIZE` bits, so the three fields are disjoint and two keys are equal exactly
/// when their strings are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct OrderingKey(u32);

impl OrderingKey {
    pub(crate) fn new(prefix: Code, suffix: u8) -> Self {
        debug_assert!(prefix < crate::MAX_CODES);
        let high = u32::from(suffix & 0xf0) << MAX_CODESIZE;
        let low = u32::from(suffix & 0x0f);
        OrderingKey(high | prefix << 4 | low)
    }
}

#[cfg(test)]
mod tests {
    use super::OrderingKey;
    use crate::MAX_CODES;

    #[test]
    fn fields_do_not_overlap() {
        assert_eq!(OrderingKey::new(0, 0).0, 0);
        assert_eq!(OrderingKey::new(0, 0x0f).0, 0x0f);
        assert_eq!(OrderingKey::new(1, 0).0, 0x10);
        assert_eq!(OrderingKey::new(MAX_CODES - 1, 0).0, 0x00ff_fff0);
        assert_eq!(OrderingKey::new(0, 0xf0).0, 0x0f00_0000);
        assert_eq!(OrderingKey::new(MAX_CODES - 1, 0xff).0, 0x0fff_ffff);
    }

    #[test]
    fn distinct_strings_have_distinct_keys() {
        let prefixes = [0, 1, 0xff, 0x100, 0x101, 0x7fff, 0x8_0000, MAX_CODES - 1];
        let mut keys = alloc::vec::Vec::new();
        for &prefix in &prefixes {
            for suffix in 0..=255u8 {
                keys.push(OrderingKey::new(prefix, suffix));
            }
        }

        let count = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), count);
    }

    #[test]
    fn high_suffix_nibble_dominates_order() {
        assert!(OrderingKey::new(MAX_CODES - 1, 0x0f) < OrderingKey::new(0, 0x10));
        assert!(OrderingKey::new(5, 0x13) < OrderingKey::new(6, 0x10));
        assert!(OrderingKey::new(5, 0x13) < OrderingKey::new(5, 0x14));
    }
}
