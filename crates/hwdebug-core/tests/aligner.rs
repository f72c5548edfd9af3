//! Tests for the watchpoint range aligner

use hwdebug_core::types::AddressRange;
use hwdebug_core::watchpoint::{align_range, is_hardware_aligned, SUPPORTED_SIZES};
use hwdebug_core::HwDebugError;
use proptest::prelude::*;

fn range(begin: u64, end: u64) -> AddressRange
{
    AddressRange::new(begin, end).unwrap()
}

#[test]
fn test_documented_examples()
{
    assert_eq!(align_range(range(0x10, 0x11)).unwrap(), range(0x10, 0x11));
    assert_eq!(align_range(range(0x11, 0x13)).unwrap(), range(0x10, 0x14));
    assert!(matches!(
        align_range(range(0x14, 0x19)),
        Err(HwDebugError::UnrepresentableRange(_))
    ));
    assert_eq!(align_range(range(0x18, 0x20)).unwrap(), range(0x18, 0x20));
}

#[test]
fn test_ranges_longer_than_eight_bytes_fail()
{
    assert!(align_range(range(0x1000, 0x1009)).is_err());
    assert!(align_range(range(0, u64::MAX)).is_err());
}

proptest! {
    #[test]
    fn prop_aligned_window_contains_request(begin in 0u64..1 << 48, len in 1u64..=8)
    {
        let requested = range(begin, begin + len);
        if let Ok(aligned) = align_range(requested) {
            prop_assert!(aligned.contains_range(&requested));
            prop_assert!(is_hardware_aligned(&aligned));
        }
    }

    #[test]
    fn prop_aligned_window_is_minimal(begin in 0u64..1 << 48, len in 1u64..=8)
    {
        let requested = range(begin, begin + len);
        if let Ok(aligned) = align_range(requested) {
            // No smaller supported window covers the request.
            for size in SUPPORTED_SIZES.into_iter().filter(|&size| size < aligned.size()) {
                let base = begin & !(size - 1);
                prop_assert!(base + size < begin + len);
            }
        }
    }

    #[test]
    fn prop_aligned_ranges_are_fixed_points(slot in 0u64..1 << 40, size_index in 0usize..4)
    {
        let size = SUPPORTED_SIZES[size_index];
        let requested = range(slot * size, slot * size + size);
        prop_assert_eq!(align_range(requested).unwrap(), requested);
    }

    #[test]
    fn prop_requests_inside_one_doubleword_always_align(word in 0u64..1 << 40, start in 0u64..8, len in 1u64..=8)
    {
        prop_assume!(start + len <= 8);
        let begin = word * 8 + start;
        prop_assert!(align_range(range(begin, begin + len)).is_ok());
    }
}
