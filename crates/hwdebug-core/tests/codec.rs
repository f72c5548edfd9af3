//! Tests for the debug register codec

use hwdebug_core::debug_registers::{arm64, x64, BitField, RegisterLayout};
use proptest::prelude::*;

const LAYOUTS: [RegisterLayout; 7] = [
    x64::DR6,
    x64::DR7,
    arm64::DBGBCR,
    arm64::DBGWCR,
    arm64::ESR,
    arm64::ID_AA64DFR0,
    arm64::MDSCR,
];

fn all_fields() -> Vec<BitField>
{
    LAYOUTS.iter().flat_map(|layout| layout.fields.iter().copied()).collect()
}

#[test]
fn test_fields_fit_their_register_and_do_not_overlap()
{
    for layout in LAYOUTS {
        let mut used = 0u64;
        for field in layout.fields {
            assert!(field.shift + field.width <= layout.bits, "{}.{}", layout.name, field.name);
            assert_eq!(used & field.mask(), 0, "{}.{} overlaps", layout.name, field.name);
            used |= field.mask();
        }
    }
}

#[test]
fn test_decode_lists_fields_in_order()
{
    let decoded = x64::DR7.decode(0x000d_0001);
    assert_eq!(decoded[0], ("l0", 1));
    assert!(decoded.contains(&("rw0", 1)));
    assert!(decoded.contains(&("len0", 3)));
    assert_eq!(decoded.len(), x64::DR7.fields.len());
}

#[test]
fn test_esr_exception_class()
{
    // BRK #0 from EL0: EC=0x3c, IL=1
    let esr = 0xf200_0000u64;
    assert_eq!(arm64::ESR.get(esr, "ec"), Some(0x3c));
    assert_eq!(arm64::ESR_IL.get(esr), 1);
    assert_eq!(arm64::ESR.get(esr, "missing"), None);
}

proptest! {
    #[test]
    fn prop_set_get_is_identity(index in any::<prop::sample::Index>(), raw in any::<u64>())
    {
        let fields = all_fields();
        let field = fields[index.index(fields.len())];
        prop_assert_eq!(field.with(raw, field.get(raw)), raw);
    }

    #[test]
    fn prop_get_after_set_returns_value(index in any::<prop::sample::Index>(), raw in any::<u64>(), value in any::<u64>())
    {
        let fields = all_fields();
        let field = fields[index.index(fields.len())];
        let value = value & field.max_value();
        let updated = field.with(raw, value);
        prop_assert_eq!(field.get(updated), value);
        // Bits outside the field are untouched.
        prop_assert_eq!(updated & !field.mask(), raw & !field.mask());
    }

    #[test]
    fn prop_layout_set_rejects_oversized_values(raw in any::<u64>(), extra in 1u64..16)
    {
        let mut value = raw;
        let field = x64::DR7.field("len2").unwrap();
        let result = x64::DR7.set(&mut value, "len2", field.max_value() + extra);
        prop_assert!(result.is_err());
        prop_assert_eq!(value, raw);
    }
}
