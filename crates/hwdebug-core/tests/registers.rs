//! Tests for the register descriptor table

use std::collections::HashSet;

use hwdebug_core::registers::{
    self, all_registers, architecture_of, block_size, category_of, describe, dwarf_number, register_id_for_dwarf,
    register_info, registers_in, resolve, resolve_any, special_register_id, SpecialRegister, ID_RANGES,
};
use hwdebug_core::registers::{arm64, x64};
use hwdebug_core::types::{Architecture, Register, RegisterCategory, RegisterId};
use hwdebug_core::HwDebugError;

const ARCHES: [Architecture; 2] = [Architecture::Arm64, Architecture::X64];

#[test]
fn test_every_defined_id_has_a_category()
{
    for arch in ARCHES {
        for info in all_registers(arch) {
            assert_eq!(category_of(info.id), Some(info.category), "{}", info.name);
            assert_eq!(architecture_of(info.id), Some(arch), "{}", info.name);
            assert_eq!(info.id.category(), Some(info.category));
        }
    }
}

#[test]
fn test_ids_outside_ranges_have_no_category()
{
    for raw in [0, 1, 999, 1300, 1999, 2500, 3000, u32::MAX] {
        assert_eq!(category_of(RegisterId::from_raw(raw)), None, "{raw}");
    }
    // Boundaries of each range are inside it.
    for range in ID_RANGES {
        assert_eq!(category_of(RegisterId::from_raw(range.first)), Some(range.category));
        assert_eq!(category_of(RegisterId::from_raw(range.last)), Some(range.category));
    }
}

#[test]
fn test_id_ranges_do_not_overlap()
{
    for pair in ID_RANGES.windows(2) {
        assert!(pair[0].last < pair[1].first, "{:?} overlaps {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_names_are_unique_per_architecture()
{
    for arch in ARCHES {
        let mut seen = HashSet::new();
        for info in all_registers(arch) {
            assert!(seen.insert(info.name), "duplicate name {} on {arch}", info.name);
            assert_eq!(resolve(arch, info.name), info.id);
        }
    }
}

#[test]
fn test_describe_and_resolve()
{
    let desc = describe(x64::RIP).unwrap();
    assert_eq!(desc.name, "rip");
    assert_eq!(desc.arch, Architecture::X64);

    assert_eq!(resolve(Architecture::X64, "RIP"), x64::RIP);
    assert_eq!(resolve(Architecture::Arm64, "Pc"), arm64::PC);
    assert_eq!(resolve(Architecture::Arm64, "rax"), RegisterId::UNKNOWN);
    assert_eq!(resolve(Architecture::X64, ""), RegisterId::UNKNOWN);
    assert_eq!(resolve(Architecture::Unknown("riscv64"), "pc"), RegisterId::UNKNOWN);

    assert!(describe(RegisterId::UNKNOWN).is_none());
    assert!(describe(RegisterId::from_raw(1099)).is_none());
    assert!(register_info(RegisterId::from_raw(0xdead_beef)).is_none());
}

#[test]
fn test_sp_exists_on_both_architectures()
{
    let matches = resolve_any("sp");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0], arm64::SP);
    assert_eq!(describe(matches[1]).unwrap().arch, Architecture::X64);
    assert!(resolve_any("no_such_register").is_empty());
}

#[test]
fn test_registers_in_category()
{
    assert!(registers_in(Architecture::Arm64, RegisterCategory::FloatingPoint).is_empty());
    assert_eq!(block_size(Architecture::Arm64, RegisterCategory::FloatingPoint), None);

    let general = registers_in(Architecture::X64, RegisterCategory::General);
    assert_eq!(general.len(), 20);
    assert_eq!(general[0].id, x64::RAX);
    assert!(general.iter().all(|info| info.is_canonical()));

    let arm_general = registers_in(Architecture::Arm64, RegisterCategory::General);
    assert_eq!(arm_general.len(), 35);

    let arm_debug = registers_in(Architecture::Arm64, RegisterCategory::Debug);
    assert_eq!(arm_debug.len(), 2 + 4 * arm64::MAX_HW_SLOTS);
}

#[test]
fn test_canonical_registers_fit_their_block_without_overlap()
{
    for arch in ARCHES {
        for category in RegisterCategory::ALL {
            let infos = registers_in(arch, category);
            let Some(size) = block_size(arch, category) else {
                assert!(infos.is_empty());
                continue;
            };
            let mut spans: Vec<(usize, usize)> = infos
                .iter()
                .map(|info| {
                    let offset = info.block_offset.unwrap();
                    (offset, offset + info.size)
                })
                .collect();
            spans.sort_unstable();
            for (start, end) in &spans {
                assert!(*end <= size, "{arch} {category}: {start:#x}..{end:#x} exceeds {size:#x}");
            }
            for pair in spans.windows(2) {
                assert!(pair[0].1 <= pair[1].0, "{arch} {category}: {:?} overlaps {:?}", pair[0], pair[1]);
            }
        }
    }
}

#[test]
fn test_sub_registers_point_at_canonical_storage()
{
    for arch in ARCHES {
        for info in all_registers(arch).into_iter().filter(|info| !info.is_canonical()) {
            let canonical = register_info(info.canonical).unwrap();
            assert!(canonical.is_canonical());
            assert_eq!(canonical.category, info.category);
            assert!(info.shift + info.bits <= canonical.bits, "{}", info.name);
            assert!(info.block_offset.is_none());
        }
    }
}

#[test]
fn test_block_offsets_match_documented_layouts()
{
    let offset = |id| register_info(id).unwrap().block_offset.unwrap();
    assert_eq!(offset(arm64::LR), 0xf0);
    assert_eq!(offset(arm64::PC), 0x100);
    assert_eq!(offset(arm64::v(31)), 8 + 31 * 16);
    assert_eq!(offset(arm64::dbgwvr(2)), 0x100 + 2 * 16 + 8);
    assert_eq!(offset(x64::RIP), 0x80);
    assert_eq!(offset(x64::st(7)), 0x20 + 7 * 16);
    assert_eq!(offset(x64::k(1)), 0x808);
    assert_eq!(offset(x64::DR7), 0x28);
}

#[test]
fn test_dwarf_numbers()
{
    assert_eq!(register_id_for_dwarf(Architecture::X64, 7), x64::RSP);
    assert_eq!(register_id_for_dwarf(Architecture::X64, 16), x64::RIP);
    assert_eq!(register_id_for_dwarf(Architecture::X64, 17), x64::xmm(0));
    assert_eq!(register_id_for_dwarf(Architecture::Arm64, 31), arm64::SP);
    assert_eq!(register_id_for_dwarf(Architecture::Arm64, 999), RegisterId::UNKNOWN);
    assert_eq!(dwarf_number(arm64::v(3)), Some(67));
    assert_eq!(dwarf_number(x64::RBX), Some(3));
    assert_eq!(dwarf_number(arm64::PC), None);
}

#[test]
fn test_special_registers()
{
    assert_eq!(special_register_id(Architecture::Arm64, SpecialRegister::Ip), arm64::PC);
    assert_eq!(special_register_id(Architecture::X64, SpecialRegister::Sp), x64::RSP);
    assert_eq!(special_register_id(Architecture::X64, SpecialRegister::Tp), x64::FS_BASE);
    assert_eq!(
        special_register_id(Architecture::Unknown("mips"), SpecialRegister::Ip),
        RegisterId::UNKNOWN
    );
}

#[test]
fn test_register_value_records()
{
    let rax = Register::from_u64(x64::RAX, 0x1122_3344_5566_7788).unwrap();
    let eax = rax.extract(register_info(x64::EAX).unwrap()).unwrap();
    assert_eq!(eax.value_u64(), Some(0x5566_7788));
    let ah = rax.extract(register_info(x64::AH).unwrap()).unwrap();
    assert_eq!(ah.value_u64(), Some(0x77));
    // w0 is not a slice of rax.
    assert!(rax.extract(register_info(arm64::W0).unwrap()).is_none());

    assert!(matches!(
        Register::new(x64::RAX, &[0; 4]),
        Err(HwDebugError::RegisterSizeMismatch { expected: 8, actual: 4, .. })
    ));
    assert!(matches!(
        Register::new(RegisterId::from_raw(5), &[0; 8]),
        Err(HwDebugError::UnknownRegister(_))
    ));

    let zmm = Register::new(x64::zmm(0), &[0xab; 64]).unwrap();
    assert_eq!(zmm.value_u128(), None);
    assert_eq!(registers::register_info(x64::ymm(0)).unwrap().size, 32);
}
