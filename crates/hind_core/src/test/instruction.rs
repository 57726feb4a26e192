use crate::cpu::instruction::{BlockMode, Cond, Instruction};

#[test]
fn zero_word_is_halt() {
    assert_eq!(Instruction::decode(0), Instruction::Halt);
}

#[test]
fn bx_magic_wins_over_type_bits() {
    // The magic occupies bits 4..27, so the type bits alone would claim
    // this is a data-processing word.
    for cond in 0..16_u32 {
        for rn in 0..16_u32 {
            let word = (cond << 28) | 0x012f_ff10 | rn;
            match Instruction::decode(word) {
                Instruction::Bx(op) => assert_eq!(op.rn, rn),
                other => panic!("{word:08x} decoded as {other:?}"),
            }
        }
    }
}

#[test]
fn data_processing_fields() {
    let inst = match Instruction::decode(0xe3a0_1005) {
        Instruction::Proc(op) => op,
        other => panic!("decoded as {other:?}"),
    };

    assert_eq!(inst.cond, Cond::Al);
    assert!(inst.imm);
    assert!(!inst.set_cond);
    assert_eq!(inst.opcode, 0xd);
    assert_eq!(inst.rn, 0);
    assert_eq!(inst.rd, 1);
    assert_eq!(inst.op2, 0x005);
}

#[test]
fn multiply_needs_its_magic() {
    assert!(matches!(
        Instruction::decode(0xe003_0291),
        Instruction::Mult(_)
    ));
    // Same word with bits 4..7 cleared is data processing.
    assert!(matches!(
        Instruction::decode(0xe003_0201),
        Instruction::Proc(_)
    ));
}

#[test]
fn single_transfer_fields() {
    let inst = match Instruction::decode(0xe591_2000) {
        Instruction::Sdt(op) => op,
        other => panic!("decoded as {other:?}"),
    };

    assert!(inst.load);
    assert!(inst.pre);
    assert!(inst.up);
    assert!(!inst.reg_offset);
    assert_eq!(inst.rn, 1);
    assert_eq!(inst.rd, 2);
    assert_eq!(inst.offset, 0);
}

#[test]
fn block_transfer_fields() {
    let inst = match Instruction::decode(0xe8b0_000e) {
        Instruction::Bdt(op) => op,
        other => panic!("decoded as {other:?}"),
    };

    assert!(inst.load);
    assert!(inst.writeback);
    assert_eq!(inst.mode, BlockMode::PostInc);
    assert_eq!(inst.rn, 0);
    assert_eq!(inst.reg_mask, 0xe);

    let inst = match Instruction::decode(0xe92d_0006) {
        Instruction::Bdt(op) => op,
        other => panic!("decoded as {other:?}"),
    };
    assert_eq!(inst.mode, BlockMode::PreDec);
}

#[test]
fn branch_fields() {
    let inst = match Instruction::decode(0x1aff_fffc) {
        Instruction::Branch(op) => op,
        other => panic!("decoded as {other:?}"),
    };

    assert_eq!(inst.cond, Cond::Ne);
    assert!(!inst.link);
    assert_eq!(inst.offset, 0xff_fffc);

    assert!(matches!(
        Instruction::decode(0xeb00_0001),
        Instruction::Branch(op) if op.link
    ));
}

#[test]
fn undecodable_word_is_a_bubble() {
    // Type bits 11 belong to no family.
    assert_eq!(Instruction::decode(0xec00_0000), Instruction::Empty);
}

#[test]
fn condition_predicates() {
    // (cond, n, z, c, v, expected)
    let table = [
        (Cond::Eq, false, true, false, false, true),
        (Cond::Eq, false, false, false, false, false),
        (Cond::Ne, false, false, false, false, true),
        (Cond::Cs, false, false, true, false, true),
        (Cond::Cc, false, false, true, false, false),
        (Cond::Mi, true, false, false, false, true),
        (Cond::Pl, true, false, false, false, false),
        (Cond::Vs, false, false, false, true, true),
        (Cond::Vc, false, false, false, true, false),
        (Cond::Hi, false, false, true, false, true),
        (Cond::Hi, false, true, true, false, false),
        (Cond::Ls, false, true, true, false, true),
        (Cond::Ls, false, false, true, false, false),
        (Cond::Ge, true, false, false, true, true),
        (Cond::Ge, true, false, false, false, false),
        (Cond::Lt, true, false, false, false, true),
        (Cond::Gt, false, false, false, false, true),
        (Cond::Gt, false, true, false, false, false),
        (Cond::Le, false, true, false, false, true),
        (Cond::Le, false, false, false, false, false),
        (Cond::Al, true, true, true, true, true),
    ];

    for (cond, n, z, c, v, expected) in table {
        assert_eq!(cond.passes(n, z, c, v), expected, "{cond:?}");
    }
}

#[test]
fn reserved_condition_never_passes() {
    assert_eq!(Cond::from_field(0xf), Cond::Nv);
    for flags in 0..16_u32 {
        let n = flags & 1 != 0;
        let z = flags & 2 != 0;
        let c = flags & 4 != 0;
        let v = flags & 8 != 0;
        assert!(!Cond::Nv.passes(n, z, c, v));
    }
}
