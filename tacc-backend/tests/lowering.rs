//! End-to-end lowering tests
//!
//! Each program is lowered and then executed on the interpreter in
//! `common`, so the checks are on results rather than exact instruction
//! sequences.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use tacc_backend::tac::{CondBranchOp, TacBinaryOp, TacUnaryOp};
use tacc_backend::{compile_program, lower_function, lower_program, LoweringOptions, TacFunc, TacInstr, TacProg};
use tacc_codegen::{AsmFunction, AsmInst};
use tacc_common::{CompilerError, Label, Temp};

fn options(limit: Option<usize>) -> LoweringOptions {
    LoweringOptions { register_limit: limit, ..LoweringOptions::default() }
}

fn lower(funcs: Vec<TacFunc>, limit: Option<usize>) -> Vec<AsmFunction> {
    lower_program(&TacProg::new(funcs), &options(limit)).unwrap()
}

fn run(funcs: Vec<TacFunc>, limit: Option<usize>, entry: &str, args: &[i32]) -> i32 {
    Machine::new(&lower(funcs, limit)).run(entry, args)
}

fn func(name: &str, params: u32, instrs: Vec<TacInstr>) -> TacFunc {
    TacFunc::new(Label::func(name), (0..params).map(Temp).collect(), instrs)
}

/// sum of 1..=n computed in a loop; `n` in _T2
fn sum_loop(n: i32) -> TacFunc {
    func(
        "main",
        0,
        vec![
            li(0, 0),
            li(1, 1),
            li(2, n),
            mark(1),
            bin(TacBinaryOp::Sgt, 3, 1, 2),
            branch_if(CondBranchOp::Bne, 3, 2),
            bin(TacBinaryOp::Add, 0, 0, 1),
            li(4, 1),
            bin(TacBinaryOp::Add, 1, 1, 4),
            jump(1),
            mark(2),
            ret(0),
        ],
    )
}

/// Recursive factorial
fn factorial() -> TacFunc {
    func(
        "fact",
        1,
        vec![
            li(1, 1),
            bin(TacBinaryOp::Leq, 2, 0, 1),
            branch_if(CondBranchOp::Beq, 2, 10),
            ret(1),
            mark(10),
            bin(TacBinaryOp::Sub, 3, 0, 1),
            call(Some(4), "fact", &[3]),
            bin(TacBinaryOp::Mul, 5, 0, 4),
            ret(5),
        ],
    )
}

#[test]
fn test_linear_with_two_registers() {
    let main = func("main", 0, vec![li(0, 5), li(1, 6), bin(TacBinaryOp::Add, 2, 0, 1), ret(2)]);
    let asm = lower(vec![main.clone()], Some(2));

    // Both registers suffice, nothing is reloaded from a slot
    assert!(!asm[0].instructions.iter().any(|inst| matches!(inst, AsmInst::Lw(_, offset, _) if *offset < 0)));
    assert_eq!(Machine::new(&asm).run("main", &[]), 11);
}

#[test]
fn test_register_pressure_spills_correctly() {
    // ((1*2) + (3*4)) + (5*6) with six values live at once
    let instrs = vec![
        li(0, 1),
        li(1, 2),
        li(2, 3),
        li(3, 4),
        li(4, 5),
        li(5, 6),
        bin(TacBinaryOp::Mul, 6, 0, 1),
        bin(TacBinaryOp::Mul, 7, 2, 3),
        bin(TacBinaryOp::Mul, 8, 4, 5),
        bin(TacBinaryOp::Add, 9, 6, 7),
        bin(TacBinaryOp::Add, 10, 9, 8),
        ret(10),
    ];
    for limit in [Some(2), Some(3), Some(4), None] {
        let main = func("main", 0, instrs.clone());
        assert_eq!(run(vec![main], limit, "main", &[]), 44, "register limit {limit:?}");
    }
}

#[test]
fn test_call_passes_argument_and_result() {
    // main: _T0 = 1; _T1 = call inc(_T0); _T3 = 1; _T2 = _T1 + _T3; return _T2
    let inc = func("inc", 1, vec![li(1, 1), bin(TacBinaryOp::Add, 2, 0, 1), ret(2)]);
    let main = func(
        "main",
        0,
        vec![
            li(0, 1),
            call(Some(1), "inc", &[0]),
            li(3, 1),
            bin(TacBinaryOp::Add, 2, 1, 3),
            ret(2),
        ],
    );

    for limit in [Some(2), None] {
        assert_eq!(run(vec![main.clone(), inc.clone()], limit, "main", &[]), 3);
    }
}

#[test]
fn test_values_live_across_calls_survive() {
    // Caller-saved registers are scrambled by the interpreter on return
    let id = func("id", 1, vec![ret(0)]);
    let main = func(
        "main",
        0,
        vec![
            li(0, 100),
            li(1, 20),
            li(2, 3),
            call(Some(3), "id", &[2]),
            bin(TacBinaryOp::Add, 4, 0, 1),
            bin(TacBinaryOp::Add, 5, 4, 3),
            ret(5),
        ],
    );
    assert_eq!(run(vec![main, id], None, "main", &[]), 123);
}

#[test]
fn test_multiple_arguments() {
    let sub3 = func(
        "sub3",
        3,
        vec![bin(TacBinaryOp::Sub, 3, 0, 1), bin(TacBinaryOp::Sub, 4, 3, 2), ret(4)],
    );
    let main = func(
        "main",
        0,
        vec![li(0, 50), li(1, 8), li(2, 2), call(Some(3), "sub3", &[0, 1, 2]), ret(3)],
    );
    assert_eq!(run(vec![main.clone(), sub3.clone()], None, "main", &[]), 40);
    assert_eq!(run(vec![main, sub3], Some(2), "main", &[]), 40);
}

#[test]
fn test_recursion() {
    let main = func("main", 0, vec![li(0, 6), call(Some(1), "fact", &[0]), ret(1)]);
    for limit in [Some(2), None] {
        assert_eq!(run(vec![main.clone(), factorial()], limit, "main", &[]), 720);
    }
}

#[test]
fn test_loop() {
    assert_eq!(run(vec![sum_loop(10)], None, "main", &[]), 55);
    assert_eq!(run(vec![sum_loop(100)], Some(2), "main", &[]), 5050);
    assert_eq!(run(vec![sum_loop(0)], None, "main", &[]), 0);
}

#[test]
fn test_stack_parameters() {
    // Ten parameters: the last two arrive on the stack
    let mut instrs = vec![bin(TacBinaryOp::Add, 10, 0, 1)];
    for p in 2..10 {
        instrs.push(bin(TacBinaryOp::Add, 10, 10, p));
    }
    instrs.push(ret(10));
    let sum = func("sum10", 10, instrs);

    let args: Vec<i32> = (1..=10).collect();
    assert_eq!(run(vec![sum.clone()], None, "sum10", &args), 55);
    assert_eq!(run(vec![sum], Some(2), "sum10", &args), 55);
}

#[test]
fn test_unreachable_code_is_not_emitted() {
    let main = func(
        "main",
        0,
        vec![jump(1), li(5, 99), ret(5), mark(1), li(0, 7), ret(0)],
    );
    let asm = lower(vec![main], None);

    assert!(!asm[0].instructions.iter().any(|inst| matches!(inst, AsmInst::Li(_, 99))));
    assert_eq!(Machine::new(&asm).run("main", &[]), 7);
}

#[test]
fn test_branch_without_else_falls_into_exit() {
    // if (_T0 == 0) return 1; falls off the end otherwise, returning a0
    let f = func(
        "f",
        1,
        vec![
            branch_if(CondBranchOp::Bne, 0, 1),
            li(1, 1),
            ret(1),
            mark(1),
        ],
    );
    assert_eq!(run(vec![f.clone()], None, "f", &[0]), 1);
    // a0 still holds the argument
    assert_eq!(run(vec![f], None, "f", &[5]), 5);
}

#[test]
fn test_binary_operators() {
    let cases: &[(TacBinaryOp, fn(i32, i32) -> i32)] = &[
        (TacBinaryOp::Add, |a, b| a.wrapping_add(b)),
        (TacBinaryOp::Sub, |a, b| a.wrapping_sub(b)),
        (TacBinaryOp::Mul, |a, b| a.wrapping_mul(b)),
        (TacBinaryOp::Div, |a, b| a / b),
        (TacBinaryOp::Mod, |a, b| a % b),
        (TacBinaryOp::Equ, |a, b| (a == b) as i32),
        (TacBinaryOp::Neq, |a, b| (a != b) as i32),
        (TacBinaryOp::Slt, |a, b| (a < b) as i32),
        (TacBinaryOp::Sgt, |a, b| (a > b) as i32),
        (TacBinaryOp::Leq, |a, b| (a <= b) as i32),
        (TacBinaryOp::Geq, |a, b| (a >= b) as i32),
        (TacBinaryOp::Lor, |a, b| (a != 0 || b != 0) as i32),
        (TacBinaryOp::Land, |a, b| (a != 0 && b != 0) as i32),
    ];
    let inputs = [(7, 3), (-7, 3), (3, 7), (4, 4), (0, 5), (5, -1)];

    for &(op, expected) in cases {
        let f = func("f", 2, vec![bin(op, 2, 0, 1), ret(2)]);
        let asm = lower(vec![f], None);
        let mut machine = Machine::new(&asm);
        for (a, b) in inputs {
            assert_eq!(machine.run("f", &[a, b]), expected(a, b), "{op:?} {a} {b}");
        }
    }
}

#[test]
fn test_unary_operators() {
    let cases: &[(TacUnaryOp, fn(i32) -> i32)] = &[
        (TacUnaryOp::Neg, |a| a.wrapping_neg()),
        (TacUnaryOp::BitNot, |a| !a),
        (TacUnaryOp::LogicNot, |a| (a == 0) as i32),
    ];
    for &(op, expected) in cases {
        let f = func("f", 1, vec![un(op, 1, 0), ret(1)]);
        let mut machine = Machine::new(&lower(vec![f], None));
        for a in [0, 1, -9, 42] {
            assert_eq!(machine.run("f", &[a]), expected(a), "{op:?} {a}");
        }
    }
}

#[test]
fn test_memo_and_physical_operands() {
    // A register operand is used as-is
    let f = func(
        "f",
        0,
        vec![
            TacInstr::Memo { text: "copy a0".to_string() },
            TacInstr::LoadImm { dst: tacc_backend::Operand::Reg(tacc_codegen::Reg::A0), value: 9 },
            TacInstr::Assign { dst: t(0), src: tacc_backend::Operand::Reg(tacc_codegen::Reg::A0) },
            ret(0),
        ],
    );
    let asm = lower(vec![f], None);
    assert!(asm[0].instructions.contains(&AsmInst::Comment("copy a0".to_string())));
    assert_eq!(Machine::new(&asm).run("f", &[]), 9);
}

#[test]
fn test_frame_saves_return_address_only_with_calls() {
    let leaf = lower_function(&func("leaf", 0, vec![li(0, 1), ret(0)]), &options(None)).unwrap();
    let caller = lower_function(
        &func("caller", 0, vec![call(Some(0), "leaf", &[]), ret(0)]),
        &options(None),
    )
    .unwrap();

    let saves_ra = |asm: &AsmFunction| {
        asm.instructions
            .iter()
            .any(|inst| matches!(inst, AsmInst::Sw(tacc_codegen::Reg::Ra, _, _)))
    };
    assert!(!saves_ra(&leaf));
    assert!(saves_ra(&caller));
}

#[test]
fn test_compile_program_from_json() {
    let prog = TacProg::from_json(
        r#"{
            "funcs": [{
                "name": "main",
                "instrs": [
                    { "LoadImm": { "dst": 0, "value": 2 } },
                    { "LoadImm": { "dst": 1, "value": 40 } },
                    { "Binary": { "op": "Add", "dst": 2, "lhs": 0, "rhs": 1 } },
                    { "Return": { "value": 2 } }
                ]
            }, {
                "name": "unused",
                "instrs": []
            }]
        }"#,
    )
    .unwrap();

    let text = compile_program(&prog, &LoweringOptions::default()).unwrap();
    assert!(text.starts_with("    .text\n    .global main\n"));
    assert!(!text.contains("unused"));
    assert!(text.contains("\nmain:\n"));
    assert!(text.contains("main_exit:\n"));
    assert!(text.trim_end().ends_with("ret"));

    let asm = lower_program(&prog, &LoweringOptions::default()).unwrap();
    assert_eq!(Machine::new(&asm).run("main", &[]), 42);
}

#[test]
fn test_invalid_programs_are_reported() {
    let bad_jump = func("bad", 0, vec![jump(4)]);
    let err = lower_program(&TacProg::new(vec![bad_jump]), &options(None)).unwrap_err();
    assert!(matches!(err, CompilerError::InvalidTac { ref function, .. } if function == "bad"));

    let too_many = func("many", 9, vec![call(None, "f", &[0, 1, 2, 3, 4, 5, 6, 7, 8]), TacInstr::Return { value: None }]);
    let err = lower_program(&TacProg::new(vec![too_many]), &options(None)).unwrap_err();
    assert!(matches!(err, CompilerError::CodegenError { ref function, .. } if function == "many"));
}
