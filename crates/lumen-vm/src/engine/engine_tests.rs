//! Engine tests: interpreter semantics, scheduler behavior, and the
//! firmware-facing surfaces.

use lumen_image::{Channel, CmpOp, ImageBuilder, ImageError, Instruction as I, LoadOptions, hash_name};

use super::error::{LoadError, VmFault};
use super::interp::{MAX_CYCLES, evaluate};
use super::memory::DataMemory;
use super::scheduler::{Program, Status};

fn asm(instrs: &[I]) -> Vec<u8> {
    let mut buf = Vec::new();
    for instr in instrs {
        instr.encode_into(&mut buf);
    }
    buf
}

/// Image with one counter word: init sets it to 42, each loop tick adds 1.
fn counter_image() -> Vec<u8> {
    let mut b = ImageBuilder::new();
    b.data_word(0).data_word(1);
    let init = b.code_offset();
    b.instruction(I::Ldi { dst: 0, value: 42 });
    b.instruction(I::Halt);
    let loop_at = b.code_offset();
    b.instruction(I::Add { dst: 0, a: 0, b: 1 });
    b.instruction(I::Halt);
    b.init_entry(init).loop_entry(loop_at);
    b.publish_var(hash_name("counter"), 0);
    b.build()
}

/// Image whose loop phase immediately faults.
fn trapping_image() -> Vec<u8> {
    let mut b = ImageBuilder::new();
    b.data_word(0);
    let init = b.code_offset();
    b.instruction(I::Halt);
    let loop_at = b.code_offset();
    b.instruction(I::Ldi { dst: 0, value: 7 });
    b.instruction(I::Trap);
    b.instruction(I::Halt);
    b.init_entry(init).loop_entry(loop_at);
    b.build()
}

#[test]
fn init_then_three_loops_counts_to_45() {
    let mut program = Program::load(counter_image(), LoadOptions::new()).unwrap();
    assert_eq!(program.status(), Status::Loaded);

    program.run_init().unwrap();
    assert_eq!(program.status(), Status::Initialized);
    assert_eq!(program.get(0), 42);

    for _ in 0..3 {
        program.run_loop().unwrap();
    }
    assert_eq!(program.get(0), 45);
    assert_eq!(program.frame_number(), 3);
    assert_eq!(program.status(), Status::Running);
}

#[test]
fn runaway_loop_hits_cycle_budget() {
    let mut b = ImageBuilder::new();
    b.data_word(0);
    let init = b.code_offset();
    b.instruction(I::Halt);
    let loop_at = b.code_offset();
    // Unconditional backward branch with no exit.
    b.instruction(I::Jmp { target: loop_at });
    b.instruction(I::Halt);
    b.init_entry(init).loop_entry(loop_at);

    let mut program = Program::load(b.build(), LoadOptions::new()).unwrap();
    program.run_init().unwrap();

    let fault = program.run_loop().unwrap_err();
    assert_eq!(fault, VmFault::MaxCycles(MAX_CYCLES));
    assert_eq!(program.status(), Status::Faulted);
}

#[test]
fn frame_advances_on_success_and_on_fault() {
    let mut program = Program::load(counter_image(), LoadOptions::new()).unwrap();
    program.run_init().unwrap();
    assert_eq!(program.frame_number(), 0);
    program.run_loop().unwrap();
    assert_eq!(program.frame_number(), 1);

    // The increment happens on entry, before the first instruction, so a
    // faulted tick still counts its frame.
    let mut program = Program::load(trapping_image(), LoadOptions::new()).unwrap();
    program.run_init().unwrap();
    program.run_loop().unwrap_err();
    assert_eq!(program.frame_number(), 1);
    program.run_loop().unwrap_err();
    assert_eq!(program.frame_number(), 2);
}

#[test]
fn fault_preserves_memory_up_to_the_faulting_instruction() {
    let mut program = Program::load(trapping_image(), LoadOptions::new()).unwrap();
    program.run_init().unwrap();

    let fault = program.run_loop().unwrap_err();
    assert!(matches!(fault, VmFault::Trap(_)));
    // The ldi before the trap landed; nothing after it ran.
    assert_eq!(program.get(0), 7);
}

#[test]
fn falling_off_the_end_is_a_fault() {
    let mut b = ImageBuilder::new();
    b.data_word(0);
    // A single add is exactly one word; no halt follows it.
    b.instruction(I::Add { dst: 0, a: 0, b: 0 });
    let mut program = Program::load(b.build(), LoadOptions::new()).unwrap();

    let fault = program.run_init().unwrap_err();
    assert_eq!(fault, VmFault::CodeOutOfBounds(4));
    assert_eq!(program.status(), Status::Faulted);
}

#[test]
fn pad_bytes_decode_as_invalid_opcodes() {
    let mut b = ImageBuilder::new();
    b.data_word(0);
    // Ldi is 6 bytes; the builder pads to 8 with zero bytes.
    b.instruction(I::Ldi { dst: 0, value: 1 });
    let mut program = Program::load(b.build(), LoadOptions::new()).unwrap();

    let fault = program.run_init().unwrap_err();
    assert_eq!(fault, VmFault::InvalidOpcode(0));
}

#[test]
fn divide_by_zero_faults() {
    let code = asm(&[
        I::Ldi { dst: 0, value: 5 },
        I::Ldi { dst: 1, value: 0 },
        I::Div { dst: 0, a: 0, b: 1 },
        I::Halt,
    ]);
    let mut memory = DataMemory::new(vec![0; 2]);
    assert_eq!(evaluate(&code, &mut memory), Err(VmFault::DivideByZero));
}

#[test]
fn assert_faults_on_zero_and_passes_on_nonzero() {
    let code = asm(&[I::Assert { src: 0 }, I::Halt]);

    let mut memory = DataMemory::new(vec![0]);
    assert!(matches!(
        evaluate(&code, &mut memory),
        Err(VmFault::AssertFailed(0))
    ));

    let mut memory = DataMemory::new(vec![1]);
    assert_eq!(evaluate(&code, &mut memory), Ok(1));
}

#[test]
fn evaluate_computes_expressions() {
    // (2 + 3) * 4
    let code = asm(&[
        I::Ldi { dst: 0, value: 2 },
        I::Ldi { dst: 1, value: 3 },
        I::Add { dst: 0, a: 0, b: 1 },
        I::Ldi { dst: 1, value: 4 },
        I::Mul { dst: 0, a: 0, b: 1 },
        I::Halt,
    ]);
    let mut memory = DataMemory::new(vec![0; 2]);
    assert_eq!(evaluate(&code, &mut memory), Ok(20));
}

#[test]
fn evaluate_has_no_key_context() {
    let code = asm(&[I::KLoad { dst: 0, key: 0 }, I::Halt]);
    let mut memory = DataMemory::new(vec![0]);
    assert_eq!(evaluate(&code, &mut memory), Err(VmFault::UnboundKey(0)));
}

#[test]
fn conditional_branches_select_paths() {
    // d0 = if d1 != 0 { 10 } else { 20 }
    let mut buf = Vec::new();
    I::Jnz {
        src: 1,
        target: 14,
    }
    .encode_into(&mut buf); // 0..4
    I::Ldi { dst: 0, value: 20 }.encode_into(&mut buf); // 4..10
    I::Jmp { target: 20 }.encode_into(&mut buf); // 10..13
    buf.push(0); // 13..14 pad
    I::Ldi { dst: 0, value: 10 }.encode_into(&mut buf); // 14..20
    I::Halt.encode_into(&mut buf); // 20

    let mut memory = DataMemory::new(vec![0, 0]);
    assert_eq!(evaluate(&buf, &mut memory), Ok(20));

    let mut memory = DataMemory::new(vec![0, 1]);
    assert_eq!(evaluate(&buf, &mut memory), Ok(10));
}

#[test]
fn cmp_writes_boolean_words() {
    let code = asm(&[
        I::Ldi { dst: 1, value: 3 },
        I::Ldi { dst: 2, value: 5 },
        I::Cmp {
            op: CmpOp::Lt,
            dst: 0,
            a: 1,
            b: 2,
        },
        I::Halt,
    ]);
    let mut memory = DataMemory::new(vec![0; 3]);
    assert_eq!(evaluate(&code, &mut memory), Ok(1));
}

#[test]
fn key_flow_inject_kload_kstore_export() {
    let mut b = ImageBuilder::new();
    b.data_word(0).data_word(0).data_word(0);
    let init = b.code_offset();
    b.instruction(I::Halt);
    let loop_at = b.code_offset();
    // d0 = read key 0 ("speed"), doubled into write key 0 ("result").
    b.instruction(I::KLoad { dst: 0, key: 0 });
    b.instruction(I::Add { dst: 0, a: 0, b: 0 });
    b.instruction(I::KStore { key: 0, src: 0 });
    b.instruction(I::Halt);
    b.init_entry(init).loop_entry(loop_at);
    b.read_key(hash_name("speed"), 1);
    b.write_key(hash_name("result"), 2);
    b.publish_var(hash_name("result"), 2);

    let mut program = Program::load(b.build(), LoadOptions::new()).unwrap();
    program.run_init().unwrap();

    program.inject(hash_name("speed"), 21).unwrap();
    program.run_loop().unwrap();

    assert_eq!(program.export(hash_name("result")), Ok(42));
    assert_eq!(program.published(), vec![(hash_name("result"), 42)]);

    let missing = hash_name("missing");
    assert!(program.inject(missing, 0).is_err());
    assert!(program.export(missing).is_err());
}

#[test]
fn unbound_key_write_faults_without_mutation() {
    let mut b = ImageBuilder::new();
    b.data_word(0).data_word(0);
    let init = b.code_offset();
    b.instruction(I::Halt);
    let loop_at = b.code_offset();
    // No write keys are bound; index 0 does not resolve.
    b.instruction(I::KStore { key: 0, src: 0 });
    b.instruction(I::Ldi { dst: 1, value: 9 });
    b.instruction(I::Halt);
    b.init_entry(init).loop_entry(loop_at);

    let mut program = Program::load(b.build(), LoadOptions::new()).unwrap();
    program.run_init().unwrap();

    let fault = program.run_loop().unwrap_err();
    assert_eq!(fault, VmFault::UnboundKey(0));
    assert_eq!(program.get(0), 0);
    assert_eq!(program.get(1), 0);
}

#[test]
fn restricted_write_key_is_rejected_at_load() {
    let restricted = hash_name("pix_count");
    let mut b = ImageBuilder::new();
    b.data_word(0);
    b.instruction(I::Halt);
    b.write_key(restricted, 0);

    let err = Program::load(b.build(), LoadOptions::new()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Image(ImageError::RestrictedKey { hash }) if hash == restricted
    ));
}

#[test]
fn pixel_store_and_load() {
    let mut b = ImageBuilder::new();
    b.data_word(0).data_word(0);
    let init = b.code_offset();
    b.instruction(I::Ldi {
        dst: 0,
        value: 120,
    });
    b.instruction(I::PStore {
        chan: Channel::Hue,
        obj: 1,
        src: 0,
    });
    b.instruction(I::PLoad {
        chan: Channel::Hue,
        dst: 1,
        obj: 1,
    });
    b.instruction(I::Halt);
    b.init_entry(init).loop_entry(init);
    b.pixel_object(0, 30);
    b.pixel_object(30, 30);

    let mut program = Program::load(b.build(), LoadOptions::new()).unwrap();
    program.run_init().unwrap();

    assert_eq!(program.pixels().len(), 2);
    assert_eq!(program.pixels()[1].hue, 120);
    assert_eq!(program.pixels()[0].hue, 0);
    assert_eq!(program.get(1), 120);
}

#[test]
fn unbound_pixel_object_faults() {
    let mut b = ImageBuilder::new();
    b.data_word(0);
    b.instruction(I::PStore {
        chan: Channel::Val,
        obj: 3,
        src: 0,
    });
    b.instruction(I::Halt);

    let mut program = Program::load(b.build(), LoadOptions::new()).unwrap();
    let fault = program.run_init().unwrap_err();
    assert_eq!(fault, VmFault::UnboundPixelObject(3));
}

#[test]
fn seeded_runs_are_reproducible() {
    fn draw_sequence(seed: u64) -> Vec<i32> {
        let mut b = ImageBuilder::new();
        b.data_word(0);
        let init = b.code_offset();
        b.instruction(I::Halt);
        let loop_at = b.code_offset();
        b.instruction(I::Rand { dst: 0 });
        b.instruction(I::Halt);
        b.init_entry(init).loop_entry(loop_at);

        let mut program = Program::load_seeded(b.build(), LoadOptions::new(), seed).unwrap();
        program.run_init().unwrap();
        (0..8)
            .map(|_| {
                program.run_loop().unwrap();
                program.get(0)
            })
            .collect()
    }

    assert_eq!(draw_sequence(7), draw_sequence(7));
    assert_ne!(draw_sequence(7), draw_sequence(8));
}

#[test]
fn loading_twice_differs_only_in_seed() {
    let bytes = counter_image();
    let first = Program::load(bytes.clone(), LoadOptions::new()).unwrap();
    let second = Program::load(bytes, LoadOptions::new()).unwrap();

    let mut a = [0i32; 2];
    let mut b = [0i32; 2];
    first.get_multi(0, &mut a);
    second.get_multi(0, &mut b);
    assert_eq!(a, b);
    assert_eq!(first.frame_number(), 0);
    assert_eq!(second.frame_number(), 0);
    // Fresh entropy per load.
    assert_ne!(first.state().rng_state(), second.state().rng_state());
}

#[test]
fn set_get_roundtrip_through_the_program_handle() {
    let mut program = Program::load(counter_image(), LoadOptions::new()).unwrap();
    program.set(1, -99);
    assert_eq!(program.get(1), -99);

    let mut out = [0i32; 2];
    program.get_multi(0, &mut out);
    assert_eq!(out, [0, -99]);
}

#[test]
fn frame_instruction_reads_the_counter() {
    let mut b = ImageBuilder::new();
    b.data_word(0);
    let init = b.code_offset();
    b.instruction(I::Halt);
    let loop_at = b.code_offset();
    b.instruction(I::Frame { dst: 0 });
    b.instruction(I::Halt);
    b.init_entry(init).loop_entry(loop_at);

    let mut program = Program::load(b.build(), LoadOptions::new()).unwrap();
    program.run_init().unwrap();
    for expected in 1..=4 {
        program.run_loop().unwrap();
        assert_eq!(program.get(0), expected);
    }
}

#[test]
fn info_reflects_faults() {
    let mut program = Program::load(trapping_image(), LoadOptions::new()).unwrap();
    program.run_init().unwrap();

    let info = program.info();
    assert_eq!(info.status, Status::Initialized);
    assert_eq!(info.last_fault, None);
    assert!(info.last_cycles > 0);

    program.run_loop().unwrap_err();
    let info = program.info();
    assert_eq!(info.status, Status::Faulted);
    assert!(info.last_fault.unwrap().contains("trap"));

    let json = serde_json::to_value(program.info()).unwrap();
    assert_eq!(json["status"], "faulted");
    assert_eq!(json["frame_number"], 1);
}

#[test]
fn run_outcome_counts_cycles() {
    let mut program = Program::load(counter_image(), LoadOptions::new()).unwrap();
    // init is ldi + halt.
    let outcome = program.run_init().unwrap();
    assert_eq!(outcome.cycles, 2);
}
