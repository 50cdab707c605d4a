use std::convert::Infallible;
use std::time::Duration;

use chipvm::timer::{ManualClock, WallClock};
use chipvm::{Config, Emulator, Frame, Renderer, SpriteEdge, Status, VmError};

fn load(program: &[u16]) -> Emulator {
    load_with(program, Config::default())
}

fn load_with(program: &[u16], config: Config) -> Emulator {
    let bytes: Vec<u8> = program.iter().flat_map(|w| w.to_be_bytes()).collect();
    let mut emu = Emulator::new(Config {
        seed: Some(1),
        ..config
    });
    emu.load_rom(&bytes).unwrap();
    emu
}

fn run(emu: &mut Emulator, steps: usize) {
    for _ in 0..steps {
        emu.tick().unwrap();
    }
}

#[derive(Default)]
struct Recorder {
    frames: Vec<(u16, u16, Status, usize)>,
}

impl Renderer for Recorder {
    type Error = Infallible;

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error> {
        self.frames.push((
            frame.pc,
            frame.opcode,
            frame.status.clone(),
            frame.framebuffer.lit(),
        ));
        Ok(())
    }
}

#[test]
fn set_register_for_every_register() {
    for x in 0..16u16 {
        let mut emu = load(&[0x6000 | (x << 8) | 0xA5]);
        run(&mut emu, 1);
        assert_eq!(emu.regs.get(x as u8), 0xA5);
        assert_eq!(emu.mem.pc.0, 0x202);
    }
}

#[test]
fn add_register_pairs() {
    for (a, b) in [(1u8, 2u8), (0xFF, 0x01), (0x80, 0x80), (0x7F, 0x80), (0, 0)] {
        // V3 = a, V7 = b, V3 += V7
        let mut emu = load(&[0x6300 | a as u16, 0x6700 | b as u16, 0x8374]);
        run(&mut emu, 3);
        assert_eq!(emu.regs.get(3), a.wrapping_add(b));
        assert_eq!(emu.regs.get(0xF), (a as u16 + b as u16 > 255) as u8);
    }
}

#[test]
fn sub_and_subn_borrow() {
    // 10 - 20 borrows, 20 - 10 does not
    let mut emu = load(&[0x610A, 0x6214, 0x8125]);
    run(&mut emu, 3);
    assert_eq!(emu.regs.get(1), 0xF6);
    assert_eq!(emu.regs.get(0xF), 0);

    let mut emu = load(&[0x610A, 0x6214, 0x8127]);
    run(&mut emu, 3);
    assert_eq!(emu.regs.get(1), 10);
    assert_eq!(emu.regs.get(0xF), 1);
}

#[test]
fn shr_takes_low_bit() {
    let mut emu = load(&[0x6505, 0x8506]);
    run(&mut emu, 2);
    assert_eq!(emu.regs.get(5), 2);
    assert_eq!(emu.regs.get(0xF), 1);
}

#[test]
fn bitwise_ops() {
    let mut emu = load(&[
        0x61F0, 0x620F, 0x8121, // V1 |= V2 -> FF
        0x630C, 0x8322, // V3 &= V2 -> 0C
        0x64FF, 0x8423, // V4 ^= V2 -> F0
        0x8520, // V5 = V2
        0x75FF, // V5 += FF -> 0E
    ]);
    run(&mut emu, 9);
    assert_eq!(emu.regs.get(1), 0xFF);
    assert_eq!(emu.regs.get(3), 0x0C);
    assert_eq!(emu.regs.get(4), 0xF0);
    assert_eq!(emu.regs.get(5), 0x0E);
    assert_eq!(emu.regs.get(0xF), 0);
}

#[test]
fn clear_screen_blanks_framebuffer() {
    // draw font glyph 8, then clear
    let mut emu = load(&[0x6008, 0xF029, 0xD005, 0x00E0]);
    run(&mut emu, 3);
    assert!(emu.framebuffer().lit() > 0);
    run(&mut emu, 1);
    assert_eq!(emu.framebuffer().lit(), 0);
    assert_eq!(emu.framebuffer().pixels().len(), 2048);
}

#[test]
fn drawing_twice_restores_screen() {
    let mut emu = load(&[0x600C, 0x610A, 0x6207, 0xF029, 0xD125, 0xD125]);
    run(&mut emu, 5);
    let drawn = emu.framebuffer().clone();
    assert_eq!(emu.regs.get(0xF), 0);
    assert_eq!(drawn.lit(), 11);
    run(&mut emu, 1);
    assert_eq!(emu.regs.get(0xF), 1);
    assert_eq!(emu.framebuffer().lit(), 0);
}

#[test]
fn draw_height_zero_is_noop() {
    let mut emu = load(&[0x6F01, 0xD000]);
    run(&mut emu, 2);
    assert_eq!(emu.framebuffer().lit(), 0);
    assert_eq!(emu.regs.get(0xF), 0);
}

#[test]
fn sprite_edge_policies() {
    // sprite of one full row at (62, 0)
    let program = [0xA300, 0x603E, 0x6100, 0xD011];
    let mut rom: Vec<u16> = program.to_vec();
    rom.resize((0x300 - 0x200) / 2, 0);
    rom.push(0xFF00);

    let mut clip = load_with(&rom, Config::default());
    run(&mut clip, 4);
    assert_eq!(clip.framebuffer().lit(), 2);

    let mut wrap = load_with(
        &rom,
        Config {
            sprite_edge: SpriteEdge::Wrap,
            ..Config::default()
        },
    );
    run(&mut wrap, 4);
    assert_eq!(wrap.framebuffer().lit(), 8);
    assert_eq!(wrap.framebuffer().get(5, 0), Some(true));

    let mut reject = load_with(
        &rom,
        Config {
            sprite_edge: SpriteEdge::Reject,
            ..Config::default()
        },
    );
    run(&mut reject, 3);
    assert_eq!(
        reject.tick(),
        Err(VmError::PixelOutOfRange { x: 64, y: 0 })
    );
    assert!(!reject.is_running());
}

#[test]
fn bcd_digits() {
    let mut emu = load(&[0xA400, 0x62EA, 0xF233]);
    run(&mut emu, 3);
    assert_eq!(emu.mem.slice(0x400, 3).unwrap(), &[2, 3, 4]);

    let mut emu = load(&[0xA400, 0x6200, 0xF233]);
    emu.mem.set(0x401, 9).unwrap();
    run(&mut emu, 3);
    assert_eq!(emu.mem.slice(0x400, 3).unwrap(), &[0, 0, 0]);
}

#[test]
fn bcd_out_of_range_writes_nothing() {
    let mut emu = load(&[0xAFFE, 0x62FF, 0xF233]);
    run(&mut emu, 2);
    assert_eq!(emu.tick(), Err(VmError::AddressOutOfRange(0x1000)));
    assert_eq!(emu.mem.get(0xFFE).unwrap(), 0);
    assert_eq!(emu.mem.get(0xFFF).unwrap(), 0);
}

#[test]
fn dump_and_load_include_vx() {
    let mut emu = load(&[0xA500, 0xF555, 0xF565]);
    for x in 0..=5u8 {
        emu.regs.set_register(x, 0x10 + x);
    }
    emu.regs.set_register(6, 0x99);
    run(&mut emu, 2);
    assert_eq!(
        emu.mem.slice(0x500, 7).unwrap(),
        &[0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x00]
    );
    assert_eq!(emu.mem.index.0, 0x500);

    for x in 0..16u8 {
        emu.regs.set_register(x, 0);
    }
    run(&mut emu, 1);
    for x in 0..=5u8 {
        assert_eq!(emu.regs.get(x), 0x10 + x);
    }
    assert_eq!(emu.regs.get(6), 0);
}

#[test]
fn dump_past_end_halts() {
    let mut emu = load(&[0xAFFC, 0xF555]);
    run(&mut emu, 1);
    assert_eq!(emu.tick(), Err(VmError::AddressOutOfRange(0x1000)));
    assert_eq!(emu.mem.slice(0xFFC, 4).unwrap(), &[0, 0, 0, 0]);
}

#[test]
fn unrecognized_word_halts_for_good() {
    let mut emu = load(&[0x6301, 0xFFFF, 0x6302]);
    run(&mut emu, 1);
    assert_eq!(emu.tick(), Err(VmError::UnrecognizedInstruction(0xFFFF)));
    let expected = Status::Halted {
        fault: VmError::UnrecognizedInstruction(0xFFFF),
        opcode: Some(0xFFFF),
    };
    assert_eq!(emu.status(), &expected);
    assert_eq!(emu.mem.pc.0, 0x202);

    for _ in 0..5 {
        assert_eq!(emu.tick(), Err(VmError::UnrecognizedInstruction(0xFFFF)));
    }
    assert_eq!(emu.status(), &expected);
    assert_eq!(emu.mem.pc.0, 0x202);
    assert_eq!(emu.regs.get(3), 1);
}

#[test]
fn call_then_return() {
    // 200: CALL 206, 202: LD V1, 1, 204: JP 204, 206: RET
    let mut emu = load(&[0x2206, 0x6101, 0x1204, 0x00EE]);
    let depth = emu.mem.stack.depth();
    run(&mut emu, 1);
    assert_eq!(emu.mem.pc.0, 0x206);
    assert_eq!(emu.mem.stack.depth(), depth + 1);
    run(&mut emu, 1);
    assert_eq!(emu.mem.pc.0, 0x202);
    assert_eq!(emu.mem.stack.depth(), depth);
    run(&mut emu, 2);
    assert_eq!(emu.regs.get(1), 1);
    assert_eq!(emu.mem.pc.0, 0x204);
}

#[test]
fn stack_overflow_and_underflow_halt() {
    // calls itself forever
    let mut emu = load(&[0x2200]);
    run(&mut emu, 16);
    assert_eq!(emu.tick(), Err(VmError::StackOverflow));
    assert!(!emu.is_running());

    let mut emu = load(&[0x00EE]);
    assert_eq!(emu.tick(), Err(VmError::StackUnderflow));
}

#[test]
fn jump_out_of_memory_halts_on_fetch() {
    let mut emu = load(&[0x60FF, 0xBFFF]);
    run(&mut emu, 2);
    assert_eq!(emu.mem.pc.0, 0x10FE);
    assert_eq!(emu.tick(), Err(VmError::AddressOutOfRange(0x10FE)));
    // nothing was fetched, so no word is blamed
    assert_eq!(
        emu.status(),
        &Status::Halted {
            fault: VmError::AddressOutOfRange(0x10FE),
            opcode: None,
        }
    );
    assert_eq!(emu.opcode(), 0xBFFF);
}

#[test]
fn loose_encodings_execute() {
    // 5121 is SE V1, V2 and E10E is SKP V1, as in the nibble-only decode
    let mut emu = load(&[0x6103, 0x6203, 0x5121, 0x6AFF, 0xE10E, 0x6BFF]);
    emu.set_key(3, true);
    run(&mut emu, 4);
    assert!(emu.is_running());
    assert_eq!(emu.regs.get(0xA), 0);
    assert_eq!(emu.regs.get(0xB), 0);
    assert_eq!(emu.mem.pc.0, 0x20C);
}

#[test]
fn zeroed_memory_clears_screen_and_runs_on() {
    let mut emu = load(&[0xF029, 0xD015]);
    run(&mut emu, 2);
    assert!(emu.framebuffer().lit() > 0);
    // 0x0000 past the program is CLS
    run(&mut emu, 3);
    assert!(emu.is_running());
    assert_eq!(emu.framebuffer().lit(), 0);
    assert_eq!(emu.mem.pc.0, 0x20A);
}

#[test]
fn key_skips_follow_keypad() {
    let program = [0x6107, 0xE19E, 0x6201, 0xE1A1, 0x6301];
    let mut emu = load(&program);
    run(&mut emu, 4);
    // not pressed: SKP falls through, SKNP skips
    assert_eq!(emu.regs.get(2), 1);
    assert_eq!(emu.mem.pc.0, 0x20A);

    let mut emu = load(&program);
    emu.set_key(7, true);
    run(&mut emu, 2);
    assert_eq!(emu.mem.pc.0, 0x206);
    run(&mut emu, 1);
    assert_eq!(emu.mem.pc.0, 0x208);
}

#[test]
fn wait_for_key_blocks_until_pressed() {
    let mut emu = load(&[0xF50A, 0x6601]);
    run(&mut emu, 3);
    assert_eq!(emu.mem.pc.0, 0x200);
    assert_eq!(emu.regs.get(6), 0);

    emu.set_key(0xE, true);
    run(&mut emu, 2);
    assert_eq!(emu.regs.get(5), 0xE);
    assert_eq!(emu.regs.get(6), 1);
    assert!(emu.keypad().is_pressed(0xE));
}

#[test]
fn timers_keep_running_while_waiting_for_key() {
    let mut emu = load(&[0x6003, 0xF015, 0xF00A]);
    let mut recorder = Recorder::default();
    for _ in 0..5 {
        emu.run_frame(&mut recorder).unwrap();
    }
    assert_eq!(emu.timers.delay.count, 0);
    assert_eq!(emu.mem.pc.0, 0x204);
}

#[test]
fn frames_hand_off_state_and_halt_freezes_timers() {
    let mut emu = load(&[0x6105, 0xF118, 0xFFFF]);
    let mut recorder = Recorder::default();
    for _ in 0..4 {
        emu.run_frame(&mut recorder).unwrap();
    }
    let pcs: Vec<u16> = recorder.frames.iter().map(|f| f.0).collect();
    assert_eq!(pcs, [0x202, 0x204, 0x204, 0x204]);
    assert_eq!(recorder.frames[1].1, 0xF118);
    assert_eq!(recorder.frames[2].1, 0xFFFF);
    assert_eq!(recorder.frames[0].2, Status::Running);
    assert!(matches!(recorder.frames[3].2, Status::Halted { .. }));
    // set to 5 in frame 2, ticked once at the end of it, then frozen
    assert_eq!(emu.timers.sound.count, 4);
}

#[test]
fn cycles_per_frame_batches_steps() {
    let mut emu = load_with(
        &[0x7001, 0x7001, 0x7001, 0x7001, 0x1200],
        Config {
            cycles_per_frame: 5,
            ..Config::default()
        },
    );
    let mut recorder = Recorder::default();
    emu.run_frame(&mut recorder).unwrap();
    assert_eq!(emu.regs.get(0), 4);
    assert_eq!(recorder.frames.len(), 1);
    assert_eq!(recorder.frames[0].0, 0x200);
}

#[test]
fn wall_clock_pacing_ignores_frame_count() {
    let clock = ManualClock::default();
    let mut emu = load(&[0x6A3C, 0xFA15, 0x1204]);
    emu.timers.set_pacer(Box::new(WallClock::new(clock.clone())));
    let mut recorder = Recorder::default();
    for _ in 0..10 {
        emu.run_frame(&mut recorder).unwrap();
    }
    assert_eq!(emu.timers.delay.count, 60);
    clock.advance(Duration::from_millis(250));
    emu.run_frame(&mut recorder).unwrap();
    assert_eq!(emu.timers.delay.count, 45);
}

#[test]
fn rom_too_large_is_rejected() {
    let mut emu = Emulator::default();
    assert_eq!(
        emu.load_rom(&vec![0; 3585]),
        Err(VmError::RomTooLarge {
            size: 3585,
            max: 3584
        })
    );
    assert!(emu.is_running());
}

#[test]
fn instances_are_independent() {
    let mut a = load(&[0x6101]);
    let b = load(&[0x6102]);
    run(&mut a, 1);
    assert_eq!(a.regs.get(1), 1);
    assert_eq!(b.regs.get(1), 0);
    assert_eq!(b.mem.pc.0, 0x200);
}
