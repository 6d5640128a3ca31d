//! Human-readable image listing for debugging and bench-top inspection.

use std::fmt::Write as _;

use super::instructions::Instruction;
use super::loader::ProgramImage;

/// Generate a human-readable dump of an image: header, tables, and a
/// disassembly of the code section.
pub fn dump(image: &ProgramImage) -> String {
    let mut out = String::new();

    dump_header(&mut out, image);
    dump_bindings(&mut out, image);
    dump_pixel_objects(&mut out, image);
    dump_code(&mut out, image);

    out
}

fn dump_header(out: &mut String, image: &ProgramImage) {
    let h = image.header();
    let o = image.offsets();

    let _ = writeln!(
        out,
        "image: {} bytes, isa v{}",
        image.bytes().len(),
        h.isa_version
    );
    let _ = writeln!(
        out,
        "  code          {:#06x}..{:#06x}  {:5} bytes",
        o.code, o.data, h.code_length
    );
    let _ = writeln!(
        out,
        "  data          {:#06x}..{:#06x}  {:5} words",
        o.data,
        o.read_keys,
        image.data_count()
    );
    let _ = writeln!(
        out,
        "  read keys     {:#06x}..{:#06x}  {:5} bindings",
        o.read_keys,
        o.write_keys,
        image.read_keys().len()
    );
    let _ = writeln!(
        out,
        "  write keys    {:#06x}..{:#06x}  {:5} bindings",
        o.write_keys,
        o.publish,
        image.write_keys().len()
    );
    let _ = writeln!(
        out,
        "  publish       {:#06x}..{:#06x}  {:5} bindings",
        o.publish,
        o.pixel_objects,
        image.publish().len()
    );
    let _ = writeln!(
        out,
        "  pixel objects {:#06x}..{:#06x}  {:5} bindings",
        o.pixel_objects,
        o.end,
        image.pixel_objects().len()
    );
    let _ = writeln!(
        out,
        "  entries: init {:#06x}, loop {:#06x}",
        h.init_entry, h.loop_entry
    );
    let _ = writeln!(out);
}

fn dump_bindings(out: &mut String, image: &ProgramImage) {
    let sections = [
        ("read keys", image.read_keys()),
        ("write keys", image.write_keys()),
        ("publish", image.publish()),
    ];
    for (name, view) in sections {
        if view.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{name}:");
        for (i, binding) in view.iter().enumerate() {
            let _ = writeln!(out, "  [{i}] {:#010x} -> d{}", binding.hash, binding.addr);
        }
        let _ = writeln!(out);
    }
}

fn dump_pixel_objects(out: &mut String, image: &ProgramImage) {
    let view = image.pixel_objects();
    if view.is_empty() {
        return;
    }
    let _ = writeln!(out, "pixel objects:");
    for (i, obj) in view.iter().enumerate() {
        let _ = writeln!(
            out,
            "  p{i}: pixels {}..{}",
            obj.offset,
            obj.offset + obj.count
        );
    }
    let _ = writeln!(out);
}

fn dump_code(out: &mut String, image: &ProgramImage) {
    let code = image.code();
    let h = image.header();
    let _ = writeln!(out, "code:");

    let mut offset = 0;
    while offset < code.len() {
        if offset == h.init_entry as usize {
            let _ = writeln!(out, "init:");
        }
        if offset == h.loop_entry as usize && h.loop_entry != h.init_entry {
            let _ = writeln!(out, "loop:");
        }
        match Instruction::decode(code, offset) {
            Ok((instr, size)) => {
                let _ = writeln!(out, "  {offset:#06x}  {instr}");
                offset += size;
            }
            Err(_) => {
                // Pad or corrupt byte; show it raw and keep walking.
                let _ = writeln!(out, "  {offset:#06x}  .byte {:#04x}", code[offset]);
                offset += 1;
            }
        }
    }
}
