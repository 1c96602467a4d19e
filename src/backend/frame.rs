//! Stack frame planning. Every function gets one fixed-size frame: `S`
//! bytes for each instruction result that needs a slot (an alloc's own
//! declared size, 4 bytes for anything else), `R` for the saved return
//! address if the function calls out, and `A` for outgoing arguments
//! past the eighth. No value is ever spilled to more than one slot and
//! nothing is reused, which is wasteful but keeps the lowering local and
//! simple - exactly the trade the original RISC-V backend made.

use ahash::AHashMap;
use koopa::ir::{FunctionData, Value, ValueKind};

pub struct FramePlan {
    pub frame_size: i32,
    pub save_ra: bool,
    pub arg_area: i32,
    pub slots: AHashMap<Value, i32>,
}

pub fn in_imm12(v: i32) -> bool {
    (-2047..=2047).contains(&v)
}

fn align_up_16(v: i32) -> i32 {
    (v + 15) / 16 * 16
}

fn alloc_payload_size(ty: &koopa::ir::Type) -> i32 {
    use koopa::ir::TypeKind;
    match ty.kind() {
        TypeKind::Pointer(inner) => inner.size() as i32,
        _ => 4,
    }
}

pub fn plan_function(func_data: &FunctionData) -> FramePlan {
    let dfg = func_data.dfg();
    let layout = func_data.layout();

    let mut slots = AHashMap::default();
    let mut s = 0i32;
    let mut has_call = false;
    let mut max_args = 0usize;

    for (_bb, node) in layout.bbs() {
        for &inst in node.insts().keys() {
            let data = dfg.value(inst);
            if let ValueKind::Call(call) = data.kind() {
                has_call = true;
                max_args = max_args.max(call.args().len());
            }
            if data.ty().is_unit() {
                continue;
            }
            let size = match data.kind() {
                ValueKind::Alloc(_) => alloc_payload_size(data.ty()),
                _ => 4,
            };
            slots.insert(inst, s);
            s += size;
        }
    }

    let r = if has_call { 4 } else { 0 };
    let a = if max_args > 8 {
        ((max_args - 8) * 4) as i32
    } else {
        0
    };
    for off in slots.values_mut() {
        *off += a;
    }

    FramePlan {
        frame_size: align_up_16(s + r + a),
        save_ra: has_call,
        arg_area: a,
        slots,
    }
}
