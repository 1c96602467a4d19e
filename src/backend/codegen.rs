//! Koopa raw IR -> RV32 assembly. One pass per function: plan the frame,
//! then walk basic blocks in layout order emitting one instruction's
//! worth of asm at a time. Every value lives in exactly one stack slot
//! for its whole lifetime - there is no register allocator, just `t0`/`t1`
//! as scratch for whichever instruction is being translated.

use koopa::ir::{BasicBlock, FunctionData, Program, Value, ValueKind};

use crate::backend::frame::{in_imm12, plan_function, FramePlan};
use crate::backend::types::{is_pointer_value, stride_of};
use crate::error::{CompileError, CompileResult};

pub fn emit_program(program: &Program) -> CompileResult<String> {
    let mut out = String::new();
    emit_globals(&mut out, program);
    out.push_str("  .text\n");
    for &func in program.func_layout() {
        let func_data = program.func(func);
        if func_data.layout().entry_bb().is_none() {
            continue; // declared intrinsic, no body to codegen
        }
        emit_function(&mut out, program, func_data)?;
    }
    Ok(out)
}

fn strip(name: &str) -> &str {
    name.trim_start_matches('@').trim_start_matches('%')
}

fn emit_globals(out: &mut String, program: &Program) {
    for &v in program.inst_layout() {
        let data = program.borrow_value(v);
        let ValueKind::GlobalAlloc(alloc) = data.kind() else {
            continue;
        };
        let name = strip(data.name().as_deref().unwrap_or("anon"));
        out.push_str("  .data\n");
        out.push_str(&format!("  .globl {name}\n"));
        out.push_str(&format!("{name}:\n"));
        let init = program.borrow_value(alloc.init());
        emit_global_init(out, program, &init);
        out.push('\n');
    }
}

fn emit_global_init(out: &mut String, program: &Program, init: &koopa::ir::entities::ValueData) {
    match init.kind() {
        ValueKind::Integer(i) => out.push_str(&format!("  .word {}\n", i.value())),
        ValueKind::ZeroInit(_) => out.push_str(&format!("  .zero {}\n", init.ty().size())),
        ValueKind::Aggregate(agg) => {
            for &elem in agg.elems() {
                let elem_data = program.borrow_value(elem);
                emit_global_init(out, program, &elem_data);
            }
        }
        _ => unreachable!("global initializer must be Integer/ZeroInit/Aggregate"),
    }
}

fn emit_function(
    out: &mut String,
    program: &Program,
    func_data: &FunctionData,
) -> CompileResult<()> {
    let plan = plan_function(func_data);
    let dfg = func_data.dfg();
    let layout = func_data.layout();
    let fname = strip(func_data.name());

    out.push_str(&format!("  .globl {fname}\n"));
    out.push_str(&format!("{fname}:\n"));
    emit_addi_sp(out, -plan.frame_size);
    if plan.save_ra {
        emit_store(out, "ra", plan.frame_size - 4, "sp");
    }

    let entry_bb = layout.entry_bb();
    for (&bb, node) in layout.bbs() {
        if Some(bb) != entry_bb {
            out.push_str(&format!("{}:\n", bb_label(fname, bb, dfg)));
        }
        for &inst in node.insts().keys() {
            emit_value(out, program, func_data, &plan, inst)?;
        }
    }
    Ok(())
}

fn bb_label(fname: &str, bb: BasicBlock, dfg: &koopa::ir::dfg::DataFlowGraph) -> String {
    let raw = dfg.bb(bb).name().clone().unwrap_or_else(|| "bb".into());
    format!("{}_{}", fname, strip(&raw))
}

// Every basic block touches a handful of these per instruction, so the
// immediate gets formatted through `itoa` rather than `format!`'s
// general Display machinery.
fn fmt_i32(buf: &mut itoa::Buffer, v: i32) -> &str {
    buf.format(v)
}

fn emit_addi_sp(out: &mut String, delta: i32) {
    if delta == 0 {
        return;
    }
    let mut buf = itoa::Buffer::new();
    if in_imm12(delta) {
        out.push_str("  addi sp, sp, ");
        out.push_str(fmt_i32(&mut buf, delta));
        out.push('\n');
    } else {
        out.push_str("  li t0, ");
        out.push_str(fmt_i32(&mut buf, delta));
        out.push('\n');
        out.push_str("  add sp, sp, t0\n");
    }
}

fn emit_store(out: &mut String, reg: &str, offset: i32, base: &str) {
    let mut buf = itoa::Buffer::new();
    if in_imm12(offset) {
        out.push_str(&format!("  sw {reg}, {}({base})\n", fmt_i32(&mut buf, offset)));
    } else {
        out.push_str(&format!("  li t6, {}\n", fmt_i32(&mut buf, offset)));
        out.push_str(&format!("  add t6, t6, {base}\n"));
        out.push_str(&format!("  sw {reg}, 0(t6)\n"));
    }
}

fn emit_load(out: &mut String, reg: &str, offset: i32, base: &str) {
    let mut buf = itoa::Buffer::new();
    if in_imm12(offset) {
        out.push_str(&format!("  lw {reg}, {}({base})\n", fmt_i32(&mut buf, offset)));
    } else {
        out.push_str(&format!("  li t6, {}\n", fmt_i32(&mut buf, offset)));
        out.push_str(&format!("  add t6, t6, {base}\n"));
        out.push_str(&format!("  lw {reg}, 0(t6)\n"));
    }
}

fn emit_addi(out: &mut String, reg: &str, offset: i32, base: &str) {
    let mut buf = itoa::Buffer::new();
    if in_imm12(offset) {
        out.push_str(&format!("  addi {reg}, {base}, {}\n", fmt_i32(&mut buf, offset)));
    } else {
        out.push_str(&format!("  li {reg}, {}\n", fmt_i32(&mut buf, offset)));
        out.push_str(&format!("  add {reg}, {reg}, {base}\n"));
    }
}

/// Reads the *value* `v` denotes into `reg`: a literal, an incoming
/// argument, a global's address, or whatever was last saved to `v`'s
/// own stack slot (which for `load`/`getptr`/`getelemptr`/binary/call
/// results already is its value).
fn read_into(
    out: &mut String,
    program: &Program,
    func_data: &FunctionData,
    plan: &FramePlan,
    v: Value,
    reg: &str,
) {
    let dfg = func_data.dfg();
    let data = dfg.value(v);
    match data.kind() {
        ValueKind::Integer(i) => out.push_str(&format!("  li {reg}, {}\n", i.value())),
        ValueKind::FuncArgRef(far) => {
            let idx = far.index();
            if idx < 8 {
                out.push_str(&format!("  mv {reg}, a{idx}\n"));
            } else {
                emit_load(out, reg, plan.frame_size + ((idx - 8) * 4) as i32, "sp");
            }
        }
        ValueKind::GlobalAlloc(_) => {
            let name = strip(data.name().as_deref().unwrap_or("anon"));
            out.push_str(&format!("  la {reg}, {name}\n"));
        }
        _ => {
            let off = *plan
                .slots
                .get(&v)
                .expect("every result-bearing value has a slot");
            emit_load(out, reg, off, "sp");
            let _ = program;
        }
    }
}

/// Resolves `v` to a final memory address, for use as a `load`/`store`/
/// `getptr`/`getelemptr` base operand.
fn addr_of(
    out: &mut String,
    program: &Program,
    func_data: &FunctionData,
    plan: &FramePlan,
    v: Value,
    reg: &str,
) {
    let dfg = func_data.dfg();
    let data = dfg.value(v);
    match data.kind() {
        ValueKind::Alloc(_) => {
            let off = *plan.slots.get(&v).expect("alloc always has a slot");
            emit_addi(out, reg, off, "sp");
        }
        ValueKind::GlobalAlloc(_) => {
            let name = strip(data.name().as_deref().unwrap_or("anon"));
            out.push_str(&format!("  la {reg}, {name}\n"));
        }
        _ => {
            read_into(out, program, func_data, plan, v, reg);
            if is_pointer_value(v, dfg) {
                out.push_str(&format!("  lw {reg}, 0({reg})\n"));
            }
        }
    }
}

fn write_back(out: &mut String, plan: &FramePlan, v: Value, reg: &str) {
    let off = *plan
        .slots
        .get(&v)
        .expect("every result-bearing value has a slot");
    emit_store(out, reg, off, "sp");
}

fn emit_value(
    out: &mut String,
    program: &Program,
    func_data: &FunctionData,
    plan: &FramePlan,
    v: Value,
) -> CompileResult<()> {
    let dfg = func_data.dfg();
    let kind = dfg.value(v).kind().clone();
    match kind {
        ValueKind::Alloc(_) | ValueKind::GlobalAlloc(_) => {} // space only, no code
        ValueKind::Load(load) => {
            addr_of(out, program, func_data, plan, load.src(), "t0");
            out.push_str("  lw t1, 0(t0)\n");
            write_back(out, plan, v, "t1");
        }
        ValueKind::Store(store) => {
            read_into(out, program, func_data, plan, store.value(), "t0");
            addr_of(out, program, func_data, plan, store.dest(), "t1");
            out.push_str("  sw t0, 0(t1)\n");
        }
        ValueKind::GetPtr(gp) => {
            emit_index_op(out, program, func_data, plan, v, gp.src(), gp.index());
        }
        ValueKind::GetElemPtr(gep) => {
            emit_index_op(out, program, func_data, plan, v, gep.src(), gep.index());
        }
        ValueKind::Binary(bin) => {
            read_into(out, program, func_data, plan, bin.lhs(), "t0");
            read_into(out, program, func_data, plan, bin.rhs(), "t1");
            emit_binop(out, bin.op())?;
            write_back(out, plan, v, "t0");
        }
        ValueKind::Branch(br) => {
            read_into(out, program, func_data, plan, br.cond(), "t0");
            let fname = strip(func_data.name());
            out.push_str(&format!(
                "  bnez t0, {}\n",
                bb_label(fname, br.true_bb(), dfg)
            ));
            out.push_str(&format!("  j {}\n", bb_label(fname, br.false_bb(), dfg)));
        }
        ValueKind::Jump(j) => {
            let fname = strip(func_data.name());
            out.push_str(&format!("  j {}\n", bb_label(fname, j.target(), dfg)));
        }
        ValueKind::Call(call) => {
            for (i, &arg) in call.args().iter().enumerate() {
                if i < 8 {
                    let reg = format!("a{i}");
                    read_into(out, program, func_data, plan, arg, &reg);
                } else {
                    read_into(out, program, func_data, plan, arg, "t0");
                    emit_store(out, "t0", ((i - 8) * 4) as i32, "sp");
                }
            }
            let callee_name = strip(program.func(call.callee()).name());
            out.push_str(&format!("  call {callee_name}\n"));
            if !dfg.value(v).ty().is_unit() {
                write_back(out, plan, v, "a0");
            }
        }
        ValueKind::Return(ret) => {
            if let Some(rv) = ret.value() {
                read_into(out, program, func_data, plan, rv, "a0");
            }
            if plan.save_ra {
                emit_load(out, "ra", plan.frame_size - 4, "sp");
            }
            emit_addi_sp(out, plan.frame_size);
            out.push_str("  ret\n");
        }
        ValueKind::Integer(_)
        | ValueKind::ZeroInit(_)
        | ValueKind::Undef(_)
        | ValueKind::Aggregate(_)
        | ValueKind::FuncArgRef(_)
        | ValueKind::BlockArgRef(_) => {
            // never appear as standalone instructions, only as operands
        }
    }
    Ok(())
}

fn emit_index_op(
    out: &mut String,
    program: &Program,
    func_data: &FunctionData,
    plan: &FramePlan,
    dest: Value,
    src: Value,
    index: Value,
) {
    let dfg = func_data.dfg();
    addr_of(out, program, func_data, plan, src, "t0");
    read_into(out, program, func_data, plan, index, "t1");
    let stride = stride_of(dfg.value(dest).ty());
    if stride != 1 {
        out.push_str(&format!("  li t2, {stride}\n"));
        out.push_str("  mul t1, t1, t2\n");
    }
    out.push_str("  add t0, t0, t1\n");
    write_back(out, plan, dest, "t0");
}

fn emit_binop(out: &mut String, op: koopa::ir::BinaryOp) -> CompileResult<()> {
    use koopa::ir::BinaryOp::*;
    match op {
        NotEq => out.push_str("  xor t0, t0, t1\n  snez t0, t0\n"),
        Eq => out.push_str("  xor t0, t0, t1\n  seqz t0, t0\n"),
        Gt => out.push_str("  sgt t0, t0, t1\n"),
        Lt => out.push_str("  slt t0, t0, t1\n"),
        Ge => out.push_str("  slt t0, t0, t1\n  seqz t0, t0\n"),
        Le => out.push_str("  sgt t0, t0, t1\n  seqz t0, t0\n"),
        Add => out.push_str("  add t0, t0, t1\n"),
        Sub => out.push_str("  sub t0, t0, t1\n"),
        Mul => out.push_str("  mul t0, t0, t1\n"),
        Div => out.push_str("  div t0, t0, t1\n"),
        Mod => out.push_str("  rem t0, t0, t1\n"),
        And => out.push_str("  and t0, t0, t1\n"),
        Or => out.push_str("  or t0, t0, t1\n"),
        Xor => out.push_str("  xor t0, t0, t1\n"),
        Shl | Shr | Sar => {
            return Err(CompileError::Internal("shift operators are not part of SysY"))
        }
    }
    Ok(())
}
