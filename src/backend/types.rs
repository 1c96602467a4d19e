//! Classification derived purely from a value's static Koopa type and
//! defining instruction - no side table of array shapes is kept around.
//! `getelemptr`/`getptr` strides fall out of the destination's own
//! pointer type; the one place the original's `isPointer` check earns
//! its keep is telling apart an address that is already final from one
//! that is itself stored as a loaded pointer and needs one more
//! indirection (the shadow slot for a decayed array parameter).

use koopa::ir::entities::ValueData;
use koopa::ir::{DataFlowGraph, Type, TypeKind, Value, ValueKind};

pub fn stride_of(ptr_ty: &Type) -> i32 {
    match ptr_ty.kind() {
        TypeKind::Pointer(inner) => inner.size() as i32,
        _ => 4,
    }
}

pub fn is_pointer_value(value: Value, dfg: &DataFlowGraph) -> bool {
    let data: &ValueData = dfg.value(value);
    match data.kind() {
        ValueKind::GetPtr(_) | ValueKind::GetElemPtr(_) => true,
        ValueKind::Load(load) => {
            let src = dfg.value(load.src());
            matches!(
                src.ty().kind(),
                TypeKind::Pointer(inner) if matches!(inner.kind(), TypeKind::Pointer(_))
            )
        }
        _ => false,
    }
}
