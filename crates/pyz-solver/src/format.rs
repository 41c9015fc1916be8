//! Type formatting for diagnostics.
//!
//! Renders types the way Python users write them: `tuple[int, str]`,
//! `int | None`, `def [T] (x: T) -> T`.

use crate::intern::TypeInterner;
use crate::types::{
    ArgKind, FunctionShape, ParamInfo, ParamSpecFlavor, TypeData, TypeId, TypeParam,
};
use std::fmt::Write;

/// Formats types to human-readable strings.
pub struct TypeFormatter<'a> {
    interner: &'a TypeInterner,
    /// Depth at which nested types are abbreviated to `...`.
    max_depth: u32,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        TypeFormatter {
            interner,
            max_depth: 8,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn format(&self, type_id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, type_id, 0);
        out
    }

    /// Render a signature, including its remaining type parameters.
    pub fn format_function(&self, func: &FunctionShape) -> String {
        let mut out = String::new();
        self.write_function(&mut out, func, 0);
        out
    }

    fn name(&self, atom: pyz_common::Atom) -> std::sync::Arc<str> {
        self.interner.resolve_atom(atom)
    }

    fn write_type(&self, out: &mut String, type_id: TypeId, depth: u32) {
        if depth > self.max_depth {
            out.push_str("...");
            return;
        }
        let Some(data) = self.interner.lookup(type_id) else {
            let _ = write!(out, "<unknown #{}>", type_id.0);
            return;
        };
        let depth = depth + 1;

        match data {
            TypeData::Intrinsic(kind) => out.push_str(kind.name()),
            TypeData::Instance(shape_id) => {
                let Some(shape) = self.interner.instance_shape(shape_id) else {
                    out.push_str("<instance>");
                    return;
                };
                out.push_str(&self.name(shape.name));
                if !shape.args.is_empty() {
                    out.push('[');
                    self.write_list(out, &shape.args, ", ", depth);
                    out.push(']');
                }
            }
            TypeData::Union(list) => {
                self.write_list(out, &self.interner.type_list(list), " | ", depth);
            }
            TypeData::Tuple(list) => {
                let items = self.interner.type_list(list);
                out.push_str("tuple[");
                if items.is_empty() {
                    out.push_str("()");
                } else {
                    self.write_list(out, &items, ", ", depth);
                }
                out.push(']');
            }
            TypeData::Array(element) => {
                out.push_str("tuple[");
                self.write_type(out, element, depth);
                out.push_str(", ...]");
            }
            TypeData::Unpack(inner) => {
                out.push('*');
                self.write_type(out, inner, depth);
            }
            TypeData::TypeParameter(info) => out.push_str(&self.name(info.name)),
            TypeData::ParamSpec(info) => {
                out.push_str(&self.name(info.name));
                match info.flavor {
                    ParamSpecFlavor::Bare => {}
                    ParamSpecFlavor::Args => out.push_str(".args"),
                    ParamSpecFlavor::Kwargs => out.push_str(".kwargs"),
                }
            }
            TypeData::TypeVarTuple(info) => out.push_str(&self.name(info.name)),
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                self.write_function(out, &shape, depth);
            }
            TypeData::Parameters(shape_id) => {
                let shape = self.interner.parameters_shape(shape_id);
                out.push('[');
                self.write_params(out, &shape.params, depth);
                out.push(']');
            }
            TypeData::Partial(name) => {
                let _ = write!(out, "<partial {}>", self.name(name));
            }
        }
    }

    fn write_list(&self, out: &mut String, types: &[TypeId], sep: &str, depth: u32) {
        for (i, &t) in types.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            self.write_type(out, t, depth);
        }
    }

    fn write_function(&self, out: &mut String, func: &FunctionShape, depth: u32) {
        out.push_str("def ");
        if !func.type_params.is_empty() {
            out.push('[');
            for (i, param) in func.type_params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match param {
                    TypeParam::Var(info) => out.push_str(&self.name(info.name)),
                    TypeParam::ParamSpec(info) => {
                        let _ = write!(out, "**{}", self.name(info.name));
                    }
                    TypeParam::VarTuple(info) => {
                        let _ = write!(out, "*{}", self.name(info.name));
                    }
                }
            }
            out.push_str("] ");
        }
        out.push('(');
        self.write_params(out, &func.params, depth);
        out.push_str(") -> ");
        match func.type_guard {
            Some(guard) => {
                out.push_str("TypeGuard[");
                self.write_type(out, guard, depth);
                out.push(']');
            }
            None => self.write_type(out, func.return_type, depth),
        }
    }

    fn write_params(&self, out: &mut String, params: &[ParamInfo], depth: u32) {
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match param.kind {
                ArgKind::Star => out.push('*'),
                ArgKind::StarStar => out.push_str("**"),
                _ => {}
            }
            if let Some(name) = param.name {
                let _ = write!(out, "{}: ", self.name(name));
            }
            self.write_type(out, param.type_id, depth);
            if param.kind.is_optional() {
                out.push_str(" = ...");
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
