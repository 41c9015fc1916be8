//! Type interning.
//!
//! Every structural type is stored once; equal `TypeData` always yields the
//! same `TypeId`, so identity comparison is type equality. Intrinsics are
//! resolved without touching the tables.
//!
//! The interner is shared by reference and is safe to use from several
//! threads: each table sits behind its own `RwLock`.

use crate::types::{
    FunctionShape, FunctionShapeId, InstanceShape, InstanceShapeId, IntrinsicKind, ParamInfo,
    ParamSpecFlavor, ParamSpecInfo, ParametersShape, ParametersShapeId, TypeData, TypeId,
    TypeListId, TypeParam, TypeParamId, TypeVarInfo, TypeVarTupleInfo,
};
use indexmap::IndexSet;
use pyz_common::interner::{Atom, Interner};
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Interns values behind `Arc`, addressed by insertion index.
struct ValueInterner<T: ?Sized> {
    values: IndexSet<Arc<T>, FxBuildHasher>,
}

impl<T: ?Sized + Hash + Eq> ValueInterner<T> {
    fn new() -> Self {
        Self {
            values: IndexSet::with_hasher(FxBuildHasher),
        }
    }

    fn intern(&mut self, value: Arc<T>) -> u32 {
        let (index, _) = self.values.insert_full(value);
        index as u32
    }

    fn get(&self, index: u32) -> Option<Arc<T>> {
        self.values.get_index(index as usize).cloned()
    }
}

/// Slices share the value interner; `Arc<[T]>` borrows as `[T]`.
type SliceInterner<T> = ValueInterner<[T]>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Type interning table.
pub struct TypeInterner {
    types: RwLock<IndexSet<TypeData, FxBuildHasher>>,
    /// String interner for class names, parameter names and type variable names
    pub string_interner: Interner,
    type_lists: RwLock<SliceInterner<TypeId>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    parameters_shapes: RwLock<ValueInterner<ParametersShape>>,
    instance_shapes: RwLock<ValueInterner<InstanceShape>>,
    next_type_param: AtomicU32,
}

impl TypeInterner {
    /// Create a new type interner with pre-registered intrinsics
    pub fn new() -> Self {
        TypeInterner {
            types: RwLock::new(IndexSet::with_hasher(FxBuildHasher)),
            string_interner: Interner::new(),
            type_lists: RwLock::new(SliceInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            parameters_shapes: RwLock::new(ValueInterner::new()),
            instance_shapes: RwLock::new(ValueInterner::new()),
            next_type_param: AtomicU32::new(1),
        }
    }

    // =========================================================================
    // Core interning
    // =========================================================================

    pub fn intern(&self, data: TypeData) -> TypeId {
        if let TypeData::Intrinsic(kind) = &data {
            return kind.to_type_id();
        }

        if let Some(index) = read(&self.types).get_index_of(&data) {
            return TypeId(TypeId::FIRST_USER + index as u32);
        }
        let (index, _) = write(&self.types).insert_full(data);
        TypeId(TypeId::FIRST_USER + index as u32)
    }

    /// Look up the `TypeData` for a given `TypeId`
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.is_intrinsic() {
            return IntrinsicKind::from_type_id(id).map(TypeData::Intrinsic);
        }
        read(&self.types)
            .get_index((id.0 - TypeId::FIRST_USER) as usize)
            .cloned()
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        read(&self.type_lists)
            .get(id.0)
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        read(&self.function_shapes)
            .get(id.0)
            .unwrap_or_else(|| Arc::new(FunctionShape::new(Vec::new(), TypeId::ERROR)))
    }

    pub fn parameters_shape(&self, id: ParametersShapeId) -> Arc<ParametersShape> {
        read(&self.parameters_shapes)
            .get(id.0)
            .unwrap_or_else(|| Arc::new(ParametersShape { params: Vec::new() }))
    }

    pub fn instance_shape(&self, id: InstanceShapeId) -> Option<Arc<InstanceShape>> {
        read(&self.instance_shapes).get(id.0)
    }

    fn intern_type_list(&self, types: Vec<TypeId>) -> TypeListId {
        TypeListId(write(&self.type_lists).intern(Arc::from(types)))
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    /// Allocate an id no other type parameter in this process shares.
    pub fn fresh_type_param_id(&self) -> TypeParamId {
        TypeParamId(self.next_type_param.fetch_add(1, Ordering::Relaxed))
    }

    /// Declare `T`, `T: bound` or `T: (v1, v2, ...)`.
    pub fn declare_type_var(
        &self,
        name: &str,
        values: Vec<TypeId>,
        upper_bound: TypeId,
    ) -> TypeVarInfo {
        TypeVarInfo {
            id: self.fresh_type_param_id(),
            name: self.intern_string(name),
            values,
            upper_bound,
        }
    }

    pub fn declare_param_spec(&self, name: &str) -> ParamSpecInfo {
        ParamSpecInfo {
            id: self.fresh_type_param_id(),
            name: self.intern_string(name),
            flavor: ParamSpecFlavor::Bare,
        }
    }

    pub fn declare_type_var_tuple(&self, name: &str) -> TypeVarTupleInfo {
        TypeVarTupleInfo {
            id: self.fresh_type_param_id(),
            name: self.intern_string(name),
        }
    }

    pub fn type_var(&self, info: &TypeVarInfo) -> TypeId {
        self.intern(TypeData::TypeParameter(info.clone()))
    }

    pub fn param_spec(&self, info: &ParamSpecInfo, flavor: ParamSpecFlavor) -> TypeId {
        self.intern(TypeData::ParamSpec(info.with_flavor(flavor)))
    }

    pub fn type_var_tuple(&self, info: &TypeVarTupleInfo) -> TypeId {
        self.intern(TypeData::TypeVarTuple(info.clone()))
    }

    /// The reference type for a declared parameter.
    pub fn type_param_ref(&self, param: &TypeParam) -> TypeId {
        match param {
            TypeParam::Var(info) => self.type_var(info),
            TypeParam::ParamSpec(info) => self.param_spec(info, ParamSpecFlavor::Bare),
            TypeParam::VarTuple(info) => self.type_var_tuple(info),
        }
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Build a union, flattening nested unions and dropping duplicates and `Never`.
    ///
    /// A single remaining member is returned as-is; an empty union is `Never`.
    /// `Any` absorbs every other member.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: SmallVec<[TypeId; 8]> = SmallVec::new();
        for member in members {
            if let Some(TypeData::Union(list)) = self.lookup(member) {
                flat.extend(self.type_list(list).iter().copied());
            } else {
                flat.push(member);
            }
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }

        let mut unique: Vec<TypeId> = Vec::with_capacity(flat.len());
        for member in flat {
            if !member.is_never() && !unique.contains(&member) {
                unique.push(member);
            }
        }
        match unique.len() {
            0 => TypeId::NEVER,
            1 => unique[0],
            _ => {
                let list = self.intern_type_list(unique);
                self.intern(TypeData::Union(list))
            }
        }
    }

    /// Fixed-length tuple. Items are stored as given.
    pub fn tuple(&self, items: Vec<TypeId>) -> TypeId {
        let list = self.intern_type_list(items);
        self.intern(TypeData::Tuple(list))
    }

    /// Variable-length homogeneous tuple, `tuple[element, ...]`.
    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn unpack(&self, inner: TypeId) -> TypeId {
        self.intern(TypeData::Unpack(inner))
    }

    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let id = FunctionShapeId(write(&self.function_shapes).intern(Arc::new(shape)));
        self.intern(TypeData::Function(id))
    }

    pub fn parameters(&self, params: Vec<ParamInfo>) -> TypeId {
        let shape = ParametersShape { params };
        let id = ParametersShapeId(write(&self.parameters_shapes).intern(Arc::new(shape)));
        self.intern(TypeData::Parameters(id))
    }

    pub fn instance(&self, shape: InstanceShape) -> TypeId {
        let id = InstanceShapeId(write(&self.instance_shapes).intern(Arc::new(shape)));
        self.intern(TypeData::Instance(id))
    }

    /// Non-generic class `name` deriving from `base` (or `object`).
    pub fn class(&self, name: &str, base: Option<TypeId>) -> TypeId {
        self.instance(InstanceShape {
            name: self.intern_string(name),
            args: Vec::new(),
            base,
        })
    }

    /// Generic instance `name[args]`.
    pub fn generic_instance(&self, name: &str, args: Vec<TypeId>) -> TypeId {
        self.instance(InstanceShape {
            name: self.intern_string(name),
            args,
            base: None,
        })
    }

    pub fn partial(&self, name: &str) -> TypeId {
        self.intern(TypeData::Partial(self.intern_string(name)))
    }

    // =========================================================================
    // Shape queries
    // =========================================================================

    pub fn is_unpack(&self, id: TypeId) -> bool {
        !id.is_intrinsic() && matches!(self.lookup(id), Some(TypeData::Unpack(_)))
    }

    pub fn is_partial(&self, id: TypeId) -> bool {
        !id.is_intrinsic() && matches!(self.lookup(id), Some(TypeData::Partial(_)))
    }

    /// Items of a fixed-length tuple.
    pub fn tuple_items(&self, id: TypeId) -> Option<Arc<[TypeId]>> {
        match self.lookup(id)? {
            TypeData::Tuple(list) => Some(self.type_list(list)),
            _ => None,
        }
    }

    /// Parameters carried by a callable or a bare parameter list.
    pub fn callable_params(&self, id: TypeId) -> Option<Vec<ParamInfo>> {
        match self.lookup(id)? {
            TypeData::Function(shape_id) => Some(self.function_shape(shape_id).params.clone()),
            TypeData::Parameters(shape_id) => Some(self.parameters_shape(shape_id).params.clone()),
            _ => None,
        }
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
