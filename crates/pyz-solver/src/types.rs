//! Type representation for the solver.
//!
//! Types are interned: a [`TypeId`] is a cheap handle and [`TypeData`] is the
//! structural description stored once in the [`TypeInterner`](crate::TypeInterner).
//! `TypeData` is a closed enum so every consumer matches it exhaustively.

use pyz_common::interner::Atom;
use serde::Serialize;

// =============================================================================
// TypeId
// =============================================================================

/// Interned type handle.
///
/// Ids below [`TypeId::FIRST_USER`] are reserved for intrinsics and never
/// touch the interner tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const ANY: Self = Self(0);
    pub const OBJECT: Self = Self(1);
    pub const NONE: Self = Self(2);
    pub const BOOL: Self = Self(3);
    pub const INT: Self = Self(4);
    pub const FLOAT: Self = Self(5);
    pub const STR: Self = Self(6);
    pub const BYTES: Self = Self(7);
    pub const NEVER: Self = Self(8);
    /// Placeholder left behind when a callable's type variables were erased.
    pub const ERASED: Self = Self(9);
    pub const ERROR: Self = Self(10);

    /// First id handed out for interned (non-intrinsic) types.
    pub const FIRST_USER: u32 = 100;

    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    pub const fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    pub const fn is_never(self) -> bool {
        self.0 == Self::NEVER.0
    }

    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }
}

/// Built-in types that need no interning.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IntrinsicKind {
    Any,
    Object,
    None,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    Never,
    Erased,
    Error,
}

impl IntrinsicKind {
    pub const fn to_type_id(self) -> TypeId {
        match self {
            Self::Any => TypeId::ANY,
            Self::Object => TypeId::OBJECT,
            Self::None => TypeId::NONE,
            Self::Bool => TypeId::BOOL,
            Self::Int => TypeId::INT,
            Self::Float => TypeId::FLOAT,
            Self::Str => TypeId::STR,
            Self::Bytes => TypeId::BYTES,
            Self::Never => TypeId::NEVER,
            Self::Erased => TypeId::ERASED,
            Self::Error => TypeId::ERROR,
        }
    }

    pub const fn from_type_id(id: TypeId) -> Option<Self> {
        Some(match id.0 {
            0 => Self::Any,
            1 => Self::Object,
            2 => Self::None,
            3 => Self::Bool,
            4 => Self::Int,
            5 => Self::Float,
            6 => Self::Str,
            7 => Self::Bytes,
            8 => Self::Never,
            9 => Self::Erased,
            10 => Self::Error,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::Object => "object",
            Self::None => "None",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::Never => "Never",
            Self::Erased => "<Erased>",
            Self::Error => "<error>",
        }
    }
}

// =============================================================================
// Interned shape ids
// =============================================================================

/// Interned list of types (union members, tuple items).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParametersShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstanceShapeId(pub u32);

// =============================================================================
// Type parameters
// =============================================================================

/// Process-unique identity of a declared type parameter.
///
/// Allocated by [`TypeInterner::fresh_type_param_id`](crate::TypeInterner::fresh_type_param_id);
/// two parameters with the same name from different scopes never share an id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeParamId(pub u32);

/// A plain type variable: `T`, `T: Bound`, or `T: (A, B)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVarInfo {
    pub id: TypeParamId,
    pub name: Atom,
    /// Allowed value types, in declaration order. Empty when unconstrained.
    pub values: Vec<TypeId>,
    /// Upper bound; `object` when none was declared.
    pub upper_bound: TypeId,
}

impl TypeVarInfo {
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Which part of a parameter specification a reference denotes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamSpecFlavor {
    /// `P` itself, as in `Callable[P, R]`.
    Bare,
    /// `P.args`, the type of `*args`.
    Args,
    /// `P.kwargs`, the type of `**kwargs`.
    Kwargs,
}

/// A parameter specification: `**P`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamSpecInfo {
    pub id: TypeParamId,
    pub name: Atom,
    pub flavor: ParamSpecFlavor,
}

impl ParamSpecInfo {
    pub fn with_flavor(&self, flavor: ParamSpecFlavor) -> Self {
        Self {
            flavor,
            ..self.clone()
        }
    }
}

/// A type variable tuple: `*Ts`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeVarTupleInfo {
    pub id: TypeParamId,
    pub name: Atom,
}

/// A declared type parameter of a generic signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeParam {
    Var(TypeVarInfo),
    ParamSpec(ParamSpecInfo),
    VarTuple(TypeVarTupleInfo),
}

impl TypeParam {
    pub const fn id(&self) -> TypeParamId {
        match self {
            Self::Var(info) => info.id,
            Self::ParamSpec(info) => info.id,
            Self::VarTuple(info) => info.id,
        }
    }

    pub const fn name(&self) -> Atom {
        match self {
            Self::Var(info) => info.name,
            Self::ParamSpec(info) => info.name,
            Self::VarTuple(info) => info.name,
        }
    }
}

// =============================================================================
// Signatures
// =============================================================================

/// How an argument binds at a call site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ArgKind {
    /// Required positional argument.
    Positional,
    /// Positional argument with a default.
    Optional,
    /// `*args`.
    Star,
    /// Required keyword-only argument.
    Named,
    /// Keyword-only argument with a default.
    NamedOptional,
    /// `**kwargs`.
    StarStar,
}

impl ArgKind {
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::NamedOptional)
    }
}

/// One argument slot of a signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Option<Atom>,
    pub kind: ArgKind,
    pub type_id: TypeId,
}

impl ParamInfo {
    pub const fn positional(type_id: TypeId) -> Self {
        Self {
            name: None,
            kind: ArgKind::Positional,
            type_id,
        }
    }

    pub const fn new(name: Atom, kind: ArgKind, type_id: TypeId) -> Self {
        Self {
            name: Some(name),
            kind,
            type_id,
        }
    }

    /// Same slot with a different type.
    pub fn with_type(&self, type_id: TypeId) -> Self {
        Self {
            type_id,
            ..self.clone()
        }
    }
}

/// A function-like signature.
///
/// Signatures are values: every transformation builds a new shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    /// Name used in diagnostics; `None` for anonymous callables.
    pub name: Option<Atom>,
    /// Type parameters still free in this signature, in declaration order.
    pub type_params: Vec<TypeParam>,
    pub params: Vec<ParamInfo>,
    pub return_type: TypeId,
    /// Narrowed type when this signature is a `TypeGuard[...]` function.
    pub type_guard: Option<TypeId>,
}

impl FunctionShape {
    pub fn new(params: Vec<ParamInfo>, return_type: TypeId) -> Self {
        Self {
            name: None,
            type_params: Vec::new(),
            params,
            return_type,
            type_guard: None,
        }
    }

    /// Index of the `*args` slot, if any.
    pub fn var_arg_index(&self) -> Option<usize> {
        self.params.iter().position(|p| p.kind == ArgKind::Star)
    }

    pub fn var_arg(&self) -> Option<&ParamInfo> {
        self.var_arg_index().map(|index| &self.params[index])
    }

    pub fn param_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.params.iter().map(|p| p.type_id)
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// A bare parameter list, the value a parameter specification binds to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParametersShape {
    pub params: Vec<ParamInfo>,
}

/// A nominal instance type such as `list[int]` or a user class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstanceShape {
    /// Fully qualified class name; nominal identity.
    pub name: Atom,
    /// Type arguments, compared invariantly.
    pub args: Vec<TypeId>,
    /// Direct base class, `None` for classes deriving from `object`.
    pub base: Option<TypeId>,
}

// =============================================================================
// TypeData
// =============================================================================

/// Structural description of an interned type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Instance(InstanceShapeId),
    Union(TypeListId),
    /// Fixed-length tuple. Items may contain at most one `Unpack`.
    Tuple(TypeListId),
    /// Variable-length homogeneous tuple, `tuple[T, ...]`.
    Array(TypeId),
    /// `*X`: the wrapped tuple or variable tuple is spliced, not nested.
    Unpack(TypeId),
    TypeParameter(TypeVarInfo),
    ParamSpec(ParamSpecInfo),
    TypeVarTuple(TypeVarTupleInfo),
    Function(FunctionShapeId),
    Parameters(ParametersShapeId),
    /// Incomplete type still being inferred (`x = []`); never applied.
    Partial(Atom),
}
