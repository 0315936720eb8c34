//! The semantic type pool.
//!
//! Owned by the front end; the back end only ever queries it read-only (see
//! the input contract in the crate's top-level design notes). Builtin
//! singleton types live at fixed low indices; every user struct, pointer,
//! array and function type is appended starting at [`BEGIN_USER_TYPE`].

use crate::common::TypeId;

/// A semantic type, as produced by the (out of scope) type checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Void,
    Bool,
    Char,
    Int,
    Float,
    NullPtr,
    /// `FILE*`-equivalent; prints as the fixed `%struct._IO_FILE` and
    /// triggers emission of that struct's definition in the epilogue.
    File,
    /// The `...` vararg marker in a function type's parameter list.
    Vararg,
    Pointer(TypeId),
    Array(TypeId),
    /// Field types in declaration order; the index of a field in this
    /// vector is its `getelementptr` member index.
    Struct(Vec<TypeId>),
    Function { ret: TypeId, params: Vec<TypeId> },
}

const VOID: TypeId = TypeId(0);
const BOOL: TypeId = TypeId(1);
const CHAR: TypeId = TypeId(2);
const INT: TypeId = TypeId(3);
const FLOAT: TypeId = TypeId(4);
const NULL_PTR: TypeId = TypeId(5);
const FILE: TypeId = TypeId(6);
const VARARG: TypeId = TypeId(7);

/// The first type id available for user-declared (struct/pointer/array/
/// function) types; ids below this are the builtin singletons above.
pub const BEGIN_USER_TYPE: TypeId = TypeId(8);

pub struct TypePool {
    types: Vec<Type>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    pub fn new() -> Self {
        let mut types = vec![Type::Void; BEGIN_USER_TYPE.0];
        types[VOID.0] = Type::Void;
        types[BOOL.0] = Type::Bool;
        types[CHAR.0] = Type::Char;
        types[INT.0] = Type::Int;
        types[FLOAT.0] = Type::Float;
        types[NULL_PTR.0] = Type::NullPtr;
        types[FILE.0] = Type::File;
        types[VARARG.0] = Type::Vararg;
        TypePool { types }
    }

    pub fn void(&self) -> TypeId {
        VOID
    }
    pub fn bool(&self) -> TypeId {
        BOOL
    }
    pub fn char(&self) -> TypeId {
        CHAR
    }
    pub fn int(&self) -> TypeId {
        INT
    }
    pub fn float(&self) -> TypeId {
        FLOAT
    }
    pub fn null_ptr(&self) -> TypeId {
        NULL_PTR
    }
    pub fn file(&self) -> TypeId {
        FILE
    }

    /// Intern a user type, returning its fresh id.
    pub fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0]
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Bool | Type::Char | Type::Int)
    }

    pub fn is_floating(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Float)
    }

    pub fn is_pointer(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Pointer(_))
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Array(_))
    }

    pub fn is_struct(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Struct(_))
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Void)
    }

    /// The pointee/element type of a pointer or array type.
    pub fn element_type(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            Type::Pointer(t) | Type::Array(t) => *t,
            other => panic!("element_type called on non-pointer/array type {other:?}"),
        }
    }

    pub fn struct_fields(&self, id: TypeId) -> &[TypeId] {
        match self.get(id) {
            Type::Struct(fields) => fields,
            other => panic!("struct_fields called on non-struct type {other:?}"),
        }
    }

    /// Every user struct type id, in declaration order, for the module
    /// prologue's `%struct_opt.N` emission.
    pub fn user_struct_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (BEGIN_USER_TYPE.0..self.types.len())
            .map(TypeId)
            .filter(move |id| self.is_struct(*id))
    }
}
