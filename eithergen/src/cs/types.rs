//! Fully qualified framework types used by generated members.

use eithergen_syntax::model::{Predefined, Segment, TypeKind, TypeRef};

fn global(path: &[&str], arguments: Vec<TypeRef>, kind: TypeKind) -> TypeRef {
    let mut segments: Vec<Segment> = path.iter().map(|name| Segment::new(*name)).collect();
    if !arguments.is_empty() {
        if let Some(last) = segments.pop() {
            segments.push(Segment::with_arguments(last.name, arguments));
        }
    }
    TypeRef::Named {
        global: true,
        segments,
        kind,
    }
}

/// `global::System.{name}`
pub fn system(name: &str) -> TypeRef {
    global(&["System", name], vec![], TypeKind::Class)
}

pub fn bool() -> TypeRef {
    TypeRef::Predefined(Predefined::Bool)
}

pub fn int() -> TypeRef {
    TypeRef::Predefined(Predefined::Int)
}

pub fn byte() -> TypeRef {
    TypeRef::Predefined(Predefined::Byte)
}

pub fn string() -> TypeRef {
    TypeRef::Predefined(Predefined::String)
}

pub fn object() -> TypeRef {
    TypeRef::Predefined(Predefined::Object)
}

pub fn parameter(name: &str) -> TypeRef {
    TypeRef::TypeParameter(name.to_string())
}

pub fn unit() -> TypeRef {
    global(&["System", "ValueTuple"], vec![], TypeKind::Struct)
}

/// `Func<inputs..., output>`
pub fn func(mut inputs: Vec<TypeRef>, output: TypeRef) -> TypeRef {
    inputs.push(output);
    global(&["System", "Func"], inputs, TypeKind::Delegate)
}

/// `Action<inputs...>`
pub fn action(inputs: Vec<TypeRef>) -> TypeRef {
    global(&["System", "Action"], inputs, TypeKind::Delegate)
}

pub fn task(result: Option<TypeRef>) -> TypeRef {
    global(
        &["System", "Threading", "Tasks", "Task"],
        result.into_iter().collect(),
        TypeKind::Class,
    )
}

pub fn cancellation_token() -> TypeRef {
    global(&["System", "Threading", "CancellationToken"], vec![], TypeKind::Struct)
}

pub fn equatable(of: TypeRef) -> TypeRef {
    global(&["System", "IEquatable"], vec![of], TypeKind::Interface)
}

pub fn serialization(name: &str) -> TypeRef {
    global(
        &["System", "Runtime", "Serialization", name],
        vec![],
        TypeKind::Class,
    )
}

pub const GENERATED_CODE: &str = "global::System.CodeDom.Compiler.GeneratedCode";
pub const MAYBE_NULL_WHEN: &str = "global::System.Diagnostics.CodeAnalysis.MaybeNullWhen";
pub const OBJECT_REFERENCE_EQUALS: &str = "global::System.Object.ReferenceEquals";
