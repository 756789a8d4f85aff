use javelin_classfile::{BaseType, FieldType, MethodDescriptor, ReturnType};
use javelin_types::{erasure, ClassType, PrimitiveType, Type, TypeEnv};

/// Erase `ty` to its class-file field descriptor shape.
pub fn field_type_of(env: &dyn TypeEnv, ty: &Type) -> FieldType {
    match erasure(env, ty) {
        Type::Primitive(p) => FieldType::Base(base_type_of(p)),
        Type::Class(ClassType { def, .. }) => {
            let name = env
                .class(def)
                .map(|class| class.internal_name())
                .unwrap_or_else(|| "java/lang/Object".to_string());
            FieldType::Object(name)
        }
        Type::Array(elem) => FieldType::Array(Box::new(field_type_of(env, &elem))),
        // Anything unresolved erases to Object for descriptor purposes.
        _ => FieldType::Object("java/lang/Object".to_string()),
    }
}

/// Erased method descriptor for a parameter list and return type: `(I)I`,
/// `(Ljava/lang/String;)V`, ...
pub fn method_descriptor_of(env: &dyn TypeEnv, params: &[Type], return_type: &Type) -> String {
    let params: Vec<FieldType> = params.iter().map(|p| field_type_of(env, p)).collect();
    let return_type = match return_type {
        Type::Void => ReturnType::Void,
        other => ReturnType::Type(field_type_of(env, other)),
    };
    MethodDescriptor::new(params, return_type).to_string()
}

fn base_type_of(primitive: PrimitiveType) -> BaseType {
    match primitive {
        PrimitiveType::Boolean => BaseType::Boolean,
        PrimitiveType::Byte => BaseType::Byte,
        PrimitiveType::Char => BaseType::Char,
        PrimitiveType::Short => BaseType::Short,
        PrimitiveType::Int => BaseType::Int,
        PrimitiveType::Long => BaseType::Long,
        PrimitiveType::Float => BaseType::Float,
        PrimitiveType::Double => BaseType::Double,
    }
}
