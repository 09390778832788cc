use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One class, struct or record declaration of the analyzed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClassDescriptor {
    pub file_path: String,
    pub namespace_name: String,
    pub class_name: String,
    pub is_static: bool,
    pub is_abstract: bool,
    pub constructors: Vec<ConstructorDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub properties: Vec<PropertyDescriptor>,
    pub using_directives: Vec<String>,
    /// Normalized source of every in-source type reachable from this class, keyed by
    /// fully qualified name, in discovery order
    pub referenced_type_definitions: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConstructorDescriptor {
    pub signature: String,
    pub parameters: Vec<String>,
    pub exception_conditions: Vec<ExceptionConditionDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MethodDescriptor {
    pub name: String,
    pub signature: String,
    pub return_type: String,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_async: bool,
    pub parameters: Vec<String>,
    pub exception_conditions: Vec<ExceptionConditionDescriptor>,
    pub dependency_types: Vec<String>,
    pub source_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_name: String,
}

/// A guard clause: an `if` whose consequence throws
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExceptionConditionDescriptor {
    pub condition_expression: String,
    pub exception_type: String,
}
