//! Constructor, method and property descriptors of one class declaration.

use crate::collector::ReferenceCollector;
use crate::config::ExtractorConfig;
use crate::guards;
use crate::normalize::{self, NormalizeOptions};
use crate::semantic::{SemanticModel, TypeRef};
use crate::syntax::{self, declaration_body, has_modifier, named_children};
use crate::types::{ConstructorDescriptor, MethodDescriptor, PropertyDescriptor};
use tree_sitter::Node;

fn members_of<'t>(declaration: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    declaration_body(declaration)
        .map(named_children)
        .unwrap_or_default()
        .into_iter()
        .filter(|m| m.kind() == kind)
        .collect()
}

/// Parameter declarations of a member, as written
pub fn parameter_texts(member: Node, source: &str) -> Vec<String> {
    syntax::parameters(member)
        .into_iter()
        .map(|p| syntax::text(p, source).trim().to_string())
        .collect()
}

/// Public constructors in declaration order
pub fn constructors(
    model: &SemanticModel,
    declaration: Node,
    config: &ExtractorConfig,
) -> Vec<ConstructorDescriptor> {
    let source = model.source();
    members_of(declaration, "constructor_declaration")
        .into_iter()
        .filter(|ctor| has_modifier(*ctor, source, "public"))
        .map(|ctor| ConstructorDescriptor {
            signature: normalize::signature(ctor, source),
            parameters: parameter_texts(ctor, source),
            exception_conditions: guards::exception_conditions(
                ctor,
                source,
                &config.fallback_exception_type,
            ),
        })
        .collect()
}

/// Methods allowed by the profile, in declaration order. Local variable types are fed to
/// `collector`.
pub fn methods<'t>(
    model: &SemanticModel<'t>,
    declaration: Node<'t>,
    config: &ExtractorConfig,
    options: &NormalizeOptions,
    collector: &mut ReferenceCollector<'_, 't>,
) -> Vec<MethodDescriptor> {
    let source = model.source();
    let mut out = Vec::new();

    for method in members_of(declaration, "method_declaration") {
        let Some(symbol) = model.method_symbol(method) else {
            log::debug!(
                "Skipping unnamed method at line {}",
                method.start_position().row + 1
            );
            continue;
        };
        if !config.profile.includes_method(symbol.is_public) {
            continue;
        }

        let return_type = match &symbol.return_type {
            Some(ty) => model.display(ty),
            None => method
                .child_by_field_name("returns")
                .or_else(|| syntax::type_node(method))
                .map(|t| syntax::text(t, source).trim().to_string())
                .unwrap_or_default(),
        };

        let mut dependency_types: Vec<String> = Vec::new();
        for local in model.declared_locals(method) {
            let Some(ty) = local.ty else {
                continue;
            };
            if model.in_source(&ty).is_some() {
                let named = match &ty {
                    TypeRef::Nullable(inner) => inner.as_ref(),
                    other => other,
                };
                let name = model.display(named);
                if !dependency_types.contains(&name) {
                    dependency_types.push(name);
                }
            }
            collector.visit(&ty);
        }

        out.push(MethodDescriptor {
            name: symbol.name,
            signature: normalize::signature(method, source),
            return_type,
            is_static: symbol.is_static,
            is_abstract: symbol.is_abstract,
            is_async: symbol.is_async,
            parameters: parameter_texts(method, source),
            exception_conditions: guards::exception_conditions(
                method,
                source,
                &config.fallback_exception_type,
            ),
            dependency_types,
            source_code: normalize::normalize_with_comments(method, source, options),
        });
    }
    out
}

/// Properties in declaration order. Their types are fed to `collector`.
pub fn properties<'t>(
    model: &SemanticModel<'t>,
    declaration: Node<'t>,
    collector: &mut ReferenceCollector<'_, 't>,
) -> Vec<PropertyDescriptor> {
    let source = model.source();
    let mut out = Vec::new();

    for property in members_of(declaration, "property_declaration") {
        let Some(name) = syntax::name_of(property, source) else {
            continue;
        };
        let type_node = syntax::type_node(property);
        let resolved = type_node.and_then(|t| model.resolve_type(t));
        let type_name = match &resolved {
            Some(ty) if model.is_named(ty) => model.display(ty),
            _ => type_node
                .map(|t| syntax::text(t, source).trim().to_string())
                .unwrap_or_default(),
        };
        if let Some(ty) = &resolved {
            collector.visit(ty);
        }
        out.push(PropertyDescriptor {
            name: name.to_string(),
            type_name,
        });
    }
    out
}
