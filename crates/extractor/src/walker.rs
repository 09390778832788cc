use crate::semantic::{SemanticModel, TypeId};
use crate::syntax::{descendants, CLASS_LIKE_KINDS};
use tree_sitter::Node;

/// One class, struct or record declaration and the type it declares
#[derive(Debug, Clone, Copy)]
pub struct ClassDeclaration<'t> {
    pub node: Node<'t>,
    pub id: TypeId,
}

/// Every class-like declaration in the file in source order, nested ones included.
/// Each partial declaration is reported on its own.
pub fn class_declarations<'t>(model: &SemanticModel<'t>) -> Vec<ClassDeclaration<'t>> {
    descendants(model.root())
        .into_iter()
        .filter(|n| CLASS_LIKE_KINDS.contains(&n.kind()))
        .filter_map(|node| match model.declared_type(node) {
            Some(id) => Some(ClassDeclaration { node, id }),
            None => {
                log::debug!(
                    "Skipping unresolved {} at line {}",
                    node.kind(),
                    node.start_position().row + 1
                );
                None
            }
        })
        .collect()
}
