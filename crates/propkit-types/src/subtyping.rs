//! Assignability rules for the propkit type system
//!
//! Implements the relation `target <- source`: a value whose runtime type is
//! `source` may be stored in a slot declared as `target`.

use crate::error::TypeError;
use crate::ty::{ClassId, Type};
use rustc_hash::FxHashSet;

/// Access to the nominal class graph
///
/// Implemented by the class registry; the type crate only needs the direct
/// supertypes of a class to answer subclass queries.
pub trait ClassHierarchy {
    /// Direct supertypes of `class`: its parent (if any) followed by its interfaces
    fn supertypes(&self, class: ClassId) -> Vec<ClassId>;

    /// Human-readable name of a class
    fn class_name(&self, class: ClassId) -> Option<String>;
}

/// Context for checking assignability against a class hierarchy
#[derive(Clone, Copy)]
pub struct AssignabilityContext<'a, H: ClassHierarchy + ?Sized> {
    hierarchy: &'a H,
}

impl<'a, H: ClassHierarchy + ?Sized> AssignabilityContext<'a, H> {
    /// Create a new context over `hierarchy`
    pub fn new(hierarchy: &'a H) -> Self {
        AssignabilityContext { hierarchy }
    }

    /// Check if a value of type `source` can be stored where `target` is expected
    ///
    /// Primitives are only assignable from themselves; boxing is handled by
    /// callers that know whether an autobox is permitted.
    pub fn is_assignable(&self, target: Type, source: Type) -> bool {
        if target == source {
            return true;
        }

        match (target, source) {
            (Type::Void, _) | (_, Type::Void) => false,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,

            // Everything reference-typed is an Object
            (Type::Object, _) => true,

            (Type::Number, Type::Boxed(p)) => p.is_numeric(),

            (Type::Class(sup), Type::Class(sub)) => self.is_subclass_of(sub, sup),

            _ => false,
        }
    }

    /// Check if `sub` reaches `sup` through parents and interfaces
    pub fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup {
            return true;
        }

        let mut visited = FxHashSet::default();
        let mut pending = vec![sub];
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            for parent in self.hierarchy.supertypes(current) {
                if parent == sup {
                    return true;
                }
                pending.push(parent);
            }
        }

        false
    }

    /// Check that a value of `source` fits `target`, accepting autoboxing
    ///
    /// `source` is `None` for null, which only reference targets accept.
    pub fn check_value(&self, target: Type, source: Option<Type>) -> Result<(), TypeError> {
        match source {
            None if target.is_primitive() => Err(TypeError::NullPrimitive {
                ty: self.display(target),
            }),
            None => Ok(()),
            Some(source) => {
                if self.is_assignable(target.boxed(), source) {
                    Ok(())
                } else {
                    Err(TypeError::Mismatch {
                        expected: self.display(target),
                        actual: self.display(source),
                    })
                }
            }
        }
    }

    /// Render a type, resolving class ids to names
    pub fn display(&self, ty: Type) -> String {
        match ty {
            Type::Class(id) => self
                .hierarchy
                .class_name(id)
                .unwrap_or_else(|| ty.to_string()),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Primitive;
    use rustc_hash::FxHashMap;

    /// Toy hierarchy: Animal(0) <- Dog(1) <- Labrador(2), Dog implements Pet(3)
    struct Zoo {
        parents: FxHashMap<ClassId, Vec<ClassId>>,
    }

    impl Zoo {
        fn new() -> Self {
            let mut parents = FxHashMap::default();
            parents.insert(ClassId(1), vec![ClassId(0), ClassId(3)]);
            parents.insert(ClassId(2), vec![ClassId(1)]);
            Zoo { parents }
        }
    }

    impl ClassHierarchy for Zoo {
        fn supertypes(&self, class: ClassId) -> Vec<ClassId> {
            self.parents.get(&class).cloned().unwrap_or_default()
        }

        fn class_name(&self, class: ClassId) -> Option<String> {
            ["Animal", "Dog", "Labrador", "Pet"]
                .get(class.index())
                .map(|s| s.to_string())
        }
    }

    #[test]
    fn test_reflexive() {
        let zoo = Zoo::new();
        let ctx = AssignabilityContext::new(&zoo);
        assert!(ctx.is_assignable(Type::INT, Type::INT));
        assert!(ctx.is_assignable(Type::String, Type::String));
    }

    #[test]
    fn test_object_accepts_references_only() {
        let zoo = Zoo::new();
        let ctx = AssignabilityContext::new(&zoo);
        assert!(ctx.is_assignable(Type::Object, Type::String));
        assert!(ctx.is_assignable(Type::Object, Type::Boxed(Primitive::Long)));
        assert!(ctx.is_assignable(Type::Object, Type::Class(ClassId(2))));
        assert!(!ctx.is_assignable(Type::Object, Type::LONG));
        assert!(!ctx.is_assignable(Type::Object, Type::Void));
    }

    #[test]
    fn test_number_accepts_numeric_wrappers() {
        let zoo = Zoo::new();
        let ctx = AssignabilityContext::new(&zoo);
        assert!(ctx.is_assignable(Type::Number, Type::Boxed(Primitive::Byte)));
        assert!(ctx.is_assignable(Type::Number, Type::Boxed(Primitive::Double)));
        assert!(!ctx.is_assignable(Type::Number, Type::Boxed(Primitive::Boolean)));
        assert!(!ctx.is_assignable(Type::Number, Type::Boxed(Primitive::Char)));
        assert!(!ctx.is_assignable(Type::Boxed(Primitive::Int), Type::Number));
    }

    #[test]
    fn test_no_widening_between_wrappers() {
        let zoo = Zoo::new();
        let ctx = AssignabilityContext::new(&zoo);
        assert!(!ctx.is_assignable(Type::Boxed(Primitive::Long), Type::Boxed(Primitive::Int)));
        assert!(!ctx.is_assignable(Type::LONG, Type::INT));
    }

    #[test]
    fn test_class_hierarchy() {
        let zoo = Zoo::new();
        let ctx = AssignabilityContext::new(&zoo);
        let animal = Type::Class(ClassId(0));
        let dog = Type::Class(ClassId(1));
        let lab = Type::Class(ClassId(2));
        let pet = Type::Class(ClassId(3));

        assert!(ctx.is_assignable(animal, lab));
        assert!(ctx.is_assignable(pet, lab));
        assert!(ctx.is_assignable(dog, lab));
        assert!(!ctx.is_assignable(lab, dog));
        assert!(!ctx.is_assignable(pet, animal));
    }

    #[test]
    fn test_check_value_autoboxes_and_rejects_null_primitives() {
        let zoo = Zoo::new();
        let ctx = AssignabilityContext::new(&zoo);

        assert!(ctx.check_value(Type::INT, Some(Type::Boxed(Primitive::Int))).is_ok());
        assert!(ctx.check_value(Type::String, None).is_ok());
        assert_eq!(
            ctx.check_value(Type::INT, None),
            Err(TypeError::NullPrimitive { ty: "int".to_string() })
        );
        assert_eq!(
            ctx.check_value(Type::Class(ClassId(2)), Some(Type::Class(ClassId(0)))),
            Err(TypeError::Mismatch {
                expected: "Labrador".to_string(),
                actual: "Animal".to_string(),
            })
        );
    }
}
