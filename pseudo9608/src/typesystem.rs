//! `TypeSystem`: a mapping `Type -> TypeTemplate`, including the built-in
//! types (spec.md §3, §4.3).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::{ObjectData, TypedValue, Value};

/// `ObjectTemplate`: a mapping `NameKey -> Type`, the schema for a
/// user-declared record type (spec.md §3). Holds field *types*, not values.
pub type ObjectTemplate = HashMap<String, String>;

/// `TypeTemplate = (type, Option<ObjectTemplate>)` (spec.md §3).
#[derive(Debug, Clone)]
pub struct TypeTemplate {
    pub type_name: String,
    pub object_template: Option<ObjectTemplate>,
}

const BUILTIN_TYPES: &[&str] = &["BOOLEAN", "INTEGER", "REAL", "STRING", "FILE", "ARRAY", "NULL"];

#[derive(Debug)]
pub struct TypeSystemData {
    templates: HashMap<String, TypeTemplate>,
}

pub type TypeSystem = Rc<RefCell<TypeSystemData>>;

/// Seed a fresh `TypeSystem` with the seven built-in types (spec.md §4.3:
/// `TypeSystem(*types)` construction in the original `typesystem.py`).
pub fn new_type_system() -> TypeSystem {
    let mut templates = HashMap::new();
    for name in BUILTIN_TYPES {
        templates.insert(
            name.to_string(),
            TypeTemplate { type_name: name.to_string(), object_template: None },
        );
    }
    Rc::new(RefCell::new(TypeSystemData { templates }))
}

impl TypeSystemData {
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TypeTemplate> {
        self.templates.get(name)
    }

    pub fn is_record(&self, name: &str) -> bool {
        self.templates.get(name).map(|t| t.object_template.is_some()).unwrap_or(false)
    }

    /// `declare(name)`: register a new (as yet templateless) type name, as
    /// `TYPE <name>` does before its field list is known.
    pub fn declare(&mut self, name: &str) {
        self.templates.insert(
            name.to_string(),
            TypeTemplate { type_name: name.to_string(), object_template: None },
        );
    }

    /// `setTemplate(name, objectTemplate)`: attach the field schema once a
    /// `TYPE` block's `DECLARE` lines have all been resolved.
    pub fn set_template(&mut self, name: &str, template: ObjectTemplate) {
        if let Some(t) = self.templates.get_mut(name) {
            t.object_template = Some(template);
        }
    }

    /// `clone(t)`: a fresh empty `TypedValue` of type `t`. For a record
    /// type, a fresh `Object` is built with every field recursively cloned
    /// from the template's schema (spec.md §4.3, §9).
    pub fn clone_type(&self, type_name: &str) -> TypedValue {
        match self.templates.get(type_name) {
            Some(TypeTemplate { object_template: Some(fields), .. }) => {
                let mut obj_fields = HashMap::new();
                for (field_name, field_type) in fields {
                    obj_fields.insert(field_name.clone(), self.clone_type(field_type).into_slot());
                }
                let object =
                    ObjectData { type_name: type_name.to_string(), fields: obj_fields };
                TypedValue::with_value(type_name, Value::Object(Rc::new(RefCell::new(object))))
            }
            _ => TypedValue::empty(type_name),
        }
    }
}
