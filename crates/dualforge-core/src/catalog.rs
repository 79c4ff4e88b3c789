//! User-library catalog (component B).
//!
//! Per REDESIGN FLAGS, this is an immutable value built once and threaded
//! through the pipeline as a plain argument, rather than a process-wide
//! singleton. `Catalog::standard()` builds the fixed registry named in
//! spec.md §3; callers construct it once (in `main`, or once per test
//! module) and pass `&Catalog` down to every pass.

use std::collections::HashMap;

use crate::ir::OperationKind;

/// What a recognized, non-operation, non-bind method does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Width,
    Height,
    Length,
    Value,
}

/// How the catalog classifies a method name on a recognized DSL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMethod {
    Operation(OperationKind),
    /// The "to-host" materialization method (spec.md §4.D.3).
    OutputBind,
    Accessor(AccessorKind),
}

/// One recognized DSL class.
#[derive(Debug, Clone)]
struct DslClass {
    /// Parametric over an element type, e.g. `Array<T>`.
    typed: bool,
    is_collection: bool,
    c_type: &'static str,
    methods: HashMap<&'static str, CatalogMethod>,
}

/// Process-independent, read-only registry of DSL classes.
#[derive(Debug, Clone)]
pub struct Catalog {
    classes: HashMap<&'static str, DslClass>,
}

fn collection_methods() -> HashMap<&'static str, CatalogMethod> {
    HashMap::from([
        ("foreach", CatalogMethod::Operation(OperationKind::Foreach)),
        ("map", CatalogMethod::Operation(OperationKind::Map)),
        ("reduce", CatalogMethod::Operation(OperationKind::Reduce)),
        ("filter", CatalogMethod::Operation(OperationKind::Filter)),
        ("toHost", CatalogMethod::OutputBind),
    ])
}

impl Catalog {
    /// Build the fixed registry of DSL classes named in spec.md §3:
    /// `BitmapImage`, `HDRImage`, `Array`, `Pixel`, `Int16`, `Int32`,
    /// `Float32`, `RGB`.
    pub fn standard() -> Self {
        let mut classes = HashMap::new();

        let mut bitmap_methods = collection_methods();
        bitmap_methods.insert("width", CatalogMethod::Accessor(AccessorKind::Width));
        bitmap_methods.insert("height", CatalogMethod::Accessor(AccessorKind::Height));
        classes.insert(
            "BitmapImage",
            DslClass {
                typed: false,
                is_collection: true,
                c_type: "float3",
                methods: bitmap_methods.clone(),
            },
        );
        classes.insert(
            "HDRImage",
            DslClass {
                typed: false,
                is_collection: true,
                c_type: "float3",
                methods: bitmap_methods,
            },
        );

        let mut array_methods = collection_methods();
        array_methods.insert("length", CatalogMethod::Accessor(AccessorKind::Length));
        classes.insert(
            "Array",
            DslClass {
                typed: true,
                is_collection: true,
                // An Array's element C type depends on its type parameter;
                // `c_type("Array")` itself is unused by translators, which
                // instead resolve the element's own `c_type`.
                c_type: "",
                methods: array_methods,
            },
        );

        classes.insert(
            "Pixel",
            DslClass {
                typed: false,
                is_collection: false,
                c_type: "float4",
                methods: HashMap::from([("value", CatalogMethod::Accessor(AccessorKind::Value))]),
            },
        );
        classes.insert(
            "RGB",
            DslClass {
                typed: false,
                is_collection: false,
                c_type: "float3",
                methods: HashMap::new(),
            },
        );
        for (name, c_type) in [("Int16", "short"), ("Int32", "int"), ("Float32", "float")] {
            classes.insert(
                name,
                DslClass {
                    typed: false,
                    is_collection: false,
                    c_type,
                    methods: HashMap::from([("value", CatalogMethod::Accessor(AccessorKind::Value))]),
                },
            );
        }

        Catalog { classes }
    }

    pub fn recognizes(&self, type_name: &str) -> bool {
        self.classes.contains_key(type_name)
    }

    pub fn valid_method(&self, type_name: &str, method_name: &str) -> Option<CatalogMethod> {
        self.classes.get(type_name)?.methods.get(method_name).copied()
    }

    pub fn is_collection(&self, type_name: &str) -> bool {
        self.classes
            .get(type_name)
            .map(|c| c.is_collection)
            .unwrap_or(false)
    }

    pub fn is_typed(&self, type_name: &str) -> bool {
        self.classes.get(type_name).map(|c| c.typed).unwrap_or(false)
    }

    /// Map a DSL type name to its kernel-C dialect spelling. Unknown type
    /// names pass through untouched (spec.md §4.B).
    pub fn c_type(&self, type_name: &str) -> String {
        match self.classes.get(type_name) {
            Some(c) if !c.c_type.is_empty() => c.c_type.to_string(),
            _ => type_name.to_string(),
        }
    }

    /// Whether a user function's per-element argument type is admissible
    /// (spec.md §3 invariant): a primitive, a boxed primitive, `Pixel`, or
    /// one of `Int16`/`Int32`/`Float32`.
    pub fn is_admissible_element_type(&self, type_name: &str) -> bool {
        matches!(
            type_name,
            "boolean"
                | "char"
                | "int"
                | "float"
                | "double"
                | "long"
                | "short"
                | "byte"
                | "Boolean"
                | "Character"
                | "Integer"
                | "Float"
                | "Double"
                | "Long"
                | "Short"
                | "Byte"
                | "Pixel"
                | "Int16"
                | "Int32"
                | "Float32"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_classes_only() {
        let catalog = Catalog::standard();
        assert!(catalog.recognizes("BitmapImage"));
        assert!(catalog.recognizes("Pixel"));
        assert!(!catalog.recognizes("java.util.List"));
    }

    #[test]
    fn valid_method_maps_operations() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.valid_method("BitmapImage", "foreach"),
            Some(CatalogMethod::Operation(OperationKind::Foreach))
        );
        assert_eq!(
            catalog.valid_method("Array", "reduce"),
            Some(CatalogMethod::Operation(OperationKind::Reduce))
        );
        assert_eq!(catalog.valid_method("BitmapImage", "nonsense"), None);
    }

    #[test]
    fn valid_method_maps_output_bind_and_accessors() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.valid_method("BitmapImage", "toHost"),
            Some(CatalogMethod::OutputBind)
        );
        assert_eq!(
            catalog.valid_method("BitmapImage", "width"),
            Some(CatalogMethod::Accessor(AccessorKind::Width))
        );
        assert_eq!(
            catalog.valid_method("Array", "length"),
            Some(CatalogMethod::Accessor(AccessorKind::Length))
        );
    }

    #[test]
    fn is_collection_distinguishes_element_types() {
        let catalog = Catalog::standard();
        assert!(catalog.is_collection("Array"));
        assert!(catalog.is_collection("BitmapImage"));
        assert!(!catalog.is_collection("Pixel"));
        assert!(!catalog.is_collection("Int32"));
    }

    #[test]
    fn c_type_maps_known_types_and_passes_through_unknown() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.c_type("Int32"), "int");
        assert_eq!(catalog.c_type("Float32"), "float");
        assert_eq!(catalog.c_type("Pixel"), "float4");
        assert_eq!(catalog.c_type("com.app.Foo"), "com.app.Foo");
    }

    #[test]
    fn admissible_element_types_cover_primitives_boxes_and_dsl_numerics() {
        let catalog = Catalog::standard();
        assert!(catalog.is_admissible_element_type("float"));
        assert!(catalog.is_admissible_element_type("Float"));
        assert!(catalog.is_admissible_element_type("Pixel"));
        assert!(catalog.is_admissible_element_type("Int32"));
        assert!(!catalog.is_admissible_element_type("String"));
    }
}
