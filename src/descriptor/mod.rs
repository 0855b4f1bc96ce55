//! Component descriptors: per-type construction and method catalogs
//!
//! The structural core only consumes the [`DescriptorService`] contract.
//! [`Catalog`] is the shipped implementation, loaded from TOML.

mod catalog;

use serde::Deserialize;

use crate::naming;

pub use catalog::{Catalog, CatalogError};

/// Constructor or method parameter
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParameterDescriptor {
    #[serde(rename = "type")]
    pub ty: String,
    /// Source used when the designer has to supply the argument
    #[serde(default)]
    pub default: Option<String>,
    /// Receives the parent component (constructor association)
    #[serde(default)]
    pub parent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConstructorDescriptor {
    #[serde(default)]
    pub params: Vec<ParameterDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub returns: Option<String>,
}

/// Child that exists as part of its host, reached through a getter or field
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExposedDescriptor {
    pub class: String,
    #[serde(default)]
    pub getter: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

/// Method producing a component: `Host.method(args)` or `host.method(args)`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FactoryDescriptor {
    pub method: String,
    pub class: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub params: Vec<ParameterDescriptor>,
}

/// Call on a host whose only effect is an implicit child (`menu.addSeparator()`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VoidDescriptor {
    pub method: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentDescriptor {
    pub class: String,
    #[serde(default)]
    pub superclass: Option<String>,
    /// Inherited from the superclass when absent
    #[serde(default)]
    pub container: Option<bool>,
    /// How children attach: `%parent%.add(%child%)` or `constructor`
    #[serde(default)]
    pub association: Option<String>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDescriptor>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub exposed: Vec<ExposedDescriptor>,
    #[serde(default)]
    pub factories: Vec<FactoryDescriptor>,
    #[serde(default, rename = "void")]
    pub void_methods: Vec<VoidDescriptor>,
    #[serde(default)]
    pub default_name: Option<String>,
    #[serde(default)]
    pub acronym: Option<String>,
    /// Prefer fields over locals when naming
    #[serde(default)]
    pub as_field: bool,
}

impl ComponentDescriptor {
    pub fn simple_name(&self) -> &str {
        naming::short_class(&self.class)
    }
}

/// Template value that attaches children through their constructor
pub const CONSTRUCTOR_ASSOCIATION: &str = "constructor";

/// Catalog of component metadata consumed by the structural core
pub trait DescriptorService {
    /// Descriptor for a simple or qualified class name
    fn component(&self, class: &str) -> Option<&ComponentDescriptor>;

    /// Descriptor and its superclasses, nearest first
    fn lineage(&self, class: &str) -> Vec<&ComponentDescriptor> {
        let mut out: Vec<&ComponentDescriptor> = Vec::new();
        let mut current = self.component(class);
        while let Some(descriptor) = current {
            if out.iter().any(|d| d.class == descriptor.class) {
                break;
            }
            out.push(descriptor);
            current = descriptor
                .superclass
                .as_deref()
                .and_then(|s| self.component(s));
        }
        out
    }

    fn constructors(&self, class: &str) -> Vec<&ConstructorDescriptor> {
        self.component(class)
            .map(|d| d.constructors.iter().collect())
            .unwrap_or_default()
    }

    /// Methods of the class, inherited ones included
    fn methods(&self, class: &str) -> Vec<&MethodDescriptor> {
        self.lineage(class)
            .into_iter()
            .flat_map(|d| d.methods.iter())
            .collect()
    }

    /// Source text for an argument the designer has to supply
    fn default_argument_source(&self, parameter: &ParameterDescriptor) -> String {
        if let Some(default) = &parameter.default {
            return default.clone();
        }
        match naming::short_class(&parameter.ty) {
            "boolean" => "false".to_string(),
            "int" | "long" | "short" | "byte" => "0".to_string(),
            "float" | "double" => "0.0".to_string(),
            "char" => "' '".to_string(),
            "String" => "\"\"".to_string(),
            _ => "null".to_string(),
        }
    }

    fn is_known(&self, class: &str) -> bool {
        self.component(class).is_some()
    }

    fn is_container(&self, class: &str) -> bool {
        self.lineage(class)
            .into_iter()
            .find_map(|d| d.container)
            .unwrap_or(false)
    }

    fn association_template(&self, class: &str) -> Option<&str> {
        self.lineage(class)
            .into_iter()
            .find_map(|d| d.association.as_deref())
    }

    fn exposed(&self, class: &str) -> Vec<&ExposedDescriptor> {
        self.lineage(class)
            .into_iter()
            .flat_map(|d| d.exposed.iter())
            .collect()
    }

    fn factories(&self, class: &str) -> Vec<&FactoryDescriptor> {
        self.lineage(class)
            .into_iter()
            .flat_map(|d| d.factories.iter())
            .collect()
    }

    fn void_methods(&self, class: &str) -> Vec<&VoidDescriptor> {
        self.lineage(class)
            .into_iter()
            .flat_map(|d| d.void_methods.iter())
            .collect()
    }

    fn default_name(&self, class: &str) -> String {
        self.component(class)
            .and_then(|d| d.default_name.clone())
            .unwrap_or_else(|| naming::default_name(class))
    }

    fn acronym(&self, class: &str) -> String {
        self.component(class)
            .and_then(|d| d.acronym.clone())
            .unwrap_or_else(|| naming::acronym(class))
    }

    fn prefers_field(&self, class: &str) -> bool {
        self.component(class).map(|d| d.as_field).unwrap_or(false)
    }

    /// True if `class` is `ancestor` or one of its subclasses
    fn is_assignable(&self, class: &str, ancestor: &str) -> bool {
        let ancestor = naming::short_class(ancestor);
        self.lineage(class)
            .into_iter()
            .any(|d| d.simple_name() == ancestor)
    }
}
