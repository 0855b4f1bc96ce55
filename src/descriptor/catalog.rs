//! TOML component catalog
//!
//! ```toml
//! [[component]]
//! class = "javax.swing.JPanel"
//! superclass = "javax.swing.JComponent"
//! container = true
//!
//! [[component.constructors]]
//! params = []
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::{ComponentDescriptor, DescriptorService};
use crate::naming;

/// Errors that can occur when loading a component catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Deserialize)]
struct TomlCatalog {
    #[serde(default)]
    component: Vec<ComponentDescriptor>,
}

/// Swing and SWT components known out of the box
const DEFAULT_CATALOG: &str = r#"
[[component]]
class = "java.lang.Object"
[[component.constructors]]

[[component]]
class = "java.awt.Component"
superclass = "java.lang.Object"
container = false
[[component.methods]]
name = "setVisible"
params = [{ type = "boolean" }]
[[component.methods]]
name = "setEnabled"
params = [{ type = "boolean" }]

[[component]]
class = "java.awt.Container"
superclass = "java.awt.Component"
container = true
association = "%parent%.add(%child%)"
[[component.constructors]]
[[component.methods]]
name = "add"
params = [{ type = "java.awt.Component" }]
[[component.methods]]
name = "setLayout"
params = [{ type = "java.awt.LayoutManager" }]

[[component]]
class = "javax.swing.JComponent"
superclass = "java.awt.Container"
container = false
[[component.methods]]
name = "setToolTipText"
params = [{ type = "String" }]

[[component]]
class = "javax.swing.JPanel"
superclass = "javax.swing.JComponent"
container = true
[[component.constructors]]

[[component]]
class = "javax.swing.JButton"
superclass = "javax.swing.JComponent"
[[component.constructors]]
[[component.constructors]]
params = [{ type = "String", default = "\"New button\"" }]
[[component.methods]]
name = "setText"
params = [{ type = "String" }]

[[component]]
class = "javax.swing.JLabel"
superclass = "javax.swing.JComponent"
acronym = "lbl"
[[component.constructors]]
[[component.constructors]]
params = [{ type = "String", default = "\"New label\"" }]
[[component.methods]]
name = "setText"
params = [{ type = "String" }]

[[component]]
class = "javax.swing.JTextField"
superclass = "javax.swing.JComponent"
default_name = "textField"
[[component.constructors]]
[[component.methods]]
name = "setColumns"
params = [{ type = "int" }]

[[component]]
class = "javax.swing.JFrame"
superclass = "java.awt.Container"
container = true
as_field = true
[[component.constructors]]
[[component.exposed]]
class = "javax.swing.JPanel"
getter = "getContentPane"

[[component]]
class = "javax.swing.JScrollPane"
superclass = "javax.swing.JComponent"
container = true
association = "%parent%.setViewportView(%child%)"
[[component.constructors]]

[[component]]
class = "javax.swing.JMenuBar"
superclass = "javax.swing.JComponent"
container = true
[[component.constructors]]

[[component]]
class = "javax.swing.JMenuItem"
superclass = "javax.swing.JComponent"
default_name = "menuItem"
acronym = "mntm"
[[component.constructors]]
params = [{ type = "String", default = "\"New menu item\"" }]

[[component]]
class = "javax.swing.JMenu"
superclass = "javax.swing.JMenuItem"
container = true
default_name = "menu"
acronym = "mn"
[[component.constructors]]
params = [{ type = "String", default = "\"New menu\"" }]
[[component.factories]]
method = "add"
class = "javax.swing.JMenuItem"
params = [{ type = "String" }]
[[component.void]]
method = "addSeparator"
class = "javax.swing.JSeparator"

[[component]]
class = "javax.swing.JSeparator"
superclass = "javax.swing.JComponent"
[[component.constructors]]

[[component]]
class = "javax.swing.Box"
superclass = "javax.swing.JComponent"
container = true
[[component.factories]]
method = "createHorizontalBox"
class = "javax.swing.Box"
static = true
[[component.factories]]
method = "createVerticalBox"
class = "javax.swing.Box"
static = true
[[component.factories]]
method = "createHorizontalGlue"
class = "java.awt.Component"
static = true

[[component]]
class = "org.eclipse.swt.widgets.Widget"
superclass = "java.lang.Object"

[[component]]
class = "org.eclipse.swt.widgets.Control"
superclass = "org.eclipse.swt.widgets.Widget"
[[component.constructors]]
params = [
    { type = "org.eclipse.swt.widgets.Composite", parent = true },
    { type = "int", default = "SWT.NONE" },
]

[[component]]
class = "org.eclipse.swt.widgets.Composite"
superclass = "org.eclipse.swt.widgets.Control"
container = true
association = "constructor"
[[component.constructors]]
params = [
    { type = "org.eclipse.swt.widgets.Composite", parent = true },
    { type = "int", default = "SWT.NONE" },
]

[[component]]
class = "org.eclipse.swt.widgets.Shell"
superclass = "org.eclipse.swt.widgets.Composite"
as_field = true
[[component.constructors]]

[[component]]
class = "org.eclipse.swt.widgets.Button"
superclass = "org.eclipse.swt.widgets.Control"
[[component.constructors]]
params = [
    { type = "org.eclipse.swt.widgets.Composite", parent = true },
    { type = "int", default = "SWT.NONE" },
]
[[component.methods]]
name = "setText"
params = [{ type = "String" }]

[[component]]
class = "org.eclipse.swt.widgets.Label"
superclass = "org.eclipse.swt.widgets.Control"
[[component.constructors]]
params = [
    { type = "org.eclipse.swt.widgets.Composite", parent = true },
    { type = "int", default = "SWT.NONE" },
]
[[component.methods]]
name = "setText"
params = [{ type = "String" }]
"#;

/// Component descriptors indexed by simple and qualified class name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    components: Vec<ComponentDescriptor>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a catalog from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: TomlCatalog = toml::from_str(content)?;
        let mut catalog = Catalog::default();
        for component in parsed.component {
            catalog.insert(component);
        }
        Ok(catalog)
    }

    /// The built-in Swing/SWT catalog
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_str(DEFAULT_CATALOG)
    }

    /// Built-in catalog extended (and overridden) by a user catalog
    pub fn builtin_with(path: Option<&Path>) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin()?;
        if let Some(path) = path {
            catalog.extend(Self::from_file(path)?);
        }
        Ok(catalog)
    }

    /// Add or replace a descriptor
    pub fn insert(&mut self, component: ComponentDescriptor) {
        let simple = component.simple_name().to_string();
        let qualified = component.class.clone();
        let slot = match self.index.get(&qualified) {
            Some(existing) => {
                self.components[*existing] = component;
                *existing
            }
            None => {
                self.components.push(component);
                self.components.len() - 1
            }
        };
        self.index.insert(simple, slot);
        self.index.insert(qualified, slot);
    }

    pub fn extend(&mut self, other: Catalog) {
        for component in other.components {
            self.insert(component);
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.iter()
    }
}

impl DescriptorService for Catalog {
    fn component(&self, class: &str) -> Option<&ComponentDescriptor> {
        self.index
            .get(class)
            .or_else(|| self.index.get(naming::short_class(class)))
            .and_then(|i| self.components.get(*i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParameterDescriptor;

    fn catalog() -> Catalog {
        Catalog::builtin().expect("Built-in catalog should be valid TOML")
    }

    #[test]
    fn test_builtin_lookup() {
        let catalog = catalog();
        assert!(catalog.is_known("JButton"));
        assert!(catalog.is_known("javax.swing.JButton"));
        assert!(!catalog.is_known("Unknown"));
        assert_eq!(catalog.constructors("JButton").len(), 2);
    }

    #[test]
    fn test_inherited_container_and_association() {
        let catalog = catalog();
        assert!(catalog.is_container("JPanel"));
        assert!(!catalog.is_container("JButton"));
        assert_eq!(
            catalog.association_template("JPanel"),
            Some("%parent%.add(%child%)")
        );
        assert_eq!(catalog.association_template("Composite"), Some("constructor"));
        assert_eq!(catalog.association_template("Shell"), Some("constructor"));
        assert!(catalog.is_assignable("JMenu", "JComponent"));
    }

    #[test]
    fn test_inherited_methods() {
        let catalog = catalog();
        let names: Vec<_> = catalog.methods("JButton").iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"setText"));
        assert!(names.contains(&"setLayout"));
        assert!(names.contains(&"setVisible"));
    }

    #[test]
    fn test_default_argument_source() {
        let catalog = catalog();
        let param = |ty: &str| ParameterDescriptor {
            ty: ty.to_string(),
            default: None,
            parent: false,
        };
        assert_eq!(catalog.default_argument_source(&param("String")), "\"\"");
        assert_eq!(catalog.default_argument_source(&param("boolean")), "false");
        assert_eq!(catalog.default_argument_source(&param("int")), "0");
        assert_eq!(catalog.default_argument_source(&param("java.awt.Color")), "null");
        let style = &catalog.constructors("Button")[0].params[1];
        assert_eq!(catalog.default_argument_source(style), "SWT.NONE");
    }

    #[test]
    fn test_names_from_catalog() {
        let catalog = catalog();
        assert_eq!(catalog.default_name("JTextField"), "textField");
        assert_eq!(catalog.default_name("JButton"), "button");
        assert_eq!(catalog.acronym("JMenuItem"), "mntm");
        assert_eq!(catalog.acronym("JButton"), "btn");
    }

    #[test]
    fn test_user_catalog_overrides() {
        let mut catalog = catalog();
        let user = Catalog::from_str(
            r#"
[[component]]
class = "com.example.Gauge"
superclass = "javax.swing.JComponent"
[[component.constructors]]

[[component]]
class = "javax.swing.JButton"
superclass = "javax.swing.JComponent"
default_name = "btn"
"#,
        )
        .expect("Should parse");
        catalog.extend(user);
        assert!(catalog.is_known("Gauge"));
        assert_eq!(catalog.default_name("JButton"), "btn");
        assert!(catalog.constructors("JButton").is_empty());
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = Catalog::from_str("[[component]]\nclass = ");
        assert!(matches!(result, Err(CatalogError::ParseError(_))));
    }
}
