//! Widget Sync - structural source synchronization for a GUI designer
//!
//! This library binds the source of a UI class to an object model and keeps
//! the two in step: creating, moving, deleting and renaming components edits
//! the source with minimal, format-preserving changes.
//!
//! # Example
//!
//! ```rust
//! use widget_sync::{Catalog, DesignerConfig, Session};
//!
//! let source = "class Panel extends JPanel {\n\tpublic Panel() {\n\t}\n}";
//! let mut session = Session::open(source, Catalog::builtin().unwrap(), DesignerConfig::default()).unwrap();
//! let root = session.root();
//! session.create("JButton", root, None).unwrap();
//! assert!(session.text().contains("add(new JButton());"));
//! ```

pub mod commands;
pub mod config;
pub mod descriptor;
pub mod editor;
pub mod error;
pub mod model;
pub mod naming;
pub mod parser;
pub mod resolver;
pub mod session;
pub mod syntax;
pub mod variable;

pub use config::{DesignerConfig, GenerationConfig, NamingConfig, NewVariable, TextMode};
pub use descriptor::{Catalog, DescriptorService};
pub use editor::{SourceEditor, StatementTarget};
pub use error::{DesignError, Diagnostic, ParseError};
pub use model::{DesignEvent, NodeId, Verdict};
pub use session::{Session, INSTANCE_PROPERTY};
pub use variable::{HandleStrategy, VariableProperty};
