//! Widget Sync CLI
//!
//! Usage:
//!   widget-sync [OPTIONS] <FILE> <COMMAND>
//!
//! Commands:
//!   tree      Print the component tree
//!   rename    Rename a component's variable
//!   create    Create a component
//!   delete    Delete a component and its children
//!   move      Move a component under a parent
//!   to-field  Convert a component's local variable to a field
//!   to-local  Convert a component's field to a local variable
//!   to-lazy   Convert a component to lazy creation
//!
//! Edited source is written to stdout. Set `RUST_LOG=debug` for edit traces.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use widget_sync::{Catalog, DesignError, DesignerConfig, NodeId, Session};

#[derive(Parser)]
#[command(name = "widget-sync")]
#[command(about = "Structural source synchronization for GUI designer classes")]
struct Cli {
    /// Source file of the designed class
    input: PathBuf,

    /// Designer configuration (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra component catalog merged over the built-in one (TOML format)
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the component tree
    Tree,
    /// Rename a component's variable
    Rename { name: String, new_name: String },
    /// Create a component
    Create {
        class: String,
        /// Parent component (defaults to the root)
        #[arg(short, long)]
        parent: Option<String>,
        /// Sibling to insert before (defaults to last)
        #[arg(short, long)]
        before: Option<String>,
    },
    /// Delete a component and its children
    Delete { name: String },
    /// Move a component under a parent
    Move {
        name: String,
        #[arg(short, long)]
        parent: Option<String>,
        #[arg(short, long)]
        before: Option<String>,
    },
    /// Convert a component's local variable to a field
    ToField { name: String },
    /// Convert a component's field to a local variable
    ToLocal { name: String },
    /// Convert a component to lazy creation
    ToLazy { name: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match DesignerConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => DesignerConfig::default(),
    };

    let catalog = match Catalog::builtin_with(cli.catalog.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            std::process::exit(1);
        }
    };

    let source = match fs::read_to_string(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let mut session = match Session::open(&source, catalog, config) {
        Ok(s) => s,
        Err(e) => fail(&e, &source, &cli.input),
    };
    for diagnostic in session.diagnostics() {
        eprintln!("warning: {}", diagnostic);
    }

    match run(&mut session, cli.command) {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => print!("{}", session.text()),
        Err(e) => fail(&e, session.text(), &cli.input),
    }
}

/// Run one command; `Some` is printed instead of the edited source
fn run(session: &mut Session, command: Command) -> Result<Option<String>, DesignError> {
    match command {
        Command::Tree => return Ok(Some(session.dump())),
        Command::Rename { name, new_name } => {
            let node = lookup(session, &name)?;
            let used = session.set_name(node, &new_name)?;
            if used != new_name {
                eprintln!("renamed to '{}'", used);
            }
        }
        Command::Create {
            class,
            parent,
            before,
        } => {
            let parent = lookup_or_root(session, parent.as_deref())?;
            let before = before.map(|b| lookup(session, &b)).transpose()?;
            session.create(&class, parent, before)?;
        }
        Command::Delete { name } => {
            let node = lookup(session, &name)?;
            session.delete(node)?;
        }
        Command::Move {
            name,
            parent,
            before,
        } => {
            let node = lookup(session, &name)?;
            let parent = match parent {
                Some(p) => lookup(session, &p)?,
                None => session.parent(node).unwrap_or(session.root()),
            };
            let before = before.map(|b| lookup(session, &b)).transpose()?;
            session.move_node(node, parent, before)?;
        }
        Command::ToField { name } => {
            let node = lookup(session, &name)?;
            session.convert_local_to_field(node)?;
        }
        Command::ToLocal { name } => {
            let node = lookup(session, &name)?;
            session.convert_field_to_local(node)?;
        }
        Command::ToLazy { name } => {
            let node = lookup(session, &name)?;
            session.convert_to_lazy(node)?;
        }
    }
    Ok(None)
}

fn lookup(session: &Session, name: &str) -> Result<NodeId, DesignError> {
    if name == "this" {
        return Ok(session.root());
    }
    session
        .find_by_name(name)
        .ok_or_else(|| DesignError::invalid_target(format!("no component named '{}'", name)))
}

fn lookup_or_root(session: &Session, name: Option<&str>) -> Result<NodeId, DesignError> {
    match name {
        Some(name) => lookup(session, name),
        None => Ok(session.root()),
    }
}

fn fail(error: &DesignError, source: &str, path: &Path) -> ! {
    let filename = path.display().to_string();
    match error {
        DesignError::Parse(errors) => {
            for e in errors {
                eprint!("{}", e.format(source, &filename));
            }
        }
        other => eprintln!("Error: {}", other),
    }
    std::process::exit(1);
}
