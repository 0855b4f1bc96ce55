//! Execution flow: the statements reachable from the designer's root methods
//!
//! Roots are constructors, static `main` methods, methods named in the
//! configuration and methods whose doc comment carries `@parser.entryPoint`.
//! Traversal is depth-first in source order; a call to another method of the
//! same class visits that method's body (once) right after the calling
//! statement.

use std::collections::{HashMap, HashSet};

use super::tree::{SyntaxId, SyntaxKind, SyntaxTree};

const ENTRY_POINT_TAG: &str = "@parser.entryPoint";

#[derive(Debug, Clone, Default)]
pub struct ExecutionFlow {
    roots: Vec<SyntaxId>,
    methods: Vec<SyntaxId>,
    statements: Vec<SyntaxId>,
    positions: HashMap<SyntaxId, usize>,
}

impl ExecutionFlow {
    pub fn compute(tree: &SyntaxTree, text: &str, extra_roots: &[String]) -> Self {
        let roots: Vec<SyntaxId> = tree
            .methods()
            .into_iter()
            .filter(|m| is_root(tree, text, *m, extra_roots))
            .collect();

        let mut flow = ExecutionFlow {
            roots: roots.clone(),
            ..Default::default()
        };
        let mut visited = HashSet::new();
        for root in roots {
            flow.visit_method(tree, root, &mut visited);
        }
        flow
    }

    fn visit_method(&mut self, tree: &SyntaxTree, method: SyntaxId, visited: &mut HashSet<SyntaxId>) {
        if !visited.insert(method) {
            return;
        }
        self.methods.push(method);
        if let Some(body) = tree.method_body(method) {
            for stmt in tree.children(body).to_vec() {
                self.visit_statement(tree, stmt, visited);
            }
        }
    }

    fn visit_statement(&mut self, tree: &SyntaxTree, stmt: SyntaxId, visited: &mut HashSet<SyntaxId>) {
        self.positions.insert(stmt, self.statements.len());
        self.statements.push(stmt);

        // expressions owned by this statement, nested statements excluded
        let mut nested = Vec::new();
        let mut stack: Vec<SyntaxId> = tree.children(stmt).iter().rev().copied().collect();
        let mut callees = Vec::new();
        while let Some(id) = stack.pop() {
            if tree.kind(id).is_statement() {
                nested.push(id);
                continue;
            }
            if let Some(callee) = local_callee(tree, id) {
                callees.push(callee);
            }
            stack.extend(tree.children(id).iter().rev().copied());
        }
        for callee in callees {
            self.visit_method(tree, callee, visited);
        }
        for child in nested {
            if matches!(tree.kind(child), SyntaxKind::Block) {
                self.positions.insert(child, self.statements.len());
                for inner in tree.children(child).to_vec() {
                    self.visit_statement(tree, inner, visited);
                }
            } else {
                self.visit_statement(tree, child, visited);
            }
        }
    }

    /// Root methods in declaration order
    pub fn roots(&self) -> &[SyntaxId] {
        &self.roots
    }

    /// Methods reached from the roots, in visiting order
    pub fn methods(&self) -> &[SyntaxId] {
        &self.methods
    }

    /// Reachable statements in execution order
    pub fn statements(&self) -> &[SyntaxId] {
        &self.statements
    }

    /// Position of a statement in execution order
    pub fn position(&self, stmt: SyntaxId) -> Option<usize> {
        self.positions.get(&stmt).copied()
    }

    pub fn contains(&self, stmt: SyntaxId) -> bool {
        self.positions.contains_key(&stmt)
    }

    pub fn reaches_method(&self, method: SyntaxId) -> bool {
        self.methods.contains(&method)
    }
}

/// Method of this class called by an unqualified or `this.`-qualified invocation
fn local_callee(tree: &SyntaxTree, id: SyntaxId) -> Option<SyntaxId> {
    let invocation = tree.invocation(id)?;
    if let Some(target) = invocation.target {
        if !matches!(tree.kind(target), SyntaxKind::This) {
            return None;
        }
    }
    tree.methods().into_iter().find(|m| {
        !tree.is_constructor(*m)
            && tree.name_of(*m) == Some(invocation.name)
            && tree.params(*m).len() == invocation.args.len()
    })
}

fn is_root(tree: &SyntaxTree, text: &str, method: SyntaxId, extra_roots: &[String]) -> bool {
    if tree.is_constructor(method) {
        return true;
    }
    let name = tree.name_of(method).unwrap_or_default();
    if name == "main" && tree.is_static(method) {
        return true;
    }
    if extra_roots.iter().any(|r| r == name) {
        return true;
    }
    doc_comment(text, tree.span(method).start)
        .map(|doc| doc.contains(ENTRY_POINT_TAG))
        .unwrap_or(false)
}

/// Doc comment immediately preceding `start`, skipping annotations
fn doc_comment(text: &str, start: usize) -> Option<&str> {
    let before = &text[..start];
    let end = before.rfind("*/")?;
    let between = &before[end + 2..];
    if !between.split_whitespace().all(|word| word.starts_with('@')) {
        return None;
    }
    let open = before[..end].rfind("/**")?;
    Some(&before[open..end + 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn flow(source: &str, extra: &[String]) -> (SyntaxTree, ExecutionFlow) {
        let unit = parse(source).expect("Should parse");
        let tree = SyntaxTree::from_unit(&unit, source.len());
        let flow = ExecutionFlow::compute(&tree, source, extra);
        (tree, flow)
    }

    #[test]
    fn test_roots() {
        let source = r#"class A {
	public static void main(String[] args) { }
	public A() { }
	/** @parser.entryPoint */
	@Override
	public void open() { }
	private void helper() { }
	private void configured() { }
}"#;
        let (tree, flow) = flow(source, &["configured".to_string()]);
        let names: Vec<_> = flow
            .roots()
            .iter()
            .filter_map(|m| tree.name_of(*m))
            .collect();
        assert_eq!(names, vec!["main", "A", "open", "configured"]);
    }

    #[test]
    fn test_follows_local_calls_once() {
        let source = r#"class A {
	public A() {
		init();
		add(new JButton());
		init();
	}
	private void init() {
		setLayout(null);
	}
}"#;
        let (tree, flow) = flow(source, &[]);
        let texts: Vec<_> = flow
            .statements()
            .iter()
            .map(|s| &source[tree.span(*s)])
            .collect();
        assert_eq!(
            texts,
            vec!["init();", "setLayout(null);", "add(new JButton());", "init();"]
        );
        assert_eq!(flow.methods().len(), 2);
    }

    #[test]
    fn test_nested_blocks_in_order() {
        let source = r#"class A {
	public A() {
		{
			a();
		}
		if (x == null) {
			b();
		} else {
			c();
		}
	}
}"#;
        let (tree, flow) = flow(source, &[]);
        let texts: Vec<_> = flow
            .statements()
            .iter()
            .map(|s| &source[tree.span(*s)])
            .filter(|t| t.ends_with(';'))
            .collect();
        assert_eq!(texts, vec!["a();", "b();", "c();"]);
    }

    #[test]
    fn test_unreached_method() {
        let source = "class A {\n\tpublic A() { }\n\tvoid other() { x(); }\n}";
        let (tree, flow) = flow(source, &[]);
        let other = tree.methods()[1];
        assert!(!flow.reaches_method(other));
    }
}
