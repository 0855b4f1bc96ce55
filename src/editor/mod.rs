//! Text-editing service: the only code that mutates source text
//!
//! Each operation edits the text, re-lowers the fresh fragment into the
//! syntax arena and keeps every live span consistent with the new text.
//! Existing subtrees that are re-emitted verbatim are grafted back so that
//! their ids survive the edit.

mod target;

use crate::config::GenerationConfig;
use crate::error::DesignError;
use crate::parser::{parse, parse_expression, parse_member, parse_statement, Member};
use crate::syntax::{SyntaxId, SyntaxKind, SyntaxTree};

pub use target::StatementTarget;

/// An existing (detached) subtree re-emitted at `offset` within inserted code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Graft {
    pub offset: usize,
    pub node: SyntaxId,
}

impl Graft {
    pub fn new(offset: usize, node: SyntaxId) -> Self {
        Self { offset, node }
    }
}

/// Text plus syntax arena
#[derive(Debug, Clone)]
pub struct SourceEditor {
    text: String,
    tree: SyntaxTree,
    indent: String,
    eol: String,
    /// Blank line written by `add_field` between a class's first field and
    /// the members that follow
    field_separator: bool,
}

/// Where and how a fragment is spliced into the text
struct Layout {
    start: usize,
    end: usize,
    prefix: String,
    suffix: String,
}

impl SourceEditor {
    pub fn new(source: &str, generation: &GenerationConfig) -> Result<Self, DesignError> {
        let unit = parse(source)?;
        Ok(Self {
            text: source.to_string(),
            tree: SyntaxTree::from_unit(&unit, source.len()),
            indent: generation.indent.clone(),
            eol: generation.end_of_line.clone(),
            field_separator: false,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent
    }

    pub fn eol(&self) -> &str {
        &self.eol
    }

    /// Current source text of a live node
    pub fn source_of(&self, id: SyntaxId) -> &str {
        let span = self.tree.span(id);
        self.text.get(span).unwrap_or("")
    }

    /// Leading whitespace of the line on which a node starts
    pub fn indent_of(&self, id: SyntaxId) -> String {
        let start = self.tree.span(id).start;
        let line_start = self.text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        self.text[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    fn check_live(&self, id: SyntaxId) -> Result<(), DesignError> {
        if self.tree.is_live(id) {
            Ok(())
        } else {
            Err(DesignError::stale(id))
        }
    }

    fn splice(&mut self, start: usize, end: usize, replacement: &str) {
        self.text.replace_range(start..end, replacement);
        self.tree.apply_edit(start, end, replacement.len());
    }

    /// Start of the whitespace run that ends at `pos`
    fn whitespace_start(&self, pos: usize) -> usize {
        self.text[..pos].trim_end().len()
    }

    fn statement_layout(&self, target: StatementTarget, block: SyntaxId) -> Layout {
        let statements = self.tree.children(block);
        match target {
            StatementTarget::Before(stmt) => self.before_layout(stmt),
            StatementTarget::After(stmt) => self.after_layout(stmt),
            StatementTarget::BlockStart(_) if !statements.is_empty() => {
                self.before_layout(statements[0])
            }
            StatementTarget::BlockEnd(_) if !statements.is_empty() => {
                self.after_layout(statements[statements.len() - 1])
            }
            _ => self.empty_body_layout(block, self.tree.span(block).start),
        }
    }

    fn before_layout(&self, stmt: SyntaxId) -> Layout {
        let start = self.tree.span(stmt).start;
        Layout {
            start,
            end: start,
            prefix: String::new(),
            suffix: format!("{}{}", self.eol, self.indent_of(stmt)),
        }
    }

    fn after_layout(&self, node: SyntaxId) -> Layout {
        let end = self.tree.span(node).end;
        Layout {
            start: end,
            end,
            prefix: format!("{}{}", self.eol, self.indent_of(node)),
            suffix: String::new(),
        }
    }

    /// Layout for the first entry of a `{ }` body; `open` is at or before the brace
    fn empty_body_layout(&self, owner: SyntaxId, open: usize) -> Layout {
        let span = self.tree.span(owner);
        let brace = self.text[open..span.end]
            .find('{')
            .map(|i| open + i + 1)
            .unwrap_or(span.end.saturating_sub(1));
        let close = span.end.saturating_sub(1).max(brace);
        let outer = self.indent_of(owner);
        let inner = format!("{}{}", outer, self.indent);
        if self.text[brace..close].contains('\n') {
            Layout {
                start: brace,
                end: brace,
                prefix: format!("{}{}", self.eol, inner),
                suffix: String::new(),
            }
        } else {
            Layout {
                start: brace,
                end: close,
                prefix: format!("{}{}", self.eol, inner),
                suffix: format!("{}{}", self.eol, outer),
            }
        }
    }

    fn splice_layout(&mut self, layout: &Layout, code: &str) -> usize {
        let inserted = format!("{}{}{}", layout.prefix, code, layout.suffix);
        self.splice(layout.start, layout.end, &inserted);
        layout.start + layout.prefix.len()
    }

    fn apply_grafts(
        &mut self,
        root: SyntaxId,
        base: usize,
        grafts: &[Graft],
    ) -> Result<SyntaxId, DesignError> {
        let mut root = root;
        for graft in grafts {
            if self.tree.is_live(graft.node) {
                return Err(DesignError::invalid_target(format!(
                    "{} is still attached and cannot be re-emitted",
                    graft.node
                )));
            }
            let len = self.tree.span(graft.node).len();
            let span = (base + graft.offset)..(base + graft.offset + len);
            let site = self
                .tree
                .find_span(root, &span)
                .ok_or_else(|| DesignError::stale(graft.node))?;
            if !self.tree.graft(site, graft.node) {
                return Err(DesignError::stale(graft.node));
            }
            if site == root {
                root = graft.node;
            }
        }
        Ok(root)
    }

    /// Insert a statement at `target`
    pub fn insert_statement(
        &mut self,
        target: StatementTarget,
        code: &str,
        grafts: &[Graft],
    ) -> Result<SyntaxId, DesignError> {
        let parsed = parse_statement(code)?;
        let (block, index) = target
            .location(&self.tree)
            .ok_or_else(|| DesignError::invalid_target(format!("{} is not inside a block", target)))?;
        self.check_live(block)?;
        if let Some(anchor) = target.anchor() {
            self.check_live(anchor)?;
        }

        let layout = self.statement_layout(target, block);
        let base = self.splice_layout(&layout, code);
        let id = self.tree.lower_statement(&parsed, base, None);
        self.tree.attach_child(block, index, id);
        self.apply_grafts(id, base, grafts)
    }

    /// Replace a statement's text; the statement keeps its id
    pub fn replace_statement(
        &mut self,
        stmt: SyntaxId,
        code: &str,
        grafts: &[Graft],
    ) -> Result<SyntaxId, DesignError> {
        self.check_live(stmt)?;
        if !self.tree.kind(stmt).is_statement() {
            return Err(DesignError::invalid_target(format!("{} is not a statement", stmt)));
        }
        let parsed = parse_statement(code)?;
        let span = self.tree.span(stmt);
        for child in self.tree.children(stmt).to_vec() {
            self.tree.detach(child);
        }
        self.splice(span.start, span.end, code);
        let fresh = self.tree.lower_statement(&parsed, span.start, None);
        self.tree.transplant(stmt, fresh);
        self.apply_grafts(stmt, span.start, grafts)
    }

    /// Replace an expression; the replacement gets a fresh id
    pub fn replace_expression(
        &mut self,
        expr: SyntaxId,
        code: &str,
        grafts: &[Graft],
    ) -> Result<SyntaxId, DesignError> {
        self.check_live(expr)?;
        if !self.tree.kind(expr).is_expression() {
            return Err(DesignError::invalid_target(format!("{} is not an expression", expr)));
        }
        let parsed = parse_expression(code)?;
        let parent = self
            .tree
            .parent(expr)
            .ok_or_else(|| DesignError::stale(expr))?;
        let index = self.tree.index_in_parent(expr).unwrap_or(0);
        let span = self.tree.span(expr);

        self.tree.detach(expr);
        self.splice(span.start, span.end, code);
        let fresh = self.tree.lower_expression(&parsed, span.start, None);
        self.tree.attach_child(parent, index, fresh);
        self.apply_grafts(fresh, span.start, grafts)
    }

    /// Remove a statement together with the whitespace before it
    pub fn remove_statement(&mut self, stmt: SyntaxId) -> Result<(), DesignError> {
        self.check_live(stmt)?;
        let in_block = self
            .tree
            .parent(stmt)
            .map(|p| matches!(self.tree.kind(p), SyntaxKind::Block))
            .unwrap_or(false);
        if !in_block {
            return Err(DesignError::invalid_target(format!(
                "{} is not a block statement",
                stmt
            )));
        }
        let span = self.tree.span(stmt);
        let start = self.whitespace_start(span.start);
        self.tree.detach(stmt);
        self.splice(start, span.end, "");
        Ok(())
    }

    /// Move a statement to `target`, preserving its id and those of its subtree
    pub fn move_statement(
        &mut self,
        stmt: SyntaxId,
        target: StatementTarget,
    ) -> Result<SyntaxId, DesignError> {
        self.check_live(stmt)?;
        if target.anchor() == Some(stmt) {
            return Ok(stmt);
        }
        if let Some(block) = target.block(&self.tree) {
            if self.tree.is_within(block, stmt) {
                return Err(DesignError::invalid_target(format!(
                    "cannot move {} into itself",
                    stmt
                )));
            }
        }
        let code = self.source_of(stmt).to_string();
        self.remove_statement(stmt)?;
        self.insert_statement(target, &code, &[Graft::new(0, stmt)])
    }

    /// Rename an identifier or simple name in place
    pub fn replace_name(&mut self, id: SyntaxId, name: &str) -> Result<(), DesignError> {
        self.check_live(id)?;
        if !matches!(self.tree.kind(id), SyntaxKind::Ident(_) | SyntaxKind::Name(_)) {
            return Err(DesignError::invalid_target(format!("{} is not a name", id)));
        }
        let span = self.tree.span(id);
        self.splice(span.start, span.end, name);
        self.tree.rename_node(id, name);
        Ok(())
    }

    pub fn replace_invocation_name(&mut self, invocation: SyntaxId, name: &str) -> Result<(), DesignError> {
        let ident = self
            .tree
            .invocation(invocation)
            .map(|inv| inv.name_id)
            .ok_or_else(|| DesignError::invalid_target(format!("{} is not an invocation", invocation)))?;
        self.replace_name(ident, name)
    }

    /// Remove one argument of an invocation or constructor call, with its separator
    pub fn remove_invocation_argument(
        &mut self,
        invocation: SyntaxId,
        index: usize,
    ) -> Result<SyntaxId, DesignError> {
        self.check_live(invocation)?;
        let args = self.tree.arguments(invocation).to_vec();
        let arg = *args.get(index).ok_or_else(|| {
            DesignError::invalid_target(format!("{} has no argument {}", invocation, index))
        })?;
        let span = self.tree.span(arg);
        let (start, end) = if index > 0 {
            (self.tree.span(args[index - 1]).end, span.end)
        } else if let Some(next) = args.get(1) {
            (span.start, self.tree.span(*next).start)
        } else {
            (span.start, span.end)
        };
        self.tree.detach(arg);
        self.splice(start, end, "");
        Ok(arg)
    }

    fn parse_member_of_kind(&self, code: &str, field: bool) -> Result<crate::parser::Spanned<Member>, DesignError> {
        let parsed = parse_member(code)?;
        let matches = matches!((&parsed.node, field), (Member::Field(_), true) | (Member::Method(_), false));
        if matches {
            Ok(parsed)
        } else {
            Err(DesignError::invalid_target(format!("'{}' is not a {}", code, if field { "field" } else { "method" })))
        }
    }

    fn class_id(&self) -> Result<SyntaxId, DesignError> {
        self.tree
            .class()
            .ok_or_else(|| DesignError::invalid_target("source has no class"))
    }

    fn empty_class_layout(&self, class: SyntaxId) -> Layout {
        let open = self
            .tree
            .name_ident(class)
            .map(|n| self.tree.span(n).end)
            .unwrap_or(self.tree.span(class).start);
        self.empty_body_layout(class, open)
    }

    fn insert_member(
        &mut self,
        layout: Layout,
        index: usize,
        parsed: &crate::parser::Spanned<Member>,
        code: &str,
        grafts: &[Graft],
    ) -> Result<SyntaxId, DesignError> {
        let class = self.class_id()?;
        let base = self.splice_layout(&layout, code);
        let id = self.tree.lower_member(parsed, base, None);
        self.tree.attach_child(class, index, id);
        self.apply_grafts(id, base, grafts)
    }

    /// Add a field after the last field, or before the first member
    pub fn add_field(&mut self, code: &str, grafts: &[Graft]) -> Result<SyntaxId, DesignError> {
        let parsed = self.parse_member_of_kind(code, true)?;
        let class = self.class_id()?;
        let members = self.tree.members();
        let (layout, index) = if let Some(last) = self.tree.fields().last().copied() {
            (self.after_layout(last), self.tree.index_in_parent(last).map(|i| i + 1))
        } else if let Some(first) = members.first().copied() {
            let start = self.tree.span(first).start;
            let layout = Layout {
                start,
                end: start,
                prefix: String::new(),
                suffix: format!("{}{}{}", self.eol, self.eol, self.indent_of(first)),
            };
            self.field_separator = true;
            (layout, self.tree.index_in_parent(first))
        } else {
            (self.empty_class_layout(class), Some(self.tree.children(class).len()))
        };
        let index = index.unwrap_or(self.tree.children(class).len());
        self.insert_member(layout, index, &parsed, code, grafts)
    }

    /// Add a method after the last member, separated by a blank line
    pub fn add_method(&mut self, code: &str, grafts: &[Graft]) -> Result<SyntaxId, DesignError> {
        let parsed = self.parse_member_of_kind(code, false)?;
        let class = self.class_id()?;
        let (layout, index) = match self.tree.members().last().copied() {
            Some(last) => {
                let end = self.tree.span(last).end;
                let layout = Layout {
                    start: end,
                    end,
                    prefix: format!("{}{}{}", self.eol, self.eol, self.indent_of(last)),
                    suffix: String::new(),
                };
                (layout, self.tree.index_in_parent(last).map(|i| i + 1))
            }
            None => (self.empty_class_layout(class), None),
        };
        let index = index.unwrap_or(self.tree.children(class).len());
        self.insert_member(layout, index, &parsed, code, grafts)
    }

    /// Remove a field or method with the whitespace before it
    pub fn remove_member(&mut self, member: SyntaxId) -> Result<(), DesignError> {
        self.check_live(member)?;
        if !self.tree.kind(member).is_member() {
            return Err(DesignError::invalid_target(format!("{} is not a member", member)));
        }
        let span = self.tree.span(member);
        let start = self.whitespace_start(span.start);
        let is_field = matches!(self.tree.kind(member), SyntaxKind::Field { .. });
        self.tree.detach(member);
        let mut end = span.end;
        if is_field && self.field_separator && self.tree.fields().is_empty() {
            let separator = format!("{}{}", self.eol, self.eol);
            if self.text[end..].starts_with(&separator) {
                end += self.eol.len();
            }
            self.field_separator = false;
        }
        self.splice(start, end, "");
        Ok(())
    }

    /// Drop ` = value` from a field or local declaration; returns the detached value
    pub fn remove_initializer(&mut self, declaration: SyntaxId) -> Result<SyntaxId, DesignError> {
        self.check_live(declaration)?;
        let (name, init) = match (self.tree.name_ident(declaration), self.tree.initializer(declaration)) {
            (Some(name), Some(init)) => (name, init),
            _ => {
                return Err(DesignError::invalid_target(format!(
                    "{} has no initializer",
                    declaration
                )))
            }
        };
        let start = self.tree.span(name).end;
        let end = self.tree.span(init).end;
        self.tree.detach(init);
        self.splice(start, end, "");
        Ok(init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}\n";

    fn open(source: &str) -> SourceEditor {
        SourceEditor::new(source, &GenerationConfig::default()).expect("Should parse")
    }

    fn body(editor: &SourceEditor) -> SyntaxId {
        let tree = editor.tree();
        tree.method_body(tree.methods()[0]).expect("body")
    }

    fn statement(editor: &SourceEditor, index: usize) -> SyntaxId {
        editor.tree().children(body(editor))[index]
    }

    /// Every live node's span must still match its own text
    fn assert_consistent(editor: &SourceEditor) {
        let reparsed = open(editor.text());
        assert_eq!(reparsed.text(), editor.text());
        let tree = editor.tree();
        for id in tree.descendants(tree.root()) {
            if let SyntaxKind::Name(name) | SyntaxKind::Ident(name) = tree.kind(id) {
                assert_eq!(editor.source_of(id), name);
            }
        }
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut editor = open(SOURCE);
        let first = statement(&editor, 0);
        editor
            .insert_statement(StatementTarget::Before(first), "foo();", &[])
            .expect("insert");
        let last = statement(&editor, 2);
        editor
            .insert_statement(StatementTarget::After(last), "bar();", &[])
            .expect("insert");
        assert_eq!(
            editor.text(),
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tfoo();\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t\tbar();\n\t}\n}\n"
        );
        assert_eq!(editor.tree().children(body(&editor)).len(), 4);
        assert_consistent(&editor);
    }

    #[test]
    fn test_insert_into_empty_body() {
        let mut editor = open("class A {\n\tA() {}\n}");
        let body = body(&editor);
        editor
            .insert_statement(StatementTarget::BlockStart(body), "foo();", &[])
            .expect("insert");
        assert_eq!(editor.text(), "class A {\n\tA() {\n\t\tfoo();\n\t}\n}");
        assert_consistent(&editor);
    }

    #[test]
    fn test_insert_then_remove_is_identity() {
        let mut editor = open(SOURCE);
        let first = statement(&editor, 0);
        let id = editor
            .insert_statement(StatementTarget::After(first), "add(new JLabel());", &[])
            .expect("insert");
        editor.remove_statement(id).expect("remove");
        assert_eq!(editor.text(), SOURCE);
        assert_consistent(&editor);
    }

    #[test]
    fn test_move_statement_keeps_ids() {
        let mut editor = open(SOURCE);
        let first = statement(&editor, 0);
        let second = statement(&editor, 1);
        let call = editor.tree().children(second)[0];
        let moved = editor
            .move_statement(second, StatementTarget::Before(first))
            .expect("move");
        assert_eq!(moved, second);
        assert_eq!(statement(&editor, 0), second);
        assert_eq!(editor.source_of(call), "add(button)");
        assert_eq!(
            editor.text(),
            "class Panel extends JPanel {\n\tpublic Panel() {\n\t\tadd(button);\n\t\tJButton button = new JButton();\n\t}\n}\n"
        );
    }

    #[test]
    fn test_replace_expression_with_graft() {
        let mut editor = open("class A {\n\tA() {\n\t\tadd(new JButton());\n\t}\n}");
        let stmt = statement(&editor, 0);
        let call = editor.tree().children(stmt)[0];
        let creation = editor.tree().arguments(call)[0];
        editor
            .replace_expression(creation, "button", &[])
            .expect("replace");
        let decl = editor
            .insert_statement(
                StatementTarget::Before(stmt),
                "JButton button = new JButton();",
                &[Graft::new(17, creation)],
            )
            .expect("insert");
        assert_eq!(editor.tree().initializer(decl), Some(creation));
        assert_eq!(editor.source_of(creation), "new JButton()");
        assert_eq!(
            editor.text(),
            "class A {\n\tA() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}"
        );
        assert_consistent(&editor);
    }

    #[test]
    fn test_replace_statement_keeps_id() {
        let mut editor = open(SOURCE);
        let decl = statement(&editor, 0);
        let init = editor.tree().initializer(decl).expect("init");
        let same = editor
            .replace_statement(decl, "button = new JButton();", &[Graft::new(9, init)])
            .expect("replace");
        assert_eq!(same, decl);
        assert!(matches!(editor.tree().kind(decl), SyntaxKind::Assign));
        assert_eq!(editor.tree().children(decl)[1], init);
        assert_consistent(&editor);
    }

    #[test]
    fn test_fields_and_methods() {
        let mut editor = open(SOURCE);
        let field = editor.add_field("private JButton button;", &[]).expect("field");
        assert_eq!(
            editor.text(),
            "class Panel extends JPanel {\n\tprivate JButton button;\n\n\tpublic Panel() {\n\t\tJButton button = new JButton();\n\t\tadd(button);\n\t}\n}\n"
        );
        editor
            .add_method("private void init() {\n\t}", &[])
            .expect("method");
        assert!(editor.text().ends_with("\t}\n\n\tprivate void init() {\n\t}\n}\n"));
        editor.remove_member(field).expect("remove");
        assert!(editor.text().starts_with("class Panel extends JPanel {\n\tpublic Panel()"));
        assert_consistent(&editor);
    }

    #[test]
    fn test_add_then_remove_fields_is_identity() {
        let mut editor = open(SOURCE);
        let first = editor.add_field("private JButton button;", &[]).expect("field");
        let second = editor.add_field("private JLabel label;", &[]).expect("field");
        editor.remove_member(first).expect("remove");
        assert!(editor.text().starts_with("class Panel extends JPanel {\n\tprivate JLabel label;\n\n\tpublic"));
        editor.remove_member(second).expect("remove");
        assert_eq!(editor.text(), SOURCE);
        assert_consistent(&editor);
    }

    #[test]
    fn test_remove_original_field_keeps_blank_line() {
        let source = "class Panel extends JPanel {\n\tprivate JButton button;\n\n\tpublic Panel() {\n\t}\n}\n";
        let mut editor = open(source);
        let field = editor.tree().fields()[0];
        editor.remove_member(field).expect("remove");
        assert_eq!(editor.text(), "class Panel extends JPanel {\n\n\tpublic Panel() {\n\t}\n}\n");
    }

    #[test]
    fn test_remove_initializer() {
        let mut editor = open(SOURCE);
        let decl = statement(&editor, 0);
        let init = editor.remove_initializer(decl).expect("remove");
        assert!(!editor.tree().is_live(init));
        assert!(editor.text().contains("\t\tJButton button;\n"));
        assert_consistent(&editor);
    }

    #[test]
    fn test_remove_invocation_argument() {
        let mut editor = open("class A {\n\tA() {\n\t\tadd(a, b, c);\n\t}\n}");
        let call = editor.tree().children(statement(&editor, 0))[0];
        editor.remove_invocation_argument(call, 1).expect("remove");
        assert!(editor.text().contains("add(a, c);"));
        editor.remove_invocation_argument(call, 0).expect("remove");
        assert!(editor.text().contains("add(c);"));
        assert_consistent(&editor);
    }

    #[test]
    fn test_replace_name() {
        let mut editor = open(SOURCE);
        let decl = statement(&editor, 0);
        let ident = editor.tree().name_ident(decl).expect("ident");
        editor.replace_name(ident, "okButton").expect("rename");
        assert_eq!(editor.tree().name_of(decl), Some("okButton"));
        assert!(editor.text().contains("JButton okButton = new JButton();"));
    }

    #[test]
    fn test_stale_ids_are_rejected() {
        let mut editor = open(SOURCE);
        let first = statement(&editor, 0);
        editor.remove_statement(first).expect("remove");
        assert!(editor.remove_statement(first).is_err());
    }
}
