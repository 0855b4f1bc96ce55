//! Name allocation: unique, non-shadowing identifiers and text-derived names

use std::collections::BTreeSet;

use crate::config::NamingConfig;

/// Reserved words that can never be used as identifiers
const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "void", "volatile", "while",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Names a new declaration must avoid
///
/// `visible` holds identifiers already bound wherever the declaration would be
/// in scope; `shadowed` holds identifiers declared in nested or later scopes
/// that the declaration would hide or collide with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameScope {
    visible: BTreeSet<String>,
    shadowed: BTreeSet<String>,
}

impl NameScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visible<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_shadowed<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shadowed.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn add_visible(&mut self, name: impl Into<String>) {
        self.visible.insert(name.into());
    }

    pub fn add_shadowed(&mut self, name: impl Into<String>) {
        self.shadowed.insert(name.into());
    }

    /// Forget a name, e.g. the current name of the declaration being renamed
    pub fn release(&mut self, name: &str) {
        self.visible.remove(name);
        self.shadowed.remove(name);
    }

    pub fn visible(&self) -> &BTreeSet<String> {
        &self.visible
    }

    pub fn shadowed(&self) -> &BTreeSet<String> {
        &self.shadowed
    }

    pub fn is_free(&self, name: &str) -> bool {
        !is_keyword(name) && !self.visible.contains(name) && !self.shadowed.contains(name)
    }

    pub fn merge(mut self, other: &NameScope) -> Self {
        self.visible.extend(other.visible.iter().cloned());
        self.shadowed.extend(other.shadowed.iter().cloned());
        self
    }
}

/// Reduce arbitrary text to a Java identifier, or `None` if nothing usable remains
pub fn sanitize(text: &str) -> Option<String> {
    let mut name: String = text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if name.is_empty() {
        return None;
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    Some(name)
}

/// `base` if free in `scope`, otherwise `base_1`, `base_2`, ...
pub fn allocate(base: &str, scope: &NameScope) -> String {
    let base = sanitize(base).unwrap_or_else(|| "variable".to_string());
    if scope.is_free(&base) {
        return base;
    }
    let mut index = 1;
    loop {
        let candidate = format!("{}_{}", base, index);
        if scope.is_free(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

/// Simple class name of a possibly qualified name
pub fn short_class(class: &str) -> &str {
    class.rsplit('.').next().unwrap_or(class)
}

/// Drop leading capitals, keeping the last one of the run: `JButton` -> `Button`
fn strip_leading_capitals(name: &str) -> &str {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut index = 0;
    while index + 1 < chars.len() && chars[index + 1].1.is_uppercase() {
        index += 1;
    }
    chars.get(index).map(|(i, _)| &name[*i..]).unwrap_or(name)
}

pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Type-derived default variable name
///
/// `JButton` -> `button`, `URL` -> `url`, `foo` -> `foo_`
pub fn default_name(class: &str) -> String {
    let name = short_class(class);
    if name.is_empty() {
        return "variable".to_string();
    }
    if name.chars().all(|c| c.is_uppercase()) {
        return name.to_lowercase();
    }
    if name.starts_with(|c: char| c.is_lowercase()) {
        return format!("{}_", name);
    }
    uncapitalize(strip_leading_capitals(name))
}

/// Type-derived acronym: `JButton` -> `btn`, `StyledText` -> `stldtxt`
pub fn acronym(class: &str) -> String {
    let name = short_class(class);
    let lowered = strip_leading_capitals(name).to_lowercase();
    let mut acronym = String::new();
    for c in lowered.chars().filter(|c| !"aeiouy".contains(*c)) {
        if !acronym.ends_with(c) {
            acronym.push(c);
        }
    }
    if acronym.is_empty() {
        name.to_string()
    } else {
        acronym
    }
}

/// True if `name` is the default name of `class`, ignoring a numeric suffix
pub fn is_default_name(name: &str, default: &str) -> bool {
    let base = name.split('_').next().unwrap_or(name);
    base.eq_ignore_ascii_case(default)
}

/// Inputs for text-derived naming of one component
#[derive(Debug, Clone)]
pub struct TextNaming<'a> {
    pub class: &'a str,
    pub default_name: &'a str,
    pub acronym: &'a str,
}

/// Derive a variable name from a text property using the configured template
///
/// Returns `None` when the text has no usable characters; callers then keep
/// the type-derived default.
pub fn name_for_text(text: &str, naming: &TextNaming<'_>, config: &NamingConfig) -> Option<String> {
    let words: Vec<String> = strip_markup(text)
        .split_whitespace()
        .map(|w| capitalize(&w.to_lowercase()))
        .collect();
    let limit = if config.words_limit == 0 {
        words.len()
    } else {
        config.words_limit
    };
    let text_part: String = words
        .iter()
        .take(limit)
        .flat_map(|w| w.chars())
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if text_part.is_empty() {
        return None;
    }

    let class_name = strip_leading_capitals(short_class(naming.class));
    let name = config
        .text_template
        .replace("${class_name}", class_name)
        .replace("${text}", &text_part)
        .replace("${default_name}", naming.default_name)
        .replace("${class_acronym}", naming.acronym);
    sanitize(&uncapitalize(&name))
}

fn strip_markup(text: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_free_name() {
        let scope = NameScope::new().with_visible(["label"]);
        assert_eq!(allocate("button", &scope), "button");
    }

    #[test]
    fn test_allocate_suffixes() {
        let scope = NameScope::new()
            .with_visible(["panel"])
            .with_shadowed(["panel_1"]);
        assert_eq!(allocate("panel", &scope), "panel_2");
    }

    #[test]
    fn test_allocate_avoids_keywords() {
        assert_eq!(allocate("class", &NameScope::new()), "class_1");
    }

    #[test]
    fn test_default_names() {
        assert_eq!(default_name("javax.swing.JButton"), "button");
        assert_eq!(default_name("URLField"), "field");
        assert_eq!(default_name("URL"), "url");
        assert_eq!(default_name("foo"), "foo_");
        assert_eq!(default_name("Composite"), "composite");
    }

    #[test]
    fn test_acronyms() {
        assert_eq!(acronym("javax.swing.JButton"), "btn");
        assert_eq!(acronym("org.eclipse.swt.custom.StyledText"), "stldtxt");
        assert_eq!(acronym("Button"), "btn");
    }

    #[test]
    fn test_name_for_text() {
        let naming = TextNaming {
            class: "JButton",
            default_name: "button",
            acronym: "btn",
        };
        let config = NamingConfig::default();
        assert_eq!(
            name_for_text("New button", &naming, &config),
            Some("btnNewButton".to_string())
        );
        assert_eq!(
            name_for_text("<html>Save all open files now</html>", &naming, &config),
            Some("btnSaveAllOpen".to_string())
        );
        assert_eq!(name_for_text("!!!", &naming, &config), None);
    }

    #[test]
    fn test_is_default_name() {
        assert!(is_default_name("button_2", "button"));
        assert!(!is_default_name("okButton", "button"));
    }
}
