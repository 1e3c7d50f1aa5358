//! Python syntax-tree tools: raises_analysis, call_graph, file_imports
//!
//! Source files are parsed with tree-sitter. A file that does not parse
//! cleanly is reported as an error rather than analysed partially.

use super::resolve_path;
use codequorum_domain::ObservationError;
use codequorum_domain::observation::kind::{FileTarget, FunctionTarget};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use tree_sitter::{Node, Parser, Tree};

/// Maximum number of distinct calls reported by raises_analysis
const MAX_RAISES_CALLS: usize = 20;

/// Exception names that make a handler catch everything
const CATCH_ALL: [&str; 3] = ["*", "Exception", "BaseException"];

thread_local! {
    static PYTHON_PARSER: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        // A language version mismatch surfaces as a failed parse below
        let _ = p.set_language(&tree_sitter_python::LANGUAGE.into());
        p
    });
}

fn parse(source: &str, path: &str) -> Result<Tree, ObservationError> {
    let tree = PYTHON_PARSER
        .with(|p| p.borrow_mut().parse(source, None))
        .ok_or_else(|| ObservationError::parse(path, "parser unavailable"))?;

    if tree.root_node().has_error() {
        return Err(ObservationError::parse(path, "invalid Python syntax"));
    }
    Ok(tree)
}

async fn read_source(file_path: &str, repo_path: &str) -> Result<String, ObservationError> {
    let full_path = resolve_path(repo_path, file_path);
    tokio::fs::read_to_string(&full_path)
        .await
        .map_err(|e| ObservationError::io(full_path.display().to_string(), e))
}

fn text<'a>(node: &Node, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Breadth-first walk over the named nodes below (and including) `root`
fn walk<'t>(root: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    let mut queue = VecDeque::from([root]);
    std::iter::from_fn(move || {
        let node = queue.pop_front()?;
        queue.extend(named_children(&node));
        Some(node)
    })
}

fn function_definitions<'t, 'a>(
    root: Node<'t>,
    source: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'t>> + 'a
where
    't: 'a,
{
    walk(root).filter(move |node| {
        node.kind() == "function_definition"
            && node
                .child_by_field_name("name")
                .is_some_and(|n| text(&n, source) == name)
    })
}

/// Name of the function a call invokes, ignoring the receiver
fn callee_name<'a>(call: &Node, source: &'a str) -> Option<&'a str> {
    let function = call.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(text(&function, source)),
        "attribute" => function
            .child_by_field_name("attribute")
            .map(|attr| text(&attr, source)),
        _ => None,
    }
}

/// Name of the exception a `raise` expression names
fn raised_name<'a>(raise: &Node, source: &'a str) -> Option<&'a str> {
    let expr = raise.named_child(0)?;
    match expr.kind() {
        "call" => callee_name(&expr, source),
        "identifier" => Some(text(&expr, source)),
        _ => None,
    }
}

/// Exception names caught by one except clause; `*` for a bare `except:`
fn caught_by(clause: &Node, source: &str, caught: &mut HashSet<String>) {
    let Some(mut target) = named_children(clause)
        .into_iter()
        .find(|n| n.kind() != "block" && n.kind() != "comment")
    else {
        caught.insert("*".to_string());
        return;
    };

    if target.kind() == "as_pattern"
        && let Some(inner) = target.named_child(0)
    {
        target = inner;
    }
    if target.kind() == "parenthesized_expression"
        && let Some(inner) = target.named_child(0)
    {
        target = inner;
    }

    match target.kind() {
        "identifier" => {
            caught.insert(text(&target, source).to_string());
        }
        "tuple" => {
            for element in named_children(&target) {
                if element.kind() == "identifier" {
                    caught.insert(text(&element, source).to_string());
                }
            }
        }
        _ => {}
    }
}

fn is_except_clause(node: &Node) -> bool {
    matches!(node.kind(), "except_clause" | "except_group_clause")
}

/// Collects raises not caught by an enclosing try block, and every call
#[derive(Default)]
struct RaisesVisitor {
    raises: Vec<String>,
    calls: Vec<String>,
    caught_stack: Vec<HashSet<String>>,
}

impl RaisesVisitor {
    fn is_caught(&self, name: &str) -> bool {
        self.caught_stack.iter().any(|caught| {
            caught.contains(name) || CATCH_ALL.iter().any(|all| caught.contains(*all))
        })
    }

    fn visit_children(&mut self, node: &Node, source: &str) {
        for child in named_children(node) {
            self.visit(&child, source);
        }
    }

    fn visit(&mut self, node: &Node, source: &str) {
        match node.kind() {
            "try_statement" => self.visit_try(node, source),
            "raise_statement" => {
                if let Some(name) = raised_name(node, source)
                    && !self.is_caught(name)
                {
                    self.raises.push(name.to_string());
                }
                self.visit_children(node, source);
            }
            "call" => {
                if let Some(name) = callee_name(node, source) {
                    self.calls.push(name.to_string());
                }
                self.visit_children(node, source);
            }
            _ => self.visit_children(node, source),
        }
    }

    fn visit_try(&mut self, node: &Node, source: &str) {
        let children = named_children(node);
        let handlers: Vec<&Node> = children.iter().filter(|n| is_except_clause(n)).collect();

        let mut caught = HashSet::new();
        for handler in &handlers {
            caught_by(handler, source, &mut caught);
        }

        self.caught_stack.push(caught);
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(&body, source);
        }
        self.caught_stack.pop();

        // else and finally run outside the handlers' protection
        for child in &children {
            if matches!(child.kind(), "else_clause" | "finally_clause") {
                self.visit(child, source);
            }
        }
        for handler in handlers {
            for block in named_children(handler)
                .into_iter()
                .filter(|n| n.kind() == "block")
            {
                self.visit(&block, source);
            }
        }
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn analyze_raises(source: &str, target: &FunctionTarget) -> Result<Value, ObservationError> {
    let tree = parse(source, &target.file_path)?;
    let Some(function) =
        function_definitions(tree.root_node(), source, &target.function_name).next()
    else {
        return Ok(json!({
            "function": target.function_name,
            "file": target.file_path,
            "explicit_raises": [],
            "calls": [],
            "error": ObservationError::FunctionNotFound(target.function_name.clone()).to_string(),
        }));
    };

    let mut visitor = RaisesVisitor::default();
    visitor.visit(&function, source);

    let mut calls = dedup(visitor.calls);
    calls.truncate(MAX_RAISES_CALLS);

    Ok(json!({
        "function": target.function_name,
        "file": target.file_path,
        "explicit_raises": dedup(visitor.raises),
        "calls": calls,
    }))
}

/// Static analysis of the exceptions a function raises itself.
///
/// Raises caught by an enclosing `try` of the same function are dropped.
pub async fn raises_analysis(target: &FunctionTarget) -> Result<Value, ObservationError> {
    let source = read_source(&target.file_path, &target.repo_path).await?;
    analyze_raises(&source, target)
}

/// Qualified callee name: `obj.method` when the receiver is a plain name
fn qualified_callee(call: &Node, source: &str) -> Option<String> {
    let function = call.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(text(&function, source).to_string()),
        "attribute" => {
            let attr = function.child_by_field_name("attribute")?;
            match function.child_by_field_name("object") {
                Some(object) if object.kind() == "identifier" => Some(format!(
                    "{}.{}",
                    text(&object, source),
                    text(&attr, source)
                )),
                _ => Some(text(&attr, source).to_string()),
            }
        }
        _ => None,
    }
}

fn analyze_calls(source: &str, target: &FunctionTarget) -> Result<Value, ObservationError> {
    let tree = parse(source, &target.file_path)?;

    let mut seen = HashSet::new();
    let mut calls = Vec::new();
    for function in function_definitions(tree.root_node(), source, &target.function_name) {
        for call in walk(function).filter(|n| n.kind() == "call") {
            if let Some(name) = qualified_callee(&call, source)
                && seen.insert(name.clone())
            {
                calls.push(json!({"name": name, "line": call.start_position().row + 1}));
            }
        }
    }

    Ok(json!({
        "function": target.function_name,
        "file": target.file_path,
        "calls": calls,
    }))
}

/// Functions called by every definition with the given name, first
/// occurrence of each callee only.
pub async fn call_graph(target: &FunctionTarget) -> Result<Value, ObservationError> {
    let source = read_source(&target.file_path, &target.repo_path).await?;
    analyze_calls(&source, target)
}

/// Name bound by an import entry (`a.b`, or `a.b` in `a.b as c`)
fn imported_name(node: &Node, source: &str) -> String {
    match node.kind() {
        "aliased_import" => node
            .child_by_field_name("name")
            .map(|n| text(&n, source).to_string())
            .unwrap_or_default(),
        _ => text(node, source).to_string(),
    }
}

fn field_names(node: &Node, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    node.children_by_field_name("name", &mut cursor)
        .map(|n| imported_name(&n, source))
        .collect()
}

/// Leading lines of the file made of imports, comments, blank lines,
/// dunder assignments and docstrings.
pub(crate) fn import_section(source: &str) -> String {
    let mut section = Vec::new();
    let mut in_docstring = false;

    for line in source.split('\n') {
        let stripped = line.trim();
        let quotes = stripped.matches("\"\"\"").count() + stripped.matches("'''").count();
        if quotes > 0 {
            // A one-line docstring opens and closes on the same line
            if quotes % 2 == 1 {
                in_docstring = !in_docstring;
            }
            section.push(line);
            continue;
        }
        if in_docstring
            || stripped.is_empty()
            || stripped.starts_with("import ")
            || stripped.starts_with("from ")
            || stripped.starts_with('#')
            || stripped.starts_with("__")
        {
            section.push(line);
            continue;
        }
        break;
    }

    section.join("\n")
}

fn analyze_imports(source: &str, target: &FileTarget) -> Result<Value, ObservationError> {
    let tree = parse(source, &target.file_path)?;

    let mut imports = Vec::new();
    let mut from_imports = Vec::new();

    for node in named_children(&tree.root_node()) {
        match node.kind() {
            "import_statement" => imports.extend(field_names(&node, source)),
            "import_from_statement" => {
                let module = node
                    .child_by_field_name("module_name")
                    .map(|m| text(&m, source).trim_start_matches('.').to_string())
                    .unwrap_or_default();
                let mut names = field_names(&node, source);
                if names.is_empty()
                    && named_children(&node)
                        .iter()
                        .any(|n| n.kind() == "wildcard_import")
                {
                    names.push("*".to_string());
                }
                from_imports.push(json!({"module": module, "names": names}));
            }
            "future_import_statement" => {
                from_imports.push(json!({
                    "module": "__future__",
                    "names": field_names(&node, source),
                }));
            }
            _ => {}
        }
    }

    Ok(json!({
        "file": target.file_path,
        "imports": imports,
        "from_imports": from_imports,
        "import_section": import_section(source),
    }))
}

/// Module-level imports of a Python file
pub async fn file_imports(target: &FileTarget) -> Result<Value, ObservationError> {
    let source = read_source(&target.file_path, &target.repo_path).await?;
    analyze_imports(&source, target)
}
