//! TypeScript/JavaScript extractor
//!
//! Parses TS/TSX/JS/JSX in-process with tree-sitter and walks the tree for
//! ES module imports, `require(...)` calls, and export declarations. Class
//! methods of exported classes are emitted as qualified `Owner.member`
//! exports so the symbol graph can synthesize membership edges later.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use tree_sitter::{Node, Parser};

use super::LanguageExtractor;
use crate::record::{ExportFact, ExportKind, ImportFact, Language, Location, ModuleRecord, ParseMetrics};
use crate::resolve::ResolveContext;
use crate::resolve::typescript as ts_resolve;
use crate::{Error, Result};

pub struct TypeScriptExtractor;

impl TypeScriptExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypeScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for TypeScriptExtractor {
    fn name(&self) -> &str {
        "TypeScript"
    }

    fn extensions(&self) -> &[&str] {
        &["ts", "tsx", "js", "jsx"]
    }

    fn extract(&self, path: &Path, content: &str, ctx: &ResolveContext) -> Result<ModuleRecord> {
        let started = Instant::now();

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let grammar: tree_sitter::Language = match ext {
            "ts" => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            "tsx" => tree_sitter_typescript::LANGUAGE_TSX.into(),
            _ => tree_sitter_javascript::LANGUAGE.into(),
        };
        let lang = Language::from_path(path)
            .ok_or_else(|| Error::Extract(format!("unsupported extension on {}", path.display())))?;

        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| Error::Extract(format!("grammar init failed: {e}")))?;
        let tree = parser
            .parse(content, None)
            .ok_or_else(|| Error::Extract(format!("tree-sitter produced no tree for {}", path.display())))?;

        let source = content.as_bytes();
        let root = tree.root_node();

        let declared = collect_declarations(root, source);

        let mut imports = Vec::new();
        let mut exports = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" => {
                    if let Some(fact) = extract_import(&child, source, path, ctx) {
                        imports.push(fact);
                    }
                }
                "export_statement" => {
                    extract_export(&child, source, &declared, &mut exports);
                }
                _ => {}
            }
        }

        collect_requires(root, source, path, ctx, &mut imports);

        Ok(ModuleRecord {
            file: path.to_path_buf(),
            lang,
            imports,
            exports,
            meta: ParseMetrics {
                parse_ms: started.elapsed().as_millis() as u64,
                loc: content.lines().count() as u32,
                cache_hit: false,
            },
        })
    }
}

/// A top-level declaration seen anywhere in the file, exported or not.
/// Looked up when an `export { name }` clause binds it after the fact.
struct Declared {
    kind: ExportKind,
    loc: Location,
    /// `(member name, location)` pairs, classes only.
    methods: Vec<(String, Location)>,
}

fn collect_declarations(root: Node, source: &[u8]) -> HashMap<String, Declared> {
    let mut declared = HashMap::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        let node = if child.kind() == "export_statement" {
            match child.child_by_field_name("declaration") {
                Some(decl) => decl,
                None => continue,
            }
        } else {
            child
        };
        record_declaration(node, source, &mut declared);
    }
    declared
}

fn record_declaration(node: Node, source: &[u8], declared: &mut HashMap<String, Declared>) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some((name, loc)) = named_field(node, source) {
                declared.insert(name, Declared { kind: ExportKind::Function, loc, methods: Vec::new() });
            }
        }
        "class_declaration" | "abstract_class_declaration" => {
            if let Some((name, loc)) = named_field(node, source) {
                let methods = class_methods(node, source);
                declared.insert(name, Declared { kind: ExportKind::Class, loc, methods });
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(name_node) = declarator.child_by_field_name("name") {
                    if name_node.kind() == "identifier" {
                        if let Ok(name) = name_node.utf8_text(source) {
                            declared.insert(
                                name.to_string(),
                                Declared { kind: ExportKind::Var, loc: position(name_node), methods: Vec::new() },
                            );
                        }
                    }
                }
            }
        }
        // TS-only type declarations; the original protocol types them as vars
        "interface_declaration" | "type_alias_declaration" | "enum_declaration" => {
            if let Some((name, loc)) = named_field(node, source) {
                declared.insert(name, Declared { kind: ExportKind::Var, loc, methods: Vec::new() });
            }
        }
        _ => {}
    }
}

fn class_methods(class: Node, source: &[u8]) -> Vec<(String, Location)> {
    let mut methods = Vec::new();
    let Some(body) = class.child_by_field_name("body") else {
        return methods;
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        if member.kind() != "method_definition" {
            continue;
        }
        let Some(name_node) = member.child_by_field_name("name") else {
            continue;
        };
        let Ok(name) = name_node.utf8_text(source) else {
            continue;
        };
        if name == "constructor" {
            continue;
        }
        methods.push((name.to_string(), position(name_node)));
    }
    methods
}

fn extract_import(node: &Node, source: &[u8], path: &Path, ctx: &ResolveContext) -> Option<ImportFact> {
    let source_node = node.child_by_field_name("source")?;
    let specifier = string_text(source_node, source)?;

    let mut named = Vec::new();
    let mut has_default = false;
    let mut has_namespace = false;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "import_clause" {
            continue;
        }
        let mut clause_cursor = child.walk();
        for binding in child.named_children(&mut clause_cursor) {
            match binding.kind() {
                "identifier" => has_default = true,
                "namespace_import" => has_namespace = true,
                "named_imports" => {
                    let mut spec_cursor = binding.walk();
                    for spec in binding.named_children(&mut spec_cursor) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        if let Some(name_node) = spec.child_by_field_name("name") {
                            if let Ok(name) = name_node.utf8_text(source) {
                                named.push(name.to_string());
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    let specifiers = if !named.is_empty() {
        named
    } else if has_default {
        vec!["default".to_string()]
    } else if has_namespace {
        vec!["*".to_string()]
    } else {
        Vec::new()
    };

    let resolved = ts_resolve::resolve(path, &specifier, ctx);
    Some(ImportFact { source: specifier, specifiers, resolved })
}

fn extract_export(
    node: &Node,
    source: &[u8],
    declared: &HashMap<String, Declared>,
    exports: &mut Vec<ExportFact>,
) {
    // re-exports bind no local name and carry no location
    if let Some(source_node) = node.child_by_field_name("source") {
        let mut any = false;
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "export_clause" => {
                    let mut spec_cursor = child.walk();
                    for spec in child.named_children(&mut spec_cursor) {
                        if spec.kind() != "export_specifier" {
                            continue;
                        }
                        if let Some(name) = spec
                            .child_by_field_name("name")
                            .and_then(|n| n.utf8_text(source).ok())
                        {
                            exports.push(ExportFact {
                                name: name.to_string(),
                                kind: ExportKind::Reexport,
                                loc: None,
                            });
                            any = true;
                        }
                    }
                }
                "namespace_export" => {
                    // export * as ns from "mod"
                    let mut ns_cursor = child.walk();
                    for id in child.named_children(&mut ns_cursor) {
                        if let Ok(name) = id.utf8_text(source) {
                            exports.push(ExportFact {
                                name: name.to_string(),
                                kind: ExportKind::Reexport,
                                loc: None,
                            });
                            any = true;
                        }
                    }
                }
                _ => {}
            }
        }
        if !any {
            // export * from "mod" - the module specifier is the only name
            if let Some(specifier) = string_text(source_node, source) {
                exports.push(ExportFact { name: specifier, kind: ExportKind::Reexport, loc: None });
            }
        }
        return;
    }

    let is_default = has_default_keyword(node);
    let declaration = node.child_by_field_name("declaration");

    if is_default {
        let kind = match declaration.map(|d| d.kind()) {
            Some("function_declaration") | Some("generator_function_declaration") => ExportKind::Function,
            Some("class_declaration") | Some("abstract_class_declaration") => ExportKind::Class,
            _ => ExportKind::Default,
        };
        let loc = declaration
            .and_then(|d| named_field(d, source))
            .map(|(_, loc)| loc)
            .or_else(|| node.child_by_field_name("value").map(position));
        exports.push(ExportFact { name: "default".to_string(), kind, loc });
        return;
    }

    if let Some(decl) = declaration {
        export_declaration(decl, source, exports);
        return;
    }

    // export { a, b as c } - resolve kinds through the declarations pass
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "export_clause" {
            continue;
        }
        let mut spec_cursor = child.walk();
        for spec in child.named_children(&mut spec_cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(local) = spec
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source).ok())
            else {
                continue;
            };
            let exported = spec
                .child_by_field_name("alias")
                .and_then(|n| n.utf8_text(source).ok())
                .unwrap_or(local);
            match declared.get(local) {
                Some(decl) => {
                    exports.push(ExportFact {
                        name: exported.to_string(),
                        kind: decl.kind,
                        loc: Some(decl.loc),
                    });
                    if decl.kind == ExportKind::Class {
                        push_methods(exported, &decl.methods, exports);
                    }
                }
                None => exports.push(ExportFact {
                    name: exported.to_string(),
                    kind: ExportKind::Var,
                    loc: None,
                }),
            }
        }
    }
}

fn export_declaration(decl: Node, source: &[u8], exports: &mut Vec<ExportFact>) {
    match decl.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some((name, loc)) = named_field(decl, source) {
                exports.push(ExportFact { name, kind: ExportKind::Function, loc: Some(loc) });
            }
        }
        "class_declaration" | "abstract_class_declaration" => {
            if let Some((name, loc)) = named_field(decl, source) {
                let methods = class_methods(decl, source);
                exports.push(ExportFact { name: name.clone(), kind: ExportKind::Class, loc: Some(loc) });
                push_methods(&name, &methods, exports);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = decl.walk();
            for declarator in decl.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(name_node) = declarator.child_by_field_name("name") {
                    if name_node.kind() == "identifier" {
                        if let Ok(name) = name_node.utf8_text(source) {
                            exports.push(ExportFact {
                                name: name.to_string(),
                                kind: ExportKind::Var,
                                loc: Some(position(name_node)),
                            });
                        }
                    }
                }
            }
        }
        "interface_declaration" | "type_alias_declaration" | "enum_declaration" => {
            if let Some((name, loc)) = named_field(decl, source) {
                exports.push(ExportFact { name, kind: ExportKind::Var, loc: Some(loc) });
            }
        }
        _ => {}
    }
}

fn push_methods(owner: &str, methods: &[(String, Location)], exports: &mut Vec<ExportFact>) {
    for (method, loc) in methods {
        exports.push(ExportFact {
            name: format!("{owner}.{method}"),
            kind: ExportKind::Function,
            loc: Some(*loc),
        });
    }
}

/// Walk the whole tree in document order for `require("...")` calls;
/// they count as imports with no binding names.
fn collect_requires(
    node: Node,
    source: &[u8],
    path: &Path,
    ctx: &ResolveContext,
    imports: &mut Vec<ImportFact>,
) {
    if node.kind() == "call_expression" {
        if let Some(fact) = require_fact(&node, source, path, ctx) {
            imports.push(fact);
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_requires(child, source, path, ctx, imports);
    }
}

fn require_fact(node: &Node, source: &[u8], path: &Path, ctx: &ResolveContext) -> Option<ImportFact> {
    let callee = node.child_by_field_name("function")?;
    if callee.utf8_text(source).ok()? != "require" {
        return None;
    }
    let args = node.child_by_field_name("arguments")?;
    if args.named_child_count() != 1 {
        return None;
    }
    let arg = args.named_child(0)?;
    if arg.kind() != "string" {
        return None;
    }
    let specifier = string_text(arg, source)?;
    let resolved = ts_resolve::resolve(path, &specifier, ctx);
    Some(ImportFact { source: specifier, specifiers: Vec::new(), resolved })
}

fn has_default_keyword(node: &Node) -> bool {
    let mut i = 0;
    while let Some(child) = node.child(i) {
        if child.kind() == "default" {
            return true;
        }
        i += 1;
    }
    false
}

/// Name and 1-based location of a declaration's `name` field.
fn named_field(node: Node, source: &[u8]) -> Option<(String, Location)> {
    let name_node = node.child_by_field_name("name")?;
    let name = name_node.utf8_text(source).ok()?;
    Some((name.to_string(), position(name_node)))
}

fn position(node: Node) -> Location {
    let point = node.start_position();
    Location { line: point.row as u32 + 1, column: point.column as u32 + 1 }
}

/// Literal text of a string node, quotes stripped.
fn string_text(node: Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "string_fragment" {
            return child.utf8_text(source).ok().map(str::to_string);
        }
    }
    // empty string literal has no fragment
    let raw = node.utf8_text(source).ok()?;
    Some(raw.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ModuleIndex;
    use std::fs;
    use tempfile::tempdir;

    fn extract_str(file_name: &str, content: &str) -> ModuleRecord {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let file = root.join(file_name);
        fs::write(&file, content).unwrap();
        let index = ModuleIndex::new();
        let ctx = ResolveContext { root, index: &index };
        TypeScriptExtractor::new().extract(&file, content, &ctx).unwrap()
    }

    #[test]
    fn named_and_default_imports() {
        let record = extract_str(
            "a.ts",
            "import { A, B } from './x';\nimport d from './y';\nimport * as ns from './z';\nimport './side';\n",
        );
        assert_eq!(record.imports.len(), 4);
        assert_eq!(record.imports[0].source, "./x");
        assert_eq!(record.imports[0].specifiers, vec!["A", "B"]);
        assert_eq!(record.imports[1].specifiers, vec!["default"]);
        assert_eq!(record.imports[2].specifiers, vec!["*"]);
        assert!(record.imports[3].specifiers.is_empty());
        // nothing exists on disk, so nothing resolves
        assert!(record.imports.iter().all(|i| i.resolved.is_none()));
    }

    #[test]
    fn require_calls_are_imports() {
        let record = extract_str("a.js", "const x = require('./dep');\nconst os = require('os');\n");
        assert_eq!(record.imports.len(), 2);
        assert_eq!(record.imports[0].source, "./dep");
        assert!(record.imports[0].specifiers.is_empty());
        assert_eq!(record.imports[1].source, "os");
    }

    #[test]
    fn export_kinds_and_locations() {
        let record = extract_str(
            "a.ts",
            concat!(
                "export function go() {}\n",
                "export class Engine {\n  start() {}\n  stop() {}\n}\n",
                "export const RATE = 1;\n",
                "export default function main() {}\n",
                "export { helper } from './util';\n",
            ),
        );

        let names: Vec<&str> = record.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["go", "Engine", "Engine.start", "Engine.stop", "RATE", "default", "helper"]
        );

        let go = &record.exports[0];
        assert_eq!(go.kind, ExportKind::Function);
        assert_eq!(go.loc, Some(Location { line: 1, column: 17 }));

        let engine = &record.exports[1];
        assert_eq!(engine.kind, ExportKind::Class);

        let start = &record.exports[2];
        assert_eq!(start.kind, ExportKind::Function);
        assert_eq!(start.loc.unwrap().line, 3);

        let default = record.exports.iter().find(|e| e.name == "default").unwrap();
        assert_eq!(default.kind, ExportKind::Function);

        let reexport = record.exports.last().unwrap();
        assert_eq!(reexport.kind, ExportKind::Reexport);
        assert!(reexport.loc.is_none());
    }

    #[test]
    fn export_clause_binds_earlier_declarations() {
        let record = extract_str(
            "a.ts",
            "function lift() {}\nclass Crane {\n  hoist() {}\n}\nexport { lift, Crane };\n",
        );
        let names: Vec<&str> = record.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["lift", "Crane", "Crane.hoist"]);
        assert_eq!(record.exports[0].kind, ExportKind::Function);
        assert_eq!(record.exports[1].kind, ExportKind::Class);
        assert!(record.exports[0].loc.is_some());
    }

    #[test]
    fn jsx_and_star_reexport() {
        let record = extract_str("a.tsx", "export * from './widgets';\n");
        assert_eq!(record.exports.len(), 1);
        assert_eq!(record.exports[0].name, "./widgets");
        assert_eq!(record.exports[0].kind, ExportKind::Reexport);
    }

    #[test]
    fn relative_import_resolves_to_sibling() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("b.ts"), "export function helper() {}\n").unwrap();
        let file = root.join("a.ts");
        let content = "import { helper } from './b';\n";
        fs::write(&file, content).unwrap();

        let index = ModuleIndex::new();
        let ctx = ResolveContext { root, index: &index };
        let record = TypeScriptExtractor::new().extract(&file, content, &ctx).unwrap();

        assert_eq!(record.imports[0].resolved, Some(root.join("b.ts")));
        assert_eq!(record.meta.loc, 1);
        assert!(!record.meta.cache_hit);
    }
}
