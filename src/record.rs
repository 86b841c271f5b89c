//! Module records - the normalized per-file parse result
//!
//! Every language extractor produces the same shape: one [`ModuleRecord`]
//! holding the import facts, the export facts, and the parse metrics for a
//! single source file. The analyzer, the cache, and both graph assemblers
//! only ever see this representation; nothing downstream is language-aware.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::Error;

/// Language tag carried by every module record.
///
/// TSX collapses into `Ts` and JSX into `Js` - the grammars differ but the
/// module system (and therefore resolution) is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ts,
    Js,
    Py,
}

impl Language {
    /// Detect the language from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())? {
            "ts" | "tsx" => Some(Language::Ts),
            "js" | "jsx" => Some(Language::Js),
            "py" => Some(Language::Py),
            _ => None,
        }
    }

    /// File extensions covered by this language tag.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Ts => &["ts", "tsx"],
            Language::Js => &["js", "jsx"],
            Language::Py => &["py"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ts => "ts",
            Language::Js => "js",
            Language::Py => "py",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Restricts discovery to one language, or `Auto` for the union of all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageFilter {
    #[default]
    Auto,
    Only(Language),
}

impl LanguageFilter {
    /// Does a path fall inside this filter's extension set?
    pub fn matches(&self, path: &Path) -> bool {
        match (self, Language::from_path(path)) {
            (_, None) => false,
            (LanguageFilter::Auto, Some(_)) => true,
            (LanguageFilter::Only(wanted), Some(found)) => *wanted == found,
        }
    }
}

impl FromStr for LanguageFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "all" => Ok(LanguageFilter::Auto),
            "ts" | "typescript" => Ok(LanguageFilter::Only(Language::Ts)),
            "js" | "javascript" => Ok(LanguageFilter::Only(Language::Js)),
            "py" | "python" => Ok(LanguageFilter::Only(Language::Py)),
            other => Err(Error::Config(format!("unknown language filter: {other}"))),
        }
    }
}

/// 1-based line/column of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// What kind of declaration an export binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Function,
    Class,
    Var,
    Default,
    Reexport,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Function => "function",
            ExportKind::Class => "class",
            ExportKind::Var => "var",
            ExportKind::Default => "default",
            ExportKind::Reexport => "reexport",
        }
    }

    /// Kinds that represent a declaration made in the file itself, as
    /// opposed to a re-export that binds no local name.
    pub fn is_declaration(&self) -> bool {
        !matches!(self, ExportKind::Reexport)
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One import statement, normalized.
///
/// `specifiers` keeps the imported binding names in source order, with the
/// sentinels `"default"` and `"*"` standing in where the grammar binds no
/// explicit names. `resolved` is set only when the path resolver proved the
/// specifier maps to a file inside the workspace - unresolved imports never
/// become graph edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFact {
    pub source: String,
    pub specifiers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<PathBuf>,
}

/// One exported (or top-level, for Python) declaration.
///
/// Class methods carry the qualified name `Owner.member` so the symbol
/// graph can synthesize membership edges without re-parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFact {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ExportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

impl ExportFact {
    /// Split a qualified `Owner.member` name, if this export carries one.
    pub fn owner_and_member(&self) -> Option<(&str, &str)> {
        self.name.split_once('.')
    }
}

/// Parse metrics attached to every record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMetrics {
    pub parse_ms: u64,
    pub loc: u32,
    pub cache_hit: bool,
}

/// Normalized parse result for one file. Immutable once produced; a re-parse
/// replaces the record wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub file: PathBuf,
    pub lang: Language,
    pub imports: Vec<ImportFact>,
    pub exports: Vec<ExportFact>,
    pub meta: ParseMetrics,
}

impl ModuleRecord {
    /// The fail-closed record: empty imports/exports, zero line count.
    /// Produced when an extractor cannot parse a file, so one bad file
    /// never aborts a batch.
    pub fn empty(file: &Path, lang: Language) -> Self {
        Self {
            file: file.to_path_buf(),
            lang,
            imports: Vec::new(),
            exports: Vec::new(),
            meta: ParseMetrics::default(),
        }
    }
}
