//! Python extractor
//!
//! Python files are parsed by the interpreter itself: a bridge script fed to
//! `python3 -` walks the stdlib `ast` and prints a JSON payload with import
//! and export facts. The subprocess is a strict boundary - a missing
//! interpreter, a syntax error, or a stall past the timeout all surface as
//! extraction errors for this one file and never as engine failures.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use super::LanguageExtractor;
use crate::record::{ExportKind, ImportFact, Language, Location, ModuleRecord, ParseMetrics};
use crate::resolve::ResolveContext;
use crate::resolve::python as py_resolve;
use crate::{Error, Result};

/// The ast-walking script shipped inside the binary.
const PY_BRIDGE: &str = include_str!("../../scripts/py_bridge.py");

pub struct PythonExtractor {
    python_bin: String,
    timeout: Duration,
}

impl PythonExtractor {
    pub fn new(python_bin: impl Into<String>, timeout: Duration) -> Self {
        Self { python_bin: python_bin.into(), timeout }
    }

    fn run_bridge(&self, path: &Path) -> Result<String> {
        let mut child = Command::new(&self.python_bin)
            .arg("-")
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Subprocess(format!("failed to launch {}: {e}", self.python_bin)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(PY_BRIDGE.as_bytes())
                .map_err(|e| Error::Subprocess(format!("bridge handoff failed: {e}")))?;
        }

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait_bounded(&mut child, path)?;

        let stdout = stdout.map(|t| t.join().unwrap_or_default()).unwrap_or_default();
        let stderr = stderr.map(|t| t.join().unwrap_or_default()).unwrap_or_default();

        if !status.success() {
            return Err(Error::Parse(format!(
                "python bridge failed for {}: {}",
                path.display(),
                stderr.trim()
            )));
        }
        Ok(stdout)
    }

    /// Poll the child until exit or deadline; a stalled interpreter is
    /// killed so it cannot hold up the rest of the batch.
    fn wait_bounded(&self, child: &mut Child, path: &Path) -> Result<std::process::ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        child.kill().ok();
                        child.wait().ok();
                        return Err(Error::Subprocess(format!(
                            "{} timed out after {}ms on {}",
                            self.python_bin,
                            self.timeout.as_millis(),
                            path.display()
                        )));
                    }
                    thread::sleep(Duration::from_millis(10));
                }
                Err(e) => return Err(Error::Subprocess(e.to_string())),
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    pipe.map(|mut stream| {
        thread::spawn(move || {
            let mut buf = String::new();
            stream.read_to_string(&mut buf).ok();
            buf
        })
    })
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    imports: Vec<RawImport>,
    #[serde(default)]
    exports: Vec<RawExport>,
    meta: RawMeta,
}

#[derive(Deserialize)]
struct RawImport {
    source: String,
    #[serde(default)]
    specifiers: Vec<String>,
}

#[derive(Deserialize)]
struct RawExport {
    name: String,
    #[serde(rename = "type")]
    kind: ExportKind,
    loc: Option<Location>,
}

#[derive(Deserialize)]
struct RawMeta {
    #[serde(default)]
    loc: u32,
}

impl LanguageExtractor for PythonExtractor {
    fn name(&self) -> &str {
        "Python"
    }

    fn extensions(&self) -> &[&str] {
        &["py"]
    }

    fn extract(&self, path: &Path, _content: &str, ctx: &ResolveContext) -> Result<ModuleRecord> {
        let started = Instant::now();

        let stdout = self.run_bridge(path)?;
        let raw: RawPayload = serde_json::from_str(&stdout)
            .map_err(|e| Error::Parse(format!("bad bridge payload for {}: {e}", path.display())))?;

        let imports = raw
            .imports
            .into_iter()
            .map(|imp| {
                let resolved = py_resolve::resolve(path, &imp.source, &imp.specifiers, ctx);
                ImportFact { source: imp.source, specifiers: imp.specifiers, resolved }
            })
            .collect();

        let exports = raw
            .exports
            .into_iter()
            .map(|exp| crate::record::ExportFact { name: exp.name, kind: exp.kind, loc: exp.loc })
            .collect();

        Ok(ModuleRecord {
            file: path.to_path_buf(),
            lang: Language::Py,
            imports,
            exports,
            meta: ParseMetrics {
                parse_ms: started.elapsed().as_millis() as u64,
                loc: raw.meta.loc,
                cache_hit: false,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ModuleIndex;
    use std::fs;
    use tempfile::tempdir;

    fn python_available() -> bool {
        Command::new("python3")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn extractor() -> PythonExtractor {
        PythonExtractor::new("python3", Duration::from_secs(20))
    }

    #[test]
    fn extracts_imports_and_top_level_symbols() {
        if !python_available() {
            eprintln!("python3 not found, skipping");
            return;
        }

        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("utils.py"), "def helper():\n    pass\n").unwrap();
        let file = root.join("main.py");
        fs::write(
            &file,
            "from . import utils\n\nRATE = 3\n\nclass Runner:\n    def go(self):\n        pass\n\ndef main():\n    pass\n",
        )
        .unwrap();

        let index = ModuleIndex::build(&[root.join("utils.py"), file.clone()]);
        let ctx = ResolveContext { root, index: &index };
        let record = extractor().extract(&file, "", &ctx).unwrap();

        assert_eq!(record.lang, Language::Py);
        assert_eq!(record.imports.len(), 1);
        assert_eq!(record.imports[0].source, ".");
        assert_eq!(record.imports[0].specifiers, vec!["utils"]);
        assert_eq!(record.imports[0].resolved, Some(root.join("utils.py")));

        let names: Vec<&str> = record.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["RATE", "Runner", "Runner.go", "main"]);
        assert_eq!(record.exports[1].kind, ExportKind::Class);
        assert_eq!(record.exports[2].kind, ExportKind::Function);
        // 1-based locations straight from the ast
        assert_eq!(record.exports[0].loc, Some(Location { line: 3, column: 1 }));
        assert!(record.meta.loc > 0);
    }

    #[test]
    fn syntax_error_is_an_extraction_error() {
        if !python_available() {
            eprintln!("python3 not found, skipping");
            return;
        }

        let dir = tempdir().unwrap();
        let file = dir.path().join("broken.py");
        fs::write(&file, "def broken(:\n").unwrap();

        let index = ModuleIndex::new();
        let ctx = ResolveContext { root: dir.path(), index: &index };
        assert!(extractor().extract(&file, "", &ctx).is_err());
    }

    #[test]
    fn missing_interpreter_is_a_subprocess_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.py");
        fs::write(&file, "x = 1\n").unwrap();

        let index = ModuleIndex::new();
        let ctx = ResolveContext { root: dir.path(), index: &index };
        let bridge = PythonExtractor::new("definitely-not-a-python", Duration::from_secs(1));
        match bridge.extract(&file, "", &ctx) {
            Err(Error::Subprocess(_)) => {}
            other => panic!("expected subprocess error, got {other:?}"),
        }
    }
}
