//! Integration tests running whole scripts against a scratch directory

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use perun_interpreter::*;

#[derive(Clone, Default)]
struct Output(Arc<Mutex<Vec<u8>>>);

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Output {
    fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.lock().unwrap());
        String::from_utf8(bytes).unwrap()
    }
}

/// a.txt (4 bytes), b.txt (1 byte), c.log (2 bytes) and an empty directory `old`
fn sandbox() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "aaaa").unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    fs::write(dir.path().join("c.log"), "cc").unwrap();
    fs::create_dir(dir.path().join("old")).unwrap();
    dir
}

fn interpreter(dir: &Path, dry_run: bool) -> (Interpreter, Output) {
    let out = Output::default();
    let config = InterpreterConfig {
        location: dir.to_string_lossy().into_owned(),
        dry_run,
    };
    (Interpreter::with_output(config, Box::new(out.clone())), out)
}

fn run(dir: &Path, code: &str) -> String {
    let (mut interpreter, out) = interpreter(dir, false);
    if let Err(e) = interpreter.run_str(code) {
        panic!("`{}` failed: {}", code, e);
    }
    out.take()
}

#[test]
fn delete_by_extension() {
    let dir = sandbox();
    let printed = run(
        dir.path(),
        "files where extension = 'log' { delete }\nprint count(files)",
    );
    assert_eq!(printed, "2\n");
    assert!(!dir.path().join("c.log").exists());
    assert!(dir.path().join("old").is_dir());
}

#[test]
fn backup_into_a_new_directory() {
    let dir = sandbox();
    let printed = run(
        dir.path(),
        "'*.txt' { copy to 'backup' }\ninside 'backup' { files { print } }",
    );
    assert_eq!(printed, "a.txt\nb.txt\n");
    assert_eq!(fs::read_to_string(dir.path().join("backup").join("a.txt")).unwrap(), "aaaa");
    assert!(dir.path().join("a.txt").is_file());
}

#[test]
fn ordered_iteration() {
    let dir = sandbox();
    assert_eq!(
        run(dir.path(), "files order by name desc { print }"),
        "c.log\nb.txt\na.txt\n"
    );
    assert_eq!(
        run(dir.path(), "files order by size limit 2 { print name }"),
        "b\nc\n"
    );
}

#[test]
fn accumulate_over_files() {
    let dir = sandbox();
    let printed = run(
        dir.path(),
        "total = 0;\nfiles where extension = 'txt' { total += size }\nprint total",
    );
    assert_eq!(printed, "5\n");
}

#[test]
fn error_sets_the_exit_code() {
    let dir = sandbox();
    let (mut interpreter, out) = interpreter(dir.path(), false);
    let code = interpreter
        .run_str("files { if name = 'b' error 3; print name }")
        .unwrap();
    assert_eq!(code, 3);
    assert_eq!(out.take(), "a\n");
}

#[test]
fn syntax_errors_prevent_any_change() {
    let dir = sandbox();
    let (mut interpreter, out) = interpreter(dir.path(), false);
    let err = interpreter
        .run_str("create 'new.txt';\nprint 1 +")
        .unwrap_err();
    assert!(matches!(err, InterpreterError::Syntax(_)), "{}", err);
    assert_eq!(err.line(), 2);
    assert!(!dir.path().join("new.txt").exists());
    assert_eq!(out.take(), "");
}

#[test]
fn variables_outlive_a_run() {
    let dir = sandbox();
    let (mut interpreter, out) = interpreter(dir.path(), false);
    interpreter.run_str("greeting = 'hello'").unwrap();
    interpreter.run_str("greeting += ' world'; print greeting").unwrap();
    assert_eq!(out.take(), "hello world\n");
}

#[test]
fn dry_run_leaves_the_filesystem_alone() {
    let dir = sandbox();
    let (mut interpreter, out) = interpreter(dir.path(), true);
    assert_eq!(interpreter.run_str("delete files; print 'gone'").unwrap(), 0);
    assert_eq!(out.take(), "");
    assert!(dir.path().join("a.txt").is_file());
}

#[test]
fn tokenize_rejects_unbalanced_brackets() {
    assert!(tokenize(std::io::Cursor::new("print (1 + 2")).is_err());
    let tokens = tokenize(std::io::Cursor::new("print 1")).unwrap();
    assert_eq!(tokens.len(), 2);
}
