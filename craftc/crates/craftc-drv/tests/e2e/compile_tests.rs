//! Full-pipeline tests: fixture source in, datapack tree out.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("e2e")
        .join("fixtures")
}

fn craftc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_craftc"))
}

fn read(out: &Path, rel: &str) -> String {
    fs::read_to_string(out.join(rel)).unwrap_or_else(|e| panic!("missing {}: {}", rel, e))
}

#[test]
fn test_hello_world_datapack() {
    let temp = TempDir::new().expect("temp dir");
    let out = temp.path().join("pack");

    craftc()
        .arg(fixtures_dir().join("hello.craft"))
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        read(&out, "pack.mcmeta"),
        "{\r\n\t\"pack\": {\r\n\t\t\"pack_format\": 4,\r\n\t\t\"description\": \"\"\r\n\t}\r\n}\r\n"
    );
    assert_eq!(
        read(&out, "data/demo/functions/.load.mcfunction"),
        "gamerule maxCommandChainLength 2147483647\r\nscoreboard objectives add craftlang dummy\r\n"
    );
    assert!(read(&out, "data/minecraft/tags/functions/load.json").contains("\"demo:.load\""));

    // The loop body lives in an auxiliary function that re-invokes itself.
    let main = read(&out, "data/demo/functions/main.mcfunction");
    assert!(main.contains("function demo:greet\r\n"));
    let greet = read(&out, "data/demo/functions/greet.mcfunction");
    assert!(greet.contains("execute if score stack.0 craftlang matches 1 run function demo:greet.0\r\n"));
    let body = read(&out, "data/demo/functions/greet.0.mcfunction");
    assert!(body.contains("say Hello, world!\r\n"));
    assert!(body.ends_with("execute if score stack.0 craftlang matches 1 run function demo:greet.0\r\n"));
}

#[test]
fn test_output_is_crlf() {
    let temp = TempDir::new().expect("temp dir");
    let out = temp.path().join("pack");

    craftc()
        .arg(fixtures_dir().join("hello.craft"))
        .arg(&out)
        .assert()
        .success();

    let main = read(&out, "data/demo/functions/main.mcfunction");
    assert!(main.contains("\r\n"));
    assert!(!main.replace("\r\n", "").contains('\n'));
}

#[test]
fn test_recompile_overwrites() {
    let temp = TempDir::new().expect("temp dir");
    let out = temp.path().join("pack");

    for _ in 0..2 {
        craftc()
            .arg(fixtures_dir().join("hello.craft"))
            .arg(&out)
            .assert()
            .success();
    }

    let body = read(&out, "data/demo/functions/greet.0.mcfunction");
    // One body's worth of commands, not two.
    assert_eq!(body.matches("say Hello, world!").count(), 1);
}

#[test]
fn test_failed_compile_aborts_mid_tree() {
    let temp = TempDir::new().expect("temp dir");
    let out = temp.path().join("pack");

    craftc()
        .arg(fixtures_dir().join("undefined.craft"))
        .arg(&out)
        .assert()
        .failure();

    // Partially written files may remain, but no command was emitted for
    // the statement that failed to compile.
    assert!(out.join("pack.mcmeta").exists());
    if let Ok(main) = fs::read_to_string(out.join("data/demo/functions/main.mcfunction")) {
        assert!(!main.contains("scoreboard players"));
    }
}
