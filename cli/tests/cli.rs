use anyhow::Result;
use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn ctxcat() -> Command {
    Command::cargo_bin("ctxcat").unwrap()
}

#[test]
fn a_missing_root_exits_with_code_one() {
    ctxcat()
        .arg("/definitely/not/a/real/path")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn plain_format_renders_headers_and_content() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("a.txt").write_str("hello context\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt\n-----\nhello context\n"));
    Ok(())
}

#[test]
fn xml_is_the_default_format() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("a.txt").write_str("hello\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<documents>"))
        .stdout(predicate::str::contains("<document path=\"a.txt\">"));
    Ok(())
}

#[test]
fn markdown_labels_every_file() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("a.py").write_str("print(1)\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "markdown", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("**File:** `a.py`"))
        .stdout(predicate::str::contains("```python"));
    Ok(())
}

#[test]
fn gitignore_rules_keep_files_out() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child(".gitignore").write_str("*.log\n")?;
    temp.child("a.txt").write_str("alpha\n")?;
    temp.child("noise.log").write_str("noise\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("noise").not());
    Ok(())
}

#[test]
fn the_output_flag_writes_the_document_to_disk() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("a.txt").write_str("alpha\n")?;

    ctxcat()
        .args([
            temp.path().to_str().unwrap(),
            "-o",
            "out/context.xml",
            "-q",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    temp.child("out/context.xml")
        .assert(predicate::path::exists())
        .assert(predicate::str::contains("<document path=\"a.txt\">"));
    Ok(())
}

#[test]
fn the_extension_allowlist_limits_the_document() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("lib.rs").write_str("pub fn lib() {}\n")?;
    temp.child("notes.txt").write_str("notes\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain", "-e", "rs", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lib.rs"))
        .stdout(predicate::str::contains("notes").not());
    Ok(())
}

#[test]
fn selections_narrow_the_document() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("a.txt").write_str("alpha\n")?;
    temp.child("b.txt").write_str("beta\n")?;

    ctxcat()
        .args([
            temp.path().to_str().unwrap(),
            "--select",
            "a.txt",
            "-f",
            "plain",
            "-q",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("beta").not());
    Ok(())
}

#[test]
fn line_numbers_are_rendered_on_request() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("a.txt").write_str("alpha\nbeta\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain", "-n", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1: alpha\n2: beta\n"));
    Ok(())
}

#[test]
fn hidden_files_need_the_hidden_flag() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child(".env").write_str("SECRET=1\n")?;
    temp.child("a.txt").write_str("alpha\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SECRET").not());

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain", "--hidden", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SECRET"));
    Ok(())
}

#[test]
fn the_prefs_file_sets_defaults() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child(".ctxcat.toml").write_str("format = \"markdown\"\n")?;
    temp.child("a.txt").write_str("alpha\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("**File:** `a.txt`"));
    Ok(())
}

#[test]
fn flags_override_the_prefs_file() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child(".ctxcat.toml").write_str("format = \"markdown\"\n")?;
    temp.child("a.txt").write_str("alpha\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("**File:**").not())
        .stdout(predicate::str::contains("a.txt\n-----\n"));
    Ok(())
}

#[test]
fn no_prefs_skips_the_preferences_file() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child(".ctxcat.toml").write_str("format = \"markdown\"\n")?;
    temp.child("a.txt").write_str("alpha\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "--no-prefs", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<documents>"));
    Ok(())
}

#[test]
fn a_broken_prefs_format_exits_with_code_five() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child(".ctxcat.toml").write_str("format = \"yaml\"\n")?;
    temp.child("a.txt").write_str("alpha\n")?;

    ctxcat()
        .arg(temp.path().to_str().unwrap())
        .assert()
        .failure()
        .code(5);
    Ok(())
}

#[test]
fn an_invalid_size_limit_exits_with_code_five() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("a.txt").write_str("alpha\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "--max-file-size", "garbage"])
        .assert()
        .failure()
        .code(5);
    Ok(())
}

#[test]
fn the_summary_goes_to_stderr_not_stdout() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("a.txt").write_str("alpha\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tokens").not())
        .stderr(predicate::str::contains("tokens"));
    Ok(())
}

#[test]
fn quiet_silences_the_summary() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("a.txt").write_str("alpha\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain", "-q"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
    Ok(())
}

#[test]
fn skipped_binaries_are_reported_with_a_reason() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("img.png").write_binary(&[0x89, b'P', b'N', b'G', 0, 1])?;

    ctxcat()
        .args([
            temp.path().to_str().unwrap(),
            "--select",
            "img.png",
            "-f",
            "plain",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("img.png (binary-content)"));
    Ok(())
}

#[test]
fn the_tree_flag_prepends_the_structure() -> Result<()> {
    let temp = TempDir::new()?;
    temp.child("src/main.rs").write_str("fn main() {}\n")?;

    ctxcat()
        .args([temp.path().to_str().unwrap(), "-f", "plain", "--tree", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Project Structure ---"))
        .stdout(predicate::str::contains("└── main.rs"));
    Ok(())
}
