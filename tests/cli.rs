use std::fs;
use std::path::Path;
use std::process::Command;

fn templatize() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_templatize"));
    cmd.env_remove("RUST_LOG").env_remove("TEMPLATIZE_LOG_LEVEL");
    cmd
}

fn write(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

const WXS: &str = "<Product Version=\"{%Version%}\">\n\
#IF WINDOWS\n  <Icon Id=\"win.ico\"/>\n#ENDIF\n\
#IF LINUX\n  <Icon Id=\"linux.ico\"/>\n#ENDIF\n\
</Product>\n";

// --- render ---

#[test]
fn render_with_define_and_set() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Product.wxs.template", WXS);
    let out = templatize()
        .arg("render")
        .arg(dir.path().join("Product.wxs.template"))
        .args(["-D", "WINDOWS", "--set", "Version=0.24.0"])
        .output()
        .expect("failed to run templatize");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "<Product Version=\"0.24.0\">\n  <Icon Id=\"win.ico\"/>\n</Product>\n"
    );
}

#[test]
fn render_without_defines_drops_blocks() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "t", WXS);
    let out = templatize()
        .arg("render")
        .arg(dir.path().join("t"))
        .args(["--set", "Version=1"])
        .output()
        .expect("failed to run templatize");
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "<Product Version=\"1\">\n</Product>\n");
}

#[test]
fn render_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "README.md.template", "# {%FullName%}\n");
    let target = dir.path().join("docs/README.md");
    let out = templatize()
        .arg("render")
        .arg(dir.path().join("README.md.template"))
        .args(["--set", "FullName=Chaskis IRC Bot", "-o"])
        .arg(&target)
        .output()
        .expect("failed to run templatize");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());
    assert_eq!(fs::read_to_string(target).unwrap(), "# Chaskis IRC Bot\n");
}

#[test]
fn render_values_from_manifest_with_override() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "LICENSE_1_0.txt", "Boost Software License - Version 1.0\n");
    write(
        dir.path(),
        "templates.toml",
        "[values]\nLicense = { file = \"LICENSE_1_0.txt\" }\nAuthor = \"nobody\"\n",
    );
    write(dir.path(), "LICENSE.txt.template", "{%License%}-- {%Author%}\n");
    let out = templatize()
        .arg("render")
        .arg(dir.path().join("LICENSE.txt.template"))
        .arg("--manifest")
        .arg(dir.path().join("templates.toml"))
        .args(["--set", "Author=Seth"])
        .output()
        .expect("failed to run templatize");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "Boost Software License - Version 1.0\n-- Seth\n"
    );
}

// --- error cases ---

#[test]
fn missing_placeholder_reports_location() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "control.template", "Package: chaskis\nVersion: {%Version%}\n");
    let out = templatize()
        .args(["--no-color", "render"])
        .arg(dir.path().join("control.template"))
        .output()
        .expect("failed to run templatize");
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error[TPL-S001]"), "stderr: {stderr}");
    assert!(stderr.contains("control.template:2:10"), "stderr: {stderr}");
    assert!(stderr.contains("Version: {%Version%}"), "stderr: {stderr}");
}

#[test]
fn stray_endif_as_json() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "t", "a\n#ENDIF\n");
    let out = templatize()
        .args(["--json", "render"])
        .arg(dir.path().join("t"))
        .output()
        .expect("failed to run templatize");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    let line = stderr.lines().find(|l| l.starts_with('{')).expect("a JSON diagnostic");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["code"], "TPL-C001");
    assert_eq!(v["labels"][0]["line"], 2);
}

#[test]
fn missing_template_file() {
    let out = templatize()
        .args(["--no-color", "render", "/definitely/not/here.template"])
        .output()
        .expect("failed to run templatize");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("TPL-B001"));
}

#[test]
fn bad_set_argument_is_usage_error() {
    let out = templatize()
        .args(["render", "x", "--set", "novalue"])
        .output()
        .expect("failed to run templatize");
    assert_eq!(out.status.code(), Some(2));
}

// --- build / check ---

fn manifest_dir(product: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "SavedChecksums/chaskis.deb.sha256", "0123abcd\n");
    write(dir.path(), "install/windows/Product.wxs.template", product);
    write(dir.path(), "install/linux/debian/control.template", "Sha256: {%DebCheckSum%}\n");
    write(
        dir.path(),
        "templates.toml",
        r#"
[values]
Version = "0.24.0"
DebCheckSum = { first_line = "SavedChecksums/chaskis.deb.sha256" }

[[template]]
source = "install/windows/Product.wxs.template"
target = "install/windows/Product.wxs"
defines = ["WINDOWS"]

[[template]]
source = "install/linux/debian/control.template"
target = "install/linux/debian/control"
"#,
    );
    dir
}

#[test]
fn build_writes_targets() {
    let dir = manifest_dir(WXS);
    let out = templatize()
        .arg("build")
        .arg(dir.path().join("templates.toml"))
        .output()
        .expect("failed to run templatize");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stderr).contains("rendered 2 template(s), 0 failed"));
    assert_eq!(
        fs::read_to_string(dir.path().join("install/linux/debian/control")).unwrap(),
        "Sha256: 0123abcd\n"
    );
    assert!(
        fs::read_to_string(dir.path().join("install/windows/Product.wxs"))
            .unwrap()
            .contains("win.ico")
    );
}

#[test]
fn build_stops_on_first_failure_unless_keep_going() {
    let dir = manifest_dir("{%Nope%}\n");
    let manifest = dir.path().join("templates.toml");

    let out = templatize()
        .args(["--no-color", "build"])
        .arg(&manifest)
        .output()
        .expect("failed to run templatize");
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("install/linux/debian/control").exists());

    let out = templatize()
        .args(["--no-color", "build", "--keep-going"])
        .arg(&manifest)
        .output()
        .expect("failed to run templatize");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("TPL-S001"), "stderr: {stderr}");
    assert!(stderr.contains("rendered 1 template(s), 1 failed"), "stderr: {stderr}");
    assert!(dir.path().join("install/linux/debian/control").exists());
    assert!(!dir.path().join("install/windows/Product.wxs").exists());
}

#[test]
fn check_writes_nothing() {
    let dir = manifest_dir(WXS);
    let out = templatize()
        .arg("check")
        .arg(dir.path().join("templates.toml"))
        .output()
        .expect("failed to run templatize");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stderr).contains("checked 2 template(s)"));
    assert!(!dir.path().join("install/windows/Product.wxs").exists());
}

#[test]
fn build_with_missing_manifest() {
    let out = templatize()
        .args(["--no-color", "build", "/definitely/not/templates.toml"])
        .output()
        .expect("failed to run templatize");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("TPL-M001"));
}

// --- explain ---

#[test]
fn explain_known_code() {
    let out = templatize()
        .args(["explain", "TPL-S001"])
        .output()
        .expect("failed to run templatize");
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("## TPL-S001"));
}

#[test]
fn explain_unknown_code() {
    let out = templatize()
        .args(["explain", "TPL-X999"])
        .output()
        .expect("failed to run templatize");
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn explain_list() {
    let out = templatize()
        .args(["explain", "--list"])
        .output()
        .expect("failed to run templatize");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("TPL-C001"));
    assert!(stdout.contains("TPL-M008"));
}
