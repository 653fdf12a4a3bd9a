//! Tests for source file discovery

use faultline_core::discovery::{discover_files, has_supported_extension, PathFilter};
use faultline_core::FaultlineConfig;
use std::path::Path;
use tempfile::TempDir;

const EXTENSIONS: &[&str] = &[".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx"];

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, "function f() {}\n").unwrap();
}

fn relative(root: &Path, files: &[std::path::PathBuf]) -> Vec<String> {
    let root = root.canonicalize().unwrap();
    files
        .iter()
        .map(|f| f.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn test_discovers_supported_files_sorted() {
    let dir = TempDir::new().unwrap();
    for rel in ["src/b.ts", "src/a.js", "ui/View.tsx", "notes.md", "script.py"] {
        touch(dir.path(), rel);
    }

    let files = discover_files(dir.path(), EXTENSIONS, &[]).unwrap();
    assert_eq!(
        relative(dir.path(), &files),
        vec!["src/a.js", "src/b.ts", "ui/View.tsx"]
    );
}

#[test]
fn test_default_ignores_apply_at_any_depth() {
    let dir = TempDir::new().unwrap();
    for rel in [
        "app.js",
        "node_modules/lodash/index.js",
        "packages/web/node_modules/react/index.js",
        "dist/bundle.js",
        "lib/jquery.min.js",
        "types/api.d.ts",
        "types/api.ts",
    ] {
        touch(dir.path(), rel);
    }

    let config = FaultlineConfig::default();
    let files = discover_files(dir.path(), EXTENSIONS, &config.ignore.paths).unwrap();
    assert_eq!(relative(dir.path(), &files), vec!["app.js", "types/api.ts"]);
}

#[test]
fn test_gitignore_is_respected() {
    let dir = TempDir::new().unwrap();
    // the ignore crate only honours .gitignore inside a repository
    std::fs::create_dir_all(dir.path().join(".git")).unwrap();
    std::fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
    touch(dir.path(), "generated/schema.js");
    touch(dir.path(), "src/main.js");

    let files = discover_files(dir.path(), EXTENSIONS, &[]).unwrap();
    assert_eq!(relative(dir.path(), &files), vec!["src/main.js"]);
}

#[test]
fn test_path_filter_matches_relative_paths() {
    let dir = TempDir::new().unwrap();
    let filter = PathFilter::new(
        dir.path(),
        &["vendor/".to_string(), "*.min.js".to_string()],
    )
    .unwrap();

    assert!(filter.is_ignored("vendor/lib.js"));
    assert!(filter.is_ignored("packages/a/vendor/lib.js"));
    assert!(filter.is_ignored("public/app.min.js"));
    assert!(!filter.is_ignored("src/vendors.js"));
    assert!(!filter.is_ignored("src/app.js"));
}

#[test]
fn test_supported_extension_check() {
    assert!(has_supported_extension(Path::new("a/b.tsx"), EXTENSIONS));
    assert!(has_supported_extension(Path::new("server.cjs"), EXTENSIONS));
    assert!(!has_supported_extension(Path::new("a/b.py"), EXTENSIONS));
    assert!(!has_supported_extension(Path::new("Makefile"), EXTENSIONS));
}
