use super::*;
use crate::host::MemoryHost;

fn host(files: &[&str]) -> MemoryHost {
    let host = MemoryHost::new();
    for file in files {
        host.insert(*file, "");
    }
    host
}

fn typings() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/project/@types"),
        PathBuf::from("/project/node_modules/@types"),
    ]
}

fn file(path: &str, library: bool) -> Resolution {
    Resolution::File {
        path: PathBuf::from(path),
        library,
    }
}

#[test]
fn test_relative_import_prefers_sibling_declaration() {
    let host = host(&["/project/src/util.js", "/project/src/util.d.ts"]);
    let from = Path::new("/project/src/main.js");
    assert_eq!(
        resolve_specifier(&host, from, "./util", &typings()),
        file("/project/src/util.d.ts", false)
    );
    assert_eq!(
        resolve_specifier(&host, from, "./util.js", &typings()),
        file("/project/src/util.d.ts", false)
    );
}

#[test]
fn test_relative_import_falls_back_to_script_and_index() {
    let host = host(&["/project/src/util.js", "/project/src/widgets/index.js"]);
    let from = Path::new("/project/src/main.js");
    assert_eq!(
        resolve_specifier(&host, from, "./util", &typings()),
        file("/project/src/util.js", false)
    );
    assert_eq!(
        resolve_specifier(&host, from, "./widgets", &typings()),
        file("/project/src/widgets/index.js", false)
    );
}

#[test]
fn test_parent_directory_segments_are_normalized() {
    let host = host(&["/project/shared/config.js"]);
    let from = Path::new("/project/src/app/main.js");
    assert_eq!(
        resolve_specifier(&host, from, "../../shared/./config", &typings()),
        file("/project/shared/config.js", false)
    );
}

#[test]
fn test_bare_specifier_searches_typings_in_order() {
    let host = host(&[
        "/project/@types/lodash.d.ts",
        "/project/node_modules/@types/lodash/index.d.ts",
        "/project/node_modules/@types/react/index.d.ts",
    ]);
    let from = Path::new("/project/src/main.js");
    assert_eq!(
        resolve_specifier(&host, from, "lodash", &typings()),
        file("/project/@types/lodash.d.ts", true)
    );
    assert_eq!(
        resolve_specifier(&host, from, "react", &typings()),
        file("/project/node_modules/@types/react/index.d.ts", true)
    );
}

#[test]
fn test_unresolved_specifiers() {
    let host = host(&["/project/node_modules/@types/lodash.d.ts"]);
    let from = Path::new("/project/src/main.js");
    assert_eq!(
        resolve_specifier(&host, from, "./missing", &typings()),
        Resolution::Unresolved
    );
    assert_eq!(
        resolve_specifier(&host, from, "fs", &typings()),
        Resolution::Unresolved
    );
    assert_eq!(
        resolve_specifier(&host, from, "  ", &typings()),
        Resolution::Unresolved
    );
}

#[test]
fn test_relative_import_does_not_search_typings() {
    let host = host(&["/project/@types/util.d.ts"]);
    let from = Path::new("/project/src/main.js");
    assert_eq!(
        resolve_specifier(&host, from, "./util", &typings()),
        Resolution::Unresolved
    );
}

#[test]
fn test_dotted_file_names_keep_their_stem() {
    let host = host(&["/project/@types/jquery.min.d.ts"]);
    let from = Path::new("/project/main.js");
    assert_eq!(
        resolve_specifier(&host, from, "jquery.min", &typings()),
        file("/project/@types/jquery.min.d.ts", true)
    );
}

#[test]
fn test_normalize_path() {
    assert_eq!(
        normalize_path(Path::new("/a/./b/../c/d")),
        PathBuf::from("/a/c/d")
    );
    assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("b"));
}
