use crate::args::CliArgs;
use clap::Parser;
use hegel_core::Environment;
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let args = CliArgs::try_parse_from(["hegel"]).unwrap();
    assert_eq!(args.config, None);
    assert_eq!(args.environments, None);
    assert!(!args.no_color);
    assert!(!args.print_types);
    assert!(args.files.is_empty());
}

#[test]
fn test_flags_and_files() {
    let args = CliArgs::try_parse_from([
        "hegel",
        "--config",
        "conf/hegel.json",
        "--env",
        "nodejs,browser",
        "--no-color",
        "--print-types",
        "src/a.js",
        "src/b.js",
    ])
    .unwrap();
    assert_eq!(args.config, Some(PathBuf::from("conf/hegel.json")));
    assert_eq!(
        args.environments,
        Some(vec![Environment::NodeJs, Environment::Browser])
    );
    assert!(args.no_color);
    assert!(args.print_types);
    assert_eq!(
        args.files,
        [PathBuf::from("src/a.js"), PathBuf::from("src/b.js")]
    );
}

#[test]
fn test_unknown_environment_is_rejected() {
    let error = CliArgs::try_parse_from(["hegel", "--env", "deno"]).unwrap_err();
    assert!(error.to_string().contains("deno"));
}
