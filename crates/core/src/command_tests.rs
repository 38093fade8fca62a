// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

fn config(args: &[&str]) -> ToolInvocationConfig {
    ToolInvocationConfig::new("/usr/local/bin/fmt").unwrap().fixed_args(args.iter().copied())
}

#[test]
fn fixed_args_precede_target() {
    let spec = build(&config(&["-l", "-w"]), Path::new("/tmp/a.go")).unwrap();
    assert_eq!(spec.executable, "/usr/local/bin/fmt");
    assert_eq!(spec.args, vec!["-l", "-w", "/tmp/a.go"]);
    assert_eq!(spec.target(), Some(Path::new("/tmp/a.go")));
}

#[test]
fn no_fixed_args_still_has_target() {
    let spec = build(&config(&[]), Path::new("main.go")).unwrap();
    assert_eq!(spec.args, vec!["main.go"]);
}

#[test]
fn empty_target_is_invalid() {
    let err = build(&config(&["-w"]), Path::new("")).unwrap_err();
    assert!(matches!(err, BuildError::InvalidArgument(_)));
}

#[test]
fn display_joins_executable_and_args() {
    let spec = build(&config(&["-l", "-w"]), Path::new("/proj/main.go")).unwrap();
    assert_eq!(spec.display(), "/usr/local/bin/fmt -l -w /proj/main.go");
}

#[yare::parameterized(
    inherit = { WorkingDir::Inherit, None },
    workspace = { WorkingDir::Workspace, None },
    fixed = { WorkingDir::Fixed(PathBuf::from("/srv")), Some(PathBuf::from("/srv")) },
)]
fn working_dir_policy(policy: WorkingDir, expected: Option<PathBuf>) {
    let config = config(&[]).working_dir(policy);
    let spec = build(&config, Path::new("/a.go")).unwrap();
    assert_eq!(spec.current_dir, expected);
}

#[test]
fn with_current_dir_overrides() {
    let spec = build(&config(&[]), Path::new("/a.go"))
        .unwrap()
        .with_current_dir(Some(PathBuf::from("/proj")));
    assert_eq!(spec.current_dir, Some(PathBuf::from("/proj")));
}

#[test]
fn env_is_carried_over() {
    let mut env = BTreeMap::new();
    env.insert("A".to_string(), "1".to_string());
    let spec = build(&config(&[]).env(env.clone()), Path::new("/a.go")).unwrap();
    assert_eq!(spec.env, env);
}

proptest! {
    #[test]
    fn args_are_fixed_args_then_target(
        fixed in proptest::collection::vec("[a-zA-Z0-9_=-]{0,8}", 0..6),
        target in "/[a-z]{1,8}/[a-z]{1,8}\\.go",
    ) {
        let config = ToolInvocationConfig::new("tool").unwrap().fixed_args(fixed.clone());
        let spec = build(&config, Path::new(&target)).unwrap();

        prop_assert_eq!(spec.args.len(), fixed.len() + 1);
        for (built, expected) in spec.args.iter().zip(fixed.iter()) {
            prop_assert_eq!(built, &OsString::from(expected));
        }
        prop_assert_eq!(spec.args.last(), Some(&OsString::from(&target)));
    }
}
