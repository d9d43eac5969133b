use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dungeon-snake"))
        .args(args)
        .output()
        .expect("failed to launch the dungeon-snake binary")
}

#[test]
fn generate_reports_reachability() {
    let output = run(&["generate", "--seed", "42"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains('@'));
    assert!(stdout.contains("every room is reachable from the start room"));
}

#[test]
fn same_seed_plays_the_same_level() {
    let first = run(&["play", "..D.", "--seed", "9"]);
    let second = run(&["play", "..D.", "--seed", "9"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn invalid_input_fails_cleanly() {
    assert!(!run(&["play", "RQ"]).status.success());
    assert!(!run(&["play", ".", "--carryover", "worm:v1:e30"]).status.success());
    assert!(!run(&["shop", "--buy", "key"]).status.success());
}

#[test]
fn shop_lists_stock() {
    let output = run(&["shop"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0 coins to spend"));
    assert!(stdout.contains("espresso"));
    assert!(!stdout.contains("coin "));
}
