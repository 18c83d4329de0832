// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use clap::Parser;
use doqq::cli::{Cli, Commands};

#[test]
fn test_parse_crawl_command() {
    let args = vec!["doqq", "crawl", "/work/ios-lib"];
    let cli = Cli::try_parse_from(args).expect("Valid command parsing");
    assert!(matches!(cli.command, Commands::Crawl(_)));
}

#[test]
fn test_parse_crawl_with_queries() {
    let args = vec![
        "doqq",
        "crawl",
        "-q",
        "Code that can change the UINavigationBar to Green",
    ];
    let cli = Cli::try_parse_from(args).expect("Valid command parsing");
    if let Commands::Crawl(crawl) = cli.command {
        assert!(crawl.root.is_none());
        assert_eq!(
            crawl.query,
            vec!["Code that can change the UINavigationBar to Green"]
        );
    } else {
        panic!("Expected Crawl command");
    }
}

#[test]
fn test_parse_annotate_without_output() {
    let cli = Cli::try_parse_from(["doqq", "annotate", "test.swift"]).expect("Valid command parsing");
    if let Commands::Annotate(annotate) = cli.command {
        assert!(annotate.output.is_none());
    } else {
        panic!("Expected Annotate command");
    }
}

#[test]
fn test_parse_models_command() {
    let cli = Cli::try_parse_from(["doqq", "models"]).expect("Valid command parsing");
    assert!(matches!(cli.command, Commands::Models));
}

#[test]
fn test_unknown_command_fails() {
    assert!(Cli::try_parse_from(["doqq", "chat"]).is_err());
}
