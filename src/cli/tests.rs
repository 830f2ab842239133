//! Unit tests for CLI commands

use crate::cli::{Cli, Commands};
use clap::Parser;

#[test]
fn test_serve_defaults() {
    let cli = Cli::try_parse_from(["routedoc-demo", "serve"]).unwrap();

    match cli.command {
        Commands::Serve { addr, .. } => assert_eq!(addr, "127.0.0.1:4000"),
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_serve_with_flags() {
    let cli = Cli::try_parse_from([
        "routedoc-demo",
        "serve",
        "--addr",
        "0.0.0.0:8080",
        "--overlay",
        "config/OpenAPI.json",
        "--docs-path",
        "/docs.json",
    ])
    .unwrap();

    match cli.command {
        Commands::Serve {
            addr,
            overlay,
            docs_path,
        } => {
            assert_eq!(addr, "0.0.0.0:8080");
            assert_eq!(
                overlay.unwrap().to_string_lossy(),
                "config/OpenAPI.json"
            );
            assert_eq!(docs_path.as_deref(), Some("/docs.json"));
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_document_pretty_flag() {
    let cli = Cli::try_parse_from(["routedoc-demo", "document", "--pretty"]).unwrap();

    match cli.command {
        Commands::Document { pretty, .. } => assert!(pretty),
        _ => panic!("Expected Document command"),
    }
}

#[test]
fn test_all_commands_parse() {
    for args in [
        vec!["routedoc-demo", "serve"],
        vec!["routedoc-demo", "document"],
        vec!["routedoc-demo", "routes"],
    ] {
        assert!(Cli::try_parse_from(&args).is_ok(), "failed to parse {args:?}");
    }
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["routedoc-demo", "generate"]).is_err());
}
