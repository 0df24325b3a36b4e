use super::parse;
use clap::Parser;
use crate::cli::CliCommand;
use mdrop_core::MediaKind;

#[test]
fn cli_parse_fetch() {
    match parse(&[
        "mdrop",
        "fetch",
        "https://example.com/clip.mp4",
        "--type",
        "video",
        "--name-prefix",
        "abc",
    ])
    .command
    {
        CliCommand::Fetch {
            url,
            kind,
            name_prefix,
            base_dir,
        } => {
            assert_eq!(url, "https://example.com/clip.mp4");
            assert_eq!(kind, MediaKind::Video);
            assert_eq!(name_prefix.as_deref(), Some("abc"));
            assert!(base_dir.is_none());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_requires_valid_type() {
    let missing = crate::cli::Cli::try_parse_from(["mdrop", "fetch", "https://e.com/a.png"]);
    assert!(missing.is_err());
    let bad = crate::cli::Cli::try_parse_from([
        "mdrop",
        "fetch",
        "https://e.com/a.png",
        "--type",
        "audio",
    ]);
    assert!(bad.is_err());
}

#[test]
fn cli_parse_sweep() {
    match parse(&["mdrop", "sweep", "--base-dir", "/srv/public"]).command {
        CliCommand::Sweep { base_dir } => {
            assert_eq!(base_dir.as_deref(), Some(std::path::Path::new("/srv/public")));
        }
        _ => panic!("expected Sweep"),
    }
}
