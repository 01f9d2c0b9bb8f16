//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::host::Selection;

/// Parse a zero-based line selection: `START:END` or a single line.
pub fn parse_selection(s: &str) -> Result<Selection, String> {
    let parse_line = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|_| format!("'{}' is not a valid line number", part))
    };

    let (start, end) = match s.split_once(':') {
        Some((start, end)) => (parse_line(start)?, parse_line(end)?),
        None => {
            let line = parse_line(s)?;
            (line, line)
        }
    };

    if end == u32::MAX {
        return Err(format!("Line {} is out of range", end));
    }
    if end < start {
        return Err(format!(
            "Selection end ({}) comes before its start ({})",
            end, start
        ));
    }
    Ok(Selection::lines(start, end))
}

/// Parse and validate a tab size (at least 1)
fn parse_tab_size(s: &str) -> Result<u32, String> {
    let size: u32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if size == 0 {
        return Err("Tab size must be at least 1".to_string());
    }
    Ok(size)
}

/// Frame code selections and export them as images
#[derive(Parser, Debug)]
#[command(name = "codeframe")]
#[command(version, about = "Frame code selections and export them as images", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Settings file (overrides the one named in the config file)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
}

/// The editor state a command works on.
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct EditorArgs {
    /// File the code comes from
    #[arg(long)]
    pub file: PathBuf,

    /// Language id (default: detected from the file extension)
    #[arg(long)]
    pub language: Option<String>,

    /// Selected lines, zero-based (START:END or LINE)
    #[arg(long, value_parser = parse_selection)]
    pub selection: Option<Selection>,

    /// Tab width of the editor
    #[arg(long, value_parser = parse_tab_size)]
    pub tab_size: Option<u32>,

    /// Workspace folder
    #[arg(long, short)]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Attach a capture session to a render surface speaking JSON lines on stdin/stdout
    Start {
        #[command(flatten)]
        editor: EditorArgs,

        /// Save images here instead of the suggested path
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Assemble one render config and print the update message
    Snapshot {
        #[command(flatten)]
        editor: EditorArgs,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Prepare the render surface's HTML template
    Html {
        /// Template file
        template: PathBuf,

        /// Content-security-policy source substituted into the template
        #[arg(long, default_value = "'self'")]
        csp_source: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config and settings files
    Init,
    /// Print the config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Position;

    #[test]
    fn test_parse_selection_range() {
        let s = parse_selection("12:20").unwrap();
        assert_eq!(s.start, Position::new(12, 0));
        assert_eq!(s.end, Position::new(21, 0));
    }

    #[test]
    fn test_parse_selection_single_line() {
        let s = parse_selection("7").unwrap();
        assert_eq!(s.start.line, 7);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_parse_selection_invalid() {
        assert!(parse_selection("a:b").is_err());
        assert!(parse_selection("9:3").is_err());
        assert!(parse_selection("-1").is_err());
    }

    #[test]
    fn test_parse_selection_max_line() {
        assert!(parse_selection("4294967295").is_err());
        assert!(parse_selection("0:4294967295").is_err());
        let s = parse_selection("4294967294").unwrap();
        assert_eq!(s.end, Position::new(u32::MAX, 0));
    }

    #[test]
    fn test_parse_tab_size() {
        assert_eq!(parse_tab_size("2"), Ok(2));
        assert!(parse_tab_size("0").is_err());
        assert!(parse_tab_size("two").is_err());
    }

    #[test]
    fn test_args_snapshot_subcommand() {
        let args = Args::parse_from([
            "codeframe",
            "snapshot",
            "--file",
            "src/lib.rs",
            "--selection",
            "3:9",
            "--tab-size",
            "2",
            "--pretty",
        ]);
        match args.command {
            Command::Snapshot { editor, pretty } => {
                assert_eq!(editor.file, PathBuf::from("src/lib.rs"));
                assert_eq!(editor.selection, Some(Selection::lines(3, 9)));
                assert_eq!(editor.tab_size, Some(2));
                assert!(editor.language.is_none());
                assert!(pretty);
            }
            _ => panic!("Expected Snapshot subcommand"),
        }
    }

    #[test]
    fn test_args_start_subcommand() {
        let args = Args::parse_from([
            "codeframe",
            "start",
            "--file",
            "main.py",
            "--language",
            "python",
            "-w",
            "/work",
            "-o",
            "/tmp/out.png",
        ]);
        match args.command {
            Command::Start { editor, output } => {
                assert_eq!(editor.language.as_deref(), Some("python"));
                assert_eq!(editor.workspace, Some(PathBuf::from("/work")));
                assert_eq!(output, Some(PathBuf::from("/tmp/out.png")));
            }
            _ => panic!("Expected Start subcommand"),
        }
    }

    #[test]
    fn test_args_global_options() {
        let args = Args::parse_from([
            "codeframe",
            "config",
            "show",
            "--config",
            "/tmp/config.toml",
            "--settings",
            "/tmp/settings.json",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/config.toml")));
        assert_eq!(args.settings, Some(PathBuf::from("/tmp/settings.json")));
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn test_args_html_defaults() {
        let args = Args::parse_from(["codeframe", "html", "webview/index.html"]);
        match args.command {
            Command::Html {
                template,
                csp_source,
            } => {
                assert_eq!(template, PathBuf::from("webview/index.html"));
                assert_eq!(csp_source, "'self'");
            }
            _ => panic!("Expected Html subcommand"),
        }
    }

    #[test]
    fn test_args_require_file() {
        assert!(Args::try_parse_from(["codeframe", "snapshot"]).is_err());
    }
}
