use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Outer markup of every node, one per line
    #[default]
    Html,
    /// Text content of every node, one per line
    Text,
    /// Number of nodes only
    Count,
}

#[derive(Debug, Parser)]
#[command(name = "domquery", bin_name = "domquery")]
#[command(about = "Resolve a CSS selector or HTML fragment against an HTML document")]
#[command(after_help = r#"EXAMPLES:
  domquery 'ul > li.item' page.html
  domquery --context '#main' a page.html --output count
  domquery '<tr><td>cell</td></tr>' --set class=row --set text=hi < page.html"#)]
pub struct Cli {
    /// CSS selector, or markup starting with `<` to build a fragment
    pub selector: String,

    /// HTML document to load (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Scope the query to the nodes matching this selector
    #[arg(short, long, value_name = "SELECTOR", conflicts_with = "set")]
    pub context: Option<String>,

    /// Property applied to a built fragment (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub set: Vec<(String, String)>,

    /// What to print for the resolved collection
    #[arg(short, long, value_enum, default_value_t = OutputMode::Html)]
    pub output: OutputMode,

    /// Drop comments while parsing
    #[arg(long)]
    pub no_comments: bool,

    /// Keep adjacent text runs as separate nodes
    #[arg(long)]
    pub no_coalesce: bool,

    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
