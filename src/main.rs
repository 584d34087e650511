mod cli;

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use html::{Document, ParseConfig, ReadyState};
use query::{Collection, Object, Query, Value};

use crate::cli::{Cli, OutputMode};

#[derive(Debug)]
enum CliError {
    Read {
        source: String,
        error: io::Error,
    },
    Write(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Read { source, error } => write!(f, "failed to read {source}: {error}"),
            CliError::Write(error) => write!(f, "failed to write output: {error}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Read { error, .. } | CliError::Write(error) => Some(error),
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn read_input(cli: &Cli) -> Result<String, CliError> {
    match &cli.file {
        Some(path) => fs::read_to_string(path).map_err(|error| CliError::Read {
            source: path.display().to_string(),
            error,
        }),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|error| CliError::Read {
                    source: "stdin".to_string(),
                    error,
                })?;
            Ok(input)
        }
    }
}

fn context_value(cli: &Cli) -> Option<Value> {
    if !cli.set.is_empty() {
        let bag: Object = cli.set.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        return Some(bag.into());
    }
    cli.context.as_deref().map(Value::from)
}

fn write_collection(
    out: &mut impl Write,
    doc: &Document,
    collection: &Collection,
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Count => writeln!(out, "{}", collection.len()),
        OutputMode::Html => collection
            .iter()
            .try_for_each(|node| writeln!(out, "{}", doc.outer_html(node))),
        OutputMode::Text => collection
            .iter()
            .try_for_each(|node| writeln!(out, "{}", doc.text_content(node))),
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let input = read_input(cli)?;
    let config = ParseConfig {
        coalesce_text: !cli.no_coalesce,
        keep_comments: !cli.no_comments,
    };
    let mut document = Document::parse_with_config(&input, config);
    document.set_ready_state(ReadyState::Complete);
    log::debug!("parsed {} byte(s) into {} node(s)", input.len(), document.node_count());

    let mut dom = Query::new(document);
    let context = context_value(cli);
    let collection = dom.resolve(cli.selector.as_str(), context.as_ref());
    log::debug!(
        "{:?} resolved to {} node(s), selector {:?}",
        cli.selector,
        collection.len(),
        collection.selector()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_collection(&mut out, dom.document(), &collection, cli.output).map_err(CliError::Write)?;
    out.flush().map_err(CliError::Write)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("domquery: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(html: &str, selector: &str, mode: OutputMode) -> String {
        let mut q = Query::new(Document::parse(html));
        let c = q.select(selector);
        let mut out = Vec::new();
        write_collection(&mut out, q.document(), &c, mode).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_each_output_mode() {
        let html = "<ul><li>a</li><li>b <i>c</i></li></ul>";
        assert_eq!(render(html, "li", OutputMode::Count), "2\n");
        assert_eq!(render(html, "li", OutputMode::Text), "a\nb c\n");
        assert_eq!(
            render(html, "li", OutputMode::Html),
            "<li>a</li>\n<li>b <i>c</i></li>\n"
        );
    }

    #[test]
    fn set_flags_become_a_property_bag() {
        let cli = Cli::try_parse_from(["domquery", "<p>", "--set", "text=hi", "--set", "id=x"])
            .unwrap();
        let Some(Value::Object(bag)) = context_value(&cli) else {
            panic!("expected a property bag");
        };
        assert_eq!(bag.get("text"), Some(&Value::from("hi")));
        assert_eq!(bag.get("id"), Some(&Value::from("x")));
    }
}
