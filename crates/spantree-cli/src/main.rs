use anyhow::{Context, Result};
use indexmap::IndexMap;
use spantree_config::Config;
use spantree_engine::query::{Query, QueryGrammar};
use spantree_engine::{Node, render_tree};
use std::path::PathBuf;
use std::{env, process};

const USAGE: &str = "Usage:
  spantree-cli parse <query>
  spantree-cli discover [--config PATH] [FILES...]";

#[derive(Debug, PartialEq)]
enum Command {
    Parse(String),
    Discover {
        config: Option<PathBuf>,
        files: Vec<PathBuf>,
    },
}

fn parse_args(args: &[String]) -> Option<Command> {
    match args {
        [cmd, query] if cmd == "parse" => Some(Command::Parse(query.clone())),
        [cmd, rest @ ..] if cmd == "discover" => {
            let mut config = None;
            let mut files = vec![];
            let mut rest = rest.iter();
            while let Some(arg) = rest.next() {
                if arg == "--config" {
                    config = Some(PathBuf::from(rest.next()?));
                } else {
                    files.push(PathBuf::from(arg));
                }
            }
            Some(Command::Discover { config, files })
        }
        _ => None,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(command) = parse_args(args.get(1..).unwrap_or_default()) else {
        eprintln!("{USAGE}");
        process::exit(1);
    };

    match command {
        Command::Parse(query) => run_parse(&query),
        Command::Discover { config, files } => run_discover(config, files),
    }
}

fn run_parse(source: &str) -> Result<()> {
    // A config file is optional here; it only tunes the recursion limit.
    let config = Config::load()?.unwrap_or_default();
    let grammar = QueryGrammar::with_max_depth(config.engine.max_depth)?;

    let tokens = grammar.parse(source)?;
    println!("{}", render_tree(&tokens));

    let query = Query::compile_with(&grammar, source)?;
    println!("{}", render_tree(query.tree()));
    println!("canonical: {query}");
    Ok(())
}

fn run_discover(config_path: Option<PathBuf>, files: Vec<PathBuf>) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::config_path);
    let Some(config) = Config::load_from_path(&config_path)? else {
        eprintln!("Error: No config file found at {}", config_path.display());
        eprintln!("An ontology must be defined under [ontology] to run discover");
        process::exit(1);
    };

    let ontology = config.ontology.build()?;
    log::debug!("loaded ontology {ontology}");

    let files = if files.is_empty() {
        config.input_files()?
    } else {
        files
    };
    if files.is_empty() {
        eprintln!("Error: No input files given and none matched the configured inputs");
        eprintln!("{USAGE}");
        process::exit(1);
    }

    for file in files {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let found = ontology.discover(&[Node::new(content, None)])?;
        let flat = found.flatten(true);
        log::info!("{}: {} path(s) with matches", file.display(), flat.len());

        println!("== {} ==", file.display());
        print!("{}", format_matches(&flat));
    }
    Ok(())
}

/// One line per path: `words/long: 'text'@start..stop, ...`; the root is `.`.
fn format_matches(flat: &IndexMap<Vec<String>, Vec<Node>>) -> String {
    let mut out = String::new();
    for (path, nodes) in flat {
        let name = if path.is_empty() {
            ".".to_string()
        } else {
            path.join("/")
        };
        let items: Vec<String> = nodes
            .iter()
            .map(|n| format!("'{}'@{}..{}", n.text(), n.start(), n.stop()))
            .collect();
        out.push_str(&format!("{name}: {}\n", items.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spantree_engine::{Ontology, PatternRule};

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_parse_command() {
        assert_eq!(
            parse_args(&args(&["parse", "a&b"])),
            Some(Command::Parse("a&b".to_string()))
        );
        assert_eq!(parse_args(&args(&["parse"])), None);
        assert_eq!(parse_args(&args(&["parse", "a", "b"])), None);
    }

    #[test]
    fn parses_discover_command() {
        assert_eq!(
            parse_args(&args(&["discover", "a.txt", "--config", "c.toml", "b.txt"])),
            Some(Command::Discover {
                config: Some(PathBuf::from("c.toml")),
                files: vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
            })
        );
        assert_eq!(
            parse_args(&args(&["discover"])),
            Some(Command::Discover {
                config: None,
                files: vec![]
            })
        );
        assert_eq!(parse_args(&args(&["discover", "--config"])), None);
        assert_eq!(parse_args(&args(&[])), None);
    }

    #[test]
    fn formats_flattened_matches() {
        let ontology = Ontology::default()
            .with_rule(PatternRule::new(r"\d+", None).unwrap())
            .with_child(
                "words",
                Ontology::default().with_rule(PatternRule::new("[a-z]+", None).unwrap()),
            );
        let found = ontology.discover(&[Node::new("ab 12", None)]).unwrap();

        assert_eq!(
            format_matches(&found.flatten(false)),
            ".: '12'@3..5\nwords: 'ab'@0..2\n"
        );
    }
}
