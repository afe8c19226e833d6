use anyhow::{Context, Result};
use markup_loom_config::Config;
use markup_loom_engine::syntaxes::{asciidoc, markdown};
use markup_loom_engine::{RulesSet, State, Value, props};
use std::{env, path::PathBuf, process};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Markdown,
    Asciidoc,
    Json,
}

impl Output {
    fn parse(mode: &str) -> Option<Self> {
        match mode {
            "markdown" | "md" => Some(Output::Markdown),
            "asciidoc" | "adoc" => Some(Output::Asciidoc),
            "json" => Some(Output::Json),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    output: Output,
    input: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Option<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            config = Some(PathBuf::from(iter.next()?));
        } else {
            positional.push(arg);
        }
    }
    match positional.as_slice() {
        [mode, input] => Some(Args {
            output: Output::parse(mode)?,
            input: PathBuf::from(input),
            config,
        }),
        _ => None,
    }
}

/// A state for `rules` carrying the configured properties.
fn configure(rules: RulesSet, config: &Config) -> State {
    State::create(rules)
        .with_prop(props::TEMPLATE, Value::Bool(config.template))
        .with_tags(props::UNENDING_TAGS, config.unending_tags.iter().cloned())
        .with_tags(props::VOID_TAGS, config.void_tags.iter().cloned())
        .with_prop(props::MAX_DEPTH, Value::Number(config.max_depth as f64))
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let loaded = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if loaded.is_none() {
        log::debug!("no config file found, using defaults");
    }
    Ok(loaded.unwrap_or_default())
}

fn convert(args: &Args, config: &Config) -> Result<String> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let document = configure(markdown::rules(), config)
        .deserialize_to_document(&text)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    log::info!(
        "parsed {} top-level nodes from {}",
        document.nodes.len(),
        args.input.display()
    );

    let output = match args.output {
        Output::Markdown => configure(markdown::rules(), config).serialize_document(&document)?,
        Output::Asciidoc => configure(asciidoc::rules(), config).serialize_document(&document)?,
        Output::Json => serde_json::to_string_pretty(&document)?,
    };
    Ok(output)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args
        .first()
        .cloned()
        .unwrap_or_else(|| "markup-loom".to_string());

    let Some(parsed) = parse_args(args.get(1..).unwrap_or_default()) else {
        eprintln!("Usage: {program} <markdown|asciidoc|json> <file> [--config <path>]");
        eprintln!(
            "Settings are read from {} unless --config is given",
            Config::config_path().display()
        );
        process::exit(2);
    };

    let config = load_config(parsed.config.as_ref())?;
    let output = convert(&parsed, &config)?;
    print!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_mode_and_file() {
        let parsed = parse_args(&args(&["json", "doc.md"])).unwrap();
        assert_eq!(parsed.output, Output::Json);
        assert_eq!(parsed.input, PathBuf::from("doc.md"));
        assert_eq!(parsed.config, None);
    }

    #[test]
    fn config_flag_may_come_anywhere() {
        let parsed = parse_args(&args(&["--config", "c.toml", "asciidoc", "doc.md"])).unwrap();
        assert_eq!(parsed.output, Output::Asciidoc);
        assert_eq!(parsed.config, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn rejects_unknown_modes_and_missing_arguments() {
        assert_eq!(parse_args(&args(&["html", "doc.md"])), None);
        assert_eq!(parse_args(&args(&["json"])), None);
        assert_eq!(parse_args(&args(&["json", "doc.md", "--config"])), None);
    }

    #[test]
    fn configured_state_carries_properties() {
        let config = Config {
            template: false,
            max_depth: 4,
            ..Config::default()
        };
        let state = configure(markdown::rules(), &config);
        assert!(!state.template_enabled());
        assert_eq!(state.max_depth(), 4);
        assert!(state.has_tag(props::UNENDING_TAGS, "else"));
        assert!(state.has_tag(props::VOID_TAGS, "include"));
    }

    #[test]
    fn converts_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "# Title\n\n{% if a %}A{% else %}B{% endif %}").unwrap();

        let config = Config::default();
        let run = |output| {
            convert(
                &Args {
                    output,
                    input: input.clone(),
                    config: None,
                },
                &config,
            )
            .unwrap()
        };

        assert_eq!(
            run(Output::Markdown),
            "# Title\n\n{% if a %}A{% else %}B{% endif %}"
        );
        assert_eq!(
            run(Output::Asciidoc),
            "= Title\n\n{% if a %}A{% else %}B{% endif %}"
        );
        let json: serde_json::Value = serde_json::from_str(&run(Output::Json)).unwrap();
        assert_eq!(json["nodes"][0]["type"], "heading_1");
        assert_eq!(json["nodes"][1]["object"], "block");
        assert_eq!(json["nodes"][1]["data"]["args"][0], "a");
    }
}
