use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Where,
    Select,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Where(WhereArgs),
    Select(SelectArgs),
}

impl Command {
    pub fn verbose(&self) -> bool {
        match self {
            Command::Help(_) => false,
            Command::Where(args) => args.verbose,
            Command::Select(args) => args.verbose,
        }
    }
}

/// Where the JSON specification is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecInput {
    Stdin,
    File(PathBuf),
}

impl SpecInput {
    fn parse(token: &str) -> Self {
        if token == "-" {
            SpecInput::Stdin
        } else {
            SpecInput::File(PathBuf::from(token))
        }
    }
}

#[derive(Debug, Clone)]
pub struct WhereArgs {
    pub input: SpecInput,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct SelectArgs {
    pub table: String,
    pub config: Option<PathBuf>,
    pub columns: Option<Vec<String>>,
    pub input: SpecInput,
    pub verbose: bool,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "where" => parse_where(it.map(|s| s.as_str())),
        "select" => parse_select(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_where<'a>(it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut input: Option<SpecInput> = None;
    let mut verbose = false;

    for token in it {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Where)),
            "-v" | "--verbose" => verbose = true,
            other if other.starts_with('-') && other != "-" => {
                anyhow::bail!("unknown argument: {other}")
            }
            other => {
                if input.is_some() {
                    anyhow::bail!("unexpected argument: {other}");
                }
                input = Some(SpecInput::parse(other));
            }
        }
    }

    let Some(input) = input else {
        anyhow::bail!("missing specification: expected a JSON file or `-` for stdin");
    };

    Ok(Command::Where(WhereArgs { input, verbose }))
}

fn parse_select<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut table: Option<String> = None;
    let mut config: Option<PathBuf> = None;
    let mut columns: Option<Vec<String>> = None;
    let mut input: Option<SpecInput> = None;
    let mut verbose = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Select)),
            "-v" | "--verbose" => verbose = true,
            "--table" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--table requires a value");
                };
                table = Some(v.to_string());
            }
            _ if token.starts_with("--table=") => {
                table = Some(token.trim_start_matches("--table=").to_string());
            }
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--config=") => {
                config = Some(PathBuf::from(token.trim_start_matches("--config=")));
            }
            "--columns" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--columns requires a value");
                };
                columns = Some(parse_columns(v)?);
            }
            _ if token.starts_with("--columns=") => {
                columns = Some(parse_columns(token.trim_start_matches("--columns="))?);
            }
            other if other.starts_with('-') && other != "-" => {
                anyhow::bail!("unknown argument: {other}")
            }
            other => {
                if input.is_some() {
                    anyhow::bail!("unexpected argument: {other}");
                }
                input = Some(SpecInput::parse(other));
            }
        }
    }

    let Some(table) = table else {
        anyhow::bail!("--table is required");
    };
    let Some(input) = input else {
        anyhow::bail!("missing specification: expected a JSON file or `-` for stdin");
    };

    Ok(Command::Select(SelectArgs {
        table,
        config,
        columns,
        input,
        verbose,
    }))
}

fn parse_columns(v: &str) -> anyhow::Result<Vec<String>> {
    let parsed = split_csv(v);
    if parsed.is_empty() {
        anyhow::bail!("--columns must not be empty");
    }
    Ok(parsed)
}

fn split_csv(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
pgfilter - render filter specifications into PostgreSQL

USAGE:
  pgfilter <COMMAND> [OPTIONS]

COMMANDS:
  where         Render the WHERE clause of a specification
  select        Render a full SELECT for a table
  help          Print this help

Run `pgfilter <command> --help` for more."
            );
        }
        HelpTopic::Where => {
            println!(
                "\
USAGE:
  pgfilter where [OPTIONS] <SPEC>

ARGS:
  <SPEC>                JSON file with a field array or a full specification, `-` for stdin

OPTIONS:
  -v, --verbose         Log rendering details to stderr
  -h, --help            Print help

OUTPUT:
  {{\"sql\": \"WHERE ...\", \"args\": [...]}}"
            );
        }
        HelpTopic::Select => {
            println!(
                "\
USAGE:
  pgfilter select --table <TABLE> [OPTIONS] <SPEC>

ARGS:
  <SPEC>                JSON specification file, `-` for stdin

OPTIONS:
  --table <TABLE>       Table to select from
  --config <FILE>       pgfilter.toml with per-table allow-lists and columns
  --columns <A,B,...>   Columns to select (overrides tables.<TABLE>.select)
  -v, --verbose         Log rendering details to stderr
  -h, --help            Print help

OUTPUT:
  {{\"sql\": \"SELECT ... WHERE ... ORDER BY ... LIMIT ... OFFSET ...\", \"args\": [...]}}"
            );
        }
    }
}
