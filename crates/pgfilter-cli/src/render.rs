use crate::cli::{SelectArgs, SpecInput, WhereArgs};
use crate::config::{ProjectConfig, TableConfig};
use anyhow::Context;
use pgfilter::{Fields, FieldsSpecification, Value};
use serde::Serialize;
use std::io::Read;

#[derive(Debug, Serialize)]
struct Rendered<'a> {
    sql: &'a str,
    args: &'a [Value],
}

fn read_input(input: &SpecInput) -> anyhow::Result<String> {
    match input {
        SpecInput::Stdin => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read specification from stdin")?;
            Ok(raw)
        }
        SpecInput::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read specification {}", path.display())),
    }
}

/// Parse a `where` document: a bare field array or a full specification.
fn parse_spec(raw: &str) -> anyhow::Result<FieldsSpecification> {
    if raw.trim_start().starts_with('[') {
        let fields: Fields =
            serde_json::from_str(raw).context("failed to parse field array JSON")?;
        return Ok(FieldsSpecification::new(fields));
    }
    serde_json::from_str(raw).context("failed to parse specification JSON")
}

fn to_json(sql: &str, args: &[Value]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&Rendered { sql, args })?)
}

pub fn run_where(args: WhereArgs) -> anyhow::Result<()> {
    let spec = parse_spec(&read_input(&args.input)?)?;
    println!("{}", render_where(&spec)?);
    Ok(())
}

fn render_where(spec: &FieldsSpecification) -> anyhow::Result<String> {
    let clause = pgfilter::build_where(&spec.filters).context("failed to render WHERE clause")?;
    to_json(clause.sql(), clause.args())
}

pub fn run_select(args: SelectArgs) -> anyhow::Result<()> {
    let spec = parse_spec(&read_input(&args.input)?)?;
    let config = args.config.clone().map(ProjectConfig::load).transpose()?;
    println!("{}", render_select(&args, config.as_ref(), spec)?);
    Ok(())
}

fn render_select(
    args: &SelectArgs,
    config: Option<&ProjectConfig>,
    mut spec: FieldsSpecification,
) -> anyhow::Result<String> {
    let table = config.map(|c| c.table(&args.table)).transpose()?;

    if let (Some(config), Some(table)) = (config, table) {
        validate(&spec, table).with_context(|| {
            format!(
                "specification rejected by {} for table {}",
                config.path().display(),
                args.table
            )
        })?;
        if spec.pagination.max_limit == 0
            && let Some(max_limit) = config.file.defaults.max_limit
        {
            spec.pagination.max_limit = max_limit;
        }
    }

    let columns: &[String] = match (&args.columns, table) {
        (Some(columns), _) => columns,
        (None, Some(table)) if !table.select.is_empty() => &table.select,
        _ => anyhow::bail!(
            "no columns for table {}: pass --columns or set tables.{}.select",
            args.table,
            args.table
        ),
    };

    let select = pgfilter::build_select_fields(&args.table, columns)?;
    let query = spec
        .build_query(&select)
        .context("failed to render SELECT")?;

    tracing::debug!(table = %args.table, sql = %query.sql(), "rendered select");
    to_json(query.sql(), query.args())
}

fn validate(spec: &FieldsSpecification, table: &TableConfig) -> pgfilter::FilterResult<()> {
    spec.validate(&table.columns[..], table.sources.as_deref())
}
