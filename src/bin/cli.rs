//! FlintDB CLI
//!
//! Command-line interface for a FlintDB data directory. Results are printed
//! to stdout as JSON; logs go to stderr.

use clap::{Parser, Subcommand};
use flintdb::query::QueryBuilder;
use flintdb::{ColumnType, Config, Database, Direction, Operator, TableHandle, TableSchema, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// FlintDB CLI
#[derive(Parser, Debug)]
#[command(name = "flintdb")]
#[command(about = "Embedded file-backed table store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./flintdb_data")]
    data_dir: String,

    /// Extension of config and data files
    #[arg(long, default_value = "json")]
    extension: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a table
    Create {
        /// Table name
        table: String,

        /// Column declaration as name:type (repeatable)
        #[arg(short, long = "column", value_parser = parse_column, required = true)]
        columns: Vec<(String, ColumnType)>,
    },

    /// Remove a table and its files
    Remove {
        /// Table name
        table: String,
    },

    /// Print a table's columns
    Schema {
        /// Table name
        table: String,
    },

    /// Insert a record
    Insert {
        /// Table name
        table: String,

        /// Column assignment as column=value (repeatable)
        #[arg(short = 's', long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },

    /// Update columns of a record
    Update {
        /// Table name
        table: String,

        /// Record id
        id: u64,

        /// Column assignment as column=value (repeatable)
        #[arg(short = 's', long = "set", value_parser = parse_assignment, required = true)]
        values: Vec<(String, String)>,
    },

    /// Delete a record
    Delete {
        /// Table name
        table: String,

        /// Record id
        id: u64,
    },

    /// Query a table
    Query {
        /// Table name
        table: String,

        /// Condition as "column op literal", e.g. "age >= 18" (repeatable)
        #[arg(short = 'w', long = "where")]
        conditions: Vec<String>,

        /// Sort key as column[:asc|desc] (repeatable, first is primary)
        #[arg(short, long = "order-by")]
        order_by: Vec<String>,

        /// Maximum number of records
        #[arg(short, long)]
        limit: Option<usize>,

        /// Records to skip after sorting
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Key the output by this column
        #[arg(long)]
        key: Option<String>,

        /// Output only this column
        #[arg(long)]
        value: Option<String>,

        /// Print only the number of matching records
        #[arg(long)]
        count: bool,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,flintdb=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("FlintDB CLI v{}", flintdb::VERSION);
    tracing::debug!("Data directory: {}", args.data_dir);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .file_extension(&args.extension)
        .build();

    let db = match Database::open(config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open data directory: {}", e);
            std::process::exit(1);
        }
    };

    match run(&db, args.command) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Execute one subcommand, returning the JSON to print
fn run(db: &Database, command: Commands) -> Result<String, Box<dyn std::error::Error>> {
    let output = match command {
        Commands::Create { table, columns } => {
            let handle = db.create(&table, columns)?;
            serde_json::to_string_pretty(&describe(&handle.schema()?))?
        }
        Commands::Remove { table } => {
            db.remove(&table)?;
            serde_json::json!({ "removed": table }).to_string()
        }
        Commands::Schema { table } => {
            let schema = db.table(&table)?.schema()?;
            serde_json::to_string_pretty(&describe(&schema))?
        }
        Commands::Insert { table, values } => {
            let handle = db.table(&table)?;
            let values = typed_values(&handle.schema()?, values)?;
            serde_json::to_string_pretty(&handle.insert(values)?)?
        }
        Commands::Update { table, id, values } => {
            let handle = db.table(&table)?;
            let values = typed_values(&handle.schema()?, values)?;
            serde_json::to_string_pretty(&handle.update(id, values)?)?
        }
        Commands::Delete { table, id } => {
            let record = db.table(&table)?.delete(id)?;
            serde_json::to_string_pretty(&record)?
        }
        Commands::Query {
            table,
            conditions,
            order_by,
            limit,
            offset,
            key,
            value,
            count,
        } => {
            let handle = db.table(&table)?;
            let query = build_query(&handle, &conditions, &order_by, limit, offset)?;
            let results = query.find_all()?;

            if count {
                results.count().to_string()
            } else {
                results.as_array(key.as_deref(), value.as_deref())?.to_json()?
            }
        }
    };
    Ok(output)
}

fn build_query(
    handle: &TableHandle,
    conditions: &[String],
    order_by: &[String],
    limit: Option<usize>,
    offset: usize,
) -> Result<QueryBuilder, Box<dyn std::error::Error>> {
    let schema = handle.schema()?;
    let mut query = handle.query().offset(offset);

    for condition in conditions {
        let (column, operator, literal) = parse_condition(condition)?;
        let value = match schema.column_type(&column) {
            Some(ty) => Value::parse_as(&literal, ty)?,
            None => Value::infer(&literal),
        };
        query = query.filter(column, operator, value);
    }

    for key in order_by {
        let (column, direction) = match key.split_once(':') {
            Some((column, direction)) => (column, direction.parse::<Direction>()?),
            None => (key.as_str(), Direction::Asc),
        };
        query = query.order_by(column, direction);
    }

    if let Some(n) = limit {
        query = query.limit(n);
    }
    Ok(query)
}

fn describe(schema: &TableSchema) -> serde_json::Value {
    let columns: Vec<serde_json::Value> = schema
        .columns()
        .iter()
        .map(|c| serde_json::json!({ "name": c.name, "type": c.column_type.type_name() }))
        .collect();
    serde_json::json!({ "table": schema.name(), "columns": columns })
}

fn typed_values(
    schema: &TableSchema,
    raw: Vec<(String, String)>,
) -> Result<Vec<(String, Value)>, Box<dyn std::error::Error>> {
    let mut values = Vec::with_capacity(raw.len());
    for (column, text) in raw {
        let value = match schema.column_type(&column) {
            Some(ty) => Value::parse_as(&text, ty)?,
            None => Value::infer(&text),
        };
        values.push((column, value));
    }
    Ok(values)
}

// =============================================================================
// Argument Parsers
// =============================================================================

fn parse_column(s: &str) -> Result<(String, ColumnType), String> {
    let (name, ty) = s
        .split_once(':')
        .ok_or_else(|| format!("expected name:type, got \"{}\"", s))?;
    let ty = ty.parse::<ColumnType>().map_err(|e| e.to_string())?;
    Ok((name.to_string(), ty))
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got \"{}\"", s))?;
    Ok((column.to_string(), value.to_string()))
}

/// Split "column op literal" at the leftmost operator
///
/// At any position a two-character operator wins over its one-character
/// prefix, so `a >= 1` is `>=` and `tag < a=b` compares against `a=b`.
fn parse_condition(s: &str) -> Result<(String, Operator, String), String> {
    const OPERATORS: [&str; 8] = [">=", "<=", "!=", "<>", "==", "=", ">", "<"];

    for (position, _) in s.char_indices() {
        let rest = &s[position..];
        if let Some(symbol) = OPERATORS.iter().find(|symbol| rest.starts_with(**symbol)) {
            let column = s[..position].trim();
            if column.is_empty() {
                return Err(format!("missing column before \"{}\" in \"{}\"", symbol, s));
            }
            let operator = symbol.parse::<Operator>().map_err(|e| e.to_string())?;
            let literal = rest[symbol.len()..].trim().trim_matches('"').to_string();
            return Ok((column.to_string(), operator, literal));
        }
    }
    Err(format!("expected \"column op literal\", got \"{}\"", s))
}
