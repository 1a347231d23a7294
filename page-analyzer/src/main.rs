use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use page_analyzer::config::Settings;
use page_inspector::PageInspector;
use std::io::Write;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use urls_sqlite::Db;

fn rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| String::new())
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json, Csv }

#[derive(Debug, Parser)]
#[command(name = "page-analyzer", version, about = "Track sites and record their status, title, h1 and description")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./page-analyzer.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Run the web application
    Serve {
        /// Listen address; overrides BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },
    /// Create or upgrade the database schema
    Migrate,
    /// Fetch one URL and print what a check would record (nothing is stored)
    Inspect {
        url: String,
        /// Request timeout in milliseconds; overrides FETCH_TIMEOUT_MS
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// List tracked sites with their latest check
    List {
        /// Output format: text, json (one object per line) or csv
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    page_analyzer::init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Version => {
            println!("page-analyzer {}", analyzer_core::version());
        }
        Commands::Serve { bind } => {
            let mut settings = Settings::load(cli.config.as_deref())?;
            if let Some(b) = bind {
                settings.bind = b;
            }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(page_analyzer::serve(settings))?;
        }
        Commands::Migrate => {
            let settings = Settings::load(cli.config.as_deref())?;
            Db::open_or_create(&settings.database_path)?;
            println!("database ready at {}", settings.database_path.display());
        }
        Commands::Inspect { url, timeout_ms } => {
            let mut settings = Settings::load(cli.config.as_deref())?;
            if let Some(t) = timeout_ms {
                settings.fetch_timeout_ms = t;
            }
            let canonical = analyzer_core::normalize(&url)?;
            let inspector = PageInspector::new(&page_analyzer::inspect_options(&settings))?;
            let rt = tokio::runtime::Runtime::new()?;
            let snap = rt.block_on(inspector.inspect(&canonical))?;
            let report = page_analyzer::InspectReport { url: canonical.as_str(), snapshot: snap };
            println!("{}", serde_json::to_string(&report)?);
        }
        Commands::List { format } => {
            let settings = Settings::load(cli.config.as_deref())?;
            let db = Db::open_or_create(&settings.database_path)?;
            let urls = db.list_urls()?;
            let stdout = std::io::stdout();
            match format {
                OutputFormat::Text => {
                    let mut w = std::io::BufWriter::new(stdout.lock());
                    for u in urls {
                        writeln!(
                            w,
                            "{}\t{}\t{}\t{}",
                            u.id,
                            u.name,
                            u.last_check_at.map(rfc3339).unwrap_or_else(|| "-".into()),
                            u.last_status.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                        )?;
                    }
                    w.flush()?;
                }
                OutputFormat::Json => {
                    let mut w = std::io::BufWriter::new(stdout.lock());
                    for u in urls {
                        let obj = serde_json::json!({
                            "id": u.id,
                            "name": u.name,
                            "created_at": rfc3339(u.created_at),
                            "last_check_at": u.last_check_at.map(rfc3339),
                            "last_status": u.last_status,
                        });
                        writeln!(w, "{}", serde_json::to_string(&obj)?)?;
                    }
                    w.flush()?;
                }
                OutputFormat::Csv => {
                    let mut wtr = csv::Writer::from_writer(stdout.lock());
                    wtr.write_record(["id", "name", "created_at", "last_check_at", "last_status"])?;
                    for u in urls {
                        wtr.write_record([
                            u.id.to_string(),
                            u.name,
                            rfc3339(u.created_at),
                            u.last_check_at.map(rfc3339).unwrap_or_default(),
                            u.last_status.map(|s| s.to_string()).unwrap_or_default(),
                        ])?;
                    }
                    wtr.flush()?;
                }
            }
        }
    }
    Ok(())
}
