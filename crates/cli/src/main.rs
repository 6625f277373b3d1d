use api_shared::AdminGate;
use clap::{Parser, Subcommand};
use jsonviz_core::{
    annotations::build_overlay,
    format::format_json,
    schema::{load_schema, CompiledSchema},
    share::{
        build_link, decode_share_param, email_share_link, resolve_shared, whatsapp_share_link,
        MemoryRecordCache, ShareKind, SharedParams,
    },
    stats::compute_stats,
    time::format_date,
    validation::{parse_document, validate},
    view::{cards, flatten, patient_summaries},
    ChartStyle, CoreConfig, Highlight, JsonNode, ValidationOutcome,
};
use records::{Records, TestRecord};
use report_store::{Credential, ReportClient};
use std::path::{Path, PathBuf};

/// Exit status when `validate` or `format` rejects a document.
const REJECTED: i32 = 1;

#[derive(Parser)]
#[command(name = "jsonviz")]
#[command(about = "JSON validation and visualisation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON file
    Validate {
        file: PathBuf,
        /// JSON Schema file (defaults to the configured or built-in schema)
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Pretty-print a JSON file with 2-space indentation
    Format {
        file: PathBuf,
        /// Rewrite the file in place
        #[arg(long)]
        write: bool,
    },
    /// Statistics for a series of numbers
    Stats {
        #[arg(allow_negative_numbers = true, required = true)]
        values: Vec<f64>,
    },
    /// Chart overlay for one test of a patient records file
    Annotate {
        file: PathBuf,
        /// Patient index
        #[arg(long, default_value_t = 0)]
        patient: usize,
        /// Test index
        #[arg(long, default_value_t = 0)]
        test: usize,
        /// none | anomalies
        #[arg(long, default_value = "none")]
        highlight: Highlight,
        /// smooth | stepped | linear
        #[arg(long, default_value = "smooth")]
        chart_type: ChartStyle,
        /// Index of another test of the same patient to compare with
        #[arg(long)]
        compare: Option<usize>,
    },
    /// Card view of a JSON file
    Cards { file: PathBuf },
    /// Flattened key/value view of a JSON file
    Table { file: PathBuf },
    /// Patient list of a patient records file
    Patients { file: PathBuf },
    /// Build share links for a record file
    Share {
        file: PathBuf,
        /// Base URL of the viewer
        #[arg(long)]
        base: String,
        /// data | qr | identity
        #[arg(long, default_value = "data")]
        kind: ShareKind,
    },
    /// Decode a `data` or `qr` share parameter
    DecodeShare {
        param: String,
        /// Patient records file to resolve a `qr` payload against
        #[arg(long)]
        records: Option<PathBuf>,
    },
    /// Stored reports
    Reports {
        #[command(subcommand)]
        command: ReportsCommand,
    },
    /// Encrypt a gist token for ENCRYPTED_GITHUB_TOKEN
    EncryptToken {
        token: String,
        /// Passphrase, later supplied as TOKEN_KEY
        #[arg(long)]
        key: String,
    },
}

#[derive(Subcommand)]
enum ReportsCommand {
    /// List every stored report (admin)
    List {
        #[arg(long)]
        password: String,
    },
    /// Fetch one stored report
    Get { id: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate { file, schema }) => {
            let text = read(&file)?;
            let schema = match schema {
                Some(path) => CompiledSchema::compile(&load_schema(&path)?)?,
                None => CoreConfig::from_env()?.compiled_schema()?,
            };
            if !report_validation(&file, &validate(&text, Some(&schema))) {
                std::process::exit(REJECTED);
            }
        }
        Some(Commands::Format { file, write }) => {
            let Some(formatted) = formatted_or_report(&read(&file)?) else {
                std::process::exit(REJECTED);
            };
            if write {
                std::fs::write(&file, formatted)?;
                println!("Formatted {}", file.display());
            } else {
                println!("{formatted}");
            }
        }
        Some(Commands::Stats { values }) => match compute_stats(&values) {
            Some(stats) => {
                println!("Mean: {}", stats.mean);
                println!("Median: {}", stats.median);
                println!("Min: {}", stats.min);
                println!("Max: {}", stats.max);
                println!("Std Dev: {}", stats.std_dev);
                println!("Avg Rate of Change: {}", stats.avg_rate_of_change);
                println!("Anomalies: {:?}", stats.anomalies);
            }
            None => println!("No data points."),
        },
        Some(Commands::Annotate {
            file,
            patient,
            test,
            highlight,
            chart_type,
            compare,
        }) => {
            let records = Records::parse(&read(&file)?)?;
            let tests = &records
                .get(patient)
                .ok_or_else(|| format!("no patient at index {patient}"))?
                .cmg_tests;
            let chosen = pick_test(tests, test)?;
            let compare_with = compare.map(|i| pick_test(tests, i)).transpose()?;

            println!("Test date: {}", format_date(chosen.created_at.as_deref()));
            let overlay = build_overlay(chosen, highlight, chart_type, compare_with);
            println!("{}", serde_json::to_string_pretty(&overlay)?);
        }
        Some(Commands::Cards { file }) => {
            let document = parse_document(&read(&file)?)?;
            for card in cards(&JsonNode::from(&document)) {
                println!("{} [{}]", card.title, card.badge);
                if let Some(value) = &card.value {
                    println!("  {value}");
                }
                for entry in &card.entries {
                    println!("  {}: {}", entry.label, entry.value);
                }
                if card.more > 0 {
                    println!("  +{} more...", card.more);
                }
            }
        }
        Some(Commands::Table { file }) => {
            let document = parse_document(&read(&file)?)?;
            for row in flatten(&JsonNode::from(&document)) {
                println!("{} = {}", row.key, row.display);
            }
        }
        Some(Commands::Patients { file }) => {
            let records = Records::parse(&read(&file)?)?;
            for summary in patient_summaries(&records) {
                println!(
                    "ID: {}, Name: {}, Tests: {}",
                    summary.patient_id.as_deref().unwrap_or("N/A"),
                    summary.name.as_deref().unwrap_or("N/A"),
                    summary.test_count
                );
                for test in &summary.tests {
                    let partial = if test.truncated { " (partial)" } else { "" };
                    println!(
                        "  #{} {}: {} points{}, {} notes",
                        test.index, test.date, test.points, partial, test.notes
                    );
                }
            }
        }
        Some(Commands::Share { file, base, kind }) => {
            let record = parse_document(&read(&file)?)?;
            let url = build_link(kind, &base, &record)?;
            println!("{url}");
            println!("Email: {}", email_share_link(&url));
            println!("WhatsApp: {}", whatsapp_share_link(&url));
        }
        Some(Commands::DecodeShare {
            param,
            records: None,
        }) => {
            let value = decode_share_param(&param)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Some(Commands::DecodeShare {
            param,
            records: Some(path),
        }) => {
            let cache = MemoryRecordCache::from_document(&parse_document(&read(&path)?)?);
            let params = SharedParams {
                qr: Some(param),
                ..SharedParams::default()
            };
            let resolved = resolve_shared(&params, &cache)?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Some(Commands::Reports { command }) => {
            let cfg = CoreConfig::from_env()?;
            let client = ReportClient::from_config(&cfg)?
                .ok_or("no report store configured (set JSONVIZ_BACKEND_URL or JSONVIZ_GIST_API)")?;
            let runtime = tokio::runtime::Runtime::new()?;

            let documents = match command {
                ReportsCommand::List { password } => {
                    AdminGate::new(cfg.admin_password()).check(&password)?;
                    runtime.block_on(client.list_reports())?
                }
                ReportsCommand::Get { id } => runtime.block_on(client.get_report(&id))?,
            };
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
        Some(Commands::EncryptToken { token, key }) => {
            println!("{}", Credential::encrypt(&token, &key)?);
        }
        None => {
            println!("Use 'jsonviz --help' for commands");
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()).into())
}

/// Print the outcome; `false` when the document was rejected.
fn report_validation(file: &Path, outcome: &ValidationOutcome) -> bool {
    if outcome.valid {
        println!("{} is valid", file.display());
    } else {
        for error in &outcome.errors {
            eprintln!("{}", error.full_message());
        }
    }
    outcome.valid
}

/// Formatted text, or `None` after printing the located syntax error.
fn formatted_or_report(text: &str) -> Option<String> {
    format_json(text)
        .map_err(|e| eprintln!("{}", e.render()))
        .ok()
}

fn pick_test(tests: &[TestRecord], index: usize) -> Result<&TestRecord, String> {
    tests
        .get(index)
        .ok_or_else(|| format!("no test at index {index}"))
}
