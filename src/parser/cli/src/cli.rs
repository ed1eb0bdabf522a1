use std::error::Error;
use std::fmt::Write as _;
use std::io::Read as _;

use clap::{Arg, ArgAction, Command};
use serde::Serialize;
use serde_json::Value;
use signreview::encodings::SupportedEncodings;
use signreview::{FormatKey, ViewFormat};
use signreview_tezos::payload::operation_branch;
use signreview_tezos::{
    Address, AssetExpense, AssetRegistry, DecodeFault, ExpenseAsset, ExpenseRecord,
    OperationReview, RawPayloadKind, ReviewOptions, ReviewView, TezosSigningRequest,
    review_request,
};
use tracing::info;

use crate::logging::{LogFormat, init_logging};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Everything needed to review one request, besides the request itself.
#[derive(Debug, Clone)]
pub struct ReviewArgs {
    pub account: String,
    pub view: Option<String>,
    pub output: OutputFormat,
    pub encoding: SupportedEncodings,
    pub options: ReviewOptions,
    pub debug: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewOutput<'a> {
    kind: &'static str,
    formats: &'a [ViewFormat],
    active: Option<FormatKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload_kind: Option<RawPayloadKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fault: Option<&'a DecodeFault>,
    view: Value,
}

/// Reviews a request given as JSON and renders the selected view.
pub fn review_and_render(
    request_json: &str,
    registry_json: Option<&str>,
    args: &ReviewArgs,
) -> Result<String, Box<dyn Error>> {
    let account = Address::parse(&args.account)?;
    let registry = match registry_json {
        Some(json) => AssetRegistry::from_json(json)?,
        None => AssetRegistry::new(),
    };
    let request: TezosSigningRequest = serde_json::from_str(request_json)?;

    let mut review = review_request(&request, &account, &registry, &args.options);
    if let Some(view) = &args.view {
        review.select_str(view)?;
    }
    info!(
        kind = %review.kind(),
        expenses = review.expense_count(),
        tokens = registry.len(),
        "request reviewed"
    );

    match args.output {
        OutputFormat::Json => render_json(&review, args.encoding),
        OutputFormat::Text => render_text(&review, &request, args),
    }
}

fn render_json(
    review: &OperationReview,
    encoding: SupportedEncodings,
) -> Result<String, Box<dyn Error>> {
    let view = match review.active_view() {
        Some(ReviewView::Preview(records)) => serde_json::to_value(records)?,
        Some(ReviewView::RawOperations(operations)) => serde_json::to_value(operations)?,
        Some(ReviewView::RawBytes(bytes)) => Value::String(encoding.encode(bytes)),
        None => Value::Null,
    };
    let output = ReviewOutput {
        kind: review.kind().as_str(),
        formats: review.formats(),
        active: review.active_format().map(|format| format.key),
        payload_kind: review.payload_kind(),
        fault: review.fault(),
        view,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn render_text(
    review: &OperationReview,
    request: &TezosSigningRequest,
    args: &ReviewArgs,
) -> Result<String, Box<dyn Error>> {
    let mut out = String::new();

    // Debug output - show request details
    if args.debug {
        writeln!(out, "=== DEBUG MODE ===")?;
        writeln!(out, "Request kind: {}", review.kind())?;
        writeln!(out, "Reviewing account: {}", args.account)?;
        writeln!(out, "Decode expenses: {}", args.options.decode_expenses)?;
        if let Some(operations) = request.operations() {
            writeln!(out, "Operations: {}", operations.len())?;
        }
        if let Some(bytes) = request.raw_bytes() {
            writeln!(out, "Payload length: {}", bytes.len())?;
            if let Some(first) = bytes.first() {
                writeln!(out, "First byte: 0x{first:02x} ({})", RawPayloadKind::detect(bytes))?;
            }
            if let Some(branch) = operation_branch(bytes) {
                writeln!(out, "Branch: {branch}")?;
            }
        }
        writeln!(out, "Analyzed: {}", review.analyzed())?;
        writeln!(out, "Expenses: {}", review.expense_count())?;
        writeln!(out, "==================")?;
        writeln!(out)?;
    }

    writeln!(out, "Request: {}", review.kind())?;
    let formats: Vec<&str> = review.formats().iter().map(|f| f.key.as_str()).collect();
    match review.active_format() {
        Some(active) => writeln!(out, "Formats: {} (showing {})", formats.join(", "), active.key)?,
        None => writeln!(out, "Formats: none")?,
    }
    if let Some(kind) = review.payload_kind() {
        writeln!(out, "Payload: {kind}")?;
    }
    if let Some(fault) = review.fault() {
        writeln!(out, "Warning: {fault}")?;
    }

    match review.active_view() {
        Some(ReviewView::Preview(records)) => {
            writeln!(out)?;
            for (index, record) in records.iter().enumerate() {
                writeln!(out, "#{} {}", index + 1, describe_record(record))?;
                if record.expenses.is_empty() {
                    writeln!(out, "  no expenses")?;
                }
                for expense in &record.expenses {
                    writeln!(out, "  - {}", describe_expense(expense))?;
                }
            }
        }
        Some(ReviewView::RawOperations(operations)) => {
            writeln!(out)?;
            writeln!(out, "{}", serde_json::to_string_pretty(operations)?)?;
        }
        Some(ReviewView::RawBytes(bytes)) => {
            writeln!(out)?;
            writeln!(out, "{}", args.encoding.encode(bytes))?;
        }
        None => {}
    }

    Ok(out.trim_end().to_string())
}

fn describe_record(record: &ExpenseRecord) -> String {
    let mut line = record.kind.as_str().to_string();
    if let Some(destination) = &record.destination {
        let _ = write!(line, " to {destination}");
    }
    if let Some(delegate) = &record.delegate {
        let _ = write!(line, " delegating to {delegate}");
    }
    if record.is_entrypoint_interaction()
        && let Some(entrypoint) = &record.entrypoint
    {
        let _ = write!(line, " calling {entrypoint}");
    }
    line
}

fn describe_expense(expense: &AssetExpense) -> String {
    let asset = match &expense.asset {
        ExpenseAsset::Resolved(asset) => asset.symbol.clone(),
        ExpenseAsset::Unresolved {
            address,
            token_id: Some(token_id),
        } => format!("{address} #{token_id}"),
        ExpenseAsset::Unresolved { address, .. } => address.clone(),
    };
    match &expense.to {
        Some(to) => format!("{} {asset} to {to}", expense.display_amount()),
        None => format!("{} {asset}", expense.display_amount()),
    }
}

/// Reads a file, or stdin for `-`.
fn read_input(path: &str) -> Result<String, Box<dyn Error>> {
    if path == "-" {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        return Ok(input);
    }
    std::fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}").into())
}

/// app cli
pub struct Cli;
impl Cli {
    pub fn command() -> Command {
        Command::new("signreview")
            .version("1.0")
            .about("Reviews a wallet signing request and shows what it would spend")
            .arg(
                Arg::new("request")
                    .short('r')
                    .long("request")
                    .value_name("FILE")
                    .help("Signing request JSON file, or - for stdin")
                    .required(true),
            )
            .arg(
                Arg::new("account")
                    .short('a')
                    .long("account")
                    .value_name("ADDRESS")
                    .help("Address of the reviewing account")
                    .required(true),
            )
            .arg(
                Arg::new("registry")
                    .long("registry")
                    .value_name("FILE")
                    .help("Token list JSON used to resolve token contracts"),
            )
            .arg(
                Arg::new("view")
                    .short('v')
                    .long("view")
                    .value_name("FORMAT")
                    .help("Format to show instead of the default one")
                    .value_parser(["preview", "raw", "bytes"]),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .value_name("FORMAT")
                    .help("Output format")
                    .value_parser(["text", "json"])
                    .default_value("text"),
            )
            .arg(
                Arg::new("bytes-encoding")
                    .long("bytes-encoding")
                    .value_name("ENCODING")
                    .help("Encoding of the raw bytes view")
                    .value_parser(["hex", "base64"])
                    .default_value("hex"),
            )
            .arg(
                Arg::new("no-decode")
                    .long("no-decode")
                    .help("Skip expense decoding and only offer raw views")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("debug")
                    .short('d')
                    .long("debug")
                    .help("Show request details and debug logs")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("log-format")
                    .long("log-format")
                    .value_name("FORMAT")
                    .help("Log output format on stderr")
                    .value_parser(["text", "bunyan"])
                    .default_value("text"),
            )
    }

    /// Executes the CLI application, parsing command line arguments and
    /// reviewing the request
    pub fn execute() -> Result<(), Box<dyn Error>> {
        let matches = Self::command().get_matches();

        let debug_mode = matches.get_flag("debug");
        let log_format = matches
            .get_one::<String>("log-format")
            .map_or(LogFormat::Text, |format| LogFormat::from_arg(format));
        init_logging(log_format, if debug_mode { "debug" } else { "info" })?;

        let request_path = matches
            .get_one::<String>("request")
            .ok_or("--request is required")?;
        let account = matches
            .get_one::<String>("account")
            .ok_or("--account is required")?;
        let output = match matches.get_one::<String>("output").map(String::as_str) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let encoding = matches
            .get_one::<String>("bytes-encoding")
            .map_or(Ok(SupportedEncodings::Hex), |e| e.parse::<SupportedEncodings>())?;

        let args = ReviewArgs {
            account: account.clone(),
            view: matches.get_one::<String>("view").cloned(),
            output,
            encoding,
            options: ReviewOptions {
                decode_expenses: !matches.get_flag("no-decode"),
                ..ReviewOptions::default()
            },
            debug: debug_mode,
        };

        let request_json = read_input(request_path)?;
        let registry_json = matches
            .get_one::<String>("registry")
            .map(|path| read_input(path))
            .transpose()?;

        println!(
            "{}",
            review_and_render(&request_json, registry_json.as_deref(), &args)?
        );
        Ok(())
    }
}
