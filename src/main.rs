//! ADA Checker CLI - Command-line interface for accessibility checking
//!
//! Architecture: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to checker operations
//! - Handles external concerns like stdin, process exit codes, and terminal output
//! - Starts the HTTP endpoint when built with the `server` feature

use ada_checker::{
    AccessibilityChecker, AnalysisOptions, CheckReport, CheckerConfig, CheckerResult,
    DocumentReport, OutputFormat, ReportFormatter, ReportOptions, RuleId,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// ADA Checker - HTML accessibility compliance checking
#[derive(Parser)]
#[command(name = "ada-checker")]
#[command(version)]
#[command(about = "Check HTML documents for common accessibility violations")]
#[command(
    long_about = "ADA Checker parses HTML and reports accessibility violations such as missing alt text, undeclared language, generic link text and skipped heading levels. Each violation is localized with a structural CSS selector and the offending markup."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check HTML files for accessibility violations
    Check {
        /// Paths to check (files or directories)
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormatArg,

        /// Only report these rules
        #[arg(short, long = "rule", action = clap::ArgAction::Append)]
        rules: Vec<String>,

        /// Maximum number of violations to report
        #[arg(long)]
        max_violations: Option<usize>,

        /// Additional exclude patterns
        #[arg(long, action = clap::ArgAction::Append)]
        exclude: Vec<String>,

        /// Disable parallel processing
        #[arg(long)]
        no_parallel: bool,

        /// Fail on first unreadable document
        #[arg(long)]
        fail_fast: bool,

        /// Read a single document from standard input
        #[arg(long, conflicts_with = "paths")]
        stdin: bool,
    },

    /// Run the HTTP checking service
    Serve {
        /// Address to bind, overriding the configuration
        #[arg(long)]
        bind: Option<String>,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,

        /// Print the effective configuration as JSON
        #[arg(long)]
        show: bool,
    },

    /// Explain what a specific rule does
    Explain {
        /// Rule ID to explain
        rule_id: String,
    },

    /// List available rules
    Rules {
        /// Show only enabled rules
        #[arg(long)]
        enabled_only: bool,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Junit,
    Sarif,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Junit => OutputFormat::Junit,
            OutputFormatArg::Sarif => OutputFormat::Sarif,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

/// Arguments of the `check` command
struct CheckArgs {
    paths: Vec<PathBuf>,
    format: OutputFormatArg,
    rules: Vec<String>,
    max_violations: Option<usize>,
    exclude: Vec<String>,
    no_parallel: bool,
    fail_fast: bool,
    stdin: bool,
    use_colors: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    match run_command(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    }
}

async fn run_command(cli: Cli) -> CheckerResult<i32> {
    match cli.command {
        Commands::Check {
            paths,
            format,
            rules,
            max_violations,
            exclude,
            no_parallel,
            fail_fast,
            stdin,
        } => {
            let args = CheckArgs {
                paths,
                format,
                rules,
                max_violations,
                exclude,
                no_parallel,
                fail_fast,
                stdin,
                use_colors: !cli.no_color,
            };
            let config = load_config(cli.config)?;
            let mut input = std::io::stdin().lock();
            let output = run_check(config, &args, &mut input)?;
            print!("{}", output.text);
            Ok(output.exit_code)
        }
        Commands::Serve { bind } => run_serve(load_config(cli.config)?, bind).await,
        Commands::ValidateConfig { config_file, show } => {
            Ok(run_validate_config(config_file.or(cli.config), show))
        }
        Commands::Explain { rule_id } => Ok(run_explain(&rule_id)),
        Commands::Rules { enabled_only } => {
            run_list_rules(load_config(cli.config)?, enabled_only)
        }
    }
}

/// Load the given config file, or discover one in the working directory
fn load_config(config_path: Option<PathBuf>) -> CheckerResult<CheckerConfig> {
    match config_path {
        Some(path) => CheckerConfig::load_from_file(path),
        None => CheckerConfig::discover("."),
    }
}

/// Rendered output and process exit code of a check run
struct CheckOutput {
    text: String,
    exit_code: i32,
}

fn run_check<R: Read>(
    config: CheckerConfig,
    args: &CheckArgs,
    input: &mut R,
) -> CheckerResult<CheckOutput> {
    let rules = args
        .rules
        .iter()
        .map(|r| r.parse::<RuleId>())
        .collect::<CheckerResult<Vec<_>>>()?;

    let formatter = ReportFormatter::new(ReportOptions {
        use_colors: args.use_colors,
        max_violations: args.max_violations,
        rules: if rules.is_empty() { None } else { Some(rules) },
        ..Default::default()
    });
    let checker = AccessibilityChecker::new_with_config(config)?.with_report_formatter(formatter);

    let report = if args.stdin {
        let mut html = Vec::new();
        input.read_to_end(&mut html)?;
        let violations = checker.check_bytes(&html)?;

        if args.format == OutputFormatArg::Json {
            let text = checker.format_response(&violations)?;
            let exit_code = i32::from(!violations.is_empty());
            return Ok(CheckOutput { text: format!("{text}\n"), exit_code });
        }

        let mut report = CheckReport::new();
        report.add_document(DocumentReport::new("-", violations));
        report
    } else {
        let paths = if args.paths.is_empty() { vec![PathBuf::from(".")] } else { args.paths.clone() };
        let options = AnalysisOptions {
            parallel: !args.no_parallel,
            fail_fast: args.fail_fast,
            exclude_patterns: args.exclude.clone(),
            ..Default::default()
        };
        checker.check_paths(&paths, &options)?
    };

    let mut text = checker.format_report(&report, args.format.into())?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    let exit_code = i32::from(report.has_violations());
    Ok(CheckOutput { text, exit_code })
}

#[cfg(feature = "server")]
async fn run_serve(config: CheckerConfig, bind: Option<String>) -> CheckerResult<i32> {
    let checker = AccessibilityChecker::new_with_config(config)?;
    ada_checker::server::serve(checker.into_analyzer(), bind.as_deref()).await?;
    Ok(0)
}

#[cfg(not(feature = "server"))]
async fn run_serve(_config: CheckerConfig, _bind: Option<String>) -> CheckerResult<i32> {
    Err(ada_checker::CheckerError::server(
        "HTTP service is not enabled. Rebuild with the server feature: cargo build --features server",
    ))
}

fn run_validate_config(config_path: Option<PathBuf>, show: bool) -> i32 {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("ada_checker.yaml"));

    println!("Validating configuration: {}", config_path.display());

    match CheckerConfig::load_from_file(&config_path) {
        Ok(config) => {
            let enabled = config.enabled_rules().count();
            println!("✅ Configuration is valid");
            println!("📊 Configuration summary:");
            println!("  Rules: {} total, {} enabled", RuleId::all().len(), enabled);
            println!("  Max alt text length: {}", config.images.max_alt_length);
            println!("  Generic link phrases: {}", config.links.generic_phrases.len());
            println!("  Path patterns: {}", config.paths.patterns.len());
            println!("  Fingerprint: {}", config.fingerprint());

            if show {
                match config.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("❌ {e}");
                        return 1;
                    }
                }
            }
            0
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {e}");
            1
        }
    }
}

fn run_explain(rule_id: &str) -> i32 {
    match rule_id.parse::<RuleId>() {
        Ok(rule_id) => {
            println!("📖 Rule: {rule_id}");
            println!();
            println!("📝 Description:");
            println!("   {}", rule_id.description());
            0
        }
        Err(_) => {
            eprintln!("❌ Rule '{rule_id}' not found");
            println!();
            println!("Available rules:");
            for id in RuleId::all() {
                println!("  - {id}");
            }
            1
        }
    }
}

fn run_list_rules(config: CheckerConfig, enabled_only: bool) -> CheckerResult<i32> {
    println!("📋 Available Rules\n");

    for rule_id in RuleId::all() {
        let enabled = config.is_rule_enabled(*rule_id);
        if enabled_only && !enabled {
            continue;
        }

        let status = if enabled { "✅" } else { "❌" };
        println!("  {status} {rule_id} - {}", rule_id.description());
    }

    Ok(0)
}

fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
