use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use parlance_core::{
    AnalysisConfig, AnalysisReport, Analyzer, CachedSource, ChatCompletionsClient, Enricher,
    FetchBatch, FileTranscriptCache, LexiconSentiment, Provider, RuleBasedNlp, TranscriptSource,
    VideoAds, YtDlpSource, format_report_readable, get_root_cache_dir,
    pipeline::{acquire, analyze_speech, detect_ads, enrich_ads, enrich_report, with_ads},
    save_report, write_ad_spans_csv, write_report_csv,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "parlance")]
#[command(
    about = "Analyze filler words, sentiment, topics and sponsor segments of YouTube transcripts"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Speech report: most used words, fillers, sentiment, topics and suggestions
    Speech(RunArgs),
    /// Sponsor segments with product names and a sponsorship quality score
    Ads(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Video URLs or ids
    #[arg(required = true)]
    inputs: Vec<String>,

    /// AI provider for enrichment
    #[arg(short, long, default_value = "grok")]
    provider: CliProvider,

    /// Skip every LLM call
    #[arg(long)]
    no_llm: bool,

    /// Force re-fetching even if cached transcripts exist
    #[arg(short, long)]
    force: bool,

    /// JSON config file with lexicons and tunables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a CSV export to this path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the JSON report to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn done(message: String, started: Instant) -> String {
    format!(
        "{} {} {}",
        style("✓").green().bold(),
        message,
        style(format!("[{}]", format_duration(started.elapsed()))).dim()
    )
}

fn print_invalid(batch: &FetchBatch) {
    for invalid in &batch.invalid {
        println!(
            "{} {} {}",
            style("✗").red().bold(),
            invalid.input,
            style(&invalid.reason).dim()
        );
    }
}

async fn fetch(args: &RunArgs, config: &AnalysisConfig) -> Result<FetchBatch> {
    let source: Arc<dyn TranscriptSource> = if config.fetch.use_cache {
        Arc::new(
            CachedSource::new(YtDlpSource::default(), FileTranscriptCache::default())
                .force_refresh(args.force),
        )
    } else {
        Arc::new(YtDlpSource::default())
    };

    let step_start = Instant::now();
    let spinner = create_spinner(&format!("Fetching {} transcript(s)...", args.inputs.len()));
    let batch = acquire(source, &args.inputs, &config.fetch).await;
    spinner.finish_with_message(done(
        format!(
            "Fetched {} of {} transcript(s)",
            batch.transcripts.len(),
            args.inputs.len()
        ),
        step_start,
    ));
    print_invalid(&batch);

    if batch.is_empty() {
        bail!("no transcript could be fetched");
    }
    Ok(batch)
}

fn write_csv(
    args: &RunArgs,
    report: &AnalysisReport,
    videos: Option<&[VideoAds]>,
) -> Result<()> {
    if let Some(path) = &args.csv {
        let file = std::fs::File::create(path)?;
        match videos {
            Some(videos) => write_ad_spans_csv(file, videos)?,
            None => write_report_csv(file, report)?,
        }
        println!("{} {}", style("Saved:").dim(), style(path.display()).cyan());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (args, with_ads_pass) = match &cli.command {
        Command::Speech(args) => (args, false),
        Command::Ads(args) => (args, true),
    };

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    debug!(
        top_n = config.top_n,
        max_concurrent_fetches = config.fetch.max_concurrent_fetches,
        "configuration loaded"
    );

    // Validate API key early
    let provider: Provider = args.provider.into();
    let enricher = if args.no_llm {
        None
    } else {
        match provider.validate_api_key() {
            Ok(api_key) => Some(Enricher::new(
                Arc::new(ChatCompletionsClient::new(provider, api_key)),
                config.enrichment.clone(),
            )),
            Err(e) => {
                eprintln!("{} {}", style("Error:").red().bold(), e);
                eprintln!("{}", style("Pass --no-llm to run without enrichment.").dim());
                std::process::exit(1);
            }
        }
    };

    println!(
        "\n{}  {}\n",
        style("parlance").cyan().bold(),
        style("Transcript Analyzer").dim()
    );
    if config.fetch.use_cache {
        println!(
            "{} {}",
            style("Cache:").dim(),
            style(get_root_cache_dir().display()).dim()
        );
    }
    println!("{}", style("─".repeat(60)).dim());

    let total_start = Instant::now();
    let batch = fetch(args, &config).await?;

    let step_start = Instant::now();
    let nlp = RuleBasedNlp::new();
    let sentiment = LexiconSentiment::new();
    let analyzer = Analyzer::new(&nlp, &sentiment, &config);
    let report = analyze_speech(&analyzer, &batch);
    println!(
        "{}",
        done(
            format!("Analyzed {} words", report.metrics.total_words),
            step_start
        )
    );

    let videos = if with_ads_pass {
        let videos = detect_ads(&batch, &config.ads);
        let spans: usize = videos.iter().map(|v| v.spans.len()).sum();
        println!(
            "{} Detected {} ad segment(s)",
            style("✓").green().bold(),
            spans
        );
        Some(videos)
    } else {
        None
    };

    let report = match &enricher {
        Some(enricher) => {
            let step_start = Instant::now();
            let spinner = create_spinner(&format!("Enriching with {}...", provider.name()));
            let videos = match videos {
                Some(videos) => Some(enrich_ads(enricher, videos).await),
                None => None,
            };
            let transcript_text = batch
                .transcripts
                .iter()
                .map(|t| t.text())
                .collect::<Vec<_>>()
                .join(" ");
            let suggestions_for = (!with_ads_pass).then_some(transcript_text.as_str());
            let report = enrich_report(enricher, report, videos, suggestions_for).await;
            spinner.finish_with_message(done(
                format!("Enriched ({})", provider.name()),
                step_start,
            ));
            report
        }
        None => match videos {
            Some(videos) => with_ads(report, videos),
            None => report,
        },
    };

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    write_csv(args, &report, report.ads.as_deref().filter(|_| with_ads_pass))?;
    if let Some(path) = &args.json {
        save_report(&report, path).await?;
        println!("{} {}", style("Saved:").dim(), style(path.display()).cyan());
    }
    println!("{}", style("─".repeat(60)).dim());

    // Human-readable output
    let readable = format_report_readable(&report);
    println!("{}", readable);

    Ok(())
}
