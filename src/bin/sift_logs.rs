use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, LevelFilter};

use logsift::{
    CancellationToken, ClusterSet, ClusterSummary, Clusterer, ProgressUpdate, Result,
    SiftConfig, SimilarityMetric,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Group near-duplicate log lines and print one representative per group.
#[derive(Debug, Parser)]
#[command(name = "sift_logs", version)]
struct Args {
    /// Log files to read, one entry per non-empty line
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// INI file with [similarity] and [processor] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Items per parallel work unit
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Minimum similarity in (0, 1]
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Fold case before comparing
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Replace GUIDs, timestamps, hex literals and numbers with placeholders before comparing
    #[arg(short, long)]
    mask: bool,

    /// exact, jaccard or levenshtein
    #[arg(long)]
    metric: Option<String>,

    /// Worker threads (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write results here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only report the N largest clusters
    #[arg(long)]
    top: Option<usize>,

    /// Member lines listed per cluster in JSON output
    #[arg(long, default_value_t = 5)]
    members: usize,

    /// Append log records to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// One line of input, as presented back to the user.
#[derive(Debug, Clone)]
struct LogLine {
    file: String,
    line_number: usize,
    text: String,
}

fn load_config(args: &Args) -> Result<SiftConfig> {
    let mut config = match &args.config {
        Some(path) => SiftConfig::from_ini(path)?,
        None => SiftConfig::default(),
    };

    if let Some(chunk_size) = args.chunk_size {
        config.processor.chunk_size = chunk_size;
    }
    if let Some(threshold) = args.threshold {
        config.similarity.threshold = threshold;
    }
    if let Some(threads) = args.threads {
        config.processor.thread_count = threads;
    }
    if let Some(metric) = &args.metric {
        config.similarity.metric = metric.parse::<SimilarityMetric>()?;
    }
    if args.ignore_case {
        config.similarity.case_sensitive = false;
    }
    if args.mask {
        config.similarity.mask_guids = true;
        config.similarity.mask_timestamps = true;
        config.similarity.mask_hex = true;
        config.similarity.mask_numbers = true;
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(args: &Args, level: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level);

    if let Some(path) = &args.log_file {
        let log_file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}

fn read_lines(files: &[PathBuf]) -> Result<Vec<LogLine>> {
    let mut lines = Vec::new();
    for path in files {
        let bytes = fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let file = path.display().to_string();
        let before = lines.len();

        lines.extend(content.lines()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| LogLine {
                file: file.clone(),
                line_number: i + 1,
                text: text.trim_end().to_string(),
            }));

        info!("Loaded {} lines from {}", lines.len() - before, file);
    }
    Ok(lines)
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn write_report(clusters: &ClusterSet<LogLine>, args: &Args, out: &mut dyn Write) -> Result<()> {
    let limit = args.top.unwrap_or(usize::MAX);
    let ordered = clusters.largest_first();

    match args.format {
        OutputFormat::Text => {
            writeln!(out, "{} lines in {} clusters", clusters.item_count(), clusters.len())?;
            for (_, cluster) in ordered.into_iter().take(limit) {
                let first = &cluster.items()[0];
                writeln!(out, "{:>8}  {}  ({}:{})",
                    cluster.len(), cluster.representative(), first.value().file, first.value().line_number)?;
            }
        },
        OutputFormat::Json => {
            let rows: Vec<ClusterSummary> = ordered.into_iter().take(limit)
                .map(|(index, cluster)| ClusterSummary::new(index, cluster, Some(args.members)))
                .collect();
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        },
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(["index", "count", "representative", "file", "line_number"])?;
            for (index, cluster) in ordered.into_iter().take(limit) {
                let first = cluster.items()[0].value();
                writer.write_record([
                    index.to_string(),
                    cluster.len().to_string(),
                    cluster.representative().to_string(),
                    first.file.clone(),
                    first.line_number.to_string(),
                ])?;
            }
            writer.flush()?;
        },
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    init_logging(&args, config.processor.get_log_level())?;
    info!("Clustering with {} worker threads, chunk size {}, {} at threshold {}",
        config.processor.effective_threads(),
        config.processor.chunk_size,
        config.similarity.metric.as_str(),
        config.similarity.threshold);

    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let lines = read_lines(&args.files)?;
    let pb = progress_bar();
    pb.set_message(format!("Clustering {} lines", lines.len()));

    let observer_pb = pb.clone();
    let clusterer = Clusterer::new(config)?
        .with_cancellation(token)
        .with_progress(move |update: ProgressUpdate| {
            observer_pb.set_message(update.status);
            if update.refresh {
                observer_pb.tick();
            }
        });

    let start = Instant::now();
    let result = clusterer.cluster(lines, |line: &LogLine| Some(line.text.clone()));
    pb.finish_and_clear();
    let clusters = result?;
    info!("Clustering finished in {} ms", start.elapsed().as_millis());

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_report(&clusters, &args, &mut out)?;
            out.flush()?;
        },
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_report(&clusters, &args, &mut out)?;
        },
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("sift_logs: {}", e);
        std::process::exit(if e.is_cancelled() { 130 } else { 1 });
    }
}
