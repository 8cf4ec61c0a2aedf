use anyhow::{bail, Context};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use text_verifier::{
    diff, weighted_length, AppConfig, ProgressEvent, RowStatus, RowStore, RunState, Side,
    VerificationPipeline,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "usage:
  text-verifier verify <sheet.csv|sheet.xlsx> [--config <config.toml>]
  text-verifier diff <sheet> <row> [--config <config.toml>]
  text-verifier inspect <sheet> [--config <config.toml>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let config_path = match args.iter().position(|a| a == "--config") {
        Some(idx) => {
            if idx + 1 >= args.len() {
                bail!("--config needs a path\n{}", USAGE);
            }
            let path = args.remove(idx + 1);
            args.remove(idx);
            Some(path)
        }
        None => Path::new("config.toml")
            .exists()
            .then(|| "config.toml".to_string()),
    };

    let (config, config_error) = match config_path.as_deref() {
        Some(path) => match AppConfig::load_from_file(path) {
            Ok(config) => (config, None),
            Err(e) => (AppConfig::default(), Some(e)),
        },
        None => (AppConfig::default(), None),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("text_verifier={}", config.logging.level)))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Ignoring unreadable configuration, using defaults");
    }

    match args.first().map(String::as_str) {
        Some("verify") if args.len() == 2 => verify(&config, Path::new(&args[1])).await,
        Some("diff") if args.len() == 3 => {
            let row: usize = args[2]
                .parse()
                .with_context(|| format!("invalid row number: {}", args[2]))?;
            show_diff(&config, Path::new(&args[1]), row)
        }
        Some("inspect") if args.len() == 2 => inspect(&config, Path::new(&args[1])),
        _ => bail!("{}", USAGE),
    }
}

async fn verify(config: &AppConfig, input: &Path) -> anyhow::Result<()> {
    let output = config.output_path_for(input);

    // a previous interrupted run left its results next to the input
    let source: PathBuf = if output != input && output.exists() {
        tracing::info!(output = %output.display(), "Resuming from existing output");
        output.clone()
    } else {
        input.to_path_buf()
    };

    let store = RowStore::load(&source, &config.columns)
        .with_context(|| format!("failed to load {}", source.display()))?;
    println!(
        "{} rows, {} already verified",
        store.len(),
        store.count_status(RowStatus::Success)
    );

    let (mut pipeline, mut progress) = VerificationPipeline::from_config(config)?;
    pipeline.start(store, &output)?;

    let cancel = pipeline.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current row");
            cancel.cancel();
        }
    });

    let mut ticker =
        tokio::time::interval(Duration::from_millis(config.pipeline.poll_interval_ms.max(1)));
    'poll: loop {
        ticker.tick().await;
        for event in progress.drain() {
            render(&event);
            if event.is_terminal() {
                break 'poll;
            }
        }
        if !pipeline.is_running() {
            progress.drain().iter().for_each(render);
            break;
        }
    }

    let Some(report) = pipeline.join().await? else {
        bail!("verification run produced no report");
    };

    match report.state {
        RunState::Failed => bail!(
            "verification failed: {}",
            report.error.unwrap_or_else(|| "unknown error".to_string())
        ),
        _ => Ok(()),
    }
}

fn render(event: &ProgressEvent) {
    println!("[{:>5.1}%] {}", event.percent_complete, event.message);
}

fn show_diff(config: &AppConfig, path: &Path, row: usize) -> anyhow::Result<()> {
    let store = RowStore::load(path, &config.columns)?;
    let Some(record) = row.checked_sub(1).and_then(|i| store.row(i)) else {
        bail!("row {} out of range (1-{})", row, store.len());
    };

    let (before, after) = (record.before(), record.after());
    println!("before ({}): {}", weighted_length(before), before);
    println!("after  ({}): {}", weighted_length(after), after);

    for span in diff(before, after) {
        let text = match span.side {
            Side::Left => before,
            Side::Right => after,
        };
        let changed: String = text
            .chars()
            .skip(span.start)
            .take(span.end - span.start)
            .collect();
        println!("{:?} {}..{} {:?}", span.side, span.start, span.end, changed);
    }
    Ok(())
}

fn inspect(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let store = RowStore::load(path, &config.columns)?;
    for (index, row) in store.rows().enumerate() {
        println!(
            "{:>4}  {:<24} {:<8} {:>5} -> {:<5}",
            index + 1,
            store.label(index).unwrap_or_default(),
            row.status().to_string(),
            weighted_length(row.before()),
            weighted_length(row.after()),
        );
    }
    Ok(())
}
