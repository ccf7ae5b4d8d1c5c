use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use proxy_sweep::{
    load_proxy_lists,
    report::{save_report, sort_results, CheckSummary, ReportFormat},
    tui::ProxyCheckerApp,
    CheckerConfig, ProbeResult, Protocol, ProxyChecker,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Concurrent proxy checker with anonymity and server detection
#[derive(Parser)]
#[command(name = "proxy-sweep")]
#[command(about = "Concurrent proxy checker with anonymity and server detection")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy lists and write a report
    Check(CheckArgs),
    /// Check proxy lists with a live progress view
    Tui(CheckArgs),
}

#[derive(Args, Clone)]
struct CheckArgs {
    /// Directory holding http.txt, https.txt, socks4.txt, socks5.txt, connect.txt
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
    /// Protocols to check (defaults to all)
    #[arg(short, long, value_parser = clap::value_parser!(Protocol))]
    protocol: Vec<Protocol>,
    /// Timeout in seconds for each probe
    #[arg(long, default_value = "30")]
    timeout: u64,
    /// Number of concurrent probes
    #[arg(short = 'n', long, default_value = "50")]
    threads: usize,
    /// Public IP of this machine, used to detect transparent proxies
    #[arg(long, default_value = "127.0.0.1")]
    own_ip: String,
    /// URL every probe requests through its proxy
    #[arg(long, default_value = "http://localhost")]
    target_url: String,
    /// Report file
    #[arg(short, long, default_value = "proxy_check_results.md")]
    output: PathBuf,
    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

impl Default for CheckArgs {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            protocol: Vec::new(),
            timeout: 30,
            threads: 50,
            own_ip: "127.0.0.1".to_string(),
            target_url: "http://localhost".to_string(),
            output: PathBuf::from("proxy_check_results.md"),
            format: ReportFormat::Text,
        }
    }
}

impl CheckArgs {
    fn protocols(&self) -> Vec<Protocol> {
        if self.protocol.is_empty() {
            Protocol::ALL.to_vec()
        } else {
            self.protocol.clone()
        }
    }

    fn checker(&self) -> Result<ProxyChecker> {
        let config = CheckerConfig::new()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_concurrency(self.threads)
            .with_target_url(self.target_url.clone())
            .with_own_ip(self.own_ip.clone());
        Ok(ProxyChecker::new(config)?)
    }
}

fn init_tracing(quiet: bool) {
    let filter = if quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "proxy_sweep=info".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn write_results(mut results: Vec<ProbeResult>, args: &CheckArgs) -> Result<()> {
    sort_results(&mut results);
    save_report(&results, &args.output, args.format)?;

    let summary = CheckSummary::from_results(&results);
    tracing::info!(
        total = summary.total,
        working = summary.working,
        not_working = summary.not_working,
        elite = summary.elite,
        anonymous = summary.anonymous,
        transparent = summary.transparent,
        output = ?args.output,
        "Report written"
    );
    println!(
        "Checked {} proxies: {} working, {} not working. Report saved to {:?}",
        summary.total, summary.working, summary.not_working, args.output
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| Commands::Check(CheckArgs::default()));
    init_tracing(matches!(command, Commands::Tui(_)));

    match command {
        Commands::Check(args) => {
            let checker = args.checker()?;
            let lists = load_proxy_lists(&args.dir, &args.protocols())?;
            let results = checker.run(lists).await;
            write_results(results, &args)?;
        }
        Commands::Tui(args) => {
            let checker = args.checker()?;
            let lists = load_proxy_lists(&args.dir, &args.protocols())?;
            let total: usize = lists.values().map(Vec::len).sum();
            let results = ProxyCheckerApp::new(checker, lists).run().await?;
            if results.len() < total {
                eprintln!(
                    "Check interrupted after {} of {} proxies; writing partial report",
                    results.len(),
                    total
                );
            }
            write_results(results, &args)?;
        }
    }

    Ok(())
}
