use clap::Parser;

/// The only connection parameter the tracker takes: where the shared
/// store lives. Everything else comes from funnel.toml inside it.
#[derive(Parser)]
#[command(
    name = "fnl",
    about = concat!("[>] funnel v", env!("CARGO_PKG_VERSION"), " - track the pipeline together"),
    version
)]
struct Cli {
    /// Run against a different store directory
    #[arg(short = 'C', long = "store-dir")]
    store_dir: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = funnel::tui::run(cli.store_dir.as_deref()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
