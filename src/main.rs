use gdrive_client::cli::{self, Args};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Args::try_parse(std::env::args_os()).unwrap_or_else(|e| e.exit());

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    if let Err(e) = cli::run(&args, &mut stdout, &mut stderr).await {
        std::process::exit(cli::report(&e, &mut stderr));
    }
}
