use std::process;

use admin_wizard::{cli, init};

#[tokio::main]
async fn main() {
    init();

    if let Err(err) = cli::run_cli().await {
        cli::output::error(&err);
        process::exit(1);
    }
}
