//! `debrix` binary entrypoint.

#[tokio::main]
async fn main() {
    std::process::exit(debrix_cli::run().await);
}
