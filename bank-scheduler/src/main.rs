use bank_scheduler::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run().await
}
