use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    oxyr::node::run_cli().await
}
