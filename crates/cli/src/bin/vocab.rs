use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    vocab_cli::main_entry().await
}
