//! Service entry point

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stocklens::run().await
}
