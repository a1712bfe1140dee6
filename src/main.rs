#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cookbook::app::run().await
}
