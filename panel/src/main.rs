mod client;
mod host;
mod panel;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
