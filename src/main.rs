#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = peertrack::run().await {
        eprintln!("peertrack fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
