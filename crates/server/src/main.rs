//! Veridoc Server binary.
//!
//! Serves plagiarism and AI-content analysis over REST with authentication
//! and rate limiting.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    server::start_server(config).await?;
    Ok(())
}
