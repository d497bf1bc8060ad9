use anyhow::{Context, Result};
use searchica_client::{SearchApi, SearchClient};

/// Print the status of the search service.
pub async fn show_status(client: &SearchClient) -> Result<()> {
    let status = client
        .status()
        .await
        .with_context(|| format!("Search service at {} is not reachable", client.base_url()))?;

    println!("\nSearchica service\n");
    println!("  URL:         {}", client.base_url());
    println!("  Status:      {}", status.status);
    if !status.api.is_empty() {
        println!("  API:         {}", status.api);
    }
    if !status.version.is_empty() {
        println!("  Version:     {}", status.version);
    }
    if !status.environment.is_empty() {
        println!("  Environment: {}", status.environment);
    }

    Ok(())
}
