/*
[INPUT]:  Sort order and page size
[OUTPUT]: Gallery models with proxied thumbnail URLs
[POS]:    Examples - public gallery queries
[UPDATE]: When adding new gallery endpoints
*/

use meshcraft_adapter::*;

/// Example: Browse the public gallery (no authentication required)
#[tokio::main]
async fn main() {
    println!("=== MeshCraft Gallery Example ===\n");

    let client = match MeshcraftClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    let proxy = ImageProxy::for_api_base(client.base_url().as_str());

    println!("Querying popular models...");
    match client.list_gallery_models(SortBy::Popular, 10, 0).await {
        Ok(page) => {
            println!("✓ {} of {} models (more: {})", page.models.len(), page.total, page.has_more);
            for model in page.models.iter().map(|m| proxy.rewrite_model(m)) {
                println!(
                    "  {} {} -> {}",
                    model.id,
                    model.title,
                    model.thumbnail_url.as_deref().unwrap_or("-")
                );
            }
        }
        Err(e) => println!("✗ Error ({}): {}", e.kind(), e.user_message()),
    }

    println!("\n✓ Gallery example complete");
}
