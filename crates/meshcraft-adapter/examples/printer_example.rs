/*
[INPUT]:  MESHCRAFT_TOKEN environment variable, optional device id argument
[OUTPUT]: Bound printers and one printer's status/remaining time
[POS]:    Examples - authenticated printer queries
[UPDATE]: When adding new printer endpoints
*/

use meshcraft_adapter::*;

/// Example: List printers with a bearer token
///
/// Run with `MESHCRAFT_TOKEN=... cargo run --example printer_example [device-id]`.
#[tokio::main]
async fn main() {
    println!("=== MeshCraft Printer Example ===\n");

    let Ok(token) = std::env::var("MESHCRAFT_TOKEN") else {
        eprintln!("Set MESHCRAFT_TOKEN to run this example");
        return;
    };

    let session = SessionManager::new();
    session.set_token(token, None, None);
    let client = match MeshcraftClient::new() {
        Ok(c) => c.with_session(session),
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };

    match client.list_printers().await {
        Ok(printers) => {
            println!("✓ {} printers", printers.len());
            for p in &printers {
                println!("  {} {} [{}]", p.device_id, p.device_name, p.status);
            }
        }
        Err(e) => println!("✗ Error ({}): {}", e.kind(), e.user_message()),
    }

    if let Some(device_id) = std::env::args().nth(1) {
        match client.printer_detail(&device_id).await {
            Ok(p) => {
                let now = chrono::Utc::now();
                println!(
                    "\n✓ {} is {}; {}s elapsed, {}s remaining",
                    p.device_name,
                    p.status,
                    p.elapsed(now).num_seconds(),
                    p.remaining(now).num_seconds()
                );
            }
            Err(e) => println!("✗ Error ({}): {}", e.kind(), e.user_message()),
        }
    }

    println!("\n✓ Printer example complete");
}
