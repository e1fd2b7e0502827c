//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::storage::BucketClient;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let bucket = BucketClient::from_settings(&settings)?;

    match bucket.list_pdfs().await {
        Ok(pdfs) => {
            if pdfs.is_empty() {
                Output::info("No PDFs in the bucket yet. Use 'voxdoc upload <file.pdf>' to add one.");
            } else {
                Output::header(&format!("PDFs in {} ({})", bucket.name(), pdfs.len()));
                println!();
                for name in &pdfs {
                    Output::list_item(name);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list PDFs: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
