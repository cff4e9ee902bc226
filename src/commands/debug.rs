use anyhow::Result;
use chaincal_core::ViewReconciler;
use owo_colors::OwoColorize;

pub async fn run(view: &ViewReconciler, message: &str) -> Result<()> {
    let receipt = view.debug_print_message(message).await?;
    println!("{} {}", "Sent".green(), receipt.digest.dimmed());
    Ok(())
}
