use folio_admin::{AdminDataController, ControllerError};

pub async fn run(controller: &AdminDataController, fields: Vec<(String, String)>) -> anyhow::Result<()> {
    match controller.save_content_fields(fields).await {
        Ok(()) => {
            println!("{}", controller.status_text());
            Ok(())
        }
        Err(ControllerError::SaveFailure { key, written, source }) => {
            if !written.is_empty() {
                println!("Saved before failure: {}", written.join(", "));
            }
            Err(anyhow::anyhow!(source).context(format!("failed to save '{}'", key)))
        }
        Err(e) => Err(e.into()),
    }
}
