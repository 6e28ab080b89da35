//! Cancellable glossary loading

use crate::{Pipeline, PipelineConfig, PipelineError};
use folio_linker::{Glossary, LinkerError};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Read and index the reference glossary
///
/// The format follows the extension: `.toml` is TOML, anything else JSON.
///
/// # Errors
/// [`PipelineError::Cancelled`] if `cancel` fires before the glossary is
/// built, [`PipelineError::Glossary`] for unreadable or invalid files.
pub async fn load_glossary(path: &Path, cancel: &CancellationToken) -> Result<Arc<Glossary>, PipelineError> {
    let content = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
        read = tokio::fs::read_to_string(path) => read.map_err(LinkerError::from)?,
    };
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let extension = path.extension().and_then(|e| e.to_str());
    let glossary = Glossary::from_str_with_extension(&content, extension)?;
    info!("Loaded glossary with {} entries from {}", glossary.len(), path.display());
    Ok(Arc::new(glossary))
}

/// Build a pipeline from configuration, loading its glossary if one is set
pub async fn pipeline_from_config(
    config: PipelineConfig,
    cancel: &CancellationToken,
) -> Result<Pipeline, PipelineError> {
    let glossary = match &config.glossary_path {
        Some(path) => load_glossary(path, cancel).await?,
        None => Arc::new(Glossary::default()),
    };
    Pipeline::new(config, glossary)
}
