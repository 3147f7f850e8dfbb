//! Loading and saving geometry documents.

use std::path::Path;

use detgeom_core::Scene;

use crate::{with_context, with_context_mut, GeometryDocument, Result};

/// Replaces the scene with the given document.
///
/// Any active drag is abandoned. Problems found in the document are logged
/// as warnings; they never make loading fail.
pub fn load_document(document: GeometryDocument) {
    let scene = Scene::from_document(document);
    for diagnostic in scene.diagnostics() {
        log::warn!("{diagnostic}");
    }
    log::info!("loaded geometry with {} volumes", scene.len());
    with_context_mut(|ctx| {
        ctx.scene = scene;
    });
}

/// Replaces the scene with a document parsed from JSON.
pub fn load_document_str(json: &str) -> Result<()> {
    load_document(GeometryDocument::from_json_str(json)?);
    Ok(())
}

/// Replaces the scene with a document read from a JSON file.
pub fn load_document_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let document = GeometryDocument::read_from_path(path)?;
    log::debug!("read geometry from {}", path.display());
    load_document(document);
    Ok(())
}

/// Returns the current scene as a document.
#[must_use]
pub fn current_document() -> GeometryDocument {
    with_context(|ctx| ctx.scene.to_document())
}

/// Serializes the current scene as pretty-printed JSON.
pub fn document_json() -> Result<String> {
    current_document().to_json_string()
}

/// Writes the current scene to a JSON file.
pub fn save_document(path: impl AsRef<Path>) -> Result<()> {
    current_document().write_to_path(path)
}
