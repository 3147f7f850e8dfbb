//! The JSON geometry document an editor session works on.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::volume::Volume;

/// A world record plus the flat list of placed volumes.
///
/// The world record (its size, material, ...) is opaque here; it is the
/// implicit mother of every root-placed volume and always sits at the origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryDocument {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub world: Value,
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

impl GeometryDocument {
    /// Parses a document from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a document from a JSON file.
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Writes the document to a JSON file.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::VolumeKind;

    const DOC: &str = r#"{
        "world": {"name": "World", "type": "box", "size": {"x": 2000, "y": 2000, "z": 2000}},
        "volumes": [
            {"name": "Detector", "type": "assembly", "position": {"x": 0, "y": 0, "z": 100}},
            {"name": "Layer1", "type": "box", "motherVolume": "Detector",
             "position": {"x": 0, "y": 0, "z": 5, "unit": "mm"},
             "size": {"x": 100, "y": 100, "z": 10}, "material": "G4_Si"}
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let doc = GeometryDocument::from_json_str(DOC).unwrap();
        assert_eq!(doc.volumes.len(), 2);
        assert_eq!(doc.volumes[0].kind, VolumeKind::Assembly);
        assert_eq!(doc.world["size"]["x"], 2000);
    }

    #[test]
    fn test_opaque_fields_survive_roundtrip() {
        let doc = GeometryDocument::from_json_str(DOC).unwrap();
        let back = GeometryDocument::from_json_str(&doc.to_json_string().unwrap()).unwrap();
        assert_eq!(back, doc);
        assert_eq!(back.volumes[1].dimensions["material"], "G4_Si");
    }

    #[test]
    fn test_empty_document() {
        let doc = GeometryDocument::from_json_str("{}").unwrap();
        assert!(doc.volumes.is_empty());
        assert!(doc.world.is_null());
    }

    #[test]
    fn test_unknown_volume_type_is_rejected() {
        let json = r#"{"volumes": [{"name": "X", "type": "hyperboloid"}]}"#;
        assert!(GeometryDocument::from_json_str(json).is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let doc = GeometryDocument::from_json_str(DOC).unwrap();
        let path = std::env::temp_dir().join(format!("detgeom-doc-{}.json", std::process::id()));
        doc.write_to_path(&path).unwrap();
        let back = GeometryDocument::read_from_path(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, doc);
    }
}
