//! Scene health checks for the presentation layer.
//!
//! The transform engine silently recovers from every problem reported here;
//! this module lets an editor highlight the offending records so the user
//! can fix them.

use std::collections::HashSet;
use std::fmt;

use crate::transform::TransformEngine;
use crate::volume::Volume;

/// A recoverable problem with one volume record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `motherVolume` names a volume that does not exist.
    UnresolvedParentReference { volume: String, mother: String },
    /// `motherVolume` is the volume's own name.
    SelfReference { volume: String },
    /// Following `motherVolume` links leads back to the volume.
    CyclicParentage { volume: String },
    /// A position or rotation component is missing or not finite.
    MalformedNumericField { volume: String, field: String },
    /// Another record already uses this name; only the first one is reachable.
    DuplicateName { volume: String },
}

impl Diagnostic {
    /// Returns the name of the volume the diagnostic is about.
    #[must_use]
    pub fn volume(&self) -> &str {
        match self {
            Diagnostic::UnresolvedParentReference { volume, .. }
            | Diagnostic::SelfReference { volume }
            | Diagnostic::CyclicParentage { volume }
            | Diagnostic::MalformedNumericField { volume, .. }
            | Diagnostic::DuplicateName { volume } => volume,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedParentReference { volume, mother } => {
                write!(f, "'{volume}' is placed in unknown volume '{mother}'")
            }
            Diagnostic::SelfReference { volume } => {
                write!(f, "'{volume}' is placed in itself")
            }
            Diagnostic::CyclicParentage { volume } => {
                write!(f, "'{volume}' is part of a placement cycle")
            }
            Diagnostic::MalformedNumericField { volume, field } => {
                write!(f, "'{volume}' has a missing or invalid {field}; using 0")
            }
            Diagnostic::DuplicateName { volume } => {
                write!(f, "more than one volume is named '{volume}'")
            }
        }
    }
}

/// Lists every problem in `volumes`, in record order.
#[must_use]
pub fn diagnose(volumes: &[Volume]) -> Vec<Diagnostic> {
    let engine = TransformEngine::new(volumes);
    let index = engine.index();
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for (i, volume) in volumes.iter().enumerate() {
        let name = volume.name.clone();
        if !seen.insert(volume.name.as_str()) {
            out.push(Diagnostic::DuplicateName { volume: name.clone() });
        }

        if let Some(mother) = volume.mother_name() {
            if mother == volume.name {
                out.push(Diagnostic::SelfReference { volume: name.clone() });
            } else if index.is_orphan(i) {
                out.push(Diagnostic::UnresolvedParentReference {
                    volume: name.clone(),
                    mother: mother.to_string(),
                });
            } else if engine.lies_on_cycle(i) {
                out.push(Diagnostic::CyclicParentage { volume: name.clone() });
            }
        }

        for (field, coords) in [("position", &volume.position), ("rotation", &volume.rotation)] {
            for axis in coords.malformed_components() {
                out.push(Diagnostic::MalformedNumericField {
                    volume: name.clone(),
                    field: format!("{field}.{axis}"),
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::VolumeKind;

    #[test]
    fn test_clean_scene_has_no_diagnostics() {
        let volumes = vec![
            Volume::new("A", VolumeKind::Box),
            Volume::new("B", VolumeKind::Sphere).with_mother("A"),
        ];
        assert!(diagnose(&volumes).is_empty());
    }

    #[test]
    fn test_reports_each_problem() {
        let mut malformed = Volume::new("E", VolumeKind::Torus);
        malformed.rotation.z = None;
        let volumes = vec![
            Volume::new("A", VolumeKind::Box).with_mother("Nowhere"),
            Volume::new("B", VolumeKind::Box).with_mother("B"),
            Volume::new("C", VolumeKind::Box).with_mother("D"),
            Volume::new("D", VolumeKind::Box).with_mother("C"),
            malformed,
            Volume::new("A", VolumeKind::Box),
        ];
        let found = diagnose(&volumes);
        assert_eq!(
            found,
            vec![
                Diagnostic::UnresolvedParentReference {
                    volume: "A".into(),
                    mother: "Nowhere".into()
                },
                Diagnostic::SelfReference { volume: "B".into() },
                Diagnostic::CyclicParentage { volume: "C".into() },
                Diagnostic::CyclicParentage { volume: "D".into() },
                Diagnostic::MalformedNumericField {
                    volume: "E".into(),
                    field: "rotation.z".into()
                },
                Diagnostic::DuplicateName { volume: "A".into() },
            ]
        );
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::UnresolvedParentReference {
            volume: "Crystal".into(),
            mother: "Holder".into(),
        };
        assert_eq!(d.to_string(), "'Crystal' is placed in unknown volume 'Holder'");
        assert_eq!(d.volume(), "Crystal");
    }
}
