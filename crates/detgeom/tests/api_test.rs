//! Integration tests for the detgeom API.
//!
//! Note: detgeom keeps its scene in global state that can only be
//! initialized once per process (`OnceLock`), so all tests run in sequence
//! inside a single test function.

use std::f64::consts::FRAC_PI_2;

use detgeom::*;

const DOC: &str = r#"{
    "world": {"name": "World", "type": "box", "size": {"x": 4000, "y": 4000, "z": 4000}},
    "volumes": [
        {"name": "Cryostat", "type": "cylinder",
         "position": {"x": 0, "y": 0, "z": 200, "unit": "mm"},
         "rotation": {"x": 0, "y": 0, "z": 1.5707963267948966, "unit": "rad"},
         "radius": 300, "height": 800},
        {"name": "Array", "type": "assembly", "motherVolume": "Cryostat",
         "position": {"x": 50, "y": 0, "z": 0}},
        {"name": "Crystal_0", "type": "box", "motherVolume": "Array",
         "position": {"x": 0, "y": 0, "z": 10}, "size": {"x": 20, "y": 20, "z": 20}},
        {"name": "Stray", "type": "sphere", "motherVolume": "Missing",
         "position": {"x": 7, "y": 8, "z": 9}}
    ]
}"#;

fn assert_vec_near(actual: DVec3, expected: DVec3) {
    assert!(
        actual.abs_diff_eq(expected, 1e-9),
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_api() {
    init().expect("init failed");
    assert!(is_initialized());
    assert!(init().is_err(), "second init must fail");

    // Options
    {
        assert_eq!(get_options(), Options::default());
        load_options_str(r#"{"warnOnFallback": false}"#).unwrap();
        assert!(!get_options().warn_on_fallback);
        assert!(load_options_str("not json").is_err());
        set_options(Options::default());
    }

    // Adding volumes and resolving world poses
    {
        let tank = add_volume(
            Volume::new("Tank", VolumeKind::Cylinder)
                .with_position(DVec3::new(0.0, 0.0, 100.0))
                .with_rotation(DVec3::new(0.0, 0.0, FRAC_PI_2)),
        )
        .unwrap();
        let module = add_volume(
            Volume::new("Module", VolumeKind::Assembly)
                .with_mother("Tank")
                .with_position(DVec3::new(10.0, 0.0, 0.0)),
        )
        .unwrap();
        let crystal = add_volume(
            Volume::new("Crystal", VolumeKind::Box)
                .with_mother("Module")
                .with_position(DVec3::new(0.0, 5.0, 0.0)),
        )
        .unwrap();

        assert_eq!(tank.kind(), Some(VolumeKind::Cylinder));
        assert_eq!(module.mother_volume().as_deref(), Some("Tank"));
        assert_eq!(tank.mother_volume(), None);
        assert_eq!(tank.children(), vec!["Module".to_string()]);

        // Rz(90°) maps +X to +Y and +Y to -X.
        assert_vec_near(module.world_pose().unwrap().position, DVec3::new(0.0, 10.0, 100.0));
        assert_vec_near(crystal.world_pose().unwrap().position, DVec3::new(-5.0, 10.0, 100.0));

        let poses = world_poses();
        assert_eq!(poses.len(), 3);
        assert_eq!(poses[2].0, "Crystal");

        assert!(get_volume("Tank").is_some());
        assert!(get_volume("Nope").is_none());
        assert_eq!(get_all_volumes(), vec!["Tank", "Module", "Crystal"]);
    }

    // Rejected additions
    {
        assert!(matches!(
            add_volume(Volume::new("Tank", VolumeKind::Box)),
            Err(DetGeomError::VolumeExists(_))
        ));
        assert!(matches!(
            add_volume(Volume::new("World", VolumeKind::Box)),
            Err(DetGeomError::InvalidName(_))
        ));
        assert!(matches!(
            add_volume(Volume::new("Loop", VolumeKind::Box).with_mother("Loop")),
            Err(DetGeomError::CyclicParentage { .. })
        ));
        assert_eq!(get_all_volumes().len(), 3);
    }

    // World placement round-trips through the mother frame
    {
        let crystal = get_volume("Crystal").unwrap();
        let target = Pose::new(DVec3::new(3.0, -4.0, 120.0), DVec3::new(0.2, 0.1, -0.3));
        let placement = crystal.set_world_pose(&target).unwrap();
        assert_eq!(placement.position_unit, "mm");
        assert_eq!(placement.rotation_unit, "rad");
        assert!(crystal.world_pose().unwrap().abs_diff_eq(&target, 1e-9));

        let record = crystal.record().unwrap();
        assert_eq!(record.position.unit.as_deref(), Some("mm"));
    }

    // Re-parenting
    {
        let crystal = get_volume("Crystal").unwrap();
        let before = crystal.world_pose().unwrap();
        crystal.set_mother_volume(None, true).unwrap();
        assert_eq!(crystal.mother_volume(), None);
        assert!(crystal.world_pose().unwrap().abs_diff_eq(&before, 1e-9));

        crystal.set_mother_volume(Some("Module"), true).unwrap();
        assert!(crystal.world_pose().unwrap().abs_diff_eq(&before, 1e-9));

        let tank = get_volume("Tank").unwrap();
        assert!(matches!(
            tank.set_mother_volume(Some("Crystal"), false),
            Err(DetGeomError::CyclicParentage { .. })
        ));
        assert!(matches!(
            tank.set_mother_volume(Some("Ghost"), false),
            Err(DetGeomError::VolumeNotFound(_))
        ));
    }

    // Dragging a mother volume moves its children during preview
    {
        let role = begin_drag("Tank").unwrap();
        assert_eq!(role, DragRole::Mother);
        assert_eq!(dragged_volume().as_deref(), Some("Tank"));
        assert!(matches!(begin_drag("Module"), Err(DetGeomError::DragInProgress(_))));

        let tank = get_volume("Tank").unwrap();
        assert!(matches!(
            tank.set_local_pose(&Pose::IDENTITY),
            Err(DetGeomError::DragInProgress(_))
        ));

        let moved = Pose::new(DVec3::new(0.0, 0.0, 150.0), DVec3::new(0.0, 0.0, FRAC_PI_2));
        assert_eq!(preview_drag(&moved).unwrap(), PreviewEffect::Written);
        let module = get_volume("Module").unwrap();
        assert_vec_near(module.world_pose().unwrap().position, DVec3::new(0.0, 10.0, 150.0));

        cancel_drag().unwrap();
        assert_eq!(dragged_volume(), None);
        assert_vec_near(module.world_pose().unwrap().position, DVec3::new(0.0, 10.0, 100.0));
        assert!(matches!(cancel_drag(), Err(DetGeomError::NoActiveDrag)));
    }

    // Dragging a leaf defers to commit, which snaps in the local frame
    {
        set_options(Options::default().with_snap_translate(1.0));
        let role = begin_drag("Crystal").unwrap();
        assert_eq!(role, DragRole::Leaf);

        let preview = Pose::from_position(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(preview_drag(&preview).unwrap(), PreviewEffect::Deferred);
        assert_eq!(display_world_pose("Crystal"), Some(preview));

        let target = Pose::new(DVec3::new(-7.4, 12.6, 100.0), DVec3::new(0.0, 0.0, FRAC_PI_2));
        let placement = commit_drag(&target).unwrap();
        // Mother frame is Tank ∘ Module: rotated 90° about Z, origin at (0, 10, 100).
        assert_vec_near(placement.pose.position, DVec3::new(3.0, 7.0, 0.0));
        assert_vec_near(placement.pose.rotation, DVec3::ZERO);
        assert_eq!(dragged_volume(), None);
        set_options(Options::default());
    }

    // Renaming updates references
    {
        let mut module = get_volume("Module").unwrap();
        module.rename("Module_A").unwrap();
        assert_eq!(module.name(), "Module_A");
        assert_eq!(
            get_volume("Crystal").unwrap().mother_volume().as_deref(),
            Some("Module_A")
        );
        assert!(matches!(module.rename("Tank"), Err(DetGeomError::VolumeExists(_))));
    }

    // Removing a mother keeps its children in place
    {
        let crystal = get_volume("Crystal").unwrap();
        let before = crystal.world_pose().unwrap();
        let removed = remove_volume("Module_A").unwrap();
        assert_eq!(removed.kind, VolumeKind::Assembly);
        assert_eq!(crystal.mother_volume().as_deref(), Some("Tank"));
        assert!(crystal.world_pose().unwrap().abs_diff_eq(&before, 1e-9));
        assert!(matches!(remove_volume("Module_A"), Err(DetGeomError::VolumeNotFound(_))));
    }

    // Documents: broken references fall back to the world frame
    {
        load_document_str(DOC).unwrap();
        assert_eq!(get_all_volumes().len(), 4);

        let crystal = get_volume("Crystal_0").unwrap();
        assert_vec_near(crystal.world_pose().unwrap().position, DVec3::new(0.0, 50.0, 210.0));

        let stray = get_volume("Stray").unwrap();
        assert_eq!(stray.world_pose(), stray.local_pose());

        let problems = diagnostics();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].volume(), "Stray");

        let json = document_json().unwrap();
        let reparsed = GeometryDocument::from_json_str(&json).unwrap();
        assert_eq!(reparsed, current_document());
        assert_eq!(reparsed.volumes[0].dimensions["radius"], 300);

        let path = std::env::temp_dir().join(format!("detgeom-api-{}.json", std::process::id()));
        save_document(&path).unwrap();
        remove_all_volumes();
        assert!(get_all_volumes().is_empty());
        assert_eq!(current_document(), GeometryDocument::default());
        load_document_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(get_all_volumes().len(), 4);

        assert!(load_document_str("{\"volumes\": 3}").is_err());
        assert_eq!(get_all_volumes().len(), 4, "failed load must keep the scene");
    }

    shutdown();
    assert!(!is_initialized());
}
