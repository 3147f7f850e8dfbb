//! Placement demo: builds a small detector, drags parts of it around and
//! prints where everything ends up.
//!
//! Run with `RUST_LOG=debug cargo run --example placement_demo` to see the
//! engine's log output. Pass a path to also save the final geometry.

use std::f64::consts::FRAC_PI_4;

use detgeom::*;

fn print_poses(title: &str) {
    println!("{title}");
    for (name, pose) in world_poses() {
        let degrees = pose.rotation_degrees();
        println!(
            "  {name:<12} pos ({:8.2}, {:8.2}, {:8.2}) mm  rot ({:7.2}, {:7.2}, {:7.2}) deg",
            pose.position.x, pose.position.y, pose.position.z, degrees.x, degrees.y, degrees.z
        );
    }
}

fn main() -> Result<()> {
    init()?;
    set_options(Options::default().with_snap_translate(0.5).with_snap_rotate(5.0));

    add_volume(
        Volume::new("Cryostat", VolumeKind::Cylinder)
            .with_position(DVec3::new(0.0, 0.0, 500.0))
            .with_dimension("radius", 400.0)
            .with_dimension("height", 1200.0),
    )?;
    add_volume(
        Volume::new("Array", VolumeKind::Assembly)
            .with_mother("Cryostat")
            .with_rotation(DVec3::new(0.0, 0.0, FRAC_PI_4)),
    )?;
    for i in 0..3 {
        let x = f64::from(i) * 60.0 - 60.0;
        add_volume(
            Volume::new(format!("Crystal_{i}"), VolumeKind::Box)
                .with_mother("Array")
                .with_position(DVec3::new(x, 0.0, 0.0))
                .with_dimension("material", "G4_Ge"),
        )?;
    }
    // Not placed anywhere that exists; drawn in the world frame.
    add_volume(
        Volume::new("Calibration", VolumeKind::Sphere)
            .with_mother("SourceHolder")
            .with_position(DVec3::new(0.0, 300.0, 0.0)),
    )?;

    print_poses("Initial placement:");
    for problem in diagnostics() {
        println!("  warning: {problem}");
    }

    // Drag the cryostat up; the whole array follows during the preview.
    begin_drag("Cryostat")?;
    for step in 1..=4 {
        let z = 500.0 + f64::from(step) * 25.0;
        preview_drag(&Pose::from_position(DVec3::new(0.0, 0.0, z)))?;
    }
    commit_drag(&Pose::from_position(DVec3::new(0.0, 0.0, 600.0)))?;

    // Drag one crystal to a world pose; the record stores it in the array's frame.
    let role = begin_drag("Crystal_2")?;
    println!("\nDragging Crystal_2 as {role:?}");
    let target = Pose::new(DVec3::new(100.3, 20.1, 640.0), DVec3::new(0.0, 0.0, 1.0));
    preview_drag(&target)?;
    let placement = commit_drag(&target)?;
    println!(
        "  committed local position {} {} rotation {} {}",
        placement.pose.position,
        placement.position_unit,
        placement.pose.rotation,
        placement.rotation_unit
    );

    print_poses("\nAfter dragging:");

    if let Some(path) = std::env::args().nth(1) {
        save_document(&path)?;
        println!("\nSaved geometry to {path}");
    }

    shutdown();
    Ok(())
}
