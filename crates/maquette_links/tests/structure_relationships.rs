//! End-to-end scenarios for the structure relationship engines

use maquette_core::{quat_close, vec3_close, xform_close, Quat, Vec3, DEFAULT_EPSILON};
use maquette_links::{LinkMode, Project};
use maquette_scene::{ModelId, SceneObject};
use std::f64::consts::PI;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn replicated_structure_populates_world() {
    init_tracing();
    let mut project = Project::new();
    let model = ModelId(1);

    let first = project.add_object(SceneObject::new().with_model(model));
    let second = project.add_object(
        SceneObject::at(0.0, 30.0, 0.0)
            .with_model(model)
            .with_orientation(Quat::from_axis_angle(Vec3::Y, PI / 22.0)),
    );

    let rep = project.add_replicator(first, second);
    project.set_replica_count(rep, 5);
    assert_eq!(project.world().len(), 7);

    // a few frame ticks keep the chain stable
    for _ in 0..10 {
        project.update();
    }
    assert_eq!(project.world().len(), 7);
    let replicator = project.replicator(rep).unwrap();
    assert_eq!(replicator.num_shown(), 5);
    for (k, replica) in replicator.replicas().enumerate() {
        let expected = project.world().local_transform(first)
            * project
                .world()
                .relative_transform(first, second)
                .power(k as u32 + 2);
        assert!(xform_close(
            project.world().local_transform(replica),
            expected,
            DEFAULT_EPSILON * (k + 2) as f64
        ));
    }
}

#[test]
fn master_reelection_and_baking_across_pairs() {
    init_tracing();
    let mut project = Project::new();
    let a1 = project.add_object(SceneObject::new());
    let a2 = project.add_object(SceneObject::at(0.0, 3.0, 0.0));
    let b1 = project.add_object(SceneObject::at(10.0, 0.0, 0.0));
    let b2 = project.add_object(SceneObject::new());

    let link = project.add_link(a1, a2).unwrap();
    assert!(project.link_add_pair(link, b1, b2));

    // pushing b2 makes its pair the transform source
    project.apply_force(b2, Vec3::ZERO, Vec3::ZERO);
    project.set_pos_and_orient(
        b2,
        Vec3::new(10.0, 0.0, 7.0),
        Quat::from_axis_angle(Vec3::Z, 0.5),
    );

    let delta = project.world().relative_transform(b1, b2);
    let expected_a2 = project.world().local_transform(a1) * delta;
    assert!(xform_close(
        project.world().local_transform(a2),
        expected_a2,
        DEFAULT_EPSILON
    ));

    // pushing a1 bakes the then-current delta
    project.apply_force(a1, Vec3::ZERO, Vec3::ZERO);
    assert_eq!(project.link(link).unwrap().mode(), LinkMode::PositionCopies);
    let a2_frozen = project.world().local_transform(a2);
    let b_offset = project.world().relative_transform(b1, b2);

    // moving b1 alone no longer propagates through the link
    project.set_position(b1, Vec3::new(-4.0, 4.0, 4.0));
    assert!(xform_close(
        project.world().local_transform(a2),
        a2_frozen,
        DEFAULT_EPSILON
    ));
    // its own second keeps the baked offset
    assert!(xform_close(
        project.world().relative_transform(b1, b2),
        b_offset,
        DEFAULT_EPSILON
    ));

    // a later push on any second re-elects as usual
    project.apply_force(a2, Vec3::ZERO, Vec3::ZERO);
    assert_eq!(project.link(link).unwrap().mode(), LinkMode::EditTransform);
    assert_eq!(project.link(link).unwrap().master_index(), Some(0));
}

#[test]
fn engines_only_react_to_watched_objects() {
    init_tracing();
    let mut project = Project::new();

    let first = project.add_object(SceneObject::new());
    let second = project.add_object(SceneObject::at(1.0, 0.0, 0.0));
    let rep = project.add_replicator(first, second);
    project.set_replica_count(rep, 2);

    let c1 = project.add_object(SceneObject::at(0.0, 10.0, 0.0));
    let c2 = project.add_object(SceneObject::at(0.0, 12.0, 0.0));
    let link = project.add_link(c1, c2).unwrap();

    // a push on the unrelated link leaves the replica chain alone
    let chain_before: Vec<_> = project
        .replicator(rep)
        .unwrap()
        .replicas()
        .map(|k| project.world().local_transform(k))
        .collect();
    project.apply_force(c2, Vec3::ZERO, Vec3::ZERO);
    let chain_after: Vec<_> = project
        .replicator(rep)
        .unwrap()
        .replicas()
        .map(|k| project.world().local_transform(k))
        .collect();
    assert_eq!(chain_before, chain_after);

    // and the replica chain's master pair is invisible to the linker
    assert_eq!(project.link(link).unwrap().mode(), LinkMode::EditTransform);
    project.apply_force(second, Vec3::ZERO, Vec3::ZERO);
    assert_eq!(project.link(link).unwrap().mode(), LinkMode::EditTransform);
}

#[test]
fn replica_of_linked_master_respects_both_engines() {
    init_tracing();
    let mut project = Project::new();

    // a link drives d2 from d1; a separate replicator copies the e pair
    let d1 = project.add_object(SceneObject::new());
    let d2 = project.add_object(SceneObject::at(0.0, 2.0, 0.0));
    let link = project.add_link(d1, d2).unwrap();

    let e1 = project.add_object(SceneObject::at(5.0, 0.0, 0.0));
    let e2 = project.add_object(SceneObject::at(6.0, 0.0, 0.0));
    let rep = project.add_replicator(e1, e2);
    project.set_replica_count(rep, 3);

    // linking a replica as a second is refused: it is already driven
    let replica: Vec<_> = project.replicator(rep).unwrap().replicas().collect();
    let fresh = project.add_object(SceneObject::at(-1.0, 0.0, 0.0));
    assert!(!project.link_add_pair(link, fresh, replica[0]));

    // moving the link's first carries its second, and the chain stays put
    project.set_position(d1, Vec3::new(1.0, 1.0, 1.0));
    assert!(vec3_close(
        project.world().position(d2),
        Vec3::new(1.0, 3.0, 1.0),
        DEFAULT_EPSILON
    ));
    assert!(vec3_close(
        project.world().position(replica[0]),
        Vec3::new(7.0, 0.0, 0.0),
        DEFAULT_EPSILON * 2.0
    ));
}

#[test]
fn rotation_chain_compounds_orientation() {
    init_tracing();
    let step = PI / 6.0;
    let mut project = Project::new();
    let first = project.add_object(SceneObject::at(2.0, 0.0, 0.0));
    let second = project.add_object(
        SceneObject::at(2.0, 0.0, 0.0).with_orientation(Quat::from_axis_angle(Vec3::Z, step)),
    );
    let rep = project.add_replicator(first, second);
    project.set_replica_count(rep, 5);

    for (k, replica) in project.replicator(rep).unwrap().replicas().enumerate() {
        let eps = DEFAULT_EPSILON * (k + 2) as f64;
        assert!(vec3_close(
            project.world().position(replica),
            Vec3::new(2.0, 0.0, 0.0),
            eps
        ));
        assert!(quat_close(
            project.world().orientation(replica),
            Quat::from_axis_angle(Vec3::Z, step * (k + 2) as f64),
            eps
        ));
    }
}

#[test]
fn pair_records_serialize() {
    let mut project = Project::new();
    let a1 = project.add_object(SceneObject::new());
    let a2 = project.add_object(SceneObject::at(0.0, 1.0, 0.0));
    let link = project.add_link(a1, a2).unwrap();

    let pairs = project.link(link).unwrap().pairs();
    let json = serde_json::to_string(pairs).unwrap();
    let restored: Vec<maquette_links::ObjectPair> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.as_slice(), pairs);
}
