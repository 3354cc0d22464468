use keycase_design::{
    ArcPatches, DerivedParameters, DesignParameters, SceneNode, arc_patches, generate_design, load_parameters,
};
use keycase_tessellation::{ExtrusionSpan, MeshConfig, MeshReport, generate_extruded_surface};

#[test]
fn debug_scene_has_shells_and_welded_surface() {
    let scene = generate_design(&DerivedParameters::default(), &MeshConfig::draft()).unwrap();
    assert_eq!(scene.len(), ArcPatches::COUNT + 1);

    for node in scene.nodes() {
        let SceneNode::Mesh(mesh) = node else {
            panic!("expected a mesh, got a group");
        };
        assert!(mesh.triangle_count() > 0);
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        assert!(mesh.positions.iter().all(|c| c.is_finite()));
    }
}

#[test]
fn debug_objects_are_dropped_when_disabled() {
    let params = load_parameters(r#"{ "Enable_debug": false }"#).unwrap();
    let scene = generate_design(&params, &MeshConfig::draft()).unwrap();
    assert_eq!(scene.len(), ArcPatches::COUNT);
}

#[test]
fn arc_shells_are_closed() {
    let options = MeshConfig::draft().surface_options();
    for (name, patch) in arc_patches().named() {
        let shell = generate_extruded_surface(patch, ExtrusionSpan::OneWay(2.0), &options).unwrap();
        let report = MeshReport::of(&shell);
        assert!(report.is_consistently_oriented(), "{name}: {:?}", report.inconsistent_edges);
        assert!(report.is_closed(), "{name}: {report:?}");
    }
}

#[test]
fn mirrored_scene_is_left_half() {
    let params = DesignParameters {
        enable_debug: false,
        ..DesignParameters::default()
    }
    .derive();
    let tree = generate_design(&params, &MeshConfig::draft()).unwrap().into_tree();
    let right = tree.flatten();
    let left = tree.mirrored_x().flatten();

    assert_eq!(right.vertex_count(), left.vertex_count());
    for v in 0..right.vertex_count() {
        let [x, y, z] = right.position(v);
        assert_eq!(left.position(v), [-x, y, z]);
        assert!(x >= -2.5, "right half strays across the mirror plane at {x}");
    }
}
