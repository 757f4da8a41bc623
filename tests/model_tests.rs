use bdk_model_render::error::ModelError;
use bdk_model_render::fpoly::EPolyFlags;
use bdk_model_render::material::UMaterialRef;
use bdk_model_render::math::FVector;
use bdk_model_render::model::UModel;

fn quad(min_x: f32, max_x: f32) -> Vec<FVector> {
    vec![
        FVector::new(min_x, 0.0, 0.0),
        FVector::new(max_x, 0.0, 0.0),
        FVector::new(max_x, 1.0, 0.0),
        FVector::new(min_x, 1.0, 0.0),
    ]
}

fn make_model() -> UModel {
    let mut model = UModel::new();
    model.add_polygon(&quad(0.0, 1.0), EPolyFlags::empty(), UMaterialRef::new("A")).unwrap();
    model
}

#[test]
fn add_polygon_test() {
    let mut model = UModel::new();
    let node_index = model.add_polygon(&quad(0.0, 1.0), EPolyFlags::Masked, UMaterialRef::new("A")).unwrap();

    assert_eq!(node_index, 0);
    let (node, surface) = model.node_surface(node_index).unwrap();
    assert_eq!(node.vertex_count, 4);
    assert_eq!(surface.material, UMaterialRef::new("A"));
    assert_eq!(surface.poly_flags, EPolyFlags::Masked);
    assert_eq!(node.plane.normal(), FVector::new(0.0, 0.0, 1.0));
    assert_eq!(node.plane.w, 0.0);
    let points: Vec<FVector> = model.node_points(node_index).unwrap().copied().collect();
    assert_eq!(points, quad(0.0, 1.0));
}

#[test]
fn add_polygon_shares_points_test() {
    let mut model = make_model();
    model.add_polygon(&quad(1.0, 2.0), EPolyFlags::empty(), UMaterialRef::new("A")).unwrap();

    assert_eq!(model.points.len(), 6);
    assert_eq!(model.surfaces.len(), 2);
    assert_eq!(model.nodes[1].vertex_pool_index, 4);
    assert_eq!(model.vertices[4].point_index, model.vertices[1].point_index);
}

#[test]
fn add_polygon_merges_repeated_points_test() {
    let mut model = UModel::new();
    let mut vertices = quad(0.0, 1.0);
    vertices.insert(2, FVector::new(1.0, 0.001, 0.0));
    vertices.push(FVector::new(0.0, 0.0, 0.0));

    let node_index = model.add_polygon(&vertices, EPolyFlags::empty(), UMaterialRef::new("A")).unwrap();

    assert_eq!(model.nodes[node_index].vertex_count, 4);
    assert_eq!(model.vertices.len(), 4);
}

#[test]
fn add_polygon_collapses_degenerate_polygon_test() {
    let mut model = UModel::new();
    let a = FVector::new(0.0, 0.0, 0.0);
    let b = FVector::new(1.0, 0.0, 0.0);

    let node_index = model.add_polygon(&[a, b, b, a], EPolyFlags::empty(), UMaterialRef::new("A")).unwrap();

    assert_eq!(model.nodes[node_index].vertex_count, 0);
    assert!(model.vertices.is_empty());
    assert!(model.validate().is_ok());
}

#[test]
fn add_polygon_with_too_many_vertices_test() {
    let mut model = UModel::new();
    let vertices: Vec<FVector> = (0..17)
        .map(|i| {
            let angle = i as f32 / 17.0 * std::f32::consts::TAU;
            FVector::new(angle.cos(), angle.sin(), 0.0)
        })
        .collect();

    assert_eq!(
        model.add_polygon(&vertices, EPolyFlags::empty(), UMaterialRef::new("A")),
        Err(ModelError::TooManyVertices { node_index: 0, vertex_count: 17, max: 16 })
    );
    assert!(model.nodes.is_empty());
}

#[test]
fn add_point_test() {
    let mut model = UModel::new();
    let index = model.add_point(FVector::new(1.0, 2.0, 3.0), true);

    assert_eq!(model.add_point(FVector::new(1.001, 2.0, 3.0), true), index);
    assert_ne!(model.add_point(FVector::new(1.01, 2.0, 3.0), true), index);
    // The first point within the looser threshold wins.
    assert_eq!(model.add_point(FVector::new(1.01, 2.0, 3.0), false), index);
    assert_eq!(model.points.len(), 2);
}

#[test]
fn validate_test() {
    let model = make_model();
    assert_eq!(model.validate(), Ok(()));
}

#[test]
fn validate_vertex_pool_out_of_range_test() {
    let mut model = make_model();
    model.nodes[0].vertex_count = 5;

    assert_eq!(
        model.validate(),
        Err(ModelError::VertexPoolOutOfRange { node_index: 0, start: 0, end: 5, vertex_count: 4 })
    );
}

#[test]
fn validate_point_out_of_range_test() {
    let mut model = make_model();
    model.vertices[1].point_index = 99;

    assert_eq!(
        model.validate(),
        Err(ModelError::PointOutOfRange { vertex_index: 1, point_index: 99, point_count: 4 })
    );
}

#[test]
fn validate_vector_out_of_range_test() {
    let mut model = make_model();
    model.surfaces[0].texture_v_index = 42;
    let vector_count = model.vectors.len();

    assert_eq!(
        model.validate(),
        Err(ModelError::VectorOutOfRange { surface_index: 0, vector_index: 42, vector_count })
    );
}

#[test]
fn validate_surface_point_out_of_range_test() {
    let mut model = make_model();
    model.surfaces[0].base_point_index = 50;

    assert_eq!(
        model.validate(),
        Err(ModelError::SurfacePointOutOfRange { surface_index: 0, point_index: 50, point_count: 4 })
    );
}

#[test]
fn validate_too_many_vertices_test() {
    let mut model = make_model();
    model.nodes[0].vertex_count = 20;

    assert_eq!(
        model.validate(),
        Err(ModelError::TooManyVertices { node_index: 0, vertex_count: 20, max: 16 })
    );
}

#[test]
fn build_vertex_buffer_rejects_invalid_model_test() {
    let mut model = make_model();
    model.nodes[0].surface_index = 3;

    assert_eq!(
        model.build_vertex_buffer(128.0),
        Err(ModelError::SurfaceOutOfRange { node_index: 0, surface_index: 3, surface_count: 1 })
    );
}
