use bdk_model_render::dynamic_index_buffer::{FMeshBatch, FModelDynamicIndexBuffer, FPrimitiveDrawInterface};
use bdk_model_render::error::{ModelError, RenderError};
use bdk_model_render::fpoly::EPolyFlags;
use bdk_model_render::material::UMaterialRef;
use bdk_model_render::math::FVector;
use bdk_model_render::model::UModel;

#[derive(Default)]
struct RecordingDrawInterface {
    batches: Vec<(usize, usize, u32, u32, Vec<u32>)>,
}

impl FPrimitiveDrawInterface for RecordingDrawInterface {
    fn draw_mesh(&mut self, mesh: &FMeshBatch<'_>) {
        self.batches.push((mesh.first_index, mesh.num_primitives, mesh.min_vertex_index, mesh.max_vertex_index, mesh.indices().to_vec()));
    }
}

fn quad(z: f32) -> Vec<FVector> {
    vec![
        FVector::new(0.0, 0.0, z),
        FVector::new(1.0, 0.0, z),
        FVector::new(1.0, 1.0, z),
        FVector::new(0.0, 1.0, z),
    ]
}

/// Node 0: single-sided quad. Node 1: two-sided quad with back zone 2 and front zone 1.
fn make_model() -> UModel {
    let mut model = UModel::new();
    model.add_polygon(&quad(0.0), EPolyFlags::empty(), UMaterialRef::default_material()).unwrap();
    let two_sided = model.add_polygon(&quad(1.0), EPolyFlags::TwoSided, UMaterialRef::default_material()).unwrap();
    model.nodes[two_sided].zone = [2, 1];
    model.build_vertex_buffer(128.0).unwrap();
    model
}

#[test]
fn new_buffer_is_locked_and_empty_test() {
    let buffer = FModelDynamicIndexBuffer::new(12);
    assert!(buffer.is_locked());
    assert_eq!(buffer.total_indices(), 12);
    assert_eq!(buffer.first_index(), 0);
    assert_eq!(buffer.next_index(), 0);
    assert_eq!(buffer.vertex_index_range(), None);
}

#[test]
fn draw_without_nodes_is_a_no_op_test() {
    let mut buffer = FModelDynamicIndexBuffer::new(12);
    let mut pdi = RecordingDrawInterface::default();

    assert!(!buffer.draw(&mut pdi, &UMaterialRef::default_material()));
    assert!(pdi.batches.is_empty());
    assert!(buffer.is_locked());
}

#[test]
fn add_node_writes_fan_test() {
    let model = make_model();
    let mut buffer = FModelDynamicIndexBuffer::new(12);

    buffer.add_node(&model, 0, None).unwrap();

    assert_eq!(buffer.next_index(), 6);
    assert_eq!(buffer.vertex_index_range(), Some((0, 3)));
}

#[test]
fn draws_are_consecutive_segments_test() {
    let model = make_model();
    let mut buffer = FModelDynamicIndexBuffer::new(18);
    let mut pdi = RecordingDrawInterface::default();
    let material = UMaterialRef::default_material();

    buffer.add_node(&model, 0, None).unwrap();
    assert!(buffer.draw(&mut pdi, &material));
    assert!(buffer.is_locked());
    assert_eq!(buffer.first_index(), 6);
    assert_eq!(buffer.vertex_index_range(), None);

    buffer.add_node(&model, 1, None).unwrap();
    assert!(buffer.draw(&mut pdi, &material));

    assert_eq!(pdi.batches, vec![
        (0, 2, 0, 3, vec![0, 2, 1, 0, 3, 2]),
        (6, 4, 4, 11, vec![4, 6, 5, 4, 7, 6, 8, 10, 9, 8, 11, 10]),
    ]);
    // Everything is used up, so the buffer stays unlocked.
    assert!(!buffer.is_locked());
    assert_eq!(
        buffer.add_node(&model, 0, None),
        Err(RenderError::BufferNotLocked)
    );
}

#[test]
fn zone_selects_faces_test() {
    let model = make_model();
    let mut pdi = RecordingDrawInterface::default();
    let material = UMaterialRef::default_material();

    // Front face lives in zone[1].
    let mut buffer = FModelDynamicIndexBuffer::new(12);
    buffer.add_node(&model, 1, Some(1)).unwrap();
    assert!(buffer.draw(&mut pdi, &material));

    // Back face lives in zone[0].
    let mut buffer = FModelDynamicIndexBuffer::new(12);
    buffer.add_node(&model, 1, Some(2)).unwrap();
    assert!(buffer.draw(&mut pdi, &material));

    // Neither.
    let mut buffer = FModelDynamicIndexBuffer::new(12);
    buffer.add_node(&model, 1, Some(3)).unwrap();
    assert!(!buffer.draw(&mut pdi, &material));

    assert_eq!(pdi.batches, vec![
        (0, 2, 4, 7, vec![4, 6, 5, 4, 7, 6]),
        (0, 2, 8, 11, vec![8, 10, 9, 8, 11, 10]),
    ]);
}

#[test]
fn capacity_overflow_is_an_error_test() {
    let model = make_model();
    let mut buffer = FModelDynamicIndexBuffer::new(9);

    buffer.add_node(&model, 0, None).unwrap();
    let result = buffer.add_node(&model, 0, None);

    assert_eq!(result, Err(RenderError::CapacityExceeded { next_index: 6, requested: 6, capacity: 9 }));
    // Nothing of the rejected node was written.
    assert_eq!(buffer.next_index(), 6);
}

#[test]
fn two_sided_node_that_does_not_fit_writes_neither_face_test() {
    let model = make_model();
    let mut buffer = FModelDynamicIndexBuffer::new(9);

    // The front face alone would fit.
    let result = buffer.add_node(&model, 1, None);

    assert_eq!(result, Err(RenderError::CapacityExceeded { next_index: 0, requested: 12, capacity: 9 }));
    assert_eq!(buffer.next_index(), 0);
    assert_eq!(buffer.vertex_index_range(), None);
    assert!(buffer.is_locked());
}

#[test]
fn vertex_range_past_u32_is_an_error_test() {
    let mut model = make_model();
    model.nodes[0].first_vertex_index = u32::MAX as usize - 1;
    let mut buffer = FModelDynamicIndexBuffer::new(12);

    assert!(matches!(
        buffer.add_node(&model, 0, None),
        Err(RenderError::Model(ModelError::VertexIndexOverflow(_)))
    ));
    assert_eq!(buffer.next_index(), 0);
}

#[test]
fn zero_capacity_buffer_is_never_locked_test() {
    let model = make_model();
    let mut buffer = FModelDynamicIndexBuffer::new(0);

    assert!(!buffer.is_locked());
    assert_eq!(buffer.add_node(&model, 0, None), Err(RenderError::BufferNotLocked));
}

#[test]
fn degenerate_node_adds_nothing_test() {
    let mut model = make_model();
    let point = FVector::new(5.0, 5.0, 5.0);
    let node_index = model.add_polygon(&[point, point, point], EPolyFlags::empty(), UMaterialRef::default_material()).unwrap();
    let mut buffer = FModelDynamicIndexBuffer::new(3);

    buffer.add_node(&model, node_index, None).unwrap();

    assert_eq!(buffer.next_index(), 0);
}

#[test]
fn missing_node_is_an_error_test() {
    let model = make_model();
    let mut buffer = FModelDynamicIndexBuffer::new(3);

    assert_eq!(
        buffer.add_node(&model, 7, None),
        Err(RenderError::Model(ModelError::NodeOutOfRange { node_index: 7, node_count: 2 }))
    );
}
