pub mod box_;
pub mod config;
pub mod dynamic_index_buffer;
pub mod error;
pub mod fpoly;
pub mod hit_proxy;
pub mod material;
pub mod math;
pub mod model;
pub mod model_render;
pub mod raster;
pub mod view;

#[cfg(feature = "python")]
mod python {
    use std::collections::{HashMap, HashSet};

    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::config::FModelRenderConfig;
    use crate::fpoly::EPolyFlags;
    use crate::hit_proxy::HModel;
    use crate::material::UMaterialRef;
    use crate::math::FVector;
    use crate::model::UModel;
    use crate::model_render::{build_render_data, UModelComponent};
    use crate::view::FSceneView;

    fn to_py_err<E: std::fmt::Display>(error: E) -> PyErr {
        PyValueError::new_err(error.to_string())
    }

    fn to_vector((x, y, z): (f32, f32, f32)) -> FVector {
        FVector::new(x, y, z)
    }

    #[pyclass]
    struct Model {
        model: UModel,
    }

    #[pymethods]
    impl Model {
        #[new]
        fn new() -> Self {
            Model { model: UModel::new() }
        }

        /// Adds a polygon as a new surface and node and returns the node index.
        fn add_polygon(&mut self, vertices: Vec<(f32, f32, f32)>, poly_flags: HashSet<String>, material: &str) -> PyResult<usize> {
            let vertices: Vec<FVector> = vertices.into_iter().map(to_vector).collect();
            let poly_flags = EPolyFlags::from_names(poly_flags.iter().map(|flag| flag.as_str()));
            self.model.add_polygon(&vertices, poly_flags, UMaterialRef::new(material)).map_err(to_py_err)
        }

        fn set_node_zones(&mut self, node_index: usize, back_zone: u8, front_zone: u8) -> PyResult<()> {
            let node = self.model.nodes.get_mut(node_index).ok_or_else(|| PyValueError::new_err("node index out of range"))?;
            node.zone = [back_zone, front_zone];
            Ok(())
        }

        fn build_vertex_buffer(&mut self) -> PyResult<usize> {
            self.model.build_vertex_buffer(FModelRenderConfig::default().texture_tile_size).map_err(to_py_err)
        }

        #[getter]
        fn node_count(&self) -> usize {
            self.model.nodes.len()
        }

        #[getter]
        fn points(&self) -> Vec<(f32, f32, f32)> {
            self.model.points.iter().map(|point| (point.x, point.y, point.z)).collect()
        }
    }

    #[pyclass]
    struct View {
        view: FSceneView,
    }

    #[pymethods]
    impl View {
        #[staticmethod]
        fn perspective(eye: (f32, f32, f32), target: (f32, f32, f32), up: (f32, f32, f32), fov_y_degrees: f32, near: f32, far: f32, size_x: u32, size_y: u32) -> Self {
            View { view: FSceneView::new_perspective(to_vector(eye), to_vector(target), to_vector(up), fov_y_degrees, near, far, size_x, size_y) }
        }

        #[staticmethod]
        fn orthographic(eye: (f32, f32, f32), target: (f32, f32, f32), up: (f32, f32, f32), width: f32, height: f32, near: f32, far: f32, size_x: u32, size_y: u32) -> Self {
            View { view: FSceneView::new_orthographic(to_vector(eye), to_vector(target), to_vector(up), width, height, near, far, size_x, size_y) }
        }
    }

    /// Returns the index of the surface drawn at pixel (x, y), or None.
    #[pyfunction]
    fn resolve_surface(model: PyRef<Model>, view: PyRef<View>, x: i32, y: i32) -> PyResult<Option<usize>> {
        HModel::new(&model.model).resolve_surface(&view.view, x, y).map_err(to_py_err)
    }

    /// Builds the static index buffers for all nodes of the model as one component and
    /// returns them keyed by material name.
    #[pyfunction]
    fn build_index_buffers(mut model: PyRefMut<Model>) -> PyResult<HashMap<String, Vec<u32>>> {
        let nodes = (0..model.model.nodes.len()).collect();
        let mut components = vec![UModelComponent::new(0, None, nodes)];
        components[0].generate_elements(&mut model.model).map_err(to_py_err)?;
        let index_buffers = build_render_data(&model.model, &mut components).map_err(to_py_err)?;
        Ok(index_buffers.into_iter().map(|(material, buffer)| (material.name().to_string(), buffer.indices)).collect())
    }

    #[pymodule]
    fn bdk_model_render(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<Model>()?;
        m.add_class::<View>()?;
        m.add_function(wrap_pyfunction!(resolve_surface, m)?)?;
        m.add_function(wrap_pyfunction!(build_index_buffers, m)?)?;
        Ok(())
    }
}
