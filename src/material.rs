use std::fmt;
use std::sync::Arc;

/// Name of the engine material a surface is drawn with. The material itself lives in
/// the renderer; the model only needs a cheap, hashable handle to bucket surfaces by.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UMaterialRef(Arc<str>);

/// Material used by surfaces that were never assigned one.
pub const DEFAULT_MATERIAL_NAME: &str = "DefaultMaterial";

impl UMaterialRef {
    pub fn new(name: &str) -> UMaterialRef {
        UMaterialRef(Arc::from(name))
    }

    pub fn default_material() -> UMaterialRef {
        UMaterialRef::new(DEFAULT_MATERIAL_NAME)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for UMaterialRef {
    fn default() -> Self {
        Self::default_material()
    }
}

impl From<&str> for UMaterialRef {
    fn from(name: &str) -> Self {
        UMaterialRef::new(name)
    }
}

impl fmt::Display for UMaterialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
