use cgmath::Vector3;
use std::ops::AddAssign;

type FVector = Vector3<f32>;

/// A rectangular minimum bounding volume. A default box is empty (`is_valid == false`)
/// and takes the extent of the first point added to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FBox {
    pub min: FVector,
    pub max: FVector,
    pub is_valid: bool
}

impl Default for FBox {
    fn default() -> Self {
        Self::new()
    }
}

impl FBox {

    pub fn new() -> FBox {
        FBox {
            min: FVector::new(0.0, 0.0, 0.0),
            max: FVector::new(0.0, 0.0, 0.0),
            is_valid: false
        }
    }

    pub fn new_from_min_max(min: FVector, max: FVector) -> FBox {
        FBox { min, max, is_valid: true }
    }

    pub fn add_point(&mut self, point: &FVector) {
        if self.is_valid {
            self.min.x = self.min.x.min(point.x);
            self.min.y = self.min.y.min(point.y);
            self.min.z = self.min.z.min(point.z);
            self.max.x = self.max.x.max(point.x);
            self.max.y = self.max.y.max(point.y);
            self.max.z = self.max.z.max(point.z);
        } else {
            self.min = *point;
            self.max = *point;
            self.is_valid = true;
        }
    }
}

impl AddAssign<FVector> for FBox {
    fn add_assign(&mut self, point: FVector) {
        self.add_point(&point);
    }
}
