use rand::Rng;

/// A 3-component vector used for positions and headings.
///
/// The simulation itself is planar; the third component exists for the
/// renderer's transform stage and is driven back to zero after every
/// integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector with the same direction, or `None` for the zero vector.
    ///
    /// Callers must handle `None`; there is no silent fallback here because
    /// each steering rule defines its own substitute heading.
    pub fn try_normalize(&self) -> Option<Self> {
        let mag = self.magnitude();
        if mag > 0.0 {
            Some(Self {
                x: self.x / mag,
                y: self.y / mag,
                z: self.z / mag,
            })
        } else {
            None
        }
    }

    pub fn distance(&self, other: &Vec3) -> f32 {
        (*self - *other).magnitude()
    }
}

impl core::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl core::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl core::ops::Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl core::ops::Div<f32> for Vec3 {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl core::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

/// Random planar unit heading: per-axis integer jitter in [-5, 5), redrawn
/// until nonzero, then normalized.
pub fn random_direction<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let x = rng.gen_range(0..10) as f32 - 5.0;
        let y = rng.gen_range(0..10) as f32 - 5.0;
        let v = Vec3::new(x, y, 0.0);
        if let Some(unit) = v.try_normalize() {
            return unit;
        }
    }
}
