//! Ray casting against occupied cells and the ground plane.

use glam::DVec3;
use shared::{Cell, Face, GridExtent};

/// Below this a direction component counts as parallel to the slab
const PARALLEL_EPSILON: f64 = 1e-8;
/// Tolerance for deciding which box plane a hit point lies on
const FACE_EPSILON: f64 = 1e-5;

/// A ray in world space with a unit-length direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`. `None` for a zero or non-finite direction.
    pub fn new(origin: DVec3, direction: DVec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Unit box `[cell, cell + 1]`
    pub fn from_cell(cell: Cell) -> Self {
        let min = DVec3::new(cell.x as f64, cell.y as f64, cell.z as f64);
        Self {
            min,
            max: min + DVec3::ONE,
        }
    }

    /// Which of the six planes `point` lies on, tested in `Face::ALL` order
    fn face_at(&self, point: DVec3) -> Option<Face> {
        Face::ALL.into_iter().find(|face| {
            let (axis_value, plane) = match face {
                Face::Bottom => (point.z, self.min.z),
                Face::Top => (point.z, self.max.z),
                Face::Left => (point.x, self.min.x),
                Face::Right => (point.x, self.max.x),
                Face::Front => (point.y, self.min.y),
                Face::Back => (point.y, self.max.y),
            };
            (axis_value - plane).abs() < FACE_EPSILON
        })
    }
}

/// Ray-AABB intersection using the slab method.
///
/// Returns the first positive distance along the ray: the entry distance when
/// the box is ahead, the exit distance when the origin is inside it.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f64> {
    let mut t_min = f64::NEG_INFINITY;
    let mut t_max = f64::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

        if dir.abs() < PARALLEL_EPSILON {
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }

        let mut t1 = (lo - origin) / dir;
        let mut t2 = (hi - origin) / dir;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    if t_min > 0.0 {
        Some(t_min)
    } else if t_max > 0.0 {
        Some(t_max)
    } else {
        None
    }
}

/// A ray hit on an occupied cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellHit {
    pub cell: Cell,
    pub face: Face,
    pub distance: f64,
}

/// Intersect a ray with one unit cell and classify the face that was hit
pub fn ray_cell(ray: &Ray, cell: Cell) -> Option<CellHit> {
    let aabb = Aabb::from_cell(cell);
    let distance = ray_aabb(ray, &aabb)?;
    let face = aabb.face_at(ray.at(distance))?;
    Some(CellHit {
        cell,
        face,
        distance,
    })
}

/// Nearest hit among `cells`
pub fn pick_nearest_cell(ray: &Ray, cells: impl IntoIterator<Item = Cell>) -> Option<CellHit> {
    let mut best: Option<CellHit> = None;

    for cell in cells {
        if let Some(hit) = ray_cell(ray, cell) {
            if best.as_ref().is_none_or(|b| hit.distance < b.distance) {
                best = Some(hit);
            }
        }
    }

    best
}

/// A ray hit on the `z = 0` ground plane inside the grid footprint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub x: i32,
    pub y: i32,
    pub distance: f64,
}

/// Intersect the ray with the ground plane and floor into a grid column
pub fn ray_ground(ray: &Ray, extent: &GridExtent) -> Option<GroundHit> {
    if ray.direction.z.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let t = -ray.origin.z / ray.direction.z;
    if t <= 0.0 {
        return None;
    }

    let point = ray.at(t);
    let x = point.x.floor();
    let y = point.y.floor();
    let representable = |v: f64| v.is_finite() && v.abs() < i32::MAX as f64;
    if !representable(x) || !representable(y) {
        return None;
    }
    let (x, y) = (x as i32, y as i32);

    extent.contains_column(x, y).then_some(GroundHit { x, y, distance: t })
}

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hover {
    #[default]
    None,
    /// A face of an occupied cell
    Face { cell: Cell, face: Face },
    /// An empty ground column
    Ground { x: i32, y: i32 },
}

impl Hover {
    /// The occupied cell under the pointer, if any
    pub fn cell(&self) -> Option<Cell> {
        match *self {
            Hover::Face { cell, .. } => Some(cell),
            _ => None,
        }
    }
}

/// Resolve hover state for a ray.
///
/// The ground plane is only tested when no cube was hit, or when
/// `ground_always` is set (placing mode); it wins only if it is nearer.
pub fn resolve_hover(
    ray: &Ray,
    cells: impl IntoIterator<Item = Cell>,
    extent: &GridExtent,
    ground_always: bool,
) -> Hover {
    let cube_hit = pick_nearest_cell(ray, cells);

    if cube_hit.is_none() || ground_always {
        if let Some(ground) = ray_ground(ray, extent) {
            if cube_hit.is_none_or(|hit| ground.distance < hit.distance) {
                return Hover::Ground {
                    x: ground.x,
                    y: ground.y,
                };
            }
        }
    }

    match cube_hit {
        Some(hit) => Hover::Face {
            cell: hit.cell,
            face: hit.face,
        },
        None => Hover::None,
    }
}
