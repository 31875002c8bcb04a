//! Elliptic cylinder rasterization
//!
//! One quadrant of the ellipse is walked in normalized coordinates and
//! mirrored into the other three. Radii get a half-voxel bump so that a
//! radius of `r` covers voxel centres up to distance `r`.

use glam::IVec3;

use crate::core::error::PreconditionError;

/// Parameters of a vertical cylinder anchored at its base centre
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylinderSpec {
    /// Radius along X in voxels, before the half-voxel bump
    pub radius_ns: f64,
    /// Radius along Z in voxels, before the half-voxel bump
    pub radius_we: f64,
    /// Layer count; negative grows downward, zero is an empty shape
    pub height: i32,
    /// Solid disc per layer, or only the rim
    pub filled: bool,
}

impl CylinderSpec {
    /// Validate and build a spec from integer user arguments
    pub fn new(radius_ns: i32, radius_we: i32, height: i32, filled: bool) -> Result<Self, PreconditionError> {
        if radius_ns < 0 || radius_we < 0 {
            return Err(PreconditionError::InvalidShape(format!(
                "cylinder radii must not be negative (got {}, {})",
                radius_ns, radius_we
            )));
        }
        Ok(Self {
            radius_ns: radius_ns as f64,
            radius_we: radius_we as f64,
            height,
            filled,
        })
    }

    /// Base anchor and positive layer count after normalization,
    /// or `None` for a zero-height cylinder.
    ///
    /// A negative height is negated and the anchor moved up by it, so the
    /// cylinder occupies `[y + |height|, y + 2|height|)`.
    pub fn normalized_base(&self, anchor: IVec3, min_y: i32) -> Option<(IVec3, i32)> {
        if self.height == 0 {
            return None;
        }
        let mut base = anchor;
        let height = self.height.abs();
        if self.height < 0 {
            base.y += height;
        }
        base.y = base.y.max(min_y);
        Some((base, height))
    }

    /// Rasterize into voxel positions. Never yields the same position twice.
    pub fn rasterize(&self, anchor: IVec3, min_y: i32) -> Vec<IVec3> {
        let mut points = Vec::new();
        let Some((base, height)) = self.normalized_base(anchor, min_y) else {
            return points;
        };

        let radius_x = self.radius_ns + 0.5;
        let radius_z = self.radius_we + 0.5;
        let inv_radius_x = 1.0 / radius_x;
        let inv_radius_z = 1.0 / radius_z;
        let ceil_radius_x = radius_x.ceil() as i32;
        let ceil_radius_z = radius_z.ceil() as i32;

        let mut next_xn = 0.0;
        'rows: for x in 0..=ceil_radius_x {
            let xn = next_xn;
            next_xn = (x + 1) as f64 * inv_radius_x;
            let mut next_zn = 0.0;

            for z in 0..=ceil_radius_z {
                let zn = next_zn;
                next_zn = (z + 1) as f64 * inv_radius_z;

                if length_sq(xn, zn) > 1.0 {
                    if z == 0 {
                        // Later rows are only further out.
                        break 'rows;
                    }
                    break;
                }

                if !self.filled && length_sq(next_xn, zn) <= 1.0 && length_sq(xn, next_zn) <= 1.0 {
                    continue;
                }

                for y in 0..height {
                    push_mirrored(&mut points, base, x, y, z);
                }
            }
        }

        points
    }
}

fn length_sq(x: f64, z: f64) -> f64 {
    x * x + z * z
}

/// Push the four quadrant images of `(x, z)`, skipping repeats on the axes
fn push_mirrored(points: &mut Vec<IVec3>, base: IVec3, x: i32, y: i32, z: i32) {
    points.push(base + IVec3::new(x, y, z));
    if x != 0 {
        points.push(base + IVec3::new(-x, y, z));
    }
    if z != 0 {
        points.push(base + IVec3::new(x, y, -z));
    }
    if x != 0 && z != 0 {
        points.push(base + IVec3::new(-x, y, -z));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn footprint(points: &[IVec3]) -> HashSet<(i32, i32)> {
        points.iter().map(|p| (p.x, p.z)).collect()
    }

    /// Brute-force reference: every cell whose normalized offset is inside
    fn reference_disc(r: i32) -> HashSet<(i32, i32)> {
        let rr = r as f64 + 0.5;
        let mut set = HashSet::new();
        let bound = rr.ceil() as i32;
        for x in -bound..=bound {
            for z in -bound..=bound {
                let xn = x as f64 / rr;
                let zn = z as f64 / rr;
                if xn * xn + zn * zn <= 1.0 {
                    set.insert((x, z));
                }
            }
        }
        set
    }

    #[test]
    fn test_zero_height_is_empty() {
        for r in 0..4 {
            let spec = CylinderSpec::new(r, r + 1, 0, true).unwrap();
            assert!(spec.rasterize(IVec3::new(0, 10, 0), 1).is_empty());
        }
    }

    #[test]
    fn test_negative_radius_rejected() {
        assert!(matches!(
            CylinderSpec::new(-1, 2, 3, true),
            Err(PreconditionError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_radius_two_footprint() {
        let spec = CylinderSpec::new(2, 2, 3, true).unwrap();
        let points = spec.rasterize(IVec3::ZERO, 1);

        // x^2 + z^2 <= 6.25 gives 21 columns
        assert_eq!(footprint(&points).len(), 21);
        assert_eq!(points.len(), 21 * 3);

        let unique: HashSet<_> = points.iter().copied().collect();
        assert_eq!(unique.len(), points.len());

        // Anchor y=0 is lifted to the floor
        assert_eq!(points.iter().map(|p| p.y).min(), Some(1));
        assert_eq!(points.iter().map(|p| p.y).max(), Some(3));
    }

    #[test]
    fn test_filled_matches_reference() {
        for r in 0..7 {
            let spec = CylinderSpec::new(r, r, 1, true).unwrap();
            let points = spec.rasterize(IVec3::new(0, 5, 0), 1);
            assert_eq!(footprint(&points), reference_disc(r), "radius {}", r);
        }
    }

    #[test]
    fn test_hollow_is_subset_of_filled() {
        for r in 1..8 {
            let filled = CylinderSpec::new(r, r, 2, true).unwrap().rasterize(IVec3::new(0, 5, 0), 1);
            let hollow = CylinderSpec::new(r, r, 2, false).unwrap().rasterize(IVec3::new(0, 5, 0), 1);
            let filled: HashSet<_> = filled.into_iter().collect();
            let hollow: HashSet<_> = hollow.into_iter().collect();

            assert!(hollow.is_subset(&filled));
            assert!(hollow.len() < filled.len(), "radius {}", r);
            // Centre column is interior for any radius above zero
            assert!(!hollow.contains(&IVec3::new(0, 5, 0)));
            // Extreme along X is always on the rim
            assert!(hollow.contains(&IVec3::new(r, 5, 0)));
        }
    }

    #[test]
    fn test_negative_height_shifts_anchor_up() {
        let column = CylinderSpec::new(0, 0, -3, true).unwrap().rasterize(IVec3::new(0, 20, 0), 1);
        assert_eq!(column.iter().map(|p| p.y).collect::<Vec<_>>(), vec![23, 24, 25]);

        let anchor = IVec3::new(3, 20, -2);
        let up = CylinderSpec::new(2, 3, 4, true).unwrap().rasterize(anchor, 1);
        let flipped = CylinderSpec::new(2, 3, -4, true).unwrap().rasterize(anchor, 1);

        assert_eq!(footprint(&up), footprint(&flipped));
        let lowered: HashSet<_> = flipped.iter().map(|p| *p - IVec3::new(0, 4, 0)).collect();
        let up: HashSet<_> = up.into_iter().collect();
        assert_eq!(lowered, up);
    }

    #[test]
    fn test_negative_height_clamped_to_min_y() {
        let spec = CylinderSpec::new(0, 0, -2, true).unwrap();
        assert_eq!(spec.normalized_base(IVec3::new(0, -10, 0), 1), Some((IVec3::new(0, 1, 0), 2)));
    }

    #[test]
    fn test_elliptic_extents() {
        let spec = CylinderSpec::new(4, 1, 1, true).unwrap();
        let points = spec.rasterize(IVec3::new(0, 1, 0), 1);
        let max_x = points.iter().map(|p| p.x).max().unwrap();
        let max_z = points.iter().map(|p| p.z).max().unwrap();
        assert_eq!(max_x, 4);
        assert_eq!(max_z, 1);
    }
}
