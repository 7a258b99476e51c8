use crate::chunker::RootFrame;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::traits::MeshBearing;
use nalgebra::Point3;

/// `[min, cuts…, max]` along the root's X axis.
///
/// `cuts` are expected sorted and are kept as given. The list is
/// non-decreasing only when every cut lies inside the bound; a cut outside it
/// leaves an empty or inverted interval that no piece falls into.
pub fn boundary_list(bound: &Aabb, cuts: &[Real]) -> Vec<Real> {
    let mut boundaries = Vec::with_capacity(cuts.len() + 2);
    boundaries.push(bound.mins.x);
    boundaries.extend_from_slice(cuts);
    boundaries.push(bound.maxs.x);
    boundaries
}

/// Root-space X of the piece's local bound center. Pieces without geometry
/// are measured at their origin.
pub fn representative_x<M: MeshBearing + ?Sized>(root: &RootFrame, piece: &M) -> Real {
    let center = piece
        .local_bound()
        .map_or_else(Point3::origin, |bound| bound.center());
    let world = piece.transform().transform_point(&center);
    root.inverse_transform_point(&world).x
}

/// Index of the first interval `[b[j], b[j+1]]` containing `x`, both ends
/// inclusive; 0 when none does.
pub fn interval_index(boundaries: &[Real], x: Real) -> usize {
    boundaries
        .windows(2)
        .position(|pair| pair[0] <= x && x <= pair[1])
        .unwrap_or(0)
}

/// Group pieces by interval. The result has one entry per interval
/// (`boundaries.len() - 1`), each listing positions into `pieces`.
pub fn classify<'a, M, I>(root: &RootFrame, boundaries: &[Real], pieces: I) -> Vec<Vec<usize>>
where
    M: MeshBearing + ?Sized + 'a,
    I: IntoIterator<Item = &'a M>,
{
    let mut groups = vec![Vec::new(); boundaries.len().saturating_sub(1).max(1)];
    for (position, piece) in pieces.into_iter().enumerate() {
        let x = representative_x(root, piece);
        groups[interval_index(boundaries, x)].push(position);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_boundaries_prefer_lower_interval() {
        let b = [0.0, 12.4, 24.8];
        assert_eq!(interval_index(&b, 12.4), 0);
        assert_eq!(interval_index(&b, 12.5), 1);
        assert_eq!(interval_index(&b, 24.8), 1);
    }

    #[test]
    fn out_of_range_falls_back_to_first_interval() {
        let b = [0.0, 1.0, 2.0];
        assert_eq!(interval_index(&b, -0.5), 0);
        assert_eq!(interval_index(&b, 9.0), 0);
    }

    #[test]
    fn boundary_list_keeps_cuts_outside_bound() {
        let bound = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 1.0, 1.0));
        let b = boundary_list(&bound, &[-5.0, 5.0, 20.0]);
        assert_eq!(b, vec![0.0, -5.0, 5.0, 20.0, 10.0]);

        // [0, -5] holds nothing, so the bound's low end lands in [-5, 5]
        assert_eq!(interval_index(&b, 0.0), 1);
        assert_eq!(interval_index(&b, 7.0), 2);
        assert_eq!(interval_index(&b, 10.0), 2);
    }
}
