//! Point containment for rings, polygons and multipolygons.
//!
//! Containment uses the even-odd rule (a horizontal ray cast towards +x),
//! with one fixed rule for points on an edge or vertex: polygons are closed
//! sets. A point exactly on the outer ring, or exactly on a hole ring, is
//! contained; only the strict interior of a hole is excised. "Exactly" means
//! in f64 arithmetic: the cross product of the edge and the point must be 0.
//!
//! A ring with fewer than 3 points (a repeated closing point does not count)
//! or with all of its points on one line contains nothing, edges included.
//!
//! `geo`'s `CoordinatePosition` gives the same answers on simple rings but
//! counts winding numbers, so self-intersecting rings differ: the center of
//! a pentagram is inside for `geo` and outside under even-odd.

use geo::{Coord, LineString, MultiPolygon, Point, Polygon};

/// Where a point lies relative to a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointPosition {
    Inside,
    OnBoundary,
    Outside,
}

/// Ring vertices without the repeated closing point, if any
fn open_vertices(ring: &LineString<f64>) -> &[Coord<f64>] {
    let coords = ring.0.as_slice();
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) if coords.len() > 1 && first == last => {
            &coords[..coords.len() - 1]
        }
        _ => coords,
    }
}

/// Number of distinct ring positions, ignoring the closing point
pub fn ring_point_count(ring: &LineString<f64>) -> usize {
    open_vertices(ring).len()
}

fn cross(o: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn is_degenerate(vertices: &[Coord<f64>]) -> bool {
    if vertices.len() < 3 {
        return true;
    }
    let origin = vertices[0];
    let Some(direction) = vertices.iter().copied().find(|v| *v != origin) else {
        return true;
    };
    vertices
        .iter()
        .all(|v| cross(origin, direction, *v) == 0.0)
}

/// True if a ring can never contain a point
pub fn is_degenerate_ring(ring: &LineString<f64>) -> bool {
    is_degenerate(open_vertices(ring))
}

fn on_segment(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    cross(a, b, p) == 0.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Classify a point against a ring, treating the ring as closed
pub fn ring_position(ring: &LineString<f64>, point: Coord<f64>) -> PointPosition {
    let vertices = open_vertices(ring);
    if is_degenerate(vertices) {
        return PointPosition::Outside;
    }

    let mut inside = false;
    let n = vertices.len();

    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];

        if on_segment(a, b, point) {
            return PointPosition::OnBoundary;
        }

        // Half-open in y so a ray through a vertex is counted once
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
    }

    if inside {
        PointPosition::Inside
    } else {
        PointPosition::Outside
    }
}

/// Outer ring (boundary included) minus the strict interior of every hole
pub fn polygon_contains(polygon: &Polygon<f64>, point: &Point<f64>) -> bool {
    let coord = point.0;
    if ring_position(polygon.exterior(), coord) == PointPosition::Outside {
        return false;
    }
    polygon
        .interiors()
        .iter()
        .all(|hole| ring_position(hole, coord) != PointPosition::Inside)
}

/// True if any member polygon contains the point
pub fn multipolygon_contains(geometry: &MultiPolygon<f64>, point: &Point<f64>) -> bool {
    geometry.0.iter().any(|polygon| polygon_contains(polygon, point))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(points.to_vec())
    }

    fn square(min: f64, max: f64) -> LineString<f64> {
        ring(&[(min, min), (min, max), (max, max), (max, min)])
    }

    fn at(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_square_interior_and_exterior() {
        let sq = square(0.0, 10.0);
        assert_eq!(ring_position(&sq, at(5.0, 5.0)), PointPosition::Inside);
        assert_eq!(ring_position(&sq, at(15.0, 15.0)), PointPosition::Outside);
        assert_eq!(ring_position(&sq, at(-1.0, 5.0)), PointPosition::Outside);
    }

    #[test]
    fn test_closed_and_open_rings_agree() {
        let open = square(0.0, 10.0);
        let closed = ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]);
        for p in [at(5.0, 5.0), at(0.0, 5.0), at(11.0, 5.0), at(10.0, 10.0)] {
            assert_eq!(ring_position(&open, p), ring_position(&closed, p));
        }
    }

    #[test]
    fn test_points_on_edges_and_vertices() {
        let sq = square(0.0, 10.0);
        // Every edge, including the implicit closing edge (10,0)->(0,0)
        for p in [at(0.0, 5.0), at(5.0, 10.0), at(10.0, 5.0), at(5.0, 0.0)] {
            assert_eq!(ring_position(&sq, p), PointPosition::OnBoundary);
        }
        for p in [at(0.0, 0.0), at(0.0, 10.0), at(10.0, 10.0), at(10.0, 0.0)] {
            assert_eq!(ring_position(&sq, p), PointPosition::OnBoundary);
        }
    }

    #[test]
    fn test_point_on_edge_extension_is_outside() {
        let sq = square(0.0, 10.0);
        assert_eq!(ring_position(&sq, at(0.0, 12.0)), PointPosition::Outside);
        assert_eq!(ring_position(&sq, at(-3.0, 0.0)), PointPosition::Outside);
    }

    #[test]
    fn test_ray_through_vertex() {
        let diamond = ring(&[(0.0, 5.0), (5.0, 0.0), (10.0, 5.0), (5.0, 10.0)]);
        assert_eq!(ring_position(&diamond, at(2.0, 5.0)), PointPosition::Inside);
        assert_eq!(ring_position(&diamond, at(12.0, 5.0)), PointPosition::Outside);
        assert_eq!(ring_position(&diamond, at(-2.0, 5.0)), PointPosition::Outside);
    }

    #[test]
    fn test_concave_ring() {
        // U shape opening upwards
        let u = ring(&[
            (0.0, 0.0),
            (9.0, 0.0),
            (9.0, 9.0),
            (6.0, 9.0),
            (6.0, 3.0),
            (3.0, 3.0),
            (3.0, 9.0),
            (0.0, 9.0),
        ]);
        assert_eq!(ring_position(&u, at(1.0, 8.0)), PointPosition::Inside);
        assert_eq!(ring_position(&u, at(7.0, 8.0)), PointPosition::Inside);
        assert_eq!(ring_position(&u, at(4.5, 6.0)), PointPosition::Outside);
        assert_eq!(ring_position(&u, at(4.5, 1.0)), PointPosition::Inside);
    }

    #[test]
    fn test_short_rings_contain_nothing() {
        let empty = ring(&[]);
        let single = ring(&[(1.0, 1.0)]);
        let pair = ring(&[(0.0, 0.0), (10.0, 10.0)]);
        let closed_pair = ring(&[(0.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        for r in [&empty, &single, &pair, &closed_pair] {
            for p in [at(0.0, 0.0), at(1.0, 1.0), at(5.0, 5.0), at(-1.0, 3.0)] {
                assert_eq!(ring_position(r, p), PointPosition::Outside);
            }
        }
        assert_eq!(ring_point_count(&closed_pair), 2);
    }

    #[test]
    fn test_collinear_ring_contains_nothing() {
        let line = ring(&[(0.0, 0.0), (5.0, 5.0), (10.0, 10.0)]);
        assert!(is_degenerate_ring(&line));
        assert_eq!(ring_position(&line, at(5.0, 5.0)), PointPosition::Outside);
        assert_eq!(ring_position(&line, at(2.0, 3.0)), PointPosition::Outside);

        let repeated = ring(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        assert!(is_degenerate_ring(&repeated));
        assert_eq!(ring_position(&repeated, at(1.0, 1.0)), PointPosition::Outside);
    }

    #[test]
    fn test_repeated_vertices_do_not_break_parity() {
        let sq = ring(&[
            (0.0, 0.0),
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
        ]);
        assert_eq!(ring_position(&sq, at(5.0, 5.0)), PointPosition::Inside);
        assert_eq!(ring_position(&sq, at(5.0, 0.0)), PointPosition::OnBoundary);
    }

    fn holed() -> Polygon<f64> {
        Polygon::new(
            ring(&[(0.0, 0.0), (0.0, 20.0), (20.0, 20.0), (20.0, 0.0)]),
            vec![square(5.0, 10.0)],
        )
    }

    #[test]
    fn test_polygon_with_hole() {
        let polygon = holed();
        assert!(polygon_contains(&polygon, &Point::new(1.0, 1.0)));
        assert!(!polygon_contains(&polygon, &Point::new(7.0, 7.0)));
        assert!(!polygon_contains(&polygon, &Point::new(25.0, 7.0)));
    }

    #[test]
    fn test_polygon_boundaries_are_closed() {
        let polygon = holed();
        // Outer edge and vertex
        assert!(polygon_contains(&polygon, &Point::new(0.0, 7.0)));
        assert!(polygon_contains(&polygon, &Point::new(20.0, 20.0)));
        // Hole edge and vertex
        assert!(polygon_contains(&polygon, &Point::new(5.0, 7.0)));
        assert!(polygon_contains(&polygon, &Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_degenerate_hole_excises_nothing() {
        let polygon = Polygon::new(square(0.0, 10.0), vec![ring(&[(2.0, 2.0), (3.0, 3.0)])]);
        assert!(polygon_contains(&polygon, &Point::new(2.5, 2.5)));
    }

    #[test]
    fn test_self_intersecting_ring_uses_even_odd() {
        let pentagram = ring(&[
            (0.0, 10.0),
            (5.88, -8.09),
            (-9.51, 3.09),
            (9.51, 3.09),
            (-5.88, -8.09),
        ]);
        assert_eq!(ring_position(&pentagram, at(0.0, 0.0)), PointPosition::Outside);
        assert_eq!(ring_position(&pentagram, at(0.0, 8.0)), PointPosition::Inside);
        assert_eq!(ring_position(&pentagram, at(0.0, 12.0)), PointPosition::Outside);
    }

    #[test]
    fn test_simple_polygons_agree_with_geo() {
        use geo::coordinate_position::{CoordPos, CoordinatePosition};

        let shapes = [
            holed(),
            Polygon::new(
                ring(&[(0.0, 5.0), (5.0, 0.0), (10.0, 5.0), (5.0, 10.0)]),
                vec![],
            ),
            Polygon::new(
                ring(&[
                    (0.0, 0.0),
                    (9.0, 0.0),
                    (9.0, 9.0),
                    (6.0, 9.0),
                    (6.0, 3.0),
                    (3.0, 3.0),
                    (3.0, 9.0),
                    (0.0, 9.0),
                ]),
                vec![],
            ),
        ];

        for polygon in &shapes {
            let outer = Polygon::new(polygon.exterior().clone(), vec![]);
            for i in -4..=88 {
                for j in -4..=88 {
                    let p = at(i as f64 * 0.25, j as f64 * 0.25);
                    let expected = match outer.coordinate_position(&p) {
                        CoordPos::Inside => PointPosition::Inside,
                        CoordPos::OnBoundary => PointPosition::OnBoundary,
                        CoordPos::Outside => PointPosition::Outside,
                    };
                    assert_eq!(ring_position(polygon.exterior(), p), expected, "at {p:?}");
                    assert_eq!(
                        polygon_contains(polygon, &Point(p)),
                        polygon.coordinate_position(&p) != CoordPos::Outside,
                        "at {p:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_multipolygon_any_member() {
        let islands = MultiPolygon::new(vec![
            Polygon::new(square(0.0, 1.0), vec![]),
            Polygon::new(square(5.0, 6.0), vec![]),
        ]);
        assert!(multipolygon_contains(&islands, &Point::new(0.5, 0.5)));
        assert!(multipolygon_contains(&islands, &Point::new(5.5, 5.5)));
        assert!(!multipolygon_contains(&islands, &Point::new(3.0, 3.0)));
    }
}
