use lens3d_core::config::PlaneConfig;
use lens3d_core::geom::{triangle_area_heron, Point3};
use lens3d_core::model::{Attributes, Handle, Segment};
use lens3d_core::planes::{are_adjacent, extract_planes, extract_planes_with, planes_to_segments, PlaneSummary};

fn seg(id: &str, a: (f64, f64, f64), b: (f64, f64, f64)) -> Segment {
    Segment::new(
        Handle::new(id),
        Point3::new(a.0, a.1, a.2),
        Point3::new(b.0, b.1, b.2),
    )
}

fn unit_square() -> Vec<Segment> {
    vec![
        seg("A", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        seg("B", (1.0, 0.0, 0.0), (1.0, 1.0, 0.0)),
        seg("C", (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)),
        seg("D", (0.0, 1.0, 0.0), (0.0, 0.0, 0.0)),
    ]
}

#[test]
fn unit_square_yields_two_half_unit_planes() {
    let planes = extract_planes(&unit_square());
    assert_eq!(2, planes.len());
    for plane in &planes {
        assert!((plane.area - 0.5).abs() < 1e-12);
    }
    assert_eq!("A", planes[0].first.handle.0);
    assert_eq!("B", planes[0].second.handle.0);
    assert_eq!("C", planes[1].first.handle.0);
    assert_eq!("D", planes[1].second.handle.0);
}

#[test]
fn plane_points_keep_first_encountered_order() {
    let planes = extract_planes(&unit_square());
    assert_eq!(
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ],
        planes[0].points
    );
}

#[test]
fn shared_endpoint_matches_heron() {
    let a = seg("1", (0.0, 0.0, 0.0), (2.0, 0.0, 1.0));
    let b = seg("2", (0.5, 3.0, -1.0), (2.0, 0.0, 1.0));
    let planes = extract_planes(&[a, b]);
    assert_eq!(1, planes.len());
    let expected = triangle_area_heron(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 1.0),
        Point3::new(0.5, 3.0, -1.0),
    );
    assert!((planes[0].area - expected).abs() < 1e-9);
}

#[test]
fn collinear_pair_yields_nothing() {
    let segments = [
        seg("1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        seg("2", (1.0, 0.0, 0.0), (2.0, 0.0, 0.0)),
    ];
    assert!(extract_planes(&segments).is_empty());
}

#[test]
fn identical_segments_do_not_form_a_plane() {
    let segments = [
        seg("1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        seg("2", (1.0, 0.0, 0.0), (0.0, 0.0, 0.0)),
    ];
    assert!(are_adjacent(&segments[0], &segments[1], 0.001));
    assert!(extract_planes(&segments).is_empty());
}

#[test]
fn endpoints_within_tolerance_are_adjacent() {
    let a = seg("1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0));
    let b = seg("2", (1.0005, 0.0, 0.0), (1.0, 1.0, 0.0));
    assert!(are_adjacent(&a, &b, 0.001));
    assert_eq!(1, extract_planes(&[a, b]).len());
}

#[test]
fn only_consecutive_segments_are_paired() {
    // A and C touch, but B sits between them and touches neither.
    let segments = [
        seg("A", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        seg("B", (5.0, 5.0, 0.0), (6.0, 5.0, 0.0)),
        seg("C", (1.0, 0.0, 0.0), (1.0, 1.0, 0.0)),
    ];
    assert!(extract_planes(&segments).is_empty());
}

#[test]
fn consumed_segment_is_not_reused_by_the_next_pair() {
    // A-B forms a plane; B-C would too, but B is already consumed.
    let segments = [
        seg("A", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        seg("B", (1.0, 0.0, 0.0), (1.0, 1.0, 0.0)),
        seg("C", (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)),
    ];
    let planes = extract_planes(&segments);
    assert_eq!(1, planes.len());
    assert_eq!("A", planes[0].first.handle.0);
}

#[test]
fn degenerate_pair_advances_by_one() {
    // A-B is collinear, so B is still available to pair with C.
    let segments = [
        seg("A", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        seg("B", (1.0, 0.0, 0.0), (2.0, 0.0, 0.0)),
        seg("C", (2.0, 0.0, 0.0), (2.0, 1.0, 0.0)),
    ];
    let planes = extract_planes(&segments);
    assert_eq!(1, planes.len());
    assert_eq!("B", planes[0].first.handle.0);
    assert_eq!("C", planes[0].second.handle.0);
}

#[test]
fn looser_tolerance_joins_wider_gaps() {
    let segments = [
        seg("1", (0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        seg("2", (1.05, 0.0, 0.0), (1.0, 1.0, 0.0)),
    ];
    assert!(extract_planes(&segments).is_empty());
    let cfg = PlaneConfig {
        tolerance: 0.1,
        ..PlaneConfig::default()
    };
    assert_eq!(1, extract_planes_with(&segments, &cfg).len());
}

#[test]
fn planes_reduce_to_first_edge_with_source_attributes() {
    let mut segments = unit_square();
    segments[0].attrs = Attributes {
        layer: Some("CUT".to_string()),
        linetype: None,
        color_index: Some(163),
    };
    let planes = extract_planes(&segments);
    let reduced = planes_to_segments(&planes);
    assert_eq!(2, reduced.len());
    assert_eq!(Point3::new(0.0, 0.0, 0.0), reduced[0].start);
    assert_eq!(Point3::new(1.0, 0.0, 0.0), reduced[0].end);
    assert_eq!(Some("CUT".to_string()), reduced[0].attrs.layer);
    assert_eq!(Some(163), reduced[0].attrs.color_index);

    let summary = PlaneSummary::new(segments.len(), &planes);
    assert_eq!(2, summary.planes);
    assert!((summary.total_area - 1.0).abs() < 1e-12);
}
