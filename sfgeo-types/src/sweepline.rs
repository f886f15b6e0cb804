//! Sweep-line search for intersecting segments.
//!
//! The sweep consumes the end points of all segments top-to-bottom and left-to-right. Every segment is *active*
//! between its start and end events, and a segment is only compared with the segments that are active when it
//! starts. Two segments can only touch if their extents along the sweep order overlap, so every touching pair is
//! found exactly once, at the start event of whichever segment is opened later.
//!
//! # Event order
//!
//! Points are ordered by `y` descending, then by `x` ascending. The two end points of every segment are arranged so
//! that its start event precedes its end event in this order, regardless of the segment's direction. Events at the
//! same point are ordered with start events before end events (so segments that touch at an end point are still
//! compared), and finally by the index of the segment in the input.

use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::coord::Coord;
use crate::segment::Segment;

/// Kind of a sweep event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SweepEventKind {
    /// The segment becomes active.
    Start,
    /// The segment stops being active.
    End,
}

/// One end point of a segment, as processed by the sweep.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SweepEvent {
    /// Position of the event.
    pub point: Coord,
    /// Index of the segment in the intersector input.
    pub segment: usize,
    /// Whether the segment starts or ends here.
    pub kind: SweepEventKind,
}

/// A touch between two segments.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Intersection {
    /// A common point of the two segments.
    pub point: Coord,
    /// The segment whose start event discovered the intersection.
    pub segment_a: Segment,
    /// The segment that was already active.
    pub segment_b: Segment,
    /// Index of `segment_a` in the intersector input.
    pub index_a: usize,
    /// Index of `segment_b` in the intersector input.
    pub index_b: usize,
}

/// Finds all pairs of touching segments in a set.
///
/// Events and intersections are computed on first access and cached afterwards.
///
/// ```
/// use sfgeo_types::{Coord, Segment, SweeplineIntersector};
///
/// let a = Segment::new((0.0, 0.0), (0.0, 1.0));
/// let b = Segment::new((-0.5, 0.5), (0.5, 0.5));
/// let intersector = SweeplineIntersector::new(vec![a, b]);
///
/// let intersections = intersector.intersections();
/// assert_eq!(intersections.len(), 1);
/// assert_eq!(intersections[0].point, Coord::xy(0.0, 0.5));
/// ```
#[derive(Debug, Default)]
pub struct SweeplineIntersector {
    segments: Vec<Segment>,
    events: OnceLock<Vec<SweepEvent>>,
    intersections: OnceLock<Vec<Intersection>>,
    proper_intersections: OnceLock<Vec<Intersection>>,
}

impl SweeplineIntersector {
    /// Creates a new intersector for the given segments.
    pub fn new(segments: impl IntoIterator<Item = Segment>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
            ..Default::default()
        }
    }

    /// The input segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Sorted sweep events, two per segment.
    pub fn events(&self) -> &[SweepEvent] {
        self.events.get_or_init(|| self.build_events())
    }

    /// All touching pairs in the order they were discovered by the sweep.
    pub fn intersections(&self) -> &[Intersection] {
        self.intersections.get_or_init(|| self.sweep())
    }

    /// Intersections that are not just two consecutive segments of a chain meeting at their shared vertex.
    ///
    /// Segments `i` and `i + 1` are consecutive if the end of `i` is the start of `i + 1`; the last and the first
    /// segments are consecutive if the chain is closed. A closed ring is simple iff this list is empty.
    pub fn proper_intersections(&self) -> &[Intersection] {
        self.proper_intersections.get_or_init(|| {
            self.intersections()
                .iter()
                .filter(|intersection| !self.is_chain_joint(intersection))
                .copied()
                .collect()
        })
    }

    fn build_events(&self) -> Vec<SweepEvent> {
        let mut events = Vec::with_capacity(self.segments.len() * 2);
        for (index, segment) in self.segments.iter().enumerate() {
            let (start, end) = if sweep_order(&segment.s(), &segment.e()) == Ordering::Greater {
                (segment.e(), segment.s())
            } else {
                (segment.s(), segment.e())
            };

            events.push(SweepEvent {
                point: start,
                segment: index,
                kind: SweepEventKind::Start,
            });
            events.push(SweepEvent {
                point: end,
                segment: index,
                kind: SweepEventKind::End,
            });
        }

        events.sort_by(|a, b| {
            sweep_order(&a.point, &b.point)
                .then(a.kind.cmp(&b.kind))
                .then(a.segment.cmp(&b.segment))
        });

        events
    }

    fn sweep(&self) -> Vec<Intersection> {
        let mut active: Vec<usize> = Vec::new();
        let mut intersections = Vec::new();
        let mut max_active = 0;

        for event in self.events() {
            match event.kind {
                SweepEventKind::Start => {
                    let segment = &self.segments[event.segment];
                    for &other_index in &active {
                        let other = &self.segments[other_index];
                        if let Some(point) = segment.segment_intersection(other) {
                            intersections.push(Intersection {
                                point,
                                segment_a: *segment,
                                segment_b: *other,
                                index_a: event.segment,
                                index_b: other_index,
                            });
                        }
                    }

                    active.push(event.segment);
                    max_active = max_active.max(active.len());
                }
                SweepEventKind::End => {
                    if let Some(position) = active.iter().position(|&i| i == event.segment) {
                        active.remove(position);
                    }
                }
            }
        }

        log::trace!(
            "Sweep over {} segments found {} intersections, max {max_active} active",
            self.segments.len(),
            intersections.len()
        );

        intersections
    }

    fn is_chain_joint(&self, intersection: &Intersection) -> bool {
        let low = intersection.index_a.min(intersection.index_b);
        let high = intersection.index_a.max(intersection.index_b);
        let last = self.segments.len().saturating_sub(1);

        let (first, second) = if high == low + 1
            && self.segments[low].e().equal_2d(&self.segments[high].s())
        {
            (self.segments[low], self.segments[high])
        } else if low == 0
            && high == last
            && self.segments[high].e().equal_2d(&self.segments[low].s())
        {
            (self.segments[high], self.segments[low])
        } else {
            return false;
        };

        let vertex = first.e();
        if !intersection.point.equal_2d(&vertex) {
            return false;
        }

        // Consecutive segments that fold back onto each other share more than the vertex.
        let overlaps = (!second.e().equal_2d(&vertex) && first.contains_point(&second.e()))
            || (!first.s().equal_2d(&vertex) && second.contains_point(&first.s()));

        !overlaps
    }
}

fn sweep_order(a: &Coord, b: &Coord) -> Ordering {
    b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x))
}

/// Splits a chain of coordinates into consecutive segments.
pub fn chain_segments(coords: &[Coord]) -> Vec<Segment> {
    coords
        .windows(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .collect()
}

/// Returns true if the chain of coordinates does not touch itself except at consecutive vertices and, for a closed
/// chain, at the closing vertex. Chains with repeated consecutive points are never simple.
pub fn is_simple_chain(coords: &[Coord]) -> bool {
    let segments = chain_segments(coords);
    if segments.iter().any(Segment::is_degenerate) {
        return false;
    }
    if segments.len() < 2 {
        return true;
    }

    SweeplineIntersector::new(segments)
        .proper_intersections()
        .is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_segments(points: &[(f64, f64)]) -> Vec<Segment> {
        let coords: Vec<Coord> = points.iter().map(|&p| p.into()).collect();
        chain_segments(&coords)
    }

    #[test]
    fn crossing_pair_is_reported_new_then_old() {
        let a = Segment::new((0.0, 0.0), (0.0, 1.0));
        let b = Segment::new((-0.5, 0.5), (0.5, 0.5));
        let intersector = SweeplineIntersector::new(vec![a, b]);

        let intersections = intersector.intersections();
        assert_eq!(intersections.len(), 1);
        assert_eq!(intersections[0].segment_a, b);
        assert_eq!(intersections[0].segment_b, a);
        assert_eq!(intersections[0].point, Coord::xy(0.0, 0.5));
        assert_eq!(intersector.proper_intersections().len(), 1);
    }

    #[test]
    fn events_are_ordered_top_to_bottom() {
        let a = Segment::new((0.0, 0.0), (0.0, 1.0));
        let b = Segment::new((-0.5, 0.5), (0.5, 0.5));
        let intersector = SweeplineIntersector::new(vec![a, b]);

        let events: Vec<_> = intersector
            .events()
            .iter()
            .map(|e| (e.segment, e.kind, e.point))
            .collect();
        assert_eq!(
            events,
            vec![
                (0, SweepEventKind::Start, Coord::xy(0.0, 1.0)),
                (1, SweepEventKind::Start, Coord::xy(-0.5, 0.5)),
                (1, SweepEventKind::End, Coord::xy(0.5, 0.5)),
                (0, SweepEventKind::End, Coord::xy(0.0, 0.0)),
            ]
        );
    }

    #[test]
    fn same_start_is_ordered_by_index() {
        let right = Segment::new((0.0, 1.0), (1.0, 0.0));
        let left = Segment::new((0.0, 1.0), (-1.0, 0.0));

        for segments in [vec![right, left], vec![left, right]] {
            let intersector = SweeplineIntersector::new(segments);
            let events = intersector.events();

            assert_eq!(events[0].kind, SweepEventKind::Start);
            assert_eq!(events[1].kind, SweepEventKind::Start);
            assert_eq!(events[0].segment, 0);
            assert_eq!(events[1].segment, 1);

            let intersections = intersector.intersections();
            assert_eq!(intersections.len(), 1);
            assert_eq!((intersections[0].index_a, intersections[0].index_b), (1, 0));
            assert_eq!(intersections[0].point, Coord::xy(0.0, 1.0));
        }
    }

    #[test]
    fn start_precedes_end_at_the_same_point() {
        let a = Segment::new((0.0, 1.0), (1.0, 0.0));
        let b = Segment::new((1.0, 0.0), (2.0, -1.0));
        let intersector = SweeplineIntersector::new(vec![a, b]);

        assert_eq!(intersector.intersections().len(), 1);
        assert_eq!(intersector.intersections()[0].point, Coord::xy(1.0, 0.0));
    }

    #[test]
    fn square_has_no_proper_intersections() {
        let segments = ring_segments(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.5),
            (0.0, 0.0),
        ]);
        assert_eq!(segments.len(), 5);

        let intersector = SweeplineIntersector::new(segments);
        assert_eq!(intersector.intersections().len(), 5);
        assert!(intersector.proper_intersections().is_empty());
    }

    #[test]
    fn hourglass_has_one_proper_intersection() {
        let segments = ring_segments(&[
            (0.0, 0.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ]);

        let intersector = SweeplineIntersector::new(segments);
        let proper = intersector.proper_intersections();
        assert_eq!(proper.len(), 1);
        assert_eq!(proper[0].point, Coord::xy(0.5, 0.5));
    }

    #[test]
    fn disjoint_segments() {
        let intersector = SweeplineIntersector::new(vec![
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((0.0, 1.0), (1.0, 1.0)),
            Segment::new((2.0, 2.0), (3.0, 3.0)),
        ]);
        assert!(intersector.intersections().is_empty());
    }

    #[test]
    fn every_pair_is_recorded_once() {
        let intersector = SweeplineIntersector::new(vec![
            Segment::new((0.0, 0.0), (2.0, 2.0)),
            Segment::new((0.0, 2.0), (2.0, 0.0)),
            Segment::new((1.0, -1.0), (1.0, 3.0)),
        ]);

        let mut pairs: Vec<_> = intersector
            .intersections()
            .iter()
            .map(|i| (i.index_a.min(i.index_b), i.index_a.max(i.index_b)))
            .collect();
        pairs.sort();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
        assert!(intersector
            .intersections()
            .iter()
            .all(|i| i.point == Coord::xy(1.0, 1.0)));
    }

    #[test]
    fn simple_chains() {
        let coords =
            |points: &[(f64, f64)]| points.iter().map(|&p| p.into()).collect::<Vec<Coord>>();

        assert!(is_simple_chain(&coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])));
        assert!(is_simple_chain(&coords(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])));
        assert!(!is_simple_chain(&coords(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0)])));
        assert!(!is_simple_chain(&coords(&[(0.0, 0.0), (0.0, 0.0), (1.0, 0.0)])));
        assert!(!is_simple_chain(&coords(&[
            (0.0, 0.0),
            (2.0, 2.0),
            (2.0, 0.0),
            (0.0, 2.0),
        ])));
        assert!(is_simple_chain(&[]));
    }

    #[test]
    fn overlapping_edges_are_proper() {
        // The fifth edge runs back along the first one between x=1 and x=3.
        let coords: Vec<Coord> = [
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (3.0, 1.0),
            (3.0, 0.0),
            (1.0, 0.0),
            (1.0, -1.0),
            (0.0, -1.0),
            (0.0, 0.0),
        ]
        .into_iter()
        .map(Coord::from)
        .collect();
        assert!(!is_simple_chain(&coords));

        let segments = chain_segments(&coords);
        let overlap = (segments[0], segments[4]);

        let intersector = SweeplineIntersector::new(segments);
        let recorded: Vec<_> = intersector
            .proper_intersections()
            .iter()
            .filter(|i| i.index_a.min(i.index_b) == 0 && i.index_a.max(i.index_b) == 4)
            .collect();

        assert_eq!(recorded.len(), 1);
        assert!(overlap.0.contains_point(&recorded[0].point));
        assert!(overlap.1.contains_point(&recorded[0].point));
    }
}
