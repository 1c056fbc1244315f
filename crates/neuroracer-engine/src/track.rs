//! Track geometry: boundary loops, containment, and centerline progress.
//!
//! A [`Track`] is an immutable description of a closed circuit: an outer
//! boundary loop, an inner boundary loop (the island in the middle), and a
//! centerline used to measure progress. A position is on the track when it is
//! inside the outer loop and outside the inner one.
//!
//! Progress is measured as arclength along the centerline. The raw projection
//! wraps at the start gate (centerline origin); [`ProgressTracker`] unwraps
//! per-tick deltas across the gate so accumulated progress is continuous and
//! lap counting needs no special cases.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Segment, Vec2, point_in_polygon},
    kinematics::AgentPose,
};

/// Positions closer than this to a boundary segment count as out of bounds.
pub const BOUNDARY_MARGIN: f32 = 1e-3;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrackError {
    #[display("boundary loop needs at least 3 vertices, got {count}")]
    DegenerateLoop { count: usize },
    #[display("centerline needs at least 3 vertices, got {count}")]
    DegenerateCenterline { count: usize },
    #[display("track definition contains a non-finite coordinate")]
    NonFiniteCoordinate,
}

/// Immutable closed-circuit geometry.
///
/// Shared read-only across concurrently evaluated episodes; all mutable
/// simulation state lives in the episode that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    outer: Vec<Vec2>,
    inner: Vec<Vec2>,
    segments: Vec<Segment>,
    centerline: Vec<Vec2>,
    // Arclength at each centerline vertex; last entry is the lap length.
    cumulative: Vec<f32>,
}

impl Track {
    /// Builds a track from its outer loop, inner loop, and centerline.
    ///
    /// All three are closed implicitly (last vertex connects to the first).
    /// The first centerline vertex is the start gate: progress is measured
    /// from it, and [`Track::start_pose`] faces along the first centerline
    /// segment.
    pub fn new(outer: Vec<Vec2>, inner: Vec<Vec2>, centerline: Vec<Vec2>) -> Result<Self, TrackError> {
        for boundary in [&outer, &inner] {
            if boundary.len() < 3 {
                return Err(TrackError::DegenerateLoop {
                    count: boundary.len(),
                });
            }
        }
        if centerline.len() < 3 {
            return Err(TrackError::DegenerateCenterline {
                count: centerline.len(),
            });
        }
        if outer
            .iter()
            .chain(&inner)
            .chain(&centerline)
            .any(|p| !p.is_finite())
        {
            return Err(TrackError::NonFiniteCoordinate);
        }

        let segments = loop_segments(&outer).chain(loop_segments(&inner)).collect();

        let mut cumulative = Vec::with_capacity(centerline.len() + 1);
        let mut length = 0.0;
        cumulative.push(0.0);
        for segment in loop_segments(&centerline) {
            length += segment.length();
            cumulative.push(length);
        }

        Ok(Self {
            outer,
            inner,
            segments,
            centerline,
            cumulative,
        })
    }

    /// A square circuit: outer wall of side `outer_size`, lane `lane_width`
    /// wide, start gate at the middle of the bottom straight facing +x.
    #[must_use]
    pub fn square_loop(outer_size: f32, lane_width: f32) -> Self {
        assert!(
            outer_size > 2.0 * lane_width && lane_width > 0.0,
            "lane must fit inside the outer wall"
        );
        let s = outer_size;
        let w = lane_width;
        let h = lane_width / 2.0;
        let outer = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(s, 0.0),
            Vec2::new(s, s),
            Vec2::new(0.0, s),
        ];
        let inner = vec![
            Vec2::new(w, w),
            Vec2::new(s - w, w),
            Vec2::new(s - w, s - w),
            Vec2::new(w, s - w),
        ];
        let centerline = vec![
            Vec2::new(s / 2.0, h),
            Vec2::new(s - h, h),
            Vec2::new(s - h, s - h),
            Vec2::new(h, s - h),
            Vec2::new(h, h),
        ];
        Self::new(outer, inner, centerline).unwrap()
    }

    /// Nearest boundary hit along a ray, within `max_range`.
    #[must_use]
    pub fn intersect_ray(&self, origin: Vec2, dir: Vec2, max_range: f32) -> Option<f32> {
        self.segments
            .iter()
            .filter_map(|segment| segment.intersect_ray(origin, dir, max_range))
            .min_by(f32::total_cmp)
    }

    /// Whether `position` is off the drivable lane.
    ///
    /// True outside the outer loop, inside the inner loop, or within
    /// [`BOUNDARY_MARGIN`] of any wall, so a pose exactly on a wall is
    /// classified deterministically.
    #[must_use]
    pub fn is_out_of_bounds(&self, position: Vec2) -> bool {
        if !point_in_polygon(position, &self.outer) {
            return true;
        }
        if point_in_polygon(position, &self.inner) {
            return true;
        }
        self.segments
            .iter()
            .any(|segment| segment.distance_to_point(position) < BOUNDARY_MARGIN)
    }

    /// Arclength of the projection of `position` onto the centerline, in
    /// `[0, centerline_length)`.
    #[must_use]
    pub fn local_progress(&self, position: Vec2) -> f32 {
        let mut best_distance = f32::INFINITY;
        let mut best_arclength = 0.0;
        for (index, segment) in loop_segments(&self.centerline).enumerate() {
            let seg = segment.direction();
            let len_sq = seg.length_squared();
            if len_sq <= f32::EPSILON {
                continue;
            }
            let t = ((position - segment.start).dot(seg) / len_sq).clamp(0.0, 1.0);
            let projected = segment.start + seg * t;
            let distance = projected.distance_to(position);
            if distance < best_distance {
                best_distance = distance;
                best_arclength = self.cumulative[index] + segment.length() * t;
            }
        }
        // The closing vertex projects to exactly the lap length; wrap it.
        if best_arclength >= self.centerline_length() {
            0.0
        } else {
            best_arclength
        }
    }

    /// Total centerline arclength of one lap.
    #[must_use]
    pub fn centerline_length(&self) -> f32 {
        *self.cumulative.last().unwrap()
    }

    /// Start gate pose: first centerline vertex, facing the second.
    #[must_use]
    pub fn start_pose(&self) -> AgentPose {
        let gate = self.centerline[0];
        let towards = self.centerline[1] - gate;
        AgentPose::new(gate, towards.y.atan2(towards.x))
    }

    /// All boundary segments (outer then inner), for sensors and rendering.
    #[must_use]
    pub fn boundary_segments(&self) -> &[Segment] {
        &self.segments
    }
}

fn loop_segments(vertices: &[Vec2]) -> impl Iterator<Item = Segment> + '_ {
    (0..vertices.len()).map(|i| Segment::new(vertices[i], vertices[(i + 1) % vertices.len()]))
}

/// Accumulates continuous progress along a track's centerline.
///
/// Local progress wraps from lap length back to zero at the start gate; this
/// tracker unwraps per-tick deltas (anything beyond half a lap in one tick is
/// a gate crossing) so the accumulated value is monotonic for forward driving
/// and signed for reversing.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    lap_length: f32,
    last_local: f32,
    total: f32,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(track: &Track, start: Vec2) -> Self {
        Self {
            lap_length: track.centerline_length(),
            last_local: track.local_progress(start),
            total: 0.0,
        }
    }

    /// Advances to `position`, returning the (signed) progress delta.
    pub fn advance(&mut self, track: &Track, position: Vec2) -> f32 {
        let local = track.local_progress(position);
        let mut delta = local - self.last_local;
        if delta > self.lap_length / 2.0 {
            delta -= self.lap_length;
        } else if delta < -self.lap_length / 2.0 {
            delta += self.lap_length;
        }
        self.last_local = local;
        self.total += delta;
        delta
    }

    /// Net progress since the start, in track units.
    #[must_use]
    pub fn total_progress(&self) -> f32 {
        self.total
    }

    /// Completed forward laps.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn completed_laps(&self) -> u32 {
        if self.total <= 0.0 {
            0
        } else {
            (self.total / self.lap_length) as u32
        }
    }
}
