//! Distance sensor array: a fan of rays cast against track boundaries.

use arrayvec::ArrayVec;

use crate::{config::SimConfig, geometry::Vec2, kinematics::AgentPose, track::Track};

/// Upper bound on configurable ray count; sized so a reading stays inline.
pub const MAX_SENSOR_RAYS: usize = 32;

/// One tick's sensor output: normalized boundary distances, ordered from the
/// leftmost ray to the rightmost.
///
/// Each value is in `[0, 1]`; `1.0` means no boundary within range.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    distances: ArrayVec<f32, MAX_SENSOR_RAYS>,
}

impl SensorReading {
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.distances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Reading with every ray at full range, used before the first tick.
    #[must_use]
    pub fn open(ray_count: usize) -> Self {
        let mut distances = ArrayVec::new();
        for _ in 0..ray_count.min(MAX_SENSOR_RAYS) {
            distances.push(1.0);
        }
        Self { distances }
    }
}

/// Casts a fixed fan of rays from an agent's pose.
///
/// Pure and stateless: the same pose and track always produce the same
/// reading, which is what makes episodes reproducible and testable.
#[derive(Debug, Clone, Copy)]
pub struct SensorArray {
    ray_count: usize,
    spread: f32,
    max_range: f32,
}

impl SensorArray {
    /// # Panics
    ///
    /// Panics if `ray_count` is zero or above [`MAX_SENSOR_RAYS`]; config
    /// validation rejects both before an episode is built.
    #[must_use]
    pub fn new(ray_count: usize, spread: f32, max_range: f32) -> Self {
        assert!(
            ray_count > 0 && ray_count <= MAX_SENSOR_RAYS,
            "ray count out of range"
        );
        Self {
            ray_count,
            spread,
            max_range,
        }
    }

    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.ray_count, config.ray_spread, config.ray_max_range)
    }

    #[must_use]
    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    /// Casts all rays and returns the normalized reading.
    ///
    /// A zero `max_range` degenerates to an all-open reading rather than a
    /// fault.
    #[must_use]
    pub fn read(&self, track: &Track, pose: &AgentPose) -> SensorReading {
        let mut distances = ArrayVec::new();
        for ray in 0..self.ray_count {
            let value = if self.max_range <= 0.0 {
                1.0
            } else {
                match track.intersect_ray(
                    pose.position,
                    Vec2::from_angle(self.ray_angle(pose.heading, ray)),
                    self.max_range,
                ) {
                    Some(distance) => distance.min(self.max_range) / self.max_range,
                    None => 1.0,
                }
            };
            distances.push(value);
        }
        SensorReading { distances }
    }

    /// World angle of ray `index`, spread symmetrically about the heading.
    #[expect(clippy::cast_precision_loss)]
    fn ray_angle(&self, heading: f32, index: usize) -> f32 {
        if self.ray_count == 1 {
            return heading;
        }
        let step = self.spread / (self.ray_count - 1) as f32;
        heading - self.spread / 2.0 + step * index as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Track {
        Track::square_loop(100.0, 10.0)
    }

    fn centered_pose() -> AgentPose {
        track().start_pose()
    }

    #[test]
    fn test_reading_has_one_value_per_ray_in_unit_range() {
        let track = track();
        let pose = centered_pose();
        for ray_count in [1, 2, 5, MAX_SENSOR_RAYS] {
            let sensors = SensorArray::new(ray_count, std::f32::consts::PI, 650.0);
            let reading = sensors.read(&track, &pose);
            assert_eq!(reading.len(), ray_count);
            for value in reading.as_slice() {
                assert!((0.0..=1.0).contains(value), "out of range: {value}");
            }
        }
    }

    #[test]
    fn test_reading_is_deterministic() {
        let track = track();
        let pose = centered_pose();
        let sensors = SensorArray::new(7, std::f32::consts::PI, 650.0);
        let first = sensors.read(&track, &pose);
        for _ in 0..10 {
            assert_eq!(sensors.read(&track, &pose), first);
        }
    }

    #[test]
    fn test_zero_max_range_reads_all_open() {
        let track = track();
        let pose = centered_pose();
        let sensors = SensorArray::new(5, std::f32::consts::PI, 0.0);
        let reading = sensors.read(&track, &pose);
        assert_eq!(reading.as_slice(), &[1.0; 5]);
    }

    #[test]
    fn test_side_rays_see_the_lane_walls() {
        let track = track();
        // Centered in the 10-wide bottom lane, facing +x: rays straight left
        // and right hit walls 5 away.
        let pose = centered_pose();
        let sensors = SensorArray::new(3, std::f32::consts::PI, 50.0);
        let reading = sensors.read(&track, &pose);
        // Leftmost ray points at -90°, center at 0°, rightmost at +90°.
        assert!((reading.as_slice()[0] - 0.1).abs() < 1e-3);
        assert!((reading.as_slice()[2] - 0.1).abs() < 1e-3);
        // The forward ray runs parallel to the lane for 45 units, then the
        // outer wall at x=100.
        assert!(reading.as_slice()[1] > 0.9);
    }

    #[test]
    fn test_out_of_range_walls_read_open() {
        let track = track();
        let pose = centered_pose();
        let sensors = SensorArray::new(1, 0.0, 2.0);
        let reading = sensors.read(&track, &pose);
        assert_eq!(reading.as_slice(), &[1.0]);
    }

    #[test]
    fn test_open_reading() {
        let reading = SensorReading::open(4);
        assert_eq!(reading.as_slice(), &[1.0; 4]);
        assert!(!reading.is_empty());
    }
}
