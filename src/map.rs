//! The street map consumed by the simulation: directed street segments
//! plus the intersection points where traffic lights are installed.

use crate::math::{bearing, distance, Point2d};
use crate::{LightCategory, SegmentId, SegmentSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The category of a street segment, which scales vehicle speeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SegmentCategory {
    Primary,
    Secondary,
    Cobblestone,
}

impl SegmentCategory {
    /// The factor applied to a vehicle's base speed on this kind of street.
    pub fn speed_factor(self) -> f64 {
        match self {
            Self::Primary => 1.0,
            Self::Secondary => 0.8,
            Self::Cobblestone => 0.6,
        }
    }

    /// Whether vehicles may be spawned onto segments of this category.
    pub fn spawnable(self) -> bool {
        matches!(self, Self::Primary | Self::Secondary)
    }
}

/// The rough orientation of a segment, carried through for renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
    Diagonal,
}

/// A directed street segment running from `start` to `end`.
#[derive(Clone, Debug)]
pub struct Segment {
    /// The point vehicles enter the segment at.
    pub start: Point2d,
    /// The point vehicles leave the segment at.
    pub end: Point2d,
    /// The width of the street in world units.
    pub width: f64,
    /// The category of the street.
    pub category: SegmentCategory,
    /// The authoring orientation tag.
    pub orientation: Orientation,
    /// The speed limit on the segment.
    pub speed_limit: f64,
}

impl Segment {
    /// Gets the length of the segment.
    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    /// Gets the bearing of the segment in radians.
    pub fn bearing(&self) -> f64 {
        bearing(self.start, self.end)
    }

    /// Gets the point at the given progress along the segment.
    /// `progress` is clamped to `[0, 1]`.
    pub fn point_at_progress(&self, progress: f64) -> Point2d {
        let t = progress.clamp(0.0, 1.0);
        Point2d::new(
            self.start.x + (self.end.x - self.start.x) * t,
            self.start.y + (self.end.y - self.start.y) * t,
        )
    }

    /// Gets the four corners of the quadrilateral covering the street,
    /// for rendering. Degenerate segments collapse to their start point.
    pub fn corners(&self) -> [Point2d; 4] {
        let len = self.length();
        if len == 0.0 {
            return [self.start; 4];
        }
        // Unit vector perpendicular to the segment
        let ux = -(self.end.y - self.start.y) / len;
        let uy = (self.end.x - self.start.x) / len;
        let half = 0.5 * self.width;
        [
            Point2d::new(self.start.x + ux * half, self.start.y + uy * half),
            Point2d::new(self.start.x - ux * half, self.start.y - uy * half),
            Point2d::new(self.end.x - ux * half, self.end.y - uy * half),
            Point2d::new(self.end.x + ux * half, self.end.y + uy * half),
        ]
    }
}

/// An intersection point where a traffic light is installed.
#[derive(Clone, Copy, Debug)]
pub struct Intersection {
    /// The position of the intersection.
    pub position: Point2d,
    /// The category of light to install.
    pub category: LightCategory,
}

/// An error found while validating a street map.
#[derive(Clone, Debug, PartialEq)]
pub enum MapError {
    /// The map contains no segments at all.
    NoSegments,
    /// The map contains no segment vehicles could be spawned onto.
    NoSpawnSegments,
    /// A segment has a non-positive width, speed limit or length.
    InvalidSegment { index: usize },
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSegments => write!(f, "map has no street segments"),
            Self::NoSpawnSegments => {
                write!(f, "map has no primary or secondary segments to spawn onto")
            }
            Self::InvalidSegment { index } => write!(
                f,
                "segment {index} has a non-positive width, speed limit or length"
            ),
        }
    }
}

impl std::error::Error for MapError {}

/// A validated, immutable street map.
pub struct Map {
    /// The street segments.
    segments: SegmentSet,
    /// The segments vehicles may be spawned onto.
    spawn_segments: Vec<SegmentId>,
    /// The intersections where lights are installed.
    intersections: Vec<Intersection>,
}

impl Map {
    /// Validates the given segments and intersections and builds a map.
    /// The simulation will not start from an invalid map.
    pub fn new(
        segments: Vec<Segment>,
        intersections: Vec<Intersection>,
    ) -> Result<Self, MapError> {
        if segments.is_empty() {
            return Err(MapError::NoSegments);
        }
        for (index, segment) in segments.iter().enumerate() {
            if segment.width <= 0.0 || segment.speed_limit <= 0.0 || segment.length() <= 0.0 {
                return Err(MapError::InvalidSegment { index });
            }
        }

        let mut set = SegmentSet::default();
        let mut spawn_segments = vec![];
        for segment in segments {
            let spawnable = segment.category.spawnable();
            let id = set.insert(segment);
            if spawnable {
                spawn_segments.push(id);
            }
        }
        if spawn_segments.is_empty() {
            return Err(MapError::NoSpawnSegments);
        }

        Ok(Self {
            segments: set,
            spawn_segments,
            intersections,
        })
    }

    /// Gets a reference to the segment with the given ID.
    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id]
    }

    /// Returns an iterator over all the segments in the map.
    pub fn iter_segments(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments.iter()
    }

    /// The segments vehicles may be spawned onto.
    pub fn spawn_segments(&self) -> &[SegmentId] {
        &self.spawn_segments
    }

    /// The intersections where traffic lights are installed.
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    /// The number of segments in the map.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }
}
