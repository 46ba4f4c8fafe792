//! Procedural point selection inside a region (grid scan, random, spiral).
//!
//! Every strategy filters candidates through [`Region::contains`] and gives up
//! after [`MAX_ATTEMPTS`], returning the region's fallback point, so
//! [`PatternGenerator::next_point`] is total and bounded.

use crate::geometry::{point_in_polygon, GeometryError, Point, Region};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Candidates tried per `next_point` call before falling back.
pub const MAX_ATTEMPTS: usize = 100;
/// Angle increment per spiral candidate (radians).
pub const SPIRAL_ANGLE_STEP: f64 = 0.3;
/// Spiral radius grows by `step_size * SPIRAL_RADIUS_FACTOR` per candidate.
pub const SPIRAL_RADIUS_FACTOR: f64 = 0.05;
/// Lower bound on the spacing of precomputed polygon samples.
pub const MIN_SAMPLE_SPACING: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    Grid,
    Random,
    Spiral,
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "random" => Ok(Self::Random),
            "spiral" => Ok(Self::Spiral),
            _ => Err(PatternError::UnknownPattern(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("step size must be positive, got {0}")]
    InvalidStep(i32),
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Strategy-specific cursor. Offsets are relative to the region's bounding origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorState {
    Grid { x: i32, y: i32, direction: i32 },
    Random,
    Spiral { angle: f64, radius: f64 },
}

impl GeneratorState {
    fn initial(pattern: Pattern) -> Self {
        match pattern {
            Pattern::Grid => Self::Grid { x: 0, y: 0, direction: 1 },
            Pattern::Random => Self::Random,
            Pattern::Spiral => Self::Spiral { angle: 0.0, radius: 0.0 },
        }
    }
}

pub struct PatternGenerator {
    region: Region,
    step_size: i32,
    pattern: Pattern,
    state: GeneratorState,
    /// Precomputed interior samples (polygon-specialized generators only).
    interior: Vec<Point>,
    rng: StdRng,
}

impl PatternGenerator {
    pub fn new(region: Region, step_size: i32, pattern: Pattern) -> Result<Self, PatternError> {
        if step_size <= 0 {
            return Err(PatternError::InvalidStep(step_size));
        }
        Ok(Self {
            region,
            step_size,
            pattern,
            state: GeneratorState::initial(pattern),
            interior: Vec::new(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Polygon-specialized generator.
    ///
    /// Precomputes every point of a `max(step_size / 2, 5)` lattice over the
    /// bounding rect that lies inside the polygon; `Random` then samples from
    /// that set. An empty set is replaced by the centroid.
    pub fn polygon(
        vertices: Vec<Point>,
        step_size: i32,
        pattern: Pattern,
    ) -> Result<Self, PatternError> {
        let region = Region::polygon(vertices)?;
        let mut generator = Self::new(region, step_size, pattern)?;
        generator.interior = precompute_interior(&generator.region, step_size);
        debug!(
            samples = generator.interior.len(),
            step_size, "precomputed polygon interior"
        );
        Ok(generator)
    }

    /// Use a deterministic RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn reset(&mut self) {
        self.state = GeneratorState::initial(self.pattern);
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn interior_points(&self) -> &[Point] {
        &self.interior
    }

    /// Largest radius the spiral reaches before resetting.
    pub fn max_spiral_radius(&self) -> f64 {
        let bounds = self.region.bounds();
        f64::from(bounds.width.min(bounds.height) / 2)
    }

    pub fn next_point(&mut self) -> Point {
        match self.pattern {
            Pattern::Grid => self.next_grid_point(),
            Pattern::Random => self.next_random_point(),
            Pattern::Spiral => self.next_spiral_point(),
        }
    }

    fn next_grid_point(&mut self) -> Point {
        let bounds = self.region.bounds();
        for _ in 0..MAX_ATTEMPTS {
            let GeneratorState::Grid { x, y, direction } = self.state else {
                self.state = GeneratorState::initial(Pattern::Grid);
                continue;
            };
            let candidate = Point::new(bounds.x + x, bounds.y + y);

            let mut next_x = x + self.step_size * direction;
            let mut next_y = y;
            let mut next_dir = direction;
            if next_x >= bounds.width {
                next_x = bounds.width - 1;
                next_y += self.step_size;
                next_dir = -1;
            } else if next_x < 0 {
                next_x = 0;
                next_y += self.step_size;
                next_dir = 1;
            }
            if next_y >= bounds.height {
                next_x = 0;
                next_y = 0;
                next_dir = 1;
            }
            self.state = GeneratorState::Grid {
                x: next_x,
                y: next_y,
                direction: next_dir,
            };

            if self.region.contains(candidate) {
                return candidate;
            }
        }
        self.fallback()
    }

    fn next_random_point(&mut self) -> Point {
        if let Some(point) = self.interior.choose(&mut self.rng) {
            return *point;
        }

        let bounds = self.region.bounds();
        if bounds.width <= 0 || bounds.height <= 0 {
            return self.fallback();
        }
        for _ in 0..MAX_ATTEMPTS {
            let candidate = Point::new(
                bounds.x + self.rng.gen_range(0..bounds.width),
                bounds.y + self.rng.gen_range(0..bounds.height),
            );
            if self.region.contains(candidate) {
                return candidate;
            }
        }
        self.fallback()
    }

    fn next_spiral_point(&mut self) -> Point {
        let bounds = self.region.bounds();
        let center_x = bounds.width / 2;
        let center_y = bounds.height / 2;
        let max_radius = self.max_spiral_radius();
        let radius_step = f64::from(self.step_size) * SPIRAL_RADIUS_FACTOR;

        for _ in 0..MAX_ATTEMPTS {
            let GeneratorState::Spiral { angle, radius } = self.state else {
                self.state = GeneratorState::initial(Pattern::Spiral);
                continue;
            };
            let candidate = Point::new(
                bounds.x + center_x + (radius * angle.cos()) as i32,
                bounds.y + center_y + (radius * angle.sin()) as i32,
            );

            let mut next_angle = angle + SPIRAL_ANGLE_STEP;
            let mut next_radius = radius + radius_step;
            if next_radius > max_radius {
                next_angle = 0.0;
                next_radius = 0.0;
            }
            self.state = GeneratorState::Spiral {
                angle: next_angle,
                radius: next_radius,
            };

            if self.region.contains(candidate) {
                return candidate;
            }
        }
        self.fallback()
    }

    fn fallback(&self) -> Point {
        let point = self.region.fallback_point();
        debug!(?point, pattern = ?self.pattern, "no valid candidate, using fallback point");
        point
    }
}

impl Iterator for PatternGenerator {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        Some(self.next_point())
    }
}

fn precompute_interior(region: &Region, step_size: i32) -> Vec<Point> {
    let Region::Polygon(vertices) = region else {
        return Vec::new();
    };
    let bounds = region.bounds();
    let spacing = (step_size / 2).max(MIN_SAMPLE_SPACING) as usize;

    let mut points = Vec::new();
    for y in (bounds.y..bounds.y + bounds.height).step_by(spacing) {
        for x in (bounds.x..bounds.x + bounds.width).step_by(spacing) {
            let p = Point::new(x, y);
            if point_in_polygon(p, vertices) {
                points.push(p);
            }
        }
    }

    if points.is_empty() {
        points.push(region.fallback_point());
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use proptest::prelude::*;

    fn rect_region(x: i32, y: i32, w: i32, h: i32) -> Region {
        Region::rect(Rect::new(x, y, w, h)).unwrap()
    }

    #[test]
    fn test_pattern_from_str() {
        assert_eq!("Grid".parse::<Pattern>(), Ok(Pattern::Grid));
        assert_eq!("SPIRAL".parse::<Pattern>(), Ok(Pattern::Spiral));
        assert!("zigzag".parse::<Pattern>().is_err());
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let err = PatternGenerator::new(rect_region(0, 0, 10, 10), 0, Pattern::Grid).err();
        assert_eq!(err, Some(PatternError::InvalidStep(0)));
    }

    #[test]
    fn test_grid_boustrophedon() {
        let mut gen = PatternGenerator::new(rect_region(100, 200, 25, 25), 10, Pattern::Grid).unwrap();
        let points: Vec<_> = (0..8).map(|_| gen.next_point()).collect();
        assert_eq!(
            points,
            vec![
                Point::new(100, 200),
                Point::new(110, 200),
                Point::new(120, 200),
                // clamped to the right edge, then the row advances and heads left
                Point::new(124, 210),
                Point::new(114, 210),
                Point::new(104, 210),
                Point::new(100, 220),
                Point::new(110, 220),
            ]
        );
    }

    #[test]
    fn test_grid_wraps_to_origin() {
        let mut gen = PatternGenerator::new(rect_region(0, 0, 10, 20), 10, Pattern::Grid).unwrap();
        assert_eq!(gen.next_point(), Point::new(0, 0));
        assert_eq!(gen.next_point(), Point::new(9, 10));
        // row 20 is past the bottom, cursor wraps
        assert_eq!(gen.next_point(), Point::new(0, 0));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut gen = PatternGenerator::new(rect_region(0, 0, 50, 50), 5, Pattern::Spiral).unwrap();
        for _ in 0..10 {
            gen.next_point();
        }
        assert_ne!(gen.state(), GeneratorState::Spiral { angle: 0.0, radius: 0.0 });
        gen.reset();
        assert_eq!(gen.state(), GeneratorState::Spiral { angle: 0.0, radius: 0.0 });
    }

    #[test]
    fn test_spiral_starts_at_center() {
        let mut gen = PatternGenerator::new(rect_region(10, 10, 100, 60), 20, Pattern::Spiral).unwrap();
        assert_eq!(gen.next_point(), Point::new(60, 40));
    }

    #[test]
    fn test_fallback_when_polygon_misses_grid() {
        // Thin sliver: the grid cursor never lands inside it.
        let sliver = vec![Point::new(0, 0), Point::new(1000, 1), Point::new(1000, 2)];
        let mut gen = PatternGenerator::new(Region::polygon(sliver.clone()).unwrap(), 400, Pattern::Grid).unwrap();
        let fallback = Region::polygon(sliver).unwrap().fallback_point();
        assert_eq!(gen.next_point(), fallback);
    }

    #[test]
    fn test_precomputed_interior() {
        let square = vec![
            Point::new(0, 0),
            Point::new(20, 0),
            Point::new(20, 20),
            Point::new(0, 20),
        ];
        let gen = PatternGenerator::polygon(square, 20, Pattern::Random).unwrap();
        // spacing 10 over [0, 20) on both axes
        assert_eq!(
            gen.interior_points(),
            &[
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(0, 10),
                Point::new(10, 10)
            ]
        );
    }

    #[test]
    fn test_precomputed_interior_uses_min_spacing() {
        let square = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        let gen = PatternGenerator::polygon(square, 2, Pattern::Random).unwrap();
        assert_eq!(gen.interior_points().len(), 4);
    }

    #[test]
    fn test_empty_interior_falls_back_to_centroid() {
        // The only lattice point, (0, 0), sits on the boundary and tests outside.
        let sliver = vec![Point::new(0, 0), Point::new(3, 1), Point::new(0, 1)];
        let mut gen = PatternGenerator::polygon(sliver, 50, Pattern::Random).unwrap();
        assert_eq!(gen.interior_points(), &[Point::new(1, 0)]);
        assert_eq!(gen.next_point(), Point::new(1, 0));
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let region = rect_region(0, 0, 300, 300);
        let a: Vec<_> = PatternGenerator::new(region.clone(), 5, Pattern::Random)
            .unwrap()
            .with_seed(42)
            .take(20)
            .collect();
        let b: Vec<_> = PatternGenerator::new(region, 5, Pattern::Random)
            .unwrap()
            .with_seed(42)
            .take(20)
            .collect();
        assert_eq!(a, b);
    }

    fn convex_polygon() -> impl Strategy<Value = Vec<Point>> {
        // Regular-ish polygon around a random center: always convex.
        (-300i32..300, -300i32..300, 10i32..200, 3usize..9).prop_map(|(cx, cy, r, n)| {
            (0..n)
                .map(|i| {
                    let a = i as f64 * std::f64::consts::TAU / n as f64;
                    Point::new(
                        cx + (f64::from(r) * a.cos()) as i32,
                        cy + (f64::from(r) * a.sin()) as i32,
                    )
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn grid_stays_inside_rect(
            x in -500i32..500, y in -500i32..500,
            w in 1i32..300, h in 1i32..300,
            step in 1i32..80,
        ) {
            let rect = Rect::new(x, y, w, h);
            let mut gen = PatternGenerator::new(Region::rect(rect).unwrap(), step, Pattern::Grid).unwrap();
            for _ in 0..500 {
                let p = gen.next_point();
                prop_assert!(rect.contains(p), "{:?} outside {:?}", p, rect);
            }
        }

        #[test]
        fn precomputed_random_stays_inside_convex_polygon(
            polygon in convex_polygon(),
            step in 1i32..60,
            seed in any::<u64>(),
        ) {
            let mut gen = PatternGenerator::polygon(polygon.clone(), step, Pattern::Random)
                .unwrap()
                .with_seed(seed);
            let only_centroid = gen.interior_points().len() == 1
                && !point_in_polygon(gen.interior_points()[0], &polygon);
            for _ in 0..200 {
                let p = gen.next_point();
                prop_assert!(only_centroid || point_in_polygon(p, &polygon));
            }
        }

        #[test]
        fn spiral_radius_bounded(
            w in 1i32..400, h in 1i32..400,
            step in 1i32..200,
        ) {
            let mut gen = PatternGenerator::new(Region::rect(Rect::new(0, 0, w, h)).unwrap(), step, Pattern::Spiral).unwrap();
            let limit = gen.max_spiral_radius() + f64::from(step) * SPIRAL_RADIUS_FACTOR;
            for _ in 0..300 {
                gen.next_point();
                if let GeneratorState::Spiral { radius, .. } = gen.state() {
                    prop_assert!(radius <= limit, "radius {} > {}", radius, limit);
                }
            }
        }

        #[test]
        fn rect_generators_never_leave_rect(
            w in 1i32..200, h in 1i32..200,
            step in 1i32..50,
            seed in any::<u64>(),
        ) {
            let rect = Rect::new(7, -3, w, h);
            for pattern in [Pattern::Random, Pattern::Spiral] {
                let mut gen = PatternGenerator::new(Region::rect(rect).unwrap(), step, pattern)
                    .unwrap()
                    .with_seed(seed);
                for _ in 0..100 {
                    prop_assert!(rect.contains(gen.next_point()));
                }
            }
        }
    }
}
