//! Animated curve field drawn behind both views.
//!
//! Each curve is two cubic segments laid out in a 696×316 view box. Their
//! shape depends only on the curve index and a mirroring sign; the animation
//! sweeps a visible stretch along each curve forever.

use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};
use rand::Rng;

pub const VIEW_BOX: Vec2 = Vec2::new(696.0, 316.0);

/// Points sampled per cubic segment when flattening.
const SEGMENT_SAMPLES: usize = 32;

const LENGTH_KEYS: [f32; 3] = [0.3, 0.8, 0.3];
const OPACITY_KEYS: [f32; 3] = [0.3, 0.5, 0.3];
const OFFSET_KEYS: [f32; 3] = [0.0, 0.5, 1.0];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorScheme {
    #[default]
    Default,
    Blue,
    Purple,
}

impl ColorScheme {
    pub fn stroke_color(self, dark_mode: bool) -> Color32 {
        match (self, dark_mode) {
            (ColorScheme::Default, false) => Color32::from_rgb(15, 23, 42),
            (ColorScheme::Default, true) => Color32::from_rgb(255, 255, 255),
            (ColorScheme::Blue, false) => Color32::from_rgb(59, 130, 246),
            (ColorScheme::Blue, true) => Color32::from_rgb(96, 165, 250),
            (ColorScheme::Purple, false) => Color32::from_rgb(124, 58, 237),
            (ColorScheme::Purple, true) => Color32::from_rgb(139, 92, 246),
        }
    }
}

/// Shape constants of one curve family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLayout {
    pub count: usize,
    pub start_x: f32,
    pub control_x: f32,
    pub tail_x: f32,
    pub end_x: f32,
    pub end_y: f32,
    pub opacity_step: f32,
}

impl PathLayout {
    pub const LANDING: PathLayout = PathLayout {
        count: 24,
        start_x: 380.0,
        control_x: 312.0,
        tail_x: 616.0,
        end_x: 684.0,
        end_y: 875.0,
        opacity_step: 0.015,
    };

    pub const UPLOAD: PathLayout = PathLayout {
        count: 12,
        start_x: 280.0,
        control_x: 212.0,
        tail_x: 516.0,
        end_x: 584.0,
        end_y: 675.0,
        opacity_step: 0.01,
    };

    /// Control points of curve `index` for mirroring sign `position`.
    pub fn segments(&self, index: usize, position: f32) -> [[Pos2; 4]; 2] {
        let o = index as f32 * 8.0;
        let shift = o * position;

        let start = Pos2::new(-(self.start_x - shift), -(189.0 + o));
        let control = Pos2::new(-(self.control_x - shift), 216.0 - o);
        let joint = Pos2::new(152.0 - shift, 343.0 - o);
        let tail = Pos2::new(self.tail_x - shift, 470.0 - o);
        let end = Pos2::new(self.end_x - shift, self.end_y - o);

        [[start, start, control, joint], [joint, tail, end, end]]
    }
}

/// Animated values of one curve at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathFrame {
    pub length: f32,
    pub opacity: f32,
    pub offset: f32,
}

#[derive(Debug, Clone)]
pub struct FloatingPath {
    pub width: f32,
    pub stroke_opacity: f32,
    /// Seconds for one pass through the keyframes.
    pub duration: f32,
    points: Vec<Pos2>,
    distances: Vec<f32>,
}

impl FloatingPath {
    fn new(layout: &PathLayout, index: usize, position: f32, duration: f32) -> Self {
        let points: Vec<Pos2> = layout
            .segments(index, position)
            .iter()
            .enumerate()
            .flat_map(|(seg, ctrl)| {
                // The joint is shared, so skip it on the second segment.
                let first = usize::from(seg > 0);
                (first..=SEGMENT_SAMPLES)
                    .map(move |i| cubic_point(ctrl, i as f32 / SEGMENT_SAMPLES as f32))
            })
            .collect();
        let distances = cumulative_lengths(&points);

        Self {
            width: 0.5 + index as f32 * 0.04,
            stroke_opacity: 0.1 + index as f32 * layout.opacity_step,
            duration,
            points,
            distances,
        }
    }

    pub fn length(&self) -> f32 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    /// Keyframes run forward then backward, each pass eased in and out.
    pub fn sample(&self, elapsed: f32) -> PathFrame {
        let cycles = elapsed.max(0.0) / self.duration;
        let pass = cycles.floor();
        let mut progress = cycles - pass;
        if pass as u64 % 2 == 1 {
            progress = 1.0 - progress;
        }

        PathFrame {
            length: keyframe(LENGTH_KEYS, progress),
            opacity: keyframe(OPACITY_KEYS, progress),
            offset: keyframe(OFFSET_KEYS, progress),
        }
    }

    /// The visible stretch of the curve for `frame`, in view-box coordinates.
    pub fn visible_points(&self, frame: PathFrame) -> Vec<Pos2> {
        let total = self.length();
        let from = frame.offset * total;
        let to = (from + frame.length * total).min(total);
        trim_polyline(&self.points, &self.distances, from, to)
    }
}

/// Two mirrored curve families and the clock that animates them.
#[derive(Debug, Clone)]
pub struct BackgroundPaths {
    paths: Vec<FloatingPath>,
    scheme: ColorScheme,
    started_at: Option<f64>,
}

impl BackgroundPaths {
    pub fn new(layout: PathLayout, scheme: ColorScheme) -> Self {
        Self::with_rng(layout, scheme, &mut rand::thread_rng())
    }

    pub fn with_rng(layout: PathLayout, scheme: ColorScheme, rng: &mut impl Rng) -> Self {
        let paths = [1.0, -1.0]
            .into_iter()
            .flat_map(|position| (0..layout.count).map(move |index| (position, index)))
            .map(|(position, index)| {
                let duration = 15.0 + rng.gen_range(0.0..5.0);
                FloatingPath::new(&layout, index, position, duration)
            })
            .collect();

        Self {
            paths,
            scheme,
            started_at: None,
        }
    }

    #[cfg(test)]
    pub fn paths(&self) -> &[FloatingPath] {
        &self.paths
    }

    /// Draws every curve into `rect`; `time` is the UI clock in seconds.
    pub fn paint(&mut self, painter: &Painter, rect: Rect, time: f64, dark_mode: bool) {
        let started = *self.started_at.get_or_insert(time);
        let elapsed = (time - started) as f32;

        let scale = (rect.width() / VIEW_BOX.x).min(rect.height() / VIEW_BOX.y);
        let origin = rect.center() - VIEW_BOX * scale * 0.5;
        let base = self.scheme.stroke_color(dark_mode);
        let painter = painter.with_clip_rect(rect);

        for path in &self.paths {
            let frame = path.sample(elapsed);
            let points: Vec<Pos2> = path
                .visible_points(frame)
                .into_iter()
                .map(|p| origin + p.to_vec2() * scale)
                .collect();
            if points.len() < 2 {
                continue;
            }

            let alpha = (path.stroke_opacity * frame.opacity).clamp(0.0, 1.0);
            let color = Color32::from_rgba_unmultiplied(
                base.r(),
                base.g(),
                base.b(),
                (alpha * 255.0).round() as u8,
            );
            painter.add(Shape::line(points, Stroke::new(path.width * scale, color)));
        }
    }
}

fn cubic_point(ctrl: &[Pos2; 4], t: f32) -> Pos2 {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Pos2::new(
        a * ctrl[0].x + b * ctrl[1].x + c * ctrl[2].x + d * ctrl[3].x,
        a * ctrl[0].y + b * ctrl[1].y + c * ctrl[2].y + d * ctrl[3].y,
    )
}

fn cumulative_lengths(points: &[Pos2]) -> Vec<f32> {
    let mut total = 0.0;
    let mut out = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            total += points[i - 1].distance(*p);
        }
        out.push(total);
    }
    out
}

/// Cuts the polyline down to the stretch between distances `from` and `to`.
fn trim_polyline(points: &[Pos2], distances: &[f32], from: f32, to: f32) -> Vec<Pos2> {
    if points.len() < 2 || to <= from {
        return Vec::new();
    }

    let at = |d: f32| -> Pos2 {
        let i = distances.partition_point(|&x| x < d).clamp(1, points.len() - 1);
        let span = distances[i] - distances[i - 1];
        let t = if span > 0.0 {
            ((d - distances[i - 1]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        points[i - 1].lerp(points[i], t)
    };

    let mut out = vec![at(from)];
    out.extend(
        points
            .iter()
            .zip(distances)
            .filter(|&(_, &d)| d > from && d < to)
            .map(|(p, _)| *p),
    );
    out.push(at(to));
    out
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn keyframe(keys: [f32; 3], progress: f32) -> f32 {
    let (from, to, t) = if progress < 0.5 {
        (keys[0], keys[1], progress * 2.0)
    } else {
        (keys[1], keys[2], (progress - 0.5) * 2.0)
    };
    from + (to - from) * ease_in_out(t.clamp(0.0, 1.0))
}
