//! Per-mode frame rendering.

use crate::aabb::AABB;
use crate::camera::{Box3, Camera, Plane};
use crate::canvas::*;
use fewbody::animation::Frame;
use fewbody::config::VisualizationMode;
use fewbody::history::{FrameHistory, Quantity};
use fewbody::math::{angular_sweep, linspace};
use glam::f64::{DVec2, DVec3};
use image::RgbaImage;

const ELLIPSE_STEP: f64 = 0.01;
const ECC_LIMITS: (f64, f64) = (0.0, 0.7);
const INC_LIMITS: (f64, f64) = (0.0, 180.0);

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub mode: VisualizationMode,
    pub width: u32,
    pub height: u32,
    pub grid: f64,
    pub panels: bool,
    pub time_scale: f64,
    /// x range of the element plots; taken from the history when absent
    pub time_range: Option<(f64, f64)>,
    pub camera: Camera,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            mode: VisualizationMode::Trail,
            width: 800,
            height: 800,
            grid: 20.0,
            panels: false,
            time_scale: 1.0,
            time_range: None,
            camera: Camera::default(),
        }
    }
}

pub fn render(frame: &Frame, config: &RenderConfig) -> RgbaImage {
    let mut img = blank(config.width, config.height);
    match config.mode {
        VisualizationMode::Trail => draw_trail(&mut img, frame, config),
        VisualizationMode::Elements => draw_elements(&mut img, frame, config),
        VisualizationMode::Overview => draw_overview(&mut img, frame, config),
    }
    img
}

/// bodies with a recorded `q`, in channel order
fn bodies_with(history: &FrameHistory, q: Quantity) -> Vec<usize> {
    history
        .channels()
        .iter()
        .filter(|c| c.quantity == q)
        .map(|c| c.body)
        .collect()
}

fn positions(history: &FrameHistory, body: usize) -> Vec<DVec3> {
    let series = [Quantity::X, Quantity::Y, Quantity::Z].map(|q| history.series(body, q));
    match series {
        [Some(x), Some(y), Some(z)] => x
            .iter()
            .zip(y)
            .zip(z)
            .map(|((x, y), z)| DVec3::new(*x, *y, *z))
            .collect(),
        _ => Vec::new(),
    }
}

fn view_of_box(region: AABB, bounds: &Box3, camera: &Camera) -> Viewport {
    let corners = bounds.corners().map(|c| camera.project(bounds.normalize(c)));
    let mut world = AABB::from_list(&corners).unwrap_or(AABB(DVec2::NEG_ONE, DVec2::ONE));
    world = world.padded(world.span().max_element() * 0.02);
    let aspect = region.span().x / region.span().y;
    Viewport::new(region, world.with_aspect(aspect))
}

fn project_all(points: &[DVec3], bounds: &Box3, camera: &Camera) -> Vec<DVec2> {
    points
        .iter()
        .map(|p| camera.project(bounds.normalize(*p)))
        .collect()
}

fn full(config: &RenderConfig) -> AABB {
    AABB(
        DVec2::ZERO,
        DVec2::new(config.width as f64, config.height as f64),
    )
}

/// Trails of every tracked body from the start of the run, in a fixed box
/// of `[-1.5 g, g]` on x and y and `[-g, g]` on z.
pub fn draw_trail(img: &mut RgbaImage, frame: &Frame, config: &RenderConfig) {
    let g = config.grid;
    let bounds = Box3::new((-1.5 * g, -1.5 * g, -g), (g, g, g));
    let view = view_of_box(full(config), &bounds, &config.camera);

    for (n, b) in bodies_with(frame.history, Quantity::X).into_iter().enumerate() {
        let pts = project_all(&positions(frame.history, b), &bounds, &config.camera);
        draw_polyline(img, &view, &pts, faded(trail_color(n), 0.8));
    }
}

fn time_range(history: &FrameHistory, config: &RenderConfig) -> (f64, f64) {
    let (lo, hi) = config.time_range.unwrap_or_else(|| {
        let t = history.times();
        let lo = t.first().copied().unwrap_or(0.0);
        (lo, t.last().copied().unwrap_or(lo))
    });
    let (lo, hi) = (lo / config.time_scale, hi / config.time_scale);
    if hi > lo {
        (lo, hi)
    } else {
        (lo, lo + 1.0)
    }
}

fn draw_axes(img: &mut RgbaImage, view: &Viewport, y_step: f64) {
    let w = view.world;
    for x in linspace(w.0.x, w.1.x, 6) {
        draw_polyline(img, view, &[DVec2::new(x, w.0.y), DVec2::new(x, w.1.y)], GRID);
    }
    let n = ((w.1.y - w.0.y) / y_step).round() as usize;
    for k in 0..=n {
        let y = w.0.y + k as f64 * y_step;
        draw_polyline(img, view, &[DVec2::new(w.0.x, y), DVec2::new(w.1.x, y)], GRID);
    }
    draw_polyline(img, view, &[DVec2::new(w.0.x, 0.0), DVec2::new(w.1.x, 0.0)], WHITE);
    draw_border(img, view.pixels, 0, WHITE);
}

fn draw_series(
    img: &mut RgbaImage,
    view: &Viewport,
    history: &FrameHistory,
    q: Quantity,
    time_scale: f64,
    convert: impl Fn(f64) -> f64,
) {
    let t = history.times();
    for (n, b) in bodies_with(history, q).into_iter().enumerate() {
        let Some(v) = history.series(b, q) else {
            continue;
        };
        let pts: Vec<DVec2> = t
            .iter()
            .zip(v)
            .map(|(t, v)| DVec2::new(t / time_scale, convert(*v)))
            .collect();
        draw_polyline(img, view, &pts, elements_color(n));
        if let Some(last) = pts.last() {
            draw_dot(img, view, *last, 2, elements_color(n));
        }
    }
}

/// Orbit curves of this frame next to eccentricity and inclination against
/// time for every frame so far.
pub fn draw_elements(img: &mut RgbaImage, frame: &Frame, config: &RenderConfig) {
    let cols = columns(config.width, config.height, 3);
    let bounds = Box3::cube(config.grid);
    let view = view_of_box(cols[0], &bounds, &config.camera);

    for (n, curve) in frame.sample.curves.iter().enumerate() {
        let pts = project_all(&curve.points, &bounds, &config.camera);
        draw_closed(img, &view, &pts, elements_color(n));
    }

    let (t0, t1) = time_range(frame.history, config);
    let margin = |r: AABB| {
        let inset = r.span() * DVec2::new(0.12, 0.1);
        AABB(r.0 + inset, r.1 - inset)
    };

    let ecc = Viewport::new(
        margin(cols[1]),
        AABB(DVec2::new(t0, ECC_LIMITS.0), DVec2::new(t1, ECC_LIMITS.1)),
    );
    draw_axes(img, &ecc, 0.1);
    draw_series(img, &ecc, frame.history, Quantity::Eccentricity, config.time_scale, |e| e);

    let inc = Viewport::new(
        margin(cols[2]),
        AABB(DVec2::new(t0, INC_LIMITS.0), DVec2::new(t1, INC_LIMITS.1)),
    );
    draw_axes(img, &inc, 30.0);
    draw_series(
        img,
        &inc,
        frame.history,
        Quantity::Inclination,
        config.time_scale,
        f64::to_degrees,
    );
}

/// Full Keplerian ellipse of every body with elements, placed about the
/// centre of mass of the bodies before it.
pub fn orbit_ellipses(frame: &Frame) -> Vec<(usize, Vec<DVec3>)> {
    let sweep = angular_sweep(ELLIPSE_STEP);
    frame
        .state
        .bodies()
        .iter()
        .enumerate()
        .filter_map(|(i, b)| {
            let el = b.elements.filter(|el| el.is_bound())?;
            let primary = frame.state.center_of_mass_of_first(i);
            let pts = sweep
                .iter()
                .map(|ea| primary + el.position_at_eccentric(*ea))
                .collect();
            Some((i, pts))
        })
        .collect()
}

/// Auto-scaled orbits and bodies, as one xy view or as xy, xz and yz panels.
pub fn draw_overview(img: &mut RgbaImage, frame: &Frame, config: &RenderConfig) {
    let ellipses = orbit_ellipses(frame);
    let bodies: Vec<DVec3> = frame.state.bodies().iter().map(|b| b.pv.pos).collect();

    let (planes, regions) = if config.panels {
        (Plane::ALL.to_vec(), columns(config.width, config.height, 3))
    } else {
        (vec![Plane::XY], vec![full(config)])
    };

    for (plane, region) in planes.into_iter().zip(regions) {
        let mut all: Vec<DVec2> = bodies.iter().map(|p| plane.project(*p)).collect();
        for (_, pts) in &ellipses {
            all.extend(pts.iter().map(|p| plane.project(*p)));
        }
        let Some(world) = AABB::from_list(&all) else {
            continue;
        };
        let world = world.padded(world.span().max_element().max(1E-9) * 0.08);
        let view = Viewport::new(region, world.with_aspect(region.span().x / region.span().y));

        for (i, pts) in &ellipses {
            let pts: Vec<DVec2> = pts.iter().map(|p| plane.project(*p)).collect();
            draw_closed(img, &view, &pts, faded(body_color(*i), 0.6));
        }
        for (i, p) in bodies.iter().enumerate() {
            draw_dot(img, &view, plane.project(*p), 4, body_color(i));
        }
        if config.panels {
            draw_border(img, region, 2, GRID);
        }
    }
}
