use crate::tip::{CrossSection, TipModel, TipSize, TipType};
use crate::vertex::{InputTime, Vertex};
use crate::{Bounds, Point, Transform};
use log::{debug, trace};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_SIMPLIFY_WINDOW: usize = 15;
pub const DEFAULT_SIMPLIFICATION_THRESHOLD: f32 = 0.1;
pub const DEFAULT_MIN_SCREEN_TRAVEL_THRESHOLD: f32 = 1.0;

/// Called for every vertex before it is stored, with the center it was
/// extruded around, the tip radius, the extrusion time and stylus pressure.
/// Only non-positional attributes of the vertex should be touched.
pub type VertCallback = Arc<dyn Fn(Point, f32, InputTime, f32, &mut Vertex) + Send + Sync>;

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct StylusState {
    pub pressure: f32,
    pub tilt: f32,
    pub orientation: f32,
}

/// An accepted center point of the stroke.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct MidPoint {
    pub screen_position: Point,
    pub time: InputTime,
    /// Unit direction of travel into this point; zero until a second point fixes it.
    pub tangent: Point,
}

impl MidPoint {
    pub fn new(screen_position: Point, time: InputTime) -> MidPoint {
        MidPoint {
            screen_position,
            time,
            tangent: Point::default(),
        }
    }

    pub fn normal(&self) -> Point {
        self.tangent.perp()
    }

    fn has_direction(&self) -> bool {
        self.tangent.length() > 0.5
    }
}

/// Builds the outline of a stroke incrementally from modeled input points in
/// screen coordinates.
///
/// The two sides of the outline are called "forward" (offset along the left
/// normal of travel) and "backward". The shapes at turns and at both ends come
/// from the active [`TipModel`].
#[derive(Clone)]
pub struct FatLine {
    on_add_vert: Option<VertCallback>,
    min_screen_travel_threshold: f32,
    tip_size: TipSize,
    tip_model: TipModel,
    turn_verts: u32,
    simplify_window: usize,
    simplification_threshold: f32,

    last_extrude_time: InputTime,
    last_center: Point,
    stylus_state: StylusState,

    fwd: Vec<Vertex>,
    back: Vec<Vertex>,
    start_cap: Vec<Vertex>,
    end_cap: Vec<Vertex>,
    pts: Vec<MidPoint>,

    join_midpoint: Option<MidPoint>,
}

impl Default for FatLine {
    fn default() -> Self {
        FatLine::with_radius(30.0, 20)
    }
}

impl FatLine {
    pub fn new(tip_size: TipSize, turn_verts: u32, tip_type: TipType) -> FatLine {
        FatLine {
            on_add_vert: None,
            min_screen_travel_threshold: DEFAULT_MIN_SCREEN_TRAVEL_THRESHOLD,
            tip_size,
            tip_model: TipModel::for_type(tip_type),
            turn_verts,
            simplify_window: DEFAULT_SIMPLIFY_WINDOW,
            simplification_threshold: DEFAULT_SIMPLIFICATION_THRESHOLD,
            last_extrude_time: 0.0,
            last_center: Point::default(),
            stylus_state: StylusState::default(),
            fwd: Vec::new(),
            back: Vec::new(),
            start_cap: Vec::new(),
            end_cap: Vec::new(),
            pts: Vec::new(),
            join_midpoint: None,
        }
    }

    pub fn with_radius(radius: f32, turn_verts: u32) -> FatLine {
        FatLine::new(TipSize::circle(radius), turn_verts, TipType::Round)
    }

    /// Leaves an empty line. Configuration (travel threshold, tip, turn
    /// vertices, callback, simplification) is kept.
    pub fn clear_vertices(&mut self) {
        self.fwd.clear();
        self.back.clear();
        self.start_cap.clear();
        self.end_cap.clear();
        self.pts.clear();
        self.join_midpoint = None;
        self.last_center = Point::default();
        self.last_extrude_time = 0.0;
    }

    /// Extrudes a new modeled input point.
    ///
    /// Returns the bounding box of the vertices added, or `None` when the
    /// point was rejected or produced no geometry yet. Points closer than the
    /// travel threshold to the last one are rejected unless `force` is set.
    pub fn extrude(&mut self, new_pt: Point, time: InputTime, force: bool, simplify: bool) -> Option<Bounds> {
        if !self.pts.is_empty() {
            let travel = self.last_center.distance(new_pt);
            if travel == 0.0 || (!force && travel < self.min_screen_travel_threshold) {
                return None;
            }
        }

        self.last_center = new_pt;
        self.last_extrude_time = time;
        self.pts.push(MidPoint::new(new_pt, time));

        let bounds = self.extend_line();
        if simplify {
            self.simplify(self.simplify_window, self.simplification_threshold);
        }
        bounds
    }

    /// Appends the cap after the last point. Calling this twice appends a
    /// second cap.
    pub fn build_end_cap(&mut self) -> Option<Bounds> {
        let last = *self.pts.last()?;
        if self.pts.len() < 2 || !last.has_direction() {
            return None;
        }
        let outline = self.tip_model.end_cap(
            last.screen_position,
            self.tip_size,
            last.tangent,
            self.turn_verts,
        );
        debug!("end cap with {} vertices at {:?}", outline.len(), last.screen_position);
        let mut end_cap = std::mem::take(&mut self.end_cap);
        let bounds = self.append_vertices(&mut end_cap, &outline, last.screen_position);
        self.end_cap = end_cap;
        bounds
    }

    /// Starts this line from the last cross-section of `other` instead of a
    /// cap, so the two lines join without a seam. Returns `None` and leaves
    /// this line untouched when `other` has no cross-section to join to.
    ///
    /// # Panics
    ///
    /// Panics if this line already has geometry.
    pub fn set_start_cap_to_line_back(&mut self, other: &FatLine) -> Option<Bounds> {
        assert!(
            self.pts.is_empty() && self.fwd.is_empty() && self.back.is_empty(),
            "set_start_cap_to_line_back called on a line that already has vertices"
        );
        let mid = *other.pts.last()?;
        let (f, b) = match (other.fwd.last(), other.back.last()) {
            (Some(f), Some(b)) if mid.has_direction() => (*f, *b),
            _ => return None,
        };
        debug!("joining line to {:?}", mid.screen_position);

        self.join_midpoint = Some(mid);
        self.pts.push(mid);
        self.last_center = mid.screen_position;
        self.last_extrude_time = mid.time;
        self.fwd.push(f);
        self.back.push(b);
        Some(Bounds::from_point(f.position).include_point(b.position))
    }

    pub fn turn_verts(&self) -> u32 {
        self.turn_verts
    }

    pub fn set_turn_verts(&mut self, turn_verts: u32) {
        self.turn_verts = turn_verts;
    }

    pub fn tip_type(&self) -> TipType {
        self.tip_model.tip_type()
    }

    /// Swaps the tip model only when the type changes. Existing geometry is kept.
    pub fn set_tip_type(&mut self, tip_type: TipType) {
        if self.tip_model.tip_type() != tip_type {
            debug!("tip {:?} -> {:?}", self.tip_model.tip_type(), tip_type);
            self.tip_model = TipModel::for_type(tip_type);
        }
    }

    pub fn vert_callback(&self) -> Option<VertCallback> {
        self.on_add_vert.clone()
    }

    pub fn set_vert_callback(&mut self, callback: Option<VertCallback>) {
        self.on_add_vert = callback;
    }

    /// New modeled points must move this many pixels before being extruded.
    pub fn min_screen_travel_threshold(&self) -> f32 {
        self.min_screen_travel_threshold
    }

    pub fn set_min_screen_travel_threshold(&mut self, distance: f32) {
        self.min_screen_travel_threshold = distance;
    }

    pub fn tip_size(&self) -> TipSize {
        self.tip_size
    }

    pub fn set_tip_size(&mut self, tip_size: TipSize) {
        self.tip_size = tip_size;
    }

    pub fn set_stylus_state(&mut self, stylus_state: StylusState) {
        self.stylus_state = stylus_state;
    }

    pub fn set_simplification(&mut self, window: usize, threshold: f32) {
        self.simplify_window = window;
        self.simplification_threshold = threshold;
    }

    pub fn forward_line(&self) -> &[Vertex] {
        &self.fwd
    }

    pub fn backward_line(&self) -> &[Vertex] {
        &self.back
    }

    pub fn start_cap(&self) -> &[Vertex] {
        &self.start_cap
    }

    pub fn end_cap(&self) -> &[Vertex] {
        &self.end_cap
    }

    pub fn mid_points(&self) -> &[MidPoint] {
        &self.pts
    }

    pub fn join_midpoint(&self) -> Option<&MidPoint> {
        self.join_midpoint.as_ref()
    }

    /// Copies the outline of a chain of lines, mapped by `screen_to_object`,
    /// as one closed polyline: the first line's start cap, every forward
    /// side, the last line's end cap, then every backward side reversed.
    pub fn outline_as_array(lines: &[FatLine], screen_to_object: &Transform) -> Vec<Point> {
        let mut out = Vec::new();
        let (first, last) = match (lines.first(), lines.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return out,
        };

        let mut push = |v: &Vertex| out.push(screen_to_object.transform_point(v.position));
        first.start_cap.iter().for_each(&mut push);
        for line in lines {
            line.fwd.iter().for_each(&mut push);
        }
        last.end_cap.iter().for_each(&mut push);
        for line in lines.iter().rev() {
            line.back.iter().rev().for_each(&mut push);
        }
        out
    }

    fn build_start_cap(&mut self) -> Option<Bounds> {
        let first = *self.pts.first()?;
        let outline = self.tip_model.start_cap(
            first.screen_position,
            self.tip_size,
            first.tangent,
            self.turn_verts,
        );
        debug!("start cap with {} vertices at {:?}", outline.len(), first.screen_position);
        let mut start_cap = std::mem::take(&mut self.start_cap);
        let bounds = self.append_vertices(&mut start_cap, &outline, first.screen_position);
        self.start_cap = start_cap;
        bounds
    }

    /// Emits the geometry between the last two midpoints.
    fn extend_line(&mut self) -> Option<Bounds> {
        let n = self.pts.len();
        if n < 2 {
            return None;
        }
        let prev = self.pts[n - 2];
        let cur = self.pts[n - 1];
        let tangent = (cur.screen_position - prev.screen_position).normalized();
        let normal = tangent.perp();
        self.pts[n - 1].tangent = tangent;

        let mut bounds = None;
        if prev.has_direction() {
            let cs = self.tip_model.turn(
                prev.screen_position,
                self.tip_size,
                prev.normal(),
                normal,
                self.turn_verts,
            );
            bounds = Bounds::join_opt(bounds, self.append_cross_section(&cs, prev.screen_position));
        } else {
            self.pts[n - 2].tangent = tangent;
            if self.join_midpoint.is_none() {
                bounds = self.build_start_cap();
            }
            let cs = self
                .tip_model
                .cross_section(prev.screen_position, self.tip_size, normal);
            bounds = Bounds::join_opt(bounds, self.append_cross_section(&cs, prev.screen_position));
        }

        let cs = self
            .tip_model
            .cross_section(cur.screen_position, self.tip_size, normal);
        Bounds::join_opt(bounds, self.append_cross_section(&cs, cur.screen_position))
    }

    fn append_cross_section(&mut self, cs: &CrossSection, center: Point) -> Option<Bounds> {
        let mut fwd = std::mem::take(&mut self.fwd);
        let mut back = std::mem::take(&mut self.back);
        let bounds = Bounds::join_opt(
            self.append_vertices(&mut fwd, &cs.forward, center),
            self.append_vertices(&mut back, &cs.backward, center),
        );
        self.fwd = fwd;
        self.back = back;
        bounds
    }

    fn append_vertices(&self, to: &mut Vec<Vertex>, points: &[Point], center: Point) -> Option<Bounds> {
        for p in points {
            let mut v = Vertex::at(*p);
            if let Some(on_add_vert) = &self.on_add_vert {
                on_add_vert(
                    center,
                    self.tip_size.radius,
                    self.last_extrude_time,
                    self.stylus_state.pressure,
                    &mut v,
                );
            }
            to.push(v);
        }
        Bounds::envelope(points.iter().copied())
    }

    /// Ramer-Douglas-Peucker over the last `n_verts` vertices of each side.
    /// A vertex survives if dropping it would move the outline by at least
    /// `simplification_threshold`.
    pub fn simplify(&mut self, n_verts: usize, simplification_threshold: f32) {
        let (fwd_before, back_before) = (self.fwd.len(), self.back.len());
        simplify_tail(&mut self.fwd, n_verts, simplification_threshold);
        simplify_tail(&mut self.back, n_verts, simplification_threshold);
        trace!(
            "simplified fwd {} -> {}, back {} -> {}",
            fwd_before,
            self.fwd.len(),
            back_before,
            self.back.len()
        );
    }
}

fn simplify_tail(verts: &mut Vec<Vertex>, n_verts: usize, threshold: f32) {
    if verts.len() < 3 || n_verts < 3 {
        return;
    }
    let start = verts.len() - n_verts.min(verts.len());
    let window = &verts[start..];
    let last = window.len() - 1;
    let mut keep = vec![false; window.len()];
    keep[0] = true;
    keep[last] = true;
    mark_deviating(window, 0, last, threshold * threshold, &mut keep);

    let tail: Vec<Vertex> = window
        .iter()
        .zip(keep)
        .filter_map(|(v, keep)| if keep { Some(*v) } else { None })
        .collect();
    verts.truncate(start);
    verts.extend(tail);
}

fn mark_deviating(pts: &[Vertex], first: usize, last: usize, tol2: f32, keep: &mut [bool]) {
    if last <= first + 1 {
        return;
    }
    let p = pts[first].position;
    let q = pts[last].position;
    let mut max_d = 0.0;
    let mut max_i = first;
    for (i, v) in pts.iter().enumerate().take(last).skip(first + 1) {
        let d = v.position.dist_pt_seg(p, q);
        if d > max_d {
            max_d = d;
            max_i = i;
        }
    }
    if max_d >= tol2 {
        keep[max_i] = true;
        mark_deviating(pts, first, max_i, tol2, keep);
        mark_deviating(pts, max_i, last, tol2, keep);
    }
}

impl fmt::Debug for FatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FatLine")
            .field("tip_type", &self.tip_type())
            .field("tip_size", &self.tip_size)
            .field("turn_verts", &self.turn_verts)
            .field("min_screen_travel_threshold", &self.min_screen_travel_threshold)
            .field("fwd", &self.fwd.len())
            .field("back", &self.back.len())
            .field("start_cap", &self.start_cap.len())
            .field("end_cap", &self.end_cap.len())
            .field("mid_points", &self.pts.len())
            .field("joined", &self.join_midpoint.is_some())
            .finish()
    }
}
