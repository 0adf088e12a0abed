//! Pointer and touch gesture state machine.
//!
//! The controller turns raw input into live transforms while a gesture is in
//! progress and commits the final transform to [`TransformHistory`] when the
//! gesture ends. It never writes the transform anywhere else.

use crate::handles::{detect_handle, to_local, Handle, Point, Stage};
use crate::history::TransformHistory;
use merchkit_core::data::{clamp_scale, normalize_degrees};
use merchkit_core::Transform;
use tracing::{debug, info};

/// Default smallest on-screen artwork dimension reachable by corner resize.
pub const DEFAULT_MIN_DIMENSION_PX: f64 = 50.0;

/// Keyboard modifiers held during a pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Constrain a move to its dominant axis.
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerOptions {
    pub min_dimension_px: f64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            min_dimension_px: DEFAULT_MIN_DIMENSION_PX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        handle: Handle,
        start_transform: Transform,
        start_pointer: Point,
        /// Pointer angle around the artwork center at gesture start, radians.
        start_angle: f64,
    },
    PinchScaling {
        start_transform: Transform,
        initial_distance: f64,
    },
}

/// Result of feeding one input event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureUpdate {
    /// Event had no effect on the gesture state.
    Ignored,
    /// A gesture began on the given handle. Pinch gestures report `Handle::None`.
    Started(Handle),
    /// Uncommitted transform to display.
    Live(Transform),
    /// Gesture ended and the transform was pushed to history.
    Committed(Transform),
    /// Gesture ended without touching history.
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct ManipulationController {
    state: GestureState,
    live: Option<Transform>,
    touch_drag: bool,
    options: ControllerOptions,
}

impl ManipulationController {
    pub fn new(options: ControllerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// Transform being manipulated, if a gesture is active.
    pub fn live(&self) -> Option<Transform> {
        self.live
    }

    /// Starts a drag on whichever handle lies under `pos`.
    pub fn pointer_down(
        &mut self,
        pos: Point,
        history: &mut TransformHistory,
        stage: &Stage,
    ) -> GestureUpdate {
        if self.is_active() {
            debug!("pointer down ignored, gesture already active");
            return GestureUpdate::Ignored;
        }
        let start = history.present();
        let handle = detect_handle(pos.x, pos.y, &start, stage);
        if handle == Handle::None {
            return GestureUpdate::Ignored;
        }

        let center = stage.frame.center_px(&start);
        self.state = GestureState::Dragging {
            handle,
            start_transform: start,
            start_pointer: pos,
            start_angle: (pos.y - center.y).atan2(pos.x - center.x),
        };
        self.live = Some(start);
        self.touch_drag = false;
        debug!(handle = handle.as_str(), x = pos.x, y = pos.y, "drag started");
        GestureUpdate::Started(handle)
    }

    pub fn pointer_move(
        &mut self,
        pos: Point,
        history: &mut TransformHistory,
        stage: &Stage,
    ) -> GestureUpdate {
        self.pointer_move_with(pos, Modifiers::NONE, history, stage)
    }

    /// Pointer move with modifier keys; shift locks a body move to one axis.
    pub fn pointer_move_with(
        &mut self,
        pos: Point,
        modifiers: Modifiers,
        _history: &mut TransformHistory,
        stage: &Stage,
    ) -> GestureUpdate {
        let GestureState::Dragging {
            handle,
            start_transform,
            start_pointer,
            start_angle,
        } = self.state
        else {
            return GestureUpdate::Ignored;
        };

        let next = match handle {
            Handle::Move => {
                move_transform(&start_transform, start_pointer, pos, modifiers, stage)
            }
            Handle::Rotate => rotate_transform(&start_transform, start_angle, pos, stage),
            h if h.is_corner() => resize_transform(
                &start_transform,
                h,
                start_pointer,
                pos,
                stage,
                self.options.min_dimension_px,
            ),
            _ => return GestureUpdate::Ignored,
        };

        self.live = Some(next);
        GestureUpdate::Live(next)
    }

    /// Ends the active gesture, committing its result.
    pub fn pointer_up(&mut self, history: &mut TransformHistory, _stage: &Stage) -> GestureUpdate {
        if !self.is_active() {
            return GestureUpdate::Ignored;
        }
        self.finish(history)
    }

    /// Leaving the surface mid-gesture behaves like releasing the pointer.
    pub fn pointer_leave(
        &mut self,
        history: &mut TransformHistory,
        stage: &Stage,
    ) -> GestureUpdate {
        if self.is_active() {
            debug!("pointer left surface during gesture");
        }
        self.pointer_up(history, stage)
    }

    /// One finger starts a drag; two fingers start (or upgrade to) a pinch.
    pub fn touch_start(
        &mut self,
        touches: &[Point],
        history: &mut TransformHistory,
        stage: &Stage,
    ) -> GestureUpdate {
        match touches {
            [] => GestureUpdate::Ignored,
            [single] => {
                let update = self.pointer_down(*single, history, stage);
                if matches!(update, GestureUpdate::Started(_)) {
                    self.touch_drag = true;
                }
                update
            }
            [a, b, ..] => {
                let start_transform = match self.state {
                    GestureState::Idle => history.present(),
                    GestureState::Dragging { .. } if self.touch_drag => {
                        self.live.unwrap_or_else(|| history.present())
                    }
                    _ => return GestureUpdate::Ignored,
                };
                let initial_distance = nalgebra::distance(a, b);
                if initial_distance <= f64::EPSILON {
                    return GestureUpdate::Ignored;
                }

                self.state = GestureState::PinchScaling {
                    start_transform,
                    initial_distance,
                };
                self.live = Some(start_transform);
                self.touch_drag = true;
                debug!(initial_distance, "pinch started");
                GestureUpdate::Started(Handle::None)
            }
        }
    }

    pub fn touch_move(
        &mut self,
        touches: &[Point],
        history: &mut TransformHistory,
        stage: &Stage,
    ) -> GestureUpdate {
        match (self.state, touches) {
            (
                GestureState::PinchScaling {
                    start_transform,
                    initial_distance,
                },
                [a, b, ..],
            ) => {
                let factor = nalgebra::distance(a, b) / initial_distance;
                let next = Transform {
                    scale: clamp_scale(start_transform.scale * factor),
                    ..start_transform
                };
                self.live = Some(next);
                GestureUpdate::Live(next)
            }
            (GestureState::Dragging { .. }, [single]) if self.touch_drag => {
                self.pointer_move(*single, history, stage)
            }
            _ => GestureUpdate::Ignored,
        }
    }

    /// `remaining` lists the touches still on the surface.
    pub fn touch_end(
        &mut self,
        remaining: &[Point],
        history: &mut TransformHistory,
        _stage: &Stage,
    ) -> GestureUpdate {
        let done = match self.state {
            GestureState::PinchScaling { .. } => remaining.len() < 2,
            GestureState::Dragging { .. } => self.touch_drag && remaining.is_empty(),
            GestureState::Idle => false,
        };
        if done {
            self.finish(history)
        } else {
            GestureUpdate::Ignored
        }
    }

    /// Abandons the active gesture without committing.
    pub fn cancel(&mut self) -> GestureUpdate {
        if !self.is_active() {
            return GestureUpdate::Ignored;
        }
        debug!("gesture cancelled");
        self.reset();
        GestureUpdate::Cancelled
    }

    fn finish(&mut self, history: &mut TransformHistory) -> GestureUpdate {
        if !self.is_active() {
            return GestureUpdate::Ignored;
        }
        let live = self.live;
        self.reset();

        // compare with history: a drag upgraded to a pinch keeps its movement
        match live {
            Some(t) if t != history.present() => {
                history.push_transform(t);
                let committed = history.present();
                info!(
                    x = committed.x,
                    y = committed.y,
                    scale = committed.scale,
                    rotation = committed.rotation,
                    "transform committed"
                );
                GestureUpdate::Committed(committed)
            }
            _ => {
                debug!("gesture ended without change");
                GestureUpdate::Cancelled
            }
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.live = None;
        self.touch_drag = false;
    }
}

fn move_transform(
    start: &Transform,
    start_pointer: Point,
    pos: Point,
    modifiers: Modifiers,
    stage: &Stage,
) -> Transform {
    let mut dx = pos.x - start_pointer.x;
    let mut dy = pos.y - start_pointer.y;
    if modifiers.shift {
        if dx.abs() >= dy.abs() {
            dy = 0.0;
        } else {
            dx = 0.0;
        }
    }
    let (dx_percent, dy_percent) = stage.frame.px_to_percent(Point::new(dx, dy));
    Transform {
        x: start.x + dx_percent,
        y: start.y + dy_percent,
        ..*start
    }
    .clamp()
}

fn rotate_transform(start: &Transform, start_angle: f64, pos: Point, stage: &Stage) -> Transform {
    let center = stage.frame.center_px(start);
    let current = (pos.y - center.y).atan2(pos.x - center.x);
    Transform {
        rotation: normalize_degrees(start.rotation + (current - start_angle).to_degrees()),
        ..*start
    }
    .clamp()
}

/// Uniform corner resize around a fixed center.
///
/// The dimension with the larger relative change drives the scale. Pixel
/// dimensions are bounded below by `min_dimension_px` and above by the frame,
/// see [`bound_scale`].
fn resize_transform(
    start: &Transform,
    handle: Handle,
    start_pointer: Point,
    pos: Point,
    stage: &Stage,
    min_dimension_px: f64,
) -> Transform {
    let (local_dx, local_dy) = to_local(
        pos.x - start_pointer.x,
        pos.y - start_pointer.y,
        start.rotation,
    );
    let start_width = stage.bounds.width * start.scale;
    let start_height = stage.bounds.height * start.scale;

    let new_width = start_width + 2.0 * handle.width_sign() * local_dx;
    let new_height = start_height + 2.0 * handle.height_sign() * local_dy;
    let w_ratio = relative(new_width, start_width);
    let h_ratio = relative(new_height, start_height);
    let factor = if (w_ratio - 1.0).abs() >= (h_ratio - 1.0).abs() {
        w_ratio
    } else {
        h_ratio
    };

    let scale = bound_scale(start.scale * factor, start.scale, stage, min_dimension_px);
    Transform { scale, ..*start }.clamp()
}

fn relative(value: f64, reference: f64) -> f64 {
    if reference.abs() > f64::EPSILON {
        value / reference
    } else {
        1.0
    }
}

/// Applies the pixel-dimension bounds in the direction of the drag.
///
/// Shrinking stops at `min_dimension_px` on the shorter edge and growing
/// stops at the frame fit. A bound already crossed at `start` holds the
/// scale where it was instead of snapping it.
fn bound_scale(candidate: f64, start: f64, stage: &Stage, min_dimension_px: f64) -> f64 {
    let smallest = stage.bounds.width.min(stage.bounds.height);
    if smallest <= f64::EPSILON {
        return clamp_scale(candidate);
    }

    let bounded = if candidate < start {
        let floor = (min_dimension_px / smallest).min(start);
        candidate.max(floor)
    } else if candidate > start {
        let upper = (stage.frame.width / stage.bounds.width)
            .min(stage.frame.height / stage.bounds.height);
        if upper.is_finite() {
            candidate.min(upper.max(start))
        } else {
            candidate
        }
    } else {
        start
    };
    clamp_scale(bounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::{BoundingSize, CanvasFrame};

    fn stage() -> Stage {
        Stage::new(CanvasFrame::new(794.0, 359.0), BoundingSize::default())
    }

    #[test]
    fn test_bound_scale_only_limits_drag_direction() {
        let tiny = Stage::new(CanvasFrame::new(20.0, 20.0), BoundingSize::default());
        // shrinking stops at the minimum even though the frame fit is smaller
        assert!((bound_scale(0.05, 1.0, &tiny, 50.0) - 0.25).abs() < 1e-12);
        // growing past a frame fit that was already exceeded holds the start
        assert_eq!(bound_scale(1.2, 0.3, &tiny, 50.0), 0.3);
        // shrinking below a floor that was already crossed holds the start
        let s = stage();
        assert_eq!(bound_scale(0.1, 0.2, &s, 50.0), 0.2);
        assert_eq!(bound_scale(0.7, 0.7, &s, 50.0), 0.7);
    }

    #[test]
    fn test_shift_locks_dominant_axis() {
        let s = stage();
        let start = Transform::default();
        let t = move_transform(
            &start,
            Point::new(0.0, 0.0),
            Point::new(40.0, 10.0),
            Modifiers::SHIFT,
            &s,
        );
        assert_eq!(t.y, start.y);
        assert!(t.x > start.x);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let s = stage();
        let start = Transform::default();
        let center = s.frame.center_px(&start);
        // knob straight above the center, dragged to the right of it
        let start_angle = (-100.0f64).atan2(0.0);
        let t = rotate_transform(&start, start_angle, Point::new(center.x + 100.0, center.y), &s);
        assert!((t.rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_up_while_idle_is_ignored() {
        let mut c = ManipulationController::default();
        let mut h = TransformHistory::default();
        assert_eq!(c.pointer_up(&mut h, &stage()), GestureUpdate::Ignored);
        assert_eq!(h.past_len(), 0);
    }
}
