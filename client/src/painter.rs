use paint_shared::{clamp_brush_size, encode, BrushSettings, Point, StrokeMessage};

use crate::net::Transmit;
use crate::preferences::{load_session, save_session, KeyValueStore, StoredSession};
use crate::render::render_stroke;
use crate::surface::Surface;

/// Brush plus pointer tracking. `last_point` is `Some` exactly while the
/// pointer is down.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub brush: BrushSettings,
    pub last_point: Option<Point>,
    pub pointer_down: bool,
}

/// Next state plus the stroke to paint locally and send, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: SessionState,
    pub stroke: Option<StrokeMessage>,
}

impl Transition {
    fn quiet(state: SessionState) -> Self {
        Self {
            state,
            stroke: None,
        }
    }
}

impl SessionState {
    /// A restored session always starts idle; only the brush carries over.
    pub fn restore(stored: &StoredSession) -> Self {
        Self {
            brush: stored.brush(),
            last_point: None,
            pointer_down: false,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.pointer_down
    }

    /// Idle -> Drawing. Emits a dot so a click without movement leaves a mark.
    /// A second press while already drawing is ignored.
    pub fn on_pointer_down(&self, point: Point) -> Transition {
        if self.pointer_down || !point.is_finite() {
            return Transition::quiet(self.clone());
        }
        Transition {
            state: Self {
                brush: self.brush.clone(),
                last_point: Some(point),
                pointer_down: true,
            },
            stroke: Some(StrokeMessage::dot(point, &self.brush)),
        }
    }

    /// Emits `last_point -> point` while drawing; does nothing while idle.
    pub fn on_pointer_move(&self, point: Point) -> Transition {
        let Some(last_point) = self.last_point.filter(|_| self.pointer_down) else {
            return Transition::quiet(self.clone());
        };
        if !point.is_finite() || point == last_point {
            return Transition::quiet(self.clone());
        }
        Transition {
            state: Self {
                brush: self.brush.clone(),
                last_point: Some(point),
                pointer_down: true,
            },
            stroke: Some(StrokeMessage::segment(last_point, point, &self.brush)),
        }
    }

    pub fn on_pointer_up(&self) -> Transition {
        Transition::quiet(Self {
            brush: self.brush.clone(),
            last_point: None,
            pointer_down: false,
        })
    }

    /// `None` when `color` is not a hex color.
    pub fn with_color(&self, color: &str) -> Option<Self> {
        Some(Self {
            brush: BrushSettings::new(color, self.brush.size)?,
            ..self.clone()
        })
    }

    pub fn with_size(&self, size: f64) -> Self {
        Self {
            brush: BrushSettings {
                color: self.brush.color.clone(),
                size: clamp_brush_size(size),
            },
            ..self.clone()
        }
    }

    pub fn to_stored(&self) -> StoredSession {
        StoredSession {
            brush_color: self.brush.color.clone(),
            brush_size: self.brush.size,
            last_point: self.last_point,
            mouse_down: self.pointer_down,
        }
    }
}

/// Drives [`SessionState`] transitions and performs their side effects:
/// local echo first, then the send, then persistence.
pub struct Painter<S, T, K> {
    state: SessionState,
    surface: S,
    transport: T,
    store: K,
}

impl<S: Surface, T: Transmit, K: KeyValueStore> Painter<S, T, K> {
    pub fn restore(surface: S, transport: T, store: K) -> Self {
        let state = SessionState::restore(&load_session(&store));
        Self {
            state,
            surface,
            transport,
            store,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn pointer_down(&mut self, point: Point) {
        let transition = self.state.on_pointer_down(point);
        self.apply(transition);
    }

    pub fn pointer_move(&mut self, point: Point) {
        let transition = self.state.on_pointer_move(point);
        self.apply(transition);
    }

    pub fn pointer_up(&mut self) {
        let transition = self.state.on_pointer_up();
        self.apply(transition);
    }

    pub fn set_color(&mut self, color: &str) {
        match self.state.with_color(color) {
            Some(state) => self.apply(Transition::quiet(state)),
            None => log::warn!("ignoring brush color {color:?}"),
        }
    }

    pub fn set_size(&mut self, size: f64) {
        let state = self.state.with_size(size);
        self.apply(Transition::quiet(state));
    }

    fn apply(&mut self, transition: Transition) {
        let changed = transition.state != self.state;
        self.state = transition.state;
        if let Some(stroke) = transition.stroke {
            render_stroke(&mut self.surface, &stroke);
            // The local echo stands whatever happens to the send.
            if let Err(error) = self.transport.transmit(&encode(&stroke)) {
                log::warn!("stroke not sent: {error}");
            }
        }
        if changed {
            if let Err(error) = save_session(&mut self.store, &self.state.to_stored()) {
                log::warn!("preferences not saved: {error}");
            }
        }
    }
}

#[cfg(test)]
impl<S, T, K> Painter<S, T, K> {
    pub(crate) fn surface(&self) -> &S {
        &self.surface
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn store(&self) -> &K {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use paint_shared::decode;

    use super::*;
    use crate::net::TransmitError;
    use crate::preferences::memory::MemoryStore;
    use crate::preferences::STORAGE_KEY;
    use crate::surface::recording::{DrawOp, RecordingSurface};

    #[derive(Default)]
    struct RecordingTransport {
        sent: RefCell<Vec<String>>,
        open: Cell<bool>,
    }

    impl RecordingTransport {
        fn open() -> Self {
            let transport = Self::default();
            transport.open.set(true);
            transport
        }
    }

    impl Transmit for RecordingTransport {
        fn transmit(&self, text: &str) -> Result<(), TransmitError> {
            if !self.open.get() {
                return Err(TransmitError::NotOpen);
            }
            self.sent.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    type TestPainter = Painter<RecordingSurface, RecordingTransport, MemoryStore>;

    fn painter() -> TestPainter {
        Painter::restore(
            RecordingSurface::default(),
            RecordingTransport::open(),
            MemoryStore::default(),
        )
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn stroke_sequence_renders_two_segments_then_nothing() {
        let mut painter = painter();
        painter.pointer_down(p(0.0, 0.0));
        painter.pointer_move(p(1.0, 1.0));
        painter.pointer_move(p(2.0, 3.0));
        painter.pointer_up();
        let after_up = painter.surface().ops.len();
        painter.pointer_move(p(9.0, 9.0));

        let brush = BrushSettings::default();
        let segments = painter.surface().segments();
        assert_eq!(
            segments,
            vec![
                &DrawOp::Segment {
                    from: p(0.0, 0.0),
                    to: p(1.0, 1.0),
                    width: brush.size,
                    color: brush.color.clone(),
                },
                &DrawOp::Segment {
                    from: p(1.0, 1.0),
                    to: p(2.0, 3.0),
                    width: brush.size,
                    color: brush.color.clone(),
                },
            ]
        );
        assert_eq!(painter.surface().ops.len(), after_up);
        assert!(!painter.state().is_drawing());
        assert_eq!(painter.state().last_point, None);
    }

    #[test]
    fn pointer_down_leaves_a_dot_locally_and_remotely() {
        let mut painter = painter();
        painter.pointer_down(p(5.0, 5.0));

        assert_eq!(
            painter.surface().ops,
            vec![DrawOp::Disc {
                center: p(5.0, 5.0),
                radius: 5.0,
                color: "#000000".to_string(),
            }]
        );
        let sent = painter.transport().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(decode(&sent[0]).unwrap().is_dot());
    }

    #[test]
    fn second_press_while_drawing_does_not_reanchor() {
        let mut painter = painter();
        painter.pointer_down(p(0.0, 0.0));
        painter.pointer_down(p(900.0, 900.0));
        painter.pointer_move(p(1.0, 1.0));

        let sent = painter
            .transport()
            .sent
            .borrow()
            .iter()
            .map(|text| decode(text).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].is_dot());
        assert_eq!((sent[1].from, sent[1].to), (p(0.0, 0.0), p(1.0, 1.0)));
        assert_eq!(painter.surface().ops.len(), 2);
        assert_eq!(painter.state().last_point, Some(p(1.0, 1.0)));
    }

    #[test]
    fn idle_moves_neither_render_nor_send() {
        let mut painter = painter();
        painter.pointer_move(p(1.0, 1.0));
        painter.pointer_move(p(2.0, 2.0));
        assert!(painter.surface().ops.is_empty());
        assert!(painter.transport().sent.borrow().is_empty());
    }

    #[test]
    fn sent_messages_follow_pointer_order() {
        let mut painter = painter();
        painter.pointer_down(p(0.0, 0.0));
        for step in 1..=5 {
            painter.pointer_move(p(f64::from(step), 0.0));
        }
        let sent = painter
            .transport()
            .sent
            .borrow()
            .iter()
            .map(|text| decode(text).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(sent.len(), 6);
        for (index, window) in sent.windows(2).enumerate() {
            assert_eq!(window[0].to, window[1].from, "gap after message {index}");
        }
    }

    #[test]
    fn brush_changes_affect_only_later_segments() {
        let mut painter = painter();
        painter.pointer_down(p(0.0, 0.0));
        painter.pointer_move(p(1.0, 0.0));
        painter.set_color("#FF0000");
        painter.set_size(30.0);
        painter.pointer_move(p(2.0, 0.0));

        let sent = painter
            .transport()
            .sent
            .borrow()
            .iter()
            .map(|text| decode(text).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(sent[1].brush_color, "#000000");
        assert_eq!(sent[1].brush_size, 10.0);
        assert_eq!(sent[2].brush_color, "#ff0000");
        assert_eq!(sent[2].brush_size, 30.0);
        assert_eq!(
            painter.surface().ops[1],
            DrawOp::Segment {
                from: p(0.0, 0.0),
                to: p(1.0, 0.0),
                width: 10.0,
                color: "#000000".to_string(),
            }
        );
    }

    #[test]
    fn invalid_color_and_size_inputs_are_contained() {
        let mut painter = painter();
        painter.set_color("not-a-color");
        assert_eq!(painter.state().brush.color, "#000000");
        painter.set_size(500.0);
        assert_eq!(painter.state().brush.size, 100.0);
        painter.set_size(-3.0);
        assert_eq!(painter.state().brush.size, 1.0);
    }

    #[test]
    fn color_change_keeps_current_size() {
        let mut painter = painter();
        painter.set_size(100.0);
        painter.set_color("#ABC");
        assert_eq!(
            painter.state().brush,
            BrushSettings {
                color: "#aabbcc".to_string(),
                size: 100.0,
            }
        );
    }

    #[test]
    fn transmit_failure_keeps_local_render() {
        let mut painter = Painter::restore(
            RecordingSurface::default(),
            RecordingTransport::default(),
            MemoryStore::default(),
        );
        painter.pointer_down(p(0.0, 0.0));
        painter.pointer_move(p(4.0, 4.0));

        assert_eq!(painter.surface().ops.len(), 2);
        assert_eq!(painter.surface().segments().len(), 1);
        assert!(painter.transport().sent.borrow().is_empty());
        assert_eq!(painter.state().last_point, Some(p(4.0, 4.0)));
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let mut painter = painter();
        painter.pointer_down(p(f64::NAN, 0.0));
        assert!(!painter.state().is_drawing());
        painter.pointer_down(p(0.0, 0.0));
        painter.pointer_move(p(f64::INFINITY, 1.0));
        assert_eq!(painter.state().last_point, Some(p(0.0, 0.0)));
        assert!(painter.surface().segments().is_empty());
    }

    #[test]
    fn preferences_persist_and_restore_brush_only() {
        let mut painter = painter();
        painter.set_color("#336699");
        painter.set_size(25.0);
        painter.pointer_down(p(7.0, 8.0));

        let mut store = MemoryStore::default();
        store.entries = painter.store().entries.clone();
        let stored: serde_json::Value =
            serde_json::from_str(&store.entries[STORAGE_KEY]).unwrap();
        assert_eq!(stored["mouseDown"], true);

        let restored = Painter::restore(
            RecordingSurface::default(),
            RecordingTransport::open(),
            store,
        );
        assert_eq!(
            restored.state(),
            &SessionState {
                brush: BrushSettings::new("#336699", 25.0).unwrap(),
                last_point: None,
                pointer_down: false,
            }
        );
    }

    #[test]
    fn storage_failure_never_blocks_drawing() {
        let store = MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        };
        let mut painter = Painter::restore(
            RecordingSurface::default(),
            RecordingTransport::open(),
            store,
        );
        painter.set_color("#abcdef");
        painter.pointer_down(p(1.0, 1.0));
        assert_eq!(painter.state().brush.color, "#abcdef");
        assert_eq!(painter.surface().ops.len(), 1);
        assert_eq!(painter.transport().sent.borrow().len(), 1);
        assert!(painter.store().entries.is_empty());
    }

    #[test]
    fn transitions_are_pure() {
        let idle = SessionState::default();
        let down = idle.on_pointer_down(p(1.0, 1.0));
        assert_eq!(idle, SessionState::default());
        let moved = down.state.on_pointer_move(p(2.0, 2.0));
        assert_eq!(down.state.last_point, Some(p(1.0, 1.0)));
        assert_eq!(moved.state.last_point, Some(p(2.0, 2.0)));
        assert_eq!(moved.state.on_pointer_up().state, SessionState::default());
        assert_eq!(idle.on_pointer_move(p(3.0, 3.0)), Transition::quiet(idle.clone()));
    }
}
