use paint_shared::StrokeMessage;

use crate::surface::Surface;

/// Paints one stroke message with the brush it carries.
///
/// The local brush is never consulted, so every participant draws a given
/// message with identical arguments. A dot becomes a disc of diameter
/// `brush_size`; anything else is a round-capped segment.
pub fn render_stroke<S: Surface + ?Sized>(surface: &mut S, stroke: &StrokeMessage) {
    if stroke.is_dot() {
        surface.fill_disc(stroke.from, stroke.brush_size / 2.0, &stroke.brush_color);
    } else {
        surface.draw_segment(
            stroke.from,
            stroke.to,
            stroke.brush_size,
            &stroke.brush_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use paint_shared::{decode, encode, Point, StrokeMessage};

    use super::render_stroke;
    use crate::surface::recording::{DrawOp, RecordingSurface};

    fn forwarded() -> StrokeMessage {
        decode(r##"{"from":{"x":10,"y":10},"to":{"x":20,"y":20},"brushSize":5,"brushColor":"#ff0000"}"##)
            .unwrap()
    }

    #[test]
    fn two_renderers_issue_identical_primitives() {
        let wire = encode(&forwarded());
        let mut first = RecordingSurface::default();
        let mut second = RecordingSurface::default();

        render_stroke(&mut first, &decode(&wire).unwrap());
        render_stroke(&mut second, &decode(&wire).unwrap());

        let expected = DrawOp::Segment {
            from: Point::new(10.0, 10.0),
            to: Point::new(20.0, 20.0),
            width: 5.0,
            color: "#ff0000".to_string(),
        };
        assert_eq!(first.ops, vec![expected.clone()]);
        assert_eq!(second.ops, vec![expected]);
    }

    #[test]
    fn dot_renders_as_disc_of_brush_diameter() {
        let mut surface = RecordingSurface::default();
        let dot = StrokeMessage {
            from: Point::new(4.0, 4.0),
            to: Point::new(4.0, 4.0),
            brush_size: 12.0,
            brush_color: "#00ff00".to_string(),
        };
        render_stroke(&mut surface, &dot);
        assert_eq!(
            surface.ops,
            vec![DrawOp::Disc {
                center: Point::new(4.0, 4.0),
                radius: 6.0,
                color: "#00ff00".to_string(),
            }]
        );
    }

    #[test]
    fn replaying_a_message_repeats_the_same_primitive() {
        let mut surface = RecordingSurface::default();
        let stroke = forwarded();
        render_stroke(&mut surface, &stroke);
        render_stroke(&mut surface, &stroke);
        assert_eq!(surface.ops.len(), 2);
        assert_eq!(surface.ops[0], surface.ops[1]);
    }
}
