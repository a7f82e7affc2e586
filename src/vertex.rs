use crate::{Color, Point};

/// Seconds on the input clock.
pub type InputTime = f64;

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vertex {
    pub position: Point,
    pub color: Color,
    pub texture_coords: Point,
    /// When the vertex was extruded, for animated shaders.
    pub time: InputTime,
    pub pressure: f32,
}

impl Vertex {
    pub fn new(x: f32, y: f32) -> Vertex {
        Vertex::at(Point::new(x, y))
    }

    pub fn at(position: Point) -> Vertex {
        Vertex {
            position,
            color: Color::BLACK,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Vertex {
        self.color = color;
        self
    }

    pub fn with_texture_coords(mut self, uv: Point) -> Vertex {
        self.texture_coords = uv;
        self
    }
}
