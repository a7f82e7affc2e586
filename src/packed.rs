use crate::vertex::Vertex;
use crate::{Bounds, Color, Point, Transform};
use clamped::Clamp;

/// Packed vertex layouts. Every lane is an `f32` holding an integer of at
/// most 24 bits, so it survives the float exactly.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertFormat {
    /// One lane: `x·2¹² + y`.
    X12Y12,
    /// Two lanes: `x·2¹³ + a·2⁶ + r` and `y·2¹³ + g·2⁶ + b`.
    X11A7R6Y11G7B6,
    /// The two color lanes plus `u·2¹² + v`.
    X11A7R6Y11G7B6U12V12,
}

impl VertFormat {
    pub fn floats_per_vertex(self) -> usize {
        match self {
            VertFormat::X12Y12 => 1,
            VertFormat::X11A7R6Y11G7B6 => 2,
            VertFormat::X11A7R6Y11G7B6U12V12 => 3,
        }
    }

    pub fn position_bits(self) -> u32 {
        match self {
            VertFormat::X12Y12 => 12,
            VertFormat::X11A7R6Y11G7B6 | VertFormat::X11A7R6Y11G7B6U12V12 => 11,
        }
    }

    /// Largest representable coordinate along either axis.
    pub fn position_range(self) -> f32 {
        ((1u32 << self.position_bits()) - 1) as f32
    }

    pub fn has_color(self) -> bool {
        self != VertFormat::X12Y12
    }

    pub fn has_texture_coords(self) -> bool {
        self == VertFormat::X11A7R6Y11G7B6U12V12
    }
}

const UV_RANGE: f32 = 4095.0;

fn quantize(value: f32, max: f32) -> u32 {
    value.round().clamped(0.0, max) as u32
}

fn quantize_unit(value: f32, max: u32) -> u32 {
    (value.clamped(0.0, 1.0) * max as f32).round() as u32
}

/// Maps `envelope` onto the format's representable position range. An axis
/// with no extent keeps scale 1.
pub fn calc_transform_for_format(envelope: &Bounds, fmt: VertFormat) -> Transform {
    let max = fmt.position_range();
    let sx = if envelope.width() > 0.0 { max / envelope.width() } else { 1.0 };
    let sy = if envelope.height() > 0.0 { max / envelope.height() } else { 1.0 };
    Transform::translate(-envelope.min.x, -envelope.min.y) * Transform::scale(sx, sy)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackedVertList {
    format: VertFormat,
    data: Vec<f32>,
}

impl PackedVertList {
    pub fn new(format: VertFormat) -> PackedVertList {
        PackedVertList {
            format,
            data: Vec::new(),
        }
    }

    /// Packs `verts` after mapping their positions through `xform`.
    pub fn pack_verts(verts: &[Vertex], xform: &Transform, format: VertFormat) -> PackedVertList {
        let max = format.position_range();
        let mut data = Vec::with_capacity(verts.len() * format.floats_per_vertex());
        for v in verts {
            let p = xform.transform_point(v.position);
            let x = quantize(p.x, max);
            let y = quantize(p.y, max);
            match format {
                VertFormat::X12Y12 => data.push(((x << 12) | y) as f32),
                VertFormat::X11A7R6Y11G7B6 | VertFormat::X11A7R6Y11G7B6U12V12 => {
                    let c = v.color;
                    let a = quantize_unit(c.a, 127);
                    let r = quantize_unit(c.r, 63);
                    let g = quantize_unit(c.g, 127);
                    let b = quantize_unit(c.b, 63);
                    data.push(((x << 13) | (a << 6) | r) as f32);
                    data.push(((y << 13) | (g << 6) | b) as f32);
                    if format.has_texture_coords() {
                        let u = quantize_unit(v.texture_coords.x, UV_RANGE as u32);
                        let w = quantize_unit(v.texture_coords.y, UV_RANGE as u32);
                        data.push(((u << 12) | w) as f32);
                    }
                }
            }
        }
        PackedVertList { format, data }
    }

    /// Unpacks vertex `i`. Positions come back in packed space.
    pub fn unpack_vertex(&self, i: usize) -> Vertex {
        let stride = self.format.floats_per_vertex();
        let lanes = &self.data[i * stride..(i + 1) * stride];
        match self.format {
            VertFormat::X12Y12 => {
                let bits = lanes[0] as u32;
                Vertex::new((bits >> 12) as f32, (bits & 0xfff) as f32)
            }
            VertFormat::X11A7R6Y11G7B6 | VertFormat::X11A7R6Y11G7B6U12V12 => {
                let l0 = lanes[0] as u32;
                let l1 = lanes[1] as u32;
                let color = Color::rgba(
                    (l0 & 0x3f) as f32 / 63.0,
                    ((l1 >> 6) & 0x7f) as f32 / 127.0,
                    (l1 & 0x3f) as f32 / 63.0,
                    ((l0 >> 6) & 0x7f) as f32 / 127.0,
                );
                let mut v = Vertex::new((l0 >> 13) as f32, (l1 >> 13) as f32).with_color(color);
                if self.format.has_texture_coords() {
                    let l2 = lanes[2] as u32;
                    v.texture_coords = Point::new(
                        (l2 >> 12) as f32 / UV_RANGE,
                        (l2 & 0xfff) as f32 / UV_RANGE,
                    );
                }
                v
            }
        }
    }

    pub fn format(&self) -> VertFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.format.floats_per_vertex()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data = Vec::new();
    }

    pub fn as_floats(&self) -> &[f32] {
        &self.data
    }

    /// Raw bytes in upload order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}
