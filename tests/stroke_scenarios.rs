use anyhow::Result;
use inkstroke::*;
use test_log::test;

fn stroke(radius: f32, pts: &[(f32, f32)]) -> FatLine {
    let mut line = FatLine::with_radius(radius, 20);
    for (i, (x, y)) in pts.iter().enumerate() {
        line.extrude(Point::new(*x, *y), i as f64 * 0.016, true, false);
    }
    line
}

/// Draws to a backend that only understands 16-bit indices.
#[derive(Default)]
struct MockRenderer {
    drawn: Vec<(ShaderType, usize, usize)>,
}

impl MeshRenderer for MockRenderer {
    fn draw_mesh(&mut self, mesh: &OptimizedMesh) -> Result<(), InkError> {
        if mesh.shader_type == ShaderType::TexturedVert && mesh.texture.is_none() {
            return Err(InkError::Renderer("textured mesh without a texture".to_string()));
        }
        let idx = mesh.index16()?;
        self.drawn.push((mesh.shader_type, mesh.verts().as_bytes().len(), idx.len()));
        Ok(())
    }
}

#[test]
fn right_angle_stroke_with_round_tip() {
    let mut line = stroke(10.0, &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]);
    // two straight cross-sections for the first segment, then at the corner
    // a quarter turn sweeps ceil(0.5 * 20) = 10 arc steps, then the end
    // cross-section
    let fwd = line.forward_line().len();
    assert_eq!(fwd, 2 + 10 + 1);
    assert_eq!(fwd, line.backward_line().len());
    assert_eq!(line.mid_points().len(), 3);

    let cap = line.build_end_cap().expect("end cap bounds");
    let tol = 1e-3;
    assert!(cap.min.x <= 100.0 && cap.max.x >= 100.0);
    assert!(cap.min.y <= 100.0 + tol && cap.max.y >= 100.0);
    assert!(cap.min.x >= 90.0 - tol && cap.max.x <= 110.0 + tol);
    assert!(cap.max.y <= 110.0 + tol);
}

#[test]
fn near_points_do_not_change_the_stroke() {
    let mut line = stroke(10.0, &[(0.0, 0.0), (50.0, 0.0)]);
    let before = (line.forward_line().len(), line.backward_line().len(), line.mid_points().len());
    assert_eq!(line.extrude(Point::new(50.5, 0.0), 1.0, false, false), None);
    assert_eq!(
        before,
        (line.forward_line().len(), line.backward_line().len(), line.mid_points().len())
    );
}

#[test]
fn append_scaled_mesh() {
    let mut a = Mesh::from_verts(vec![Vertex::new(0.0, 0.0), Vertex::new(4.0, 0.0), Vertex::new(0.0, 4.0)]);
    a.idx = vec![0, 1, 2];
    let mut b = Mesh::from_verts(vec![Vertex::new(1.0, 1.0), Vertex::new(3.0, 1.0), Vertex::new(1.0, 3.0)]);
    b.idx = vec![0, 1, 2];
    b.object_matrix = Transform::scale(2.0, 2.0);

    a.append(&b);
    assert_eq!(a.object_pos_to_world(a.verts[3].position), Point::new(2.0, 2.0));
    assert_eq!(a.idx, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn stroke_survives_packing() -> Result<()> {
    let mut line = stroke(6.0, &[(10.0, 10.0), (80.0, 20.0), (120.0, 90.0), (60.0, 140.0)]);
    line.build_end_cap();
    let screen_to_world = Transform::scale(0.5, 0.5) * Transform::translate(-3.0, 7.0);
    let mesh = build_line_mesh(&line, &screen_to_world);

    let opt = OptimizedMesh::new(ShaderType::ColoredVert, &mesh);
    let back = opt.to_mesh()?;
    assert_eq!(back.triangle_count(), mesh.triangle_count());

    let env = mesh.envelope().expect("non-empty mesh");
    let range = VertFormat::X11A7R6Y11G7B6.position_range();
    // one quantization step in screen space, scaled by 0.5 into the world
    let tol = 0.5 * env.width().max(env.height()) / range + 1e-3;
    for (src, unpacked) in mesh.verts.iter().zip(&back.verts) {
        let want = mesh.object_pos_to_world(src.position);
        let got = back.object_pos_to_world(unpacked.position);
        assert!(want.equals(got, tol), "{:?} vs {:?}", want, got);
    }
    Ok(())
}

#[test]
fn large_meshes_refuse_16_bit_indices() -> Result<()> {
    let count = 65_538;
    let verts = (0..count)
        .map(|i| Vertex::new((i % 256) as f32, (i / 256) as f32))
        .collect();
    let mut mesh = Mesh::from_verts(verts);
    mesh.gen_index();
    assert!(mesh.index16().is_err());

    let mut opt = OptimizedMesh::new(ShaderType::SingleColor, &mesh);
    assert!(matches!(opt.indices(), IndexBuffer::U32(_)));
    assert_eq!(opt.index_size(), count);
    assert_eq!(
        opt.index16(),
        Err(InkError::IndexOverflow { vertex_count: count })
    );

    let mut renderer = MockRenderer::default();
    let err = renderer.draw_mesh(&opt).unwrap_err();
    assert!(err.to_string().starts_with("ERR_INDEX_OVERFLOW"));
    assert!(renderer.drawn.is_empty());

    opt.clear_cpu_memory_verts();
    assert_eq!(
        opt.index16(),
        Err(InkError::IndexOverflow { vertex_count: count })
    );
    Ok(())
}

#[test]
fn renderer_draws_each_stroke() -> Result<()> {
    let mut first = stroke(4.0, &[(0.0, 0.0), (30.0, 0.0)]);
    first.build_end_cap();
    let mut second = stroke(4.0, &[(0.0, 20.0), (30.0, 40.0)]);
    second.build_end_cap();

    let meshes = vec![
        OptimizedMesh::new(ShaderType::ColoredVert, &build_line_mesh(&first, &Transform::identity())),
        OptimizedMesh::new(ShaderType::Erase, &build_line_mesh(&second, &Transform::identity())),
    ];
    let mut renderer = MockRenderer::default();
    renderer.draw_meshes(&meshes)?;

    assert_eq!(renderer.drawn.len(), 2);
    assert_eq!(renderer.drawn[0].0, ShaderType::ColoredVert);
    assert_eq!(renderer.drawn[1].0, ShaderType::Erase);
    // erase meshes pack one float per vertex, colored ones two
    assert_eq!(renderer.drawn[1].1, meshes[1].verts().len() * 4);
    assert_eq!(renderer.drawn[0].1, meshes[0].verts().len() * 8);
    Ok(())
}

#[test]
fn backend_errors_stop_a_batch() {
    let mut line = stroke(4.0, &[(0.0, 0.0), (30.0, 0.0)]);
    line.build_end_cap();
    let mesh = build_line_mesh(&line, &Transform::identity());
    let meshes = vec![
        OptimizedMesh::new(ShaderType::SingleColor, &mesh),
        OptimizedMesh::new(ShaderType::TexturedVert, &mesh),
        OptimizedMesh::new(ShaderType::SingleColor, &mesh),
    ];
    let mut renderer = MockRenderer::default();
    let err = renderer.draw_meshes(&meshes).unwrap_err();
    assert!(matches!(err, InkError::Renderer(_)));
    assert_eq!(renderer.drawn.len(), 1);
}

#[test]
fn outline_of_a_chained_stroke_closes() {
    let first = stroke(2.0, &[(0.0, 0.0), (20.0, 0.0)]);
    let mut second = FatLine::with_radius(2.0, 20);
    second.set_start_cap_to_line_back(&first);
    second.extrude(Point::new(20.0, 20.0), 1.0, true, false);
    second.build_end_cap();

    let lines = [first, second];
    let outline = FatLine::outline_as_array(&lines, &Transform::identity());
    let start = lines[0].start_cap();
    assert_eq!(outline[0], start[0].position);
    assert_eq!(*outline.last().unwrap(), lines[0].backward_line()[0].position);
    let expected: usize = start.len()
        + lines[1].end_cap().len()
        + lines
            .iter()
            .map(|l| l.forward_line().len() + l.backward_line().len())
            .sum::<usize>();
    assert_eq!(outline.len(), expected);
}
