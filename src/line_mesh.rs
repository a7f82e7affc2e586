use crate::fat_line::FatLine;
use crate::mesh::Mesh;
use crate::vertex::Vertex;
use crate::Transform;

/// Triangulates the outline of `line`.
///
/// Vertices stay in screen space and `screen_to_world` becomes the mesh's
/// object matrix. Caps are fanned, the two sides are zipped together even
/// when simplification left them with different lengths. Lines with no
/// triangles yet give an empty mesh.
pub fn build_line_mesh(line: &FatLine, screen_to_world: &Transform) -> Mesh {
    let mut mesh = Mesh::new();
    mesh.object_matrix = *screen_to_world;

    let start_cap = append(&mut mesh, line.start_cap());
    let fwd = append(&mut mesh, line.forward_line());
    let end_cap = append(&mut mesh, line.end_cap());
    let back = append(&mut mesh, line.backward_line());

    fan(&mut mesh.idx, start_cap);
    zip_sides(&mut mesh.idx, fwd, back);
    fan(&mut mesh.idx, end_cap);

    if mesh.idx.is_empty() {
        mesh.verts.clear();
    } else {
        mesh.normalize_triangle_orientation();
    }
    mesh
}

/// Triangulates a chain of lines into one mesh.
pub fn build_multi_line_mesh(lines: &[FatLine], screen_to_world: &Transform) -> Mesh {
    let mut mesh = Mesh::new();
    mesh.object_matrix = *screen_to_world;
    for line in lines {
        let line_mesh = build_line_mesh(line, screen_to_world);
        if !line_mesh.verts.is_empty() {
            mesh.append(&line_mesh);
        }
    }
    mesh
}

/// (first index, count)
type Run = (u32, u32);

fn append(mesh: &mut Mesh, verts: &[Vertex]) -> Run {
    let first = mesh.verts.len() as u32;
    mesh.verts.extend_from_slice(verts);
    (first, verts.len() as u32)
}

// caps are convex, so a fan from the first vertex covers them
fn fan(idx: &mut Vec<u32>, (first, count): Run) {
    for k in 1..count.saturating_sub(1) {
        idx.extend_from_slice(&[first, first + k, first + k + 1]);
    }
}

fn zip_sides(idx: &mut Vec<u32>, (f0, nf): Run, (b0, nb): Run) {
    if nf == 0 || nb == 0 {
        return;
    }
    let (mut i, mut j) = (0, 0);
    while i + 1 < nf || j + 1 < nb {
        // advance whichever side is behind in relative progress
        let advance_fwd = if i + 1 >= nf {
            false
        } else if j + 1 >= nb {
            true
        } else {
            (i + 1) * nb <= (j + 1) * nf
        };
        if advance_fwd {
            idx.extend_from_slice(&[f0 + i, b0 + j, f0 + i + 1]);
            i += 1;
        } else {
            idx.extend_from_slice(&[f0 + i, b0 + j, b0 + j + 1]);
            j += 1;
        }
    }
}
