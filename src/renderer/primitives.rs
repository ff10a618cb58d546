use super::mode::RenderMode;
use super::vertex::Vertex;

/// Primitive classes a renderer can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Triangle,
    Cube,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Triangle => "triangle",
            PrimitiveKind::Cube => "cube",
        }
    }

    /// Axis the model spins around as time advances.
    pub fn spin_axis(self) -> glam::Vec3 {
        match self {
            PrimitiveKind::Triangle => glam::Vec3::Z,
            PrimitiveKind::Cube => glam::Vec3::new(0.5, 1.0, 0.0).normalize(),
        }
    }

    /// Flat primitives are visible from both sides.
    pub fn is_solid(self) -> bool {
        matches!(self, PrimitiveKind::Cube)
    }
}

/// Immutable vertex and index data for one primitive kind.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDescriptor {
    kind: PrimitiveKind,
    vertices: Vec<Vertex>,
    triangles: Vec<u16>,
    edges: Vec<u16>,
}

impl GeometryDescriptor {
    pub fn for_kind(kind: PrimitiveKind) -> Self {
        let (vertices, triangles, edges) = match kind {
            PrimitiveKind::Triangle => triangle_mesh(),
            PrimitiveKind::Cube => cube_mesh(),
        };
        Self {
            kind,
            vertices,
            triangles,
            edges,
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Index list for the given mode: triangle list for solid, line list for wireframe.
    pub fn indices(&self, mode: RenderMode) -> &[u16] {
        match mode {
            RenderMode::Solid => &self.triangles,
            RenderMode::Wireframe => &self.edges,
        }
    }

    pub fn index_count(&self, mode: RenderMode) -> u32 {
        self.indices(mode).len() as u32
    }

    pub fn primitive_count(&self, mode: RenderMode) -> u32 {
        match mode {
            RenderMode::Solid => self.index_count(mode) / 3,
            RenderMode::Wireframe => self.index_count(mode) / 2,
        }
    }
}

fn triangle_mesh() -> (Vec<Vertex>, Vec<u16>, Vec<u16>) {
    let n = [0.0, 0.0, 1.0];
    let verts = vec![
        Vertex::new([0.0, 0.8, 0.0], n, [1.0, 0.0, 0.0]),
        Vertex::new([-0.8, -0.4, 0.0], n, [0.0, 1.0, 0.0]),
        Vertex::new([0.8, -0.4, 0.0], n, [0.0, 0.0, 1.0]),
    ];
    (verts, vec![0, 1, 2], vec![0, 1, 1, 2, 2, 0])
}

fn cube_mesh() -> (Vec<Vertex>, Vec<u16>, Vec<u16>) {
    let p = |x, y, z| [x, y, z];

    const RED: [f32; 3] = [0.90, 0.25, 0.20];
    const CYAN: [f32; 3] = [0.20, 0.75, 0.80];
    const GREEN: [f32; 3] = [0.30, 0.80, 0.30];
    const MAGENTA: [f32; 3] = [0.80, 0.30, 0.75];
    const BLUE: [f32; 3] = [0.25, 0.40, 0.90];
    const YELLOW: [f32; 3] = [0.95, 0.85, 0.25];

    // Four corners per face, counter-clockwise seen from outside.
    let verts = vec![
        // +X
        Vertex::new(p(0.5, -0.5, -0.5), [1.0, 0.0, 0.0], RED),
        Vertex::new(p(0.5, 0.5, -0.5), [1.0, 0.0, 0.0], RED),
        Vertex::new(p(0.5, 0.5, 0.5), [1.0, 0.0, 0.0], RED),
        Vertex::new(p(0.5, -0.5, 0.5), [1.0, 0.0, 0.0], RED),
        // -X
        Vertex::new(p(-0.5, -0.5, 0.5), [-1.0, 0.0, 0.0], CYAN),
        Vertex::new(p(-0.5, 0.5, 0.5), [-1.0, 0.0, 0.0], CYAN),
        Vertex::new(p(-0.5, 0.5, -0.5), [-1.0, 0.0, 0.0], CYAN),
        Vertex::new(p(-0.5, -0.5, -0.5), [-1.0, 0.0, 0.0], CYAN),
        // +Y
        Vertex::new(p(-0.5, 0.5, -0.5), [0.0, 1.0, 0.0], GREEN),
        Vertex::new(p(-0.5, 0.5, 0.5), [0.0, 1.0, 0.0], GREEN),
        Vertex::new(p(0.5, 0.5, 0.5), [0.0, 1.0, 0.0], GREEN),
        Vertex::new(p(0.5, 0.5, -0.5), [0.0, 1.0, 0.0], GREEN),
        // -Y
        Vertex::new(p(-0.5, -0.5, 0.5), [0.0, -1.0, 0.0], MAGENTA),
        Vertex::new(p(-0.5, -0.5, -0.5), [0.0, -1.0, 0.0], MAGENTA),
        Vertex::new(p(0.5, -0.5, -0.5), [0.0, -1.0, 0.0], MAGENTA),
        Vertex::new(p(0.5, -0.5, 0.5), [0.0, -1.0, 0.0], MAGENTA),
        // +Z
        Vertex::new(p(0.5, -0.5, 0.5), [0.0, 0.0, 1.0], BLUE),
        Vertex::new(p(0.5, 0.5, 0.5), [0.0, 0.0, 1.0], BLUE),
        Vertex::new(p(-0.5, 0.5, 0.5), [0.0, 0.0, 1.0], BLUE),
        Vertex::new(p(-0.5, -0.5, 0.5), [0.0, 0.0, 1.0], BLUE),
        // -Z
        Vertex::new(p(-0.5, -0.5, -0.5), [0.0, 0.0, -1.0], YELLOW),
        Vertex::new(p(-0.5, 0.5, -0.5), [0.0, 0.0, -1.0], YELLOW),
        Vertex::new(p(0.5, 0.5, -0.5), [0.0, 0.0, -1.0], YELLOW),
        Vertex::new(p(0.5, -0.5, -0.5), [0.0, 0.0, -1.0], YELLOW),
    ];

    let triangles = (0..6u16)
        .flat_map(|f| {
            let o = f * 4;
            [o, o + 1, o + 2, o, o + 2, o + 3]
        })
        .collect::<Vec<_>>();

    let edges = (0..6u16)
        .flat_map(|f| {
            let o = f * 4;
            [o, o + 1, o + 1, o + 2, o + 2, o + 3, o + 3, o]
        })
        .collect::<Vec<_>>();

    (verts, triangles, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const KINDS: [PrimitiveKind; 2] = [PrimitiveKind::Triangle, PrimitiveKind::Cube];

    #[test]
    fn cube_counts_look_right() {
        let geometry = GeometryDescriptor::for_kind(PrimitiveKind::Cube);
        assert_eq!(geometry.vertices().len(), 24);
        assert_eq!(geometry.index_count(RenderMode::Solid), 36);
        assert_eq!(geometry.index_count(RenderMode::Wireframe), 48);
        assert_eq!(geometry.primitive_count(RenderMode::Solid), 12);
        assert_eq!(geometry.primitive_count(RenderMode::Wireframe), 24);
    }

    #[test]
    fn triangle_counts_look_right() {
        let geometry = GeometryDescriptor::for_kind(PrimitiveKind::Triangle);
        assert_eq!(geometry.vertices().len(), 3);
        assert_eq!(geometry.primitive_count(RenderMode::Solid), 1);
        assert_eq!(geometry.primitive_count(RenderMode::Wireframe), 3);
    }

    #[test]
    fn indices_stay_within_vertex_count() {
        for kind in KINDS {
            let geometry = GeometryDescriptor::for_kind(kind);
            let count = geometry.vertices().len();
            for mode in RenderMode::ALL {
                assert!(
                    geometry.indices(mode).iter().all(|&i| (i as usize) < count),
                    "{kind:?}/{mode:?} references a missing vertex"
                );
            }
        }
    }

    #[test]
    fn geometry_is_centered_on_origin() {
        for kind in KINDS {
            let geometry = GeometryDescriptor::for_kind(kind);
            let sum: Vec3 = geometry
                .vertices()
                .iter()
                .map(|vtx| Vec3::from_array(vtx.pos))
                .sum();
            let centroid = sum / geometry.vertices().len() as f32;
            assert!(centroid.length() < 1e-6, "{kind:?} centroid {centroid:?}");
        }
    }

    #[test]
    fn cube_triangles_face_outward() {
        let geometry = GeometryDescriptor::for_kind(PrimitiveKind::Cube);
        let verts = geometry.vertices();
        for tri in geometry.indices(RenderMode::Solid).chunks(3) {
            let a = Vec3::from_array(verts[tri[0] as usize].pos);
            let b = Vec3::from_array(verts[tri[1] as usize].pos);
            let c = Vec3::from_array(verts[tri[2] as usize].pos);
            let face_normal = (b - a).cross(c - a).normalize();
            let declared = Vec3::from_array(verts[tri[0] as usize].normal);
            assert!(face_normal.dot(declared) > 0.99, "triangle {tri:?} winds inward");
        }
    }

    #[test]
    fn for_kind_is_pure() {
        for kind in KINDS {
            assert_eq!(
                GeometryDescriptor::for_kind(kind),
                GeometryDescriptor::for_kind(kind)
            );
        }
    }
}
