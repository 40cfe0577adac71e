//! Wavefront OBJ parsing.

use super::LoadError;
use crate::geometry::MeshData;
use std::collections::HashMap;

/// One `o`/`g` block of an OBJ file.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjObject {
    /// Object or group name.
    pub name: String,
    /// Triangulated geometry.
    pub mesh: MeshData,
}

/// Wavefront OBJ file loader. Materials are ignored; the scene assigns its own.
#[derive(Debug, Default)]
pub struct ObjLoader;

/// Builder for the object currently being parsed.
struct ObjectBuilder {
    name: String,
    mesh: MeshData,
    // (position, normal) index pair -> output vertex
    cache: HashMap<(usize, Option<usize>), u32>,
}

impl ObjectBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: MeshData::default(),
            cache: HashMap::new(),
        }
    }

    fn vertex(&mut self, key: (usize, Option<usize>), positions: &[[f32; 3]], normals: &[[f32; 3]]) -> u32 {
        if let Some(&index) = self.cache.get(&key) {
            return index;
        }
        let index = self.mesh.positions.len() as u32;
        self.mesh.positions.push(positions[key.0]);
        if let Some(n) = key.1 {
            self.mesh.normals.push(normals[n]);
        }
        self.cache.insert(key, index);
        index
    }

    fn finish(self) -> Option<ObjObject> {
        if self.mesh.is_empty() {
            return None;
        }
        let mut mesh = self.mesh;
        // mixed faces with and without normals cannot be represented
        if mesh.normals.len() != mesh.positions.len() {
            mesh.normals.clear();
        }
        Some(ObjObject { name: self.name, mesh })
    }
}

impl ObjLoader {
    /// Create a new OBJ loader.
    pub fn new() -> Self {
        Self
    }

    /// Parse OBJ text into its objects, in file order. Polygons are fan
    /// triangulated.
    pub fn load_from_str(&self, content: &str) -> Result<Vec<ObjObject>, LoadError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut objects = Vec::new();
        let mut current = ObjectBuilder::new("default");

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(tag) = parts.next() else { continue };
            let invalid = |what: &str| LoadError::InvalidData(format!("line {}: {}", line_no + 1, what));

            match tag {
                "v" => positions.push(parse_vec3(&mut parts).ok_or_else(|| invalid("bad vertex"))?),
                "vn" => normals.push(parse_vec3(&mut parts).ok_or_else(|| invalid("bad normal"))?),
                "f" => {
                    let mut corners = Vec::with_capacity(4);
                    for spec in parts {
                        let key = parse_face_vertex(spec, positions.len(), normals.len())
                            .ok_or_else(|| invalid("bad face index"))?;
                        corners.push(current.vertex(key, &positions, &normals));
                    }
                    if corners.len() < 3 {
                        return Err(invalid("face with fewer than three vertices"));
                    }
                    for i in 1..corners.len() - 1 {
                        current.mesh.indices.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
                    }
                }
                "o" | "g" => {
                    let name = parts.collect::<Vec<_>>().join(" ");
                    let finished = std::mem::replace(&mut current, ObjectBuilder::new(name));
                    objects.extend(finished.finish());
                }
                // vt, usemtl, mtllib, s, ...
                _ => {}
            }
        }
        objects.extend(current.finish());
        Ok(objects)
    }

    /// Parse OBJ bytes.
    pub fn load_from_bytes(&self, data: &[u8]) -> Result<Vec<ObjObject>, LoadError> {
        let content = std::str::from_utf8(data).map_err(|e| LoadError::InvalidData(format!("invalid UTF-8: {}", e)))?;
        self.load_from_str(content)
    }
}

fn parse_vec3<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 3]> {
    let mut out = [0.0; 3];
    for value in &mut out {
        *value = parts.next()?.parse().ok()?;
    }
    Some(out)
}

/// Resolve `v`, `v/vt`, `v//vn` or `v/vt/vn` into zero-based indices.
/// Negative indices count back from the end.
fn parse_face_vertex(spec: &str, position_count: usize, normal_count: usize) -> Option<(usize, Option<usize>)> {
    let mut fields = spec.split('/');
    let v = resolve_index(fields.next()?, position_count)?;
    let _vt = fields.next();
    let vn = match fields.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, normal_count)?),
        _ => None,
    };
    Some((v, vn))
}

fn resolve_index(field: &str, count: usize) -> Option<usize> {
    let raw: i64 = field.parse().ok()?;
    let index = if raw > 0 { raw - 1 } else { count as i64 + raw };
    (raw != 0 && (0..count as i64).contains(&index)).then_some(index as usize)
}
