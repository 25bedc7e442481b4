//! Built-in engine: Wavefront OBJ (+ MTL) to glTF 2.0.
//!
//! Each OBJ object (`o` / `g`) becomes one mesh, one node and one binary
//! buffer; each `usemtl` run inside it becomes a primitive. Polygons are
//! fan-triangulated.
//!
//! OBJ carries no unit or animation data, so `unit_conversion`,
//! `animation_bake_rate` and `prefer_local_time_span` have nothing to act on.

use super::gltf::DocumentBuilder;
use super::{ConversionEngine, ConvertContext};
use crate::error::ConvError;
use crate::logger::Message;
use crate::writer::{relative_uri, BufferDescriptor};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Converts `.obj` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjEngine;

impl ConversionEngine for ObjEngine {
    fn convert(&self, input: &Path, ctx: &mut ConvertContext<'_>) -> Result<Value, ConvError> {
        let source = std::fs::read_to_string(input).map_err(|e| {
            ConvError::conversion(format!("Failed to read '{}': {e}", input.display()))
        })?;
        let obj = parse_obj(&source, input)?;
        info!(
            "Parsed {}: {} positions, {} objects",
            input.display(),
            obj.positions.len(),
            obj.objects.len()
        );

        if ctx.options.verbose {
            ctx.logger.debug(Message::from(json!({
                "message": "Options without effect: OBJ carries no unit or animation data",
                "unitConversion": ctx.options.unit_conversion.as_str(),
                "animationBakeRate": ctx.options.animation_bake_rate,
                "preferLocalTimeSpan": ctx.options.prefer_local_time_span,
            })));
        }

        let input_dir = input.parent().unwrap_or_else(|| Path::new(""));
        let materials = load_materials(&obj.material_libs, input_dir, ctx);
        build_document(&obj, &materials, ctx)
    }
}

// ── OBJ parsing ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexRef {
    position: usize,
    texcoord: Option<usize>,
    normal: Option<usize>,
}

#[derive(Debug, Default)]
struct FaceRun {
    material: Option<String>,
    triangles: Vec<[VertexRef; 3]>,
}

#[derive(Debug)]
struct ObjObject {
    name: String,
    runs: Vec<FaceRun>,
}

impl ObjObject {
    fn new(name: String) -> Self {
        Self {
            name,
            runs: vec![FaceRun::default()],
        }
    }

    fn has_faces(&self) -> bool {
        self.runs.iter().any(|r| !r.triangles.is_empty())
    }

    fn current_run(&mut self) -> &mut FaceRun {
        if self.runs.is_empty() {
            self.runs.push(FaceRun::default());
        }
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }
}

#[derive(Debug, Default)]
struct ObjData {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    objects: Vec<ObjObject>,
    material_libs: Vec<String>,
}

fn parse_obj(source: &str, path: &Path) -> Result<ObjData, ConvError> {
    let default_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());
    let mut data = ObjData {
        objects: vec![ObjObject::new(default_name)],
        ..Default::default()
    };

    for (line_no, raw) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let fail =
            |what: String| ConvError::conversion(format!("{}:{line_no}: {what}", path.display()));

        match keyword {
            "v" => data.positions.push(parse_floats::<3>(tokens, 3).map_err(fail)?),
            "vt" => {
                let [u, v] = parse_floats::<2>(tokens, 1).map_err(fail)?;
                data.texcoords.push([u, v]);
            }
            "vn" => data.normals.push(parse_floats::<3>(tokens, 3).map_err(fail)?),
            "f" => {
                let refs = tokens
                    .map(|t| parse_vertex_ref(t, &data))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(fail)?;
                if refs.len() < 3 {
                    return Err(fail("face needs at least three vertices".into()));
                }
                let object = data.objects.last_mut().ok_or_else(|| fail("no object".into()))?;
                let run = object.current_run();
                for i in 1..refs.len() - 1 {
                    run.triangles.push([refs[0], refs[i], refs[i + 1]]);
                }
            }
            "o" | "g" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                let current = data.objects.last_mut().ok_or_else(|| fail("no object".into()))?;
                let material = current.runs.last().and_then(|r| r.material.clone());
                if current.has_faces() {
                    let mut object = ObjObject::new(name);
                    object.current_run().material = material;
                    data.objects.push(object);
                } else if !name.is_empty() {
                    current.name = name;
                }
            }
            "usemtl" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                let object = data.objects.last_mut().ok_or_else(|| fail("no object".into()))?;
                let run = object.current_run();
                if run.triangles.is_empty() {
                    run.material = Some(name);
                } else {
                    object.runs.push(FaceRun {
                        material: Some(name),
                        triangles: Vec::new(),
                    });
                }
            }
            "mtllib" => data.material_libs.extend(tokens.map(str::to_string)),
            _ => {}
        }
    }

    data.objects.retain(ObjObject::has_faces);
    Ok(data)
}

/// Parse up to `N` floats, requiring at least `required`. Missing trailing
/// components are zero.
fn parse_floats<'a, const N: usize>(
    tokens: impl Iterator<Item = &'a str>,
    required: usize,
) -> Result<[f32; N], String> {
    let mut out = [0.0f32; N];
    let mut count = 0;
    for token in tokens.take(N) {
        out[count] = token
            .parse()
            .map_err(|_| format!("invalid number '{token}'"))?;
        count += 1;
    }
    if count < required {
        return Err(format!("expected {required} numbers, found {count}"));
    }
    Ok(out)
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`, 1-based or negative (relative).
fn parse_vertex_ref(token: &str, data: &ObjData) -> Result<VertexRef, String> {
    let mut parts = token.split('/');
    let position = resolve_index(parts.next(), data.positions.len(), "position")?
        .ok_or_else(|| format!("missing position index in '{token}'"))?;
    let texcoord = resolve_index(parts.next(), data.texcoords.len(), "texture coordinate")?;
    let normal = resolve_index(parts.next(), data.normals.len(), "normal")?;
    Ok(VertexRef {
        position,
        texcoord,
        normal,
    })
}

fn resolve_index(part: Option<&str>, len: usize, what: &str) -> Result<Option<usize>, String> {
    let Some(part) = part.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let raw: i64 = part
        .parse()
        .map_err(|_| format!("invalid {what} index '{part}'"))?;
    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r as usize - 1),
        r => len.checked_sub(r.unsigned_abs() as usize),
    };
    match resolved {
        Some(i) if i < len => Ok(Some(i)),
        _ => Err(format!(
            "{what} index {raw} out of range ({len} defined so far)"
        )),
    }
}

// ── MTL ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct MtlMaterial {
    diffuse: [f32; 3],
    opacity: f32,
    diffuse_map: Option<String>,
    /// Directory of the `.mtl` file; texture paths are relative to it.
    dir: PathBuf,
}

fn parse_mtl(source: &str, dir: &Path) -> HashMap<String, MtlMaterial> {
    let mut materials = HashMap::new();
    let mut current: Option<(String, MtlMaterial)> = None;

    for raw in source.lines() {
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        if keyword == "newmtl" {
            if let Some((name, mat)) = current.take() {
                materials.insert(name, mat);
            }
            let name = tokens.collect::<Vec<_>>().join(" ");
            current = Some((
                name,
                MtlMaterial {
                    diffuse: [0.8, 0.8, 0.8],
                    opacity: 1.0,
                    diffuse_map: None,
                    dir: dir.to_path_buf(),
                },
            ));
            continue;
        }
        let Some((_, mat)) = current.as_mut() else {
            continue;
        };
        match keyword {
            "Kd" => {
                if let Ok(kd) = parse_floats::<3>(tokens, 3) {
                    mat.diffuse = kd;
                }
            }
            "d" => {
                if let Ok([d]) = parse_floats::<1>(tokens, 1) {
                    mat.opacity = d;
                }
            }
            "Tr" => {
                if let Ok([tr]) = parse_floats::<1>(tokens, 1) {
                    mat.opacity = 1.0 - tr;
                }
            }
            // Options (`-s 1 1 1`, `-bm 0.5`, …) precede the file name.
            "map_Kd" => mat.diffuse_map = tokens.last().map(str::to_string),
            _ => {}
        }
    }
    if let Some((name, mat)) = current {
        materials.insert(name, mat);
    }
    materials
}

fn load_materials(
    libs: &[String],
    input_dir: &Path,
    ctx: &mut ConvertContext<'_>,
) -> HashMap<String, MtlMaterial> {
    let mut materials = HashMap::new();
    for lib in libs {
        let path = input_dir.join(lib);
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                let dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
                materials.extend(parse_mtl(&source, &dir));
                debug!("Loaded material library {}", path.display());
            }
            Err(e) => ctx.logger.warn(Message::from(format!(
                "Material library '{}' could not be read: {e}",
                path.display()
            ))),
        }
    }
    materials
}

// ── Document assembly ────────────────────────────────────────────────────

struct MaterialTable<'m> {
    defined: &'m HashMap<String, MtlMaterial>,
    used: HashMap<String, usize>,
    /// Keyed by MTL directory and raw `map_Kd`, since references are
    /// relative to the library that names them.
    textures: HashMap<(PathBuf, String), Option<usize>>,
}

fn build_document(
    obj: &ObjData,
    materials: &HashMap<String, MtlMaterial>,
    ctx: &mut ConvertContext<'_>,
) -> Result<Value, ConvError> {
    let mut doc = DocumentBuilder::new();
    let mut table = MaterialTable {
        defined: materials,
        used: HashMap::new(),
        textures: HashMap::new(),
    };
    let multi = obj.objects.len() > 1;

    if obj.objects.is_empty() {
        ctx.logger
            .warn(Message::from("Input contains no faces; the scene is empty"));
    }

    for (buffer_index, object) in obj.objects.iter().enumerate() {
        let mut chunk = doc.begin_chunk(buffer_index);
        let mut primitives = Vec::new();
        let mut vertex_total = 0;
        let mut triangle_total = 0;

        for run in object.runs.iter().filter(|r| !r.triangles.is_empty()) {
            let mut remap: HashMap<VertexRef, u32> = HashMap::new();
            let mut order: Vec<VertexRef> = Vec::new();
            let mut indices = Vec::with_capacity(run.triangles.len() * 3);
            for corner in run.triangles.iter().flatten() {
                let next = order.len() as u32;
                let index = *remap.entry(*corner).or_insert_with(|| {
                    order.push(*corner);
                    next
                });
                indices.push(index);
            }

            let positions: Vec<[f32; 3]> =
                order.iter().map(|r| obj.positions[r.position]).collect();
            let mut attributes = serde_json::Map::new();
            attributes.insert(
                "POSITION".into(),
                json!(doc.push_vec3(&mut chunk, &positions, true)),
            );
            if order.iter().all(|r| r.normal.is_some()) {
                let normals: Vec<[f32; 3]> = order
                    .iter()
                    .filter_map(|r| r.normal.map(|n| obj.normals[n]))
                    .collect();
                attributes.insert("NORMAL".into(), json!(doc.push_vec3(&mut chunk, &normals, false)));
            }
            if order.iter().all(|r| r.texcoord.is_some()) {
                let flip = ctx.options.flip_v;
                let uvs: Vec<[f32; 2]> = order
                    .iter()
                    .filter_map(|r| r.texcoord.map(|t| obj.texcoords[t]))
                    .map(|[u, v]| if flip { [u, 1.0 - v] } else { [u, v] })
                    .collect();
                attributes.insert("TEXCOORD_0".into(), json!(doc.push_vec2(&mut chunk, &uvs)));
            }
            let indices_accessor = doc.push_indices(&mut chunk, &indices);

            let mut primitive = json!({
                "attributes": attributes,
                "indices": indices_accessor,
                "mode": 4,
            });
            if let Some(ref name) = run.material {
                primitive["material"] = json!(material_index(&mut doc, &mut table, name, ctx));
            }
            primitives.push(primitive);
            vertex_total += order.len();
            triangle_total += run.triangles.len();
        }

        let uri = ctx.writer.write_buffer(BufferDescriptor::new(
            chunk.bytes(),
            buffer_index as u32,
            multi,
        ))?;
        doc.add_buffer(chunk.bytes().len(), uri.clone());
        doc.add_mesh(&object.name, primitives);

        if ctx.options.verbose {
            ctx.logger.info(Message::from(json!({
                "mesh": object.name,
                "vertices": vertex_total,
                "triangles": triangle_total,
                "buffer": uri,
            })));
        }
    }

    Ok(doc.finish(concat!("fbx-gltf-conv ", env!("CARGO_PKG_VERSION"))))
}

fn material_index(
    doc: &mut DocumentBuilder,
    table: &mut MaterialTable<'_>,
    name: &str,
    ctx: &mut ConvertContext<'_>,
) -> usize {
    if let Some(&index) = table.used.get(name) {
        return index;
    }
    let mut material = json!({
        "name": name,
        "pbrMetallicRoughness": { "metallicFactor": 0.0, "roughnessFactor": 1.0 },
    });
    match table.defined.get(name) {
        Some(mtl) => {
            let [r, g, b] = mtl.diffuse;
            material["pbrMetallicRoughness"]["baseColorFactor"] = json!([r, g, b, mtl.opacity]);
            if mtl.opacity < 1.0 {
                material["alphaMode"] = json!("BLEND");
            }
            if let Some(ref map) = mtl.diffuse_map {
                let key = (mtl.dir.clone(), map.clone());
                let texture = match table.textures.get(&key) {
                    Some(t) => *t,
                    None => {
                        let t = resolve_texture(map, &mtl.dir, ctx).map(|uri| doc.add_texture(uri));
                        table.textures.insert(key, t);
                        t
                    }
                };
                if let Some(index) = texture {
                    material["pbrMetallicRoughness"]["baseColorTexture"] = json!({ "index": index });
                }
            }
        }
        None => ctx
            .logger
            .warn(Message::from(format!("Material '{name}' is not defined in any material library"))),
    }
    let index = doc.add_material(material);
    table.used.insert(name.to_string(), index);
    index
}

/// The URI an image should be referenced by, or `None` when it could not be
/// found.
fn resolve_texture(reference: &str, mtl_dir: &Path, ctx: &mut ConvertContext<'_>) -> Option<String> {
    let normalized = reference.replace('\\', "/");
    let resolution = &ctx.options.texture_resolution;
    if resolution.disabled {
        return Some(normalized);
    }

    let relative = PathBuf::from(&normalized);
    let mut candidates = vec![mtl_dir.join(&relative)];
    for location in &resolution.locations {
        candidates.push(location.join(&relative));
        if let Some(name) = relative.file_name() {
            candidates.push(location.join(name));
        }
    }

    match candidates.iter().find(|c| c.is_file()) {
        Some(found) => {
            let doc_dir = ctx.output.parent().unwrap_or_else(|| Path::new(""));
            let uri = match anchored_pair(doc_dir, found) {
                Some((from, to)) => relative_uri(&from, &to),
                None => normalized,
            };
            debug!("Resolved texture '{}' to {}", reference, uri);
            Some(uri)
        }
        None => {
            let searched: Vec<String> = candidates
                .iter()
                .map(|c| c.display().to_string())
                .collect();
            ctx.logger.warn(Message::from(json!({
                "message": "Texture not found",
                "texture": reference,
                "searched": searched,
            })));
            None
        }
    }
}

/// Both paths in the same absolute form. Canonical when both exist on disk
/// (the document directory may not yet), lexically absolute otherwise.
fn anchored_pair(from: &Path, to: &Path) -> Option<(PathBuf, PathBuf)> {
    let from = if from.as_os_str().is_empty() {
        Path::new(".")
    } else {
        from
    };
    if let (Ok(f), Ok(t)) = (from.canonicalize(), to.canonicalize()) {
        return Some((f, t));
    }
    match (std::path::absolute(from), std::path::absolute(to)) {
        (Ok(f), Ok(t)) => Some((f, t)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConvertOptions;
    use crate::logger::{CaptureLogger, Level};
    use crate::writer::FileBufferWriter;
    use tempfile::tempdir;

    const QUAD: &str = "\
# two triangles
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    fn run(
        dir: &Path,
        source: &str,
        options: &ConvertOptions,
    ) -> (Result<Value, ConvError>, CaptureLogger) {
        let input = dir.join("quad.obj");
        std::fs::write(&input, source).unwrap();
        let output = dir.join("out/quad.gltf");
        let mut writer = FileBufferWriter::new(&output);
        let mut logger = CaptureLogger::new();
        let result = {
            let mut ctx = ConvertContext {
                options,
                output: &output,
                fbm_dir: None,
                writer: &mut writer,
                logger: &mut logger,
            };
            ObjEngine.convert(&input, &mut ctx)
        };
        (result, logger)
    }

    #[test]
    fn polygon_is_fan_triangulated() {
        let data = parse_obj(QUAD, Path::new("quad.obj")).unwrap();
        assert_eq!(data.objects.len(), 1);
        assert_eq!(data.objects[0].name, "quad");
        assert_eq!(data.objects[0].runs[0].triangles.len(), 2);
    }

    #[test]
    fn negative_indices_are_relative() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let data = parse_obj(src, Path::new("t.obj")).unwrap();
        let tri = data.objects[0].runs[0].triangles[0];
        assert_eq!(tri.map(|r| r.position), [0, 1, 2]);
    }

    #[test]
    fn out_of_range_index_names_line() {
        let src = "v 0 0 0\nf 1 2 3\n";
        let err = parse_obj(src, Path::new("bad.obj")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bad.obj:2"), "got: {msg}");
    }

    #[test]
    fn objects_and_materials_split_runs() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
o A
usemtl red
f 1 2 3
usemtl blue
f 1 2 3
o B
f 1 2 3
o Empty
";
        let data = parse_obj(src, Path::new("t.obj")).unwrap();
        let names: Vec<&str> = data.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(data.objects[0].runs.len(), 2);
        // B inherits the material active when it started.
        assert_eq!(data.objects[1].runs[0].material.as_deref(), Some("blue"));
    }

    #[test]
    fn mtl_reads_colour_opacity_and_map() {
        let src = "newmtl skin\nKd 1 0.5 0.25\nd 0.5\nmap_Kd -s 1 1 1 tex\\skin.png\n";
        let mats = parse_mtl(src, Path::new("/assets"));
        let skin = &mats["skin"];
        assert_eq!(skin.diffuse, [1.0, 0.5, 0.25]);
        assert_eq!(skin.opacity, 0.5);
        assert_eq!(skin.diffuse_map.as_deref(), Some("tex\\skin.png"));
    }

    #[test]
    fn single_object_writes_single_buffer() {
        let dir = tempdir().unwrap();
        let (doc, _) = run(dir.path(), QUAD, &ConvertOptions::default());
        let doc = doc.unwrap();
        assert_eq!(doc["buffers"][0]["uri"], "quad.bin");
        assert!(dir.path().join("out/quad.bin").is_file());
        let attrs = &doc["meshes"][0]["primitives"][0]["attributes"];
        assert!(attrs.get("NORMAL").is_some());
        assert!(attrs.get("TEXCOORD_0").is_some());
    }

    #[test]
    fn several_objects_write_indexed_buffers() {
        let dir = tempdir().unwrap();
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\no a\nf 1 2 3\no b\nf 1 2 3\no c\nf 3 2 1\n";
        let (doc, _) = run(dir.path(), src, &ConvertOptions::default());
        let doc = doc.unwrap();
        let uris: Vec<&str> = doc["buffers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["uri"].as_str().unwrap())
            .collect();
        assert_eq!(uris, ["quad0.bin", "quad1.bin", "quad2.bin"]);
    }

    #[test]
    fn flip_v_inverts_texcoords() {
        let dir = tempdir().unwrap();
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0.25\nf 1/1 2/1 3/1\n";
        let (doc, _) = run(dir.path(), src, &ConvertOptions::default());
        doc.unwrap();
        let bytes = std::fs::read(dir.path().join("out/quad.bin")).unwrap();
        // positions (3 × 12 bytes) precede the texcoords.
        let v = f32::from_le_bytes(bytes[36 + 4..36 + 8].try_into().unwrap());
        assert_eq!(v, 0.75);

        let options = ConvertOptions::builder().flip_v(false).build().unwrap();
        let (doc, _) = run(dir.path(), src, &options);
        doc.unwrap();
        let bytes = std::fs::read(dir.path().join("out/quad.bin")).unwrap();
        let v = f32::from_le_bytes(bytes[36 + 4..36 + 8].try_into().unwrap());
        assert_eq!(v, 0.25);
    }

    #[test]
    fn missing_texture_is_warned_and_dropped() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("quad.mtl"),
            "newmtl m\nKd 1 1 1\nmap_Kd missing.png\n",
        )
        .unwrap();
        let src = format!("mtllib quad.mtl\nusemtl m\n{QUAD}");
        let (doc, log) = run(dir.path(), &src, &ConvertOptions::default());
        let doc = doc.unwrap();
        assert!(doc.get("textures").is_none());
        assert!(log
            .entries()
            .iter()
            .any(|e| e.level == Level::Warn && e.message["texture"] == "missing.png"));
    }

    #[test]
    fn texture_found_in_search_location() {
        let dir = tempdir().unwrap();
        let textures = dir.path().join("textures");
        std::fs::create_dir_all(&textures).unwrap();
        std::fs::write(textures.join("skin.png"), b"png").unwrap();
        std::fs::write(
            dir.path().join("quad.mtl"),
            "newmtl m\nmap_Kd maps/skin.png\n",
        )
        .unwrap();
        let options = ConvertOptions::builder()
            .texture_search_locations(vec![textures])
            .build()
            .unwrap();
        let src = format!("mtllib quad.mtl\nusemtl m\n{QUAD}");
        let (doc, _) = run(dir.path(), &src, &options);
        let doc = doc.unwrap();
        assert_eq!(doc["images"][0]["uri"], "../textures/skin.png");
        assert_eq!(
            doc["materials"][0]["pbrMetallicRoughness"]["baseColorTexture"]["index"],
            0
        );
    }

    #[test]
    fn disabled_resolution_keeps_reference() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("quad.mtl"), "newmtl m\nmap_Kd a\\b.png\n").unwrap();
        let options = ConvertOptions::builder()
            .texture_resolution_disabled(true)
            .build()
            .unwrap();
        let src = format!("mtllib quad.mtl\nusemtl m\n{QUAD}");
        let (doc, _) = run(dir.path(), &src, &options);
        assert_eq!(doc.unwrap()["images"][0]["uri"], "a/b.png");
    }

    #[test]
    fn verbose_reports_meshes() {
        let dir = tempdir().unwrap();
        let options = ConvertOptions::builder().verbose(true).build().unwrap();
        let (doc, log) = run(dir.path(), QUAD, &options);
        doc.unwrap();
        let info = log
            .entries()
            .iter()
            .find(|e| e.level == Level::Info)
            .unwrap();
        assert_eq!(info.message["mesh"], "quad");
        assert_eq!(info.message["triangles"], 2);
        assert_eq!(info.message["vertices"], 4);
    }

    #[test]
    fn verbose_notes_inert_options() {
        let dir = tempdir().unwrap();
        let options = ConvertOptions::builder()
            .verbose(true)
            .animation_bake_rate(24)
            .prefer_local_time_span(false)
            .build()
            .unwrap();
        let (doc, log) = run(dir.path(), QUAD, &options);
        doc.unwrap();
        let note = log
            .entries()
            .iter()
            .find(|e| e.level == Level::Debug)
            .unwrap();
        assert_eq!(note.message["unitConversion"], "geometry-level");
        assert_eq!(note.message["animationBakeRate"], 24);
        assert_eq!(note.message["preferLocalTimeSpan"], false);

        let (_, quiet) = run(dir.path(), QUAD, &ConvertOptions::default());
        assert!(quiet.entries().iter().all(|e| e.level != Level::Debug));
    }

    #[test]
    fn same_texture_name_in_two_libraries_resolves_separately() {
        let dir = tempdir().unwrap();
        for (sub, name) in [("a", "one"), ("b", "two")] {
            let lib = dir.path().join(sub);
            std::fs::create_dir_all(&lib).unwrap();
            std::fs::write(lib.join("skin.png"), b"png").unwrap();
            std::fs::write(
                lib.join("lib.mtl"),
                format!("newmtl {name}\nmap_Kd skin.png\n"),
            )
            .unwrap();
        }
        let src = "\
mtllib a/lib.mtl b/lib.mtl
v 0 0 0
v 1 0 0
v 0 1 0
usemtl one
f 1 2 3
usemtl two
f 3 2 1
";
        let (doc, _) = run(dir.path(), src, &ConvertOptions::default());
        let doc = doc.unwrap();
        assert_eq!(doc["images"][0]["uri"], "../a/skin.png");
        assert_eq!(doc["images"][1]["uri"], "../b/skin.png");
    }

    #[test]
    fn texture_uri_survives_parent_components_in_output() {
        let dir = tempdir().unwrap();
        let work = dir.path().join("work");
        std::fs::create_dir_all(work.join("textures")).unwrap();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::write(work.join("textures/a.png"), b"png").unwrap();
        std::fs::write(work.join("m.mtl"), "newmtl m\nmap_Kd textures/a.png\n").unwrap();
        let input = work.join("m.obj");
        std::fs::write(&input, format!("mtllib m.mtl\nusemtl m\n{QUAD}")).unwrap();

        let output = work.join("../dist/m.gltf");
        let options = ConvertOptions::default();
        let mut writer = FileBufferWriter::new(&output);
        let mut logger = CaptureLogger::new();
        let mut ctx = ConvertContext {
            options: &options,
            output: &output,
            fbm_dir: None,
            writer: &mut writer,
            logger: &mut logger,
        };
        let doc = ObjEngine.convert(&input, &mut ctx).unwrap();

        let uri = doc["images"][0]["uri"].as_str().unwrap();
        assert_eq!(uri, "../work/textures/a.png");
        assert!(dir.path().join("dist").join(uri).is_file());
    }

    #[test]
    fn unreadable_input_is_a_conversion_error() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("x.gltf");
        let options = ConvertOptions::default();
        let mut writer = FileBufferWriter::new(&output);
        let mut logger = CaptureLogger::new();
        let mut ctx = ConvertContext {
            options: &options,
            output: &output,
            fbm_dir: None,
            writer: &mut writer,
            logger: &mut logger,
        };
        let err = ObjEngine
            .convert(&dir.path().join("nope.obj"), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, ConvError::Conversion(_)));
    }
}
