//! Incremental glTF 2.0 document assembly.
//!
//! Geometry goes into [`BinaryChunk`]s, one per output buffer; every push
//! appends the bytes, a buffer view and an accessor, and returns the accessor
//! index. Once a chunk is persisted its URI is registered with
//! [`DocumentBuilder::add_buffer`]. [`DocumentBuilder::finish`] leaves out
//! top-level arrays that ended up empty, as glTF requires.

use serde_json::{json, Map, Value};

const COMPONENT_FLOAT: u32 = 5126;
const COMPONENT_UNSIGNED_INT: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// Bytes destined for one `.bin` file.
#[derive(Debug)]
pub struct BinaryChunk {
    buffer: usize,
    bytes: Vec<u8>,
}

impl BinaryChunk {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Append raw bytes, returning their offset. Offsets stay 4-byte aligned.
    fn append(&mut self, data: impl IntoIterator<Item = [u8; 4]>) -> (usize, usize) {
        let offset = self.bytes.len();
        for word in data {
            self.bytes.extend_from_slice(&word);
        }
        (offset, self.bytes.len() - offset)
    }
}

#[derive(Debug, Default)]
pub struct DocumentBuilder {
    accessors: Vec<Value>,
    buffer_views: Vec<Value>,
    buffers: Vec<Value>,
    meshes: Vec<Value>,
    nodes: Vec<Value>,
    materials: Vec<Value>,
    textures: Vec<Value>,
    images: Vec<Value>,
    samplers: Vec<Value>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new binary buffer. Buffers must be registered in the order
    /// their chunks were created.
    pub fn begin_chunk(&self, buffer: usize) -> BinaryChunk {
        BinaryChunk {
            buffer,
            bytes: Vec::new(),
        }
    }

    pub fn push_vec3(&mut self, chunk: &mut BinaryChunk, data: &[[f32; 3]], bounds: bool) -> usize {
        let (offset, len) = chunk.append(data.iter().flatten().map(|f| f.to_le_bytes()));
        let view = self.push_view(chunk.buffer, offset, len, TARGET_ARRAY_BUFFER);
        let mut accessor = json!({
            "bufferView": view,
            "componentType": COMPONENT_FLOAT,
            "count": data.len(),
            "type": "VEC3",
        });
        if bounds && !data.is_empty() {
            let mut min = [f32::INFINITY; 3];
            let mut max = [f32::NEG_INFINITY; 3];
            for p in data {
                for i in 0..3 {
                    min[i] = min[i].min(p[i]);
                    max[i] = max[i].max(p[i]);
                }
            }
            accessor["min"] = json!(min);
            accessor["max"] = json!(max);
        }
        self.push_accessor(accessor)
    }

    pub fn push_vec2(&mut self, chunk: &mut BinaryChunk, data: &[[f32; 2]]) -> usize {
        let (offset, len) = chunk.append(data.iter().flatten().map(|f| f.to_le_bytes()));
        let view = self.push_view(chunk.buffer, offset, len, TARGET_ARRAY_BUFFER);
        self.push_accessor(json!({
            "bufferView": view,
            "componentType": COMPONENT_FLOAT,
            "count": data.len(),
            "type": "VEC2",
        }))
    }

    pub fn push_indices(&mut self, chunk: &mut BinaryChunk, indices: &[u32]) -> usize {
        let (offset, len) = chunk.append(indices.iter().map(|i| i.to_le_bytes()));
        let view = self.push_view(chunk.buffer, offset, len, TARGET_ELEMENT_ARRAY_BUFFER);
        self.push_accessor(json!({
            "bufferView": view,
            "componentType": COMPONENT_UNSIGNED_INT,
            "count": indices.len(),
            "type": "SCALAR",
        }))
    }

    pub fn add_buffer(&mut self, byte_length: usize, uri: String) {
        self.buffers.push(json!({ "byteLength": byte_length, "uri": uri }));
    }

    /// Add a mesh and a node instancing it.
    pub fn add_mesh(&mut self, name: &str, primitives: Vec<Value>) -> usize {
        let mesh = self.meshes.len();
        self.meshes.push(json!({ "name": name, "primitives": primitives }));
        self.nodes.push(json!({ "name": name, "mesh": mesh }));
        mesh
    }

    pub fn add_material(&mut self, material: Value) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add an image with a texture referencing it through the shared sampler.
    pub fn add_texture(&mut self, uri: String) -> usize {
        if self.samplers.is_empty() {
            // LINEAR / LINEAR_MIPMAP_LINEAR / REPEAT
            self.samplers.push(json!({
                "magFilter": 9729,
                "minFilter": 9987,
                "wrapS": 10497,
                "wrapT": 10497,
            }));
        }
        let image = self.images.len();
        self.images.push(json!({ "uri": uri }));
        self.textures.push(json!({ "sampler": 0, "source": image }));
        self.textures.len() - 1
    }

    pub fn finish(self, generator: &str) -> Value {
        let mut doc = Map::new();
        doc.insert(
            "asset".into(),
            json!({ "version": "2.0", "generator": generator }),
        );
        let node_indices: Vec<usize> = (0..self.nodes.len()).collect();
        doc.insert("scene".into(), json!(0));
        doc.insert("scenes".into(), json!([{ "nodes": node_indices }]));

        for (key, items) in [
            ("nodes", self.nodes),
            ("meshes", self.meshes),
            ("materials", self.materials),
            ("textures", self.textures),
            ("images", self.images),
            ("samplers", self.samplers),
            ("accessors", self.accessors),
            ("bufferViews", self.buffer_views),
            ("buffers", self.buffers),
        ] {
            if !items.is_empty() {
                doc.insert(key.into(), Value::Array(items));
            }
        }
        Value::Object(doc)
    }

    fn push_view(&mut self, buffer: usize, offset: usize, len: usize, target: u32) -> usize {
        self.buffer_views.push(json!({
            "buffer": buffer,
            "byteOffset": offset,
            "byteLength": len,
            "target": target,
        }));
        self.buffer_views.len() - 1
    }

    fn push_accessor(&mut self, accessor: Value) -> usize {
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }
}
