//! glTF model loading for the raft.
//!
//! `parse_model` flattens a glTF/GLB document into a single [`Mesh`];
//! `load_raft` runs the read and parse off the frame loop and hands back an
//! [`AssetHandle`] the loop polls once per frame.

use glam::Mat4;

use crate::utils::{Mesh, Vertex};

/// Model loaded at startup. A file path natively, a URL in the browser.
pub const RAFT_ASSET: &str = "assets/Raft.glb";

/// Error type for model loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to parse glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to fetch model: {0}")]
    Fetch(String),

    #[error("missing position data for mesh: {0}")]
    MissingPositions(String),

    #[error("model has no scene")]
    NoScene,

    #[error("model contains no triangles")]
    Empty,

    #[error("loader stopped without a result")]
    Abandoned,
}

type LoadResult = Result<Mesh, AssetError>;

/// Parse a glTF or GLB document into one mesh in model space.
///
/// Node transforms are applied down the hierarchy, non-triangle primitives
/// are skipped, missing normals default to +Y and missing indices mean the
/// vertices are already a triangle list.
pub fn parse_model(bytes: &[u8]) -> LoadResult {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::NoScene)?;

    let mut mesh = Mesh::empty();
    for node in scene.nodes() {
        append_node(&node, Mat4::IDENTITY, &buffers, &mut mesh)?;
    }

    if mesh.indices.is_empty() {
        return Err(AssetError::Empty);
    }

    if let Some((min, max)) = mesh.bounds() {
        tracing::info!(
            "Parsed model: {} vertices, {} triangles, bounds {:?}..{:?}",
            mesh.vertices.len(),
            mesh.indices.len() / 3,
            min,
            max
        );
    }
    Ok(mesh)
}

fn append_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Mesh,
) -> Result<(), AssetError> {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = mesh.name().unwrap_or("unnamed");
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::debug!("skipping {:?} primitive in mesh {}", primitive.mode(), name);
                continue;
            }
            let local = read_primitive(&primitive, buffers, name)?;
            out.append_transformed(&local, transform);
        }
    }

    for child in node.children() {
        append_node(&child, transform, buffers, out)?;
    }
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    name: &str,
) -> LoadResult {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| AssetError::MissingPositions(name.to_string()))?
        .collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|normals| normals.collect())
        .unwrap_or_default();
    let color = primitive.material().pbr_metallic_roughness().base_color_factor();

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, pos)| Vertex {
            pos: *pos,
            normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            color,
        })
        .collect();

    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    Ok(Mesh { vertices, indices })
}

enum Source {
    #[cfg(not(target_arch = "wasm32"))]
    Worker(std::sync::mpsc::Receiver<LoadResult>),
    #[cfg(target_arch = "wasm32")]
    Shared(std::rc::Rc<std::cell::RefCell<Option<LoadResult>>>),
    Ready(Option<LoadResult>),
    Never,
    Done,
}

/// A model load in flight. `poll` yields the outcome exactly once.
pub struct AssetHandle {
    source: Source,
}

impl AssetHandle {
    /// A load that already finished.
    pub fn ready(result: LoadResult) -> Self {
        Self { source: Source::Ready(Some(result)) }
    }

    /// A load that never finishes.
    pub fn never() -> Self {
        Self { source: Source::Never }
    }

    /// Non-blocking check for the outcome.
    pub fn poll(&mut self) -> Option<LoadResult> {
        let result = match &mut self.source {
            #[cfg(not(target_arch = "wasm32"))]
            Source::Worker(rx) => match rx.try_recv() {
                Ok(result) => Some(result),
                Err(std::sync::mpsc::TryRecvError::Empty) => None,
                Err(std::sync::mpsc::TryRecvError::Disconnected) => Some(Err(AssetError::Abandoned)),
            },
            #[cfg(target_arch = "wasm32")]
            Source::Shared(slot) => slot.borrow_mut().take(),
            Source::Ready(result) => result.take(),
            Source::Never | Source::Done => None,
        };

        if result.is_some() {
            self.source = Source::Done;
        }
        result
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.source, Source::Done)
    }
}

/// Read and parse the model on a worker thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_raft(path: impl Into<std::path::PathBuf>) -> AssetHandle {
    let path = path.into();
    let (tx, rx) = std::sync::mpsc::channel();

    tracing::info!("Loading model from {}", path.display());
    let spawned = std::thread::Builder::new()
        .name("asset-loader".to_string())
        .spawn(move || {
            let result = std::fs::read(&path)
                .map_err(AssetError::from)
                .and_then(|bytes| parse_model(&bytes));
            let _ = tx.send(result);
        });

    match spawned {
        Ok(_) => AssetHandle { source: Source::Worker(rx) },
        Err(e) => AssetHandle::ready(Err(e.into())),
    }
}

/// Fetch and parse the model on the browser event loop.
#[cfg(target_arch = "wasm32")]
pub fn load_raft(url: &str) -> AssetHandle {
    use std::cell::RefCell;
    use std::rc::Rc;

    let slot = Rc::new(RefCell::new(None));
    let out = slot.clone();
    let url = url.to_string();

    tracing::info!("Fetching model from {url}");
    wasm_bindgen_futures::spawn_local(async move {
        let result = match fetch_bytes(&url).await {
            Ok(bytes) => parse_model(&bytes),
            Err(e) => Err(e),
        };
        *out.borrow_mut() = Some(result);
    });

    AssetHandle { source: Source::Shared(slot) }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |e: wasm_bindgen::JsValue| AssetError::Fetch(format!("{e:?}"));

    let window = web_sys::window().ok_or_else(|| AssetError::Fetch("no global `window`".to_string()))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_error)?
        .dyn_into()
        .map_err(fetch_error)?;

    if !response.ok() {
        return Err(AssetError::Fetch(format!("HTTP {} for {url}", response.status())));
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_error)?)
        .await
        .map_err(fetch_error)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// One triangle (0,0,0) (1,0,0) (0,0,1) under a node translated by +2 on x.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "mesh": 0, "translation": [2.0, 0.0, 0.0] } ],
        "meshes": [ { "name": "deck", "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ] } ],
        "buffers": [ {
            "byteLength": 44,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAAAAAAIA/AAABAAIAAAA="
        } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 0.0, 1.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;

    #[test]
    fn test_parse_applies_node_transform() {
        let mesh = parse_model(TRIANGLE_GLTF.as_bytes()).unwrap();

        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_abs_diff_eq!(mesh.vertices[0].pos[0], 2.0);
        assert_abs_diff_eq!(mesh.vertices[1].pos[0], 3.0);
        assert_abs_diff_eq!(mesh.vertices[2].pos[2], 1.0);
        // no normals in the file, no material: defaults
        assert_eq!(mesh.vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[0].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_shipped_raft_parses() {
        let bytes = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/Raft.glb"));
        let mesh = parse_model(bytes).unwrap();

        assert_eq!(mesh.vertices.len(), 168);
        assert_eq!(mesh.indices.len(), 252);
        let (min, max) = mesh.bounds().unwrap();
        assert_abs_diff_eq!(min.x, -1.3, epsilon = 1e-5);
        assert_abs_diff_eq!(max.z, 1.5, epsilon = 1e-5);
        assert!(mesh.vertices.iter().all(|v| v.color == [0.55, 0.35, 0.17, 1.0]));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_model(b"definitely not a model"), Err(AssetError::Gltf(_))));
    }

    #[test]
    fn test_handle_yields_once() {
        let mut handle = AssetHandle::ready(Err(AssetError::Empty));
        assert!(!handle.is_finished());
        assert!(matches!(handle.poll(), Some(Err(AssetError::Empty))));
        assert!(handle.is_finished());
        assert!(handle.poll().is_none());
    }

    #[test]
    fn test_never_handle_stays_pending() {
        let mut handle = AssetHandle::never();
        for _ in 0..10 {
            assert!(handle.poll().is_none());
        }
        assert!(!handle.is_finished());
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        let mut handle = load_raft("does/not/exist/Raft.glb");
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let result = loop {
            if let Some(result) = handle.poll() {
                break result;
            }
            assert!(std::time::Instant::now() < deadline, "loader never reported");
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(matches!(result, Err(AssetError::Io(_))));
    }
}
