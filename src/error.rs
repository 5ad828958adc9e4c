//! Error types shared by the hosts, the loop and the renderer.

/// Startup failures. Every variant aborts initialization of the subsystem it
/// belongs to, never the host page or process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("mount surface `{0}` is missing")]
    MountMissing(String),

    #[error("no usable rendering backend: {0}")]
    BackendUnavailable(String),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface does not support the adapter")]
    UnsupportedSurface,

    #[error("host error: {0}")]
    Host(String),

    #[cfg(not(target_arch = "wasm32"))]
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for AppError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        AppError::Host(format!("{value:?}"))
    }
}

/// Per-frame render failures. The loop logs these and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
