/// Frame data layout shared with the TypeScript host.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 8 floats]
/// [Instances: max_instances × 12 floats]
/// ```
///
/// The header is a separate array in wasm memory; instances follow in their
/// own buffer. The host reads the capacity and counts from the header every
/// frame and the instance stride once.

use crate::api::game::GameConfig;
use crate::api::types::Viewport;
use crate::renderer::instance::RenderInstance;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 8;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_MAX_INSTANCES: usize = 2;
pub const HEADER_INSTANCE_COUNT: usize = 3;
pub const HEADER_INSTANCE_FLOATS: usize = 4;
pub const HEADER_WORLD_WIDTH: usize = 5;
pub const HEADER_WORLD_HEIGHT: usize = 6;
pub const HEADER_STEPS: usize = 7;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 2.0;

/// Floats per render instance (wire format).
pub const INSTANCE_FLOATS: usize = RenderInstance::FLOATS;

/// Buffer sizes derived from the game's render capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    /// Maximum render instances.
    pub max_instances: usize,
    /// Size of instance data section in floats.
    pub instance_data_floats: usize,
    /// Offset (in floats) where instance data begins in a packed copy.
    pub instance_data_offset: usize,
    /// Total packed size in floats.
    pub buffer_total_floats: usize,
    /// Total packed size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    pub fn new(max_instances: usize) -> Self {
        let instance_data_floats = max_instances * INSTANCE_FLOATS;
        let instance_data_offset = HEADER_FLOATS;
        let buffer_total_floats = instance_data_offset + instance_data_floats;
        Self {
            max_instances,
            instance_data_floats,
            instance_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Compute layout from a GameConfig.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_instances)
    }

    /// Fill a frame header.
    pub fn write_header(
        &self,
        header: &mut [f32; HEADER_FLOATS],
        frame: u32,
        instance_count: u32,
        steps: u32,
        viewport: Viewport,
    ) {
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header[HEADER_FRAME_COUNTER] = frame as f32;
        header[HEADER_MAX_INSTANCES] = self.max_instances as f32;
        header[HEADER_INSTANCE_COUNT] = instance_count as f32;
        header[HEADER_INSTANCE_FLOATS] = INSTANCE_FLOATS as f32;
        header[HEADER_WORLD_WIDTH] = viewport.width;
        header[HEADER_WORLD_HEIGHT] = viewport.height;
        header[HEADER_STEPS] = steps as f32;
    }
}
