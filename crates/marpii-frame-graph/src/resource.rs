//! # Resources
//!
//! Identity and access descriptions of the buffers and images a frame graph talks about. The graph never owns
//! actual GPU memory. It only needs stable keys and a description of how each task accesses them.

use std::fmt::Display;

use slotmap::{Key, SlotMap};

slotmap::new_key_type!(
    ///exposed key used to reference a buffer that is owned by some external resource manager.
    pub struct BufferKey;
);
slotmap::new_key_type!(
    ///exposed key used to reference an image that is owned by some external resource manager.
    pub struct ImageKey;
);

///Any resource that can be tracked by the graph.
#[derive(Clone, Copy, Hash, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum AnyResKey {
    Buffer(BufferKey),
    Image(ImageKey),
}

impl AnyResKey {
    pub fn is_null(&self) -> bool {
        match self {
            AnyResKey::Buffer(k) => k.is_null(),
            AnyResKey::Image(k) => k.is_null(),
        }
    }
}

impl Display for AnyResKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyResKey::Buffer(bufk) => write!(f, "AnyResKey::Buffer({:?})", bufk),
            AnyResKey::Image(imgk) => write!(f, "AnyResKey::Image({:?})", imgk),
        }
    }
}

impl From<BufferKey> for AnyResKey {
    fn from(k: BufferKey) -> Self {
        AnyResKey::Buffer(k)
    }
}

impl From<ImageKey> for AnyResKey {
    fn from(k: ImageKey) -> Self {
        AnyResKey::Image(k)
    }
}

///Hardware queue a command buffer (and therefore a graph) is submitted to.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub enum QueueKind {
    #[default]
    Graphics,
    Compute,
    Transfer,
}

impl Display for QueueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueKind::Graphics => write!(f, "graphics"),
            QueueKind::Compute => write!(f, "compute"),
            QueueKind::Transfer => write!(f, "transfer"),
        }
    }
}

///How a task accesses a resource.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

impl AccessMode {
    ///True for every mode that modifies the resource.
    pub fn is_write(&self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }
}

///Layout an image must be in while a task accesses it.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Default)]
pub enum ImageLayout {
    #[default]
    Undefined,
    General,
    TransferSrc,
    TransferDst,
    ShaderRead,
    ColorAttachment,
    DepthStencilAttachment,
    DepthStencilRead,
    Present,
}

///Single declared access of a task.
///
/// `layout` is `Some` for images and `None` for buffers.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub struct ResourceUsage {
    pub resource: AnyResKey,
    pub mode: AccessMode,
    pub layout: Option<ImageLayout>,
}

impl ResourceUsage {
    pub fn buffer(key: BufferKey, mode: AccessMode) -> Self {
        ResourceUsage {
            resource: AnyResKey::Buffer(key),
            mode,
            layout: None,
        }
    }

    pub fn image(key: ImageKey, mode: AccessMode, layout: ImageLayout) -> Self {
        ResourceUsage {
            resource: AnyResKey::Image(key),
            mode,
            layout: Some(layout),
        }
    }
}

///What the registry knows about a buffer.
#[derive(Clone, Debug)]
pub struct BufferInfo {
    pub name: String,
    pub size: u64,
}

///What the registry knows about an image.
#[derive(Clone, Debug)]
pub struct ImageInfo {
    pub name: String,
    pub extent: [u32; 3],
    pub samples: u32,
}

///Minimal resource registry. Hands out keys and keeps debug information.
///
/// Real applications usually own their resources in a dedicated manager. The graph only ever sees the keys, the
/// registry exists so that keys can be created without one, and so that debug output can show names.
#[derive(Default)]
pub struct Resources {
    buffers: SlotMap<BufferKey, BufferInfo>,
    images: SlotMap<ImageKey, ImageInfo>,
}

impl Resources {
    pub fn new() -> Self {
        Resources::default()
    }

    pub fn add_buffer(&mut self, name: impl Into<String>, size: u64) -> BufferKey {
        self.buffers.insert(BufferInfo {
            name: name.into(),
            size,
        })
    }

    pub fn add_image(&mut self, name: impl Into<String>, extent: [u32; 3], samples: u32) -> ImageKey {
        self.images.insert(ImageInfo {
            name: name.into(),
            extent,
            samples,
        })
    }

    pub fn buffer(&self, key: BufferKey) -> Option<&BufferInfo> {
        self.buffers.get(key)
    }

    pub fn image(&self, key: ImageKey) -> Option<&ImageInfo> {
        self.images.get(key)
    }

    ///Debug name of `res`, if known.
    pub fn name_of(&self, res: AnyResKey) -> Option<&str> {
        match res {
            AnyResKey::Buffer(k) => self.buffers.get(k).map(|b| b.name.as_str()),
            AnyResKey::Image(k) => self.images.get(k).map(|i| i.name.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names() {
        let mut res = Resources::new();
        let buf = res.add_buffer("vertices", 1024);
        let img = res.add_image("albedo", [64, 64, 1], 1);

        assert_eq!(res.name_of(buf.into()), Some("vertices"));
        assert_eq!(res.name_of(img.into()), Some("albedo"));
        assert_eq!(res.buffer(buf).map(|b| b.size), Some(1024));
        assert_eq!(res.name_of(BufferKey::null().into()), None);
    }

    #[test]
    fn null_keys() {
        assert!(AnyResKey::Buffer(BufferKey::null()).is_null());
        assert!(AnyResKey::Image(ImageKey::null()).is_null());
    }

    #[test]
    fn write_modes() {
        assert!(!AccessMode::Read.is_write());
        assert!(AccessMode::Write.is_write());
        assert!(AccessMode::ReadWrite.is_write());
    }
}
