//! # Tasks
//!
//! A task is a single unit of GPU work (copy, clear, draw, dispatch ...). The set of task kinds is closed, each kind
//! carries its own descriptor. A descriptor knows which resources it touches and how, which is everything the graph
//! needs to wire hazards. The actual recording of native commands happens in an [ExecutionContext].

use smallvec::SmallVec;

use crate::{
    context::ExecutionContext,
    error::TaskError,
    graph::NodeId,
    hazard::Barrier,
    resource::{AccessMode, BufferKey, ImageKey, ImageLayout, ResourceUsage},
};

///Tag of a task descriptor.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub enum TaskKind {
    CopyBuffer,
    CopyImage,
    CopyBufferToImage,
    CopyImageToBuffer,
    UpdateBuffer,
    FillBuffer,
    ClearColorImage,
    ClearDepthStencil,
    BlitImage,
    ResolveImage,
    Draw,
    Dispatch,
    BuildAccelerationStructure,
    ReadBuffer,
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::CopyBuffer => "CopyBuffer",
            TaskKind::CopyImage => "CopyImage",
            TaskKind::CopyBufferToImage => "CopyBufferToImage",
            TaskKind::CopyImageToBuffer => "CopyImageToBuffer",
            TaskKind::UpdateBuffer => "UpdateBuffer",
            TaskKind::FillBuffer => "FillBuffer",
            TaskKind::ClearColorImage => "ClearColorImage",
            TaskKind::ClearDepthStencil => "ClearDepthStencil",
            TaskKind::BlitImage => "BlitImage",
            TaskKind::ResolveImage => "ResolveImage",
            TaskKind::Draw => "Draw",
            TaskKind::Dispatch => "Dispatch",
            TaskKind::BuildAccelerationStructure => "BuildAccelerationStructure",
            TaskKind::ReadBuffer => "ReadBuffer",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferCopyRegion {
    pub src_offset: u64,
    pub dst_offset: u64,
    pub size: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageCopyRegion {
    pub src_offset: [u32; 3],
    pub dst_offset: [u32; 3],
    pub extent: [u32; 3],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferImageRegion {
    pub buffer_offset: u64,
    pub image_offset: [u32; 3],
    pub extent: [u32; 3],
}

///Source and destination boxes of a blit. `min` is inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlitRegion {
    pub src_min: [u32; 3],
    pub src_max: [u32; 3],
    pub dst_min: [u32; 3],
    pub dst_max: [u32; 3],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CopyBuffer {
    pub src: BufferKey,
    pub dst: BufferKey,
    pub regions: Vec<BufferCopyRegion>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CopyImage {
    pub src: ImageKey,
    pub dst: ImageKey,
    pub regions: Vec<ImageCopyRegion>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CopyBufferToImage {
    pub src: BufferKey,
    pub dst: ImageKey,
    pub regions: Vec<BufferImageRegion>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CopyImageToBuffer {
    pub src: ImageKey,
    pub dst: BufferKey,
    pub regions: Vec<BufferImageRegion>,
}

///Inline buffer update. The payload is copied into the command stream.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateBuffer {
    pub dst: BufferKey,
    pub offset: u64,
    pub data: Vec<u8>,
}

impl UpdateBuffer {
    ///Largest payload an inline update may carry.
    pub const MAX_SIZE: usize = 65536;
}

#[derive(Clone, Debug, PartialEq)]
pub struct FillBuffer {
    pub dst: BufferKey,
    pub offset: u64,
    pub size: u64,
    pub value: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClearColorImage {
    pub image: ImageKey,
    pub color: [f32; 4],
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClearDepthStencil {
    pub image: ImageKey,
    pub depth: f32,
    pub stencil: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlitImage {
    pub src: ImageKey,
    pub dst: ImageKey,
    pub regions: Vec<BlitRegion>,
    pub filter: Filter,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolveImage {
    pub src: ImageKey,
    pub dst: ImageKey,
    ///Sample count of `src`, must be > 1.
    pub src_samples: u32,
    pub regions: Vec<ImageCopyRegion>,
}

///What happens to an attachment's content when a draw starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoadOp {
    #[default]
    Load,
    Clear,
    DontCare,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorTarget {
    pub image: ImageKey,
    pub load: LoadOp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthTarget {
    pub image: ImageKey,
    pub load: LoadOp,
    ///If false the depth image is only tested against, not written.
    pub write: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawCall {
    Direct {
        vertex_count: u32,
        instance_count: u32,
    },
    Indexed {
        index_count: u32,
        instance_count: u32,
    },
    Indirect {
        buffer: BufferKey,
        draw_count: u32,
    },
}

///Shader visible resource of a draw or dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    StorageBuffer { buffer: BufferKey, mode: AccessMode },
    UniformBuffer(BufferKey),
    SampledImage(ImageKey),
    StorageImage { image: ImageKey, mode: AccessMode },
}

impl Binding {
    fn usage(&self) -> ResourceUsage {
        match self {
            Binding::StorageBuffer { buffer, mode } => ResourceUsage::buffer(*buffer, *mode),
            Binding::UniformBuffer(buffer) => ResourceUsage::buffer(*buffer, AccessMode::Read),
            Binding::SampledImage(image) => {
                ResourceUsage::image(*image, AccessMode::Read, ImageLayout::ShaderRead)
            }
            Binding::StorageImage { image, mode } => {
                ResourceUsage::image(*image, *mode, ImageLayout::General)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Draw {
    pub color_targets: Vec<ColorTarget>,
    pub depth_target: Option<DepthTarget>,
    pub vertex_buffers: Vec<BufferKey>,
    pub index_buffer: Option<BufferKey>,
    pub bindings: Vec<Binding>,
    pub call: DrawCall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchSize {
    Groups([u32; 3]),
    Indirect(BufferKey),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub size: DispatchSize,
    pub bindings: Vec<Binding>,
}

///Builds an acceleration structure into `dst`. Acceleration structures are backed by buffers, so all participants
/// are buffer keys.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildAccelerationStructure {
    pub geometry: Vec<BufferKey>,
    pub scratch: BufferKey,
    pub dst: BufferKey,
}

///Host read back of a buffer range after the graph executed.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadBuffer {
    pub buffer: BufferKey,
    pub offset: u64,
    pub size: u64,
}

///Descriptor of any task kind.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskDesc {
    CopyBuffer(CopyBuffer),
    CopyImage(CopyImage),
    CopyBufferToImage(CopyBufferToImage),
    CopyImageToBuffer(CopyImageToBuffer),
    UpdateBuffer(UpdateBuffer),
    FillBuffer(FillBuffer),
    ClearColorImage(ClearColorImage),
    ClearDepthStencil(ClearDepthStencil),
    BlitImage(BlitImage),
    ResolveImage(ResolveImage),
    Draw(Draw),
    Dispatch(Dispatch),
    BuildAccelerationStructure(BuildAccelerationStructure),
    ReadBuffer(ReadBuffer),
}

macro_rules! impl_desc_from {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for TaskDesc {
                fn from(desc: $kind) -> Self {
                    TaskDesc::$kind(desc)
                }
            }
        )*
    };
}

impl_desc_from!(
    CopyBuffer,
    CopyImage,
    CopyBufferToImage,
    CopyImageToBuffer,
    UpdateBuffer,
    FillBuffer,
    ClearColorImage,
    ClearDepthStencil,
    BlitImage,
    ResolveImage,
    Draw,
    Dispatch,
    BuildAccelerationStructure,
    ReadBuffer
);

type Slots = SmallVec<[(&'static str, ResourceUsage); 4]>;

fn is_empty_extent(extent: &[u32; 3]) -> bool {
    extent.iter().any(|e| *e == 0)
}

fn ranges_overlap(a_start: u64, a_size: u64, b_start: u64, b_size: u64) -> bool {
    a_start < b_start.saturating_add(b_size) && b_start < a_start.saturating_add(a_size)
}

impl TaskDesc {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskDesc::CopyBuffer(_) => TaskKind::CopyBuffer,
            TaskDesc::CopyImage(_) => TaskKind::CopyImage,
            TaskDesc::CopyBufferToImage(_) => TaskKind::CopyBufferToImage,
            TaskDesc::CopyImageToBuffer(_) => TaskKind::CopyImageToBuffer,
            TaskDesc::UpdateBuffer(_) => TaskKind::UpdateBuffer,
            TaskDesc::FillBuffer(_) => TaskKind::FillBuffer,
            TaskDesc::ClearColorImage(_) => TaskKind::ClearColorImage,
            TaskDesc::ClearDepthStencil(_) => TaskKind::ClearDepthStencil,
            TaskDesc::BlitImage(_) => TaskKind::BlitImage,
            TaskDesc::ResolveImage(_) => TaskKind::ResolveImage,
            TaskDesc::Draw(_) => TaskKind::Draw,
            TaskDesc::Dispatch(_) => TaskKind::Dispatch,
            TaskDesc::BuildAccelerationStructure(_) => TaskKind::BuildAccelerationStructure,
            TaskDesc::ReadBuffer(_) => TaskKind::ReadBuffer,
        }
    }

    ///Every resource slot of the descriptor, named for error reporting.
    fn slots(&self) -> Slots {
        let mut slots = Slots::new();
        match self {
            TaskDesc::CopyBuffer(t) => {
                slots.push(("src", ResourceUsage::buffer(t.src, AccessMode::Read)));
                slots.push(("dst", ResourceUsage::buffer(t.dst, AccessMode::Write)));
            }
            TaskDesc::CopyImage(t) => {
                slots.push((
                    "src",
                    ResourceUsage::image(t.src, AccessMode::Read, ImageLayout::TransferSrc),
                ));
                slots.push((
                    "dst",
                    ResourceUsage::image(t.dst, AccessMode::Write, ImageLayout::TransferDst),
                ));
            }
            TaskDesc::CopyBufferToImage(t) => {
                slots.push(("src", ResourceUsage::buffer(t.src, AccessMode::Read)));
                slots.push((
                    "dst",
                    ResourceUsage::image(t.dst, AccessMode::Write, ImageLayout::TransferDst),
                ));
            }
            TaskDesc::CopyImageToBuffer(t) => {
                slots.push((
                    "src",
                    ResourceUsage::image(t.src, AccessMode::Read, ImageLayout::TransferSrc),
                ));
                slots.push(("dst", ResourceUsage::buffer(t.dst, AccessMode::Write)));
            }
            TaskDesc::UpdateBuffer(t) => {
                slots.push(("dst", ResourceUsage::buffer(t.dst, AccessMode::Write)));
            }
            TaskDesc::FillBuffer(t) => {
                slots.push(("dst", ResourceUsage::buffer(t.dst, AccessMode::Write)));
            }
            TaskDesc::ClearColorImage(t) => {
                slots.push((
                    "image",
                    ResourceUsage::image(t.image, AccessMode::Write, ImageLayout::TransferDst),
                ));
            }
            TaskDesc::ClearDepthStencil(t) => {
                slots.push((
                    "image",
                    ResourceUsage::image(t.image, AccessMode::Write, ImageLayout::TransferDst),
                ));
            }
            TaskDesc::BlitImage(t) => {
                slots.push((
                    "src",
                    ResourceUsage::image(t.src, AccessMode::Read, ImageLayout::TransferSrc),
                ));
                slots.push((
                    "dst",
                    ResourceUsage::image(t.dst, AccessMode::Write, ImageLayout::TransferDst),
                ));
            }
            TaskDesc::ResolveImage(t) => {
                slots.push((
                    "src",
                    ResourceUsage::image(t.src, AccessMode::Read, ImageLayout::TransferSrc),
                ));
                slots.push((
                    "dst",
                    ResourceUsage::image(t.dst, AccessMode::Write, ImageLayout::TransferDst),
                ));
            }
            TaskDesc::Draw(t) => {
                for target in &t.color_targets {
                    let mode = if target.load == LoadOp::Load {
                        AccessMode::ReadWrite
                    } else {
                        AccessMode::Write
                    };
                    slots.push((
                        "color_target",
                        ResourceUsage::image(target.image, mode, ImageLayout::ColorAttachment),
                    ));
                }
                if let Some(depth) = &t.depth_target {
                    let usage = match (depth.write, depth.load) {
                        (false, _) => ResourceUsage::image(
                            depth.image,
                            AccessMode::Read,
                            ImageLayout::DepthStencilRead,
                        ),
                        (true, LoadOp::Load) => ResourceUsage::image(
                            depth.image,
                            AccessMode::ReadWrite,
                            ImageLayout::DepthStencilAttachment,
                        ),
                        (true, _) => ResourceUsage::image(
                            depth.image,
                            AccessMode::Write,
                            ImageLayout::DepthStencilAttachment,
                        ),
                    };
                    slots.push(("depth_target", usage));
                }
                for vb in &t.vertex_buffers {
                    slots.push(("vertex_buffer", ResourceUsage::buffer(*vb, AccessMode::Read)));
                }
                if let Some(ib) = t.index_buffer {
                    slots.push(("index_buffer", ResourceUsage::buffer(ib, AccessMode::Read)));
                }
                if let DrawCall::Indirect { buffer, .. } = t.call {
                    slots.push(("indirect_buffer", ResourceUsage::buffer(buffer, AccessMode::Read)));
                }
                for binding in &t.bindings {
                    slots.push(("binding", binding.usage()));
                }
            }
            TaskDesc::Dispatch(t) => {
                if let DispatchSize::Indirect(buffer) = t.size {
                    slots.push(("indirect_buffer", ResourceUsage::buffer(buffer, AccessMode::Read)));
                }
                for binding in &t.bindings {
                    slots.push(("binding", binding.usage()));
                }
            }
            TaskDesc::BuildAccelerationStructure(t) => {
                for geo in &t.geometry {
                    slots.push(("geometry", ResourceUsage::buffer(*geo, AccessMode::Read)));
                }
                slots.push(("scratch", ResourceUsage::buffer(t.scratch, AccessMode::ReadWrite)));
                slots.push(("dst", ResourceUsage::buffer(t.dst, AccessMode::Write)));
            }
            TaskDesc::ReadBuffer(t) => {
                slots.push(("buffer", ResourceUsage::buffer(t.buffer, AccessMode::Read)));
            }
        }
        slots
    }

    ///Resource usages of this task. A resource that occurs in several slots is reported once, with the
    /// access modes combined.
    pub fn usages(&self) -> SmallVec<[ResourceUsage; 4]> {
        let mut usages: SmallVec<[ResourceUsage; 4]> = SmallVec::new();
        for (_slot, usage) in self.slots() {
            if let Some(known) = usages.iter_mut().find(|u| u.resource == usage.resource) {
                if known.mode != usage.mode {
                    known.mode = AccessMode::ReadWrite;
                }
                //NOTE: conflicting layouts are rejected by `validate`. We keep the first one.
            } else {
                usages.push(usage);
            }
        }
        usages
    }

    ///Checks the descriptor for structural errors.
    pub fn validate(&self) -> Result<(), TaskError> {
        let slots = self.slots();
        for (slot, usage) in slots.iter() {
            if usage.resource.is_null() {
                return Err(TaskError::NullHandle(*slot));
            }
        }
        if let TaskDesc::CopyImage(CopyImage { src, dst, .. })
        | TaskDesc::BlitImage(BlitImage { src, dst, .. })
        | TaskDesc::ResolveImage(ResolveImage { src, dst, .. }) = self
        {
            if src == dst {
                return Err(TaskError::SameImage);
            }
        }
        //the same image can't be in two layouts at once
        for (i, (_, a)) in slots.iter().enumerate() {
            for (_, b) in slots.iter().skip(i + 1) {
                if a.resource == b.resource && a.layout != b.layout {
                    return Err(TaskError::DuplicateResource(a.resource));
                }
            }
        }

        match self {
            TaskDesc::CopyBuffer(t) => {
                if t.regions.is_empty() {
                    return Err(TaskError::NoRegions);
                }
                for (i, region) in t.regions.iter().enumerate() {
                    if region.size == 0 {
                        return Err(TaskError::EmptyRegion(i));
                    }
                }
                for (i, a) in t.regions.iter().enumerate() {
                    for (j, b) in t.regions.iter().enumerate() {
                        //written ranges may never overlap. Within one buffer no read may overlap a write either.
                        let dst_overlap =
                            i < j && ranges_overlap(a.dst_offset, a.size, b.dst_offset, b.size);
                        let src_dst_overlap = t.src == t.dst
                            && ranges_overlap(a.src_offset, a.size, b.dst_offset, b.size);
                        if dst_overlap || src_dst_overlap {
                            return Err(TaskError::OverlappingRegions(i.min(j), i.max(j)));
                        }
                    }
                }
            }
            TaskDesc::CopyImage(t) => Self::check_image_regions(&t.regions)?,
            TaskDesc::CopyBufferToImage(t) => Self::check_buffer_image_regions(&t.regions)?,
            TaskDesc::CopyImageToBuffer(t) => Self::check_buffer_image_regions(&t.regions)?,
            TaskDesc::UpdateBuffer(t) => {
                if t.data.is_empty() || t.data.len() > UpdateBuffer::MAX_SIZE {
                    return Err(TaskError::UpdateSize {
                        len: t.data.len(),
                        max: UpdateBuffer::MAX_SIZE,
                    });
                }
            }
            TaskDesc::FillBuffer(t) => {
                if t.size == 0 {
                    return Err(TaskError::EmptyRegion(0));
                }
            }
            TaskDesc::ClearColorImage(_) | TaskDesc::ClearDepthStencil(_) => {}
            TaskDesc::BlitImage(t) => {
                if t.regions.is_empty() {
                    return Err(TaskError::NoRegions);
                }
                for (i, region) in t.regions.iter().enumerate() {
                    let src_empty = (0..3).any(|a| region.src_max[a] <= region.src_min[a]);
                    let dst_empty = (0..3).any(|a| region.dst_max[a] <= region.dst_min[a]);
                    if src_empty || dst_empty {
                        return Err(TaskError::EmptyRegion(i));
                    }
                }
            }
            TaskDesc::ResolveImage(t) => {
                if t.src_samples <= 1 {
                    return Err(TaskError::NotMultisampled(t.src_samples));
                }
                Self::check_image_regions(&t.regions)?;
            }
            TaskDesc::Draw(t) => {
                if t.color_targets.is_empty() && t.depth_target.is_none() {
                    return Err(TaskError::NoDrawTarget);
                }
                match t.call {
                    DrawCall::Direct {
                        vertex_count,
                        instance_count,
                    } => {
                        if vertex_count == 0 || instance_count == 0 {
                            return Err(TaskError::NoWork);
                        }
                    }
                    DrawCall::Indexed {
                        index_count,
                        instance_count,
                    } => {
                        if t.index_buffer.is_none() {
                            return Err(TaskError::NullHandle("index_buffer"));
                        }
                        if index_count == 0 || instance_count == 0 {
                            return Err(TaskError::NoWork);
                        }
                    }
                    DrawCall::Indirect { draw_count, .. } => {
                        if draw_count == 0 {
                            return Err(TaskError::NoWork);
                        }
                    }
                }
            }
            TaskDesc::Dispatch(t) => {
                if let DispatchSize::Groups(groups) = t.size {
                    if is_empty_extent(&groups) {
                        return Err(TaskError::NoWork);
                    }
                }
            }
            TaskDesc::BuildAccelerationStructure(t) => {
                if t.geometry.is_empty() {
                    return Err(TaskError::NoGeometry);
                }
            }
            TaskDesc::ReadBuffer(t) => {
                if t.size == 0 {
                    return Err(TaskError::EmptyRegion(0));
                }
            }
        }

        Ok(())
    }

    fn check_image_regions(regions: &[ImageCopyRegion]) -> Result<(), TaskError> {
        if regions.is_empty() {
            return Err(TaskError::NoRegions);
        }
        if let Some(i) = regions.iter().position(|r| is_empty_extent(&r.extent)) {
            return Err(TaskError::EmptyRegion(i));
        }
        Ok(())
    }

    fn check_buffer_image_regions(regions: &[BufferImageRegion]) -> Result<(), TaskError> {
        if regions.is_empty() {
            return Err(TaskError::NoRegions);
        }
        if let Some(i) = regions.iter().position(|r| is_empty_extent(&r.extent)) {
            return Err(TaskError::EmptyRegion(i));
        }
        Ok(())
    }
}

///Node of a [TaskGraph](crate::TaskGraph). Holds a copy of the task's descriptor, the tasks it depends on (inputs),
/// the tasks that depend on it (attached) and the barriers that have to be emitted before it runs.
pub struct FrameTask {
    pub(crate) id: NodeId,
    name: String,
    desc: TaskDesc,
    ///Dependencies, sorted by submission.
    inputs: SmallVec<[NodeId; 4]>,
    ///Successors. Only grows while the graph is under construction.
    attached: SmallVec<[NodeId; 4]>,
    barriers: SmallVec<[Barrier; 2]>,
    validation: Result<(), TaskError>,
}

impl FrameTask {
    ///Creates the node. The descriptor is validated right away, use [valid](Self::valid) to check the outcome.
    pub(crate) fn create(
        id: NodeId,
        name: impl Into<String>,
        desc: TaskDesc,
        dependencies: &[NodeId],
    ) -> Self {
        let validation = desc.validate();
        let mut inputs: SmallVec<[NodeId; 4]> = dependencies.iter().copied().collect();
        inputs.sort();
        inputs.dedup();

        FrameTask {
            id,
            name: name.into(),
            desc,
            inputs,
            attached: SmallVec::new(),
            barriers: SmallVec::new(),
            validation,
        }
    }

    ///Adds a hazard derived dependency. Only used while the node is created.
    pub(crate) fn add_implicit_dependency(&mut self, dependency: NodeId) {
        if let Err(pos) = self.inputs.binary_search(&dependency) {
            self.inputs.insert(pos, dependency);
        }
    }

    pub(crate) fn push_barrier(&mut self, barrier: Barrier) {
        self.barriers.push(barrier);
    }

    ///Registers `successor` as depending on this node.
    pub(crate) fn attach(&mut self, successor: NodeId) {
        debug_assert!(
            !self.attached.contains(&successor),
            "{:?} attached twice to {:?}",
            successor,
            self.id
        );
        self.attached.push(successor);
    }

    ///True if the descriptor passed validation at creation.
    pub fn valid(&self) -> bool {
        self.validation.is_ok()
    }

    pub fn validation_error(&self) -> Option<&TaskError> {
        self.validation.as_ref().err()
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TaskKind {
        self.desc.kind()
    }

    pub fn desc(&self) -> &TaskDesc {
        &self.desc
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn attached(&self) -> &[NodeId] {
        &self.attached
    }

    pub fn barriers(&self) -> &[Barrier] {
        &self.barriers
    }

    ///Position in the order tasks were added.
    pub fn submission(&self) -> usize {
        self.id.index()
    }

    ///Records the task's work into `ctx`.
    pub fn process<C: ExecutionContext + ?Sized>(&self, ctx: &mut C) -> Result<(), anyhow::Error> {
        let node = self.id;
        match &self.desc {
            TaskDesc::CopyBuffer(t) => ctx.copy_buffer(node, t),
            TaskDesc::CopyImage(t) => ctx.copy_image(node, t),
            TaskDesc::CopyBufferToImage(t) => ctx.copy_buffer_to_image(node, t),
            TaskDesc::CopyImageToBuffer(t) => ctx.copy_image_to_buffer(node, t),
            TaskDesc::UpdateBuffer(t) => ctx.update_buffer(node, t),
            TaskDesc::FillBuffer(t) => ctx.fill_buffer(node, t),
            TaskDesc::ClearColorImage(t) => ctx.clear_color_image(node, t),
            TaskDesc::ClearDepthStencil(t) => ctx.clear_depth_stencil(node, t),
            TaskDesc::BlitImage(t) => ctx.blit_image(node, t),
            TaskDesc::ResolveImage(t) => ctx.resolve_image(node, t),
            TaskDesc::Draw(t) => ctx.draw(node, t),
            TaskDesc::Dispatch(t) => ctx.dispatch(node, t),
            TaskDesc::BuildAccelerationStructure(t) => ctx.build_acceleration_structure(node, t),
            TaskDesc::ReadBuffer(t) => ctx.read_buffer(node, t),
        }
    }
}
