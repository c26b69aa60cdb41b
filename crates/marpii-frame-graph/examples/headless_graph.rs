use marpii_frame_graph::{
    task::{
        Binding, BlitImage, BlitRegion, BufferImageRegion, ColorTarget, CopyBufferToImage,
        CopyImageToBuffer, Dispatch, DispatchSize, Draw, DrawCall, Filter, LoadOp, ReadBuffer,
        UpdateBuffer,
    },
    AccessMode, CommandList, GraphConfig, GraphExecutor, ImageLayout, ImportState, QueueKind,
    RecordedCommand, Resources, TaskGraph,
};

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Trace)
        .init()
        .unwrap();

    let mut res = Resources::new();
    let staging = res.add_buffer("Staging", 1024 * 1024);
    let particles = res.add_buffer("Particles", 64 * 1024);
    let readback = res.add_buffer("Readback", 1024 * 1024);
    let albedo = res.add_image("Albedo", [512, 512, 1], 1);
    let target = res.add_image("Target", [512, 512, 1], 1);
    let swapchain = res.add_image("Swapchain", [256, 256, 1], 1);

    let mut graph = TaskGraph::new();
    graph
        .construct(
            GraphConfig::default()
                .with_name("HeadlessFrame")
                .with_queue(QueueKind::Graphics),
        )
        .unwrap();

    //staging buffer was filled on the transfer queue, swapchain image was presented last frame
    graph
        .import(
            staging,
            ImportState {
                queue: Some(QueueKind::Transfer),
                layout: None,
            },
        )
        .unwrap();
    graph
        .import(
            swapchain,
            ImportState {
                queue: Some(QueueKind::Graphics),
                layout: Some(ImageLayout::Present),
            },
        )
        .unwrap();

    let upload = graph
        .add_named_task(
            "UploadAlbedo",
            CopyBufferToImage {
                src: staging,
                dst: albedo,
                regions: vec![BufferImageRegion {
                    buffer_offset: 0,
                    image_offset: [0; 3],
                    extent: [512, 512, 1],
                }],
            },
            &[],
        )
        .unwrap();

    let params = graph
        .add_named_task(
            "SimParams",
            UpdateBuffer {
                dst: particles,
                offset: 0,
                data: vec![0u8; 256],
            },
            &[],
        )
        .unwrap();

    let simulate = graph
        .add_named_task(
            "Simulate",
            Dispatch {
                size: DispatchSize::Groups([64, 1, 1]),
                bindings: vec![Binding::StorageBuffer {
                    buffer: particles,
                    mode: AccessMode::ReadWrite,
                }],
            },
            &[params],
        )
        .unwrap();

    let draw = graph
        .add_named_task(
            "DrawParticles",
            Draw {
                color_targets: vec![ColorTarget {
                    image: target,
                    load: LoadOp::Clear,
                }],
                depth_target: None,
                vertex_buffers: vec![particles],
                index_buffer: None,
                bindings: vec![Binding::SampledImage(albedo)],
                call: DrawCall::Direct {
                    vertex_count: 6,
                    instance_count: 1024,
                },
            },
            &[upload, simulate],
        )
        .unwrap();

    let blit = graph
        .add_named_task(
            "BlitToSwapchain",
            BlitImage {
                src: target,
                dst: swapchain,
                regions: vec![BlitRegion {
                    src_min: [0, 0, 0],
                    src_max: [512, 512, 1],
                    dst_min: [0, 0, 0],
                    dst_max: [256, 256, 1],
                }],
                filter: Filter::Linear,
            },
            &[draw],
        )
        .unwrap();

    let download = graph
        .add_named_task(
            "DownloadTarget",
            CopyImageToBuffer {
                src: target,
                dst: readback,
                regions: vec![BufferImageRegion {
                    buffer_offset: 0,
                    image_offset: [0; 3],
                    extent: [512, 512, 1],
                }],
            },
            &[],
        )
        .unwrap();

    graph
        .add_named_task(
            "ReadBack",
            ReadBuffer {
                buffer: readback,
                offset: 0,
                size: 512 * 512 * 4,
            },
            &[download],
        )
        .unwrap();

    println!("{}", graph);
    println!(
        "Planned order: {:?}",
        GraphExecutor::plan(&graph).unwrap()
    );

    let mut ctx = CommandList::new();
    let mut executor = GraphExecutor::new();
    let report = executor.execute(&mut graph, &mut ctx).unwrap();

    for cmd in ctx.commands() {
        match cmd {
            RecordedCommand::PipelineBarrier { node, barriers } => {
                println!("{} barrier x{}", node, barriers.len())
            }
            RecordedCommand::OwnershipTransfer { node, barrier } => {
                println!("{} ownership transfer of {}", node, barrier.resource)
            }
            RecordedCommand::Task { node, kind } => println!("{} {}", node, kind.name()),
            RecordedCommand::BeginTask { .. } | RecordedCommand::EndTask { .. } => {}
        }
    }
    println!(
        "Executed {} node(s), {} barrier(s), blit={}",
        report.order.len(),
        report.barriers_emitted,
        blit
    );

    let dot = marpii_frame_graph::DebugGraphDumper::new(&graph)
        .with_resources(&res)
        .with_report(&report)
        .render();
    println!("{}", dot);

    for (res_key, state) in graph.final_states() {
        println!(
            "{}: {:?}",
            res.name_of(res_key).unwrap_or("unknown"),
            state
        );
    }

    report.result().unwrap();
    graph.tear_down();
}
