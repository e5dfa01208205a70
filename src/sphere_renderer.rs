use {
    crate::{
        atom::Painter,
        camera::Camera,
        config::{BLACK, LightingConfig, Rgba, SphereDetail},
        renderer::{DEPTH_FORMAT, RenderFrame},
    },
    glam::{Mat4, Vec3},
    std::collections::{BTreeMap, HashMap},
    wgpu::util::DeviceExt,
};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl SphereVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereInstance {
    pub model: [[f32; 4]; 4],
    pub emission: [f32; 4],
    pub diffuse: [f32; 4],
}

impl SphereInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub light_position: [f32; 4],
    /// xyz: spot direction, w: cosine of the cutoff angle
    pub spot: [f32; 4],
    pub ambient: [f32; 4],
    /// rgb: specular color, w: shininess
    pub specular: [f32; 4],
}

impl LightingUniforms {
    pub fn new(lighting: &LightingConfig, camera: &Camera) -> Self {
        let [lx, ly, lz] = lighting.light_position;
        let spot_direction = Vec3::from(lighting.spot_direction).normalize_or_zero();
        let spot_cos = lighting.spot_cutoff_degrees.to_radians().cos();
        let [sr, sg, sb, _] = lighting.material_specular;

        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_position: camera.position().extend(1.0).to_array(),
            light_position: [lx, ly, lz, 1.0],
            spot: spot_direction.extend(spot_cos).to_array(),
            ambient: lighting.ambient,
            specular: [sr, sg, sb, lighting.material_shininess],
        }
    }
}

/// Current emission and diffuse colors. Persists between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialState {
    pub emission: Rgba,
    pub diffuse: Rgba,
}

/// Collects the spheres of one frame, grouped by tessellation.
pub struct SphereBatch {
    material: MaterialState,
    inverse_view_proj: Mat4,
    groups: BTreeMap<(u32, u32), Vec<SphereInstance>>,
}

impl SphereBatch {
    pub fn new(lighting: &LightingConfig) -> Self {
        Self {
            material: MaterialState {
                emission: BLACK,
                diffuse: lighting.material_diffuse,
            },
            inverse_view_proj: Mat4::IDENTITY,
            groups: BTreeMap::new(),
        }
    }

    pub fn instance_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

impl Painter for SphereBatch {
    fn begin_frame(&mut self, camera: &Camera) {
        self.inverse_view_proj = camera.view_proj().inverse();
        for instances in self.groups.values_mut() {
            instances.clear();
        }
    }

    fn set_emission(&mut self, color: Rgba) {
        self.material.emission = color;
    }

    fn set_diffuse(&mut self, color: Rgba) {
        self.material.diffuse = color;
    }

    fn draw_sphere(&mut self, transform: Mat4, sphere: SphereDetail) {
        // Strip the camera back off so the shader can light in world space.
        let model =
            self.inverse_view_proj * transform * Mat4::from_scale(Vec3::splat(sphere.radius));

        self.groups
            .entry(sphere.mesh_key())
            .or_default()
            .push(SphereInstance {
                model: model.to_cols_array_2d(),
                emission: self.material.emission,
                diffuse: self.material.diffuse,
            });
    }
}

/// Unit UV sphere with poles on Y, counter-clockwise when seen from outside.
pub fn generate_uv_sphere(slices: u32, stacks: u32) -> (Vec<SphereVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
    for stack in 0..=stacks {
        let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
        for slice in 0..=slices {
            let theta = std::f32::consts::TAU * slice as f32 / slices as f32;
            let position = [phi.sin() * theta.cos(), phi.cos(), -phi.sin() * theta.sin()];
            vertices.push(SphereVertex {
                position,
                normal: position,
            });
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity((6 * slices * (stacks - 1)) as usize);
    for stack in 0..stacks {
        for slice in 0..slices {
            let a = stack * row + slice;
            let b = a + row;
            let c = a + 1;
            let d = b + 1;

            // The first and last rings collapse to a pole.
            if stack != 0 {
                indices.extend_from_slice(&[a, b, c]);
            }
            if stack != stacks - 1 {
                indices.extend_from_slice(&[c, b, d]);
            }
        }
    }

    (vertices, indices)
}

struct SphereMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl SphereMesh {
    fn new(device: &wgpu::Device, (slices, stacks): (u32, u32)) -> Self {
        let (vertices, indices) = generate_uv_sphere(slices, stacks);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

pub struct SphereRenderer {
    pipeline: wgpu::RenderPipeline,
    lighting_buffer: wgpu::Buffer,
    lighting_bind_group: wgpu::BindGroup,
    lighting: LightingConfig,
    meshes: HashMap<(u32, u32), SphereMesh>,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    batch: SphereBatch,
}

impl SphereRenderer {
    /// One-time lighting, depth and material setup. `meshes` are built up
    /// front; other tessellations are built on first use.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        lighting: &LightingConfig,
        meshes: &[SphereDetail],
    ) -> Self {
        let lighting_buffer = Self::create_lighting_buffer(device);
        let (pipeline, lighting_bind_group) =
            Self::create_render_pipeline(device, surface_format, &lighting_buffer);

        let meshes = meshes
            .iter()
            .map(|sphere| (sphere.mesh_key(), SphereMesh::new(device, sphere.mesh_key())))
            .collect();

        let instance_capacity = 16;
        let instance_buffer = Self::create_instance_buffer(device, instance_capacity);

        Self {
            pipeline,
            lighting_buffer,
            lighting_bind_group,
            lighting: lighting.clone(),
            meshes,
            instance_buffer,
            instance_capacity,
            batch: SphereBatch::new(lighting),
        }
    }

    pub fn batch_mut(&mut self) -> &mut SphereBatch {
        &mut self.batch
    }

    fn create_lighting_buffer(device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lighting Uniform Buffer"),
            size: std::mem::size_of::<LightingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sphere Instance Buffer"),
            size: (capacity * std::mem::size_of::<SphereInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_render_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        lighting_buffer: &wgpu::Buffer,
    ) -> (wgpu::RenderPipeline, wgpu::BindGroup) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sphere Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sphere.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lighting_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sphere Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SphereVertex::desc(), SphereInstance::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        (pipeline, bind_group)
    }

    /// Uploads this frame's spheres and draws them into `frame`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &mut RenderFrame,
        camera: &Camera,
    ) {
        let uniforms = LightingUniforms::new(&self.lighting, camera);
        queue.write_buffer(&self.lighting_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let instance_count = self.batch.instance_count();
        if instance_count > self.instance_capacity {
            self.instance_capacity = instance_count.next_power_of_two();
            self.instance_buffer = Self::create_instance_buffer(device, self.instance_capacity);
            log::debug!("Grew sphere instance buffer to {}", self.instance_capacity);
        }

        let mut draws = Vec::with_capacity(self.batch.groups.len());
        let mut instances = Vec::with_capacity(instance_count);
        for (&mesh_key, group) in &self.batch.groups {
            if group.is_empty() {
                continue;
            }
            self.meshes
                .entry(mesh_key)
                .or_insert_with(|| SphereMesh::new(device, mesh_key));

            let start = instances.len() as u32;
            instances.extend_from_slice(group);
            draws.push((mesh_key, start..instances.len() as u32));
        }

        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut render_pass = frame.begin_render_pass("Sphere Pass", wgpu::Color::BLACK);
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.lighting_bind_group, &[]);
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

        for (mesh_key, range) in draws {
            if let Some(mesh) = self.meshes.get(&mesh_key) {
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, range);
            }
        }
    }
}
