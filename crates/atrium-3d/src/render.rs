use crate::depth::create_depth;
use crate::model::{Model, create_model_ubo};
use crate::pipeline::{Layouts, create_pipeline};
use std::sync::Arc;
use wgpu::*;

struct DrawItem {
    model: Arc<Model>,
    model_bg: BindGroup,
    _model_buf: Buffer,
}

pub struct Renderer3D {
    pub render_pipeline: RenderPipeline,
    pub depth_view: TextureView,
    pub depth_tex: Texture,
    pub camera_bg: BindGroup,
    pub camera_buf: Buffer,
    items: Vec<DrawItem>,
}

impl Renderer3D {
    pub fn new(
        device: &Device,
        surface_format: TextureFormat,
        width: u32,
        height: u32,
        layouts: &Layouts,
    ) -> Self {
        let (depth_view, depth_tex) = create_depth(device, width, height);
        let (render_pipeline, camera_bg, camera_buf) =
            create_pipeline(device, surface_format, layouts);

        Self {
            render_pipeline,
            depth_view,
            depth_tex,
            camera_bg,
            camera_buf,
            items: Vec::new(),
        }
    }

    /// Registers a placed model for drawing. Returns its draw index; items
    /// render in registration order.
    pub fn add_model(
        &mut self,
        device: &Device,
        layouts: &Layouts,
        model: Arc<Model>,
        xform: glam::Mat4,
    ) -> usize {
        let (model_buf, model_bg) = create_model_ubo(device, &layouts.model_bgl, xform);
        self.items.push(DrawItem {
            model,
            model_bg,
            _model_buf: model_buf,
        });
        self.items.len() - 1
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        let (dv, dt) = create_depth(device, width, height);
        self.depth_view = dv;
        self.depth_tex = dt;
    }

    pub fn render(&self, encoder: &mut CommandEncoder, target_view: &TextureView) {
        let mut r_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: target_view,
                depth_slice: None,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(Color {
                        r: 0.05,
                        g: 0.07,
                        b: 0.10,
                        a: 1.0,
                    }),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        r_pass.set_pipeline(&self.render_pipeline);
        r_pass.set_bind_group(0, &self.camera_bg, &[]);

        for item in &self.items {
            r_pass.set_bind_group(1, &item.model_bg, &[]);
            for mesh in &item.model.meshes {
                let mat =
                    &item.model.materials[mesh.material_id.min(item.model.materials.len() - 1)];
                r_pass.set_bind_group(2, &mat.bind_group, &[]);
                r_pass.set_vertex_buffer(0, mesh.vbuf.slice(..));
                r_pass.set_index_buffer(mesh.ibuf.slice(..), IndexFormat::Uint32);
                r_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
    }
}
