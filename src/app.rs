use atrium_runtime::{Graphics, HouseId, RcWindow, ViewerSettings, create_graphics};
use egui::Sense;
use egui::load::SizedTexture;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

const FPS: u64 = 120;
const FRAME_TIME: Duration = Duration::from_nanos(1_000_000_000 / FPS);

enum State {
    Ready(ReadyState),
    Init(Option<EventLoopProxy<Graphics>>),
}

struct ReadyState {
    gfx: Graphics,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    viewport_tex_id: egui::TextureId,
}

pub struct ViewerUi {
    pub show_status_panel: bool,
    pub comment_text: String,
    /// Set by the `C` key; consumed when the comment box grabs focus.
    pub focus_comment_entry: bool,
    /// Set when a pick misses; consumed when the comment box drops focus.
    pub drop_comment_focus: bool,
    pending_select: Option<HouseId>,
    pending_pick: Option<(f32, f32)>,
    pending_submit: bool,
}

impl ViewerUi {
    pub fn new() -> Self {
        Self {
            show_status_panel: false,
            comment_text: String::new(),
            focus_comment_entry: false,
            drop_comment_focus: false,
            pending_select: None,
            pending_pick: None,
            pending_submit: false,
        }
    }
}

struct HouseRow {
    id: HouseId,
    name: String,
    comment_count: usize,
}

pub struct App {
    state: State,
    render_target: Instant,
    ui: ViewerUi,
    settings: ViewerSettings,
}

impl App {
    pub fn new(event_loop: &EventLoop<Graphics>, settings: ViewerSettings) -> Self {
        Self {
            state: State::Init(Some(event_loop.create_proxy())),
            render_target: Instant::now(),
            ui: ViewerUi::new(),
            settings,
        }
    }

    fn init_egui_for_graphics(
        gfx: &Graphics,
    ) -> (
        egui::Context,
        egui_winit::State,
        egui_wgpu::Renderer,
        egui::TextureId,
    ) {
        let egui_ctx = egui::Context::default();
        let viewport_id = egui_ctx.viewport_id();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            viewport_id,
            gfx.window(),
            None,
            None,
            None,
        );

        let mut egui_renderer = egui_wgpu::Renderer::new(
            gfx.device(),
            gfx.surface_config().format,
            egui_wgpu::RendererOptions::default(),
        );

        let viewport_tex_id = egui_renderer.register_native_texture(
            gfx.device(),
            gfx.viewport_view(),
            wgpu::FilterMode::Linear,
        );

        (egui_ctx, egui_state, egui_renderer, viewport_tex_id)
    }

    fn draw(&mut self) {
        if let State::Ready(ready) = &mut self.state {
            Self::draw_viewer(ready, &mut self.ui);
        }
    }

    fn resized(&mut self, size: PhysicalSize<u32>) {
        if let State::Ready(ready) = &mut self.state {
            ready.gfx.resize(size);
            ready.egui_renderer.free_texture(&ready.viewport_tex_id);
            ready.viewport_tex_id = ready.egui_renderer.register_native_texture(
                ready.gfx.device(),
                ready.gfx.viewport_view(),
                wgpu::FilterMode::Linear,
            );
        }
    }

    fn draw_viewer(ready: &mut ReadyState, ui_state: &mut ViewerUi) {
        let raw_input = ready.egui_state.take_egui_input(ready.gfx.window());
        let viewport_tex_id = ready.viewport_tex_id;
        let cam_eye = ready.gfx.eye();
        let cam_yaw = ready.gfx.yaw();
        let surface_cfg = ready.gfx.surface_config();
        let viewport_w = surface_cfg.width as f32;
        let viewport_h = surface_cfg.height as f32;

        let scene = ready.gfx.scene();
        let house_rows: Vec<HouseRow> = scene
            .houses()
            .iter()
            .map(|h| HouseRow {
                id: h.id,
                name: h.name.clone(),
                comment_count: scene
                    .comments()
                    .for_house(&h.name)
                    .map_or(0, |c| c.len()),
            })
            .collect();
        let selected_id = scene.selected();
        let selected_name = scene.selected_house().map(|h| h.name.clone());
        let selected_comments: Vec<String> = scene
            .selected_house()
            .and_then(|h| scene.comments().for_house(&h.name))
            .map(|c| c.to_vec())
            .unwrap_or_default();

        let egui_ctx = ready.egui_ctx.clone();
        let ui_ptr: *mut ViewerUi = ui_state;
        let full_output = egui_ctx.run(raw_input, |ctx| {
            let ui_state: &mut ViewerUi = unsafe { &mut *ui_ptr };
            egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
                egui::MenuBar::new().ui(ui, |ui| {
                    ui.menu_button("View", |ui| {
                        ui.checkbox(&mut ui_state.show_status_panel, "Show camera status");
                    });

                    ui.menu_button("Help", |ui| {
                        ui.label(
                            "Arrows move, A/D turn.\n\
                             Click a house to select it.\n\
                             C focuses the comment box, V prints comments.",
                        );
                    });
                });
            });

            egui::SidePanel::left("houses_panel")
                .resizable(true)
                .default_width(220.0)
                .show(ctx, |ui| {
                    ui.heading("Houses");
                    ui.separator();
                    if house_rows.is_empty() {
                        ui.label("No houses loaded.");
                    }
                    for row in &house_rows {
                        let label = format!("{} ({})", row.name, row.comment_count);
                        if ui
                            .selectable_label(selected_id == Some(row.id), label)
                            .clicked()
                        {
                            ui_state.pending_select = Some(row.id);
                        }
                    }
                });

            egui::TopBottomPanel::bottom("comment_panel")
                .resizable(true)
                .default_height(160.0)
                .show(ctx, |ui| {
                    match &selected_name {
                        Some(name) => ui.heading(format!("Comments: {name}")),
                        None => ui.heading("Comments (no house selected)"),
                    };
                    ui.separator();

                    let edit_id = egui::Id::new("comment_entry");
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut ui_state.comment_text)
                            .id(edit_id)
                            .desired_rows(3)
                            .desired_width(f32::INFINITY)
                            .hint_text("Write a comment for the selected house"),
                    );
                    if ui_state.focus_comment_entry {
                        ui_state.focus_comment_entry = false;
                        response.request_focus();
                    }
                    if ui_state.drop_comment_focus {
                        ui_state.drop_comment_focus = false;
                        ctx.memory_mut(|m| m.surrender_focus(edit_id));
                    }

                    if ui.button("Add comment").clicked() {
                        ui_state.pending_submit = true;
                    }

                    if !selected_comments.is_empty() {
                        ui.separator();
                        egui::ScrollArea::vertical().show(ui, |ui| {
                            for comment in &selected_comments {
                                ui.label(comment);
                            }
                        });
                    }
                });

            egui::TopBottomPanel::bottom("status_panel")
                .resizable(false)
                .show_animated(ctx, ui_state.show_status_panel, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Camera eye:");
                        ui.monospace(format!("{cam_eye:?}"));
                        ui.separator();
                        ui.label("Yaw:");
                        ui.monospace(format!("{cam_yaw:.3}"));
                        ui.separator();
                        ui.label(format!("{} houses", house_rows.len()));
                    });
                });

            egui::CentralPanel::default().show(ctx, |ui| {
                let available = ui.available_size();

                if available.x > 0.0 && available.y > 0.0 && viewport_w > 0.0 && viewport_h > 0.0 {
                    let tex_aspect = viewport_w / viewport_h;
                    let panel_aspect = available.x / available.y;
                    let (w, h) = if panel_aspect > tex_aspect {
                        let h = available.y;
                        let w = h * tex_aspect;
                        (w, h)
                    } else {
                        let w = available.x;
                        let h = w / tex_aspect;
                        (w, h)
                    };

                    let viewport_size = egui::vec2(w, h);
                    let sized = SizedTexture::new(viewport_tex_id, viewport_size);
                    let image = egui::Image::from_texture(sized).sense(Sense::click());
                    let response = ui.add(image);

                    if response.clicked() {
                        if let Some(pos) = response.interact_pointer_pos() {
                            let rect = response.rect;
                            let ndc_x = ((pos.x - rect.left()) / rect.width()) * 2.0 - 1.0;
                            let ndc_y = 1.0 - ((pos.y - rect.top()) / rect.height()) * 2.0;
                            ui_state.pending_pick = Some((ndc_x, ndc_y));
                        }
                    }
                } else {
                    ui.label("Viewport area is too small.");
                }
            });
        });

        let egui::FullOutput {
            platform_output,
            textures_delta,
            shapes,
            pixels_per_point,
            ..
        } = full_output;

        ready
            .egui_state
            .handle_platform_output(ready.gfx.window(), platform_output);

        let paint_jobs = ready.egui_ctx.tessellate(shapes, pixels_per_point);

        if let Some(id) = ui_state.pending_select.take() {
            ready.gfx.scene_mut().select(id);
        }
        if let Some((ndc_x, ndc_y)) = ui_state.pending_pick.take() {
            match ready.gfx.pick(ndc_x, ndc_y) {
                Some(id) => ready.gfx.scene_mut().select(id),
                None => {
                    ready.gfx.scene_mut().clear_selection();
                    ui_state.drop_comment_focus = true;
                }
            }
        }
        if ui_state.pending_submit {
            ui_state.pending_submit = false;
            ready.gfx.scene_mut().submit_comment(&ui_state.comment_text);
            ui_state.comment_text.clear();
        }

        ready.gfx.draw(|gfx_inner, swap_view, encoder| {
            for (id, image_delta) in &textures_delta.set {
                ready.egui_renderer.update_texture(
                    gfx_inner.device(),
                    gfx_inner.queue(),
                    *id,
                    image_delta,
                );
            }
            for id in &textures_delta.free {
                ready.egui_renderer.free_texture(id);
            }

            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [
                    gfx_inner.surface_config().width,
                    gfx_inner.surface_config().height,
                ],
                pixels_per_point,
            };

            ready.egui_renderer.update_buffers(
                gfx_inner.device(),
                gfx_inner.queue(),
                encoder,
                &paint_jobs,
                &screen_descriptor,
            );

            let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_overlay_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut rpass = rpass.forget_lifetime();
            ready
                .egui_renderer
                .render(&mut rpass, &paint_jobs, &screen_descriptor);
        });
    }

    fn print_comments(gfx: &Graphics) {
        match gfx.scene().selected_house() {
            Some(house) => match gfx.scene().comments().for_house(&house.name) {
                Some(list) if !list.is_empty() => {
                    for comment in list {
                        println!("Comment for {}: {comment}", house.name);
                    }
                }
                _ => println!("No comments for {}.", house.name),
            },
            None => println!("No house selected."),
        }
    }
}

impl ApplicationHandler<Graphics> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let State::Init(proxy) = &mut self.state {
            if let Some(proxy) = proxy.take() {
                let mut win_attr = Window::default_attributes();
                win_attr = win_attr.with_title("Atrium House Viewer");

                let window: RcWindow = std::sync::Arc::new(
                    event_loop
                        .create_window(win_attr)
                        .expect("create window err."),
                );
                pollster::block_on(create_graphics(window, proxy, self.settings.clone()));
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        let (egui_ctx, egui_state, egui_renderer, viewport_tex_id) =
            App::init_egui_for_graphics(&graphics);

        graphics.request_redraw();
        self.state = State::Ready(ReadyState {
            gfx: graphics,
            egui_ctx,
            egui_state,
            egui_renderer,
            viewport_tex_id,
        });
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, _cause: StartCause) {
        if self.render_target <= Instant::now() {
            self.render_target += FRAME_TIME;
            if let State::Ready(ready) = &mut self.state {
                ready.gfx.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) => self.resized(size),
            WindowEvent::RedrawRequested => {
                self.draw();
                let now = Instant::now();
                if self.render_target <= now {
                    self.render_target = now + FRAME_TIME;
                    if let State::Ready(ready) = &mut self.state {
                        ready.gfx.request_redraw();
                    }
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            other => {
                if let State::Ready(ready) = &mut self.state {
                    let response = ready.egui_state.on_window_event(ready.gfx.window(), &other);
                    if response.repaint {
                        ready.gfx.request_redraw();
                    }
                    // Camera and viewer keys only run while egui (most
                    // importantly the comment box) is not taking input.
                    if !response.consumed {
                        if let WindowEvent::KeyboardInput {
                            event: key_event, ..
                        } = &other
                        {
                            use winit::event::ElementState;
                            use winit::keyboard::{KeyCode, PhysicalKey};

                            if key_event.state == ElementState::Pressed && !key_event.repeat {
                                match key_event.physical_key {
                                    PhysicalKey::Code(KeyCode::KeyC) => {
                                        self.ui.focus_comment_entry = true;
                                    }
                                    PhysicalKey::Code(KeyCode::KeyV) => {
                                        Self::print_comments(&ready.gfx);
                                    }
                                    _ => {}
                                }
                            }
                        }
                        ready.gfx.handle_window_event(&other);
                    }
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.render_target));
    }
}
