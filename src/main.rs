use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, pick_list, row, slider, text, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use ::image::RgbaImage;
use log::{error, info, warn};
use rfd::FileDialog;
use std::path::PathBuf;

use tone_editor::config::EditorConfig;
use tone_editor::gpu::GpuContext;
use tone_editor::image_io::export::{DownscaleFactor, EncodedImage};
use tone_editor::image_io::loader::{self, LoadedImage, SUPPORTED_EXTENSIONS};
use tone_editor::state::edit::Slider;
use tone_editor::state::editor::{Editor, EditorError};
use tone_editor::state::view::PanDirection;
use tone_editor::ui::preview;

/// Main application state
struct ToneEditor {
    config: EditorConfig,
    /// None when no GPU could be acquired; the reason is in `status`
    editor: Option<Editor>,
    /// Last adjusted raster, kept so zoom/pan never touch the GPU
    adjusted: Option<RgbaImage>,
    preview: Option<Handle>,
    downscale: DownscaleFactor,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    OpenImage,
    ImageLoaded(Result<LoadedImage, String>),
    SliderChanged(Slider, i32),
    RestoreDefaults,
    ZoomIn,
    ZoomOut,
    Pan(PanDirection),
    ResetZoom,
    DownscaleSelected(DownscaleFactor),
    Download,
    Saved(Result<PathBuf, String>),
    RemoveImage,
}

impl ToneEditor {
    fn new() -> (Self, Task<Message>) {
        let config = EditorConfig::load_or_default();

        let (editor, status) = match GpuContext::new(&config.gpu_config()) {
            Ok(gpu) => {
                let status = format!("Ready on {}. Open an image to start.", gpu.adapter_info().name);
                (Some(Editor::new(gpu)), status)
            }
            Err(e) if e.is_resource_acquisition() => {
                error!("GPU unavailable: {}", e);
                (None, format!("No usable GPU found. Image adjustments unavailable: {}", e))
            }
            Err(e) => {
                error!("GPU initialisation failed: {}", e);
                (None, format!("Image adjustments unavailable: {}", e))
            }
        };

        let downscale = config.default_downscale;
        (
            ToneEditor {
                config,
                editor,
                adjusted: None,
                preview: None,
                downscale,
                status,
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenImage => {
                let file = FileDialog::new()
                    .set_title("Upload Image")
                    .add_filter("Images", &SUPPORTED_EXTENSIONS)
                    .pick_file();

                if let Some(path) = file {
                    self.status = format!("Loading {}...", path.display());
                    return Task::perform(loader::load_image_async(path), |result| {
                        Message::ImageLoaded(result.map_err(|e| e.to_string()))
                    });
                }
                Task::none()
            }
            Message::ImageLoaded(Ok(loaded)) => {
                let Some(editor) = self.editor.as_mut() else {
                    return Task::none();
                };
                match editor.load(&loaded) {
                    Ok(()) => {
                        let (w, h) = loaded.dimensions();
                        self.status = format!("{} ({}x{})", loaded.name, w, h);
                        self.refresh_raster();
                    }
                    Err(e) => {
                        error!("Could not start session: {}", e);
                        self.clear_preview();
                        self.status = e.to_string();
                    }
                }
                Task::none()
            }
            Message::ImageLoaded(Err(e)) => {
                warn!("Load failed: {}", e);
                self.status = e;
                Task::none()
            }
            Message::SliderChanged(which, value) => {
                let Some(editor) = self.editor.as_mut() else {
                    return Task::none();
                };
                let rendered = editor.set_slider(which, value);
                self.after_render(rendered);
                Task::none()
            }
            Message::RestoreDefaults => {
                let Some(editor) = self.editor.as_mut() else {
                    return Task::none();
                };
                let rendered = editor.restore_defaults();
                self.after_render(rendered);
                Task::none()
            }
            Message::ZoomIn => self.change_view(Editor::zoom_in),
            Message::ZoomOut => self.change_view(Editor::zoom_out),
            Message::ResetZoom => self.change_view(Editor::reset_view),
            Message::Pan(direction) => self.change_view(|editor| editor.pan(direction)),
            Message::DownscaleSelected(factor) => {
                self.downscale = factor;
                Task::none()
            }
            Message::Download => {
                let Some(editor) = self.editor.as_ref() else {
                    return Task::none();
                };
                match editor.export(self.downscale) {
                    Ok(encoded) => self.save(encoded),
                    Err(e) => {
                        error!("Export failed: {}", e);
                        self.status = e.to_string();
                        Task::none()
                    }
                }
            }
            Message::Saved(Ok(path)) => {
                self.status = format!("Saved {}", path.display());
                Task::none()
            }
            Message::Saved(Err(e)) => {
                error!("Save failed: {}", e);
                self.status = e;
                Task::none()
            }
            Message::RemoveImage => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.remove_image();
                }
                self.clear_preview();
                self.status = "Image removed.".to_string();
                Task::none()
            }
        }
    }

    fn save(&mut self, encoded: EncodedImage) -> Task<Message> {
        let target = FileDialog::new()
            .set_title("Download Image")
            .set_file_name(&encoded.suggested_filename)
            .add_filter("JPEG", &["jpg", "jpeg"])
            .save_file();

        let Some(path) = target else {
            return Task::none();
        };
        info!(
            "Writing {}x{} export to {}",
            encoded.width,
            encoded.height,
            path.display()
        );
        self.status = format!("Saving {}...", path.display());
        Task::perform(
            async move {
                let written = tokio::fs::write(&path, &encoded.bytes).await;
                written.map(|()| path).map_err(|e| e.to_string())
            },
            Message::Saved,
        )
    }

    fn after_render(&mut self, rendered: Result<(), EditorError>) {
        match rendered {
            Ok(()) => self.refresh_raster(),
            Err(e) => {
                error!("Render failed: {}", e);
                self.status = e.to_string();
            }
        }
    }

    fn change_view(&mut self, f: impl FnOnce(&mut Editor)) -> Task<Message> {
        if let Some(editor) = self.editor.as_mut() {
            f(editor);
            self.recompose();
        }
        Task::none()
    }

    /// Read the adjusted surface back and rebuild the preview
    fn refresh_raster(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        if !editor.has_image() {
            return;
        }
        match editor.adjusted_raster() {
            Ok(raster) => {
                self.adjusted = Some(raster);
                self.recompose();
            }
            Err(e) => {
                error!("Readback failed: {}", e);
                self.status = e.to_string();
            }
        }
    }

    /// Apply the current view transform to the cached raster
    fn recompose(&mut self) {
        let (Some(editor), Some(raster)) = (self.editor.as_ref(), self.adjusted.as_ref()) else {
            return;
        };
        let composed = preview::compose_preview(raster, self.config.preview_width, editor.view());
        let (w, h) = composed.dimensions();
        self.preview = Some(Handle::from_rgba(w, h, composed.into_raw()));
    }

    fn clear_preview(&mut self) {
        self.adjusted = None;
        self.preview = None;
    }

    fn view(&self) -> Element<Message> {
        let has_image = self.editor.as_ref().is_some_and(Editor::has_image);

        let mut controls: Column<Message> = column![
            button("Upload Image").on_press(Message::OpenImage).padding(10),
        ]
        .spacing(12)
        .width(Length::Fixed(280.0));

        if let Some(editor) = &self.editor {
            let sliders = editor.sliders();
            for which in Slider::ALL {
                let value = sliders.get(which);
                controls = controls.push(text(which.label(value)).size(14));
                controls = controls.push(slider(which.range(), value, move |v| {
                    Message::SliderChanged(which, v)
                }));
            }
        }

        controls = controls.push(
            button("Restore Default Styles").on_press(Message::RestoreDefaults),
        );

        if has_image {
            controls = controls
                .push(row![
                    button("Zoom In").on_press(Message::ZoomIn),
                    button("Zoom Out").on_press(Message::ZoomOut),
                    button("Reset Zoom").on_press(Message::ResetZoom),
                ]
                .spacing(6))
                .push(row![
                    button("Left").on_press(Message::Pan(PanDirection::Left)),
                    button("Right").on_press(Message::Pan(PanDirection::Right)),
                    button("Up").on_press(Message::Pan(PanDirection::Up)),
                    button("Down").on_press(Message::Pan(PanDirection::Down)),
                ]
                .spacing(6))
                .push(pick_list(
                    &DownscaleFactor::ALL[..],
                    Some(self.downscale),
                    Message::DownscaleSelected,
                ))
                .push(row![
                    button("Download").on_press(Message::Download),
                    button("Remove Image").on_press(Message::RemoveImage),
                ]
                .spacing(6));
        }

        controls = controls.push(text(&self.status).size(14));

        let canvas: Element<Message> = match &self.preview {
            Some(handle) => image(handle.clone())
                .width(Length::Fixed(self.config.preview_width as f32))
                .into(),
            None => text("No image loaded").size(18).into(),
        };

        let content = row![
            controls,
            container(canvas)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        ]
        .spacing(20)
        .padding(20)
        .align_y(Alignment::Start);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("tone_editor=info"))
        .init();

    iced::application("Tone Editor", ToneEditor::update, ToneEditor::view)
        .theme(ToneEditor::theme)
        .centered()
        .run_with(ToneEditor::new)
}
