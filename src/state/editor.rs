/// Editing session manager
///
/// Holds the GPU context for the lifetime of the app and at most one
/// `RenderSession` at a time. Parameters and the view transform survive
/// across images; the session does not.

use image::RgbaImage;
use log::{debug, info};
use thiserror::Error;

use super::edit::{AdjustmentParameters, Slider, SliderValues};
use super::view::{PanDirection, ViewTransform};
use crate::gpu::{GpuContext, GpuError, RenderSession};
use crate::image_io::export::{self, DownscaleFactor, EncodedImage, ExportError};
use crate::image_io::loader::LoadedImage;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("No image loaded")]
    NoImage,

    #[error(transparent)]
    Gpu(#[from] GpuError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Debug)]
pub struct Editor {
    gpu: GpuContext,
    params: AdjustmentParameters,
    sliders: SliderValues,
    view: ViewTransform,
    session: Option<RenderSession>,
    source_name: Option<String>,
}

impl Editor {
    pub fn new(gpu: GpuContext) -> Self {
        Self {
            gpu,
            params: AdjustmentParameters::default(),
            sliders: SliderValues::default(),
            view: ViewTransform::default(),
            session: None,
            source_name: None,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn parameters(&self) -> &AdjustmentParameters {
        &self.params
    }

    pub fn sliders(&self) -> &SliderValues {
        &self.sliders
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn has_image(&self) -> bool {
        self.session.is_some()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.session.as_ref().map(RenderSession::dimensions)
    }

    /// Replace the current image.
    ///
    /// The previous session is torn down before the new one is built, so a
    /// failed load leaves the editor without an image rather than with a
    /// half-built one.
    pub fn load_image(&mut self, image: &RgbaImage, name: impl Into<String>) -> Result<()> {
        self.remove_session();

        let session = RenderSession::new(&self.gpu, image)?;
        session.render(&self.gpu, &self.params)?;

        let name = name.into();
        info!("Editing {} ({}x{})", name, image.width(), image.height());
        self.session = Some(session);
        self.source_name = Some(name);
        Ok(())
    }

    pub fn load(&mut self, loaded: &LoadedImage) -> Result<()> {
        self.load_image(&loaded.pixels, loaded.name.clone())
    }

    /// Drop the session and return to the no-image state
    pub fn remove_image(&mut self) {
        self.remove_session();
        self.view.reset();
    }

    fn remove_session(&mut self) {
        if self.session.take().is_some() {
            debug!(
                "Released session for {}",
                self.source_name.as_deref().unwrap_or("image")
            );
        }
        self.source_name = None;
    }

    /// Store `params`; render if an image is loaded.
    ///
    /// The values are kept even when the render fails.
    pub fn set_parameters(&mut self, params: AdjustmentParameters) -> Result<()> {
        self.params = params;
        self.sliders = params.to_sliders();
        self.render_if_loaded()
    }

    /// Store a slider position (UI domain); render if an image is loaded
    pub fn set_slider(&mut self, slider: Slider, value: i32) -> Result<()> {
        self.sliders.set(slider, value);
        self.params = self.sliders.to_parameters();
        self.render_if_loaded()
    }

    pub fn restore_defaults(&mut self) -> Result<()> {
        self.sliders = SliderValues::default();
        self.params = AdjustmentParameters::default();
        self.render_if_loaded()
    }

    fn render_if_loaded(&self) -> Result<()> {
        match &self.session {
            Some(session) => Ok(session.render(&self.gpu, &self.params)?),
            None => Ok(()),
        }
    }

    pub fn render(&self) -> Result<()> {
        let session = self.session.as_ref().ok_or(EditorError::NoImage)?;
        Ok(session.render(&self.gpu, &self.params)?)
    }

    /// Full-resolution result of the last render
    pub fn adjusted_raster(&self) -> Result<RgbaImage> {
        let session = self.session.as_ref().ok_or(EditorError::NoImage)?;
        Ok(session.read_surface(&self.gpu)?)
    }

    pub fn export(&self, factor: DownscaleFactor) -> Result<EncodedImage> {
        let session = self.session.as_ref().ok_or(EditorError::NoImage)?;
        Ok(export::export_surface(&self.gpu, session.surface(), factor)?)
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn pan(&mut self, direction: PanDirection) {
        self.view.pan(direction);
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
    }
}
