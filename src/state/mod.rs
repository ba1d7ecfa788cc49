/// State management module
///
/// This module handles all application state, including:
/// - Adjustment parameters and their slider mapping (edit.rs)
/// - Preview zoom/pan transform (view.rs)
/// - The editing session that owns the GPU resources (editor.rs)

pub mod edit;
pub mod editor;
pub mod view;
