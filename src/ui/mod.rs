/// User interface helpers
///
/// The iced widgets live in the binary; this module holds the pieces of the
/// preview that can be computed without a window.

pub mod preview;
